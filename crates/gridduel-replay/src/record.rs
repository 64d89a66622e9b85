//! Replay record types and their one-line text form.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, Timelike};
use gridduel_protocol::{ConnectionId, Side};

use crate::ReplayError;

/// Record kind for the session-settings record.
const SETTINGS_KIND: &str = "1";
/// Record kind for a move record.
const MOVE_KIND: &str = "2";

// ---------------------------------------------------------------------------
// Timestamp
// ---------------------------------------------------------------------------

/// A wall-clock instant at one-second precision.
///
/// Stored and transmitted as six fields: year, month, day, hour,
/// minute, second. Sub-second parts are dropped at construction so a
/// timestamp always survives a round trip through its text form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// The current local time, truncated to the second.
    pub fn now() -> Self {
        Self::from_datetime(Local::now().naive_local())
    }

    /// Wraps a datetime, truncating it to the second.
    pub fn from_datetime(at: NaiveDateTime) -> Self {
        Self(at.with_nanosecond(0).unwrap_or(at))
    }

    /// Builds a timestamp from its six fields.
    ///
    /// Returns `None` if the fields don't name a real date and time.
    pub fn from_fields(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)?
            .and_hms_opt(hour, minute, second)
            .map(Self)
    }

    /// The wrapped datetime.
    pub fn as_datetime(&self) -> NaiveDateTime {
        self.0
    }

    fn parse_fields(
        fields: &mut Cursor<'_>,
    ) -> Result<Self, ReplayError> {
        let year = fields.number("year")?;
        let month = fields.number("month")?;
        let day = fields.number("day")?;
        let hour = fields.number("hour")?;
        let minute = fields.number("minute")?;
        let second = fields.number("second")?;
        Self::from_fields(year, month, day, hour, minute, second)
            .ok_or_else(|| fields.malformed("timestamp out of range"))
    }
}

/// Writes the six comma-separated fields.
impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{}",
            self.0.year(),
            self.0.month(),
            self.0.day(),
            self.0.hour(),
            self.0.minute(),
            self.0.second()
        )
    }
}

// ---------------------------------------------------------------------------
// SessionMeta / Move
// ---------------------------------------------------------------------------

/// Who played, on what grid, starting when.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionMeta {
    pub player_a: ConnectionId,
    pub player_b: ConnectionId,
    pub grid_width: usize,
    pub grid_height: usize,
    pub started_at: Timestamp,
}

impl SessionMeta {
    /// The `"playerA,playerB"` label used in the index log.
    pub fn participants_label(&self) -> String {
        format!(
            "{},{}",
            self.player_a.into_inner(),
            self.player_b.into_inner()
        )
    }
}

/// One accepted move. Created once, never changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub side: Side,
    pub x: usize,
    pub y: usize,
    pub at: Timestamp,
}

// ---------------------------------------------------------------------------
// ReplayRecord
// ---------------------------------------------------------------------------

/// One line of a replay file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayRecord {
    SessionSettings(SessionMeta),
    Move(Move),
}

impl ReplayRecord {
    /// Serializes the record to its one-line form.
    pub fn encode(&self) -> String {
        match self {
            Self::SessionSettings(meta) => format!(
                "{SETTINGS_KIND},{},{},{},{},{}",
                meta.player_a.into_inner(),
                meta.player_b.into_inner(),
                meta.grid_width,
                meta.grid_height,
                meta.started_at
            ),
            Self::Move(mv) => format!(
                "{MOVE_KIND},{},{},{},{}",
                mv.side.token(),
                mv.x,
                mv.y,
                mv.at
            ),
        }
    }

    /// Parses one line.
    ///
    /// Returns `Ok(None)` for blank lines and for record kinds this
    /// version doesn't know.
    ///
    /// # Errors
    /// Returns [`ReplayError::Malformed`] if a known kind has bad fields.
    pub fn decode(line: &str) -> Result<Option<Self>, ReplayError> {
        let mut fields = Cursor::new(line);
        let record = match fields.kind() {
            Some(SETTINGS_KIND) => {
                let player_a = ConnectionId::new(fields.number("player_a")?);
                let player_b = ConnectionId::new(fields.number("player_b")?);
                let grid_width = fields.number("grid_width")?;
                let grid_height = fields.number("grid_height")?;
                let started_at = Timestamp::parse_fields(&mut fields)?;
                Self::SessionSettings(SessionMeta {
                    player_a,
                    player_b,
                    grid_width,
                    grid_height,
                    started_at,
                })
            }
            Some(MOVE_KIND) => {
                let token: u8 = fields.number("side")?;
                let side = Side::from_token(token)
                    .ok_or_else(|| fields.malformed("side"))?;
                let x = fields.number("x")?;
                let y = fields.number("y")?;
                let at = Timestamp::parse_fields(&mut fields)?;
                Self::Move(Move { side, x, y, at })
            }
            _ => return Ok(None),
        };
        Ok(Some(record))
    }
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// Positional field reader shared by the replay and index codecs.
pub(crate) struct Cursor<'a> {
    line: &'a str,
    iter: std::str::Split<'a, char>,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(line: &'a str) -> Self {
        Self {
            line,
            iter: line.split(','),
        }
    }

    /// Field 0, trimmed. `None` on a blank line.
    pub(crate) fn kind(&mut self) -> Option<&'a str> {
        self.iter.next().map(str::trim).filter(|k| !k.is_empty())
    }

    pub(crate) fn number<T: FromStr>(
        &mut self,
        field: &'static str,
    ) -> Result<T, ReplayError> {
        self.iter
            .next()
            .and_then(|raw| raw.trim().parse().ok())
            .ok_or_else(|| self.malformed(field))
    }

    /// Re-joins every remaining field.
    pub(crate) fn rest(self) -> String {
        let parts: Vec<&str> = self.iter.collect();
        parts.join(",")
    }

    pub(crate) fn malformed(&self, reason: &'static str) -> ReplayError {
        ReplayError::malformed(self.line, reason)
    }
}

// =========================================================================
// Tests
// =========================================================================
