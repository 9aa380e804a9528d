//! Timestamps and author/committer identities.

use std::fmt;

use bstr::{BStr, BString, ByteSlice, ByteVec};
use chrono::{DateTime, FixedOffset, Local};

use crate::error::UtilError;
use crate::Result;

/// A point in time with the timezone offset it was recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GitDate {
    /// Seconds since Unix epoch.
    pub timestamp: i64,
    /// Timezone offset in minutes east of UTC (e.g. -300 for EST).
    pub tz_offset: i32,
}

/// Output styles for [`GitDate::format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// "1736942400 +0000"
    Raw,
    /// "2025-01-15 12:00:00 +0000"
    Iso,
    /// "Wed, 15 Jan 2025 12:00:00 +0000"
    Rfc2822,
    /// "2025-01-15"
    Short,
    /// "Wed Jan 15 12:00:00 2025 +0000", in the recorded offset.
    Default,
}

/// Offsets beyond +/-23:59 cannot be written as `+hhmm`.
const MAX_TZ_MINUTES: i32 = 24 * 60 - 1;

/// Parse a `+hhmm` / `-hhmm` offset into minutes.
pub fn parse_tz_offset(tz: &str) -> Result<i32> {
    let bytes = tz.as_bytes();
    let invalid = || UtilError::DateParse(format!("invalid timezone: '{tz}'"));

    if bytes.len() != 5 || !bytes[1..].iter().all(u8::is_ascii_digit) {
        return Err(invalid());
    }
    let sign = match bytes[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return Err(invalid()),
    };
    let hours = i32::from(bytes[1] - b'0') * 10 + i32::from(bytes[2] - b'0');
    let mins = i32::from(bytes[3] - b'0') * 10 + i32::from(bytes[4] - b'0');
    if mins >= 60 {
        return Err(invalid());
    }
    Ok(sign * (hours * 60 + mins))
}

/// Render minutes east of UTC as `+hhmm`.
pub fn format_tz_offset(minutes: i32) -> String {
    let sign = if minutes < 0 { '-' } else { '+' };
    let abs = minutes.unsigned_abs();
    format!("{}{:02}{:02}", sign, abs / 60, abs % 60)
}

impl GitDate {
    /// Create a GitDate from a Unix timestamp and timezone offset in minutes.
    pub fn new(timestamp: i64, tz_offset_minutes: i32) -> Self {
        Self {
            timestamp,
            tz_offset: tz_offset_minutes,
        }
    }

    /// The current time in the local timezone.
    pub fn now() -> Self {
        let now = Local::now();
        Self {
            timestamp: now.timestamp(),
            tz_offset: now.offset().local_minus_utc() / 60,
        }
    }

    /// Parse a date in any of the accepted input forms:
    ///
    /// - raw: `1234567890 +0000` (offset optional)
    /// - `@1234567890`
    /// - RFC 3339: `2025-01-15T12:00:00+00:00`
    /// - RFC 2822: `Wed, 15 Jan 2025 12:00:00 +0000`
    /// - ISO-like: `2025-01-15 12:00:00 +0000`
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(UtilError::DateParse("empty date string".into()));
        }

        if let Some(ts) = input.strip_prefix('@') {
            return Self::parse_raw(ts);
        }
        if let Ok(date) = Self::parse_raw(input) {
            return Ok(date);
        }

        let parsed = DateTime::parse_from_rfc3339(input)
            .or_else(|_| DateTime::parse_from_rfc2822(input))
            .or_else(|_| DateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S %z"));
        match parsed {
            Ok(dt) => Ok(Self::from_datetime(&dt)),
            Err(_) => Err(UtilError::DateParse(format!(
                "unable to parse date: '{input}'"
            ))),
        }
    }

    /// Parse the raw form `timestamp [+-hhmm]`.
    pub fn parse_raw(input: &str) -> Result<Self> {
        let mut parts = input.trim().splitn(2, ' ');
        let ts_str = parts.next().unwrap_or_default();
        let timestamp: i64 = ts_str
            .parse()
            .map_err(|_| UtilError::DateParse(format!("invalid timestamp: '{ts_str}'")))?;

        let tz_offset = match parts.next() {
            Some(tz) => parse_tz_offset(tz.trim())?,
            None => 0,
        };

        Ok(Self {
            timestamp,
            tz_offset,
        })
    }

    fn from_datetime(dt: &DateTime<FixedOffset>) -> Self {
        Self {
            timestamp: dt.timestamp(),
            tz_offset: dt.offset().local_minus_utc() / 60,
        }
    }

    /// Whether the offset is one a signature line can carry.
    pub fn has_valid_offset(&self) -> bool {
        self.tz_offset.unsigned_abs() <= MAX_TZ_MINUTES as u32
    }

    /// Convert to a chrono DateTime in the stored offset.
    pub fn to_datetime(&self) -> Option<DateTime<FixedOffset>> {
        let offset = FixedOffset::east_opt(self.tz_offset.checked_mul(60)?)?;
        DateTime::from_timestamp(self.timestamp, 0).map(|dt| dt.with_timezone(&offset))
    }

    /// Format in the given style.
    pub fn format(&self, fmt: DateFormat) -> String {
        if fmt == DateFormat::Raw {
            return format!("{} {}", self.timestamp, format_tz_offset(self.tz_offset));
        }
        let Some(dt) = self.to_datetime() else {
            return format!("{} {}", self.timestamp, format_tz_offset(self.tz_offset));
        };
        match fmt {
            DateFormat::Iso => dt.format("%Y-%m-%d %H:%M:%S %z").to_string(),
            DateFormat::Rfc2822 => dt.format("%a, %d %b %Y %H:%M:%S %z").to_string(),
            DateFormat::Short => dt.format("%Y-%m-%d").to_string(),
            DateFormat::Default => dt.format("%a %b %e %H:%M:%S %Y %z").to_string(),
            DateFormat::Raw => unreachable!(),
        }
    }
}

/// Author/committer identity with timestamp.
///
/// [`Signature::new`] and [`Signature::parse_ident`] validate their input.
/// [`Signature::parse`] only checks structure, since it reads headers of
/// commits that already exist.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub name: BString,
    pub email: BString,
    pub date: GitDate,
}

impl Signature {
    /// Build a validated signature.
    pub fn new(name: impl Into<BString>, email: impl Into<BString>, date: GitDate) -> Result<Self> {
        let sig = Self {
            name: BString::from(name.into().trim()),
            email: BString::from(email.into().trim()),
            date,
        };
        sig.validate()?;
        Ok(sig)
    }

    /// Check name, email and offset.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(UtilError::InvalidSignature("empty name".into()));
        }
        if self.name.iter().any(|&b| matches!(b, b'<' | b'>' | b'\n')) {
            return Err(UtilError::InvalidSignature(format!(
                "name contains a forbidden character: '{}'",
                self.name
            )));
        }
        validate_email(self.email.as_ref())?;
        if !self.date.has_valid_offset() {
            return Err(UtilError::InvalidSignature(format!(
                "timezone offset out of range: {} minutes",
                self.date.tz_offset
            )));
        }
        Ok(())
    }

    /// Parse from git format: `Name <email> timestamp tz`.
    ///
    /// The date must be well formed; name and email are taken as they are.
    pub fn parse(input: &BStr) -> Result<Self> {
        let input = input.as_bytes();

        let gt_pos = input
            .iter()
            .rposition(|&b| b == b'>')
            .ok_or_else(|| UtilError::InvalidSignature("missing '>'".into()))?;
        let lt_pos = input[..gt_pos]
            .iter()
            .rposition(|&b| b == b'<')
            .ok_or_else(|| UtilError::InvalidSignature("missing '<'".into()))?;

        let name = input[..lt_pos].trim();
        let email = &input[lt_pos + 1..gt_pos];
        let date_str = std::str::from_utf8(input[gt_pos + 1..].trim())
            .map_err(|_| UtilError::InvalidSignature("non-UTF-8 date".into()))?;
        let date = GitDate::parse_raw(date_str)
            .map_err(|e| UtilError::InvalidSignature(e.to_string()))?;

        Ok(Self {
            name: BString::from(name),
            email: BString::from(email),
            date,
        })
    }

    /// Parse an identity of the form `Name <email>` and attach a date.
    pub fn parse_ident(input: &str, date: GitDate) -> Result<Self> {
        let (name, rest) = input
            .split_once('<')
            .ok_or_else(|| UtilError::InvalidSignature(format!("expected 'Name <email>': '{input}'")))?;
        let email = rest
            .strip_suffix('>')
            .or_else(|| rest.trim_end().strip_suffix('>'))
            .ok_or_else(|| UtilError::InvalidSignature(format!("missing '>': '{input}'")))?;
        Self::new(name, email, date)
    }

    /// Format in git's canonical form: `Name <email> timestamp tz`.
    pub fn to_bytes(&self) -> BString {
        let mut out = BString::new(Vec::new());
        out.push_str(&self.name);
        out.push_str(b" <");
        out.push_str(&self.email);
        out.push_str(b"> ");
        out.push_str(self.date.format(DateFormat::Raw).as_bytes());
        out
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

fn validate_email(email: &BStr) -> Result<()> {
    if email.is_empty() {
        return Err(UtilError::InvalidSignature("empty email".into()));
    }
    if email
        .iter()
        .any(|&b| matches!(b, b'<' | b'>' | b'\n') || b.is_ascii_whitespace())
    {
        return Err(UtilError::InvalidSignature(format!("malformed email: '{email}'")));
    }
    Ok(())
}
