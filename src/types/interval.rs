//! Date interval type and converter.
//!
//! Intervals are stored as a signed ISO 8601 duration rendered through a fixed
//! template, e.g. `+P00Y01M02DT00H00M00S`.

use super::{Converter, NormalizedType, Value, names};
use crate::db::platform::Platform;
use crate::error::{DbError, DbResult};
use serde::{Deserialize, Serialize};

/// Storage template: sign, then years, months, days, hours, minutes, seconds.
pub const INTERVAL_FORMAT: &str = "%RP%YY%MM%DDT%HH%IM%SS";

/// Calendar interval with a separate direction flag.
///
/// Magnitudes are never negative; `invert` marks a negative interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateInterval {
    pub years: u32,
    pub months: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub invert: bool,
}

impl DateInterval {
    pub fn new(years: u32, months: u32, days: u32, hours: u32, minutes: u32, seconds: u32) -> Self {
        Self {
            years,
            months,
            days,
            hours,
            minutes,
            seconds,
            invert: false,
        }
    }

    /// Same interval pointing the other way.
    pub fn inverted(mut self) -> Self {
        self.invert = !self.invert;
        self
    }

    /// Render the interval through a `%`-template.
    ///
    /// Supported placeholders: `%Y %M %D %H %I %S` (zero-padded to two digits),
    /// `%y %m %d %h %i %s` (unpadded), `%R` (`+`/`-`), `%r` (`-` or nothing)
    /// and `%%`. Unknown placeholders are copied verbatim.
    pub fn format(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len() + 8);
        let mut chars = template.chars();
        while let Some(ch) = chars.next() {
            if ch != '%' {
                out.push(ch);
                continue;
            }
            match chars.next() {
                Some('Y') => out.push_str(&format!("{:02}", self.years)),
                Some('y') => out.push_str(&self.years.to_string()),
                Some('M') => out.push_str(&format!("{:02}", self.months)),
                Some('m') => out.push_str(&self.months.to_string()),
                Some('D') => out.push_str(&format!("{:02}", self.days)),
                Some('d') => out.push_str(&self.days.to_string()),
                Some('H') => out.push_str(&format!("{:02}", self.hours)),
                Some('h') => out.push_str(&self.hours.to_string()),
                Some('I') => out.push_str(&format!("{:02}", self.minutes)),
                Some('i') => out.push_str(&self.minutes.to_string()),
                Some('S') => out.push_str(&format!("{:02}", self.seconds)),
                Some('s') => out.push_str(&self.seconds.to_string()),
                Some('R') => out.push(if self.invert { '-' } else { '+' }),
                Some('r') => {
                    if self.invert {
                        out.push('-');
                    }
                }
                Some('%') => out.push('%'),
                Some(other) => {
                    out.push('%');
                    out.push(other);
                }
                None => out.push('%'),
            }
        }
        out
    }

    /// Parse an unsigned ISO 8601 duration such as `P1Y2M10DT2H30M` or `P2W`.
    ///
    /// Designators must appear in order (`Y M W D`, then `T` and `H M S`), each
    /// at most once, and at least one component is required. Weeks are folded
    /// into days.
    pub fn parse_iso8601(input: &str) -> Result<Self, String> {
        let body = input
            .strip_prefix('P')
            .ok_or_else(|| "duration must start with 'P'".to_string())?;

        let (date_part, time_part) = match body.split_once('T') {
            Some((date, time)) => {
                if time.is_empty() {
                    return Err("time designator 'T' must be followed by a component".into());
                }
                (date, Some(time))
            }
            None => (body, None),
        };

        let mut interval = DateInterval::default();
        let mut components = 0;

        for (designator, value) in parse_components(date_part, &['Y', 'M', 'W', 'D'])? {
            match designator {
                'Y' => interval.years = value,
                'M' => interval.months = value,
                'W' => {
                    interval.days = value
                        .checked_mul(7)
                        .and_then(|d| d.checked_add(interval.days))
                        .ok_or_else(|| "week value out of range".to_string())?
                }
                _ => {
                    interval.days = interval
                        .days
                        .checked_add(value)
                        .ok_or_else(|| "day value out of range".to_string())?
                }
            }
            components += 1;
        }

        if let Some(time) = time_part {
            for (designator, value) in parse_components(time, &['H', 'M', 'S'])? {
                match designator {
                    'H' => interval.hours = value,
                    'M' => interval.minutes = value,
                    _ => interval.seconds = value,
                }
                components += 1;
            }
        }

        if components == 0 {
            return Err("duration has no components".into());
        }
        Ok(interval)
    }
}

impl std::fmt::Display for DateInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format(INTERVAL_FORMAT))
    }
}

/// Split `12Y3M` into `[('Y', 12), ('M', 3)]`, enforcing designator order.
fn parse_components(part: &str, designators: &[char]) -> Result<Vec<(char, u32)>, String> {
    let mut components = Vec::new();
    let mut digits = String::new();
    let mut next = 0;

    for ch in part.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        let offset = designators[next..]
            .iter()
            .position(|d| *d == ch)
            .ok_or_else(|| format!("unexpected '{}'", ch))?;
        if digits.is_empty() {
            return Err(format!("missing value before '{}'", ch));
        }
        let value = digits
            .parse::<u32>()
            .map_err(|_| format!("value '{}' out of range", digits))?;
        components.push((ch, value));
        digits.clear();
        next += offset + 1;
    }

    if !digits.is_empty() {
        return Err(format!("value '{}' has no designator", digits));
    }
    Ok(components)
}

/// Converts [`DateInterval`] values to and from the signed duration template.
#[derive(Debug, Clone, Default)]
pub struct DateIntervalType;

impl Converter for DateIntervalType {
    fn name(&self) -> &str {
        names::DATEINTERVAL
    }

    fn normalized_type(&self) -> NormalizedType {
        NormalizedType::Interval
    }

    fn format(&self, _platform: &Platform) -> String {
        INTERVAL_FORMAT.to_string()
    }

    fn to_storage(&self, value: &Value, _platform: &Platform) -> DbResult<Option<String>> {
        match value {
            Value::Null => Ok(None),
            Value::Interval(interval) => Ok(Some(interval.format(INTERVAL_FORMAT))),
            other => Err(DbError::invalid_type(
                self.name(),
                other.kind(),
                &["null", "dateinterval"],
            )),
        }
    }

    fn from_storage(&self, value: &Value, _platform: &Platform) -> DbResult<Value> {
        let raw = match value {
            Value::Null | Value::Interval(_) => return Ok(value.clone()),
            Value::Text(raw) => raw,
            other => {
                return Err(DbError::invalid_type(
                    self.name(),
                    other.kind(),
                    &["null", "dateinterval", "string"],
                ));
            }
        };

        let (negative, body) = match raw.chars().next() {
            Some('-') => (true, &raw[1..]),
            Some('+') => (false, &raw[1..]),
            _ => (false, raw.as_str()),
        };

        let mut interval = DateInterval::parse_iso8601(body)
            .map_err(|_| DbError::invalid_format(self.name(), raw, INTERVAL_FORMAT))?;
        if negative {
            interval.invert = true;
        }
        Ok(Value::Interval(interval))
    }
}
