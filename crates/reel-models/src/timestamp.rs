//! SRT timestamp formatting and parsing.
//!
//! Subtitle cues use `HH:MM:SS,mmm`: hours, minutes and seconds padded to
//! two digits, milliseconds padded to three.

/// Format seconds as an SRT timestamp.
///
/// Negative inputs clamp to zero. Milliseconds are rounded, so float noise
/// such as `1.0009999` does not truncate to `1,000`.
///
/// # Examples
/// ```
/// use reel_models::timestamp::format_srt_timestamp;
/// assert_eq!(format_srt_timestamp(75.125), "00:01:15,125");
/// assert_eq!(format_srt_timestamp(3723.5), "01:02:03,500");
/// ```
pub fn format_srt_timestamp(total_secs: f64) -> String {
    let total_ms = if total_secs.is_finite() && total_secs > 0.0 {
        (total_secs * 1000.0).round() as u64
    } else {
        0
    };

    let hours = total_ms / 3_600_000;
    let mins = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;

    format!("{:02}:{:02}:{:02},{:03}", hours, mins, secs, millis)
}

/// Parse an SRT timestamp (`HH:MM:SS,mmm`, `.` also accepted) to seconds.
pub fn parse_srt_timestamp(ts: &str) -> Result<f64, TimestampError> {
    let ts = ts.trim();
    if ts.is_empty() {
        return Err(TimestampError::Empty);
    }

    let (clock, millis) = ts
        .split_once(',')
        .or_else(|| ts.split_once('.'))
        .ok_or_else(|| TimestampError::InvalidFormat(ts.to_string()))?;

    let parts: Vec<&str> = clock.split(':').collect();
    if parts.len() != 3 {
        return Err(TimestampError::InvalidFormat(ts.to_string()));
    }

    let hours: u64 = parts[0]
        .parse()
        .map_err(|_| TimestampError::InvalidValue("hours", parts[0].to_string()))?;
    let minutes: u64 = parts[1]
        .parse()
        .map_err(|_| TimestampError::InvalidValue("minutes", parts[1].to_string()))?;
    let seconds: u64 = parts[2]
        .parse()
        .map_err(|_| TimestampError::InvalidValue("seconds", parts[2].to_string()))?;
    let millis: u64 = millis
        .parse()
        .map_err(|_| TimestampError::InvalidValue("milliseconds", millis.to_string()))?;

    if minutes >= 60 || seconds >= 60 || millis >= 1000 {
        return Err(TimestampError::OutOfRange(ts.to_string()));
    }

    Ok((hours * 3600 + minutes * 60 + seconds) as f64 + millis as f64 / 1000.0)
}

/// Timestamp parsing error.
#[derive(Debug, Clone, PartialEq)]
pub enum TimestampError {
    /// Timestamp string is empty
    Empty,
    /// Invalid numeric value for a component
    InvalidValue(&'static str, String),
    /// Not shaped like `HH:MM:SS,mmm`
    InvalidFormat(String),
    /// Minutes, seconds or milliseconds past their range
    OutOfRange(String),
}

impl std::fmt::Display for TimestampError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "Timestamp cannot be empty"),
            Self::InvalidValue(component, value) => {
                write!(f, "Invalid {} value: {}", component, value)
            }
            Self::InvalidFormat(ts) => {
                write!(f, "Invalid timestamp format '{}'. Use HH:MM:SS,mmm", ts)
            }
            Self::OutOfRange(ts) => write!(f, "Timestamp component out of range: {}", ts),
        }
    }
}

impl std::error::Error for TimestampError {}
