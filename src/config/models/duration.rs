//! Human readable durations (`500ms`, `30s`, `1m30s`, `1h`, bare seconds)
//!
//! Usable as `#[serde(with = "duration")]`.

use serde::{Deserialize, Deserializer, Serializer};
use std::time::Duration;

pub fn parse(input: &str) -> Result<Duration, String> {
    let text = input.trim();
    if let Ok(secs) = text.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(text).map_err(|e| format!("invalid duration {input:?}: {e}"))
}

pub fn format(duration: &Duration) -> String {
    humantime::format_duration(*duration).to_string()
}

pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(duration))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Seconds(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Seconds(secs) => Ok(Duration::from_secs(secs)),
        Raw::Text(text) => parse(&text).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(parse("500ms"), Ok(Duration::from_millis(500)));
        assert_eq!(parse("30s"), Ok(Duration::from_secs(30)));
        assert_eq!(parse("2m"), Ok(Duration::from_secs(120)));
        assert_eq!(parse("1h"), Ok(Duration::from_secs(3600)));
        assert_eq!(parse(" 45 "), Ok(Duration::from_secs(45)));
    }

    #[test]
    fn test_parse_compound() {
        assert_eq!(parse("1m30s"), Ok(Duration::from_secs(90)));
        assert_eq!(parse("1h 15m"), Ok(Duration::from_secs(4500)));
        assert_eq!(parse("2s500ms"), Ok(Duration::from_millis(2500)));
    }

    #[test]
    fn test_parse_rejects_garbage_and_overflow() {
        assert!(parse("").is_err());
        assert!(parse("fast").is_err());
        assert!(parse("10x").is_err());
        assert!(parse("99999999999999999999h").is_err());
    }

    #[test]
    fn test_format_parses_back() {
        assert_eq!(format(&Duration::from_secs(30)), "30s");
        for duration in [Duration::from_millis(1500), Duration::from_secs(90)] {
            assert_eq!(parse(&format(&duration)), Ok(duration));
        }
    }
}
