//! Custom serde module for durations written as "30s", "5m", "1h" or a bare number of seconds.

use serde::{self, Deserialize, Deserializer};
use std::time::Duration;

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Seconds(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Seconds(secs)) if secs >= 0.0 => Ok(Duration::from_secs_f64(secs)),
        Some(Raw::Seconds(secs)) => Err(serde::de::Error::custom(format!(
            "negative duration: {}",
            secs
        ))),
        Some(Raw::Text(s)) => parse_duration(&s).map_err(serde::de::Error::custom),
        None => Ok(Duration::ZERO),
    }
}

pub(crate) fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(Duration::ZERO);
    }

    let num_end = s
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(s.len());

    let (num_str, unit) = s.split_at(num_end);
    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("invalid duration number: {}", num_str))?;

    let nanos_per_unit = match unit.trim() {
        "ms" => 1e6,
        "s" | "" => 1e9,
        "m" => 60e9,
        "h" => 3600e9,
        _ => return Err(format!("unknown duration unit: {}", unit)),
    };

    Ok(Duration::from_nanos((num * nanos_per_unit).round() as u64))
}
