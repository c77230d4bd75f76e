// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{de::Error as _, Deserialize, Deserializer};

/// Format a UTC timestamp as RFC3339 (millisecond precision) using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The current time, formatted for storage.
pub fn now_rfc3339() -> String {
    format_utc_rfc3339(Utc::now())
}

/// Accept a stored timestamp in any shape older clients wrote it and
/// normalize it with [`format_utc_rfc3339`] so stamps compare as strings.
///
/// Handles RFC3339 strings (Firestore timestamps arrive in this form),
/// epoch milliseconds from `Date.now()`, and `{seconds, nanos}` or
/// `{_seconds, _nanoseconds}` objects. Unparseable text is kept as is.
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Millis(i64),
        FloatMillis(f64),
        Parts {
            #[serde(alias = "_seconds")]
            seconds: i64,
            #[serde(default, alias = "nanos", alias = "_nanoseconds")]
            nanoseconds: u32,
        },
    }

    let date = match Raw::deserialize(deserializer)? {
        Raw::Text(s) => {
            return Ok(match DateTime::parse_from_rfc3339(&s) {
                Ok(date) => format_utc_rfc3339(date.with_timezone(&Utc)),
                Err(_) => s,
            })
        }
        Raw::Millis(ms) => DateTime::from_timestamp_millis(ms),
        Raw::FloatMillis(ms) => DateTime::from_timestamp_millis(ms as i64),
        Raw::Parts {
            seconds,
            nanoseconds,
        } => DateTime::from_timestamp(seconds, nanoseconds),
    };

    date.map(format_utc_rfc3339)
        .ok_or_else(|| D::Error::custom("timestamp out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uses_z_suffix() {
        let date = DateTime::from_timestamp(1_704_103_200, 5_000_000).unwrap();
        assert_eq!(format_utc_rfc3339(date), "2024-01-01T10:00:00.005Z");
    }

    #[test]
    fn test_stamps_sort_chronologically() {
        let earlier = format_utc_rfc3339(DateTime::from_timestamp(1_704_103_200, 0).unwrap());
        let later = format_utc_rfc3339(DateTime::from_timestamp(1_704_103_201, 0).unwrap());
        assert!(earlier < later);
    }

    #[derive(Deserialize)]
    struct Stamped {
        #[serde(deserialize_with = "deserialize_timestamp")]
        at: String,
    }

    fn parse(value: serde_json::Value) -> String {
        serde_json::from_value::<Stamped>(serde_json::json!({ "at": value }))
            .unwrap()
            .at
    }

    #[test]
    fn test_deserialize_timestamp_shapes() {
        assert_eq!(parse("2026-01-01T00:00:00Z".into()), "2026-01-01T00:00:00.000Z");
        assert_eq!(
            parse("2026-01-01T02:00:00+02:00".into()),
            "2026-01-01T00:00:00.000Z"
        );
        assert_eq!(parse(1_704_103_200_005_i64.into()), "2024-01-01T10:00:00.005Z");
        assert_eq!(
            parse(serde_json::json!({"seconds": 1_704_103_200, "nanos": 0})),
            "2024-01-01T10:00:00.000Z"
        );
        assert_eq!(
            parse(serde_json::json!({"_seconds": 1_704_103_200, "_nanoseconds": 5_000_000})),
            "2024-01-01T10:00:00.005Z"
        );
    }
}
