//! Composite occurrence identities.
//!
//! An occurrence has no persisted row, so its identity is derived:
//! `"<rule-id>-<iso-instant>"`, where the instant is the raw generator
//! output for the occurrence's date (the series start-time-of-day, UTC),
//! captured before the materializer rebuilds start/end. Composer and parser
//! live here together so they cannot drift apart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RecurrenceError;

/// Wire format of the instant embedded in an occurrence id, e.g.
/// `2025-07-14T09:00:00.000Z`.
pub const INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Deterministic, reversible identity of a single occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct OccurrenceId {
    rule_id: Uuid,
    instant: DateTime<Utc>,
}

impl OccurrenceId {
    #[must_use]
    pub const fn new(rule_id: Uuid, instant: DateTime<Utc>) -> Self {
        Self { rule_id, instant }
    }

    #[must_use]
    pub const fn rule_id(&self) -> Uuid {
        self.rule_id
    }

    /// The generating instant, not the materialized start time.
    #[must_use]
    pub const fn instant(&self) -> DateTime<Utc> {
        self.instant
    }
}

impl std::fmt::Display for OccurrenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.rule_id, self.instant.format(INSTANT_FORMAT))
    }
}

impl std::str::FromStr for OccurrenceId {
    type Err = RecurrenceError;

    /// Splits on the first hyphen boundary where an ISO date pattern begins.
    /// Rule ids are UUIDs and contain hyphens themselves, so a naive
    /// first-hyphen split would cut the id apart.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let anchor = iso_anchor(s)
            .ok_or_else(|| RecurrenceError::InvalidOccurrenceId(s.to_string()))?;

        let rule_id = Uuid::parse_str(&s[..anchor - 1])
            .map_err(|_| RecurrenceError::InvalidOccurrenceId(s.to_string()))?;
        let instant = DateTime::parse_from_rfc3339(&s[anchor..])
            .map_err(|_| RecurrenceError::InvalidOccurrenceId(s.to_string()))?
            .with_timezone(&Utc);

        Ok(Self { rule_id, instant })
    }
}

impl From<OccurrenceId> for String {
    fn from(id: OccurrenceId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for OccurrenceId {
    type Error = RecurrenceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// First index at which a `\d{4}-\d{2}-\d{2}T` pattern begins right after a
/// hyphen separator.
fn iso_anchor(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    (1..s.len()).find(|&i| bytes[i - 1] == b'-' && starts_with_iso_date(&bytes[i..]))
}

fn starts_with_iso_date(bytes: &[u8]) -> bool {
    bytes.len() > 10
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[5..7].iter().all(u8::is_ascii_digit)
        && bytes[7] == b'-'
        && bytes[8..10].iter().all(u8::is_ascii_digit)
        && bytes[10] == b'T'
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_round_trip_with_hyphenated_rule_id() {
        let rule_id = Uuid::parse_str("a7f8c6a2-1b7d-4f7e-9c3a-2e8b5d4f6a01").unwrap();
        let instant = Utc.with_ymd_and_hms(2025, 7, 14, 9, 0, 0).unwrap();
        let id = OccurrenceId::new(rule_id, instant);

        let text = id.to_string();
        assert_eq!(
            text,
            "a7f8c6a2-1b7d-4f7e-9c3a-2e8b5d4f6a01-2025-07-14T09:00:00.000Z"
        );

        let parsed: OccurrenceId = text.parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(parsed.rule_id(), rule_id);
        assert_eq!(parsed.instant(), instant);
    }

    #[test]
    fn test_numeric_uuid_segments_do_not_confuse_the_anchor() {
        // Every segment boundary of this id looks hyphen-ish; only the real
        // instant matches the full ISO pattern.
        let rule_id = Uuid::parse_str("12345678-1234-5678-9012-345678901234").unwrap();
        let instant = Utc.with_ymd_and_hms(2025, 2, 28, 18, 30, 0).unwrap();
        let id = OccurrenceId::new(rule_id, instant);

        let parsed: OccurrenceId = id.to_string().parse().unwrap();
        assert_eq!(parsed.rule_id(), rule_id);
        assert_eq!(parsed.instant(), instant);
    }

    #[test]
    fn test_rejects_malformed_ids() {
        for bad in [
            "",
            "not-an-id",
            "a7f8c6a2-1b7d-4f7e-9c3a-2e8b5d4f6a01",
            "2025-07-14T09:00:00.000Z",
            "nope-2025-07-14T09:00:00.000Z",
        ] {
            assert!(
                bad.parse::<OccurrenceId>().is_err(),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_serde_as_string() {
        let id = OccurrenceId::new(
            Uuid::parse_str("a7f8c6a2-1b7d-4f7e-9c3a-2e8b5d4f6a01").unwrap(),
            Utc.with_ymd_and_hms(2025, 7, 14, 9, 0, 0).unwrap(),
        );
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(
            json,
            "\"a7f8c6a2-1b7d-4f7e-9c3a-2e8b5d4f6a01-2025-07-14T09:00:00.000Z\""
        );
        let back: OccurrenceId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
