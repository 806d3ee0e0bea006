use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::errors::DomainError;
use super::form::RateSchedule;

/// Price window a purchase falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RateTier {
    EarlyBird,
    Standard,
    Onsite,
    Expired,
}

impl RateTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateTier::EarlyBird => "early_bird",
            RateTier::Standard => "standard",
            RateTier::Onsite => "onsite",
            RateTier::Expired => "expired",
        }
    }
}

impl fmt::Display for RateTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RateTier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "early_bird" => Ok(RateTier::EarlyBird),
            "standard" => Ok(RateTier::Standard),
            "onsite" => Ok(RateTier::Onsite),
            "expired" => Ok(RateTier::Expired),
            other => Err(DomainError::InvalidInput(format!("unknown rate tier '{}'", other))),
        }
    }
}

/// Parse an IANA timezone name such as `America/New_York`.
pub fn parse_timezone(name: &str) -> Result<Tz, DomainError> {
    name.parse::<Tz>()
        .map_err(|e| DomainError::InvalidInput(format!("invalid timezone '{}': {}", name, e)))
}

/// Last millisecond (23:59:59.999) of the local calendar day containing
/// `cutoff`, as Unix millis.
///
/// When that wall-clock time does not exist locally (DST gap) it is read as
/// UTC instead.
pub fn end_of_day_millis(cutoff: i64, tz: Tz) -> Option<i64> {
    let day = DateTime::from_timestamp(cutoff, 0)?
        .with_timezone(&tz)
        .date_naive();
    let naive = day.and_hms_milli_opt(23, 59, 59, 999)?;
    Some(
        naive
            .and_local_timezone(tz)
            .latest()
            .map(|dt| dt.timestamp_millis())
            .unwrap_or_else(|| naive.and_utc().timestamp_millis()),
    )
}

/// Classify `now` against the schedule's cutoff days in `tz`.
///
/// Every boundary is inclusive of its end of day. An unset early-bird or
/// standard cutoff skips that tier; an unset onsite cutoff never expires.
pub fn resolve_tier(now: DateTime<Utc>, tz: Tz, schedule: &RateSchedule) -> RateTier {
    let now_ms = now.timestamp_millis();
    let within = |cutoff: Option<i64>| {
        cutoff
            .and_then(|c| end_of_day_millis(c, tz))
            .is_some_and(|eod| now_ms <= eod)
    };

    if within(schedule.early_bird_end) {
        RateTier::EarlyBird
    } else if within(schedule.standard_end) {
        RateTier::Standard
    } else if schedule.onsite_end.is_none() || within(schedule.onsite_end) {
        RateTier::Onsite
    } else {
        RateTier::Expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::{Los_Angeles, New_York};

    fn day(tz: Tz, y: i32, m: u32, d: u32) -> i64 {
        tz.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap().timestamp()
    }

    #[allow(clippy::too_many_arguments)]
    fn at(tz: Tz, y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32, ms: u32) -> DateTime<Utc> {
        tz.with_ymd_and_hms(y, m, d, h, mi, s).unwrap().with_timezone(&Utc)
            + chrono::Duration::milliseconds(ms as i64)
    }

    fn schedule() -> RateSchedule {
        RateSchedule {
            early_bird_end: Some(day(New_York, 2025, 3, 1)),
            standard_end: Some(day(New_York, 2025, 4, 1)),
            onsite_end: Some(day(New_York, 2025, 5, 1)),
        }
    }

    #[test]
    fn before_early_bird_cutoff_is_early_bird() {
        let now = at(New_York, 2025, 1, 15, 12, 0, 0, 0);
        assert_eq!(resolve_tier(now, New_York, &schedule()), RateTier::EarlyBird);
    }

    #[test]
    fn end_of_day_is_inclusive() {
        let last_ms = at(New_York, 2025, 3, 1, 23, 59, 59, 999);
        assert_eq!(resolve_tier(last_ms, New_York, &schedule()), RateTier::EarlyBird);

        let next_day = at(New_York, 2025, 3, 2, 0, 0, 0, 0);
        assert_eq!(resolve_tier(next_day, New_York, &schedule()), RateTier::Standard);
    }

    #[test]
    fn between_standard_and_onsite_is_onsite() {
        let now = at(New_York, 2025, 4, 15, 8, 30, 0, 0);
        let tier = resolve_tier(now, New_York, &schedule());
        assert_ne!(tier, RateTier::Standard);
        assert_eq!(tier, RateTier::Onsite);
    }

    #[test]
    fn after_onsite_cutoff_is_expired() {
        let now = at(New_York, 2025, 5, 2, 0, 0, 0, 0);
        assert_eq!(resolve_tier(now, New_York, &schedule()), RateTier::Expired);
    }

    #[test]
    fn missing_onsite_cutoff_never_expires() {
        let open_ended = RateSchedule {
            onsite_end: None,
            ..schedule()
        };
        for year in [2025, 2030, 2099] {
            let now = at(New_York, year, 12, 31, 23, 0, 0, 0);
            assert_eq!(resolve_tier(now, New_York, &open_ended), RateTier::Onsite);
        }
    }

    #[test]
    fn missing_early_bird_cutoff_skips_the_tier() {
        let no_early = RateSchedule {
            early_bird_end: None,
            ..schedule()
        };
        let now = at(New_York, 2025, 1, 15, 12, 0, 0, 0);
        assert_eq!(resolve_tier(now, New_York, &no_early), RateTier::Standard);
    }

    #[test]
    fn no_cutoffs_at_all_is_onsite() {
        let now = at(New_York, 2025, 1, 15, 12, 0, 0, 0);
        assert_eq!(
            resolve_tier(now, New_York, &RateSchedule::default()),
            RateTier::Onsite
        );
    }

    #[test]
    fn cutoff_day_is_taken_in_the_form_timezone() {
        // 2025-03-02T00:00Z is still March 1st in Los Angeles.
        let cutoff = Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap().timestamp();
        let schedule = RateSchedule {
            early_bird_end: Some(cutoff),
            standard_end: None,
            onsite_end: None,
        };

        let late_evening = at(Los_Angeles, 2025, 3, 1, 23, 30, 0, 0);
        assert_eq!(resolve_tier(late_evening, Los_Angeles, &schedule), RateTier::EarlyBird);

        let after_midnight = at(Los_Angeles, 2025, 3, 2, 0, 30, 0, 0);
        assert_eq!(resolve_tier(after_midnight, Los_Angeles, &schedule), RateTier::Onsite);
    }

    #[test]
    fn end_of_day_inside_dst_gap_is_read_as_utc() {
        // Dhaka moved clocks from 23:00 to 00:00 on 2009-06-19, so that day
        // has no 23:59:59.999.
        let dhaka: Tz = "Asia/Dhaka".parse().unwrap();
        let cutoff = Utc.with_ymd_and_hms(2009, 6, 19, 6, 0, 0).unwrap().timestamp();
        let expected = Utc
            .with_ymd_and_hms(2009, 6, 19, 23, 59, 59)
            .unwrap()
            .timestamp_millis()
            + 999;

        assert_eq!(end_of_day_millis(cutoff, dhaka), Some(expected));
    }

    #[test]
    fn end_of_day_on_regular_day_uses_local_offset() {
        let cutoff = day(New_York, 2025, 3, 1);
        let expected = at(New_York, 2025, 3, 1, 23, 59, 59, 999).timestamp_millis();
        assert_eq!(end_of_day_millis(cutoff, New_York), Some(expected));
    }

    #[test]
    fn parse_timezone_rejects_unknown_names() {
        assert_eq!(parse_timezone("America/New_York").unwrap(), New_York);
        assert!(matches!(
            parse_timezone("Mars/Olympus_Mons"),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn tier_names_roundtrip() {
        for tier in [
            RateTier::EarlyBird,
            RateTier::Standard,
            RateTier::Onsite,
            RateTier::Expired,
        ] {
            assert_eq!(tier.as_str().parse::<RateTier>().unwrap(), tier);
            assert_eq!(
                serde_json::to_value(tier).unwrap(),
                serde_json::json!(tier.as_str())
            );
        }
    }
}
