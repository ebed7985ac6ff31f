//! Time selectors and resolved upstream time tokens.
//!
//! Clients ask for data with an abstract selector ("latest", "-2d", an
//! explicit date); the time resolution engine turns that into a concrete
//! `ResolvedTime` by probing upstream availability.

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::OceanError;

/// A client-supplied date request, immutable per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeSelector {
    /// Most recent available day (probe today, then fall back)
    Latest,
    /// Today specifically, with the same fallback chain as Latest
    Today,
    /// Exactly n days ago, no fallback
    DaysAgo(u8),
    /// An explicit calendar date, no fallback
    Date(NaiveDate),
}

impl TimeSelector {
    /// Parse the `time` query/body parameter.
    ///
    /// Accepts `latest`, `today`, `-1d`/`-2d`/`-3d`, and `YYYY-MM-DD`.
    /// An empty or missing value is treated as `latest`.
    pub fn parse(s: &str) -> Result<Self, OceanError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(TimeSelector::Latest);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "latest" => return Ok(TimeSelector::Latest),
            "today" => return Ok(TimeSelector::Today),
            _ => {}
        }

        if let Some(rest) = trimmed.strip_prefix('-').and_then(|r| r.strip_suffix('d')) {
            let n: u8 = rest.parse().map_err(|_| {
                OceanError::InvalidParameter {
                    param: "time".to_string(),
                    message: format!("bad relative day selector: {}", trimmed),
                }
            })?;
            if !(1..=3).contains(&n) {
                return Err(OceanError::InvalidParameter {
                    param: "time".to_string(),
                    message: format!("relative day offset must be 1-3, got {}", n),
                });
            }
            return Ok(TimeSelector::DaysAgo(n));
        }

        let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
            OceanError::InvalidParameter {
                param: "time".to_string(),
                message: format!("unrecognized time selector: {}", trimmed),
            }
        })?;
        Ok(TimeSelector::Date(date))
    }

    /// Whether this selector permits the today/-1d/-2d fallback chain.
    /// Explicit means explicit: dates and fixed offsets probe exactly once.
    pub fn allows_fallback(&self) -> bool {
        matches!(self, TimeSelector::Latest | TimeSelector::Today)
    }

    /// A stable key fragment for caching resolution results.
    pub fn cache_key(&self) -> String {
        match self {
            TimeSelector::Latest => "latest".to_string(),
            TimeSelector::Today => "today".to_string(),
            TimeSelector::DaysAgo(n) => format!("-{}d", n),
            TimeSelector::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

impl std::fmt::Display for TimeSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.cache_key())
    }
}

/// The concrete upstream time argument, plus how far back probing had to go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTime {
    /// Upstream time parameter: midnight UTC in ISO 8601
    pub token: String,
    pub date: NaiveDate,
    /// 0 = exact match; 1 = yesterday; 2 = two days back
    pub fallback_depth: u8,
}

impl ResolvedTime {
    pub fn new(date: NaiveDate, fallback_depth: u8) -> Self {
        Self {
            token: time_token(date),
            date,
            fallback_depth,
        }
    }

    /// Human label for annotating results ("today", "2 days ago", ...).
    pub fn label(&self) -> String {
        let today = utc_today();
        let days_back = (today - self.date).num_days();
        match days_back {
            i64::MIN..=-1 => self.date.format("%Y-%m-%d").to_string(),
            0 => "today".to_string(),
            1 => "yesterday".to_string(),
            n => format!("{} days ago", n),
        }
    }
}

/// Today's date in UTC. The upstream publishes one raster per UTC day.
pub fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

/// The calendar date n days before today (UTC).
pub fn utc_days_ago(n: u8) -> NaiveDate {
    utc_today() - Duration::days(n as i64)
}

/// Format a date as the upstream's midnight-UTC time parameter.
pub fn time_token(date: NaiveDate) -> String {
    format!("{}T00:00:00Z", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selectors() {
        assert_eq!(TimeSelector::parse("latest").unwrap(), TimeSelector::Latest);
        assert_eq!(TimeSelector::parse("TODAY").unwrap(), TimeSelector::Today);
        assert_eq!(TimeSelector::parse("-2d").unwrap(), TimeSelector::DaysAgo(2));
        assert_eq!(
            TimeSelector::parse("2026-08-15").unwrap(),
            TimeSelector::Date(NaiveDate::from_ymd_opt(2026, 8, 15).unwrap())
        );
        assert_eq!(TimeSelector::parse("").unwrap(), TimeSelector::Latest);
    }

    #[test]
    fn test_parse_rejects_bad_selectors() {
        assert!(TimeSelector::parse("-9d").is_err());
        assert!(TimeSelector::parse("-0d").is_err());
        assert!(TimeSelector::parse("tomorrow").is_err());
        assert!(TimeSelector::parse("08/15/2026").is_err());
    }

    #[test]
    fn test_fallback_policy() {
        assert!(TimeSelector::Latest.allows_fallback());
        assert!(TimeSelector::Today.allows_fallback());
        assert!(!TimeSelector::DaysAgo(1).allows_fallback());
        assert!(!TimeSelector::Date(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()).allows_fallback());
    }

    #[test]
    fn test_time_token_format() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 15).unwrap();
        assert_eq!(time_token(date), "2026-08-15T00:00:00Z");
    }

    #[test]
    fn test_resolved_time_labels() {
        let today = utc_today();
        assert_eq!(ResolvedTime::new(today, 0).label(), "today");
        assert_eq!(ResolvedTime::new(utc_days_ago(1), 1).label(), "yesterday");
        assert_eq!(ResolvedTime::new(utc_days_ago(2), 2).label(), "2 days ago");
    }
}
