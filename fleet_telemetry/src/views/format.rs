//! Display helpers shared by the text report and the tabular export.

use chrono::{DateTime, SecondsFormat, Utc};

/// Placeholder for missing values.
pub const MISSING: &str = "-";

pub fn fmt_number(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.decimals$}"),
        _ => MISSING.to_string(),
    }
}

pub fn fmt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.0}%"),
        _ => MISSING.to_string(),
    }
}

pub fn fmt_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| MISSING.to_string())
}

/// Relative age of `ts` at `now`, in the largest whole unit.
pub fn fmt_age(ts: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(ts) = ts else {
        return MISSING.to_string();
    };
    let delta = now.signed_duration_since(ts);
    if delta.num_milliseconds() < 0 {
        return "now".to_string();
    }
    let minutes = delta.num_minutes();
    let hours = minutes / 60;
    let days = hours / 24;
    if days > 0 {
        format!("{days} days")
    } else if hours > 0 {
        format!("{hours} hours")
    } else if minutes > 0 {
        format!("{minutes} min")
    } else {
        "<1 min".to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    #[test]
    fn numbers_use_fixed_decimals() {
        assert_eq!(fmt_number(Some(12345.0), 1), "12345.0");
        assert_eq!(fmt_number(Some(1000.001), 3), "1000.001");
        assert_eq!(fmt_number(None, 1), "-");
        assert_eq!(fmt_number(Some(f64::NAN), 1), "-");
        assert_eq!(fmt_pct(Some(66.666)), "67%");
    }

    #[test]
    fn ages_pick_largest_unit() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let age = |d: Duration| fmt_age(Some(now - d), now);

        assert_eq!(fmt_age(None, now), "-");
        assert_eq!(fmt_age(Some(now + Duration::seconds(5)), now), "now");
        assert_eq!(age(Duration::seconds(30)), "<1 min");
        assert_eq!(age(Duration::minutes(59)), "59 min");
        assert_eq!(age(Duration::minutes(150)), "2 hours");
        assert_eq!(age(Duration::days(3) + Duration::hours(5)), "3 days");
    }

    #[test]
    fn timestamps_are_rfc3339() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        assert_eq!(fmt_timestamp(Some(ts)), "2024-03-10T12:00:00Z");
        assert_eq!(fmt_timestamp(None), "-");
    }
}
