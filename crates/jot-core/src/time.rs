//! Relative time phrases ("5 minutes ago", "about 2 hours ago") for note cards.
//!
//! Buckets follow the distance-in-words table web clients conventionally
//! use, so a note renders the same phrase here as it did in the browser.

use chrono::{DateTime, Datelike, Timelike, Utc};

const MINUTES_IN_DAY: i64 = 1_440;
const MINUTES_IN_ALMOST_TWO_DAYS: i64 = 2_520;
const MINUTES_IN_MONTH: i64 = 43_200;
const MINUTES_IN_TWO_MONTHS: i64 = 86_400;

/// Describe `timestamp` relative to `now`, with an `ago`/`in` suffix.
pub fn format_relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let (earlier, later, in_future) = if timestamp > now {
        (now, timestamp, true)
    } else {
        (timestamp, now, false)
    };

    let distance = format_distance(earlier, later);
    if in_future {
        format!("in {distance}")
    } else {
        format!("{distance} ago")
    }
}

/// Describe the distance between two instants (`earlier <= later`) in words.
pub fn format_distance(earlier: DateTime<Utc>, later: DateTime<Utc>) -> String {
    let seconds = (later - earlier).num_seconds().max(0);
    let minutes = rounded_div(seconds, 60);

    if minutes < 2 {
        return if minutes == 0 {
            "less than a minute".to_string()
        } else {
            plural(minutes, "minute")
        };
    }
    if minutes < 45 {
        return plural(minutes, "minute");
    }
    if minutes < 90 {
        return "about 1 hour".to_string();
    }
    if minutes < MINUTES_IN_DAY {
        return format!("about {}", plural(rounded_div(minutes, 60), "hour"));
    }
    if minutes < MINUTES_IN_ALMOST_TWO_DAYS {
        return "1 day".to_string();
    }
    if minutes < MINUTES_IN_MONTH {
        return plural(rounded_div(minutes, MINUTES_IN_DAY), "day");
    }
    if minutes < MINUTES_IN_TWO_MONTHS {
        return format!(
            "about {}",
            plural(rounded_div(minutes, MINUTES_IN_MONTH), "month")
        );
    }

    let months = calendar_months_between(earlier, later);
    if months < 12 {
        return plural(rounded_div(minutes, MINUTES_IN_MONTH), "month");
    }

    let years = months / 12;
    let months_into_year = months % 12;
    if months_into_year < 3 {
        format!("about {}", plural(years, "year"))
    } else if months_into_year < 9 {
        format!("over {}", plural(years, "year"))
    } else {
        format!("almost {}", plural(years + 1, "year"))
    }
}

fn calendar_months_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
    let mut months = i64::from(later.year() - earlier.year()) * 12
        + i64::from(later.month())
        - i64::from(earlier.month());

    let later_in_month = (later.day(), later.num_seconds_from_midnight());
    let earlier_in_month = (earlier.day(), earlier.num_seconds_from_midnight());
    if later_in_month < earlier_in_month {
        months -= 1;
    }
    months.max(0)
}

const fn rounded_div(value: i64, divisor: i64) -> i64 {
    (value + divisor / 2) / divisor
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit}")
    } else {
        format!("{count} {unit}s")
    }
}
