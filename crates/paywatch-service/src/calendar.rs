//! Day-of-month arithmetic for monthly due dates.

use chrono::{Datelike, Days, NaiveDate};

const TURKISH_MONTHS: [&str; 12] = [
    "Ocak", "Şubat", "Mart", "Nisan", "Mayıs", "Haziran", "Temmuz", "Ağustos", "Eylül", "Ekim",
    "Kasım", "Aralık",
];

/// Number of days in `month` of `year`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

/// Days from `current_day` until the next occurrence of `due_day`.
///
/// A due day earlier in the month than today wraps into next month.
pub fn days_until(current_day: u32, due_day: u32, days_in_current_month: u32) -> u32 {
    if due_day >= current_day {
        due_day - current_day
    } else {
        days_in_current_month - current_day + due_day
    }
}

/// Clamp a configured due day to the length of the month.
pub fn effective_due_day(due_day: u32, year: i32, month: u32) -> u32 {
    due_day.clamp(1, days_in_month(year, month))
}

/// Days until `due_day` as seen from `today`, honoring short months.
///
/// The due day is clamped to the month length first, so on 25 February a
/// bill due on the 30th is 3 days away rather than 5. The plain
/// `due_day - current_day` difference would overshoot the month end.
pub fn days_until_due(today: NaiveDate, due_day: u32) -> u32 {
    let dim = days_in_month(today.year(), today.month());
    days_until(today.day(), due_day.min(dim), dim)
}

/// The calendar date `days` after `today`.
pub fn date_after(today: NaiveDate, days: u32) -> NaiveDate {
    today
        .checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(today)
}

/// The due date in the same month as `today`.
pub fn due_date_in_month(today: NaiveDate, due_day: u32) -> NaiveDate {
    let day = effective_due_day(due_day, today.year(), today.month());
    today.with_day(day).unwrap_or(today)
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Turkish month name (`1` = Ocak).
pub fn turkish_month_name(month: u32) -> &'static str {
    TURKISH_MONTHS
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_until_stays_in_range() {
        for dim in 28..=31 {
            for current in 1..=dim {
                for due in 1..=31 {
                    let d = days_until(current, due.min(dim), dim);
                    assert!(d <= 30, "current={current} due={due} dim={dim} gave {d}");
                }
            }
        }
    }

    #[test]
    fn test_days_until_wraps_month() {
        assert_eq!(days_until(30, 2, 31), 3);
        assert_eq!(days_until(12, 15, 30), 3);
        assert_eq!(days_until(15, 15, 30), 0);
        assert_eq!(days_until(31, 1, 31), 1);
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2026, 2), 28);
        assert_eq!(days_in_month(2028, 2), 29);
        assert_eq!(days_in_month(2026, 9), 30);
        assert_eq!(days_in_month(2026, 12), 31);
    }

    #[test]
    fn test_short_month_clamps_due_day() {
        assert_eq!(days_until_due(date(2026, 2, 28), 31), 0);
        assert_eq!(days_until_due(date(2026, 2, 25), 30), 3);
        assert_eq!(due_date_in_month(date(2026, 4, 10), 31), date(2026, 4, 30));
    }

    #[test]
    fn test_date_after_crosses_month() {
        let today = date(2026, 9, 29);
        assert_eq!(date_after(today, days_until_due(today, 2)), date(2026, 10, 2));
    }

    #[test]
    fn test_month_names() {
        assert_eq!(turkish_month_name(1), "Ocak");
        assert_eq!(turkish_month_name(9), "Eylül");
        assert_eq!(turkish_month_name(13), "");
    }
}
