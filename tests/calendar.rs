#![forbid(unsafe_code)]
use chrono::NaiveDate;
use roulement::{expand_month, CalendarDay, MonthKey, SchedError};

#[test]
fn june_2024_has_thirty_ordered_days() {
    let days = expand_month(2024, 5).unwrap();
    assert_eq!(days.len(), 30);
    assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    assert_eq!(days[29].date, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
    // 1er juin 2024 : samedi
    assert_eq!(days[0].weekday, 6);
    assert_eq!(days[1].weekday, 0);

    for (i, pair) in days.windows(2).enumerate() {
        assert_eq!(pair[0].day_of_month as usize, i + 1);
        assert_eq!(pair[0].date.succ_opt().unwrap(), pair[1].date);
    }
}

#[test]
fn february_follows_leap_years() {
    assert_eq!(expand_month(2024, 1).unwrap().len(), 29);
    assert_eq!(expand_month(2023, 1).unwrap().len(), 28);
    assert_eq!(expand_month(2000, 1).unwrap().len(), 29);
    assert_eq!(expand_month(1900, 1).unwrap().len(), 28);
}

#[test]
fn december_stops_at_year_end() {
    let days = expand_month(2024, 11).unwrap();
    assert_eq!(days.len(), 31);
    assert_eq!(days.last().unwrap().date, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
}

#[test]
fn out_of_range_month_index_is_rejected() {
    assert!(matches!(
        expand_month(2024, 12),
        Err(SchedError::InvalidMonth { .. })
    ));
}

#[test]
fn expansion_is_deterministic() {
    assert_eq!(expand_month(2025, 2).unwrap(), expand_month(2025, 2).unwrap());
}

#[test]
fn month_key_formats_and_parses() {
    let key = MonthKey::from_zero_based(2024, 5).unwrap();
    assert_eq!(key.to_string(), "2024-06");
    assert_eq!("2024-06".parse::<MonthKey>().unwrap(), key);
    assert_eq!(MonthKey::new(987, 1).unwrap().to_string(), "0987-01");

    for bad in ["2024-6", "24-06", "2024-13", "2024/06", "june"] {
        assert!(bad.parse::<MonthKey>().is_err(), "{bad} should be rejected");
    }
}

#[test]
fn month_key_serializes_as_string() {
    let key = MonthKey::new(2024, 6).unwrap();
    assert_eq!(serde_json::to_string(&key).unwrap(), "\"2024-06\"");
    let back: MonthKey = serde_json::from_str("\"2024-06\"").unwrap();
    assert_eq!(back, key);
}

#[test]
fn calendar_day_from_date_tags_weekday() {
    let sunday = CalendarDay::from_date(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
    assert_eq!(sunday.weekday, 0);
    assert_eq!(sunday.day_of_month, 2);
}
