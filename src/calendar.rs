use crate::scheduler::SchedError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Jour du mois ciblé, produit une seule fois par génération.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    /// 0 = dimanche .. 6 = samedi
    pub weekday: u8,
    pub day_of_month: u8,
}

impl CalendarDay {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            date,
            weekday: date.weekday().num_days_from_sunday() as u8,
            day_of_month: date.day() as u8,
        }
    }
}

/// Clé de mois `YYYY-MM` utilisée par l'historique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// `month` de 1 à 12.
    pub fn new(year: i32, month: u32) -> Result<Self, SchedError> {
        if !(1..=12).contains(&month) || !(0..=9999).contains(&year) {
            return Err(SchedError::InvalidMonth { year, month });
        }
        Ok(Self { year, month })
    }

    /// `month0` de 0 (janvier) à 11 (décembre).
    pub fn from_zero_based(year: i32, month0: u32) -> Result<Self, SchedError> {
        let month = month0
            .checked_add(1)
            .ok_or(SchedError::InvalidMonth { year, month: month0 })?;
        Self::new(year, month)
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Mois de 1 à 12.
    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // bornes validées à la construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Tous les jours du mois, du 1er au dernier, dans l'ordre.
    pub fn days(&self) -> Vec<CalendarDay> {
        self.first_day()
            .iter_days()
            .take_while(|d| self.contains(*d))
            .map(CalendarDay::from_date)
            .collect()
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = SchedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SchedError::InvalidMonthKey(s.to_string());
        let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
        if y.len() != 4 || m.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        MonthKey::new(year, month).map_err(|_| invalid())
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Développe un mois (index 0..=11) en la liste ordonnée de ses jours.
pub fn expand_month(year: i32, month0: u32) -> Result<Vec<CalendarDay>, SchedError> {
    Ok(MonthKey::from_zero_based(year, month0)?.days())
}
