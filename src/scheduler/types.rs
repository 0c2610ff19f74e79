use crate::model::{ShiftKind, StaffId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Options de génération
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignOptions {
    /// Zone posée sur chaque case produite par la rotation.
    pub default_zone: String,
    /// Zone utilisée quand un générateur externe n'en fournit pas.
    pub external_zone: String,
    /// Délai maximal accordé à un générateur externe.
    pub strategy_timeout: Duration,
}

impl Default for AssignOptions {
    fn default() -> Self {
        Self {
            default_zone: "Nursing Division".to_string(),
            external_zone: "ER Zone".to_string(),
            strategy_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailabilityReason {
    ExplicitDateLeave,
    WeekdayBlackout,
}

impl UnavailabilityReason {
    pub fn as_str(self) -> &'static str {
        match self {
            UnavailabilityReason::ExplicitDateLeave => "explicit_date_leave",
            UnavailabilityReason::WeekdayBlackout => "weekday_blackout",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    Unavailable(UnavailabilityReason),
}

impl Availability {
    pub fn is_available(self) -> bool {
        matches!(self, Availability::Available)
    }
}

/// Case signalée par le contrôle des indisponibilités.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub staff: StaffId,
    pub date: NaiveDate,
    pub kind: ShiftKind,
    pub reason: UnavailabilityReason,
}

/// Couple (jour, type de garde) à pourvoir.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot {
    pub date: NaiveDate,
    pub kind: ShiftKind,
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("invalid month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
    #[error("invalid month key (expected YYYY-MM): {0}")]
    InvalidMonthKey(String),
    #[error("invalid staff record: {0}")]
    InvalidStaff(String),
    #[error("unknown staff: {0}")]
    UnknownStaff(String),
    #[error("invalid calendar remap target: {0}")]
    InvalidCalendarRemap(String),
    #[error("remap collision: {staff} already holds {date}")]
    RemapCollision { staff: StaffId, date: NaiveDate },
    #[error("date already shown in the grid: {0}")]
    DuplicateDay(NaiveDate),
    #[error("day index out of range: {0}")]
    DayOutOfRange(usize),
    #[error("a generation run is already in progress")]
    GenerationInProgress,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
