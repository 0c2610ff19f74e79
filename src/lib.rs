#![forbid(unsafe_code)]
//! Roulement : génération de plannings mensuels de gardes.
//!
//! - Rotation round-robin matin / après-midi / nuit, curseur propre à chaque génération.
//! - Contrôle des congés datés et des jours de semaine exclus.
//! - Générateur interchangeable (rotation intégrée ou service externe), fermé en cas d'échec.
//! - Historique des mois validés en fichier JSON.

pub mod calendar;
pub mod io;
pub mod model;
pub mod report;
pub mod scheduler;
pub mod session;
pub mod storage;
pub mod strategy;

pub use calendar::{expand_month, CalendarDay, MonthKey};
pub use model::{Assignment, AssignmentPatch, Schedule, ShiftKind, StaffId, StaffMember};
pub use report::{unfilled_slots, ScheduleStats};
pub use scheduler::{
    check_availability, flag_conflicts, AssignOptions, Availability, RotationAssigner,
    SchedError, Slot, UnavailabilityReason,
};
pub use session::{GenerationReport, ScheduleSession};
pub use storage::{InMemoryHistoryStore, JsonHistoryStore, ScheduleHistoryStore};
pub use strategy::{
    AssignmentProvider, AssignmentStrategy, ExternalStrategy, JsonFileProvider, RotationStrategy,
    StrategyError,
};
