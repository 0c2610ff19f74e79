mod assignment;
pub mod availability;
mod conflicts;
mod mutate;
mod types;

pub use assignment::{RotationAssigner, RotationCursor, RotationOutcome, RotationRun};
pub use availability::{check_availability, is_available};
pub use conflicts::{conflicts, flag_conflicts};
pub use types::{
    AssignOptions, Availability, Conflict, SchedError, Slot, UnavailabilityReason,
};

pub(crate) use mutate::parse_iso_date;
