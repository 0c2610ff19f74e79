//! Contrat commun aux générateurs de planning.
//!
//! Deux implémentations : [`RotationStrategy`] (rotation intégrée,
//! déterministe) et [`ExternalStrategy`] (adaptateur vers un générateur
//! distant). Quelle que soit la provenance, la sortie peut être passée à
//! [`crate::scheduler::flag_conflicts`].

mod external;

pub use external::{
    AssignmentProvider, AssignmentRequest, AssignmentResponse, DayEntry, ExternalStrategy,
    JsonFileProvider, StaffAssignments,
};

use crate::calendar::MonthKey;
use crate::model::{Schedule, StaffMember};
use crate::scheduler::{AssignOptions, RotationAssigner};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("strategy timed out after {0:?}")]
    Timeout(Duration),
    #[error("provider failed: {0:#}")]
    Provider(anyhow::Error),
    #[error("roster contains duplicate staff id: {0}")]
    DuplicateStaff(String),
    #[error("response references unknown staff: {0}")]
    UnknownStaff(String),
    #[error("response contains invalid date: {0}")]
    InvalidDate(String),
    #[error("date {date} is outside month {month}")]
    OutsideMonth { date: NaiveDate, month: MonthKey },
    #[error("response contains invalid shift kind: {0}")]
    InvalidShiftKind(String),
    #[error("response assigns {staff} twice on {date}")]
    DuplicateEntry { staff: String, date: NaiveDate },
}

/// Générateur de planning interchangeable.
#[async_trait]
pub trait AssignmentStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// Produit un planning couvrant au moins chaque membre de `roster`.
    async fn try_generate(
        &self,
        roster: &[StaffMember],
        current: &Schedule,
    ) -> Result<Schedule, StrategyError>;

    /// Variante fermée : en cas d'échec, renvoie `current` tel quel.
    async fn generate(&self, roster: &[StaffMember], current: &Schedule) -> Schedule {
        match self.try_generate(roster, current).await {
            Ok(schedule) => schedule,
            Err(err) => {
                warn!(strategy = self.name(), error = %err, "generation failed, keeping current schedule");
                current.clone()
            }
        }
    }
}

/// Stratégie intégrée : rotation round-robin sur le mois donné.
///
/// Le planning courant n'est pas fusionné ; la rotation repart d'un
/// brouillon vierge.
#[derive(Debug, Clone)]
pub struct RotationStrategy {
    month: MonthKey,
    assigner: RotationAssigner,
}

impl RotationStrategy {
    pub fn new(month: MonthKey, opts: AssignOptions) -> Self {
        Self {
            month,
            assigner: RotationAssigner::new(opts),
        }
    }

    pub fn month(&self) -> MonthKey {
        self.month
    }
}

#[async_trait]
impl AssignmentStrategy for RotationStrategy {
    fn name(&self) -> &str {
        "rotation"
    }

    async fn try_generate(
        &self,
        roster: &[StaffMember],
        _current: &Schedule,
    ) -> Result<Schedule, StrategyError> {
        ensure_unique_ids(roster)?;
        let days = self.month.days();
        let outcome = self.assigner.run(roster, &days);
        info!(
            month = %self.month,
            assigned = outcome.schedule.len(),
            unfilled = outcome.unfilled.len(),
            "rotation schedule generated"
        );
        Ok(outcome.schedule)
    }
}

pub(crate) fn ensure_unique_ids(roster: &[StaffMember]) -> Result<(), StrategyError> {
    let mut seen = HashSet::with_capacity(roster.len());
    for staff in roster {
        if !seen.insert(&staff.id) {
            return Err(StrategyError::DuplicateStaff(staff.id.to_string()));
        }
    }
    Ok(())
}
