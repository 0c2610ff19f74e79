use crate::calendar::{CalendarDay, MonthKey};
use crate::model::{AssignmentPatch, Schedule, StaffId, StaffMember};
use crate::report;
use crate::scheduler::{flag_conflicts, SchedError, Slot};
use crate::storage::ScheduleHistoryStore;
use crate::strategy::{AssignmentStrategy, StrategyError};
use chrono::NaiveDate;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

#[derive(Debug, Clone)]
struct DraftState {
    days: Vec<CalendarDay>,
    schedule: Schedule,
}

/// Bilan d'une génération.
#[derive(Debug)]
pub struct GenerationReport {
    pub schedule: Schedule,
    pub conflicts: usize,
    pub unfilled: Vec<Slot>,
    /// Renseigné si la stratégie a échoué ; le brouillon est alors inchangé.
    pub failure: Option<StrategyError>,
}

impl GenerationReport {
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

/// Session d'édition d'un mois : brouillon + drapeau « génération en cours ».
///
/// Une seule génération à la fois ; les autres demandes sont refusées avec
/// [`SchedError::GenerationInProgress`].
#[derive(Debug)]
pub struct ScheduleSession {
    month: MonthKey,
    state: Mutex<DraftState>,
    generating: AtomicBool,
}

struct GeneratingGuard<'a>(&'a AtomicBool);

impl Drop for GeneratingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ScheduleSession {
    pub fn new(month: MonthKey, roster: &[StaffMember]) -> Self {
        Self::from_parts(month, month.days(), Schedule::for_roster(roster))
    }

    pub fn from_parts(month: MonthKey, days: Vec<CalendarDay>, schedule: Schedule) -> Self {
        Self {
            month,
            state: Mutex::new(DraftState { days, schedule }),
            generating: AtomicBool::new(false),
        }
    }

    pub fn month(&self) -> MonthKey {
        self.month
    }

    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::Acquire)
    }

    pub fn days(&self) -> Vec<CalendarDay> {
        self.lock().days.clone()
    }

    /// Copie du brouillon courant.
    pub fn draft(&self) -> Schedule {
        self.lock().schedule.clone()
    }

    fn lock(&self) -> MutexGuard<'_, DraftState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Verrouille le brouillon, à condition qu'aucune génération ne tourne.
    ///
    /// Le drapeau est lu sous le verrou, où `generate` le pose aussi.
    fn lock_idle(&self) -> Result<MutexGuard<'_, DraftState>, SchedError> {
        let state = self.lock();
        if self.is_generating() {
            return Err(SchedError::GenerationInProgress);
        }
        Ok(state)
    }

    /// Lance `strategy` sur un instantané du brouillon.
    ///
    /// En cas d'échec de la stratégie, le brouillon reste tel quel et
    /// l'erreur est rapportée dans `failure`.
    pub async fn generate(
        &self,
        strategy: &dyn AssignmentStrategy,
        roster: &[StaffMember],
    ) -> Result<GenerationReport, SchedError> {
        let (_guard, current, days) = {
            let state = self.lock();
            if self.generating.swap(true, Ordering::AcqRel) {
                return Err(SchedError::GenerationInProgress);
            }
            let guard = GeneratingGuard(&self.generating);
            (guard, state.schedule.clone(), state.days.clone())
        };

        match strategy.try_generate(roster, &current).await {
            Ok(mut schedule) => {
                let conflicts = flag_conflicts(&mut schedule, roster);
                let unfilled = report::unfilled_slots(&schedule, &days);
                self.lock().schedule = schedule.clone();
                info!(
                    strategy = strategy.name(),
                    month = %self.month,
                    conflicts,
                    unfilled = unfilled.len(),
                    "draft regenerated"
                );
                Ok(GenerationReport {
                    schedule,
                    conflicts,
                    unfilled,
                    failure: None,
                })
            }
            Err(err) => {
                warn!(strategy = strategy.name(), error = %err, "generation failed, draft kept");
                let unfilled = report::unfilled_slots(&current, &days);
                let conflicts = current.assignments().filter(|(_, _, a)| a.conflict).count();
                Ok(GenerationReport {
                    schedule: current,
                    conflicts,
                    unfilled,
                    failure: Some(err),
                })
            }
        }
    }

    /// Édition manuelle d'une case (fusion partielle).
    pub fn apply_patch(
        &self,
        staff: &StaffId,
        date: NaiveDate,
        patch: AssignmentPatch,
    ) -> Result<(), SchedError> {
        let mut state = self.lock_idle()?;
        if !state.schedule.contains_staff(staff) {
            return Err(SchedError::UnknownStaff(staff.to_string()));
        }
        state.schedule.apply_patch(staff, date, patch);
        Ok(())
    }

    /// Change la date affichée à la position `index` et y déplace les cases.
    ///
    /// Une date déjà présente dans une autre colonne est refusée.
    pub fn remap_day(&self, index: usize, new_raw: &str) -> Result<CalendarDay, SchedError> {
        let mut state = self.lock_idle()?;
        let old = state
            .days
            .get(index)
            .map(|d| d.date)
            .ok_or(SchedError::DayOutOfRange(index))?;

        let mut schedule = state.schedule.clone();
        let (new, _) = schedule.remap_date(old, new_raw)?;
        if state
            .days
            .iter()
            .enumerate()
            .any(|(i, d)| i != index && d.date == new)
        {
            return Err(SchedError::DuplicateDay(new));
        }
        let day = CalendarDay::from_date(new);
        state.schedule = schedule;
        state.days[index] = day;
        Ok(day)
    }

    /// Réapplique le contrôle des indisponibilités sur le brouillon.
    pub fn recheck(&self, roster: &[StaffMember]) -> Result<usize, SchedError> {
        let mut state = self.lock_idle()?;
        Ok(flag_conflicts(&mut state.schedule, roster))
    }

    /// Enregistre une copie du brouillon dans l'historique.
    pub fn commit<S: ScheduleHistoryStore + ?Sized>(
        &self,
        store: &mut S,
    ) -> Result<MonthKey, SchedError> {
        let snapshot = self.lock_idle()?.schedule.clone();
        store.commit(self.month, &snapshot)?;
        info!(month = %self.month, cells = snapshot.len(), "draft committed");
        Ok(self.month)
    }
}
