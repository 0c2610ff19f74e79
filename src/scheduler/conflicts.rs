use super::{availability, Availability, Conflict};
use crate::calendar::CalendarDay;
use crate::model::{Schedule, StaffId, StaffMember};
use std::collections::HashMap;
use tracing::debug;

/// Annote chaque garde travaillée qui tombe sur une indisponibilité.
///
/// Ne crée, ne supprime et ne modifie aucune case hors `conflict` et
/// `conflict_reason`. Idempotent. Renvoie le nombre de cases signalées.
pub fn flag_conflicts(schedule: &mut Schedule, roster: &[StaffMember]) -> usize {
    let by_id: HashMap<&StaffId, &StaffMember> = roster.iter().map(|s| (&s.id, s)).collect();
    let mut flagged = 0usize;

    for (staff_id, date, assignment) in schedule.assignments_mut() {
        let Some(staff) = by_id.get(staff_id) else {
            continue;
        };
        if !assignment.kind.is_working() {
            assignment.conflict = false;
            assignment.conflict_reason = None;
            continue;
        }
        match availability::check_availability(staff, &CalendarDay::from_date(date)) {
            Availability::Available => {
                assignment.conflict = false;
                assignment.conflict_reason = None;
            }
            Availability::Unavailable(reason) => {
                assignment.conflict = true;
                assignment.conflict_reason = Some(reason);
                flagged += 1;
            }
        }
    }

    debug!(flagged, "conflict pass finished");
    flagged
}

/// Liste les cases déjà signalées.
pub fn conflicts(schedule: &Schedule) -> Vec<Conflict> {
    schedule
        .assignments()
        .filter(|(_, _, a)| a.conflict)
        .filter_map(|(staff, date, a)| {
            a.conflict_reason.map(|reason| Conflict {
                staff: staff.clone(),
                date,
                kind: a.kind,
                reason,
            })
        })
        .collect()
}
