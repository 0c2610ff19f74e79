use crate::calendar::CalendarDay;
use crate::model::{Schedule, ShiftKind, StaffId, StaffMember};
use crate::scheduler::Slot;
use std::collections::BTreeMap;

/// Durée forfaitaire d'une garde travaillée.
pub const HOURS_PER_SHIFT: u32 = 8;

/// Créneaux (jour, type) que personne ne tient.
///
/// Un créneau non pourvu n'est pas une erreur : c'est la seule façon de
/// détecter un sous-effectif.
pub fn unfilled_slots(schedule: &Schedule, days: &[CalendarDay]) -> Vec<Slot> {
    days.iter()
        .flat_map(|day| {
            ShiftKind::ROTATION.into_iter().map(move |kind| Slot {
                date: day.date,
                kind,
            })
        })
        .filter(|slot| schedule.holder_of(slot.date, slot.kind).is_none())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffStats {
    pub staff: StaffId,
    pub name: String,
    pub shifts: u32,
    pub hours: u32,
    pub by_kind: BTreeMap<ShiftKind, u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleStats {
    pub total_hours: u32,
    pub conflicts: u32,
    pub staff: Vec<StaffStats>,
}

impl ScheduleStats {
    /// Totaux par personne, dans l'ordre du roster.
    pub fn compute(schedule: &Schedule, roster: &[StaffMember]) -> Self {
        let mut stats = ScheduleStats::default();
        for member in roster {
            let mut row = StaffStats {
                staff: member.id.clone(),
                name: member.name.clone(),
                shifts: 0,
                hours: 0,
                by_kind: BTreeMap::new(),
            };
            for cell in schedule.staff_entries(&member.id).into_iter().flat_map(|d| d.values()) {
                *row.by_kind.entry(cell.kind).or_default() += 1;
                if cell.kind.is_working() {
                    row.shifts += 1;
                }
            }
            row.hours = row.shifts * HOURS_PER_SHIFT;
            stats.total_hours += row.hours;
            stats.staff.push(row);
        }
        stats.conflicts = schedule.assignments().filter(|(_, _, a)| a.conflict).count() as u32;
        stats
    }
}
