use super::{availability, AssignOptions, Slot};
use crate::calendar::CalendarDay;
use crate::model::{Assignment, Schedule, ShiftKind, StaffId, StaffMember};
use tracing::debug;

/// Curseur de rotation : index dans le roster, propre à une génération.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationCursor {
    position: usize,
    len: usize,
}

impl RotationCursor {
    pub fn new(len: usize) -> Self {
        Self { position: 0, len }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    fn advance(&mut self) {
        if self.len > 0 {
            self.position = (self.position + 1) % self.len;
        }
    }
}

/// Résultat complet d'une génération par rotation.
#[derive(Debug, Clone)]
pub struct RotationOutcome {
    pub schedule: Schedule,
    pub cursor: RotationCursor,
    pub unfilled: Vec<Slot>,
}

/// Une génération en cours : possède le curseur et le brouillon.
///
/// Le curseur n'est jamais remis à zéro entre deux créneaux ni entre deux
/// jours ; c'est ce qui répartit les gardes sur tout le mois.
#[derive(Debug)]
pub struct RotationRun<'a> {
    roster: &'a [StaffMember],
    zone: String,
    cursor: RotationCursor,
    schedule: Schedule,
    unfilled: Vec<Slot>,
    last_attempts: usize,
}

impl<'a> RotationRun<'a> {
    pub fn new(roster: &'a [StaffMember], opts: &AssignOptions) -> Self {
        Self {
            roster,
            zone: opts.default_zone.clone(),
            cursor: RotationCursor::new(roster.len()),
            schedule: Schedule::for_roster(roster),
            unfilled: Vec::new(),
            last_attempts: 0,
        }
    }

    pub fn cursor(&self) -> RotationCursor {
        self.cursor
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Nombre de candidats proposés lors du dernier `fill_slot`.
    pub fn last_attempts(&self) -> usize {
        self.last_attempts
    }

    /// Cherche au plus `roster.len()` candidats à partir du curseur.
    ///
    /// Le curseur avance après chaque essai, réussi ou non. Sans candidat
    /// éligible, le créneau reste vide.
    pub fn fill_slot(&mut self, day: &CalendarDay, kind: ShiftKind) -> Option<StaffId> {
        let roster = self.roster;
        let schedule = &self.schedule;
        let cursor = &mut self.cursor;
        let mut attempts = 0usize;

        let chosen = (0..roster.len()).find_map(|_| {
            let staff = &roster[cursor.position()];
            cursor.advance();
            attempts += 1;

            if !availability::is_available(staff, day) {
                return None;
            }
            if schedule.holds_shift_on(&staff.id, day.date) {
                return None;
            }
            Some(staff.id.clone())
        });
        self.last_attempts = attempts;

        match &chosen {
            Some(id) => {
                self.schedule.insert(
                    id,
                    day.date,
                    Assignment::new(kind, Some(self.zone.clone())),
                );
            }
            None => self.unfilled.push(Slot {
                date: day.date,
                kind,
            }),
        }
        chosen
    }

    /// Remplit matin, après-midi puis nuit pour `day`.
    pub fn fill_day(&mut self, day: &CalendarDay) {
        for kind in ShiftKind::ROTATION {
            self.fill_slot(day, kind);
        }
    }

    pub fn finish(self) -> RotationOutcome {
        RotationOutcome {
            schedule: self.schedule,
            cursor: self.cursor,
            unfilled: self.unfilled,
        }
    }
}

/// Allocateur round-robin intégré.
#[derive(Debug, Clone, Default)]
pub struct RotationAssigner {
    opts: AssignOptions,
}

impl RotationAssigner {
    pub fn new(opts: AssignOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &AssignOptions {
        &self.opts
    }

    pub fn assign(&self, roster: &[StaffMember], days: &[CalendarDay]) -> Schedule {
        self.run(roster, days).schedule
    }

    pub fn run(&self, roster: &[StaffMember], days: &[CalendarDay]) -> RotationOutcome {
        let mut run = RotationRun::new(roster, &self.opts);
        for day in days {
            run.fill_day(day);
        }
        let outcome = run.finish();
        debug!(
            staff = roster.len(),
            days = days.len(),
            assigned = outcome.schedule.len(),
            unfilled = outcome.unfilled.len(),
            "rotation run finished"
        );
        outcome
    }
}
