use super::SchedError;
use crate::model::Schedule;
use chrono::NaiveDate;
use tracing::debug;

pub(crate) fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

impl Schedule {
    /// Déplace toutes les cases de `old` vers la date `new_raw` (ISO).
    ///
    /// Tout est vérifié avant la moindre écriture : une cible illisible ou
    /// une date cible déjà occupée par quiconque laisse le planning intact,
    /// ce qui garantit qu'un aller-retour restaure le planning.
    /// Renvoie la nouvelle date et le nombre de cases déplacées.
    pub fn remap_date(
        &mut self,
        old: NaiveDate,
        new_raw: &str,
    ) -> Result<(NaiveDate, usize), SchedError> {
        let new = parse_iso_date(new_raw)
            .ok_or_else(|| SchedError::InvalidCalendarRemap(new_raw.to_string()))?;
        if new == old {
            return Ok((new, 0));
        }

        let rows = self.rows_mut();
        if let Some((staff, _)) = rows
            .iter()
            .find(|(_, days)| days.contains_key(&new))
        {
            return Err(SchedError::RemapCollision {
                staff: staff.clone(),
                date: new,
            });
        }

        let mut moved = 0usize;
        for days in rows.values_mut() {
            if let Some(cell) = days.remove(&old) {
                days.insert(new, cell);
                moved += 1;
            }
        }
        debug!(%old, %new, moved, "calendar day remapped");
        Ok((new, moved))
    }
}
