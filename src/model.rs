use crate::scheduler::UnavailabilityReason;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifiant fort pour StaffMember
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StaffId(String);

impl StaffId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StaffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Membre du personnel, fourni par l'annuaire externe (lecture seule ici).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: StaffId,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub senior: bool,
    /// Dates précises où la personne ne peut pas travailler (congés).
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub unavailable_dates: BTreeSet<NaiveDate>,
    /// Jours de semaine exclus, 0 = dimanche .. 6 = samedi.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub unavailable_weekdays: BTreeSet<u8>,
    /// Jours du mois jugés pratiques (1..=31). Indicatif, jamais bloquant.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub preferred_days: BTreeSet<u8>,
}

impl StaffMember {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self::with_id(StaffId::random(), name)
    }

    pub fn with_id<I: Into<StaffId>, N: Into<String>>(id: I, name: N) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: String::new(),
            department: String::new(),
            senior: false,
            unavailable_dates: BTreeSet::new(),
            unavailable_weekdays: BTreeSet::new(),
            preferred_days: BTreeSet::new(),
        }
    }

    pub fn unavailable_on(mut self, date: NaiveDate) -> Self {
        self.unavailable_dates.insert(date);
        self
    }

    pub fn never_on_weekday(mut self, weekday: u8) -> Self {
        self.unavailable_weekdays.insert(weekday);
        self
    }

    pub fn prefers_day(mut self, day_of_month: u8) -> Self {
        self.preferred_days.insert(day_of_month);
        self
    }

    /// Vérifie les bornes des index de jours.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.as_str().trim().is_empty() {
            return Err("staff id cannot be empty".to_string());
        }
        if let Some(w) = self.unavailable_weekdays.iter().find(|w| **w > 6) {
            return Err(format!("weekday index out of range (0..=6): {w}"));
        }
        if let Some(d) = self
            .preferred_days
            .iter()
            .find(|d| !(1..=31).contains(*d))
        {
            return Err(format!("day of month out of range (1..=31): {d}"));
        }
        Ok(())
    }
}

impl From<&str> for StaffId {
    fn from(s: &str) -> Self {
        StaffId::new(s)
    }
}

impl From<String> for StaffId {
    fn from(s: String) -> Self {
        StaffId(s)
    }
}

/// Type de garde
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftKind {
    Morning,
    Afternoon,
    Night,
    Off,
    Leave,
    Empty,
}

impl ShiftKind {
    /// Ordre fixe de remplissage d'une journée.
    pub const ROTATION: [ShiftKind; 3] = [ShiftKind::Morning, ShiftKind::Afternoon, ShiftKind::Night];

    pub fn is_working(self) -> bool {
        matches!(self, ShiftKind::Morning | ShiftKind::Afternoon | ShiftKind::Night)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShiftKind::Morning => "MORNING",
            ShiftKind::Afternoon => "AFTERNOON",
            ShiftKind::Night => "NIGHT",
            ShiftKind::Off => "OFF",
            ShiftKind::Leave => "LEAVE",
            ShiftKind::Empty => "EMPTY",
        }
    }
}

impl fmt::Display for ShiftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShiftKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "morning" | "m" => Ok(ShiftKind::Morning),
            "afternoon" | "a" => Ok(ShiftKind::Afternoon),
            "night" | "n" => Ok(ShiftKind::Night),
            "off" | "o" => Ok(ShiftKind::Off),
            "leave" => Ok(ShiftKind::Leave),
            "empty" => Ok(ShiftKind::Empty),
            other => Err(format!("unknown shift kind: {other}")),
        }
    }
}

/// Case du planning pour un couple (personne, date).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub kind: ShiftKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(default)]
    pub conflict: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict_reason: Option<UnavailabilityReason>,
}

impl Assignment {
    pub fn new(kind: ShiftKind, zone: Option<String>) -> Self {
        Self {
            kind,
            zone,
            conflict: false,
            conflict_reason: None,
        }
    }

    /// Case vide, point de départ d'une édition manuelle.
    pub fn empty() -> Self {
        Self::new(ShiftKind::Empty, None)
    }
}

/// Mise à jour partielle : seuls les champs `Some` sont appliqués.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentPatch {
    pub kind: Option<ShiftKind>,
    pub zone: Option<Option<String>>,
    pub conflict: Option<bool>,
    pub conflict_reason: Option<Option<UnavailabilityReason>>,
}

impl AssignmentPatch {
    pub fn kind(kind: ShiftKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn with_zone<Z: Into<String>>(mut self, zone: Z) -> Self {
        self.zone = Some(Some(zone.into()));
        self
    }

    fn merge_into(self, target: &mut Assignment) {
        if let Some(kind) = self.kind {
            target.kind = kind;
        }
        if let Some(zone) = self.zone {
            target.zone = zone;
        }
        if let Some(conflict) = self.conflict {
            target.conflict = conflict;
        }
        if let Some(reason) = self.conflict_reason {
            target.conflict_reason = reason;
        }
    }
}

/// Planning complet : personne -> (date -> case), triés.
///
/// La structure imbriquée garantit au plus une case par (personne, date).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    entries: BTreeMap<StaffId, BTreeMap<NaiveDate, Assignment>>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Planning vide avec une ligne par membre du roster.
    pub fn for_roster(roster: &[StaffMember]) -> Self {
        let mut schedule = Self::new();
        for staff in roster {
            schedule.ensure_staff(&staff.id);
        }
        schedule
    }

    pub fn ensure_staff(&mut self, staff: &StaffId) {
        self.entries.entry(staff.clone()).or_default();
    }

    pub fn remove_staff(&mut self, staff: &StaffId) -> Option<BTreeMap<NaiveDate, Assignment>> {
        self.entries.remove(staff)
    }

    pub fn contains_staff(&self, staff: &StaffId) -> bool {
        self.entries.contains_key(staff)
    }

    pub fn staff_ids(&self) -> impl Iterator<Item = &StaffId> {
        self.entries.keys()
    }

    pub fn staff_entries(&self, staff: &StaffId) -> Option<&BTreeMap<NaiveDate, Assignment>> {
        self.entries.get(staff)
    }

    pub fn get(&self, staff: &StaffId, date: NaiveDate) -> Option<&Assignment> {
        self.entries.get(staff).and_then(|days| days.get(&date))
    }

    pub fn get_mut(&mut self, staff: &StaffId, date: NaiveDate) -> Option<&mut Assignment> {
        self.entries.get_mut(staff).and_then(|days| days.get_mut(&date))
    }

    /// Vrai si la personne a déjà une case (quel que soit le type) ce jour-là.
    pub fn holds_shift_on(&self, staff: &StaffId, date: NaiveDate) -> bool {
        self.get(staff, date).is_some()
    }

    /// Remplace la case ; renvoie l'ancienne valeur éventuelle.
    pub fn insert(
        &mut self,
        staff: &StaffId,
        date: NaiveDate,
        assignment: Assignment,
    ) -> Option<Assignment> {
        self.entries
            .entry(staff.clone())
            .or_default()
            .insert(date, assignment)
    }

    pub fn remove(&mut self, staff: &StaffId, date: NaiveDate) -> Option<Assignment> {
        self.entries.get_mut(staff).and_then(|days| days.remove(&date))
    }

    /// Fusionne `patch` dans la case existante (ou une case `Empty`).
    pub fn apply_patch(&mut self, staff: &StaffId, date: NaiveDate, patch: AssignmentPatch) {
        let cell = self
            .entries
            .entry(staff.clone())
            .or_default()
            .entry(date)
            .or_insert_with(Assignment::empty);
        patch.merge_into(cell);
    }

    /// Variante copy-on-write de [`Schedule::apply_patch`].
    pub fn patched(&self, staff: &StaffId, date: NaiveDate, patch: AssignmentPatch) -> Self {
        let mut next = self.clone();
        next.apply_patch(staff, date, patch);
        next
    }

    /// Parcourt toutes les cases dans l'ordre (personne, date).
    pub fn assignments(&self) -> impl Iterator<Item = (&StaffId, NaiveDate, &Assignment)> {
        self.entries
            .iter()
            .flat_map(|(staff, days)| days.iter().map(move |(date, a)| (staff, *date, a)))
    }

    pub(crate) fn assignments_mut(
        &mut self,
    ) -> impl Iterator<Item = (&StaffId, NaiveDate, &mut Assignment)> {
        self.entries
            .iter_mut()
            .flat_map(|(staff, days)| days.iter_mut().map(move |(date, a)| (staff, *date, a)))
    }

    /// Personne tenant `kind` à `date`, s'il y en a une.
    pub fn holder_of(&self, date: NaiveDate, kind: ShiftKind) -> Option<&StaffId> {
        self.entries
            .iter()
            .find(|(_, days)| days.get(&date).map(|a| a.kind) == Some(kind))
            .map(|(staff, _)| staff)
    }

    /// Nombre total de cases.
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn rows_mut(&mut self) -> &mut BTreeMap<StaffId, BTreeMap<NaiveDate, Assignment>> {
        &mut self.entries
    }
}
