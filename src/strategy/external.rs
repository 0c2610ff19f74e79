use super::{ensure_unique_ids, AssignmentStrategy, StrategyError};
use crate::calendar::MonthKey;
use crate::model::{Assignment, Schedule, ShiftKind, StaffId, StaffMember};
use crate::scheduler::{parse_iso_date, AssignOptions};
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Requête envoyée au générateur externe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRequest {
    pub month: MonthKey,
    pub staff: Vec<StaffMember>,
    pub current_schedule: Schedule,
}

/// Réponse brute ; validée champ par champ avant fusion.
///
/// `staffAssignments`, `staffId`, `days`, `date` et `type` sont obligatoires :
/// une réponse sans eux est une erreur du générateur, pas une réponse vide.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResponse {
    pub staff_assignments: Vec<StaffAssignments>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffAssignments {
    pub staff_id: String,
    pub days: Vec<DayEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayEntry {
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub zone: Option<String>,
}

/// Générateur distant (service, script, fichier...).
#[async_trait]
pub trait AssignmentProvider: Send + Sync {
    async fn request(&self, request: &AssignmentRequest) -> anyhow::Result<AssignmentResponse>;
}

/// Lit une réponse déjà calculée depuis un fichier JSON.
#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl AssignmentProvider for JsonFileProvider {
    async fn request(&self, _request: &AssignmentRequest) -> anyhow::Result<AssignmentResponse> {
        let data = fs::read(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        let response = serde_json::from_slice(&data)
            .with_context(|| format!("parsing assignment response {}", self.path.display()))?;
        Ok(response)
    }
}

/// Adaptateur : expose un [`AssignmentProvider`] comme stratégie.
#[derive(Debug, Clone)]
pub struct ExternalStrategy<P> {
    name: String,
    provider: P,
    month: MonthKey,
    timeout: Duration,
    zone: String,
}

impl<P: AssignmentProvider> ExternalStrategy<P> {
    pub fn new(provider: P, month: MonthKey, opts: &AssignOptions) -> Self {
        Self {
            name: "external".to_string(),
            provider,
            month,
            timeout: opts.strategy_timeout,
            zone: opts.external_zone.clone(),
        }
    }

    pub fn with_name<N: Into<String>>(mut self, name: N) -> Self {
        self.name = name.into();
        self
    }

    /// Valide la réponse et la fusionne sur une copie de `current`.
    ///
    /// La première entrée invalide rejette toute la réponse.
    fn merge(
        &self,
        roster: &[StaffMember],
        current: &Schedule,
        response: AssignmentResponse,
    ) -> Result<Schedule, StrategyError> {
        let known: HashSet<&StaffId> = roster.iter().map(|s| &s.id).collect();
        let mut seen: HashSet<(StaffId, chrono::NaiveDate)> = HashSet::new();

        let mut next = current.clone();
        for staff in roster {
            next.ensure_staff(&staff.id);
        }

        for block in response.staff_assignments {
            let staff = StaffId::new(&block.staff_id);
            if !known.contains(&staff) {
                return Err(StrategyError::UnknownStaff(block.staff_id));
            }
            for entry in block.days {
                let date = parse_iso_date(&entry.date)
                    .ok_or_else(|| StrategyError::InvalidDate(entry.date.clone()))?;
                if !self.month.contains(date) {
                    return Err(StrategyError::OutsideMonth {
                        date,
                        month: self.month,
                    });
                }
                let kind = parse_wire_kind(&entry.kind)
                    .ok_or_else(|| StrategyError::InvalidShiftKind(entry.kind.clone()))?;
                if !seen.insert((staff.clone(), date)) {
                    return Err(StrategyError::DuplicateEntry {
                        staff: block.staff_id.clone(),
                        date,
                    });
                }
                let zone = entry
                    .zone
                    .filter(|z| !z.trim().is_empty())
                    .unwrap_or_else(|| self.zone.clone());
                next.insert(&staff, date, Assignment::new(kind, Some(zone)));
            }
        }
        Ok(next)
    }
}

/// Types admis sur le fil : noms complets uniquement, casse indifférente.
fn parse_wire_kind(raw: &str) -> Option<ShiftKind> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "morning" => Some(ShiftKind::Morning),
        "afternoon" => Some(ShiftKind::Afternoon),
        "night" => Some(ShiftKind::Night),
        "off" => Some(ShiftKind::Off),
        _ => None,
    }
}

#[async_trait]
impl<P: AssignmentProvider> AssignmentStrategy for ExternalStrategy<P> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn try_generate(
        &self,
        roster: &[StaffMember],
        current: &Schedule,
    ) -> Result<Schedule, StrategyError> {
        ensure_unique_ids(roster)?;
        let request = AssignmentRequest {
            month: self.month,
            staff: roster.to_vec(),
            current_schedule: current.clone(),
        };

        let response = tokio::time::timeout(self.timeout, self.provider.request(&request))
            .await
            .map_err(|_| StrategyError::Timeout(self.timeout))?
            .map_err(StrategyError::Provider)?;

        let schedule = self.merge(roster, current, response)?;
        info!(
            strategy = %self.name,
            month = %self.month,
            cells = schedule.len(),
            "external schedule accepted"
        );
        Ok(schedule)
    }
}
