use crate::calendar::{CalendarDay, MonthKey};
use crate::model::{Schedule, StaffMember};
use crate::session::ScheduleSession;
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Historique des plannings validés, indexé par mois.
///
/// Une nouvelle validation du même mois écrase la précédente, sans fusion.
pub trait ScheduleHistoryStore {
    fn commit(&mut self, month: MonthKey, schedule: &Schedule) -> anyhow::Result<()>;
    fn get(&self, month: MonthKey) -> anyhow::Result<Option<Schedule>>;
    fn months(&self) -> anyhow::Result<Vec<MonthKey>>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryHistoryStore {
    months: BTreeMap<MonthKey, Schedule>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScheduleHistoryStore for InMemoryHistoryStore {
    fn commit(&mut self, month: MonthKey, schedule: &Schedule) -> anyhow::Result<()> {
        self.months.insert(month, schedule.clone());
        Ok(())
    }

    fn get(&self, month: MonthKey) -> anyhow::Result<Option<Schedule>> {
        Ok(self.months.get(&month).cloned())
    }

    fn months(&self) -> anyhow::Result<Vec<MonthKey>> {
        Ok(self.months.keys().copied().collect())
    }
}

/// Historique dans un unique fichier JSON `{ "YYYY-MM": planning }`.
pub struct JsonHistoryStore {
    path: PathBuf,
}

impl JsonHistoryStore {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }

    fn load_all(&self) -> anyhow::Result<BTreeMap<MonthKey, Schedule>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        read_json(&self.path)
    }
}

impl ScheduleHistoryStore for JsonHistoryStore {
    fn commit(&mut self, month: MonthKey, schedule: &Schedule) -> anyhow::Result<()> {
        let mut all = self.load_all()?;
        all.insert(month, schedule.clone());
        write_json_atomic(&self.path, &all)
    }

    fn get(&self, month: MonthKey) -> anyhow::Result<Option<Schedule>> {
        Ok(self.load_all()?.remove(&month))
    }

    fn months(&self) -> anyhow::Result<Vec<MonthKey>> {
        Ok(self.load_all()?.into_keys().collect())
    }
}

/// Brouillon persisté entre deux commandes CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftFile {
    pub month: MonthKey,
    pub days: Vec<CalendarDay>,
    pub schedule: Schedule,
}

impl DraftFile {
    pub fn from_session(session: &ScheduleSession) -> Self {
        Self {
            month: session.month(),
            days: session.days(),
            schedule: session.draft(),
        }
    }

    pub fn into_session(self) -> ScheduleSession {
        ScheduleSession::from_parts(self.month, self.days, self.schedule)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        read_json(path.as_ref())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        write_json_atomic(path.as_ref(), self)
    }
}

/// Charge le personnel et vérifie chaque fiche comme à l'import CSV.
pub fn load_staff<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<StaffMember>> {
    let path = path.as_ref();
    let staff: Vec<StaffMember> = read_json(path)?;
    for member in &staff {
        member
            .validate()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("invalid staff record {} in {}", member.id, path.display()))?;
    }
    Ok(staff)
}

pub fn save_staff<P: AsRef<Path>>(path: P, staff: &[StaffMember]) -> anyhow::Result<()> {
    write_json_atomic(path.as_ref(), &staff)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing {}", path.display()))
}

/// Écriture atomique : fichier temporaire voisin puis renommage.
fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_vec_pretty(value)?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
    tmp.write_all(&json)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).with_context(|| "atomic rename")?;
    Ok(())
}
