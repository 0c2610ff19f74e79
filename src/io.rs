use crate::model::{Schedule, StaffId, StaffMember};
use crate::scheduler::parse_iso_date;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::{ReaderBuilder, Terminator, WriterBuilder};
use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Import du personnel depuis CSV:
/// header `id,name,role,department,senior,unavailable_dates,unavailable_weekdays,preferred_days`
///
/// Seul `name` est obligatoire ; un `id` vide reçoit un UUID. Les listes sont
/// séparées par `;`.
pub fn import_staff_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<StaffMember>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let cell = |i: usize| rec.get(i).map(str::trim).unwrap_or("");

        let name = cell(1);
        if name.is_empty() {
            bail!("invalid staff row (empty name)");
        }
        let mut staff = match cell(0) {
            "" => StaffMember::new(name),
            id => StaffMember::with_id(StaffId::new(id), name),
        };
        staff.role = cell(2).to_string();
        staff.department = cell(3).to_string();
        if !cell(4).is_empty() {
            staff.senior = parse_bool(cell(4))
                .with_context(|| format!("invalid senior value for {name}"))?;
        }
        staff.unavailable_dates = parse_dates(cell(5))
            .with_context(|| format!("invalid unavailable_dates for {name}"))?;
        staff.unavailable_weekdays = parse_numbers(cell(6))
            .with_context(|| format!("invalid unavailable_weekdays for {name}"))?;
        staff.preferred_days = parse_numbers(cell(7))
            .with_context(|| format!("invalid preferred_days for {name}"))?;
        staff.validate().map_err(anyhow::Error::msg)?;
        out.push(staff);
    }
    Ok(out)
}

fn parse_bool(s: &str) -> anyhow::Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "oui" => Ok(true),
        "false" | "0" | "no" | "n" | "non" => Ok(false),
        _ => bail!("expected boolean"),
    }
}

fn list_items(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(';').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_dates(raw: &str) -> anyhow::Result<BTreeSet<NaiveDate>> {
    list_items(raw)
        .map(|s| parse_iso_date(s).with_context(|| format!("invalid date: {s}")))
        .collect()
}

fn parse_numbers(raw: &str) -> anyhow::Result<BTreeSet<u8>> {
    list_items(raw)
        .map(|s| s.parse::<u8>().with_context(|| format!("invalid number: {s}")))
        .collect()
}

/// Export JSON du planning (jolie mise en forme)
pub fn export_schedule_json<P: AsRef<Path>>(path: P, schedule: &Schedule) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(schedule)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV: header `staff_id,date,kind,zone,conflict,conflict_reason`
pub fn write_schedule_csv<W: Write>(writer: W, schedule: &Schedule) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new()
        .has_headers(true)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);
    w.write_record(["staff_id", "date", "kind", "zone", "conflict", "conflict_reason"])?;
    for (staff, date, cell) in schedule.assignments() {
        let date = date.to_string();
        w.write_record([
            staff.as_str(),
            date.as_str(),
            cell.kind.as_str(),
            cell.zone.as_deref().unwrap_or(""),
            if cell.conflict { "true" } else { "false" },
            cell.conflict_reason.map(|r| r.as_str()).unwrap_or(""),
        ])?;
    }
    w.flush()?;
    Ok(())
}

pub fn export_schedule_csv<P: AsRef<Path>>(path: P, schedule: &Schedule) -> anyhow::Result<()> {
    let file = fs::File::create(path.as_ref())
        .with_context(|| format!("creating {}", path.as_ref().display()))?;
    write_schedule_csv(file, schedule)
}
