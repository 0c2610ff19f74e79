#![forbid(unsafe_code)]
use anyhow::{bail, Context, Result};
use roulement::{
    io,
    model::{AssignmentPatch, ShiftKind, StaffId},
    report::{unfilled_slots, ScheduleStats},
    scheduler::{conflicts, AssignOptions},
    storage::{self, DraftFile, JsonHistoryStore, ScheduleHistoryStore},
    strategy::{AssignmentStrategy, ExternalStrategy, JsonFileProvider, RotationStrategy},
    MonthKey, ScheduleSession,
};
use clap::{Parser, Subcommand};
use std::path::Path;
use std::time::Duration;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de génération de plannings de gardes mensuels
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du personnel
    #[arg(long, global = true, default_value = "staff.json")]
    staff: String,

    /// Fichier JSON du brouillon en cours
    #[arg(long, global = true, default_value = "draft.json")]
    draft: String,

    /// Fichier JSON de l'historique validé
    #[arg(long, global = true, default_value = "history.json")]
    history: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Importer le personnel depuis un CSV
    ImportStaff {
        #[arg(long)]
        csv: String,
    },

    /// Générer le brouillon d'un mois
    Generate {
        /// Mois cible `YYYY-MM`
        #[arg(long)]
        month: String,
        /// Réponse JSON d'un générateur externe (sinon rotation intégrée)
        #[arg(long)]
        response: Option<String>,
        #[arg(long, default_value_t = 30_000)]
        timeout_ms: u64,
        /// Zone posée sur les gardes générées
        #[arg(long)]
        zone: Option<String>,
    },

    /// Vérifier conflits et créneaux non pourvus
    Check {
        /// Export CSV des conflits (optionnel)
        #[arg(long)]
        report: Option<String>,
    },

    /// Afficher et optionnellement exporter le brouillon
    Show {
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Modifier une case du brouillon
    Set {
        #[arg(long)]
        staff_id: String,
        /// Date ISO `YYYY-MM-DD`
        #[arg(long)]
        date: String,
        /// morning | afternoon | night | off | leave | empty
        #[arg(long)]
        kind: Option<String>,
        #[arg(long)]
        zone: Option<String>,
    },

    /// Déplacer la colonne `index` vers une autre date
    Remap {
        #[arg(long)]
        index: usize,
        #[arg(long)]
        to: String,
    },

    /// Valider le brouillon dans l'historique
    Commit,

    /// Lister l'historique ou afficher les totaux d'un mois
    History {
        #[arg(long)]
        month: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let code = match cli.cmd {
        Commands::ImportStaff { csv } => {
            let mut staff = load_staff_or_empty(&cli.staff)?;
            let imported = io::import_staff_csv(csv)?;
            println!("imported {} staff member(s)", imported.len());
            staff.extend(imported);
            storage::save_staff(&cli.staff, &staff)?;
            0
        }
        Commands::Generate {
            month,
            response,
            timeout_ms,
            zone,
        } => {
            let month: MonthKey = month.parse()?;
            let staff = storage::load_staff(&cli.staff)?;
            if staff.is_empty() {
                bail!("no staff available (import a CSV first)");
            }
            let mut opts = AssignOptions {
                strategy_timeout: Duration::from_millis(timeout_ms),
                ..AssignOptions::default()
            };
            if let Some(zone) = zone {
                opts.default_zone = zone.clone();
                opts.external_zone = zone;
            }

            // seul un brouillon absent autorise à repartir de zéro
            let session = if Path::new(&cli.draft).exists() {
                let draft = DraftFile::load(&cli.draft)
                    .with_context(|| format!("loading draft {}", cli.draft))?;
                if draft.month == month {
                    draft.into_session()
                } else {
                    ScheduleSession::new(month, &staff)
                }
            } else {
                ScheduleSession::new(month, &staff)
            };
            let strategy: Box<dyn AssignmentStrategy> = match response {
                Some(path) => Box::new(ExternalStrategy::new(
                    JsonFileProvider::new(path),
                    month,
                    &opts,
                )),
                None => Box::new(RotationStrategy::new(month, opts)),
            };

            let report = session.generate(strategy.as_ref(), &staff).await?;
            DraftFile::from_session(&session).save(&cli.draft)?;
            if let Some(err) = &report.failure {
                eprintln!("generation failed, draft unchanged: {err}");
                2
            } else {
                println!(
                    "{month}: {} shift(s) assigned, {} unfilled slot(s), {} conflict(s)",
                    report.schedule.len(),
                    report.unfilled.len(),
                    report.conflicts
                );
                0
            }
        }
        Commands::Check { report } => {
            let staff = storage::load_staff(&cli.staff)?;
            let session = DraftFile::load(&cli.draft)?.into_session();
            session.recheck(&staff)?;
            DraftFile::from_session(&session).save(&cli.draft)?;

            let draft = session.draft();
            let found = conflicts(&draft);
            let unfilled = unfilled_slots(&draft, &session.days());
            if found.is_empty() && unfilled.is_empty() {
                println!("OK: no conflicts, every slot filled");
                0
            } else {
                eprintln!(
                    "Found {} conflict(s), {} unfilled slot(s)",
                    found.len(),
                    unfilled.len()
                );
                for slot in &unfilled {
                    eprintln!("unfilled: {} {}", slot.date, slot.kind);
                }
                if let Some(path) = report {
                    let mut w = csv::Writer::from_path(path)?;
                    w.write_record(["staff_id", "date", "kind", "reason"])?;
                    for c in &found {
                        let date = c.date.to_string();
                        w.write_record([
                            c.staff.as_str(),
                            date.as_str(),
                            c.kind.as_str(),
                            c.reason.as_str(),
                        ])?;
                    }
                    w.flush()?;
                }
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::Show { out_json, out_csv } => {
            let staff = load_staff_or_empty(&cli.staff)?;
            let session = DraftFile::load(&cli.draft)?.into_session();
            let draft = session.draft();
            if let Some(path) = out_json {
                io::export_schedule_json(path, &draft)?;
            }
            if let Some(path) = out_csv {
                io::export_schedule_csv(path, &draft)?;
            }
            // impression compacte
            let days = session.days();
            for member in &staff {
                let row: String = days
                    .iter()
                    .map(|d| match draft.get(&member.id, d.date).map(|a| (a.kind, a.conflict)) {
                        Some((_, true)) => '!',
                        Some((ShiftKind::Morning, _)) => 'M',
                        Some((ShiftKind::Afternoon, _)) => 'A',
                        Some((ShiftKind::Night, _)) => 'N',
                        Some((ShiftKind::Off, _)) => 'O',
                        Some((ShiftKind::Leave, _)) => 'L',
                        Some((ShiftKind::Empty, _)) | None => '.',
                    })
                    .collect();
                println!("{:<12} | {}", member.id.as_str(), row);
            }
            0
        }
        Commands::Set {
            staff_id,
            date,
            kind,
            zone,
        } => {
            let staff = storage::load_staff(&cli.staff)?;
            let session = DraftFile::load(&cli.draft)?.into_session();
            let date = chrono::NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
                .with_context(|| format!("invalid date: {date}"))?;
            let mut patch = AssignmentPatch::default();
            if let Some(kind) = kind {
                patch.kind = Some(kind.parse::<ShiftKind>().map_err(anyhow::Error::msg)?);
            }
            if let Some(zone) = zone {
                patch = patch.with_zone(zone);
            }
            session.apply_patch(&StaffId::new(staff_id), date, patch)?;
            session.recheck(&staff)?;
            DraftFile::from_session(&session).save(&cli.draft)?;
            0
        }
        Commands::Remap { index, to } => {
            let session = DraftFile::load(&cli.draft)?.into_session();
            let day = session.remap_day(index, &to)?;
            DraftFile::from_session(&session).save(&cli.draft)?;
            println!("column {index} now shows {}", day.date);
            0
        }
        Commands::Commit => {
            let session = DraftFile::load(&cli.draft)?.into_session();
            let mut store = JsonHistoryStore::open(&cli.history)?;
            let month = session.commit(&mut store)?;
            println!("committed {month}");
            0
        }
        Commands::History { month } => {
            let store = JsonHistoryStore::open(&cli.history)?;
            match month {
                None => {
                    for key in store.months()? {
                        println!("{key}");
                    }
                }
                Some(raw) => {
                    let key: MonthKey = raw.parse()?;
                    let Some(schedule) = store.get(key)? else {
                        bail!("no committed schedule for {key}");
                    };
                    let staff = load_staff_or_empty(&cli.staff)?;
                    let stats = ScheduleStats::compute(&schedule, &staff);
                    for row in &stats.staff {
                        println!("{:<12} | {:>3} shift(s) | {:>4}h", row.staff.as_str(), row.shifts, row.hours);
                    }
                    println!("total: {}h, {} conflict(s)", stats.total_hours, stats.conflicts);
                }
            }
            0
        }
    };

    std::process::exit(code);
}

fn load_staff_or_empty(path: &str) -> Result<Vec<roulement::StaffMember>> {
    if Path::new(path).exists() {
        storage::load_staff(path)
    } else {
        Ok(Vec::new())
    }
}
