#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use sobreaviso::{
    calendar::month_label,
    config::AppConfig,
    format_hours, format_os_number,
    holiday::MovableHolidays,
    io,
    ledger::{duration, Ledger},
    model::{CallOutId, CallOutInput, MonthKey},
    report::{schedule_table, text_table, write_report, ReportTrigger, TextRenderer},
    storage::JsonLedgerStore,
};
use std::io::{BufRead, Write};
use std::path::PathBuf;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de sobreaviso : escala, horas et atendimentos
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON de configuration
    #[arg(long, global = true, default_value = "sobreaviso.json")]
    config: PathBuf,

    /// Répertoire des données (remplace `data_dir` de la configuration)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Lister les feriados du mois
    Holidays {
        /// YYYY-MM
        #[arg(long)]
        month: MonthKey,
    },

    /// Suggérer les dates mobiles d'une année (à reporter dans la configuration)
    SuggestMovable {
        #[arg(long)]
        year: i32,
    },

    /// Afficher l'escala semanal du mois
    Schedule {
        #[arg(long)]
        month: MonthKey,
    },

    /// Heures de sobreaviso, horas extras et saldo par technicien
    Summary {
        #[arg(long)]
        month: MonthKey,
        #[arg(long)]
        out_csv: Option<PathBuf>,
    },

    /// Enregistrer un atendimento
    Add {
        /// YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
        /// HH:MM
        #[arg(long)]
        start: String,
        /// HH:MM
        #[arg(long)]
        end: String,
        #[arg(long)]
        technician: String,
        /// Numéro d'OS (le masque NN.NNNN est appliqué)
        #[arg(long, conflicts_with = "sem_os")]
        os: Option<String>,
        #[arg(long)]
        sem_os: bool,
        #[arg(long, default_value = "")]
        requestor_name: String,
        #[arg(long, default_value = "")]
        requestor_id: String,
        #[arg(long, default_value = "")]
        reason: String,
        #[arg(long, default_value = "")]
        work: String,
    },

    /// Modifier un atendimento existant
    Update {
        #[arg(long)]
        month: MonthKey,
        #[arg(long)]
        id: String,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        technician: Option<String>,
        #[arg(long, conflicts_with = "sem_os")]
        os: Option<String>,
        #[arg(long)]
        sem_os: bool,
        #[arg(long)]
        reason: Option<String>,
        #[arg(long)]
        work: Option<String>,
    },

    /// Lister les atendimentos du mois
    List {
        #[arg(long)]
        month: MonthKey,
        #[arg(long)]
        out_csv: Option<PathBuf>,
    },

    /// Supprimer un atendimento (confirmation demandée)
    Delete {
        #[arg(long)]
        month: MonthKey,
        #[arg(long)]
        id: String,
        /// Confirme sans question
        #[arg(long)]
        yes: bool,
    },

    /// Importer des atendimentos depuis un CSV
    ImportCsv {
        #[arg(long)]
        month: MonthKey,
        #[arg(long)]
        csv: PathBuf,
    },

    /// Générer le relatório mensuel
    Report {
        #[arg(long)]
        month: MonthKey,
        /// Répertoire de sortie
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Appliquer le masque de numéro d'OS
    OsMask {
        #[arg(long)]
        input: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let config = AppConfig::load_or_default(&cli.config)?;
    let planner = config.planner()?;
    let data_dir = cli.data_dir.clone().unwrap_or_else(|| config.data_dir.clone());

    let code = match cli.cmd {
        Commands::Holidays { month } => {
            let holidays = planner.holidays(month);
            if holidays.is_empty() {
                println!("Nenhum feriado em {}", month_label(month));
            }
            for h in holidays.values() {
                println!("{} | {}", h.date, h.label);
            }
            0
        }
        Commands::SuggestMovable { year } => {
            let m = MovableHolidays::from_easter(year)
                .with_context(|| format!("no Easter date for year {year}"))?;
            println!("{}", serde_json::to_string_pretty(&m)?);
            0
        }
        Commands::Schedule { month } => {
            let holidays = planner.holidays(month);
            let grid = planner.grid(month, &holidays);
            let (headers, rows) = schedule_table(&grid);
            println!("{}", month_label(month));
            print!("{}", text_table(&headers, &rows));
            0
        }
        Commands::Summary { month, out_csv } => {
            let store = JsonLedgerStore::open(&data_dir)?;
            let view = planner.derive(month, Ledger::new(&store, month).list()?);
            for row in &view.summary.rows {
                println!(
                    "{} | {} | {} | {}",
                    row.technician,
                    format_hours(row.standby),
                    format_hours(row.overtime),
                    format_hours(row.net)
                );
            }
            println!(
                "TOTAL | {} | {} | {}",
                format_hours(view.summary.total_standby),
                format_hours(view.summary.total_overtime),
                format_hours(view.summary.total_net)
            );
            if let Some(path) = out_csv {
                io::export_summary_csv(path, &view.summary)?;
            }
            0
        }
        Commands::Add {
            date,
            start,
            end,
            technician,
            os,
            sem_os,
            requestor_name,
            requestor_id,
            reason,
            work,
        } => {
            let store = JsonLedgerStore::open(&data_dir)?;
            let ledger = Ledger::new(&store, MonthKey::of(date));
            let id = ledger.create(CallOutInput {
                date: Some(date),
                start_time: start,
                end_time: end,
                technician: Some(technician),
                os_numero: os.as_deref().map(format_os_number).unwrap_or_default(),
                sem_os,
                requestor_name,
                requestor_id,
                reason,
                work,
                signature: None,
            })?;
            println!("{id}");
            0
        }
        Commands::Update {
            month,
            id,
            start,
            end,
            technician,
            os,
            sem_os,
            reason,
            work,
        } => {
            let store = JsonLedgerStore::open(&data_dir)?;
            let ledger = Ledger::new(&store, month);
            let id = CallOutId::new(id);
            let mut input = CallOutInput::from_record(&ledger.get(&id)?);
            if let Some(v) = start {
                input.start_time = v;
            }
            if let Some(v) = end {
                input.end_time = v;
            }
            if let Some(v) = technician {
                input.technician = Some(v);
            }
            if let Some(v) = os {
                input.os_numero = format_os_number(&v);
                input.sem_os = false;
            }
            if sem_os {
                input.sem_os = true;
            }
            if let Some(v) = reason {
                input.reason = v;
            }
            if let Some(v) = work {
                input.work = v;
            }
            ledger.update(&id, input)?;
            0
        }
        Commands::List { month, out_csv } => {
            let store = JsonLedgerStore::open(&data_dir)?;
            let records = Ledger::new(&store, month).list()?;
            for r in &records {
                println!(
                    "{} | {} | {} | {} | {}→{} | {} h",
                    r.id,
                    r.date,
                    r.os_numero,
                    r.technician,
                    r.start_time,
                    r.end_time,
                    format_hours(duration(r))
                );
            }
            if let Some(path) = out_csv {
                io::export_call_outs_csv(path, &records)?;
            }
            0
        }
        Commands::Delete { month, id, yes } => {
            let store = JsonLedgerStore::open(&data_dir)?;
            let ledger = Ledger::new(&store, month);
            let pending = ledger.request_delete(&CallOutId::new(id))?;
            let record = pending.record();
            let confirmed = yes
                || confirm(&format!(
                    "Excluir atendimento de {} ({}, OS {})? [s/N] ",
                    record.date, record.technician, record.os_numero
                ))?;
            if confirmed {
                ledger.confirm_delete(pending)?;
                println!("Atendimento excluído");
                0
            } else {
                ledger.cancel_delete(pending);
                println!("Exclusão cancelada");
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::ImportCsv { month, csv } => {
            let store = JsonLedgerStore::open(&data_dir)?;
            let ledger = Ledger::new(&store, month);
            let rows = io::import_call_outs_csv(csv)?;
            let ids = ledger.create_all(rows)?;
            println!("{} atendimento(s) importado(s)", ids.len());
            0
        }
        Commands::Report { month, out } => {
            let store = JsonLedgerStore::open(&data_dir)?;
            let view = planner.derive(month, Ledger::new(&store, month).list()?);
            let trigger = ReportTrigger::new();
            let mut renderer = TextRenderer::new();
            let path = trigger.run(|| write_report(&out, &view, &mut renderer))?;
            println!("{}", path.display());
            0
        }
        Commands::OsMask { input } => {
            println!("{}", format_os_number(&input));
            0
        }
    };

    std::process::exit(code);
}

fn confirm(prompt: &str) -> Result<bool> {
    let mut stderr = std::io::stderr();
    stderr.write_all(prompt.as_bytes())?;
    stderr.flush()?;
    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer)? == 0 {
        return Ok(false);
    }
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "s" | "sim" | "y" | "yes"
    ))
}
