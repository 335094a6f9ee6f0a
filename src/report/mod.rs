//! Relatório mensal : grille, feriados, synthèse des heures, liste des
//! atendimentos puis une page de détail par atendimento.
//!
//! La génération est tout-ou-rien : le fichier n'apparaît qu'une fois le
//! document entièrement rendu.

mod render;

pub use render::{text_table, DocumentRenderer, TextRenderer};

use crate::calendar::{month_label, WEEKDAY_HEADERS};
use crate::ledger::duration;
use crate::model::{CallOutRecord, MonthKey};
use crate::planning::{MonthView, ScheduleRow};
use crate::summary::format_hours;
use std::cell::Cell;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("report generation already in progress")]
    Busy,
    #[error("render failed: {0}")]
    Render(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("persisting report: {0}")]
    Persist(#[from] tempfile::PersistError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading(String),
    Paragraph(String),
    Bullets(Vec<String>),
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Fields(Vec<(String, String)>),
    /// Image de signature (data URL) si collectée.
    Signature(Option<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    pub title: String,
    pub pages: Vec<Page>,
}

/// `Relatorio_Sobreaviso_2025-03.pdf`
pub fn report_file_name(month: MonthKey, extension: &str) -> String {
    format!("Relatorio_Sobreaviso_{month}.{extension}")
}

fn strings<const N: usize>(items: [&str; N]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn br_date(record: &CallOutRecord) -> String {
    record.date.format("%d/%m/%Y").to_string()
}

fn or_dash(value: &str) -> String {
    if value.trim().is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

/// Assemble le document du mois, sans effet de bord.
pub fn compose(view: &MonthView) -> ReportDocument {
    let title = format!("Relatório de Sobreaviso - {}", month_label(view.month));

    let mut pages = vec![overview_page(view), call_out_list_page(view)];
    pages.extend(view.records.iter().map(detail_page));

    ReportDocument { title, pages }
}

/// Grille semaine × jour ; un feriado est marqué `F` après le jour.
pub fn schedule_table(grid: &[ScheduleRow]) -> (Vec<String>, Vec<Vec<String>>) {
    let mut headers = vec!["Semana".to_string()];
    headers.extend(WEEKDAY_HEADERS.iter().map(|h| h.to_string()));
    headers.push("Técnico".into());
    let rows = grid
        .iter()
        .map(|row| {
            let mut cells = vec![row.label.clone()];
            cells.extend(row.cells.iter().map(|cell| match cell {
                Some(c) if c.holiday.is_some() => format!("{} F", c.date.format("%d")),
                Some(c) => c.date.format("%d").to_string(),
                None => String::new(),
            }));
            cells.push(row.technician.to_string());
            cells
        })
        .collect();
    (headers, rows)
}

fn overview_page(view: &MonthView) -> Page {
    let mut blocks = Vec::new();

    blocks.push(Block::Heading("Escala semanal".into()));
    let (headers, rows) = schedule_table(&view.grid);
    blocks.push(Block::Table { headers, rows });

    blocks.push(Block::Heading("Feriados".into()));
    if view.holidays.is_empty() {
        blocks.push(Block::Paragraph("Nenhum feriado neste mês.".into()));
    } else {
        blocks.push(Block::Bullets(
            view.holidays
                .values()
                .map(|h| format!("{} - {}", h.date.format("%d/%m"), h.label))
                .collect(),
        ));
    }

    blocks.push(Block::Heading("Horas de sobreaviso".into()));
    let mut rows: Vec<Vec<String>> = view
        .summary
        .rows
        .iter()
        .map(|r| {
            vec![
                r.technician.clone(),
                format_hours(r.standby),
                format_hours(r.overtime),
                format_hours(r.net),
            ]
        })
        .collect();
    rows.push(vec![
        "TOTAL".into(),
        format_hours(view.summary.total_standby),
        format_hours(view.summary.total_overtime),
        format_hours(view.summary.total_net),
    ]);
    blocks.push(Block::Table {
        headers: strings(["Técnico", "Sobreaviso", "Horas extras", "Saldo"]),
        rows,
    });

    Page { blocks }
}

fn call_out_list_page(view: &MonthView) -> Page {
    let mut blocks = vec![Block::Heading("Atendimentos".into())];
    if view.records.is_empty() {
        blocks.push(Block::Paragraph("Nenhum atendimento registrado no mês.".into()));
    } else {
        let rows = view
            .records
            .iter()
            .map(|r| {
                vec![
                    br_date(r),
                    or_dash(&r.os_numero),
                    r.technician.clone(),
                    r.start_time.clone(),
                    r.end_time.clone(),
                    format_hours(duration(r)),
                ]
            })
            .collect();
        blocks.push(Block::Table {
            headers: strings(["Data", "OS", "Técnico", "Início", "Fim", "Duração"]),
            rows,
        });
    }
    Page { blocks }
}

fn detail_page(record: &CallOutRecord) -> Page {
    Page {
        blocks: vec![
            Block::Heading(format!(
                "Atendimento {} - OS {}",
                br_date(record),
                or_dash(&record.os_numero)
            )),
            Block::Fields(vec![
                ("Data".into(), br_date(record)),
                ("Técnico".into(), record.technician.clone()),
                ("Início".into(), or_dash(&record.start_time)),
                ("Fim".into(), or_dash(&record.end_time)),
                ("Duração".into(), format!("{} h", format_hours(duration(record)))),
                ("Solicitante".into(), or_dash(&record.requestor_name)),
                ("Identificação".into(), or_dash(&record.requestor_id)),
            ]),
            Block::Heading("Motivo do chamado".into()),
            Block::Paragraph(or_dash(&record.reason)),
            Block::Heading("Serviço realizado".into()),
            Block::Paragraph(or_dash(&record.work)),
            Block::Signature(record.signature.clone().filter(|s| !s.is_empty())),
        ],
    }
}

/// Passe les pages au renderer une à une, dans l'ordre.
pub fn render_document(
    doc: &ReportDocument,
    renderer: &mut dyn DocumentRenderer,
) -> Result<Vec<u8>, ReportError> {
    renderer.begin(&doc.title)?;
    for page in &doc.pages {
        renderer.append_page(page)?;
    }
    renderer.finish()
}

/// Compose, rend puis écrit le rapport dans `dir` ; rien n'est écrit en cas d'erreur.
pub fn write_report(
    dir: &Path,
    view: &MonthView,
    renderer: &mut dyn DocumentRenderer,
) -> Result<PathBuf, ReportError> {
    let doc = compose(view);
    let bytes = render_document(&doc, renderer)?;
    let path = dir.join(report_file_name(view.month, renderer.extension()));

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&bytes)?;
    tmp.flush()?;
    tmp.persist(&path)?;
    tracing::info!(month = %view.month, pages = doc.pages.len(), path = %path.display(), "report written");
    Ok(path)
}

/// Déclencheur de génération : désactivé pendant un rendu, réactivé après,
/// y compris en cas d'échec.
#[derive(Debug, Default)]
pub struct ReportTrigger {
    busy: Cell<bool>,
}

impl ReportTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        !self.busy.get()
    }

    pub fn run<T>(
        &self,
        job: impl FnOnce() -> Result<T, ReportError>,
    ) -> Result<T, ReportError> {
        if self.busy.replace(true) {
            return Err(ReportError::Busy);
        }
        let result = job();
        self.busy.set(false);
        if let Err(err) = &result {
            tracing::warn!(error = %err, "report generation failed");
        }
        result
    }
}
