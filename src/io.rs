use crate::ledger::duration;
use crate::model::{CallOutInput, CallOutRecord, SEM_OS};
use crate::osnum::format_os_number;
use crate::summary::{format_hours, MonthlySummary};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use std::path::Path;

/// Import d'atendimentos depuis CSV:
/// header `date,start,end,technician[,os_numero][,requestor_name][,requestor_id][,reason][,work]`
///
/// `os_numero` vaut `SEM OS` pour cocher la case correspondante ; sinon le
/// masque `NN.NNNN` est appliqué comme à la saisie.
pub fn import_call_outs_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<CallOutInput>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut out = Vec::new();
    for (line, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let row = line + 2;
        let date = rec.get(0).context("missing date")?.trim();
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .with_context(|| format!("invalid date on row {row}: {date}"))?;
        let technician = rec.get(3).context("missing technician")?.trim();
        if technician.is_empty() {
            bail!("empty technician on row {row}");
        }
        let field = |i: usize| rec.get(i).map(|s| s.trim().to_string()).unwrap_or_default();
        let os = field(4);
        let sem_os = os.eq_ignore_ascii_case(SEM_OS);
        out.push(CallOutInput {
            date: Some(date),
            start_time: field(1),
            end_time: field(2),
            technician: Some(technician.to_string()),
            os_numero: if sem_os {
                String::new()
            } else {
                format_os_number(&os)
            },
            sem_os,
            requestor_name: field(5),
            requestor_id: field(6),
            reason: field(7),
            work: field(8),
            signature: None,
        });
    }
    Ok(out)
}

/// Export CSV des atendimentos: header `id,date,os_numero,technician,start,end,duration`
pub fn export_call_outs_csv<P: AsRef<Path>>(
    path: P,
    records: &[CallOutRecord],
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["id", "date", "os_numero", "technician", "start", "end", "duration"])?;
    for r in records {
        let date = r.date.format("%Y-%m-%d").to_string();
        let hours = format_hours(duration(r));
        w.write_record([
            r.id.as_str(),
            date.as_str(),
            r.os_numero.as_str(),
            r.technician.as_str(),
            r.start_time.as_str(),
            r.end_time.as_str(),
            hours.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV de la synthèse: header `technician,standby,overtime,net`, ligne `TOTAL` en fin.
pub fn export_summary_csv<P: AsRef<Path>>(path: P, summary: &MonthlySummary) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["technician", "standby", "overtime", "net"])?;
    for row in &summary.rows {
        w.write_record([
            row.technician.clone(),
            format_hours(row.standby),
            format_hours(row.overtime),
            format_hours(row.net),
        ])?;
    }
    w.write_record([
        "TOTAL".to_string(),
        format_hours(summary.total_standby),
        format_hours(summary.total_overtime),
        format_hours(summary.total_net),
    ])?;
    w.flush()?;
    Ok(())
}
