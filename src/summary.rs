//! Synthèse mensuelle : sobreaviso, horas extras et saldo par technicien.

use crate::accrual::StandbyAccrual;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnicianSummary {
    pub technician: String,
    pub standby: f64,
    pub overtime: f64,
    pub net: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub rows: Vec<TechnicianSummary>,
    pub total_standby: f64,
    pub total_overtime: f64,
    pub total_net: f64,
}

/// Saldo = sobreaviso − horas extras.
///
/// Ordre du roster ; un technicien absent du roster mais présent dans les
/// atendimentos est ajouté en fin de liste avec 0 h de sobreaviso.
pub fn summarize(accrual: &StandbyAccrual, overtime: &BTreeMap<String, f64>) -> MonthlySummary {
    let mut rows: Vec<TechnicianSummary> = accrual
        .totals
        .iter()
        .map(|(tech, standby)| {
            let overtime = overtime.get(tech.name()).copied().unwrap_or(0.0);
            TechnicianSummary {
                technician: tech.name().to_string(),
                standby: *standby,
                overtime,
                net: standby - overtime,
            }
        })
        .collect();

    for (name, hours) in overtime {
        if rows.iter().any(|r| &r.technician == name) {
            continue;
        }
        tracing::warn!(technician = %name, "call-out technician not in roster");
        rows.push(TechnicianSummary {
            technician: name.clone(),
            standby: 0.0,
            overtime: *hours,
            net: -hours,
        });
    }

    MonthlySummary {
        total_standby: rows.iter().map(|r| r.standby).sum(),
        total_overtime: rows.iter().map(|r| r.overtime).sum(),
        total_net: rows.iter().map(|r| r.net).sum(),
        rows,
    }
}

/// Heures au format décimal à virgule, deux décimales : `13,75`.
pub fn format_hours(hours: f64) -> String {
    let cents = (hours * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let mut buf = itoa::Buffer::new();
    let whole = buf.format(cents / 100);
    format!("{sign}{whole},{:02}", cents % 100)
}
