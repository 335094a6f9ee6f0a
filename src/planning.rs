//! Dérivation complète d'un mois à partir de la configuration injectée.
//!
//! Tout est recalculé de zéro à chaque appel : feriados, grille, cumul,
//! synthèse. Aucun état incrémental n'est conservé.

use crate::accrual::{self, HourTable, StandbyAccrual};
use crate::calendar::month_weeks;
use crate::holiday::{HolidayConfig, HolidayMap};
use crate::ledger::{overtime_totals, sort_records};
use crate::model::{CallOutRecord, MonthKey, Technician};
use crate::rotation::RotationEngine;
use crate::summary::{summarize, MonthlySummary};
use chrono::NaiveDate;

/// Case de la grille : date du mois et libellé de feriado éventuel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub holiday: Option<String>,
}

/// Ligne de la grille : une semaine, 7 cases lundi→dimanche, son technicien.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRow {
    pub label: String,
    pub cells: [Option<DayCell>; 7],
    pub technician: Technician,
}

/// Tout ce qu'il faut pour afficher ou imprimer un mois.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthView {
    pub month: MonthKey,
    pub holidays: HolidayMap,
    pub grid: Vec<ScheduleRow>,
    pub accrual: StandbyAccrual,
    pub records: Vec<CallOutRecord>,
    pub summary: MonthlySummary,
}

#[derive(Debug, Clone)]
pub struct Planner {
    rotation: RotationEngine,
    holidays: HolidayConfig,
    hours: HourTable,
}

impl Planner {
    pub fn new(rotation: RotationEngine, holidays: HolidayConfig, hours: HourTable) -> Self {
        Self {
            rotation,
            holidays,
            hours,
        }
    }

    pub fn rotation(&self) -> &RotationEngine {
        &self.rotation
    }

    pub fn holidays(&self, month: MonthKey) -> HolidayMap {
        self.holidays.resolve(month)
    }

    pub fn grid(&self, month: MonthKey, holidays: &HolidayMap) -> Vec<ScheduleRow> {
        month_weeks(month)
            .into_iter()
            .map(|week| {
                let cells = week.days.map(|day| {
                    day.map(|date| DayCell {
                        date,
                        holiday: holidays.get(&date).map(|h| h.label.clone()),
                    })
                });
                ScheduleRow {
                    label: week.label(),
                    cells,
                    technician: self.rotation.technician_for(week.representative()).clone(),
                }
            })
            .collect()
    }

    pub fn accrual(&self, month: MonthKey, holidays: &HolidayMap) -> StandbyAccrual {
        accrual::compute(month, holidays, &self.rotation, &self.hours)
    }

    pub fn derive(&self, month: MonthKey, mut records: Vec<CallOutRecord>) -> MonthView {
        sort_records(&mut records);
        let holidays = self.holidays(month);
        let grid = self.grid(month, &holidays);
        let accrual = self.accrual(month, &holidays);
        let summary = summarize(&accrual, &overtime_totals(&records));
        tracing::debug!(%month, records = records.len(), "month view derived");
        MonthView {
            month,
            holidays,
            grid,
            accrual,
            records,
            summary,
        }
    }
}
