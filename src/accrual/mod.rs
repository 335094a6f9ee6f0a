//! Cumul des heures de sobreaviso d'un mois par technicien.
//!
//! Chaque jour du mois est crédité selon son type. Le lundi est à cheval
//! sur deux semaines de rotation : le matin revient au technicien de la
//! semaine du dimanche précédent, le soir à celui de la semaine du lundi.

mod types;

pub use types::{Credit, CreditKind, HourTable, StandbyAccrual};

use crate::calendar::month_weeks;
use crate::holiday::HolidayMap;
use crate::model::{HolidayKind, MonthKey, Technician};
use crate::rotation::RotationEngine;
use chrono::{Datelike, NaiveDate, Weekday};

/// Calcule le détail et les totaux du mois `month`.
pub fn compute(
    month: MonthKey,
    holidays: &HolidayMap,
    engine: &RotationEngine,
    table: &HourTable,
) -> StandbyAccrual {
    let mut credits = Vec::new();

    for week in month_weeks(month) {
        let current = engine.technician_for(week.representative());
        for date in week.in_month() {
            credit_day(date, current, holidays, engine, table, &mut credits);
        }
    }

    let mut totals: Vec<(Technician, f64)> = engine
        .roster()
        .iter()
        .map(|t| (t.clone(), 0.0))
        .collect();
    for credit in &credits {
        if let Some((_, hours)) = totals.iter_mut().find(|(t, _)| *t == credit.technician) {
            *hours += credit.hours;
        }
    }

    tracing::debug!(%month, credits = credits.len(), "standby accrual recomputed");
    StandbyAccrual { credits, totals }
}

fn credit_day(
    date: NaiveDate,
    current: &Technician,
    holidays: &HolidayMap,
    engine: &RotationEngine,
    table: &HourTable,
    out: &mut Vec<Credit>,
) {
    let holiday = holidays.get(&date);
    let mut push = |technician: &Technician, hours: f64, kind: CreditKind| {
        out.push(Credit {
            date,
            technician: technician.clone(),
            hours,
            kind,
        });
    };

    match date.weekday() {
        Weekday::Sat | Weekday::Sun => push(current, table.full_day, CreditKind::Weekend),
        Weekday::Fri => match holiday {
            Some(_) => push(current, table.full_day, CreditKind::Holiday),
            None => push(current, table.friday, CreditKind::Friday),
        },
        Weekday::Tue | Weekday::Wed | Weekday::Thu => match holiday {
            Some(h) if h.kind == HolidayKind::AshWednesday => push(
                current,
                table.weekday + table.ash_wednesday_supplement,
                CreditKind::AshWednesday,
            ),
            Some(_) => push(current, table.full_day, CreditKind::Holiday),
            None => push(current, table.weekday, CreditKind::Weekday),
        },
        Weekday::Mon => {
            let previous = date
                .pred_opt()
                .map_or(current, |sunday| engine.technician_for(sunday));
            push(previous, table.monday_morning, CreditKind::MondayMorning);
            match holiday {
                Some(_) => push(
                    current,
                    table.monday_night + table.monday_holiday_supplement,
                    CreditKind::MondayHolidayNight,
                ),
                None => push(current, table.monday_night, CreditKind::MondayNight),
            }
        }
    }
}
