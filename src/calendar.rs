//! Découpage d'un mois en semaines lundi→dimanche, tronquées au mois.

use crate::model::MonthKey;
use chrono::{Datelike, Duration, NaiveDate};

/// Noms de mois pour les libellés du rapport.
const MONTH_NAMES: [&str; 12] = [
    "Janeiro", "Fevereiro", "Março", "Abril", "Maio", "Junho", "Julho", "Agosto", "Setembro",
    "Outubro", "Novembro", "Dezembro",
];

/// En-têtes de colonnes, lundi en premier.
pub const WEEKDAY_HEADERS: [&str; 7] = ["SEG", "TER", "QUA", "QUI", "SEX", "SÁB", "DOM"];

/// Lundi de la semaine contenant `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date.checked_sub_signed(Duration::days(i64::from(
        date.weekday().num_days_from_monday(),
    )))
    .unwrap_or(date)
}

/// Semaine lundi→dimanche ; les jours hors du mois cible valent `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Week {
    /// Lundi de la semaine (peut tomber dans le mois précédent).
    pub start: NaiveDate,
    pub days: [Option<NaiveDate>; 7],
}

impl Week {
    /// Un jour quelconque de la semaine appartenant au mois.
    pub fn representative(&self) -> NaiveDate {
        self.in_month().next().unwrap_or(self.start)
    }

    pub fn in_month(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.iter().flatten().copied()
    }

    /// Libellé `dd/mm a dd/mm` borné aux jours du mois.
    pub fn label(&self) -> String {
        let first = self.in_month().next();
        let last = self.in_month().last();
        match (first, last) {
            (Some(a), Some(b)) => format!("{} a {}", a.format("%d/%m"), b.format("%d/%m")),
            _ => String::new(),
        }
    }
}

/// Partitionne le mois en semaines ; chaque jour apparaît exactement une fois.
pub fn month_weeks(month: MonthKey) -> Vec<Week> {
    let first = month.first_day();
    let last = month.last_day();
    let mut weeks = Vec::new();
    let mut start = week_start(first);

    while start <= last {
        let mut days = [None; 7];
        for (offset, slot) in days.iter_mut().enumerate() {
            *slot = start
                .checked_add_signed(Duration::days(offset as i64))
                .filter(|day| month.contains(*day));
        }
        weeks.push(Week { start, days });
        match start.checked_add_signed(Duration::days(7)) {
            Some(next) => start = next,
            None => break,
        }
    }
    weeks
}

/// `Março de 2025`
pub fn month_label(month: MonthKey) -> String {
    let name = MONTH_NAMES
        .get(month.month() as usize - 1)
        .copied()
        .unwrap_or("?");
    format!("{name} de {}", month.year())
}
