//! Résolution des feriados d'un mois : table fixe `MM-DD` + feriados mobiles
//! saisis par année.

use crate::model::{Holiday, HolidayKind, MonthKey};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const LABEL_CARNIVAL: &str = "Carnaval";
pub const LABEL_CARNIVAL_MONDAY: &str = "Segunda-feira de Carnaval";
pub const LABEL_ASH_WEDNESDAY: &str = "Quarta-feira de Cinzas";
pub const LABEL_GOOD_FRIDAY: &str = "Sexta-feira Santa";
pub const LABEL_CORPUS_CHRISTI: &str = "Corpus Christi";

/// Feriados actifs d'un mois, au plus un par date.
pub type HolidayMap = BTreeMap<NaiveDate, Holiday>;

/// Clé `MM-DD` de la table fixe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

impl MonthDay {
    pub fn new(month: u32, day: u32) -> Result<Self, String> {
        // 2000 est bissextile : accepte 02-29
        if NaiveDate::from_ymd_opt(2000, month, day).is_none() {
            return Err(format!("invalid month-day {month:02}-{day:02}"));
        }
        Ok(Self { month, day })
    }

    pub fn in_year(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day)
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

impl FromStr for MonthDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (m, d) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("expected MM-DD, got {s:?}"))?;
        let month = m.parse().map_err(|_| format!("invalid month in {s:?}"))?;
        let day = d.parse().map_err(|_| format!("invalid day in {s:?}"))?;
        Self::new(month, day)
    }
}

impl TryFrom<String> for MonthDay {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthDay> for String {
    fn from(value: MonthDay) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedHoliday {
    pub month_day: MonthDay,
    pub label: String,
}

impl FixedHoliday {
    fn new(month: u32, day: u32, label: &str) -> Self {
        Self {
            month_day: MonthDay { month, day },
            label: label.to_string(),
        }
    }
}

/// Feriados nationaux à date fixe.
pub fn default_fixed_holidays() -> Vec<FixedHoliday> {
    vec![
        FixedHoliday::new(1, 1, "Confraternização Universal"),
        FixedHoliday::new(4, 21, "Tiradentes"),
        FixedHoliday::new(5, 1, "Dia do Trabalho"),
        FixedHoliday::new(9, 7, "Independência do Brasil"),
        FixedHoliday::new(10, 12, "Nossa Senhora Aparecida"),
        FixedHoliday::new(11, 2, "Finados"),
        FixedHoliday::new(11, 15, "Proclamação da República"),
        FixedHoliday::new(11, 20, "Dia da Consciência Negra"),
        FixedHoliday::new(12, 25, "Natal"),
    ]
}

/// Dates mobiles saisies pour une année (chacune optionnelle).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovableHolidays {
    /// Mardi de Carnaval.
    #[serde(default)]
    pub carnival: Option<NaiveDate>,
    #[serde(default)]
    pub good_friday: Option<NaiveDate>,
    #[serde(default)]
    pub corpus_christi: Option<NaiveDate>,
}

impl MovableHolidays {
    /// Suggestion calculée depuis Pâques ; la saisie manuelle reste prioritaire.
    pub fn from_easter(year: i32) -> Option<Self> {
        let easter = easter_sunday(year)?;
        Some(Self {
            carnival: Some(easter - Duration::days(47)),
            good_friday: Some(easter - Duration::days(2)),
            corpus_christi: Some(easter + Duration::days(60)),
        })
    }
}

/// Dimanche de Pâques (comput grégorien anonyme).
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

/// Paramètres du résolveur : table fixe, dates mobiles par année, options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayConfig {
    #[serde(default = "default_fixed_holidays")]
    pub fixed: Vec<FixedHoliday>,
    #[serde(default)]
    pub movable: BTreeMap<i32, MovableHolidays>,
    #[serde(default)]
    pub include_carnival_monday: bool,
    #[serde(default)]
    pub include_ash_wednesday: bool,
}

impl Default for HolidayConfig {
    fn default() -> Self {
        Self {
            fixed: default_fixed_holidays(),
            movable: BTreeMap::new(),
            include_carnival_monday: false,
            include_ash_wednesday: false,
        }
    }
}

impl HolidayConfig {
    pub fn resolve(&self, month: MonthKey) -> HolidayMap {
        let movable = self.movable.get(&month.year()).copied().unwrap_or_default();
        resolve_month(
            month,
            &self.fixed,
            &movable,
            self.include_carnival_monday,
            self.include_ash_wednesday,
        )
    }
}

/// Feriados du mois `month`.
///
/// Les mobiles sont fusionnés après les fixes : en cas de même date, le
/// libellé mobile l'emporte.
pub fn resolve_month(
    month: MonthKey,
    fixed: &[FixedHoliday],
    movable: &MovableHolidays,
    include_carnival_monday: bool,
    include_ash_wednesday: bool,
) -> HolidayMap {
    let mut out = HolidayMap::new();

    for entry in fixed.iter().filter(|h| h.month_day.month == month.month()) {
        match entry.month_day.in_year(month.year()) {
            Some(date) => {
                out.insert(
                    date,
                    Holiday {
                        date,
                        label: entry.label.clone(),
                        kind: HolidayKind::Fixed,
                    },
                );
            }
            None => tracing::warn!(
                month_day = %entry.month_day,
                year = month.year(),
                "fixed holiday does not exist this year"
            ),
        }
    }

    let mut candidates: Vec<(NaiveDate, &str, HolidayKind)> = Vec::new();
    if let Some(tuesday) = movable.carnival {
        if include_carnival_monday {
            if let Some(monday) = tuesday.pred_opt() {
                candidates.push((monday, LABEL_CARNIVAL_MONDAY, HolidayKind::CarnivalMonday));
            }
        }
        candidates.push((tuesday, LABEL_CARNIVAL, HolidayKind::Carnival));
        if include_ash_wednesday {
            if let Some(wednesday) = tuesday.succ_opt() {
                candidates.push((wednesday, LABEL_ASH_WEDNESDAY, HolidayKind::AshWednesday));
            }
        }
    }
    if let Some(date) = movable.good_friday {
        candidates.push((date, LABEL_GOOD_FRIDAY, HolidayKind::GoodFriday));
    }
    if let Some(date) = movable.corpus_christi {
        candidates.push((date, LABEL_CORPUS_CHRISTI, HolidayKind::CorpusChristi));
    }

    for (date, label, kind) in candidates {
        if !month.contains(date) {
            continue;
        }
        out.insert(
            date,
            Holiday {
                date,
                label: label.to_string(),
                kind,
            },
        );
    }

    out
}
