use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Valeur sentinelle du numéro d'OS quand l'atendimento n'a pas d'OS.
pub const SEM_OS: &str = "SEM OS";

/// Identifiant fort pour un atendimento
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallOutId(String);

impl CallOutId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallOutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Technicien de la rotation (identifié par son nom).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Technician(String);

impl Technician {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Technician {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Clé année-mois (`YYYY-MM`) qui scope un ledger, un rapport, une vue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid month key {0:?}: expected YYYY-MM")]
pub struct InvalidMonthKey(pub String);

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, InvalidMonthKey> {
        let invalid = || InvalidMonthKey(format!("{year}-{month}"));
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let key = Self { year, month };
        let next = key.next();
        // les semaines débordent d'au plus 6 jours de part et d'autre du mois
        let margin = Duration::days(7);
        NaiveDate::from_ymd_opt(next.year, next.month, 1)
            .and_then(|d| d.checked_add_signed(margin))
            .and(first.checked_sub_signed(margin))
            .ok_or_else(invalid)?;
        Ok(key)
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }
    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // validé à la construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day().pred_opt().unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = InvalidMonthKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidMonthKey(s.to_string());
        let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl TryFrom<String> for MonthKey {
    type Error = InvalidMonthKey;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(value: MonthKey) -> Self {
        value.to_string()
    }
}

/// Origine d'un feriado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HolidayKind {
    Fixed,
    Carnival,
    CarnivalMonday,
    AshWednesday,
    GoodFriday,
    CorpusChristi,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub label: String,
    pub kind: HolidayKind,
}

/// Atendimento tel que persisté dans le ledger du mois.
///
/// Les horaires restent des chaînes `HH:MM` : une valeur mal formée est
/// conservée telle quelle et donne simplement une durée nulle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallOutRecord {
    pub id: CallOutId,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub technician: String,
    pub os_numero: String,
    #[serde(default)]
    pub requestor_name: String,
    #[serde(default)]
    pub requestor_id: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub work: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl CallOutRecord {
    pub fn is_sem_os(&self) -> bool {
        self.os_numero == SEM_OS
    }
}

/// Données de formulaire d'un atendimento, avant validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOutInput {
    pub date: Option<NaiveDate>,
    pub start_time: String,
    pub end_time: String,
    pub technician: Option<String>,
    pub os_numero: String,
    /// Case "sem OS" : le champ numéro est alors ignoré.
    pub sem_os: bool,
    pub requestor_name: String,
    pub requestor_id: String,
    pub reason: String,
    pub work: String,
    pub signature: Option<String>,
}

impl CallOutInput {
    /// Reprend un enregistrement existant (formulaire d'édition).
    pub fn from_record(record: &CallOutRecord) -> Self {
        Self {
            date: Some(record.date),
            start_time: record.start_time.clone(),
            end_time: record.end_time.clone(),
            technician: Some(record.technician.clone()),
            os_numero: if record.is_sem_os() {
                String::new()
            } else {
                record.os_numero.clone()
            },
            sem_os: record.is_sem_os(),
            requestor_name: record.requestor_name.clone(),
            requestor_id: record.requestor_id.clone(),
            reason: record.reason.clone(),
            work: record.work.clone(),
            signature: record.signature.clone(),
        }
    }
}
