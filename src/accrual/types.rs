use crate::model::Technician;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Barème des heures de sobreaviso par type de jour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HourTable {
    /// Mardi à jeudi ouvré.
    pub weekday: f64,
    /// Vendredi ouvré.
    pub friday: f64,
    /// Samedi, dimanche, vendredi ou mardi-jeudi férié.
    pub full_day: f64,
    /// Lundi matin, dû au technicien de la semaine précédente.
    pub monday_morning: f64,
    /// Lundi soir, dû au technicien de la semaine courante.
    pub monday_night: f64,
    /// Complément du lundi férié, ajouté à `monday_night`.
    pub monday_holiday_supplement: f64,
    /// Complément du mercredi des Cendres, ajouté à `weekday`.
    pub ash_wednesday_supplement: f64,
}

impl Default for HourTable {
    fn default() -> Self {
        Self {
            weekday: 13.75,
            friday: 14.75,
            full_day: 24.0,
            monday_morning: 7.75,
            monday_night: 6.0,
            monday_holiday_supplement: 10.25,
            ash_wednesday_supplement: 5.25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreditKind {
    Weekday,
    Friday,
    Weekend,
    Holiday,
    AshWednesday,
    MondayMorning,
    MondayNight,
    MondayHolidayNight,
}

/// Une ligne du détail : `hours` créditées à `technician` pour `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credit {
    pub date: NaiveDate,
    pub technician: Technician,
    pub hours: f64,
    pub kind: CreditKind,
}

/// Résultat du calcul pour un mois : détail + totaux dans l'ordre du roster.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StandbyAccrual {
    pub credits: Vec<Credit>,
    pub totals: Vec<(Technician, f64)>,
}

impl StandbyAccrual {
    pub fn hours_for(&self, technician: &Technician) -> f64 {
        self.totals
            .iter()
            .find(|(t, _)| t == technician)
            .map_or(0.0, |(_, h)| *h)
    }

    pub fn total(&self) -> f64 {
        self.totals.iter().map(|(_, h)| h).sum()
    }
}
