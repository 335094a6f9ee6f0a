//! Rotation hebdomadaire round-robin à partir d'une ancre fixe.

use crate::calendar::week_start;
use crate::model::Technician;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Couple (date, index dans le roster) qui amorce la rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationAnchor {
    pub date: NaiveDate,
    pub index: usize,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RotationError {
    #[error("technician roster is empty")]
    EmptyRoster,
    #[error("anchor index {index} out of range for roster of {len}")]
    AnchorOutOfRange { index: usize, len: usize },
}

/// Moteur de rotation : fonction pure (date) → technicien.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationEngine {
    roster: Vec<Technician>,
    anchor_week: NaiveDate,
    anchor_index: usize,
}

impl RotationEngine {
    pub fn new(roster: Vec<Technician>, anchor: RotationAnchor) -> Result<Self, RotationError> {
        if roster.is_empty() {
            return Err(RotationError::EmptyRoster);
        }
        if anchor.index >= roster.len() {
            return Err(RotationError::AnchorOutOfRange {
                index: anchor.index,
                len: roster.len(),
            });
        }
        Ok(Self {
            roster,
            // une ancre en milieu de semaine vaut pour toute sa semaine
            anchor_week: week_start(anchor.date),
            anchor_index: anchor.index,
        })
    }

    pub fn roster(&self) -> &[Technician] {
        &self.roster
    }

    /// Nombre de semaines entre la semaine d'ancrage et celle de `date`.
    pub fn weeks_offset(&self, date: NaiveDate) -> i64 {
        let days = (week_start(date) - self.anchor_week).num_days();
        days.div_euclid(7)
    }

    /// Index dans le roster du technicien de la semaine contenant `date`.
    pub fn index_for(&self, date: NaiveDate) -> usize {
        let len = self.roster.len() as i64;
        let idx = (self.anchor_index as i64 + self.weeks_offset(date)).rem_euclid(len);
        idx as usize
    }

    pub fn technician_for(&self, date: NaiveDate) -> &Technician {
        &self.roster[self.index_for(date)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn engine() -> RotationEngine {
        RotationEngine::new(
            vec![
                Technician::new("Ana"),
                Technician::new("Bruno"),
                Technician::new("Carla"),
            ],
            RotationAnchor {
                date: d(2024, 1, 1),
                index: 0,
            },
        )
        .unwrap()
    }

    #[test]
    fn anchor_week_maps_to_anchor_index() {
        let e = engine();
        assert_eq!(e.technician_for(d(2024, 1, 1)).name(), "Ana");
        assert_eq!(e.technician_for(d(2024, 1, 7)).name(), "Ana");
        assert_eq!(e.technician_for(d(2024, 1, 8)).name(), "Bruno");
        assert_eq!(e.technician_for(d(2024, 1, 15)).name(), "Carla");
        assert_eq!(e.technician_for(d(2024, 1, 22)).name(), "Ana");
    }

    #[test]
    fn same_week_same_technician() {
        let e = engine();
        let monday = d(2025, 6, 2);
        for offset in 0..7 {
            assert_eq!(
                e.technician_for(monday),
                e.technician_for(monday + Duration::days(offset))
            );
        }
    }

    #[test]
    fn period_is_roster_length() {
        let e = engine();
        let mut day = d(2023, 1, 4);
        while day < d(2026, 1, 1) {
            assert_eq!(e.technician_for(day), e.technician_for(day + Duration::weeks(3)));
            day += Duration::days(5);
        }
    }

    #[test]
    fn dates_before_anchor_wrap_non_negatively() {
        let e = engine();
        assert_eq!(e.weeks_offset(d(2023, 12, 31)), -1);
        assert_eq!(e.technician_for(d(2023, 12, 31)).name(), "Carla");
        assert_eq!(e.technician_for(d(2023, 12, 24)).name(), "Bruno");
        assert_eq!(e.technician_for(d(2023, 12, 18)).name(), "Bruno");
        assert_eq!(e.technician_for(d(2023, 12, 11)).name(), "Ana");
    }

    #[test]
    fn mid_week_anchor_is_normalised() {
        let e = RotationEngine::new(
            vec![Technician::new("A"), Technician::new("B")],
            RotationAnchor {
                date: d(2024, 1, 3),
                index: 1,
            },
        )
        .unwrap();
        assert_eq!(e.technician_for(d(2024, 1, 1)).name(), "B");
        assert_eq!(e.technician_for(d(2024, 1, 8)).name(), "A");
    }

    #[test]
    fn invalid_configuration_rejected() {
        let anchor = RotationAnchor {
            date: d(2024, 1, 1),
            index: 3,
        };
        assert_eq!(
            RotationEngine::new(vec![], anchor).unwrap_err(),
            RotationError::EmptyRoster
        );
        assert_eq!(
            RotationEngine::new(vec![Technician::new("A")], anchor).unwrap_err(),
            RotationError::AnchorOutOfRange { index: 3, len: 1 }
        );
    }
}
