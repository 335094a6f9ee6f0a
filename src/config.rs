use crate::accrual::HourTable;
use crate::holiday::{default_fixed_holidays, FixedHoliday, HolidayConfig, MovableHolidays};
use crate::model::Technician;
use crate::planning::Planner;
use crate::rotation::{RotationAnchor, RotationEngine};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration de l'application (fichier JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Roster ordonné ; l'ordre fixe la rotation.
    pub technicians: Vec<String>,
    pub anchor: RotationAnchor,
    #[serde(default = "default_fixed_holidays")]
    pub fixed_holidays: Vec<FixedHoliday>,
    /// Feriados mobiles saisis par année.
    #[serde(default)]
    pub movable: BTreeMap<i32, MovableHolidays>,
    #[serde(default)]
    pub include_carnival_monday: bool,
    #[serde(default)]
    pub include_ash_wednesday: bool,
    #[serde(default)]
    pub hours: HourTable,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            technicians: vec!["Carlos".into(), "Rafael".into(), "Marcos".into()],
            anchor: RotationAnchor {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
                index: 0,
            },
            fixed_holidays: default_fixed_holidays(),
            movable: BTreeMap::new(),
            include_carnival_monday: false,
            include_ash_wednesday: false,
            hours: HourTable::default(),
            data_dir: default_data_dir(),
        }
    }
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).with_context(|| format!("reading config {}", path.display()))?;
        let config: AppConfig = serde_json::from_slice(&data)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Charge `path` s'il existe, sinon la configuration par défaut.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.as_ref().display(), "config not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)
            .with_context(|| format!("writing config {}", path.as_ref().display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.rotation_engine()?;
        Ok(())
    }

    pub fn rotation_engine(&self) -> Result<RotationEngine> {
        let roster = self
            .technicians
            .iter()
            .map(|name| Technician::new(name.trim()))
            .collect();
        RotationEngine::new(roster, self.anchor).context("invalid rotation configuration")
    }

    pub fn holiday_config(&self) -> HolidayConfig {
        HolidayConfig {
            fixed: self.fixed_holidays.clone(),
            movable: self.movable.clone(),
            include_carnival_monday: self.include_carnival_monday,
            include_ash_wednesday: self.include_ash_wednesday,
        }
    }

    pub fn planner(&self) -> Result<Planner> {
        Ok(Planner::new(
            self.rotation_engine()?,
            self.holiday_config(),
            self.hours,
        ))
    }
}
