#![forbid(unsafe_code)]
//! Sobreaviso : planification d'astreintes hebdomadaires et relatório mensuel.
//!
//! - Rotation round-robin à partir d'une ancre (date, technicien).
//! - Feriados fixes `MM-DD` + mobiles saisis par année.
//! - Cumul des heures de sobreaviso, net des atendimentos (horas extras).
//! - Registre mensuel des atendimentos avec abonnements live.
//! - Rapport paginé, écrit de manière atomique.

pub mod accrual;
pub mod calendar;
pub mod config;
pub mod holiday;
pub mod io;
pub mod ledger;
pub mod model;
pub mod osnum;
pub mod planning;
pub mod report;
pub mod rotation;
pub mod session;
pub mod storage;
pub mod summary;

pub use accrual::{Credit, CreditKind, HourTable, StandbyAccrual};
pub use calendar::{month_weeks, week_start, Week};
pub use config::AppConfig;
pub use holiday::{HolidayConfig, HolidayMap, MovableHolidays};
pub use ledger::{duration, overtime_totals, Ledger, LedgerError, PendingDelete};
pub use model::{
    CallOutId, CallOutInput, CallOutRecord, Holiday, HolidayKind, MonthKey, Technician, SEM_OS,
};
pub use osnum::format_os_number;
pub use planning::{DayCell, MonthView, Planner, ScheduleRow};
pub use report::{
    compose, report_file_name, write_report, DocumentRenderer, ReportDocument, ReportError,
    ReportTrigger, TextRenderer,
};
pub use rotation::{RotationAnchor, RotationEngine};
pub use session::MonthSession;
pub use storage::{JsonLedgerStore, LedgerStore, MemoryStore, SubscriptionId};
pub use summary::{format_hours, MonthlySummary, TechnicianSummary};
