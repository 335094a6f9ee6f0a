#![forbid(unsafe_code)]
use chrono::NaiveDate;
use sobreaviso::{
    AppConfig, CallOutInput, Ledger, LedgerError, LedgerStore, MemoryStore, MonthKey,
    MonthSession, Technician, SEM_OS,
};
use std::rc::Rc;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn config() -> AppConfig {
    AppConfig {
        technicians: vec!["Ana".into(), "Bruno".into(), "Carla".into()],
        ..AppConfig::default()
    }
}

fn input(date: NaiveDate, start: &str, end: &str, tech: &str) -> CallOutInput {
    CallOutInput {
        date: Some(date),
        start_time: start.into(),
        end_time: end.into(),
        technician: Some(tech.into()),
        os_numero: "24.0001".into(),
        ..Default::default()
    }
}

#[test]
fn january_with_new_year_holiday() {
    let planner = config().planner().unwrap();
    let month = MonthKey::new(2024, 1).unwrap();
    let view = planner.derive(month, Vec::new());

    // 1er janvier : lundi férié, supplément pour le technicien de la semaine
    assert_eq!(view.holidays.len(), 1);
    assert_eq!(view.accrual.hours_for(&Technician::new("Ana")), 245.75);
    assert_eq!(view.accrual.hours_for(&Technician::new("Bruno")), 151.25);
    assert_eq!(view.accrual.hours_for(&Technician::new("Carla")), 125.5);
    assert_eq!(view.summary.total_standby, 522.5);
    assert_eq!(view.summary.total_overtime, 0.0);
}

#[test]
fn ledger_feeds_summary() {
    let planner = config().planner().unwrap();
    let store = MemoryStore::new();
    let month = MonthKey::new(2024, 1).unwrap();
    let ledger = Ledger::new(&store, month);

    ledger.create(input(d(2024, 1, 8), "22:00", "01:00", "Bruno")).unwrap();
    let mut sem_os = input(d(2024, 1, 3), "10:00", "10:30", "Ana");
    sem_os.sem_os = true;
    ledger.create(sem_os).unwrap();

    let records = ledger.list().unwrap();
    assert_eq!(records[0].date, d(2024, 1, 3));
    assert_eq!(records[0].os_numero, SEM_OS);

    let view = planner.derive(month, records);
    let bruno = view
        .summary
        .rows
        .iter()
        .find(|r| r.technician == "Bruno")
        .unwrap();
    assert_eq!(bruno.overtime, 3.0);
    assert_eq!(bruno.net, 148.25);
    assert_eq!(view.summary.total_overtime, 3.5);
}

#[test]
fn rejected_input_is_not_written() {
    let store = MemoryStore::new();
    let month = MonthKey::new(2024, 1).unwrap();
    let ledger = Ledger::new(&store, month);

    let err = ledger
        .create(input(d(2024, 2, 1), "10:00", "11:00", "Ana"))
        .unwrap_err();
    assert!(matches!(err, LedgerError::OutsideMonth { .. }));
    assert!(store.load(month).unwrap().is_empty());
}

#[test]
fn session_follows_writes_of_active_month() {
    let store = Rc::new(MemoryStore::new());
    let mut session = MonthSession::new(Rc::clone(&store), config().planner().unwrap());
    let month = MonthKey::new(2024, 1).unwrap();
    session.select_month(month).unwrap();
    assert_eq!(session.view().unwrap().records.len(), 0);

    let id = Ledger::new(store.as_ref(), month)
        .create(input(d(2024, 1, 20), "08:00", "12:00", "Carla"))
        .unwrap();
    let view = session.view().unwrap();
    assert_eq!(view.records.len(), 1);
    assert_eq!(view.records[0].id, id);

    let ledger = session.ledger().unwrap();
    let pending = ledger.request_delete(&id).unwrap();
    ledger.confirm_delete(pending).unwrap();
    assert!(session.view().unwrap().records.is_empty());

    drop(session);
    assert_eq!(store.subscriber_count(), 0);
}
