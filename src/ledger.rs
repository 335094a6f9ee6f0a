//! Registre mensuel des atendimentos (chamados pendant le sobreaviso).

use crate::model::{CallOutId, CallOutInput, CallOutRecord, MonthKey, SEM_OS};
use crate::osnum::is_valid_os_number;
use crate::storage::LedgerStore;
use chrono::{NaiveDate, NaiveTime, Timelike};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("date {date} is outside ledger month {month}")]
    OutsideMonth { date: NaiveDate, month: MonthKey },
    #[error("invalid OS number {0:?}: expected NN.NNNN")]
    InvalidOsNumber(String),
    #[error("unknown call-out record: {0}")]
    UnknownRecord(String),
    #[error("pending deletion was opened for month {0}")]
    WrongMonth(MonthKey),
    #[error("entry {position}: {source}")]
    Batch {
        position: usize,
        source: Box<LedgerError>,
    },
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Première phase d'une suppression ; à confirmer ou annuler.
#[derive(Debug)]
#[must_use = "a pending deletion does nothing until confirmed"]
pub struct PendingDelete {
    month: MonthKey,
    record: CallOutRecord,
}

impl PendingDelete {
    /// L'enregistrement qui sera supprimé, pour l'afficher dans la confirmation.
    pub fn record(&self) -> &CallOutRecord {
        &self.record
    }
}

/// Vue d'un mois du support ; toute écriture passe par la validation.
pub struct Ledger<'s, S: LedgerStore + ?Sized> {
    store: &'s S,
    month: MonthKey,
}

impl<'s, S: LedgerStore + ?Sized> Ledger<'s, S> {
    pub fn new(store: &'s S, month: MonthKey) -> Self {
        Self { store, month }
    }

    pub fn month(&self) -> MonthKey {
        self.month
    }

    /// Atendimentos triés par date (ordre des documents à date égale).
    pub fn list(&self) -> Result<Vec<CallOutRecord>, LedgerError> {
        let mut records = self.store.load(self.month)?;
        sort_records(&mut records);
        Ok(records)
    }

    pub fn get(&self, id: &CallOutId) -> Result<CallOutRecord, LedgerError> {
        self.store
            .load(self.month)?
            .into_iter()
            .find(|r| &r.id == id)
            .ok_or_else(|| LedgerError::UnknownRecord(id.to_string()))
    }

    pub fn create(&self, input: CallOutInput) -> Result<CallOutId, LedgerError> {
        let record = validate(CallOutId::random(), input, self.month)?;
        let id = record.id.clone();
        self.store.upsert(self.month, record)?;
        tracing::info!(month = %self.month, %id, "call-out created");
        Ok(id)
    }

    /// Crée un lot d'atendimentos : tout le lot est validé avant la première
    /// écriture, une saisie invalide n'en écrit aucune.
    pub fn create_all(&self, inputs: Vec<CallOutInput>) -> Result<Vec<CallOutId>, LedgerError> {
        let records = inputs
            .into_iter()
            .enumerate()
            .map(|(i, input)| {
                validate(CallOutId::random(), input, self.month).map_err(|err| {
                    LedgerError::Batch {
                        position: i + 1,
                        source: Box::new(err),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut ids = Vec::with_capacity(records.len());
        for record in records {
            ids.push(record.id.clone());
            self.store.upsert(self.month, record)?;
        }
        tracing::info!(month = %self.month, count = ids.len(), "call-outs created");
        Ok(ids)
    }

    pub fn update(&self, id: &CallOutId, input: CallOutInput) -> Result<(), LedgerError> {
        let record = validate(id.clone(), input, self.month)?;
        if !self.store.load(self.month)?.iter().any(|r| &r.id == id) {
            return Err(LedgerError::UnknownRecord(id.to_string()));
        }
        self.store.upsert(self.month, record)?;
        tracing::info!(month = %self.month, %id, "call-out updated");
        Ok(())
    }

    /// Ouvre la confirmation ; rien n'est supprimé à ce stade.
    pub fn request_delete(&self, id: &CallOutId) -> Result<PendingDelete, LedgerError> {
        let record = self.get(id)?;
        Ok(PendingDelete {
            month: self.month,
            record,
        })
    }

    /// Supprime définitivement l'enregistrement confirmé.
    pub fn confirm_delete(&self, pending: PendingDelete) -> Result<CallOutRecord, LedgerError> {
        if pending.month != self.month {
            return Err(LedgerError::WrongMonth(pending.month));
        }
        if !self.store.remove(self.month, &pending.record.id)? {
            return Err(LedgerError::UnknownRecord(pending.record.id.to_string()));
        }
        tracing::info!(month = %self.month, id = %pending.record.id, "call-out deleted");
        Ok(pending.record)
    }

    pub fn cancel_delete(&self, pending: PendingDelete) {
        tracing::debug!(id = %pending.record.id, "deletion cancelled");
    }

    pub fn overtime_totals(&self) -> Result<BTreeMap<String, f64>, LedgerError> {
        Ok(overtime_totals(&self.list()?))
    }
}

/// Tri stable par date.
pub fn sort_records(records: &mut [CallOutRecord]) {
    records.sort_by_key(|r| r.date);
}

/// Valide une saisie ; aucune écriture n'est tentée en cas d'erreur.
pub fn validate(
    id: CallOutId,
    input: CallOutInput,
    month: MonthKey,
) -> Result<CallOutRecord, LedgerError> {
    let date = input.date.ok_or(LedgerError::MissingField("date"))?;
    let technician = input
        .technician
        .filter(|t| !t.trim().is_empty())
        .ok_or(LedgerError::MissingField("technician"))?;
    if !month.contains(date) {
        return Err(LedgerError::OutsideMonth { date, month });
    }

    // les champs sont conservés tels que saisis
    let os_numero = if input.sem_os {
        SEM_OS.to_string()
    } else {
        if !input.os_numero.is_empty() && !is_valid_os_number(&input.os_numero) {
            return Err(LedgerError::InvalidOsNumber(input.os_numero));
        }
        input.os_numero
    };

    Ok(CallOutRecord {
        id,
        date,
        start_time: input.start_time,
        end_time: input.end_time,
        technician,
        os_numero,
        requestor_name: input.requestor_name,
        requestor_id: input.requestor_id,
        reason: input.reason,
        work: input.work,
        signature: input.signature,
    })
}

fn parse_minutes(raw: &str) -> Option<u32> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .ok()
        .map(|t| t.hour() * 60 + t.minute())
}

/// Durée en heures ; une fin avant le début traverse minuit.
///
/// Un horaire absent ou mal formé donne 0 (journalisé).
pub fn duration(record: &CallOutRecord) -> f64 {
    let (Some(start), Some(mut end)) = (
        parse_minutes(&record.start_time),
        parse_minutes(&record.end_time),
    ) else {
        tracing::warn!(
            id = %record.id,
            start = %record.start_time,
            end = %record.end_time,
            "malformed call-out times, counting zero hours"
        );
        return 0.0;
    };
    if end < start {
        end += 24 * 60;
    }
    f64::from(end - start) / 60.0
}

/// Somme des durées par technicien.
pub fn overtime_totals(records: &[CallOutRecord]) -> BTreeMap<String, f64> {
    let mut out = BTreeMap::new();
    for record in records {
        *out.entry(record.technician.clone()).or_insert(0.0) += duration(record);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn march() -> MonthKey {
        MonthKey::new(2025, 3).unwrap()
    }

    fn input(day: u32, start: &str, end: &str, tech: &str) -> CallOutInput {
        CallOutInput {
            date: NaiveDate::from_ymd_opt(2025, 3, day),
            start_time: start.into(),
            end_time: end.into(),
            technician: Some(tech.into()),
            os_numero: "25.0042".into(),
            requestor_name: "Dra. Helena".into(),
            requestor_id: "CRM 1234".into(),
            reason: "Monitor sem imagem".into(),
            work: "Troca da fonte".into(),
            ..Default::default()
        }
    }

    fn with_times(start: &str, end: &str) -> CallOutRecord {
        validate(CallOutId::new("x"), input(1, start, end, "Ana"), march()).unwrap()
    }

    #[test]
    fn duration_rules() {
        assert_eq!(duration(&with_times("22:00", "02:00")), 4.0);
        assert_eq!(duration(&with_times("08:00", "08:00")), 0.0);
        assert_eq!(duration(&with_times("08:15", "10:45")), 2.5);
        assert_eq!(duration(&with_times("", "10:00")), 0.0);
        assert_eq!(duration(&with_times("25:00", "10:00")), 0.0);
        assert_eq!(duration(&with_times("8h", "10:00")), 0.0);
    }

    #[test]
    fn required_fields_block_write() {
        let store = MemoryStore::new();
        let ledger = Ledger::new(&store, march());

        let mut no_date = input(1, "10:00", "11:00", "Ana");
        no_date.date = None;
        assert!(matches!(
            ledger.create(no_date),
            Err(LedgerError::MissingField("date"))
        ));

        let mut no_tech = input(1, "10:00", "11:00", "Ana");
        no_tech.technician = Some("  ".into());
        assert!(matches!(
            ledger.create(no_tech),
            Err(LedgerError::MissingField("technician"))
        ));

        let mut april = input(1, "10:00", "11:00", "Ana");
        april.date = NaiveDate::from_ymd_opt(2025, 4, 1);
        assert!(matches!(
            ledger.create(april),
            Err(LedgerError::OutsideMonth { .. })
        ));

        assert!(ledger.list().unwrap().is_empty());
    }

    #[test]
    fn validation_runs_before_store_access() {
        let store = MemoryStore::new();
        store.set_offline(true);
        let ledger = Ledger::new(&store, march());
        let mut bad = input(1, "10:00", "11:00", "Ana");
        bad.technician = None;
        assert!(matches!(ledger.create(bad), Err(LedgerError::MissingField(_))));
        assert!(matches!(
            ledger.create(input(1, "10:00", "11:00", "Ana")),
            Err(LedgerError::Store(_))
        ));
    }

    #[test]
    fn sem_os_skips_number_validation() {
        let store = MemoryStore::new();
        let ledger = Ledger::new(&store, march());

        let mut bad = input(2, "10:00", "11:00", "Ana");
        bad.os_numero = "abc".into();
        assert!(matches!(
            ledger.create(bad.clone()),
            Err(LedgerError::InvalidOsNumber(_))
        ));

        bad.sem_os = true;
        let id = ledger.create(bad).unwrap();
        let saved = ledger.get(&id).unwrap();
        assert_eq!(saved.os_numero, SEM_OS);
        assert!(saved.is_sem_os());
    }

    #[test]
    fn saved_record_reads_back_exactly() {
        let store = MemoryStore::new();
        let ledger = Ledger::new(&store, march());
        let mut form = input(14, "23:10", "01:40", "Bruno");
        form.signature = Some("data:image/png;base64,iVBORw0KGgo=".into());
        let id = ledger.create(form.clone()).unwrap();

        let back = ledger.get(&id).unwrap();
        assert_eq!(CallOutInput::from_record(&back), form);
        assert_eq!(duration(&back), 2.5);
    }

    #[test]
    fn fields_are_stored_as_entered() {
        let store = MemoryStore::new();
        let ledger = Ledger::new(&store, march());
        let mut form = input(14, "23:10", "01:40", " Bruno ");
        form.signature = Some(String::new());
        let id = ledger.create(form.clone()).unwrap();

        let back = ledger.get(&id).unwrap();
        assert_eq!(back.technician, " Bruno ");
        assert_eq!(back.signature.as_deref(), Some(""));
        assert_eq!(CallOutInput::from_record(&back), form);

        let mut padded = input(14, "10:00", "11:00", "Bruno");
        padded.os_numero = " 25.0042".into();
        assert!(matches!(
            ledger.create(padded),
            Err(LedgerError::InvalidOsNumber(_))
        ));
    }

    #[test]
    fn batch_is_all_or_nothing() {
        let store = MemoryStore::new();
        let ledger = Ledger::new(&store, march());
        let mut april = input(3, "10:00", "11:00", "Ana");
        april.date = NaiveDate::from_ymd_opt(2025, 4, 3);

        let err = ledger
            .create_all(vec![input(2, "22:00", "01:00", "Ana"), april])
            .unwrap_err();
        match err {
            LedgerError::Batch { position, source } => {
                assert_eq!(position, 2);
                assert!(matches!(*source, LedgerError::OutsideMonth { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(ledger.list().unwrap().is_empty());

        let ids = ledger
            .create_all(vec![
                input(2, "22:00", "01:00", "Ana"),
                input(4, "10:00", "11:00", "Bruno"),
            ])
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(ledger.list().unwrap().len(), 2);
    }

    #[test]
    fn list_sorted_by_date_with_stable_ties() {
        let store = MemoryStore::new();
        let ledger = Ledger::new(&store, march());
        let a = ledger.create(input(20, "10:00", "11:00", "Ana")).unwrap();
        let b = ledger.create(input(5, "10:00", "11:00", "Ana")).unwrap();
        let c = ledger.create(input(20, "12:00", "13:00", "Ana")).unwrap();
        let ids: Vec<CallOutId> = ledger.list().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![b, a, c]);
    }

    #[test]
    fn update_replaces_and_rejects_unknown() {
        let store = MemoryStore::new();
        let ledger = Ledger::new(&store, march());
        let id = ledger.create(input(3, "10:00", "11:00", "Ana")).unwrap();
        ledger.update(&id, input(3, "10:00", "12:30", "Carla")).unwrap();
        let rec = ledger.get(&id).unwrap();
        assert_eq!(rec.technician, "Carla");
        assert_eq!(duration(&rec), 2.5);
        assert_eq!(ledger.list().unwrap().len(), 1);

        assert!(matches!(
            ledger.update(&CallOutId::new("nope"), input(3, "10:00", "11:00", "Ana")),
            Err(LedgerError::UnknownRecord(_))
        ));
    }

    #[test]
    fn delete_is_two_phase() {
        let store = MemoryStore::new();
        let ledger = Ledger::new(&store, march());
        let id = ledger.create(input(3, "10:00", "11:00", "Ana")).unwrap();

        let pending = ledger.request_delete(&id).unwrap();
        assert_eq!(pending.record().id, id);
        assert_eq!(ledger.list().unwrap().len(), 1);
        ledger.cancel_delete(pending);
        assert_eq!(ledger.list().unwrap().len(), 1);

        let pending = ledger.request_delete(&id).unwrap();
        let removed = ledger.confirm_delete(pending).unwrap();
        assert_eq!(removed.id, id);
        assert!(ledger.list().unwrap().is_empty());
        assert!(matches!(
            ledger.request_delete(&id),
            Err(LedgerError::UnknownRecord(_))
        ));
    }

    #[test]
    fn pending_delete_is_scoped_to_its_month() {
        let store = MemoryStore::new();
        let ledger = Ledger::new(&store, march());
        let id = ledger.create(input(3, "10:00", "11:00", "Ana")).unwrap();
        let pending = ledger.request_delete(&id).unwrap();
        let april = Ledger::new(&store, march().next());
        assert!(matches!(
            april.confirm_delete(pending),
            Err(LedgerError::WrongMonth(_))
        ));
        assert_eq!(ledger.list().unwrap().len(), 1);
    }

    #[test]
    fn overtime_grouped_by_technician() {
        let store = MemoryStore::new();
        let ledger = Ledger::new(&store, march());
        ledger.create(input(1, "22:00", "02:00", "Ana")).unwrap();
        ledger.create(input(2, "10:00", "11:30", "Ana")).unwrap();
        ledger.create(input(2, "bad", "11:30", "Bruno")).unwrap();
        ledger.create(input(9, "06:00", "07:00", "Carla")).unwrap();
        let totals = ledger.overtime_totals().unwrap();
        assert_eq!(totals["Ana"], 5.5);
        assert_eq!(totals["Bruno"], 0.0);
        assert_eq!(totals["Carla"], 1.0);
    }
}
