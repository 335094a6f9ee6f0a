//! Supports de persistance des atendimentos, par mois, avec abonnements
//! « live » : chaque écriture pousse un instantané complet du mois aux
//! abonnés de ce mois.

use crate::model::{CallOutId, CallOutRecord, MonthKey};
use anyhow::{bail, Context};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::NamedTempFile;

/// Rappel d'abonnement : reçoit le mois et l'ensemble de ses atendimentos.
pub type SnapshotCallback = Box<dyn Fn(MonthKey, &[CallOutRecord])>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub trait LedgerStore {
    /// Atendimentos du mois, dans l'ordre des documents.
    fn load(&self, month: MonthKey) -> anyhow::Result<Vec<CallOutRecord>>;
    /// Insère, ou remplace l'enregistrement de même id.
    fn upsert(&self, month: MonthKey, record: CallOutRecord) -> anyhow::Result<()>;
    /// Retourne `false` si l'id est inconnu.
    fn remove(&self, month: MonthKey, id: &CallOutId) -> anyhow::Result<bool>;
    /// Abonne `callback` au mois ; l'instantané courant est livré tout de suite.
    fn subscribe(&self, month: MonthKey, callback: SnapshotCallback)
        -> anyhow::Result<SubscriptionId>;
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

/// Liste d'abonnés partagée par les implémentations de `LedgerStore`.
#[derive(Default)]
pub struct SubscriberHub {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(SubscriptionId, MonthKey, Rc<dyn Fn(MonthKey, &[CallOutRecord])>)>>,
}

impl SubscriberHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, month: MonthKey, callback: SnapshotCallback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.entries.borrow_mut().push((id, month, Rc::from(callback)));
        tracing::debug!(%month, id = id.0, "subscription opened");
        id
    }

    pub fn remove(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(sid, _, _)| *sid != id);
        let removed = entries.len() != before;
        if removed {
            tracing::debug!(id = id.0, "subscription closed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appelle les abonnés du mois hors de tout emprunt (ré-entrance permise).
    pub fn notify(&self, month: MonthKey, records: &[CallOutRecord]) {
        let targets: Vec<Rc<dyn Fn(MonthKey, &[CallOutRecord])>> = self
            .entries
            .borrow()
            .iter()
            .filter(|(_, m, _)| *m == month)
            .map(|(_, _, cb)| Rc::clone(cb))
            .collect();
        for cb in targets {
            cb(month, records);
        }
    }

    fn deliver(&self, id: SubscriptionId, month: MonthKey, records: &[CallOutRecord]) {
        let target = self
            .entries
            .borrow()
            .iter()
            .find(|(sid, _, _)| *sid == id)
            .map(|(_, _, cb)| Rc::clone(cb));
        if let Some(cb) = target {
            cb(month, records);
        }
    }
}

/// Support en mémoire, utile pour les tests et une session sans disque.
#[derive(Default)]
pub struct MemoryStore {
    months: RefCell<BTreeMap<MonthKey, Vec<CallOutRecord>>>,
    offline: Cell<bool>,
    hub: SubscriberHub,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simule une perte de connexion : toute opération échoue.
    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }

    pub fn subscriber_count(&self) -> usize {
        self.hub.len()
    }

    fn check_online(&self) -> anyhow::Result<()> {
        if self.offline.get() {
            bail!("store unavailable");
        }
        Ok(())
    }

    fn snapshot(&self, month: MonthKey) -> Vec<CallOutRecord> {
        self.months.borrow().get(&month).cloned().unwrap_or_default()
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self, month: MonthKey) -> anyhow::Result<Vec<CallOutRecord>> {
        self.check_online()?;
        Ok(self.snapshot(month))
    }

    fn upsert(&self, month: MonthKey, record: CallOutRecord) -> anyhow::Result<()> {
        self.check_online()?;
        {
            let mut months = self.months.borrow_mut();
            upsert_in(months.entry(month).or_default(), record);
        }
        self.hub.notify(month, &self.snapshot(month));
        Ok(())
    }

    fn remove(&self, month: MonthKey, id: &CallOutId) -> anyhow::Result<bool> {
        self.check_online()?;
        let removed = {
            let mut months = self.months.borrow_mut();
            months
                .get_mut(&month)
                .map(|records| remove_in(records, id))
                .unwrap_or(false)
        };
        if removed {
            self.hub.notify(month, &self.snapshot(month));
        }
        Ok(removed)
    }

    fn subscribe(
        &self,
        month: MonthKey,
        callback: SnapshotCallback,
    ) -> anyhow::Result<SubscriptionId> {
        self.check_online()?;
        let id = self.hub.add(month, callback);
        self.hub.deliver(id, month, &self.snapshot(month));
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.hub.remove(id)
    }
}

/// Un fichier JSON par mois (`callouts-YYYY-MM.json`), écrit de manière atomique.
///
/// Les abonnés ne sont notifiés que des écritures faites via cette même
/// instance ; un autre processus modifiant le fichier n'est pas observé.
pub struct JsonLedgerStore {
    dir: PathBuf,
    hub: SubscriberHub,
}

impl JsonLedgerStore {
    pub fn open<P: AsRef<Path>>(dir: P) -> anyhow::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating data directory {}", dir.display()))?;
        Ok(Self {
            dir,
            hub: SubscriberHub::new(),
        })
    }

    pub fn path_for(&self, month: MonthKey) -> PathBuf {
        self.dir.join(format!("callouts-{month}.json"))
    }

    fn save(&self, month: MonthKey, records: &[CallOutRecord]) -> anyhow::Result<()> {
        let path = self.path_for(month);
        let json = serde_json::to_vec_pretty(records)?;
        let mut tmp = NamedTempFile::new_in(&self.dir).with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).with_context(|| "atomic rename")?;
        tracing::info!(%month, records = records.len(), path = %path.display(), "ledger saved");
        Ok(())
    }
}

impl LedgerStore for JsonLedgerStore {
    fn load(&self, month: MonthKey) -> anyhow::Result<Vec<CallOutRecord>> {
        let path = self.path_for(month);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
        let records: Vec<CallOutRecord> = serde_json::from_slice(&data)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(records)
    }

    fn upsert(&self, month: MonthKey, record: CallOutRecord) -> anyhow::Result<()> {
        let mut records = self.load(month)?;
        upsert_in(&mut records, record);
        self.save(month, &records)?;
        self.hub.notify(month, &records);
        Ok(())
    }

    fn remove(&self, month: MonthKey, id: &CallOutId) -> anyhow::Result<bool> {
        let mut records = self.load(month)?;
        if !remove_in(&mut records, id) {
            return Ok(false);
        }
        self.save(month, &records)?;
        self.hub.notify(month, &records);
        Ok(true)
    }

    fn subscribe(
        &self,
        month: MonthKey,
        callback: SnapshotCallback,
    ) -> anyhow::Result<SubscriptionId> {
        let records = self.load(month)?;
        let id = self.hub.add(month, callback);
        self.hub.deliver(id, month, &records);
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.hub.remove(id)
    }
}

fn upsert_in(records: &mut Vec<CallOutRecord>, record: CallOutRecord) {
    match records.iter_mut().find(|r| r.id == record.id) {
        Some(existing) => *existing = record,
        None => records.push(record),
    }
}

fn remove_in(records: &mut Vec<CallOutRecord>, id: &CallOutId) -> bool {
    let before = records.len();
    records.retain(|r| &r.id != id);
    records.len() != before
}
