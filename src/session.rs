//! Session sur le mois actif : un seul abonnement live à la fois.
//!
//! Changer de mois ferme l'abonnement précédent avant d'ouvrir le suivant ;
//! un instantané reçu pour un autre mois que le mois actif est ignoré.

use crate::ledger::{Ledger, LedgerError};
use crate::model::{CallOutRecord, MonthKey};
use crate::planning::{MonthView, Planner};
use crate::storage::{LedgerStore, SubscriptionId};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Default)]
struct SessionState {
    month: Option<MonthKey>,
    view: Option<MonthView>,
    refreshes: u64,
}

pub struct MonthSession<S: LedgerStore> {
    store: Rc<S>,
    planner: Rc<Planner>,
    state: Rc<RefCell<SessionState>>,
    subscription: Option<SubscriptionId>,
}

impl<S: LedgerStore> MonthSession<S> {
    pub fn new(store: Rc<S>, planner: Planner) -> Self {
        Self {
            store,
            planner: Rc::new(planner),
            state: Rc::new(RefCell::new(SessionState::default())),
            subscription: None,
        }
    }

    pub fn active_month(&self) -> Option<MonthKey> {
        self.state.borrow().month
    }

    /// Vue du mois actif telle que recalculée au dernier instantané.
    pub fn view(&self) -> Option<MonthView> {
        self.state.borrow().view.clone()
    }

    /// Nombre de recalculs complets effectués depuis l'ouverture.
    pub fn refreshes(&self) -> u64 {
        self.state.borrow().refreshes
    }

    pub fn ledger(&self) -> Option<Ledger<'_, S>> {
        self.active_month().map(|m| Ledger::new(self.store.as_ref(), m))
    }

    pub fn select_month(&mut self, month: MonthKey) -> Result<(), LedgerError> {
        if self.active_month() == Some(month) && self.subscription.is_some() {
            return Ok(());
        }
        self.close();
        {
            let mut state = self.state.borrow_mut();
            state.month = Some(month);
            state.view = None;
        }

        let weak: Weak<RefCell<SessionState>> = Rc::downgrade(&self.state);
        let planner = Rc::clone(&self.planner);
        let id = self.store.subscribe(
            month,
            Box::new(move |snapshot_month: MonthKey, records: &[CallOutRecord]| {
                let Some(state) = weak.upgrade() else {
                    return;
                };
                if state.borrow().month != Some(snapshot_month) {
                    tracing::debug!(month = %snapshot_month, "stale snapshot ignored");
                    return;
                }
                let view = planner.derive(snapshot_month, records.to_vec());
                let mut state = state.borrow_mut();
                state.view = Some(view);
                state.refreshes += 1;
            }),
        )?;
        self.subscription = Some(id);
        tracing::debug!(%month, "active month selected");
        Ok(())
    }

    /// Ferme l'abonnement courant ; la vue est conservée.
    pub fn close(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.store.unsubscribe(id);
        }
    }
}

impl<S: LedgerStore> Drop for MonthSession<S> {
    fn drop(&mut self) {
        self.close();
    }
}
