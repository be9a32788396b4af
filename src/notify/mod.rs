// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Change notification routing.
//!
//! Subscribers receive the new value of the scope they observe over a
//! channel. Scopes:
//! - the whole roster (`Vec<Part>`)
//! - one part's instrument timeline
//! - the staves under one (part, instrument) pair
//! - one staff
//! - a payload-free "structure changed" signal
//!
//! Mutations only record what changed. The record is flushed once the
//! outermost transaction commits, innermost scope first.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use tracing::trace;

use crate::error::Result;
use crate::model::{Fraction, Instrument, InstrumentKey, Part, PartId, Staff, StaffId};
use crate::store::EntityStore;

/// Payload of an instrument-list scope
pub type InstrumentList = Vec<(Fraction, Instrument)>;

/// Receiving end of one subscription
#[derive(Debug)]
pub struct Subscription<T> {
    receiver: Receiver<T>,
    open: Arc<AtomicBool>,
}

impl<T> Subscription<T> {
    /// Try to receive the next value (non-blocking)
    pub fn try_recv(&self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    /// Receive all pending values
    pub fn recv_all(&self) -> Vec<T> {
        let mut values = Vec::new();
        while let Some(value) = self.try_recv() {
            values.push(value);
        }
        values
    }

    /// Check if the observed entity was removed and the scope torn down
    pub fn is_closed(&self) -> bool {
        !self.open.load(Ordering::Acquire)
    }
}

struct Subscriber<T> {
    sender: Sender<T>,
    open: Arc<AtomicBool>,
}

impl<T> Subscriber<T> {
    fn is_alive(&self) -> bool {
        Arc::strong_count(&self.open) > 1
    }
}

/// Subscriber list of one scope
struct Notifier<T> {
    subscribers: Vec<Subscriber<T>>,
}

impl<T: Clone> Notifier<T> {
    fn new() -> Self {
        Self { subscribers: Vec::new() }
    }

    fn subscribe(&mut self) -> Subscription<T> {
        let (sender, receiver) = mpsc::channel();
        let open = Arc::new(AtomicBool::new(true));
        self.subscribers.push(Subscriber { sender, open: open.clone() });
        Subscription { receiver, open }
    }

    /// Deliver to every live subscriber, dropping the ones that hung up
    fn notify(&mut self, value: &T) -> usize {
        self.subscribers
            .retain(|s| s.is_alive() && s.sender.send(value.clone()).is_ok());
        self.subscribers.len()
    }

    fn prune(&mut self) {
        self.subscribers.retain(|s| s.is_alive());
    }

    fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Check if any subscriber is still listening
    fn is_live(&self) -> bool {
        self.subscribers.iter().any(|s| s.is_alive())
    }
}

impl<T> Drop for Notifier<T> {
    fn drop(&mut self) {
        for subscriber in &self.subscribers {
            subscriber.open.store(false, Ordering::Release);
        }
    }
}

/// Scopes touched by a mutation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    staves: BTreeSet<StaffId>,
    staff_lists: BTreeSet<PartId>,
    instrument_lists: BTreeSet<PartId>,
    part_list: bool,
}

impl ChangeSet {
    pub fn staff_changed(&mut self, id: StaffId) {
        self.staves.insert(id);
    }

    pub fn staff_list_changed(&mut self, part_id: PartId) {
        self.staff_lists.insert(part_id);
    }

    pub fn instruments_changed(&mut self, part_id: PartId) {
        self.instrument_lists.insert(part_id);
    }

    pub fn parts_changed(&mut self) {
        self.part_list = true;
    }

    /// Check if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.staves.is_empty()
            && self.staff_lists.is_empty()
            && self.instrument_lists.is_empty()
            && !self.part_list
    }

    fn forget_part(&mut self, part_id: PartId) {
        self.staff_lists.remove(&part_id);
        self.instrument_lists.remove(&part_id);
    }

    fn forget_staff(&mut self, staff_id: StaffId) {
        self.staves.remove(&staff_id);
    }
}

/// Subscription registry keyed by scope
pub struct NotificationRouter {
    parts: Notifier<Vec<Part>>,
    instruments: HashMap<PartId, Notifier<InstrumentList>>,
    staves: HashMap<InstrumentKey, Notifier<Vec<Staff>>>,
    staff: HashMap<StaffId, Notifier<Staff>>,
    structure: Notifier<()>,
    pending: ChangeSet,
}

impl NotificationRouter {
    /// Create a router with no subscriptions
    pub fn new() -> Self {
        Self {
            parts: Notifier::new(),
            instruments: HashMap::new(),
            staves: HashMap::new(),
            staff: HashMap::new(),
            structure: Notifier::new(),
            pending: ChangeSet::default(),
        }
    }

    /// Observe the whole roster
    pub fn subscribe_parts(&mut self) -> Subscription<Vec<Part>> {
        self.parts.prune();
        self.parts.subscribe()
    }

    /// Observe the payload-free structure signal
    pub fn subscribe_structure(&mut self) -> Subscription<()> {
        self.structure.prune();
        self.structure.subscribe()
    }

    /// Observe one part's instrument timeline
    pub fn subscribe_instruments(
        &mut self,
        store: &EntityStore,
        part_id: PartId,
    ) -> Result<Subscription<InstrumentList>> {
        store.part(part_id)?;
        let notifier = self.instruments.entry(part_id).or_insert_with(Notifier::new);
        notifier.prune();
        Ok(notifier.subscribe())
    }

    /// Observe the staves under a (part, instrument) pair
    pub fn subscribe_staves(
        &mut self,
        store: &EntityStore,
        key: InstrumentKey,
    ) -> Result<Subscription<Vec<Staff>>> {
        store.instrument_slot(key.part_id, &key.instrument_id)?;
        let notifier = self.staves.entry(key).or_insert_with(Notifier::new);
        notifier.prune();
        Ok(notifier.subscribe())
    }

    /// Observe one staff
    pub fn subscribe_staff(
        &mut self,
        store: &EntityStore,
        staff_id: StaffId,
    ) -> Result<Subscription<Staff>> {
        store.staff(staff_id)?;
        let notifier = self.staff.entry(staff_id).or_insert_with(Notifier::new);
        notifier.prune();
        Ok(notifier.subscribe())
    }

    /// Change record of the open transaction
    pub fn pending(&mut self) -> &mut ChangeSet {
        &mut self.pending
    }

    /// Tear down every scope owned by a removed part
    pub fn release_part(&mut self, part_id: PartId) {
        self.instruments.remove(&part_id);
        self.staves.retain(|key, _| key.part_id != part_id);
        self.pending.forget_part(part_id);
    }

    /// Tear down the staves scope of an instrument that left a timeline
    pub fn release_instrument(&mut self, key: &InstrumentKey) {
        self.staves.remove(key);
    }

    /// Tear down the scope of a removed staff
    pub fn release_staff(&mut self, staff_id: StaffId) {
        self.staff.remove(&staff_id);
        self.pending.forget_staff(staff_id);
    }

    /// Tear down every scope whose entity is no longer in `store`
    pub fn release_missing(&mut self, store: &EntityStore) {
        self.instruments.retain(|part_id, _| store.contains_part(*part_id));
        self.staves
            .retain(|key, _| store.instrument_slot(key.part_id, &key.instrument_id).is_ok());
        self.staff.retain(|staff_id, _| store.contains_staff(*staff_id));
    }

    /// Mark every live scope as changed
    pub fn mark_all(&mut self, store: &EntityStore) {
        for staff_id in self.staff.keys() {
            self.pending.staff_changed(*staff_id);
        }
        for part_id in store.part_ids() {
            self.pending.staff_list_changed(*part_id);
            self.pending.instruments_changed(*part_id);
        }
        self.pending.parts_changed();
    }

    /// Drop the change record without delivering it
    pub fn discard_pending(&mut self) {
        self.pending = ChangeSet::default();
    }

    /// Deliver the change record: staff, staves, instruments, roster, structure.
    ///
    /// Returns the number of scopes that fired.
    pub fn flush(&mut self, store: &EntityStore) -> usize {
        let changes = std::mem::take(&mut self.pending);
        if changes.is_empty() {
            return 0;
        }
        let mut fired = 0;

        for staff_id in &changes.staves {
            let staff = store.staff(*staff_id);
            if let (Some(notifier), Ok(staff)) = (self.staff.get_mut(staff_id), staff) {
                notifier.notify(staff);
                fired += 1;
            }
        }

        for part_id in &changes.staff_lists {
            let Ok(list) = store.staff_list(*part_id) else { continue };
            let list: Vec<Staff> = list.into_iter().cloned().collect();
            for (_, notifier) in self.staves.iter_mut().filter(|(key, _)| key.part_id == *part_id) {
                notifier.notify(&list);
                fired += 1;
            }
        }

        for part_id in &changes.instrument_lists {
            let list = store.instrument_list(*part_id);
            if let (Some(notifier), Ok(list)) = (self.instruments.get_mut(part_id), list) {
                notifier.notify(&list);
                fired += 1;
            }
        }

        if changes.part_list {
            self.parts.prune();
            if !self.parts.is_empty() {
                let parts: Vec<Part> = store.part_list().into_iter().cloned().collect();
                self.parts.notify(&parts);
            }
            fired += 1;
        }

        self.structure.notify(&());
        fired += 1;

        self.prune_scopes();
        trace!(fired, "flushed change notifications");
        fired
    }

    /// Tear down keyed scopes whose subscribers have all gone away
    fn prune_scopes(&mut self) {
        self.staff.retain(|_, n| {
            n.prune();
            !n.is_empty()
        });
        self.staves.retain(|_, n| {
            n.prune();
            !n.is_empty()
        });
        self.instruments.retain(|_, n| {
            n.prune();
            !n.is_empty()
        });
    }

    /// Number of live scopes with at least one subscriber
    pub fn live_scopes(&self) -> usize {
        let keyed = self.instruments.values().filter(|n| n.is_live()).count()
            + self.staves.values().filter(|n| n.is_live()).count()
            + self.staff.values().filter(|n| n.is_live()).count();
        keyed + usize::from(self.parts.is_live()) + usize::from(self.structure.is_live())
    }

    /// Check if a staff scope is currently registered
    pub fn has_staff_scope(&self, staff_id: StaffId) -> bool {
        self.staff.contains_key(&staff_id)
    }
}

impl Default for NotificationRouter {
    fn default() -> Self {
        Self::new()
    }
}
