//! Change notifications for display collaborators.
//!
//! Mutating calls queue their events and deliver them synchronously, in
//! order, right before returning.

use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Receives model change notifications.
///
/// All methods default to doing nothing so observers only implement what
/// they care about.
pub trait ModelObserver {
    /// `removed` rows starting at `position` were replaced by `added` rows.
    fn rows_changed(&self, position: usize, removed: usize, added: usize) {
        let _ = (position, removed, added);
    }

    /// Section boundaries within `start..end` may have moved.
    fn sections_changed(&self, start: usize, end: usize) {
        let _ = (start, end);
    }

    /// Selection state of some rows in `position..position + n` changed.
    fn selection_changed(&self, position: usize, n: usize) {
        let _ = (position, n);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelEvent {
    RowsChanged {
        position: usize,
        removed: usize,
        added: usize,
    },
    SectionsChanged {
        start: usize,
        end: usize,
    },
    SelectionChanged {
        position: usize,
        n: usize,
    },
}

impl ModelEvent {
    pub fn dispatch(&self, observer: &dyn ModelObserver) {
        match *self {
            ModelEvent::RowsChanged {
                position,
                removed,
                added,
            } => observer.rows_changed(position, removed, added),
            ModelEvent::SectionsChanged { start, end } => observer.sections_changed(start, end),
            ModelEvent::SelectionChanged { position, n } => observer.selection_changed(position, n),
        }
    }
}

/// Observer that records every event it receives.
#[derive(Debug, Default)]
pub struct EventLog {
    events: RefCell<Vec<ModelEvent>>,
}

impl EventLog {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Returns and forgets the events recorded so far.
    pub fn take(&self) -> Vec<ModelEvent> {
        mem::take(&mut *self.events.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl ModelObserver for EventLog {
    fn rows_changed(&self, position: usize, removed: usize, added: usize) {
        self.events.borrow_mut().push(ModelEvent::RowsChanged {
            position,
            removed,
            added,
        });
    }

    fn sections_changed(&self, start: usize, end: usize) {
        self.events
            .borrow_mut()
            .push(ModelEvent::SectionsChanged { start, end });
    }

    fn selection_changed(&self, position: usize, n: usize) {
        self.events
            .borrow_mut()
            .push(ModelEvent::SelectionChanged { position, n });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Subscribed observers plus the events queued by the current call.
#[derive(Default)]
pub(crate) struct Observers {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Rc<dyn ModelObserver>)>,
    pending: Vec<ModelEvent>,
}

impl Observers {
    pub fn subscribe(&mut self, observer: Rc<dyn ModelObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, observer));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != before
    }

    pub fn push(&mut self, event: ModelEvent) {
        self.pending.push(event);
    }

    /// Delivers queued events to every subscriber.
    pub fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let pending = mem::take(&mut self.pending);
        for event in &pending {
            for (_, observer) in &self.subscribers {
                event.dispatch(observer.as_ref());
            }
        }
    }
}
