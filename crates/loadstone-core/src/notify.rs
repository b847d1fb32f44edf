// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Loadstone Developers

//! Typed in-process change notification.
//!
//! Mutators on the data model publish [`Event`]s through a shared
//! [`Notifier`]; rendering collaborators subscribe per [`EventKind`].
//! Dispatch is synchronous and single-threaded: listeners run in
//! registration order before the emitting call returns, and receive the
//! event detail by reference.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::metadata::{SimpleMessage, SourcedGroup};
use crate::state::ApplicationState;

/// Absolute message/plugin totals, recomputed from scratch when the whole
/// plugin sequence is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PluginCounts {
    pub total_messages: usize,
    pub warnings: usize,
    pub errors: usize,
    pub total_plugins: usize,
    pub active_plugins: usize,
    pub dirty_plugins: usize,
}

/// Everything a compact-list item needs to redraw without re-reading the
/// whole plugin record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemContentPayload {
    pub plugin_id: String,
    pub group: String,
    pub is_editor_open: bool,
    pub has_user_edits: bool,
    pub load_order_index: Option<usize>,
    pub is_light_master: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A plugin's message list changed; the detail carries count deltas so
    /// aggregate counters can update in O(1).
    PluginMessagesChanged {
        plugin_id: String,
        may_change_card_height: bool,
        total_diff: i64,
        warning_diff: i64,
        error_diff: i64,
    },
    PluginCleaningDataChanged {
        plugin_id: String,
        is_dirty: Option<bool>,
        cleaned_with: Option<String>,
    },
    PluginCardContentChanged {
        plugin_id: String,
        may_change_card_height: bool,
    },
    PluginCardStylingChanged {
        plugin_id: String,
    },
    PluginItemContentChanged(ItemContentPayload),
    /// The plugin sequence was replaced wholesale; counts are totals, not
    /// deltas.
    GamePluginsChanged(PluginCounts),
    GeneralMessagesChanged {
        total_diff: i64,
        warning_diff: i64,
        error_diff: i64,
        messages: Vec<SimpleMessage>,
    },
    MasterlistChanged {
        revision: String,
        date: String,
    },
    GroupsChanged {
        groups: Vec<SourcedGroup>,
    },
    GameFolderChanged {
        folder: String,
    },
    ConflictsFilterDeactivated,
    InteractionModeChanged {
        mode: ApplicationState,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PluginMessagesChanged,
    PluginCleaningDataChanged,
    PluginCardContentChanged,
    PluginCardStylingChanged,
    PluginItemContentChanged,
    GamePluginsChanged,
    GeneralMessagesChanged,
    MasterlistChanged,
    GroupsChanged,
    GameFolderChanged,
    ConflictsFilterDeactivated,
    InteractionModeChanged,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::PluginMessagesChanged { .. } => EventKind::PluginMessagesChanged,
            Event::PluginCleaningDataChanged { .. } => EventKind::PluginCleaningDataChanged,
            Event::PluginCardContentChanged { .. } => EventKind::PluginCardContentChanged,
            Event::PluginCardStylingChanged { .. } => EventKind::PluginCardStylingChanged,
            Event::PluginItemContentChanged(_) => EventKind::PluginItemContentChanged,
            Event::GamePluginsChanged(_) => EventKind::GamePluginsChanged,
            Event::GeneralMessagesChanged { .. } => EventKind::GeneralMessagesChanged,
            Event::MasterlistChanged { .. } => EventKind::MasterlistChanged,
            Event::GroupsChanged { .. } => EventKind::GroupsChanged,
            Event::GameFolderChanged { .. } => EventKind::GameFolderChanged,
            Event::ConflictsFilterDeactivated => EventKind::ConflictsFilterDeactivated,
            Event::InteractionModeChanged { .. } => EventKind::InteractionModeChanged,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Rc<RefCell<dyn FnMut(&Event)>>;

struct Subscriber {
    id: SubscriptionId,
    kind: Option<EventKind>,
    callback: Callback,
}

/// The process-wide event dispatcher.
///
/// Listeners must not mutate the record graph during dispatch; emission is
/// fire-and-forget UI refresh.
#[derive(Default)]
pub struct Notifier {
    next_id: Cell<u64>,
    subscribers: RefCell<Vec<Subscriber>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for one event kind. Takes effect immediately.
    pub fn subscribe<F>(&self, kind: EventKind, callback: F) -> SubscriptionId
    where
        F: FnMut(&Event) + 'static,
    {
        self.add(Some(kind), callback)
    }

    /// Registers a listener for every event kind.
    pub fn subscribe_all<F>(&self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Event) + 'static,
    {
        self.add(None, callback)
    }

    fn add<F>(&self, kind: Option<EventKind>, callback: F) -> SubscriptionId
    where
        F: FnMut(&Event) + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.subscribers.borrow_mut().push(Subscriber {
            id,
            kind,
            callback: Rc::new(RefCell::new(callback)),
        });
        id
    }

    /// Removes a listener. Returns whether it was registered. An emission
    /// already in progress still delivers to the removed listener.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|subscriber| subscriber.id != id);
        subscribers.len() != before
    }

    /// Synchronously invokes every listener registered for the event's kind,
    /// in registration order.
    pub fn emit(&self, event: Event) {
        // Snapshot first: un/subscribing from inside a listener must not
        // change who receives this emission.
        let snapshot: Vec<Callback> = self
            .subscribers
            .borrow()
            .iter()
            .filter(|subscriber| subscriber.kind.is_none_or(|kind| kind == event.kind()))
            .map(|subscriber| Rc::clone(&subscriber.callback))
            .collect();

        for callback in snapshot {
            (callback.borrow_mut())(&event);
        }
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.subscribers.borrow().len())
            .finish()
    }
}

/// Collects every emitted event into a shared buffer. Test helper.
#[cfg(test)]
pub(crate) fn record_events(notifier: &Notifier) -> Rc<RefCell<Vec<Event>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    notifier.subscribe_all(move |event| sink.borrow_mut().push(event.clone()));
    events
}
