//! Single-threaded notification bus with scoped subscriptions.
//!
//! Every subscriber gets its own queue. `post` clones the event into each
//! queue and the subscriber drains it on its own turn of the event loop.
//! Dropping a `Subscription` unregisters it, so a destroyed component can
//! never be handed an event.

use crate::editor::{SearchFlags, SurfaceId};
use crate::list::RowId;
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::{Rc, Weak};

// ─────────────────────────────────────────────────────────────────────────────
// Event types
// ─────────────────────────────────────────────────────────────────────────────

/// Commands the host frame sends to the find bar (menu items, key bindings).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    FindNext,
    FindPrevious,
    FindNextAtCaret,
    FindPreviousAtCaret,
    /// The editor with this id is going away
    ReleaseEditor(SurfaceId),
}

/// Notifications the find bar sends back to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindBarEvent {
    /// Select and bookmark every occurrence of `needle` in the bound editor
    MarkAllMatches { needle: String, flags: SearchFlags },
    /// Transient status-bar message
    Status(String),
    /// Blank the status bar
    ClearStatus,
    /// Keyboard focus should go back to the text surface
    FocusEditor,
    /// The bar changed height (replace row shown or hidden)
    LayoutChanged,
}

/// Notifications a list control sends to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent {
    /// The inline search text changed
    SearchText(String),
    /// The inline search was dismissed
    ClearSearch,
    /// A row was activated (Enter or double click)
    ItemActivated(RowId),
}

// ─────────────────────────────────────────────────────────────────────────────
// Bus
// ─────────────────────────────────────────────────────────────────────────────

struct BusInner<E> {
    next_id: u64,
    queues: BTreeMap<u64, VecDeque<E>>,
}

/// Cheap to clone; clones share the same subscriber set.
pub struct EventBus<E> {
    inner: Rc<RefCell<BusInner<E>>>,
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.inner.borrow().queues.len())
            .finish()
    }
}

impl<E: Clone> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone> EventBus<E> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(BusInner {
                next_id: 0,
                queues: BTreeMap::new(),
            })),
        }
    }

    /// Register a new subscriber. It only sees events posted after this call.
    pub fn subscribe(&self) -> Subscription<E> {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.queues.insert(id, VecDeque::new());
        Subscription {
            id,
            bus: Rc::downgrade(&self.inner),
        }
    }

    /// Queue `event` for every live subscriber.
    pub fn post(&self, event: E) {
        let mut inner = self.inner.borrow_mut();
        for queue in inner.queues.values_mut() {
            queue.push_back(event.clone());
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().queues.len()
    }
}

/// A registration on an `EventBus`. Unregisters on drop.
pub struct Subscription<E> {
    id: u64,
    bus: Weak<RefCell<BusInner<E>>>,
}

impl<E> Subscription<E> {
    /// Pop the oldest pending event.
    pub fn try_next(&self) -> Option<E> {
        let bus = self.bus.upgrade()?;
        let mut inner = bus.borrow_mut();
        inner.queues.get_mut(&self.id)?.pop_front()
    }

    /// Take every pending event, oldest first.
    pub fn drain(&self) -> Vec<E> {
        let Some(bus) = self.bus.upgrade() else {
            return Vec::new();
        };
        let mut inner = bus.borrow_mut();
        inner
            .queues
            .get_mut(&self.id)
            .map(|q| q.drain(..).collect())
            .unwrap_or_default()
    }

    /// Whether the bus this subscription belongs to still exists.
    pub fn is_connected(&self) -> bool {
        self.bus.strong_count() > 0
    }
}

impl<E> Drop for Subscription<E> {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.borrow_mut().queues.remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_reaches_every_subscriber() {
        let bus = EventBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();
        bus.post(HostCommand::FindNext);
        assert_eq!(a.drain(), vec![HostCommand::FindNext]);
        assert_eq!(b.try_next(), Some(HostCommand::FindNext));
        assert_eq!(b.try_next(), None);
    }

    #[test]
    fn test_events_before_subscribe_are_not_seen() {
        let bus = EventBus::new();
        bus.post(ListEvent::ClearSearch);
        let late = bus.subscribe();
        assert!(late.drain().is_empty());
    }

    #[test]
    fn test_drop_unregisters() {
        let bus: EventBus<FindBarEvent> = EventBus::new();
        let sub = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);
        drop(sub);
        assert_eq!(bus.subscriber_count(), 0);
        // posting with no subscribers is harmless
        bus.post(FindBarEvent::ClearStatus);
    }

    #[test]
    fn test_subscription_outliving_bus() {
        let bus: EventBus<ListEvent> = EventBus::new();
        let sub = bus.subscribe();
        drop(bus);
        assert!(!sub.is_connected());
        assert!(sub.drain().is_empty());
        assert_eq!(sub.try_next(), None);
    }

    #[test]
    fn test_fifo_order() {
        let bus = EventBus::new();
        let sub = bus.subscribe();
        bus.post(ListEvent::SearchText("a".into()));
        bus.post(ListEvent::SearchText("ab".into()));
        bus.post(ListEvent::ClearSearch);
        assert_eq!(
            sub.drain(),
            vec![
                ListEvent::SearchText("a".into()),
                ListEvent::SearchText("ab".into()),
                ListEvent::ClearSearch,
            ]
        );
    }
}
