//! Subscription bookkeeping from host triggers to owner handlers.

use shared::trigger::{Trigger, TriggerKind, TriggerSource};

/// A handler receives its owner explicitly instead of capturing it.
pub type Handler<T> = fn(&mut T, &Trigger);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerKey(u64);

struct Listener<T> {
    key: ListenerKey,
    source: TriggerSource,
    kind: TriggerKind,
    handler: Handler<T>,
}

pub struct EventRegistry<T> {
    listeners: Vec<Listener<T>>,
    next_key: u64,
    disposed: bool,
}

impl<T> Default for EventRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EventRegistry<T> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_key: 0,
            disposed: false,
        }
    }

    /// Registers `handler` for `kind` triggers coming from `source`.
    ///
    /// A missing source (an element the host could not resolve) registers
    /// nothing and returns `None`, as does a disposed registry.
    pub fn listen(
        &mut self,
        source: Option<TriggerSource>,
        kind: TriggerKind,
        handler: Handler<T>,
    ) -> Option<ListenerKey> {
        if self.disposed {
            return None;
        }
        let source = source?;
        let key = ListenerKey(self.next_key);
        self.next_key += 1;
        self.listeners.push(Listener {
            key,
            source,
            kind,
            handler,
        });
        Some(key)
    }

    pub fn unlisten(&mut self, key: ListenerKey) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|listener| listener.key != key);
        self.listeners.len() != before
    }

    pub fn remove_all(&mut self) {
        self.listeners.clear();
    }

    /// Handlers registered for `trigger`, in registration order.
    pub fn handlers_for(&self, trigger: &Trigger) -> Vec<Handler<T>> {
        self.listeners
            .iter()
            .filter(|listener| trigger.matches(&listener.source, listener.kind))
            .map(|listener| listener.handler)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.remove_all();
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
