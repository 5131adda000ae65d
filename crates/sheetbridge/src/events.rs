//! Named event registry.
//!
//! Names are case-insensitive. Each name has any number of listeners plus
//! at most one direct handler; emitting calls the listeners in registration
//! order and then the handler.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Event callback
pub type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Entry<E> {
    listeners: Vec<Listener<E>>,
    handler: Option<Listener<E>>,
}

impl<E> Default for Entry<E> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
            handler: None,
        }
    }
}

pub struct EventRegistry<E> {
    entries: Mutex<HashMap<String, Entry<E>>>,
}

impl<E> Default for EventRegistry<E> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<E> EventRegistry<E> {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entry<R>(&self, name: &str, f: impl FnOnce(&mut Entry<E>) -> R) -> R {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        f(entries.entry(name.to_lowercase()).or_default())
    }

    /// Add a listener
    pub fn on(&self, name: &str, listener: Listener<E>) {
        self.with_entry(name, |entry| entry.listeners.push(listener));
    }

    /// Replace the direct handler
    pub fn set_handler(&self, name: &str, handler: Listener<E>) {
        self.with_entry(name, |entry| entry.handler = Some(handler));
    }

    pub fn clear_handler(&self, name: &str) {
        self.with_entry(name, |entry| entry.handler = None);
    }

    pub fn has_handler(&self, name: &str) -> bool {
        self.with_entry(name, |entry| entry.handler.is_some())
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.with_entry(name, |entry| entry.listeners.len())
    }

    /// Deliver `event`, returning how many callbacks ran.
    ///
    /// Callbacks run outside the lock and may register further callbacks;
    /// those see the next emission.
    pub fn emit(&self, name: &str, event: &E) -> usize {
        let callbacks: Vec<Listener<E>> = self.with_entry(name, |entry| {
            entry
                .listeners
                .iter()
                .chain(entry.handler.iter())
                .cloned()
                .collect()
        });
        for callback in &callbacks {
            callback(event);
        }
        callbacks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn recorder(log: &Arc<Mutex<Vec<String>>>, tag: &str) -> Listener<u32> {
        let log = log.clone();
        let tag = tag.to_string();
        Arc::new(move |value: &u32| log.lock().unwrap().push(format!("{}:{}", tag, value)))
    }

    #[test]
    fn test_listeners_then_handler() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = EventRegistry::new();
        registry.set_handler("saved", recorder(&log, "handler"));
        registry.on("saved", recorder(&log, "first"));
        registry.on("SAVED", recorder(&log, "second"));

        assert_eq!(registry.emit("Saved", &7), 3);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["first:7", "second:7", "handler:7"]
        );
    }

    #[test]
    fn test_handler_is_replaced() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = EventRegistry::new();
        registry.set_handler("changed", recorder(&log, "old"));
        registry.set_handler("changed", recorder(&log, "new"));
        registry.emit("changed", &1);
        assert_eq!(*log.lock().unwrap(), vec!["new:1"]);

        registry.clear_handler("changed");
        assert!(!registry.has_handler("changed"));
        assert_eq!(registry.emit("changed", &2), 0);
    }

    #[test]
    fn test_listener_may_register_during_emit() {
        let registry: Arc<EventRegistry<u32>> = Arc::new(EventRegistry::new());
        let inner = registry.clone();
        registry.on(
            "ready",
            Arc::new(move |_: &u32| inner.on("ready", Arc::new(|_: &u32| {}))),
        );
        assert_eq!(registry.emit("ready", &0), 1);
        assert_eq!(registry.listener_count("ready"), 2);
    }
}
