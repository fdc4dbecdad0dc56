//! KeyedList<T>: an ordered list of keyed children maintained from
//! [`ChildEvent`]s.
//!
//! Each applied event reports a [`ListChange`] so a presentation layer can
//! update only the affected rows.

use crate::query::{ChildEvent, ChildEventKind};

/// What an applied event did to the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListChange {
    Inserted(usize),
    Changed(usize),
    Removed(usize),
    Moved { from: usize, to: usize },
    /// The event referred to a key the list does not hold, or had no key.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct KeyedList<T> {
    entries: Vec<(String, T)>,
}

impl<T> KeyedList<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    pub fn get(&self, index: usize) -> Option<(&str, &T)> {
        self.entries.get(index).map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Index just after `previous`, when it is held.
    fn after(&self, previous: Option<&str>) -> Option<usize> {
        previous.and_then(|p| self.position(p)).map(|i| i + 1)
    }

    /// Apply one child mutation.
    ///
    /// Additions go right after their previous sibling when the list holds
    /// it, otherwise at the end. Moves go after their previous sibling, or to
    /// the front when there is none.
    pub fn apply(&mut self, event: ChildEvent<T>) -> ListChange {
        let Some(key) = event.key else {
            tracing::warn!(kind = ?event.kind, "child event without a key");
            return ListChange::Ignored;
        };
        let previous = event.previous_sibling_key.as_deref();

        match event.kind {
            ChildEventKind::Added => {
                if let Some(index) = self.position(&key) {
                    self.entries[index].1 = event.value;
                    return ListChange::Changed(index);
                }
                let index = self.after(previous).unwrap_or(self.entries.len());
                self.entries.insert(index, (key, event.value));
                ListChange::Inserted(index)
            }
            ChildEventKind::Changed => match self.position(&key) {
                Some(index) => {
                    self.entries[index].1 = event.value;
                    ListChange::Changed(index)
                }
                None => {
                    tracing::warn!(key = %key, "child changed for unknown key");
                    ListChange::Ignored
                }
            },
            ChildEventKind::Removed => match self.position(&key) {
                Some(index) => {
                    self.entries.remove(index);
                    ListChange::Removed(index)
                }
                None => {
                    tracing::warn!(key = %key, "child removed for unknown key");
                    ListChange::Ignored
                }
            },
            ChildEventKind::Moved => {
                let Some(from) = self.position(&key) else {
                    tracing::warn!(key = %key, "child moved for unknown key");
                    return ListChange::Ignored;
                };
                self.entries.remove(from);
                let to = self.after(previous).unwrap_or(0);
                self.entries.insert(to, (key, event.value));
                ListChange::Moved { from, to }
            }
        }
    }
}

impl<T> Default for KeyedList<T> {
    fn default() -> Self {
        Self::new()
    }
}
