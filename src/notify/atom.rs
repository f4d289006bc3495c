// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storykeep-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storykeep and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use super::subscription::Subscription;

type Listener<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct AtomInner<T> {
    value: RefCell<T>,
    listeners: RefCell<Vec<(u64, Listener<T>)>>,
    next_key: Cell<u64>,
}

/// Observable value cell: `get`, `set`, `subscribe`.
///
/// Clones share the same cell. Listeners run after the new value is stored and only
/// when the value actually changed.
pub struct Atom<T> {
    inner: Rc<AtomInner<T>>,
}

impl<T> Clone for Atom<T> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<T: Clone + PartialEq + 'static> Atom<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(AtomInner {
                value: RefCell::new(value),
                listeners: RefCell::new(Vec::new()),
                next_key: Cell::new(0),
            }),
        }
    }

    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Stores `value`; returns `false` (and notifies nobody) when it is unchanged.
    pub fn set(&self, value: T) -> bool {
        {
            let mut current = self.inner.value.borrow_mut();
            if *current == value {
                return false;
            }
            *current = value;
        }

        let snapshot = self.get();
        let listeners = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(key, listener)| (*key, Rc::clone(listener)))
            .collect::<Vec<_>>();
        for (key, listener) in listeners {
            if !self.is_listening(key) {
                continue;
            }
            if let Ok(mut listener) = listener.try_borrow_mut() {
                (&mut *listener)(&snapshot);
            } else {
                tracing::warn!(key, "atom listener re-entered; skipping nested update");
            }
        }
        true
    }

    /// Calls `listener` on every future change.
    pub fn listen(&self, listener: impl FnMut(&T) + 'static) -> Subscription {
        let key = self.inner.next_key.get();
        self.inner.next_key.set(key + 1);
        let listener: Listener<T> = Rc::new(RefCell::new(listener));
        self.inner.listeners.borrow_mut().push((key, listener));

        let weak: Weak<AtomInner<T>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.listeners.borrow_mut().retain(|(k, _)| *k != key);
            }
        })
    }

    /// Like [`Atom::listen`], but also calls `listener` once with the current value.
    pub fn subscribe(&self, mut listener: impl FnMut(&T) + 'static) -> Subscription {
        listener(&self.get());
        self.listen(listener)
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    fn is_listening(&self, key: u64) -> bool {
        self.inner.listeners.borrow().iter().any(|(k, _)| *k == key)
    }
}

impl<T: fmt::Debug> fmt::Debug for Atom<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Atom")
            .field("value", &self.inner.value.borrow())
            .field("listeners", &self.inner.listeners.borrow().len())
            .finish()
    }
}
