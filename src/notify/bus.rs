// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storykeep-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storykeep and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use super::atom::Atom;
use super::subscription::Subscription;
use crate::model::NodeId;

/// Why a node's subscribers are being called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotifyCause {
    /// The node's own record changed.
    Content,
    /// The node's child list changed (insert, delete, reorder, relink).
    Children,
    /// Sent on the root key after bulk changes: re-read everything.
    Root,
    /// Catch-up after an edit lock on the node was released.
    Resync,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub node_id: NodeId,
    pub cause: NotifyCause,
}

/// Whether a subscriber keeps listening while its node is being edited inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubscribeMode {
    #[default]
    Always,
    UnlessEditing,
}

type Callback = Rc<RefCell<dyn FnMut(&Notification)>>;

struct Subscriber {
    key: u64,
    mode: SubscribeMode,
    callback: Callback,
}

#[derive(Default)]
struct BusState {
    subscribers: HashMap<NodeId, Vec<Subscriber>>,
    next_key: u64,
    suppressed_while_editing: bool,
}

/// Publish/subscribe keyed by node id, plus the root key.
///
/// Callbacks run synchronously inside `notify`, after the caller finished writing, so
/// they may read (or mutate) the store freely. Clones share subscribers.
#[derive(Clone)]
pub struct NotificationBus {
    state: Rc<RefCell<BusState>>,
    editing: Atom<Option<NodeId>>,
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationBus {
    pub fn new() -> Self {
        Self { state: Rc::new(RefCell::new(BusState::default())), editing: Atom::new(None) }
    }

    /// Subscribes to `node_id`. Unknown ids are fine: the callback fires once that id is
    /// notified.
    pub fn subscribe(
        &self,
        node_id: &NodeId,
        callback: impl FnMut(&Notification) + 'static,
    ) -> Subscription {
        self.subscribe_with_mode(node_id, SubscribeMode::Always, callback)
    }

    pub fn subscribe_with_mode(
        &self,
        node_id: &NodeId,
        mode: SubscribeMode,
        callback: impl FnMut(&Notification) + 'static,
    ) -> Subscription {
        let callback: Callback = Rc::new(RefCell::new(callback));
        let key = {
            let mut state = self.state.borrow_mut();
            let key = state.next_key;
            state.next_key += 1;
            state
                .subscribers
                .entry(node_id.clone())
                .or_default()
                .push(Subscriber { key, mode, callback });
            key
        };

        let weak: Weak<RefCell<BusState>> = Rc::downgrade(&self.state);
        let node_id = node_id.clone();
        Subscription::new(move || {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let mut state = state.borrow_mut();
            if let Some(subscribers) = state.subscribers.get_mut(&node_id) {
                subscribers.retain(|subscriber| subscriber.key != key);
                if subscribers.is_empty() {
                    state.subscribers.remove(&node_id);
                }
            }
        })
    }

    pub fn subscribe_root(&self, callback: impl FnMut(&Notification) + 'static) -> Subscription {
        self.subscribe(&NodeId::root(), callback)
    }

    /// Notifies `node_id`'s subscribers of a content change.
    pub fn notify_node(&self, node_id: &NodeId) -> usize {
        self.notify(node_id, NotifyCause::Content)
    }

    pub fn notify_root(&self) -> usize {
        self.notify(&NodeId::root(), NotifyCause::Root)
    }

    /// Invokes every subscriber of `node_id` once. Returns how many ran.
    pub fn notify(&self, node_id: &NodeId, cause: NotifyCause) -> usize {
        let locked = self.editing.with(|editing| editing.as_ref() == Some(node_id));
        let targets = {
            let mut state = self.state.borrow_mut();
            let mut suppressed = false;
            let targets = match state.subscribers.get(node_id) {
                Some(subscribers) => subscribers
                    .iter()
                    .filter(|subscriber| {
                        let skip = locked && subscriber.mode == SubscribeMode::UnlessEditing;
                        suppressed |= skip;
                        !skip
                    })
                    .map(|subscriber| (subscriber.key, Rc::clone(&subscriber.callback)))
                    .collect::<SmallVec<[(u64, Callback); 4]>>(),
                None => SmallVec::new(),
            };
            if suppressed {
                state.suppressed_while_editing = true;
            }
            targets
        };

        let notification = Notification { node_id: node_id.clone(), cause };
        self.dispatch(&notification, targets)
    }

    /// Id currently being edited inline.
    pub fn editing(&self) -> &Atom<Option<NodeId>> {
        &self.editing
    }

    /// Moves the edit lock. Releasing a lock that swallowed notifications sends one
    /// [`NotifyCause::Resync`] to the formerly locked node's gated subscribers.
    pub fn set_editing_node_id(&self, node_id: Option<NodeId>) {
        let previous = self.editing.get();
        if previous == node_id {
            return;
        }
        let owed = std::mem::take(&mut self.state.borrow_mut().suppressed_while_editing);
        self.editing.set(node_id);

        let Some(previous) = previous.filter(|_| owed) else {
            return;
        };
        let targets = self
            .state
            .borrow()
            .subscribers
            .get(&previous)
            .map(|subscribers| {
                subscribers
                    .iter()
                    .filter(|subscriber| subscriber.mode == SubscribeMode::UnlessEditing)
                    .map(|subscriber| (subscriber.key, Rc::clone(&subscriber.callback)))
                    .collect::<SmallVec<[(u64, Callback); 4]>>()
            })
            .unwrap_or_default();
        let notification = Notification { node_id: previous, cause: NotifyCause::Resync };
        self.dispatch(&notification, targets);
    }

    pub fn subscriber_count(&self, node_id: &NodeId) -> usize {
        self.state.borrow().subscribers.get(node_id).map_or(0, Vec::len)
    }

    fn dispatch(
        &self,
        notification: &Notification,
        targets: SmallVec<[(u64, Callback); 4]>,
    ) -> usize {
        let mut delivered = 0;
        for (key, callback) in targets {
            // A callback earlier in this round may have unsubscribed this one.
            if !self.is_registered(&notification.node_id, key) {
                continue;
            }
            match callback.try_borrow_mut() {
                Ok(mut callback) => {
                    (&mut *callback)(notification);
                    delivered += 1;
                }
                Err(_) => {
                    tracing::warn!(
                        node_id = %notification.node_id,
                        "subscriber re-entered its own notification; skipping"
                    );
                }
            }
        }
        delivered
    }

    fn is_registered(&self, node_id: &NodeId, key: u64) -> bool {
        self.state
            .borrow()
            .subscribers
            .get(node_id)
            .is_some_and(|subscribers| subscribers.iter().any(|subscriber| subscriber.key == key))
    }
}

impl fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("NotificationBus")
            .field("keys", &state.subscribers.len())
            .field("editing", &self.editing.get())
            .finish()
    }
}
