// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storykeep-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storykeep and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mutation operations on a [`NodesContext`].
//!
//! Every operation writes the store, marks the affected save units dirty, releases the
//! store, and only then notifies. Structural failures (missing owner, anchor or node)
//! are silent no-ops reported through the return value.

mod atomic;
mod mutate;
mod template;

use crate::context::NodesContext;
use crate::model::{NodeId, NodeType};
use crate::notify::{Notification, NotifyCause};
use crate::query::closest_node_of_type;
use crate::store::NodeStore;

pub use crate::store::Position;

/// Collects the notifications an operation owes, one per node id.
///
/// A child-list change outranks a content change for the same id.
#[derive(Debug, Default)]
pub(crate) struct Changes {
    notifications: Vec<Notification>,
}

impl Changes {
    pub(crate) fn record_content(&mut self, node_id: &NodeId) {
        self.record(node_id, NotifyCause::Content);
    }

    pub(crate) fn record_children(&mut self, parent: &NodeId) {
        self.record(parent, NotifyCause::Children);
    }

    fn record(&mut self, node_id: &NodeId, cause: NotifyCause) {
        match self.notifications.iter_mut().find(|pending| &pending.node_id == node_id) {
            Some(pending) => {
                if cause == NotifyCause::Children {
                    pending.cause = cause;
                }
            }
            None => self.notifications.push(Notification { node_id: node_id.clone(), cause }),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    /// Sends everything recorded. The store must not be borrowed.
    pub(crate) fn dispatch(self, ctx: &NodesContext) -> usize {
        ctx.refresh_dirty_count();
        self.notifications
            .iter()
            .map(|pending| ctx.bus().notify(&pending.node_id, pending.cause))
            .sum()
    }
}

/// Marks `node_id` dirty together with the pane that owns it.
pub(crate) fn mark_save_unit(store: &mut NodeStore, node_id: &NodeId) {
    store.mark_changed(node_id);
    if let Some(pane_id) = closest_node_of_type(store, node_id, NodeType::Pane) {
        store.mark_changed(&pane_id);
    }
}

#[cfg(test)]
mod tests;
