// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storykeep-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storykeep and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Coalesced form writes.
//!
//! Each field group (the key) holds at most one pending write. Scheduling again replaces
//! the pending nodes and restarts the settle delay; writes reach the context only after
//! the key has been quiet for the whole delay.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use crate::config::EditorConfig;
use crate::context::NodesContext;
use crate::model::Node;

#[derive(Debug)]
struct PendingWrite {
    due: Instant,
    seq: u64,
    nodes: Vec<Node>,
}

#[derive(Debug)]
pub struct WriteCoalescer<K> {
    delay: Duration,
    pending: HashMap<K, PendingWrite>,
    next_seq: u64,
}

impl<K: Eq + Hash> WriteCoalescer<K> {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: HashMap::new(), next_seq: 0 }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.debounce())
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Queues `nodes` for `key`, due `delay` after `now`. Returns `true` when an
    /// earlier pending write for `key` was replaced.
    pub fn schedule(&mut self, key: K, nodes: Vec<Node>, now: Instant) -> bool {
        let seq = self.next_seq;
        self.next_seq += 1;
        let write = PendingWrite { due: now + self.delay, seq, nodes };
        self.pending.insert(key, write).is_some()
    }

    pub fn cancel(&mut self, key: &K) -> bool {
        self.pending.remove(key).is_some()
    }

    /// Earliest due time among pending writes.
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.values().map(|write| write.due).min()
    }

    /// Removes the writes due at `now`, in scheduling order.
    pub fn flush_due(&mut self, now: Instant) -> Vec<Node> {
        let mut due = Vec::new();
        self.pending.retain(|_, write| {
            if write.due <= now {
                due.push((write.seq, std::mem::take(&mut write.nodes)));
                false
            } else {
                true
            }
        });
        collect_in_order(due)
    }

    /// Removes every pending write regardless of its due time.
    pub fn flush_all(&mut self) -> Vec<Node> {
        let writes = self.pending.drain().map(|(_, write)| (write.seq, write.nodes)).collect();
        collect_in_order(writes)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Applies the writes due at `now` through [`NodesContext::modify_nodes`].
    pub fn apply_due(&mut self, ctx: &NodesContext, now: Instant) -> usize {
        let nodes = self.flush_due(now);
        if nodes.is_empty() {
            return 0;
        }
        ctx.modify_nodes(nodes)
    }

    /// Waits for each pending write to settle and applies it. Returns how many nodes
    /// were written.
    pub async fn settle(&mut self, ctx: &NodesContext) -> usize {
        let mut applied = 0;
        while let Some(due) = self.next_due() {
            tokio::time::sleep_until(tokio::time::Instant::from_std(due)).await;
            applied += self.apply_due(ctx, Instant::now());
        }
        tracing::debug!(applied, "coalesced writes settled");
        applied
    }
}

fn collect_in_order(mut writes: Vec<(u64, Vec<Node>)>) -> Vec<Node> {
    writes.sort_by_key(|(seq, _)| *seq);
    writes.into_iter().flat_map(|(_, nodes)| nodes).collect()
}
