// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storykeep-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storykeep and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::future::Future;
use std::rc::Rc;

use crate::context::NodesContext;

impl NodesContext {
    /// Runs `build` against a scratch copy of this context and merges its writes only
    /// when it returns `Ok`.
    ///
    /// The scratch copy has its own subscribers, so nothing live is notified while
    /// `build` runs, even across awaits. On success the writes are replayed onto the
    /// live store (live edits made meanwhile to other nodes are kept) and a single root
    /// notification fires. On error the live store is untouched and the error is
    /// returned as is.
    pub async fn apply_atomic_update<F, Fut, T, E>(&self, build: F) -> Result<T, E>
    where
        F: FnOnce(Rc<NodesContext>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let scratch = Rc::new(self.scratch());
        let value = build(Rc::clone(&scratch)).await?;
        self.commit_scratch(&scratch);
        Ok(value)
    }

    /// Blocking form of [`NodesContext::apply_atomic_update`].
    pub fn apply_atomic_update_sync<T, E>(
        &self,
        build: impl FnOnce(&NodesContext) -> Result<T, E>,
    ) -> Result<T, E> {
        let scratch = self.scratch();
        let value = build(&scratch)?;
        self.commit_scratch(&scratch);
        Ok(value)
    }

    fn commit_scratch(&self, scratch: &NodesContext) {
        let summary = self.absorb(scratch);
        tracing::debug!(
            upserted = summary.upserted.len(),
            removed = summary.removed.len(),
            dropped = summary.dropped.len(),
            "atomic update merged"
        );
        self.refresh_dirty_count();
        self.notify_root();
    }
}
