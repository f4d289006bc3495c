// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storykeep-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storykeep and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! In-memory node storage.
//!
//! `NodeStore` is the single source of truth for an editing session: O(1) lookups by id,
//! an ordered child index, and journaled forks used by atomic updates.

pub mod node_store;

pub use node_store::{parent_key, Journal, MergeSummary, NodeStore, Position};
