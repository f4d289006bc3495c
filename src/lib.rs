// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storykeep-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storykeep and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Storykeep: the node-tree core of a visual page editor.
//!
//! A [`NodesContext`] owns the nodes of one editing session (story fragments, panes,
//! markdown blocks and their tag elements), notifies subscribers per node id, and
//! tracks what needs saving. Everything runs on one thread; async only appears at the
//! edges ([`NodesContext::apply_atomic_update`], [`WriteCoalescer::settle`]).

pub mod config;
pub mod context;
pub mod debounce;
pub mod dirty;
pub mod load;
pub mod model;
pub mod notify;
pub mod ops;
pub mod query;
pub mod session;
pub mod slug;
pub mod store;

pub use config::{ConfigError, EditorConfig};
pub use context::NodesContext;
pub use debounce::WriteCoalescer;
pub use dirty::PendingUpload;
pub use load::{HydrationReport, LoadData, LoadError};
pub use model::{Node, NodeId, NodeKind, NodeType, Viewport};
pub use notify::{Notification, NotifyCause, SubscribeMode, Subscription};
pub use ops::Position;
