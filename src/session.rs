// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storykeep-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storykeep and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Default editing context for the current UI thread.
//!
//! Code that can take a [`NodesContext`] handle should. This exists for the application
//! root, which starts a session on mount and ends it on navigation.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::EditorConfig;
use crate::context::NodesContext;

thread_local! {
    static CURRENT: RefCell<Option<Rc<NodesContext>>> = const { RefCell::new(None) };
}

/// Installs a fresh context, replacing (and returning) any previous one.
pub fn start(config: EditorConfig) -> (Rc<NodesContext>, Option<Rc<NodesContext>>) {
    let ctx = Rc::new(NodesContext::new(config));
    let previous = CURRENT.with(|current| current.borrow_mut().replace(Rc::clone(&ctx)));
    if previous.is_some() {
        tracing::debug!("session restarted; previous context released");
    }
    (ctx, previous)
}

pub fn current() -> Option<Rc<NodesContext>> {
    CURRENT.with(|current| current.borrow().clone())
}

/// Tears down the session. Handles obtained earlier stay valid but are no longer
/// returned by [`current`].
pub fn end() -> Option<Rc<NodesContext>> {
    CURRENT.with(|current| current.borrow_mut().take())
}
