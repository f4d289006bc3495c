// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storykeep-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storykeep and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Slugs: lowercase ASCII words joined by single dashes, unique across panes and story
//! fragments.

use std::sync::OnceLock;

use regex::Regex;

use crate::context::NodesContext;
use crate::model::{NodeId, NodeType};

const SLUG_PATTERN: &str = r"^[a-z0-9]+(?:-[a-z0-9]+)*$";
const FALLBACK_SLUG: &str = "page";

fn slug_regex() -> Option<&'static Regex> {
    static SLUG_RE: OnceLock<Option<Regex>> = OnceLock::new();
    SLUG_RE.get_or_init(|| Regex::new(SLUG_PATTERN).ok()).as_ref()
}

pub fn is_slug_valid(slug: &str, max_len: usize) -> bool {
    !slug.is_empty()
        && slug.len() <= max_len
        && slug_regex().is_some_and(|re| re.is_match(slug))
}

/// Lowercases `title`, joins its ASCII words with dashes and cuts at `max_len` on a
/// word boundary where possible.
pub fn title_to_slug(title: &str, max_len: usize) -> String {
    let mut slug = String::with_capacity(title.len().min(max_len));
    let mut pending_dash = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    truncate_slug(&slug, max_len).to_owned()
}

fn truncate_slug(slug: &str, max_len: usize) -> &str {
    if slug.len() <= max_len {
        return slug;
    }
    let cut = &slug[..max_len];
    match cut.rfind('-') {
        Some(at) if at > 0 && slug.as_bytes()[max_len] != b'-' => &cut[..at],
        _ => cut.trim_end_matches('-'),
    }
}

/// `base` if it is free, otherwise `base-2`, `base-3`, ... within `max_len`.
pub fn find_unique_slug(base: &str, max_len: usize, is_taken: impl Fn(&str) -> bool) -> String {
    let base = if is_slug_valid(base, max_len) {
        base.to_owned()
    } else {
        let cleaned = title_to_slug(base, max_len);
        if cleaned.is_empty() {
            FALLBACK_SLUG.to_owned()
        } else {
            cleaned
        }
    };
    if !is_taken(&base) {
        return base;
    }

    let mut counter = 2u32;
    let mut buffer = itoa::Buffer::new();
    loop {
        let suffix = buffer.format(counter);
        let stem = truncate_slug(&base, max_len.saturating_sub(suffix.len() + 1));
        let candidate = format!("{stem}-{suffix}");
        if !is_taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

impl NodesContext {
    /// Whether no pane or story fragment other than `except` uses `slug`.
    pub fn is_slug_available(&self, slug: &str, except: Option<&NodeId>) -> bool {
        let store = self.store();
        let taken = store.iter().any(|node| {
            matches!(node.node_type(), NodeType::Pane | NodeType::StoryFragment)
                && Some(node.id()) != except
                && node.slug() == Some(slug)
        });
        !taken
    }

    pub fn is_slug_valid(&self, slug: &str) -> bool {
        is_slug_valid(slug, self.config().slug_max_len)
    }

    pub fn find_unique_slug(&self, base: &str) -> String {
        find_unique_slug(base, self.config().slug_max_len, |candidate| {
            !self.is_slug_available(candidate, None)
        })
    }
}
