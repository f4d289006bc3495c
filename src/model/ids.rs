// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storykeep-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storykeep and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use ulid::{Generator, Ulid};

/// Key used for parentless nodes in the child index and for "re-read everything"
/// notifications.
pub const ROOT_NODE_NAME: &str = "root";

/// Stable identity of a node in the tree.
///
/// Freshly allocated ids are ULIDs. Ids coming from a load snapshot are accepted as
/// any non-empty, whitespace-free string, except the reserved [`ROOT_NODE_NAME`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        validate_node_id(&value)?;
        Ok(Self(value))
    }

    /// The reserved root key. Never stored as a node.
    pub fn root() -> Self {
        Self(ROOT_NODE_NAME.to_owned())
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT_NODE_NAME
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid.to_string())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl FromStr for NodeId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_owned())
    }
}

impl TryFrom<String> for NodeId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("node id must not be empty")]
    Empty,
    #[error("node id must not contain whitespace")]
    ContainsWhitespace,
    #[error("node id 'root' is reserved")]
    Reserved,
}

fn validate_node_id(value: &str) -> Result<(), IdError> {
    if value.is_empty() {
        return Err(IdError::Empty);
    }
    if value.chars().any(char::is_whitespace) {
        return Err(IdError::ContainsWhitespace);
    }
    if value == ROOT_NODE_NAME {
        return Err(IdError::Reserved);
    }
    Ok(())
}

/// Hands out fresh node ids for one editing session.
///
/// Ids are monotonic ULIDs; an id is skipped when `is_taken` reports it as live or
/// retired, so an id is never handed out twice.
pub struct IdAllocator {
    generator: Generator,
    issued: HashSet<NodeId>,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IdAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdAllocator").field("issued", &self.issued.len()).finish()
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { generator: Generator::new(), issued: HashSet::new() }
    }

    pub fn next_id(&mut self, is_taken: impl Fn(&NodeId) -> bool) -> NodeId {
        loop {
            // Overflow only happens after 2^80 ids in one millisecond.
            let ulid = self.generator.generate().unwrap_or_else(|_| Ulid::new());
            let id = NodeId::from_ulid(ulid);
            if self.issued.contains(&id) || is_taken(&id) {
                continue;
            }
            self.issued.insert(id.clone());
            return id;
        }
    }

    pub fn issued_count(&self) -> usize {
        self.issued.len()
    }
}
