// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storykeep-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storykeep and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Hydration snapshot: flat node lists grouped by type, as delivered by the backend.

use std::io;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Node, NodeId, NodeType};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct LoadData {
    pub file_nodes: Vec<Node>,
    pub menu_nodes: Vec<Node>,
    pub belief_nodes: Vec<Node>,
    pub storyfragment_nodes: Vec<Node>,
    pub pane_nodes: Vec<Node>,
    pub pane_fragment_nodes: Vec<Node>,
    pub flat_nodes: Vec<Node>,
    pub impression_nodes: Vec<Node>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("load data is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("node {node_id} in {list} has nodeType {found}")]
    MisfiledNode { list: &'static str, node_id: NodeId, found: NodeType },
}

impl LoadData {
    pub fn from_json_str(raw: &str) -> Result<Self, LoadError> {
        let data: Self = serde_json::from_str(raw)?;
        data.check_lists()?;
        Ok(data)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
        Self::from_json_str(&raw)
    }

    pub fn len(&self) -> usize {
        self.lists().map(|(_, nodes)| nodes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All nodes, parents before the lists that reference them.
    pub fn into_nodes(self) -> Vec<Node> {
        let mut out = Vec::with_capacity(self.len());
        out.extend(self.file_nodes);
        out.extend(self.menu_nodes);
        out.extend(self.belief_nodes);
        out.extend(self.storyfragment_nodes);
        out.extend(self.pane_nodes);
        out.extend(self.pane_fragment_nodes);
        out.extend(self.flat_nodes);
        out.extend(self.impression_nodes);
        out
    }

    fn lists(&self) -> impl Iterator<Item = (&'static str, &[Node])> {
        [
            ("fileNodes", self.file_nodes.as_slice()),
            ("menuNodes", self.menu_nodes.as_slice()),
            ("beliefNodes", self.belief_nodes.as_slice()),
            ("storyfragmentNodes", self.storyfragment_nodes.as_slice()),
            ("paneNodes", self.pane_nodes.as_slice()),
            ("paneFragmentNodes", self.pane_fragment_nodes.as_slice()),
            ("flatNodes", self.flat_nodes.as_slice()),
            ("impressionNodes", self.impression_nodes.as_slice()),
        ]
        .into_iter()
    }

    fn check_lists(&self) -> Result<(), LoadError> {
        for (list, nodes) in self.lists() {
            for node in nodes {
                let found = node.node_type();
                if !list_accepts(list, found) {
                    return Err(LoadError::MisfiledNode {
                        list,
                        node_id: node.id().clone(),
                        found,
                    });
                }
            }
        }
        Ok(())
    }
}

fn list_accepts(list: &str, node_type: NodeType) -> bool {
    match list {
        "fileNodes" => node_type == NodeType::File,
        "menuNodes" => node_type == NodeType::Menu,
        "beliefNodes" => node_type == NodeType::Belief,
        "storyfragmentNodes" => node_type == NodeType::StoryFragment,
        "paneNodes" => node_type == NodeType::Pane,
        "paneFragmentNodes" => node_type.is_pane_fragment(),
        "flatNodes" => node_type == NodeType::TagElement,
        "impressionNodes" => node_type == NodeType::Impression,
        _ => false,
    }
}

/// What hydration repaired on the way in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HydrationReport {
    pub inserted: usize,
    /// Ids that appeared more than once; the last occurrence wins.
    pub duplicates: Vec<NodeId>,
    /// Nodes dropped because their parent chain was broken (subtrees included).
    pub dropped_orphans: Vec<NodeId>,
    /// Story fragments whose `paneIds` disagreed with their pane children.
    pub reconciled: Vec<NodeId>,
}

impl HydrationReport {
    pub fn is_clean(&self) -> bool {
        self.duplicates.is_empty() && self.dropped_orphans.is_empty() && self.reconciled.is_empty()
    }
}
