//! Stack resolution - pure functions over the branch tree
//!
//! No I/O happens here. The tree is built from stack metadata by the stack
//! adapter and handed in; everything else is deterministic and unit-testable.

use crate::error::{Error, Result};
use crate::types::BranchNode;
use std::collections::{BTreeMap, HashSet};

/// Arena of [`BranchNode`]s indexed by name, validated at construction.
///
/// Construction rejects malformed input (no trunk, multiple trunks, a parent
/// that is not in the set, or a parent cycle) rather than looping later.
#[derive(Debug, Clone)]
pub struct BranchTree {
    nodes: BTreeMap<String, BranchNode>,
    trunk: String,
}

impl BranchTree {
    /// Build a validated tree from a flat list of nodes.
    ///
    /// Child links are recomputed from the parent links, so callers only need
    /// to fill in `parent`.
    pub fn new(nodes: Vec<BranchNode>) -> Result<Self> {
        let mut trunk = None;
        for node in &nodes {
            if node.is_trunk {
                if node.parent.is_some() {
                    return Err(Error::MalformedTree(format!(
                        "trunk '{}' has a parent",
                        node.name
                    )));
                }
                if let Some(ref existing) = trunk {
                    return Err(Error::MalformedTree(format!(
                        "multiple trunk branches: '{existing}' and '{}'",
                        node.name
                    )));
                }
                trunk = Some(node.name.clone());
            } else if node.parent.is_none() {
                return Err(Error::MalformedTree(format!(
                    "non-trunk branch '{}' has no parent",
                    node.name
                )));
            }
        }
        let trunk =
            trunk.ok_or_else(|| Error::MalformedTree("no trunk branch".to_string()))?;

        let mut map: BTreeMap<String, BranchNode> =
            nodes.into_iter().map(|n| (n.name.clone(), n)).collect();

        // Recompute child links and check parents resolve.
        let links: Vec<(String, String)> = map
            .values()
            .filter_map(|n| n.parent.clone().map(|p| (p, n.name.clone())))
            .collect();
        for (parent, child) in links {
            match map.get_mut(&parent) {
                Some(node) => {
                    node.children.insert(child);
                }
                None => {
                    return Err(Error::MalformedTree(format!(
                        "branch '{child}' has unknown parent '{parent}'"
                    )));
                }
            }
        }

        let tree = Self { nodes: map, trunk };

        // Every non-trunk node must reach trunk without revisiting a branch.
        for name in tree.nodes.keys() {
            tree.ancestors_to_trunk(name)?;
        }

        Ok(tree)
    }

    /// The trunk branch name
    pub fn trunk(&self) -> &str {
        &self.trunk
    }

    /// Look up a node by name
    pub fn get(&self, name: &str) -> Option<&BranchNode> {
        self.nodes.get(name)
    }

    /// Whether a branch is tracked in this tree
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Parent branch of `name`, if tracked and not trunk
    pub fn parent_of(&self, name: &str) -> Option<&str> {
        self.nodes.get(name).and_then(|n| n.parent.as_deref())
    }

    /// All tracked branch names
    pub fn branch_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Walk parent links from `name` to trunk, exclusive of trunk, returning
    /// the chain top-down (`name` first). Detects cycles.
    fn ancestors_to_trunk(&self, name: &str) -> Result<Vec<String>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor = name.to_string();
        loop {
            let node = self.nodes.get(&cursor).ok_or_else(|| {
                Error::MalformedTree(format!("unknown branch '{cursor}' in parent chain"))
            })?;
            if node.is_trunk {
                return Ok(chain);
            }
            if !seen.insert(cursor.clone()) {
                return Err(Error::MalformedTree(format!(
                    "parent cycle through branch '{cursor}'"
                )));
            }
            chain.push(cursor.clone());
            match &node.parent {
                Some(parent) => cursor = parent.clone(),
                None => {
                    return Err(Error::MalformedTree(format!(
                        "branch '{cursor}' does not reach trunk"
                    )));
                }
            }
        }
    }

    /// The full stack from trunk to `leaf`, inclusive of both ends.
    pub fn stack_to(&self, leaf: &str) -> Result<Vec<String>> {
        if !self.contains(leaf) {
            return Err(Error::BranchNotTracked(leaf.to_string()));
        }
        let mut stack = self.ancestors_to_trunk(leaf)?;
        stack.push(self.trunk.clone());
        stack.reverse();
        Ok(stack)
    }
}

/// Resolve the ordered landing list for `current`.
///
/// Walks from `current` up to (but excluding) trunk and reverses, so the
/// result runs bottom-up: trunk-adjacent ancestor first, `current` last. The
/// full ancestor chain is always returned no matter where `current` sits in
/// the stack - bottom, middle, or leaf.
pub fn resolve(tree: &BranchTree, current: &str) -> Result<Vec<String>> {
    if current == tree.trunk() {
        return Err(Error::CannotLandTrunk(current.to_string()));
    }
    if !tree.contains(current) {
        return Err(Error::BranchNotTracked(current.to_string()));
    }
    let mut chain = tree.ancestors_to_trunk(current)?;
    chain.reverse();
    Ok(chain)
}

/// Downstack-only resolution: the landing list for `current` restricted to
/// branches strictly below `reference`, still inclusive of `current`.
pub fn resolve_downstack(
    tree: &BranchTree,
    current: &str,
    reference: &str,
) -> Result<Vec<String>> {
    let full = resolve(tree, current)?;
    if !tree.contains(reference) {
        return Err(Error::BranchNotTracked(reference.to_string()));
    }
    // Depth of a branch = its position in its own chain (1-based from trunk).
    let depth_of = |name: &str| -> Result<usize> {
        Ok(tree.ancestors_to_trunk(name)?.len())
    };
    let ref_depth = depth_of(reference)?;
    let mut restricted: Vec<String> = Vec::new();
    for name in full {
        if name == current || depth_of(&name)? < ref_depth {
            restricted.push(name);
        }
    }
    Ok(restricted)
}
