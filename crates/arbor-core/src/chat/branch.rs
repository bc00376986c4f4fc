//! Branch-position annotation for a leaf's ancestor path.
//!
//! Branch counts are recomputed at read time from the live sibling set and
//! never stored, so a new sibling anywhere in the tree is reflected
//! immediately without an update cascade to unrelated branches.

use std::collections::HashMap;

use arbor_types::message::{BranchInfo, BranchedMessage, Message};
use tracing::warn;
use uuid::Uuid;

/// Annotate every node of a leaf's path with its branch position.
///
/// `nodes` are the messages on the path in creation (root -> leaf) order;
/// `children` are all children of the path's non-leaf nodes, in creation
/// order, which defines sibling rank. A node gets `Some(BranchInfo)` only
/// when its sibling group (the recorded children of its parent) has two or
/// more entries; `current` is the node's own 1-based rank in that group.
/// The root has no sibling group and is always unannotated.
///
/// A node missing from its own recorded sibling group is inconsistent data;
/// it degrades to `branch: None` for that node instead of failing the whole
/// listing.
pub fn annotate(nodes: Vec<Message>, children: &[Message]) -> Vec<BranchedMessage> {
    let mut groups: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for child in children {
        let Some(parent_id) = child.parent_id else {
            continue;
        };
        groups.entry(parent_id).or_default().push(child.id);
    }

    nodes
        .into_iter()
        .map(|message| {
            let branch = branch_at(&message, &groups);
            BranchedMessage { message, branch }
        })
        .collect()
}

fn branch_at(message: &Message, groups: &HashMap<Uuid, Vec<Uuid>>) -> Option<BranchInfo> {
    let parent_id = message.parent_id?;
    let group = groups.get(&parent_id)?;
    if group.len() < 2 {
        return None;
    }
    match group.iter().position(|id| *id == message.id) {
        Some(index) => Some(BranchInfo {
            total: group.len() as u32,
            current: index as u32 + 1,
        }),
        None => {
            warn!(
                message_id = %message.id,
                parent_id = %parent_id,
                "message missing from its recorded sibling group, skipping branch info"
            );
            None
        }
    }
}
