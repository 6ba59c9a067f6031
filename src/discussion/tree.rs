// src/discussion/tree.rs

use std::collections::HashMap;

use serde::Serialize;

use crate::models::comment::Comment;

/// Nesting depth at which replies stop being offered.
pub const DEFAULT_MAX_REPLY_DEPTH: usize = 3;

/// A comment together with its direct replies.
#[derive(Debug, Clone, Serialize)]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: Comment,
    /// 0 for root comments.
    pub depth: usize,
    /// Whether the nesting policy still permits replying to this comment.
    pub can_reply: bool,
    pub children: Vec<CommentNode>,
}

/// Builds the reply forest of one post from its flat comment list.
///
/// Roots are the comments without a `parent_id`. Roots and each node's children
/// keep the relative order of the input. `max_depth` only decides `can_reply`;
/// replies below it are still placed in the tree.
///
/// Comments whose parent is not in the input are unreachable and left out.
/// The walk uses an explicit stack, so chain length does not consume call stack.
pub fn build_comment_forest(comments: Vec<Comment>, max_depth: usize) -> Vec<CommentNode> {
    let total = comments.len();
    let mut roots = Vec::new();
    let mut replies: HashMap<i64, Vec<usize>> = HashMap::new();

    for (idx, comment) in comments.iter().enumerate() {
        match comment.parent_id {
            None => roots.push(idx),
            Some(parent) => replies.entry(parent).or_default().push(idx),
        }
    }
    let ids: Vec<i64> = comments.iter().map(|c| c.id).collect();

    // Pre-order walk from the roots. A slot is claimed once, so a repeated id
    // cannot place a comment twice and a parent cycle never reaches a root.
    let mut claimed = vec![false; total];
    let mut depth = vec![0usize; total];
    let mut kids: Vec<Vec<usize>> = vec![Vec::new(); total];
    let mut preorder = Vec::with_capacity(total);

    for &root in &roots {
        claimed[root] = true;
    }
    let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
    while let Some(idx) = stack.pop() {
        preorder.push(idx);
        if let Some(children) = replies.get(&ids[idx]) {
            for &kid in children {
                if !claimed[kid] {
                    claimed[kid] = true;
                    depth[kid] = depth[idx] + 1;
                    kids[idx].push(kid);
                }
            }
            stack.extend(kids[idx].iter().rev());
        }
    }

    // Children follow their parent in pre-order, so building in reverse
    // finishes every subtree before the node that owns it.
    let mut arena: Vec<Option<Comment>> = comments.into_iter().map(Some).collect();
    let mut built: Vec<Option<CommentNode>> = (0..total).map(|_| None).collect();
    for &idx in preorder.iter().rev() {
        let Some(comment) = arena[idx].take() else {
            continue;
        };
        let children = kids[idx].iter().filter_map(|&kid| built[kid].take()).collect();
        built[idx] = Some(CommentNode {
            comment,
            depth: depth[idx],
            can_reply: depth[idx] < max_depth,
            children,
        });
    }

    let dropped = total - preorder.len();
    if dropped > 0 {
        tracing::debug!(
            "Dropped {} of {} comments with no reachable parent",
            dropped,
            total
        );
    }

    roots.iter().filter_map(|&root| built[root].take()).collect()
}
