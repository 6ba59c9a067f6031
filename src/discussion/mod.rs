// src/discussion/mod.rs

pub mod tree;
pub mod vote;

pub use tree::{CommentNode, build_comment_forest};
pub use vote::{Scorable, Tally, Vote, VoteAction, VoteMap, tally_vote};
