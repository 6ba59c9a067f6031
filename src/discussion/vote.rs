// src/discussion/vote.rs

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single user's vote on a post or comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Vote {
    Down,
    #[default]
    Neutral,
    Up,
}

impl Vote {
    pub const fn value(self) -> i64 {
        match self {
            Vote::Down => -1,
            Vote::Neutral => 0,
            Vote::Up => 1,
        }
    }
}

/// Rejected vote value (anything outside -1..=1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidVote(pub i8);

impl fmt::Display for InvalidVote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid vote {}. Must be -1, 0 or 1", self.0)
    }
}

impl std::error::Error for InvalidVote {}

impl TryFrom<i8> for Vote {
    type Error = InvalidVote;

    fn try_from(v: i8) -> Result<Self, InvalidVote> {
        match v {
            -1 => Ok(Vote::Down),
            0 => Ok(Vote::Neutral),
            1 => Ok(Vote::Up),
            n => Err(InvalidVote(n)),
        }
    }
}

impl From<Vote> for i8 {
    fn from(v: Vote) -> i8 {
        v.value() as i8
    }
}

/// Per-user votes on one item, keyed by user id.
/// A missing key counts as `Vote::Neutral`.
pub type VoteMap = HashMap<String, Vote>;

/// Anything that carries an aggregate score derived from per-user votes.
pub trait Scorable {
    fn score(&self) -> i64;
    fn votes(&self) -> &VoteMap;

    fn vote_of(&self, user_id: &str) -> Vote {
        self.votes().get(user_id).copied().unwrap_or_default()
    }
}

/// Updated `score` and `votes` of an item after one user's vote.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tally {
    pub score: i64,
    pub votes: VoteMap,
}

impl Scorable for Tally {
    fn score(&self) -> i64 {
        self.score
    }

    fn votes(&self) -> &VoteMap {
        &self.votes
    }
}

/// Sum of all votes in the map.
pub fn score_of(votes: &VoteMap) -> i64 {
    votes.values().map(|v| v.value()).sum()
}

/// Replaces `user_id`'s prior vote on `item` with `vote` and recomputes the score.
///
/// The new score is `score + (vote - prior)`. If the stored score has drifted from
/// the sum of the vote map, the map wins and the score is rebuilt from it.
/// A `Neutral` vote is kept as an explicit entry rather than removing the key.
pub fn tally_vote<S: Scorable + ?Sized>(item: &S, user_id: &str, vote: Vote) -> Tally {
    let votes = item.votes();
    let expected = score_of(votes);

    let base = if item.score() != expected {
        tracing::warn!(
            "Score {} does not match vote sum {}, recomputing from votes",
            item.score(),
            expected
        );
        expected
    } else {
        item.score()
    };

    let prior = item.vote_of(user_id);
    let mut votes = votes.clone();
    votes.insert(user_id.to_owned(), vote);

    Tally {
        score: base + (vote.value() - prior.value()),
        votes,
    }
}

/// What a vote request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteAction {
    /// Submit the vote as given.
    Set(Vote),
    /// A click on a vote button: clicking the active direction again un-votes.
    Toggle(Vote),
}

impl VoteAction {
    /// Resolves the vote to submit given the user's current vote.
    pub fn resolve(self, current: Vote) -> Vote {
        match self {
            VoteAction::Set(v) => v,
            VoteAction::Toggle(v) if v == current => Vote::Neutral,
            VoteAction::Toggle(v) => v,
        }
    }
}
