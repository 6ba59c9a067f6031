use serde::Deserialize;

use crate::{
    discussion::vote::{Vote, VoteAction},
    error::AppError,
};

/// DTO for voting on a post or comment.
#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    /// -1, 0 or 1. Taken as a plain integer so out-of-range values get a 400.
    pub vote: i64,

    /// Treat the request as a button click: repeating the current vote clears it.
    #[serde(default)]
    pub toggle: bool,
}

impl VoteRequest {
    pub fn action(&self) -> Result<VoteAction, AppError> {
        let vote = i8::try_from(self.vote)
            .ok()
            .and_then(|v| Vote::try_from(v).ok())
            .ok_or_else(|| {
                AppError::BadRequest(format!("Invalid vote {}. Must be -1, 0 or 1", self.vote))
            })?;

        Ok(if self.toggle {
            VoteAction::Toggle(vote)
        } else {
            VoteAction::Set(vote)
        })
    }
}
