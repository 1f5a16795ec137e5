//! Command Error Taxonomy
//!
//! Faults stay typed inside the process for logging and tests and collapse
//! to a bare status code at the transport edge; clients only ever see the
//! code.

use thiserror::Error;

/// Everything that can go wrong while handling one command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Malformed request framing, unparsable JSON, or missing required
    /// command fields.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The resolver found no matching window.
    #[error("no window matched the query")]
    NotFound,

    /// A directory call failed while mutating a resolved window.
    #[error("window mutation failed: {0}")]
    MutationFailed(anyhow::Error),

    /// Any other uncaught fault.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CommandError {
    /// Status code reported over the transport.
    pub fn status_code(&self) -> u16 {
        match self {
            CommandError::BadRequest(_) => 400,
            CommandError::NotFound
            | CommandError::MutationFailed(_)
            | CommandError::Internal(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(CommandError::BadRequest("x".into()).status_code(), 400);
        assert_eq!(CommandError::NotFound.status_code(), 500);
        assert_eq!(
            CommandError::MutationFailed(anyhow::anyhow!("boom")).status_code(),
            500
        );
        assert_eq!(
            CommandError::Internal(anyhow::anyhow!("boom")).status_code(),
            500
        );
    }
}
