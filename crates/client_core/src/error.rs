use shared::{domain::TokenId, error::ApiException};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Submit,
    Delete,
}

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("a {0:?} request is still in flight")]
    Busy(MutationKind),
    #[error("token {0} is not in the current list")]
    UnknownToken(TokenId),
    #[error("unknown form field '{0}'")]
    UnknownField(String),
    #[error("registry call failed: {0:#}")]
    Registry(#[from] anyhow::Error),
}

impl ConsoleError {
    /// The registry's own error, when the failure came back as an API error
    /// body rather than a transport problem.
    pub fn api_exception(&self) -> Option<&ApiException> {
        match self {
            ConsoleError::Registry(err) => err.downcast_ref::<ApiException>(),
            _ => None,
        }
    }
}
