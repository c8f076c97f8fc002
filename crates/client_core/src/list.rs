//! Locally cached copy of the registry's token list.

use shared::domain::{TokenId, TokenRecord};
use tracing::{debug, info};

use crate::{error::ConsoleError, registry::RegistryService};

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this token?";

/// Yes/no gate in front of destructive actions.
pub trait Confirmation: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirmation for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Issued when a list fetch starts. Completions carrying a ticket older than
/// the last applied one are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied { count: usize },
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Declined,
    Deleted(TokenId),
}

#[derive(Debug, Default)]
pub struct ListSynchronizer {
    snapshot: Vec<TokenRecord>,
    issued: u64,
    applied: u64,
}

impl ListSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &[TokenRecord] {
        &self.snapshot
    }

    pub fn record(&self, token_id: TokenId) -> Option<&TokenRecord> {
        self.snapshot.iter().find(|r| r.token_id == token_id)
    }

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued += 1;
        RefreshTicket(self.issued)
    }

    /// Replaces the snapshot wholesale unless a newer fetch already landed.
    pub fn apply_refresh(
        &mut self,
        ticket: RefreshTicket,
        records: Vec<TokenRecord>,
    ) -> RefreshOutcome {
        if ticket.0 <= self.applied {
            debug!(
                ticket = ticket.0,
                applied = self.applied,
                "discarding stale token list"
            );
            return RefreshOutcome::Stale;
        }
        self.applied = ticket.0;
        self.snapshot = records;
        RefreshOutcome::Applied {
            count: self.snapshot.len(),
        }
    }

    pub async fn refresh(
        &mut self,
        registry: &dyn RegistryService,
    ) -> Result<RefreshOutcome, ConsoleError> {
        let ticket = self.begin_refresh();
        let records = registry.list_tokens().await?;
        Ok(self.apply_refresh(ticket, records))
    }

    /// Deletes after a confirmed prompt, then refreshes. A declined prompt
    /// makes no registry call.
    pub async fn request_delete(
        &mut self,
        registry: &dyn RegistryService,
        token_id: TokenId,
        confirmation: &dyn Confirmation,
    ) -> Result<DeleteOutcome, ConsoleError> {
        if !confirmation.confirm(DELETE_PROMPT) {
            debug!(token_id = token_id.0, "delete declined");
            return Ok(DeleteOutcome::Declined);
        }
        registry.delete_token(token_id).await?;
        info!(token_id = token_id.0, "token deleted");
        self.refresh(registry).await?;
        Ok(DeleteOutcome::Deleted(token_id))
    }

    pub fn clear(&mut self) {
        self.snapshot.clear();
        self.applied = self.issued;
    }
}

#[cfg(test)]
#[path = "tests/list_tests.rs"]
mod tests;
