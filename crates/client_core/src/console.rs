use std::sync::Arc;

use shared::domain::TokenId;
use tracing::{info, warn};

use crate::{
    error::{ConsoleError, MutationKind},
    form::{FormController, FormField, SubmitPlan},
    list::{Confirmation, DeleteOutcome, ListSynchronizer, RefreshOutcome},
    registry::RegistryService,
};

/// Busy flag for registry mutations. At most one submit or delete may be
/// outstanding.
///
/// Callers that hold the flag across frames (the GUI) pair `try_begin` with
/// `finish`. Async callers use `enter`, whose guard clears the flag when it
/// drops, including when the surrounding future is cancelled.
#[derive(Debug, Default)]
pub struct MutationGate {
    in_flight: Option<MutationKind>,
}

impl MutationGate {
    pub fn enter(&mut self, kind: MutationKind) -> Result<MutationGuard<'_>, ConsoleError> {
        self.try_begin(kind)?;
        Ok(MutationGuard { gate: self })
    }

    pub fn try_begin(&mut self, kind: MutationKind) -> Result<(), ConsoleError> {
        if let Some(current) = self.in_flight {
            return Err(ConsoleError::Busy(current));
        }
        self.in_flight = Some(kind);
        Ok(())
    }

    pub fn finish(&mut self) {
        self.in_flight = None;
    }

    pub fn in_flight(&self) -> Option<MutationKind> {
        self.in_flight
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }
}

/// Holds the gate closed until dropped.
#[derive(Debug)]
pub struct MutationGuard<'a> {
    gate: &'a mut MutationGate,
}

impl Drop for MutationGuard<'_> {
    fn drop(&mut self) {
        self.gate.finish();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Added(TokenId),
    Updated(TokenId),
    Skipped,
}

/// Form, list, and busy flag wired to one registry.
///
/// Created empty; `mount` performs the first fetch and `unmount` drops all
/// cached state.
pub struct TokenConsole {
    registry: Arc<dyn RegistryService>,
    confirmation: Arc<dyn Confirmation>,
    form: FormController,
    list: ListSynchronizer,
    gate: MutationGate,
}

impl TokenConsole {
    pub fn new(registry: Arc<dyn RegistryService>, confirmation: Arc<dyn Confirmation>) -> Self {
        Self {
            registry,
            confirmation,
            form: FormController::new(),
            list: ListSynchronizer::new(),
            gate: MutationGate::default(),
        }
    }

    pub fn form(&self) -> &FormController {
        &self.form
    }

    pub fn list(&self) -> &ListSynchronizer {
        &self.list
    }

    pub fn gate(&self) -> &MutationGate {
        &self.gate
    }

    pub async fn mount(&mut self) -> Result<RefreshOutcome, ConsoleError> {
        self.refresh().await
    }

    pub fn unmount(&mut self) {
        self.form.cancel();
        self.list.clear();
        self.gate.finish();
    }

    pub async fn refresh(&mut self) -> Result<RefreshOutcome, ConsoleError> {
        self.list.refresh(self.registry.as_ref()).await
    }

    pub fn update_field(&mut self, field: FormField, raw: &str) {
        self.form.update_field(field, raw);
    }

    /// Starts editing a row from the current snapshot.
    pub fn begin_edit(&mut self, token_id: TokenId) -> Result<(), ConsoleError> {
        let record = self
            .list
            .record(token_id)
            .ok_or(ConsoleError::UnknownToken(token_id))?;
        self.form.begin_edit(record);
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.form.cancel();
    }

    /// True when the edit target has disappeared from the latest snapshot.
    pub fn edit_target_missing(&self) -> bool {
        self.form
            .edit_target()
            .is_some_and(|token_id| self.list.record(token_id).is_none())
    }

    pub async fn submit(&mut self) -> Result<SubmitOutcome, ConsoleError> {
        let _busy = self.gate.enter(MutationKind::Submit)?;
        run_submit(self.registry.as_ref(), &mut self.form, &mut self.list).await
    }

    pub async fn request_delete(
        &mut self,
        token_id: TokenId,
    ) -> Result<DeleteOutcome, ConsoleError> {
        let result = {
            let _busy = self.gate.enter(MutationKind::Delete)?;
            self.list
                .request_delete(self.registry.as_ref(), token_id, self.confirmation.as_ref())
                .await
        };
        let deleted = matches!(result, Ok(DeleteOutcome::Deleted(_)));
        if deleted && self.form.edit_target() == Some(token_id) {
            warn!(token_id = token_id.0, "deleted token is still the edit target");
        }
        result
    }
}

async fn run_submit(
    registry: &dyn RegistryService,
    form: &mut FormController,
    list: &mut ListSynchronizer,
) -> Result<SubmitOutcome, ConsoleError> {
    let outcome = match form.plan_submit() {
        SubmitPlan::Add {
            name,
            symbol,
            initial_supply,
        } => {
            let token_id = registry.add_token(&name, &symbol, initial_supply).await?;
            info!(token_id = token_id.0, %symbol, "token added");
            SubmitOutcome::Added(token_id)
        }
        SubmitPlan::Update {
            token_id,
            name,
            symbol,
            total_supply,
        } => {
            registry
                .update_token(token_id, &name, &symbol, total_supply)
                .await?;
            info!(token_id = token_id.0, %symbol, "token updated");
            SubmitOutcome::Updated(token_id)
        }
        SubmitPlan::Skip => SubmitOutcome::Skipped,
    };
    form.complete_submit();
    list.refresh(registry).await?;
    Ok(outcome)
}

#[cfg(test)]
#[path = "tests/console_tests.rs"]
mod tests;
