//! In-memory registry that records every call it receives.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{
    domain::{TokenId, TokenRecord},
    error::{ApiException, ErrorCode},
};
use tokio::sync::Mutex;

use crate::registry::RegistryService;

#[derive(Debug, Clone)]
pub(crate) enum RegistryCall {
    List,
    Add {
        name: String,
        symbol: String,
        initial_supply: f64,
    },
    Update {
        token_id: TokenId,
        name: String,
        symbol: String,
        total_supply: f64,
    },
    Delete(TokenId),
}

impl RegistryCall {
    pub(crate) fn is_list(&self) -> bool {
        matches!(self, RegistryCall::List)
    }
}

struct FakeState {
    records: Vec<TokenRecord>,
    next_id: i64,
    calls: Vec<RegistryCall>,
    fail_with: Option<String>,
    hang_mutations: bool,
}

pub(crate) struct RecordingRegistry {
    state: Mutex<FakeState>,
}

impl RecordingRegistry {
    pub(crate) fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub(crate) fn with_records(records: Vec<TokenRecord>) -> Self {
        let next_id = records.iter().map(|r| r.token_id.0).max().unwrap_or(0) + 1;
        Self {
            state: Mutex::new(FakeState {
                records,
                next_id,
                calls: Vec::new(),
                fail_with: None,
                hang_mutations: false,
            }),
        }
    }

    pub(crate) async fn fail_with(&self, message: impl Into<String>) {
        self.state.lock().await.fail_with = Some(message.into());
    }

    pub(crate) async fn hang_mutations(&self) {
        self.state.lock().await.hang_mutations = true;
    }

    pub(crate) async fn resume_mutations(&self) {
        self.state.lock().await.hang_mutations = false;
    }

    /// Simulates another client editing the registry between refreshes.
    pub(crate) async fn remote_delete(&self, token_id: TokenId) {
        self.state
            .lock()
            .await
            .records
            .retain(|r| r.token_id != token_id);
    }

    pub(crate) async fn calls(&self) -> Vec<RegistryCall> {
        self.state.lock().await.calls.clone()
    }

    pub(crate) async fn clear_calls(&self) {
        self.state.lock().await.calls.clear();
    }

    async fn record_mutation(&self, call: RegistryCall) -> Result<()> {
        let hang = {
            let mut state = self.state.lock().await;
            state.calls.push(call);
            if let Some(message) = &state.fail_with {
                return Err(anyhow!(message.clone()));
            }
            state.hang_mutations
        };
        if hang {
            std::future::pending::<()>().await;
        }
        Ok(())
    }
}

fn supply_hint(value: f64) -> Result<u64> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
        return Err(ApiException::new(ErrorCode::Validation, format!("bad supply {value}")).into());
    }
    Ok(value as u64)
}

#[async_trait]
impl RegistryService for RecordingRegistry {
    async fn list_tokens(&self) -> Result<Vec<TokenRecord>> {
        let mut state = self.state.lock().await;
        state.calls.push(RegistryCall::List);
        if let Some(message) = &state.fail_with {
            return Err(anyhow!(message.clone()));
        }
        Ok(state.records.clone())
    }

    async fn add_token(&self, name: &str, symbol: &str, initial_supply: f64) -> Result<TokenId> {
        self.record_mutation(RegistryCall::Add {
            name: name.to_string(),
            symbol: symbol.to_string(),
            initial_supply,
        })
        .await?;
        let supply = supply_hint(initial_supply)?;
        let mut state = self.state.lock().await;
        let token_id = TokenId(state.next_id);
        state.next_id += 1;
        state
            .records
            .push(TokenRecord::new(token_id, name, symbol, supply));
        Ok(token_id)
    }

    async fn update_token(
        &self,
        token_id: TokenId,
        name: &str,
        symbol: &str,
        total_supply: f64,
    ) -> Result<()> {
        self.record_mutation(RegistryCall::Update {
            token_id,
            name: name.to_string(),
            symbol: symbol.to_string(),
            total_supply,
        })
        .await?;
        let supply = supply_hint(total_supply)?;
        let mut state = self.state.lock().await;
        let record = state
            .records
            .iter_mut()
            .find(|r| r.token_id == token_id)
            .ok_or_else(|| ApiException::new(ErrorCode::NotFound, format!("token {token_id} not found")))?;
        *record = TokenRecord::new(token_id, name, symbol, supply);
        Ok(())
    }

    async fn delete_token(&self, token_id: TokenId) -> Result<()> {
        self.record_mutation(RegistryCall::Delete(token_id)).await?;
        let mut state = self.state.lock().await;
        let before = state.records.len();
        state.records.retain(|r| r.token_id != token_id);
        if state.records.len() == before {
            return Err(
                ApiException::new(ErrorCode::NotFound, format!("token {token_id} not found")).into(),
            );
        }
        Ok(())
    }
}

pub(crate) fn gold() -> TokenRecord {
    TokenRecord::new(TokenId(1), "Gold", "GLD", 1000)
}
