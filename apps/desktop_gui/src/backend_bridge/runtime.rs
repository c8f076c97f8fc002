//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{HttpRegistryClient, RegistryService, SubmitOutcome};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

/// Owns the registry client on the worker thread and turns each command into
/// exactly one UI event.
#[derive(Default)]
pub struct BackendWorker {
    registry: Option<Arc<dyn RegistryService>>,
}

impl BackendWorker {
    pub fn with_registry(registry: Arc<dyn RegistryService>) -> Self {
        Self {
            registry: Some(registry),
        }
    }

    fn connect(&mut self, server_url: &str) -> UiEvent {
        match HttpRegistryClient::new(server_url) {
            Ok(client) => {
                let server_url = client.server_url().to_string();
                tracing::info!(%server_url, "registry client ready");
                self.registry = Some(Arc::new(client));
                UiEvent::Connected { server_url }
            }
            Err(err) => UiEvent::Error(UiError::from_registry(UiErrorContext::Connect, &err)),
        }
    }

    /// Registry set by the last successful connect, or the event to report
    /// when there is none.
    fn registry(&self) -> Result<Arc<dyn RegistryService>, UiEvent> {
        self.registry.clone().ok_or_else(|| {
            UiEvent::Error(UiError::from_message(
                UiErrorContext::Connect,
                "no server configured; set a server URL and connect",
            ))
        })
    }

    pub async fn handle(&mut self, cmd: BackendCommand) -> UiEvent {
        self.run(cmd).await.unwrap_or_else(|event| event)
    }

    async fn run(&mut self, cmd: BackendCommand) -> Result<UiEvent, UiEvent> {
        let event = match cmd {
            BackendCommand::Connect { server_url } => self.connect(&server_url),
            BackendCommand::ListTokens { ticket } => match self.registry()?.list_tokens().await {
                Ok(records) => UiEvent::TokensLoaded { ticket, records },
                Err(err) => {
                    tracing::warn!("token list fetch failed: {err:#}");
                    UiEvent::Error(UiError::from_registry(UiErrorContext::LoadTokens, &err))
                }
            },
            BackendCommand::AddToken {
                name,
                symbol,
                initial_supply,
            } => UiEvent::SubmitFinished(
                self.registry()?
                    .add_token(&name, &symbol, initial_supply)
                    .await
                    .map(SubmitOutcome::Added)
                    .map_err(|err| UiError::from_registry(UiErrorContext::Submit, &err)),
            ),
            BackendCommand::UpdateToken {
                token_id,
                name,
                symbol,
                total_supply,
            } => UiEvent::SubmitFinished(
                self.registry()?
                    .update_token(token_id, &name, &symbol, total_supply)
                    .await
                    .map(|()| SubmitOutcome::Updated(token_id))
                    .map_err(|err| UiError::from_registry(UiErrorContext::Submit, &err)),
            ),
            BackendCommand::DeleteToken { token_id } => UiEvent::DeleteFinished(
                self.registry()?
                    .delete_token(token_id)
                    .await
                    .map(|()| token_id)
                    .map_err(|err| UiError::from_registry(UiErrorContext::Delete, &err)),
            ),
        };
        Ok(event)
    }
}

pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let mut worker = BackendWorker::default();
            while let Ok(cmd) = cmd_rx.recv() {
                let event = worker.handle(cmd).await;
                if ui_tx.send(event).is_err() {
                    tracing::debug!("ui event receiver dropped; stopping backend worker");
                    break;
                }
            }
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use client_core::ListSynchronizer;
    use shared::{
        domain::{TokenId, TokenRecord},
        error::{ApiException, ErrorCode},
    };

    struct FixedRegistry;

    #[async_trait]
    impl RegistryService for FixedRegistry {
        async fn list_tokens(&self) -> Result<Vec<TokenRecord>> {
            Ok(vec![TokenRecord::new(TokenId(1), "Gold", "GLD", 1000)])
        }

        async fn add_token(
            &self,
            _name: &str,
            _symbol: &str,
            _initial_supply: f64,
        ) -> Result<TokenId> {
            Ok(TokenId(2))
        }

        async fn update_token(
            &self,
            token_id: TokenId,
            _name: &str,
            _symbol: &str,
            _total_supply: f64,
        ) -> Result<()> {
            let message = format!("token {token_id} not found");
            Err(ApiException::new(ErrorCode::NotFound, message).into())
        }

        async fn delete_token(&self, _token_id: TokenId) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn list_command_echoes_its_ticket() {
        let mut list = ListSynchronizer::new();
        let ticket = list.begin_refresh();
        let mut worker = BackendWorker::with_registry(Arc::new(FixedRegistry));

        match worker.handle(BackendCommand::ListTokens { ticket }).await {
            UiEvent::TokensLoaded {
                ticket: echoed,
                records,
            } => {
                assert_eq!(echoed, ticket);
                assert_eq!(records.len(), 1);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn mutations_report_outcomes() {
        let mut worker = BackendWorker::with_registry(Arc::new(FixedRegistry));

        let added = worker
            .handle(BackendCommand::AddToken {
                name: "Silver".to_string(),
                symbol: "SLV".to_string(),
                initial_supply: 5.0,
            })
            .await;
        assert!(matches!(
            added,
            UiEvent::SubmitFinished(Ok(SubmitOutcome::Added(TokenId(2))))
        ));

        let updated = worker
            .handle(BackendCommand::UpdateToken {
                token_id: TokenId(9),
                name: "X".to_string(),
                symbol: "X".to_string(),
                total_supply: 1.0,
            })
            .await;
        match updated {
            UiEvent::SubmitFinished(Err(err)) => {
                assert_eq!(
                    err.category(),
                    crate::controller::events::UiErrorCategory::NotFound
                );
            }
            other => panic!("unexpected event {other:?}"),
        }

        let deleted = worker
            .handle(BackendCommand::DeleteToken { token_id: TokenId(1) })
            .await;
        assert!(matches!(deleted, UiEvent::DeleteFinished(Ok(TokenId(1)))));
    }

    #[tokio::test]
    async fn commands_before_connect_report_missing_server() {
        let mut worker = BackendWorker::default();
        let event = worker
            .handle(BackendCommand::DeleteToken { token_id: TokenId(1) })
            .await;
        match event {
            UiEvent::Error(err) => assert_eq!(err.context(), UiErrorContext::Connect),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn connect_rejects_non_http_urls() {
        let mut worker = BackendWorker::default();
        let event = worker
            .handle(BackendCommand::Connect {
                server_url: "ftp://example.com".to_string(),
            })
            .await;
        assert!(matches!(event, UiEvent::Error(_)));

        let event = worker
            .handle(BackendCommand::Connect {
                server_url: "http://127.0.0.1:8443/".to_string(),
            })
            .await;
        match event {
            UiEvent::Connected { server_url } => assert_eq!(server_url, "http://127.0.0.1:8443"),
            other => panic!("unexpected event {other:?}"),
        }
    }
}
