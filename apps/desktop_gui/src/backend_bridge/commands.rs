//! Backend commands queued from UI to backend worker.

use client_core::RefreshTicket;
use shared::domain::TokenId;

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    Connect {
        server_url: String,
    },
    ListTokens {
        ticket: RefreshTicket,
    },
    AddToken {
        name: String,
        symbol: String,
        initial_supply: f64,
    },
    UpdateToken {
        token_id: TokenId,
        name: String,
        symbol: String,
        total_supply: f64,
    },
    DeleteToken {
        token_id: TokenId,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Connect { .. } => "connect",
            BackendCommand::ListTokens { .. } => "list_tokens",
            BackendCommand::AddToken { .. } => "add_token",
            BackendCommand::UpdateToken { .. } => "update_token",
            BackendCommand::DeleteToken { .. } => "delete_token",
        }
    }
}
