//! UI/backend events and error modeling for desktop GUI controller.

use client_core::{RefreshTicket, SubmitOutcome};
use shared::{
    domain::{TokenId, TokenRecord},
    error::{ApiException, ErrorCode},
};

#[derive(Debug)]
pub enum UiEvent {
    Connected {
        server_url: String,
    },
    TokensLoaded {
        ticket: RefreshTicket,
        records: Vec<TokenRecord>,
    },
    SubmitFinished(Result<SubmitOutcome, UiError>),
    DeleteFinished(Result<TokenId, UiError>),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    NotFound,
    Validation,
    Transport,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Connect,
    LoadTokens,
    Submit,
    Delete,
    General,
}

pub fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::NotFound => "Not found",
        UiErrorCategory::Validation => "Rejected",
        UiErrorCategory::Transport => "Connection",
        UiErrorCategory::Unknown => "Error",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("404") || message_lower.contains("not found") {
            UiErrorCategory::NotFound
        } else if message_lower.contains("invalid")
            || message_lower.contains("must be")
            || message_lower.contains("400")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("connect")
            || message_lower.contains("dns")
            || message_lower.contains("disconnected")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    /// Prefers the registry's structured error code over message sniffing.
    pub fn from_registry(context: UiErrorContext, err: &anyhow::Error) -> Self {
        match err.downcast_ref::<ApiException>() {
            Some(api) => Self {
                category: match api.code {
                    ErrorCode::NotFound => UiErrorCategory::NotFound,
                    ErrorCode::Validation => UiErrorCategory::Validation,
                    ErrorCode::Internal => UiErrorCategory::Unknown,
                },
                context,
                message: api.message.clone(),
            },
            None => Self::from_message(context, format!("{err:#}")),
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_line(&self) -> String {
        let action = match self.context {
            UiErrorContext::BackendStartup => "Backend startup failed",
            UiErrorContext::Connect => "Could not use server",
            UiErrorContext::LoadTokens => "Could not load tokens",
            UiErrorContext::Submit => "Could not save token",
            UiErrorContext::Delete => "Could not delete token",
            UiErrorContext::General => "Request failed",
        };
        format!("{action} ({}): {}", err_label(self.category), self.message)
    }
}
