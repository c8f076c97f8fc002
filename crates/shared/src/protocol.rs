use serde::{Deserialize, Serialize};

use crate::domain::TokenId;

/// Body of `POST /tokens`.
///
/// Supplies travel as JSON numbers. Non-finite values have no JSON form and
/// are sent as `null`; the registry rejects them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddTokenRequest {
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub initial_supply: Option<f64>,
}

impl AddTokenRequest {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, initial_supply: f64) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            initial_supply: wire_supply(initial_supply),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddTokenResponse {
    pub token_id: TokenId,
}

/// Body of `PUT /tokens/{token_id}`. Replaces all three fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateTokenRequest {
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub total_supply: Option<f64>,
}

impl UpdateTokenRequest {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, total_supply: f64) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            total_supply: wire_supply(total_supply),
        }
    }
}

fn wire_supply(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
