use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(TokenId);

/// A registry entry as returned by the registry service.
///
/// `total_supply` is authoritative on the server side and may be missing from
/// older payloads, so it stays optional on the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub token_id: TokenId,
    pub name: String,
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_supply: Option<u64>,
}

impl TokenRecord {
    pub fn new(
        token_id: TokenId,
        name: impl Into<String>,
        symbol: impl Into<String>,
        total_supply: u64,
    ) -> Self {
        Self {
            token_id,
            name: name.into(),
            symbol: symbol.into(),
            total_supply: Some(total_supply),
        }
    }

    /// Supply text for table rows. A zero supply and a missing supply both
    /// render as `"0"`.
    pub fn supply_label(&self) -> String {
        match self.total_supply {
            Some(supply) if supply != 0 => supply.to_string(),
            _ => "0".to_string(),
        }
    }
}
