//! Token balances held by an account

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub name: String,
    pub symbol: String,
    pub balance: f64,
}

impl TokenBalance {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, balance: f64) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            balance,
        }
    }
}
