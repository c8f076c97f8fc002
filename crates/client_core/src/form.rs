//! Form state for creating and editing a single token.
//!
//! The controller is a two-state machine: `Creating` or `Editing(token_id)`.
//! It never talks to the registry itself; [`FormController::plan_submit`]
//! says which call to make and [`FormController::complete_submit`] applies
//! the reset once that call has finished.

use std::{fmt, str::FromStr};

use shared::domain::{TokenId, TokenRecord};

use crate::error::ConsoleError;

pub const ADD_LABEL: &str = "Add Token";
pub const UPDATE_LABEL: &str = "Update";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    Symbol,
    InitialSupply,
}

impl FormField {
    pub fn as_str(self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Symbol => "symbol",
            FormField::InitialSupply => "initialSupply",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormField {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(FormField::Name),
            "symbol" => Ok(FormField::Symbol),
            "initialSupply" | "initial_supply" | "supply" => Ok(FormField::InitialSupply),
            other => Err(ConsoleError::UnknownField(other.to_string())),
        }
    }
}

/// Unsaved form content. `initial_supply` is NaN when the raw input was not
/// a number.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub name: String,
    pub symbol: String,
    pub initial_supply: f64,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            name: String::new(),
            symbol: String::new(),
            initial_supply: 0.0,
        }
    }
}

impl Draft {
    pub fn from_record(record: &TokenRecord) -> Self {
        Self {
            name: record.name.clone(),
            symbol: record.symbol.clone(),
            initial_supply: record.total_supply.unwrap_or(0) as f64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.symbol.is_empty() && self.initial_supply == 0.0
    }

    /// Text for the supply input. NaN shows as an empty box.
    pub fn supply_text(&self) -> String {
        let value = self.initial_supply;
        if value.is_nan() {
            String::new()
        } else if value.is_infinite() {
            let label = if value > 0.0 { "Infinity" } else { "-Infinity" };
            label.to_string()
        } else if value.fract() == 0.0 && value.abs() < 1e21 {
            format!("{value:.0}")
        } else {
            value.to_string()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMode {
    #[default]
    Creating,
    Editing(TokenId),
}

/// The registry call a submit should make, captured from the draft.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitPlan {
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
    /// Create mode with a blank name or symbol. Nothing is sent, but the
    /// form still resets.
    Skip,
}

#[derive(Debug, Clone, Default)]
pub struct FormController {
    draft: Draft,
    mode: FormMode,
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn edit_target(&self) -> Option<TokenId> {
        match self.mode {
            FormMode::Creating => None,
            FormMode::Editing(token_id) => Some(token_id),
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, FormMode::Editing(_))
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_editing() {
            UPDATE_LABEL
        } else {
            ADD_LABEL
        }
    }

    pub fn shows_cancel(&self) -> bool {
        self.is_editing()
    }

    /// Stores `raw` into one draft field. Supply input is coerced and may
    /// become NaN; no validation happens here.
    pub fn update_field(&mut self, field: FormField, raw: &str) {
        let mut next = self.draft.clone();
        match field {
            FormField::Name => next.name = raw.to_string(),
            FormField::Symbol => next.symbol = raw.to_string(),
            FormField::InitialSupply => next.initial_supply = coerce_number(raw),
        }
        self.draft = next;
    }

    pub fn begin_edit(&mut self, record: &TokenRecord) {
        self.mode = FormMode::Editing(record.token_id);
        self.draft = Draft::from_record(record);
    }

    pub fn cancel(&mut self) {
        self.reset();
    }

    pub fn plan_submit(&self) -> SubmitPlan {
        let Draft {
            name,
            symbol,
            initial_supply,
        } = self.draft.clone();
        match self.mode {
            FormMode::Creating if name.is_empty() || symbol.is_empty() => SubmitPlan::Skip,
            FormMode::Creating => SubmitPlan::Add {
                name,
                symbol,
                initial_supply,
            },
            FormMode::Editing(token_id) => SubmitPlan::Update {
                token_id,
                name,
                symbol,
                total_supply: initial_supply,
            },
        }
    }

    /// Called once the planned registry call has finished successfully.
    pub fn complete_submit(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.draft = Draft::default();
        self.mode = FormMode::Creating;
    }
}

/// Numeric coercion for the supply input.
///
/// Whitespace is trimmed. Decimal and exponent forms parse, as do unsigned
/// `0x`/`0o`/`0b` integers and a signed `Infinity`. Everything else,
/// including the empty string, is NaN.
pub fn coerce_number(raw: &str) -> f64 {
    let text = raw.trim();
    if text.is_empty() {
        return f64::NAN;
    }

    if let Some(head) = text.get(..2).filter(|_| text.len() > 2) {
        for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
            if head.eq_ignore_ascii_case(prefix) {
                return parse_radix(&text[2..], radix);
            }
        }
    }

    let (sign, unsigned) = match text.as_bytes()[0] {
        b'-' => (-1.0, &text[1..]),
        b'+' => (1.0, &text[1..]),
        _ => (1.0, text),
    };
    if unsigned == "Infinity" {
        return sign * f64::INFINITY;
    }

    let decimal_shaped = unsigned
        .bytes()
        .next()
        .is_some_and(|b| b.is_ascii_digit() || b == b'.')
        && unsigned
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if !decimal_shaped {
        return f64::NAN;
    }

    unsigned
        .parse::<f64>()
        .map(|value| sign * value)
        .unwrap_or(f64::NAN)
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    digits
        .chars()
        .try_fold(0.0_f64, |acc, c| {
            c.to_digit(radix).map(|d| acc * radix as f64 + d as f64)
        })
        .unwrap_or(f64::NAN)
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
