//! Ledger — the player's balance.
//!
//! Wagers are admission-controlled: a debit larger than the balance is
//! rejected outright, so the balance can never go negative.

use rust_decimal::Decimal;
use tracing::debug;

use crate::types::EngineError;

#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    balance: Decimal,
}

impl Ledger {
    /// Open a ledger. Negative opening balances are floored at zero.
    pub fn new(opening_balance: Decimal) -> Self {
        Self {
            balance: opening_balance.max(Decimal::ZERO),
        }
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Remove `amount` from the balance.
    pub fn debit(&mut self, amount: Decimal) -> Result<Decimal, EngineError> {
        if amount < Decimal::ZERO {
            return Err(EngineError::InvalidAmount(format!(
                "cannot debit a negative amount ({amount})"
            )));
        }
        if amount > self.balance {
            return Err(EngineError::InsufficientFunds {
                needed: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        debug!(amount = %amount, balance = %self.balance, "Ledger debited");
        Ok(self.balance)
    }

    /// Add `amount` to the balance. Used for payouts and top-ups.
    pub fn credit(&mut self, amount: Decimal) -> Result<Decimal, EngineError> {
        if amount < Decimal::ZERO {
            return Err(EngineError::InvalidAmount(format!(
                "cannot credit a negative amount ({amount})"
            )));
        }
        self.balance = self.balance.checked_add(amount).ok_or_else(|| {
            EngineError::InvalidAmount(format!("crediting {amount} would overflow the balance"))
        })?;
        debug!(amount = %amount, balance = %self.balance, "Ledger credited");
        Ok(self.balance)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
