use crate::error::{
    GameError,
    Result,
};

/// Whole currency units. Bets are parsed as integers and payouts are exact
/// doublings, so balances never need fractional storage.
pub type Chips = u64;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Wallet {
    balance: Chips,
}

impl Wallet {
    pub fn new(initial_balance: Chips) -> Self {
        Self {
            balance: initial_balance,
        }
    }

    pub fn balance(&self) -> Chips {
        self.balance
    }

    pub fn debit(&mut self, amount: Chips) -> Result<()> {
        if amount == 0 {
            return Err(GameError::InvalidBetAmount);
        }
        if amount > self.balance {
            return Err(GameError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        Ok(())
    }

    pub fn credit(&mut self, amount: Chips) {
        self.balance = self.balance.saturating_add(amount);
    }
}

pub fn format_amount(currency: &str, amount: Chips) -> String {
    format!("{currency} {amount}.00")
}
