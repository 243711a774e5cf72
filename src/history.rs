use crate::wallet::{
    Chips,
    format_amount,
};
use rand::Rng;
use serde::Serialize;
use std::collections::VecDeque;

pub const DEFAULT_CAPACITY: usize = 5;
const MOCK_AMOUNTS: [Chips; 5] = [10, 25, 50, 75, 100];

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Win => "Win",
            Outcome::Loss => "Loss",
        }
    }

    fn sign(self) -> char {
        match self {
            Outcome::Win => '+',
            Outcome::Loss => '-',
        }
    }
}

/// A settled round. `amount` is the payout on a win and the lost stake on a
/// loss.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub outcome: Outcome,
    pub amount: Chips,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct HistoryRow {
    pub label: &'static str,
    pub signed_amount: String,
}

#[derive(Clone, Debug)]
pub struct HistoryLedger {
    capacity: usize,
    entries: VecDeque<HistoryEntry>,
}

impl Default for HistoryLedger {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl HistoryLedger {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.min(DEFAULT_CAPACITY);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn record(&mut self, outcome: Outcome, amount: Chips) {
        self.entries.push_back(HistoryEntry { outcome, amount });
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.entries.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn rows(&self, currency: &str) -> Vec<HistoryRow> {
        self.entries
            .iter()
            .map(|e| HistoryRow {
                label: e.outcome.label(),
                signed_amount: format!(
                    "{}{}",
                    e.outcome.sign(),
                    format_amount(currency, e.amount)
                ),
            })
            .collect()
    }

    pub fn seed_mock<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for _ in 0..self.capacity {
            let outcome = if rng.random_bool(0.5) {
                Outcome::Win
            } else {
                Outcome::Loss
            };
            let amount = MOCK_AMOUNTS[rng.random_range(0..MOCK_AMOUNTS.len())];
            self.record(outcome, amount);
        }
    }
}
