use crate::{
    error::{
        GameError,
        Result,
    },
    wallet::Chips,
};

pub const QUICK_ADD: [Chips; 4] = [1, 5, 10, 25];
const MAX_DIGITS: usize = 12;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Preset {
    Add(Chips),
    Half,
    Max,
}

/// Presets are clamped to the balance as they are applied. Typed digits are
/// not: an over-balance amount is only refused when the bet is submitted.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BetSlip {
    text: String,
}

impl BetSlip {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn push_digit(&mut self, c: char) {
        if c.is_ascii_digit() && self.text.len() < MAX_DIGITS {
            self.text.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn set(&mut self, amount: Chips) {
        self.text = amount.to_string();
    }

    pub fn apply(&mut self, preset: Preset, balance: Chips) {
        let current = leading_int(&self.text)
            .filter(|n| *n > 0)
            .map(|n| n as Chips)
            .unwrap_or(0);
        let next = match preset {
            Preset::Add(step) => current.saturating_add(step),
            Preset::Half => balance / 2,
            Preset::Max => balance,
        };
        self.set(next.min(balance));
    }
}

/// Reads a bet the way a lenient integer parser would: leading whitespace and
/// a sign are accepted, parsing stops at the first non-digit.
pub fn parse_bet(raw: &str) -> Result<Chips> {
    match leading_int(raw) {
        Some(n) if n > 0 => Ok(n as Chips),
        _ => Err(GameError::InvalidBetAmount),
    }
}

fn leading_int(raw: &str) -> Option<i128> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits: &str = {
        let end = digits
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(digits.len());
        &digits[..end]
    };
    if digits.is_empty() {
        return None;
    }
    let magnitude = digits.bytes().fold(0i128, |acc, b| {
        acc.saturating_mul(10)
            .saturating_add(i128::from(b - b'0'))
            .min(i128::from(Chips::MAX))
    });
    Some(if negative { -magnitude } else { magnitude })
}
