use crate::wallet::Chips;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GameError>;

#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum GameError {
    #[error("Enter a valid bet amount.")]
    InvalidBetAmount,

    #[error("Not enough balance: tried to bet {requested}, have {available}.")]
    InsufficientFunds { requested: Chips, available: Chips },

    #[error("You already placed a bet this round.")]
    BetAlreadyPlaced,

    #[error("Betting is closed.")]
    BettingClosed,

    #[error("You can't pick a cup right now.")]
    ChoiceNotAllowed,

    #[error("There is no cup number {0}.")]
    InvalidSlot(u8),
}
