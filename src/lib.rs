//! Find the ball under the cup: a timed single-player wagering round.
//!
//! [`round::RoundMachine`] owns the session and walks each round through
//! betting, reveal, shuffle, choice and resolution on a logical timeline
//! driven by [`timer::Scheduler`]. [`game::Game`] feeds it player commands
//! and timer expiries and hands a [`game::GameView`] to whatever draws the
//! table.

pub mod bet_slip;
pub mod config;
pub mod error;
pub mod game;
pub mod history;
pub mod round;
pub mod timer;
pub mod wallet;

pub use error::{
    GameError,
    Result,
};
pub use game::{
    Game,
    GameView,
    Presenter,
};
pub use round::{
    Phase,
    RoundMachine,
    Slot,
};
