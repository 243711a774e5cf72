#![allow(dead_code)]

use cup_shuffle::{
    Game,
    GameView,
    RoundMachine,
    Slot,
    config::GameConfig,
};
use rand::{
    SeedableRng,
    rngs::StdRng,
};
use std::time::Duration;

pub type TestGame = Game<Vec<GameView>>;

/// Far enough ahead to get from a fresh betting window to an open choice.
pub const TO_CHOICE: Duration = Duration::from_secs(20);
/// Far enough ahead to get from a choice to the next betting window.
pub const TO_NEXT_ROUND: Duration = Duration::from_secs(5);

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

pub fn new_game(initial_balance: u64) -> TestGame {
    new_game_with_seed(initial_balance, 42)
}

pub fn new_game_with_seed(initial_balance: u64, seed: u64) -> TestGame {
    let config = GameConfig {
        initial_balance,
        seed_history: false,
        ..GameConfig::default()
    };
    let machine = RoundMachine::new(config, StdRng::seed_from_u64(seed));
    let mut game = Game::new(machine, Vec::new());
    game.start();
    game
}

pub fn rig(game: &mut TestGame, winner: u8) {
    let slot = Slot::new(winner).unwrap();
    game.machine_mut().rig_next_winning_slot(slot);
}

pub fn run_for(game: &mut TestGame, span: Duration) -> usize {
    let until = game.machine().now() + span;
    game.advance_to(until)
}

/// Bets, rigs the reveal and plays the round out to the next betting window.
pub fn play_round(game: &mut TestGame, bet: u64, winner: u8, chosen: u8) {
    game.place_bet(&bet.to_string()).unwrap();
    rig(game, winner);
    run_for(game, TO_CHOICE);
    game.choose_slot(chosen).unwrap();
    run_for(game, TO_NEXT_ROUND);
}

pub fn last_view(game: &TestGame) -> &GameView {
    game.presenter().last().expect("at least one view")
}
