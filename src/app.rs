use crate::ui::{
    self,
    UiState,
    UserEvent,
};
use color_eyre::eyre::Result;
use cup_shuffle::{
    Game,
    GameError,
    RoundMachine,
    config::GameConfig,
};
use rand::{
    SeedableRng,
    rngs::StdRng,
};
use std::future;
use tokio::time::{
    self,
    Instant,
};
use tracing::info;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub game: GameConfig,
    pub seed: Option<u64>,
}

pub async fn run_app(config: AppConfig) -> Result<()> {
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let machine = RoundMachine::new(config.game, rng);
    let mut ui_state = UiState::default();

    // UI bootstrap
    ui::terminal_enter(&mut ui_state)?;
    let mut game = Game::new(machine, ui_state);
    let res = run_loop(&mut game).await;
    ui::terminal_exit()?;
    res
}

async fn run_loop(game: &mut Game<UiState>) -> Result<()> {
    let started = Instant::now();
    let mut input = ui::spawn_input_reader();
    game.start();
    loop {
        let wake = game.next_deadline().map(|at| started + at);
        tokio::select! {
            _ = tokio::signal::ctrl_c() => { break; }
            _ = sleep_until(wake) => {
                game.advance_to(started.elapsed());
            }
            ev = input.recv() => {
                let Some(ev) = ev else { break };
                let Some(user_event) = ui::handle_event(game.presenter_mut(), ev) else {
                    continue;
                };
                // Commands land on the same timeline as the timers.
                game.advance_to(started.elapsed());
                match user_event {
                    UserEvent::Quit => break,
                    UserEvent::Redraw => game.presenter_mut().redraw(),
                    UserEvent::PlaceBet(raw) => {
                        if let Err(GameError::InsufficientFunds { available, .. }) = game.place_bet(&raw) {
                            let ui_state = game.presenter_mut();
                            ui_state.slip_mut().set(available);
                            ui_state.redraw();
                        }
                    }
                    UserEvent::Choose(position) => {
                        let _ = game.choose_position(position);
                    }
                }
            }
        }
    }
    let view = game.view();
    info!(balance = view.balance, "session ended");
    Ok(())
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => time::sleep_until(at).await,
        None => future::pending::<()>().await,
    }
}
