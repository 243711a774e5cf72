use crate::{
    history,
    wallet::Chips,
};
use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    fs,
    path::Path,
    time::Duration,
};

pub const DEFAULT_INITIAL_BALANCE: Chips = 100;
pub const DEFAULT_CURRENCY: &str = "R$";
pub const DEFAULT_COUNTDOWN_SECS: u32 = 10;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub countdown_tick_ms: u64,
    pub reveal_dwell_ms: u64,
    pub reveal_pause_ms: u64,
    pub swap_count: u8,
    pub swap_interval_ms: u64,
    pub suspense_ms: u64,
    pub result_display_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Timings {
            countdown_tick_ms: 1_000,
            reveal_dwell_ms: 1_500,
            reveal_pause_ms: 300,
            swap_count: 4,
            swap_interval_ms: 400,
            suspense_ms: 1_000,
            result_display_ms: 4_000,
        }
    }
}

impl Timings {
    pub fn countdown_tick(&self) -> Duration {
        Duration::from_millis(self.countdown_tick_ms)
    }
    pub fn reveal_dwell(&self) -> Duration {
        Duration::from_millis(self.reveal_dwell_ms)
    }
    pub fn reveal_pause(&self) -> Duration {
        Duration::from_millis(self.reveal_pause_ms)
    }
    pub fn swap_interval(&self) -> Duration {
        Duration::from_millis(self.swap_interval_ms)
    }
    pub fn suspense(&self) -> Duration {
        Duration::from_millis(self.suspense_ms)
    }
    pub fn result_display(&self) -> Duration {
        Duration::from_millis(self.result_display_ms)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub initial_balance: Chips,
    pub currency: String,
    pub history_capacity: usize,
    pub seed_history: bool,
    pub countdown_secs: u32,
    pub timings: Timings,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            initial_balance: DEFAULT_INITIAL_BALANCE,
            currency: DEFAULT_CURRENCY.to_string(),
            history_capacity: history::DEFAULT_CAPACITY,
            seed_history: true,
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            timings: Timings::default(),
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .wrap_err_with(|| format!("reading config file {}", path.display()))?;
        let config: GameConfig = serde_json::from_str(&raw)
            .wrap_err_with(|| format!("parsing config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.initial_balance == 0 {
            return Err(eyre!("initial_balance must be positive"));
        }
        if self.history_capacity == 0 {
            return Err(eyre!("history_capacity must be positive"));
        }
        if self.history_capacity > history::DEFAULT_CAPACITY {
            return Err(eyre!(
                "history_capacity must be at most {}",
                history::DEFAULT_CAPACITY
            ));
        }
        if self.countdown_secs == 0 {
            return Err(eyre!("countdown_secs must be positive"));
        }
        if self.timings.countdown_tick_ms == 0 {
            return Err(eyre!("timings.countdown_tick_ms must be positive"));
        }
        Ok(())
    }
}
