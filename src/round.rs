use crate::{
    config::GameConfig,
    error::{
        GameError,
        Result,
    },
    history::{
        HistoryLedger,
        Outcome,
    },
    timer::Scheduler,
    wallet::{
        Chips,
        Wallet,
        format_amount,
    },
};
use rand::{
    Rng,
    rngs::StdRng,
    seq::index,
};
use serde::Serialize;
use std::{
    fmt,
    time::Duration,
};
use tracing::{
    debug,
    info,
};

#[cfg(test)]
mod tests;

pub const SLOT_COUNT: usize = 3;

pub const MSG_PLACE_BET: &str = "Place your bet for the next round!";
pub const MSG_BET_PLACED: &str = "Bet placed! Watch where the ball of yarn shows up...";
pub const MSG_TIMES_UP: &str = "Time's up! Place a bet for the next round.";
pub const MSG_LOOK: &str = "Look quickly!";
pub const MSG_SHUFFLING: &str = "Shuffling...";
pub const MSG_CHOOSE: &str = "Where is the ball of yarn? Pick a cup!";
pub const MSG_SUSPENSE: &str = "Let's see if you got it right...";
pub const MSG_LOSS: &str = "Too bad, not this time!";

/// Identity of a cup, `1..=3`. Stays with the cup however it is shuffled.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
pub struct Slot(u8);

impl Slot {
    pub const ALL: [Slot; SLOT_COUNT] = [Slot(1), Slot(2), Slot(3)];

    pub fn new(id: u8) -> Result<Self> {
        if (1..=SLOT_COUNT as u8).contains(&id) {
            Ok(Slot(id))
        } else {
            Err(GameError::InvalidSlot(id))
        }
    }

    pub fn id(self) -> u8 {
        self.0
    }

    fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub enum Phase {
    #[default]
    Idle,
    BettingOpen,
    BetLocked,
    Revealing,
    Shuffling,
    ChoiceOpen,
    Resolving,
    Cooldown,
}

impl Phase {
    pub fn accepts_bets(self) -> bool {
        self == Phase::BettingOpen
    }

    pub fn is_betting_window(self) -> bool {
        matches!(self, Phase::BettingOpen | Phase::BetLocked)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RoundEvent {
    CountdownTick(u32),
    CountdownExpired,
    RevealDwellElapsed,
    RevealPauseElapsed,
    SwapSettled,
    SuspenseElapsed,
    ResultShown,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Swap {
    pub a: usize,
    pub b: usize,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct CupFlags {
    pub selected: bool,
    pub lifted: bool,
    pub revealed: bool,
}

#[derive(Clone, Debug)]
pub struct Round {
    pub bet: Option<Chips>,
    pub winning_slot: Option<Slot>,
    pub chosen_slot: Option<Slot>,
    pub outcome: Option<Outcome>,
    pub layout: [Slot; SLOT_COUNT],
    pub swaps: Vec<Swap>,
    cups: [CupFlags; SLOT_COUNT],
}

impl Default for Round {
    fn default() -> Self {
        Round {
            bet: None,
            winning_slot: None,
            chosen_slot: None,
            outcome: None,
            layout: Slot::ALL,
            swaps: Vec::new(),
            cups: [CupFlags::default(); SLOT_COUNT],
        }
    }
}

impl Round {
    pub fn cup(&self, slot: Slot) -> CupFlags {
        self.cups[slot.index()]
    }

    fn cup_mut(&mut self, slot: Slot) -> &mut CupFlags {
        &mut self.cups[slot.index()]
    }

    pub fn slot_at(&self, position: usize) -> Option<Slot> {
        self.layout.get(position).copied()
    }
}

#[derive(Clone, Debug)]
pub struct Session {
    pub wallet: Wallet,
    pub history: HistoryLedger,
    pub round: Round,
}

pub struct RoundMachine<R = StdRng> {
    config: GameConfig,
    session: Session,
    scheduler: Scheduler<RoundEvent>,
    rng: R,
    phase: Phase,
    countdown: Option<u32>,
    message: String,
    swaps_left: u8,
    rigged: Option<Slot>,
    round_number: u64,
}

impl<R: Rng> RoundMachine<R> {
    pub fn new(config: GameConfig, mut rng: R) -> Self {
        let mut history = HistoryLedger::with_capacity(config.history_capacity);
        if config.seed_history {
            history.seed_mock(&mut rng);
        }
        let session = Session {
            wallet: Wallet::new(config.initial_balance),
            history,
            round: Round::default(),
        };
        Self {
            config,
            session,
            scheduler: Scheduler::new(),
            rng,
            phase: Phase::Idle,
            countdown: None,
            message: String::new(),
            swaps_left: 0,
            rigged: None,
            round_number: 0,
        }
    }

    pub fn start(&mut self) {
        if self.phase != Phase::Idle {
            debug!(phase = ?self.phase, "start ignored, already running");
            return;
        }
        info!(balance = self.session.wallet.balance(), "session started");
        self.open_betting(MSG_PLACE_BET);
    }

    pub fn place_bet(&mut self, amount: Chips) -> Result<()> {
        match self.phase {
            Phase::Idle => return Err(GameError::BettingClosed),
            Phase::BettingOpen => {}
            _ => return Err(GameError::BetAlreadyPlaced),
        }
        self.session.wallet.debit(amount)?;
        self.session.round.bet = Some(amount);
        self.phase = Phase::BetLocked;
        self.message = MSG_BET_PLACED.to_string();
        info!(
            amount,
            balance = self.session.wallet.balance(),
            "bet placed"
        );
        Ok(())
    }

    pub fn choose_slot(&mut self, slot_id: u8) -> Result<()> {
        if self.phase != Phase::ChoiceOpen {
            return Err(GameError::ChoiceNotAllowed);
        }
        let slot = Slot::new(slot_id)?;
        self.session.round.chosen_slot = Some(slot);
        self.session.round.cup_mut(slot).selected = true;
        info!(%slot, "slot chosen");
        self.transition(Phase::Resolving);
        self.message = MSG_SUSPENSE.to_string();
        self.scheduler
            .after(self.config.timings.suspense(), RoundEvent::SuspenseElapsed);
        Ok(())
    }

    pub fn advance_to(&mut self, now: Duration) -> usize {
        let mut applied = 0;
        while let Some(took_effect) = self.step(now) {
            if took_effect {
                applied += 1;
            }
        }
        applied
    }

    pub fn step(&mut self, now: Duration) -> Option<bool> {
        let event = self.scheduler.pop_due(now)?;
        Some(self.handle(event))
    }

    /// Applies a single timer event. Events that don't belong to the current
    /// phase are dropped and `false` is returned.
    pub fn handle(&mut self, event: RoundEvent) -> bool {
        let outcome = self.session.round.outcome;
        match (self.phase, event) {
            (Phase::BettingOpen | Phase::BetLocked, RoundEvent::CountdownTick(left)) => {
                debug!(left, "countdown tick");
                self.countdown = Some(left);
            }
            (Phase::BettingOpen | Phase::BetLocked, RoundEvent::CountdownExpired) => {
                self.countdown = Some(0);
                self.close_betting();
            }
            (Phase::Revealing, RoundEvent::RevealDwellElapsed) => {
                for slot in Slot::ALL {
                    let cup = self.session.round.cup_mut(slot);
                    cup.lifted = false;
                    cup.revealed = false;
                }
                self.scheduler.after(
                    self.config.timings.reveal_pause(),
                    RoundEvent::RevealPauseElapsed,
                );
            }
            (Phase::Revealing, RoundEvent::RevealPauseElapsed) => self.begin_shuffle(),
            (Phase::Shuffling, RoundEvent::SwapSettled) => self.swap_or_open_choice(),
            (Phase::Resolving, RoundEvent::SuspenseElapsed) if outcome.is_none() => {
                self.settle()
            }
            (Phase::Resolving, RoundEvent::ResultShown) if outcome.is_some() => {
                self.transition(Phase::Cooldown);
                self.open_betting(MSG_PLACE_BET);
            }
            (phase, event) => {
                debug!(?phase, ?event, "dropping stale timer event");
                return false;
            }
        }
        true
    }

    /// Forces the winning slot of the next reveal instead of drawing it.
    pub fn rig_next_winning_slot(&mut self, slot: Slot) {
        self.rigged = Some(slot);
    }

    pub fn announce(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn round_number(&self) -> u64 {
        self.round_number
    }

    pub fn countdown_remaining(&self) -> Option<u32> {
        if self.phase.is_betting_window() {
            self.countdown
        } else {
            None
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn balance(&self) -> Chips {
        self.session.wallet.balance()
    }

    pub fn history(&self) -> &HistoryLedger {
        &self.session.history
    }

    pub fn round(&self) -> &Round {
        &self.session.round
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn last_swap(&self) -> Option<Swap> {
        self.session.round.swaps.last().copied()
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    fn transition(&mut self, next: Phase) {
        self.scheduler.cancel_all();
        debug!(from = ?self.phase, to = ?next, "phase change");
        self.phase = next;
    }

    fn open_betting(&mut self, message: &str) {
        self.session.round = Round::default();
        self.round_number += 1;
        self.swaps_left = 0;
        self.transition(Phase::BettingOpen);
        self.countdown = Some(self.config.countdown_secs);
        self.scheduler.start_countdown(
            self.config.countdown_secs,
            self.config.timings.countdown_tick(),
            RoundEvent::CountdownTick,
            RoundEvent::CountdownExpired,
        );
        self.message = message.to_string();
    }

    fn close_betting(&mut self) {
        if self.session.round.bet.is_none() {
            info!("countdown expired without a bet");
            self.transition(Phase::Cooldown);
            self.open_betting(MSG_TIMES_UP);
            return;
        }
        self.transition(Phase::Revealing);
        let winner = match self.rigged.take() {
            Some(slot) => slot,
            None => self.draw_slot(),
        };
        self.session.round.winning_slot = Some(winner);
        let cup = self.session.round.cup_mut(winner);
        cup.lifted = true;
        cup.revealed = true;
        debug!(%winner, "winning slot drawn");
        self.message = MSG_LOOK.to_string();
        self.scheduler.after(
            self.config.timings.reveal_dwell(),
            RoundEvent::RevealDwellElapsed,
        );
    }

    fn draw_slot(&mut self) -> Slot {
        let id = self.rng.random_range(1..=SLOT_COUNT as u8);
        Slot(id)
    }

    fn begin_shuffle(&mut self) {
        self.transition(Phase::Shuffling);
        self.swaps_left = self.config.timings.swap_count;
        self.message = MSG_SHUFFLING.to_string();
        self.swap_or_open_choice();
    }

    fn swap_or_open_choice(&mut self) {
        if self.swaps_left == 0 {
            self.transition(Phase::ChoiceOpen);
            self.message = MSG_CHOOSE.to_string();
            return;
        }
        self.swaps_left -= 1;
        let picked = index::sample(&mut self.rng, SLOT_COUNT, 2);
        let swap = Swap {
            a: picked.index(0),
            b: picked.index(1),
        };
        self.session.round.layout.swap(swap.a, swap.b);
        self.session.round.swaps.push(swap);
        debug!(?swap, layout = ?self.session.round.layout, "cups swapped");
        self.scheduler
            .after(self.config.timings.swap_interval(), RoundEvent::SwapSettled);
    }

    fn settle(&mut self) {
        let round = &mut self.session.round;
        let winner = round.winning_slot;
        for slot in Slot::ALL {
            let cup = round.cup_mut(slot);
            cup.lifted = true;
            cup.revealed = Some(slot) == winner;
        }
        let (bet, winner, chosen) = match (round.bet, winner, round.chosen_slot) {
            (Some(bet), Some(winner), Some(chosen)) => (bet, winner, chosen),
            _ => {
                debug!("nothing to settle");
                self.transition(Phase::Cooldown);
                self.open_betting(MSG_PLACE_BET);
                return;
            }
        };
        let outcome = if chosen == winner {
            let payout = bet.saturating_mul(2);
            self.session.wallet.credit(payout);
            self.session.history.record(Outcome::Win, payout);
            self.message = format!(
                "Congratulations! You won {}!",
                format_amount(&self.config.currency, payout)
            );
            Outcome::Win
        } else {
            self.session.history.record(Outcome::Loss, bet);
            self.message = MSG_LOSS.to_string();
            Outcome::Loss
        };
        self.session.round.outcome = Some(outcome);
        info!(
            ?outcome,
            bet,
            %winner,
            %chosen,
            balance = self.session.wallet.balance(),
            "round settled"
        );
        self.scheduler.after(
            self.config.timings.result_display(),
            RoundEvent::ResultShown,
        );
    }
}
