use crate::{
    bet_slip::parse_bet,
    error::{
        GameError,
        Result,
    },
    history::HistoryRow,
    round::{
        Phase,
        RoundMachine,
        Slot,
        Swap,
    },
    wallet::{
        Chips,
        format_amount,
    },
};
use rand::{
    Rng,
    rngs::StdRng,
};
use serde::Serialize;
use std::time::Duration;
use tracing::warn;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CupView {
    pub position: usize,
    pub slot: Slot,
    pub selected: bool,
    pub lifted: bool,
    pub revealed: bool,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct GameView {
    pub round_number: u64,
    pub phase: Phase,
    pub message: String,
    pub balance: Chips,
    pub balance_label: String,
    pub bet_input_enabled: bool,
    pub can_choose: bool,
    pub cups: Vec<CupView>,
    pub countdown: Option<u32>,
    pub history: Vec<HistoryRow>,
    pub last_swap: Option<Swap>,
}

impl GameView {
    pub fn of<R: Rng>(machine: &RoundMachine<R>) -> Self {
        let round = machine.round();
        let currency = &machine.config().currency;
        let cups = round
            .layout
            .iter()
            .enumerate()
            .map(|(position, slot)| {
                let flags = round.cup(*slot);
                CupView {
                    position,
                    slot: *slot,
                    selected: flags.selected,
                    lifted: flags.lifted,
                    revealed: flags.revealed,
                }
            })
            .collect();
        GameView {
            round_number: machine.round_number(),
            phase: machine.phase(),
            message: machine.message().to_string(),
            balance: machine.balance(),
            balance_label: format_amount(currency, machine.balance()),
            bet_input_enabled: machine.phase().accepts_bets(),
            can_choose: machine.phase() == Phase::ChoiceOpen,
            cups,
            countdown: machine.countdown_remaining(),
            history: machine.history().rows(currency),
            last_swap: machine.last_swap(),
        }
    }
}

pub trait Presenter {
    fn present(&mut self, view: &GameView);
}

impl Presenter for Vec<GameView> {
    fn present(&mut self, view: &GameView) {
        self.push(view.clone());
    }
}

pub struct Game<P, R = StdRng> {
    machine: RoundMachine<R>,
    presenter: P,
}

impl<P: Presenter, R: Rng> Game<P, R> {
    pub fn new(machine: RoundMachine<R>, presenter: P) -> Self {
        Self { machine, presenter }
    }

    pub fn start(&mut self) {
        self.machine.start();
        self.emit();
    }

    pub fn place_bet(&mut self, raw_amount: &str) -> Result<()> {
        let result = parse_bet(raw_amount).and_then(|amount| self.machine.place_bet(amount));
        self.finish("place_bet", result)
    }

    pub fn choose_slot(&mut self, slot_id: u8) -> Result<()> {
        let result = self.machine.choose_slot(slot_id);
        self.finish("choose_slot", result)
    }

    /// Picks whichever cup currently sits at display `position` (0-based).
    pub fn choose_position(&mut self, position: usize) -> Result<()> {
        let result = match self.machine.round().slot_at(position) {
            _ if self.machine.phase() != Phase::ChoiceOpen => Err(GameError::ChoiceNotAllowed),
            Some(slot) => self.machine.choose_slot(slot.id()),
            None => Err(GameError::InvalidSlot(
                u8::try_from(position + 1).unwrap_or(u8::MAX),
            )),
        };
        self.finish("choose_position", result)
    }

    pub fn advance_to(&mut self, now: Duration) -> usize {
        let mut applied = 0;
        while let Some(took_effect) = self.machine.step(now) {
            if took_effect {
                applied += 1;
                self.emit();
            }
        }
        applied
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.machine.next_deadline()
    }

    pub fn view(&self) -> GameView {
        GameView::of(&self.machine)
    }

    pub fn machine(&self) -> &RoundMachine<R> {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut RoundMachine<R> {
        &mut self.machine
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn into_presenter(self) -> P {
        self.presenter
    }

    fn finish(&mut self, command: &'static str, result: Result<()>) -> Result<()> {
        if let Err(e) = &result {
            warn!(command, error = %e, phase = ?self.machine.phase(), "command rejected");
            self.machine.announce(e.to_string());
        }
        self.emit();
        result
    }

    fn emit(&mut self) {
        let view = GameView::of(&self.machine);
        self.presenter.present(&view);
    }
}
