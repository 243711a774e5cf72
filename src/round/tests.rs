#![allow(non_snake_case)]

use super::*;
use rand::SeedableRng;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn machine() -> RoundMachine<StdRng> {
    let config = GameConfig {
        seed_history: false,
        ..GameConfig::default()
    };
    RoundMachine::new(config, StdRng::seed_from_u64(42))
}

fn slot(id: u8) -> Slot {
    Slot::new(id).unwrap()
}

/// Bets, rigs the winner and runs the clock until the player may choose.
fn to_choice(m: &mut RoundMachine<StdRng>, bet: Chips, winner: u8) {
    m.place_bet(bet).unwrap();
    m.rig_next_winning_slot(slot(winner));
    let until = m.now() + ms(20_000);
    m.advance_to(until);
    assert_eq!(Phase::ChoiceOpen, m.phase());
}

#[test]
fn start__opens_betting_with_full_countdown() {
    let mut m = machine();

    m.start();

    assert_eq!(Phase::BettingOpen, m.phase());
    assert_eq!(Some(10), m.countdown_remaining());
    assert_eq!(MSG_PLACE_BET, m.message());
}

#[test]
fn place_bet__debits_immediately_and_locks_betting() {
    // given
    let mut m = machine();
    m.start();

    // when
    m.place_bet(20).unwrap();

    // then
    assert_eq!(80, m.balance());
    assert_eq!(Phase::BetLocked, m.phase());
    assert_eq!(Some(20), m.round().bet);
    assert_eq!(MSG_BET_PLACED, m.message());
}

#[test]
fn place_bet__second_bet_is_rejected_without_debit() {
    let mut m = machine();
    m.start();
    m.place_bet(20).unwrap();

    let result = m.place_bet(30);

    assert_eq!(Err(GameError::BetAlreadyPlaced), result);
    assert_eq!(80, m.balance());
    assert_eq!(Some(20), m.round().bet);
}

#[test]
fn place_bet__rejected_before_start() {
    let mut m = machine();

    assert_eq!(Err(GameError::BettingClosed), m.place_bet(10));
    assert_eq!(100, m.balance());
}

#[test]
fn place_bet__over_balance_leaves_round_open() {
    let mut m = machine();
    m.start();

    let result = m.place_bet(150);

    assert_eq!(
        Err(GameError::InsufficientFunds {
            requested: 150,
            available: 100
        }),
        result
    );
    assert_eq!(Phase::BettingOpen, m.phase());
    assert_eq!(None, m.round().bet);
    assert!(m.place_bet(100).is_ok());
}

#[test]
fn place_bet__rejected_while_cups_are_moving() {
    let mut m = machine();
    m.start();
    m.place_bet(10).unwrap();
    m.advance_to(ms(12_000));
    assert_eq!(Phase::Shuffling, m.phase());

    assert_eq!(Err(GameError::BetAlreadyPlaced), m.place_bet(10));
    assert_eq!(90, m.balance());
}

#[test]
fn countdown__ticks_update_remaining_seconds() {
    let mut m = machine();
    m.start();

    m.advance_to(ms(3_000));

    assert_eq!(Some(7), m.countdown_remaining());
}

#[test]
fn countdown__keeps_running_after_bet() {
    let mut m = machine();
    m.start();
    m.advance_to(ms(4_000));

    m.place_bet(5).unwrap();
    m.advance_to(ms(6_000));

    assert_eq!(Phase::BetLocked, m.phase());
    assert_eq!(Some(4), m.countdown_remaining());
}

#[test]
fn countdown_expiry__without_bet_skips_to_next_window() {
    // given
    let mut m = machine();
    m.start();

    // when
    m.advance_to(ms(10_000));

    // then
    assert_eq!(Phase::BettingOpen, m.phase());
    assert_eq!(Some(10), m.countdown_remaining());
    assert_eq!(MSG_TIMES_UP, m.message());
    assert_eq!(100, m.balance());
    assert_eq!(None, m.round().winning_slot);
    assert!(m.round().swaps.is_empty());
    assert!(m.history().is_empty());
}

#[test]
fn countdown_expiry__without_bet_restarts_full_window() {
    let mut m = machine();
    m.start();
    m.advance_to(ms(10_000));

    m.advance_to(ms(19_000));

    assert_eq!(Some(1), m.countdown_remaining());
    assert_eq!(Phase::BettingOpen, m.phase());
}

#[test]
fn reveal__shows_winning_cup_then_hides_it() {
    // given
    let mut m = machine();
    m.start();
    m.place_bet(20).unwrap();
    m.rig_next_winning_slot(slot(2));

    // when
    m.advance_to(ms(10_000));

    // then
    assert_eq!(Phase::Revealing, m.phase());
    assert_eq!(Some(slot(2)), m.round().winning_slot);
    assert_eq!(
        CupFlags {
            selected: false,
            lifted: true,
            revealed: true
        },
        m.round().cup(slot(2))
    );
    assert_eq!(None, m.countdown_remaining());
    assert_eq!(MSG_LOOK, m.message());

    m.advance_to(ms(11_500));
    assert_eq!(Phase::Revealing, m.phase());
    assert_eq!(CupFlags::default(), m.round().cup(slot(2)));

    m.advance_to(ms(11_800));
    assert_eq!(Phase::Shuffling, m.phase());
}

#[test]
fn reveal__cancels_the_countdown() {
    let mut m = machine();
    m.start();
    m.place_bet(20).unwrap();

    m.advance_to(ms(10_000));

    // only the reveal dwell is pending
    assert_eq!(1, m.pending_timers());
}

#[test]
fn shuffle__swaps_four_times_then_opens_choice() {
    let mut m = machine();
    m.start();
    m.place_bet(20).unwrap();
    m.rig_next_winning_slot(slot(3));

    m.advance_to(ms(11_800));
    assert_eq!(1, m.round().swaps.len());
    assert_eq!(MSG_SHUFFLING, m.message());

    m.advance_to(ms(13_399));
    assert_eq!(Phase::Shuffling, m.phase());
    assert_eq!(4, m.round().swaps.len());

    m.advance_to(ms(13_400));
    assert_eq!(Phase::ChoiceOpen, m.phase());
    assert_eq!(MSG_CHOOSE, m.message());
    assert_eq!(0, m.pending_timers());
}

#[test]
fn shuffle__moves_cups_but_not_the_winner() {
    let mut m = machine();
    m.start();
    to_choice(&mut m, 20, 1);

    let mut layout = m.round().layout;
    layout.sort();

    assert_eq!(Slot::ALL, layout);
    assert_eq!(Some(slot(1)), m.round().winning_slot);
    for swap in &m.round().swaps {
        assert_ne!(swap.a, swap.b);
        assert!(swap.a < SLOT_COUNT && swap.b < SLOT_COUNT);
    }
    assert_eq!(m.round().swaps.last().copied(), m.last_swap());
}

#[test]
fn shuffle__layout_matches_replayed_swaps() {
    let mut m = machine();
    m.start();
    to_choice(&mut m, 20, 1);

    let mut replay = Slot::ALL;
    for swap in &m.round().swaps {
        replay.swap(swap.a, swap.b);
    }

    assert_eq!(replay, m.round().layout);
}

#[test]
fn choose_slot__rejected_before_choice_opens() {
    let mut m = machine();
    m.start();
    m.place_bet(20).unwrap();

    let result = m.choose_slot(1);

    assert_eq!(Err(GameError::ChoiceNotAllowed), result);
    assert_eq!(None, m.round().chosen_slot);
}

#[test]
fn choose_slot__second_choice_is_ignored() {
    // given
    let mut m = machine();
    m.start();
    to_choice(&mut m, 20, 2);
    m.choose_slot(2).unwrap();

    // when
    let result = m.choose_slot(1);

    // then
    assert_eq!(Err(GameError::ChoiceNotAllowed), result);
    assert_eq!(Some(slot(2)), m.round().chosen_slot);
    assert!(m.round().cup(slot(2)).selected);
    assert!(!m.round().cup(slot(1)).selected);
}

#[test]
fn choose_slot__unknown_slot_keeps_choice_open() {
    let mut m = machine();
    m.start();
    to_choice(&mut m, 20, 2);

    assert_eq!(Err(GameError::InvalidSlot(4)), m.choose_slot(4));
    assert_eq!(Err(GameError::InvalidSlot(0)), m.choose_slot(0));

    assert_eq!(Phase::ChoiceOpen, m.phase());
    assert!(m.choose_slot(3).is_ok());
}

#[test]
fn resolve__win_pays_double_and_records_payout() {
    // given
    let mut m = machine();
    m.start();
    to_choice(&mut m, 20, 2);
    assert_eq!(80, m.balance());

    // when
    m.choose_slot(2).unwrap();
    assert_eq!(MSG_SUSPENSE, m.message());
    let settle_at = m.now() + ms(1_000);
    m.advance_to(settle_at);

    // then
    assert_eq!(120, m.balance());
    assert_eq!(Some(Outcome::Win), m.round().outcome);
    assert_eq!(
        vec![crate::history::HistoryEntry {
            outcome: Outcome::Win,
            amount: 40
        }],
        m.history().snapshot()
    );
    assert_eq!("Congratulations! You won R$ 40.00!", m.message());
}

#[test]
fn resolve__loss_keeps_stake_and_records_it() {
    let mut m = machine();
    m.start();
    to_choice(&mut m, 20, 2);

    m.choose_slot(1).unwrap();
    let settle_at = m.now() + ms(1_000);
    m.advance_to(settle_at);

    assert_eq!(80, m.balance());
    assert_eq!(
        vec![crate::history::HistoryEntry {
            outcome: Outcome::Loss,
            amount: 20
        }],
        m.history().snapshot()
    );
    assert_eq!(MSG_LOSS, m.message());
}

#[test]
fn resolve__lifts_every_cup_and_marks_only_the_winner() {
    let mut m = machine();
    m.start();
    to_choice(&mut m, 20, 3);

    m.choose_slot(1).unwrap();
    let settle_at = m.now() + ms(1_000);
    m.advance_to(settle_at);

    for s in Slot::ALL {
        let cup = m.round().cup(s);
        assert!(cup.lifted);
        assert_eq!(s == slot(3), cup.revealed);
    }
    assert!(m.round().cup(slot(1)).selected);
}

#[test]
fn resolve__waits_for_suspense_before_settling() {
    let mut m = machine();
    m.start();
    to_choice(&mut m, 20, 2);

    m.choose_slot(2).unwrap();
    let almost = m.now() + ms(999);
    m.advance_to(almost);

    assert_eq!(80, m.balance());
    assert_eq!(None, m.round().outcome);
}

#[test]
fn cooldown__resets_round_after_result_display() {
    // given
    let mut m = machine();
    m.start();
    to_choice(&mut m, 20, 2);
    m.choose_slot(2).unwrap();
    let settled = m.now() + ms(1_000);
    m.advance_to(settled);
    assert_eq!(Phase::Resolving, m.phase());

    // when
    m.advance_to(settled + ms(4_000));

    // then
    assert_eq!(Phase::BettingOpen, m.phase());
    assert_eq!(Some(10), m.countdown_remaining());
    assert_eq!(MSG_PLACE_BET, m.message());
    let round = m.round();
    assert_eq!(None, round.bet);
    assert_eq!(None, round.winning_slot);
    assert_eq!(None, round.chosen_slot);
    assert_eq!(None, round.outcome);
    assert_eq!(Slot::ALL, round.layout);
    assert!(Slot::ALL.iter().all(|s| round.cup(*s) == CupFlags::default()));
    assert_eq!(120, m.balance());
    assert!(m.place_bet(10).is_ok());
}

#[test]
fn handle__stale_countdown_events_are_dropped() {
    let mut m = machine();
    m.start();
    to_choice(&mut m, 20, 2);

    assert!(!m.handle(RoundEvent::CountdownTick(3)));
    assert!(!m.handle(RoundEvent::CountdownExpired));

    assert_eq!(Phase::ChoiceOpen, m.phase());
    assert_eq!(None, m.countdown_remaining());
}

#[test]
fn handle__late_result_event_cannot_settle_twice() {
    let mut m = machine();
    m.start();
    to_choice(&mut m, 20, 2);
    m.choose_slot(2).unwrap();
    let settled = m.now() + ms(1_000);
    m.advance_to(settled);

    assert!(!m.handle(RoundEvent::SuspenseElapsed));

    assert_eq!(120, m.balance());
    assert_eq!(1, m.history().len());
}

#[test]
fn start__twice_does_not_restart_countdown() {
    let mut m = machine();
    m.start();
    m.advance_to(ms(5_000));

    m.start();

    assert_eq!(Some(5), m.countdown_remaining());
}

#[test]
fn new__seeds_history_when_configured() {
    let config = GameConfig {
        seed_history: true,
        ..GameConfig::default()
    };

    let m = RoundMachine::new(config, StdRng::seed_from_u64(1));

    assert_eq!(5, m.history().len());
    assert_eq!(100, m.balance());
}

#[test]
fn draw__winning_slot_is_roughly_uniform() {
    let config = GameConfig {
        initial_balance: 1_000_000,
        seed_history: false,
        ..GameConfig::default()
    };
    let mut m = RoundMachine::new(config, StdRng::seed_from_u64(2024));
    m.start();
    let mut counts = [0u32; SLOT_COUNT];
    let rounds = 3_000;

    for _ in 0..rounds {
        m.place_bet(1).unwrap();
        let until = m.now() + ms(20_000);
        m.advance_to(until);
        let winner = m.round().winning_slot.unwrap();
        counts[usize::from(winner.id() - 1)] += 1;
        m.choose_slot(1).unwrap();
        let next = m.now() + ms(5_000);
        m.advance_to(next);
        assert_eq!(Phase::BettingOpen, m.phase());
    }

    for count in counts {
        assert!((850..=1_150).contains(&count), "skewed draw: {counts:?}");
    }
}

#[test]
fn round_number__advances_on_times_up_restart() {
    let mut m = machine();
    m.start();
    assert_eq!(1, m.round_number());

    m.advance_to(ms(9_000));
    assert_eq!(1, m.round_number());

    m.advance_to(ms(10_000));
    assert_eq!(2, m.round_number());
    assert_eq!(Phase::BettingOpen, m.phase());
}
