//! Properties of the pure progression engine

mod common;

use chrono::{Days, NaiveDate};
use proptest::prelude::*;

use common::date;
use growquest::progression::{
    BadgeTable, LevelTable, LevelTier, ProgressionEngine, ProgressionState, XpDelta,
    is_consecutive_day,
};

/// Strategy for valid level tables: level 1 at 0, strictly increasing thresholds
fn level_table() -> impl Strategy<Value = LevelTable> {
    prop::collection::vec(1u64..1_000, 0..20).prop_map(|gaps| {
        let mut threshold = 0;
        let mut tiers = vec![LevelTier::new(1, 0, "L1")];
        for (i, gap) in gaps.into_iter().enumerate() {
            threshold += gap;
            let level = i as u32 + 2;
            tiers.push(LevelTier::new(level, threshold, format!("L{}", level)));
        }
        LevelTable::new(tiers).expect("generated table is valid")
    })
}

fn any_day() -> impl Strategy<Value = NaiveDate> {
    (0u64..20_000).prop_map(|offset| date("1990-01-01") + Days::new(offset))
}

fn any_state() -> impl Strategy<Value = ProgressionState> {
    (
        0u64..1_000_000,
        0u32..1_000,
        prop::option::of(any_day()),
        0u64..10_000,
    )
        .prop_map(|(total_xp, streak_days, last_activity_date, daily_xp)| ProgressionState {
            total_xp,
            streak_days,
            best_streak: streak_days,
            last_activity_date,
            daily_xp,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn level_is_monotonic(table in level_table(), a in 0u64..50_000, b in 0u64..50_000) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(table.level_for_xp(lo) <= table.level_for_xp(hi));
    }

    #[test]
    fn progress_is_bounded(table in level_table(), xp in 0u64..50_000, level in 0u32..40) {
        let progress = table.progress_to_next_level(xp, level);
        prop_assert!((0.0..=100.0).contains(&progress));

        let own = table.progress_to_next_level(xp, table.level_for_xp(xp));
        prop_assert!((0.0..=100.0).contains(&own));
    }

    #[test]
    fn award_then_revoke_restores_totals(state in any_state(), n in 1u32..10_000, day in any_day()) {
        let awarded = state.apply_xp_delta(XpDelta::award(n), day);
        let restored = awarded.apply_xp_delta(XpDelta::revoke(n), day);

        prop_assert_eq!(restored.total_xp, state.total_xp);
        prop_assert_eq!(restored.daily_xp_on(day), state.daily_xp_on(day));
        if state.last_activity_date == Some(day) {
            prop_assert_eq!(restored.daily_xp, state.daily_xp);
        }
    }

    #[test]
    fn streak_rules(state in any_state(), n in 1u32..1_000, gap in 2u64..400) {
        let Some(last) = state.last_activity_date else {
            let next = state.apply_xp_delta(XpDelta::award(n), date("2024-01-05"));
            prop_assert_eq!(next.streak_days, 1);
            return Ok(());
        };

        let next_day = last + Days::new(1);
        prop_assert!(is_consecutive_day(last, next_day));
        let extended = state.apply_xp_delta(XpDelta::award(n), next_day);
        prop_assert_eq!(extended.streak_days, state.streak_days + 1);

        let again = extended.apply_xp_delta(XpDelta::award(n), next_day);
        prop_assert_eq!(again.streak_days, extended.streak_days);

        let later = last + Days::new(gap);
        let reset = state.apply_xp_delta(XpDelta::award(n), later);
        prop_assert_eq!(reset.streak_days, 1);
    }

    #[test]
    fn revocation_never_touches_streak(state in any_state(), n in 1u32..1_000, day in any_day()) {
        let next = state.apply_xp_delta(XpDelta::revoke(n), day);
        prop_assert_eq!(next.streak_days, state.streak_days);
        prop_assert_eq!(next.last_activity_date, state.last_activity_date);
        prop_assert_eq!(next.total_xp, state.total_xp.saturating_sub(u64::from(n)));
    }

    #[test]
    fn level_never_drops_on_award(state in any_state(), n in 1u32..5_000, day in any_day()) {
        let engine = ProgressionEngine::default();
        let outcome = engine.apply(&state, XpDelta::award(n), day, "prop");
        prop_assert!(outcome.state.level(engine.levels()) >= state.level(engine.levels()));
    }
}

#[test]
fn canonical_badges_cover_every_xp_exactly_once() {
    let badges = BadgeTable::default();
    let max_table_xp = badges
        .tiers()
        .iter()
        .filter_map(|t| t.max_xp)
        .max()
        .unwrap_or(0);

    for xp in 0..=max_table_xp + 1_000 {
        let matching = badges.tiers().iter().filter(|t| t.contains(xp)).count();
        assert_eq!(matching, 1, "xp {} matched {} tiers", xp, matching);
        assert!(badges.badge_for_xp(xp).contains(xp));
    }
}

#[test]
fn three_level_table_scenario() {
    let table = LevelTable::new(vec![
        LevelTier::new(1, 0, "One"),
        LevelTier::new(2, 250, "Two"),
        LevelTier::new(3, 500, "Three"),
    ])
    .unwrap();

    assert_eq!(table.level_for_xp(249), 1);
    assert_eq!(table.level_for_xp(250), 2);
    assert!((table.progress_to_next_level(125, 1) - 50.0).abs() < 1e-9);
}

fn scenario_state() -> ProgressionState {
    ProgressionState {
        total_xp: 100,
        streak_days: 3,
        best_streak: 3,
        last_activity_date: Some(date("2024-01-05")),
        daily_xp: 20,
    }
}

#[test]
fn next_day_award_extends_streak() {
    let next = scenario_state().apply_xp_delta(XpDelta::award(30), date("2024-01-06"));
    assert_eq!(next.total_xp, 130);
    assert_eq!(next.streak_days, 4);
    assert_eq!(next.daily_xp, 30);
    assert_eq!(next.last_activity_date, Some(date("2024-01-06")));
    assert_eq!(next.best_streak, 4);
}

#[test]
fn award_after_gap_resets_streak() {
    let next = scenario_state().apply_xp_delta(XpDelta::award(30), date("2024-01-08"));
    assert_eq!(next.streak_days, 1);
    assert_eq!(next.best_streak, 3);
}

#[test]
fn goal_complete_then_reopen_restores_xp() {
    let before = scenario_state();
    let today = date("2024-01-05");

    let completed = before.apply_xp_delta(XpDelta::award(30), today);
    let reopened = completed.apply_xp_delta(XpDelta::revoke(30), today);

    assert_eq!(reopened.total_xp, before.total_xp);
    assert_eq!(reopened.daily_xp, before.daily_xp);
}

#[test]
fn fractional_and_non_finite_deltas_are_rejected() {
    assert!(XpDelta::try_from(1.5).is_err());
    assert!(XpDelta::try_from(f64::NAN).is_err());
    assert!(XpDelta::try_from(f64::INFINITY).is_err());
    assert!("abc".parse::<XpDelta>().is_err());
    assert_eq!(XpDelta::try_from(-30.0).unwrap(), XpDelta::revoke(30));
    assert_eq!("25".parse::<XpDelta>().unwrap(), XpDelta::award(25));
}
