//! Integration tests for the tracker over a file-backed SQLite store

mod common;

use std::thread;

use common::{date, open_tracker, temp_data_dir, user};
use growquest::domain::NewGoal;
use growquest::progression::XpDelta;
use growquest::store::{CompletionChange, ProgressionStore, StoreError, XpSource};

#[test]
fn test_concurrent_awards_are_never_lost() {
    let dir = temp_data_dir();
    let alice = user("alice");
    let today = date("2024-01-05");

    // Separate connections, like the CLI and the server running side by side
    let writers: Vec<_> = (0..4)
        .map(|_| {
            let tracker = open_tracker(dir.path());
            let alice = alice.clone();
            thread::spawn(move || {
                for _ in 0..25 {
                    tracker
                        .award(&alice, XpDelta::award(2), XpSource::Manual, None, today)
                        .expect("award should succeed within the retry budget");
                }
            })
        })
        .collect();

    for writer in writers {
        writer.join().expect("writer thread panicked");
    }

    let tracker = open_tracker(dir.path());
    let stats = tracker.player_stats(&alice, today).unwrap();
    assert_eq!(stats.total_xp, 4 * 25 * 2);
    assert_eq!(stats.daily_xp, 4 * 25 * 2);
    assert_eq!(stats.streak_days, 1);
    assert_eq!(tracker.history(&alice, 1_000).unwrap().len(), 100);
}

#[test]
fn test_same_task_from_two_writers_awards_once() {
    let dir = temp_data_dir();
    let alice = user("alice");
    let today = date("2024-01-05");

    let first = open_tracker(dir.path());
    let second = open_tracker(dir.path());

    let a = first.complete_task(&alice, "exercise", today).unwrap();
    let b = second.complete_task(&alice, "exercise", today).unwrap();
    assert!(a.is_some());
    assert!(b.is_none());

    assert_eq!(first.player_stats(&alice, today).unwrap().total_xp, 30);
}

#[test]
fn test_undo_cannot_slip_between_completion_and_award() {
    let dir = temp_data_dir();
    let alice = user("alice");
    let today = date("2024-01-05");

    let a = open_tracker(dir.path());
    let b = open_tracker(dir.path());

    // A reads and decides on +30 for exercise
    let progress = a.store().progress();
    let seen = progress.load_progression_state(&alice).unwrap();
    let next = seen.value.apply_xp_delta(XpDelta::award(30), today);

    // B completes and undoes the same task before A writes
    b.complete_task(&alice, "exercise", today).unwrap();
    assert_eq!(
        b.uncomplete_task(&alice, "exercise", today)
            .unwrap()
            .unwrap()
            .state
            .total_xp,
        0
    );

    // A's stale write lands neither the completion nor the XP
    let err = progress
        .save_with_completion(
            &alice,
            seen.version,
            &next,
            CompletionChange::TaskDone {
                day: today,
                task_id: "exercise",
            },
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::StaleWriteConflict { .. }));
    let (_, done) = a.task_board(&alice, today).unwrap();
    assert!(!done.is_completed("exercise"));
    assert_eq!(a.player_stats(&alice, today).unwrap().total_xp, 0);

    // Through the tracker the same sequence stays in step
    a.complete_task(&alice, "exercise", today).unwrap();
    b.uncomplete_task(&alice, "exercise", today).unwrap();
    let (_, done) = a.task_board(&alice, today).unwrap();
    assert!(!done.is_completed("exercise"));
    assert_eq!(a.player_stats(&alice, today).unwrap().total_xp, 0);
}

#[test]
fn test_racing_complete_and_undo_keep_xp_in_step() {
    let dir = temp_data_dir();
    let alice = user("alice");
    let today = date("2024-01-05");

    let writers: Vec<_> = (0..4)
        .map(|i| {
            let tracker = open_tracker(dir.path());
            let alice = alice.clone();
            thread::spawn(move || {
                for n in 0..20 {
                    if (i + n) % 2 == 0 {
                        tracker.complete_task(&alice, "exercise", today).unwrap();
                    } else {
                        tracker.uncomplete_task(&alice, "exercise", today).unwrap();
                    }
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().expect("writer thread panicked");
    }

    let tracker = open_tracker(dir.path());
    let (_, done) = tracker.task_board(&alice, today).unwrap();
    let expected = if done.is_completed("exercise") { 30 } else { 0 };
    assert_eq!(tracker.player_stats(&alice, today).unwrap().total_xp, expected);

    // The ledger agrees with the stored total
    let ledger: i64 = tracker
        .history(&alice, 10_000)
        .unwrap()
        .iter()
        .map(|e| e.delta.amount())
        .sum();
    assert_eq!(ledger, expected as i64);
}

#[test]
fn test_streak_across_days_and_revocation() {
    let dir = temp_data_dir();
    let tracker = open_tracker(dir.path());
    let alice = user("alice");

    tracker.complete_task(&alice, "water", date("2024-01-05")).unwrap();
    tracker.complete_task(&alice, "water", date("2024-01-06")).unwrap();
    tracker.complete_task(&alice, "read", date("2024-01-06")).unwrap();

    let stats = tracker.player_stats(&alice, date("2024-01-06")).unwrap();
    assert_eq!(stats.streak_days, 2);
    assert_eq!(stats.daily_xp, 30);
    assert_eq!(stats.total_xp, 40);

    // Undoing keeps the streak
    tracker.uncomplete_task(&alice, "read", date("2024-01-06")).unwrap();
    tracker.uncomplete_task(&alice, "water", date("2024-01-06")).unwrap();
    let stats = tracker.player_stats(&alice, date("2024-01-06")).unwrap();
    assert_eq!(stats.streak_days, 2);
    assert_eq!(stats.total_xp, 10);
    assert_eq!(stats.daily_xp, 0);

    // A missed day breaks it
    tracker.complete_task(&alice, "water", date("2024-01-09")).unwrap();
    let stats = tracker.player_stats(&alice, date("2024-01-09")).unwrap();
    assert_eq!(stats.streak_days, 1);
    assert_eq!(stats.best_streak, 2);
}

#[test]
fn test_goal_complete_and_reopen_restores_progress() {
    let dir = temp_data_dir();
    let tracker = open_tracker(dir.path());
    let alice = user("alice");
    let today = date("2024-01-05");

    tracker.complete_task(&alice, "plan", today).unwrap();
    let before = tracker.player_stats(&alice, today).unwrap();

    let goal = tracker
        .add_goal(
            &alice,
            NewGoal {
                text: "Run a 5k".to_string(),
                category: None,
                xp_value: Some(30),
            },
        )
        .unwrap();
    tracker.set_goal_completed(&alice, goal.id, true, today).unwrap();
    tracker.set_goal_completed(&alice, goal.id, false, today).unwrap();

    let after = tracker.player_stats(&alice, today).unwrap();
    assert_eq!(after.total_xp, before.total_xp);
    assert_eq!(after.daily_xp, before.daily_xp);
}

#[test]
fn test_leaderboard_ranks_persisted_users() {
    let dir = temp_data_dir();
    let tracker = open_tracker(dir.path());
    let today = date("2024-01-05");

    for (id, xp) in [("dave", 600), ("carol", 250), ("bob", 250), ("erin", 3500)] {
        tracker
            .award(&user(id), XpDelta::award(xp), XpSource::Manual, None, today)
            .unwrap();
    }
    tracker.add_user(&user("newbie"), Some("Newbie")).unwrap();

    let board = tracker.leaderboard(today, None).unwrap();
    let order: Vec<_> = board.iter().map(|e| e.user_id.as_str()).collect();
    assert_eq!(order, vec!["erin", "dave", "bob", "carol", "newbie"]);

    assert_eq!(board[0].level, 15);
    assert_eq!(board[0].title, "Legend");
    assert_eq!(board[0].badge, "Platinum");
    assert_eq!(board[4].total_xp, 0);
    assert_eq!(board[4].name, "Newbie");

    let top2 = tracker.leaderboard(today, Some(2)).unwrap();
    assert_eq!(top2.len(), 2);
}
