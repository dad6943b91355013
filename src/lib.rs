//! Growquest - a gamified personal-growth tracker
//!
//! Users complete daily tasks, set goals and log meals; each of those turns
//! into signed XP changes. The [`progression`] engine maps XP to levels and
//! badges and keeps streaks of consecutive active days. It is pure: the
//! [`tracker`] runs it inside an optimistic `load -> apply -> save` cycle
//! against the SQLite [`store`], and the [`server`] exposes a read-only
//! leaderboard over HTTP.

pub mod config;
pub mod domain;
pub mod progression;
pub mod server;
pub mod store;
pub mod tracker;
