//! # Pixel Guess Server Library
//!
//! Authoritative server for a multiplayer pixel art guessing game. Players
//! see a target pattern, paint their own copy and submit it; the first exact
//! match wins the round and is written to a persistent history. Rounds rotate
//! on a timer, and an administrator can retime, skip, force a pattern or let
//! a correct answer rotate immediately.
//!
//! ## Core Responsibilities
//!
//! ### Round Lifecycle
//! The server owns the one and only current round. Every read and write of
//! that round is serialized, so a snapshot is always consistent and two
//! simultaneous correct answers produce exactly one winner.
//!
//! ### Validation
//! Submissions are compared cell by cell with the current pattern. Painted
//! cells must match filled cells and unpainted cells (`""`, `transparent`,
//! `#ffffff`) must match empty ones; a grid of the wrong size never matches.
//!
//! ### History
//! Winning grids are appended to a JSON file. A win only counts once it is
//! on disk.
//!
//! ## Module Organization
//!
//! ### Catalog Module (`catalog`)
//! The immutable list of target patterns loaded at startup.
//!
//! ### Game Module (`game`)
//! The round state machine and the engine that guards it:
//! - snapshots for the public dashboard
//! - submission judging and auto-switch
//! - admin transitions (retime, force, skip)
//! - the background ticker that expires rounds
//!
//! ### History Module (`history`)
//! Append-only winner log with indexed reads and a leaderboard.
//!
//! ### Admin Module (`admin`)
//! Validation and logging in front of the engine's admin operations.
//!
//! ### HTTP Module (`http`)
//! axum routes for the JSON API, the static pages and basic-auth on `/admin`.
//!
//! ## Concurrency
//!
//! One ticker task runs next to one task per HTTP request. The round sits
//! behind a single mutex; the history store has its own lock and is only
//! ever taken while holding the round lock, never the other way round.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::catalog::PatternCatalog;
//! use server::game::GameEngine;
//! use server::history::HistoryStore;
//! use server::http::{router, AdminCredentials, AppState};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = Arc::new(PatternCatalog::load("data/pixel_model.json")?);
//!     let history = Arc::new(HistoryStore::open("data/history.json").await);
//!     let game = Arc::new(GameEngine::new(catalog, history, Duration::from_secs(60)));
//!
//!     // Expire rounds once per second
//!     tokio::spawn(Arc::clone(&game).run_ticker(Duration::from_secs(1)));
//!
//!     let state = AppState::new(
//!         game,
//!         AdminCredentials::new("admin", "password"),
//!         PathBuf::from("templates"),
//!     );
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, router(state)).await?;
//!     Ok(())
//! }
//! ```

pub mod admin;
pub mod catalog;
pub mod config;
pub mod error;
pub mod game;
pub mod history;
pub mod http;
