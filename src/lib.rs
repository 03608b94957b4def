//! # Emberward - A Small Persistent Game-World Simulation Kernel
//!
//! Emberward simulates a compact RPG world: character inventories, an
//! in-process publish/subscribe event bus, a bartering pipeline between
//! autonomous characters and the player, and a world clock that advances
//! game time and derives day-period state.
//!
//! ## Features
//!
//! - **Entity/Inventory Model**: catalog-backed items with per-character
//!   inventories, unique by name, quantity-tracked, never aliased.
//! - **Event Bus**: typed publish/subscribe with bounded history, sync and
//!   async delivery, and per-handler failure isolation.
//! - **Trade Pipeline**: validate-then-commit bartering with a reservation
//!   step, so a conflicting commit aborts with zero side effects.
//! - **World Clock**: integer hour/minute/day cascade with configurable time
//!   scale, day-period derivation, and NPC mood drift.
//! - **Seed-Driven Content**: items and characters load from plain JSON so a
//!   world can be reshaped without recompiling.
//! - **Async Design**: built on Tokio; async event handlers fan out
//!   concurrently and join before the emitter resumes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use emberward::config::Config;
//! use emberward::engine::GameEngine;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!
//!     let mut engine = GameEngine::new(config);
//!     engine.initialize()?;
//!     engine.run().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`world`] - The simulation kernel: entities, events, trades, clock
//! - [`engine`] - Engine facade owning the world, roster, and update loop
//! - [`config`] - Configuration management and validation
//! - [`logutil`] - Log sanitization helpers for seed-provided strings
//!
//! ## Boundaries
//!
//! The kernel performs no network IO and owns no durable storage. Agent
//! orchestration (deciding *what* trade an NPC proposes), HTTP transport,
//! and persistence are external collaborators: trade proposals come in as
//! plain data, outcome values and events go out the same way.

pub mod config;
pub mod engine;
pub mod logutil;
pub mod world;
