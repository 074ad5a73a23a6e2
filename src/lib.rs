//! Trip Planner: a conversational travel assistant backed by Gemini.
//!
//! A chat front end submits each user message to an agent runner bound to a
//! fixed session, waits for the agent's final event and appends the reply to
//! the transcript.
//!
//! # Quick Start
//!
//! ```no_run
//! use trip_planner::prelude::*;
//!
//! # fn example() -> trip_planner::error::Result<()> {
//! let config = PlannerConfig::from_env()?;
//! let mut app = ChatApp::from_config(&config)?;
//! if let Some(reply) = app.submit("I want somewhere quiet by the sea") {
//!     println!("{}", reply.content());
//! }
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod chat;
pub mod config;
pub mod error;
pub mod models;
pub mod prelude;
pub mod provider;
pub mod runner;
pub mod session;
pub mod tools;
pub mod turn;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
