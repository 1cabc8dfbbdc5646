//! # Core Scanner Logic
//!
//! This module contains the tag scanner's business logic.
//! It knows nothing about terminals, NFC drivers or HTTP.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Scanner (state)      │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │ Effect
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │    TUI     │      │  runtime   │      │   tests    │
//!     │  Adapter   │      │ (tokio I/O)│      │ (direct    │
//!     │ (ratatui)  │      │            │      │  update()) │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`step`]: The `Step` enum, the seven named states
//! - [`state`]: The `Scanner` struct, all scanner state in one place
//! - [`action`]: `Action`, `Effect` and the `update()` transition function
//! - [`messages`]: send-status message templates
//! - [`config`]: TOML config and override resolution

pub mod action;
pub mod config;
pub mod messages;
pub mod state;
pub mod step;

pub use action::{Action, Effect, update};
pub use state::Scanner;
pub use step::Step;
