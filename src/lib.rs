//! # GreenBlog
//!
//! Backend for the GreenBlog meal-plan site. The client renders a weekly
//! meal plan; users record "history" entries (a rating, comment, and
//! optional link) against a day. This crate persists those entries and
//! serves them over a small JSON HTTP API.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────────┐   ┌────────────────┐
//! │   HTTP   │──▶│ HistoryService │──▶│  HistoryStore  │
//! │  (axum)  │   │ ids + ordering │   │ JSON file / mem│
//! └──────────┘   └────────────────┘   └────────────────┘
//!       ▲                ▲
//!       │                │
//!  ┌──────────┐    ┌──────────┐
//!  │  client  │    │   CLI    │
//!  └──────────┘    └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`file_store`] | JSON file history store |
//! | [`history`] | List / append service |
//! | [`server`] | HTTP API |
//! | [`plan`] | Meal-plan content loading |
//! | [`history_cmd`] | CLI commands |
//! | [`logging`] | `tracing` subscriber setup |

pub mod config;
pub mod file_store;
pub mod history;
pub mod history_cmd;
pub mod logging;
pub mod plan;
pub mod server;

pub use greenblog_core::{ids, models, store};
