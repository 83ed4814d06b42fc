//! # GreenBlog Core
//!
//! Shared logic for the GreenBlog history service: the history data
//! model, the [`store::HistoryStore`] abstraction with its error taxonomy,
//! and the identifier generators used when entries are appended.
//!
//! This crate contains no tokio runtime, HTTP, or filesystem code. The
//! native application (`greenblog`) provides the JSON file store and the
//! HTTP surface on top of it.

pub mod ids;
pub mod models;
pub mod store;
