//! Terminal front end of the token indexer.
//!
//! [`app::App`] holds the state of one running instance, [`view`] renders it
//! as text and the binary drives both from an event loop.

pub mod app;
pub mod config;
pub mod metrics;
pub mod view;

pub use app::{AddressInput, App, QueryRejected, Validity};
