//! Library crate for talker-probe exposing reusable modules.
pub mod cache;
pub mod dataset;
pub mod denylist;
pub mod probe;
pub mod selector;
pub mod server;
pub mod snapshot;
pub mod types;
