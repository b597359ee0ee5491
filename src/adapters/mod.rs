//! Adapters implementing the port traits.
//!
//! `live` talks to real devices and services; `scripted` serves canned
//! responses and records what it was asked, for tests and offline runs.

pub mod live;
pub mod scripted;
