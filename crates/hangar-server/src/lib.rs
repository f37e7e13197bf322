//! Shared library surface for the hangar server and its tests.

pub mod api;
pub mod config;
pub mod password;
pub mod persistence;
pub mod session;
pub mod state;
