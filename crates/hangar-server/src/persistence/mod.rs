//! SQL persistence: dialect selection, schema, and per-entity operations.

pub mod db;
pub mod drone_types;
pub mod drones;
pub mod import;
pub mod manufacturers;
pub mod parts;
pub mod practice_days;
pub mod repairs;
pub mod users;

pub use db::{Db, Dialect};
