// crates/db/src/queries/mod.rs
// Named repository operations for sessions and player records.

pub(crate) mod row_types;
mod players;
mod sessions;
