// crates/core/src/lib.rs
pub mod error;
pub mod types;
pub mod status;
pub mod recurrence;
pub mod dedup;
pub mod rating;

pub use error::*;
pub use types::*;
pub use status::*;
pub use recurrence::*;
pub use dedup::*;
pub use rating::*;
