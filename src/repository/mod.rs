//! Repository Layer
//!
//! Data access abstractions and implementations.

mod record_repo;
mod traits;


pub use record_repo::{ItemRepository, OtherCostRepository, RecordRepository};
pub use traits::Repository;
