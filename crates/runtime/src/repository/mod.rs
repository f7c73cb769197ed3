//! Repository layer for persisted player records.
//!
//! Only the persisted subset of a record (lifetime total and enabled passives)
//! reaches storage. Cooldowns, immunity, selection and traversal state live in
//! memory and are dropped on disconnect.

mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FilePlayerRepository;
pub use memory::InMemoryPlayerRepo;
pub use traits::PlayerRepository;
