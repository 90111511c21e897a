pub mod account;
pub mod account_repository;
pub mod common;
pub mod memory;
pub mod transaction;

pub use account::PgAccountRepository;
pub use account_repository::{AccountRepositoryTrait, TransitionCommit};
pub use memory::InMemoryAccountRepository;

// MockAccountRepositoryTrait is only available in test builds via #[cfg(test)]
#[cfg(test)]
pub use account_repository::MockAccountRepositoryTrait;
