//! State Management Module
//! 
//! This module holds the in-memory transaction store and the validity cache
//! the validator reads from, plus the lock-guarded handle shared by the
//! request-serving front end.

mod cache;
mod shared;
mod store;

pub use cache::ValidityCache;
pub use shared::SharedValidator;
pub use store::TransactionStore;
