//! Transaction Validation Module
//! 
//! This module decides whether a transaction is a valid SLP token transaction.
//! Validity is recursive: a transaction is checked against its token type's
//! rules, its mint chain and the proven token inputs it spends, and every
//! proof is memoized in the validity cache.

mod conservation;
mod graph;
mod rules;
mod validator;
mod walker;


pub use validator::{SlpValidator, ValidatorStats};
