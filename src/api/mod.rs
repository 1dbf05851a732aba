//! API Module
//! 
//! This module handles the JSON-RPC API over the validator.
//! It provides the HTTP endpoint clients use to query token validity,
//! feed transactions and seed checkpoints.

mod server;

#[cfg(test)]
mod tests;

pub use server::{router, Server};
