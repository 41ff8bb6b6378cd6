//! Statement inbox — stage imported bank-statement rows, categorize them,
//! and commit them to the ledger through a pluggable transport.

pub mod bridge;
pub mod cli;
pub mod config;
pub mod error;
pub mod inbox;
pub mod ledger;
