/// Account state machine. Operations are validated into events,
/// which are the only way the account state is modified.
pub mod account;

/// History records kept by [`account::Account`].
pub mod transaction;

/// Settings shared by all accounts of a ledger.
pub mod config;

/// Commands that are later executed by [`processor`] against an [`account::Account`].
pub mod command;

/// Ledger processor interface, plus "in memory" implementation.
/// Keeps accounts by id and composes transfers between two of them.
pub mod processor;

/// Drives the processor from a CSV script. Lives in the library
/// so the integration tests can use it as well.
pub mod bin_utils;
