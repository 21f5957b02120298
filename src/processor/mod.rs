use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    account::{AccountDetails, AccountError, Receipt, Statement, TransferReceipt},
    command::{AccountCommand, AccountCommandError},
};

pub mod in_memory_processor;

pub type AccountId = u32;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    CommandErr(#[from] AccountCommandError),
    #[error(transparent)]
    AccountErr(#[from] AccountError),
    #[error("Account {0} does not exist")]
    UnknownAccount(AccountId),
    #[error("Account {0} already exists")]
    DuplicateAccount(AccountId),
}

/// Result of a command that went through.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Opened { account: AccountId, name: String },
    Receipt(Receipt),
    Transfer(TransferReceipt),
    Balance { owner: String, balance: Decimal },
    Details(AccountDetails),
    Statement(Statement),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Opened { account, name } => write!(f, "Opened account {account} for {name}."),
            Outcome::Receipt(receipt) => write!(f, "{receipt}"),
            Outcome::Transfer(receipt) => write!(f, "{receipt}"),
            Outcome::Balance { owner, balance } => write!(f, "{owner}'s balance: {balance}"),
            Outcome::Details(details) => write!(f, "{details}"),
            Outcome::Statement(statement) => write!(f, "{statement}"),
        }
    }
}

pub trait LedgerProcessor {
    fn process(&mut self, command: AccountCommand) -> Result<Outcome, LedgerError>;
}
