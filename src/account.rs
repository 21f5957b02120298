use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::{
    config::LedgerConfig,
    processor::AccountId,
    transaction::{Transaction, TransactionKind},
};

/// Balance affecting operation, used to describe rejections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Deposit,
    Withdraw,
    Transfer,
    RequestLoan,
    RepayLoan,
    ChangeOwner,
    CalculateInterest,
    Freeze,
    Unfreeze,
    SetMinimumBalance,
}

impl Operation {
    fn invalid_amount_message(self) -> &'static str {
        match self {
            Operation::Deposit => "Deposit amount must be positive.",
            Operation::Withdraw => "Withdrawal amount must be positive.",
            Operation::Transfer => "Transfer amount must be positive.",
            Operation::RequestLoan => "Loan amount must be positive.",
            Operation::RepayLoan => "Repayment amount must be positive.",
            Operation::SetMinimumBalance => "Minimum balance cannot be negative.",
            Operation::ChangeOwner
            | Operation::CalculateInterest
            | Operation::Freeze
            | Operation::Unfreeze => "Amount is not valid.",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            Operation::Deposit => "deposit",
            Operation::Withdraw => "withdraw",
            Operation::Transfer => "transfer funds",
            Operation::RequestLoan => "request loan",
            Operation::RepayLoan => "repay loan",
            Operation::ChangeOwner => "change owner",
            Operation::CalculateInterest => "calculate interest",
            Operation::Freeze => "freeze",
            Operation::Unfreeze => "unfreeze",
            Operation::SetMinimumBalance => "set minimum balance",
        };
        f.write_str(op)
    }
}

/// Why a transfer target cannot take part in a transfer.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TargetIssue {
    #[error("account {0} does not exist")]
    Unknown(AccountId),
    #[error("cannot transfer to the same account")]
    SameAccount,
    #[error("account of {owner} cannot receive funds. {reason}")]
    Inactive {
        owner: String,
        reason: Box<AccountError>,
    },
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AccountError {
    #[error("Account is closed. Cannot {operation}.")]
    ClosedAccount { operation: Operation },
    #[error("Account is frozen. Cannot {operation}.")]
    FrozenAccount { operation: Operation },
    #[error("{}", .operation.invalid_amount_message())]
    InvalidAmount { operation: Operation, amount: Decimal },
    #[error("Insufficient funds to {operation}: balance is {balance}, requested {requested}.")]
    InsufficientFunds {
        operation: Operation,
        balance: Decimal,
        requested: Decimal,
    },
    #[error("Cannot {operation}. Balance would fall below minimum balance of {minimum}.")]
    BelowMinimumBalance {
        operation: Operation,
        minimum: Decimal,
    },
    #[error("Invalid transfer target: {issue}")]
    InvalidTarget { issue: TargetIssue },
    #[error("No outstanding loan to repay.")]
    NoOutstandingLoan,
    #[error("New owner name cannot be empty.")]
    InvalidName,
    #[error("Cannot {operation}. Amount would overflow the account balance.")]
    ArithmeticOverflow { operation: Operation },
}

/// State change produced by a validated operation.
#[derive(Debug, Clone, PartialEq)]
pub enum AccountEvent {
    Deposited { amount: Decimal, narration: String },
    Withdrawn { amount: Decimal, narration: String },
    LoanGranted { amount: Decimal },
    /// `clamped` is set when the requested repayment exceeded the outstanding loan.
    LoanRepaid { amount: Decimal, clamped: bool },
    InterestApplied { amount: Decimal },
    InterestSkipped,
    Frozen,
    Unfrozen,
    MinimumBalanceSet { amount: Decimal },
    OwnerChanged { name: String },
    Closed,
}

/// Outcome of a successful operation, together with the balances right after it.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub owner: String,
    pub event: AccountEvent,
    pub balance: Decimal,
    pub loan: Decimal,
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Receipt {
            owner,
            event,
            balance,
            loan,
        } = self;
        match event {
            AccountEvent::Deposited { amount, .. } => {
                write!(f, "Deposited {amount}. New balance is {balance}.")
            }
            AccountEvent::Withdrawn { amount, .. } => {
                write!(f, "Withdrew {amount}. New balance is {balance}.")
            }
            AccountEvent::LoanGranted { amount } => write!(
                f,
                "Loan of {amount} granted. Total loan is now {loan}. Current balance is {balance}."
            ),
            AccountEvent::LoanRepaid { amount, clamped } => {
                if *clamped {
                    write!(f, "Repaying full loan amount of {amount}. ")?;
                }
                write!(
                    f,
                    "Repaid {amount}. Remaining loan balance is {loan}. Current balance is {balance}."
                )
            }
            AccountEvent::InterestApplied { amount } => {
                write!(f, "Interest of {amount} applied. New balance is {balance}.")
            }
            AccountEvent::InterestSkipped => {
                f.write_str("No interest applied because balance is zero or negative.")
            }
            AccountEvent::Frozen => f.write_str("Account has been frozen."),
            AccountEvent::Unfrozen => f.write_str("Account has been unfrozen."),
            AccountEvent::MinimumBalanceSet { amount } => {
                write!(f, "Minimum balance set to {amount}.")
            }
            AccountEvent::OwnerChanged { name } => write!(f, "Account owner changed to {name}."),
            AccountEvent::Closed => write!(
                f,
                "Account for {owner} has been closed. All balances and transactions cleared."
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransferReceipt {
    pub amount: Decimal,
    pub target: String,
    pub withdrawal: Receipt,
    pub deposit: Receipt,
}

impl fmt::Display for TransferReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transferred {} to {}. {} | {}",
            self.amount, self.target, self.withdrawal, self.deposit
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountDetails {
    pub owner: String,
    pub balance: Decimal,
    pub loan: Decimal,
    pub frozen: bool,
    pub minimum_balance: Decimal,
    pub closed: bool,
}

impl fmt::Display for AccountDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Account owner: {} Current balance: {} Outstanding loan: {} Account frozen: {} Minimum balance: {} Account closed: {}",
            self.owner, self.balance, self.loan, self.frozen, self.minimum_balance, self.closed
        )
    }
}

/// Snapshot of the account history, in the order the transactions happened.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub owner: String,
    pub transactions: Vec<Transaction>,
    pub balance: Decimal,
    pub loan: Decimal,
}

impl Statement {
    pub fn deposits(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.transactions
            .iter()
            .filter(|tx| tx.kind.is_credit())
            .map(|tx| tx.amount)
    }

    pub fn withdrawals(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.transactions
            .iter()
            .filter(|tx| tx.kind == TransactionKind::Withdrawal)
            .map(|tx| tx.amount)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Hello {}, here is your account statement.", self.owner)?;
        for tx in &self.transactions {
            writeln!(f, "{tx}")?;
        }
        f.write_str("Deposits:")?;
        for (i, amount) in self.deposits().enumerate() {
            write!(f, " {}. +{amount}", i + 1)?;
        }
        f.write_str("\nWithdrawals:")?;
        for (i, amount) in self.withdrawals().enumerate() {
            write!(f, " {}. {amount}", i + 1)?;
        }
        write!(
            f,
            "\nCurrent balance: {} Outstanding loan: {}",
            self.balance, self.loan
        )
    }
}

#[derive(Debug, Clone)]
pub struct Account {
    name: String,
    balance: Decimal,
    loan: Decimal,
    minimum_balance: Decimal,
    frozen: bool,
    closed: bool,
    interest_rate: Decimal,
    history: Vec<Transaction>,
}

impl Account {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, &LedgerConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: &LedgerConfig) -> Self {
        Self {
            name: name.into(),
            balance: Decimal::ZERO,
            loan: Decimal::ZERO,
            minimum_balance: Decimal::ZERO,
            frozen: false,
            closed: false,
            interest_rate: config.interest_rate(),
            history: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn loan(&self) -> Decimal {
        self.loan
    }

    pub fn minimum_balance(&self) -> Decimal {
        self.minimum_balance
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn interest_rate(&self) -> Decimal {
        self.interest_rate
    }

    pub fn history(&self) -> &[Transaction] {
        &self.history
    }

    pub fn deposit(&mut self, amount: Decimal) -> Result<Receipt, AccountError> {
        let event = self.handle_deposit(amount, "Deposit")?;
        Ok(self.execute(event))
    }

    pub fn withdraw(&mut self, amount: Decimal) -> Result<Receipt, AccountError> {
        let event = self.handle_withdrawal(Operation::Withdraw, amount, "Withdrawal")?;
        Ok(self.execute(event))
    }

    /// Moves `amount` from this account into `target`.
    ///
    /// Either both sides are applied or neither is.
    pub fn transfer_funds(
        &mut self,
        amount: Decimal,
        target: &mut Account,
    ) -> Result<TransferReceipt, AccountError> {
        self.ensure_can_transfer()?;
        target
            .ensure_active(Operation::Deposit)
            .map_err(|err| AccountError::InvalidTarget {
                issue: TargetIssue::Inactive {
                    owner: target.name.clone(),
                    reason: Box::new(err),
                },
            })?;
        let withdrawal = self.handle_withdrawal(
            Operation::Transfer,
            amount,
            format!("Transfer to {}", target.name),
        )?;
        let deposit = target.handle_deposit(amount, format!("Transfer from {}", self.name))?;

        let withdrawal = self.execute(withdrawal);
        let deposit = target.execute(deposit);
        Ok(TransferReceipt {
            amount,
            target: target.name.clone(),
            withdrawal,
            deposit,
        })
    }

    pub fn request_loan(&mut self, amount: Decimal) -> Result<Receipt, AccountError> {
        let event = self.handle_loan(amount)?;
        Ok(self.execute(event))
    }

    pub fn repay_loan(&mut self, amount: Decimal) -> Result<Receipt, AccountError> {
        let event = self.handle_repayment(amount)?;
        Ok(self.execute(event))
    }

    pub fn calculate_interest(&mut self) -> Result<Receipt, AccountError> {
        let event = self.handle_interest()?;
        Ok(self.execute(event))
    }

    pub fn freeze_account(&mut self) -> Result<Receipt, AccountError> {
        self.ensure_open(Operation::Freeze)?;
        Ok(self.execute(AccountEvent::Frozen))
    }

    pub fn unfreeze_account(&mut self) -> Result<Receipt, AccountError> {
        self.ensure_open(Operation::Unfreeze)?;
        Ok(self.execute(AccountEvent::Unfrozen))
    }

    pub fn set_minimum_balance(&mut self, amount: Decimal) -> Result<Receipt, AccountError> {
        self.ensure_open(Operation::SetMinimumBalance)?;
        if amount < Decimal::ZERO {
            return Err(AccountError::InvalidAmount {
                operation: Operation::SetMinimumBalance,
                amount,
            });
        }
        Ok(self.execute(AccountEvent::MinimumBalanceSet { amount }))
    }

    pub fn change_account_owner(&mut self, new_name: &str) -> Result<Receipt, AccountError> {
        self.ensure_open(Operation::ChangeOwner)?;
        let name = new_name.trim();
        if name.is_empty() {
            return Err(AccountError::InvalidName);
        }
        Ok(self.execute(AccountEvent::OwnerChanged {
            name: name.to_string(),
        }))
    }

    /// Zeroes every balance and wipes the history. Always succeeds, also on a closed account.
    pub fn close_account(&mut self) -> Receipt {
        self.execute(AccountEvent::Closed)
    }

    pub fn view_account_details(&self) -> AccountDetails {
        AccountDetails {
            owner: self.name.clone(),
            balance: self.balance,
            loan: self.loan,
            frozen: self.frozen,
            minimum_balance: self.minimum_balance,
            closed: self.closed,
        }
    }

    pub fn account_statement(&self) -> Statement {
        Statement {
            owner: self.name.clone(),
            transactions: self.history.clone(),
            balance: self.balance,
            loan: self.loan,
        }
    }

    pub fn handle_deposit(
        &self,
        amount: Decimal,
        narration: impl Into<String>,
    ) -> Result<AccountEvent, AccountError> {
        self.ensure_active(Operation::Deposit)?;
        ensure_positive(Operation::Deposit, amount)?;
        self.ensure_can_credit(Operation::Deposit, amount)?;
        Ok(AccountEvent::Deposited {
            amount,
            narration: narration.into(),
        })
    }

    pub fn handle_withdrawal(
        &self,
        operation: Operation,
        amount: Decimal,
        narration: impl Into<String>,
    ) -> Result<AccountEvent, AccountError> {
        self.ensure_active(operation)?;
        ensure_positive(operation, amount)?;
        self.ensure_can_debit(operation, amount)?;
        Ok(AccountEvent::Withdrawn {
            amount,
            narration: narration.into(),
        })
    }

    pub fn handle_loan(&self, amount: Decimal) -> Result<AccountEvent, AccountError> {
        self.ensure_open(Operation::RequestLoan)?;
        ensure_positive(Operation::RequestLoan, amount)?;
        self.ensure_can_credit(Operation::RequestLoan, amount)?;
        if self.loan.checked_add(amount).is_none() {
            return Err(AccountError::ArithmeticOverflow {
                operation: Operation::RequestLoan,
            });
        }
        Ok(AccountEvent::LoanGranted { amount })
    }

    pub fn handle_repayment(&self, amount: Decimal) -> Result<AccountEvent, AccountError> {
        self.ensure_open(Operation::RepayLoan)?;
        ensure_positive(Operation::RepayLoan, amount)?;
        if self.loan.is_zero() {
            return Err(AccountError::NoOutstandingLoan);
        }
        let (amount, clamped) = if amount > self.loan {
            (self.loan, true)
        } else {
            (amount, false)
        };
        if amount > self.balance {
            return Err(AccountError::InsufficientFunds {
                operation: Operation::RepayLoan,
                balance: self.balance,
                requested: amount,
            });
        }
        Ok(AccountEvent::LoanRepaid { amount, clamped })
    }

    pub fn handle_interest(&self) -> Result<AccountEvent, AccountError> {
        self.ensure_active(Operation::CalculateInterest)?;
        let interest = self.balance.checked_mul(self.interest_rate).ok_or(
            AccountError::ArithmeticOverflow {
                operation: Operation::CalculateInterest,
            },
        )?;
        if interest <= Decimal::ZERO {
            return Ok(AccountEvent::InterestSkipped);
        }
        self.ensure_can_credit(Operation::CalculateInterest, interest)?;
        Ok(AccountEvent::InterestApplied { amount: interest })
    }

    /// Rejects a transfer out of a closed or frozen account, before the target is looked at.
    pub fn ensure_can_transfer(&self) -> Result<(), AccountError> {
        self.ensure_active(Operation::Transfer)
    }

    fn ensure_open(&self, operation: Operation) -> Result<(), AccountError> {
        if self.closed {
            return Err(AccountError::ClosedAccount { operation });
        }
        Ok(())
    }

    fn ensure_active(&self, operation: Operation) -> Result<(), AccountError> {
        self.ensure_open(operation)?;
        if self.frozen {
            return Err(AccountError::FrozenAccount { operation });
        }
        Ok(())
    }

    fn ensure_can_credit(&self, operation: Operation, amount: Decimal) -> Result<(), AccountError> {
        match self.balance.checked_add(amount) {
            Some(_) => Ok(()),
            None => Err(AccountError::ArithmeticOverflow { operation }),
        }
    }

    fn ensure_can_debit(&self, operation: Operation, amount: Decimal) -> Result<(), AccountError> {
        if amount > self.balance {
            return Err(AccountError::InsufficientFunds {
                operation,
                balance: self.balance,
                requested: amount,
            });
        }
        if self.balance - amount < self.minimum_balance {
            return Err(AccountError::BelowMinimumBalance {
                operation,
                minimum: self.minimum_balance,
            });
        }
        Ok(())
    }

    fn execute(&mut self, event: AccountEvent) -> Receipt {
        self.apply(&event);
        debug!(owner = %self.name, ?event, balance = %self.balance, loan = %self.loan, "applied account event");
        Receipt {
            owner: self.name.clone(),
            event,
            balance: self.balance,
            loan: self.loan,
        }
    }

    // events are produced by `handle_*`, which already validated them
    fn apply(&mut self, event: &AccountEvent) {
        match event {
            AccountEvent::Deposited { amount, narration } => {
                self.balance += *amount;
                self.record(TransactionKind::Deposit, *amount, narration);
            }
            AccountEvent::Withdrawn { amount, narration } => {
                self.balance -= *amount;
                self.record(TransactionKind::Withdrawal, *amount, narration);
            }
            AccountEvent::LoanGranted { amount } => {
                self.loan += *amount;
                self.balance += *amount;
                self.record(TransactionKind::Loan, *amount, "Loan granted");
            }
            AccountEvent::LoanRepaid { amount, .. } => {
                self.loan -= *amount;
                self.balance -= *amount;
                self.record(TransactionKind::Repayment, *amount, "Loan repayment");
            }
            AccountEvent::InterestApplied { amount } => {
                self.balance += *amount;
                self.record(TransactionKind::Interest, *amount, "Interest applied");
            }
            AccountEvent::InterestSkipped => {}
            AccountEvent::Frozen => self.frozen = true,
            AccountEvent::Unfrozen => self.frozen = false,
            AccountEvent::MinimumBalanceSet { amount } => self.minimum_balance = *amount,
            AccountEvent::OwnerChanged { name } => self.name = name.clone(),
            AccountEvent::Closed => {
                self.balance = Decimal::ZERO;
                self.loan = Decimal::ZERO;
                self.minimum_balance = Decimal::ZERO;
                self.frozen = false;
                self.closed = true;
                self.history.clear();
            }
        }
    }

    fn record(&mut self, kind: TransactionKind, amount: Decimal, narration: &str) {
        self.history.push(Transaction::new(kind, amount, narration));
    }
}

fn ensure_positive(operation: Operation, amount: Decimal) -> Result<(), AccountError> {
    if amount <= Decimal::ZERO {
        return Err(AccountError::InvalidAmount { operation, amount });
    }
    Ok(())
}
