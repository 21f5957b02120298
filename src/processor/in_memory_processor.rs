use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;

use crate::{
    account::{Account, AccountError, TargetIssue, TransferReceipt},
    command::AccountCommand,
    config::LedgerConfig,
};

use super::{AccountId, LedgerError, LedgerProcessor, Outcome};

#[derive(Debug, Default)]
pub struct InMemoryLedger {
    config: LedgerConfig,
    accounts: BTreeMap<AccountId, Account>,
}

impl InMemoryLedger {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            accounts: BTreeMap::new(),
        }
    }

    pub fn account(&self, account: AccountId) -> Option<&Account> {
        self.accounts.get(&account)
    }

    /// Registered accounts, ordered by id.
    pub fn accounts(&self) -> impl Iterator<Item = (AccountId, &Account)> {
        self.accounts.iter().map(|(id, acc)| (*id, acc))
    }

    fn account_mut(&mut self, account: AccountId) -> Result<&mut Account, LedgerError> {
        self.accounts
            .get_mut(&account)
            .ok_or(LedgerError::UnknownAccount(account))
    }

    fn open(&mut self, account: AccountId, name: String) -> Result<Outcome, LedgerError> {
        if self.accounts.contains_key(&account) {
            return Err(LedgerError::DuplicateAccount(account));
        }
        self.accounts
            .insert(account, Account::with_config(name.clone(), &self.config));
        Ok(Outcome::Opened { account, name })
    }

    fn transfer(
        &mut self,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
    ) -> Result<TransferReceipt, LedgerError> {
        match self.accounts.get(&from) {
            Some(source) => source.ensure_can_transfer()?,
            None => return Err(LedgerError::UnknownAccount(from)),
        }
        if from == to {
            return Err(AccountError::InvalidTarget {
                issue: TargetIssue::SameAccount,
            }
            .into());
        }
        // the target is taken out of the map, so both accounts can be borrowed mutably
        let Some(mut target) = self.accounts.remove(&to) else {
            return Err(AccountError::InvalidTarget {
                issue: TargetIssue::Unknown(to),
            }
            .into());
        };
        let result = self
            .account_mut(from)
            .and_then(|source| Ok(source.transfer_funds(amount, &mut target)?));
        self.accounts.insert(to, target);
        result
    }
}

impl LedgerProcessor for InMemoryLedger {
    fn process(&mut self, command: AccountCommand) -> Result<Outcome, LedgerError> {
        let account = command.account();
        let outcome = match command {
            AccountCommand::Open { account, name } => self.open(account, name),
            AccountCommand::Deposit { account, amount } => self
                .account_mut(account)
                .and_then(|acc| Ok(acc.deposit(amount)?))
                .map(Outcome::Receipt),
            AccountCommand::Withdraw { account, amount } => self
                .account_mut(account)
                .and_then(|acc| Ok(acc.withdraw(amount)?))
                .map(Outcome::Receipt),
            AccountCommand::Transfer {
                account,
                target,
                amount,
            } => self.transfer(account, target, amount).map(Outcome::Transfer),
            AccountCommand::RequestLoan { account, amount } => self
                .account_mut(account)
                .and_then(|acc| Ok(acc.request_loan(amount)?))
                .map(Outcome::Receipt),
            AccountCommand::RepayLoan { account, amount } => self
                .account_mut(account)
                .and_then(|acc| Ok(acc.repay_loan(amount)?))
                .map(Outcome::Receipt),
            AccountCommand::CalculateInterest { account } => self
                .account_mut(account)
                .and_then(|acc| Ok(acc.calculate_interest()?))
                .map(Outcome::Receipt),
            AccountCommand::Freeze { account } => self
                .account_mut(account)
                .and_then(|acc| Ok(acc.freeze_account()?))
                .map(Outcome::Receipt),
            AccountCommand::Unfreeze { account } => self
                .account_mut(account)
                .and_then(|acc| Ok(acc.unfreeze_account()?))
                .map(Outcome::Receipt),
            AccountCommand::SetMinimumBalance { account, amount } => self
                .account_mut(account)
                .and_then(|acc| Ok(acc.set_minimum_balance(amount)?))
                .map(Outcome::Receipt),
            AccountCommand::ChangeOwner { account, name } => self
                .account_mut(account)
                .and_then(|acc| Ok(acc.change_account_owner(&name)?))
                .map(Outcome::Receipt),
            AccountCommand::Close { account } => self
                .account_mut(account)
                .map(|acc| Outcome::Receipt(acc.close_account())),
            AccountCommand::Balance { account } => {
                self.account_mut(account).map(|acc| Outcome::Balance {
                    owner: acc.name().to_string(),
                    balance: acc.balance(),
                })
            }
            AccountCommand::Details { account } => self
                .account_mut(account)
                .map(|acc| Outcome::Details(acc.view_account_details())),
            AccountCommand::Statement { account } => self
                .account_mut(account)
                .map(|acc| Outcome::Statement(acc.account_statement())),
        };
        if let Err(err) = &outcome {
            debug!(account, %err, "command rejected");
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::account::{AccountEvent, Operation};

    use super::*;

    fn ledger_with_two_accounts() -> InMemoryLedger {
        let mut ledger = InMemoryLedger::default();
        for (account, name) in [(1, "Jacky"), (2, "Jane")] {
            ledger
                .process(AccountCommand::Open {
                    account,
                    name: name.to_string(),
                })
                .unwrap();
        }
        ledger
    }

    #[test]
    fn open_accounts() {
        let mut ledger = ledger_with_two_accounts();
        assert_eq!(ledger.accounts().count(), 2);

        let err = ledger
            .process(AccountCommand::Open {
                account: 1,
                name: "Jack".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateAccount(1)));
        assert_eq!(ledger.account(1).unwrap().name(), "Jacky");
    }

    #[test]
    fn process_some_commands() {
        let mut ledger = ledger_with_two_accounts();
        let outcome = ledger
            .process(AccountCommand::Deposit {
                account: 1,
                amount: dec!(1000),
            })
            .unwrap();
        assert_eq!(outcome.to_string(), "Deposited 1000. New balance is 1000.");

        let outcome = ledger
            .process(AccountCommand::Transfer {
                account: 1,
                target: 2,
                amount: dec!(300),
            })
            .unwrap();
        assert!(matches!(outcome, Outcome::Transfer(_)));
        assert_eq!(ledger.account(1).unwrap().balance(), dec!(700));
        assert_eq!(ledger.account(2).unwrap().balance(), dec!(300));

        let outcome = ledger.process(AccountCommand::Balance { account: 2 }).unwrap();
        assert_eq!(outcome.to_string(), "Jane's balance: 300");

        let outcome = ledger
            .process(AccountCommand::RequestLoan {
                account: 2,
                amount: dec!(500),
            })
            .unwrap();
        let Outcome::Receipt(receipt) = outcome else {
            panic!("expected a receipt");
        };
        assert_eq!(receipt.event, AccountEvent::LoanGranted { amount: dec!(500) });
        assert_eq!(receipt.loan, dec!(500));
    }

    #[test]
    fn unknown_accounts() {
        let mut ledger = ledger_with_two_accounts();
        let err = ledger
            .process(AccountCommand::Deposit {
                account: 9,
                amount: dec!(1),
            })
            .unwrap_err();
        assert!(matches!(err, LedgerError::UnknownAccount(9)));

        let err = ledger
            .process(AccountCommand::Transfer {
                account: 9,
                target: 1,
                amount: dec!(1),
            })
            .unwrap_err();
        assert!(matches!(err, LedgerError::UnknownAccount(9)));
    }

    #[test]
    fn invalid_transfer_targets() {
        let mut ledger = ledger_with_two_accounts();
        ledger
            .process(AccountCommand::Deposit {
                account: 1,
                amount: dec!(100),
            })
            .unwrap();

        let err = ledger
            .process(AccountCommand::Transfer {
                account: 1,
                target: 7,
                amount: dec!(10),
            })
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::AccountErr(AccountError::InvalidTarget {
                issue: TargetIssue::Unknown(7)
            })
        ));
        assert_eq!(
            err.to_string(),
            "Invalid transfer target: account 7 does not exist"
        );

        let err = ledger
            .process(AccountCommand::Transfer {
                account: 1,
                target: 1,
                amount: dec!(10),
            })
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::AccountErr(AccountError::InvalidTarget {
                issue: TargetIssue::SameAccount
            })
        ));

        // rejected transfer keeps the target registered
        let err = ledger
            .process(AccountCommand::Transfer {
                account: 1,
                target: 2,
                amount: dec!(1000),
            })
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::AccountErr(AccountError::InsufficientFunds { .. })
        ));
        assert_eq!(ledger.accounts().count(), 2);
        assert_eq!(ledger.account(1).unwrap().balance(), dec!(100));
        assert_eq!(ledger.account(2).unwrap().balance(), dec!(0));
    }

    #[test]
    fn source_state_is_checked_before_target() {
        let mut ledger = ledger_with_two_accounts();
        let transfer = |target| AccountCommand::Transfer {
            account: 1,
            target,
            amount: dec!(10),
        };

        ledger.process(AccountCommand::Freeze { account: 1 }).unwrap();
        for target in [1, 7] {
            let err = ledger.process(transfer(target)).unwrap_err();
            assert!(matches!(
                err,
                LedgerError::AccountErr(AccountError::FrozenAccount {
                    operation: Operation::Transfer
                })
            ));
        }

        ledger.process(AccountCommand::Close { account: 1 }).unwrap();
        for target in [1, 2, 7] {
            let err = ledger.process(transfer(target)).unwrap_err();
            assert!(matches!(
                err,
                LedgerError::AccountErr(AccountError::ClosedAccount {
                    operation: Operation::Transfer
                })
            ));
            assert_eq!(err.to_string(), "Account is closed. Cannot transfer funds.");
        }
        assert_eq!(ledger.accounts().count(), 2);
    }

    #[test]
    fn ledger_config_reaches_accounts() {
        let mut ledger = InMemoryLedger::new(LedgerConfig::new(dec!(0.1)).unwrap());
        ledger
            .process(AccountCommand::Open {
                account: 1,
                name: "Jacky".to_string(),
            })
            .unwrap();
        assert_eq!(ledger.account(1).unwrap().interest_rate(), dec!(0.1));
    }
}
