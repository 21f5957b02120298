use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::processor::AccountId;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Open,
    Deposit,
    #[serde(alias = "withdrawal")]
    Withdraw,
    Transfer,
    Loan,
    Repay,
    Interest,
    Freeze,
    Unfreeze,
    Minimum,
    Rename,
    Close,
    Balance,
    Details,
    Statement,
}

#[derive(Debug, Error, PartialEq)]
pub enum AccountCommandError {
    #[error("Amount is required for {kind:?}")]
    AmountRequired { kind: CommandKind },
    #[error("Target account is required for Transfer")]
    TargetRequired,
    #[error("Name is required for {kind:?}")]
    NameRequired { kind: CommandKind },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AccountCommand {
    Open { account: AccountId, name: String },
    Deposit { account: AccountId, amount: Decimal },
    Withdraw { account: AccountId, amount: Decimal },
    Transfer {
        account: AccountId,
        target: AccountId,
        amount: Decimal,
    },
    RequestLoan { account: AccountId, amount: Decimal },
    RepayLoan { account: AccountId, amount: Decimal },
    CalculateInterest { account: AccountId },
    Freeze { account: AccountId },
    Unfreeze { account: AccountId },
    SetMinimumBalance { account: AccountId, amount: Decimal },
    ChangeOwner { account: AccountId, name: String },
    Close { account: AccountId },
    Balance { account: AccountId },
    Details { account: AccountId },
    Statement { account: AccountId },
}

impl AccountCommand {
    /// Builds a command out of the loosely typed fields of a script row.
    ///
    /// Only presence of the fields is checked here, amounts are validated by the account.
    pub fn parse_command(
        kind: CommandKind,
        account: AccountId,
        amount: Option<Decimal>,
        target: Option<AccountId>,
        name: Option<String>,
    ) -> Result<Self, AccountCommandError> {
        let amount_for = |kind| amount.ok_or(AccountCommandError::AmountRequired { kind });
        let command = match kind {
            CommandKind::Open => match name.filter(|name| !name.trim().is_empty()) {
                Some(name) => Self::Open { account, name },
                None => return Err(AccountCommandError::NameRequired { kind }),
            },
            CommandKind::Deposit => Self::Deposit {
                account,
                amount: amount_for(kind)?,
            },
            CommandKind::Withdraw => Self::Withdraw {
                account,
                amount: amount_for(kind)?,
            },
            CommandKind::Transfer => {
                let amount = amount_for(kind)?;
                let target = target.ok_or(AccountCommandError::TargetRequired)?;
                Self::Transfer {
                    account,
                    target,
                    amount,
                }
            }
            CommandKind::Loan => Self::RequestLoan {
                account,
                amount: amount_for(kind)?,
            },
            CommandKind::Repay => Self::RepayLoan {
                account,
                amount: amount_for(kind)?,
            },
            CommandKind::Interest => Self::CalculateInterest { account },
            CommandKind::Freeze => Self::Freeze { account },
            CommandKind::Unfreeze => Self::Unfreeze { account },
            CommandKind::Minimum => Self::SetMinimumBalance {
                account,
                amount: amount_for(kind)?,
            },
            // an empty name is rejected by the account itself
            CommandKind::Rename => Self::ChangeOwner {
                account,
                name: name.unwrap_or_default(),
            },
            CommandKind::Close => Self::Close { account },
            CommandKind::Balance => Self::Balance { account },
            CommandKind::Details => Self::Details { account },
            CommandKind::Statement => Self::Statement { account },
        };
        Ok(command)
    }

    pub fn account(&self) -> AccountId {
        match self {
            Self::Open { account, .. }
            | Self::Deposit { account, .. }
            | Self::Withdraw { account, .. }
            | Self::Transfer { account, .. }
            | Self::RequestLoan { account, .. }
            | Self::RepayLoan { account, .. }
            | Self::CalculateInterest { account }
            | Self::Freeze { account }
            | Self::Unfreeze { account }
            | Self::SetMinimumBalance { account, .. }
            | Self::ChangeOwner { account, .. }
            | Self::Close { account }
            | Self::Balance { account }
            | Self::Details { account }
            | Self::Statement { account } => *account,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn parse_amount_commands() {
        let cmd =
            AccountCommand::parse_command(CommandKind::Deposit, 1, Some(dec!(10)), None, None)
                .unwrap();
        assert_eq!(
            cmd,
            AccountCommand::Deposit {
                account: 1,
                amount: dec!(10)
            }
        );
        assert_eq!(cmd.account(), 1);

        for kind in [
            CommandKind::Deposit,
            CommandKind::Withdraw,
            CommandKind::Transfer,
            CommandKind::Loan,
            CommandKind::Repay,
            CommandKind::Minimum,
        ] {
            let err = AccountCommand::parse_command(kind, 1, None, Some(2), None).unwrap_err();
            assert_eq!(err, AccountCommandError::AmountRequired { kind });
        }
    }

    #[test]
    fn negative_amounts_are_left_to_the_account() {
        let cmd =
            AccountCommand::parse_command(CommandKind::Withdraw, 3, Some(dec!(-1)), None, None)
                .unwrap();
        assert_eq!(
            cmd,
            AccountCommand::Withdraw {
                account: 3,
                amount: dec!(-1)
            }
        );
    }

    #[test]
    fn parse_transfer() {
        let err =
            AccountCommand::parse_command(CommandKind::Transfer, 1, Some(dec!(5)), None, None)
                .unwrap_err();
        assert_eq!(err, AccountCommandError::TargetRequired);

        let cmd =
            AccountCommand::parse_command(CommandKind::Transfer, 1, Some(dec!(5)), Some(2), None)
                .unwrap();
        assert_eq!(
            cmd,
            AccountCommand::Transfer {
                account: 1,
                target: 2,
                amount: dec!(5)
            }
        );
    }

    #[test]
    fn parse_named_commands() {
        let err = AccountCommand::parse_command(
            CommandKind::Open,
            1,
            None,
            None,
            Some(" ".to_string()),
        )
        .unwrap_err();
        assert_eq!(
            err,
            AccountCommandError::NameRequired {
                kind: CommandKind::Open
            }
        );
        assert_eq!(err.to_string(), "Name is required for Open");

        let cmd = AccountCommand::parse_command(CommandKind::Rename, 1, None, None, None).unwrap();
        assert_eq!(
            cmd,
            AccountCommand::ChangeOwner {
                account: 1,
                name: String::new()
            }
        );
    }
}
