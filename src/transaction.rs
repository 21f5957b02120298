use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Loan,
    Repayment,
    Interest,
}

impl TransactionKind {
    /// Whether the record counts towards the deposits summary of a statement.
    pub fn is_credit(self) -> bool {
        matches!(self, TransactionKind::Deposit | TransactionKind::Interest)
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
            TransactionKind::Loan => "loan",
            TransactionKind::Repayment => "repayment",
            TransactionKind::Interest => "interest",
        };
        f.write_str(kind)
    }
}

/// Single entry of an account history.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub narration: String,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn new(kind: TransactionKind, amount: Decimal, narration: impl Into<String>) -> Self {
        Self {
            kind,
            amount,
            narration: narration.into(),
            timestamp: Utc::now(),
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}: {} ${:.2}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.narration,
            self.kind,
            self.amount
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn display_transaction() {
        let tx = Transaction {
            kind: TransactionKind::Deposit,
            amount: dec!(1000),
            narration: "Deposit".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
        };
        assert_eq!(tx.to_string(), "2024-03-01 09:30:00 - Deposit: deposit $1000.00");
    }

    #[test]
    fn credit_kinds() {
        assert!(TransactionKind::Deposit.is_credit());
        assert!(TransactionKind::Interest.is_credit());
        assert!(!TransactionKind::Loan.is_credit());
        assert!(!TransactionKind::Withdrawal.is_credit());
        assert!(!TransactionKind::Repayment.is_credit());
    }
}
