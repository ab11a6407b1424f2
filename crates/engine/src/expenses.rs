//! Expense records and their share breakdown.
//!
//! An expense is money one member paid, split into per-participant shares
//! denominated in the expense's own currency. Who owes whom falls out of the
//! share pattern alone: there is no stored "loan" or "personal" flag.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, ResultEngine};

/// Tolerated gap between the share sum and the expense amount: half a cent
/// per participant, so cent-rounded shares of awkward divisions still pass.
const SHARE_SUM_SLACK_PER_PARTICIPANT: f64 = 0.005;

/// One participant's slice of an expense, in the expense's currency.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpenseShare {
    pub user_id: Uuid,
    pub amount: f64,
}

/// Classification derived from the share pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseKind {
    /// Cost split across participants, payer usually included.
    Shared,
    /// The payer holds no share: they recover the full amount.
    Loan,
    /// The payer is the only participant: nobody owes anybody.
    Personal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub group_id: Uuid,
    pub description: String,
    pub amount: f64,
    pub currency: Currency,
    pub payer_id: Uuid,
    pub shares: Vec<ExpenseShare>,
    /// Calendar date the expense occurred, no time component.
    pub date: NaiveDate,
}

impl Expense {
    /// An expense split equally across `participants`. The payer does not
    /// have to participate (paying for others entirely is a valid split).
    pub fn split_equally(
        group_id: Uuid,
        description: &str,
        amount: f64,
        currency: Currency,
        payer_id: Uuid,
        participants: &[Uuid],
        date: NaiveDate,
    ) -> ResultEngine<Self> {
        let expense = Self {
            id: Uuid::new_v4(),
            group_id,
            description: description.to_string(),
            amount,
            currency,
            payer_id,
            shares: participants
                .iter()
                .map(|&user_id| ExpenseShare {
                    user_id,
                    amount: amount / participants.len() as f64,
                })
                .collect(),
            date,
        };
        expense.validate()?;
        Ok(expense)
    }

    /// A loan: the lender pays, holds a zero share, and the borrower owes
    /// the full amount.
    pub fn loan(
        group_id: Uuid,
        description: &str,
        amount: f64,
        currency: Currency,
        lender: Uuid,
        borrower: Uuid,
        date: NaiveDate,
    ) -> ResultEngine<Self> {
        let id = Uuid::new_v4();
        if lender == borrower {
            return Err(EngineError::InvalidExpense {
                expense: id,
                reason: "lender and borrower must differ".to_string(),
            });
        }
        let expense = Self {
            id,
            group_id,
            description: description.to_string(),
            amount,
            currency,
            payer_id: lender,
            shares: vec![
                ExpenseShare {
                    user_id: lender,
                    amount: 0.0,
                },
                ExpenseShare {
                    user_id: borrower,
                    amount,
                },
            ],
            date,
        };
        expense.validate()?;
        Ok(expense)
    }

    /// A personal expense tracked in the group but owed by nobody.
    pub fn personal(
        group_id: Uuid,
        description: &str,
        amount: f64,
        currency: Currency,
        payer_id: Uuid,
        date: NaiveDate,
    ) -> ResultEngine<Self> {
        let expense = Self {
            id: Uuid::new_v4(),
            group_id,
            description: description.to_string(),
            amount,
            currency,
            payer_id,
            shares: vec![ExpenseShare {
                user_id: payer_id,
                amount,
            }],
            date,
        };
        expense.validate()?;
        Ok(expense)
    }

    /// Checks the record invariants.
    ///
    /// Balance computations call this per expense and exclude offenders
    /// rather than abort; shares are never fabricated for a record whose
    /// breakdown does not add up.
    pub fn validate(&self) -> ResultEngine<()> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(self.invalid(format!("amount must be positive, got {}", self.amount)));
        }
        if self.shares.is_empty() {
            return Err(self.invalid("no participant shares".to_string()));
        }
        let mut seen = HashSet::new();
        for share in &self.shares {
            if !share.amount.is_finite() || share.amount < 0.0 {
                return Err(self.invalid(format!(
                    "share for {} must be non-negative, got {}",
                    share.user_id, share.amount
                )));
            }
            if !seen.insert(share.user_id) {
                return Err(self.invalid(format!("duplicate participant {}", share.user_id)));
            }
        }
        let sum: f64 = self.shares.iter().map(|s| s.amount).sum();
        let tolerance = SHARE_SUM_SLACK_PER_PARTICIPANT * self.shares.len() as f64 + 1e-9;
        if (sum - self.amount).abs() > tolerance {
            return Err(self.invalid(format!(
                "share sum {sum} does not match amount {}",
                self.amount
            )));
        }
        Ok(())
    }

    /// Share held by `user`, if they participate.
    #[must_use]
    pub fn share_of(&self, user: Uuid) -> Option<f64> {
        self.shares
            .iter()
            .find(|s| s.user_id == user)
            .map(|s| s.amount)
    }

    /// Whether `user` paid or holds a share.
    #[must_use]
    pub fn involves(&self, user: Uuid) -> bool {
        self.payer_id == user || self.share_of(user).is_some()
    }

    #[must_use]
    pub fn kind(&self) -> ExpenseKind {
        if self.shares.len() == 1 && self.shares[0].user_id == self.payer_id {
            return ExpenseKind::Personal;
        }
        let payer_share = self.share_of(self.payer_id).unwrap_or(0.0);
        if payer_share < SHARE_SUM_SLACK_PER_PARTICIPANT {
            return ExpenseKind::Loan;
        }
        ExpenseKind::Shared
    }

    fn invalid(&self, reason: String) -> EngineError {
        EngineError::InvalidExpense {
            expense: self.id,
            reason,
        }
    }
}
