//! Settlement records and their lifecycle.
//!
//! A settlement is a payment from one member to another that, once
//! completed, draws a line under the pair's history: expenses dated on or
//! before the cutoff no longer count toward their balance. The amount
//! itself never re-enters the netting; the cutoff is the whole effect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, Group, RateTable, ResultEngine, round_cents};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    Pending,
    Completed,
    Rejected,
}

impl SettlementStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }
}

impl TryFrom<&str> for SettlementStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "rejected" => Ok(Self::Rejected),
            other => Err(EngineError::InvalidSettlement(format!(
                "invalid settlement status: {other}"
            ))),
        }
    }
}

/// A payment from `from_user` to `to_user`.
///
/// The amount is always denominated in the group's default currency, and
/// the record carries that currency explicitly so no call site has to
/// remember the convention.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: Uuid,
    pub group_id: Uuid,
    pub from_user: Uuid,
    pub to_user: Uuid,
    pub amount: f64,
    pub currency: Currency,
    pub status: SettlementStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Explicit upper bound of the settled window, when the payer chose one.
    pub settled_up_to: Option<DateTime<Utc>>,
}

impl Settlement {
    /// Proposes a new pending settlement, denominated in the group's
    /// default currency.
    pub fn propose(
        group: &Group,
        from_user: Uuid,
        to_user: Uuid,
        amount: f64,
        at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if from_user == to_user {
            return Err(EngineError::InvalidSettlement(
                "payer and payee must differ".to_string(),
            ));
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(EngineError::InvalidSettlement(format!(
                "amount must be positive, got {amount}"
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            group_id: group.id,
            from_user,
            to_user,
            amount,
            currency: group.default_currency.clone(),
            status: SettlementStatus::Pending,
            created_at: at,
            completed_at: None,
            settled_up_to: None,
        })
    }

    /// Marks a pending settlement completed at `at`.
    pub fn complete(&mut self, at: DateTime<Utc>) -> ResultEngine<()> {
        if self.status != SettlementStatus::Pending {
            return Err(EngineError::InvalidSettlement(format!(
                "cannot complete a {} settlement",
                self.status.as_str()
            )));
        }
        self.status = SettlementStatus::Completed;
        self.completed_at = Some(at);
        Ok(())
    }

    /// Rejects a pending settlement.
    pub fn reject(&mut self) -> ResultEngine<()> {
        if self.status != SettlementStatus::Pending {
            return Err(EngineError::InvalidSettlement(format!(
                "cannot reject a {} settlement",
                self.status.as_str()
            )));
        }
        self.status = SettlementStatus::Rejected;
        Ok(())
    }

    /// The instant this settlement draws its line under: `settled_up_to`
    /// when the payer picked a window, otherwise the completion instant,
    /// otherwise the creation instant.
    #[must_use]
    pub fn cutoff_timestamp(&self) -> DateTime<Utc> {
        self.settled_up_to
            .or(self.completed_at)
            .unwrap_or(self.created_at)
    }

    /// Unordered pair test: is this settlement between exactly `a` and `b`?
    #[must_use]
    pub fn is_between(&self, a: Uuid, b: Uuid) -> bool {
        (self.from_user == a && self.to_user == b) || (self.from_user == b && self.to_user == a)
    }

    /// Converts a net balance in the viewer's display currency into the
    /// group denomination, cent-rounded, for pre-filling a settle-up
    /// proposal.
    pub fn suggested_amount(
        net_in_display: f64,
        display_currency: &Currency,
        group_currency: &Currency,
        rates: &RateTable,
    ) -> ResultEngine<f64> {
        let converted = rates.convert(net_in_display.abs(), display_currency, group_currency)?;
        Ok(round_cents(converted))
    }
}
