//! Counterparty balance netting.
//!
//! One computation serves every surface that shows who owes whom: the
//! dashboard totals, the per-counterparty balance list and the per-expense
//! annotations all go through [`BalanceEngine`] so they can never drift
//! apart again.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::{
    Currency, Expense, RateTable, ResultEngine, Settlement, SettlementStatus,
};

/// Materiality floor: nets smaller than one cent are treated as settled.
pub const MATERIALITY: f64 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    YouOwe,
    OwesYou,
}

impl Direction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::YouOwe => "you_owe",
            Self::OwesYou => "owes_you",
        }
    }
}

/// Net position against one counterparty, in the display currency.
#[derive(Clone, Debug, PartialEq)]
pub struct CounterpartyBalance {
    pub counterparty_id: Uuid,
    /// Absolute net, full precision; round at display time.
    pub amount: f64,
    pub direction: Direction,
}

/// Net position against one counterparty in one expense currency, without
/// any conversion. Positive means the viewer owes.
#[derive(Clone, Debug, PartialEq)]
pub struct NativeBalance {
    pub counterparty_id: Uuid,
    pub currency: Currency,
    pub net: f64,
}

struct Contribution<'a> {
    counterparty: Uuid,
    /// Signed share in the expense's currency; positive means the viewer
    /// owes the counterparty.
    amount: f64,
    currency: &'a Currency,
}

/// Balance computation for one viewer against one rate snapshot.
///
/// Pure and cheap to construct; build one per query. Only expenses dated
/// strictly after the pair's settlement cutoff count, where the cutoff
/// comes from the most recent completed settlement between exactly that
/// pair of users.
pub struct BalanceEngine<'a> {
    viewer_id: Uuid,
    display_currency: Currency,
    rates: &'a RateTable,
}

impl<'a> BalanceEngine<'a> {
    #[must_use]
    pub fn new(viewer_id: Uuid, display_currency: Currency, rates: &'a RateTable) -> Self {
        Self {
            viewer_id,
            display_currency,
            rates,
        }
    }

    #[must_use]
    pub fn viewer_id(&self) -> Uuid {
        self.viewer_id
    }

    #[must_use]
    pub fn display_currency(&self) -> &Currency {
        &self.display_currency
    }

    /// Nets the viewer's position against every counterparty, converted
    /// into the display currency.
    ///
    /// Invalid expenses are logged and excluded, never repaired. A currency
    /// the snapshot cannot convert fails the whole computation with
    /// [`EngineError::MissingRate`]; callers that want partial output
    /// filter those expenses first (see [`RateTable::missing_for`]) and
    /// surface the remainder through [`Self::native_balances`].
    ///
    /// Rows below [`MATERIALITY`] are dropped; output is sorted by
    /// counterparty id.
    ///
    /// [`EngineError::MissingRate`]: crate::EngineError::MissingRate
    pub fn balances(
        &self,
        expenses: &[Expense],
        settlements: &[Settlement],
    ) -> ResultEngine<Vec<CounterpartyBalance>> {
        let mut nets: BTreeMap<Uuid, f64> = BTreeMap::new();
        for c in self.contributions(expenses, settlements) {
            let converted = self
                .rates
                .convert(c.amount, c.currency, &self.display_currency)?;
            *nets.entry(c.counterparty).or_insert(0.0) += converted;
        }

        Ok(nets
            .into_iter()
            .filter(|(_, net)| net.abs() >= MATERIALITY)
            .map(|(counterparty_id, net)| CounterpartyBalance {
                counterparty_id,
                amount: net.abs(),
                direction: if net > 0.0 {
                    Direction::YouOwe
                } else {
                    Direction::OwesYou
                },
            })
            .collect())
    }

    /// The same netting bucketed per expense currency, with no conversion
    /// at all. Infallible; feeds the unconverted fallback rows when rates
    /// are missing.
    #[must_use]
    pub fn native_balances(
        &self,
        expenses: &[Expense],
        settlements: &[Settlement],
    ) -> Vec<NativeBalance> {
        let mut nets: BTreeMap<(Uuid, Currency), f64> = BTreeMap::new();
        for c in self.contributions(expenses, settlements) {
            *nets
                .entry((c.counterparty, c.currency.clone()))
                .or_insert(0.0) += c.amount;
        }

        nets.into_iter()
            .filter(|(_, net)| net.abs() >= MATERIALITY)
            .map(|((counterparty_id, currency), net)| NativeBalance {
                counterparty_id,
                currency,
                net,
            })
            .collect()
    }

    /// Whether every debt this expense would create for the viewer is
    /// already covered by completed settlements. `false` for expenses that
    /// create no debt at all (personal, uninvolved, zero shares) or that
    /// fail validation.
    #[must_use]
    pub fn is_settled(&self, expense: &Expense, settlements: &[Settlement]) -> bool {
        if expense.validate().is_err() {
            return false;
        }
        let cutoffs = self.pair_cutoffs(settlements);
        let mut counterparties = Vec::new();
        if expense.payer_id == self.viewer_id {
            for share in &expense.shares {
                if share.user_id != self.viewer_id && share.amount != 0.0 {
                    counterparties.push(share.user_id);
                }
            }
        } else if let Some(share) = expense.share_of(self.viewer_id) {
            if share != 0.0 {
                counterparties.push(expense.payer_id);
            }
        }
        !counterparties.is_empty()
            && counterparties
                .iter()
                .all(|c| !qualifies(expense, cutoffs.get(c)))
    }

    /// Settlement cutoff for each counterparty the viewer has settled with.
    ///
    /// Recency is judged by completion instant; equal instants break toward
    /// the greatest settlement id, which is arbitrary but stable across
    /// replicas. The cutoff value itself is the winner's
    /// [`Settlement::cutoff_timestamp`], so an explicitly back-dated
    /// `settled_up_to` window is honored even on the newest settlement.
    fn pair_cutoffs(&self, settlements: &[Settlement]) -> HashMap<Uuid, DateTime<Utc>> {
        let mut latest: HashMap<Uuid, &Settlement> = HashMap::new();
        for settlement in settlements {
            if settlement.status != SettlementStatus::Completed {
                continue;
            }
            if settlement.from_user == settlement.to_user {
                continue;
            }
            let counterparty = if settlement.from_user == self.viewer_id {
                settlement.to_user
            } else if settlement.to_user == self.viewer_id {
                settlement.from_user
            } else {
                continue;
            };
            let candidate_key = (completion_instant(settlement), settlement.id);
            match latest.get(&counterparty) {
                Some(current) if (completion_instant(current), current.id) >= candidate_key => {}
                _ => {
                    latest.insert(counterparty, settlement);
                }
            }
        }
        latest
            .into_iter()
            .map(|(counterparty, settlement)| (counterparty, settlement.cutoff_timestamp()))
            .collect()
    }

    fn contributions<'e>(
        &self,
        expenses: &'e [Expense],
        settlements: &[Settlement],
    ) -> Vec<Contribution<'e>> {
        let cutoffs = self.pair_cutoffs(settlements);
        let mut out = Vec::new();
        for expense in expenses {
            if let Err(err) = expense.validate() {
                warn!(expense = %expense.id, error = %err, "excluding invalid expense");
                continue;
            }
            if expense.payer_id == self.viewer_id {
                for share in &expense.shares {
                    if share.user_id == self.viewer_id || share.amount == 0.0 {
                        continue;
                    }
                    if !qualifies(expense, cutoffs.get(&share.user_id)) {
                        continue;
                    }
                    out.push(Contribution {
                        counterparty: share.user_id,
                        amount: -share.amount,
                        currency: &expense.currency,
                    });
                }
            } else if let Some(viewer_share) = expense.share_of(self.viewer_id) {
                if viewer_share != 0.0 && qualifies(expense, cutoffs.get(&expense.payer_id)) {
                    out.push(Contribution {
                        counterparty: expense.payer_id,
                        amount: viewer_share,
                        currency: &expense.currency,
                    });
                }
            }
        }
        out
    }
}

/// Whether `expense` is still open given the pair's cutoff: strictly after
/// the cutoff's UTC calendar date. Same-day expenses count as covered.
fn qualifies(expense: &Expense, cutoff: Option<&DateTime<Utc>>) -> bool {
    match cutoff {
        Some(cutoff) => expense.date > cutoff.date_naive(),
        None => true,
    }
}

fn completion_instant(settlement: &Settlement) -> DateTime<Utc> {
    settlement.completed_at.unwrap_or(settlement.created_at)
}
