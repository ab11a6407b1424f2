use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod balance {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Direction {
        YouOwe,
        OwesYou,
    }

    /// Net amount successfully converted into the viewer's display currency.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ConvertedAmount {
        /// Rounded to two decimals.
        pub amount: f64,
        pub currency: String,
        pub direction: Direction,
    }

    /// Net amount left in its original currency because no usable rate was
    /// available. Shown as-is, never guessed.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct NativeAmount {
        pub amount: f64,
        pub currency: String,
        pub direction: Direction,
    }

    /// One row of the balances page.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct BalanceEntry {
        pub counterparty_id: Uuid,
        pub counterparty_name: Option<String>,
        /// Net across every expense the rate snapshot could convert.
        pub converted: Option<ConvertedAmount>,
        /// Per-currency nets the snapshot could not convert.
        pub rate_unavailable: Vec<NativeAmount>,
    }

    /// Overall position shown on the dashboard.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct DashboardSummary {
        pub display_currency: String,
        pub total_you_owe: f64,
        pub total_owed_to_you: f64,
        pub counterparties: u32,
        /// Currencies excluded from the totals for lack of a rate; empty
        /// when the totals are complete.
        pub unconverted_currencies: Vec<String>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ExpenseKind {
        Shared,
        Loan,
        Personal,
    }

    /// What an expense means for the viewer.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ViewerEffect {
        NotInvolved,
        Personal,
        Lent,
        Borrowed,
    }

    /// The viewer's lent/borrowed slice of one expense.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct EffectAmount {
        pub amount: f64,
        /// Display currency when converted, the expense's own otherwise.
        pub currency: String,
        pub rate_unavailable: bool,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub description: String,
        pub date: NaiveDate,
        pub amount: f64,
        pub currency: String,
        pub payer_id: Uuid,
        pub payer_name: Option<String>,
        pub kind: ExpenseKind,
        pub effect: ViewerEffect,
        /// Absent when the viewer is uninvolved or the expense is personal.
        pub effect_amount: Option<EffectAmount>,
        /// Covered by a completed settlement with the relevant counterparty.
        pub settled: bool,
    }
}

pub mod settlement {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum SettlementStatus {
        Pending,
        Completed,
        Rejected,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct SettlementView {
        pub id: Uuid,
        pub from_user: Uuid,
        pub from_name: Option<String>,
        pub to_user: Uuid,
        pub to_name: Option<String>,
        pub amount: f64,
        pub currency: String,
        pub status: SettlementStatus,
        pub created_at: DateTime<Utc>,
        pub completed_at: Option<DateTime<Utc>>,
    }
}

pub mod member {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum MemberRole {
        Admin,
        Member,
    }

    impl MemberRole {
        /// Canonical role string used by the engine and providers.
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Admin => "admin",
                Self::Member => "member",
            }
        }
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct MemberView {
        pub user_id: Uuid,
        pub display_name: String,
        pub avatar_url: Option<String>,
        pub role: MemberRole,
    }
}
