pub use balance::{
    BalanceEngine, CounterpartyBalance, Direction, MATERIALITY, NativeBalance,
};
pub use currency::Currency;
pub use error::EngineError;
pub use expenses::{Expense, ExpenseKind, ExpenseShare};
pub use groups::{Group, GroupMember, MemberRole};
pub use rates::{RateTable, round_cents};
pub use settlements::{Settlement, SettlementStatus};

mod balance;
mod currency;
mod error;
mod expenses;
mod groups;
mod rates;
mod settlements;

type ResultEngine<T> = Result<T, EngineError>;
