//! Per-page adapters: fetch once, compute once, shape DTOs.
//!
//! Every surface that shows who-owes-whom goes through one
//! [`engine::BalanceEngine`] pass. The adapters only resolve display
//! names, degrade missing-rate amounts into explicit unconverted rows,
//! and round for display.

use std::collections::BTreeSet;

use uuid::Uuid;

use engine::{
    BalanceEngine, CounterpartyBalance, Currency, Expense, NativeBalance, RateTable, Settlement,
};

use crate::error::Result;

pub use balances::balances;
pub use dashboard::dashboard;
pub use expenses::expenses;
pub use members::members;
pub use settlements::settlements;

mod balances;
mod dashboard;
mod expenses;
mod members;
mod settlements;

struct SplitBalances {
    converted: Vec<CounterpartyBalance>,
    unconverted: Vec<NativeBalance>,
    missing: BTreeSet<Currency>,
}

/// Partitions expenses by convertibility, nets the convertible ones into
/// the display currency and the rest per native currency. After the
/// partition the converted pass cannot hit a missing rate.
fn split_balances(
    viewer_id: Uuid,
    display: &Currency,
    rates: &RateTable,
    expenses: &[Expense],
    settlements: &[Settlement],
) -> Result<SplitBalances> {
    let missing = rates.missing_for(expenses.iter().map(|e| &e.currency), display);
    let (convertible, flagged): (Vec<Expense>, Vec<Expense>) = expenses
        .iter()
        .cloned()
        .partition(|e| !missing.contains(&e.currency));

    let engine = BalanceEngine::new(viewer_id, display.clone(), rates);
    let converted = engine.balances(&convertible, settlements)?;
    let unconverted = engine.native_balances(&flagged, settlements);

    Ok(SplitBalances {
        converted,
        unconverted,
        missing,
    })
}

fn to_direction(direction: engine::Direction) -> api_types::balance::Direction {
    match direction {
        engine::Direction::YouOwe => api_types::balance::Direction::YouOwe,
        engine::Direction::OwesYou => api_types::balance::Direction::OwesYou,
    }
}

/// Direction of a signed native net, where positive means the viewer owes.
fn native_direction(net: f64) -> api_types::balance::Direction {
    if net > 0.0 {
        api_types::balance::Direction::YouOwe
    } else {
        api_types::balance::Direction::OwesYou
    }
}
