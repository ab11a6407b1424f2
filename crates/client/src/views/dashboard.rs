use std::collections::BTreeSet;

use uuid::Uuid;

use api_types::balance::DashboardSummary;
use engine::{Direction, RateTable, round_cents};

use crate::error::Result;
use crate::profile::Profile;
use crate::providers::GroupDataSource;

use super::split_balances;

/// Overall position for the dashboard header: totals per direction in the
/// viewer's display currency, plus which currencies could not be converted.
pub async fn dashboard<S: GroupDataSource>(
    source: &S,
    group_id: Uuid,
    viewer: &Profile,
    rates: &RateTable,
) -> Result<DashboardSummary> {
    let expenses = source.expenses(group_id).await?;
    let settlements = source.settlements(group_id).await?;
    let split = split_balances(
        viewer.user_id,
        &viewer.currency,
        rates,
        &expenses,
        &settlements,
    )?;

    let mut total_you_owe = 0.0;
    let mut total_owed_to_you = 0.0;
    for row in &split.converted {
        match row.direction {
            Direction::YouOwe => total_you_owe += row.amount,
            Direction::OwesYou => total_owed_to_you += row.amount,
        }
    }

    let mut counterparties: BTreeSet<Uuid> = split
        .converted
        .iter()
        .map(|row| row.counterparty_id)
        .collect();
    counterparties.extend(split.unconverted.iter().map(|row| row.counterparty_id));

    Ok(DashboardSummary {
        display_currency: viewer.currency.code().to_string(),
        total_you_owe: round_cents(total_you_owe),
        total_owed_to_you: round_cents(total_owed_to_you),
        counterparties: counterparties.len() as u32,
        unconverted_currencies: split
            .missing
            .iter()
            .map(|currency| currency.code().to_string())
            .collect(),
    })
}
