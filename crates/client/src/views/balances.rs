use std::collections::BTreeMap;

use uuid::Uuid;

use api_types::balance::{BalanceEntry, ConvertedAmount, NativeAmount};
use engine::{GroupMember, RateTable, round_cents};

use crate::error::Result;
use crate::profile::Profile;
use crate::providers::GroupDataSource;

use super::{native_direction, split_balances, to_direction};

/// One row per counterparty, ordered by counterparty id. Amounts in
/// currencies without a usable rate are listed per currency on the same
/// row instead of being dropped.
pub async fn balances<S: GroupDataSource>(
    source: &S,
    group_id: Uuid,
    viewer: &Profile,
    rates: &RateTable,
) -> Result<Vec<BalanceEntry>> {
    let members = source.members(group_id).await?;
    let expenses = source.expenses(group_id).await?;
    let settlements = source.settlements(group_id).await?;
    let split = split_balances(
        viewer.user_id,
        &viewer.currency,
        rates,
        &expenses,
        &settlements,
    )?;

    let mut entries: BTreeMap<Uuid, BalanceEntry> = BTreeMap::new();
    for row in split.converted {
        let entry = entries
            .entry(row.counterparty_id)
            .or_insert_with(|| empty_entry(row.counterparty_id, &members));
        entry.converted = Some(ConvertedAmount {
            amount: round_cents(row.amount),
            currency: viewer.currency.code().to_string(),
            direction: to_direction(row.direction),
        });
    }
    for row in split.unconverted {
        let entry = entries
            .entry(row.counterparty_id)
            .or_insert_with(|| empty_entry(row.counterparty_id, &members));
        entry.rate_unavailable.push(NativeAmount {
            amount: round_cents(row.net.abs()),
            currency: row.currency.code().to_string(),
            direction: native_direction(row.net),
        });
    }

    Ok(entries.into_values().collect())
}

fn empty_entry(counterparty_id: Uuid, members: &[GroupMember]) -> BalanceEntry {
    BalanceEntry {
        counterparty_id,
        counterparty_name: GroupMember::name_of(members, counterparty_id).map(str::to_string),
        converted: None,
        rate_unavailable: Vec::new(),
    }
}
