use uuid::Uuid;

use api_types::settlement::{SettlementStatus, SettlementView};
use engine::{GroupMember, Settlement, round_cents};

use crate::error::Result;
use crate::providers::GroupDataSource;

/// Settle-up history: every settlement in the group, names resolved,
/// newest first.
pub async fn settlements<S: GroupDataSource>(
    source: &S,
    group_id: Uuid,
) -> Result<Vec<SettlementView>> {
    let members = source.members(group_id).await?;
    let mut records = source.settlements(group_id).await?;

    records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

    Ok(records
        .iter()
        .map(|settlement| view(settlement, &members))
        .collect())
}

fn view(settlement: &Settlement, members: &[GroupMember]) -> SettlementView {
    SettlementView {
        id: settlement.id,
        from_user: settlement.from_user,
        from_name: GroupMember::name_of(members, settlement.from_user).map(str::to_string),
        to_user: settlement.to_user,
        to_name: GroupMember::name_of(members, settlement.to_user).map(str::to_string),
        amount: round_cents(settlement.amount),
        currency: settlement.currency.code().to_string(),
        status: status_view(settlement.status),
        created_at: settlement.created_at,
        completed_at: settlement.completed_at,
    }
}

fn status_view(status: engine::SettlementStatus) -> SettlementStatus {
    match status {
        engine::SettlementStatus::Pending => SettlementStatus::Pending,
        engine::SettlementStatus::Completed => SettlementStatus::Completed,
        engine::SettlementStatus::Rejected => SettlementStatus::Rejected,
    }
}
