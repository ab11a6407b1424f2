use api_types::expense::{EffectAmount, ExpenseKind, ExpenseView, ViewerEffect};
use engine::{BalanceEngine, Expense, GroupMember, RateTable, Settlement, round_cents};
use uuid::Uuid;

use crate::error::Result;
use crate::profile::Profile;
use crate::providers::GroupDataSource;

/// Every expense in the group annotated for the viewer, newest first.
///
/// Records that fail validation still appear in the list so money never
/// silently vanishes from the page; they are only excluded from netting.
pub async fn expenses<S: GroupDataSource>(
    source: &S,
    group_id: Uuid,
    viewer: &Profile,
    rates: &RateTable,
) -> Result<Vec<ExpenseView>> {
    let members = source.members(group_id).await?;
    let mut records = source.expenses(group_id).await?;
    let settlements = source.settlements(group_id).await?;

    records.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));

    let engine = BalanceEngine::new(viewer.user_id, viewer.currency.clone(), rates);
    let views = records
        .iter()
        .map(|expense| annotate(expense, viewer, rates, &engine, &settlements, &members))
        .collect();
    Ok(views)
}

fn annotate(
    expense: &Expense,
    viewer: &Profile,
    rates: &RateTable,
    engine: &BalanceEngine<'_>,
    settlements: &[Settlement],
    members: &[GroupMember],
) -> ExpenseView {
    let (effect, slice) = viewer_effect(expense, viewer.user_id);
    let effect_amount = slice.map(|amount| convert_slice(amount, expense, viewer, rates));

    ExpenseView {
        id: expense.id,
        description: expense.description.clone(),
        date: expense.date,
        amount: round_cents(expense.amount),
        currency: expense.currency.code().to_string(),
        payer_id: expense.payer_id,
        payer_name: GroupMember::name_of(members, expense.payer_id).map(str::to_string),
        kind: kind_view(expense.kind()),
        effect,
        effect_amount,
        settled: engine.is_settled(expense, settlements),
    }
}

/// The viewer's slice of an expense: what they lent out or what they owe,
/// before any settlement cutoff is applied.
fn viewer_effect(expense: &Expense, viewer_id: Uuid) -> (ViewerEffect, Option<f64>) {
    if expense.kind() == engine::ExpenseKind::Personal {
        return if expense.payer_id == viewer_id {
            (ViewerEffect::Personal, None)
        } else {
            (ViewerEffect::NotInvolved, None)
        };
    }
    if expense.payer_id == viewer_id {
        let lent: f64 = expense
            .shares
            .iter()
            .filter(|share| share.user_id != viewer_id)
            .map(|share| share.amount)
            .sum();
        if lent == 0.0 {
            return (ViewerEffect::NotInvolved, None);
        }
        return (ViewerEffect::Lent, Some(lent));
    }
    match expense.share_of(viewer_id) {
        Some(share) if share != 0.0 => (ViewerEffect::Borrowed, Some(share)),
        _ => (ViewerEffect::NotInvolved, None),
    }
}

/// Converts the viewer's slice into the display currency, falling back to
/// the native amount with a flag when the rate is missing.
fn convert_slice(
    amount: f64,
    expense: &Expense,
    viewer: &Profile,
    rates: &RateTable,
) -> EffectAmount {
    match rates.convert(amount, &expense.currency, &viewer.currency) {
        Ok(converted) => EffectAmount {
            amount: round_cents(converted),
            currency: viewer.currency.code().to_string(),
            rate_unavailable: false,
        },
        Err(_) => EffectAmount {
            amount: round_cents(amount),
            currency: expense.currency.code().to_string(),
            rate_unavailable: true,
        },
    }
}

fn kind_view(kind: engine::ExpenseKind) -> ExpenseKind {
    match kind {
        engine::ExpenseKind::Shared => ExpenseKind::Shared,
        engine::ExpenseKind::Loan => ExpenseKind::Loan,
        engine::ExpenseKind::Personal => ExpenseKind::Personal,
    }
}
