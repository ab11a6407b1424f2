//! Adapter tests over the fixture provider: one fetch, one engine pass,
//! DTOs a page can render directly.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use api_types::balance::Direction;
use api_types::expense::{ExpenseKind, ViewerEffect};
use api_types::member::MemberRole as MemberRoleView;
use api_types::settlement::SettlementStatus as SettlementStatusView;
use client::{ClientError, InMemorySource, Profile, views};
use engine::{Currency, Expense, Group, GroupMember, MemberRole, RateTable, Settlement};

fn alice() -> Uuid {
    Uuid::from_u128(1)
}

fn bob() -> Uuid {
    Uuid::from_u128(2)
}

fn carol() -> Uuid {
    Uuid::from_u128(3)
}

fn usd() -> Currency {
    Currency::usd()
}

fn eur() -> Currency {
    Currency::try_from("EUR").unwrap()
}

fn gbp() -> Currency {
    Currency::try_from("GBP").unwrap()
}

fn rates() -> RateTable {
    RateTable::from_iter([(usd(), 1.0), (eur(), 0.93)])
}

fn group() -> Group {
    Group {
        id: Uuid::from_u128(0xF1A7),
        name: "Flat 3B".to_string(),
        default_currency: usd(),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

fn member(user_id: Uuid, name: &str, role: MemberRole) -> GroupMember {
    GroupMember {
        user_id,
        display_name: name.to_string(),
        avatar_url: None,
        role,
    }
}

fn members() -> Vec<GroupMember> {
    vec![
        member(alice(), "Alice", MemberRole::Admin),
        member(bob(), "Bob", MemberRole::Member),
        member(carol(), "Carol", MemberRole::Member),
    ]
}

fn viewer(user_id: Uuid, name: &str) -> Profile {
    Profile {
        user_id,
        display_name: name.to_string(),
        currency: usd(),
    }
}

fn day(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap()
}

fn at(month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, month, day, 12, 0, 0).unwrap()
}

fn equal(payer: Uuid, amount: f64, currency: Currency, split: &[Uuid], date: NaiveDate) -> Expense {
    Expense::split_equally(group().id, "shared cost", amount, currency, payer, split, date)
        .unwrap()
}

#[tokio::test]
async fn dashboard_sums_each_direction_separately() {
    // Bob owes Alice 30 from the split; Alice owes Carol the 25 loan.
    let expenses = vec![
        equal(alice(), 60.0, usd(), &[alice(), bob()], day(6, 1)),
        Expense::loan(
            group().id,
            "festival ticket",
            25.0,
            usd(),
            carol(),
            alice(),
            day(6, 2),
        )
        .unwrap(),
    ];
    let source = InMemorySource::new(group())
        .with_members(members())
        .with_expenses(expenses);

    let summary = views::dashboard(&source, group().id, &viewer(alice(), "Alice"), &rates())
        .await
        .unwrap();

    assert_eq!(summary.display_currency, "USD");
    assert_eq!(summary.total_owed_to_you, 30.0);
    assert_eq!(summary.total_you_owe, 25.0);
    assert_eq!(summary.counterparties, 2);
    assert!(summary.unconverted_currencies.is_empty());
}

#[tokio::test]
async fn missing_rates_degrade_to_native_rows_instead_of_failing() {
    // GBP has no rate in the snapshot: the GBP loan surfaces as a native
    // amount on Bob's row while the USD split still converts.
    let expenses = vec![
        equal(alice(), 60.0, usd(), &[alice(), bob()], day(6, 1)),
        Expense::loan(
            group().id,
            "theatre tickets",
            80.0,
            gbp(),
            bob(),
            alice(),
            day(6, 2),
        )
        .unwrap(),
    ];
    let source = InMemorySource::new(group())
        .with_members(members())
        .with_expenses(expenses);

    let entries = views::balances(&source, group().id, &viewer(alice(), "Alice"), &rates())
        .await
        .unwrap();

    assert_eq!(entries.len(), 1);
    let row = &entries[0];
    assert_eq!(row.counterparty_id, bob());
    assert_eq!(row.counterparty_name.as_deref(), Some("Bob"));

    let converted = row.converted.as_ref().unwrap();
    assert_eq!(converted.amount, 30.0);
    assert_eq!(converted.currency, "USD");
    assert_eq!(converted.direction, Direction::OwesYou);

    assert_eq!(row.rate_unavailable.len(), 1);
    let native = &row.rate_unavailable[0];
    assert_eq!(native.amount, 80.0);
    assert_eq!(native.currency, "GBP");
    assert_eq!(native.direction, Direction::YouOwe);

    let summary = views::dashboard(&source, group().id, &viewer(alice(), "Alice"), &rates())
        .await
        .unwrap();
    assert_eq!(summary.unconverted_currencies, vec!["GBP".to_string()]);
    assert_eq!(summary.counterparties, 1);
}

#[tokio::test]
async fn expense_annotations_follow_the_viewer() {
    let lunch = equal(bob(), 30.0, usd(), &[alice(), bob(), carol()], day(6, 3));
    let advance = Expense::loan(
        group().id,
        "rent advance",
        50.0,
        eur(),
        alice(),
        bob(),
        day(6, 4),
    )
    .unwrap();
    let coffee = Expense::personal(group().id, "coffee", 4.5, usd(), carol(), day(6, 5)).unwrap();
    let source = InMemorySource::new(group())
        .with_members(members())
        .with_expenses(vec![lunch.clone(), advance.clone(), coffee.clone()]);

    let rows = views::expenses(&source, group().id, &viewer(alice(), "Alice"), &rates())
        .await
        .unwrap();

    // Newest first.
    assert_eq!(
        rows.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![coffee.id, advance.id, lunch.id]
    );

    let coffee_row = &rows[0];
    assert_eq!(coffee_row.kind, ExpenseKind::Personal);
    assert_eq!(coffee_row.effect, ViewerEffect::NotInvolved);
    assert!(coffee_row.effect_amount.is_none());
    assert_eq!(coffee_row.payer_name.as_deref(), Some("Carol"));

    let advance_row = &rows[1];
    assert_eq!(advance_row.kind, ExpenseKind::Loan);
    assert_eq!(advance_row.effect, ViewerEffect::Lent);
    let lent = advance_row.effect_amount.as_ref().unwrap();
    assert_eq!(lent.currency, "USD");
    assert_eq!(lent.amount, 53.76);
    assert!(!lent.rate_unavailable);

    let lunch_row = &rows[2];
    assert_eq!(lunch_row.kind, ExpenseKind::Shared);
    assert_eq!(lunch_row.effect, ViewerEffect::Borrowed);
    let borrowed = lunch_row.effect_amount.as_ref().unwrap();
    assert_eq!(borrowed.amount, 10.0);
    assert!(!lunch_row.settled);
}

#[tokio::test]
async fn unconvertible_effects_keep_their_native_currency() {
    let source = InMemorySource::new(group())
        .with_members(members())
        .with_expenses(vec![
            Expense::loan(
                group().id,
                "theatre tickets",
                80.0,
                gbp(),
                bob(),
                alice(),
                day(6, 2),
            )
            .unwrap(),
        ]);

    let rows = views::expenses(&source, group().id, &viewer(alice(), "Alice"), &rates())
        .await
        .unwrap();

    let effect = rows[0].effect_amount.as_ref().unwrap();
    assert_eq!(rows[0].effect, ViewerEffect::Borrowed);
    assert_eq!(effect.currency, "GBP");
    assert_eq!(effect.amount, 80.0);
    assert!(effect.rate_unavailable);
}

#[tokio::test]
async fn settling_up_clears_the_balance_and_marks_expenses_settled() {
    let dinner = equal(bob(), 44.0, usd(), &[alice(), bob()], day(6, 10));
    let source = InMemorySource::new(group())
        .with_members(members())
        .with_expenses(vec![dinner]);

    let before = views::balances(&source, group().id, &viewer(alice(), "Alice"), &rates())
        .await
        .unwrap();
    assert_eq!(before.len(), 1);
    let owed = before[0].converted.as_ref().unwrap();
    assert_eq!(owed.direction, Direction::YouOwe);

    // Pre-fill the proposal from the displayed net, then pay it.
    let amount = Settlement::suggested_amount(owed.amount, &usd(), &usd(), &rates()).unwrap();
    assert_eq!(amount, 22.0);
    let mut payment = Settlement::propose(&group(), alice(), bob(), amount, at(6, 12)).unwrap();
    payment.complete(at(6, 12)).unwrap();

    let source = source.with_settlements(vec![payment]);
    let after = views::balances(&source, group().id, &viewer(alice(), "Alice"), &rates())
        .await
        .unwrap();
    assert!(after.is_empty());

    let rows = views::expenses(&source, group().id, &viewer(alice(), "Alice"), &rates())
        .await
        .unwrap();
    assert!(rows[0].settled);
}

#[tokio::test]
async fn settlement_history_resolves_names_newest_first() {
    let mut paid = Settlement::propose(&group(), alice(), bob(), 20.0, at(6, 1)).unwrap();
    paid.complete(at(6, 2)).unwrap();
    let mut declined = Settlement::propose(&group(), carol(), alice(), 5.0, at(6, 3)).unwrap();
    declined.reject().unwrap();
    let source = InMemorySource::new(group())
        .with_members(members())
        .with_settlements(vec![paid.clone(), declined.clone()]);

    let history = views::settlements(&source, group().id).await.unwrap();

    assert_eq!(
        history.iter().map(|s| s.id).collect::<Vec<_>>(),
        vec![declined.id, paid.id]
    );
    assert_eq!(history[0].status, SettlementStatusView::Rejected);
    assert_eq!(history[0].from_name.as_deref(), Some("Carol"));
    assert_eq!(history[0].completed_at, None);
    assert_eq!(history[1].status, SettlementStatusView::Completed);
    assert_eq!(history[1].to_name.as_deref(), Some("Bob"));
    assert_eq!(history[1].amount, 20.0);
    assert_eq!(history[1].currency, "USD");
}

#[tokio::test]
async fn roster_lists_admins_first() {
    let scrambled = vec![
        member(carol(), "Carol", MemberRole::Member),
        member(alice(), "Alice", MemberRole::Admin),
        member(bob(), "Bob", MemberRole::Member),
    ];
    let source = InMemorySource::new(group()).with_members(scrambled);

    let roster = views::members(&source, group().id).await.unwrap();

    assert_eq!(
        roster
            .iter()
            .map(|m| m.display_name.as_str())
            .collect::<Vec<_>>(),
        vec!["Alice", "Bob", "Carol"]
    );
    assert_eq!(roster[0].role, MemberRoleView::Admin);
    assert_eq!(roster[1].role, MemberRoleView::Member);
}

#[tokio::test]
async fn unknown_groups_surface_not_found() {
    let source = InMemorySource::new(group());
    let err = views::dashboard(
        &source,
        Uuid::from_u128(0xDEAD),
        &viewer(alice(), "Alice"),
        &rates(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));
}
