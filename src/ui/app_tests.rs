#![allow(clippy::unwrap_used)]

use super::*;
use crate::ui::commands::handle_command;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn new_txn(
    kind: TransactionKind,
    amount: Decimal,
    when: &str,
    category: &str,
    subcategory: &str,
) -> NewTransaction {
    NewTransaction {
        kind,
        currency: Currency::default(),
        amount,
        occurred_at: parse_datetime(when).unwrap(),
        category_id: category.into(),
        subcategory_id: subcategory.into(),
        description: None,
        notes: None,
        tags: vec!["work".into()],
    }
}

/// Three rows across two months: two food expenses and a salary.
fn setup() -> (Database, App) {
    let mut db = Database::open_in_memory().unwrap();
    let owner = db
        .insert_user(&User::new("Test User", "test@example.com").unwrap())
        .unwrap();
    db.insert_transactions_batch(
        owner,
        vec![
            new_txn(TransactionKind::Expense, dec!(12), "2024-01-05", "food_dining", "lunch"),
            new_txn(TransactionKind::Income, dec!(1000), "2024-01-31", "income", "salary"),
            new_txn(TransactionKind::Expense, dec!(30), "2024-02-10", "food_dining", "dinner"),
        ],
    )
    .unwrap();
    let mut app = App::new(owner, "Test User");
    app.refresh(&db).unwrap();
    (db, app)
}

// ── Screen ────────────────────────────────────────────────────

#[test]
fn test_screen_next_and_prev_wrap() {
    assert_eq!(Screen::Overview.next(), Screen::Categories);
    assert_eq!(Screen::Transactions.next(), Screen::Overview);
    assert_eq!(Screen::Overview.prev(), Screen::Transactions);
    assert_eq!(Screen::all().len(), 5);
}

// ── Refresh and cursor ────────────────────────────────────────

#[test]
fn test_refresh_lists_newest_first() {
    let (_db, app) = setup();
    assert_eq!(app.transactions.len(), 3);
    assert_eq!(app.transactions[0].amount, dec!(30));
    assert_eq!(app.transactions[2].amount, dec!(12));
    assert_eq!(app.overview.summary.total_income, dec!(1000));
    assert_eq!(app.overview.summary.total_expense, dec!(42));
}

#[test]
fn test_row_count_per_screen() {
    let (_db, mut app) = setup();
    assert_eq!(app.row_count(), 0);

    // food_dining (lunch, dinner) + income (salary)
    app.switch_screen(Screen::Categories);
    assert_eq!(app.row_count(), 5);

    app.switch_screen(Screen::Trends);
    assert_eq!(app.row_count(), 2);

    app.switch_screen(Screen::Tags);
    assert_eq!(app.row_count(), 1);

    app.switch_screen(Screen::Transactions);
    assert_eq!(app.row_count(), 3);
}

#[test]
fn test_cursor_stays_in_bounds() {
    let (_db, mut app) = setup();
    app.switch_screen(Screen::Transactions);
    app.visible_rows = 2;
    for _ in 0..10 {
        app.move_down();
    }
    assert_eq!(app.index, 2);
    assert_eq!(app.scroll, 1);

    app.goto_top();
    assert_eq!((app.index, app.scroll), (0, 0));
    app.goto_bottom();
    assert_eq!(app.index, 2);
    app.move_up();
    assert_eq!(app.index, 1);
}

#[test]
fn test_refresh_clamps_cursor_when_rows_shrink() {
    let (db, mut app) = setup();
    app.switch_screen(Screen::Transactions);
    app.goto_bottom();
    assert_eq!(app.index, 2);

    app.query.kind = Some(TransactionKind::Income);
    app.refresh(&db).unwrap();
    assert_eq!(app.transactions.len(), 1);
    assert_eq!(app.index, 0);
    assert_eq!(app.scroll, 0);
}

#[test]
fn test_switch_screen_resets_cursor() {
    let (_db, mut app) = setup();
    app.switch_screen(Screen::Transactions);
    app.move_down();
    app.switch_screen(Screen::Categories);
    assert_eq!((app.index, app.scroll), (0, 0));
}

// ── Cycling ───────────────────────────────────────────────────

#[test]
fn test_cycle_kind() {
    let (db, mut app) = setup();
    app.cycle_kind(&db).unwrap();
    assert_eq!(app.query.kind, Some(TransactionKind::Expense));
    assert_eq!(app.transactions.len(), 2);
    app.cycle_kind(&db).unwrap();
    assert_eq!(app.query.kind, Some(TransactionKind::Income));
    assert_eq!(app.status_message, "Type: income");
    app.cycle_kind(&db).unwrap();
    assert_eq!(app.query.kind, None);
    assert_eq!(app.transactions.len(), 3);
}

#[test]
fn test_cycle_period_rebuckets() {
    let (db, mut app) = setup();
    assert_eq!(app.query.period, AnalyticsPeriod::Monthly);
    app.cycle_period(&db).unwrap();
    assert_eq!(app.query.period, AnalyticsPeriod::Yearly);
    assert_eq!(app.overview.period_comparison.len(), 1);
    app.cycle_period(&db).unwrap();
    assert_eq!(app.query.period, AnalyticsPeriod::Daily);
    assert_eq!(app.overview.period_comparison.len(), 3);
}

#[test]
fn test_filter_label() {
    let (_db, mut app) = setup();
    assert_eq!(app.filter_label(), "all time | monthly | all");
    app.query.start_date = NaiveDate::from_ymd_opt(2024, 1, 1);
    app.query.kind = Some(TransactionKind::Expense);
    app.query.category_id = Some("travel".into());
    assert_eq!(app.filter_label(), "from 2024-01-01 | monthly | expense | travel");
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn test_command_date_range_is_inclusive() {
    let (db, mut app) = setup();
    handle_command("from 2024-01-05", &mut app, &db).unwrap();
    handle_command("to 2024-01-31", &mut app, &db).unwrap();
    assert_eq!(app.transactions.len(), 2);
    assert_eq!(app.status_message, "To 2024-01-31 (inclusive)");

    handle_command("from", &mut app, &db).unwrap();
    assert_eq!(app.query.start_date, None);
    assert_eq!(app.status_message, "Start date cleared");
}

#[test]
fn test_command_rejects_bad_dates() {
    let (db, mut app) = setup();
    handle_command("from 01/05/2024", &mut app, &db).unwrap();
    assert_eq!(app.query.start_date, None);
    assert!(app.status_message.starts_with("Invalid date"));

    handle_command("to 2024-01-01", &mut app, &db).unwrap();
    handle_command("from 2024-02-01", &mut app, &db).unwrap();
    assert_eq!(app.query.start_date, None);
    assert!(app.status_message.contains("after end"));
}

#[test]
fn test_command_type_and_category() {
    let (db, mut app) = setup();
    handle_command("type income", &mut app, &db).unwrap();
    assert_eq!(app.transactions.len(), 1);
    assert_eq!(app.total_count, 3);

    handle_command("type transfer", &mut app, &db).unwrap();
    assert_eq!(app.query.kind, Some(TransactionKind::Income));
    assert!(app.status_message.starts_with("Unknown type"));

    handle_command("type all", &mut app, &db).unwrap();
    handle_command("category Food_Dining", &mut app, &db).unwrap();
    assert_eq!(app.query.category_id.as_deref(), Some("food_dining"));
    assert_eq!(app.transactions.len(), 2);
    assert!(app.status_message.ends_with("(5 subcategories)"));

    handle_command("cat nope", &mut app, &db).unwrap();
    assert_eq!(app.query.category_id.as_deref(), Some("food_dining"));
    assert_eq!(app.status_message, "Unknown category 'nope'");

    handle_command("clear", &mut app, &db).unwrap();
    assert_eq!(app.query, AnalyticsQuery::default());
    assert_eq!(app.transactions.len(), 3);
}

#[test]
fn test_command_period_and_navigation() {
    let (db, mut app) = setup();
    handle_command("period weekly", &mut app, &db).unwrap();
    assert_eq!(app.query.period, AnalyticsPeriod::Weekly);
    handle_command("period nonsense", &mut app, &db).unwrap();
    assert_eq!(app.query.period, AnalyticsPeriod::Daily);

    handle_command("tags", &mut app, &db).unwrap();
    assert_eq!(app.screen, Screen::Tags);
    handle_command("t", &mut app, &db).unwrap();
    assert_eq!(app.screen, Screen::Transactions);
}

#[test]
fn test_unknown_command_suggests_closest() {
    let (db, mut app) = setup();
    handle_command("trnds", &mut app, &db).unwrap();
    assert_eq!(app.status_message, "Unknown command: :trnds. Did you mean :trends?");
    assert!(app.running);

    handle_command("   ", &mut app, &db).unwrap();
    handle_command("quit", &mut app, &db).unwrap();
    assert!(!app.running);
}
