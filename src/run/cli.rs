use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use crate::analytics;
use crate::config::Config;
use crate::db::{Database, SortField, SortOrder, TransactionListQuery};
use crate::import;
use crate::models::*;
use crate::ui::util::{format_amount, format_percent, truncate};

/// Positional arguments, `--name value` options and the `--json` switch.
#[derive(Debug, Default)]
struct Args {
    positional: Vec<String>,
    options: HashMap<String, String>,
    json: bool,
}

impl Args {
    fn parse(args: &[String]) -> Result<Self> {
        let mut parsed = Self::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            if arg == "--json" {
                parsed.json = true;
            } else if let Some(name) = arg.strip_prefix("--") {
                let value = iter
                    .next()
                    .with_context(|| format!("Option --{name} needs a value"))?;
                parsed.options.insert(name.to_string(), value.clone());
            } else {
                parsed.positional.push(arg.clone());
            }
        }
        Ok(parsed)
    }

    fn arg(&self, i: usize) -> Option<&str> {
        self.positional.get(i).map(String::as_str)
    }

    fn opt(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }

    fn date(&self, name: &str) -> Result<Option<NaiveDate>> {
        self.opt(name).map(parse_date).transpose()
    }

    fn kind(&self) -> Result<Option<TransactionKind>> {
        self.opt("type").map(parse_kind).transpose()
    }

    fn currency(&self) -> Result<Option<Currency>> {
        self.opt("currency")
            .map(|s| s.parse::<Currency>().map_err(anyhow::Error::from))
            .transpose()
    }

    fn lowercase(&self, name: &str) -> Option<String> {
        self.opt(name).map(|s| s.trim().to_lowercase())
    }
}

pub(crate) fn as_cli(args: &[String], db: &mut Database, config: &Config) -> Result<()> {
    let rest = &args[1..];
    if rest.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }
    if rest.iter().any(|a| a == "--version" || a == "-V") {
        println!("fintrack {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let mut parsed = Args::parse(rest)?;
    if parsed.positional.is_empty() {
        print_usage();
        anyhow::bail!("No command given");
    }
    let command = parsed.positional.remove(0);

    match command.as_str() {
        "user" => return cli_user(&parsed, db),
        "users" => return cli_users(&parsed, db),
        "categories" | "cats" => return cli_categories(&parsed, db),
        "help" => {
            print_usage();
            return Ok(());
        }
        "version" => {
            println!("fintrack {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    let email = parsed
        .lowercase("user")
        .or_else(|| config.user_email.clone());
    let (owner_id, user) = super::resolve_owner(db, email.as_deref())?;
    tracing::debug!(owner_id, email = %user.email, command = %command, "running command");

    match command.as_str() {
        "add" | "a" => cli_add(&parsed, db, owner_id),
        "list" | "ls" => cli_list(&parsed, db, owner_id),
        "show" => cli_show(&parsed, db, owner_id),
        "edit" => cli_edit(&parsed, db, owner_id),
        "delete" | "rm" => cli_delete(&parsed, db, owner_id),
        "import" => cli_import(&parsed, db, owner_id),
        "export" => cli_export(&parsed, db, owner_id),
        "analytics" | "stats" => cli_analytics(&parsed, db, owner_id),
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("fintrack: personal income and expense tracker");
    println!();
    println!("Usage: fintrack [--user <email>] [command]");
    println!();
    println!("Commands:");
    println!("  (none)                                  Launch interactive dashboard");
    println!("  user add <name> <email>                 Register a user");
    println!("  users                                   List users");
    println!("  user show <id>                          Show one user");
    println!("  add <income|expense> <amount> <category> <subcategory>");
    println!("      [--date D] [--currency C] [--desc T] [--notes T] [--tags a,b]");
    println!("  list [--page N] [--limit N] [--from D] [--to D] [--type K]");
    println!("       [--category C] [--subcategory S] [--sort F] [--order asc|desc]");
    println!("  show <id>                               Show one transaction");
    println!("  edit <id> [--amount ..] [--date ..] [--type ..] [--category ..]");
    println!("       [--subcategory ..] [--currency ..] [--desc ..] [--notes ..] [--tags ..]");
    println!("       (an empty --desc or --notes clears it)");
    println!("  delete <id>                             Delete a transaction");
    println!("  import <file.csv>                       Import transactions from CSV");
    println!("  export <file.csv> [--from D] [--to D] [--type K] [--category C]");
    println!("  categories                              List categories and subcategories");
    println!("  analytics [overview|summary|categories|trends|tags|periods]");
    let periods: Vec<&str> = AnalyticsPeriod::all().iter().map(|p| p.as_str()).collect();
    println!("      [--from D] [--to D] [--period {}]", periods.join("|"));
    println!("      [--type K] [--category C]");
    println!();
    println!("Options:");
    println!("  --user <email>                          Act as this user (or set FINTRACK_USER)");
    println!("  --json                                  Print JSON instead of a table");
    println!("  --help, -h                              Show this help");
    println!("  --version, -V                           Show version");
}

// ── Users ────────────────────────────────────────────────────

fn cli_user(args: &Args, db: &mut Database) -> Result<()> {
    match args.arg(0) {
        Some("add") => {
            let (Some(name), Some(email)) = (args.arg(1), args.arg(2)) else {
                anyhow::bail!("Usage: fintrack user add <name> <email>");
            };
            let user = User::new(name, email)?;
            let id = db.insert_user(&user)?;
            println!("Added user {id}: {user}");
            Ok(())
        }
        Some("show") => {
            let id: i64 = args
                .arg(1)
                .context("Usage: fintrack user show <id>")?
                .parse()
                .context("User id must be a number")?;
            let user = db
                .get_user_by_id(id)?
                .ok_or_else(|| anyhow::anyhow!("No user with id {id}"))?;
            if args.json {
                return print_json(&user);
            }
            println!("{id}: {user}");
            println!("  Created: {}", user.created_at);
            Ok(())
        }
        Some("list") | None => cli_users(args, db),
        Some(other) => anyhow::bail!("Unknown user command: {other}"),
    }
}

fn cli_users(args: &Args, db: &mut Database) -> Result<()> {
    let users = db.get_users()?;
    if args.json {
        return print_json(&users);
    }
    if users.is_empty() {
        println!("No users");
        return Ok(());
    }

    println!("{:<4} {:<24} Email", "ID", "Name");
    println!("{}", "─".repeat(56));
    for user in &users {
        println!(
            "{:<4} {:<24} {}",
            user.id.unwrap_or(0),
            truncate(&user.name, 24),
            user.email
        );
    }
    Ok(())
}

// ── Transactions ─────────────────────────────────────────────

fn cli_add(args: &Args, db: &mut Database, owner_id: i64) -> Result<()> {
    let (Some(kind), Some(amount), Some(category), Some(subcategory)) =
        (args.arg(0), args.arg(1), args.arg(2), args.arg(3))
    else {
        anyhow::bail!(
            "Usage: fintrack add <income|expense> <amount> <category> <subcategory> [--date D] [--currency C] [--desc T] [--notes T] [--tags a,b]"
        );
    };

    let occurred_at = match args.opt("date") {
        Some(s) => parse_when(s)?,
        None => now_local(),
    };
    let new = NewTransaction {
        kind: parse_kind(kind)?,
        currency: args.currency()?.unwrap_or_default(),
        amount: parse_amount(amount)?,
        occurred_at,
        category_id: category.trim().to_lowercase(),
        subcategory_id: subcategory.trim().to_lowercase(),
        description: args.opt("desc").map(str::to_string),
        notes: args.opt("notes").map(str::to_string),
        tags: args.opt("tags").map(split_list).unwrap_or_default(),
    };

    let txn = db.insert_transaction(owner_id, new)?;
    if args.json {
        return print_json(&txn);
    }
    println!(
        "Added {} {} {} ({}/{}) on {}",
        txn.kind,
        format_amount(txn.amount),
        txn.currency,
        txn.category_id,
        txn.subcategory_id,
        txn.occurred_at_str()
    );
    println!("  id: {}", txn.id);
    Ok(())
}

fn cli_list(args: &Args, db: &mut Database, owner_id: i64) -> Result<()> {
    let mut query = TransactionListQuery {
        start_date: args.date("from")?,
        end_date: args.date("to")?,
        kind: args.kind()?,
        category_id: args.lowercase("category"),
        subcategory_id: args.lowercase("subcategory"),
        ..TransactionListQuery::default()
    };
    if let Some(page) = args.opt("page") {
        query.page = page
            .parse()
            .with_context(|| format!("Invalid page '{page}'"))?;
    }
    if let Some(limit) = args.opt("limit") {
        query.limit = limit
            .parse()
            .with_context(|| format!("Invalid limit '{limit}'"))?;
    }
    if let Some(sort) = args.opt("sort") {
        query.sort_by = SortField::parse(sort).with_context(|| {
            format!("Unknown sort field '{sort}'. Expected date, amount, created or updated")
        })?;
    }
    if let Some(order) = args.opt("order") {
        query.sort_order = SortOrder::parse(order)
            .with_context(|| format!("Unknown sort order '{order}'. Expected asc or desc"))?;
    }

    let page = db.list_transactions(owner_id, &query)?;
    if args.json {
        return print_json(&page);
    }
    if page.transactions.is_empty() {
        println!("No transactions");
        return Ok(());
    }

    print_transaction_table(&page.transactions);
    println!();
    println!(
        "Page {} of {} ({} transactions)",
        page.page,
        page.total_pages.max(1),
        page.total
    );
    Ok(())
}

fn cli_show(args: &Args, db: &mut Database, owner_id: i64) -> Result<()> {
    let id = args.arg(0).context("Usage: fintrack show <id>")?;
    let txn = db
        .get_transaction(owner_id, id)?
        .ok_or_else(|| anyhow::anyhow!("Transaction '{id}' not found"))?;
    if args.json {
        return print_json(&txn);
    }

    let taxonomy = db.taxonomy();
    let category = taxonomy
        .category(&txn.category_id)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| display_name(&txn.category_id));

    println!("Transaction {}", txn.id);
    println!("{}", "─".repeat(40));
    println!("  Type:        {}", txn.kind);
    println!("  Amount:      {} {}", format_amount(txn.amount), txn.currency);
    println!("  Date:        {}", txn.occurred_at_str());
    println!("  Category:    {category} / {}", display_name(&txn.subcategory_id));
    println!("  Description: {}", txn.description.as_deref().unwrap_or("—"));
    println!("  Notes:       {}", txn.notes.as_deref().unwrap_or("—"));
    if !txn.tags.is_empty() {
        println!("  Tags:        {}", txn.tags.join(", "));
    }
    println!("  Created:     {}", txn.created_at);
    println!("  Updated:     {}", txn.updated_at);
    Ok(())
}

fn cli_edit(args: &Args, db: &mut Database, owner_id: i64) -> Result<()> {
    let id = args
        .arg(0)
        .context("Usage: fintrack edit <id> [--amount ..] [--date ..] [--type ..] [--category ..] [--subcategory ..] [--currency ..] [--desc ..] [--notes ..] [--tags ..]")?;

    let update = TransactionUpdate {
        kind: args.kind()?,
        currency: args.currency()?,
        amount: args.opt("amount").map(parse_amount).transpose()?,
        occurred_at: args.opt("date").map(parse_when).transpose()?,
        category_id: args.lowercase("category"),
        subcategory_id: args.lowercase("subcategory"),
        description: args.opt("desc").map(str::to_string),
        notes: args.opt("notes").map(str::to_string),
        tags: args.opt("tags").map(split_list),
    };
    if update.is_empty() {
        anyhow::bail!("Nothing to change. Pass at least one of --amount, --date, --type, --currency, --category, --subcategory, --desc, --notes, --tags");
    }

    let txn = db
        .update_transaction(owner_id, id, update)?
        .ok_or_else(|| anyhow::anyhow!("Transaction '{id}' not found"))?;
    if args.json {
        return print_json(&txn);
    }
    println!("Updated {}", txn.id);
    Ok(())
}

fn cli_delete(args: &Args, db: &mut Database, owner_id: i64) -> Result<()> {
    let id = args.arg(0).context("Usage: fintrack delete <id>")?;
    if !db.soft_delete_transaction(owner_id, id)? {
        anyhow::bail!("Transaction '{id}' not found");
    }
    println!("Deleted {id}");
    Ok(())
}

// ── Import / export ──────────────────────────────────────────

fn cli_import(args: &Args, db: &mut Database, owner_id: i64) -> Result<()> {
    let file = args.arg(0).context("Usage: fintrack import <file.csv>")?;
    let path = Path::new(file);
    if !path.exists() {
        anyhow::bail!("File not found: {file}");
    }

    let rows = import::import_transactions(path)?;
    if rows.is_empty() {
        println!("No transactions found in {file}");
        return Ok(());
    }
    println!("Parsed {} transactions", rows.len());

    let count = db.insert_transactions_batch(owner_id, rows)?;
    println!("Imported {count} transactions");
    Ok(())
}

fn cli_export(args: &Args, db: &mut Database, owner_id: i64) -> Result<()> {
    let file = args
        .arg(0)
        .context("Usage: fintrack export <file.csv> [--from D] [--to D] [--type K] [--category C]")?;
    let query = analytics_query(args, AnalyticsPeriod::default())?;
    let rows = db.get_filtered_transactions(owner_id, &query)?;
    if rows.is_empty() {
        println!("No transactions to export");
        return Ok(());
    }

    let count = import::export_transactions(Path::new(file), &rows)?;
    println!("Exported {count} transactions to {file}");
    Ok(())
}

// ── Categories ───────────────────────────────────────────────

#[derive(Serialize)]
struct CategoryListing {
    #[serde(flatten)]
    category: Category,
    subcategories: Vec<Subcategory>,
}

fn cli_categories(args: &Args, db: &mut Database) -> Result<()> {
    let mut listing = Vec::new();
    for category in db.get_categories()? {
        let subcategories = db.get_subcategories(&category.id)?;
        listing.push(CategoryListing {
            category,
            subcategories,
        });
    }
    if args.json {
        return print_json(&listing);
    }

    for entry in &listing {
        println!(
            "{:<16} {:<16} [{}]",
            entry.category.id, entry.category.name, entry.category.kind
        );
        let subs: Vec<&str> = entry.subcategories.iter().map(|s| s.id.as_str()).collect();
        println!("    {}", subs.join(", "));
    }
    Ok(())
}

// ── Analytics ────────────────────────────────────────────────

/// `default_period` applies when `--period` is absent.
fn analytics_query(args: &Args, default_period: AnalyticsPeriod) -> Result<AnalyticsQuery> {
    let period = args
        .opt("period")
        .map(AnalyticsPeriod::parse)
        .unwrap_or(default_period);
    let query = AnalyticsQuery {
        start_date: args.date("from")?,
        end_date: args.date("to")?,
        kind: args.kind()?,
        category_id: args.lowercase("category"),
        ..AnalyticsQuery::with_period(period)
    };
    if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
        if start > end {
            anyhow::bail!("--from {start} is after --to {end}");
        }
    }
    Ok(query)
}

/// Trends bucket by week unless told otherwise; every other view by month.
fn default_period(view: &str) -> AnalyticsPeriod {
    match view {
        "trends" => AnalyticsPeriod::Weekly,
        _ => AnalyticsPeriod::default(),
    }
}

fn cli_analytics(args: &Args, db: &mut Database, owner_id: i64) -> Result<()> {
    let view = args.arg(0).unwrap_or("overview");
    let query = analytics_query(args, default_period(view))?;
    let rows = db.get_filtered_transactions(owner_id, &query)?;

    match view {
        "overview" => {
            let overview = analytics::overview(&rows, &query);
            if args.json {
                return print_json(&overview);
            }
            print_summary(&overview.summary);
            print_categories(&overview.category_breakdown);
            print_trends(&overview.spending_trends, query.period);
            print_tags(&overview.top_tags);
            print_periods(&overview.period_comparison, query.period);
        }
        "summary" => {
            let summary = analytics::financial_summary(&rows);
            if args.json {
                return print_json(&summary);
            }
            print_summary(&summary);
        }
        "categories" => {
            let breakdown = analytics::category_breakdown(&rows);
            if args.json {
                return print_json(&breakdown);
            }
            print_categories(&breakdown);
        }
        "trends" => {
            let trends = analytics::spending_trends(&rows, &query);
            if args.json {
                return print_json(&trends);
            }
            print_trends(&trends, query.period);
        }
        "tags" => {
            let tags = analytics::tag_analytics(&rows);
            if args.json {
                return print_json(&tags);
            }
            print_tags(&tags);
        }
        "periods" => {
            let periods = analytics::period_comparison(&rows, &query);
            if args.json {
                return print_json(&periods);
            }
            print_periods(&periods, query.period);
        }
        other => anyhow::bail!(
            "Unknown analytics view '{other}'. Expected overview, summary, categories, trends, tags or periods"
        ),
    }
    Ok(())
}

fn print_summary(summary: &FinancialSummary) {
    println!("Summary");
    println!("{}", "─".repeat(40));
    println!("  Income:          {}", format_amount(summary.total_income));
    println!("  Expenses:        {}", format_amount(summary.total_expense));
    println!("  Net:             {}", format_amount(summary.net_income));
    println!("  Avg daily spend: {}", format_amount(summary.avg_daily_expense));
    if let Some(ref largest) = summary.largest_expense {
        println!(
            "  Largest expense: {} {} ({}, {})",
            format_amount(largest.amount),
            largest.description.as_deref().unwrap_or(""),
            largest.category_id,
            largest.occurred_at
        );
    }
    if let Some(ref frequent) = summary.most_frequent_category {
        println!(
            "  Most frequent:   {} ({} txns)",
            display_name(&frequent.category_id),
            frequent.count
        );
    }
}

fn print_categories(breakdown: &[CategoryBreakdown]) {
    println!();
    println!("By Category");
    println!("{}", "─".repeat(60));
    if breakdown.is_empty() {
        println!("  No transactions");
        return;
    }
    for cat in breakdown {
        println!(
            "  {:<26} {:>14} {:>6} {:>8}",
            truncate(&cat.category_name, 26),
            format_amount(cat.total_amount),
            cat.transaction_count,
            format_percent(cat.percentage)
        );
        for sub in &cat.subcategories {
            println!(
                "    {:<24} {:>14} {:>6} {:>8}",
                truncate(&display_name(&sub.subcategory_id), 24),
                format_amount(sub.total_amount),
                sub.transaction_count,
                format_percent(sub.percentage)
            );
        }
    }
}

fn print_trends(trends: &[SpendingTrend], period: AnalyticsPeriod) {
    println!();
    println!("Trend ({period})");
    println!("{}", "─".repeat(40));
    if trends.is_empty() {
        println!("  No transactions");
        return;
    }
    for trend in trends {
        println!(
            "  {:<12} {:>14} {:>6}",
            trend.period,
            format_amount(trend.amount),
            trend.transaction_count
        );
    }
}

fn print_tags(tags: &[TagAnalytics]) {
    println!();
    println!("Top Tags");
    println!("{}", "─".repeat(60));
    if tags.is_empty() {
        println!("  No tagged transactions");
        return;
    }
    println!(
        "  {:<20} {:>14} {:>6} {:>14}",
        "Tag", "Total", "Count", "Average"
    );
    for tag in tags {
        println!(
            "  {:<20} {:>14} {:>6} {:>14}",
            truncate(&tag.tag, 20),
            format_amount(tag.total_amount),
            tag.transaction_count,
            format_amount(tag.avg_amount)
        );
    }
}

fn print_periods(periods: &[PeriodComparison], period: AnalyticsPeriod) {
    println!();
    println!("Income vs Expense ({period})");
    println!("{}", "─".repeat(68));
    if periods.is_empty() {
        println!("  No transactions");
        return;
    }
    println!(
        "  {:<12} {:>14} {:>14} {:>14} {:>6}",
        "Period", "Income", "Expense", "Net", "Count"
    );
    for p in periods {
        println!(
            "  {:<12} {:>14} {:>14} {:>14} {:>6}",
            p.period,
            format_amount(p.income),
            format_amount(p.expense),
            format_amount(p.net),
            p.transaction_count
        );
    }
}

fn print_transaction_table(transactions: &[Transaction]) {
    println!(
        "{:<32} {:<19} {:<7} {:<16} {:<12} {:>12} {:<3}  Description",
        "ID", "Date", "Type", "Category", "Subcategory", "Amount", "Cur"
    );
    println!("{}", "─".repeat(124));
    for txn in transactions {
        println!(
            "{:<32} {:<19} {:<7} {:<16} {:<12} {:>12} {:<3}  {}",
            txn.id,
            txn.occurred_at_str(),
            txn.kind,
            truncate(&txn.category_id, 16),
            truncate(&txn.subcategory_id, 12),
            format_amount(txn.amount),
            txn.currency,
            truncate(txn.description.as_deref().unwrap_or(""), 30)
        );
    }
}

// ── Parsing helpers ──────────────────────────────────────────

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_kind(s: &str) -> Result<TransactionKind> {
    TransactionKind::parse(s).with_context(|| {
        let expected: Vec<&str> = TransactionKind::all().iter().map(|k| k.as_str()).collect();
        format!("Unknown transaction type '{s}'. Expected {}", expected.join(" or "))
    })
}

fn parse_amount(s: &str) -> Result<Decimal> {
    let cleaned = s.trim().replace(['$', ','], "");
    Decimal::from_str(&cleaned).with_context(|| format!("Invalid amount '{s}'"))
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{s}'. Expected YYYY-MM-DD"))
}

fn parse_when(s: &str) -> Result<NaiveDateTime> {
    parse_datetime(s)
        .with_context(|| format!("Invalid date '{s}'. Expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS"))
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn now_local() -> NaiveDateTime {
    let now = chrono::Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
