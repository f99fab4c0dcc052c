use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::NaiveDate;

use super::app::{App, Screen};
use crate::db::Database;
use crate::models::{AnalyticsPeriod, TransactionKind};

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &Database) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit fintrack", cmd_quit, r);
    register_command!("quit", "Quit fintrack", cmd_quit, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!(
        "from",
        "Set start date (e.g. :from 2024-01-01, empty clears)",
        cmd_from,
        r
    );
    register_command!(
        "to",
        "Set end date, inclusive (e.g. :to 2024-12-31)",
        cmd_to,
        r
    );
    register_command!(
        "period",
        "Set bucket size (daily, weekly, monthly, yearly)",
        cmd_period,
        r
    );
    register_command!(
        "type",
        "Filter by type (income, expense, all)",
        cmd_type,
        r
    );
    register_command!(
        "category",
        "Filter by category id (e.g. :category food_dining)",
        cmd_category,
        r
    );
    register_command!(
        "cat",
        "Filter by category id (e.g. :category food_dining)",
        cmd_category,
        r
    );
    register_command!("clear", "Clear date, type and category filters", cmd_clear, r);
    register_command!("refresh", "Reload transactions", cmd_refresh, r);
    register_command!("overview", "Go to Overview", cmd_overview, r);
    register_command!("o", "Go to Overview", cmd_overview, r);
    register_command!("categories", "Go to Categories", cmd_categories, r);
    register_command!("trends", "Go to Trends", cmd_trends, r);
    register_command!("tags", "Go to Tags", cmd_tags, r);
    register_command!("transactions", "Go to Transactions", cmd_transactions, r);
    register_command!("t", "Go to Transactions", cmd_transactions, r);

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if cmd_name.is_empty() {
        return Ok(());
    }

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        (cmd.run)(args, app, db)?;
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1)
        .min_by_key(|k| (levenshtein(input, k), **k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// `None` for an empty argument, which clears the bound.
fn parse_bound(args: &str) -> Result<Option<NaiveDate>, String> {
    if args.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(args, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("Invalid date '{args}'. Use YYYY-MM-DD"))
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _db: &Database) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _db: &Database) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_from(args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    let start = match parse_bound(args) {
        Ok(start) => start,
        Err(msg) => {
            app.set_status(msg);
            return Ok(());
        }
    };
    if let (Some(start), Some(end)) = (start, app.query.end_date) {
        if start > end {
            app.set_status(format!("Start {start} is after end {end}"));
            return Ok(());
        }
    }
    app.query.start_date = start;
    app.refresh(db)?;
    app.set_status(match start {
        Some(d) => format!("From {d}"),
        None => "Start date cleared".to_string(),
    });
    Ok(())
}

fn cmd_to(args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    let end = match parse_bound(args) {
        Ok(end) => end,
        Err(msg) => {
            app.set_status(msg);
            return Ok(());
        }
    };
    if let (Some(start), Some(end)) = (app.query.start_date, end) {
        if start > end {
            app.set_status(format!("End {end} is before start {start}"));
            return Ok(());
        }
    }
    app.query.end_date = end;
    app.refresh(db)?;
    app.set_status(match end {
        Some(d) => format!("To {d} (inclusive)"),
        None => "End date cleared".to_string(),
    });
    Ok(())
}

fn cmd_period(args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    if args.is_empty() {
        return app.cycle_period(db);
    }
    app.query.period = AnalyticsPeriod::parse(args);
    app.refresh(db)?;
    app.set_status(format!("Period: {}", app.query.period));
    Ok(())
}

fn cmd_type(args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    let kind = match args.to_lowercase().as_str() {
        "" | "all" => None,
        other => match TransactionKind::parse(other) {
            Some(kind) => Some(kind),
            None => {
                app.set_status(format!("Unknown type '{args}'. Use income, expense or all"));
                return Ok(());
            }
        },
    };
    app.query.kind = kind;
    app.refresh(db)?;
    app.set_status(format!("Type: {}", kind.map_or("all", |k| k.as_str())));
    Ok(())
}

fn cmd_category(args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    let id = args.to_lowercase();
    if id.is_empty() || id == "all" {
        app.query.category_id = None;
        app.refresh(db)?;
        app.set_status("Category filter cleared");
        return Ok(());
    }

    let Some(category) = db.taxonomy().category(&id) else {
        app.set_status(format!("Unknown category '{id}'"));
        return Ok(());
    };
    let name = category.name.clone();
    let subcategories = db.taxonomy().subcategories_of(&id).count();
    app.query.category_id = Some(id);
    app.refresh(db)?;
    app.set_status(format!("Category: {name} ({subcategories} subcategories)"));
    Ok(())
}

fn cmd_clear(_args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    app.query.start_date = None;
    app.query.end_date = None;
    app.query.kind = None;
    app.query.category_id = None;
    app.refresh(db)?;
    app.set_status("Filters cleared");
    Ok(())
}

fn cmd_refresh(_args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    app.refresh(db)?;
    app.set_status(format!("Loaded {} transactions", app.transactions.len()));
    Ok(())
}

fn cmd_overview(_args: &str, app: &mut App, _db: &Database) -> anyhow::Result<()> {
    app.switch_screen(Screen::Overview);
    Ok(())
}

fn cmd_categories(_args: &str, app: &mut App, _db: &Database) -> anyhow::Result<()> {
    app.switch_screen(Screen::Categories);
    Ok(())
}

fn cmd_trends(_args: &str, app: &mut App, _db: &Database) -> anyhow::Result<()> {
    app.switch_screen(Screen::Trends);
    Ok(())
}

fn cmd_tags(_args: &str, app: &mut App, _db: &Database) -> anyhow::Result<()> {
    app.switch_screen(Screen::Tags);
    Ok(())
}

fn cmd_transactions(_args: &str, app: &mut App, _db: &Database) -> anyhow::Result<()> {
    app.switch_screen(Screen::Transactions);
    Ok(())
}
