use anyhow::Result;

use crate::analytics;
use crate::db::Database;
use crate::models::*;

use super::util::{scroll_down, scroll_to_bottom, scroll_to_top, scroll_up};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Overview,
    Categories,
    Trends,
    Tags,
    Transactions,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[
            Self::Overview,
            Self::Categories,
            Self::Trends,
            Self::Tags,
            Self::Transactions,
        ]
    }

    pub(crate) fn next(&self) -> Self {
        let screens = Self::all();
        let idx = screens.iter().position(|s| s == self).unwrap_or(0);
        screens[(idx + 1) % screens.len()]
    }

    pub(crate) fn prev(&self) -> Self {
        let screens = Self::all();
        let idx = screens.iter().position(|s| s == self).unwrap_or(0);
        screens[(idx + screens.len() - 1) % screens.len()]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overview => write!(f, "Overview"),
            Self::Categories => write!(f, "Categories"),
            Self::Trends => write!(f, "Trends"),
            Self::Tags => write!(f, "Tags"),
            Self::Transactions => write!(f, "Transactions"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
        }
    }
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,
    pub(crate) visible_rows: usize,

    pub(crate) owner_id: i64,
    pub(crate) owner_name: String,

    /// Filters and bucket size every screen is computed from.
    pub(crate) query: AnalyticsQuery,
    pub(crate) overview: AnalyticsOverview,
    /// Rows in scope, newest first.
    pub(crate) transactions: Vec<Transaction>,
    /// Live transactions the owner has, ignoring filters.
    pub(crate) total_count: i64,

    // Cursor for whichever list the current screen shows
    pub(crate) index: usize,
    pub(crate) scroll: usize,
}

impl App {
    pub(crate) fn new(owner_id: i64, owner_name: impl Into<String>) -> Self {
        Self {
            running: true,
            screen: Screen::Overview,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            status_message: String::new(),
            show_help: false,
            visible_rows: 20,
            owner_id,
            owner_name: owner_name.into(),
            query: AnalyticsQuery::default(),
            overview: AnalyticsOverview::default(),
            transactions: Vec::new(),
            total_count: 0,
            index: 0,
            scroll: 0,
        }
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    /// Reload the rows for the current query and recompute every view.
    pub(crate) fn refresh(&mut self, db: &Database) -> Result<()> {
        let rows = db.get_filtered_transactions(self.owner_id, &self.query)?;
        self.overview = analytics::overview(&rows, &self.query);
        self.transactions = rows;
        self.transactions.reverse();
        self.total_count = db.transaction_count(self.owner_id)?;
        self.clamp_cursor();
        tracing::debug!(
            owner_id = self.owner_id,
            rows = self.transactions.len(),
            period = %self.query.period,
            "refreshed dashboard"
        );
        Ok(())
    }

    pub(crate) fn switch_screen(&mut self, screen: Screen) {
        self.screen = screen;
        scroll_to_top(&mut self.index, &mut self.scroll);
    }

    pub(crate) fn cycle_period(&mut self, db: &Database) -> Result<()> {
        self.query.period = self.query.period.next();
        self.refresh(db)?;
        self.set_status(format!("Period: {}", self.query.period));
        Ok(())
    }

    /// all → expense → income → all
    pub(crate) fn cycle_kind(&mut self, db: &Database) -> Result<()> {
        self.query.kind = match self.query.kind {
            None => Some(TransactionKind::Expense),
            Some(TransactionKind::Expense) => Some(TransactionKind::Income),
            Some(TransactionKind::Income) => None,
        };
        self.refresh(db)?;
        let label = self.query.kind.map_or("all", |k| k.as_str());
        self.set_status(format!("Type: {label}"));
        Ok(())
    }

    /// Number of rows in the list the current screen shows.
    pub(crate) fn row_count(&self) -> usize {
        match self.screen {
            Screen::Overview => 0,
            Screen::Categories => self
                .overview
                .category_breakdown
                .iter()
                .map(|c| 1 + c.subcategories.len())
                .sum(),
            Screen::Trends => self.overview.period_comparison.len(),
            Screen::Tags => self.overview.top_tags.len(),
            Screen::Transactions => self.transactions.len(),
        }
    }

    pub(crate) fn move_down(&mut self) {
        let len = self.row_count();
        scroll_down(&mut self.index, &mut self.scroll, len, self.visible_rows.max(1));
    }

    pub(crate) fn move_up(&mut self) {
        scroll_up(&mut self.index, &mut self.scroll);
    }

    pub(crate) fn goto_top(&mut self) {
        scroll_to_top(&mut self.index, &mut self.scroll);
    }

    pub(crate) fn goto_bottom(&mut self) {
        let len = self.row_count();
        scroll_to_bottom(&mut self.index, &mut self.scroll, len, self.visible_rows.max(1));
    }

    fn clamp_cursor(&mut self) {
        let len = self.row_count();
        if self.index >= len {
            self.index = len.saturating_sub(1);
        }
        if self.scroll > self.index {
            self.scroll = self.index;
        }
    }

    /// One-line description of the active filters for the status bar.
    pub(crate) fn filter_label(&self) -> String {
        let range = match (self.query.start_date, self.query.end_date) {
            (None, None) => "all time".to_string(),
            (Some(start), None) => format!("from {start}"),
            (None, Some(end)) => format!("until {end}"),
            (Some(start), Some(end)) => format!("{start}..{end}"),
        };
        let kind = self.query.kind.map_or("all", |k| k.as_str());
        let mut label = format!("{range} | {} | {kind}", self.query.period);
        if let Some(ref category) = self.query.category_id {
            label.push_str(&format!(" | {category}"));
        }
        label
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
