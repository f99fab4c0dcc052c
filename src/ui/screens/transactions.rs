use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::Span,
    widgets::{Cell, Row, Table},
    Frame,
};

use crate::models::display_name;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    if app.transactions.is_empty() {
        super::render_empty(f, area, "Transactions (0)", "No transactions in range");
        return;
    }

    let header = Row::new(
        ["Date", "Description", "Category", "Tags", "Amount"]
            .iter()
            .map(|h| Cell::from(*h).style(theme::header_style())),
    )
    .height(1);

    let rows: Vec<Row> = app
        .transactions
        .iter()
        .enumerate()
        .skip(app.scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, txn)| {
            let style = if i == app.index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            let sign = if txn.is_income() { "+" } else { "-" };
            let category = format!(
                "{} / {}",
                display_name(&txn.category_id),
                display_name(&txn.subcategory_id)
            );

            Row::new(vec![
                Cell::from(txn.occurred_at.format("%Y-%m-%d %H:%M").to_string()),
                Cell::from(truncate(txn.description.as_deref().unwrap_or(""), 40)),
                Cell::from(truncate(&category, 28)),
                Cell::from(truncate(&txn.tags.join(", "), 20)),
                Cell::from(Span::styled(
                    format!("{sign}{}", format_amount(txn.amount)),
                    Style::default().fg(theme::kind_color(txn.kind)),
                )),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(16),
        Constraint::Min(20),
        Constraint::Length(28),
        Constraint::Length(20),
        Constraint::Length(14),
    ];

    let title = format!("Transactions ({}) · newest first", app.transactions.len());
    let table = Table::new(rows, widths)
        .header(header)
        .block(theme::panel(&title));

    f.render_widget(table, area);
}
