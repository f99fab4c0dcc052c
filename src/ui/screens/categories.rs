use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Cell, Row, Table},
    Frame,
};

use crate::models::display_name;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, format_percent, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let breakdown = &app.overview.category_breakdown;
    if breakdown.is_empty() {
        super::render_empty(f, area, "Categories (0)", "No transactions in range");
        return;
    }

    let header = Row::new(
        ["Category", "Amount", "Txns", "Share"]
            .iter()
            .map(|h| Cell::from(*h).style(theme::header_style())),
    )
    .height(1);

    // Categories with their subcategories indented underneath, one flat list
    // so the cursor can walk both levels.
    let mut lines = Vec::new();
    for cat in breakdown {
        lines.push((
            true,
            cat.category_name.clone(),
            cat.total_amount,
            cat.transaction_count,
            cat.percentage,
        ));
        for sub in &cat.subcategories {
            lines.push((
                false,
                format!("  └ {}", display_name(&sub.subcategory_id)),
                sub.total_amount,
                sub.transaction_count,
                sub.percentage,
            ));
        }
    }

    let rows: Vec<Row> = lines
        .into_iter()
        .enumerate()
        .skip(app.scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, (is_category, name, amount, count, share))| {
            let style = if i == app.index {
                theme::selected_style()
            } else if is_category {
                Style::default()
                    .fg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD)
            } else {
                theme::normal_style()
            };
            Row::new(vec![
                Cell::from(truncate(&name, 32)),
                Cell::from(format_amount(amount)),
                Cell::from(count.to_string()),
                Cell::from(format_percent(share)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Min(20),
        Constraint::Length(16),
        Constraint::Length(6),
        Constraint::Length(9),
    ];

    let title = format!("Categories ({}) · share of category total", breakdown.len());
    let table = Table::new(rows, widths)
        .header(header)
        .block(theme::panel(&title))
        .column_spacing(2);

    f.render_widget(table, area);
}
