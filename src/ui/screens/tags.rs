use ratatui::{
    layout::{Constraint, Rect},
    widgets::{Cell, Row, Table},
    Frame,
};

use crate::analytics::TOP_TAGS_LIMIT;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let tags = &app.overview.top_tags;
    if tags.is_empty() {
        super::render_empty(f, area, "Tags (0)", "No tagged transactions in range");
        return;
    }

    let header = Row::new(
        ["#", "Tag", "Total", "Txns", "Average"]
            .iter()
            .map(|h| Cell::from(*h).style(theme::header_style())),
    )
    .height(1);

    let rows: Vec<Row> = tags
        .iter()
        .enumerate()
        .skip(app.scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, tag)| {
            let style = if i == app.index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            Row::new(vec![
                Cell::from(format!("{}", i + 1)),
                Cell::from(truncate(&tag.tag, 30)),
                Cell::from(format_amount(tag.total_amount)),
                Cell::from(tag.transaction_count.to_string()),
                Cell::from(format_amount(tag.avg_amount)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Min(16),
        Constraint::Length(16),
        Constraint::Length(6),
        Constraint::Length(16),
    ];

    let title = format!("Top Tags ({} of max {TOP_TAGS_LIMIT})", tags.len());
    let table = Table::new(rows, widths)
        .header(header)
        .block(theme::panel(&title))
        .column_spacing(2);

    f.render_widget(table, area);
}
