use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::Span,
    widgets::{Cell, Row, Sparkline, Table},
    Frame,
};

use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{bar_value, format_amount};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let periods = &app.overview.period_comparison;
    if periods.is_empty() {
        super::render_empty(f, area, "Trends", "No transactions in range");
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(4)])
        .split(area);

    let header = Row::new(
        ["Period", "Income", "Expense", "Net", "Txns"]
            .iter()
            .map(|h| Cell::from(*h).style(theme::header_style())),
    )
    .height(1);

    let rows: Vec<Row> = periods
        .iter()
        .enumerate()
        .skip(app.scroll)
        .take(chunks[0].height.saturating_sub(3) as usize)
        .map(|(i, p)| {
            let style = if i == app.index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            Row::new(vec![
                Cell::from(p.period.clone()),
                Cell::from(Span::styled(
                    format_amount(p.income),
                    Style::default().fg(theme::GREEN),
                )),
                Cell::from(Span::styled(
                    format_amount(p.expense),
                    Style::default().fg(theme::RED),
                )),
                Cell::from(Span::styled(
                    format_amount(p.net),
                    Style::default().fg(theme::net_color(p.net)),
                )),
                Cell::from(p.transaction_count.to_string()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Length(16),
        Constraint::Length(16),
        Constraint::Length(16),
        Constraint::Length(6),
    ];

    let title = format!("Income vs Expense ({})", app.query.period);
    let table = Table::new(rows, widths)
        .header(header)
        .block(theme::panel(&title))
        .column_spacing(2);
    f.render_widget(table, chunks[0]);

    let expenses: Vec<u64> = periods.iter().map(|p| bar_value(p.expense)).collect();
    let sparkline = Sparkline::default()
        .block(theme::panel("Expense per period"))
        .data(&expenses)
        .style(Style::default().fg(theme::RED));
    f.render_widget(sparkline, chunks[1]);
}
