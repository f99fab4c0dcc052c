use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Paragraph, Sparkline},
    Frame,
};
use rust_decimal::Decimal;

use crate::models::display_name;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{bar_value, format_amount, truncate};

const MAX_BARS: usize = 12;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Summary cards
            Constraint::Length(3), // Highlights
            Constraint::Min(8),    // Category chart
            Constraint::Length(4), // Trend sparkline
        ])
        .split(area);

    render_summary_cards(f, chunks[0], app);
    render_highlights(f, chunks[1], app);
    render_category_chart(f, chunks[2], app);
    render_trend_sparkline(f, chunks[3], app);
}

fn render_summary_cards(f: &mut Frame, area: Rect, app: &App) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    let summary = &app.overview.summary;
    let income_count = app.transactions.iter().filter(|t| t.is_income()).count();
    let expense_count = app.transactions.iter().filter(|t| t.is_expense()).count();

    render_card(
        f,
        cards[0],
        "Income",
        summary.total_income,
        theme::GREEN,
        format!("{income_count} txns"),
    );
    render_card(
        f,
        cards[1],
        "Expenses",
        summary.total_expense,
        theme::RED,
        format!("{expense_count} txns"),
    );
    render_card(
        f,
        cards[2],
        "Net",
        summary.net_income,
        theme::net_color(summary.net_income),
        app.filter_label(),
    );
    render_card(
        f,
        cards[3],
        "Avg Daily Spend",
        summary.avg_daily_expense,
        theme::YELLOW,
        "per day with spending".to_string(),
    );
}

fn render_card(
    f: &mut Frame,
    area: Rect,
    title: &str,
    amount: Decimal,
    color: Color,
    subtitle: String,
) {
    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            format_amount(amount),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            truncate(&subtitle, area.width.saturating_sub(2) as usize),
            theme::dim_style(),
        )),
    ])
    .centered()
    .block(theme::panel(title));

    f.render_widget(text, area);
}

fn render_highlights(f: &mut Frame, area: Rect, app: &App) {
    let summary = &app.overview.summary;
    let mut spans = Vec::new();

    match summary.largest_expense {
        Some(ref largest) => {
            spans.push(Span::styled(" Largest: ", theme::dim_style()));
            spans.push(Span::styled(
                format_amount(largest.amount),
                Style::default().fg(theme::RED).add_modifier(Modifier::BOLD),
            ));
            let label = largest
                .description
                .clone()
                .unwrap_or_else(|| display_name(&largest.category_id));
            let day = largest.occurred_at.get(..10).unwrap_or(&largest.occurred_at);
            spans.push(Span::styled(
                format!(" {} on {day}", truncate(&label, 30)),
                theme::normal_style(),
            ));
        }
        None => spans.push(Span::styled(" No expenses in range", theme::dim_style())),
    }

    if let Some(ref frequent) = summary.most_frequent_category {
        spans.push(Span::styled("   Most frequent: ", theme::dim_style()));
        spans.push(Span::styled(
            format!("{} ({})", display_name(&frequent.category_id), frequent.count),
            Style::default().fg(theme::ACCENT),
        ));
    }

    f.render_widget(
        Paragraph::new(Line::from(spans)).block(theme::panel("Highlights")),
        area,
    );
}

fn render_category_chart(f: &mut Frame, area: Rect, app: &App) {
    let breakdown = &app.overview.category_breakdown;
    if breakdown.is_empty() {
        super::render_empty(f, area, "By Category", "No transactions in range");
        return;
    }

    let bars: Vec<Bar> = breakdown
        .iter()
        .take(MAX_BARS)
        .map(|cat| {
            Bar::default()
                .value(bar_value(cat.total_amount))
                .text_value(format!("{}%", cat.percentage.normalize()))
                .label(Line::from(truncate(&cat.category_name, 10)))
                .style(Style::default().fg(theme::ACCENT))
                .value_style(
                    Style::default()
                        .fg(theme::HEADER_BG)
                        .bg(theme::ACCENT)
                        .add_modifier(Modifier::BOLD),
                )
        })
        .collect();

    let chart = BarChart::default()
        .block(theme::panel("By Category"))
        .data(BarGroup::default().bars(&bars))
        .bar_width(10)
        .bar_gap(1);

    f.render_widget(chart, area);
}

fn render_trend_sparkline(f: &mut Frame, area: Rect, app: &App) {
    let data: Vec<u64> = app
        .overview
        .spending_trends
        .iter()
        .map(|t| bar_value(t.amount))
        .collect();

    let title = match (
        app.overview.spending_trends.first(),
        app.overview.spending_trends.last(),
    ) {
        (Some(first), Some(last)) => format!(
            "Trend ({}) {} .. {}",
            app.query.period, first.period, last.period
        ),
        _ => format!("Trend ({})", app.query.period),
    };

    let sparkline = Sparkline::default()
        .block(theme::panel(&title))
        .data(&data)
        .style(Style::default().fg(theme::YELLOW));

    f.render_widget(sparkline, area);
}
