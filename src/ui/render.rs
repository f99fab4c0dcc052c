use std::collections::BTreeMap;

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use super::app::{App, InputMode, Screen};
use super::commands;
use super::screens;
use super::theme;

/// Rows taken by chrome around a screen's list: tab bar, status bar, command
/// bar, panel borders and the table header.
pub(crate) const CHROME_ROWS: u16 = 6;

const KEY_HELP: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("j/k, Up/Down", "Move cursor"),
            ("g/G", "Top / bottom"),
            ("Ctrl-d/u", "Half page down / up"),
            ("1-5", "Jump to screen"),
            ("Tab/Shift-Tab", "Next / previous screen"),
            ("Ctrl-q", "Quit"),
        ],
    ),
    (
        "Filters",
        &[
            ("p", "Cycle period"),
            ("t", "Cycle type (all, expense, income)"),
            ("r", "Reload"),
            ("Esc", "Clear message"),
        ],
    ),
];

const STATUS_HINT: &str = " p period | t type | ? help ";

pub(crate) fn render(f: &mut Frame, app: &App) {
    let [tabs, content, status, command] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(5),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(f.area());

    render_tab_bar(f, tabs, app);
    match app.screen {
        Screen::Overview => screens::overview::render(f, content, app),
        Screen::Categories => screens::categories::render(f, content, app),
        Screen::Trends => screens::trends::render(f, content, app),
        Screen::Tags => screens::tags::render(f, content, app),
        Screen::Transactions => screens::transactions::render(f, content, app),
    }
    render_status_bar(f, status, app);
    render_command_bar(f, command, app);

    if app.show_help {
        render_help_overlay(f, f.area());
    }
}

fn render_tab_bar(f: &mut Frame, area: Rect, app: &App) {
    let dim = Style::default().fg(theme::TEXT_DIM);
    let active = Style::default()
        .fg(theme::ACCENT)
        .add_modifier(Modifier::BOLD);

    let titles: Vec<Line> = Screen::all()
        .iter()
        .enumerate()
        .map(|(i, &screen)| {
            let label = if screen == app.screen { active } else { dim };
            Line::from(vec![
                Span::styled(format!("{}:", i + 1), dim),
                Span::styled(screen.to_string(), label),
            ])
        })
        .collect();
    let selected = Screen::all()
        .iter()
        .position(|&s| s == app.screen)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .highlight_style(Style::default())
        .divider(Span::styled(" | ", Style::default().fg(theme::OVERLAY)))
        .style(Style::default().bg(theme::HEADER_BG));
    f.render_widget(tabs, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mode = format!(" {} ", app.input_mode);
    let mode_bg = match app.input_mode {
        InputMode::Normal => theme::ACCENT,
        InputMode::Command => theme::GREEN,
    };

    let [mode_area, info_area, hint_area] = Layout::horizontal([
        Constraint::Length(mode.chars().count() as u16),
        Constraint::Min(0),
        Constraint::Length(STATUS_HINT.len() as u16),
    ])
    .areas(area);

    f.render_widget(
        Paragraph::new(mode).style(
            Style::default()
                .fg(theme::HEADER_BG)
                .bg(mode_bg)
                .add_modifier(Modifier::BOLD),
        ),
        mode_area,
    );

    let info = format!(
        " {} | {} of {} txns | {}",
        app.owner_name,
        app.transactions.len(),
        app.total_count,
        app.filter_label()
    );
    f.render_widget(
        Paragraph::new(info).style(theme::status_bar_style()),
        info_area,
    );
    f.render_widget(
        Paragraph::new(STATUS_HINT).style(theme::status_bar_style()),
        hint_area,
    );
}

fn render_command_bar(f: &mut Frame, area: Rect, app: &App) {
    let line = match app.input_mode {
        InputMode::Command => {
            let cursor_x = area.x + 1 + app.command_input.chars().count() as u16;
            f.set_cursor_position((cursor_x.min(area.right().saturating_sub(1)), area.y));
            Line::from(vec![
                Span::styled(":", Style::default().fg(theme::ACCENT)),
                Span::styled(app.command_input.as_str(), theme::command_bar_style()),
            ])
        }
        InputMode::Normal if app.status_message.is_empty() => Line::from(Span::styled(
            " Press : for commands, ? for help",
            theme::dim_style(),
        )),
        InputMode::Normal => Line::from(Span::styled(
            app.status_message.as_str(),
            theme::command_bar_style(),
        )),
    };

    f.render_widget(
        Paragraph::new(line).style(Style::default().bg(theme::COMMAND_BG)),
        area,
    );
}

/// One entry per command, under its longest alias.
fn command_help() -> Vec<(&'static str, &'static str)> {
    let mut by_description: BTreeMap<&str, &str> = BTreeMap::new();
    for (&name, cmd) in commands::COMMANDS.iter() {
        let entry = by_description.entry(cmd.description).or_insert(name);
        if name.len() > entry.len() {
            *entry = name;
        }
    }
    let mut lines: Vec<(&str, &str)> = by_description
        .into_iter()
        .map(|(description, name)| (name, description))
        .collect();
    lines.sort_unstable();
    lines
}

fn render_help_overlay(f: &mut Frame, area: Rect) {
    let mut lines = vec![Line::from("")];
    for (section, keys) in KEY_HELP {
        lines.push(Line::from(Span::styled(format!(" {section}"), theme::section_style())));
        for (key, action) in keys.iter() {
            lines.push(Line::from(vec![
                Span::styled(format!("  {key:<16}"), Style::default().fg(theme::ACCENT)),
                Span::styled(*action, theme::normal_style()),
            ]));
        }
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(" Commands", theme::section_style())));
    for (name, description) in command_help() {
        lines.push(Line::from(vec![
            Span::styled(format!("  :{name:<15}"), Style::default().fg(theme::ACCENT)),
            Span::styled(description, theme::normal_style()),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" Press any key to close", theme::dim_style())));

    let height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));
    let width = 76.min(area.width.saturating_sub(4));
    let popup = centered(area, width, height);

    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title(" fintrack help ")
                .title_style(theme::section_style())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme::ACCENT))
                .style(Style::default().bg(theme::HEADER_BG)),
        ),
        popup,
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    )
}
