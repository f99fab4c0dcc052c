pub(crate) mod categories;
pub(crate) mod overview;
pub(crate) mod tags;
pub(crate) mod transactions;
pub(crate) mod trends;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::theme;

/// Placeholder panel for a view with nothing in it.
pub(crate) fn render_empty(f: &mut Frame, area: Rect, title: &str, message: &str) {
    let msg = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), theme::dim_style())),
        Line::from(""),
        Line::from(Span::styled(
            "Add transactions with `fintrack add` or `fintrack import`, or widen the filters with :clear",
            theme::dim_style(),
        )),
    ];
    f.render_widget(
        Paragraph::new(msg).centered().block(theme::panel(title)),
        area,
    );
}
