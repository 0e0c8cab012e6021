use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::AppState;

pub fn render(f: &mut Frame, area: Rect, state: &AppState) {
    let title = state
        .pipeline
        .as_ref()
        .map(|p| p.full_name.clone().unwrap_or_else(|| p.name.clone()))
        .unwrap_or_default();

    let mut spans = vec![
        Span::styled(
            format!(" runrow v{} ", env!("CARGO_PKG_VERSION")),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("│ "),
        Span::styled(
            title,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
    ];

    let active = state.rows.iter().filter(|r| r.live_update()).count();
    if active > 0 {
        spans.push(Span::styled(
            format!(" [{active} active]"),
            Style::default().fg(Color::Yellow),
        ));
    }

    spans.push(Span::styled(
        format!(" {}", state.location.pathname),
        Style::default().fg(Color::DarkGray),
    ));

    if !state.row_errors.is_empty() || state.error_message().is_some() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            "!",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray)),
    );

    f.render_widget(header, area);
}
