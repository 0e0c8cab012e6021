use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::AppState;

pub fn render(f: &mut Frame, area: Rect, state: &AppState) {
    let narrow = area.width < crate::app::NARROW_WIDTH_THRESHOLD;
    let stop_available = state.current_row().is_some_and(|r| r.stop_enabled());

    let mut hints: Vec<(&str, &str)> = if narrow {
        vec![("j/k", "nav"), ("⏎", "open"), ("R", "replay")]
    } else {
        vec![
            ("↑↓/jk", "navigate"),
            ("Enter", "details"),
            ("c/t/a", "tabs"),
            ("o", "browser"),
            ("R", "replay"),
        ]
    };
    if stop_available {
        hints.push(("s", "stop"));
    }
    hints.extend([("r", "reload"), ("q", "quit")]);

    let line = if let Some(msg) = state.status_message() {
        Line::from(vec![Span::styled(
            msg.to_string(),
            Style::default().fg(Color::Yellow),
        )])
    } else {
        let mut spans: Vec<Span> = Vec::new();
        for (i, (key, desc)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(*key, Style::default().fg(Color::Cyan)));
            spans.push(Span::styled(
                format!(" {desc}"),
                Style::default().fg(Color::DarkGray),
            ));
        }
        Line::from(spans)
    };

    let footer = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(footer, area);
}
