use crate::app::AppState;
use crate::model::{RunResult, RunState};
use crate::row::RowDescriptor;
use crate::status::CanonicalStatus;
use chrono::{DateTime, Utc};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

const BRAILLE_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
const DATE_FORMAT: &str = "%b %d %-I:%M%P";

pub fn render(f: &mut Frame, area: Rect, state: &AppState) {
    let narrow = area.width < crate::app::NARROW_WIDTH_THRESHOLD;
    let inner_width = area.width.saturating_sub(2) as usize;

    if state.rows.is_empty() && state.row_errors.is_empty() {
        let msg = if state.pipeline.is_some() {
            "No runs for this pipeline"
        } else {
            "Nothing loaded"
        };
        let para = Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::NONE));
        f.render_widget(para, area);
        return;
    }

    let visible_height = area.height as usize;
    let scroll_offset = if state.cursor >= visible_height {
        state.cursor - visible_height + 1
    } else {
        0
    };

    let mut lines: Vec<Line> = state
        .rows
        .iter()
        .enumerate()
        .skip(scroll_offset)
        .take(visible_height)
        .map(|(i, row)| render_row_line(row, i == state.cursor, state.spinner_frame, narrow, inner_width))
        .collect();

    for (run_id, err) in &state.row_errors {
        if lines.len() >= visible_height {
            break;
        }
        lines.push(Line::from(Span::styled(
            truncate(&format!("  ! #{run_id} {err}"), inner_width),
            Style::default().fg(Color::Red),
        )));
    }

    let table = Paragraph::new(lines).block(Block::default().borders(Borders::NONE));
    f.render_widget(table, area);
}

pub fn status_icon(status: &CanonicalStatus, spinner_frame: usize) -> (String, Color) {
    match status {
        CanonicalStatus::Result(RunResult::Success) => ("✓".to_string(), Color::Green),
        CanonicalStatus::Result(RunResult::Failure) => ("✗".to_string(), Color::Red),
        CanonicalStatus::Result(RunResult::Unstable) => ("!".to_string(), Color::Yellow),
        CanonicalStatus::Result(RunResult::Aborted) => ("⊘".to_string(), Color::DarkGray),
        CanonicalStatus::State(RunState::Running) => (
            BRAILLE_FRAMES[spinner_frame % BRAILLE_FRAMES.len()].to_string(),
            Color::Yellow,
        ),
        CanonicalStatus::State(RunState::Paused) => ("‖".to_string(), Color::Yellow),
        CanonicalStatus::State(RunState::Queued) => ("◌".to_string(), Color::DarkGray),
        _ => ("·".to_string(), Color::DarkGray),
    }
}

pub fn format_duration(millis: Option<i64>) -> String {
    let Some(millis) = millis else {
        return "-".to_string();
    };
    let secs = millis.max(0) / 1000;
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

pub fn format_end(end: Option<DateTime<Utc>>) -> String {
    end.map_or_else(|| "-".to_string(), |t| t.format(DATE_FORMAT).to_string())
}

fn truncate(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        s.to_string()
    } else {
        let mut result = String::new();
        let mut width = 0;
        for c in s.chars() {
            let cw = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
            if width + cw + 1 > max_width {
                result.push('…');
                break;
            }
            result.push(c);
            width += cw;
        }
        result
    }
}

fn render_row_line(
    row: &RowDescriptor,
    is_selected: bool,
    spinner_frame: usize,
    narrow: bool,
    max_width: usize,
) -> Line<'static> {
    let (icon, icon_color) = status_icon(&row.status.canonical, spinner_frame);
    let label = format!("#{}", row.label);
    let duration = match row.progress_percent() {
        Some(percent) => format!("{} {percent}%", format_duration(row.times.duration_in_millis)),
        None => format_duration(row.times.duration_in_millis),
    };
    let end = if narrow {
        String::new()
    } else {
        format_end(row.times.end_time)
    };
    let commit = row.commit.clone().unwrap_or_default();
    let branch = row.branch.clone().unwrap_or_default();

    let prefix_width = 1 + UnicodeWidthStr::width(icon.as_str()) + 1 + label.len() + 1;
    let mut suffix_width = duration.len() + 1;
    if !narrow {
        suffix_width += commit.len() + 1 + UnicodeWidthStr::width(branch.as_str()) + 1 + end.len() + 1;
    }
    let message_max = max_width.saturating_sub(prefix_width + suffix_width + 1);
    let message = truncate(row.message.as_deref().unwrap_or(""), message_max);

    let select_style = if is_selected {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };
    let duration_style = if row.live_update() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let mut spans = vec![
        Span::styled(format!(" {icon} "), Style::default().fg(icon_color)),
        Span::styled(format!("{label} "), Style::default().fg(Color::DarkGray)),
    ];
    if !narrow {
        if !commit.is_empty() {
            spans.push(Span::styled(format!("{commit} "), Style::default().fg(Color::Magenta)));
        }
        if !branch.is_empty() {
            spans.push(Span::styled(format!("{branch} "), Style::default().fg(Color::Blue)));
        }
    }
    spans.push(Span::styled(message, select_style));
    spans.push(Span::styled(format!(" {duration}"), duration_style));
    if !narrow {
        spans.push(Span::styled(format!(" {end}"), Style::default().fg(Color::DarkGray)));
    }

    Line::from(spans)
}
