use crate::url::DetailTab;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    Quit,
    DismissError,
    MoveUp,
    MoveDown,
    OpenTab(DetailTab),
    OpenBrowser,
    Stop,
    Replay,
    Reload,
    None,
}

/// Captures the UI state needed to interpret a key press.
#[derive(Debug, Clone, Default)]
pub struct InputContext {
    pub has_error: bool,
    pub is_loading: bool,
}

pub fn map_key(key: KeyEvent, ctx: &InputContext) -> Action {
    if key.kind != KeyEventKind::Press {
        return Action::None;
    }

    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Esc => {
            if ctx.has_error {
                Action::DismissError
            } else {
                Action::Quit
            }
        }
        KeyCode::Up | KeyCode::Char('k') => Action::MoveUp,
        KeyCode::Down | KeyCode::Char('j') => Action::MoveDown,
        KeyCode::Enter | KeyCode::Char('l') => Action::OpenTab(DetailTab::Pipeline),
        KeyCode::Char('c') => Action::OpenTab(DetailTab::Changes),
        KeyCode::Char('t') => Action::OpenTab(DetailTab::Tests),
        KeyCode::Char('a') => Action::OpenTab(DetailTab::Artifacts),
        KeyCode::Char('o') => Action::OpenBrowser,
        KeyCode::Char('s') => Action::Stop,
        KeyCode::Char('R') => Action::Replay,
        KeyCode::Char('r') if !ctx.is_loading => Action::Reload,
        _ => Action::None,
    }
}
