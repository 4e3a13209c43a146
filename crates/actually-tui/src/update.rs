//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::layout::{Position, Rect};
use tokio_util::sync::CancellationToken;

use crate::common::TaskId;
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::render::{self, Areas};
use crate::response::ResponseView;
use crate::state::{AppState, Focus, Status, Viewport};

/// Rows moved per mouse wheel notch.
const WHEEL_STEP: usize = 3;

/// The main reducer function.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            if app.is_waiting() {
                app.spinner_frame = app.spinner_frame.wrapping_add(1);
            }
            vec![]
        }
        UiEvent::Frame { width, height } => {
            app.viewport = Viewport { width, height };
            clamp_scroll(app);
            vec![]
        }
        UiEvent::Terminal(event) => handle_terminal_event(app, event),
        UiEvent::CompletionFinished { task, result } => handle_completion(app, task, result),
        UiEvent::CopyResetElapsed { block, generation } => {
            if let Some(response) = app.response.as_mut() {
                response.on_reset_elapsed(block, generation);
            }
            vec![]
        }
    }
}

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(app, &key),
        Event::Paste(text) => {
            match app.focus {
                Focus::Credential => app.credential.insert_str(&text),
                Focus::Prompt => app.prompt.insert_str(&text),
                _ => {}
            }
            vec![]
        }
        Event::Mouse(mouse) => handle_mouse(app, mouse),
        _ => vec![],
    }
}

fn handle_key(app: &mut AppState, key: &KeyEvent) -> Vec<UiEffect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c' | 'q') if ctrl => {
            app.should_quit = true;
            return cancel_request(app, None);
        }
        KeyCode::Esc => return cancel_request(app, Some("Request cancelled")),
        KeyCode::Tab => {
            app.focus = app.focus.next();
            return vec![];
        }
        KeyCode::BackTab => {
            app.focus = app.focus.prev();
            return vec![];
        }
        _ => {}
    }

    match app.focus {
        Focus::Credential => {
            if key.code == KeyCode::Enter {
                return save_credential(app);
            }
            app.credential.handle_key(key);
            vec![]
        }
        Focus::Prompt => {
            if key.code == KeyCode::Enter {
                return submit(app);
            }
            app.prompt.handle_key(key);
            vec![]
        }
        Focus::ShowCredential => match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => toggle_show_credential(app),
            _ => vec![],
        },
        Focus::SaveCredential => match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => save_credential(app),
            _ => vec![],
        },
        Focus::Submit => match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => submit(app),
            _ => vec![],
        },
        Focus::Result => handle_result_key(app, key),
    }
}

fn handle_result_key(app: &mut AppState, key: &KeyEvent) -> Vec<UiEffect> {
    let page = usize::from(render::viewport_areas(app).result_body().height).max(1);
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => scroll_by(app, -1),
        KeyCode::Down | KeyCode::Char('j') => scroll_by(app, 1),
        KeyCode::PageUp => scroll_by(app, -signed(page)),
        KeyCode::PageDown => scroll_by(app, signed(page)),
        KeyCode::Home | KeyCode::Char('g') => app.scroll = 0,
        KeyCode::End | KeyCode::Char('G') => {
            app.scroll = usize::MAX;
            clamp_scroll(app);
        }
        KeyCode::Char(']') | KeyCode::Right => select_block(app, ResponseView::select_next),
        KeyCode::Char('[') | KeyCode::Left => select_block(app, ResponseView::select_prev),
        KeyCode::Char('c' | 'y') | KeyCode::Enter => {
            let selected = app.response.as_ref().and_then(|r| r.selected);
            if let Some(index) = selected {
                return copy_block(app, index);
            }
        }
        _ => {}
    }
    vec![]
}

fn handle_mouse(app: &mut AppState, mouse: MouseEvent) -> Vec<UiEffect> {
    let areas = render::viewport_areas(app);
    let at = Position::new(mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::ScrollUp => scroll_by(app, -signed(WHEEL_STEP)),
        MouseEventKind::ScrollDown => scroll_by(app, signed(WHEEL_STEP)),
        MouseEventKind::Down(MouseButton::Left) => return handle_click(app, &areas, at),
        _ => {}
    }
    vec![]
}

fn handle_click(app: &mut AppState, areas: &Areas, at: Position) -> Vec<UiEffect> {
    if areas.credential.contains(at) {
        app.focus = Focus::Credential;
    } else if areas.show_toggle.contains(at) {
        app.focus = Focus::ShowCredential;
        return toggle_show_credential(app);
    } else if areas.save_button.contains(at) {
        app.focus = Focus::SaveCredential;
        return save_credential(app);
    } else if areas.prompt.contains(at) {
        app.focus = Focus::Prompt;
    } else if areas.submit.contains(at) {
        app.focus = Focus::Submit;
        return submit(app);
    } else if areas.result.contains(at) {
        app.focus = Focus::Result;
        if let Some(index) = clicked_block(app, areas, at) {
            return copy_block(app, index);
        }
    }
    vec![]
}

fn clicked_block(app: &AppState, areas: &Areas, at: Position) -> Option<usize> {
    let body: Rect = areas.result_body();
    if !body.contains(at) {
        return None;
    }
    let rendered = render::result_lines(app, areas)?;
    let scroll = app.scroll.min(render::max_scroll(rendered.lines.len(), areas));
    let row = usize::from(at.y - body.y) + scroll;
    rendered.block_at_row(row)
}

fn submit(app: &mut AppState) -> Vec<UiEffect> {
    if app.is_waiting() {
        app.status = Some(Status::notice("Still thinking…"));
        return vec![];
    }

    let credential = app.credential.value().trim().to_string();
    if credential.is_empty() {
        app.status = Some(Status::error("Enter an API key first"));
        app.focus = Focus::Credential;
        return vec![];
    }
    let prompt = app.prompt.value().trim().to_string();
    if prompt.is_empty() {
        app.status = Some(Status::error("Type something to ask"));
        app.focus = Focus::Prompt;
        return vec![];
    }

    let task = app.task_seq.next_id();
    let cancel = CancellationToken::new();
    app.request.start(task, cancel.clone());
    app.spinner_frame = 0;
    app.status = None;

    vec![UiEffect::SubmitPrompt {
        task,
        credential,
        prompt,
        cancel,
    }]
}

fn cancel_request(app: &mut AppState, notice: Option<&str>) -> Vec<UiEffect> {
    let Some(token) = app.request.take_cancel() else {
        return vec![];
    };
    if let Some(notice) = notice {
        app.status = Some(Status::notice(notice));
    }
    vec![UiEffect::CancelTask { token }]
}

fn handle_completion(
    app: &mut AppState,
    task: TaskId,
    result: Result<String, String>,
) -> Vec<UiEffect> {
    if !app.request.finish_if_active(task) {
        tracing::debug!(task = task.0, "dropping result of inactive request");
        return vec![];
    }

    match result {
        Ok(text) => {
            let id = app.response_seq;
            app.response_seq = app.response_seq.wrapping_add(1);
            // Replacing the view drops the old blocks, cancelling their resets.
            app.response = Some(ResponseView::new(id, text, app.highlighter.as_ref()));
            app.scroll = 0;
            app.status = None;
        }
        Err(message) => {
            app.status = Some(Status::error(message));
        }
    }
    vec![]
}

fn save_credential(app: &mut AppState) -> Vec<UiEffect> {
    let credential = app.credential.value().trim().to_string();
    app.status = Some(Status::notice(if credential.is_empty() {
        "API key cleared"
    } else {
        "API key saved"
    }));
    vec![UiEffect::PersistCredential { credential }]
}

fn toggle_show_credential(app: &mut AppState) -> Vec<UiEffect> {
    app.show_credential = !app.show_credential;
    vec![UiEffect::PersistShowCredential {
        show: app.show_credential,
    }]
}

fn copy_block(app: &mut AppState, index: usize) -> Vec<UiEffect> {
    let Some((text, block, reset)) = app
        .response
        .as_mut()
        .and_then(|response| response.copy_block(index))
    else {
        return vec![];
    };

    let mut effects = vec![
        UiEffect::CopyToClipboard { text },
        UiEffect::ScheduleCopyReset {
            block,
            generation: reset.generation,
            cancel: reset.cancel,
        },
    ];
    if let Some(token) = reset.superseded {
        effects.push(UiEffect::CancelTask { token });
    }
    effects
}

fn select_block(app: &mut AppState, select: fn(&mut ResponseView)) {
    let areas = render::viewport_areas(app);
    let Some(response) = app.response.as_mut() else {
        return;
    };
    select(response);
    let Some(selected) = response.selected else {
        return;
    };

    // Bring the selected header into view.
    let Some(row) = render::result_lines(app, &areas).and_then(|r| r.row_of_block(selected)) else {
        return;
    };
    let height = usize::from(areas.result_body().height).max(1);
    if row < app.scroll {
        app.scroll = row;
    } else if row >= app.scroll + height {
        app.scroll = row + 1 - height;
    }
    clamp_scroll(app);
}

fn signed(n: usize) -> isize {
    isize::try_from(n).unwrap_or(isize::MAX)
}

fn scroll_by(app: &mut AppState, delta: isize) {
    app.scroll = app.scroll.saturating_add_signed(delta);
    clamp_scroll(app);
}

fn clamp_scroll(app: &mut AppState) {
    let areas = render::viewport_areas(app);
    let total = render::result_lines(app, &areas).map_or(0, |r| r.lines.len());
    app.scroll = app.scroll.min(render::max_scroll(total, &areas));
}
