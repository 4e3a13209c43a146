//! Pure rendering: reads `AppState`, draws a frame, mutates nothing.
//!
//! [`layout`] is shared with the reducer so mouse hit-testing and scroll
//! clamping agree with what is on screen.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};

use crate::response::RenderedResponse;
use crate::state::{AppState, Focus, StatusKind};
use crate::text_field::TextField;

pub const TITLE: &str = "Well actually... 🧐";

const SHOW_LABEL_WIDTH: u16 = 18;
const SAVE_LABEL_WIDTH: u16 = 16;
const SUBMIT_WIDTH: u16 = 24;

const SPINNER_FRAMES: [char; 4] = ['◐', '◓', '◑', '◒'];
/// Ticks per spinner frame.
const SPINNER_SPEED: usize = 8;

const FOCUS_COLOR: Color = Color::Cyan;
const IDLE_BORDER: Color = Color::DarkGray;
const ERROR_COLOR: Color = Color::Red;
const NOTICE_COLOR: Color = Color::Green;

/// Screen regions, top to bottom.
#[derive(Debug, Clone, Copy, Default)]
pub struct Areas {
    pub title: Rect,
    pub credential: Rect,
    pub show_toggle: Rect,
    pub save_button: Rect,
    pub prompt: Rect,
    pub submit: Rect,
    pub status: Rect,
    pub result: Rect,
    pub hints: Rect,
}

impl Areas {
    /// Content area of the result panel (inside the border).
    pub fn result_body(&self) -> Rect {
        self.result.inner(Margin::new(1, 1))
    }
}

pub fn layout(area: Rect) -> Areas {
    let rows = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .split(area);

    let controls = Layout::horizontal([
        Constraint::Length(SHOW_LABEL_WIDTH),
        Constraint::Length(SAVE_LABEL_WIDTH),
        Constraint::Min(0),
    ])
    .split(rows[2]);
    let submit = Layout::horizontal([Constraint::Length(SUBMIT_WIDTH), Constraint::Min(0)])
        .split(rows[4]);

    Areas {
        title: rows[0],
        credential: rows[1],
        show_toggle: controls[0],
        save_button: controls[1],
        prompt: rows[3],
        submit: submit[0],
        status: rows[5],
        result: rows[6],
        hints: rows[7],
    }
}

/// Areas for the last known terminal size.
pub fn viewport_areas(app: &AppState) -> Areas {
    layout(Rect::new(0, 0, app.viewport.width, app.viewport.height))
}

/// Lays out the current response for the result panel.
pub fn result_lines(app: &AppState, areas: &Areas) -> Option<RenderedResponse> {
    let width = usize::from(areas.result_body().width);
    app.response
        .as_ref()
        .map(|response| response.render_lines(width, app.focus == Focus::Result))
}

/// Largest valid scroll offset for `total` lines.
pub fn max_scroll(total: usize, areas: &Areas) -> usize {
    total.saturating_sub(usize::from(areas.result_body().height))
}

pub fn render(app: &AppState, frame: &mut Frame) {
    let areas = layout(frame.area());

    render_title(app, frame, areas.title);
    render_field(
        frame,
        areas.credential,
        " API Key ",
        &app.credential,
        FieldOptions {
            masked: !app.show_credential,
            focused: app.focus == Focus::Credential,
            placeholder: "sk-…",
        },
    );
    render_controls(app, frame, &areas);
    render_field(
        frame,
        areas.prompt,
        " Input Text ",
        &app.prompt,
        FieldOptions {
            masked: false,
            focused: app.focus == Focus::Prompt,
            placeholder: "Ask me anything, I'll correct you",
        },
    );
    render_submit(app, frame, areas.submit);
    render_status(app, frame, areas.status);
    render_result(app, frame, &areas);
    render_hints(app, frame, areas.hints);
}

fn render_title(app: &AppState, frame: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(TITLE, Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("  {}", app.model),
            Style::default().fg(IDLE_BORDER),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

struct FieldOptions {
    masked: bool,
    focused: bool,
    placeholder: &'static str,
}

fn render_field(
    frame: &mut Frame,
    area: Rect,
    title: &'static str,
    field: &TextField,
    options: FieldOptions,
) {
    let block = Block::bordered()
        .title(title)
        .border_style(border_style(options.focused));
    let inner = block.inner(area);

    let (text, cursor_x) = field.visible(usize::from(inner.width), options.masked);
    let content = if field.is_empty() && !options.focused {
        Line::from(Span::styled(
            options.placeholder,
            Style::default().add_modifier(Modifier::DIM),
        ))
    } else {
        Line::from(text)
    };
    frame.render_widget(Paragraph::new(content).block(block), area);

    if options.focused && inner.width > 0 && inner.height > 0 {
        let x = inner
            .x
            .saturating_add(u16::try_from(cursor_x).unwrap_or(u16::MAX))
            .min(inner.right().saturating_sub(1));
        frame.set_cursor_position((x, inner.y));
    }
}

fn render_controls(app: &AppState, frame: &mut Frame, areas: &Areas) {
    let check = if app.show_credential { "[x]" } else { "[ ]" };
    frame.render_widget(
        Paragraph::new(Span::styled(
            format!("{check} Show API key"),
            control_style(app.focus == Focus::ShowCredential),
        )),
        areas.show_toggle,
    );
    frame.render_widget(
        Paragraph::new(Span::styled(
            "[ Save API key ]",
            control_style(app.focus == Focus::SaveCredential),
        )),
        areas.save_button,
    );
}

fn render_submit(app: &AppState, frame: &mut Frame, area: Rect) {
    let label = if app.is_waiting() {
        let spinner = SPINNER_FRAMES[(app.spinner_frame / SPINNER_SPEED) % SPINNER_FRAMES.len()];
        format!("[ Thinking deeply {spinner} ]")
    } else {
        "[ Ask nicely ]".to_string()
    };
    let mut style = control_style(app.focus == Focus::Submit);
    if app.is_waiting() {
        style = style.add_modifier(Modifier::DIM);
    }
    frame.render_widget(Paragraph::new(Span::styled(label, style)), area);
}

fn render_status(app: &AppState, frame: &mut Frame, area: Rect) {
    let Some(status) = &app.status else {
        return;
    };
    let color = match status.kind {
        StatusKind::Notice => NOTICE_COLOR,
        StatusKind::Error => ERROR_COLOR,
    };
    frame.render_widget(
        Paragraph::new(Span::styled(status.message.as_str(), Style::default().fg(color))),
        area,
    );
}

fn render_result(app: &AppState, frame: &mut Frame, areas: &Areas) {
    let block = Block::bordered()
        .title(" Result ")
        .border_style(border_style(app.focus == Focus::Result));
    let body = areas.result_body();
    frame.render_widget(block, areas.result);

    let Some(rendered) = result_lines(app, areas) else {
        let hint = if app.is_waiting() {
            "Thinking deeply…"
        } else {
            "Nothing asked yet."
        };
        frame.render_widget(
            Paragraph::new(Span::styled(hint, Style::default().add_modifier(Modifier::DIM))),
            body,
        );
        return;
    };

    let total = rendered.lines.len();
    let scroll = app.scroll.min(max_scroll(total, areas));
    let visible: Vec<Line<'static>> = rendered
        .lines
        .into_iter()
        .skip(scroll)
        .take(usize::from(body.height))
        .collect();
    frame.render_widget(Paragraph::new(visible), body);

    if total > usize::from(body.height) {
        let mut state = ScrollbarState::new(max_scroll(total, areas)).position(scroll);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            areas.result.inner(Margin::new(0, 1)),
            &mut state,
        );
    }
}

fn render_hints(app: &AppState, frame: &mut Frame, area: Rect) {
    let hints = match app.focus {
        Focus::Credential => "Enter save · Tab next · Ctrl+C quit",
        Focus::ShowCredential | Focus::SaveCredential => "Space toggle/press · Tab next · Ctrl+C quit",
        Focus::Prompt | Focus::Submit => "Enter ask · Esc cancel · Tab next · Ctrl+C quit",
        Focus::Result => "↑↓ scroll · [ ] select block · c copy · Tab next · Ctrl+C quit",
    };
    frame.render_widget(
        Paragraph::new(Span::styled(hints, Style::default().fg(IDLE_BORDER))),
        area,
    );
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(FOCUS_COLOR)
    } else {
        Style::default().fg(IDLE_BORDER)
    }
}

fn control_style(focused: bool) -> Style {
    if focused {
        Style::default()
            .fg(FOCUS_COLOR)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default()
    }
}
