use deepview_core::todos::TodoGroup;
use deepview_core::InterruptProjection;
use deepview_core::RenderItem;
use deepview_core::Speaker;
use deepview_core::ToolCallRecord;
use deepview_core::ToolCallStatus;
use deepview_core::TranscriptView;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use serde_json::Value;

const RESULT_PREVIEW_LINES: usize = 6;

#[derive(Clone, Copy)]
pub struct UiPalette {
    pub accent: Color,
    pub success: Color,
    pub warning: Color,
    pub danger: Color,
    pub muted: Color,
    pub border: Color,
}

impl Default for UiPalette {
    fn default() -> Self {
        Self {
            accent: Color::Cyan,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
            muted: Color::DarkGray,
            border: Color::Gray,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub show_tool_args: bool,
}

fn speaker_style(speaker: Speaker, palette: UiPalette) -> Style {
    let color = match speaker {
        Speaker::Human => palette.accent,
        Speaker::Assistant => palette.success,
    };
    Style::default().fg(color)
}

fn status_style(status: ToolCallStatus, palette: UiPalette) -> Style {
    match status {
        ToolCallStatus::Pending => Style::default().fg(palette.muted),
        ToolCallStatus::Interrupted => Style::default()
            .fg(palette.warning)
            .add_modifier(Modifier::BOLD),
        ToolCallStatus::Completed => Style::default().fg(palette.success),
    }
}

fn status_marker(status: ToolCallStatus) -> &'static str {
    match status {
        ToolCallStatus::Pending => "…",
        ToolCallStatus::Interrupted => "⏸",
        ToolCallStatus::Completed => "✓",
    }
}

/// Empty objects and nulls are not worth a line.
fn args_summary(args: &Value) -> Option<String> {
    match args {
        Value::Null => None,
        Value::Object(map) if map.is_empty() => None,
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn push_text(out: &mut Vec<Line<'static>>, prefix: &str, text: &str, style: Style) {
    for raw in text.split('\n') {
        out.push(Line::from(vec![
            Span::styled(prefix.to_string(), style),
            Span::styled(raw.to_string(), style),
        ]));
    }
}

fn render_tool_call(
    out: &mut Vec<Line<'static>>,
    call: &ToolCallRecord,
    interrupt: Option<&InterruptProjection>,
    options: RenderOptions,
    palette: UiPalette,
) {
    let style = status_style(call.status, palette);
    out.push(Line::from(vec![
        Span::styled(format!("  {} ", status_marker(call.status)), style),
        Span::styled(call.name.clone(), style.add_modifier(Modifier::BOLD)),
        Span::styled(
            format!(" ({})", call.status.label()),
            Style::default().fg(palette.muted),
        ),
    ]));

    let muted = Style::default().fg(palette.muted);
    if options.show_tool_args {
        if let Some(args) = args_summary(&call.args) {
            push_text(out, "    args: ", &args, muted);
        }
    }

    if let Some(result) = &call.result {
        let mut lines = result.lines();
        for line in lines.by_ref().take(RESULT_PREVIEW_LINES) {
            out.push(Line::from(Span::styled(format!("    │ {line}"), muted)));
        }
        let hidden = lines.count();
        if hidden > 0 {
            out.push(Line::from(Span::styled(
                format!("    │ … {hidden} more lines"),
                muted,
            )));
        }
    }

    if call.is_completed() {
        return;
    }
    let Some(projection) = interrupt else {
        return;
    };
    if let Some(action) = projection.action(&call.name) {
        let warning = Style::default()
            .fg(palette.warning)
            .add_modifier(Modifier::BOLD);
        out.push(Line::from(Span::styled(
            "    awaiting review".to_string(),
            warning,
        )));
        if let Some(description) = action.description.as_deref() {
            push_text(out, "    ", description, Style::default().fg(palette.warning));
        }
    }
    if let Some(config) = projection.review_config(&call.name) {
        if !config.allowed_decisions.is_empty() {
            out.push(Line::from(vec![
                Span::styled("    decisions: ".to_string(), muted),
                Span::styled(
                    config.allowed_decisions.join(", "),
                    Style::default().fg(palette.danger),
                ),
            ]));
        }
    }
}

fn render_item(
    out: &mut Vec<Line<'static>>,
    item: RenderItem<'_>,
    options: RenderOptions,
    palette: UiPalette,
) {
    let speaker = item.turn.speaker();
    let base = speaker_style(speaker, palette);
    if item.turn.starts_new_speaker_run {
        out.push(Line::from(Span::styled(
            format!("[{}]", speaker.label()),
            base.add_modifier(Modifier::BOLD),
        )));
    }

    let text = item.turn.text();
    if !text.trim().is_empty() {
        push_text(out, "  ", text.trim_end(), base);
    }
    for call in &item.turn.tool_calls {
        render_tool_call(out, call, item.interrupt, options, palette);
    }
    out.push(Line::from(""));
}

pub fn build_turn_lines(
    view: &TranscriptView,
    options: RenderOptions,
    palette: UiPalette,
) -> Vec<Line<'static>> {
    let mut out = Vec::new();
    for item in view.items() {
        render_item(&mut out, item, options, palette);
    }
    out
}

pub fn build_todo_lines(groups: &[TodoGroup<'_>], palette: UiPalette) -> Vec<Line<'static>> {
    let mut out = Vec::new();
    for group in groups.iter().filter(|group| !group.items.is_empty()) {
        out.push(Line::from(Span::styled(
            format!("{} ({})", group.label, group.items.len()),
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
        )));
        for todo in &group.items {
            out.push(Line::from(format!(
                "  {} {}",
                todo.status.marker(),
                todo.content
            )));
        }
    }
    out
}

/// Drops styling, for non-interactive output.
pub fn plain(lines: &[Line<'_>]) -> String {
    lines
        .iter()
        .map(|line| {
            line.spans
                .iter()
                .map(|span| span.content.as_ref())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
