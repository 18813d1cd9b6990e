use howdy_core::{ChatRole, UserRole};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use crate::app::{App, FocusPane, InputMode};

const TITLE: &str = " 🤖 Well-Sec Howdy! ";
const DESCRIPTION: &str = "Ask me questions about company policies (data privacy, employee conduct, \
software usage, travel expenses, security incidents).";
const PLACEHOLDER: &str = "What's your question?";
const SIDEBAR_WIDTH: u16 = 34;

/// Render `**bold**` spans; an unmatched `**` stays literal.
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut parts: Vec<String> = text.split("**").map(str::to_string).collect();

    // An even number of parts means the last marker never closed
    if parts.len() % 2 == 0 {
        let tail = parts.pop().unwrap_or_default();
        if let Some(prev) = parts.last_mut() {
            prev.push_str("**");
            prev.push_str(&tail);
        }
    }

    let spans: Vec<Span<'static>> = parts
        .into_iter()
        .enumerate()
        .filter(|(_, part)| !part.is_empty())
        .map(|(i, part)| {
            if i % 2 == 1 {
                Span::styled(part, Style::default().add_modifier(Modifier::BOLD))
            } else {
                Span::raw(part)
            }
        })
        .collect();

    Line::from(spans)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    let [main_area, sidebar_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(SIDEBAR_WIDTH.min(body_area.width / 2)),
    ])
    .areas(body_area);

    render_header(frame, header_area);
    render_chat_column(app, frame, main_area);
    render_sidebar(app, frame, sidebar_area);
    render_footer(app, frame, footer_area);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(TITLE, Style::default().fg(Color::Cyan).bold()),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat_column(app: &mut App, frame: &mut Frame, area: Rect) {
    let notice_height = if app.last_error.is_some() { 1 } else { 0 };

    let [description_area, chat_area, notice_area, input_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(notice_height),
        Constraint::Length(3),
    ])
    .areas(area);

    let description = Paragraph::new(DESCRIPTION)
        .style(Style::default().fg(Color::Gray))
        .wrap(Wrap { trim: true });
    frame.render_widget(description, description_area);

    render_chat_history(app, frame, chat_area);

    if let Some(notice) = &app.last_error {
        let notice = Paragraph::new(format!(" {} ", notice))
            .style(Style::default().fg(Color::White).bg(Color::Red));
        frame.render_widget(notice, notice_area);
    }

    render_input(app, frame, input_area);
}

fn render_chat_history(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let border_color = if app.focus == FocusPane::Chat { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" Chat ({} messages) ", app.session.len()));

    let text = if app.session.is_empty() && !app.is_loading() {
        Text::from(Span::styled(
            "Ask a question about company policies...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in app.session.turns() {
            match msg.role {
                ChatRole::User => {
                    lines.push(Line::from(Span::styled(
                        "You:",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )));
                    lines.push(Line::from(msg.content.clone()));
                }
                ChatRole::Assistant => {
                    lines.push(Line::from(Span::styled(
                        "Howdy:",
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )));
                    lines.extend(msg.content.lines().map(parse_markdown_line));
                }
            }
            lines.push(Line::default());
        }

        if app.is_loading() {
            lines.push(Line::from(Span::styled(
                "Howdy:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            let dots = ".".repeat(app.animation_frame as usize + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    // Keep leading whitespace so indented lists in replies stay aligned
    let chat = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let (border_color, title) = if app.is_loading() {
        (Color::DarkGray, " Waiting for reply... ")
    } else if editing {
        (Color::Yellow, " Ask (Enter to send) ")
    } else {
        (Color::DarkGray, " Ask (i to type) ")
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.query_cursor;

    // Horizontal scroll keeps the cursor inside the box
    let scroll_offset = if inner_width == 0 || cursor_pos < inner_width {
        0
    } else {
        cursor_pos - inner_width + 1
    };

    let input = if app.query_input.is_empty() {
        Paragraph::new(PLACEHOLDER).style(Style::default().fg(Color::DarkGray))
    } else {
        let visible: String = app
            .query_input
            .chars()
            .skip(scroll_offset)
            .take(inner_width)
            .collect();
        Paragraph::new(visible).style(Style::default().fg(Color::Cyan))
    };
    frame.render_widget(input.block(block), area);

    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_sidebar(app: &mut App, frame: &mut Frame, area: Rect) {
    app.sidebar_area = Some(area);

    let roles = UserRole::all();
    let [selector_area, status_area, actions_area] = Layout::vertical([
        Constraint::Length(roles.len() as u16 + 2),
        Constraint::Length(4),
        Constraint::Min(0),
    ])
    .areas(area);

    let current = app.session.role();
    let border_color = if app.focus == FocusPane::Sidebar { Color::Cyan } else { Color::DarkGray };
    let selector_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Select User Role: ");

    let items: Vec<ListItem> = roles
        .iter()
        .map(|role| {
            let marker = if *role == current { "(•)" } else { "( )" };
            let style = if *role == current {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(format!("{} {}", marker, role.as_str())).style(style)
        })
        .collect();

    let selector = List::new(items)
        .block(selector_block)
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
        .highlight_symbol("> ");
    frame.render_stateful_widget(selector, selector_area, &mut app.role_state);

    let status = Paragraph::new(vec![
        parse_markdown_line(&format!("Current User Role: **{}**", current.display_name())),
        Line::from(Span::styled(
            current.help(),
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue)),
    )
    .wrap(Wrap { trim: true });
    frame.render_widget(status, status_area);

    let actions = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(" C ", Style::default().bg(Color::DarkGray).fg(Color::White)),
            Span::raw(" Clear Chat History"),
        ]),
        Line::default(),
        Line::from(Span::styled(
            "Normal filters sensitive data; super has full access.",
            Style::default().fg(Color::DarkGray),
        )),
        Line::default(),
        Line::from(Span::styled(
            "Built with ratatui and Google Cloud Functions.",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ])
    .wrap(Wrap { trim: true });
    frame.render_widget(actions, actions_area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " TYPING ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);
    let hint = |key: &'static str, label: &'static str| {
        [Span::styled(key, key_style), Span::styled(label, label_style)]
    };

    let mut hints: Vec<Span> = Vec::new();
    match app.input_mode {
        InputMode::Editing => {
            hints.extend(hint(" Enter ", " send "));
            hints.extend(hint(" Esc ", " stop typing "));
            hints.extend(hint(" Tab ", " roles "));
        }
        InputMode::Normal => {
            if app.focus == FocusPane::Sidebar {
                hints.extend(hint(" j/k ", " role "));
                hints.extend(hint(" Enter ", " select "));
            } else {
                hints.extend(hint(" j/k ", " scroll "));
                hints.extend(hint(" i ", " type "));
            }
            hints.extend(hint(" Tab ", " focus "));
            hints.extend(hint(" r ", " toggle role "));
            hints.extend(hint(" C ", " clear "));
            hints.extend(hint(" q ", " quit "));
        }
    }

    let footer_content = Line::from(
        vec![Span::styled(mode_text, mode_style), Span::styled(" ", label_style)]
            .into_iter()
            .chain(hints)
            .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use howdy_core::{ChatMessage, OrchestratorClient};
    use ratatui::{backend::TestBackend, Terminal};

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn is_bold(span: &Span) -> bool {
        span.style.add_modifier.contains(Modifier::BOLD)
    }

    fn render_to_string(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(110, 32)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_markdown_bold_spans() {
        let line = parse_markdown_line("Role: **Super** user");
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[1].content, "Super");
        assert!(is_bold(&line.spans[1]));
        assert!(!is_bold(&line.spans[0]));
    }

    #[test]
    fn test_markdown_unclosed_marker_is_literal() {
        let line = parse_markdown_line("a **b** c **d");
        assert_eq!(line_text(&line), "a b c **d");
        assert!(is_bold(&line.spans[1]));
        assert!(!is_bold(&line.spans[2]));
        let line = parse_markdown_line("only **open");
        assert_eq!(line_text(&line), "only **open");
        assert!(line.spans.iter().all(|s| !is_bold(s)));
    }

    #[test]
    fn test_markdown_plain_and_empty() {
        assert!(parse_markdown_line("").spans.is_empty());
        let line = parse_markdown_line("no markup here");
        assert_eq!(line.spans.len(), 1);
        assert_eq!(line_text(&line), "no markup here");
    }

    #[test]
    fn test_render_shows_title_role_and_turns() {
        let mut app = App::new(OrchestratorClient::new("http://127.0.0.1:9"));
        app.session.append(ChatMessage::user("What is policy X?"));
        app.session.append(ChatMessage::assistant("Policy X says..."));

        let screen = render_to_string(&mut app);
        assert!(screen.contains("Well-Sec Howdy!"));
        assert!(screen.contains("Current User Role: Normal"));
        assert!(screen.contains("What is policy X?"));
        assert!(screen.contains("Policy X says..."));
        assert!(screen.contains("Clear Chat History"));
        assert!(app.chat_area.is_some());
    }

    #[test]
    fn test_render_keeps_reply_indentation() {
        let mut app = App::new(OrchestratorClient::new("http://127.0.0.1:9"));
        app.session.append(ChatMessage::user("How do I report an incident?"));
        app.session.append(ChatMessage::assistant("Steps:\n    - call the security desk"));

        let screen = render_to_string(&mut app);
        assert!(screen.contains("│    - call the security desk"));
    }

    #[test]
    fn test_render_error_notice() {
        let mut app = App::new(OrchestratorClient::new("http://127.0.0.1:9"));
        app.last_error = Some("Received an invalid response from the chatbot backend.".into());
        let screen = render_to_string(&mut app);
        assert!(screen.contains("Received an invalid response"));
    }
}
