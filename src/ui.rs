use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs, Wrap},
};
use crate::app::{App, ChatFocus, ChatRole, InputMode, Section, QUICK_ACTIONS};

/// Convert `**bold**` markers in a reply line to styled spans.
fn parse_markdown_line(text: &str) -> Line<'static> {
    let chunks: Vec<&str> = text.split("**").collect();
    let unbalanced = chunks.len() % 2 == 0;
    let last = chunks.len() - 1;
    let mut spans: Vec<Span<'static>> = Vec::new();

    for (i, chunk) in chunks.into_iter().enumerate() {
        if chunk.is_empty() {
            continue;
        }
        if i % 2 == 1 && unbalanced && i == last {
            // No closing marker; keep the ** literal
            spans.push(Span::raw(format!("**{}", chunk)));
        } else if i % 2 == 1 {
            spans.push(Span::styled(
                chunk.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::raw(chunk.to_string()));
        }
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let [header_area, tabs_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area);
    render_tabs(app, frame, tabs_area);

    match app.section {
        Section::Chat => render_chat(app, frame, body_area),
        Section::Doctors => render_doctors(app, frame, body_area),
        Section::Medicines => render_medicines(app, frame, body_area),
        Section::Hospitals => render_hospitals(app, frame, body_area),
        Section::About => render_about(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Symptom Checker ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_tabs(app: &App, frame: &mut Frame, area: Rect) {
    let titles: Vec<String> = Section::all()
        .iter()
        .enumerate()
        .map(|(i, section)| format!("{} {}", i + 1, section.title()))
        .collect();

    let selected = Section::all()
        .iter()
        .position(|s| *s == app.section)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .select(selected);

    frame.render_widget(tabs, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let [transcript_area, chips_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(3),
    ])
    .areas(area);

    render_transcript(app, frame, transcript_area);
    render_quick_chips(app, frame, chips_area);
    render_chat_input(app, frame, input_area);
}

fn render_transcript(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.chat_focus == ChatFocus::Transcript;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Chat ");

    // Remember the inner size for wrap and scroll calculations
    let inner = block.inner(area);
    app.chat_height = inner.height;
    app.chat_width = inner.width;

    let mut lines: Vec<Line> = Vec::new();
    for msg in &app.messages {
        match msg.role {
            ChatRole::User => lines.push(Line::from(Span::styled(
                "You:",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ))),
            ChatRole::Bot => lines.push(Line::from(Span::styled(
                "Assistant:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ))),
        }
        for line in msg.content.lines() {
            lines.push(parse_markdown_line(line));
        }
        lines.push(Line::default());
    }

    if app.awaiting_reply {
        lines.push(Line::from(Span::styled(
            "Assistant:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Typing{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let transcript = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(transcript, area);
}

fn render_quick_chips(app: &App, frame: &mut Frame, area: Rect) {
    let focused = app.chat_focus == ChatFocus::QuickActions;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };

    let mut spans: Vec<Span> = Vec::new();
    for (i, preset) in QUICK_ACTIONS.iter().enumerate() {
        let style = if focused && i == app.quick_selected {
            Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", preset), style));
        spans.push(Span::raw(" "));
    }

    let chips = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(" Quick Actions "),
    );
    frame.render_widget(chips, area);
}

fn render_chat_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.chat_focus == ChatFocus::Input && app.input_mode == InputMode::Editing;
    let border_color = if editing { Color::Yellow } else { Color::DarkGray };

    let input = Paragraph::new(app.chat_input.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(" Describe your symptoms "),
    );
    frame.render_widget(input, area);

    if editing {
        let cursor_x = area.x + 1 + app.chat_cursor.min(area.width.saturating_sub(2) as usize) as u16;
        frame.set_cursor_position((cursor_x, area.y + 1));
    }
}

fn render_doctors(app: &mut App, frame: &mut Frame, area: Rect) {
    let [search_area, list_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing { Color::Yellow } else { Color::DarkGray };

    let search = Paragraph::new(app.doctor_query.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(" Search by name or specialty "),
    );
    frame.render_widget(search, search_area);

    if editing {
        let cursor_x = search_area.x + 1 + app.doctor_query.chars().count() as u16;
        frame.set_cursor_position((cursor_x.min(search_area.right().saturating_sub(2)), search_area.y + 1));
    }

    let items: Vec<ListItem> = app
        .visible_doctors
        .iter()
        .filter_map(|&i| app.directory.doctors.get(i))
        .map(|doctor| {
            ListItem::new(vec![
                Line::from(Span::styled(
                    format!(" {} ", doctor.name),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("   {} · {} · {}", doctor.specialty, doctor.location, doctor.availability),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let title = format!(
        " Doctors ({} of {}) ",
        app.visible_doctors.len(),
        app.directory.doctors.len()
    );

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, list_area, &mut app.doctor_state);
}

fn render_medicines(app: &mut App, frame: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = app
        .directory
        .medicines
        .iter()
        .map(|medicine| {
            ListItem::new(vec![
                Line::from(Span::styled(
                    format!(" {} ", medicine.name),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::raw(format!("   {}", medicine.uses))),
                Line::from(Span::styled(
                    format!("   {}", medicine.dosage),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Medicines "))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.medicine_state);
}

fn render_hospitals(app: &mut App, frame: &mut Frame, area: Rect) {
    let [location_area, list_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    let location_text = match &app.location {
        Some(fix) => Span::styled(fix.display(), Style::default().fg(Color::Green)),
        None => Span::styled("Detecting location...", Style::default().fg(Color::DarkGray)),
    };
    let location = Paragraph::new(Line::from(location_text)).block(
        Block::default().borders(Borders::ALL).title(" Your Location "),
    );
    frame.render_widget(location, location_area);

    let items: Vec<ListItem> = app
        .directory
        .hospitals
        .iter()
        .map(|hospital| {
            ListItem::new(vec![
                Line::from(Span::styled(
                    format!(" {} ", hospital.name),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("   {} · {}", hospital.address, hospital.phone),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Nearby Hospitals "))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, list_area, &mut app.hospital_state);
}

fn render_about(app: &App, frame: &mut Frame, area: Rect) {
    let [stats_area, text_area] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Min(0),
    ])
    .areas(area);

    let columns = Layout::horizontal(vec![
        Constraint::Ratio(1, app.stats.len() as u32);
        app.stats.len()
    ])
    .split(stats_area);

    for (stat, column) in app.stats.iter().zip(columns.iter()) {
        let value = Line::from(Span::styled(
            stat.display(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
        let label = Line::from(Span::styled(
            stat.label.clone(),
            Style::default().fg(Color::DarkGray),
        ));
        let tile = Paragraph::new(vec![value, label])
            .block(Block::default().borders(Borders::ALL))
            .centered();
        frame.render_widget(tile, *column);
    }

    let about = Paragraph::new(
        "Symptom Checker is a terminal client for an AI-powered health assistant. \
         Describe your symptoms in the chat and the service suggests possible \
         conditions and treatments. This is not a substitute for professional \
         medical advice; always consult a doctor for serious concerns.",
    )
    .block(Block::default().borders(Borders::ALL).title(" About "))
    .wrap(Wrap { trim: true });
    frame.render_widget(about, text_area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " INPUT ",
    };

    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match (app.section, app.input_mode) {
        (Section::Chat, InputMode::Normal) => {
            let mut hints = vec![
                Span::styled(" Tab ", key_style),
                Span::styled(" focus ", label_style),
                Span::styled(" i ", key_style),
                Span::styled(" type ", label_style),
            ];
            if app.chat_focus == ChatFocus::QuickActions {
                hints.extend(vec![
                    Span::styled(" h/l ", key_style),
                    Span::styled(" pick ", label_style),
                    Span::styled(" Enter ", key_style),
                    Span::styled(" send ", label_style),
                ]);
            } else {
                hints.extend(vec![
                    Span::styled(" j/k ", key_style),
                    Span::styled(" scroll ", label_style),
                ]);
            }
            hints.extend(vec![
                Span::styled(" 1-5 ", key_style),
                Span::styled(" section ", label_style),
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ]);
            hints
        }
        (Section::Chat, InputMode::Editing) => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" stop typing ", label_style),
        ],
        (Section::Doctors, InputMode::Normal) => vec![
            Span::styled(" / ", key_style),
            Span::styled(" search ", label_style),
            Span::styled(" j/k ", key_style),
            Span::styled(" nav ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" clear ", label_style),
            Span::styled(" 1-5 ", key_style),
            Span::styled(" section ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
        (Section::Doctors, InputMode::Editing) => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" done ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" done ", label_style),
        ],
        _ => vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" nav ", label_style),
            Span::styled(" 1-5 ", key_style),
            Span::styled(" section ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
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

    #[test]
    fn test_parse_markdown_bold() {
        let line = parse_markdown_line("you might have **Flu**.");
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[1].content, "Flu");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_parse_markdown_unclosed_marker_kept_literal() {
        let line = parse_markdown_line("a **b");
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "a **b");
    }

    #[test]
    fn test_parse_markdown_plain_text() {
        let line = parse_markdown_line("no markers here");
        assert_eq!(line.spans.len(), 1);
    }
}
