//! Board view: one column per lane, the event log and a status bar

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::cli::tui::app::{App, ConfirmAction, Gesture, InputMode};
use crate::domain::{EventLog, Lane};

const CELEBRATION_TEXT: &str = "TARGET NEUTRALIZED\n\nTask completed";

/// Draw the board layout
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),    // Lanes
            Constraint::Length(8), // Event log
            Constraint::Length(3), // Status bar
        ])
        .split(area);

    let lanes = app.engine().board().lanes();
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(lanes.iter().map(|_| Constraint::Ratio(1, lanes.len() as u32)))
        .split(main_chunks[0]);

    let gesture = match app.input_mode() {
        InputMode::Dragging(g) => Some(g),
        _ => None,
    };

    for (idx, (lane, area)) in lanes.iter().zip(columns.iter()).enumerate() {
        draw_lane(frame, app, lane, idx, gesture, *area);
    }

    draw_log(frame, app.engine().log(), main_chunks[1]);
    draw_status_bar(frame, app, main_chunks[2]);

    if app.engine().celebration_active() {
        draw_celebration(frame, area);
    }
}

fn draw_lane(
    frame: &mut Frame,
    app: &App,
    lane: &Lane,
    idx: usize,
    gesture: Option<&Gesture>,
    area: Rect,
) {
    let focused = idx == app.lane_index();
    let width = area.width.saturating_sub(6) as usize;
    let completed = app.engine().counters().get(&lane.id);

    let mut items: Vec<ListItem> = lane
        .cards
        .iter()
        .enumerate()
        .map(|(i, card)| {
            let carried = gesture
                .map(|g| g.source.lane == lane.id && g.source.index == i)
                .unwrap_or(false);
            let style = if carried {
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC)
            } else {
                Style::default().fg(Color::Green)
            };
            ListItem::new(truncate_str(&card.content, width)).style(style)
        })
        .collect();

    if let Some(g) = gesture.filter(|g| g.target_lane == idx) {
        // Same-lane drop indices skip the carried card
        let at = if g.source.lane == lane.id && g.target_index >= g.source.index {
            g.target_index + 1
        } else {
            g.target_index
        };
        let marker = ListItem::new("-- drop here --")
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
        items.insert(at.min(items.len()), marker);
    }

    let title = format!(" {} ({}) done:{} ", lane.title, lane.len(), completed);
    let border = if focused { Color::Cyan } else { Color::DarkGray };
    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if focused && gesture.is_none() && !lane.is_empty() {
        state.select(Some(app.card_index()));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_log(frame: &mut Frame, log: &EventLog, area: Rect) {
    let visible = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = log
        .latest(visible)
        .iter()
        .map(|entry| {
            Line::from(vec![
                Span::styled(
                    entry.timestamp.format("%H:%M:%S ").to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(entry.message.clone()),
            ])
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(format!(" Event log ({}) ", log.len()))
            .borders(Borders::ALL),
    );

    frame.render_widget(paragraph, area);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (content, style) = match app.input_mode() {
        InputMode::Normal => {
            let msg = app.status_message().unwrap_or("[?]help [n]ew [d]one [space]drag [q]uit");
            (msg.to_string(), Style::default())
        }
        InputMode::NewTask(text) => (
            format!("New task: {}_  (enter to add, esc to cancel)", text),
            Style::default().fg(Color::Yellow),
        ),
        InputMode::Confirm(ConfirmAction::CompleteCard { card, .. }) => (
            format!("Complete {}? (y/n)", card),
            Style::default().fg(Color::Yellow),
        ),
        InputMode::Dragging(_) => (
            app.status_message().unwrap_or("Dragging").to_string(),
            Style::default().fg(Color::Yellow),
        ),
    };

    let paragraph = Paragraph::new(format!("redboard {}", content))
        .style(style)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(paragraph, area);
}

fn draw_celebration(frame: &mut Frame, area: Rect) {
    let popup = centered_rect(40, 7, area);
    let paragraph = Paragraph::new(CELEBRATION_TEXT)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Green)));

    frame.render_widget(Clear, popup);
    frame.render_widget(paragraph, popup);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Truncate a string to max_len characters, adding "..." if truncated
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncate_at = max_len.saturating_sub(3);
        let truncated: String = s.chars().take(truncate_at).collect();
        format!("{}...", truncated)
    }
}
