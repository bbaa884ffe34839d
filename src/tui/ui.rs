use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::commands::{short_id, HISTORY_DAYS};
use crate::manager::{MessageSlot, TaskView};
use crate::progress::{format_minutes, recent_history};
use crate::storage::TaskStore;
use super::app::{App, InputMode};

pub fn ui<S: TaskStore>(f: &mut Frame, app: &mut App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),     // Table
            Constraint::Length(14), // Detail
            Constraint::Length(3),  // Help
        ].as_ref())
        .split(f.area());

    let today = app.manager.today();
    let views = app.manager.views();

    if views.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from("No goals yet."),
            Line::from("Press 'a' to take the first step and add one."),
        ])
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL).title("Streakboard"));
        f.render_widget(empty, chunks[0]);
    } else {
        let rows: Vec<Row> = views
            .iter()
            .map(|v| {
                let p = v.progress;
                let style = if p.goal_met_today {
                    Style::default().fg(Color::Green)
                } else if p.time_spent_today > 0 {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                };
                let coach = match v.message {
                    MessageSlot::Pending => "…",
                    MessageSlot::Resolved(_) | MessageSlot::Failed(_) => "✉",
                    MessageSlot::Idle => "",
                };
                Row::new(vec![
                    Cell::from(short_id(v.task.id)),
                    Cell::from(v.task.name.clone()),
                    Cell::from(format!(
                        "{} / {}",
                        format_minutes(u64::from(p.time_spent_today)),
                        format_minutes(u64::from(v.task.target_time))
                    )),
                    Cell::from(format!("{:.0}%", p.progress_percent)),
                    Cell::from(format!("🔥 {}d", p.streak)),
                    Cell::from(format_minutes(p.total_time)),
                    Cell::from(if p.goal_met_today { "Done" } else { "Going" }),
                    Cell::from(coach),
                ]).style(style)
            })
            .collect();

        let widths = [
            Constraint::Length(9),
            Constraint::Min(20),
            Constraint::Length(16),
            Constraint::Length(6),
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Length(6),
            Constraint::Length(2),
        ];

        let table = Table::new(rows, widths)
            .header(Row::new(vec!["ID", "Goal", "Today", "Prog", "Streak", "Total", "Status", ""])
                .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .bottom_margin(1))
            .block(Block::default().borders(Borders::ALL).title(format!("Streakboard - {}", today)))
            .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, chunks[0], &mut app.state);
    }

    let selected = app
        .state
        .selected()
        .and_then(|i| views.get(i));
    if let Some(view) = selected {
        render_detail(f, view, today, chunks[1]);
    } else {
        f.render_widget(Block::default().borders(Borders::ALL), chunks[1]);
    }

    let help_text = match app.input_mode {
        InputMode::Normal => "q: Quit | j/k: Move | a: Add goal | l: Log today | d: Delete",
        InputMode::Adding | InputMode::Logging => "Enter: Save | Esc: Cancel",
        InputMode::ConfirmDelete => "y: Delete | n/Esc: Keep",
    };
    let help = match &app.status {
        Some(msg) => Paragraph::new(msg.as_str()).style(Style::default().fg(Color::Red)),
        None => Paragraph::new(help_text).style(Style::default().fg(Color::Gray)),
    };
    f.render_widget(help.block(Block::default().borders(Borders::ALL)), chunks[2]);

    // Popups
    match app.input_mode {
        InputMode::Adding | InputMode::Logging => {
            let area = centered_rect(60, 3, f.area());
            f.render_widget(Clear, area);

            let title = match app.input_mode {
                InputMode::Adding => match app.add_state.step {
                    0 => "Add Goal: Enter Name".to_string(),
                    _ => format!("Add Goal '{}': Daily Target (minutes)", app.add_state.name),
                },
                _ => {
                    let name = app
                        .target_id
                        .and_then(|id| app.manager.repository().get(id))
                        .map(|t| t.name.clone())
                        .unwrap_or_default();
                    format!("Minutes spent on '{}' today", name)
                }
            };

            let input = Paragraph::new(app.input_buffer.as_str())
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().borders(Borders::ALL).title(title));
            f.render_widget(input, area);
        }
        InputMode::ConfirmDelete => {
            let area = centered_rect(60, 3, f.area());
            f.render_widget(Clear, area);
            let name = app
                .target_id
                .and_then(|id| app.manager.repository().get(id))
                .map(|t| t.name.clone())
                .unwrap_or_default();
            let confirm = Paragraph::new(format!("Really delete '{}'? This cannot be undone. [y/N]", name))
                .style(Style::default().fg(Color::Red))
                .block(Block::default().borders(Borders::ALL).title("Delete Goal"));
            f.render_widget(confirm, area);
        }
        InputMode::Normal => {}
    }
}

fn render_detail(f: &mut Frame, view: &TaskView<'_>, today: chrono::NaiveDate, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(area);

    let task = view.task;
    let bars: Vec<Bar> = recent_history(task, today, HISTORY_DAYS)
        .into_iter()
        .map(|d| {
            let color = if d.minutes >= task.target_time { Color::Green } else { Color::Blue };
            Bar::default()
                .value(u64::from(d.minutes))
                .label(Line::from(d.date.format("%m/%d").to_string()))
                .text_value(d.minutes.to_string())
                .style(Style::default().fg(color))
        })
        .collect();
    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(format!(
            "Last {} days (target {})",
            HISTORY_DAYS,
            format_minutes(u64::from(task.target_time))
        )))
        .data(BarGroup::default().bars(&bars))
        .bar_width(5)
        .bar_gap(1);
    f.render_widget(chart, halves[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(halves[1]);

    let p = view.progress;
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Today's progress"))
        .gauge_style(Style::default().fg(if p.goal_met_today { Color::Green } else { Color::Indexed(99) }))
        .percent(p.progress_percent.round().clamp(0.0, 100.0) as u16)
        .label(format!(
            "{} / {}",
            format_minutes(u64::from(p.time_spent_today)),
            format_minutes(u64::from(task.target_time))
        ));
    f.render_widget(gauge, right[0]);

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Streak ", Style::default().fg(Color::Gray)),
            Span::styled(format!("{} days", p.streak), Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::styled("   Total ", Style::default().fg(Color::Gray)),
            Span::raw(format_minutes(p.total_time)),
            Span::styled("   Today ", Style::default().fg(Color::Gray)),
            Span::raw(if p.goal_met_today { "Achieved" } else { "In progress" }),
        ]),
        Line::from(""),
    ];
    match view.message {
        MessageSlot::Pending => lines.push(Line::styled(
            "The coach is thinking of a message...",
            Style::default().fg(Color::Blue).add_modifier(Modifier::ITALIC),
        )),
        MessageSlot::Resolved(m) | MessageSlot::Failed(m) => {
            lines.push(Line::styled("Coach says:", Style::default().add_modifier(Modifier::BOLD)));
            lines.push(Line::styled(m.clone(), Style::default().fg(Color::Green)));
        }
        MessageSlot::Idle => {}
    }
    let stats = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(task.name.clone()));
    f.render_widget(stats, right[1]);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(r.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Length(r.height.saturating_sub(height) / 2),
        ].as_ref())
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(popup_layout[1])[1]
}
