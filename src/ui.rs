use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph, Wrap};

use crate::form::{AddMemberForm, FormField};
use crate::model::Member;
use crate::state::{AppState, PredictionView, StatCard};

const ACCENT: Color = Color::Indexed(63);
const ACCENT_LIGHT: Color = Color::Indexed(111);
const ROW_HEIGHT: u16 = 2;
const SKILLS_SHOWN: usize = 2;

pub fn draw(frame: &mut Frame, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(6),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_stats(frame, chunks[1], state);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(chunks[2]);
    render_member_list(frame, body[0], state);

    let sidebar = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(5)])
        .split(body[1]);
    render_performance_chart(frame, sidebar[0], state);
    render_model_panel(frame, sidebar[1], state);

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[3]);

    let footer = Paragraph::new(footer_text(state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[4]);

    let area = frame.size();
    if state.help_overlay {
        render_help_overlay(frame, area);
    }
    if !matches!(state.prediction_view(), PredictionView::Hidden) {
        render_prediction_modal(frame, area, state);
    }
    if let Some(form) = &state.add_form {
        render_add_member_modal(frame, area, form);
    }
}

fn header_text(state: &AppState) -> Line<'static> {
    let search = if state.search_active {
        format!("/{}_", state.search)
    } else if state.search.is_empty() {
        "/ to search".to_string()
    } else {
        format!("/{}", state.search)
    };
    let search_style = if state.search_active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Line::from(vec![
        Span::styled(
            " STAFFING ",
            Style::default().fg(Color::White).bg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" AI", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        Span::raw(" | "),
        Span::styled(search, search_style),
    ])
}

fn footer_text(state: &AppState) -> &'static str {
    if state.add_form.is_some() {
        "Tab/↓ Next field | Shift-Tab/↑ Prev | Enter Save | Esc Cancel"
    } else if state.show_prediction {
        "Enter Confirm | Esc Close | r Retry | q Quit"
    } else if state.search_active {
        "Type to filter | Backspace Delete | Enter Keep | Esc Clear"
    } else {
        "j/k/↑/↓ Move | / Search | a Add member | p/Enter Predict role | ? Help | q Quit"
    }
}

fn render_stats(frame: &mut Frame, area: Rect, state: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);
    for (card, col) in state.stats_cards().iter().zip(cols.iter()) {
        frame.render_widget(stat_card(card), *col);
    }
}

fn stat_card(card: &StatCard) -> Paragraph<'static> {
    let mut spans = vec![Span::styled(
        card.value.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if let Some(trend) = &card.trend {
        let color = if trend.up { Color::Green } else { Color::Red };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(trend.text.clone(), Style::default().fg(color)));
    }
    Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(card.label)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT)),
    )
}

fn render_member_list(frame: &mut Frame, area: Rect, state: &AppState) {
    let filtered = state.filtered_members();
    let block = Block::default()
        .title(format!("Team roster ({} found)", filtered.len()))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if filtered.is_empty() {
        let empty = Paragraph::new("No members match this search")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }
    if inner.height < ROW_HEIGHT {
        return;
    }

    let visible = (inner.height / ROW_HEIGHT) as usize;
    let (start, end) = visible_range(state.selected, filtered.len(), visible);
    let mut lines = Vec::with_capacity((end - start) * ROW_HEIGHT as usize);
    for idx in start..end {
        let selected = idx == state.selected;
        lines.extend(member_row(filtered[idx], selected));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn member_row(member: &Member, selected: bool) -> [Line<'static>; 2] {
    let base = if selected {
        Style::default().fg(Color::White).bg(Color::DarkGray)
    } else {
        Style::default()
    };
    let prefix = if selected { "> " } else { "  " };
    let rating = format!("{:.1}/5", member.average_rating());

    let mut skills: Vec<String> = member
        .skills
        .iter()
        .take(SKILLS_SHOWN)
        .map(|s| format!("[{s}]"))
        .collect();
    if member.skills.len() > SKILLS_SHOWN {
        skills.push(format!("+{} more", member.skills.len() - SKILLS_SHOWN));
    }

    [
        Line::from(vec![
            Span::styled(prefix, base),
            Span::styled(member.name.clone(), base.add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {}", member.email), base.fg(Color::Gray)),
            Span::styled(format!("  avg {rating}"), base.fg(ACCENT_LIGHT)),
        ]),
        Line::from(vec![
            Span::styled("    ", base),
            Span::styled(skills.join(" "), base.fg(Color::DarkGray)),
        ]),
    ]
}

fn render_performance_chart(frame: &mut Frame, area: Rect, state: &AppState) {
    let data = state.performance_data();
    let block = Block::default().title("Member performance").borders(Borders::ALL);
    if data.is_empty() {
        frame.render_widget(Paragraph::new("No members yet").block(block), area);
        return;
    }

    let bars: Vec<Bar> = data
        .iter()
        .enumerate()
        .map(|(idx, datum)| {
            let color = if idx % 2 == 0 { ACCENT } else { ACCENT_LIGHT };
            Bar::default()
                .value((datum.average_rating * 10.0).round() as u64)
                .text_value(format!("{:.1}", datum.average_rating))
                .label(Line::from(datum.short_name.clone()))
                .style(Style::default().fg(color))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(5)
        .bar_gap(1)
        .max(50);
    frame.render_widget(chart, area);
}

fn render_model_panel(frame: &mut Frame, area: Rect, state: &AppState) {
    let text = vec![
        Line::from("Matches team strengths to event needs."),
        Line::from(vec![
            Span::styled("Model: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(state.model_name.clone()),
        ]),
    ];
    let panel = Paragraph::new(text).wrap(Wrap { trim: true }).block(
        Block::default()
            .title("Optimised with Gemini")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT)),
    );
    frame.render_widget(panel, area);
}

fn render_prediction_modal(frame: &mut Frame, area: Rect, state: &AppState) {
    let popup = centered_rect(70, 70, area);
    frame.render_widget(Clear, popup);

    let member = state.prediction_member();
    let name = member.map(|m| m.name.as_str()).unwrap_or("-");
    let block = Block::default()
        .title(format!("AI role prediction: {name}"))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT));

    let mut lines = Vec::new();
    if let Some(m) = member {
        lines.push(Line::from(vec![
            Span::styled("Avatar: ", Style::default().fg(Color::DarkGray)),
            Span::styled(m.avatar.clone(), Style::default().fg(Color::Gray)),
        ]));
    }
    lines.extend(prediction_lines(state.prediction_view()));
    let body = Paragraph::new(lines).wrap(Wrap { trim: false }).block(block);
    frame.render_widget(body, popup);
}

fn prediction_lines(view: PredictionView<'_>) -> Vec<Line<'static>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    match view {
        PredictionView::Hidden => Vec::new(),
        PredictionView::Loading => vec![
            Line::from(""),
            Line::styled(
                "Gemini is analysing history and performance patterns...",
                Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            ),
        ],
        PredictionView::Ready(p) => vec![
            Line::from(vec![
                Span::styled("Recommended role: ", bold.fg(ACCENT_LIGHT)),
                Span::styled(p.recommended_role.label(), bold),
            ]),
            Line::from(vec![
                Span::styled("AI confidence:    ", bold.fg(Color::Green)),
                Span::styled(format!("{}%", p.confidence_percent()), bold),
            ]),
            Line::from(""),
            Line::styled("Why this role", bold),
            Line::styled(
                format!("\"{}\"", p.reasoning),
                Style::default().add_modifier(Modifier::ITALIC),
            ),
            Line::from(""),
            Line::from(vec![
                Span::styled("Alternative role: ", bold),
                Span::raw(p.alternative_role.label()),
            ]),
            Line::from(vec![
                Span::styled("Growth focus: ", bold),
                Span::raw(p.suggested_improvement.clone()),
            ]),
            Line::from(""),
            Line::styled(
                "Enter confirm assignment | Esc close",
                Style::default().fg(Color::DarkGray),
            ),
        ],
        PredictionView::Failed(reason) => vec![
            Line::from(""),
            Line::styled(
                "Could not generate a prediction.",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Line::styled(format!("Reason: {reason}"), Style::default().fg(Color::Red)),
            Line::from(""),
            Line::styled("r retry | Esc close", Style::default().fg(Color::DarkGray)),
        ],
    }
}

fn render_add_member_modal(frame: &mut Frame, area: Rect, form: &AddMemberForm) {
    let popup = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup);

    let mut lines = Vec::new();
    for field in FormField::ALL {
        let focused = form.focus == field;
        let label_style = if focused {
            Style::default().fg(ACCENT_LIGHT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        lines.push(Line::styled(field.label(), label_style));

        let value = form.value(field);
        let cursor = if focused { "_" } else { "" };
        if value.is_empty() && !focused {
            lines.push(Line::styled(
                format!("  {}", field.placeholder()),
                Style::default().fg(Color::DarkGray),
            ));
        } else {
            lines.push(Line::from(format!("  {value}{cursor}")));
        }
        for err in form.errors_for(field) {
            lines.push(Line::styled(
                format!("  ! {err}"),
                Style::default().fg(Color::Red),
            ));
        }
        lines.push(Line::from(""));
    }
    lines.push(Line::styled(
        "Enter save member | Esc cancel",
        Style::default().fg(Color::DarkGray),
    ));

    let body = Paragraph::new(lines).block(
        Block::default()
            .title("Add new member")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT)),
    );
    frame.render_widget(body, popup);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No activity yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Staffing Terminal - Help",
        "",
        "Roster:",
        "  j/k or ↑/↓   Move",
        "  /            Search name, email, skills",
        "  a            Add member",
        "  p / Enter    Predict best role",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Prediction:",
        "  Enter / Esc  Close",
        "  r            Retry after a failure",
    ]
    .join("\n");

    let help = Paragraph::new(text).block(Block::default().title("Help").borders(Borders::ALL));
    frame.render_widget(help, popup_area);
}

pub fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

#[cfg(test)]
mod tests {
    use super::visible_range;

    #[test]
    fn visible_range_keeps_selection_centered() {
        assert_eq!(visible_range(0, 0, 5), (0, 0));
        assert_eq!(visible_range(3, 4, 5), (0, 4));
        assert_eq!(visible_range(5, 20, 4), (3, 7));
        assert_eq!(visible_range(19, 20, 4), (16, 20));
    }
}
