use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::calendar;
use crate::grid::{Cell, GridGeometry};

use super::app::{AppState, GridLayout, StatusKind};

const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const LABEL_WIDTH: u16 = 4;
const CELL_WIDTH: u16 = 2;
const COLUMN_STEP: u16 = 3;
const DETAIL_WIDTH: u16 = 28;
const HELP_KEY_WIDTH: usize = 12;
const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_MUTED_DARK: Color = Color::Rgb(118, 124, 130);
const COLOR_BG_MUTED: Color = Color::Rgb(52, 56, 60);
const COLOR_INFO: Color = Color::Rgb(116, 198, 219);
const COLOR_WARNING: Color = Color::Rgb(244, 200, 98);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_BORDER_GRID: Color = Color::Rgb(92, 126, 166);
const COLOR_BORDER_DETAIL: Color = Color::Rgb(180, 156, 92);

pub fn render(frame: &mut Frame, app: &mut AppState) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);
    let title = chunks[0];
    let main = chunks[1];
    let footer = chunks[2];

    render_title(frame, app, title);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(DETAIL_WIDTH)].as_ref())
        .split(main);
    render_grid(frame, app, chunks[0]);
    render_detail(frame, app, chunks[1]);

    render_footer(frame, app, footer);

    if let (Some(cell), Some(pointer)) = (app.hovered_cell(), app.pointer) {
        render_tooltip(frame, cell, pointer, area);
    }
    if app.show_help {
        render_help_modal(frame, area);
    }
}

fn render_title(frame: &mut Frame, app: &AppState, area: Rect) {
    let mut spans = vec![Span::styled(
        "habitviz",
        Style::default()
            .fg(COLOR_ACCENT)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(snapshot) = app.snapshot.as_ref() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("{} weeks ending {}", snapshot.weeks, snapshot.today),
            Style::default().fg(COLOR_MUTED),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Fit the grid into `inner`, newest week against the right edge of the
/// drawn columns. Returns `None` when not even one column fits.
pub(crate) fn grid_layout(inner: Rect, cells: &[Cell]) -> Option<GridLayout> {
    let min_column = cells.iter().map(|cell| cell.column).min()?;
    let max_column = cells.iter().map(|cell| cell.column).max()?;
    if inner.height < WEEKDAY_LABELS.len() as u16 {
        return None;
    }
    let room = inner.width.saturating_sub(LABEL_WIDTH) + (COLUMN_STEP - CELL_WIDTH);
    let visible = i64::from(room / COLUMN_STEP);
    if visible == 0 {
        return None;
    }
    let left_column = max_column.min(min_column + visible - 1);
    let origin = f64::from(inner.x + LABEL_WIDTH);

    Some(GridLayout {
        geometry: GridGeometry {
            cell_width: f64::from(CELL_WIDTH),
            cell_height: 1.0,
            spacing_x: f64::from(COLUMN_STEP),
            spacing_y: 1.0,
            right_edge: origin + (left_column + 1) as f64 * f64::from(COLUMN_STEP),
            top: f64::from(inner.y),
        },
        left_column,
        area: inner,
    })
}

fn render_grid(frame: &mut Frame, app: &mut AppState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(COLOR_BORDER_GRID))
        .title("Habits");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    app.layout = grid_layout(inner, app.cells());
    let Some(layout) = app.layout else {
        let message = if app.loading {
            "loading..."
        } else if app.cells().is_empty() {
            "no history"
        } else {
            "terminal too small"
        };
        let widget = Paragraph::new(Span::styled(message, Style::default().fg(COLOR_MUTED)));
        frame.render_widget(widget, inner);
        return;
    };

    let labels: Vec<Line> = WEEKDAY_LABELS
        .iter()
        .map(|label| Line::from(Span::styled(*label, Style::default().fg(COLOR_MUTED_DARK))))
        .collect();
    let label_area = Rect::new(inner.x, inner.y, LABEL_WIDTH.min(inner.width), 7);
    frame.render_widget(Paragraph::new(labels), label_area);

    let selected = app.selected_cell().map(|cell| cell.date);
    for cell in app.cells() {
        if cell.column > layout.left_column {
            continue;
        }
        let bounds = layout.geometry.cell_bounds(cell);
        if bounds.x < f64::from(inner.x) || bounds.y < f64::from(inner.y) {
            continue;
        }
        let rect = Rect::new(bounds.x as u16, bounds.y as u16, CELL_WIDTH, 1);
        let (r, g, b) = cell.tier.rgb();
        let mut style = Style::default().bg(Color::Rgb(r, g, b));
        let text = if selected == Some(cell.date) {
            style = style.fg(Color::Black).add_modifier(Modifier::BOLD);
            "[]"
        } else {
            "  "
        };
        frame.render_widget(Paragraph::new(Span::styled(text, style)), rect);
    }
}

fn render_detail(frame: &mut Frame, app: &AppState, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    if let Some(cell) = app.selected_cell() {
        lines.extend(tooltip_text(cell));
    } else {
        lines.push(Line::from(Span::styled(
            "no day selected",
            Style::default().fg(COLOR_MUTED),
        )));
    }

    if let Some(snapshot) = app.snapshot.as_ref() {
        let summary = &snapshot.summary;
        lines.push(Line::from(""));
        lines.push(detail_line("active", format!("{}/{}", summary.active_days, summary.days)));
        lines.push(detail_line("tasks", summary.occurrences.to_string()));
        if let Some(busiest) = summary.busiest {
            lines.push(detail_line("busiest", calendar::date_key(busiest)));
        }
        lines.push(detail_line("mode", snapshot.week_mode.to_string()));
    }

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(COLOR_BORDER_DETAIL))
                .title("Day"),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

fn detail_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<8}"), Style::default().fg(COLOR_MUTED)),
        Span::styled(value, Style::default().fg(COLOR_TEXT)),
    ])
}

fn tooltip_text(cell: &Cell) -> Vec<Line<'static>> {
    cell.tooltip_lines()
        .into_iter()
        .enumerate()
        .map(|(idx, text)| {
            let style = match idx {
                0 => Style::default().fg(COLOR_MUTED),
                1 => Style::default().fg(COLOR_TEXT).add_modifier(Modifier::BOLD),
                2 => Style::default().fg(COLOR_ACCENT),
                _ => Style::default().fg(COLOR_TEXT),
            };
            Line::from(Span::styled(text, style))
        })
        .collect()
}

fn render_tooltip(frame: &mut Frame, cell: &Cell, pointer: (u16, u16), area: Rect) {
    let lines = tooltip_text(cell);
    let width = lines.iter().map(|line| line.width()).max().unwrap_or(0) as u16 + 2;
    let height = lines.len() as u16 + 2;
    let rect = tooltip_rect(pointer, width, height, area);
    frame.render_widget(Clear, rect);
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(COLOR_BG_MUTED)),
    );
    frame.render_widget(widget, rect);
}

/// Place the tooltip to the lower right of the pointer, flipping to the
/// other side of it on whichever axis would overflow `area`.
pub(crate) fn tooltip_rect(pointer: (u16, u16), width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let (px, py) = pointer;

    let mut x = px.saturating_add(2);
    if x.saturating_add(width) > area.right() {
        x = px.saturating_sub(width.saturating_add(1)).max(area.x);
    }
    let mut y = py.saturating_add(1);
    if y.saturating_add(height) > area.bottom() {
        y = py.saturating_sub(height).max(area.y);
    }
    Rect::new(x, y, width, height)
}

fn render_footer(frame: &mut Frame, app: &AppState, area: Rect) {
    let hint = app.footer_hint();
    let hint_span = Span::styled(hint, Style::default().fg(COLOR_INFO));
    let line = if let Some((status, kind)) = app.status_line() {
        let status_style = match kind {
            StatusKind::Error => Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
            StatusKind::Info => Style::default().fg(COLOR_WARNING),
        };
        Line::from(vec![
            hint_span,
            Span::raw("  |  "),
            Span::styled(status, status_style),
        ])
    } else {
        Line::from(hint_span)
    };
    let summary_line = Line::from(Span::styled(
        app.summary_line(),
        Style::default().fg(COLOR_ACCENT),
    ));
    let widget = Paragraph::new(vec![line, summary_line])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(COLOR_BORDER_GRID)),
        );
    frame.render_widget(widget, area);
}

fn render_help_modal(frame: &mut Frame, area: Rect) {
    let entries = [
        ("h / left", "older week"),
        ("l / right", "newer week"),
        ("k / up", "previous day"),
        ("j / down", "next day"),
        ("t / home", "jump to today"),
        ("mouse", "hover for tasks, click to select"),
        ("r", "reload sources"),
        ("iso mode", "week numbers restart in January"),
        ("esc / q", "quit"),
    ];
    let width = 48u16;
    let modal = centered_rect(width, entries.len() as u16 + 2, area);
    frame.render_widget(Clear, modal);
    let content_width = modal.width.saturating_sub(2) as usize;
    let lines: Vec<Line> = entries
        .iter()
        .map(|(keys, desc)| help_line(keys, desc, content_width))
        .collect();
    let widget = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Keys"));
    frame.render_widget(widget, modal);
}

fn help_line(keys: &str, desc: &str, width: usize) -> Line<'static> {
    let key_width = HELP_KEY_WIDTH.min(width);
    let desc_width = width.saturating_sub(HELP_KEY_WIDTH + 1);
    Line::from(vec![
        Span::styled(
            format!("{keys:<key_width$}"),
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            desc.chars().take(desc_width).collect::<String>(),
            Style::default().fg(COLOR_MUTED),
        ),
    ])
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::WeekMode;
    use crate::grid::build_grid;
    use crate::history::Aggregate;
    use chrono::NaiveDate;

    fn cells(weeks: u32) -> Vec<Cell> {
        let today = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
        build_grid(&Aggregate::new(), today, weeks, WeekMode::Continuous)
    }

    #[test]
    fn layout_draws_columns_right_to_left() {
        let cells = cells(3);
        let layout = grid_layout(Rect::new(1, 2, 40, 8), &cells).unwrap();
        assert_eq!(layout.left_column, 3);

        // Oldest column sits right after the labels, today in the last slot.
        let oldest = layout.geometry.bounds(3, 0);
        assert_eq!(oldest.x, 5.0);
        let newest = layout.geometry.bounds(0, 2);
        assert_eq!(newest.x, 14.0);
        assert_eq!(newest.y, 4.0);
    }

    #[test]
    fn layout_keeps_newest_weeks_when_narrow() {
        let cells = cells(10);
        // Room for labels plus three columns.
        let layout = grid_layout(Rect::new(0, 0, 12, 7), &cells).unwrap();
        assert_eq!(layout.left_column, 2);
        assert_eq!(layout.geometry.bounds(2, 0).x, 4.0);
        assert_eq!(layout.geometry.bounds(0, 0).x, 10.0);
    }

    #[test]
    fn layout_requires_room() {
        let cells = cells(3);
        assert!(grid_layout(Rect::new(0, 0, 5, 7), &cells).is_none());
        assert!(grid_layout(Rect::new(0, 0, 40, 6), &cells).is_none());
        assert!(grid_layout(Rect::new(0, 0, 40, 8), &[]).is_none());
    }

    #[test]
    fn tooltip_flips_near_edges() {
        let area = Rect::new(0, 0, 80, 24);
        assert_eq!(tooltip_rect((10, 5), 14, 5, area), Rect::new(12, 6, 14, 5));
        assert_eq!(tooltip_rect((75, 5), 14, 5, area), Rect::new(60, 6, 14, 5));
        assert_eq!(tooltip_rect((10, 22), 14, 5, area), Rect::new(12, 17, 14, 5));
    }
}
