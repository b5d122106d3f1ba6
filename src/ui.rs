pub mod charting;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, Gauge, GraphType, Paragraph, Widget},
};
use windsong::{
    hit_object::{GRID_CELLS, GRID_SIZE},
    judgment::{Tier, GOOD_WINDOW_MS, OKAY_WINDOW_MS, PERFECT_WINDOW_MS},
    scheduler::LEAD_TIME_MS,
    scoring::MAX_HEALTH,
    session::SessionStatus,
};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

const CELL_WIDTH: u16 = 11;
const CELL_HEIGHT: u16 = 5;

const APPROACH_SHADES: [&str; 5] = [" ", "░", "▒", "▓", "█"];

fn tier_color(tier: Tier) -> Color {
    match tier {
        Tier::Perfect => Color::Green,
        Tier::Good => Color::Cyan,
        Tier::Okay => Color::Yellow,
        Tier::Miss => Color::Red,
    }
}

/// Border colour for an armed object `remaining_ms` before its hit time.
fn approach_color(remaining_ms: i64) -> Color {
    let d = remaining_ms.abs();
    if d < PERFECT_WINDOW_MS {
        Color::Green
    } else if d < GOOD_WINDOW_MS {
        Color::Cyan
    } else if d < OKAY_WINDOW_MS {
        Color::Yellow
    } else {
        Color::DarkGray
    }
}

/// 0 when the object appears, 1 at its hit time.
fn approach_ratio(remaining_ms: i64) -> f64 {
    (1.0 - remaining_ms as f64 / LEAD_TIME_MS as f64).clamp(0.0, 1.0)
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

pub struct PlayView<'a> {
    pub app: &'a App,
    pub track_ms: i64,
}

impl PlayView<'_> {
    fn render_cell(&self, position: usize, rect: Rect, buf: &mut Buffer) {
        let app = self.app;
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);

        let (border_style, body) = match app.session.window().get(position) {
            Some(armed) => {
                let remaining = armed.object.time_ms - self.track_ms;
                let color = approach_color(remaining);
                let shade = (approach_ratio(remaining) * (APPROACH_SHADES.len() - 1) as f64)
                    .round() as usize;
                let fill = APPROACH_SHADES[shade].repeat(rect.width.saturating_sub(2) as usize);
                (
                    Style::default().patch(bold_style).fg(color),
                    Span::styled(fill, Style::default().fg(color)),
                )
            }
            None => match app.flash_at(position, self.track_ms) {
                Some(tier) => (
                    Style::default().fg(tier_color(tier)),
                    Span::styled(
                        tier.to_string().to_uppercase(),
                        Style::default().patch(bold_style).fg(tier_color(tier)),
                    ),
                ),
                None => (
                    dim_style,
                    Span::styled(
                        app.config
                            .key_layout
                            .key_for(position)
                            .map(String::from)
                            .unwrap_or_default(),
                        dim_style,
                    ),
                ),
            },
        };

        let block = Block::default().borders(Borders::ALL).border_style(border_style);
        let inner = block.inner(rect);
        block.render(rect, buf);

        let lines = vec![Line::from(body); inner.height.max(1) as usize];
        let text_area = if app.session.window().get(position).is_some() {
            inner
        } else {
            centered(inner, inner.width, 1)
        };
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(text_area, buf);
    }

    fn render_grid(&self, area: Rect, buf: &mut Buffer) {
        let size = GRID_SIZE as u16;
        let grid = centered(area, CELL_WIDTH * size, CELL_HEIGHT * size);
        let cell_width = grid.width / size;
        let cell_height = grid.height / size;
        if cell_width < 3 || cell_height < 3 {
            return;
        }

        for position in 0..GRID_CELLS {
            let (row, col) = ((position / GRID_SIZE) as u16, (position % GRID_SIZE) as u16);
            let rect = Rect::new(
                grid.x + col * cell_width,
                grid.y + row * cell_height,
                cell_width,
                cell_height,
            );
            self.render_cell(position, rect, buf);
        }
    }
}

impl Widget for PlayView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let app = self.app;
        let state = app.session.state();
        let display = app.display;

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_bold_style = Style::default()
            .patch(bold_style)
            .add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints(
                [
                    Constraint::Length(1), // title
                    Constraint::Length(1), // score line
                    Constraint::Length(1), // health
                    Constraint::Min(3),    // grid
                    Constraint::Length(1), // legend
                ]
                .as_ref(),
            )
            .split(area);

        let title = if app.is_paused() && app.has_started() {
            Span::styled(format!("{}  PAUSED", app.mode.title()), bold_style.fg(Color::Yellow))
        } else if self.track_ms < 0 {
            Span::styled(
                format!(
                    "{}  starting in {:.1}",
                    app.mode.title(),
                    -self.track_ms as f64 / 1000.0
                ),
                bold_style,
            )
        } else {
            Span::styled(app.mode.title(), bold_style)
        };
        Paragraph::new(title)
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        let score_line = Paragraph::new(Line::from(vec![
            Span::styled(format!("{:>8}", display.score), bold_style),
            Span::raw("   "),
            Span::styled(format!("{:6.2}%", display.percent), dim_bold_style),
            Span::raw("   "),
            Span::styled(
                format!("{}x", state.combo),
                if state.combo > 0 {
                    bold_style.fg(Color::Magenta)
                } else {
                    dim_bold_style
                },
            ),
        ]))
        .alignment(Alignment::Center);
        score_line.render(chunks[1], buf);

        let ratio = (f64::from(display.health) / f64::from(MAX_HEALTH)).clamp(0.0, 1.0);
        let health_color = if ratio > 0.5 {
            Color::Green
        } else if ratio > 0.2 {
            Color::Yellow
        } else {
            Color::Red
        };
        Gauge::default()
            .gauge_style(Style::default().fg(health_color))
            .ratio(ratio)
            .label(format!("{:.0}", display.health))
            .render(chunks[2], buf);

        self.render_grid(chunks[3], buf);

        let legend = Paragraph::new(Span::styled(
            "(space) pause / (esc) end",
            italic_style,
        ));
        legend.render(chunks[4], buf);
    }
}

pub struct ResultsView<'a> {
    pub app: &'a App,
}

impl Widget for ResultsView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let app = self.app;
        let summary = app.session.summary();

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);
        let magenta_style = Style::default().fg(Color::Magenta);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints(
                [
                    Constraint::Min(1),    // health chart
                    Constraint::Length(1), // grade
                    Constraint::Length(1), // counters
                    Constraint::Length(1), // offsets
                    Constraint::Length(1), // padding
                    Constraint::Length(1), // legend
                ]
                .as_ref(),
            )
            .split(area);

        let points = app.session.health_timeline();
        if chunks[0].height >= 3 && chunks[0].width >= 10 {
            let (overall_duration, highest) = charting::compute_chart_params(points);
            let tuples: Vec<(f64, f64)> = points.iter().map(|&p| p.into()).collect();
            let datasets = vec![Dataset::default()
                .marker(ratatui::symbols::Marker::Braille)
                .style(magenta_style)
                .graph_type(GraphType::Line)
                .data(&tuples)];

            let chart = Chart::new(datasets)
                .x_axis(
                    Axis::default()
                        .title("seconds")
                        .bounds([0.0, overall_duration])
                        .labels(vec![
                            Span::styled("0", bold_style),
                            Span::styled(charting::format_label(overall_duration), bold_style),
                        ]),
                )
                .y_axis(
                    Axis::default()
                        .title("health")
                        .bounds([0.0, highest])
                        .labels(vec![
                            Span::styled("0", bold_style),
                            Span::styled(charting::format_label(highest), bold_style),
                        ]),
                );

            chart.render(chunks[0], buf);
        }

        let status_color = match summary.status {
            SessionStatus::Failed => Color::Red,
            SessionStatus::Cleared => Color::Green,
            SessionStatus::Playing => Color::Gray,
        };
        let status = match summary.status {
            SessionStatus::Playing => "Ended".to_string(),
            other => other.to_string(),
        };
        let grade_line = Paragraph::new(Line::from(vec![
            Span::styled(status, bold_style.fg(status_color)),
            Span::styled(
                format!(
                    "   grade {}   {:.2}%   {} pts",
                    summary.grade, summary.accuracy, summary.score
                ),
                bold_style,
            ),
        ]))
        .alignment(Alignment::Center);
        grade_line.render(chunks[1], buf);

        let tier_span = |count: u32, tier: Tier| {
            Span::styled(
                format!("{count} {}", tier.to_string().to_lowercase()),
                Style::default().fg(tier_color(tier)),
            )
        };
        let counters = Line::from(vec![
            tier_span(summary.perfect, Tier::Perfect),
            Span::raw(" / "),
            tier_span(summary.good, Tier::Good),
            Span::raw(" / "),
            tier_span(summary.okay, Tier::Okay),
            Span::raw(" / "),
            tier_span(summary.miss, Tier::Miss),
            Span::raw(format!("   max combo {}", summary.combo_max)),
        ]);
        Paragraph::new(counters)
            .alignment(Alignment::Center)
            .render(chunks[2], buf);

        let offsets = match summary.offsets {
            Some(o) => format!("avg offset {:+.1}ms   sd {:.1}ms", o.mean_ms, o.std_dev_ms),
            None => "no hits".to_string(),
        };
        Paragraph::new(Span::styled(
            offsets,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

        let legend = Paragraph::new(Span::styled("(r)etry / (esc)ape", italic_style));
        legend.render(chunks[5], buf);
    }
}
