//! Ratatui-based terminal UI.
//!
//! A small query form: type a zip code, press Enter, and the mean and median
//! income are shown next to a per-bracket chart. The table is loaded once
//! before the UI starts and reused for every query.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{info, warn};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::app::pipeline::{ZoneReport, run_query};
use crate::domain::BRACKET_COUNT;
use crate::error::{AppError, EXIT_INPUT};
use crate::io::ingest::ReturnTable;
use crate::report::format_currency;

mod plotters_chart;

use plotters_chart::BracketChart;

/// Longest zone text accepted by the input box.
const MAX_INPUT_LEN: usize = 10;

/// Start the TUI over an already-loaded table.
pub fn run(table: ReturnTable) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(table);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode()
            .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(
                EXIT_INPUT,
                format!("Failed to enter alternate screen: {e}"),
            ));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    table: ReturnTable,
    input: String,
    status: String,
    report: Option<ZoneReport>,
}

impl App {
    fn new(table: ReturnTable) -> Self {
        let status = format!(
            "Loaded {} zip codes. Enter a zip code and press Enter.",
            table.stats().zones
        );
        Self {
            table,
            input: String::new(),
            status,
            report: None,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(EXIT_INPUT, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(EXIT_INPUT, format!("Event poll error: {e}")))?
            {
                continue;
            }

            let event = event::read()
                .map_err(|e| AppError::new(EXIT_INPUT, format!("Event read error: {e}")))?;
            match event {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the UI should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Esc => return true,
            KeyCode::Char('q') if self.input.is_empty() => return true,
            KeyCode::Enter => self.submit(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() && self.input.len() < MAX_INPUT_LEN {
                    self.input.push(c);
                }
            }
            _ => {}
        }
        false
    }

    fn submit(&mut self) {
        let zone = self.input.trim().to_string();
        if zone.is_empty() {
            self.status = "Enter a valid zipcode.".to_string();
            return;
        }

        match run_query(&zone, &self.table) {
            Ok(report) => {
                info!(
                    "tui query {zone}: mean={:.2} median={:.2}",
                    report.summary.mean, report.summary.median
                );
                self.status = format!("Income at zipcode {zone}.");
                self.report = Some(report);
            }
            Err(err) => {
                warn!("tui query {zone}: {err}");
                self.status = err.to_string();
                self.report = None;
            }
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_input(frame, chunks[1]);
        self.draw_body(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let line = Line::from(vec![
            Span::styled(
                "Mean and Median income calculator from IRS data.",
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(
                format!("  ({} zip codes)", self.table.stats().zones),
                Style::default().fg(Color::Gray),
            ),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_input(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let line = Line::from(vec![
            Span::raw(&self.input),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]);
        let p = Paragraph::new(line).block(
            Block::default()
                .title("Enter a valid zipcode")
                .borders(Borders::ALL),
        );
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(48), Constraint::Min(0)])
            .split(area);

        self.draw_result(frame, chunks[0]);
        self.draw_chart(frame, chunks[1]);
    }

    fn draw_result(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Result").borders(Borders::ALL);

        let Some(report) = &self.report else {
            let msg = Paragraph::new("No query yet.")
                .style(Style::default().fg(Color::Gray))
                .block(block);
            frame.render_widget(msg, area);
            return;
        };

        let mut items = Vec::new();
        items.push(ListItem::new(Text::from(vec![
            Line::from(format!("Income at zipcode {}:", report.zone_id())),
            Line::from(Span::styled(
                format!("Mean: {}", format_currency(report.summary.mean)),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("Median: {}", format_currency(report.summary.median)),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ])));

        let scheme = report.record.scheme();
        for idx in 0..BRACKET_COUNT {
            let style = if report.median_bracket == Some(idx) {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            items.push(ListItem::new(Line::from(Span::styled(
                format!("{:<24} {:>12.0}", scheme.label(idx), report.record.counts()[idx]),
                style,
            ))));
        }
        items.push(ListItem::new(format!(
            "{:<24} {:>12.0}",
            "total",
            report.record.total()
        )));

        frame.render_widget(List::new(items).block(block), area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Returns per bracket").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(report) = &self.report else {
            return;
        };

        let widget = BracketChart {
            counts: report.record.counts(),
            scheme: report.record.scheme(),
            highlight: report.median_bracket,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "digits type  Enter query  Backspace delete  Esc/q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}
