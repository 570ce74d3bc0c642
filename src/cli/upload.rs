use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, LineGauge, Paragraph},
    Frame,
};

use crate::error::{DeskError, Result};
use crate::fmt::format_bytes;
use crate::settings::{load_settings, Settings};
use crate::tui::{self, Screen, ScreenAction, FOOTER_STYLE, HEADER_STYLE};
use crate::upload::{DropOutcome, RejectReason, UploadSimulator, UploadState};

const TICK_RATE: Duration = Duration::from_millis(100);

/// Split pasted text into paths. Terminals paste dropped files shell-quoted
/// and space-separated, sometimes as `file://` URLs.
pub fn parse_dropped_paths(raw: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = raw.trim().chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => quote = Some(c),
            (None, '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            (None, c) if c.is_whitespace() => {
                if !current.is_empty() {
                    paths.push(std::mem::take(&mut current));
                }
            }
            (None, c) => current.push(c),
        }
    }
    if !current.is_empty() {
        paths.push(current);
    }

    paths
        .into_iter()
        .map(|p| PathBuf::from(p.strip_prefix("file://").unwrap_or(&p)))
        .collect()
}

pub fn describe_outcome(outcome: &DropOutcome) -> String {
    match outcome {
        DropOutcome::Started => "Uploading...".to_string(),
        DropOutcome::Busy => "An upload is already in progress.".to_string(),
        DropOutcome::Empty => "Nothing to upload.".to_string(),
        DropOutcome::Rejected(RejectReason::TooManyFiles(n)) => {
            format!("Drop one file at a time ({n} received).")
        }
        DropOutcome::Rejected(RejectReason::UnsupportedType(name)) => {
            format!("{name} is not a JPG, PNG or PDF.")
        }
    }
}

fn missing_file(paths: &[PathBuf]) -> Option<&PathBuf> {
    paths.iter().find(|p| !p.exists())
}

// ---------------------------------------------------------------------------
// Interactive drop screen
// ---------------------------------------------------------------------------

pub struct UploadScreen {
    sim: UploadSimulator,
    input: String,
    message: Option<String>,
}

impl UploadScreen {
    pub fn new(settings: &Settings) -> Self {
        Self {
            sim: UploadSimulator::new(settings.upload_delay(), settings.success_display()),
            input: String::new(),
            message: None,
        }
    }

    /// Treat `raw` as a drop event.
    pub fn submit(&mut self, raw: &str, now: Instant) -> DropOutcome {
        let paths = parse_dropped_paths(raw);
        if !self.sim.is_uploading() {
            if let Some(missing) = missing_file(&paths) {
                self.message = Some(format!("No such file: {}", missing.display()));
                return DropOutcome::Empty;
            }
        }
        let outcome = self.sim.drop_files(&paths, now);
        self.message = match outcome {
            DropOutcome::Started => None,
            ref other => Some(describe_outcome(other)),
        };
        if outcome == DropOutcome::Started {
            self.input.clear();
        }
        outcome
    }

    pub fn advance(&mut self, now: Instant) {
        self.sim.tick(now);
    }

    pub fn draw_in(&self, frame: &mut Frame, area: Rect) {
        let [header_area, _, zone_row, status_area, gauge_area, _, hints_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(8),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(" Upload a document").style(HEADER_STYLE),
            header_area,
        );

        let [zone_area] = Layout::horizontal([Constraint::Length(64)])
            .flex(Flex::Center)
            .areas(zone_row);
        let zone = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray));
        let zone_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Drop your image or PDF here, or type a path",
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .centered(),
            Line::from(Span::styled("Supports JPG, PNG, PDF", FOOTER_STYLE)).centered(),
            Line::from(""),
            Line::from(format!(" Path: {}\u{2588}", self.input)),
        ];
        frame.render_widget(Paragraph::new(zone_lines).block(zone), zone_area);

        let now = Instant::now();
        let status_line = match self.sim.state() {
            UploadState::Uploading { meta, .. } => {
                let size = meta
                    .size_bytes
                    .map(|b| format!(" ({})", format_bytes(b)))
                    .unwrap_or_default();
                Line::from(Span::styled(
                    format!(" Uploading {}{size}... ", meta.file_name),
                    Style::default().fg(Color::White).bg(Color::Blue),
                ))
            }
            UploadState::Success { file_name, handle, .. } => Line::from(Span::styled(
                format!(" Upload Successful! {file_name} (receipt {}) ", handle.0),
                Style::default().fg(Color::White).bg(Color::Green),
            )),
            UploadState::Idle => match (self.sim.last_error(), &self.message) {
                (Some(err), _) => Line::from(Span::styled(format!(" {err}"), Style::default().fg(Color::Red))),
                (None, Some(msg)) => Line::from(Span::styled(format!(" {msg}"), Style::default().fg(Color::Yellow))),
                (None, None) => Line::from(""),
            },
        };
        frame.render_widget(Paragraph::new(status_line).centered(), status_area);

        if let Some(ratio) = self.sim.progress(now) {
            let [bar] = Layout::horizontal([Constraint::Length(64)])
                .flex(Flex::Center)
                .areas(gauge_area);
            let gauge = LineGauge::default()
                .ratio(ratio)
                .filled_style(Style::default().fg(Color::Blue))
                .unfilled_style(Style::default().fg(Color::DarkGray))
                .line_set(ratatui::symbols::line::THICK);
            frame.render_widget(gauge, bar);
        }

        frame.render_widget(
            Paragraph::new(" Enter=upload  Backspace=edit  Esc=cancel/back  Ctrl+C=quit").style(FOOTER_STYLE),
            hints_area,
        );
    }
}

impl Screen for UploadScreen {
    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        self.draw_in(frame, area);
    }

    fn handle_key(&mut self, code: KeyCode) -> ScreenAction {
        match code {
            KeyCode::Esc => {
                if !self.sim.cancel() {
                    return ScreenAction::Close;
                }
                self.message = Some("Upload cancelled.".to_string());
            }
            KeyCode::Char(c) => self.input.push(c),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Enter => {
                let raw = self.input.clone();
                self.submit(&raw, Instant::now());
            }
            _ => {}
        }
        ScreenAction::Continue
    }

    fn handle_paste(&mut self, text: &str) {
        self.submit(text, Instant::now());
    }

    fn tick_rate(&self) -> Option<Duration> {
        Some(TICK_RATE)
    }

    fn tick(&mut self) {
        self.advance(Instant::now());
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

pub fn run(file: Option<&str>) -> Result<()> {
    let settings = load_settings();
    match file {
        None => {
            let mut screen = UploadScreen::new(&settings);
            tui::run_screen(&mut screen)
        }
        Some(file) => run_once(&settings, file),
    }
}

/// Run one simulated upload in the plain terminal.
fn run_once(settings: &Settings, file: &str) -> Result<()> {
    let path = PathBuf::from(file);
    if !path.exists() {
        return Err(DeskError::Other(format!("No such file: {}", path.display())));
    }

    let mut sim = UploadSimulator::new(settings.upload_delay(), settings.success_display());
    let outcome = sim.drop_files(std::slice::from_ref(&path), Instant::now());
    if outcome != DropOutcome::Started {
        return Err(DeskError::Other(describe_outcome(&outcome)));
    }
    println!("Uploading {}...", path.display());

    while sim.is_uploading() {
        if let Some(deadline) = sim.next_deadline() {
            std::thread::sleep(deadline.saturating_duration_since(Instant::now()));
        }
        sim.tick(Instant::now());
    }

    match sim.state() {
        UploadState::Success { file_name, handle, .. } => {
            println!("Upload Successful! {file_name} (receipt {})", handle.0);
            Ok(())
        }
        _ => Err(DeskError::Other(
            sim.last_error().unwrap_or("Upload failed").to_string(),
        )),
    }
}
