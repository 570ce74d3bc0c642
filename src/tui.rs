use std::time::Duration;

use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEventKind, KeyModifiers,
};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::Frame;

use crate::error::Result;
use crate::models::ReviewDecision;

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

pub const FOOTER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(40, 40, 60))
    .add_modifier(Modifier::BOLD);

pub const MUTED_STYLE: Style = Style::new().fg(Color::DarkGray);

/// Series colors for the three rejection reasons, in reason order.
pub const REASON_COLORS: [Color; 3] = [
    Color::Rgb(79, 70, 229),
    Color::Rgb(245, 158, 11),
    Color::Rgb(16, 185, 129),
];

pub const STATUS_COLORS: [Color; 2] = [Color::Rgb(251, 191, 36), Color::Rgb(16, 185, 129)];

pub const CATEGORY_COLORS: [Color; 4] = [
    Color::Rgb(59, 130, 246),
    Color::Rgb(99, 102, 241),
    Color::Rgb(16, 185, 129),
    Color::Rgb(245, 158, 11),
];

/// Legend color for bucket `idx`; buckets past the legend are gray.
pub fn legend_color(colors: &[Color], idx: usize) -> Color {
    colors.get(idx).copied().unwrap_or(Color::DarkGray)
}

/// The three mutually exclusive selector colors.
pub fn decision_style(decision: ReviewDecision) -> Style {
    match decision {
        ReviewDecision::Accept => Style::new()
            .fg(Color::Rgb(21, 128, 61))
            .bg(Color::Rgb(187, 247, 208)),
        ReviewDecision::Reject => Style::new()
            .fg(Color::Rgb(185, 28, 28))
            .bg(Color::Rgb(254, 202, 202)),
        ReviewDecision::Pending => Style::new()
            .fg(Color::Rgb(55, 65, 81))
            .bg(Color::Rgb(229, 231, 235)),
    }
}

pub fn decision_span(decision: ReviewDecision) -> Span<'static> {
    Span::styled(format!(" {:<7} ", decision.label()), decision_style(decision))
}

/// Wrap text to a given width. Returns (wrapped_string, line_count).
pub fn wrap_text(text: &str, width: usize) -> (String, u16) {
    if width == 0 {
        return (text.to_string(), 1);
    }
    let wrapped = textwrap::fill(text, width);
    let lines = wrapped.lines().count().max(1) as u16;
    (wrapped, lines)
}

// ---------------------------------------------------------------------------
// Screen infrastructure
// ---------------------------------------------------------------------------

pub enum ScreenAction {
    Continue,
    Close,
}

pub trait Screen {
    fn draw(&mut self, frame: &mut Frame);
    fn handle_key(&mut self, code: KeyCode) -> ScreenAction;
    /// Text pasted into the terminal, which is also what a file dropped onto
    /// most terminal windows arrives as.
    fn handle_paste(&mut self, _text: &str) {}
    /// How often `tick` should run while no input arrives. None blocks on input.
    fn tick_rate(&self) -> Option<Duration> {
        None
    }
    fn tick(&mut self) {}
}

pub fn enable_paste() {
    if let Err(e) = crossterm::execute!(std::io::stdout(), EnableBracketedPaste) {
        tracing::debug!("bracketed paste unavailable: {e}");
    }
}

pub fn disable_paste() {
    let _ = crossterm::execute!(std::io::stdout(), DisableBracketedPaste);
}

pub fn install_panic_hook() {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        disable_paste();
        ratatui::restore();
        hook(info);
    }));
}

/// Run an interactive ratatui screen. Sets up the terminal, event loop,
/// and panic hook, then restores the terminal on exit.
pub fn run_screen(screen: &mut dyn Screen) -> Result<()> {
    install_panic_hook();

    let mut terminal = ratatui::init();
    enable_paste();

    let result: Result<()> = loop {
        if let Err(e) = terminal.draw(|frame| screen.draw(frame)) {
            break Err(e.into());
        }

        if let Some(rate) = screen.tick_rate() {
            match event::poll(rate) {
                Ok(true) => {}
                Ok(false) => {
                    screen.tick();
                    continue;
                }
                Err(e) => break Err(e.into()),
            }
        }

        match event::read() {
            Err(e) => break Err(e.into()),
            Ok(Event::Key(key)) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && key.code == KeyCode::Char('c')
                {
                    break Ok(());
                }
                match screen.handle_key(key.code) {
                    ScreenAction::Close => break Ok(()),
                    ScreenAction::Continue => {}
                }
            }
            Ok(Event::Paste(text)) => screen.handle_paste(&text),
            _ => {}
        }
    };

    disable_paste();
    drop(terminal);
    ratatui::restore();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legend_color_past_legend_is_gray() {
        assert_eq!(legend_color(&STATUS_COLORS, 0), STATUS_COLORS[0]);
        assert_eq!(legend_color(&STATUS_COLORS, 2), Color::DarkGray);
    }

    #[test]
    fn test_decision_styles_are_distinct() {
        let styles: Vec<Style> = ReviewDecision::ALL.iter().map(|d| decision_style(*d)).collect();
        assert_ne!(styles[0], styles[1]);
        assert_ne!(styles[1], styles[2]);
        assert_ne!(styles[0], styles[2]);
    }

    #[test]
    fn test_wrap_text() {
        let (wrapped, lines) = wrap_text("https://files.example.com/reports/2024/01/15.pdf", 20);
        assert!(lines > 1);
        assert!(wrapped.lines().all(|l| l.len() <= 20));
        assert_eq!(wrap_text("short", 0), ("short".to_string(), 1));
    }
}
