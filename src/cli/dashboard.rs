use std::time::Duration;

use crossterm::event::KeyCode;
use rand::seq::SliceRandom;
use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Bar, BarChart, BarGroup, Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table,
        TableState,
    },
    Frame,
};

use crate::aggregate::{Histogram, MONTH_LABELS};
use crate::cli::upload::UploadScreen;
use crate::error::Result;
use crate::feed;
use crate::fmt::{display_label, number, percent};
use crate::models::{Record, RejectionReason, ReviewDecision};
use crate::session::{DashboardSession, SortColumn, TableSort};
use crate::settings::{load_settings, Settings};
use crate::tui::{
    self, decision_span, legend_color, wrap_text, Screen, ScreenAction, CATEGORY_COLORS,
    FOOTER_STYLE, HEADER_STYLE, MUTED_STYLE, REASON_COLORS, SELECTED_STYLE, STATUS_COLORS,
};

const GREETINGS: &[&str] = &[
    "Let's see what came in.",
    "The queue awaits.",
    "Another batch of paperwork.",
    "Fresh uploads, same old blurry scans.",
    "Right, where were we?",
    "Nothing rejected yet today. Probably.",
    "Pull up a chair.",
    "Ah, there you are.",
];

const UPLOAD_TICK: Duration = Duration::from_millis(100);

enum DashboardScreen {
    Home,
    Upload(UploadScreen),
}

pub struct Dashboard {
    settings: Settings,
    source: String,
    session: DashboardSession,
    screen: DashboardScreen,
    greeting: String,
    sort: TableSort,
    table_state: TableState,
    status_message: Option<String>,
}

impl Dashboard {
    pub fn new(settings: Settings, source: String, records: Vec<Record>) -> Self {
        let mut rng = rand::thread_rng();
        let random_greeting = GREETINGS.choose(&mut rng).unwrap_or(&"Hello.");
        let first_name = settings.user_name.split_whitespace().next().unwrap_or("");
        let greeting = if first_name.is_empty() {
            format!("Review desk: {random_greeting}")
        } else {
            format!("Hello, {first_name}. {random_greeting}")
        };

        let mut dashboard = Self {
            settings,
            source,
            session: DashboardSession::default(),
            screen: DashboardScreen::Home,
            greeting,
            sort: TableSort::default(),
            table_state: TableState::default(),
            status_message: None,
        };
        dashboard.reload(records);
        dashboard
    }

    /// Replace the dataset. Decisions, the open report and the selection all
    /// start over from the new records.
    pub fn reload(&mut self, records: Vec<Record>) {
        self.session = DashboardSession::load(records);
        tracing::debug!(decisions = self.session.statuses().len(), "session loaded");
        let first = if self.session.records().is_empty() { None } else { Some(0) };
        self.table_state = TableState::default().with_selected(first);
    }

    pub fn is_uploading_screen(&self) -> bool {
        matches!(self.screen, DashboardScreen::Upload(_))
    }

    /// Id of the highlighted table row.
    pub fn selected_id(&self) -> Option<i64> {
        let idx = self.table_state.selected()?;
        self.session.sorted(self.sort).get(idx).map(|r| r.id)
    }

    fn select_id(&mut self, id: Option<i64>) {
        let pos = id.and_then(|id| self.session.sorted(self.sort).iter().position(|r| r.id == id));
        self.table_state.select(pos.or(self.table_state.selected()));
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.session.records().len();
        if len == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1) as usize;
        self.table_state.select(Some(next));
    }

    fn set_selected_decision(&mut self, pick: impl FnOnce(ReviewDecision) -> ReviewDecision) {
        let Some(id) = self.selected_id() else {
            return;
        };
        let next = pick(self.session.decision(id));
        match self.session.set_status(id, next) {
            Ok(()) => {
                tracing::debug!(id, decision = next.label(), "decision changed");
                self.status_message = None;
            }
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    fn resort(&mut self, sort: TableSort) {
        let keep = self.selected_id();
        self.sort = sort;
        self.select_id(keep);
    }

    fn open_selected_report(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        if let Err(e) = self.session.open_report(id) {
            self.status_message = Some(e.to_string());
        }
    }

    fn open_upload(&mut self) {
        if !self.is_uploading_screen() {
            self.screen = DashboardScreen::Upload(UploadScreen::new(&self.settings));
        }
    }

    fn handle_home_key(&mut self, code: KeyCode) -> ScreenAction {
        if self.session.viewer().is_open() {
            if matches!(code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                self.session.close_report();
            }
            return ScreenAction::Continue;
        }

        match code {
            KeyCode::Char('q') => return ScreenAction::Close,
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-10),
            KeyCode::PageDown => self.move_selection(10),
            KeyCode::Right => self.set_selected_decision(ReviewDecision::cycle_next),
            KeyCode::Left => self.set_selected_decision(ReviewDecision::cycle_prev),
            KeyCode::Char('p') => self.set_selected_decision(|_| ReviewDecision::Pending),
            KeyCode::Char('a') => self.set_selected_decision(|_| ReviewDecision::Accept),
            KeyCode::Char('x') => self.set_selected_decision(|_| ReviewDecision::Reject),
            KeyCode::Char('s') => self.resort(TableSort {
                column: self.sort.column.next(),
                descending: self.sort.descending,
            }),
            KeyCode::Char('S') => self.resort(TableSort {
                column: self.sort.column,
                descending: !self.sort.descending,
            }),
            KeyCode::Enter | KeyCode::Char('v') => self.open_selected_report(),
            KeyCode::Char('u') => self.open_upload(),
            KeyCode::F(5) => {
                let records = feed::load_or_empty(&self.source);
                tracing::info!(records = records.len(), source = %self.source, "reloaded");
                self.reload(records);
                self.status_message = Some(format!("Reloaded {} records.", self.session.records().len()));
            }
            KeyCode::Esc => self.status_message = None,
            _ => {}
        }
        ScreenAction::Continue
    }

    // -----------------------------------------------------------------------
    // Drawing
    // -----------------------------------------------------------------------

    fn draw_home(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let border_style = Style::default().fg(Color::DarkGray);

        let [header_area, sep1, cards_area, sep2, table_area, hints_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(14),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(format!(" {}", self.greeting), HEADER_STYLE),
                Span::styled(format!("   {}", self.source), MUTED_STYLE),
            ])),
            header_area,
        );

        let sep_line = "━".repeat(area.width as usize);
        let sep_widget = Paragraph::new(sep_line.as_str()).style(border_style);
        frame.render_widget(sep_widget.clone(), sep1);
        frame.render_widget(sep_widget, sep2);

        let [left_area, right_area] =
            Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
                .areas(cards_area);
        let [total_area, chart_area] =
            Layout::vertical([Constraint::Length(3), Constraint::Fill(1)]).areas(left_area);

        self.draw_total(frame, total_area);
        self.draw_monthly_chart(frame, chart_area);

        let summary = self.session.summary();
        let [status_area, category_area] =
            Layout::vertical([Constraint::Length(5), Constraint::Fill(1)]).areas(right_area);
        let bar_width = right_area.width.saturating_sub(36) as usize;
        frame.render_widget(
            Paragraph::new(proportion_lines("Status", &summary.status, &STATUS_COLORS, bar_width)),
            status_area,
        );
        frame.render_widget(
            Paragraph::new(proportion_lines(
                "Categories",
                &summary.categories,
                &CATEGORY_COLORS,
                bar_width,
            )),
            category_area,
        );

        self.draw_table(frame, table_area);

        let hints = match &self.status_message {
            Some(msg) => Paragraph::new(format!(" {msg}")).style(Style::default().fg(Color::Yellow)),
            None => {
                let keys = "\u{2191}\u{2193}=select  \u{2190}\u{2192}/p/a/x=decide  s/S=sort  v=report  u=upload  F5=reload  q=quit";
                let statuses = self.session.statuses();
                let text = if statuses.is_empty() {
                    format!(" {keys}")
                } else {
                    let tally = statuses.tally();
                    format!(
                        " {} pending  {} accepted  {} rejected   {keys}",
                        tally.pending, tally.accepted, tally.rejected
                    )
                };
                Paragraph::new(text).style(FOOTER_STYLE)
            }
        };
        frame.render_widget(hints, hints_area);

        if let Some(path) = self.session.viewer().current() {
            draw_report_modal(frame, area, path);
        }
    }

    fn draw_total(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray));
        let summary = self.session.summary();
        let line = Line::from(vec![
            Span::raw(" Total Records  "),
            Span::styled(number(summary.total), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                format!("   {} complete", number(summary.status.count("Complete"))),
                MUTED_STYLE,
            ),
        ]);
        frame.render_widget(Paragraph::new(line).block(block), area);
    }

    fn draw_monthly_chart(&self, frame: &mut Frame, area: Rect) {
        let monthly = &self.session.summary().monthly;

        let [legend_area, bar_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(area);

        let mut legend = vec![Span::styled(
            " Rejections by month  ",
            Style::default().add_modifier(Modifier::BOLD),
        )];
        for reason in RejectionReason::ALL {
            legend.push(Span::styled(
                "\u{25A0} ",
                Style::default().fg(REASON_COLORS[reason.index()]),
            ));
            legend.push(Span::raw(format!("{}  ", reason.label())));
        }
        frame.render_widget(Paragraph::new(Line::from(legend)), legend_area);

        let groups: Vec<BarGroup> = MONTH_LABELS
            .iter()
            .enumerate()
            .map(|(month, label)| {
                let bars: Vec<Bar> = RejectionReason::ALL
                    .iter()
                    .map(|reason| {
                        Bar::default()
                            .value(monthly.get(month, reason.index()) as u64)
                            .text_value(String::new())
                            .style(Style::default().fg(REASON_COLORS[reason.index()]))
                    })
                    .collect();
                BarGroup::default().label(Line::from(*label)).bars(&bars)
            })
            .collect();

        let mut chart = BarChart::default()
            .bar_width(1)
            .bar_gap(0)
            .group_gap(1)
            .max(monthly.max_cell().max(1) as u64);
        for group in &groups {
            chart = chart.data(group.clone());
        }
        frame.render_widget(chart, bar_area);
    }

    fn draw_table(&mut self, frame: &mut Frame, area: Rect) {
        let sort = self.sort;
        let header_cells: Vec<Cell> = SortColumn::ALL
            .iter()
            .map(|col| {
                let mut label = col.label().to_string();
                if *col == sort.column {
                    label.push_str(if sort.descending { " \u{25BC}" } else { " \u{25B2}" });
                }
                Cell::from(label)
            })
            .chain(std::iter::once(Cell::from("Report")))
            .collect();
        let header = Row::new(header_cells).style(Style::default().add_modifier(Modifier::BOLD));

        let statuses = self.session.statuses();
        let rows: Vec<Row> = self
            .session
            .sorted(sort)
            .into_iter()
            .map(|rec| {
                Row::new(vec![
                    Cell::from(rec.id.to_string()),
                    Cell::from(rec.account_number.clone()),
                    Cell::from(rec.upload_date.clone()),
                    Cell::from(rec.completion_date.clone()),
                    Cell::from(rec.status.clone()),
                    Cell::from(rec.category.clone()),
                    Cell::from(rec.issue_type.clone()),
                    Cell::from(display_label(&rec.rejection_reason).to_string()),
                    Cell::from(Line::from(decision_span(statuses.get(rec.id)))),
                    if rec.has_report() {
                        Cell::from("View")
                    } else {
                        Cell::from(Span::styled("-", MUTED_STYLE))
                    },
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(5),
            Constraint::Length(15),
            Constraint::Length(12),
            Constraint::Length(16),
            Constraint::Length(9),
            Constraint::Length(18),
            Constraint::Fill(1),
            Constraint::Length(17),
            Constraint::Length(13),
            Constraint::Length(7),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(SELECTED_STYLE)
            .highlight_symbol("\u{25B8}");

        if self.session.records().is_empty() {
            let [head, body] =
                Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(area);
            frame.render_widget(table, head);
            frame.render_widget(
                Paragraph::new(" No records loaded. Press F5 to retry or run `reviewdesk demo`.")
                    .style(MUTED_STYLE),
                body,
            );
        } else {
            frame.render_stateful_widget(table, area, &mut self.table_state);
        }
    }
}

fn draw_report_modal(frame: &mut Frame, area: Rect, path: &str) {
    let width = area.width.saturating_mul(3) / 5;
    let (wrapped, lines) = wrap_text(path, width.saturating_sub(4) as usize);
    let [row] = Layout::vertical([Constraint::Length(lines + 5)])
        .flex(Flex::Center)
        .areas(area);
    let [modal] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);

    let block = Block::default()
        .title(" Report ")
        .title_style(Style::default().add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);

    let mut text: Vec<Line> = vec![Line::from("")];
    text.extend(wrapped.lines().map(|l| Line::from(format!(" {l}"))));
    text.push(Line::from(""));
    text.push(Line::from(Span::styled(" Esc=close", FOOTER_STYLE)));

    frame.render_widget(Clear, modal);
    frame.render_widget(Paragraph::new(text).block(block), modal);
}

/// One legend row per bucket: swatch, label, count, share and a bar.
fn proportion_lines(
    title: &str,
    hist: &Histogram,
    colors: &[Color],
    bar_width: usize,
) -> Vec<Line<'static>> {
    let total = hist.total();
    let mut lines = vec![Line::from(Span::styled(
        format!(" {title}"),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    for (idx, bucket) in hist.buckets().iter().enumerate() {
        let color = if bucket.recognized {
            legend_color(colors, idx)
        } else {
            Color::DarkGray
        };
        let pct = percent(bucket.count, total);
        let filled = if total == 0 {
            0
        } else {
            bar_width * bucket.count / total
        };
        lines.push(Line::from(vec![
            Span::styled(" \u{25A0} ", Style::default().fg(color)),
            Span::raw(format!("{:<18}", display_label(&bucket.label))),
            Span::raw(format!("{:>5} {:>4}% ", number(bucket.count), pct)),
            Span::styled("\u{2588}".repeat(filled), Style::default().fg(color)),
        ]));
    }
    lines
}

impl Screen for Dashboard {
    fn draw(&mut self, frame: &mut Frame) {
        match &mut self.screen {
            DashboardScreen::Upload(screen) => screen.draw(frame),
            DashboardScreen::Home => self.draw_home(frame),
        }
    }

    fn handle_key(&mut self, code: KeyCode) -> ScreenAction {
        match &mut self.screen {
            DashboardScreen::Upload(screen) => {
                if let ScreenAction::Close = screen.handle_key(code) {
                    self.screen = DashboardScreen::Home;
                }
                ScreenAction::Continue
            }
            DashboardScreen::Home => self.handle_home_key(code),
        }
    }

    /// A file dropped on the dashboard goes straight to the upload screen.
    fn handle_paste(&mut self, text: &str) {
        self.open_upload();
        if let DashboardScreen::Upload(screen) = &mut self.screen {
            screen.handle_paste(text);
        }
    }

    fn tick_rate(&self) -> Option<Duration> {
        self.is_uploading_screen().then_some(UPLOAD_TICK)
    }

    fn tick(&mut self) {
        if let DashboardScreen::Upload(screen) = &mut self.screen {
            screen.tick();
        }
    }
}

pub fn run(source: Option<&str>) -> Result<()> {
    let settings = load_settings();
    let source = settings.resolve_source(source);
    let records = feed::load_or_empty(&source);
    tracing::info!(records = records.len(), %source, "dashboard loaded");

    let mut dashboard = Dashboard::new(settings, source, records);
    tui::run_screen(&mut dashboard)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<Record> {
        serde_json::from_value(serde_json::json!([
            {"ID": 1, "Account Number": "B-200", "Upload Date": "2024-01-15",
             "Rejection Reason": "Invalid Entry", "Status": "Pending",
             "Categories": "Other", "Report": "/reports/1.pdf", "Accept/Reject": "Pending"},
            {"ID": 2, "Account Number": "A-100", "Upload Date": "2024-01-20",
             "Rejection Reason": "Invalid Entry", "Status": "Complete",
             "Categories": "Other", "Report": "", "Accept/Reject": "Accept"}
        ]))
        .unwrap()
    }

    fn dashboard() -> Dashboard {
        Dashboard::new(Settings::default(), "/nowhere/sampledata.json".into(), records())
    }

    #[test]
    fn test_initial_selection() {
        let d = dashboard();
        assert_eq!(d.selected_id(), Some(1));
        let empty = Dashboard::new(Settings::default(), String::new(), Vec::new());
        assert_eq!(empty.selected_id(), None);
    }

    #[test]
    fn test_decision_keys() {
        let mut d = dashboard();
        d.handle_key(KeyCode::Char('x'));
        assert_eq!(d.session.decision(1), ReviewDecision::Reject);
        d.handle_key(KeyCode::Right);
        assert_eq!(d.session.decision(1), ReviewDecision::Pending);
        d.handle_key(KeyCode::Left);
        assert_eq!(d.session.decision(1), ReviewDecision::Reject);
        // The other row is untouched.
        assert_eq!(d.session.decision(2), ReviewDecision::Accept);

        d.handle_key(KeyCode::Down);
        d.handle_key(KeyCode::Char('p'));
        assert_eq!(d.session.decision(2), ReviewDecision::Pending);
        assert_eq!(d.session.statuses().tally().rejected, 1);
    }

    #[test]
    fn test_selection_clamps() {
        let mut d = dashboard();
        d.handle_key(KeyCode::Up);
        assert_eq!(d.selected_id(), Some(1));
        d.handle_key(KeyCode::PageDown);
        assert_eq!(d.selected_id(), Some(2));
    }

    #[test]
    fn test_sort_keeps_selected_record() {
        let mut d = dashboard();
        d.handle_key(KeyCode::Char('s'));
        assert_eq!(d.sort.column, SortColumn::AccountNumber);
        // Record 1 stays selected though it moved to the second row.
        assert_eq!(d.selected_id(), Some(1));
        assert_eq!(d.table_state.selected(), Some(1));
        d.handle_key(KeyCode::Char('S'));
        assert!(d.sort.descending);
        assert_eq!(d.selected_id(), Some(1));
    }

    #[test]
    fn test_report_modal() {
        let mut d = dashboard();
        d.handle_key(KeyCode::Enter);
        assert_eq!(d.session.viewer().current(), Some("/reports/1.pdf"));
        // While open, other keys are swallowed.
        d.handle_key(KeyCode::Char('x'));
        assert_eq!(d.session.decision(1), ReviewDecision::Pending);
        assert!(matches!(d.handle_key(KeyCode::Char('q')), ScreenAction::Continue));
        assert!(!d.session.viewer().is_open());
    }

    #[test]
    fn test_report_missing_sets_hint() {
        let mut d = dashboard();
        d.handle_key(KeyCode::Down);
        d.handle_key(KeyCode::Char('v'));
        assert!(!d.session.viewer().is_open());
        assert!(d.status_message.as_deref().is_some());
    }

    #[test]
    fn test_reload_discards_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.json");
        std::fs::write(&path, serde_json::to_string(&records()).unwrap()).unwrap();

        let mut d = Dashboard::new(
            Settings::default(),
            path.to_string_lossy().to_string(),
            records(),
        );
        d.handle_key(KeyCode::Char('x'));
        d.handle_key(KeyCode::Char('v'));
        d.handle_key(KeyCode::Esc);
        d.handle_key(KeyCode::F(5));
        assert_eq!(d.session.decision(1), ReviewDecision::Pending);
        assert_eq!(d.status_message.as_deref(), Some("Reloaded 2 records."));
    }

    #[test]
    fn test_reload_failure_shows_empty() {
        let mut d = dashboard();
        d.handle_key(KeyCode::F(5));
        assert_eq!(d.session.summary().total, 0);
        assert_eq!(d.selected_id(), None);
        // Keys on an empty table are harmless.
        d.handle_key(KeyCode::Char('a'));
        d.handle_key(KeyCode::Down);
    }

    #[test]
    fn test_upload_screen_round_trip() {
        let mut d = dashboard();
        assert!(d.tick_rate().is_none());
        d.handle_key(KeyCode::Char('u'));
        assert!(d.is_uploading_screen());
        assert_eq!(d.tick_rate(), Some(UPLOAD_TICK));
        // 'q' is typed into the path field, not treated as quit.
        assert!(matches!(d.handle_key(KeyCode::Char('q')), ScreenAction::Continue));
        d.handle_key(KeyCode::Esc);
        assert!(!d.is_uploading_screen());
        assert!(matches!(d.handle_key(KeyCode::Char('q')), ScreenAction::Close));
    }

    #[test]
    fn test_paste_opens_upload_screen() {
        let mut d = dashboard();
        d.handle_paste("/definitely/not/here.pdf");
        assert!(d.is_uploading_screen());
    }

    #[test]
    fn test_proportion_lines_mark_unrecognized() {
        let mut hist = Histogram::with_labels(&["Pending", "Complete"]);
        hist.record("Pending");
        hist.record("Archived");
        let lines = proportion_lines("Status", &hist, &STATUS_COLORS, 10);
        assert_eq!(lines.len(), 4);
        let archived = &lines[3];
        assert_eq!(archived.spans[0].style.fg, Some(Color::DarkGray));
        assert!(archived.spans[2].content.contains("50%"));
    }
}
