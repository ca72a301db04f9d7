use crate::db::ExpenseRecord;
use crate::report::Summary;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

const PAGE_SIZE: usize = 20;

pub struct App {
    pub records: Vec<ExpenseRecord>,
    pub state: TableState,
    pub summary: Summary,
}

impl App {
    pub fn new(records: Vec<ExpenseRecord>, summary: Summary) -> Self {
        let mut state = TableState::default();
        if !records.is_empty() {
            state.select(Some(0));
        }

        Self {
            records,
            state,
            summary,
        }
    }

    pub fn selected_record(&self) -> Option<&ExpenseRecord> {
        self.state.selected().and_then(|i| self.records.get(i))
    }

    pub fn next(&mut self) {
        let len = self.records.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i < len - 1 => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.records.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.records.len();
        if len == 0 {
            return;
        }
        let i = self
            .state
            .selected()
            .map_or(0, |i| (i + PAGE_SIZE).min(len - 1));
        self.state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        if self.records.is_empty() {
            return;
        }
        let i = self.state.selected().map_or(0, |i| i.saturating_sub(PAGE_SIZE));
        self.state.select(Some(i));
    }

    pub fn first(&mut self) {
        if !self.records.is_empty() {
            self.state.select(Some(0));
        }
    }

    pub fn last(&mut self) {
        if !self.records.is_empty() {
            self.state.select(Some(self.records.len() - 1));
        }
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::PageDown => app.page_down(),
                KeyCode::PageUp => app.page_up(),
                KeyCode::Home => app.first(),
                KeyCode::End => app.last(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Summary
            Constraint::Min(0),    // Ledger
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);
    render_table(f, chunks[1], app);
    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let spans = vec![
        Span::styled(
            " Expenses ",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::styled(
            format!("{} records", app.records.len()),
            Style::default().fg(Color::White),
        ),
        Span::raw(" | "),
        Span::styled(app.summary.to_string(), Style::default().fg(Color::Green)),
    ];

    let header = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["ID", "Amount", "Category", "Date", "Description"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.records.iter().map(|r| {
        let cells = vec![
            Cell::from(r.id.to_string()),
            Cell::from(r.amount.to_string()).style(Style::default().fg(Color::Red)),
            Cell::from(truncate(&r.category, 20)),
            Cell::from(r.date.to_string()),
            Cell::from(truncate(&r.description, 40)),
        ];

        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(22),
            Constraint::Length(12),
            Constraint::Min(20),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Ledger "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);

    let mut spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, app.records.len()),
        Style::default().fg(Color::Cyan),
    )];

    if let Some(record) = app.selected_record() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            format!("#{} {}", record.id, truncate(&record.description, 40)),
            Style::default().fg(Color::White),
        ));
    }

    spans.push(Span::raw(" | "));
    spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
    spans.push(Span::raw(" Nav | "));
    spans.push(Span::styled("PgUp/PgDn", Style::default().fg(Color::Yellow)));
    spans.push(Span::raw(" Fast | "));
    spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
