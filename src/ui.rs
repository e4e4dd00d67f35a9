use crate::analysis::{Analysis, ERROR_BUCKET};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Summary,
    Books,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Summary => Page::Books,
            Page::Books => Page::Summary,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Summary => "Analyse par Rating",
            Page::Books => "Livres",
        }
    }
}

pub struct App {
    pub analysis: Analysis,
    pub current_page: Page,
    pub state: TableState,
}

impl App {
    pub fn new(analysis: Analysis) -> Self {
        let mut state = TableState::default();
        if !analysis.books.is_empty() {
            state.select(Some(0));
        }
        App {
            analysis,
            current_page: Page::Summary,
            state,
        }
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn next(&mut self) {
        let len = self.analysis.books.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.analysis.books.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
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

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(()),
                KeyCode::Tab => app.next_page(),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Summary => render_summary(f, chunks[1], app),
        Page::Books => render_books(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2]);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![];
    for (i, page) in [Page::Summary, Page::Books].iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" │ "));
        }
        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(page.title().to_string(), style));
    }

    spans.push(Span::raw("  |  "));
    spans.push(Span::styled(
        format!("Livres: {}", app.analysis.global_stats.total_books),
        Style::default().fg(Color::White),
    ));

    let header = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_summary(f: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(0)])
        .split(columns[0]);

    // Rating table
    let header = Row::new(
        ["Rating", "Prix moyen", "Stock", "Valeur", "Livres"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))),
    )
    .style(Style::default().bg(Color::DarkGray));

    let rows = app.analysis.by_rating.iter().map(|(rating, summary)| {
        let summary = summary.rounded();
        let (label, color) = if *rating == ERROR_BUCKET {
            ("0 (Erreur)".to_string(), Color::Red)
        } else {
            (rating.to_string(), Color::White)
        };
        Row::new(vec![
            Cell::from(label).style(Style::default().fg(color)),
            Cell::from(format!("{:.2}", summary.average_price)),
            Cell::from(summary.total_stock.to_string()),
            Cell::from(format!("{:.2}", summary.value)),
            Cell::from(summary.book_count.to_string()),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(" Par Rating "));
    f.render_widget(table, left[0]);

    // Global stats
    let stats = app.analysis.global_stats.rounded();
    let lines = vec![
        Line::from(format!("Nombre total de livres : {}", stats.total_books)),
        Line::from(format!("Prix moyen             : {:.2} £", stats.average_price)),
        Line::from(format!("Prix minimum           : {:.2} £", stats.min_price)),
        Line::from(format!("Prix maximum           : {:.2} £", stats.max_price)),
        Line::from(format!("Stock total            : {} livres", stats.total_stock)),
        Line::from(format!("Valeur totale du stock : {:.2} £", stats.total_value)),
    ];
    let global = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Statistiques Globales "),
    );
    f.render_widget(global, left[1]);

    // Average price per rating, errors excluded
    let bars: Vec<Bar> = app
        .analysis
        .by_rating
        .iter()
        .filter(|(rating, _)| **rating != ERROR_BUCKET)
        .map(|(rating, summary)| {
            let avg = summary.rounded().average_price;
            Bar::default()
                .label(Line::from(format!("{}★", rating)))
                .value((avg * 100.0).round() as u64)
                .text_value(format!("{:.2}", avg))
        })
        .collect();

    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(" Prix moyen par note "))
        .data(BarGroup::default().bars(&bars))
        .bar_width(7)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
    f.render_widget(chart, columns[1]);
}

fn render_books(f: &mut Frame, area: Rect, app: &mut App) {
    let header = Row::new(
        ["Titre", "Prix", "Rating", "Stock", "Valeur"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))),
    )
    .style(Style::default().bg(Color::DarkGray))
    .height(1);

    let rows = app.analysis.books.iter().map(|book| {
        let color = if book.rating == ERROR_BUCKET {
            Color::Red
        } else {
            Color::White
        };
        Row::new(vec![
            Cell::from(truncate(&book.title, 40)),
            Cell::from(format!("{:.2}", book.price)),
            Cell::from(book.rating.to_string()).style(Style::default().fg(color)),
            Cell::from(book.available.to_string()),
            Cell::from(format!("{:.2}", book.stock_value())),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(42),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(" Livres "))
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_status_bar(f: &mut Frame, area: Rect) {
    let spans = vec![
        Span::styled(" Tab", Style::default().fg(Color::Yellow)),
        Span::raw(" Page | "),
        Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
        Span::raw(" Nav | "),
        Span::styled("q", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];

    let status_bar = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::White)));

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::catalog::Book;

    fn create_test_app() -> App {
        App::new(
            analyze(vec![
                Book::new("A", 1.0, 1, 1),
                Book::new("B", 2.0, 2, 2),
                Book::new("C", 3.0, 3, 3),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_selection_wraps() {
        let mut app = create_test_app();
        assert_eq!(app.state.selected(), Some(0));

        app.previous();
        assert_eq!(app.state.selected(), Some(2));

        app.next();
        assert_eq!(app.state.selected(), Some(0));
    }

    #[test]
    fn test_page_toggle() {
        let mut app = create_test_app();
        app.next_page();
        assert_eq!(app.current_page, Page::Books);
        app.next_page();
        assert_eq!(app.current_page, Page::Summary);
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("Les Misérables", 40), "Les Misérables");
        assert_eq!(truncate("Élégie éternelle", 8), "Élégi...");
    }
}
