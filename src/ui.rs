use anyhow::Result;
use chrono::Utc;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use slm_command_center::markup::{squash_whitespace, strip_tags};
use slm_command_center::modules::infra_recommender::{Field, InfraRecommender};
use slm_command_center::pages;
use slm_command_center::{
    CommandCenterError, MemorySurface, Module, Notice, Playback, Session,
};
use std::io;
use std::time::{Duration, Instant};

/// Frame interval while an animation is playing
const TICK: Duration = Duration::from_millis(16);
const IDLE_POLL: Duration = Duration::from_millis(250);
const MAX_NOTICES: usize = 3;

pub struct App {
    pub session: Session,
    pub surface: MemorySurface,
    playback: Option<(Playback, Instant)>,
    pub notices: Vec<Notice>,
    pub scroll: u16,
    /// Which canned prompt/question the next run uses
    prompt_index: usize,
}

impl App {
    pub fn new(session: Session) -> Self {
        let module = session.current();
        let surface = pages::page_surface(module, &session.render(module));
        Self {
            session,
            surface,
            playback: None,
            notices: Vec::new(),
            scroll: 0,
            prompt_index: 0,
        }
    }

    pub fn current(&self) -> Module {
        self.session.current()
    }

    pub fn is_animating(&self) -> bool {
        self.playback.is_some()
    }

    pub fn next_page(&mut self) {
        self.go_to(self.current().next());
    }

    pub fn previous_page(&mut self) {
        self.go_to(self.current().previous());
    }

    pub fn go_to(&mut self, module: Module) {
        // dropping the playback releases the old page's run
        self.playback = None;
        self.session.navigate(module);
        self.prompt_index = 0;
        self.scroll = 0;
        self.refresh();
    }

    /// Rebuild the surface from the module's current state
    pub fn refresh(&mut self) {
        let module = self.current();
        self.surface = pages::page_surface(module, &self.session.render(module));
    }

    pub fn notify(&mut self, notice: Notice) {
        tracing::debug!("notice: {}", notice);
        self.notices.push(notice);
        if self.notices.len() > MAX_NOTICES {
            self.notices.remove(0);
        }
    }

    fn report(&mut self, err: CommandCenterError) {
        let notice = match err {
            CommandCenterError::Busy(_) => Notice::warning(err.to_string()),
            other => Notice::error(other.to_string()),
        };
        self.notify(notice);
    }

    fn start(&mut self, playback: Playback) {
        self.playback = Some((playback, Instant::now()));
        self.tick();
    }

    /// Run the current page's main operation
    pub fn run_current(&mut self) {
        if let Err(err) = self.try_run_current() {
            self.report(err);
        }
    }

    fn try_run_current(&mut self) -> slm_command_center::Result<()> {
        let module = self.current();
        if module == Module::Dashboard {
            self.go_to(Module::CostTicker);
            return Ok(());
        }

        let input = self.session.sample_input(module, self.prompt_index);
        let run = self.session.run(module, input.as_deref(), Utc::now())?;
        if module == Module::InfraRecommender {
            self.notify(InfraRecommender::generated_notice());
        }

        self.prompt_index += 1;
        self.start(run.into_playback().1);
        Ok(())
    }

    /// Step the page's main selector (industry, model, technique, architecture)
    pub fn cycle_selection(&mut self) {
        if self.is_animating() {
            self.notify(Notice::warning("Wait for the animation to finish"));
            return;
        }
        if let Err(err) = self.try_cycle_selection() {
            self.report(err);
        }
        self.prompt_index = 0;
        self.refresh();
    }

    fn try_cycle_selection(&mut self) -> slm_command_center::Result<()> {
        let session = &mut self.session;
        match session.current() {
            Module::CostTicker => {
                let pricing = session.cost.pricing();
                let keys: Vec<&str> = pricing
                    .iter()
                    .filter(|(_, p)| !p.is_self_hosted())
                    .map(|(k, _)| k)
                    .collect();
                let next = following(&keys, session.cost.api_model());
                session.cost.select_api_model(&next)?;
            }
            Module::Guardrails => {
                let keys: Vec<&str> = session.guardrails.industries().keys().collect();
                let next = following(&keys, session.guardrails.industry_key());
                session.guardrails.set_industry(&next)?;
            }
            Module::ModelArena => {
                let keys: Vec<&str> = session.arena.industries().keys().collect();
                let next = following(&keys, session.arena.industry_key());
                session.arena.set_industry(&next)?;
            }
            Module::FineTuning => {
                let keys: Vec<&str> = session.fine_tuning.domains().keys().collect();
                let next = following(&keys, session.fine_tuning.domain_key());
                let notice = session.fine_tuning.select_industry(&next)?;
                self.notify(notice);
            }
            Module::ModelLab => {
                let keys: Vec<&str> = session.model_lab.techniques().keys().collect();
                let next = following(&keys, session.model_lab.technique_key());
                session.model_lab.show_technique(&next)?;
            }
            Module::InfraRecommender => fill_infra_form(&mut session.infra)?,
            Module::DataSovereignty => {
                let keys: Vec<&str> = session.sovereignty.architectures().keys().collect();
                let next = following(&keys, session.sovereignty.architecture_key());
                session.sovereignty.set_architecture(&next)?;
            }
            Module::Dashboard | Module::RagCitations => {}
        }
        Ok(())
    }

    pub fn export_current(&mut self) {
        let dir = self.session.config.export.dir.clone();
        let written = self
            .session
            .export(self.current(), Utc::now())
            .and_then(|doc| doc.write_to_dir(&dir));
        match written {
            Ok(path) => {
                tracing::info!("exported {}", path.display());
                self.notify(Notice::success(format!("Exported {}", path.display())));
            }
            Err(err) => self.report(err),
        }
    }

    /// Apply keyframes that are due. Returns true while an animation is playing.
    pub fn tick(&mut self) -> bool {
        let Some((playback, started)) = self.playback.as_mut() else {
            return false;
        };
        if playback.advance(started.elapsed(), &mut self.surface) {
            self.playback = None;
            return false;
        }
        true
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    /// Container id and its visible text, for every container with content
    pub fn visible_containers(&self) -> Vec<(&'static str, String, String)> {
        pages::containers(self.current())
            .iter()
            .filter_map(|id| {
                let text = squash_whitespace(&strip_tags(self.surface.html(id).unwrap_or_default()));
                let class = self.surface.class(id).unwrap_or_default().to_string();
                if text.is_empty() && class.is_empty() {
                    None
                } else {
                    Some((*id, text, class))
                }
            })
            .collect()
    }
}

/// The key after `current`, wrapping around
fn following(keys: &[&str], current: &str) -> String {
    let position = keys.iter().position(|k| *k == current);
    let next = match position {
        Some(i) => (i + 1) % keys.len(),
        None => 0,
    };
    keys.get(next).copied().unwrap_or(current).to_string()
}

/// Answer every unanswered question with its first option
fn fill_infra_form(infra: &mut InfraRecommender) -> slm_command_center::Result<()> {
    for field in Field::REQUIRED {
        if infra.selected(field).is_none() {
            let first = infra.options(field).keys().next().map(str::to_string);
            if let Some(key) = first {
                infra.select(field, &key)?;
            }
        }
    }
    Ok(())
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        let animating = app.tick();
        terminal.draw(|f| ui(f, app))?;

        let timeout = if animating { TICK } else { IDLE_POLL };
        if !event::poll(timeout)? {
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(()),
                KeyCode::Tab => app.next_page(),
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Char('h') => app.go_to(Module::Dashboard),
                KeyCode::Enter | KeyCode::Char('r') => app.run_current(),
                KeyCode::Char('s') => app.cycle_selection(),
                KeyCode::Char('e') => app.export_current(),
                KeyCode::Down | KeyCode::Char('j') => app.scroll_down(),
                KeyCode::Up | KeyCode::Char('k') => app.scroll_up(),
                KeyCode::Home => app.scroll = 0,
                KeyCode::Char(c) if c.is_ascii_digit() => {
                    let index = c.to_digit(10).unwrap_or(0) as usize;
                    if let Some(module) = Module::ALL.get(index) {
                        app.go_to(*module);
                    }
                }
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Page containers
            Constraint::Length(5), // Notices
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);
    render_page(f, chunks[1], app);
    render_notices(f, chunks[2], app);
    render_status_bar(f, chunks[3], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![];
    for (i, module) in Module::ALL.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *module == app.current() {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(format!("{} {}", i, module.icon()), style));
    }

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" SLM Command Center ")
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn render_page(f: &mut Frame, area: Rect, app: &App) {
    let module = app.current();
    let mut lines = vec![
        Line::from(Span::styled(
            module.description(),
            Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
        )),
        Line::from(""),
    ];

    for (id, text, class) in app.visible_containers() {
        let mut label = vec![Span::styled(
            format!("▸ {}", id),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )];
        if !class.is_empty() {
            label.push(Span::styled(format!("  [{}]", class), Style::default().fg(Color::Green)));
        }
        lines.push(Line::from(label));
        if !text.is_empty() {
            lines.push(Line::from(Span::raw(text)));
        }
        lines.push(Line::from(""));
    }

    let title = if app.is_animating() {
        format!(" {} {}  ⏳ running ", module.icon(), module.title())
    } else {
        format!(" {} {} ", module.icon(), module.title())
    };

    let page = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: true })
        .scroll((app.scroll, 0));

    f.render_widget(page, area);
}

fn render_notices(f: &mut Frame, area: Rect, app: &App) {
    let lines: Vec<Line> = app
        .notices
        .iter()
        .rev()
        .map(|notice| Line::from(Span::raw(notice.to_string())))
        .collect();

    let notices = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Notices "));
    f.render_widget(notices, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![Span::styled(
        format!(" {} ", app.current().key()),
        Style::default().fg(Color::Cyan),
    )];

    for (key, label) in [
        ("Enter", " Run | "),
        ("s", " Select | "),
        ("e", " Export | "),
        ("Tab", " Page | "),
        ("0-8", " Jump | "),
        ("↑/↓", " Scroll | "),
    ] {
        status_spans.push(Span::styled(key, Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(label));
    }
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use slm_command_center::Config;

    fn app() -> App {
        App::new(Session::with_seed(Config::default(), 11))
    }

    /// Play the running animation to the end without waiting
    fn finish(app: &mut App) {
        if let Some((playback, _)) = app.playback.as_mut() {
            playback.advance(Duration::from_secs(3_600), &mut app.surface);
        }
        app.playback = None;
    }

    #[test]
    fn test_starts_on_dashboard_cards() {
        let app = app();
        assert_eq!(app.current(), Module::Dashboard);
        let containers = app.visible_containers();
        assert_eq!(containers.len(), 1);
        assert_eq!(containers[0].0, "module-cards");
        assert!(containers[0].1.contains("Cost Ticker"));
    }

    #[test]
    fn test_page_cycle() {
        let mut app = app();
        app.next_page();
        assert_eq!(app.current(), Module::CostTicker);
        app.previous_page();
        app.previous_page();
        assert_eq!(app.current(), Module::DataSovereignty);
    }

    #[test]
    fn test_enter_on_dashboard_opens_first_module() {
        let mut app = app();
        app.run_current();
        assert_eq!(app.current(), Module::CostTicker);
    }

    #[test]
    fn test_run_holds_module_until_finished() {
        let mut app = app();
        app.go_to(Module::FineTuning);
        app.run_current();
        assert!(app.is_animating());
        assert!(app.session.is_running(Module::FineTuning));

        // a second run while playing is refused with a warning
        app.run_current();
        assert!(app.notices.last().unwrap().to_string().contains("already running"));

        finish(&mut app);
        assert!(!app.session.is_running(Module::FineTuning));
        let after = app.surface.html("after-response").unwrap();
        assert!(!after.is_empty());
    }

    #[test]
    fn test_leaving_page_releases_run() {
        let mut app = app();
        app.go_to(Module::DataSovereignty);
        app.run_current();
        app.next_page();
        assert!(!app.is_animating());
        assert!(!app.session.is_running(Module::DataSovereignty));
    }

    #[test]
    fn test_infra_needs_form_then_recommends() {
        let mut app = app();
        app.go_to(Module::InfraRecommender);
        app.run_current();
        assert!(app.notices.last().unwrap().to_string().starts_with('✕'));

        app.cycle_selection();
        assert!(app.session.infra.is_complete());
        app.run_current();
        finish(&mut app);
        assert!(app.session.infra.recommendation().is_some());
    }

    #[test]
    fn test_cycle_selection_wraps() {
        let mut app = app();
        app.go_to(Module::Guardrails);
        let first = app.session.guardrails.industry_key().to_string();
        let count = app.session.guardrails.industries().len();
        for _ in 0..count {
            app.cycle_selection();
        }
        assert_eq!(app.session.guardrails.industry_key(), first);
    }

    #[test]
    fn test_following() {
        assert_eq!(following(&["a", "b", "c"], "b"), "c");
        assert_eq!(following(&["a", "b", "c"], "c"), "a");
        assert_eq!(following(&["a", "b"], "zzz"), "a");
    }

    #[test]
    fn test_export_writes_into_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app();
        app.session.config.export.dir = dir.path().to_path_buf();
        app.go_to(Module::CostTicker);
        app.export_current();
        assert!(app.notices.last().unwrap().to_string().starts_with('✓'));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
