use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
};
use crossterm::execute;
use futures::StreamExt;
use ratatui::prelude::*;
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::detail::{DetailEvent, DetailFetcher, DEFAULT_TITLE};
use crate::keys::{KeyError, Keymap};
use crate::omdb::{OmdbApi, OmdbClient};
use crate::search::{SearchController, SearchEvent};
use crate::store::ListStore;
use crate::ui;
use crate::watched::WatchedList;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Results,
    Side,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Back,
    NextFocus,
    Up,
    Down,
    Open,
    RateUp,
    RateDown,
    AddWatched,
    DeleteWatched,
    ToggleLeft,
    ToggleRight,
}

pub struct App {
    pub search: SearchController,
    pub detail: DetailFetcher,
    pub watched: WatchedList,
    keymap: Keymap<Action>,
    input: String,
    focus: Focus,
    result_cursor: usize,
    watched_cursor: usize,
    left_open: bool,
    right_open: bool,
    status: Option<String>,
    should_quit: bool,
}

fn default_keymap() -> Result<Keymap<Action>, KeyError> {
    let mut keymap = Keymap::new();
    keymap
        .bind_with_setup("Escape", Action::Back, || {
            debug!("Escape closes the detail pane")
        })?
        .bind("Ctrl+C", Action::Quit)?
        .bind("Tab", Action::NextFocus)?
        .bind("Up", Action::Up)?
        .bind("k", Action::Up)?
        .bind("Down", Action::Down)?
        .bind("j", Action::Down)?
        .bind("Enter", Action::Open)?
        .bind("Right", Action::RateUp)?
        .bind("+", Action::RateUp)?
        .bind("Left", Action::RateDown)?
        .bind("-", Action::RateDown)?
        .bind("a", Action::AddWatched)?
        .bind("Delete", Action::DeleteWatched)?
        .bind("d", Action::DeleteWatched)?
        .bind("F2", Action::ToggleLeft)?
        .bind("F3", Action::ToggleRight)?;
    Ok(keymap)
}

impl App {
    pub fn new(api: Arc<dyn OmdbApi>, watched: WatchedList, debounce: Duration) -> Result<Self> {
        Ok(Self {
            search: SearchController::new(Arc::clone(&api), debounce),
            detail: DetailFetcher::new(api),
            watched,
            keymap: default_keymap().context("Invalid default key bindings")?,
            input: String::new(),
            focus: Focus::Search,
            result_cursor: 0,
            watched_cursor: 0,
            left_open: true,
            right_open: true,
            status: None,
            should_quit: false,
        })
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn result_cursor(&self) -> usize {
        self.result_cursor
    }

    pub fn watched_cursor(&self) -> usize {
        self.watched_cursor
    }

    pub fn left_open(&self) -> bool {
        self.left_open
    }

    pub fn right_open(&self) -> bool {
        self.right_open
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if self.focus == Focus::Search && !ctrl {
            match key.code {
                KeyCode::Char(c) => {
                    self.input.push(c);
                    self.on_input_changed();
                    return;
                }
                KeyCode::Backspace => {
                    self.input.pop();
                    self.on_input_changed();
                    return;
                }
                _ => {}
            }
        }

        if self.focus == Focus::Side && self.detail.is_open() && !ctrl {
            if let KeyCode::Char(c @ '0'..='9') = key.code {
                let rating = c.to_digit(10).unwrap_or(0) as u8;
                self.detail
                    .set_draft_rating(if rating == 0 { 10 } else { rating });
                return;
            }
        }

        if let Some(action) = self.keymap.resolve(&key) {
            self.perform(action);
        }
    }

    pub fn perform(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Back => {
                if self.detail.is_open() {
                    self.close_detail();
                } else {
                    self.should_quit = true;
                }
            }
            Action::NextFocus => {
                self.focus = match self.focus {
                    Focus::Search => Focus::Results,
                    Focus::Results => Focus::Side,
                    Focus::Side => Focus::Search,
                };
            }
            Action::Up => self.move_cursor(-1),
            Action::Down => self.move_cursor(1),
            Action::Open => match self.focus {
                Focus::Search => self.focus = Focus::Results,
                Focus::Results => self.open_selected(),
                Focus::Side => {}
            },
            Action::RateUp => {
                if self.detail.is_open() {
                    self.detail.adjust_draft_rating(1);
                }
            }
            Action::RateDown => {
                if self.detail.is_open() {
                    self.detail.adjust_draft_rating(-1);
                }
            }
            Action::AddWatched => self.add_watched(),
            Action::DeleteWatched => {
                if self.focus == Focus::Side && !self.detail.is_open() {
                    self.delete_watched();
                }
            }
            Action::ToggleLeft => self.left_open = !self.left_open,
            Action::ToggleRight => self.right_open = !self.right_open,
        }
    }

    /// Applies finished network work. Returns true if anything changed.
    pub fn poll(&mut self) -> bool {
        let searched = self.search.poll();
        let detailed = self.detail.poll();
        self.clamp_cursors();
        searched || detailed
    }

    pub fn apply_search(&mut self, event: SearchEvent) {
        self.search.apply(event);
        self.clamp_cursors();
    }

    pub fn apply_detail(&mut self, event: DetailEvent) {
        self.detail.apply(event);
    }

    /// Whether the add action is available: a loaded, rated, not yet watched movie.
    pub fn can_add(&self) -> bool {
        match self.detail.selected_id() {
            Some(id) => !self.watched.contains(id) && self.detail.pending_entry().is_some(),
            None => false,
        }
    }

    fn on_input_changed(&mut self) {
        let detail = &mut self.detail;
        self.search.set_query(&self.input, || detail.close());
        self.result_cursor = 0;
        self.status = None;
    }

    fn open_selected(&mut self) {
        let Some(id) = self
            .search
            .results()
            .get(self.result_cursor)
            .map(|r| r.id.clone())
        else {
            return;
        };
        if self.detail.select(&id) {
            info!(id = %id, "opened detail");
            self.focus = Focus::Side;
        }
    }

    fn close_detail(&mut self) {
        self.detail.close();
        if self.focus == Focus::Side {
            self.focus = Focus::Results;
        }
    }

    fn add_watched(&mut self) {
        if !self.can_add() {
            return;
        }
        let Some(entry) = self.detail.pending_entry() else {
            return;
        };
        let title = entry.title.clone();
        match self.watched.add(entry) {
            Ok(_) => {
                self.status = Some(format!("Added {title}"));
                self.close_detail();
            }
            Err(e) => {
                error!("Failed to save watched list: {}", e);
                self.status = Some(format!("Could not save: {e}"));
            }
        }
    }

    fn delete_watched(&mut self) {
        let Some(id) = self
            .watched
            .entries()
            .get(self.watched_cursor)
            .map(|e| e.id.clone())
        else {
            return;
        };
        match self.watched.remove(&id) {
            Ok(_) => self.clamp_cursors(),
            Err(e) => {
                error!("Failed to save watched list: {}", e);
                self.status = Some(format!("Could not save: {e}"));
            }
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let (cursor, len) = match self.focus {
            Focus::Results => (&mut self.result_cursor, self.search.results().len()),
            Focus::Side if !self.detail.is_open() => {
                (&mut self.watched_cursor, self.watched.len())
            }
            _ => return,
        };
        if len == 0 {
            *cursor = 0;
            return;
        }
        *cursor = cursor.saturating_add_signed(delta).min(len - 1);
    }

    fn clamp_cursors(&mut self) {
        self.result_cursor = self
            .result_cursor
            .min(self.search.results().len().saturating_sub(1));
        self.watched_cursor = self
            .watched_cursor
            .min(self.watched.len().saturating_sub(1));
    }
}

enum Wake {
    Input(Option<io::Result<Event>>),
    Search(SearchEvent),
    Detail(DetailEvent),
}

type Term = Terminal<CrosstermBackend<Stdout>>;

pub async fn run(config: Config) -> Result<()> {
    let api: Arc<dyn OmdbApi> = Arc::new(OmdbClient::from_config(&config)?);
    let store = ListStore::open(&config.data_dir).context("Failed to open data directory")?;
    let watched = WatchedList::load(store).context("Failed to load watched list")?;
    let mut app = App::new(api, watched, config.debounce)?;

    let mut terminal = setup_terminal()?;
    let outcome = event_loop(&mut terminal, &mut app).await;
    restore_terminal(&mut terminal)?;
    info!("Exiting");
    outcome
}

fn setup_terminal() -> Result<Term> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, SetTitle(DEFAULT_TITLE))?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Term) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn event_loop(terminal: &mut Term, app: &mut App) -> Result<()> {
    let mut events = EventStream::new();
    let mut title = DEFAULT_TITLE.to_string();

    while !app.should_quit() {
        let next_title = app.detail.window_title();
        if next_title != title {
            execute!(terminal.backend_mut(), SetTitle(&next_title))?;
            title = next_title;
        }
        terminal.draw(|f| ui::draw(f, app))?;

        let wake = tokio::select! {
            ev = events.next() => Wake::Input(ev),
            ev = app.search.next_event() => Wake::Search(ev),
            ev = app.detail.next_event() => Wake::Detail(ev),
        };
        match wake {
            Wake::Input(Some(Ok(Event::Key(key)))) => app.handle_key(key),
            Wake::Input(Some(Ok(_))) => {}
            Wake::Input(Some(Err(e))) => return Err(e).context("Terminal input failed"),
            Wake::Input(None) => break,
            Wake::Search(ev) => app.apply_search(ev),
            Wake::Detail(ev) => app.apply_detail(ev),
        }
    }
    Ok(())
}
