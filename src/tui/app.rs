use crate::api::{item_url, HttpTransport, Item, MarketClient, SearchPage, Transport};
use crate::config::AppConfig;
use crate::error::Result;
use crate::geo::{format_distance, Coordinates};
use crate::notify::Notifications;
use crate::poll::{PollEvent, UnreadPoller};
use crate::search::{ApplyOutcome, FilterUpdate, SearchStore};
use crate::storage::{LocalStore, SearchHistory};
use crate::tui::menu::{self, ActionKind, ActionsMenu, ActiveMenu, FilterField, FiltersMenu, InfoDialog};
use crate::tui::search::{edit_text, SearchState};
use crate::tui::table::TableState;
use crate::tui::ui;
use crossbeam_channel::{unbounded, Receiver, Sender};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::Stdout;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Messages from background threads
pub enum BgMessage {
    SearchDone {
        generation: u64,
        result: Result<SearchPage>,
    },
    ItemLoaded {
        generation: u64,
        result: Result<Item>,
    },
}

pub struct App<T: Transport = HttpTransport> {
    pub config: AppConfig,
    client: Arc<MarketClient<T>>,

    // Search state and results
    pub store: SearchStore,

    // Sub-states
    pub search: SearchState,
    pub table: TableState,
    pub active_menu: ActiveMenu,
    pub notifications: Notifications,

    // Bumped per detail request; older replies are dropped
    item_generation: u64,

    // Unread messages
    pub unread: Option<u64>,
    poller: Option<UnreadPoller>,

    local: LocalStore,
    pub status_message: String,

    // Channel
    bg_receiver: Receiver<BgMessage>,
    bg_sender: Sender<BgMessage>,

    // Quit flag
    pub should_quit: bool,
}

impl<T: Transport + 'static> App<T> {
    pub fn new(config: AppConfig, client: MarketClient<T>, local: LocalStore) -> Self {
        let (bg_sender, bg_receiver) = unbounded();
        let store = SearchStore::new(config.page_size);

        Self {
            config,
            client: Arc::new(client),
            store,
            search: SearchState::default(),
            table: TableState::default(),
            active_menu: ActiveMenu::None,
            notifications: Notifications::default(),
            item_generation: 0,
            unread: None,
            poller: None,
            local,
            status_message: "Ready".to_string(),
            bg_receiver,
            bg_sender,
            should_quit: false,
        }
    }

    /// Seed the search bar and filters with a query passed on the command line
    pub fn with_query(mut self, query: &str) -> Self {
        self.search = SearchState::with_query(query);
        self.store.update_filters(FilterUpdate::query(query));
        self
    }

    /// Start polling the unread count. Only signed-in sessions have one.
    pub fn start_unread_poller(&mut self) {
        if self.config.auth_token.is_none() || self.poller.is_some() {
            return;
        }
        let client = Arc::clone(&self.client);
        self.poller = Some(UnreadPoller::spawn(self.config.poll_interval(), move || {
            client.unread_count()
        }));
    }

    pub fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let tick_rate = Duration::from_millis(50);
        let mut last_tick = Instant::now();

        loop {
            terminal.draw(|frame| ui::draw(frame, self))?;

            let timeout = tick_rate.saturating_sub(last_tick.elapsed());
            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }

            if last_tick.elapsed() >= tick_rate {
                self.tick();
                last_tick = Instant::now();
            }

            if self.should_quit {
                if let Some(poller) = self.poller.take() {
                    poller.stop();
                }
                return Ok(());
            }
        }
    }

    /// Drain background results and expire old toasts
    pub fn tick(&mut self) {
        self.process_messages();
        self.poll_unread();
        self.notifications.prune();
    }

    /// Validate the filters and fetch the current page on a worker thread.
    ///
    /// Returns false when the input was rejected and nothing was sent.
    pub fn start_search(&mut self) -> bool {
        let request = match self.store.prepare() {
            Ok(request) => request,
            Err(e) => {
                self.notifications.error(e.to_string());
                return false;
            }
        };

        debug!(generation = request.generation, page = request.params.page, "search issued");
        self.status_message = "Searching...".to_string();

        let tx = self.bg_sender.clone();
        let client = Arc::clone(&self.client);
        thread::spawn(move || {
            let result = client.search(&request.params);
            let _ = tx.send(BgMessage::SearchDone {
                generation: request.generation,
                result,
            });
        });
        true
    }

    fn load_item(&mut self, id: String) {
        self.item_generation += 1;
        let generation = self.item_generation;
        self.status_message = "Loading item...".to_string();

        let tx = self.bg_sender.clone();
        let client = Arc::clone(&self.client);
        thread::spawn(move || {
            let _ = tx.send(BgMessage::ItemLoaded {
                generation,
                result: client.item(&id),
            });
        });
    }

    fn process_messages(&mut self) {
        while let Ok(msg) = self.bg_receiver.try_recv() {
            self.handle_message(msg);
        }
    }

    fn handle_message(&mut self, msg: BgMessage) {
        match msg {
            BgMessage::SearchDone { generation, result } => {
                match self.store.apply(generation, result) {
                    ApplyOutcome::Updated { count, total } => {
                        self.table.reset(count);
                        self.status_message = format!("{} items", total);
                    }
                    ApplyOutcome::Failed(message) => {
                        self.table.reset(0);
                        self.status_message = message.clone();
                        self.notifications.error(message);
                    }
                    ApplyOutcome::Relocated { page, .. } => {
                        self.table.reset(0);
                        debug!(page, "page out of range, fetching the last page");
                        self.start_search();
                    }
                    ApplyOutcome::Stale => {}
                }
            }
            BgMessage::ItemLoaded { generation, .. } if generation != self.item_generation => {
                debug!(generation, current = self.item_generation, "discarding stale item response");
            }
            BgMessage::ItemLoaded { result: Ok(item), .. } => {
                self.status_message = format!("{} items", self.store.total());
                let lines = detail_lines(&item, self.store.filters().coordinates, &self.config);
                self.active_menu = ActiveMenu::Info(InfoDialog::new(item.title.clone(), lines));
            }
            BgMessage::ItemLoaded { result: Err(e), .. } => {
                self.status_message = e.user_message();
                self.notifications.report_error(&e);
            }
        }
    }

    fn poll_unread(&mut self) {
        let Some(event) = self.poller.as_ref().and_then(|p| p.latest()) else {
            return;
        };
        match event {
            PollEvent::Unread(count) => self.unread = Some(count),
            // Keep showing the last known count
            PollEvent::Failed(message) => debug!(%message, "unread count unavailable"),
        }
    }

    pub fn selected_item(&self) -> Option<&Item> {
        self.table.selected.and_then(|i| self.store.items().get(i))
    }

    fn submit_query(&mut self) {
        let query = self.search.query.clone();
        self.search.history_pos = None;
        self.store.update_filters(FilterUpdate::query(query.as_str()));

        if !self.start_search() {
            return;
        }
        self.search.focused = false;

        let history = SearchHistory::new(&self.local, self.config.history_limit);
        if let Err(e) = history.record(&query) {
            warn!(error = %e, "failed to save search history");
        }
    }

    fn history(&self) -> Vec<String> {
        SearchHistory::new(&self.local, self.config.history_limit).entries()
    }

    fn change_page(&mut self, forward: bool) {
        let moved = if forward {
            self.store.next_page()
        } else {
            self.store.previous_page()
        };
        if moved {
            self.start_search();
        }
    }

    fn run_action(&mut self, kind: ActionKind) {
        let Some(item) = self.selected_item() else {
            return;
        };
        let id = item.id.clone();

        match kind {
            ActionKind::Details => self.load_item(id),
            ActionKind::OpenInBrowser => {
                let result = item_url(&self.config.web_base_url, &id)
                    .map_err(|e| e.user_message())
                    .and_then(|url| menu::open_url(&url).map(|_| url));
                match result {
                    Ok(url) => {
                        info!(%url, "opened item in browser");
                        self.notifications.success("Opened in browser");
                    }
                    Err(message) => self.notifications.error(message),
                }
            }
            ActionKind::CopyLink => {
                let result = item_url(&self.config.web_base_url, &id)
                    .map_err(|e| e.user_message())
                    .and_then(|url| menu::copy_to_clipboard(&url));
                match result {
                    Ok(()) => self.notifications.success("Link copied to clipboard"),
                    Err(message) => self.notifications.error(message),
                }
            }
        }
    }

    // --- Key handling ---

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        // Global keys
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                self.should_quit = true;
                return;
            }
            _ => {}
        }

        if !matches!(self.active_menu, ActiveMenu::None) {
            self.handle_menu_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('f') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.active_menu =
                    ActiveMenu::Filters(FiltersMenu::from_filters(self.store.filters()));
                return;
            }
            KeyCode::Esc => {
                if self.search.focused && !self.search.query.is_empty() {
                    self.search.clear();
                    self.submit_query();
                } else if self.search.focused {
                    self.search.focused = false;
                } else {
                    self.should_quit = true;
                }
                return;
            }
            KeyCode::F(5) => {
                self.start_search();
                return;
            }
            _ => {}
        }

        if self.search.focused {
            self.handle_search_key(key);
        } else {
            self.handle_table_key(key);
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_query(),
            KeyCode::Up => {
                let history = self.history();
                self.search.recall(&history, true);
            }
            KeyCode::Down => {
                let history = self.history();
                self.search.recall(&history, false);
            }
            KeyCode::Tab => {
                self.search.focused = false;
            }
            code => {
                if edit_text(&mut self.search.query, &mut self.search.cursor_pos, code) {
                    self.search.history_pos = None;
                }
            }
        }
    }

    fn handle_table_key(&mut self, key: KeyEvent) {
        let total = self.store.items().len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.table.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.table.select_next(total),
            KeyCode::Home | KeyCode::Char('g') => self.table.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.table.select_last(total),

            KeyCode::Right | KeyCode::PageDown | KeyCode::Char('n') => self.change_page(true),
            KeyCode::Left | KeyCode::PageUp | KeyCode::Char('p') => self.change_page(false),
            KeyCode::Char(c @ '1'..='9') => {
                let page = c.to_digit(10).unwrap_or(1);
                if page <= self.store.page().total_pages()
                    && page != self.store.page().current_page()
                {
                    self.store.go_to_page(page);
                    self.start_search();
                }
            }

            KeyCode::Char('s') => {
                let sort = self.store.filters().sort.next();
                self.store.update_filters(FilterUpdate::sort(sort));
                self.notifications.info(format!("Sorted by {}", sort.label()));
                self.start_search();
            }
            KeyCode::Char('c') => {
                self.search.clear();
                self.store.clear_filters();
                self.notifications.info("Filters cleared");
                self.start_search();
            }
            KeyCode::Char('r') => {
                self.start_search();
            }

            KeyCode::Enter => {
                if self.selected_item().is_some() {
                    self.active_menu = ActiveMenu::Actions(ActionsMenu::new());
                }
            }
            KeyCode::Char('o') => self.run_action(ActionKind::OpenInBrowser),
            KeyCode::Char('y') => self.run_action(ActionKind::CopyLink),
            KeyCode::Char('?') => {
                self.active_menu = ActiveMenu::Info(help_dialog());
            }

            KeyCode::Tab | KeyCode::Char('/') => {
                self.search.focused = true;
            }

            _ => {}
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) {
        let menu = std::mem::replace(&mut self.active_menu, ActiveMenu::None);
        self.active_menu = match menu {
            ActiveMenu::None => ActiveMenu::None,
            ActiveMenu::Actions(mut actions) => match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    actions.move_up();
                    ActiveMenu::Actions(actions)
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    actions.move_down();
                    ActiveMenu::Actions(actions)
                }
                KeyCode::Enter => {
                    self.run_action(actions.selected_action());
                    // Details replaces the menu once the item arrives
                    ActiveMenu::None
                }
                KeyCode::Esc => ActiveMenu::None,
                _ => ActiveMenu::Actions(actions),
            },
            ActiveMenu::Filters(filters) => self.handle_filters_key(filters, key),
            ActiveMenu::Info(dialog) => match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => ActiveMenu::None,
                _ => ActiveMenu::Info(dialog),
            },
        };
    }

    fn handle_filters_key(&mut self, mut filters: FiltersMenu, key: KeyEvent) -> ActiveMenu {
        match key.code {
            KeyCode::Esc => return ActiveMenu::None,
            KeyCode::Tab | KeyCode::Down => filters.focused_field = filters.focused_field.next(),
            KeyCode::BackTab | KeyCode::Up => filters.focused_field = filters.focused_field.prev(),
            KeyCode::Left if filters.focused_field.is_mode_selector() => {
                filters.sort = filters.sort.prev();
            }
            KeyCode::Right if filters.focused_field.is_mode_selector() => {
                filters.sort = filters.sort.next();
            }
            KeyCode::Enter => match filters.focused_field {
                FilterField::Cancel => return ActiveMenu::None,
                FilterField::Clear => filters.clear_all(),
                _ => match filters.to_update() {
                    Ok(update) => {
                        self.store.update_filters(update);
                        if self.start_search() {
                            info!(filters = %self.store.filters().summary(), "filters applied");
                        }
                        return ActiveMenu::None;
                    }
                    Err(message) => self.notifications.error(message),
                },
            },
            code => {
                if let Some(field) = filters.current_text_mut() {
                    edit_text(&mut field.text, &mut field.cursor, code);
                }
            }
        }
        ActiveMenu::Filters(filters)
    }
}

/// Lines shown in the item details dialog
fn detail_lines(item: &Item, origin: Option<Coordinates>, config: &AppConfig) -> Vec<String> {
    let mut lines = vec![
        format!("Category:  {}", item.category),
        format!("Condition: {}", item.condition),
        format!("Location:  {}", item.location),
        format!("Owner:     {}", item.owner_name()),
        format!("Listed:    {}", crate::format_timestamp(item.created_at)),
    ];

    if let Some(km) = origin.and_then(|o| item.distance_from(&o)) {
        lines.push(format!("Distance:  {}", format_distance(km)));
    }
    if let Some(image) = item.first_image() {
        lines.push(format!("Image:     {}", image));
    }
    if let Ok(url) = item_url(&config.web_base_url, &item.id) {
        lines.push(format!("Link:      {}", url));
    }

    if !item.description.trim().is_empty() {
        lines.push(String::new());
        lines.extend(item.description.lines().map(str::to_string));
    }
    lines
}

fn help_dialog() -> InfoDialog {
    let lines = [
        "Enter          Search / item actions",
        "Up/Down        Search history (search bar)",
        "j/k            Move selection",
        "n/p  \u{2190}/\u{2192}       Next / previous page",
        "1-9            Jump to page",
        "s              Cycle sort order",
        "c              Clear filters",
        "Ctrl+F         Filters",
        "o / y          Open in browser / copy link",
        "r  F5          Refresh",
        "Tab  /         Focus search",
        "Esc            Back / quit",
    ];
    InfoDialog::new("Keys".to_string(), lines.iter().map(|l| l.to_string()).collect())
}
