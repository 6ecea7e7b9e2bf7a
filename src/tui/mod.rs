//! Interactive terminal browser

pub mod app;
pub mod colors;
pub mod menu;
pub mod search;
pub mod table;
pub mod ui;

use crate::api::MarketClient;
use crate::config::{self, AppConfig};
use crate::error::Result;
use crate::storage::LocalStore;
use app::App;
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;

/// Run the browser until the user quits
pub fn run(config: AppConfig, initial_query: Option<&str>) -> Result<()> {
    let client = MarketClient::from_config(&config)?;
    let local = LocalStore::open(config::store_file());

    let mut app = App::new(config, client, local);
    if let Some(query) = initial_query {
        app = app.with_query(query);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    app.start_unread_poller();
    app.start_search();
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}
