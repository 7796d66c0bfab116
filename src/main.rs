use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::prelude::*;

use staffing_terminal::config::PredictConfig;
use staffing_terminal::logging::init_logging;
use staffing_terminal::predict::GeminiClient;
use staffing_terminal::state::{AppState, Delta, ProviderCommand, apply_delta};
use staffing_terminal::ui;
use staffing_terminal::worker::spawn_prediction_worker;

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(state: AppState, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state,
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.add_form.is_some() {
            self.on_form_key(key);
            return;
        }
        if self.state.show_prediction {
            self.on_prediction_key(key);
            return;
        }
        if self.state.search_active {
            self.on_search_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('/') => self.state.search_active = true,
            KeyCode::Char('a') | KeyCode::Char('A') => self.state.open_add_form(),
            KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Enter => {
                let cmd = self.state.request_prediction_for_selected();
                self.dispatch(cmd);
            }
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => {
                if self.state.help_overlay {
                    self.state.help_overlay = false;
                } else {
                    self.state.clear_search();
                }
            }
            _ => {}
        }
    }

    fn on_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.state.search_active = false,
            KeyCode::Esc => {
                self.state.clear_search();
                self.state.search_active = false;
            }
            KeyCode::Backspace => self.state.pop_search_char(),
            KeyCode::Down => self.state.select_next(),
            KeyCode::Up => self.state.select_prev(),
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.state.push_search_char(ch)
            }
            _ => {}
        }
    }

    fn on_prediction_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                let cmd = self.state.close_prediction();
                self.dispatch(cmd);
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                let cmd = self.state.retry_prediction();
                self.dispatch(cmd);
            }
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn on_form_key(&mut self, key: KeyEvent) {
        let Some(form) = self.state.add_form.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.state.close_add_form(),
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
            KeyCode::Backspace => form.pop_char(),
            KeyCode::Enter => {
                self.state.submit_add_form();
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                form.push_char(ch)
            }
            _ => {}
        }
    }

    fn dispatch(&mut self, cmd: Option<ProviderCommand>) {
        let Some(cmd) = cmd else {
            return;
        };
        let Some(tx) = self.cmd_tx.as_ref() else {
            self.state.settle_undeliverable(cmd);
            return;
        };
        if let Err(mpsc::SendError(cmd)) = tx.send(cmd) {
            self.cmd_tx = None;
            self.state.settle_undeliverable(cmd);
        }
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let logging = init_logging();
    let config = PredictConfig::from_env();

    let has_key = config.api_key.is_some();
    let predictor = GeminiClient::new(config)?;

    let mut state = AppState::new();
    state.model_name = predictor.model().to_string();
    match logging {
        Ok(Some(path)) => state.push_log(format!("[INFO] Diagnostics in {}", path.display())),
        Ok(None) => {}
        Err(err) => state.push_log(format!("[WARN] Diagnostics disabled: {err}")),
    }
    if !has_key {
        state.push_log("[WARN] GEMINI_API_KEY not set; predictions will fail");
    }

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_prediction_worker(predictor, tx, cmd_rx);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(state, Some(cmd_tx));
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui::draw(f, &app.state))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
