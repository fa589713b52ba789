use std::sync::mpsc;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::engine::{EngineEvent, RodioEngine};
use crate::session::Session;

mod event_loop;
mod settings;
mod startup;

pub use settings::load_settings;

pub fn run(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();

    match startup::init_logging(&settings) {
        Ok(path) => log::info!("reprise starting, logging to {}", path.display()),
        Err(e) => eprintln!("reprise: logging disabled: {e}"),
    }

    let (event_tx, event_rx) = mpsc::channel::<EngineEvent>();
    let engine = RodioEngine::new(event_tx, settings.audio.volume, settings.audio.speed);
    let mut session = Session::open(&settings, engine);
    startup::import_args(&mut session, args, &settings.library);

    let mut app = App::new(settings.ui.start_in, settings.ui.header_text.clone());

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::default();
        event_loop::run(
            &mut terminal,
            &settings,
            &mut app,
            &mut session,
            &event_rx,
            &mut state,
        )
    })();

    // Persist before the engine goes away.
    session.close();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
