/// Entry point and frame loop.

mod app;
mod ui;

use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{error, info};

use codemaster::config::GameConfig;
use codemaster::logging;
use codemaster::session::gate::SessionContext;
use codemaster::session::store::FileStore;

use app::App;
use ui::input::InputState;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();
    let data_dir = config.general.data_dir.clone();

    // Logging is optional: a read-only data dir must not stop the game.
    let log_path = match std::fs::create_dir_all(&data_dir) {
        Ok(()) => logging::init(&data_dir, &config.general.log_level),
        Err(e) => Err(e.into()),
    };
    match &log_path {
        Ok(path) => info!(log = %path.display(), data_dir = %data_dir.display(), "codemaster starting"),
        Err(e) => eprintln!("Warning: logging disabled: {e}"),
    }

    let store = FileStore::in_dir(&data_dir);
    info!(session = %store.path().display(), "session store ready");
    let ctx = SessionContext::new(store);
    let mut app = App::new(ctx, config, rand::thread_rng().gen());

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut app, &mut renderer);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!(error = %e, "frame loop failed");
        eprintln!("Error: {e}");
    }

    println!();
    println!("Thanks for training with CodeMaster!");
    println!("Total XP: {}", app.ctx.xp());
}

fn game_loop<S: codemaster::session::store::KeyValueStore>(
    app: &mut App<S>,
    renderer: &mut Renderer,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let tick_rate = Duration::from_millis(app.config.general.tick_rate_ms);
    let mut last_tick = Instant::now();

    loop {
        kb.drain_events();

        if kb.ctrl_c_pressed() {
            break;
        }
        app.handle_keys(&kb.presses);
        if app.quit {
            break;
        }

        let elapsed = last_tick.elapsed();
        if elapsed >= tick_rate {
            app.tick(elapsed);
            last_tick = Instant::now();
        }

        renderer.render(app)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    info!("codemaster exiting");
    Ok(())
}
