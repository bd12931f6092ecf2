//! Volley Core headless driver
//!
//! Runs one match at a fixed timestep and prints every snapshot that carries
//! score events as a JSON line. The designated server always serves right
//! away, so points keep coming without a client attached.
//!
//! Usage: `volley-core [game_def.json] [frames]`

use std::process::ExitCode;

use volley_core::consts::FRAME_DT;
use volley_core::{GameDefinition, Match, MatchSettings};

const DEFAULT_FRAMES: u64 = 1800;

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);

    let def = match args.next() {
        Some(path) => GameDefinition::load(&path)?,
        None => {
            log::info!("No game definition given, using the default court");
            GameDefinition::default()
        }
    };
    let frames = match args.next() {
        Some(n) => n.parse::<u64>()?,
        None => DEFAULT_FRAMES,
    };

    let mut game = Match::new(def, MatchSettings::default())?;
    log::info!("Running {frames} frames at {:.1} Hz", 1.0 / FRAME_DT);

    for frame in 0..frames {
        if game.over() {
            break;
        }
        if let Some(server) = game.mode().server() {
            game.double_touch(server.index());
        }

        let snapshot = game.step(FRAME_DT)?;
        if snapshot.event.is_some() {
            println!("{}", snapshot.to_json()?);
            log::debug!("Frame {frame}: {:?}", snapshot.events());
        }
    }

    let [one, two] = game.score();
    log::info!("Final score after {:.1}s: {one}-{two}", game.now().as_secs_f32());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
