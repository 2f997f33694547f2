mod game;
mod grid;
mod term;
mod snake;

use std::error::Error;
use std::fs::File;
use std::process::exit;

use game::Lifecycle;
use log::{error, info, LevelFilter};
use simplelog::{Config, WriteLogger};

/// (row, column) on the board, 0-indexed.
pub type Coords = (usize, usize);

const LOG_FILE: &str = "snake.log";

fn main() {
    // Reported before the terminal switches to raw mode
    if let Err(e) = init_logging(LOG_FILE) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    info!("Starting snake");

    match game::play() {
        Ok(outcome) => {
            info!("Game finished: {:?}", outcome);
            if outcome.state == Lifecycle::Dead {
                println!("Game Over");
                println!("{} reached a length of {}", outcome.name, outcome.length);
            }
        }
        Err(e) => {
            error!("Terminal error: {}", e);
            eprintln!("Error: {}", e);
            exit(1);
        }
    }
}

/// The terminal is in raw mode while playing, so logs go to a file.
fn init_logging(path: &str) -> Result<(), Box<dyn Error>> {
    let file = File::create(path).map_err(|e| format!("can't create {}: {}", path, e))?;
    WriteLogger::init(LevelFilter::Info, Config::default(), file)?;
    Ok(())
}
