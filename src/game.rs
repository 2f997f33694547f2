use std::cmp::max;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use std::io;

use crate::grid::{Grid, CELL_WIDTH};
use crate::snake::{Snake, Direction::{*, self}, MoveResult::*};
use crate::term::{self, Screen, TermManager};

use crossterm::event::{KeyEvent, KeyModifiers, KeyCode};
use log::{error, info};
use rand::{Rng, SeedableRng, rngs::StdRng};

pub const FIELD_SIZE: usize = 30;
pub const TICK_INTERVAL_MS: u64 = 100;
const INPUT_POLL_MS: u64 = 20;
const SNAKE_NAME: &str = "Joe";

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Lifecycle {
    Running,
    Dead,
    Quit,
}

/// What the input side asks of the tick thread.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Command {
    Turn(Direction),
    Quit,
}

/// Final state of a finished game.
#[derive(Debug, PartialEq)]
pub struct Outcome {
    pub state: Lifecycle,
    pub name: String,
    pub length: usize,
}

pub struct SnakeGame<R: Rng> {
    field: Grid,
    snake: Snake,
    rng: R,
    state: Lifecycle,
}

impl<R: Rng> SnakeGame<R> {
    pub fn new(size: usize, mut rng: R) -> Self {
        let mut field = Grid::new(size, &mut rng);
        let snake = Snake::new(SNAKE_NAME);
        snake.set_field(&mut field, &mut rng);

        SnakeGame { field, snake, rng, state: Lifecycle::Running }
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    /// Applies a command. Only has an effect while the game is running.
    pub fn handle(&mut self, command: Command) {
        if self.state != Lifecycle::Running {
            return;
        }

        match command {
            Command::Turn(dir) => self.snake.set_direction(dir),
            Command::Quit => {
                info!("Quit requested");
                self.state = Lifecycle::Quit;
            }
        }
    }

    /// Advances one tick, ringing the bell on `screen` if food was eaten.
    pub fn step<S: Screen>(&mut self, screen: &mut S) -> crossterm::Result<Lifecycle> {
        if self.state != Lifecycle::Running {
            return Ok(self.state);
        }

        match self.snake.move_step(&mut self.field, &mut self.rng) {
            Crashed { .. } => self.state = Lifecycle::Dead,
            Ate { .. } => screen.bell()?,
            Moved { .. } => {}
        }

        Ok(self.state)
    }

    pub fn render<S: Screen>(&mut self, screen: &mut S) -> crossterm::Result<()> {
        self.field.render(screen)?;
        screen.show()
    }

    pub fn outcome(&self) -> Outcome {
        let snake = self.snake();
        Outcome { state: self.state, name: snake.name().to_string(), length: snake.len() }
    }
}

/// Runs a game on the real terminal until the snake dies or the player quits.
/// The terminal is restored before this returns.
pub fn play() -> crossterm::Result<Outcome> {
    let term = TermManager::new()?;
    term.check_size((FIELD_SIZE * CELL_WIDTH) as u16, FIELD_SIZE as u16)?;

    let game = SnakeGame::new(FIELD_SIZE, StdRng::from_entropy());
    let (commands, receiver) = channel();

    let ticker = thread::spawn(move || {
        let mut term = term;
        let mut game = game;
        let res = run_ticks(&mut game, &mut term, &receiver, Duration::from_millis(TICK_INTERVAL_MS));
        res.map(|_| game.outcome())
    });

    let input_res = read_input(&commands, &ticker);
    // Unblocks the tick thread if input failed before a quit was sent
    drop(commands);

    let tick_res = ticker.join().map_err(|_| {
        error!("Tick thread panicked");
        io::Error::new(io::ErrorKind::Other, "tick thread panicked")
    })?;

    input_res?;
    tick_res
}

/// The simulation side: moves and redraws every `interval`, and applies
/// commands as they arrive in between. All drawing happens here.
pub fn run_ticks<R: Rng, S: Screen>(
    game: &mut SnakeGame<R>,
    screen: &mut S,
    commands: &Receiver<Command>,
    interval: Duration,
) -> crossterm::Result<Lifecycle> {
    screen.clear()?;
    game.render(screen)?;

    let mut next_tick = Instant::now() + interval;

    while game.state() == Lifecycle::Running {
        let now = Instant::now();

        if now >= next_tick {
            if game.step(screen)? == Lifecycle::Running {
                game.render(screen)?;
            }
            // Ticks missed while stalled are dropped, not replayed
            next_tick = max(next_tick + interval, Instant::now());
            continue;
        }

        match commands.recv_timeout(next_tick - now) {
            Ok(command) => game.handle(command),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => game.handle(Command::Quit),
        }
    }

    Ok(game.state())
}

/// The input side: turns key presses into commands until the player quits
/// or the tick thread is done.
fn read_input<T>(commands: &Sender<Command>, ticker: &JoinHandle<T>) -> crossterm::Result<()> {
    while !ticker.is_finished() {
        let key_ev = match term::next_key(Duration::from_millis(INPUT_POLL_MS))? {
            Some(ev) => ev,
            None => continue,
        };

        if let Some(command) = command_for(&key_ev) {
            // A closed channel means the tick thread already stopped
            if commands.send(command).is_err() || command == Command::Quit {
                break;
            }
        }
    }

    Ok(())
}

pub fn command_for(ev: &KeyEvent) -> Option<Command> {
    if is_ctrl_c(ev) {
        return Some(Command::Quit);
    }

    match ev.code {
        KeyCode::Esc => Some(Command::Quit),
        KeyCode::Up => Some(Command::Turn(Up)),
        KeyCode::Down => Some(Command::Turn(Down)),
        KeyCode::Left => Some(Command::Turn(Left)),
        KeyCode::Right => Some(Command::Turn(Right)),
        _ => None,
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}
