use std::{thread::sleep, time::Duration};

use anyhow::{Context, Result};
use crossterm::event::{KeyEvent, KeyModifiers, KeyCode};
use tracing::info;

use snake::{GameConfig, GameOverReason, GameState, GameStateMachine, Position, StepOutcome};
use snake::Direction::{*, self};

use crate::term::{Coords, TermInt, TermManager};

const SNAKE_BODY_CHAR: char = '█';
const APPLE_CHAR: char = 'O';
const DEAD_SNAKE_CHAR: char = 'X';
const SCORE_POS: Coords = (2, 0);

/// What to do once a round is over.
pub enum Flow {
    PlayAgain,
    Quit,
}

pub struct SnakeGame {
    paused: bool,
    frame: Duration,
    term: TermManager,
    game: GameStateMachine,
    rounds: u32,
}

impl SnakeGame {
    /// Sizes the grid to fit inside the terminal border unless the config
    /// pins it.
    pub fn new(mut config: GameConfig) -> Result<Self> {
        let term = TermManager::new().context("reading terminal size")?;
        let (w, h) = term.get_terminal_size();

        if config.grid.cols <= 0 {
            config.grid.cols = w.saturating_sub(2) as i32;
        }
        if config.grid.rows <= 0 {
            config.grid.rows = h.saturating_sub(2) as i32;
        }
        config.grid.cols = config.grid.cols.min(w.saturating_sub(2) as i32);
        config.grid.rows = config.grid.rows.min(h.saturating_sub(2) as i32);

        let game = GameStateMachine::new(&config).context("terminal too small for the board")?;
        let frame = Duration::from_millis(config.speed.frame_ms);

        Ok(SnakeGame { paused: false, frame, term, game, rounds: 0 })
    }

    pub fn initialize(&mut self) -> Result<()> {
        self.term.setup().context("setting up terminal")?;
        Ok(())
    }

    pub fn restore(&mut self) -> Result<()> {
        self.term.restore().context("restoring terminal")?;
        Ok(())
    }

    pub fn show_intro(&mut self) -> Result<Flow> {
        let lines = &[
            "Arrow keys or WASD to move",
            "Esc to pause",
            "CTRL+C to quit",
            "",
            "Press any key to begin"
        ];

        self.term.show_message(lines)?;

        if is_ctrl_c(&self.term.read_key_blocking()?) {
            return Ok(Flow::Quit);
        }

        self.term.hide_message()?;
        Ok(Flow::PlayAgain)
    }

    pub fn play(&mut self) -> Result<Flow> {
        if self.rounds == 0 {
            self.game.start()?;
        } else {
            self.game.restart()?;
        }
        self.rounds += 1;

        self.term.clear()?;
        self.term.draw_borders()?;
        self.print_score()?;
        self.print_board()?;

        if self.game.state() == GameState::Idle {
            self.term.show_message(&["Get ready!"])?;
        }

        loop {
            sleep(self.frame);

            for key_ev in self.term.read_key_events_queue()? {
                match &key_ev {
                    ev if is_ctrl_c(ev) => return Ok(Flow::Quit),
                    KeyEvent { code, modifiers: _ } => match code {
                        KeyCode::Char('w') | KeyCode::Up => self.game.request_direction(Up),
                        KeyCode::Char('a') | KeyCode::Left => self.game.request_direction(Left),
                        KeyCode::Char('s') | KeyCode::Down => self.game.request_direction(Down),
                        KeyCode::Char('d') | KeyCode::Right => self.game.request_direction(Right),
                        KeyCode::Esc => self.toggle_pause()?,
                        _ => {}
                    }
                }
            }

            if self.paused { continue; }

            match self.game.tick(1) {
                None => {}
                Some(StepOutcome::Started) => {
                    self.term.hide_message()?;
                    self.print_board()?;
                }
                Some(mov @ StepOutcome::Moved { .. }) => self.print_snake_update(&mov)?,
                Some(StepOutcome::Finished(reason)) => {
                    self.game_over(reason)?;
                    break;
                }
            }
        }

        // Any key plays again, CTRL+C quits
        if is_ctrl_c(&self.term.read_key_blocking()?) {
            return Ok(Flow::Quit);
        }

        Ok(Flow::PlayAgain)
    }

    pub fn score(&self) -> u32 {
        self.game.score()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn game_over(&mut self, reason: GameOverReason) -> Result<()> {
        let win = reason == GameOverReason::BoardFilled;
        let s = if win {"You won!"} else {"Game over!"};
        info!(score = self.game.score(), round = self.rounds, "round finished");

        self.print_board()?;
        if !win {
            for pos in self.game.body() {
                self.term.print_at(to_screen(*pos), DEAD_SNAKE_CHAR)?;
            }
        }

        self.term.show_message(&[
            s,
            &*format!("Score: {}", self.game.score()),
            "",
            "Press any key to play again,",
            "or CTRL+C to quit."
        ])?;
        Ok(())
    }

    fn print_board(&mut self) -> Result<()> {
        if let Some(food) = self.game.food() {
            self.term.print_at(to_screen(food), APPLE_CHAR)?;
        }

        let head = head_char(self.game.direction());
        for (i, pos) in self.game.body().iter().enumerate() {
            let ch = if i == 0 {head} else {SNAKE_BODY_CHAR};
            self.term.print_at(to_screen(*pos), ch)?;
        }

        self.term.flush()?;
        Ok(())
    }

    fn print_snake_update(&mut self, mov: &StepOutcome) -> Result<()> {
        if let StepOutcome::Moved { new_head, old_head, old_tail, ate } = *mov {
            if let Some(old_tail_pos) = old_tail {
                self.term.print_at(to_screen(old_tail_pos), ' ')?;
            }

            self.term.print_at(to_screen(new_head), head_char(self.game.direction()))?;
            self.term.print_at(to_screen(old_head), SNAKE_BODY_CHAR)?;

            if ate {
                if let Some(food) = self.game.food() {
                    self.term.print_at(to_screen(food), APPLE_CHAR)?;
                }
                self.print_score()?;
            }

            self.term.flush()?;
        }
        Ok(())
    }

    /// Running score, drawn over the top border.
    fn print_score(&mut self) -> Result<()> {
        self.term.print_str_at(SCORE_POS, &score_text(self.game.score()))?;
        Ok(())
    }

    fn toggle_pause(&mut self) -> Result<()> {
        if !self.paused {
            self.term.show_message(&["Paused", "Press Esc to resume", "or Ctrl+C to quit"])?;
        } else {
            self.term.hide_message()?;
        }

        self.paused = !self.paused;
        Ok(())
    }
}

fn score_text(score: u32) -> String {
    format!(" Score: {} ", score)
}

/// Grid cells sit one column and one row in from the border.
fn to_screen(pos: Position) -> Coords {
    ((pos.col + 1) as TermInt, (pos.row + 1) as TermInt)
}

fn head_char(direction: Direction) -> char {
    match direction {
        Up => '^',
        Down => 'v',
        Left => '<',
        Right => '>',
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}
