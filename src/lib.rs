//! Grid snake: movement, growth, collisions and food placement.
//!
//! Nothing in here draws or reads the keyboard. A front-end owns a
//! [`GameStateMachine`], calls [`GameStateMachine::tick`] once per frame,
//! forwards key presses to [`GameStateMachine::request_direction`] and redraws
//! from the read-only accessors.

pub mod collision;
pub mod config;
pub mod direction;
pub mod error;
pub mod food;
pub mod game;
pub mod input;
pub mod scheduler;
pub mod snake;

pub use collision::Collision;
pub use config::GameConfig;
pub use direction::{Bounds, Direction, Position};
pub use error::{ConfigError, GameError};
pub use food::FoodSpawner;
pub use game::{GameOverReason, GameState, GameStateMachine, StepOutcome, SCORE_PER_FOOD};
pub use input::InputBuffer;
pub use scheduler::TickScheduler;
pub use snake::Snake;
