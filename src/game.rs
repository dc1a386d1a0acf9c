use std::cmp::max;
use std::collections::HashSet;
use std::iter::once;

use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use tracing::{debug, info, trace};

use crate::collision::{self, Collision};
use crate::config::{GameConfig, GridConfig, SpeedConfig};
use crate::direction::{Bounds, Direction::{self, *}, Position};
use crate::error::GameError;
use crate::food::FoodSpawner;
use crate::input::InputBuffer;
use crate::scheduler::TickScheduler;
use crate::snake::{self, Snake};

pub const SCORE_PER_FOOD: u32 = 10;

const START_DIRECTION: Direction = Right;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameState {
    Idle,
    Playing,
    GameOver,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameOverReason {
    Wall,
    SelfCollision,
    /// The snake covers the whole board, there is nowhere left for food.
    BoardFilled,
}

/// What a call to `tick` did, for front-ends that redraw incrementally.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The warm-up after a restart ran out and the snake is moving.
    Started,
    Moved { new_head: Position, old_head: Position, old_tail: Option<Position>, ate: bool },
    Finished(GameOverReason),
}

/// Everything that belongs to one round. Replaced as a whole on restart.
#[derive(Clone, Debug)]
struct Round {
    snake: Snake,
    food: Option<Position>,
    score: u32,
    foods_eaten: u32,
    input: InputBuffer,
}

/// Drives one game of snake on a fixed grid.
///
/// The machine owns no I/O: a front-end feeds it frame deltas and direction
/// requests, and reads the body, food, score and state back to draw them.
pub struct GameStateMachine<R = StdRng> {
    grid: GridConfig,
    speed: SpeedConfig,
    bounds: Bounds,
    round: Round,
    state: GameState,
    reason: Option<GameOverReason>,
    warmup: Option<u32>,
    scheduler: TickScheduler,
    spawner: FoodSpawner<R>,
}

impl GameStateMachine<StdRng> {
    pub fn new(config: &GameConfig) -> Result<Self, GameError> {
        GameStateMachine::with_rng(config, StdRng::from_entropy())
    }
}

impl<R: Rng> GameStateMachine<R> {
    /// Sets up a board in `Idle`. Nothing moves until `start`.
    pub fn with_rng(config: &GameConfig, rng: R) -> Result<Self, GameError> {
        let bounds = validate_grid(&config.grid)?;
        let mut spawner = FoodSpawner::new(rng);
        let round = fresh_round(&config.grid, bounds, &mut spawner)?;

        Ok(GameStateMachine::assemble(config, bounds, round, spawner, GameState::Idle))
    }

    /// Starts a round from an explicit board instead of the usual straight
    /// snake in the middle. The round is already `Playing`.
    ///
    /// Only the layout itself is checked; `grid.initial_length` matters again
    /// once the machine is restarted.
    pub fn with_layout(
        config: &GameConfig,
        body: Vec<Position>,
        direction: Direction,
        food: Position,
        rng: R,
    ) -> Result<Self, GameError> {
        let (cols, rows) = (config.grid.cols, config.grid.rows);
        if cols <= 0 || rows <= 0 {
            return Err(GameError::EmptyGrid { cols, rows });
        }
        let bounds = Bounds::new(cols, rows);

        if body.iter().any(|pos| !bounds.contains(*pos)) {
            return Err(GameError::InvalidLayout("snake is off the board"));
        }
        let distinct: HashSet<&Position> = body.iter().collect();
        if distinct.len() != body.len() {
            return Err(GameError::InvalidLayout("snake overlaps itself"));
        }
        let connected = body.windows(2).all(|pair| {
            (pair[0].col - pair[1].col).abs() + (pair[0].row - pair[1].row).abs() == 1
        });
        if !connected {
            return Err(GameError::InvalidLayout("snake segments are not adjacent"));
        }

        let snake = Snake::from_segments(body)
            .ok_or(GameError::InvalidLayout("snake has no segments"))?;
        if snake.len() >= bounds.area() {
            return Err(GameError::InvalidLayout("snake leaves no room for food"));
        }
        if !bounds.contains(food) || snake.contains(food) {
            return Err(GameError::InvalidLayout("food must be on a free cell"));
        }

        let round = Round {
            snake,
            food: Some(food),
            score: 0,
            foods_eaten: 0,
            input: InputBuffer::new(direction),
        };
        let spawner = FoodSpawner::new(rng);
        Ok(GameStateMachine::assemble(config, bounds, round, spawner, GameState::Playing))
    }

    /// Throws the current round away and starts moving right away.
    pub fn start(&mut self) -> Result<(), GameError> {
        self.reset_round()?;
        self.state = GameState::Playing;
        info!(cols = self.bounds.cols, rows = self.bounds.rows, "round started");
        Ok(())
    }

    /// Like `start`, but the snake sits still for the configured warm-up
    /// before the first step.
    pub fn restart(&mut self) -> Result<(), GameError> {
        if self.speed.restart_delay == 0 {
            return self.start();
        }

        self.reset_round()?;
        self.state = GameState::Idle;
        self.warmup = Some(self.speed.restart_delay);
        debug!(frames = self.speed.restart_delay, "warming up");
        Ok(())
    }

    pub fn request_direction(&mut self, direction: Direction) {
        if self.state == GameState::GameOver {
            return;
        }

        if !self.round.input.request(direction) {
            trace!(?direction, pending = ?self.round.input.pending(), "reversal ignored");
        }
    }

    /// Feeds `frames` of elapsed time in. Does nothing before `start` or
    /// once the game is over.
    pub fn tick(&mut self, frames: u32) -> Option<StepOutcome> {
        match self.state {
            GameState::Idle => self.tick_warmup(frames),
            GameState::GameOver => None,
            GameState::Playing => {
                if self.scheduler.advance(frames) {
                    Some(self.step())
                } else {
                    None
                }
            }
        }
    }

    pub fn body(&self) -> &[Position] {
        self.round.snake.body()
    }

    /// `None` only once the snake has filled the board.
    pub fn food(&self) -> Option<Position> {
        self.round.food
    }

    pub fn score(&self) -> u32 {
        self.round.score
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        self.reason
    }

    pub fn direction(&self) -> Direction {
        self.round.input.committed()
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn move_delay(&self) -> u32 {
        self.scheduler.delay()
    }

    pub fn set_move_delay(&mut self, frames: u32) {
        self.scheduler.set_delay(frames);
    }

    ///////////////////////////////////////////////////////////////////////////

    fn assemble(
        config: &GameConfig,
        bounds: Bounds,
        round: Round,
        spawner: FoodSpawner<R>,
        state: GameState,
    ) -> Self {
        GameStateMachine {
            grid: config.grid.clone(),
            speed: config.speed.clone(),
            bounds,
            round,
            state,
            reason: None,
            warmup: None,
            scheduler: TickScheduler::new(config.speed.move_delay),
            spawner,
        }
    }

    fn step(&mut self) -> StepOutcome {
        let direction = self.round.input.consume();
        let old_head = self.round.snake.head();
        let candidate = old_head.step(direction);

        match collision::check(candidate, self.bounds, self.round.snake.body()) {
            Collision::Wall => return self.finish(GameOverReason::Wall),
            Collision::SelfCollision => return self.finish(GameOverReason::SelfCollision),
            Collision::Ok => {}
        }

        let ate = self.round.food.map_or(false, |food| snake::contains_food(candidate, food));
        let mut next_food = self.round.food;

        if ate {
            self.round.score += SCORE_PER_FOOD;
            self.round.foods_eaten += 1;
            let occupied = self.round.snake.body().iter().chain(once(&candidate));
            next_food = self.spawner.spawn(self.bounds, occupied);
            debug!(score = self.round.score, len = self.round.snake.len() + 1, "food eaten");
            self.speed_up();
        }

        let old_tail = self.round.snake.advance(candidate, ate);
        self.round.food = next_food;
        trace!(?direction, head = ?candidate, "step");

        if next_food.is_none() {
            return self.finish(GameOverReason::BoardFilled);
        }

        StepOutcome::Moved { new_head: candidate, old_head, old_tail, ate }
    }

    fn finish(&mut self, reason: GameOverReason) -> StepOutcome {
        self.state = GameState::GameOver;
        self.reason = Some(reason);
        info!(score = self.round.score, len = self.round.snake.len(), ?reason, "game over");
        StepOutcome::Finished(reason)
    }

    fn tick_warmup(&mut self, frames: u32) -> Option<StepOutcome> {
        let left = self.warmup?;

        if frames < left {
            self.warmup = Some(left - frames);
            return None;
        }

        self.warmup = None;
        self.state = GameState::Playing;
        self.scheduler.reset();
        info!(cols = self.bounds.cols, rows = self.bounds.rows, "round started");
        Some(StepOutcome::Started)
    }

    /// Every `speedup_every` foods the snake gets one frame faster.
    fn speed_up(&mut self) {
        let every = match self.speed.speedup_every {
            Some(n) if n > 0 => n,
            _ => return,
        };

        let delay = max(
            self.speed.move_delay.saturating_sub(self.round.foods_eaten / every),
            max(self.speed.min_move_delay, 1),
        );
        if delay != self.scheduler.delay() {
            debug!(delay, "speeding up");
            self.scheduler.set_delay(delay);
        }
    }

    fn reset_round(&mut self) -> Result<(), GameError> {
        self.round = fresh_round(&self.grid, self.bounds, &mut self.spawner)?;
        self.reason = None;
        self.warmup = None;
        self.scheduler.set_delay(self.speed.move_delay);
        self.scheduler.reset();
        Ok(())
    }
}

fn validate_grid(grid: &GridConfig) -> Result<Bounds, GameError> {
    let (cols, rows) = (grid.cols, grid.rows);
    if cols <= 0 || rows <= 0 {
        return Err(GameError::EmptyGrid { cols, rows });
    }
    if grid.initial_length == 0 {
        return Err(GameError::ZeroLength);
    }

    // The starting snake lies straight, head in the middle, tail to the left,
    // and must leave at least one cell for food.
    let bounds = Bounds::new(cols, rows);
    let room_behind_head = bounds.center().col as usize + 1;
    if grid.initial_length > room_behind_head || grid.initial_length >= bounds.area() {
        return Err(GameError::GridTooSmall { cols, rows, length: grid.initial_length });
    }

    Ok(bounds)
}

fn fresh_round<R: Rng>(
    grid: &GridConfig,
    bounds: Bounds,
    spawner: &mut FoodSpawner<R>,
) -> Result<Round, GameError> {
    let snake = Snake::new(bounds.center(), grid.initial_length, START_DIRECTION);
    let food = spawner.spawn(bounds, snake.body())
        .ok_or(GameError::GridTooSmall {
            cols: bounds.cols,
            rows: bounds.rows,
            length: grid.initial_length,
        })?;

    Ok(Round {
        snake,
        food: Some(food),
        score: 0,
        foods_eaten: 0,
        input: InputBuffer::new(START_DIRECTION),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(col: i32, row: i32) -> Position {
        Position::new(col, row)
    }

    fn seeded(config: &GameConfig) -> GameStateMachine {
        GameStateMachine::with_rng(config, StdRng::seed_from_u64(9)).unwrap()
    }

    fn layout(
        config: &GameConfig,
        body: Vec<Position>,
        direction: Direction,
        food: Position,
    ) -> GameStateMachine {
        GameStateMachine::with_layout(config, body, direction, food, StdRng::seed_from_u64(9))
            .unwrap()
    }

    /// Runs exactly one logic step regardless of the configured delay.
    fn step(game: &mut GameStateMachine) -> Option<StepOutcome> {
        game.tick(game.move_delay())
    }

    #[test]
    fn new_machine_is_idle_and_ignores_ticks() {
        let mut game = seeded(&GameConfig::with_grid(20, 20));
        let body = game.body().to_vec();

        assert_eq!(game.state(), GameState::Idle);
        assert_eq!(game.tick(100), None);
        assert_eq!(game.body(), body.as_slice());
    }

    #[test]
    fn start_lays_snake_out_in_the_middle() {
        let mut game = seeded(&GameConfig::with_grid(20, 20));
        game.start().unwrap();

        assert_eq!(game.state(), GameState::Playing);
        assert_eq!(game.body(), &[p(10, 10), p(9, 10), p(8, 10)]);
        assert_eq!(game.direction(), Right);
        assert!(!game.body().contains(&game.food().unwrap()));
    }

    #[test]
    fn moves_only_when_scheduler_fires() {
        let mut game = seeded(&GameConfig::with_grid(20, 20));
        game.start().unwrap();

        for _ in 0..4 {
            assert_eq!(game.tick(1), None);
        }
        assert!(matches!(game.tick(1), Some(StepOutcome::Moved { .. })));
        assert_eq!(game.body()[0], p(11, 10));
    }

    #[test]
    fn eating_grows_scores_and_respawns() {
        let config = GameConfig::with_grid(10, 10);
        let mut game = layout(&config, vec![p(5, 5), p(4, 5), p(3, 5)], Right, p(6, 5));

        let outcome = step(&mut game);

        assert_eq!(
            outcome,
            Some(StepOutcome::Moved { new_head: p(6, 5), old_head: p(5, 5), old_tail: None, ate: true })
        );
        assert_eq!(game.body(), &[p(6, 5), p(5, 5), p(4, 5), p(3, 5)]);
        assert_eq!(game.score(), SCORE_PER_FOOD);
        assert!(!game.body().contains(&game.food().unwrap()));
    }

    #[test]
    fn wall_ends_the_round() {
        let config = GameConfig::with_grid(10, 10);
        let mut game = layout(&config, vec![p(9, 5), p(8, 5), p(7, 5)], Right, p(0, 0));
        let body = game.body().to_vec();

        assert_eq!(step(&mut game), Some(StepOutcome::Finished(GameOverReason::Wall)));
        assert_eq!(game.state(), GameState::GameOver);
        assert_eq!(game.game_over_reason(), Some(GameOverReason::Wall));
        assert_eq!(game.body(), body.as_slice());

        // Frozen until restart.
        game.request_direction(Up);
        assert_eq!(step(&mut game), None);
        assert_eq!(game.body(), body.as_slice());
    }

    #[test]
    fn turning_into_the_body_ends_the_round() {
        let config = GameConfig::with_grid(10, 10);
        let body = vec![p(5, 5), p(4, 5), p(3, 5), p(3, 6), p(4, 6), p(5, 6)];
        let mut game = layout(&config, body, Up, p(0, 0));

        game.request_direction(Left);
        assert_eq!(step(&mut game), Some(StepOutcome::Finished(GameOverReason::SelfCollision)));
        assert_eq!(game.state(), GameState::GameOver);
    }

    #[test]
    fn chasing_the_tail_is_fatal() {
        let config = GameConfig::with_grid(10, 10);
        let body = vec![p(5, 6), p(4, 6), p(4, 5), p(5, 5)];
        let mut game = layout(&config, body, Right, p(0, 0));

        game.request_direction(Up);
        assert_eq!(step(&mut game), Some(StepOutcome::Finished(GameOverReason::SelfCollision)));
    }

    #[test]
    fn filling_the_board_wins() {
        let config = GameConfig::with_grid(2, 2);
        let mut game = layout(&config, vec![p(0, 1), p(0, 0), p(1, 0)], Right, p(1, 1));

        assert_eq!(step(&mut game), Some(StepOutcome::Finished(GameOverReason::BoardFilled)));
        assert_eq!(game.body().len(), 4);
        assert_eq!(game.score(), SCORE_PER_FOOD);
        assert_eq!(game.food(), None);
        assert_eq!(game.state(), GameState::GameOver);
    }

    #[test]
    fn small_boards_take_explicit_layouts() {
        // Too small for the default straight snake, fine for a hand-placed one.
        let config = GameConfig::with_grid(3, 3);
        let mut game = layout(&config, vec![p(0, 0), p(1, 0)], Down, p(2, 2));
        assert_eq!(game.state(), GameState::Playing);

        assert!(matches!(step(&mut game), Some(StepOutcome::Moved { ate: false, .. })));
        assert_eq!(game.body(), &[p(0, 1), p(0, 0)]);
    }

    #[test]
    fn filling_a_three_by_three_board() {
        let config = GameConfig::with_grid(3, 3);
        let body = vec![
            p(1, 2), p(0, 2), p(0, 1), p(1, 1),
            p(2, 1), p(2, 0), p(1, 0), p(0, 0),
        ];
        let mut game = layout(&config, body, Right, p(2, 2));

        assert_eq!(step(&mut game), Some(StepOutcome::Finished(GameOverReason::BoardFilled)));
        assert_eq!(game.body().len(), 9);
        assert_eq!(game.food(), None);
    }

    #[test]
    fn restart_warms_up_before_moving() {
        let mut config = GameConfig::with_grid(20, 20);
        config.speed.restart_delay = 10;
        let mut game = layout(&config, vec![p(19, 5), p(18, 5), p(17, 5)], Right, p(0, 0));
        step(&mut game);
        assert_eq!(game.state(), GameState::GameOver);

        game.restart().unwrap();
        assert_eq!(game.state(), GameState::Idle);
        assert_eq!(game.score(), 0);
        assert_eq!(game.body().len(), 3);
        assert_eq!(game.game_over_reason(), None);

        assert_eq!(game.tick(9), None);
        assert_eq!(game.state(), GameState::Idle);
        assert_eq!(game.tick(1), Some(StepOutcome::Started));
        assert_eq!(game.state(), GameState::Playing);
    }

    #[test]
    fn restart_without_delay_plays_immediately() {
        let mut config = GameConfig::with_grid(20, 20);
        config.speed.restart_delay = 0;
        let mut game = seeded(&config);

        game.restart().unwrap();
        assert_eq!(game.state(), GameState::Playing);
    }

    #[test]
    fn speeds_up_with_food() {
        let mut config = GameConfig::with_grid(20, 3);
        config.speed.move_delay = 5;
        config.speed.min_move_delay = 4;
        config.speed.speedup_every = Some(1);
        let body = vec![p(3, 1), p(2, 1), p(1, 1)];
        let mut game = layout(&config, body, Right, p(4, 1));

        step(&mut game);
        assert_eq!(game.move_delay(), 4);

        // Force the next food right in front of the head.
        game.round.food = Some(p(5, 1));
        step(&mut game);
        assert_eq!(game.move_delay(), 4);
    }

    #[test]
    fn restart_restores_base_delay() {
        let mut config = GameConfig::with_grid(20, 20);
        config.speed.restart_delay = 0;
        let mut game = seeded(&config);
        game.set_move_delay(2);

        game.restart().unwrap();
        assert_eq!(game.move_delay(), config.speed.move_delay);
    }

    #[test]
    fn rejects_bad_grids() {
        let mut config = GameConfig::with_grid(0, 10);
        assert_eq!(
            GameStateMachine::new(&config).err(),
            Some(GameError::EmptyGrid { cols: 0, rows: 10 })
        );

        config = GameConfig::with_grid(4, 1);
        config.grid.initial_length = 4;
        assert!(matches!(
            GameStateMachine::new(&config),
            Err(GameError::GridTooSmall { length: 4, .. })
        ));

        config.grid.initial_length = 0;
        assert_eq!(GameStateMachine::new(&config).err(), Some(GameError::ZeroLength));
    }

    #[test]
    fn rejects_bad_layouts() {
        let config = GameConfig::with_grid(10, 10);
        let rng = || StdRng::seed_from_u64(1);

        let gap = GameStateMachine::with_layout(&config, vec![p(5, 5), p(3, 5)], Right, p(0, 0), rng());
        assert!(matches!(gap, Err(GameError::InvalidLayout(_))));

        let overlap = GameStateMachine::with_layout(&config, vec![p(5, 5), p(5, 5)], Right, p(0, 0), rng());
        assert!(matches!(overlap, Err(GameError::InvalidLayout(_))));

        let off_board = GameStateMachine::with_layout(&config, vec![p(10, 5)], Right, p(0, 0), rng());
        assert!(matches!(off_board, Err(GameError::InvalidLayout(_))));

        let food_on_body = GameStateMachine::with_layout(&config, vec![p(5, 5)], Right, p(5, 5), rng());
        assert!(matches!(food_on_body, Err(GameError::InvalidLayout(_))));

        let empty = GameStateMachine::with_layout(&config, vec![], Right, p(0, 0), rng());
        assert!(matches!(empty, Err(GameError::InvalidLayout(_))));

        let tiny = GameConfig::with_grid(2, 1);
        let no_room = GameStateMachine::with_layout(&tiny, vec![p(0, 0), p(1, 0)], Right, p(0, 0), rng());
        assert!(matches!(no_room, Err(GameError::InvalidLayout(_))));

        let flat = GameConfig::with_grid(0, 3);
        let no_grid = GameStateMachine::with_layout(&flat, vec![p(0, 0)], Right, p(0, 1), rng());
        assert!(matches!(no_grid, Err(GameError::EmptyGrid { cols: 0, rows: 3 })));
    }
}
