use rand::Rng;

use crate::config::{GameConfig, INITIAL_DIRECTION, INITIAL_SNAKE};
use crate::food::place_food;
use crate::snake::{Cell, Direction, Snake};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Collision {
    Wall,
    SelfBite,
}

/// What a single tick did to the board.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Moved { new_head: Cell, old_tail: Cell },
    Ate { new_head: Cell, next_food: Cell },
    Crashed(Collision),
    /// Food was eaten and no free cell is left to put the next one on.
    BoardFull,
}

impl TickOutcome {
    pub fn is_over(&self) -> bool {
        matches!(self, TickOutcome::Crashed(_) | TickOutcome::BoardFull)
    }
}

/// One round of snake: the board plus the two direction slots.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    pub food: Cell,
    pub active: Direction,
    pub pending: Direction,
    pub score: u32,
    width: i32,
    height: i32,
    food_score: u32,
}

impl GameState {
    /// A fresh round: the starting snake heading right, score 0, food placed.
    pub fn new<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Self {
        let snake = Snake::from_cells(INITIAL_SNAKE);
        let (width, height) = (config.grid_width(), config.grid_height());
        // validate() guarantees room beyond the three starting cells
        let food = place_food(width, height, snake.body(), rng).unwrap_or(Cell::new(0, 0));

        GameState {
            snake,
            food,
            active: INITIAL_DIRECTION,
            pending: INITIAL_DIRECTION,
            score: 0,
            width,
            height,
            food_score: config.food_score,
        }
    }

    /// Builds a state from explicit pieces, mostly for tests and replays.
    pub fn with_parts(config: &GameConfig, snake: Snake, food: Cell, direction: Direction) -> Self {
        GameState {
            snake,
            food,
            active: direction,
            pending: direction,
            score: 0,
            width: config.grid_width(),
            height: config.grid_height(),
            food_score: config.food_score,
        }
    }

    pub fn grid(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// Queue a turn for the next tick. A turn back onto the active direction's
    /// reverse is dropped; returns whether it was accepted.
    pub fn steer(&mut self, requested: Direction) -> bool {
        if requested.is_opposite(self.active) {
            return false;
        }
        self.pending = requested;
        true
    }

    /// Advance the snake by one cell.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> TickOutcome {
        self.active = self.pending;
        let new_head = self.snake.head().shifted(self.active);

        if !self.in_bounds(new_head) {
            return TickOutcome::Crashed(Collision::Wall);
        }
        if self.snake.bites(new_head) {
            return TickOutcome::Crashed(Collision::SelfBite);
        }

        self.snake.push_head(new_head);

        if new_head == self.food {
            self.score += self.food_score;
            match place_food(self.width, self.height, self.snake.body(), rng) {
                Some(food) => {
                    log::debug!("food eaten at {:?}, next at {:?}", new_head, food);
                    self.food = food;
                    TickOutcome::Ate { new_head, next_food: food }
                }
                None => TickOutcome::BoardFull,
            }
        } else {
            let old_tail = self.snake.pop_tail().unwrap_or(new_head);
            TickOutcome::Moved { new_head, old_tail }
        }
    }

    fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.width && cell.y >= 0 && cell.y < self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snake::Direction::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn state(cells: &[(i32, i32)], food: (i32, i32), direction: Direction) -> GameState {
        let snake = Snake::from_cells(cells.iter().copied().map(Cell::from));
        GameState::with_parts(&GameConfig::default(), snake, Cell::from(food), direction)
    }

    #[test]
    fn test_new_round() {
        let game = GameState::new(&GameConfig::default(), &mut rng());
        assert_eq!(game.snake.body(), &INITIAL_SNAKE);
        assert_eq!(game.active, Right);
        assert_eq!(game.pending, Right);
        assert_eq!(game.score, 0);
        assert!(!game.snake.contains(game.food));
    }

    #[test]
    fn test_plain_move_keeps_length() {
        let mut game = state(&[(5, 10), (4, 10), (3, 10)], (15, 15), Right);
        let outcome = game.tick(&mut rng());

        assert_eq!(
            outcome,
            TickOutcome::Moved { new_head: Cell::new(6, 10), old_tail: Cell::new(3, 10) }
        );
        assert_eq!(game.snake.body(), &[Cell::new(6, 10), Cell::new(5, 10), Cell::new(4, 10)]);
        assert_eq!(game.score, 0);
    }

    #[test]
    fn test_eating_grows_and_scores() {
        let mut game = state(&[(5, 10), (4, 10), (3, 10)], (6, 10), Right);
        let outcome = game.tick(&mut rng());

        assert!(matches!(outcome, TickOutcome::Ate { new_head, next_food } if new_head == Cell::new(6, 10) && next_food == game.food));
        assert_eq!(game.snake.len(), 4);
        assert_eq!(game.snake.tail(), Cell::new(3, 10));
        assert_eq!(game.score, 10);
        assert!(!game.snake.contains(game.food));
    }

    #[test]
    fn test_reverse_is_rejected() {
        let mut game = state(&[(5, 10), (4, 10), (3, 10)], (15, 15), Right);
        assert!(!game.steer(Left));
        assert_eq!(game.pending, Right);

        game.tick(&mut rng());
        assert_eq!(game.snake.head(), Cell::new(6, 10));
    }

    #[test]
    fn test_reverse_checked_against_active_not_pending() {
        let mut game = state(&[(5, 10), (4, 10), (3, 10)], (15, 15), Right);
        assert!(game.steer(Up));
        // still moving right, so left is a reversal even though up is queued
        assert!(!game.steer(Left));
        assert_eq!(game.pending, Up);
        assert!(game.steer(Down));

        game.tick(&mut rng());
        assert_eq!(game.active, Down);
        assert_eq!(game.snake.head(), Cell::new(5, 11));
    }

    #[test]
    fn test_wall_collision_at_origin() {
        let mut game = state(&[(0, 0), (0, 1), (0, 2)], (15, 15), Up);
        game.steer(Left);
        let before = game.clone();

        assert_eq!(game.tick(&mut rng()), TickOutcome::Crashed(Collision::Wall));
        assert_eq!(game.snake, before.snake);
    }

    #[test]
    fn test_wall_collision_far_edge() {
        let mut game = state(&[(19, 4), (18, 4), (17, 4)], (1, 1), Right);
        assert_eq!(game.tick(&mut rng()), TickOutcome::Crashed(Collision::Wall));
    }

    #[test]
    fn test_biting_third_segment_ends_game() {
        // not a connected body, index 2 can't sit next to the head otherwise
        let mut game = state(&[(5, 5), (9, 9), (6, 5), (8, 8)], (15, 15), Right);
        assert_eq!(game.tick(&mut rng()), TickOutcome::Crashed(Collision::SelfBite));
    }

    #[test]
    fn test_biting_body_ends_game() {
        let mut game = state(&[(5, 5), (6, 5), (6, 6), (5, 6), (4, 6)], (15, 15), Left);
        game.steer(Down);
        assert_eq!(game.tick(&mut rng()), TickOutcome::Crashed(Collision::SelfBite));
    }

    #[test]
    fn test_moving_into_tail_is_allowed() {
        let mut game = state(&[(5, 5), (6, 5), (6, 6), (5, 6)], (15, 15), Left);
        game.steer(Down);
        let outcome = game.tick(&mut rng());

        assert_eq!(outcome, TickOutcome::Moved { new_head: Cell::new(5, 6), old_tail: Cell::new(5, 6) });
        assert_eq!(game.snake.body(), &[Cell::new(5, 6), Cell::new(5, 5), Cell::new(6, 5), Cell::new(6, 6)]);
    }

    #[test]
    fn test_tail_exemption_holds_when_eating() {
        // food sits on the tail; the snake grows and keeps the tail, leaving a
        // duplicate cell rather than crashing
        let mut game = state(&[(5, 5), (6, 5), (6, 6), (5, 6)], (5, 6), Left);
        game.steer(Down);
        let outcome = game.tick(&mut rng());

        assert!(matches!(outcome, TickOutcome::Ate { .. }));
        assert_eq!(game.snake.len(), 5);
        assert_eq!(game.score, 10);
    }

    #[test]
    fn test_board_full_after_last_food() {
        let config = GameConfig { canvas_width: 60, canvas_height: 40, grid_size: 20, ..Default::default() };
        // 3x2 grid, snake covers five cells and the sixth holds food
        let snake = Snake::from_cells([(1, 1), (0, 1), (0, 0), (1, 0), (2, 0)].map(|(x, y)| Cell::new(x, y)));
        let mut game = GameState::with_parts(&config, snake, Cell::new(2, 1), Right);

        assert_eq!(game.tick(&mut rng()), TickOutcome::BoardFull);
        assert_eq!(game.score, 10);
        assert_eq!(game.snake.len(), 6);
    }

    #[test]
    fn test_food_never_on_snake_over_many_ticks() {
        let mut rng = rng();
        let mut game = GameState::new(&GameConfig::default(), &mut rng);

        for _ in 0..400 {
            // chase the food so the snake actually eats now and then
            let head = game.snake.head();
            if game.food.x > head.x {
                game.steer(Right);
            } else if game.food.x < head.x {
                game.steer(Left);
            } else if game.food.y > head.y {
                game.steer(Down);
            } else {
                game.steer(Up);
            }

            let len = game.snake.len();
            let score = game.score;
            let outcome = game.tick(&mut rng);
            if outcome.is_over() {
                break;
            }
            match outcome {
                TickOutcome::Ate { .. } => {
                    assert_eq!(game.snake.len(), len + 1);
                    assert_eq!(game.score, score + 10);
                }
                _ => {
                    assert_eq!(game.snake.len(), len);
                    assert_eq!(game.score, score);
                }
            }
            assert!(!game.snake.contains(game.food));
        }
    }
}
