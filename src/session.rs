//! Start, game over and restart.
//!
//! [`Session`] owns everything a round needs (board, tick schedule, high
//! score, pixel surface) and drives a [`Presenter`] for the parts of the UI
//! that live outside the board.

use std::time::Instant;

use rand::rngs::StdRng;

use crate::config::GameConfig;
use crate::game::{GameState, TickOutcome};
use crate::input::Command;
use crate::render::{self, Canvas};
use crate::snake::Direction;
use crate::store::HighScore;
use crate::ticker::Ticker;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    GameOver,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Overlay {
    StartScreen,
    GameOver,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    /// Live score readout
    Score,
    /// Label of the start control
    StartLabel,
    /// Best score shown on the start screen
    StartHighScore,
    FinalScore,
    HighScore,
}

pub const LABEL_START: &str = "Start";
pub const LABEL_RUNNING: &str = "Running";
pub const LABEL_RESTART: &str = "Restart";

/// The UI around the board.
pub trait Presenter {
    fn show(&mut self, overlay: Overlay);
    fn hide(&mut self, overlay: Overlay);
    fn set_text(&mut self, field: Field, value: &str);
    fn draw(&mut self, canvas: &Canvas);
}

pub struct Session<P: Presenter> {
    config: GameConfig,
    phase: Phase,
    game: GameState,
    ticker: Ticker,
    high_score: HighScore,
    canvas: Canvas,
    rng: StdRng,
    presenter: P,
}

impl<P: Presenter> Session<P> {
    /// Sets up the idle screen: a fresh board drawn once, the start screen
    /// showing the stored best.
    pub fn new(config: GameConfig, high_score: HighScore, mut rng: StdRng, presenter: P) -> Self {
        let game = GameState::new(&config, &mut rng);
        let canvas = Canvas::new(config.canvas_width, config.canvas_height);

        let mut session = Session {
            config,
            phase: Phase::Idle,
            game,
            ticker: Ticker::new(),
            high_score,
            canvas,
            rng,
            presenter,
        };

        let best = session.high_score.best().to_string();
        session.presenter.set_text(Field::StartHighScore, &best);
        session.presenter.set_text(Field::Score, "0");
        session.presenter.set_text(Field::StartLabel, LABEL_START);
        session.presenter.hide(Overlay::GameOver);
        session.presenter.show(Overlay::StartScreen);
        session.redraw();
        session
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    /// Direct board access, for scripted rounds.
    pub fn game_mut(&mut self) -> &mut GameState {
        &mut self.game
    }

    pub fn high_score(&self) -> u32 {
        self.high_score.best()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_running()
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    /// Applies one user command. Returns false once the user asked to quit.
    pub fn handle(&mut self, command: Command, now: Instant) -> bool {
        match command {
            Command::Steer(direction) => self.steer(direction),
            Command::Start => self.start(now),
            Command::Restart => self.restart(now),
            Command::Quit => return false,
            Command::None => {}
        }
        true
    }

    pub fn steer(&mut self, direction: Direction) {
        self.game.steer(direction);
    }

    /// The start control. Does nothing while a round is already running.
    pub fn start(&mut self, now: Instant) {
        if self.phase == Phase::Running {
            return;
        }
        self.begin_round(now);
    }

    /// Play again: a full reset, whatever the current phase.
    pub fn restart(&mut self, now: Instant) {
        self.begin_round(now);
    }

    /// Runs every tick that has come due by `now`.
    pub fn update(&mut self, now: Instant) {
        while self.ticker.poll(now) {
            self.step();
        }
    }

    /// One simulation step followed by a redraw, or the game over transition.
    pub fn step(&mut self) {
        if self.phase != Phase::Running {
            return;
        }

        let outcome = self.game.tick(&mut self.rng);
        match outcome {
            TickOutcome::Crashed(_) | TickOutcome::BoardFull => self.game_over(outcome),
            TickOutcome::Ate { .. } => {
                let score = self.game.score.to_string();
                self.presenter.set_text(Field::Score, &score);
                self.redraw();
            }
            TickOutcome::Moved { .. } => self.redraw(),
        }
    }

    fn begin_round(&mut self, now: Instant) {
        // never two schedules at once
        self.ticker.stop();

        self.game = GameState::new(&self.config, &mut self.rng);
        self.presenter.set_text(Field::Score, "0");
        self.presenter.hide(Overlay::StartScreen);
        self.presenter.hide(Overlay::GameOver);

        self.ticker.start(self.config.tick_period(), now);
        self.phase = Phase::Running;
        self.presenter.set_text(Field::StartLabel, LABEL_RUNNING);
        self.redraw();

        log::info!("Round started, food at {:?}", self.game.food);
    }

    fn game_over(&mut self, outcome: TickOutcome) {
        self.ticker.stop();
        self.phase = Phase::GameOver;

        let score = self.game.score;
        if self.high_score.submit(score) {
            log::info!("New high score: {}", score);
        }
        log::info!("Round over ({:?}), score {}", outcome, score);

        self.presenter.set_text(Field::StartLabel, LABEL_RESTART);
        self.presenter.set_text(Field::FinalScore, &score.to_string());
        self.presenter.set_text(Field::HighScore, &self.high_score.best().to_string());
        self.presenter.show(Overlay::GameOver);

        render::render(&mut self.canvas, &self.game, self.config.grid_size);
        render::dim(&mut self.canvas);
        self.presenter.draw(&self.canvas);
    }

    fn redraw(&mut self) {
        render::render(&mut self.canvas, &self.game, self.config.grid_size);
        self.presenter.draw(&self.canvas);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Surface, BACKGROUND};
    use crate::snake::Cell;
    use crate::store::MemoryStore;
    use rand::SeedableRng;
    use std::collections::{HashMap, HashSet};
    use std::time::Duration;

    /// Remembers the latest state of every UI element.
    #[derive(Debug, Default)]
    struct Recorder {
        shown: HashSet<Overlay>,
        texts: HashMap<Field, String>,
        frames: usize,
        last_frame: Option<Canvas>,
    }

    impl Recorder {
        fn text(&self, field: Field) -> &str {
            self.texts.get(&field).map(String::as_str).unwrap_or("")
        }
    }

    impl Presenter for Recorder {
        fn show(&mut self, overlay: Overlay) {
            self.shown.insert(overlay);
        }

        fn hide(&mut self, overlay: Overlay) {
            self.shown.remove(&overlay);
        }

        fn set_text(&mut self, field: Field, value: &str) {
            self.texts.insert(field, value.to_string());
        }

        fn draw(&mut self, canvas: &Canvas) {
            self.frames += 1;
            self.last_frame = Some(canvas.clone());
        }
    }

    const TICK: Duration = Duration::from_millis(100);

    fn session() -> Session<Recorder> {
        let high = HighScore::load(Box::new(MemoryStore::new()));
        Session::new(GameConfig::default(), high, StdRng::seed_from_u64(5), Recorder::default())
    }

    /// Replace the board with one where the snake is about to hit the right wall.
    fn near_wall(session: &mut Session<Recorder>, score: u32) {
        let snake = crate::snake::Snake::from_cells([Cell::new(19, 3), Cell::new(18, 3), Cell::new(17, 3)]);
        session.game = GameState::with_parts(&session.config, snake, Cell::new(0, 0), Direction::Right);
        session.game.score = score;
    }

    #[test]
    fn test_idle_screen() {
        let s = session();
        assert_eq!(s.phase(), Phase::Idle);
        assert!(!s.is_ticking());
        assert!(s.presenter().shown.contains(&Overlay::StartScreen));
        assert_eq!(s.presenter().text(Field::StartHighScore), "0");
        assert_eq!(s.presenter().text(Field::StartLabel), LABEL_START);
        assert_eq!(s.presenter().frames, 1);
    }

    #[test]
    fn test_start_runs_and_ticks() {
        let mut s = session();
        let t0 = Instant::now();
        s.start(t0);

        assert_eq!(s.phase(), Phase::Running);
        assert!(s.is_ticking());
        assert!(s.presenter().shown.is_empty());
        assert_eq!(s.presenter().text(Field::StartLabel), LABEL_RUNNING);

        let head = s.game().snake.head();
        s.update(t0 + Duration::from_millis(50));
        assert_eq!(s.game().snake.head(), head);
        s.update(t0 + TICK);
        assert_eq!(s.game().snake.head(), Cell::new(head.x + 1, head.y));
    }

    #[test]
    fn test_start_ignored_while_running() {
        let mut s = session();
        let t0 = Instant::now();
        s.start(t0);
        s.update(t0 + TICK);
        let game = s.game().clone();

        s.start(t0 + TICK);
        assert_eq!(s.game(), &game);
    }

    #[test]
    fn test_crash_ends_round_and_keeps_best() {
        let mut s = session();
        let t0 = Instant::now();
        s.start(t0);
        near_wall(&mut s, 30);
        s.update(t0 + TICK);

        assert_eq!(s.phase(), Phase::GameOver);
        assert!(!s.is_ticking());
        assert_eq!(s.high_score(), 30);
        assert!(s.presenter().shown.contains(&Overlay::GameOver));
        assert_eq!(s.presenter().text(Field::FinalScore), "30");
        assert_eq!(s.presenter().text(Field::HighScore), "30");
        assert_eq!(s.presenter().text(Field::StartLabel), LABEL_RESTART);

        // the final frame is dimmed
        let frame = s.presenter().last_frame.as_ref().unwrap();
        assert_ne!(frame.pixel(399, 399), Some(BACKGROUND));

        // later ticks do nothing once stopped
        let game = s.game().clone();
        s.update(t0 + TICK * 5);
        assert_eq!(s.game(), &game);
    }

    #[test]
    fn test_lower_score_leaves_best() {
        let mut s = session();
        let t0 = Instant::now();
        s.start(t0);
        near_wall(&mut s, 30);
        s.update(t0 + TICK);

        s.restart(t0 + TICK * 2);
        near_wall(&mut s, 20);
        s.update(t0 + TICK * 3);

        assert_eq!(s.high_score(), 30);
        assert_eq!(s.presenter().text(Field::FinalScore), "20");
        assert_eq!(s.presenter().text(Field::HighScore), "30");
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut s = session();
        let t0 = Instant::now();
        s.start(t0);
        near_wall(&mut s, 50);
        s.update(t0 + TICK);

        let t1 = t0 + TICK * 3;
        s.restart(t1);
        assert_eq!(s.phase(), Phase::Running);
        assert_eq!(s.game().score, 0);
        assert_eq!(s.game().snake.body(), &crate::config::INITIAL_SNAKE);
        assert_eq!(s.presenter().text(Field::Score), "0");
        assert!(!s.presenter().shown.contains(&Overlay::GameOver));
        assert_eq!(s.ticker().time_until_next(t1), Some(TICK));
    }

    #[test]
    fn test_restart_mid_round_keeps_single_schedule() {
        let mut s = session();
        let t0 = Instant::now();
        s.start(t0);
        s.restart(t0 + Duration::from_millis(60));

        // old schedule would fire at t0 + 100
        let head = s.game().snake.head();
        s.update(t0 + TICK);
        assert_eq!(s.game().snake.head(), head);
        s.update(t0 + Duration::from_millis(160));
        assert_ne!(s.game().snake.head(), head);
    }

    #[test]
    fn test_eating_updates_readout() {
        let mut s = session();
        let t0 = Instant::now();
        s.start(t0);
        let ahead = s.game().snake.head().shifted(Direction::Right);
        s.game.food = ahead;
        s.update(t0 + TICK);

        assert_eq!(s.game().score, 10);
        assert_eq!(s.presenter().text(Field::Score), "10");
    }

    #[test]
    fn test_commands() {
        let mut s = session();
        let t0 = Instant::now();
        assert!(s.handle(Command::Start, t0));
        assert!(s.handle(Command::Steer(Direction::Down), t0));
        assert_eq!(s.game().pending, Direction::Down);
        assert!(s.handle(Command::Steer(Direction::Left), t0));
        assert_eq!(s.game().pending, Direction::Down);
        assert!(!s.handle(Command::Quit, t0));
    }

    #[test]
    fn test_surface_matches_config() {
        let s = session();
        let frame = s.presenter().last_frame.as_ref().unwrap();
        assert_eq!(frame.size(), (400, 400));
    }
}
