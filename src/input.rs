use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::snake::Direction;
use crate::{Coords, TermInt};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command {
    Steer(Direction),
    /// The start control: ignored while a round is running.
    Start,
    /// Play again: a full reset from any state.
    Restart,
    Quit,
    None,
}

/// The on-screen controls.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    Start,
    /// The button inside the start and game over overlays.
    PlayAgain,
}

impl Button {
    pub fn command(self) -> Command {
        match self {
            Button::Up => Command::Steer(Direction::Up),
            Button::Down => Command::Steer(Direction::Down),
            Button::Left => Command::Steer(Direction::Left),
            Button::Right => Command::Steer(Direction::Right),
            Button::Start => Command::Start,
            Button::PlayAgain => Command::Restart,
        }
    }
}

/// A clickable area in terminal cells.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Hitbox {
    pub top_left: Coords,
    pub width: TermInt,
    pub height: TermInt,
}

impl Hitbox {
    pub fn contains(&self, (col, row): Coords) -> bool {
        let (x, y) = self.top_left;
        col >= x && col < x + self.width && row >= y && row < y + self.height
    }
}

#[derive(Debug, Default, Clone)]
pub struct InputHandler {
    buttons: Vec<(Button, Hitbox)>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the clickable layout, called whenever the buttons are redrawn.
    pub fn set_buttons(&mut self, buttons: Vec<(Button, Hitbox)>) {
        self.buttons = buttons;
    }

    pub fn handle_event(&self, event: &Event) -> Command {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            _ => Command::None,
        }
    }

    pub fn handle_key(&self, key: &KeyEvent) -> Command {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Command::Quit;
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Command::Steer(Direction::Up),
            KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Command::Steer(Direction::Down),
            KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Command::Steer(Direction::Left),
            KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Command::Steer(Direction::Right),

            KeyCode::Enter | KeyCode::Char(' ') => Command::Start,
            KeyCode::Char('r') | KeyCode::Char('R') => Command::Restart,
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Command::Quit,
            _ => Command::None,
        }
    }

    pub fn handle_mouse(&self, mouse: &MouseEvent) -> Command {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return Command::None;
        }

        self.buttons
            .iter()
            .find(|(_, hitbox)| hitbox.contains((mouse.column, mouse.row)))
            .map_or(Command::None, |(button, _)| button.command())
    }
}
