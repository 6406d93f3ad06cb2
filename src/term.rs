use crate::input::{Button, Hitbox};
use crate::render::{Canvas, Rgb};
use crate::session::{Field, Overlay, Presenter, LABEL_START};
use crate::{Coords, TermInt};
use std::collections::HashMap;
use std::io::{self, Stdout, Write};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue, terminal};

/// Terminal columns per grid cell; two keeps cells roughly square.
const CELL_COLS: TermInt = 2;
/// Rows above the board: title, score and the start control.
const HEADER_ROWS: TermInt = 2;
/// Rows below the board: the direction pad.
const PAD_ROWS: TermInt = 4;

const MESSAGE_BG: Color = Color::Rgb { r: 0x1d, g: 0x1d, b: 0x1d };
const BUTTON_BG: Color = Color::Rgb { r: 0x3e, g: 0x3e, b: 0x3e };

/// Raw terminal access: mode switches, event polling and positioned printing.
pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
}

impl TermManager {
    pub fn new() -> Result<Self> {
        let (width, height) = terminal::size().context("Error reading terminal size")?;
        Ok(TermManager { width, height, stdout: io::stdout() })
    }

    pub fn size(&self) -> Coords {
        (self.width, self.height)
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen, EnableMouseCapture).context("Error entering alt screen")?;
        terminal::enable_raw_mode().context("Error setting raw mode")?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking, terminal::Clear(ClearType::All))
            .context("Error hiding cursor")?;
        Ok(())
    }

    pub fn restore(&mut self) -> Result<()> {
        terminal::disable_raw_mode().context("Error unsetting raw mode")?;
        execute!(
            self.stdout,
            ResetColor,
            cursor::Show,
            cursor::EnableBlinking,
            DisableMouseCapture,
            LeaveAlternateScreen
        )
        .context("Error leaving alt screen")?;
        Ok(())
    }

    /// Waits up to `timeout` for the first event, then drains whatever else is
    /// already queued.
    pub fn read_events(&self, timeout: Duration) -> Result<Vec<Event>> {
        let mut events = vec![];
        let mut wait = timeout;

        while event::poll(wait).context("Error polling events")? {
            events.push(event::read().context("Error reading event")?);
            wait = Duration::ZERO;
        }

        Ok(events)
    }

    pub fn print_at(&mut self, pos: Coords, text: &str, fg: Option<Color>, bg: Option<Color>) -> io::Result<()> {
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1))?;
        if let Some(fg) = fg {
            queue!(self.stdout, SetForegroundColor(fg))?;
        }
        if let Some(bg) = bg {
            queue!(self.stdout, SetBackgroundColor(bg))?;
        }
        queue!(self.stdout, Print(text), ResetColor)
    }

    pub fn clear_line(&mut self, row: TermInt) -> io::Result<()> {
        queue!(self.stdout, cursor::MoveTo(0, row), terminal::Clear(ClearType::CurrentLine))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }
}

/// Draws the session onto the terminal: the board as colored cell pairs, a
/// header with score and start control, a direction pad, and message boxes for
/// the overlays.
pub struct TermPresenter {
    term: TermManager,
    grid: Coords,
    cell_size: u32,
    /// Last color painted per board cell, so only changes get printed.
    board: Vec<Option<Rgb>>,
    shown: Vec<Overlay>,
    texts: HashMap<Field, String>,
    buttons: Vec<(Button, Hitbox)>,
    error: Option<io::Error>,
}

impl TermPresenter {
    /// Fails if the terminal can't fit the board and controls.
    pub fn new(term: TermManager, grid_width: i32, grid_height: i32, cell_size: u32) -> Result<Self> {
        let grid = (grid_width.max(0) as TermInt, grid_height.max(0) as TermInt);
        let (cols, rows) = term.size();
        let need = (grid.0 * CELL_COLS, HEADER_ROWS + grid.1 + PAD_ROWS);
        if cols < need.0 || rows < need.1 {
            bail!("terminal is {}x{}, the board needs at least {}x{}", cols, rows, need.0, need.1);
        }

        let mut presenter = TermPresenter {
            term,
            grid,
            cell_size,
            board: vec![None; grid.0 as usize * grid.1 as usize],
            shown: vec![],
            texts: HashMap::new(),
            buttons: vec![],
            error: None,
        };
        presenter.texts.insert(Field::StartLabel, LABEL_START.to_string());
        presenter.layout_pad();
        Ok(presenter)
    }

    pub fn term(&self) -> &TermManager {
        &self.term
    }

    pub fn term_mut(&mut self) -> &mut TermManager {
        &mut self.term
    }

    /// Clickable areas as currently drawn.
    pub fn buttons(&self) -> &[(Button, Hitbox)] {
        &self.buttons
    }

    /// The first terminal write error since the last call, if any.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn board_origin(&self) -> Coords {
        (0, HEADER_ROWS)
    }

    fn text(&self, field: Field) -> &str {
        self.texts.get(&field).map(String::as_str).unwrap_or("")
    }

    fn record(&mut self, res: io::Result<()>) {
        if let Err(e) = res {
            self.error.get_or_insert(e);
        }
    }

    fn layout_pad(&mut self) {
        let top = HEADER_ROWS + self.grid.1 + 1;
        let center = self.grid.0 * CELL_COLS / 2;
        let button = |x: TermInt, y: TermInt| Hitbox { top_left: (x, y), width: 5, height: 1 };

        self.buttons.retain(|(b, _)| matches!(b, Button::Start | Button::PlayAgain));
        self.buttons.extend([
            (Button::Up, button(center - 2, top)),
            (Button::Left, button(center.saturating_sub(8), top + 1)),
            (Button::Down, button(center - 2, top + 1)),
            (Button::Right, button(center + 4, top + 1)),
        ]);
    }

    fn set_button(&mut self, which: Button, hitbox: Option<Hitbox>) {
        self.buttons.retain(|(b, _)| *b != which);
        if let Some(hitbox) = hitbox {
            self.buttons.push((which, hitbox));
        }
    }

    fn paint_header(&mut self) -> io::Result<()> {
        let score = format!(" SNAKE   Score: {}", self.text(Field::Score));
        let label = format!("[ {} ]", self.text(Field::StartLabel));
        let label_x = (self.grid.0 * CELL_COLS).saturating_sub(label.len() as TermInt);

        self.term.clear_line(0)?;
        self.term.print_at((0, 0), &score, Some(Color::White), None)?;
        self.term.print_at((label_x, 0), &label, Some(Color::White), Some(BUTTON_BG))?;
        self.set_button(Button::Start, Some(Hitbox { top_left: (label_x, 0), width: label.len() as TermInt, height: 1 }));
        Ok(())
    }

    fn paint_pad(&mut self) -> io::Result<()> {
        let pad: Vec<(Button, Hitbox)> = self
            .buttons
            .iter()
            .filter(|(b, _)| matches!(b, Button::Up | Button::Down | Button::Left | Button::Right))
            .copied()
            .collect();

        for (button, hitbox) in pad {
            let glyph = match button {
                Button::Up => "[ ^ ]",
                Button::Down => "[ v ]",
                Button::Left => "[ < ]",
                _ => "[ > ]",
            };
            self.term.print_at(hitbox.top_left, glyph, Some(Color::White), Some(BUTTON_BG))?;
        }
        Ok(())
    }

    /// Prints the board cells whose color changed since the last frame.
    fn paint_board(&mut self, canvas: &Canvas) -> io::Result<()> {
        let (ox, oy) = self.board_origin();
        let mid = self.cell_size / 2;

        for gy in 0..self.grid.1 {
            for gx in 0..self.grid.0 {
                let sample = canvas.pixel(gx as u32 * self.cell_size + mid, gy as u32 * self.cell_size + mid);
                let idx = gy as usize * self.grid.0 as usize + gx as usize;
                if self.board[idx] == sample {
                    continue;
                }
                self.board[idx] = sample;

                let bg = sample.map(|c| Color::Rgb { r: c.r, g: c.g, b: c.b });
                self.term.print_at((ox + gx * CELL_COLS, oy + gy), "  ", None, bg)?;
            }
        }
        Ok(())
    }

    /// Repaints the board cells under a message box from the cache.
    fn repaint_cached(&mut self) -> io::Result<()> {
        let (ox, oy) = self.board_origin();
        for gy in 0..self.grid.1 {
            for gx in 0..self.grid.0 {
                let idx = gy as usize * self.grid.0 as usize + gx as usize;
                let bg = self.board[idx].map(|c| Color::Rgb { r: c.r, g: c.g, b: c.b });
                self.term.print_at((ox + gx * CELL_COLS, oy + gy), "  ", None, bg)?;
            }
        }
        Ok(())
    }

    fn overlay_lines(&self, overlay: Overlay) -> (Vec<String>, &'static str) {
        match overlay {
            Overlay::StartScreen => (
                vec![
                    "SNAKE".to_string(),
                    String::new(),
                    format!("High score: {}", self.text(Field::StartHighScore)),
                    String::new(),
                    "Arrow keys or WASD to move".to_string(),
                    String::new(),
                ],
                "[ Start game ]",
            ),
            Overlay::GameOver => (
                vec![
                    "Game over!".to_string(),
                    format!("Score: {}", self.text(Field::FinalScore)),
                    format!("High score: {}", self.text(Field::HighScore)),
                    String::new(),
                ],
                "[ Play again ]",
            ),
        }
    }

    /// Draws a centered message box over the board, its last line a button.
    fn paint_message(&mut self, overlay: Overlay) -> io::Result<()> {
        let (mut lines, button) = self.overlay_lines(overlay);
        lines.push(button.to_string());

        let msg_height = lines.len() as TermInt + 2;
        let msg_width = lines.iter().map(|l| l.len()).max().unwrap_or(0) as TermInt + 4;
        let (ox, oy) = self.board_origin();
        let center = (ox + self.grid.0 * CELL_COLS / 2, oy + self.grid.1 / 2);
        let top_left = (center.0.saturating_sub(msg_width / 2), center.1.saturating_sub(msg_height / 2));

        let blank = " ".repeat(msg_width as usize);
        for y in [top_left.1, top_left.1 + msg_height - 1] {
            self.term.print_at((top_left.0, y), &blank, None, Some(MESSAGE_BG))?;
        }

        for (i, line) in lines.iter().enumerate() {
            let padded = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            self.term.print_at((top_left.0, y), &padded, Some(Color::White), Some(MESSAGE_BG))?;
        }

        let button_y = top_left.1 + msg_height - 2;
        let button_x = top_left.0 + (msg_width - button.len() as TermInt) / 2;
        self.set_button(
            Button::PlayAgain,
            Some(Hitbox { top_left: (button_x, button_y), width: button.len() as TermInt, height: 1 }),
        );
        Ok(())
    }

    fn paint_overlays(&mut self) -> io::Result<()> {
        if self.shown.is_empty() {
            self.set_button(Button::PlayAgain, None);
        }
        for overlay in self.shown.clone() {
            self.paint_message(overlay)?;
        }
        Ok(())
    }
}

impl Presenter for TermPresenter {
    fn show(&mut self, overlay: Overlay) {
        if !self.shown.contains(&overlay) {
            self.shown.push(overlay);
        }
        let res = self.paint_overlays().and_then(|_| self.term.flush());
        self.record(res);
    }

    fn hide(&mut self, overlay: Overlay) {
        if !self.shown.contains(&overlay) {
            return;
        }
        self.shown.retain(|o| *o != overlay);
        let res = self
            .repaint_cached()
            .and_then(|_| self.paint_overlays())
            .and_then(|_| self.term.flush());
        self.record(res);
    }

    fn set_text(&mut self, field: Field, value: &str) {
        self.texts.insert(field, value.to_string());
        let res = match field {
            Field::Score | Field::StartLabel => self.paint_header(),
            // overlay contents get picked up on the next show
            _ => Ok(()),
        }
        .and_then(|_| self.term.flush());
        self.record(res);
    }

    fn draw(&mut self, canvas: &Canvas) {
        let res = self
            .paint_board(canvas)
            .and_then(|_| self.paint_header())
            .and_then(|_| self.paint_pad())
            .and_then(|_| self.paint_overlays())
            .and_then(|_| self.term.flush());
        self.record(res);
    }
}
