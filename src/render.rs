use crate::game::GameState;

pub const BACKGROUND: Rgb = Rgb::hex(0xa7b78f);
pub const SNAKE_HEAD: Rgb = Rgb::hex(0x2e2e2e);
pub const SNAKE_BODY: Rgb = Rgb::hex(0x3e3e3e);
pub const FOOD: Rgb = Rgb::hex(0xe63946);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    pub const fn hex(value: u32) -> Self {
        Rgb { r: (value >> 16) as u8, g: (value >> 8) as u8, b: value as u8 }
    }

    /// `over` composited on top of self with the given opacity.
    pub fn blend(self, over: Rgb, alpha: f32) -> Rgb {
        let mix = |a: u8, b: u8| (a as f32 * (1.0 - alpha) + b as f32 * alpha).round() as u8;
        Rgb { r: mix(self.r, over.r), g: mix(self.g, over.g), b: mix(self.b, over.b) }
    }
}

/// A rectangle in surface pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Anything that can take filled rectangles.
pub trait Surface {
    fn size(&self) -> (u32, u32);
    fn fill_rect(&mut self, rect: Rect, color: Rgb);
    fn shade_rect(&mut self, rect: Rect, color: Rgb, alpha: f32);
}

/// A plain RGB pixel buffer, row major.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Canvas { width, height, pixels: vec![Rgb::new(0, 0, 0); width as usize * height as usize] }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    fn for_each_in(&mut self, rect: Rect, mut f: impl FnMut(&mut Rgb)) {
        let x_end = (rect.x + rect.width).min(self.width);
        let y_end = (rect.y + rect.height).min(self.height);
        for y in rect.y.min(y_end)..y_end {
            let row = (y * self.width) as usize;
            for px in &mut self.pixels[row + rect.x.min(x_end) as usize..row + x_end as usize] {
                f(px);
            }
        }
    }
}

impl Surface for Canvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        self.for_each_in(rect, |px| *px = color);
    }

    fn shade_rect(&mut self, rect: Rect, color: Rgb, alpha: f32) {
        self.for_each_in(rect, |px| *px = px.blend(color, alpha));
    }
}

/// Paints the board: background, snake (head darker), food. Every cell is
/// drawn one pixel short so the grid lines show through.
pub fn render<S: Surface + ?Sized>(surface: &mut S, state: &GameState, cell_size: u32) {
    let (width, height) = surface.size();
    surface.fill_rect(Rect { x: 0, y: 0, width, height }, BACKGROUND);

    for (i, cell) in state.snake.body().iter().enumerate() {
        let color = if i == 0 { SNAKE_HEAD } else { SNAKE_BODY };
        if let Some(rect) = cell_rect(cell.x, cell.y, cell_size) {
            surface.fill_rect(rect, color);
        }
    }

    if let Some(rect) = cell_rect(state.food.x, state.food.y, cell_size) {
        surface.fill_rect(rect, FOOD);
    }
}

/// Darkens the whole surface, used once a round is lost.
pub fn dim<S: Surface + ?Sized>(surface: &mut S) {
    let (width, height) = surface.size();
    surface.shade_rect(Rect { x: 0, y: 0, width, height }, Rgb::new(0, 0, 0), 0.5);
}

fn cell_rect(x: i32, y: i32, cell_size: u32) -> Option<Rect> {
    if x < 0 || y < 0 {
        return None;
    }
    let inner = cell_size.saturating_sub(1);
    Some(Rect { x: x as u32 * cell_size, y: y as u32 * cell_size, width: inner, height: inner })
}
