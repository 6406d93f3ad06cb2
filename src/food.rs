use rand::Rng;

use crate::snake::Cell;

/// Picks a cell uniformly at random among those not in `occupied`, by
/// rejection sampling over the whole `width` x `height` grid.
///
/// Returns `None` when every cell is taken, since sampling would never end.
pub fn place_food<R: Rng + ?Sized>(width: i32, height: i32, occupied: &[Cell], rng: &mut R) -> Option<Cell> {
    if width <= 0 || height <= 0 {
        return None;
    }

    let total = width as usize * height as usize;
    let in_grid = occupied
        .iter()
        .filter(|c| c.x >= 0 && c.x < width && c.y >= 0 && c.y < height)
        .count();
    if in_grid >= total {
        return None;
    }

    loop {
        let candidate = Cell::new(rng.gen_range(0..width), rng.gen_range(0..height));
        if !occupied.contains(&candidate) {
            return Some(candidate);
        }
    }
}
