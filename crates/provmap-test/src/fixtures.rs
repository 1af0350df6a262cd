//! Synthetic maps shared by the regression tests

use provmap_core::{Color, RgbImage};

/// Red province, id 1
pub const RED: Color = Color::new(255, 0, 0);
/// Blue province, id 2
pub const BLUE: Color = Color::new(0, 0, 255);
/// Undeclared background
pub const BACKGROUND: Color = Color::new(0, 0, 0);

/// Definition table declaring [`RED`] as 1 and [`BLUE`] as 2.
pub fn two_block_definitions() -> &'static str {
    "province;name;red;green;blue;x\n1;Red;255;0;0;x\n2;Blue;0;0;255;x\n"
}

/// 4x4 map with a 2x2 red block top-left and a 2x2 blue block
/// bottom-right on an undeclared black background. With `swapped` the
/// two blocks trade places.
pub fn two_block_image(swapped: bool) -> RgbImage {
    let (first, second) = if swapped { (BLUE, RED) } else { (RED, BLUE) };
    let mut image = RgbImage::new(4, 4).expect("4x4 image");
    image.fill(BACKGROUND);
    image.fill_rect(0, 0, 2, 2, first);
    image.fill_rect(2, 2, 2, 2, second);
    image
}

/// Color of grid province `id` (1-based).
pub fn grid_color(id: u32) -> Color {
    Color::new((id & 0xff) as u8, ((id >> 8) & 0xff) as u8, 128)
}

/// Definition table for a `cols` x `rows` grid, ids row-major from 1.
pub fn grid_definitions(cols: u32, rows: u32) -> String {
    let mut text = String::from("province;name;red;green;blue;x\n");
    for id in 1..=cols * rows {
        let c = grid_color(id);
        text.push_str(&format!("{id};Cell {id};{};{};{};x\n", c.r, c.g, c.b));
    }
    text
}

/// `cols` x `rows` grid of square provinces `cell` pixels wide.
pub fn grid_image(cols: u32, rows: u32, cell: u32) -> RgbImage {
    let mut image = RgbImage::new(cols * cell, rows * cell).expect("grid image");
    for row in 0..rows {
        for col in 0..cols {
            let id = row * cols + col + 1;
            image.fill_rect(col * cell, row * cell, cell, cell, grid_color(id));
        }
    }
    image
}

/// Grid with its columns in reverse order: province `id` sits where the
/// mirrored cell of [`grid_image`] is.
pub fn mirrored_grid_image(cols: u32, rows: u32, cell: u32) -> RgbImage {
    let mut image = RgbImage::new(cols * cell, rows * cell).expect("grid image");
    for row in 0..rows {
        for col in 0..cols {
            let id = row * cols + col + 1;
            let x = (cols - 1 - col) * cell;
            image.fill_rect(x, row * cell, cell, cell, grid_color(id));
        }
    }
    image
}

/// Seeded linear congruential generator for reproducible random tests
pub struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    /// Create a generator from a seed
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Next raw value
    pub fn next_u64(&mut self) -> u64 {
        // LCG parameters from Numerical Recipes
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.state >> 11
    }

    /// Uniform value in `0..n` (`n` > 0)
    pub fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    /// Uniform value in `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() as f64) / ((1u64 << 53) as f64)
    }
}
