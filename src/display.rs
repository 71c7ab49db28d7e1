use crossterm::terminal;
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;

/// Display is used by the interpreter to draw things on the screen. It should
/// abstract the implementation details, so a variety of kinds of screen would
/// work. Implementors only need the three primitives; sprite drawing is built
/// on top of them.
pub trait Display {
    /// turn the cell at (x, y) on; (x, y) is always on-screen
    fn set_pixel(&mut self, x: usize, y: usize);

    /// turn every cell off
    fn clear(&mut self);

    /// true if every cell in the `w` x `h` rectangle at (x, y) is off
    fn is_region_clear(&self, x: usize, y: usize, w: usize, h: usize) -> bool;

    /// push the current frame out to whatever is showing it
    fn refresh(&mut self) -> Result<(), io::Error> {
        Ok(())
    }

    fn is_pixel_clear(&self, x: usize, y: usize) -> bool {
        self.is_region_clear(x, y, 1, 1)
    }

    /// Draw `sprite` (one byte per row, most significant bit leftmost) with
    /// its top-left corner at (x, y). The origin wraps round the screen but
    /// the sprite itself is clipped at the edges. Pixels are only ever turned
    /// on; returns true if any of them was already on.
    fn draw(&mut self, sprite: &[u8], x: usize, y: usize) -> bool {
        let x = x % SCREEN_WIDTH;
        let y = y % SCREEN_HEIGHT;
        let mut collision = false;
        for (j, row) in sprite.iter().enumerate() {
            for i in 0..8 {
                let bit = (row >> (7 - i)) & 1;
                if bit == 1 && x + i < SCREEN_WIDTH && y + j < SCREEN_HEIGHT {
                    if !self.is_pixel_clear(x + i, y + j) {
                        collision = true;
                    }
                    self.set_pixel(x + i, y + j);
                }
            }
        }
        collision
    }
}

/// plain in-memory grid of cells; the simplest thing that is a Display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    cells: [[bool; SCREEN_WIDTH]; SCREEN_HEIGHT],
}

impl PixelGrid {
    pub fn new() -> Self {
        PixelGrid {
            cells: [[false; SCREEN_WIDTH]; SCREEN_HEIGHT],
        }
    }

    pub fn is_lit(&self, x: usize, y: usize) -> bool {
        self.cells
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(false)
    }

    pub fn lit_count(&self) -> usize {
        self.cells.iter().flatten().filter(|c| **c).count()
    }

    /// pack the grid one bit per pixel, row by row, leftmost pixel in the
    /// high bit
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = vec![0u8; SCREEN_WIDTH * SCREEN_HEIGHT / 8];
        for (n, lit) in self.cells.iter().flatten().enumerate() {
            if *lit {
                data[n / 8] |= 0x80 >> (n % 8);
            }
        }
        data
    }
}

impl Default for PixelGrid {
    fn default() -> Self {
        PixelGrid::new()
    }
}

impl Display for PixelGrid {
    fn set_pixel(&mut self, x: usize, y: usize) {
        if let Some(cell) = self.cells.get_mut(y).and_then(|row| row.get_mut(x)) {
            *cell = true;
        }
    }

    fn clear(&mut self) {
        for row in self.cells.iter_mut() {
            row.fill(false);
        }
    }

    fn is_region_clear(&self, x: usize, y: usize, w: usize, h: usize) -> bool {
        (y..y.saturating_add(h).min(SCREEN_HEIGHT))
            .all(|yy| (x..x.saturating_add(w).min(SCREEN_WIDTH)).all(|xx| !self.cells[yy][xx]))
    }
}

// store useful metadata about the terminal
struct Resolution(usize, usize);

impl Resolution {
    fn pixel_count(&self) -> usize {
        self.0 * self.1
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    fn bitplane_from_data<'a>(
        &self,
        data: &'a [u8],
        bitplane: u8,
    ) -> impl std::iter::Iterator<Item = (f64, f64)> + 'a {
        let mut count = self.pixel_count();
        let w = self.0;
        std::iter::from_fn(move || {
            while count > 0 {
                count -= 1;
                let bit = 1 & (data[count / 8] >> (7 - count % 8));
                if bit == bitplane {
                    return Some((
                        (count % w) as f64,        // x
                        -1.0 * (count / w) as f64, // y
                    ));
                }
            }
            None
        })
    }
}

/// monochrome display in a terminal, rendered using TUI and crossterm. Pixels
/// land in an in-memory grid; the terminal only catches up on `refresh`.
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
    grid: PixelGrid,
}

impl MonoTermDisplay {
    pub fn new() -> Result<MonoTermDisplay, io::Error> {
        terminal::enable_raw_mode()?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        terminal.hide_cursor()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution(SCREEN_WIDTH, SCREEN_HEIGHT),
            grid: PixelGrid::new(),
        })
    }
}

impl Drop for MonoTermDisplay {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        let _ = terminal::disable_raw_mode();
    }
}

impl Display for MonoTermDisplay {
    fn set_pixel(&mut self, x: usize, y: usize) {
        self.grid.set_pixel(x, y)
    }

    fn clear(&mut self) {
        self.grid.clear()
    }

    fn is_region_clear(&self, x: usize, y: usize, w: usize, h: usize) -> bool {
        self.grid.is_region_clear(x, y, w, h)
    }

    fn refresh(&mut self) -> Result<(), io::Error> {
        let data = self.grid.to_bytes();
        let resolution = &self.resolution;

        // for now this assumes a 1:1 ratio between terminal, chip8 and the
        // internal TUI canvas
        self.terminal.draw(|f| {
            let size = Rect::new(0, 0, 2 + resolution.0 as u16, 2 + resolution.1 as u16);

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(resolution.x_bounds())
                .y_bounds(resolution.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    // lit pixels only; the block background is already black
                    ctx.draw(&Points {
                        coords: &resolution.bitplane_from_data(&data, 1).collect::<Vec<_>>(),
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}
