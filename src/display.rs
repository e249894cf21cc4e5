use crate::framebuffer::{SCREEN_BUFFER_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH};
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

/// Display is used by the host loop to put the framebuffer on a screen.
/// It gets the packed, row-major pixels (MSB leftmost) and nothing else,
/// so a variety of kinds of screen would work.
pub trait Display {
    /// draw data based on internal resolution of display
    fn draw(&mut self, data: &[u8]) -> Result<(), io::Error>;

    /// how big the display data should be
    fn get_display_size_bytes(&self) -> usize;
}

// width, height, bits per pixel
struct Resolution(usize, usize, usize);

impl Resolution {
    fn pixel_count(&self) -> usize {
        self.0 * self.1
    }

    fn byte_count(&self) -> usize {
        self.0 * self.1 * self.2 / 8
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// canvas coordinates of every pixel whose bit equals `bitplane`
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

/// monochrome display in a terminal, rendered using TUI and crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
}

impl MonoTermDisplay {
    pub fn new() -> Result<MonoTermDisplay, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        terminal.hide_cursor()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution(SCREEN_WIDTH, SCREEN_HEIGHT, 1),
        })
    }
}

impl Drop for MonoTermDisplay {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, data: &[u8]) -> Result<(), io::Error> {
        if data.len() != self.resolution.byte_count() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "MonoTermDisplay wants {} bytes to draw, got {}",
                    self.resolution.byte_count(),
                    data.len()
                ),
            ));
        }

        // for now this assumes a 1:1 ratio between terminal cells, chip8
        // pixels and the internal TUI canvas
        let lit: Vec<(f64, f64)> = self.resolution.bitplane_from_data(data, 1).collect();
        let x_bounds = self.resolution.x_bounds();
        let y_bounds = self.resolution.y_bounds();
        let size = Rect::new(
            0,
            0,
            2 + self.resolution.0 as u16,
            2 + self.resolution.1 as u16,
        );
        self.terminal.draw(|f| {
            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(x_bounds)
                .y_bounds(y_bounds)
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &lit,
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }

    fn get_display_size_bytes(&self) -> usize {
        self.resolution.byte_count()
    }
}

/// useful for testing non-display routines; keeps the last frame it was given
pub struct DummyDisplay {
    pub frames: usize,
    pub last: Vec<u8>,
    size: usize,
}

impl DummyDisplay {
    pub fn new() -> DummyDisplay {
        DummyDisplay::with_size(SCREEN_BUFFER_SIZE)
    }

    /// a display that claims some other frame size
    pub fn with_size(size: usize) -> DummyDisplay {
        DummyDisplay {
            frames: 0,
            last: Vec::new(),
            size,
        }
    }
}

impl Default for DummyDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, data: &[u8]) -> Result<(), io::Error> {
        self.frames += 1;
        self.last = data.to_vec();
        Ok(())
    }

    fn get_display_size_bytes(&self) -> usize {
        self.size
    }
}
