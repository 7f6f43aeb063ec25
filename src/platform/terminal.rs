//! Terminal console
//!
//! Runs the engine on a real terminal through crossterm. Surfaces are
//! off-screen grids; activating one renders it in full, and writes to the
//! active surface are rendered as they happen. Key events are turned into
//! the conio byte stream the input decoder expects.

use std::collections::VecDeque;
use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute};
use log::{debug, warn};

use super::{Console, Surface, SurfaceId, WindowInfo};
use crate::core::{CursorPosition, Grid, GridDimensions};
use crate::error::{ConsoleError, Result};
use crate::input::encode_key;
use crate::renderer::{AnsiIbmRenderer, Renderer};

/// A surface owned by a `TerminalConsole`
#[derive(Debug)]
pub struct TerminalSurface {
    id: SurfaceId,
    grid: Grid,
    cursor: CursorPosition,
}

impl Surface for TerminalSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn dimensions(&self) -> GridDimensions {
        self.grid.dimensions()
    }

    fn cursor(&self) -> CursorPosition {
        self.cursor
    }

    fn grid(&self) -> &Grid {
        &self.grid
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        debug!("Releasing terminal surface {}", self.id);
    }
}

/// Crossterm-backed console
pub struct TerminalConsole {
    out: Stdout,
    renderer: AnsiIbmRenderer,
    /// Decoded key bytes not yet handed out
    pending: VecDeque<u8>,
    active: Option<SurfaceId>,
    next_id: SurfaceId,
    /// Whether this console took over the terminal
    took_over: bool,
}

impl TerminalConsole {
    pub fn new() -> Self {
        Self {
            out: io::stdout(),
            renderer: AnsiIbmRenderer::new(),
            pending: VecDeque::with_capacity(8),
            active: None,
            next_id: 1,
            took_over: false,
        }
    }

    fn is_active(&self, surface: &TerminalSurface) -> bool {
        self.active == Some(surface.id)
    }

    /// Render pending changes of the active surface
    fn flush_active(&mut self, surface: &mut TerminalSurface) -> Result<()> {
        if !self.is_active(surface) {
            return Ok(());
        }
        let mut output = self.renderer.render_dirty(&surface.grid);
        surface.grid.mark_all_clean();
        output.push_str(&self.renderer.cursor_to(surface.cursor.column, surface.cursor.row));
        self.out.write_all(output.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    /// Pull one key event into the pending byte queue
    fn queue_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            if key.kind != KeyEventKind::Release {
                self.pending.extend(encode_key(&key));
            }
        }
    }
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for TerminalConsole {
    type Surface = TerminalSurface;

    fn name(&self) -> &str {
        "terminal"
    }

    fn window_info(&mut self) -> Result<WindowInfo> {
        let (columns, rows) = terminal::size()?;
        let cursor = match cursor::position() {
            Ok((column, row)) => CursorPosition::new(column as usize, row as usize),
            Err(e) => {
                warn!("Cursor position unavailable: {}", e);
                CursorPosition::origin()
            }
        };
        Ok(WindowInfo {
            dimensions: GridDimensions::new(columns as usize, rows as usize),
            cursor,
        })
    }

    fn release_primary(&mut self) -> Result<()> {
        if self.took_over {
            return Ok(());
        }
        terminal::enable_raw_mode()?;
        execute!(self.out, EnterAlternateScreen)?;
        let init = self.renderer.init();
        self.out.write_all(init.as_bytes())?;
        self.out.flush()?;
        self.took_over = true;
        debug!("Terminal taken over (raw mode, alternate screen)");
        Ok(())
    }

    fn create_surface(&mut self, dims: GridDimensions) -> Result<TerminalSurface> {
        if !dims.is_valid() {
            return Err(ConsoleError::InvalidDimensions {
                columns: dims.columns,
                rows: dims.rows,
            });
        }
        let grid = Grid::new(dims)?;
        let id = self.next_id;
        self.next_id += 1;
        Ok(TerminalSurface {
            id,
            grid,
            cursor: CursorPosition::origin(),
        })
    }

    fn activate(&mut self, surface: &mut TerminalSurface) -> Result<()> {
        self.active = Some(surface.id);
        let mut output = self.renderer.render_full(&surface.grid);
        surface.grid.mark_all_clean();
        output.push_str(&self.renderer.cursor_to(surface.cursor.column, surface.cursor.row));
        self.out.write_all(output.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    fn write_chars(
        &mut self,
        surface: &mut TerminalSurface,
        pos: CursorPosition,
        glyphs: &[u8],
    ) -> Result<usize> {
        let written = surface.grid.write(pos, glyphs)?;
        self.flush_active(surface)?;
        Ok(written)
    }

    fn fill_chars(
        &mut self,
        surface: &mut TerminalSurface,
        pos: CursorPosition,
        glyph: u8,
        count: usize,
    ) -> Result<usize> {
        let written = surface.grid.fill(pos, glyph, count)?;
        self.flush_active(surface)?;
        Ok(written)
    }

    fn read_char(&mut self, surface: &TerminalSurface, pos: CursorPosition) -> Result<u8> {
        surface.grid.glyph_at(pos)
    }

    fn set_cursor(&mut self, surface: &mut TerminalSurface, pos: CursorPosition) -> Result<()> {
        surface.cursor = pos;
        if self.is_active(surface) {
            let output = self.renderer.cursor_to(pos.column, pos.row);
            self.out.write_all(output.as_bytes())?;
            self.out.flush()?;
        }
        Ok(())
    }

    fn key_available(&mut self) -> Result<bool> {
        while self.pending.is_empty() && event::poll(Duration::ZERO)? {
            let ev = event::read()?;
            self.queue_event(ev);
        }
        Ok(!self.pending.is_empty())
    }

    fn read_key(&mut self) -> Result<i32> {
        loop {
            if let Some(byte) = self.pending.pop_front() {
                return Ok(byte as i32);
            }
            let ev = event::read()?;
            self.queue_event(ev);
        }
    }
}

impl Drop for TerminalConsole {
    fn drop(&mut self) {
        if !self.took_over {
            return;
        }
        let shutdown = self.renderer.shutdown();
        let restored = self
            .out
            .write_all(shutdown.as_bytes())
            .and_then(|_| execute!(self.out, LeaveAlternateScreen))
            .and_then(|_| terminal::disable_raw_mode());
        if let Err(e) = restored {
            warn!("Failed to restore terminal: {}", e);
        }
    }
}
