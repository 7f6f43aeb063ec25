//! Console Engine
//!
//! Owns the two surfaces and the input decoder. Callers draw on the back
//! surface, then `present` swaps roles so the drawing becomes visible and
//! the new back surface starts blank.
//!
//! Drawing positions belong to the caller: tracked writes take a
//! `&mut CursorPosition` and advance it, wrapping rows at the grid width.
//! Failed platform calls are logged and the operation stops where it got to.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::core::{is_empty_glyph, CursorPosition, GridDimensions, Rectangle, BLANK};
use crate::error::{ConsoleError, Result};
use crate::input::{InputDecoder, InputEvent};
use crate::platform::{Console, Surface, SurfaceId};

/// Which surface an operation addresses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// The surface being drawn
    #[default]
    Back,
    /// The surface being shown
    Visible,
}

/// Length of a C-style string: bytes up to the first NUL
fn text_len(text: &[u8]) -> usize {
    text.iter().position(|&b| b == 0).unwrap_or(text.len())
}

/// Double-buffered console engine
pub struct ConsoleEngine<C: Console> {
    config: EngineConfig,
    dimensions: GridDimensions,
    /// Cursor reported by the window when initialized
    window_cursor: CursorPosition,
    visible: Option<C::Surface>,
    back: Option<C::Surface>,
    input: InputDecoder,
    console: C,
}

impl<C: Console> ConsoleEngine<C> {
    /// Create an engine; no surfaces exist until `initialize`
    pub fn new(console: C, config: EngineConfig) -> Self {
        debug!("ConsoleEngine::new on {} console", console.name());
        Self {
            config,
            dimensions: GridDimensions::default(),
            window_cursor: CursorPosition::origin(),
            visible: None,
            back: None,
            input: InputDecoder::new(),
            console,
        }
    }

    /// Allocate the surfaces.
    ///
    /// Does nothing if they already exist. On failure no surfaces are held
    /// and every drawing call becomes a no-op until a later call succeeds.
    pub fn initialize(&mut self) -> Result<()> {
        debug!("ConsoleEngine::initialize");

        if self.is_ready() {
            debug!("Surfaces already allocated");
            return Ok(());
        }

        let info = self.console.window_info().unwrap_or_else(|e| {
            warn!("Window query failed: {}", e);
            Default::default()
        });
        self.window_cursor = info.cursor;

        let dims = info.dimensions.with_override(self.config.buffer_size);
        debug!(
            "Console size: ({}, {}), cursor: ({}, {}), buffers: ({}, {})",
            info.dimensions.columns,
            info.dimensions.rows,
            info.cursor.column,
            info.cursor.row,
            dims.columns,
            dims.rows
        );
        if !dims.is_valid() {
            warn!("Refusing to allocate {}x{} surfaces", dims.columns, dims.rows);
            return Err(ConsoleError::InvalidDimensions {
                columns: dims.columns,
                rows: dims.rows,
            });
        }

        self.console.release_primary()?;

        let back = self.console.create_surface(dims);
        let visible = self.console.create_surface(dims);
        match (back, visible) {
            (Ok(back), Ok(visible)) => {
                debug!(
                    "Created visible ({}) and back ({}) surfaces",
                    visible.id(),
                    back.id()
                );
                self.dimensions = dims;
                self.back = Some(back);
                self.visible = Some(visible);
                Ok(())
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!("Surface allocation failed: {}", e);
                Err(e)
            }
        }
    }

    /// Whether both surfaces are allocated
    pub fn is_ready(&self) -> bool {
        self.back.is_some() && self.visible.is_some()
    }

    /// Effective surface size (zero before initialize)
    pub fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    /// Cursor position the window reported at initialize
    pub fn window_cursor(&self) -> CursorPosition {
        self.window_cursor
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    pub fn surface(&self, target: Target) -> Option<&C::Surface> {
        match target {
            Target::Back => self.back.as_ref(),
            Target::Visible => self.visible.as_ref(),
        }
    }

    pub fn visible_id(&self) -> Option<SurfaceId> {
        self.visible.as_ref().map(Surface::id)
    }

    pub fn back_id(&self) -> Option<SurfaceId> {
        self.back.as_ref().map(Surface::id)
    }

    /// Rows of a surface as text
    pub fn snapshot(&self, target: Target) -> Option<Vec<String>> {
        let grid = self.surface(target)?.grid();
        Some(
            (0..grid.dimensions().rows)
                .filter_map(|row| grid.row_text(row))
                .collect(),
        )
    }

    /// Split borrow of the console and a target surface
    fn parts(&mut self, target: Option<Target>) -> Option<(&mut C, &mut C::Surface)> {
        let surface = match target.unwrap_or_default() {
            Target::Back => self.back.as_mut(),
            Target::Visible => self.visible.as_mut(),
        };
        match surface {
            Some(surface) => Some((&mut self.console, surface)),
            None => {
                debug!("No surface allocated, skipping");
                None
            }
        }
    }

    /// Write text at a fixed cell without tracking a cursor
    pub fn write_at(
        &mut self,
        column: usize,
        row: usize,
        text: impl AsRef<[u8]>,
        target: Option<Target>,
    ) {
        let text = text.as_ref();
        let text = &text[..text_len(text)];
        let pos = CursorPosition::new(column, row);
        if let Some((console, surface)) = self.parts(target) {
            if let Err(e) = console.write_chars(surface, pos, text) {
                warn!("Write at ({}, {}) failed: {}", column, row, e);
            }
        }
    }

    /// Write one glyph at a fixed cell
    pub fn write_char_at(&mut self, column: usize, row: usize, glyph: u8, target: Option<Target>) {
        self.write_at(column, row, [glyph, 0], target);
    }

    /// Write text at `pos`, then advance `pos` past it
    pub fn write_advance(
        &mut self,
        pos: &mut CursorPosition,
        text: impl AsRef<[u8]>,
        target: Option<Target>,
    ) {
        let text = text.as_ref();
        let len = text_len(text);
        let width = self.dimensions.columns;
        if let Some((console, surface)) = self.parts(target) {
            if let Err(e) = console.write_chars(surface, *pos, &text[..len]) {
                warn!("Write at ({}, {}) failed: {}", pos.column, pos.row, e);
            }
        }
        pos.advance(len, width);
    }

    /// Write one glyph at `pos`, then advance `pos`
    pub fn write_char_advance(
        &mut self,
        pos: &mut CursorPosition,
        glyph: u8,
        target: Option<Target>,
    ) {
        self.write_advance(pos, [glyph, 0], target);
    }

    /// Write `width` copies of a glyph at `pos`, advancing like a string write.
    ///
    /// A NUL glyph writes nothing and leaves `pos` alone.
    pub fn fill(
        &mut self,
        pos: &mut CursorPosition,
        glyph: u8,
        width: usize,
        target: Option<Target>,
    ) {
        if glyph == 0 {
            return;
        }
        let columns = self.dimensions.columns;
        if let Some((console, surface)) = self.parts(target) {
            if let Err(e) = console.fill_chars(surface, *pos, glyph, width) {
                warn!("Fill at ({}, {}) failed: {}", pos.column, pos.row, e);
            }
        }
        pos.advance(width, columns);
    }

    /// Draw a rectangle border, returning the cursor after the bottom-right corner
    pub fn draw_rect(&mut self, rect: Rectangle, target: Option<Target>) -> CursorPosition {
        let chars = *self.config.box_style.chars();
        let inner = rect.width.saturating_sub(2);
        let x = rect.top_left.column;
        let y = rect.top_left.row;

        let mut cp = rect.top_left;
        self.write_char_advance(&mut cp, chars.tl, target);
        self.fill(&mut cp, chars.top, inner, target);
        self.write_char_advance(&mut cp, chars.tr, target);

        // Side rows below the surface would only fail
        let last = rect.bottom().min(self.dimensions.rows);
        for row in y.saturating_add(1)..last {
            self.write_char_at(x, row, chars.left, target);
            self.write_char_at(rect.right(), row, chars.right, target);
        }

        let mut cp = CursorPosition::new(x, rect.bottom());
        self.write_char_advance(&mut cp, chars.bl, target);
        self.fill(&mut cp, chars.bottom, inner, target);
        self.write_char_advance(&mut cp, chars.br, target);
        cp
    }

    /// Blank the back surface and home its cursor
    pub fn clear(&mut self) {
        debug!("ConsoleEngine::clear");
        self.clear_surface(Target::Back);
    }

    /// Blank a surface and home its cursor without swapping
    pub fn clear_surface(&mut self, target: Target) {
        let origin = CursorPosition::origin();
        if let Some((console, surface)) = self.parts(Some(target)) {
            let area = surface.grid().cell_count();
            if let Err(e) = console.fill_chars(surface, origin, BLANK, area) {
                warn!("Clearing {:?} surface failed: {}", target, e);
            }
            if let Err(e) = console.set_cursor(surface, origin) {
                warn!("Homing {:?} cursor failed: {}", target, e);
            }
        }
    }

    /// Show the back surface and start a blank one.
    ///
    /// Whatever was on the previously visible surface is gone afterwards.
    pub fn present(&mut self) {
        debug!("ConsoleEngine::present");
        if !self.is_ready() {
            debug!("No surfaces allocated, nothing to present");
            return;
        }

        std::mem::swap(&mut self.visible, &mut self.back);

        if let Some(visible) = self.visible.as_mut() {
            if let Err(e) = self.console.activate(visible) {
                warn!("Activating surface {} failed: {}", visible.id(), e);
            }
        }

        self.clear_surface(Target::Back);
    }

    /// Move the cursor of the visible surface
    pub fn set_visible_cursor(&mut self, pos: CursorPosition) {
        debug!("ConsoleEngine::set_visible_cursor ({}, {})", pos.column, pos.row);
        if let Some((console, surface)) = self.parts(Some(Target::Visible)) {
            if let Err(e) = console.set_cursor(surface, pos) {
                warn!("Setting cursor failed: {}", e);
            }
        }
    }

    /// Pull `pos` left out of unwritten cells on the back surface.
    ///
    /// Stops on the first cell holding a glyph or at column 0. A failed read
    /// leaves `pos` wherever the walk had reached.
    pub fn adjust_cursor(&mut self, pos: &mut CursorPosition) {
        debug!("adjust_cursor: start ({}, {})", pos.column, pos.row);
        let Some(back) = self.back.as_ref() else {
            debug!("No back surface, cursor unchanged");
            return;
        };

        loop {
            let glyph = match self.console.read_char(back, *pos) {
                Ok(glyph) => glyph,
                Err(e) => {
                    warn!("Reading ({}, {}) failed: {}", pos.column, pos.row, e);
                    return;
                }
            };
            if !is_empty_glyph(glyph) || pos.column == 0 {
                break;
            }
            pos.column -= 1;
        }

        debug!("adjust_cursor: new position ({}, {})", pos.column, pos.row);
    }

    /// Decode one key; 0 when not blocking and nothing is pending
    pub fn poll_input(&mut self, blocking: bool) -> i32 {
        self.input.poll(&mut self.console, blocking)
    }

    pub fn reset_input(&mut self) {
        self.input.reset();
    }

    pub fn last_input(&self) -> InputEvent {
        self.input.last_event()
    }

    pub fn last_raw_key(&self) -> i32 {
        self.input.last_raw_key()
    }

    pub fn is_extended_key(&self) -> bool {
        self.input.is_extended_key()
    }
}

impl<C: Console> Drop for ConsoleEngine<C> {
    fn drop(&mut self) {
        debug!("ConsoleEngine::drop");
        self.back.take();
        self.visible.take();
    }
}
