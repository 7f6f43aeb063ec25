//! In-memory console
//!
//! A deterministic platform: surfaces are plain grids, keystrokes come from
//! a scripted queue, and every allocation, release, activation and key read
//! is recorded in a shared ledger. Failures can be injected.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use log::debug;

use super::{Console, Surface, SurfaceId, WindowInfo};
use crate::core::{CursorPosition, Grid, GridDimensions};
use crate::error::{ConsoleError, Result};

/// Record of platform activity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    /// Surfaces allocated, in order
    pub created: Vec<SurfaceId>,
    /// Surfaces released, in order
    pub released: Vec<SurfaceId>,
    /// Surface currently rendered
    pub active: Option<SurfaceId>,
    /// Number of activations
    pub activations: usize,
    /// Whether the primary screen was given up
    pub primary_released: bool,
    /// Number of raw key reads
    pub key_reads: usize,
}

impl Ledger {
    /// Surfaces allocated and not yet released
    pub fn live(&self) -> Vec<SurfaceId> {
        self.created
            .iter()
            .copied()
            .filter(|id| !self.released.contains(id))
            .collect()
    }
}

/// A surface owned by a `MemoryConsole`
#[derive(Debug)]
pub struct MemorySurface {
    id: SurfaceId,
    grid: Grid,
    cursor: CursorPosition,
    ledger: Rc<RefCell<Ledger>>,
}

impl Surface for MemorySurface {
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

impl Drop for MemorySurface {
    fn drop(&mut self) {
        debug!("Releasing memory surface {}", self.id);
        self.ledger.borrow_mut().released.push(self.id);
    }
}

/// Scripted in-memory console
#[derive(Debug)]
pub struct MemoryConsole {
    window: WindowInfo,
    keys: VecDeque<i32>,
    ledger: Rc<RefCell<Ledger>>,
    next_id: SurfaceId,
    /// Allocations still allowed to succeed; `None` is unlimited
    allocations_left: Option<usize>,
    fail_reads_at: Option<CursorPosition>,
}

impl MemoryConsole {
    /// Create a console whose visible window has the given size
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            window: WindowInfo {
                dimensions: GridDimensions::new(columns, rows),
                cursor: CursorPosition::origin(),
            },
            keys: VecDeque::new(),
            ledger: Rc::new(RefCell::new(Ledger::default())),
            next_id: 1,
            allocations_left: None,
            fail_reads_at: None,
        }
    }

    /// Set the cursor reported by `window_info`
    pub fn with_cursor(mut self, cursor: CursorPosition) -> Self {
        self.window.cursor = cursor;
        self
    }

    /// Queue raw key codes for `read_key`
    pub fn push_keys(&mut self, codes: &[i32]) {
        self.keys.extend(codes.iter().copied());
    }

    /// Number of queued key codes not yet read
    pub fn pending_keys(&self) -> usize {
        self.keys.len()
    }

    /// Make every following allocation fail
    pub fn fail_allocations(&mut self, fail: bool) {
        self.allocations_left = if fail { Some(0) } else { None };
    }

    /// Let `count` more allocations succeed, then fail the rest
    pub fn fail_allocations_after(&mut self, count: usize) {
        self.allocations_left = Some(count);
    }

    /// Make cell reads at `pos` fail
    pub fn fail_reads_at(&mut self, pos: Option<CursorPosition>) {
        self.fail_reads_at = pos;
    }

    /// Snapshot of the activity ledger
    pub fn ledger(&self) -> Ledger {
        self.ledger.borrow().clone()
    }

    /// The live ledger; outlives the console
    pub fn shared_ledger(&self) -> Rc<RefCell<Ledger>> {
        Rc::clone(&self.ledger)
    }
}

impl Console for MemoryConsole {
    type Surface = MemorySurface;

    fn name(&self) -> &str {
        "memory"
    }

    fn window_info(&mut self) -> Result<WindowInfo> {
        Ok(self.window)
    }

    fn release_primary(&mut self) -> Result<()> {
        self.ledger.borrow_mut().primary_released = true;
        Ok(())
    }

    fn create_surface(&mut self, dims: GridDimensions) -> Result<MemorySurface> {
        match self.allocations_left {
            Some(0) => return Err(ConsoleError::Allocation("allocation refused".to_string())),
            Some(left) => self.allocations_left = Some(left - 1),
            None => {}
        }
        if !dims.is_valid() {
            return Err(ConsoleError::InvalidDimensions {
                columns: dims.columns,
                rows: dims.rows,
            });
        }
        let grid = Grid::new(dims)?;

        let id = self.next_id;
        self.next_id += 1;
        self.ledger.borrow_mut().created.push(id);

        Ok(MemorySurface {
            id,
            grid,
            cursor: CursorPosition::origin(),
            ledger: Rc::clone(&self.ledger),
        })
    }

    fn activate(&mut self, surface: &mut MemorySurface) -> Result<()> {
        let mut ledger = self.ledger.borrow_mut();
        ledger.active = Some(surface.id);
        ledger.activations += 1;
        Ok(())
    }

    fn write_chars(
        &mut self,
        surface: &mut MemorySurface,
        pos: CursorPosition,
        glyphs: &[u8],
    ) -> Result<usize> {
        surface.grid.write(pos, glyphs)
    }

    fn fill_chars(
        &mut self,
        surface: &mut MemorySurface,
        pos: CursorPosition,
        glyph: u8,
        count: usize,
    ) -> Result<usize> {
        surface.grid.fill(pos, glyph, count)
    }

    fn read_char(&mut self, surface: &MemorySurface, pos: CursorPosition) -> Result<u8> {
        if self.fail_reads_at == Some(pos) {
            return Err(ConsoleError::Io(io::Error::new(
                io::ErrorKind::Other,
                "injected read failure",
            )));
        }
        surface.grid.glyph_at(pos)
    }

    fn set_cursor(&mut self, surface: &mut MemorySurface, pos: CursorPosition) -> Result<()> {
        surface.cursor = pos;
        Ok(())
    }

    fn key_available(&mut self) -> Result<bool> {
        Ok(!self.keys.is_empty())
    }

    fn read_key(&mut self) -> Result<i32> {
        self.ledger.borrow_mut().key_reads += 1;
        self.keys.pop_front().ok_or_else(|| {
            ConsoleError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "key script exhausted",
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surfaces_get_distinct_ids() {
        let mut console = MemoryConsole::new(10, 5);
        let a = console.create_surface(GridDimensions::new(10, 5)).unwrap();
        let b = console.create_surface(GridDimensions::new(10, 5)).unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(console.ledger().live(), vec![a.id(), b.id()]);
    }

    #[test]
    fn test_drop_releases_surface() {
        let mut console = MemoryConsole::new(10, 5);
        let surface = console.create_surface(GridDimensions::new(10, 5)).unwrap();
        let id = surface.id();
        drop(surface);
        assert_eq!(console.ledger().released, vec![id]);
        assert!(console.ledger().live().is_empty());
    }

    #[test]
    fn test_allocation_failure() {
        let mut console = MemoryConsole::new(10, 5);
        console.fail_allocations(true);
        assert!(matches!(
            console.create_surface(GridDimensions::new(10, 5)),
            Err(ConsoleError::Allocation(_))
        ));
        assert!(console.ledger().created.is_empty());
    }

    #[test]
    fn test_allocation_budget() {
        let mut console = MemoryConsole::new(10, 5);
        console.fail_allocations_after(1);
        let first = console.create_surface(GridDimensions::new(10, 5));
        assert!(first.is_ok());
        assert!(matches!(
            console.create_surface(GridDimensions::new(10, 5)),
            Err(ConsoleError::Allocation(_))
        ));
        assert_eq!(console.ledger().created.len(), 1);
    }

    #[test]
    fn test_oversized_surface_is_refused() {
        let mut console = MemoryConsole::new(10, 5);
        assert!(matches!(
            console.create_surface(GridDimensions::new(1 << 33, 1 << 33)),
            Err(ConsoleError::Allocation(_))
        ));
        assert!(console.ledger().created.is_empty());
    }

    #[test]
    fn test_scripted_keys() {
        let mut console = MemoryConsole::new(10, 5);
        assert!(!console.key_available().unwrap());
        console.push_keys(&[65, 66]);
        assert!(console.key_available().unwrap());
        assert_eq!(console.read_key().unwrap(), 65);
        assert_eq!(console.read_key().unwrap(), 66);
        assert!(console.read_key().is_err());
        assert_eq!(console.ledger().key_reads, 3);
    }

    #[test]
    fn test_injected_read_failure() {
        let mut console = MemoryConsole::new(10, 5);
        let surface = console.create_surface(GridDimensions::new(10, 5)).unwrap();
        console.fail_reads_at(Some(CursorPosition::new(2, 0)));
        assert!(console.read_char(&surface, CursorPosition::new(1, 0)).is_ok());
        assert!(console.read_char(&surface, CursorPosition::new(2, 0)).is_err());
    }
}
