//! Generic grid for per-tile zone data

use crate::core::types::TilePos;

/// Generic 2D grid anchored at an integer world origin
#[derive(Debug, Clone)]
pub struct Grid<T: Clone + Default> {
    pub width: usize,
    pub height: usize,
    pub origin: TilePos,
    data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    pub fn new(width: usize, height: usize, origin: TilePos) -> Self {
        Self {
            width,
            height,
            origin,
            data: vec![T::default(); width * height],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x < self.width && y < self.height {
            Some(&self.data[y * self.width + x])
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        if x < self.width && y < self.height {
            Some(&mut self.data[y * self.width + x])
        } else {
            None
        }
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = value;
        }
    }

    /// Convert a world position to local cell coordinates, None when outside
    #[inline]
    pub fn world_to_cell(&self, pos: TilePos) -> Option<(usize, usize)> {
        let x = pos.x - self.origin.x;
        let y = pos.y - self.origin.y;
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some((x as usize, y as usize))
    }

    /// Sample grid at world position
    pub fn sample(&self, pos: TilePos) -> Option<&T> {
        let (x, y) = self.world_to_cell(pos)?;
        self.get(x, y)
    }

    /// World position of a local cell
    pub fn cell_to_world(&self, x: usize, y: usize) -> TilePos {
        TilePos::new(self.origin.x + x as i32, self.origin.y + y as i32)
    }

    pub fn contains(&self, pos: TilePos) -> bool {
        self.world_to_cell(pos).is_some()
    }
}

/// Impassable-tile map for one zone
///
/// Writes outside the zone are ignored; reads outside report "not an obstacle".
#[derive(Debug, Clone)]
pub struct ObstacleGrid {
    cells: Grid<bool>,
    count: usize,
}

impl ObstacleGrid {
    pub fn new(width: usize, height: usize, origin: TilePos) -> Self {
        Self {
            cells: Grid::new(width, height, origin),
            count: 0,
        }
    }

    pub fn is_obstacle(&self, pos: TilePos) -> bool {
        self.cells.sample(pos).copied().unwrap_or(false)
    }

    pub fn add(&mut self, pos: TilePos) {
        self.write(pos, true);
    }

    pub fn remove(&mut self, pos: TilePos) {
        self.write(pos, false);
    }

    fn write(&mut self, pos: TilePos, blocked: bool) {
        let Some((x, y)) = self.cells.world_to_cell(pos) else {
            return;
        };
        if let Some(cell) = self.cells.get_mut(x, y) {
            if *cell != blocked {
                *cell = blocked;
                if blocked {
                    self.count += 1;
                } else {
                    self.count -= 1;
                }
            }
        }
    }

    /// Number of obstacle tiles
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// World positions of every obstacle tile
    pub fn iter(&self) -> impl Iterator<Item = TilePos> + '_ {
        (0..self.cells.height).flat_map(move |y| {
            (0..self.cells.width).filter_map(move |x| {
                match self.cells.get(x, y) {
                    Some(true) => Some(self.cells.cell_to_world(x, y)),
                    _ => None,
                }
            })
        })
    }
}
