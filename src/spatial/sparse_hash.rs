//! Sparse hash grid for efficient spatial queries
//!
//! Entities are bucketed by `floor(pos / cell_size)`. A reverse map remembers
//! the cell and exact position each entity was last indexed at, so moves and
//! removals never need the caller to supply the old position.

use ahash::AHashMap;

use crate::core::types::{EntityId, TilePos};

type CellCoord = (i32, i32);

#[derive(Debug, Clone, Copy)]
struct Indexed {
    cell: CellCoord,
    pos: TilePos,
}

/// Sparse hash grid with an entity -> cell reverse map
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cell_size: i32,
    cells: AHashMap<CellCoord, Vec<EntityId>>,
    reverse: AHashMap<EntityId, Indexed>,
}

impl SpatialIndex {
    /// Non-positive cell sizes are clamped to 1
    pub fn new(cell_size: i32) -> Self {
        Self {
            cell_size: cell_size.max(1),
            cells: AHashMap::new(),
            reverse: AHashMap::new(),
        }
    }

    pub fn cell_size(&self) -> i32 {
        self.cell_size
    }

    /// Cell containing a world position (floor division, also for negatives)
    #[inline]
    pub fn cell_of(&self, x: i32, y: i32) -> CellCoord {
        (x.div_euclid(self.cell_size), y.div_euclid(self.cell_size))
    }

    /// Index an entity; re-inserting a known entity moves it
    pub fn insert(&mut self, entity: EntityId, pos: TilePos) {
        if self.reverse.contains_key(&entity) {
            self.update(entity, pos);
            return;
        }
        let cell = self.cell_of(pos.x, pos.y);
        self.cells.entry(cell).or_default().push(entity);
        self.reverse.insert(entity, Indexed { cell, pos });
    }

    /// Unindex an entity; unknown ids are a no-op
    pub fn remove(&mut self, entity: EntityId) {
        let Some(indexed) = self.reverse.remove(&entity) else {
            return;
        };
        self.detach(entity, indexed.cell);
    }

    /// Record a new position, moving buckets only when the cell changed
    pub fn update(&mut self, entity: EntityId, pos: TilePos) {
        let cell = self.cell_of(pos.x, pos.y);
        match self.reverse.get_mut(&entity) {
            Some(indexed) if indexed.cell == cell => {
                indexed.pos = pos;
            }
            Some(indexed) => {
                let old = indexed.cell;
                *indexed = Indexed { cell, pos };
                self.detach(entity, old);
                self.cells.entry(cell).or_default().push(entity);
            }
            None => self.insert(entity, pos),
        }
    }

    fn detach(&mut self, entity: EntityId, cell: CellCoord) {
        if let Some(bucket) = self.cells.get_mut(&cell) {
            bucket.retain(|&e| e != entity);
            if bucket.is_empty() {
                self.cells.remove(&cell);
            }
        }
    }

    /// Entities in the cell containing (x, y)
    pub fn entities_in_cell(&self, x: i32, y: i32) -> &[EntityId] {
        self.cells
            .get(&self.cell_of(x, y))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Entities in the square block of cells `radius` cells around (x, y)
    pub fn entities_in_neighborhood(&self, x: i32, y: i32, radius: i32) -> Vec<EntityId> {
        let (cx, cy) = self.cell_of(x, y);
        let radius = radius.max(0);
        let mut found = Vec::new();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if let Some(bucket) = self.cells.get(&(cx + dx, cy + dy)) {
                    found.extend_from_slice(bucket);
                }
            }
        }
        found
    }

    /// Entities whose indexed position lies within a Manhattan radius
    pub fn entities_within(&self, center: TilePos, radius: i32) -> Vec<EntityId> {
        let cell_radius = radius.max(0) / self.cell_size + 1;
        self.entities_in_neighborhood(center.x, center.y, cell_radius)
            .into_iter()
            .filter(|id| {
                self.position_of(*id)
                    .map(|p| p.manhattan(&center) <= radius)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Whether any indexed entity sits exactly at (x, y)
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        let target = TilePos::new(x, y);
        self.entities_in_cell(x, y)
            .iter()
            .any(|id| self.position_of(*id) == Some(target))
    }

    /// Entities sitting exactly at (x, y)
    pub fn entities_at(&self, x: i32, y: i32) -> Vec<EntityId> {
        let target = TilePos::new(x, y);
        self.entities_in_cell(x, y)
            .iter()
            .copied()
            .filter(|id| self.position_of(*id) == Some(target))
            .collect()
    }

    /// Position recorded by the last insert/update
    pub fn position_of(&self, entity: EntityId) -> Option<TilePos> {
        self.reverse.get(&entity).map(|i| i.pos)
    }

    /// Cell recorded by the last insert/update
    pub fn recorded_cell(&self, entity: EntityId) -> Option<CellCoord> {
        self.reverse.get(&entity).map(|i| i.cell)
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.reverse.contains_key(&entity)
    }

    pub fn len(&self) -> usize {
        self.reverse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reverse.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.reverse.clear();
    }
}
