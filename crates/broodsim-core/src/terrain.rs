//! Terrain provider — the narrow cell interface the colony core consumes,
//! plus an in-memory voxel implementation with seeded procedural generation.
//!
//! The simulation only ever classifies cells and replaces them one at a
//! time; chunking, meshing, and rendering are someone else's problem.

use rand::Rng;

use broodsim_logic::terrain::CellKind;

/// Narrow terrain interface consumed by the simulation.
///
/// Out-of-bounds reads return [`CellKind::Empty`]; out-of-bounds writes are
/// ignored. Both show up when probing neighbor columns at the world edge.
pub trait Terrain {
    /// World bounds `(size_x, size_y, size_z)`.
    fn size(&self) -> (i32, i32, i32);

    fn kind_at(&self, x: i32, y: i32, z: i32) -> CellKind;

    fn set_kind(&mut self, x: i32, y: i32, z: i32, kind: CellKind);

    /// Restore the initial generated state.
    fn reset(&mut self);

    fn in_bounds(&self, x: i32, y: i32, z: i32) -> bool {
        let (sx, sy, sz) = self.size();
        x >= 0 && x < sx && y >= 0 && y < sy && z >= 0 && z < sz
    }

    /// Topmost solid cell of a column, or `None` for an empty column.
    fn top_solid_y(&self, x: i32, z: i32) -> Option<i32> {
        let (_, sy, _) = self.size();
        (0..sy).rev().find(|y| self.kind_at(x, *y, z).is_solid())
    }
}

/// Mulch patch probability per surface cell.
const MULCH_CHANCE: f64 = 0.15;
/// Acid pocket probability per surface cell.
const ACID_CHANCE: f64 = 0.06;
/// Husk (container) probability per surface cell.
const HUSK_CHANCE: f64 = 0.02;

/// Dense in-memory voxel grid with a snapshot of its generated state.
pub struct VoxelTerrain {
    size_x: i32,
    size_y: i32,
    size_z: i32,
    cells: Vec<CellKind>,
    initial: Vec<CellKind>,
}

impl VoxelTerrain {
    /// Generate a rolling soil floor with mulch patches, acid pockets, and
    /// the occasional husk block sitting on the surface.
    pub fn generate(size_x: i32, size_y: i32, size_z: i32, rng: &mut impl Rng) -> Self {
        let len = (size_x * size_y * size_z) as usize;
        let mut cells = vec![CellKind::Empty; len];

        let base_height = (size_y / 3).max(1);
        for x in 0..size_x {
            for z in 0..size_z {
                let height = (base_height + rng.gen_range(-1..=1)).clamp(1, size_y - 2);
                for y in 0..height {
                    cells[Self::index_for(size_x, size_y, x, y, z)] = CellKind::Soil;
                }
                let surface = Self::index_for(size_x, size_y, x, height - 1, z);
                let roll = rng.gen::<f64>();
                if roll < MULCH_CHANCE {
                    cells[surface] = CellKind::Mulch;
                } else if roll < MULCH_CHANCE + ACID_CHANCE {
                    cells[surface] = CellKind::Acid;
                } else if roll < MULCH_CHANCE + ACID_CHANCE + HUSK_CHANCE {
                    // Husk sits on top of the soil rather than replacing it.
                    let above = Self::index_for(size_x, size_y, x, height, z);
                    cells[above] = CellKind::Husk;
                }
            }
        }

        let initial = cells.clone();
        Self {
            size_x,
            size_y,
            size_z,
            cells,
            initial,
        }
    }

    /// Flat terrain of uniform soil height; handy for tests and scenarios.
    pub fn flat(size_x: i32, size_y: i32, size_z: i32, floor_height: i32) -> Self {
        let len = (size_x * size_y * size_z) as usize;
        let mut cells = vec![CellKind::Empty; len];
        let height = floor_height.clamp(1, size_y - 1);
        for x in 0..size_x {
            for z in 0..size_z {
                for y in 0..height {
                    cells[Self::index_for(size_x, size_y, x, y, z)] = CellKind::Soil;
                }
            }
        }
        let initial = cells.clone();
        Self {
            size_x,
            size_y,
            size_z,
            cells,
            initial,
        }
    }

    fn index_for(size_x: i32, size_y: i32, x: i32, y: i32, z: i32) -> usize {
        ((z * size_y + y) * size_x + x) as usize
    }

    fn index(&self, x: i32, y: i32, z: i32) -> usize {
        Self::index_for(self.size_x, self.size_y, x, y, z)
    }

    /// Count cells of a given kind (used by readouts and tests).
    pub fn count_kind(&self, kind: CellKind) -> usize {
        self.cells.iter().filter(|c| **c == kind).count()
    }
}

impl Terrain for VoxelTerrain {
    fn size(&self) -> (i32, i32, i32) {
        (self.size_x, self.size_y, self.size_z)
    }

    fn kind_at(&self, x: i32, y: i32, z: i32) -> CellKind {
        if self.in_bounds(x, y, z) {
            self.cells[self.index(x, y, z)]
        } else {
            CellKind::Empty
        }
    }

    fn set_kind(&mut self, x: i32, y: i32, z: i32, kind: CellKind) {
        if self.in_bounds(x, y, z) {
            let i = self.index(x, y, z);
            self.cells[i] = kind;
        }
    }

    fn reset(&mut self) {
        self.cells.copy_from_slice(&self.initial);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_flat_terrain_heights() {
        let terrain = VoxelTerrain::flat(8, 8, 8, 3);
        for x in 0..8 {
            for z in 0..8 {
                assert_eq!(terrain.top_solid_y(x, z), Some(2));
            }
        }
    }

    #[test]
    fn test_out_of_bounds_reads_empty() {
        let terrain = VoxelTerrain::flat(4, 4, 4, 2);
        assert_eq!(terrain.kind_at(-1, 0, 0), CellKind::Empty);
        assert_eq!(terrain.kind_at(0, 4, 0), CellKind::Empty);
        assert_eq!(terrain.kind_at(0, 0, 99), CellKind::Empty);
    }

    #[test]
    fn test_out_of_bounds_writes_ignored() {
        let mut terrain = VoxelTerrain::flat(4, 4, 4, 2);
        terrain.set_kind(-1, 0, 0, CellKind::Nest);
        terrain.set_kind(4, 0, 0, CellKind::Nest);
        assert_eq!(terrain.count_kind(CellKind::Nest), 0);
    }

    #[test]
    fn test_generate_deterministic_per_seed() {
        let mut rng_a = StdRng::seed_from_u64(9);
        let mut rng_b = StdRng::seed_from_u64(9);
        let a = VoxelTerrain::generate(12, 8, 12, &mut rng_a);
        let b = VoxelTerrain::generate(12, 8, 12, &mut rng_b);
        assert_eq!(a.cells, b.cells);
    }

    #[test]
    fn test_generate_every_column_has_ground() {
        let mut rng = StdRng::seed_from_u64(3);
        let terrain = VoxelTerrain::generate(16, 10, 16, &mut rng);
        for x in 0..16 {
            for z in 0..16 {
                assert!(terrain.top_solid_y(x, z).is_some());
            }
        }
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut terrain = VoxelTerrain::generate(8, 8, 8, &mut rng);
        let before = terrain.cells.clone();

        terrain.set_kind(2, 2, 2, CellKind::Nest);
        terrain.set_kind(3, 1, 3, CellKind::Empty);
        assert_ne!(terrain.cells, before);

        terrain.reset();
        assert_eq!(terrain.cells, before);
    }
}
