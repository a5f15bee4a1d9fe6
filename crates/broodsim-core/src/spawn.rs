//! Spawn placement search — find standable, unoccupied cells for agents.
//!
//! Tiered strategy, each tier tried only when the previous one exhausts
//! its budget:
//! 1. if an anchor exists, bounded random probes near it (workers prefer
//!    to start near the queen)
//! 2. bounded uniform-random column probes across the world
//! 3. exhaustive full-grid scan
//! 4. deterministic expanding-ring scan from the world center that, as a
//!    last resort, forces an unsuitable cell into standable soil
//!
//! Tier 4 terminates successfully for any world with bounds of at least
//! 2×2, so placement only fails for malformed worlds.

use std::collections::HashSet;

use rand::Rng;

use broodsim_logic::terrain::CellKind;

use crate::agents::CellPos;
use crate::terrain::Terrain;

/// Uniform-random column probes before falling back to a full scan.
const UNIFORM_PROBES: usize = 64;
/// Random probes near the anchor before widening the search.
const ANCHOR_PROBES: usize = 32;
/// Chebyshev radius of the anchor neighborhood.
pub const ANCHOR_RADIUS: i32 = 4;

/// A column's standable spawn cell: the topmost solid cell, at `y >= 1`,
/// not a husk, and not already claimed.
fn standable_at<T: Terrain>(
    terrain: &T,
    occupied: &HashSet<CellPos>,
    x: i32,
    z: i32,
) -> Option<CellPos> {
    let (sx, _, sz) = terrain.size();
    if x < 0 || x >= sx || z < 0 || z >= sz {
        return None;
    }
    let y = terrain.top_solid_y(x, z)?;
    if y < 1 || !terrain.kind_at(x, y, z).is_standable() {
        return None;
    }
    let pos = CellPos::new(x, y, z);
    if occupied.contains(&pos) {
        None
    } else {
        Some(pos)
    }
}

/// Find a spawn cell, or `None` only for malformed worlds.
///
/// `occupied` holds the cells already claimed this generation; `anchor`
/// biases the search toward the queen's position when placing workers.
pub fn find_spawn_cell<T: Terrain>(
    terrain: &mut T,
    occupied: &HashSet<CellPos>,
    anchor: Option<CellPos>,
    rng: &mut impl Rng,
) -> Option<CellPos> {
    let (sx, _, sz) = terrain.size();
    if sx < 2 || sz < 2 {
        return None;
    }

    // Tier 1: random probes near the anchor.
    if let Some(anchor) = anchor {
        for _ in 0..ANCHOR_PROBES {
            let x = anchor.x + rng.gen_range(-ANCHOR_RADIUS..=ANCHOR_RADIUS);
            let z = anchor.z + rng.gen_range(-ANCHOR_RADIUS..=ANCHOR_RADIUS);
            if let Some(pos) = standable_at(terrain, occupied, x, z) {
                return Some(pos);
            }
        }
    }

    // Tier 2: uniform-random column probes.
    for _ in 0..UNIFORM_PROBES {
        let x = rng.gen_range(0..sx);
        let z = rng.gen_range(0..sz);
        if let Some(pos) = standable_at(terrain, occupied, x, z) {
            return Some(pos);
        }
    }

    // Tier 3: exhaustive scan.
    for x in 0..sx {
        for z in 0..sz {
            if let Some(pos) = standable_at(terrain, occupied, x, z) {
                return Some(pos);
            }
        }
    }

    // Tier 4: deterministic expanding rings from the center, forcing the
    // first workable column into standable soil.
    let cx = sx / 2;
    let cz = sz / 2;
    let max_radius = sx.max(sz);
    for radius in 0..=max_radius {
        for x in (cx - radius)..=(cx + radius) {
            for z in (cz - radius)..=(cz + radius) {
                // Ring cells only; the interior was covered by smaller radii.
                if (x - cx).abs().max((z - cz).abs()) != radius {
                    continue;
                }
                if x < 0 || x >= sx || z < 0 || z >= sz {
                    continue;
                }
                if let Some(pos) = standable_at(terrain, occupied, x, z) {
                    return Some(pos);
                }
                if let Some(pos) = force_standable(terrain, occupied, x, z) {
                    return Some(pos);
                }
            }
        }
    }

    None
}

/// Convert a column's problem cell into soil so it becomes standable.
fn force_standable<T: Terrain>(
    terrain: &mut T,
    occupied: &HashSet<CellPos>,
    x: i32,
    z: i32,
) -> Option<CellPos> {
    let pos = match terrain.top_solid_y(x, z) {
        // Empty column, or ground level only: lay soil at y = 1.
        None | Some(0) => CellPos::new(x, 1, z),
        // Unstandable top (husk): replace it in place.
        Some(y) => CellPos::new(x, y, z),
    };
    if occupied.contains(&pos) {
        return None;
    }
    terrain.set_kind(pos.x, pos.y, pos.z, CellKind::Soil);
    Some(pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::VoxelTerrain;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_open_flat_world_places_immediately() {
        let mut terrain = VoxelTerrain::flat(8, 8, 8, 3);
        let occupied = HashSet::new();
        let pos = find_spawn_cell(&mut terrain, &occupied, None, &mut rng()).unwrap();
        assert_eq!(pos.y, 2);
        assert!(terrain.kind_at(pos.x, pos.y, pos.z).is_standable());
    }

    #[test]
    fn test_anchor_biases_placement() {
        let mut terrain = VoxelTerrain::flat(32, 8, 32, 3);
        let occupied = HashSet::new();
        let anchor = CellPos::new(16, 2, 16);
        let pos = find_spawn_cell(&mut terrain, &occupied, Some(anchor), &mut rng()).unwrap();
        // Every near-anchor column is standable, so the first probe lands.
        let chebyshev = (pos.x - anchor.x).abs().max((pos.z - anchor.z).abs());
        assert!(chebyshev <= ANCHOR_RADIUS);
    }

    #[test]
    fn test_occupied_cells_skipped() {
        let mut terrain = VoxelTerrain::flat(4, 6, 4, 3);
        let mut occupied = HashSet::new();
        for x in 0..4 {
            for z in 0..4 {
                if !(x == 3 && z == 3) {
                    occupied.insert(CellPos::new(x, 2, z));
                }
            }
        }
        let pos = find_spawn_cell(&mut terrain, &occupied, None, &mut rng()).unwrap();
        assert_eq!(pos, CellPos::new(3, 2, 3));
    }

    #[test]
    fn test_husk_surface_forced_in_tier_four() {
        let mut terrain = VoxelTerrain::flat(4, 6, 4, 3);
        for x in 0..4 {
            for z in 0..4 {
                terrain.set_kind(x, 3, z, CellKind::Husk);
            }
        }
        let occupied = HashSet::new();
        let pos = find_spawn_cell(&mut terrain, &occupied, None, &mut rng()).unwrap();
        assert!(terrain.kind_at(pos.x, pos.y, pos.z).is_standable());
    }

    #[test]
    fn test_ground_level_world_forced_to_y_one() {
        // Every column tops out at y = 0, below the standable floor.
        let mut terrain = VoxelTerrain::flat(4, 6, 4, 1);
        let occupied = HashSet::new();
        let pos = find_spawn_cell(&mut terrain, &occupied, None, &mut rng()).unwrap();
        assert_eq!(pos.y, 1);
        assert_eq!(terrain.kind_at(pos.x, pos.y, pos.z), CellKind::Soil);
    }

    #[test]
    fn test_degenerate_world_rejected() {
        let mut terrain = VoxelTerrain::flat(1, 4, 1, 2);
        let occupied = HashSet::new();
        assert!(find_spawn_cell(&mut terrain, &occupied, None, &mut rng()).is_none());
    }
}
