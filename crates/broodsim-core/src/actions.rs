//! Action executor — applies decided actions to agents and the terrain.
//!
//! Every action has a precondition predicate and an apply step. Preconditions
//! are re-checked here at execution time: an earlier agent in the same tick
//! may have eaten the block this one planned to eat. A failed precondition
//! is a no-op, never an error. The only lethal outcomes are modeled as
//! state transitions: falling with no support below, and health hitting zero.

use hecs::{Entity, World};
use rand::seq::SliceRandom;
use rand::Rng;

use broodsim_logic::decision::{Action, Direction};
use broodsim_logic::terrain::CellKind;

use crate::agents::{CellPos, LifeStats, Role, Vitals};
use crate::config::SimConfig;
use crate::terrain::Terrain;

/// Maximum height difference a move may climb or drop.
const MOVE_MAX_CLIMB: i32 = 2;

/// Where a move in `dir` would land, if feasible: the neighbor column's top
/// solid cell, in bounds, within climbing range, and not a husk.
pub fn move_target<T: Terrain>(terrain: &T, pos: CellPos, dir: Direction) -> Option<CellPos> {
    let (dx, dz) = dir.offset();
    let (sx, _, sz) = terrain.size();
    let nx = pos.x + dx;
    let nz = pos.z + dz;
    if nx < 0 || nx >= sx || nz < 0 || nz >= sz {
        return None;
    }
    let top = terrain.top_solid_y(nx, nz)?;
    if (top - pos.y).abs() > MOVE_MAX_CLIMB {
        return None;
    }
    if !terrain.kind_at(nx, top, nz).is_standable() {
        return None;
    }
    Some(CellPos::new(nx, top, nz))
}

/// Per-direction move feasibility in [`Direction::index`] order.
pub fn feasible_directions<T: Terrain>(terrain: &T, pos: CellPos) -> [bool; Direction::COUNT] {
    let mut feasible = [false; Direction::COUNT];
    for dir in Direction::ALL {
        feasible[dir.index()] = move_target(terrain, pos, dir).is_some();
    }
    feasible
}

/// Count other live agents on the same cell.
pub fn colocated_others(world: &World, agent: Entity, pos: CellPos) -> u32 {
    world
        .query::<(&CellPos, &Vitals)>()
        .iter()
        .filter(|(e, (p, v))| *e != agent && v.alive && **p == pos)
        .count() as u32
}

/// A live queen shares this cell and is below full health.
pub fn queen_needs_care(world: &World, agent: Entity, pos: CellPos) -> bool {
    world
        .query::<(&Role, &CellPos, &Vitals)>()
        .iter()
        .any(|(e, (role, p, v))| {
            e != agent && role.is_queen() && v.alive && *p == pos && v.health < v.max_health
        })
}

/// Pick the receiver for a health transfer: the co-located queen if she is
/// below full health, otherwise the lowest-health co-located live agent
/// strictly below the donor's health.
pub fn share_receiver(
    world: &World,
    donor: Entity,
    donor_pos: CellPos,
    donor_health: f32,
) -> Option<Entity> {
    let mut poorest: Option<(Entity, f32)> = None;
    for (entity, (role, pos, vitals)) in world.query::<(&Role, &CellPos, &Vitals)>().iter() {
        if entity == donor || !vitals.alive || *pos != donor_pos {
            continue;
        }
        if role.is_queen() {
            if vitals.health < vitals.max_health {
                return Some(entity);
            }
            continue;
        }
        if vitals.health < donor_health
            && poorest.map_or(true, |(_, best)| vitals.health < best)
        {
            poorest = Some((entity, vitals.health));
        }
    }
    poorest.map(|(entity, _)| entity)
}

/// Execute a decided action. Returns `true` when a nest block was placed,
/// so the engine can keep its nest counter current.
pub fn execute<T: Terrain>(
    world: &mut World,
    terrain: &mut T,
    entity: Entity,
    action: Action,
    direction: Option<Direction>,
    config: &SimConfig,
    rng: &mut impl Rng,
) -> bool {
    match action {
        Action::Idle => false,
        Action::Move => {
            execute_move(world, terrain, entity, direction, rng);
            false
        }
        Action::Dig => {
            execute_dig(world, terrain, entity);
            false
        }
        Action::Eat => {
            execute_eat(world, terrain, entity, config);
            false
        }
        Action::ShareHealth => {
            execute_share(world, entity, config);
            false
        }
        Action::BuildNest => execute_build(world, terrain, entity, config),
    }
}

fn execute_move<T: Terrain>(
    world: &mut World,
    terrain: &T,
    entity: Entity,
    requested: Option<Direction>,
    rng: &mut impl Rng,
) {
    let Ok(pos) = world.get::<&CellPos>(entity).map(|p| *p) else {
        return;
    };

    let target = match requested.and_then(|dir| move_target(terrain, pos, dir)) {
        Some(target) => Some(target),
        None => {
            // Requested direction infeasible (or absent): substitute a
            // uniformly random feasible one, or give up.
            let candidates: Vec<CellPos> = Direction::ALL
                .iter()
                .filter_map(|dir| move_target(terrain, pos, *dir))
                .collect();
            candidates.choose(rng).copied()
        }
    };

    if let Some(target) = target {
        if let Ok(mut p) = world.get::<&mut CellPos>(entity) {
            *p = target;
        }
    }
}

fn execute_dig<T: Terrain>(world: &mut World, terrain: &mut T, entity: Entity) {
    let Ok((role, pos, alive)) = world
        .query_one_mut::<(&Role, &CellPos, &Vitals)>(entity)
        .map(|(r, p, v)| (*r, *p, v.alive))
    else {
        return;
    };
    if role.is_queen() || !alive || !terrain.kind_at(pos.x, pos.y, pos.z).is_diggable() {
        return;
    }

    terrain.set_kind(pos.x, pos.y, pos.z, CellKind::Empty);
    if let Ok(mut stats) = world.get::<&mut LifeStats>(entity) {
        stats.blocks_dug += 1;
    }
    settle_column(world, terrain, pos);
}

fn execute_eat<T: Terrain>(world: &mut World, terrain: &mut T, entity: Entity, config: &SimConfig) {
    let Ok((pos, alive)) = world
        .query_one_mut::<(&CellPos, &Vitals)>(entity)
        .map(|(p, v)| (*p, v.alive))
    else {
        return;
    };
    // Co-location blocks consumption: the block only feeds a lone agent.
    if !alive
        || colocated_others(world, entity, pos) != 0
        || terrain.kind_at(pos.x, pos.y, pos.z) != CellKind::Mulch
    {
        return;
    }

    terrain.set_kind(pos.x, pos.y, pos.z, CellKind::Empty);
    if let Ok(mut vitals) = world.get::<&mut Vitals>(entity) {
        vitals.restore(config.mulch_restore);
    }
    if let Ok(mut stats) = world.get::<&mut LifeStats>(entity) {
        stats.mulch_eaten += 1;
    }
    settle_column(world, terrain, pos);
}

fn execute_share(world: &mut World, entity: Entity, config: &SimConfig) {
    let Ok((role, pos, health, alive)) = world
        .query_one_mut::<(&Role, &CellPos, &Vitals)>(entity)
        .map(|(r, p, v)| (*r, *p, v.health, v.alive))
    else {
        return;
    };
    if role.is_queen() || !alive || health <= 1.0 {
        return;
    }
    let Some(receiver) = share_receiver(world, entity, pos, health) else {
        return;
    };

    let Ok((receiver_health, receiver_max)) = world
        .get::<&Vitals>(receiver)
        .map(|v| (v.health, v.max_health))
    else {
        return;
    };

    let transfer = config
        .share_amount
        .min(health - 1.0)
        .min(receiver_max - receiver_health);
    if transfer <= 0.0 {
        return;
    }

    if let Ok(mut vitals) = world.get::<&mut Vitals>(entity) {
        vitals.damage(transfer);
    }
    if let Ok(mut stats) = world.get::<&mut LifeStats>(entity) {
        stats.health_shared += transfer;
    }
    if let Ok(mut vitals) = world.get::<&mut Vitals>(receiver) {
        vitals.restore(transfer);
    }
}

fn execute_build<T: Terrain>(
    world: &mut World,
    terrain: &mut T,
    entity: Entity,
    config: &SimConfig,
) -> bool {
    let cost = config.nest_cost();
    let Ok((role, pos, health, alive)) = world
        .query_one_mut::<(&Role, &CellPos, &Vitals)>(entity)
        .map(|(r, p, v)| (*r, *p, v.health, v.alive))
    else {
        return false;
    };
    if !role.is_queen()
        || !alive
        || health < cost
        || !terrain.kind_at(pos.x, pos.y, pos.z).is_buildable()
    {
        return false;
    }

    terrain.set_kind(pos.x, pos.y, pos.z, CellKind::Nest);
    if let Ok(mut vitals) = world.get::<&mut Vitals>(entity) {
        // Spending down to exactly zero is lethal.
        vitals.damage(cost);
    }
    if let Ok(mut stats) = world.get::<&mut LifeStats>(entity) {
        stats.nests_built += 1;
    }
    true
}

/// After a standing cell was removed: drop every live agent on it to the
/// first solid cell below, or kill them when the column has none. Digging
/// under a co-located neighbor takes the neighbor down too.
fn settle_column<T: Terrain>(world: &mut World, terrain: &T, pos: CellPos) {
    let support = (0..pos.y)
        .rev()
        .find(|y| terrain.kind_at(pos.x, *y, pos.z).is_solid());
    let standing: Vec<Entity> = world
        .query::<(&CellPos, &Vitals)>()
        .iter()
        .filter(|(_, (p, v))| v.alive && **p == pos)
        .map(|(e, _)| e)
        .collect();
    for entity in standing {
        match support {
            Some(y) => {
                if let Ok(mut p) = world.get::<&mut CellPos>(entity) {
                    p.y = y;
                }
            }
            None => {
                if let Ok(mut vitals) = world.get::<&mut Vitals>(entity) {
                    vitals.kill();
                }
            }
        }
    }
}
