//! Per-agent decision glue — gathers world context, applies heuristic
//! overrides, and falls back to sampling the policy network.
//!
//! The pure pieces (observation layout, override rules, sampling math)
//! live in `broodsim-logic`; this module only collects their inputs from
//! the ECS world and the terrain, and consumes uniform draws from the
//! engine's seeded stream in a fixed order.

use hecs::{Entity, World};
use rand::Rng;

use broodsim_logic::decision::{
    heuristic_override, Action, Direction, Feasibility, HeuristicInput,
};
use broodsim_logic::network;
use broodsim_logic::observation::{build_observation, ObservationInput};
use broodsim_logic::sampling::{
    masked_softmax_sample, ACTION_TEMPERATURE, DIRECTION_TEMPERATURE,
};
use broodsim_logic::terrain::CellKind;

use crate::actions;
use crate::agents::{Brain, CellPos, Role, Vitals};
use crate::config::SimConfig;
use crate::terrain::Terrain;

/// The outcome of one agent's decision stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub action: Action,
    /// Present only when the action is Move.
    pub direction: Option<Direction>,
}

impl Decision {
    fn idle() -> Self {
        Self {
            action: Action::Idle,
            direction: None,
        }
    }
}

/// Gather feasibility of every choice for one agent.
pub fn gather_feasibility<T: Terrain>(
    world: &World,
    terrain: &T,
    entity: Entity,
    pos: CellPos,
    role: Role,
    vitals: &Vitals,
    colocated: u32,
    nest_cost: f32,
) -> Feasibility {
    let standing = terrain.kind_at(pos.x, pos.y, pos.z);
    Feasibility {
        move_dirs: actions::feasible_directions(terrain, pos),
        dig: !role.is_queen() && standing.is_diggable(),
        eat: colocated == 0 && standing == CellKind::Mulch,
        share: !role.is_queen()
            && vitals.health > 1.0
            && actions::share_receiver(world, entity, pos, vitals.health).is_some(),
        build: role.is_queen() && vitals.health >= nest_cost && standing.is_buildable(),
    }
}

/// Decide what one agent does this tick.
pub fn decide<T: Terrain>(
    world: &World,
    terrain: &T,
    entity: Entity,
    config: &SimConfig,
    step: u32,
    rng: &mut impl Rng,
) -> Decision {
    let (Ok(role), Ok(pos), Ok(vitals)) = (
        world.get::<&Role>(entity).map(|r| *r),
        world.get::<&CellPos>(entity).map(|p| *p),
        world.get::<&Vitals>(entity).map(|v| *v),
    ) else {
        return Decision::idle();
    };

    let colocated = actions::colocated_others(world, entity, pos);
    let queen_needs_care = actions::queen_needs_care(world, entity, pos);
    let nest_cost = config.nest_cost();
    let feasibility =
        gather_feasibility(world, terrain, entity, pos, role, &vitals, colocated, nest_cost);

    // Stage one: deterministic role-specific overrides.
    let heuristic = HeuristicInput {
        is_queen: role.is_queen(),
        health: vitals.health,
        max_health: vitals.max_health,
        nest_cost,
        queen_needs_care,
    };
    if let Some(action) = heuristic_override(&heuristic, &feasibility) {
        return Decision {
            action,
            direction: None,
        };
    }

    // Stage two: masked sampling over the policy network's logits.
    let (sx, sy, sz) = terrain.size();
    let observation = build_observation(&ObservationInput {
        health_ratio: vitals.ratio(),
        is_queen: role.is_queen(),
        colocated_others: colocated,
        queen_needs_care,
        standing_kind: terrain.kind_at(pos.x, pos.y, pos.z),
        feasibility,
        normalized_pos: [
            pos.x as f32 / (sx - 1).max(1) as f32,
            pos.y as f32 / (sy - 1).max(1) as f32,
            pos.z as f32 / (sz - 1).max(1) as f32,
        ],
        nest_affordability: if nest_cost > 0.0 {
            vitals.health / nest_cost
        } else {
            2.0
        },
        step_fraction: step as f32 / config.evaluation_steps as f32,
    });

    let Ok(logits) = world
        .get::<&Brain>(entity)
        .map(|brain| network::forward(&brain.0, &observation))
    else {
        return Decision::idle();
    };

    let action_mask = feasibility.action_mask();
    let draw = rng.gen::<f32>();
    let action = masked_softmax_sample(
        &logits[..Action::COUNT],
        &action_mask,
        ACTION_TEMPERATURE,
        draw,
    )
    .and_then(Action::from_index)
    .unwrap_or(Action::Idle);

    let direction = if action == Action::Move {
        let draw = rng.gen::<f32>();
        Some(
            masked_softmax_sample(
                &logits[Action::COUNT..],
                &feasibility.move_dirs,
                DIRECTION_TEMPERATURE,
                draw,
            )
            .and_then(Direction::from_index)
            .unwrap_or(Direction::East),
        )
    } else {
        None
    };

    Decision { action, direction }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{Colonist, LifeStats};
    use crate::terrain::VoxelTerrain;
    use broodsim_logic::genome::Genome;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn spawn_agent(world: &mut World, role: Role, pos: CellPos, max_health: f32) -> Entity {
        world.spawn((
            Colonist,
            role,
            pos,
            Vitals::new(max_health),
            LifeStats::default(),
            Brain(Genome::zeroed()),
        ))
    }

    #[test]
    fn test_queen_override_builds() {
        let terrain = VoxelTerrain::flat(6, 8, 6, 3);
        let mut world = World::new();
        let queen = spawn_agent(&mut world, Role::Queen, CellPos::new(2, 2, 2), 48.0);
        let mut rng = StdRng::seed_from_u64(1);

        let decision = decide(&world, &terrain, queen, &SimConfig::default(), 0, &mut rng);
        assert_eq!(decision.action, Action::BuildNest);
        assert_eq!(decision.direction, None);
    }

    #[test]
    fn test_worker_override_shares_with_needy_queen() {
        let terrain = VoxelTerrain::flat(6, 8, 6, 3);
        let mut world = World::new();
        let pos = CellPos::new(2, 2, 2);
        let worker = spawn_agent(&mut world, Role::Worker, pos, 24.0);
        let queen = spawn_agent(&mut world, Role::Queen, pos, 48.0);
        world.get::<&mut Vitals>(queen).unwrap().damage(10.0);
        let mut rng = StdRng::seed_from_u64(1);

        let decision = decide(&world, &terrain, worker, &SimConfig::default(), 0, &mut rng);
        assert_eq!(decision.action, Action::ShareHealth);
    }

    #[test]
    fn test_learned_decision_is_feasible() {
        let terrain = VoxelTerrain::flat(6, 8, 6, 3);
        let mut world = World::new();
        // Healthy lone worker on soil: no override fires, the policy picks.
        let worker = spawn_agent(&mut world, Role::Worker, CellPos::new(2, 2, 2), 24.0);
        let config = SimConfig::default();
        let mut rng = StdRng::seed_from_u64(5);

        for step in 0..50 {
            let decision = decide(&world, &terrain, worker, &config, step, &mut rng);
            // Eat, ShareHealth, and BuildNest are all infeasible here.
            assert!(matches!(
                decision.action,
                Action::Idle | Action::Move | Action::Dig
            ));
            if decision.action == Action::Move {
                assert!(decision.direction.is_some());
            } else {
                assert!(decision.direction.is_none());
            }
        }
    }

    #[test]
    fn test_decision_deterministic_per_seed() {
        let terrain = VoxelTerrain::flat(6, 8, 6, 3);
        let mut world = World::new();
        let worker = spawn_agent(&mut world, Role::Worker, CellPos::new(2, 2, 2), 24.0);
        let config = SimConfig::default();

        let mut rng_a = StdRng::seed_from_u64(11);
        let mut rng_b = StdRng::seed_from_u64(11);
        for step in 0..20 {
            let a = decide(&world, &terrain, worker, &config, step, &mut rng_a);
            let b = decide(&world, &terrain, worker, &config, step, &mut rng_b);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_feasibility_gathering() {
        let mut terrain = VoxelTerrain::flat(6, 8, 6, 3);
        terrain.set_kind(2, 2, 2, CellKind::Mulch);
        let mut world = World::new();
        let pos = CellPos::new(2, 2, 2);
        let worker = spawn_agent(&mut world, Role::Worker, pos, 24.0);
        let vitals = *world.get::<&Vitals>(worker).unwrap();

        let feas = gather_feasibility(&world, &terrain, worker, pos, Role::Worker, &vitals, 0, 16.0);
        assert!(feas.eat);
        assert!(!feas.dig); // mulch is not diggable
        assert!(!feas.build); // workers never build
        assert!(!feas.share); // nobody co-located
        assert!(feas.any_move());
    }
}
