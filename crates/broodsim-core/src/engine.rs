//! Simulation engine - generation lifecycle, tick loop, and the
//! fixed-timestep driver.
//!
//! The engine owns everything mutable: the ECS world of agents, the
//! terrain, the genome pools, and the single seeded random stream. A host
//! loop calls [`SimulationEngine::advance`] with wall-clock deltas; the
//! accumulator converts that into zero or more fixed ticks, so simulated
//! time never skips and a fixed seed reproduces a whole run.

use std::collections::HashSet;

use hecs::{Entity, World};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use broodsim_logic::fitness::{queen_fitness, worker_fitness, AgentTally};
use broodsim_logic::genome::Genome;
use broodsim_logic::terrain::CellKind;

use crate::actions;
use crate::agents::{Brain, CellPos, Colonist, LifeStats, Role, Vitals};
use crate::config::{ConfigError, SimConfig};
use crate::decision;
use crate::evolution::{self, GenerationSummary, ScoredWorker};
use crate::spawn;
use crate::terrain::Terrain;

/// Generation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Place the queen, then the workers near her.
    Spawning,
    /// Execute ticks until the step budget runs out or everyone is dead.
    Running,
    /// Score, evolve, optionally reset the terrain, and start over.
    Ending,
}

/// Read-only counters for a presentation layer. The core never depends on
/// anything downstream of this.
#[derive(Debug, Clone, Copy)]
pub struct Readout {
    pub generation: u32,
    pub step: u32,
    pub alive: usize,
    pub nest_blocks: u32,
    pub last_summary: Option<GenerationSummary>,
}

/// Main simulation engine.
pub struct SimulationEngine<T: Terrain> {
    world: World,
    terrain: T,
    config: SimConfig,
    rng: StdRng,
    queen_genome: Genome,
    worker_genomes: Vec<Genome>,
    phase: Phase,
    generation: u32,
    step: u32,
    nest_blocks: u32,
    accumulator: f32,
    last_summary: Option<GenerationSummary>,
}

impl<T: Terrain> SimulationEngine<T> {
    /// Create an engine over an injected terrain provider and configuration.
    /// Seeds the random stream and both genome pools.
    pub fn new(terrain: T, config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let queen_genome = evolution::random_genome(&mut rng);
        let worker_genomes = (0..config.worker_count)
            .map(|_| evolution::random_genome(&mut rng))
            .collect();
        Ok(Self {
            world: World::new(),
            terrain,
            config,
            rng,
            queen_genome,
            worker_genomes,
            phase: Phase::Spawning,
            generation: 0,
            step: 0,
            nest_blocks: 0,
            accumulator: 0.0,
            last_summary: None,
        })
    }

    /// Fixed-timestep driver: accumulate elapsed time and run as many ticks
    /// as fit. Catch-up loop — ticks are never skipped.
    pub fn advance(&mut self, delta_seconds: f32) {
        self.accumulator += delta_seconds.max(0.0);
        while self.accumulator >= self.config.tick_seconds {
            self.accumulator -= self.config.tick_seconds;
            self.tick();
        }
    }

    /// Run exactly one tick of the state machine.
    pub fn tick(&mut self) {
        match self.phase {
            Phase::Spawning => {
                self.spawn_generation();
                self.phase = Phase::Running;
            }
            Phase::Running => {
                self.run_step();
                if self.step >= self.config.evaluation_steps || self.alive_count() == 0 {
                    self.phase = Phase::Ending;
                }
            }
            Phase::Ending => {
                self.end_generation();
                self.generation += 1;
                self.phase = Phase::Spawning;
            }
        }
    }

    /// Run until `generations` full generations have completed.
    pub fn run_generations(&mut self, generations: u32) {
        let target = self.generation + generations;
        while self.generation < target {
            self.tick();
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn terrain(&self) -> &T {
        &self.terrain
    }

    pub fn queen_genome(&self) -> &Genome {
        &self.queen_genome
    }

    pub fn worker_pool(&self) -> &[Genome] {
        &self.worker_genomes
    }

    pub fn alive_count(&self) -> usize {
        self.world
            .query::<(&Colonist, &Vitals)>()
            .iter()
            .filter(|(_, (_, v))| v.alive)
            .count()
    }

    pub fn queen_count(&self) -> usize {
        self.world
            .query::<(&Role, &Vitals)>()
            .iter()
            .filter(|(_, (role, _))| role.is_queen())
            .count()
    }

    pub fn readout(&self) -> Readout {
        Readout {
            generation: self.generation,
            step: self.step,
            alive: self.alive_count(),
            nest_blocks: self.nest_blocks,
            last_summary: self.last_summary,
        }
    }

    /// Direct access to the agent world, for inspection by tests and hosts.
    pub fn world(&self) -> &World {
        &self.world
    }

    fn spawn_generation(&mut self) {
        self.world.clear();
        self.step = 0;

        let mut occupied: HashSet<CellPos> = HashSet::new();

        let queen_anchor =
            match spawn::find_spawn_cell(&mut self.terrain, &occupied, None, &mut self.rng) {
                Some(pos) => {
                    occupied.insert(pos);
                    self.world.spawn((
                        Colonist,
                        Role::Queen,
                        pos,
                        Vitals::new(self.config.queen_max_health),
                        LifeStats::default(),
                        Brain(self.queen_genome.clone()),
                    ));
                    Some(pos)
                }
                None => {
                    warn!(
                        "generation {}: no spawn cell for the queen, running queenless",
                        self.generation
                    );
                    None
                }
            };

        let mut placed = 0usize;
        let genomes = self.worker_genomes.clone();
        for genome in genomes {
            match spawn::find_spawn_cell(&mut self.terrain, &occupied, queen_anchor, &mut self.rng)
            {
                Some(pos) => {
                    occupied.insert(pos);
                    self.world.spawn((
                        Colonist,
                        Role::Worker,
                        pos,
                        Vitals::new(self.config.worker_max_health),
                        LifeStats::default(),
                        Brain(genome),
                    ));
                    placed += 1;
                }
                None => {
                    warn!(
                        "generation {}: worker placement exhausted after {} of {}, truncating roster",
                        self.generation, placed, self.config.worker_count
                    );
                    break;
                }
            }
        }
        debug!(
            "generation {}: spawned {} workers{}",
            self.generation,
            placed,
            if queen_anchor.is_some() {
                " and the queen"
            } else {
                ""
            }
        );
    }

    fn run_step(&mut self) {
        // Snapshot the live roster, then act on a fresh random permutation.
        // Re-randomizing every tick keeps any fixed iteration order from
        // biasing contested resources.
        let mut order: Vec<Entity> = self
            .world
            .query::<(&Colonist, &Vitals)>()
            .iter()
            .filter(|(_, (_, v))| v.alive)
            .map(|(e, _)| e)
            .collect();
        order.shuffle(&mut self.rng);

        for entity in order {
            // Liveness may have changed since the snapshot.
            let Ok((pos, alive)) = self
                .world
                .query_one_mut::<(&CellPos, &Vitals)>(entity)
                .map(|(p, v)| (*p, v.alive))
            else {
                continue;
            };
            if !alive {
                continue;
            }

            // Decay comes first, regardless of what the agent chooses.
            let standing = self.terrain.kind_at(pos.x, pos.y, pos.z);
            let drain = if standing == CellKind::Acid {
                self.config.health_drain * 2.0
            } else {
                self.config.health_drain
            };
            let survived_decay = match self.world.get::<&mut Vitals>(entity) {
                Ok(mut vitals) => {
                    vitals.damage(drain);
                    vitals.alive
                }
                Err(_) => continue,
            };
            if !survived_decay {
                continue;
            }

            let decided = decision::decide(
                &self.world,
                &self.terrain,
                entity,
                &self.config,
                self.step,
                &mut self.rng,
            );
            let built = actions::execute(
                &mut self.world,
                &mut self.terrain,
                entity,
                decided.action,
                decided.direction,
                &self.config,
                &mut self.rng,
            );
            if built {
                self.nest_blocks += 1;
            }

            if let Ok(mut stats) = self.world.get::<&mut LifeStats>(entity) {
                stats.steps_alive += 1;
            }
        }

        self.step += 1;
    }

    fn end_generation(&mut self) {
        let survivors = self.alive_count() as u32;

        let mut queen: Option<(bool, AgentTally)> = None;
        let mut workers: Vec<(Genome, AgentTally)> = Vec::new();
        for (_, (role, vitals, stats, brain)) in self
            .world
            .query::<(&Role, &Vitals, &LifeStats, &Brain)>()
            .iter()
        {
            let tally = AgentTally {
                steps_alive: stats.steps_alive,
                mulch_eaten: stats.mulch_eaten,
                blocks_dug: stats.blocks_dug,
                nests_built: stats.nests_built,
                health_shared: stats.health_shared,
                final_health: vitals.health,
            };
            match role {
                Role::Queen => queen = Some((vitals.alive, tally)),
                Role::Worker => workers.push((brain.0.clone(), tally)),
            }
        }

        let queen_nests = queen.map_or(0, |(_, tally)| tally.nests_built);
        let queen_fit = queen.map(|(_, tally)| queen_fitness(&tally));
        let scored: Vec<ScoredWorker> = workers
            .into_iter()
            .map(|(genome, tally)| ScoredWorker {
                fitness: worker_fitness(&tally, queen_nests),
                genome,
            })
            .collect();

        let best_worker = scored
            .iter()
            .map(|s| s.fitness)
            .fold(f32::NEG_INFINITY, f32::max);
        let best_worker = if scored.is_empty() { 0.0 } else { best_worker };
        let best = queen_fit.map_or(best_worker, |q| q.max(best_worker));
        let population = scored.len() + usize::from(queen.is_some());
        let mean = if population > 0 {
            (scored.iter().map(|s| s.fitness).sum::<f32>() + queen_fit.unwrap_or(0.0))
                / population as f32
        } else {
            0.0
        };

        let summary = GenerationSummary {
            generation: self.generation,
            best_fitness: best,
            mean_fitness: mean,
            best_worker_fitness: best_worker,
            queen_fitness: queen_fit.unwrap_or(0.0),
            nests_built: queen_nests,
            survivors,
        };
        info!(
            "generation {} complete: best {:.2}, mean {:.2}, nests {}, survivors {}",
            summary.generation, summary.best_fitness, summary.mean_fitness,
            summary.nests_built, summary.survivors
        );
        self.last_summary = Some(summary);

        self.worker_genomes = evolution::next_worker_pool(
            scored,
            self.config.worker_count,
            self.config.elite_count,
            self.config.mutation_strength,
            &mut self.rng,
        );
        let queen_survived = queen.map_or(false, |(alive, _)| alive);
        self.queen_genome = evolution::next_queen_genome(
            &self.queen_genome,
            queen_survived,
            queen_nests,
            self.config.mutation_strength,
            &mut self.rng,
        );

        self.world.clear();
        if self.config.reset_terrain_per_generation {
            self.terrain.reset();
            self.nest_blocks = 0;
        }
    }
}
