//! Fitness-driven evolution — elitist selection, genome mutation, and the
//! queen's separate explore/exploit schedule.
//!
//! All genome derivation happens here, at generation boundaries: the only
//! operations are clone-unchanged (elites), clone-then-mutate, and fresh
//! random initialization. Genomes are never shared between live agents.

use rand::Rng;
use serde::{Deserialize, Serialize};

use broodsim_logic::genome::{Genome, PARAM_MAX, PARAM_MIN};
use broodsim_logic::network::GENOME_LEN;

/// Per-parameter probability of a large perturbation during mutation.
const LARGE_MUTATION_RATE: f64 = 0.14;
/// Small always-on drift, as a fraction of the mutation strength.
const SMALL_SIGMA_FRACTION: f32 = 0.015;
/// Probability a non-elite slot is filled with a fresh random genome.
const FRESH_GENOME_RATE: f64 = 0.15;
/// Mutation strength scale when the queen built at least one nest.
const QUEEN_EXPLOIT_SCALE: f32 = 0.25;
/// Mutation strength scale when the queen built nothing.
const QUEEN_EXPLORE_SCALE: f32 = 1.1;
/// Chance of replacing a nest-less queen's genome outright.
const QUEEN_RESEED_RATE: f64 = 0.30;
/// Fresh genomes initialize uniformly within this symmetric range.
const INIT_RANGE: f32 = 1.0;

/// One standard Gaussian sample from two independent uniform draws
/// (Box–Muller transform).
pub fn gaussian(rng: &mut impl Rng) -> f32 {
    let u1 = rng.gen::<f32>().max(f32::MIN_POSITIVE);
    let u2 = rng.gen::<f32>();
    (-2.0 * u1.ln()).sqrt() * (std::f32::consts::TAU * u2).cos()
}

/// Fresh genome with parameters drawn uniformly from `[-1, 1]`.
pub fn random_genome(rng: &mut impl Rng) -> Genome {
    let params = (0..GENOME_LEN)
        .map(|_| rng.gen_range(-INIT_RANGE..=INIT_RANGE))
        .collect();
    // Length is GENOME_LEN by construction.
    Genome::from_params(params).unwrap_or_else(Genome::zeroed)
}

/// Clone-then-mutate: each parameter gets a large Gaussian perturbation
/// with 14% probability, always gets a small Gaussian drift, and is
/// clamped back into the parameter range.
pub fn mutate(parent: &Genome, strength: f32, rng: &mut impl Rng) -> Genome {
    let small_sigma = SMALL_SIGMA_FRACTION * strength;
    let mut child = parent.clone();
    for param in child.params_mut() {
        if rng.gen_bool(LARGE_MUTATION_RATE) {
            *param += gaussian(rng) * strength;
        }
        *param += gaussian(rng) * small_sigma;
        *param = param.clamp(PARAM_MIN, PARAM_MAX);
    }
    child
}

/// A worker genome paired with its generation-end fitness.
#[derive(Debug, Clone)]
pub struct ScoredWorker {
    pub genome: Genome,
    pub fitness: f32,
}

/// Build the next worker genome pool.
///
/// Sorts descending by fitness, keeps the top
/// `clamp(elite_count, 1, worker_count)` genomes unmodified, and fills the
/// remaining slots with fresh random genomes (15%) or mutated clones of
/// uniformly chosen elites. A total wipeout refills entirely at random.
pub fn next_worker_pool(
    mut scored: Vec<ScoredWorker>,
    worker_count: usize,
    elite_count: usize,
    strength: f32,
    rng: &mut impl Rng,
) -> Vec<Genome> {
    if scored.is_empty() {
        return (0..worker_count).map(|_| random_genome(rng)).collect();
    }

    scored.sort_by(|a, b| {
        b.fitness
            .partial_cmp(&a.fitness)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let elite_n = elite_count.clamp(1, worker_count).min(scored.len());
    let elites: Vec<Genome> = scored[..elite_n]
        .iter()
        .map(|s| s.genome.clone())
        .collect();

    let mut pool = elites.clone();
    while pool.len() < worker_count {
        if rng.gen_bool(FRESH_GENOME_RATE) {
            pool.push(random_genome(rng));
        } else {
            let parent = &elites[rng.gen_range(0..elites.len())];
            pool.push(mutate(parent, strength, rng));
        }
    }
    pool
}

/// Evolve the queen genome for the next generation.
///
/// A dead queen's lineage is mutated at full strength. A surviving queen
/// that built is exploited (0.25× strength); one that built nothing is
/// explored (1.1× strength) with a 30% chance of outright replacement to
/// escape local optima.
pub fn next_queen_genome(
    current: &Genome,
    queen_survived: bool,
    nests_built: u32,
    strength: f32,
    rng: &mut impl Rng,
) -> Genome {
    if !queen_survived {
        return mutate(current, strength, rng);
    }
    if nests_built >= 1 {
        mutate(current, strength * QUEEN_EXPLOIT_SCALE, rng)
    } else if rng.gen_bool(QUEEN_RESEED_RATE) {
        random_genome(rng)
    } else {
        mutate(current, strength * QUEEN_EXPLORE_SCALE, rng)
    }
}

/// Aggregate statistics for one finished generation, exposed to the
/// presentation layer and the log.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub generation: u32,
    pub best_fitness: f32,
    pub mean_fitness: f32,
    pub best_worker_fitness: f32,
    pub queen_fitness: f32,
    pub nests_built: u32,
    pub survivors: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(99)
    }

    #[test]
    fn test_gaussian_centered() {
        let mut rng = rng();
        let n = 10_000;
        let mean: f32 = (0..n).map(|_| gaussian(&mut rng)).sum::<f32>() / n as f32;
        assert!(mean.abs() < 0.05, "mean {} too far from zero", mean);
    }

    #[test]
    fn test_random_genome_in_bounds() {
        let mut rng = rng();
        let genome = random_genome(&mut rng);
        assert_eq!(genome.len(), GENOME_LEN);
        assert!(genome.in_bounds());
    }

    #[test]
    fn test_mutation_stays_clamped() {
        let mut rng = rng();
        // Start at the edge with an absurd strength: clamping must hold.
        let mut parent = Genome::zeroed();
        for p in parent.params_mut() {
            *p = PARAM_MAX;
        }
        for _ in 0..20 {
            let child = mutate(&parent, 50.0, &mut rng);
            assert!(child.in_bounds());
        }
    }

    #[test]
    fn test_mutation_perturbs() {
        let mut rng = rng();
        let parent = Genome::zeroed();
        let child = mutate(&parent, 1.0, &mut rng);
        assert_ne!(parent, child);
    }

    #[test]
    fn test_small_strength_small_drift() {
        let mut rng = rng();
        let parent = random_genome(&mut rng);
        let child = mutate(&parent, 0.01, &mut rng);
        for (a, b) in parent.params().iter().zip(child.params()) {
            assert!((a - b).abs() < 0.2);
        }
    }

    #[test]
    fn test_elites_survive_unmodified() {
        let mut rng = rng();
        let best = random_genome(&mut rng);
        let scored = vec![
            ScoredWorker {
                genome: random_genome(&mut rng),
                fitness: 1.0,
            },
            ScoredWorker {
                genome: best.clone(),
                fitness: 10.0,
            },
            ScoredWorker {
                genome: random_genome(&mut rng),
                fitness: -2.0,
            },
        ];

        let pool = next_worker_pool(scored, 3, 1, 0.5, &mut rng);
        assert_eq!(pool.len(), 3);
        assert_eq!(pool[0], best);
    }

    #[test]
    fn test_pool_size_constant() {
        let mut rng = rng();
        let scored: Vec<ScoredWorker> = (0..5)
            .map(|i| ScoredWorker {
                genome: random_genome(&mut rng),
                fitness: i as f32,
            })
            .collect();
        let pool = next_worker_pool(scored, 12, 3, 0.5, &mut rng);
        assert_eq!(pool.len(), 12);
    }

    #[test]
    fn test_elite_count_clamped_to_population() {
        let mut rng = rng();
        let scored = vec![ScoredWorker {
            genome: random_genome(&mut rng),
            fitness: 1.0,
        }];
        // elite_count far above both worker count and survivor count.
        let pool = next_worker_pool(scored, 4, 100, 0.5, &mut rng);
        assert_eq!(pool.len(), 4);
    }

    #[test]
    fn test_wipeout_refills_fresh() {
        let mut rng = rng();
        let pool = next_worker_pool(Vec::new(), 6, 2, 0.5, &mut rng);
        assert_eq!(pool.len(), 6);
        for genome in &pool {
            assert!(genome.in_bounds());
        }
    }

    #[test]
    fn test_dead_queen_mutated_at_full_strength() {
        let mut rng_a = rng();
        let mut rng_b = rng();
        let current = Genome::zeroed();
        // Same stream: the dead-queen branch is exactly a full-strength mutation.
        let evolved = next_queen_genome(&current, false, 0, 0.6, &mut rng_a);
        let reference = mutate(&current, 0.6, &mut rng_b);
        assert_eq!(evolved, reference);
    }

    #[test]
    fn test_builder_queen_drifts_gently() {
        let mut rng = rng();
        let current = random_genome(&mut rng);
        let evolved = next_queen_genome(&current, true, 2, 0.1, &mut rng);
        for (a, b) in current.params().iter().zip(evolved.params()) {
            assert!((a - b).abs() < 0.5);
        }
    }

    #[test]
    fn test_queen_results_always_in_bounds() {
        let mut rng = rng();
        let current = random_genome(&mut rng);
        for generation in 0..20 {
            let survived = generation % 2 == 0;
            let nests = generation % 3;
            let next = next_queen_genome(&current, survived, nests, 0.8, &mut rng);
            assert!(next.in_bounds());
        }
    }
}
