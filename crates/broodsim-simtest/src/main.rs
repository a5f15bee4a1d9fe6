//! Broodsim Headless Validation Harness
//!
//! Exercises the pure colony logic and a full multi-generation simulation
//! without any rendering or frontend. Runs entirely in-process.
//!
//! Usage:
//!   cargo run -p broodsim-simtest
//!   cargo run -p broodsim-simtest -- --verbose

use broodsim_core::agents::Vitals;
use broodsim_core::{SimConfig, SimulationEngine, VoxelTerrain};
use broodsim_logic::decision::{heuristic_override, Action, Feasibility, HeuristicInput};
use broodsim_logic::fitness::{worker_fitness, AgentTally};
use broodsim_logic::genome::Genome;
use broodsim_logic::network::{forward, GENOME_LEN, INPUT_SIZE};
use broodsim_logic::sampling::{masked_softmax_sample, ACTION_TEMPERATURE};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ── Scenario config (same JSON shape any host would supply) ─────────────
const SCENARIO_JSON: &str = r#"{
    "seed": 99,
    "worker_count": 8,
    "evaluation_steps": 150,
    "tick_seconds": 0.05,
    "queen_max_health": 48.0,
    "worker_max_health": 24.0,
    "health_drain": 0.02,
    "mulch_restore": 6.0,
    "share_amount": 3.0,
    "nest_cost_fraction": 0.3333333,
    "mutation_strength": 0.6,
    "elite_count": 3,
    "reset_terrain_per_generation": true,
    "world_size_x": 16,
    "world_size_y": 10,
    "world_size_z": 16
}"#;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail: detail.into(),
    }
}

fn main() {
    env_logger::init();
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Broodsim Validation Harness ===\n");

    let mut results = Vec::new();

    // 1. Policy network determinism
    results.extend(validate_network());

    // 2. Masked sampling behavior
    results.extend(validate_sampling());

    // 3. Heuristic override sweep
    results.extend(validate_heuristics());

    // 4. Fitness formulas
    results.extend(validate_fitness());

    // 5. Full simulation run
    results.extend(validate_simulation(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Policy network ───────────────────────────────────────────────────

fn validate_network() -> Vec<TestResult> {
    println!("--- Policy Network ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(1);

    let params: Vec<f32> = (0..GENOME_LEN).map(|_| rng.gen_range(-1.0..=1.0)).collect();
    let genome = match Genome::from_params(params) {
        Some(g) => g,
        None => {
            results.push(check("network_genome_len", false, "length mismatch"));
            return results;
        }
    };
    results.push(check(
        "network_genome_len",
        true,
        format!("{} parameters", GENOME_LEN),
    ));

    let mut obs = [0.0_f32; INPUT_SIZE];
    for (i, o) in obs.iter_mut().enumerate() {
        *o = (i as f32 * 0.13).sin();
    }
    let a = forward(&genome, &obs);
    let b = forward(&genome, &obs);
    results.push(check(
        "network_purity",
        a == b,
        "two passes over identical inputs match",
    ));

    let finite = a.iter().all(|v| v.is_finite());
    results.push(check("network_finite_logits", finite, format!("{:?}", &a[..3])));

    results
}

// ── 2. Masked sampling ──────────────────────────────────────────────────

fn validate_sampling() -> Vec<TestResult> {
    println!("--- Masked Sampling ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(2);

    let logits = [1.5, -0.5, 0.2, 3.0, -2.0, 0.0];
    let mask = [true, false, true, false, true, true];

    let mut all_feasible = true;
    for _ in 0..2000 {
        let draw = rng.gen::<f32>();
        match masked_softmax_sample(&logits, &mask, ACTION_TEMPERATURE, draw) {
            Some(i) if mask[i] => {}
            _ => {
                all_feasible = false;
                break;
            }
        }
    }
    results.push(check(
        "sampling_feasible_only",
        all_feasible,
        "2000 draws never picked a masked index",
    ));

    let empty = masked_softmax_sample(&logits, &[false; 6], ACTION_TEMPERATURE, 0.4);
    results.push(check(
        "sampling_empty_mask_fallback",
        empty.is_none(),
        "all-false mask yields the documented default",
    ));

    results
}

// ── 3. Heuristic overrides ──────────────────────────────────────────────

fn validate_heuristics() -> Vec<TestResult> {
    println!("--- Heuristic Overrides ---");
    let mut results = Vec::new();

    let feasibility = Feasibility {
        move_dirs: [true; 4],
        dig: true,
        eat: true,
        share: true,
        build: true,
    };

    // Queen at 48/48 with a 16-unit nest cost clears the 1.1x margin.
    let queen = HeuristicInput {
        is_queen: true,
        health: 48.0,
        max_health: 48.0,
        nest_cost: 16.0,
        queen_needs_care: false,
    };
    results.push(check(
        "queen_builds_when_affordable",
        heuristic_override(&queen, &feasibility) == Some(Action::BuildNest),
        "48 >= 1.1 * 16",
    ));

    let hungry_queen = HeuristicInput {
        health: 17.0,
        ..queen
    };
    results.push(check(
        "queen_eats_below_threshold",
        heuristic_override(&hungry_queen, &feasibility) == Some(Action::Eat),
        "ratio 0.35 < 0.7 and cost margin missed",
    ));

    let worker = HeuristicInput {
        is_queen: false,
        health: 20.0,
        max_health: 24.0,
        nest_cost: 16.0,
        queen_needs_care: true,
    };
    results.push(check(
        "worker_shares_with_queen",
        heuristic_override(&worker, &feasibility) == Some(Action::ShareHealth),
        "co-located queen below full health",
    ));

    let content_worker = HeuristicInput {
        queen_needs_care: false,
        ..worker
    };
    results.push(check(
        "healthy_worker_defers_to_policy",
        heuristic_override(&content_worker, &feasibility).is_none(),
        "ratio 0.83 >= 0.62, no queen in need",
    ));

    results
}

// ── 4. Fitness ──────────────────────────────────────────────────────────

fn validate_fitness() -> Vec<TestResult> {
    println!("--- Fitness ---");
    let mut results = Vec::new();

    // An inert worker is scored on survival alone.
    let idle = AgentTally {
        steps_alive: 150,
        ..Default::default()
    };
    let fitness = worker_fitness(&idle, 0);
    results.push(check(
        "idle_worker_survival_only",
        (fitness - 0.05 * 150.0).abs() < 1e-4,
        format!("fitness {:.2}", fitness),
    ));

    let digger = AgentTally {
        steps_alive: 0,
        blocks_dug: 10,
        ..Default::default()
    };
    results.push(check(
        "digging_penalized",
        worker_fitness(&digger, 0) < 0.0,
        "pure excavation scores negative",
    ));

    results
}

// ── 5. Full simulation ──────────────────────────────────────────────────

fn validate_simulation(verbose: bool) -> Vec<TestResult> {
    println!("--- Full Simulation ---");
    let mut results = Vec::new();

    let config = match SimConfig::from_json_str(SCENARIO_JSON) {
        Ok(c) => c,
        Err(e) => {
            results.push(check("scenario_config", false, format!("{}", e)));
            return results;
        }
    };
    results.push(check("scenario_config", true, "scenario JSON parsed and validated"));

    let build = |config: &SimConfig| {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let terrain = VoxelTerrain::generate(
            config.world_size_x,
            config.world_size_y,
            config.world_size_z,
            &mut rng,
        );
        SimulationEngine::new(terrain, config.clone())
    };

    let mut engine = match build(&config) {
        Ok(e) => e,
        Err(e) => {
            results.push(check("engine_construction", false, format!("{}", e)));
            return results;
        }
    };
    results.push(check("engine_construction", true, "engine accepted the scenario"));

    let mut health_ok = true;
    let mut queen_ok = true;
    for _ in 0..1000 {
        engine.tick();
        for (_, (vitals,)) in engine.world().query::<(&Vitals,)>().iter() {
            if vitals.health < 0.0 || vitals.health > vitals.max_health {
                health_ok = false;
            }
            if vitals.health == 0.0 && vitals.alive {
                health_ok = false;
            }
        }
        if engine.queen_count() > 1 {
            queen_ok = false;
        }
    }
    results.push(check(
        "health_clamped_all_ticks",
        health_ok,
        "health within [0, max] for 1000 ticks",
    ));
    results.push(check(
        "at_most_one_queen",
        queen_ok,
        "queen invariant held for 1000 ticks",
    ));

    let readout = engine.readout();
    results.push(check(
        "generations_progress",
        readout.generation >= 1,
        format!("{} generations completed", readout.generation),
    ));
    results.push(check(
        "worker_pool_stable",
        engine.worker_pool().len() == config.worker_count,
        format!("{} genomes in pool", engine.worker_pool().len()),
    ));

    let clamped = engine.queen_genome().in_bounds()
        && engine.worker_pool().iter().all(Genome::in_bounds);
    results.push(check(
        "genomes_clamped",
        clamped,
        "all evolved parameters within [-4, 4]",
    ));

    // Determinism: replay the same scenario and compare.
    let mut replay = match build(&config) {
        Ok(e) => e,
        Err(e) => {
            results.push(check("determinism_replay", false, format!("{}", e)));
            return results;
        }
    };
    for _ in 0..1000 {
        replay.tick();
    }
    let identical = replay.queen_genome() == engine.queen_genome()
        && replay.worker_pool() == engine.worker_pool()
        && replay.readout().step == readout.step;
    results.push(check(
        "determinism_replay",
        identical,
        "same seed, same 1000-tick outcome",
    ));

    if verbose {
        if let Some(summary) = readout.last_summary {
            println!(
                "  last generation: best {:.2}, mean {:.2}, nests {}, survivors {}",
                summary.best_fitness, summary.mean_fitness, summary.nests_built,
                summary.survivors
            );
        }
        println!(
            "  nest blocks standing: {}",
            engine.terrain().count_kind(broodsim_logic::terrain::CellKind::Nest)
        );
    }

    results
}
