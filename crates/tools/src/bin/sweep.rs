use std::collections::{HashSet, VecDeque};

use anyhow::Result;
use clap::Parser;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use roadmap_core::{DetailMap, GenerateError, MapRestriction, generate};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Seed used to derive the sweep's generation seeds
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// Number of maps to generate and check
    #[arg(short, long, default_value_t = 500)]
    count: usize,
}

fn check_map(map: &DetailMap, seed: u64) {
    let mut seen = HashSet::from([map.start]);
    let mut frontier = VecDeque::from([map.start]);
    while let Some(current) = frontier.pop_front() {
        for &neighbor in &map.nodes[current].neighbors {
            if seen.insert(neighbor) {
                frontier.push_back(neighbor);
            }
        }
    }
    assert_eq!(seen.len(), map.nodes.len(), "Invariant failed: stranded nodes on seed {seed}");

    for (index, node) in map.nodes.iter().enumerate() {
        assert!(node.neighbors.len() <= 4, "Invariant failed: degree > 4 on seed {seed}");
        for &neighbor in &node.neighbors {
            assert!(
                map.nodes[neighbor].neighbors.contains(&index),
                "Invariant failed: asymmetric edge on seed {seed}"
            );
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Sweeping {} seeds derived from {}...", args.count, args.seed);
    let restriction = MapRestriction::default();
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    let mut generated = 0_usize;
    let mut total_nodes = 0_usize;
    for _ in 0..args.count {
        let seed = rng.next_u64();
        let map = match generate(seed, &restriction) {
            Ok(map) => map,
            Err(GenerateError::NoEligibleCandidate(what)) => {
                println!("Seed {seed} exhausted candidates for {what}, skipping");
                continue;
            }
            Err(error) => {
                anyhow::bail!("Generation failed on seed {}: {:?}", seed, error);
            }
        };
        check_map(&map, seed);

        let again = generate(seed, &restriction)
            .map_err(|e| anyhow::anyhow!("Regeneration failed: {:?}", e))?;
        assert_eq!(
            map.fingerprint(),
            again.fingerprint(),
            "Invariant failed: unstable fingerprint on seed {seed}"
        );

        generated += 1;
        total_nodes += map.nodes.len();
    }

    println!(
        "Sweep completed: {} maps, {:.1} nodes on average.",
        generated,
        total_nodes as f32 / generated.max(1) as f32
    );
    Ok(())
}
