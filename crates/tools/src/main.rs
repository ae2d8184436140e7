use anyhow::{Context, Result};
use clap::Parser;
use roadmap_core::{DetailMap, MapRestriction, generate};
use std::fs;
use std::path::Path;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Seed for the generator
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// Path to a restriction JSON file; defaults are used when omitted
    #[arg(short, long)]
    restriction: Option<String>,
    /// Print the full map as JSON instead of a summary
    #[arg(short, long)]
    dump: bool,
}

fn load_restriction(path: &Path) -> Result<MapRestriction> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read restriction file: {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| "Failed to deserialize restriction JSON")
}

fn summarize(map: &DetailMap) {
    println!("Map '{}' generated.", map.name);
    println!("Nodes: {} ({} edges)", map.nodes.len(), map.edge_count());
    println!("Start/end indices: {} / {}", map.start, map.end);
    let instances: usize = map.decorations.iter().map(|set| set.instances.len()).sum();
    println!("Decorations: {} sets, {} instances", map.decorations.len(), instances);
    println!("Fingerprint: {:016x}", map.fingerprint());
}

fn main() -> Result<()> {
    let args = Args::parse();

    let restriction = match &args.restriction {
        Some(path) => load_restriction(Path::new(path))?,
        None => MapRestriction::default(),
    };

    let map = generate(args.seed, &restriction)
        .map_err(|e| anyhow::anyhow!("Generation failed: {:?}", e))?;

    if args.dump {
        println!("{}", serde_json::to_string_pretty(&map)?);
    } else {
        summarize(&map);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn restriction_files_round_trip_through_the_loader() {
        let restriction = MapRestriction {
            name: "from-disk".to_string(),
            min_nodes: 6,
            max_nodes: 9,
            ..MapRestriction::default()
        };
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        let json = serde_json::to_string(&restriction).expect("restriction serializes");
        file.write_all(json.as_bytes()).expect("write succeeds");

        let loaded = load_restriction(file.path()).expect("loader accepts valid JSON");
        assert_eq!(loaded, restriction);
    }

    #[test]
    fn loader_rejects_malformed_files() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"not json").expect("write succeeds");
        assert!(load_restriction(file.path()).is_err());
    }
}
