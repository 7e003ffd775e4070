use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

use log::info;

use graph_comm::ProcessGroup;
use graph_part::input::{load_graph_part, Manifest};
use graph_part::{BalancedSlicePart, Part, TrivialSlicePart};
use graph_scc::{scc, SccConfig};

fn main() {
    env_logger::init();

    let args = match cli::create() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("{}", cli::USAGE);
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn run(args: cli::AppArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.ranks == 0 {
        return Err("--ranks must be at least 1".into());
    }
    let manifest = Manifest::load(&args.manifest_file)?;
    info!(
        "Benchmarking graph '{}' ({} vertices, {} edges) on {} ranks",
        manifest.graph_name, manifest.node_count, manifest.edge_count, args.ranks
    );

    let config = SccConfig::new(args.rotate, args.trim_tarjan);
    let report = if args.trivial_slice {
        execute(&manifest, args.ranks, config, |rank, ranks| {
            TrivialSlicePart::new(manifest.node_count as usize, rank, ranks)
        })?
    } else {
        execute(&manifest, args.ranks, config, |rank, ranks| {
            BalancedSlicePart::new(manifest.node_count as usize, rank, ranks)
        })?
    };

    std::fs::write(&args.output_file, serde_json::to_string_pretty(&report)?)?;
    info!("Wrote report to {:?}", args.output_file);
    Ok(())
}

fn execute<P: Part + 'static>(
    manifest: &Manifest,
    ranks: usize,
    config: SccConfig,
    make_part: impl Fn(usize, usize) -> P,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    // load every slice up front so I/O errors surface before the first
    // collective call
    let load_start = Instant::now();
    let graphs = (0..ranks)
        .map(|rank| load_graph_part::<u64, u64, P>(manifest, make_part(rank, ranks)))
        .collect::<Result<Vec<_>, _>>()?;
    let load_seconds = load_start.elapsed().as_secs_f64();

    let run_start = Instant::now();
    let comms = ProcessGroup::new(ranks);
    let results = std::thread::scope(|scope| {
        let handles = comms
            .into_iter()
            .zip(graphs)
            .map(|(comm, graph)| {
                scope.spawn(move || {
                    let start = Instant::now();
                    let local_n = graph.part().local_n();
                    let local_m = graph.csr_out().edge_count();
                    let mut scc_id = vec![u64::MAX; local_n];
                    scc(&comm, &graph, &mut scc_id, config);
                    (start.elapsed().as_secs_f64(), local_n, local_m, scc_id)
                })
            })
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("rank panicked"))
            .collect::<Vec<_>>()
    });
    let total_seconds = run_start.elapsed().as_secs_f64();

    let mut components = HashSet::new();
    let mut report = serde_json::json!({
        "graph": manifest.graph_name,
        "node_count": manifest.node_count,
        "edge_count": manifest.edge_count,
        "ranks": ranks,
        "load_seconds": load_seconds,
        "scc_seconds": total_seconds,
    });
    for (rank, (seconds, local_n, local_m, scc_id)) in results.into_iter().enumerate() {
        components.extend(scc_id.iter().copied());
        report[format!("rank_{}", rank)] = serde_json::json!({
            "seconds": seconds,
            "local_n": local_n,
            "local_m": local_m,
        });
    }
    report["component_count"] = serde_json::json!(components.len());
    info!(
        "Found {} components in {:.6}s",
        components.len(),
        total_seconds
    );
    Ok(report)
}

mod cli {
    use super::PathBuf;
    use pico_args::Arguments;

    pub(crate) const USAGE: &str = "\
Usage: bench --manifest_file <path> --output_file <path>
             [--ranks <count>] [--trivial_slice]
             [--trim_tarjan] [--rotate]";

    #[derive(Debug)]
    pub(crate) struct AppArgs {
        pub(crate) manifest_file: PathBuf,
        pub(crate) output_file: PathBuf,
        pub(crate) ranks: usize,
        pub(crate) trivial_slice: bool,
        pub(crate) trim_tarjan: bool,
        pub(crate) rotate: bool,
    }

    pub(crate) fn create() -> Result<AppArgs, pico_args::Error> {
        let mut args = Arguments::from_env();

        if args.contains("--kagen_option_string") {
            return Err(pico_args::Error::ArgumentParsingFailed {
                cause: "generated graphs are not supported by this build, \
                        pass --manifest_file instead"
                    .into(),
            });
        }

        let parsed = AppArgs {
            manifest_file: args.value_from_str("--manifest_file")?,
            output_file: args.value_from_str("--output_file")?,
            ranks: args.opt_value_from_str("--ranks")?.unwrap_or(1),
            trivial_slice: args.contains("--trivial_slice"),
            trim_tarjan: args.contains("--trim_tarjan"),
            rotate: args.contains("--rotate"),
        };

        let remaining = args.finish();
        if !remaining.is_empty() {
            return Err(pico_args::Error::ArgumentParsingFailed {
                cause: format!("unrecognized arguments: {:?}", remaining),
            });
        }

        Ok(parsed)
    }
}
