use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};

use anyhow::{Context, Result};
use gridshift_algo::{mutate_topology, rng_from_config, BatchReport, NodeOutcome, RollbackReason};
use gridshift_cli::cli::MutateArgs;
use gridshift_cli::common::{detector, load_grid};
use gridshift_cli::config::resolve_mutation_config;
use gridshift_core::{graph_utils, io::save_topology, BusId};
use tabwriter::TabWriter;
use tracing::{info, warn};

pub fn handle(args: &MutateArgs) -> Result<()> {
    let config = resolve_mutation_config(args)?;
    let mut topology = load_grid(&args.grid)?;
    let lines_before = topology.line_count();
    info!(
        grid = %args.grid,
        buses = topology.bus_count(),
        lines = lines_before,
        ?config,
        "mutating topology"
    );

    let classifier = detector(args.detector);
    let mut rng = rng_from_config(&config);
    let report = mutate_topology(&mut topology, &config, classifier.as_ref(), &mut rng)
        .context("mutation pass refused")?;

    print_report(&report)?;
    println!(
        "Lines: {} -> {}, connected: {}",
        lines_before,
        topology.line_count(),
        graph_utils::is_connected(&topology)
    );

    if let Some(path) = &args.out {
        save_topology(path, &topology)
            .with_context(|| format!("writing topology to {}", path.display()))?;
        println!("Topology written to {}", path.display());
    }
    if let Some(path) = &args.dot {
        let relocated: BTreeSet<BusId> = report.committed().map(NodeOutcome::bus).collect();
        fs::write(path, graph_utils::export_graph(&topology, "dot", &relocated)?)?;
        println!("Graph exported to {}", path.display());
    }
    if let Some(path) = &args.report {
        fs::write(path, serde_json::to_string_pretty(&report)?)?;
        println!("Report written to {}", path.display());
    }

    let rolled_back = report.rolled_back().count();
    if rolled_back > 0 {
        warn!(rolled_back, "some buses kept their original lines");
    }
    if args.strict {
        report.into_result()?;
    }
    Ok(())
}

fn print_report(report: &BatchReport) -> Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "BUS\tSTATUS\tATTEMPTS\tNEIGHBORS")?;
    for outcome in &report.outcomes {
        let (status, attempts) = match outcome {
            NodeOutcome::Committed { attempts, .. } => ("committed", attempts.to_string()),
            NodeOutcome::RolledBack {
                reason: RollbackReason::AttemptsExhausted { attempts },
                ..
            } => ("rolled back", attempts.to_string()),
            NodeOutcome::RolledBack {
                reason: RollbackReason::BatchReverted,
                ..
            } => ("reverted", "-".to_string()),
        };
        writeln!(
            writer,
            "{}\t{}\t{}\t{}",
            outcome.bus(),
            status,
            attempts,
            join(outcome.neighbors())
        )?;
    }
    for bus in &report.skipped {
        writeln!(writer, "{bus}\tskipped\t-\t-")?;
    }
    writer.flush()?;
    Ok(())
}

fn join<'a>(buses: impl IntoIterator<Item = &'a BusId>) -> String {
    buses
        .into_iter()
        .map(|bus| bus.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
