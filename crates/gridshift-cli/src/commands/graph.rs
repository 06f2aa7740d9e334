use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};

use anyhow::Result;
use gridshift_algo::CriticalNodeDetector;
use gridshift_cli::cli::GraphCommands;
use gridshift_cli::common::{bus_ranges, detector, load_grid};
use gridshift_core::graph_utils;
use tabwriter::TabWriter;
use tracing::{info, warn};

pub fn handle(command: &GraphCommands) -> Result<()> {
    match command {
        GraphCommands::Stats { grid } => {
            let topology = load_grid(grid)?;
            let stats = graph_utils::graph_stats(&topology);
            println!("Topology {grid}:");
            println!("  Buses    : {}", stats.bus_count);
            println!("  Lines    : {}", stats.line_count);
            println!("  Islands  : {}", stats.islands);
            println!("  Leaves   : {}", stats.leaves);
            println!(
                "  Degree   : {} min, {:.2} avg, {} max",
                stats.min_degree, stats.avg_degree, stats.max_degree
            );
            println!("  Density  : {:.4}", stats.density);
            println!("  Radial   : {}", stats.radial);
            Ok(())
        }
        GraphCommands::Islands { grid, emit } => {
            let topology = load_grid(grid)?;
            let analysis = graph_utils::find_islands(&topology);
            if analysis.islands.len() > 1 {
                warn!(islands = analysis.islands.len(), "topology is split");
            }
            for island in &analysis.islands {
                println!(
                    "Island {}: {} bus(es) [{}]",
                    island.island_id,
                    island.buses.len(),
                    bus_ranges(&island.buses)
                );
            }
            if *emit {
                let mut writer = TabWriter::new(io::stdout());
                writeln!(writer, "BUS\tISLAND\tDEGREE")?;
                for (bus, island_id) in &analysis.assignments {
                    writeln!(writer, "{}\t{}\t{}", bus, island_id, topology.degree(*bus))?;
                }
                writer.flush()?;
            }
            Ok(())
        }
        GraphCommands::Export { grid, format, out } => {
            let topology = load_grid(grid)?;
            let dot = graph_utils::export_graph(&topology, format, &BTreeSet::new())?;
            if let Some(path) = out {
                fs::write(path, &dot)?;
                println!("Graph exported to {}", path.display());
            } else {
                println!("{dot}");
            }
            Ok(())
        }
        GraphCommands::Critical {
            grid,
            detector: kind,
        } => {
            let topology = load_grid(grid)?;
            let classification = detector(*kind).classify(&topology);
            info!(
                buses = classification.len(),
                critical = classification.critical().len(),
                "classified buses"
            );
            let mut writer = TabWriter::new(io::stdout());
            writeln!(writer, "BUS\tDEGREE\tCRITICAL")?;
            for (bus, critical) in classification.iter() {
                writeln!(writer, "{}\t{}\t{}", bus, topology.degree(bus), critical)?;
            }
            writer.flush()?;
            Ok(())
        }
    }
}
