//! Inspect command - Summarize a saved Q-table

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    cli::output::{format_number, print_kv, print_section, print_subsection, write_json},
    encoding::DefaultEncoder,
    q_learning::{QTable, SnapshotFormat, load_snapshot},
};

#[derive(Parser, Debug)]
#[command(about = "Summarize a saved Q-table")]
pub struct InspectArgs {
    /// Q-table snapshot (JSON or MessagePack)
    pub snapshot: PathBuf,

    /// Number of states to list, best first
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Write `{state: max_a Q(state, a)}` as JSON, e.g. for a heat map
    #[arg(long)]
    pub state_values: Option<PathBuf>,
}

pub fn execute(args: InspectArgs) -> Result<()> {
    let snapshot = load_snapshot(&args.snapshot)
        .with_context(|| format!("Failed to load Q-table {}", args.snapshot.display()))?;
    let table: QTable<String, String> =
        QTable::from_snapshot(&snapshot, DefaultEncoder, DefaultEncoder);
    let values = table.state_max_values();

    print_section("Q-Table");
    print_kv("File", &args.snapshot.display().to_string());
    print_kv(
        "Format",
        &SnapshotFormat::from_path(&args.snapshot).to_string(),
    );
    print_kv("States", &format_number(values.len()));
    print_kv("Entries", &format_number(table.len()));

    let mut ranked: Vec<(&String, f64)> = values.iter().map(|(k, v)| (k, *v)).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    if let (Some(best), Some(worst)) = (ranked.first(), ranked.last()) {
        print_kv("Best state value", &format!("{:.3}", best.1));
        print_kv("Worst state value", &format!("{:.3}", worst.1));
    }

    if args.top > 0 && !ranked.is_empty() {
        print_subsection(&format!("Top {} states", args.top.min(ranked.len())));
        for (state, value) in ranked.iter().take(args.top) {
            println!("  {value:>10.3}  {state}");
        }
    }

    if let Some(path) = &args.state_values {
        write_json(path, &values)?;
        println!("\n✓ State values saved to: {}", path.display());
    }

    Ok(())
}
