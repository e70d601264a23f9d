//! Rollout command - Follow a saved Q-table greedily

use std::{fmt::Debug, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use crate::{
    cli::{
        config::{EnvArgs, EnvKind},
        output::{
            GridRolloutFile, KnightRolloutFile, format_number, format_path, print_kv,
            print_section, write_json,
        },
    },
    encoding::DefaultEncoder,
    ports::DiscreteEnv,
    q_learning::{LearningConfig, QLearningAgent, QSnapshot, QTable, Rollout, load_snapshot},
};

#[derive(Parser, Debug)]
#[command(about = "Replay the greedy policy of a saved Q-table")]
pub struct RolloutArgs {
    #[command(flatten)]
    pub env: EnvArgs,

    /// Q-table snapshot produced by `train --output`
    #[arg(long, short = 's')]
    pub snapshot: PathBuf,

    /// Maximum number of steps to follow
    #[arg(long, default_value_t = 100)]
    pub max_steps: usize,

    /// Write the path as JSON
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn execute(args: RolloutArgs) -> Result<()> {
    let snapshot = load_snapshot(&args.snapshot)
        .with_context(|| format!("Failed to load Q-table {}", args.snapshot.display()))?;

    match args.env.env {
        EnvKind::Grid => {
            let grid = args.env.grid()?;
            print_section("Greedy Rollout: Grid World");
            let rollout = replay(grid.clone(), &snapshot, args.max_steps)?;
            print_rollout(&rollout.path, &rollout);
            if let Some(path) = &args.output {
                write_json(path, &GridRolloutFile::new(&grid, &rollout))?;
                println!("\n✓ Rollout saved to: {}", path.display());
            }
        }
        EnvKind::Knight => {
            let tour = args.env.knight()?;
            print_section("Greedy Rollout: Knight's Tour");
            let rollout = replay(tour.clone(), &snapshot, args.max_steps)?;
            let file = KnightRolloutFile::new(&tour, &rollout);
            print_rollout(&file.path, &rollout);
            print_kv("Complete", if file.complete { "yes" } else { "no" });
            if let Some(path) = &args.output {
                write_json(path, &file)?;
                println!("\n✓ Rollout saved to: {}", path.display());
            }
        }
    }

    Ok(())
}

/// Roll out the greedy policy of `snapshot` in `env`
pub fn replay<E>(env: E, snapshot: &QSnapshot, max_steps: usize) -> Result<Rollout<E::State>>
where
    E: DiscreteEnv,
    E::State: Serialize + Debug + Clone,
    E::Action: Serialize + Debug,
{
    let q_table = QTable::from_snapshot(snapshot, DefaultEncoder, DefaultEncoder);
    let mut agent = QLearningAgent::with_q_table(env, (), LearningConfig::default(), q_table);
    Ok(agent.roll_out(None, Some(max_steps))?)
}

fn print_rollout<T: std::fmt::Display, S>(cells: &[T], rollout: &Rollout<S>) {
    print_kv("Steps", &format_number(rollout.steps()));
    print_kv("Reward", &format!("{:.3}", rollout.total_reward));
    println!("  Path: {}", format_path(cells));
}
