//! Train command - Learn a Q-table in one of the bundled environments

use std::{fmt::Debug, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use crate::{
    app::RunConfig,
    cli::{
        config::{EnvArgs, EnvKind, HyperArgs},
        output::{
            GridRolloutFile, KnightRolloutFile, format_number, format_path, print_kv,
            print_section, print_subsection, write_json,
        },
    },
    pipeline::{JsonlObserver, MetricsObserver, MetricsSummary, ObserverSet, ProgressObserver},
    ports::DiscreteEnv,
    q_learning::{QLearningAgent, QSnapshot, Rollout, SnapshotFormat, TrainingSummary},
};

/// Step cap for the post-training rollout when episodes are unbounded
const UNBOUNDED_ROLLOUT_CAP: usize = 1_000;

#[derive(Parser, Debug)]
#[command(about = "Train a tabular Q-learning agent")]
pub struct TrainArgs {
    #[command(flatten)]
    pub env: EnvArgs,

    #[command(flatten)]
    pub hyper: HyperArgs,

    /// Save the learned Q-table (format from extension unless --format is given)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Snapshot format override: json or msgpack
    #[arg(long, value_parser = parse_format)]
    pub format: Option<SnapshotFormat>,

    /// Write the greedy rollout after training as JSON
    #[arg(long)]
    pub rollout: Option<PathBuf>,

    /// Write one JSON line per episode
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Write training and metrics summaries as JSON
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Save the resolved run configuration as JSON
    #[arg(long)]
    pub save_config: Option<PathBuf>,

    /// Show progress bar during training
    #[arg(long, default_value_t = false)]
    pub progress: bool,
}

fn parse_format(raw: &str) -> std::result::Result<SnapshotFormat, String> {
    raw.parse().map_err(|e: crate::Error| e.to_string())
}

#[derive(Debug, Serialize)]
struct TrainingSummaryFile<'a> {
    training: &'a TrainingSummary,
    metrics: &'a MetricsSummary,
    config: &'a RunConfig,
    rollout_steps: usize,
    rollout_reward: f64,
}

struct Outcome<S> {
    summary: TrainingSummary,
    metrics: MetricsSummary,
    snapshot: QSnapshot,
    rollout: Rollout<S>,
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let config = args.hyper.resolve()?;

    if let Some(path) = &args.save_config {
        config
            .save(path)
            .with_context(|| format!("Failed to save run config {}", path.display()))?;
    }

    match args.env.env {
        EnvKind::Grid => {
            let grid = args.env.grid()?;
            print_section("Q-Learning: Grid World");
            print_kv("Grid", &format!("{}x{}", grid.width(), grid.height()));
            print_kv("Start", &grid.start().to_string());
            print_kv("Goal", &grid.goal().to_string());
            print_config(&config, args.env.shaping);

            let outcome = train(grid.clone(), &config, &args)?;
            report(&outcome, &config, &args)?;
            println!("  Path: {}", format_path(&outcome.rollout.path));

            if let Some(path) = &args.rollout {
                write_json(path, &GridRolloutFile::new(&grid, &outcome.rollout))?;
                println!("\n✓ Rollout saved to: {}", path.display());
            }
        }
        EnvKind::Knight => {
            let tour = args.env.knight()?;
            print_section("Q-Learning: Knight's Tour");
            print_kv("Board", &format!("{0}x{0}", tour.size()));
            print_kv("Start", &tour.start().to_string());
            print_config(&config, args.env.shaping);

            let outcome = train(tour.clone(), &config, &args)?;
            report(&outcome, &config, &args)?;
            let file = KnightRolloutFile::new(&tour, &outcome.rollout);
            print_kv(
                "Squares visited",
                &format!("{}/{}", file.visited_squares, file.total_squares),
            );
            println!("  Path: {}", format_path(&file.path));

            if let Some(path) = &args.rollout {
                write_json(path, &file)?;
                println!("\n✓ Rollout saved to: {}", path.display());
            }
        }
    }

    Ok(())
}

fn train<E>(env: E, config: &RunConfig, args: &TrainArgs) -> Result<Outcome<E::State>>
where
    E: DiscreteEnv,
    E::State: Serialize + Debug + Clone,
    E::Action: Serialize + Debug,
{
    let mut agent = QLearningAgent::new(env, config.policy(), config.learning);

    let mut metrics = MetricsObserver::new();
    let mut observers = ObserverSet::new().with_observer(&mut metrics);
    if args.progress {
        observers.push(ProgressObserver::new());
    }
    if let Some(path) = &args.observations {
        let jsonl = JsonlObserver::new(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        observers.push(jsonl);
    }

    let summary = agent.train(
        config.episodes,
        config.max_steps_per_episode,
        &mut observers,
    )?;
    drop(observers);

    let rollout_cap = config
        .max_steps_per_episode
        .unwrap_or(UNBOUNDED_ROLLOUT_CAP);
    let rollout = agent.roll_out(None, Some(rollout_cap))?;

    Ok(Outcome {
        summary,
        metrics: metrics.summary(),
        snapshot: agent.export_snapshot(),
        rollout,
    })
}

fn print_config(config: &RunConfig, shaping: bool) {
    print_kv("Episodes", &format_number(config.episodes));
    print_kv(
        "Max steps",
        &config
            .max_steps_per_episode
            .map_or_else(|| "unbounded".to_string(), format_number),
    );
    print_kv(
        "Learning rate",
        &format!("{}", config.learning.learning_rate()),
    );
    print_kv(
        "Discount",
        &format!("{}", config.learning.discount_factor()),
    );
    print_kv(
        "Epsilon",
        &format!(
            "{:.3} → {:.3}",
            config.epsilon.epsilon(0),
            config.epsilon.epsilon(config.episodes)
        ),
    );
    print_kv("Shaping", if shaping { "on" } else { "off" });
    if let Some(seed) = config.seed {
        print_kv("Seed", &seed.to_string());
    }
}

fn report<S>(outcome: &Outcome<S>, config: &RunConfig, args: &TrainArgs) -> Result<()> {
    let summary = &outcome.summary;
    let metrics = &outcome.metrics;

    print_subsection("Training");
    print_kv("Episodes", &format_number(summary.episodes));
    print_kv("Total steps", &format_number(summary.total_steps));
    print_kv(
        "Terminated",
        &format!(
            "{} ({:.1}%)",
            format_number(summary.terminated_episodes),
            metrics.termination_rate * 100.0
        ),
    );
    print_kv("Mean reward", &format!("{:.3}", summary.mean_reward));
    print_kv(
        "Last 100 mean",
        &format!("{:.3}", metrics.last_100_mean_reward),
    );
    print_kv("Mean |ΔQ|", &format!("{:.4}", metrics.mean_abs_update));
    print_kv("States learned", &format_number(outcome.snapshot.len()));

    print_subsection("Greedy rollout");
    print_kv("Steps", &format_number(outcome.rollout.steps()));
    print_kv("Reward", &format!("{:.3}", outcome.rollout.total_reward));

    if let Some(path) = &args.output {
        let format = args
            .format
            .unwrap_or_else(|| SnapshotFormat::from_path(path));
        format
            .repository()
            .save(&outcome.snapshot, path)
            .with_context(|| format!("Failed to save Q-table {}", path.display()))?;
        println!("\n✓ Q-table saved to: {} ({format})", path.display());
    }

    if let Some(path) = &args.summary {
        let file = TrainingSummaryFile {
            training: summary,
            metrics,
            config,
            rollout_steps: outcome.rollout.steps(),
            rollout_reward: outcome.rollout.total_reward,
        };
        write_json(path, &file)?;
        println!("✓ Summary saved to: {}", path.display());
    }

    Ok(())
}
