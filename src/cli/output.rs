//! Output formatting and result files for CLI

use std::{
    fmt::Display,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::{
    envs::{GridWorld, KnightsTour, Position, Square, TourState},
    q_learning::Rollout,
};

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Join path cells with arrows
pub fn format_path<T: Display>(path: &[T]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Pretty-print `value` as JSON to `path`
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(())
}

/// Greedy grid path as written by `--rollout`
#[derive(Debug, Serialize)]
pub struct GridRolloutFile {
    pub width: usize,
    pub height: usize,
    pub start: Position,
    pub goal: Position,
    pub path: Vec<Position>,
    pub total_reward: f64,
}

impl GridRolloutFile {
    pub fn new(grid: &GridWorld, rollout: &Rollout<Position>) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            start: grid.start(),
            goal: grid.goal(),
            path: rollout.path.clone(),
            total_reward: rollout.total_reward,
        }
    }
}

/// Greedy knight's tour in the board/start/path layout the tour viewer reads
///
/// The viewer also reads `visited_squares` and `total_squares` for its
/// coverage caption.
#[derive(Debug, Serialize)]
pub struct KnightRolloutFile {
    pub board_size: usize,
    pub start: Square,
    pub path: Vec<Square>,
    pub visited_squares: usize,
    pub total_squares: usize,
    pub complete: bool,
    pub total_reward: f64,
}

impl KnightRolloutFile {
    pub fn new(tour: &KnightsTour, rollout: &Rollout<TourState>) -> Self {
        let last = rollout.path.last();
        Self {
            board_size: tour.size(),
            start: tour.start(),
            path: rollout.path.iter().map(|state| state.position).collect(),
            visited_squares: last.map_or(0, |state| state.visited_count() as usize),
            total_squares: tour.size() * tour.size(),
            complete: last.is_some_and(|state| tour.is_complete(state)),
            total_reward: rollout.total_reward,
        }
    }
}
