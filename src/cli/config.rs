//! Shared argument groups for CLI commands

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Args, ValueEnum};

use crate::{
    app::RunConfig,
    envs::{GridWorld, KnightsTour, Position, Square},
    q_learning::{EpsilonSchedule, LearningConfig},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EnvKind {
    /// Deterministic grid world (step -1, goal +10)
    Grid,
    /// Knight's tour on an N×N board
    Knight,
}

/// Environment selection and geometry
#[derive(Args, Debug, Clone)]
pub struct EnvArgs {
    /// Environment to learn in
    #[arg(value_enum)]
    pub env: EnvKind,

    /// Grid width (grid only)
    #[arg(long, default_value_t = 3)]
    pub width: usize,

    /// Grid height (grid only)
    #[arg(long, default_value_t = 3)]
    pub height: usize,

    /// Board edge length (knight only, 1-8)
    #[arg(long, default_value_t = 5)]
    pub board_size: usize,

    /// Start cell as `x,y`
    #[arg(long, default_value = "0,0")]
    pub start: String,

    /// Goal cell as `x,y` (grid only; defaults to the far corner)
    #[arg(long)]
    pub goal: Option<String>,

    /// Enable potential-based reward shaping
    #[arg(long, default_value_t = false)]
    pub shaping: bool,
}

impl EnvArgs {
    pub fn grid(&self) -> Result<GridWorld> {
        let (sx, sy) = parse_cell(&self.start, "--start")?;
        let goal = match &self.goal {
            Some(raw) => parse_cell(raw, "--goal")?,
            None => (
                self.width.saturating_sub(1),
                self.height.saturating_sub(1),
            ),
        };
        let grid = GridWorld::new(
            self.width,
            self.height,
            Position::new(sx, sy),
            Position::new(goal.0, goal.1),
        )?;
        Ok(if self.shaping {
            grid.with_distance_potential()
        } else {
            grid
        })
    }

    pub fn knight(&self) -> Result<KnightsTour> {
        let (sx, sy) = parse_cell(&self.start, "--start")?;
        let tour = KnightsTour::new(self.board_size, Square::new(sx, sy))?;
        Ok(if self.shaping {
            tour.with_visit_potential()
        } else {
            tour
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScheduleKind {
    Linear,
    Exponential,
}

/// Training hyperparameters; each flag overrides the `--config` file
#[derive(Args, Debug, Clone, Default)]
pub struct HyperArgs {
    /// JSON run configuration to start from
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of training episodes
    #[arg(long, short = 'e')]
    pub episodes: Option<usize>,

    /// Step budget per episode (0 = unbounded)
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Learning rate α (0, 1]
    #[arg(long)]
    pub learning_rate: Option<f64>,

    /// Discount factor γ [0, 1)
    #[arg(long)]
    pub discount: Option<f64>,

    /// Epsilon schedule shape
    #[arg(long, value_enum)]
    pub schedule: Option<ScheduleKind>,

    /// Initial exploration rate
    #[arg(long)]
    pub epsilon_start: Option<f64>,

    /// Final exploration rate
    #[arg(long)]
    pub epsilon_end: Option<f64>,

    /// Linear: decrease per episode. Exponential: decay rate.
    /// Defaults to hitting the final rate on the last episode (linear)
    /// or 5/episodes (exponential).
    #[arg(long)]
    pub epsilon_decay: Option<f64>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,
}

impl HyperArgs {
    /// Merge the config file (if any) with flag overrides and validate
    pub fn resolve(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load(path)
                .with_context(|| format!("Failed to load run config {}", path.display()))?,
            None => RunConfig::default(),
        };
        // A schedule derived from the episode count follows that count when overridden
        let derived_epsilon = config.epsilon == RunConfig::default_epsilon(config.episodes);

        if let Some(episodes) = self.episodes {
            config.episodes = episodes;
        }
        if let Some(max_steps) = self.max_steps {
            config.max_steps_per_episode = (max_steps > 0).then_some(max_steps);
        }
        if self.learning_rate.is_some() || self.discount.is_some() {
            config.learning = LearningConfig::new(
                self.learning_rate
                    .unwrap_or(config.learning.learning_rate()),
                self.discount.unwrap_or(config.learning.discount_factor()),
            )?;
        }
        if self.config.is_none()
            || derived_epsilon
            || self.schedule.is_some()
            || self.epsilon_start.is_some()
            || self.epsilon_end.is_some()
            || self.epsilon_decay.is_some()
        {
            config.epsilon = self.schedule_for(config.episodes)?;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }

        config.validate()?;
        Ok(config)
    }

    fn schedule_for(&self, episodes: usize) -> Result<EpsilonSchedule> {
        let start = self.epsilon_start.unwrap_or(1.0);
        let end = self.epsilon_end.unwrap_or(0.01);
        let episodes = episodes.max(1);
        let schedule = match self.schedule.unwrap_or(ScheduleKind::Linear) {
            ScheduleKind::Linear => match self.epsilon_decay {
                Some(decay) => EpsilonSchedule::linear(start, end, decay)?,
                None => EpsilonSchedule::linear_over(start, end, episodes)?,
            },
            ScheduleKind::Exponential => {
                let rate = self.epsilon_decay.unwrap_or(5.0 / episodes as f64);
                EpsilonSchedule::exponential(start, end, rate)?
            }
        };
        Ok(schedule)
    }
}

/// Parse `x,y` into a cell
pub fn parse_cell(raw: &str, flag: &str) -> Result<(usize, usize)> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| anyhow!("Invalid value '{raw}' for {flag} (expected 'x,y')"))?;
    let x = x
        .trim()
        .parse()
        .with_context(|| format!("Invalid x coordinate in {flag}: '{raw}'"))?;
    let y = y
        .trim()
        .parse()
        .with_context(|| format!("Invalid y coordinate in {flag}: '{raw}'"))?;
    Ok((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell() {
        assert_eq!(parse_cell("2, 3", "--start").unwrap(), (2, 3));
        assert!(parse_cell("2;3", "--start").is_err());
        assert!(parse_cell("a,3", "--start").is_err());
    }

    #[test]
    fn test_resolve_defaults_follow_episode_count() {
        let args = HyperArgs {
            episodes: Some(200),
            seed: Some(1),
            ..HyperArgs::default()
        };
        let config = args.resolve().unwrap();
        assert_eq!(config.episodes, 200);
        assert_eq!(config.seed, Some(1));
        assert!((config.epsilon.epsilon(200) - 0.01).abs() < 1e-9);
    }

    #[test]
    fn test_resolve_zero_max_steps_means_unbounded() {
        let args = HyperArgs {
            max_steps: Some(0),
            ..HyperArgs::default()
        };
        assert_eq!(args.resolve().unwrap().max_steps_per_episode, None);
    }

    #[test]
    fn test_resolve_rejects_bad_learning_rate() {
        let args = HyperArgs {
            learning_rate: Some(2.0),
            ..HyperArgs::default()
        };
        assert!(args.resolve().is_err());
    }

    #[test]
    fn test_episode_override_rescales_a_derived_schedule() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(&path, r#"{"episodes": 10, "seed": 4}"#).unwrap();

        let args = HyperArgs {
            config: Some(path.clone()),
            episodes: Some(100),
            ..HyperArgs::default()
        };
        let config = args.resolve().unwrap();
        assert_eq!(config.episodes, 100);
        assert_eq!(config.epsilon, RunConfig::default_epsilon(100));
        assert!(config.epsilon.epsilon(50) > 0.4);

        // A schedule written in the file survives the override
        std::fs::write(
            &path,
            r#"{"episodes": 10, "epsilon": {"kind": "linear", "start": 1.0,
                "end": 0.01, "decay_per_episode": 0.05}}"#,
        )
        .unwrap();
        let written = RunConfig::load(&path).unwrap().epsilon;
        let config = args.resolve().unwrap();
        assert_eq!(config.epsilon, written);
    }

    #[test]
    fn test_exponential_schedule_flag() {
        let args = HyperArgs {
            episodes: Some(100),
            schedule: Some(ScheduleKind::Exponential),
            epsilon_decay: Some(0.1),
            ..HyperArgs::default()
        };
        let config = args.resolve().unwrap();
        assert_eq!(
            config.epsilon,
            EpsilonSchedule::Exponential {
                start: 1.0,
                end: 0.01,
                rate: 0.1
            }
        );
    }
}
