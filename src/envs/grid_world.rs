//! Deterministic grid world
//!
//! The agent walks from a start cell to a goal cell. Every move costs
//! `step_reward`, entering the goal pays `goal_reward` and ends the episode.
//! Moves off the grid leave the agent where it was.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    ports::{DiscreteEnv, Transition},
};

/// A grid cell; `x` is the column, `y` the row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn manhattan(&self, other: &Position) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl From<(usize, usize)> for Position {
    fn from((x, y): (usize, usize)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];
}

#[derive(Debug, Clone)]
pub struct GridWorld {
    width: usize,
    height: usize,
    start: Position,
    goal: Position,
    step_reward: f64,
    goal_reward: f64,
    distance_potential: bool,
}

impl GridWorld {
    pub const DEFAULT_STEP_REWARD: f64 = -1.0;
    pub const DEFAULT_GOAL_REWARD: f64 = 10.0;

    /// Create a `width` x `height` grid
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] for an empty grid, or when the
    /// start or goal lies outside it.
    pub fn new(
        width: usize,
        height: usize,
        start: impl Into<Position>,
        goal: impl Into<Position>,
    ) -> Result<Self> {
        let start = start.into();
        let goal = goal.into();
        if width == 0 || height == 0 {
            return Err(Error::invalid_config(format!(
                "grid must be at least 1x1, got {width}x{height}"
            )));
        }
        for (name, cell) in [("start", start), ("goal", goal)] {
            if cell.x >= width || cell.y >= height {
                return Err(Error::invalid_config(format!(
                    "{name} {cell} lies outside the {width}x{height} grid"
                )));
            }
        }

        Ok(Self {
            width,
            height,
            start,
            goal,
            step_reward: Self::DEFAULT_STEP_REWARD,
            goal_reward: Self::DEFAULT_GOAL_REWARD,
            distance_potential: false,
        })
    }

    /// Override the per-move and goal rewards
    pub fn with_rewards(mut self, step_reward: f64, goal_reward: f64) -> Self {
        self.step_reward = step_reward;
        self.goal_reward = goal_reward;
        self
    }

    /// Shape rewards with Φ(s) = -manhattan(s, goal)
    pub fn with_distance_potential(mut self) -> Self {
        self.distance_potential = true;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn goal(&self) -> Position {
        self.goal
    }

    fn shift(&self, from: Position, direction: Direction) -> Position {
        let Position { x, y } = from;
        match direction {
            Direction::Up if y > 0 => Position::new(x, y - 1),
            Direction::Down if y + 1 < self.height => Position::new(x, y + 1),
            Direction::Left if x > 0 => Position::new(x - 1, y),
            Direction::Right if x + 1 < self.width => Position::new(x + 1, y),
            _ => from,
        }
    }
}

impl DiscreteEnv for GridWorld {
    type State = Position;
    type Action = Direction;

    fn reset(&mut self) -> Result<Position> {
        Ok(self.start)
    }

    fn actions(&self, state: &Position) -> Result<Vec<Direction>> {
        if *state == self.goal {
            Ok(Vec::new())
        } else {
            Ok(Direction::ALL.to_vec())
        }
    }

    fn step(&mut self, state: &Position, action: &Direction) -> Result<Transition<Position>> {
        let next = self.shift(*state, *action);
        let done = next == self.goal;
        let reward = if done {
            self.goal_reward
        } else {
            self.step_reward
        };
        Ok(Transition::new(next, reward, done))
    }

    fn potential(&self, state: &Position) -> Result<f64> {
        if self.distance_potential {
            Ok(-(state.manhattan(&self.goal) as f64))
        } else {
            Ok(0.0)
        }
    }
}
