//! Knight's tour on an N×N board
//!
//! The state carries the knight's square and the set of visited squares, so
//! an episode is a partial tour. Each move onto an unvisited square pays
//! `move_reward`; completing the tour adds `completion_bonus` and ends the
//! episode. A knight with no unvisited square in reach is terminal.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    ports::{DiscreteEnv, Transition},
};

/// Largest supported board edge; visited squares live in a `u64` bitmask
pub const MAX_BOARD_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Square {
    pub x: usize,
    pub y: usize,
}

impl Square {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Knight displacement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KnightMove {
    pub dx: i8,
    pub dy: i8,
}

impl KnightMove {
    pub const ALL: [KnightMove; 8] = [
        KnightMove { dx: 1, dy: 2 },
        KnightMove { dx: 2, dy: 1 },
        KnightMove { dx: 2, dy: -1 },
        KnightMove { dx: 1, dy: -2 },
        KnightMove { dx: -1, dy: -2 },
        KnightMove { dx: -2, dy: -1 },
        KnightMove { dx: -2, dy: 1 },
        KnightMove { dx: -1, dy: 2 },
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TourState {
    pub position: Square,
    /// Bit `y * size + x` is set for every visited square
    pub visited: u64,
}

impl TourState {
    pub fn visited_count(&self) -> u32 {
        self.visited.count_ones()
    }
}

#[derive(Debug, Clone)]
pub struct KnightsTour {
    size: usize,
    start: Square,
    move_reward: f64,
    completion_bonus: f64,
    visit_potential: bool,
}

impl KnightsTour {
    /// Create a tour on a `size` x `size` board starting from `start`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] unless `1 <= size <= 8` and
    /// `start` is on the board.
    pub fn new(size: usize, start: Square) -> Result<Self> {
        if !(1..=MAX_BOARD_SIZE).contains(&size) {
            return Err(Error::invalid_config(format!(
                "board size must be between 1 and {MAX_BOARD_SIZE}, got {size}"
            )));
        }
        if start.x >= size || start.y >= size {
            return Err(Error::invalid_config(format!(
                "start square ({}, {}) is off the {size}x{size} board",
                start.x, start.y
            )));
        }
        Ok(Self {
            size,
            start,
            move_reward: 1.0,
            completion_bonus: 10.0,
            visit_potential: false,
        })
    }

    pub fn with_rewards(mut self, move_reward: f64, completion_bonus: f64) -> Self {
        self.move_reward = move_reward;
        self.completion_bonus = completion_bonus;
        self
    }

    /// Shape rewards with Φ(s) = number of visited squares
    pub fn with_visit_potential(mut self) -> Self {
        self.visit_potential = true;
        self
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn start(&self) -> Square {
        self.start
    }

    fn bit(&self, square: Square) -> u64 {
        1u64 << (square.y * self.size + square.x)
    }

    fn full_mask(&self) -> u64 {
        let cells = self.size * self.size;
        if cells == 64 {
            u64::MAX
        } else {
            (1u64 << cells) - 1
        }
    }

    fn target(&self, from: Square, knight_move: KnightMove) -> Option<Square> {
        let x = from.x.checked_add_signed(knight_move.dx as isize)?;
        let y = from.y.checked_add_signed(knight_move.dy as isize)?;
        (x < self.size && y < self.size).then_some(Square::new(x, y))
    }

    pub fn is_complete(&self, state: &TourState) -> bool {
        state.visited == self.full_mask()
    }
}

impl DiscreteEnv for KnightsTour {
    type State = TourState;
    type Action = KnightMove;

    fn reset(&mut self) -> Result<TourState> {
        Ok(TourState {
            position: self.start,
            visited: self.bit(self.start),
        })
    }

    fn actions(&self, state: &TourState) -> Result<Vec<KnightMove>> {
        Ok(KnightMove::ALL
            .into_iter()
            .filter(|&m| {
                self.target(state.position, m)
                    .is_some_and(|square| state.visited & self.bit(square) == 0)
            })
            .collect())
    }

    fn step(&mut self, state: &TourState, action: &KnightMove) -> Result<Transition<TourState>> {
        let square = self
            .target(state.position, *action)
            .filter(|&square| state.visited & self.bit(square) == 0)
            .ok_or_else(|| {
                Error::environment(format!(
                    "illegal knight move {action:?} from ({}, {})",
                    state.position.x, state.position.y
                ))
            })?;

        let next = TourState {
            position: square,
            visited: state.visited | self.bit(square),
        };
        let done = self.is_complete(&next);
        let reward = if done {
            self.move_reward + self.completion_bonus
        } else {
            self.move_reward
        };
        Ok(Transition::new(next, reward, done))
    }

    fn potential(&self, state: &TourState) -> Result<f64> {
        if self.visit_potential {
            Ok(f64::from(state.visited_count()))
        } else {
            Ok(0.0)
        }
    }
}
