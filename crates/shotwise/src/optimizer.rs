// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Optimizer trait and configuration
//!
//! Optimizers follow a three-phase protocol: `propose` computes a tentative
//! value for every managed parameter, the caller evaluates it, then either
//! `step` commits it or `revert` throws it away.

use crate::error::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Whether a proposal is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptimizerState {
    /// No proposal outstanding
    #[default]
    Idle,
    /// Exactly one proposal outstanding across all managed parameters
    Proposed,
}

/// Trait for optimizers with propose/step/revert semantics.
///
/// Not reentrant: every transition takes `&mut self`.
pub trait Optimizer {
    /// Compute a pending value for every managed parameter.
    fn propose(&mut self) -> Result<()>;

    /// Commit the pending values.
    fn step(&mut self) -> Result<()>;

    /// Discard the pending values.
    fn revert(&mut self) -> Result<()>;

    /// Current state.
    fn state(&self) -> OptimizerState;

    /// Get optimizer name.
    fn name(&self) -> &'static str;

    /// Whether a proposal is outstanding.
    fn is_proposing(&self) -> bool {
        self.state() == OptimizerState::Proposed
    }
}

/// Configuration for bootstrap demo selection.
///
/// Shot counts start unset; sampling refuses to run until both are given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Number of demos drawn straight from the dataset
    pub raw_shots: Option<usize>,
    /// Number of demos drawn from teacher traces
    pub bootstrap_shots: Option<usize>,
    /// Weight draws by teacher/student scores instead of drawing uniformly
    pub weighted: bool,
    /// Random seed for reproducibility; `None` seeds from OS entropy
    pub seed: Option<u64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl OptimizerConfig {
    /// Create a new configuration.
    pub const fn new() -> Self {
        Self {
            raw_shots: None,
            bootstrap_shots: None,
            weighted: true,
            seed: None,
        }
    }

    /// Set raw shots.
    pub const fn with_raw_shots(mut self, n: usize) -> Self {
        self.raw_shots = Some(n);
        self
    }

    /// Set bootstrap shots.
    pub const fn with_bootstrap_shots(mut self, n: usize) -> Self {
        self.bootstrap_shots = Some(n);
        self
    }

    /// Set both shot counts.
    pub const fn with_shots(self, raw: usize, bootstrap: usize) -> Self {
        self.with_raw_shots(raw).with_bootstrap_shots(bootstrap)
    }

    /// Enable or disable weighted sampling.
    pub const fn with_weighted(mut self, weighted: bool) -> Self {
        self.weighted = weighted;
        self
    }

    /// Set seed.
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Both shot counts, if set.
    pub const fn shots(&self) -> Option<(usize, usize)> {
        match (self.raw_shots, self.bootstrap_shots) {
            (Some(raw), Some(bootstrap)) => Some((raw, bootstrap)),
            _ => None,
        }
    }

    /// Build the random source this config asks for.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
