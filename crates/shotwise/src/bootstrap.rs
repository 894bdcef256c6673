// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! BootstrapFewShot optimizer implementation
//!
//! Few-shot demo sampling for in-context learning. Compared with plain
//! bootstrap sampling, both the augmented and the raw draws can be weighted
//! by evaluation scores so that demos the teacher gets right but the student
//! still gets wrong are proposed first.
//!
//! ## Cycle
//!
//! ```ignore
//! let mut opt = BootstrapFewShot::new(params, OptimizerConfig::new().with_shots(1, 2))
//!     .with_dataset(trainset);
//! opt.add_scores(&ids, &teacher_scores, Role::Teacher)?;
//!
//! opt.propose()?;
//! if evaluate(&opt) > best {
//!     opt.step()?;
//! } else {
//!     opt.revert()?;
//! }
//! ```

use crate::error::{Error, Result};
use crate::ledger::{Role, ScoreLedger};
use crate::optimizer::{Optimizer, OptimizerConfig, OptimizerState};
use crate::parameter::{DemoParameter, ParameterType};
use crate::selector::{samples_to_str, select};
use rand::rngs::StdRng;
use std::fmt;

/// Whether the bootstrap optimizer manages `param`.
#[inline]
pub fn is_managed<P: DemoParameter + ?Sized>(param: &P) -> bool {
    param.requires_opt() && param.param_type() == ParameterType::Demos
}

/// BootstrapFewShot optimizer.
///
/// Holds every parameter it was given but only touches the trainable
/// [`ParameterType::Demos`] ones.
pub struct BootstrapFewShot<P: DemoParameter> {
    params: Vec<P>,
    config: OptimizerConfig,
    dataset: Vec<P::Demo>,
    ledger: ScoreLedger,
    rng: StdRng,
    state: OptimizerState,
}

impl<P: DemoParameter> BootstrapFewShot<P> {
    /// Create a new BootstrapFewShot optimizer.
    pub fn new(params: Vec<P>, config: OptimizerConfig) -> Self {
        let rng = config.rng();
        let opt = Self {
            params,
            config,
            dataset: Vec::new(),
            ledger: ScoreLedger::new(),
            rng,
            state: OptimizerState::Idle,
        };

        #[cfg(feature = "tracing")]
        tracing::info!(
            params = ?opt.managed_aliases(),
            raw_shots = ?opt.config.raw_shots,
            bootstrap_shots = ?opt.config.bootstrap_shots,
            weighted = opt.config.weighted,
            "BootstrapFewShot created"
        );

        opt
    }

    /// Set the dataset raw demos are drawn from.
    pub fn with_dataset(mut self, dataset: Vec<P::Demo>) -> Self {
        self.dataset = dataset;
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Set both shot counts.
    pub fn config_shots(&mut self, raw_shots: usize, bootstrap_shots: usize) {
        self.config = self.config.with_shots(raw_shots, bootstrap_shots);
    }

    /// Replace the dataset.
    pub fn config_dataset(&mut self, dataset: Vec<P::Demo>) {
        self.dataset = dataset;
    }

    /// Enable or disable weighted sampling.
    pub fn use_weighted_sampling(&mut self, weighted: bool) {
        self.config = self.config.with_weighted(weighted);
    }

    /// Reseed the random source.
    pub fn reseed(&mut self, seed: u64) {
        self.config = self.config.with_seed(seed);
        self.rng = self.config.rng();
    }

    /// Total shots per proposal; 0 unless both counts are set and non-zero.
    pub fn num_shots(&self) -> usize {
        match self.config.shots() {
            Some((raw, bootstrap)) if raw > 0 && bootstrap > 0 => raw + bootstrap,
            _ => 0,
        }
    }

    /// Record evaluation scores. This is the only way scores enter the ledger.
    pub fn add_scores<S: AsRef<str>>(
        &mut self,
        ids: &[S],
        scores: &[f64],
        role: Role,
    ) -> Result<()> {
        self.ledger.record(ids, scores, role)
    }

    /// Recorded scores.
    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    /// The dataset.
    pub fn dataset(&self) -> &[P::Demo] {
        &self.dataset
    }

    /// All parameters, managed or not.
    pub fn parameters(&self) -> &[P] {
        &self.params
    }

    /// Add a teacher trace to the parameter named `alias`.
    ///
    /// Traces only feed the next `propose`; pending and committed values
    /// are reachable solely through the optimizer's transitions.
    pub fn add_trace(&mut self, alias: &str, demo: P::Demo) -> Result<()> {
        self.parameter_mut(alias)?.add_trace(demo);
        Ok(())
    }

    /// Add a scored student trace to the parameter named `alias`.
    pub fn add_student_trace(&mut self, alias: &str, demo: P::Demo) -> Result<()> {
        self.parameter_mut(alias)?.add_student_trace(demo);
        Ok(())
    }

    /// Find a parameter by alias.
    pub fn parameter(&self, alias: &str) -> Option<&P> {
        self.params.iter().find(|p| p.alias() == alias)
    }

    /// Give the parameters back.
    pub fn into_parameters(self) -> Vec<P> {
        self.params
    }

    /// Aliases of the parameters this optimizer manages.
    pub fn managed_aliases(&self) -> Vec<&str> {
        self.params
            .iter()
            .filter(|p| is_managed(*p))
            .map(|p| p.alias())
            .collect()
    }

    fn parameter_mut(&mut self, alias: &str) -> Result<&mut P> {
        self.params
            .iter_mut()
            .find(|p| p.alias() == alias)
            .ok_or_else(|| Error::validation(format!("unknown parameter {alias:?}")))
    }

    fn pre_check(&self) -> Result<(usize, usize)> {
        if self.dataset.is_empty() {
            return Err(Error::state("dataset must be provided"));
        }
        self.config
            .shots()
            .ok_or_else(|| Error::state("raw_shots and bootstrap_shots must be provided"))
    }

    fn require_proposing(&self) -> Result<()> {
        match self.state {
            OptimizerState::Proposed => Ok(()),
            OptimizerState::Idle => Err(Error::state("not proposing a value")),
        }
    }
}

impl<P: DemoParameter> Optimizer for BootstrapFewShot<P> {
    /// Propose a new demo block for every managed parameter.
    ///
    /// On failure the original error is returned and the optimizer stays
    /// idle, but parameters handled before the failing one keep their
    /// pending values.
    fn propose(&mut self) -> Result<()> {
        let (raw_shots, bootstrap_shots) = self.pre_check()?;
        if self.state == OptimizerState::Proposed {
            return Err(Error::state("already proposing a value"));
        }

        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("propose", raw_shots, bootstrap_shots).entered();

        let weighted = self.config.weighted;
        for param in self.params.iter_mut().filter(|p| is_managed(&**p)) {
            let selection = match select(
                &mut self.rng,
                &self.ledger,
                param.traces(),
                param.student_traces(),
                &self.dataset,
                raw_shots,
                bootstrap_shots,
                weighted,
            ) {
                Ok(selection) => selection,
                Err(err) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(param = param.alias(), error = %err, "propose failed");
                    return Err(err);
                }
            };

            #[cfg(feature = "tracing")]
            tracing::debug!(
                param = param.alias(),
                augmented = selection.augmented.len(),
                raw = selection.raw.len(),
                "demos sampled"
            );

            let samples = selection.into_samples();
            let text = if samples.is_empty() {
                String::new()
            } else {
                samples_to_str(&samples)
            };
            param.set_pending(text, samples);
        }

        self.state = OptimizerState::Proposed;
        Ok(())
    }

    /// Keep the proposed values.
    fn step(&mut self) -> Result<()> {
        self.pre_check()?;
        self.require_proposing()?;
        for param in self.params.iter_mut().filter(|p| is_managed(&**p)) {
            param.commit_pending();
        }
        self.state = OptimizerState::Idle;

        #[cfg(feature = "tracing")]
        tracing::info!("proposal committed");
        Ok(())
    }

    /// Restore the previous values when the evaluation got worse.
    fn revert(&mut self) -> Result<()> {
        self.pre_check()?;
        self.require_proposing()?;
        for param in self.params.iter_mut().filter(|p| is_managed(&**p)) {
            param.discard_pending();
        }
        self.state = OptimizerState::Idle;

        #[cfg(feature = "tracing")]
        tracing::info!("proposal reverted");
        Ok(())
    }

    fn state(&self) -> OptimizerState {
        self.state
    }

    fn name(&self) -> &'static str {
        "BootstrapFewShot"
    }
}

impl<P: DemoParameter> fmt::Display for BootstrapFewShot<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn shots(n: Option<usize>) -> String {
            n.map_or_else(|| "None".to_string(), |n| n.to_string())
        }

        write!(
            f,
            "BootstrapFewShot(raw_shots={}, bootstrap_shots={}, params={:?}, dataset={})",
            shots(self.config.raw_shots),
            shots(self.config.bootstrap_shots),
            self.managed_aliases(),
            self.dataset.len()
        )
    }
}

impl<P: DemoParameter> fmt::Debug for BootstrapFewShot<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
