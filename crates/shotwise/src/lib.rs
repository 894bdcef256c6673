// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! # Shotwise - Bootstrap Few-Shot Demo Optimization
//!
//! Selects which in-context demonstrations go into a prompt, then keeps or
//! discards that choice based on downstream evaluation.
//!
//! ## Architecture
//!
//! - **Sampler**: weighted sampling with and without replacement
//! - **Ledger**: teacher/student scores per example id, validated on insert
//! - **Selector**: draws augmented (teacher) and raw (dataset) demos,
//!   favouring demos the teacher solves and the student does not
//! - **Optimizer**: `propose` → evaluate → `step` or `revert`, with at most
//!   one proposal outstanding
//!
//! ## Quick Start
//!
//! ```ignore
//! use shotwise::prelude::*;
//!
//! let mut param = Parameter::demos("few_shot");
//! param.add_trace(Example::new("e").input("question", "2+2?").output("answer", "4"));
//!
//! let mut opt = BootstrapFewShot::new(vec![param], OptimizerConfig::new().with_shots(1, 1))
//!     .with_dataset(trainset);
//! opt.add_scores(&["e"], &[1.0], Role::Teacher)?;
//!
//! opt.propose()?;
//! // evaluate the pending demos ...
//! opt.step()?;
//! ```

#![warn(missing_docs)]

pub mod bootstrap;
pub mod error;
pub mod example;
pub mod ledger;
pub mod optimizer;
pub mod parameter;
pub mod sampler;
pub mod selector;
pub mod types;

// Re-exports for convenience
pub use bootstrap::{is_managed, BootstrapFewShot};
pub use error::{Error, Result};
pub use example::{Demo, Example};
pub use ledger::{Role, ScoreLedger};
pub use optimizer::{Optimizer, OptimizerConfig, OptimizerState};
pub use parameter::{DemoParameter, DemoValue, ParamValue, Parameter, ParameterType};
pub use sampler::{random_sample, sample_indices, SampleIndices};
pub use selector::{render_demo, samples_to_str, select, Selection};
pub use types::{FieldMap, Traces};

/// Prelude module for convenient imports.
pub mod prelude {
    // Error handling
    pub use crate::{Error, Result};

    // Core types
    pub use crate::{Demo, Example, FieldMap, Traces};

    // Parameters
    pub use crate::{DemoParameter, DemoValue, Parameter, ParameterType};

    // Optimizer system
    pub use crate::{BootstrapFewShot, Optimizer, OptimizerConfig, Role, ScoreLedger};
}

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
