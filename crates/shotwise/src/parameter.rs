// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Demo parameters and their committed/pending value slots
//!
//! A parameter's value is a two-slot record: the committed value the
//! pipeline currently uses, and at most one pending proposal. Transitions
//! on [`ParamValue`] take the record by value and return the next one.

use crate::example::Demo;
use crate::types::Traces;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a trainable parameter.
///
/// The bootstrap optimizer only touches [`ParameterType::Demos`]; the other
/// kinds belong to other optimizers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterType {
    /// Instruction to the language model on task, data, and format.
    Prompt,
    /// A few examples to guide the language model.
    Demos,
    /// The output of the generator.
    GeneratorOutput,
    /// The output of the retriever.
    RetrieverOutput,
    /// Untyped.
    #[default]
    None,
}

impl ParameterType {
    /// Short identifier.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prompt => "prompt",
            Self::Demos => "demos",
            Self::GeneratorOutput => "generator_output",
            Self::RetrieverOutput => "retriever_output",
            Self::None => "none",
        }
    }

    /// Human-readable description.
    pub const fn description(self) -> &'static str {
        match self {
            Self::Prompt => "Instruction to the language model on task, data, and format.",
            Self::Demos => "A few examples to guide the language model.",
            Self::GeneratorOutput => "The output of the generator.",
            Self::RetrieverOutput => "The output of the retriever.",
            Self::None => "",
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.description())
    }
}

/// Rendered demo text together with the samples it was rendered from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemoValue<D> {
    /// Text inserted into the prompt
    pub text: String,
    /// Samples behind `text`, augmented first then raw
    pub samples: Vec<D>,
}

impl<D> DemoValue<D> {
    /// Create a value.
    pub fn new(text: impl Into<String>, samples: Vec<D>) -> Self {
        Self {
            text: text.into(),
            samples,
        }
    }

    /// Empty demo block.
    pub fn empty() -> Self {
        Self::new(String::new(), Vec::new())
    }
}

impl<D> Default for DemoValue<D> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Committed value, optional pending proposal, and the committed values it replaced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamValue<D> {
    committed: DemoValue<D>,
    pending: Option<DemoValue<D>>,
    history: Vec<DemoValue<D>>,
}

impl<D> ParamValue<D> {
    /// Start from a committed value with nothing pending.
    pub fn new(committed: DemoValue<D>) -> Self {
        Self {
            committed,
            pending: None,
            history: Vec::new(),
        }
    }

    /// Store `value` as the pending proposal, replacing any earlier one.
    #[must_use]
    pub fn propose(mut self, value: DemoValue<D>) -> Self {
        self.pending = Some(value);
        self
    }

    /// Promote the pending value; the old committed value moves to history.
    ///
    /// Without a pending value this is a no-op.
    #[must_use]
    pub fn step(mut self) -> Self {
        if let Some(next) = self.pending.take() {
            let prev = std::mem::replace(&mut self.committed, next);
            self.history.push(prev);
        }
        self
    }

    /// Drop the pending value.
    #[must_use]
    pub fn revert(mut self) -> Self {
        self.pending = None;
        self
    }

    /// The value in use.
    pub fn committed(&self) -> &DemoValue<D> {
        &self.committed
    }

    /// The outstanding proposal, if any.
    pub fn pending(&self) -> Option<&DemoValue<D>> {
        self.pending.as_ref()
    }

    /// Previously committed values, oldest first.
    pub fn history(&self) -> &[DemoValue<D>] {
        &self.history
    }

    /// Whether a proposal is outstanding.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl<D> Default for ParamValue<D> {
    fn default() -> Self {
        Self::new(DemoValue::empty())
    }
}

/// What the optimizer needs from a parameter.
///
/// Implement this to plug an existing parameter store into
/// [`BootstrapFewShot`](crate::bootstrap::BootstrapFewShot); [`Parameter`]
/// is the in-crate implementation.
pub trait DemoParameter {
    /// Demo record type held in the trace collections.
    type Demo: Demo;

    /// Name used in logs.
    fn alias(&self) -> &str;

    /// Whether this parameter is trainable.
    fn requires_opt(&self) -> bool;

    /// Parameter kind.
    fn param_type(&self) -> ParameterType;

    /// Teacher-produced candidate demos.
    fn traces(&self) -> &Traces<Self::Demo>;

    /// Previously attempted demos, each with its outcome score.
    fn student_traces(&self) -> &Traces<Self::Demo>;

    /// Add a teacher trace, replacing any trace with the same id.
    fn add_trace(&mut self, demo: Self::Demo);

    /// Add a student trace, replacing any trace with the same id.
    fn add_student_trace(&mut self, demo: Self::Demo);

    /// Store a proposal without touching the committed value.
    fn set_pending(&mut self, text: String, samples: Vec<Self::Demo>);

    /// Promote the proposal to committed.
    fn commit_pending(&mut self);

    /// Throw the proposal away.
    fn discard_pending(&mut self);
}

/// A trainable demo parameter.
#[derive(Debug, Clone)]
pub struct Parameter<D> {
    alias: String,
    requires_opt: bool,
    param_type: ParameterType,
    traces: Traces<D>,
    student_traces: Traces<D>,
    value: ParamValue<D>,
}

impl<D: Demo> Parameter<D> {
    /// Create a parameter of the given kind, trainable by default.
    pub fn new(alias: impl Into<String>, param_type: ParameterType) -> Self {
        Self {
            alias: alias.into(),
            requires_opt: true,
            param_type,
            traces: Traces::new(),
            student_traces: Traces::new(),
            value: ParamValue::default(),
        }
    }

    /// Shorthand for a trainable [`ParameterType::Demos`] parameter.
    pub fn demos(alias: impl Into<String>) -> Self {
        Self::new(alias, ParameterType::Demos)
    }

    /// Set whether the parameter is trainable.
    pub fn with_requires_opt(mut self, requires_opt: bool) -> Self {
        self.requires_opt = requires_opt;
        self
    }

    /// Start from an existing committed value.
    pub fn with_value(mut self, value: DemoValue<D>) -> Self {
        self.value = ParamValue::new(value);
        self
    }

    /// Current value slots.
    pub fn value(&self) -> &ParamValue<D> {
        &self.value
    }

    /// Committed demo text.
    pub fn data(&self) -> &str {
        &self.value.committed().text
    }

    /// Committed value.
    pub fn committed(&self) -> &DemoValue<D> {
        self.value.committed()
    }

    /// Outstanding proposal.
    pub fn pending(&self) -> Option<&DemoValue<D>> {
        self.value.pending()
    }

    /// Previously committed values, oldest first.
    pub fn history(&self) -> &[DemoValue<D>] {
        self.value.history()
    }

    fn transition(&mut self, f: impl FnOnce(ParamValue<D>) -> ParamValue<D>) {
        self.value = f(std::mem::take(&mut self.value));
    }
}

impl<D: Demo> DemoParameter for Parameter<D> {
    type Demo = D;

    fn alias(&self) -> &str {
        &self.alias
    }

    fn requires_opt(&self) -> bool {
        self.requires_opt
    }

    fn param_type(&self) -> ParameterType {
        self.param_type
    }

    fn traces(&self) -> &Traces<D> {
        &self.traces
    }

    fn student_traces(&self) -> &Traces<D> {
        &self.student_traces
    }

    fn add_trace(&mut self, demo: D) {
        self.traces.insert(demo.id().to_owned(), demo);
    }

    fn add_student_trace(&mut self, demo: D) {
        self.student_traces.insert(demo.id().to_owned(), demo);
    }

    fn set_pending(&mut self, text: String, samples: Vec<D>) {
        self.transition(|v| v.propose(DemoValue::new(text, samples)));
    }

    fn commit_pending(&mut self) {
        self.transition(ParamValue::step);
    }

    fn discard_pending(&mut self) {
        self.transition(ParamValue::revert);
    }
}
