// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Training examples and the [`Demo`] trait the optimizer samples over

use crate::types::FieldMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt::Debug;

/// A record usable as an in-context demonstration.
///
/// Identity is by [`Demo::id`] only; the payload is opaque to the optimizer
/// and only reaches the prompt through its `Serialize` impl. Rendering
/// strips the `id` and `score` fields.
pub trait Demo: Clone + Debug + Serialize {
    /// Identifier, unique within a dataset.
    fn id(&self) -> &str;

    /// Outcome score in `[0, 1]`, if this demo has been evaluated.
    fn score(&self) -> Option<f64> {
        None
    }
}

/// A dataset record or trace: input fields, optional expected outputs, optional score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example<'a> {
    /// Identifier, unique within a dataset
    #[serde(borrow)]
    pub id: Cow<'a, str>,

    /// Input fields
    #[serde(borrow)]
    pub inputs: FieldMap<'a>,

    /// Expected outputs, when known
    #[serde(borrow, default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<FieldMap<'a>>,

    /// Evaluation score, set on student traces
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl<'a> Example<'a> {
    /// Create a new example
    pub fn new(id: impl Into<Cow<'a, str>>) -> Self {
        Self {
            id: id.into(),
            inputs: FieldMap::new(),
            outputs: None,
            score: None,
        }
    }

    /// Create with inputs
    pub fn with_inputs(id: impl Into<Cow<'a, str>>, inputs: FieldMap<'a>) -> Self {
        Self {
            id: id.into(),
            inputs,
            outputs: None,
            score: None,
        }
    }

    /// Set the expected outputs
    pub fn with_outputs(mut self, outputs: FieldMap<'a>) -> Self {
        self.outputs = Some(outputs);
        self
    }

    /// Attach an evaluation score
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Add an input field (builder form)
    pub fn input(
        mut self,
        key: impl Into<Cow<'a, str>>,
        value: impl Into<Cow<'a, str>>,
    ) -> Self {
        self.insert_input(key, value);
        self
    }

    /// Add an output field (builder form)
    pub fn output(
        mut self,
        key: impl Into<Cow<'a, str>>,
        value: impl Into<Cow<'a, str>>,
    ) -> Self {
        self.insert_output(key, value);
        self
    }

    /// Get an input field
    pub fn get_input(&self, key: &str) -> Option<&str> {
        self.inputs.get(key).map(|v| v.as_ref())
    }

    /// Get an output field
    pub fn get_output(&self, key: &str) -> Option<&str> {
        self.outputs.as_ref()?.get(key).map(|v| v.as_ref())
    }

    /// Insert an input field
    pub fn insert_input(
        &mut self,
        key: impl Into<Cow<'a, str>>,
        value: impl Into<Cow<'a, str>>,
    ) {
        self.inputs.insert(key.into(), value.into());
    }

    /// Insert an output field, creating the output map on first use
    pub fn insert_output(
        &mut self,
        key: impl Into<Cow<'a, str>>,
        value: impl Into<Cow<'a, str>>,
    ) {
        self.outputs
            .get_or_insert_with(FieldMap::new)
            .insert(key.into(), value.into());
    }

    /// Detach from borrowed input so the record can be stored in traces
    pub fn into_owned(self) -> Example<'static> {
        Example {
            id: Cow::Owned(self.id.into_owned()),
            inputs: owned_fields(self.inputs),
            outputs: self.outputs.map(owned_fields),
            score: self.score,
        }
    }
}

fn owned_fields(fields: FieldMap<'_>) -> FieldMap<'static> {
    fields
        .into_iter()
        .map(|(k, v)| (Cow::Owned(k.into_owned()), Cow::Owned(v.into_owned())))
        .collect()
}

impl<'a> Demo for Example<'a> {
    fn id(&self) -> &str {
        &self.id
    }

    fn score(&self) -> Option<f64> {
        self.score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_demo_is_unscored() {
        let demo = Example::new("d1");
        assert_eq!(demo.id(), "d1");
        assert!(demo.inputs.is_empty());
        assert_eq!(demo.outputs, None);
        assert_eq!(demo.score(), None);
    }

    #[test]
    fn test_fields_by_mutation() {
        let mut demo = Example::new("d1");
        demo.insert_input("question", "capital of France?");
        demo.insert_output("answer", "Paris");
        demo.insert_output("answer", "paris");

        assert_eq!(demo.get_input("question"), Some("capital of France?"));
        assert_eq!(demo.get_output("answer"), Some("paris"));
        assert_eq!(demo.get_output("missing"), None);
    }

    #[test]
    fn test_student_trace_builder() {
        let trace = Example::new("t7")
            .input("question", "3 * 3")
            .input("hint", "multiply")
            .output("answer", "9")
            .with_score(0.25);

        assert_eq!(trace.inputs.keys().count(), 2);
        assert_eq!(trace.get_output("answer"), Some("9"));
        assert_eq!(Demo::score(&trace), Some(0.25));
    }

    #[test]
    fn test_with_prebuilt_inputs() {
        let fields: FieldMap = [("topic".into(), "rust".into())].into_iter().collect();
        let demo = Example::with_inputs("d2", fields.clone()).with_outputs(fields);
        assert_eq!(demo.get_input("topic"), Some("rust"));
        assert_eq!(demo.get_output("topic"), Some("rust"));
    }

    #[test]
    fn test_owned_copy_outlives_source() {
        let source = String::from("trace-9");
        let borrowed = Example::new(source.as_str())
            .input("question", source.as_str())
            .with_score(1.0);

        let owned: Example<'static> = borrowed.into_owned();
        drop(source);
        assert_eq!(owned.id(), "trace-9");
        assert_eq!(owned.get_input("question"), Some("trace-9"));
        assert_eq!(owned.score(), Some(1.0));
    }

    #[test]
    fn test_example_skips_empty_optionals_when_serialized() {
        let example = Example::new("a").input("q", "x");
        let yaml = serde_yaml::to_string(&example).unwrap();
        assert!(!yaml.contains("outputs"));
        assert!(!yaml.contains("score"));
    }
}
