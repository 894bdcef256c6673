// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Demo selection and rendering
//!
//! ## Algorithm
//!
//! 1. Draw `bootstrap_shots` augmented demos. When weighted, a demo's
//!    weight is its teacher score minus its student score (floored at 0),
//!    so demos the teacher solved but the student still fails come first.
//! 2. Drop every dataset item whose id was just drawn.
//! 3. Draw `raw_shots` raw demos from what is left. When weighted, only
//!    committed demos with a known score get weight, `1 - score`.

use crate::error::{Error, Result};
use crate::example::Demo;
use crate::ledger::{Role, ScoreLedger};
use crate::sampler::random_sample;
use crate::types::Traces;
use rand::Rng;
use std::collections::HashSet;

/// Result of one selection: augmented and raw samples, disjoint by id.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<D> {
    /// Samples drawn from teacher traces
    pub augmented: Vec<D>,
    /// Samples drawn from the dataset
    pub raw: Vec<D>,
}

impl<D: Demo> Selection<D> {
    /// Total number of samples.
    pub fn len(&self) -> usize {
        self.augmented.len() + self.raw.len()
    }

    /// True when nothing was drawn.
    pub fn is_empty(&self) -> bool {
        self.augmented.is_empty() && self.raw.is_empty()
    }

    /// Augmented samples followed by raw samples.
    pub fn into_samples(self) -> Vec<D> {
        let mut samples = self.augmented;
        samples.extend(self.raw);
        samples
    }
}

/// Select augmented and raw demos for one parameter.
///
/// `augmented` holds the teacher traces, `committed` the student traces
/// whose scores drive raw weighting. Fails with
/// [`Error::MissingScore`] when `weighted` is set and an augmented demo has
/// no teacher score in `ledger`.
#[allow(clippy::too_many_arguments)]
pub fn select<D, R>(
    rng: &mut R,
    ledger: &ScoreLedger,
    augmented: &Traces<D>,
    committed: &Traces<D>,
    dataset: &[D],
    raw_shots: usize,
    bootstrap_shots: usize,
    weighted: bool,
) -> Result<Selection<D>>
where
    D: Demo,
    R: Rng + ?Sized,
{
    let options: Vec<D> = augmented.values().cloned().collect();
    let weights = if weighted {
        Some(augmented_weights(ledger, &options)?)
    } else {
        None
    };
    let sampled_augmented = if options.is_empty() {
        Vec::new()
    } else {
        random_sample(rng, &options, bootstrap_shots, false, weights.as_deref())?
    };

    let taken: HashSet<&str> = sampled_augmented.iter().map(Demo::id).collect();
    let pool: Vec<D> = dataset
        .iter()
        .filter(|demo| !taken.contains(demo.id()))
        .cloned()
        .collect();
    let pool_weights = weighted.then(|| raw_weights(committed, &pool));
    let sampled_raw = random_sample(rng, &pool, raw_shots, false, pool_weights.as_deref())?;

    Ok(Selection {
        augmented: sampled_augmented,
        raw: sampled_raw,
    })
}

/// Teacher score minus student score, floored at zero.
pub fn augmented_weights<D: Demo>(ledger: &ScoreLedger, options: &[D]) -> Result<Vec<f64>> {
    options
        .iter()
        .map(|demo| {
            let teacher = ledger
                .lookup(Role::Teacher, demo.id())
                .ok_or_else(|| Error::missing_score(demo.id()))?;
            Ok(match ledger.lookup(Role::Student, demo.id()) {
                Some(student) => (teacher - student).max(0.0),
                None => teacher,
            })
        })
        .collect()
}

/// `1 - score` for pool items that are scored committed demos, 0 otherwise.
pub fn raw_weights<D: Demo>(committed: &Traces<D>, pool: &[D]) -> Vec<f64> {
    pool.iter()
        .map(|demo| {
            committed
                .get(demo.id())
                .and_then(Demo::score)
                .map_or(0.0, |score| 1.0 - score)
        })
        .collect()
}

/// Render one demo as YAML without its `id` and `score` fields.
pub fn render_demo<D: Demo>(demo: &D) -> Result<String> {
    let value = serde_yaml::to_value(demo).map_err(|e| Error::render(demo.id(), e))?;
    let value = match value {
        serde_yaml::Value::Mapping(mut map) => {
            // Field order is part of the demo text
            map.shift_remove("id");
            map.shift_remove("score");
            serde_yaml::Value::Mapping(map)
        }
        other => other,
    };
    let text = serde_yaml::to_string(&value).map_err(|e| Error::render(demo.id(), e))?;
    Ok(text.trim_end().to_owned())
}

/// Render samples one per block, joined by newlines.
///
/// A sample that fails to render is replaced by its debug representation;
/// the rest of the batch is unaffected.
pub fn samples_to_str<D: Demo>(samples: &[D]) -> String {
    samples
        .iter()
        .map(|sample| match render_demo(sample) {
            Ok(text) => text,
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    id = sample.id(),
                    error = %_err,
                    "demo render failed, using fallback"
                );
                format!("{:?}", sample)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::example::Example;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde::{Serialize, Serializer};

    fn ex(id: &str) -> Example<'static> {
        Example::new(id.to_string()).input("question", format!("q-{id}"))
    }

    fn traces(demos: impl IntoIterator<Item = Example<'static>>) -> Traces<Example<'static>> {
        demos
            .into_iter()
            .map(|d| (d.id.to_string(), d))
            .collect()
    }

    fn ids(demos: &[Example<'_>]) -> Vec<String> {
        demos.iter().map(|d| d.id.to_string()).collect()
    }

    #[test]
    fn test_teacher_solved_student_failed_is_preferred() {
        let mut ledger = ScoreLedger::new();
        ledger
            .record(&["e", "f"], &[0.9, 0.2], Role::Teacher)
            .unwrap();
        ledger.record(&["e"], &[0.9], Role::Student).unwrap();

        let augmented = traces([ex("e"), ex("f")]);
        let dataset: Vec<_> = ["a", "b", "c", "d"].into_iter().map(ex).collect();
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..100 {
            let sel = select(
                &mut rng,
                &ledger,
                &augmented,
                &Traces::new(),
                &dataset,
                1,
                1,
                true,
            )
            .unwrap();
            assert_eq!(ids(&sel.augmented), vec!["f"]);
            assert_eq!(sel.raw.len(), 1);
            assert!(["a", "b", "c", "d"].contains(&sel.raw[0].id()));
        }
    }

    #[test]
    fn test_weights_floor_at_zero() {
        let mut ledger = ScoreLedger::new();
        ledger.record(&["e"], &[0.3], Role::Teacher).unwrap();
        ledger.record(&["e"], &[0.8], Role::Student).unwrap();
        let w = augmented_weights(&ledger, &[ex("e")]).unwrap();
        assert_eq!(w, vec![0.0]);
    }

    #[test]
    fn test_missing_teacher_score_is_an_error() {
        let ledger = ScoreLedger::new();
        let augmented = traces([ex("e")]);
        let err = select(
            &mut StdRng::seed_from_u64(0),
            &ledger,
            &augmented,
            &Traces::new(),
            &[ex("a")],
            1,
            1,
            true,
        )
        .unwrap_err();
        assert_eq!(err, Error::MissingScore { id: "e".to_string() });
    }

    #[test]
    fn test_unweighted_ignores_missing_scores() {
        let ledger = ScoreLedger::new();
        let augmented = traces([ex("e"), ex("f")]);
        let sel = select(
            &mut StdRng::seed_from_u64(0),
            &ledger,
            &augmented,
            &Traces::new(),
            &[ex("a")],
            1,
            2,
            false,
        )
        .unwrap();
        assert_eq!(sel.augmented.len(), 2);
        assert_eq!(ids(&sel.raw), vec!["a"]);
    }

    #[test]
    fn test_raw_pool_excludes_sampled_augmented_ids() {
        let ledger = ScoreLedger::new();
        let augmented = traces([ex("a"), ex("b")]);
        let dataset: Vec<_> = ["a", "b", "c"].into_iter().map(ex).collect();

        let sel = select(
            &mut StdRng::seed_from_u64(3),
            &ledger,
            &augmented,
            &Traces::new(),
            &dataset,
            5,
            2,
            false,
        )
        .unwrap();
        assert_eq!(ids(&sel.raw), vec!["c"]);
    }

    #[test]
    fn test_zero_bootstrap_shots() {
        let mut ledger = ScoreLedger::new();
        ledger.record(&["e"], &[1.0], Role::Teacher).unwrap();
        let augmented = traces([ex("e")]);
        let dataset: Vec<_> = ["a", "b", "c"].into_iter().map(ex).collect();

        let sel = select(
            &mut StdRng::seed_from_u64(5),
            &ledger,
            &augmented,
            &Traces::new(),
            &dataset,
            2,
            0,
            false,
        )
        .unwrap();
        assert!(sel.augmented.is_empty());
        assert_eq!(sel.raw.len(), 2);
    }

    #[test]
    fn test_both_zero_is_empty() {
        let ledger = ScoreLedger::new();
        let sel = select(
            &mut StdRng::seed_from_u64(5),
            &ledger,
            &traces([ex("e")]),
            &Traces::new(),
            &[ex("a")],
            0,
            0,
            false,
        )
        .unwrap();
        assert!(sel.is_empty());
        assert_eq!(samples_to_str(&sel.into_samples()), "");
    }

    #[test]
    fn test_failing_committed_demos_are_reincluded() {
        let ledger = ScoreLedger::new();
        let committed = traces([ex("b").with_score(0.0), ex("c").with_score(1.0)]);
        let dataset: Vec<_> = ["a", "b", "c", "d"].into_iter().map(ex).collect();
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..50 {
            let sel = select(
                &mut rng,
                &ledger,
                &Traces::new(),
                &committed,
                &dataset,
                1,
                3,
                true,
            )
            .unwrap();
            assert!(sel.augmented.is_empty());
            assert_eq!(ids(&sel.raw), vec!["b"]);
        }
    }

    #[test]
    fn test_raw_weights() {
        let committed = traces([ex("b").with_score(0.25), ex("c")]);
        let pool = vec![ex("a"), ex("b"), ex("c")];
        assert_eq!(raw_weights(&committed, &pool), vec![0.0, 0.75, 0.0]);
    }

    #[test]
    fn test_render_strips_id_and_score() {
        let demo = ex("a").output("answer", "forty-two").with_score(0.5);
        let text = render_demo(&demo).unwrap();
        assert!(text.contains("question: q-a"));
        assert!(text.contains("answer: forty-two"));
        assert!(!text.contains("id:"));
        assert!(!text.contains("score"));
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn test_render_keeps_field_order() {
        let demo = Example::new("a")
            .input("question", "Q")
            .output("answer", "A")
            .with_score(1.0);
        assert_eq!(
            render_demo(&demo).unwrap(),
            "inputs:\n  question: Q\noutputs:\n  answer: A"
        );

        let text = samples_to_str(&[ex("a").output("answer", "A"), ex("b")]);
        let inputs = text.find("inputs:").unwrap();
        let outputs = text.find("outputs:").unwrap();
        assert!(inputs < outputs);
        assert!(text.ends_with("inputs:\n  question: q-b"));
    }

    #[test]
    fn test_samples_joined_by_newline() {
        let text = samples_to_str(&[ex("a"), ex("b")]);
        assert_eq!(text, "inputs:\n  question: q-a\ninputs:\n  question: q-b");
    }

    #[derive(Debug, Clone)]
    struct Broken(&'static str);

    impl Serialize for Broken {
        fn serialize<S>(&self, _serializer: S) -> core::result::Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            Err(serde::ser::Error::custom("unserializable payload"))
        }
    }

    impl Demo for Broken {
        fn id(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_render_failure_falls_back_per_item() {
        let err = render_demo(&Broken("x")).unwrap_err();
        assert!(err.is_recoverable());

        let text = samples_to_str(&[Broken("x"), Broken("y")]);
        assert_eq!(text, "Broken(\"x\")\nBroken(\"y\")");
    }
}
