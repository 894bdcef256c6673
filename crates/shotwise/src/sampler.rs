// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Weighted random sampling
//!
//! Without replacement, weighted draws are done by iterative removal: each
//! step builds a [`WeightedIndex`] over the items still available, so an
//! item with weight zero can only be drawn once every positive-weight item
//! has been taken. After that the remaining draws are uniform.

use crate::error::{Error, Result};
use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use rand::Rng;
use smallvec::SmallVec;

/// Indices chosen by a draw, in draw order.
pub type SampleIndices = SmallVec<[usize; 8]>;

/// Draw `count` items from `items`.
///
/// - `count == 0` or empty `items` yields an empty sample.
/// - Without replacement, asking for more than `items.len()` returns every
///   item in random order.
/// - `weights`, when given, must match `items` in length and have a finite
///   sum. Negative and non-finite weights count as zero.
pub fn random_sample<T, R>(
    rng: &mut R,
    items: &[T],
    count: usize,
    replace: bool,
    weights: Option<&[f64]>,
) -> Result<Vec<T>>
where
    T: Clone,
    R: Rng + ?Sized,
{
    let indices = sample_indices(rng, items.len(), count, replace, weights)?;
    Ok(indices.into_iter().map(|i| items[i].clone()).collect())
}

/// Draw `count` indices from `0..len`. See [`random_sample`].
pub fn sample_indices<R>(
    rng: &mut R,
    len: usize,
    count: usize,
    replace: bool,
    weights: Option<&[f64]>,
) -> Result<SampleIndices>
where
    R: Rng + ?Sized,
{
    let weights = match weights {
        Some(w) if w.len() != len => {
            return Err(Error::validation(format!(
                "weights must have the same length as items: {} weights for {} items",
                w.len(),
                len
            )));
        }
        Some(w) => Some(w.iter().copied().map(clamp_weight).collect::<Vec<f64>>()),
        None => None,
    };

    if let Some(total) = weights.as_ref().map(|w| w.iter().sum::<f64>()) {
        if !total.is_finite() {
            return Err(Error::validation(
                "weights must have a finite sum, scale them down",
            ));
        }
    }

    if count == 0 || len == 0 {
        return Ok(SampleIndices::new());
    }

    match (replace, weights) {
        (true, weights) => with_replacement(rng, len, count, weights.as_deref()),
        (false, None) => Ok(rand::seq::index::sample(rng, len, count.min(len))
            .into_iter()
            .collect()),
        (false, Some(weights)) => weighted_without_replacement(rng, &weights, count),
    }
}

#[inline]
fn clamp_weight(w: f64) -> f64 {
    if w.is_finite() && w > 0.0 {
        w
    } else {
        0.0
    }
}

fn weighted_without_replacement<R>(
    rng: &mut R,
    weights: &[f64],
    count: usize,
) -> Result<SampleIndices>
where
    R: Rng + ?Sized,
{
    let mut remaining: Vec<usize> = (0..weights.len()).collect();
    let mut picked = SampleIndices::with_capacity(count.min(weights.len()));

    while picked.len() < count && !remaining.is_empty() {
        let pos = match WeightedIndex::<f64>::new(remaining.iter().map(|&i| weights[i])) {
            Ok(dist) => dist.sample(rng),
            // Positive weight exhausted
            Err(WeightedError::AllWeightsZero) => rng.gen_range(0..remaining.len()),
            Err(err) => return Err(Error::validation(err.to_string())),
        };
        picked.push(remaining.swap_remove(pos));
    }

    Ok(picked)
}

fn with_replacement<R>(
    rng: &mut R,
    len: usize,
    count: usize,
    weights: Option<&[f64]>,
) -> Result<SampleIndices>
where
    R: Rng + ?Sized,
{
    let dist = match weights.map(WeightedIndex::<f64>::new) {
        Some(Ok(dist)) => Some(dist),
        Some(Err(WeightedError::AllWeightsZero)) | None => None,
        Some(Err(err)) => return Err(Error::validation(err.to_string())),
    };

    Ok((0..count)
        .map(|_| match &dist {
            Some(dist) => dist.sample(rng),
            None => rng.gen_range(0..len),
        })
        .collect())
}
