// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Teacher/student score ledger
//!
//! Scores arrive from an external evaluation process between optimization
//! cycles. Entries are only ever inserted or overwritten, never removed.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Which side of the bootstrap produced a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The reference process whose traces are bootstrap candidates
    Teacher,
    /// The system under optimization
    Student,
}

impl Role {
    /// Both roles, in ledger order.
    pub const ALL: [Role; 2] = [Role::Teacher, Role::Student];

    #[inline]
    const fn index(self) -> usize {
        match self {
            Role::Teacher => 0,
            Role::Student => 1,
        }
    }

    /// Lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-role mapping from example identifier to a score in `[0, 1]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreLedger {
    scores: [HashMap<String, f64>; 2],
}

impl ScoreLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a batch of scores for `role`.
    ///
    /// The whole batch is validated before anything is written: a length
    /// mismatch, a non-finite score, or a score outside `[0, 1]` rejects
    /// the batch and leaves the ledger untouched.
    pub fn record<S: AsRef<str>>(
        &mut self,
        ids: &[S],
        scores: &[f64],
        role: Role,
    ) -> Result<()> {
        if ids.len() != scores.len() {
            return Err(Error::validation(format!(
                "ids and scores must have the same length: {} ids, {} scores",
                ids.len(),
                scores.len()
            )));
        }

        for (id, &score) in ids.iter().zip(scores) {
            if !score.is_finite() {
                return Err(Error::validation(format!(
                    "score must be a number, got {} for id {:?}",
                    score,
                    id.as_ref()
                )));
            }
            if !(0.0..=1.0).contains(&score) {
                return Err(Error::validation(format!(
                    "score must be in range [0, 1], got {} for id {:?}",
                    score,
                    id.as_ref()
                )));
            }
        }

        let target = &mut self.scores[role.index()];
        for (id, &score) in ids.iter().zip(scores) {
            target.insert(id.as_ref().to_owned(), score);
        }
        Ok(())
    }

    /// Look up the score recorded for `id` under `role`.
    #[inline]
    pub fn lookup(&self, role: Role, id: &str) -> Option<f64> {
        self.scores[role.index()].get(id).copied()
    }

    /// Number of identifiers scored under `role`.
    pub fn len(&self, role: Role) -> usize {
        self.scores[role.index()].len()
    }

    /// True when neither role has any score.
    pub fn is_empty(&self) -> bool {
        self.scores.iter().all(HashMap::is_empty)
    }

    /// Identifiers scored under `role`, in arbitrary order.
    pub fn ids(&self, role: Role) -> impl Iterator<Item = &str> + '_ {
        self.scores[role.index()].keys().map(String::as_str)
    }
}
