// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Core type definitions

use std::borrow::Cow;
use std::collections::BTreeMap;

/// Input/Output field map using zero-copy strings.
///
/// Ordered so that rendered demos list their fields in a stable order.
pub type FieldMap<'a> = BTreeMap<Cow<'a, str>, Cow<'a, str>>;

/// Demos keyed by identifier, as held by a parameter's trace collections.
pub type Traces<D> = BTreeMap<String, D>;
