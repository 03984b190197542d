// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canonical include/exclude filters for error logging.
//!
//! Users declare error classes loosely (`include = [EXCEPTION, RUNTIME_EXCEPTION]`,
//! `exclude = [NULL_POINTER_EXCEPTION, ERROR]`).  [`ErrorFilter::build`] reduces that to the
//! smallest equivalent pair of sets so nothing redundant is checked when an error is thrown:
//!
//! 1. within each list, a class whose ancestor is also listed is dropped;
//! 2. an include already covered by an exclude is dropped;
//! 3. an exclude that does not sit below any surviving include is dropped.
//!
//! Both sets are then sorted by depth below the root and name, so two filters declared in a
//! different order compare and hash equal.

use crate::error_class::{self, ErrorClass};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ErrorFilter {
    includes: Vec<&'static ErrorClass>,
    excludes: Vec<&'static ErrorClass>,
}

impl ErrorFilter {
    /**
    Builds the canonical filter for the declared lists.

    ```
    use methodlog::error_filter::ErrorFilter;
    use methodlog::error_class::*;

    let filter = ErrorFilter::build(
        &[&EXCEPTION, &RUNTIME_EXCEPTION],
        &[&NULL_POINTER_EXCEPTION, &ERROR],
    );
    assert_eq!(filter.includes(), &[&EXCEPTION]);
    assert_eq!(filter.excludes(), &[&NULL_POINTER_EXCEPTION]);
    ```
    */
    pub fn build(includes: &[&'static ErrorClass], excludes: &[&'static ErrorClass]) -> Self {
        let includes = reduce_descendants(includes);
        let excludes = reduce_descendants(excludes);
        let includes = optimize_includes(&includes, &excludes);
        let mut excludes = optimize_excludes(&includes, &excludes);
        let mut includes = includes;
        includes.sort();
        excludes.sort();
        Self { includes, excludes }
    }

    #[inline]
    pub fn includes(&self) -> &[&'static ErrorClass] {
        &self.includes
    }

    #[inline]
    pub fn excludes(&self) -> &[&'static ErrorClass] {
        &self.excludes
    }

    /// Whether `class` falls under one of the excludes.
    pub fn is_excluded(&self, class: &ErrorClass) -> bool {
        self.excludes.iter().any(|e| e.is_assignable_from(class))
    }

    /// Smallest distance from any include to `class`, ignoring excludes.
    pub fn include_distance(&self, class: &ErrorClass) -> Option<i32> {
        self.includes
            .iter()
            .map(|include| error_class::distance(include, class))
            .filter(|d| *d >= 0)
            .min()
    }

    /// Whether an error of `class` passes the filter.
    pub fn matches(&self, class: &ErrorClass) -> bool {
        !self.is_excluded(class) && self.include_distance(class).is_some()
    }
}

/// Drops duplicates and every class that has an ancestor elsewhere in `classes`.
pub fn reduce_descendants(classes: &[&'static ErrorClass]) -> Vec<&'static ErrorClass> {
    let mut unique: Vec<&'static ErrorClass> = Vec::with_capacity(classes.len());
    for class in classes {
        if !unique.contains(class) {
            unique.push(*class);
        }
    }
    unique
        .iter()
        .filter(|class| {
            !unique
                .iter()
                .any(|other| other != *class && other.is_assignable_from(class))
        })
        .copied()
        .collect()
}

/// Drops includes that some exclude already covers entirely.
pub fn optimize_includes(
    includes: &[&'static ErrorClass],
    excludes: &[&'static ErrorClass],
) -> Vec<&'static ErrorClass> {
    includes
        .iter()
        .filter(|include| !excludes.iter().any(|e| e.is_assignable_from(include)))
        .copied()
        .collect()
}

/// Keeps only excludes that narrow some include.
pub fn optimize_excludes(
    includes: &[&'static ErrorClass],
    excludes: &[&'static ErrorClass],
) -> Vec<&'static ErrorClass> {
    excludes
        .iter()
        .filter(|exclude| includes.iter().any(|i| i.is_assignable_from(exclude)))
        .copied()
        .collect()
}
