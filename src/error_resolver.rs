// SPDX-License-Identifier: MIT OR Apache-2.0

//! Picking the error definition for a thrown error.
//!
//! A definition is eligible when the thrown class is not excluded by it.  Among eligible
//! definitions the one with an include nearest to the thrown class wins, and ties go to the
//! definition declared first.  Results are memoized per thrown class for the lifetime of the
//! plan, including the "nothing matched" outcome.

use crate::definition::ErrorDefinition;
use crate::error_class::ErrorClass;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Definition(usize),
    NoMatch,
}

#[derive(Debug)]
pub struct ErrorResolver {
    definitions: Vec<ErrorDefinition>,
    cache: RwLock<HashMap<&'static str, Resolution>>,
}

impl ErrorResolver {
    /// `definitions` in declaration order.
    pub fn new(definitions: Vec<ErrorDefinition>) -> Self {
        Self {
            definitions,
            cache: RwLock::new(HashMap::new()),
        }
    }

    #[inline]
    pub fn definitions(&self) -> &[ErrorDefinition] {
        &self.definitions
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// The definition that applies to an error of `class`, if any.
    pub fn resolve(&self, class: &ErrorClass) -> Option<&ErrorDefinition> {
        let cached = self
            .cache
            .read()
            .ok()
            .and_then(|cache| cache.get(class.name()).copied());
        let resolution = match cached {
            Some(resolution) => resolution,
            None => {
                let computed = self.compute(class);
                // Same input, same answer: concurrent writers are interchangeable.
                if let Ok(mut cache) = self.cache.write() {
                    cache.insert(class.name(), computed);
                }
                computed
            }
        };
        match resolution {
            Resolution::Definition(index) => self.definitions.get(index),
            Resolution::NoMatch => None,
        }
    }

    fn compute(&self, class: &ErrorClass) -> Resolution {
        let mut best: Option<(usize, i32)> = None;
        for (index, definition) in self.definitions.iter().enumerate() {
            if definition.filter.is_excluded(class) {
                continue;
            }
            let Some(distance) = definition.filter.include_distance(class) else {
                continue;
            };
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((index, distance));
            }
        }
        best.map_or(Resolution::NoMatch, |(index, _)| Resolution::Definition(index))
    }

    #[cfg(test)]
    fn cached(&self, class: &ErrorClass) -> Option<Resolution> {
        self.cache.read().ok()?.get(class.name()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Level;
    use crate::error_class::*;
    use crate::error_filter::ErrorFilter;

    fn definition(level: Level, include: &[&'static ErrorClass], exclude: &[&'static ErrorClass]) -> ErrorDefinition {
        ErrorDefinition {
            level,
            if_enabled: None,
            verbose: None,
            filter: ErrorFilter::build(include, exclude),
        }
    }

    #[test]
    fn nearest_include_wins() {
        let resolver = ErrorResolver::new(vec![
            definition(Level::Error, &[&EXCEPTION, &ERROR], &[]),
            definition(Level::Warn, &[&RUNTIME_EXCEPTION], &[&NULL_POINTER_EXCEPTION]),
        ]);
        assert_eq!(resolver.resolve(&RUNTIME_EXCEPTION).map(|d| d.level), Some(Level::Warn));
        assert_eq!(resolver.resolve(&IO_EXCEPTION).map(|d| d.level), Some(Level::Error));
    }

    #[test]
    fn exclusion_removes_nearest_candidate() {
        let resolver = ErrorResolver::new(vec![
            definition(Level::Error, &[&EXCEPTION], &[]),
            definition(Level::Warn, &[&RUNTIME_EXCEPTION], &[&NULL_POINTER_EXCEPTION]),
        ]);
        assert_eq!(resolver.resolve(&NULL_POINTER_EXCEPTION).map(|d| d.level), Some(Level::Error));
    }

    #[test]
    fn tie_goes_to_first_declared() {
        let resolver = ErrorResolver::new(vec![
            definition(Level::Info, &[&RUNTIME_EXCEPTION], &[]),
            definition(Level::Error, &[&RUNTIME_EXCEPTION, &ERROR], &[]),
        ]);
        assert_eq!(resolver.resolve(&ILLEGAL_STATE_EXCEPTION).map(|d| d.level), Some(Level::Info));
    }

    #[test]
    fn no_match_is_cached() {
        let resolver = ErrorResolver::new(vec![definition(Level::Error, &[&IO_EXCEPTION], &[])]);
        assert!(resolver.cached(&ERROR).is_none());
        assert!(resolver.resolve(&ERROR).is_none());
        assert_eq!(resolver.cached(&ERROR), Some(Resolution::NoMatch));
        assert!(resolver.resolve(&IO_EXCEPTION).is_some());
        assert_eq!(resolver.cached(&IO_EXCEPTION), Some(Resolution::Definition(0)));
    }
}
