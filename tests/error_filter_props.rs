// SPDX-License-Identifier: MIT OR Apache-2.0

//! Properties of error filters and class distance over the built-in hierarchy.

use methodlog::error_class::*;
use methodlog::error_filter::{ErrorFilter, optimize_excludes, optimize_includes, reduce_descendants};
use proptest::prelude::*;

static CUSTOM: ErrorClass = ErrorClass::new("app.CustomException", &ILLEGAL_STATE_EXCEPTION);

static CLASSES: [&ErrorClass; 11] = [
    &THROWABLE,
    &EXCEPTION,
    &ERROR,
    &RUNTIME_EXCEPTION,
    &IO_EXCEPTION,
    &ILLEGAL_ARGUMENT_EXCEPTION,
    &ILLEGAL_STATE_EXCEPTION,
    &NULL_POINTER_EXCEPTION,
    &INDEX_OUT_OF_BOUNDS_EXCEPTION,
    &ARRAY_INDEX_OUT_OF_BOUNDS_EXCEPTION,
    &CUSTOM,
];

fn class() -> impl Strategy<Value = &'static ErrorClass> {
    (0..CLASSES.len()).prop_map(|i| CLASSES[i])
}

fn classes() -> impl Strategy<Value = Vec<&'static ErrorClass>> {
    prop::collection::vec(class(), 0..6)
}

proptest! {
    #[test]
    fn reduced_set_has_no_ancestor_pairs(input in classes()) {
        let reduced = reduce_descendants(&input);
        for a in &reduced {
            for b in &reduced {
                if a != b {
                    prop_assert!(!a.is_assignable_from(b), "{} covers {}", a.name(), b.name());
                }
            }
        }
    }

    #[test]
    fn reduction_keeps_coverage(input in classes(), thrown in class()) {
        let reduced = reduce_descendants(&input);
        let before = input.iter().any(|c| c.is_assignable_from(thrown));
        let after = reduced.iter().any(|c| c.is_assignable_from(thrown));
        prop_assert_eq!(before, after);
    }

    #[test]
    fn optimization_is_idempotent(includes in classes(), excludes in classes()) {
        let includes = reduce_descendants(&includes);
        let excludes = reduce_descendants(&excludes);
        let once_inc = optimize_includes(&includes, &excludes);
        let once_exc = optimize_excludes(&once_inc, &excludes);
        let twice_inc = optimize_includes(&once_inc, &once_exc);
        let twice_exc = optimize_excludes(&twice_inc, &once_exc);
        prop_assert_eq!(once_inc, twice_inc);
        prop_assert_eq!(once_exc, twice_exc);
    }

    #[test]
    fn built_filter_is_a_fixed_point(includes in classes(), excludes in classes()) {
        let filter = ErrorFilter::build(&includes, &excludes);
        let rebuilt = ErrorFilter::build(filter.includes(), filter.excludes());
        prop_assert_eq!(filter, rebuilt);
    }

    #[test]
    fn built_filter_matches_like_the_declaration(
        includes in classes(),
        excludes in classes(),
        thrown in class(),
    ) {
        let filter = ErrorFilter::build(&includes, &excludes);
        let declared = includes.iter().any(|c| c.is_assignable_from(thrown))
            && !excludes.iter().any(|c| c.is_assignable_from(thrown));
        prop_assert_eq!(filter.matches(thrown), declared);
    }

    #[test]
    fn distance_orders_ancestors(thrown in class()) {
        let mut previous = -1;
        let mut current = Some(thrown);
        let mut chain = Vec::new();
        while let Some(c) = current {
            chain.push(c);
            current = c.parent();
        }
        for ancestor in chain {
            let d = distance(ancestor, thrown);
            prop_assert_eq!(d, previous + 1);
            previous = d;
        }
    }

    #[test]
    fn distance_is_negative_for_non_ancestors(a in class(), b in class()) {
        let d = distance(a, b);
        prop_assert_eq!(d >= 0, a.is_assignable_from(b));
        if a == b {
            prop_assert_eq!(d, 0);
        }
    }
}

#[test]
#[should_panic(expected = "interface")]
fn distance_rejects_interfaces() {
    static CLOSEABLE: ErrorClass = ErrorClass::interface("Closeable");
    distance(&CLOSEABLE, &IO_EXCEPTION);
}
