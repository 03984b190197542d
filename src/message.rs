// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message text for intercepted calls.
//!
//! Every message starts with a one-character marker:
//!
//! | marker | event                                   |
//! |--------|-----------------------------------------|
//! | `>`    | entry, optionally `> a=1, b="x"`        |
//! | `<`    | exit, optionally `< value` or `< null`  |
//! | `!`    | error, `! Class` or `! Class: message`  |
//! | `*`    | manual log call                         |
//!
//! and `<!` marks a call that ended by throwing.

use crate::Level;
use crate::definition::{EntryDefinition, ExitDefinition};
use crate::error_class::Throwable;
use crate::level::gate_satisfied;
use crate::value::Value;

pub const ENTRY: &str = ">";
pub const EXIT: &str = "<";
pub const ERROR: &str = "!";
pub const MANUAL: &str = "*";
pub const EMERGENCY_EXIT: &str = "<!";

const NULL: &str = "null";

/**
Builds the entry message.

An argument is rendered when its own threshold, or failing that the entry's verbosity
threshold, is enabled at `effective`.  Rendered arguments are joined with `, ` in parameter
order, as `name=value` when the name is known and `print_names` is set, else as bare values.
*/
pub fn entry_message(
    entry: &EntryDefinition,
    names: &[Option<String>],
    args: &[Option<Value>],
    effective: Level,
    print_names: bool,
) -> String {
    let clause = argument_clause(entry, names, args, effective, print_names);
    if clause.is_empty() {
        ENTRY.to_string()
    } else {
        format!("{ENTRY} {clause}")
    }
}

/// The part of the entry message after the marker.  Empty when nothing qualifies.
pub fn argument_clause(
    entry: &EntryDefinition,
    names: &[Option<String>],
    args: &[Option<Value>],
    effective: Level,
    print_names: bool,
) -> String {
    let threshold = entry.verbose_threshold();
    let mut parts: Vec<String> = Vec::new();
    for (index, definition) in entry.args.iter().enumerate() {
        let Some(definition) = definition else {
            continue;
        };
        if !gate_satisfied(Some(definition.if_enabled.unwrap_or(threshold)), effective) {
            continue;
        }
        let rendered = match args.get(index).and_then(Option::as_ref) {
            Some(value) => definition.printer.render(value),
            None => NULL.to_string(),
        };
        match names.get(index).and_then(Option::as_deref) {
            Some(name) if print_names => parts.push(format!("{name}={rendered}")),
            _ => parts.push(rendered),
        }
    }
    parts.join(", ")
}

/// Builds the exit message.  A void method never gets a value; a `None` result renders as `null`.
pub fn exit_message(exit: &ExitDefinition, result: Option<&Value>, effective: Level) -> String {
    let Some(printer) = &exit.printer else {
        return EXIT.to_string();
    };
    if !exit.verbose_threshold().is_enabled(effective) {
        return EXIT.to_string();
    }
    match result {
        Some(value) => format!("{EXIT} {}", printer.render(value)),
        None => format!("{EXIT} {NULL}"),
    }
}

/// `! Class: message` when verbose, `! Class` otherwise.
pub fn error_message(error: &dyn Throwable, verbose: bool) -> String {
    let class = error.error_class().name();
    if verbose {
        format!("{ERROR} {class}: {error}")
    } else {
        format!("{ERROR} {class}")
    }
}
