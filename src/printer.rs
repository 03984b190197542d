// SPDX-License-Identifier: MIT OR Apache-2.0

//! Value printers.
//!
//! A printer turns an argument or return [`Value`] into the text that appears in a log
//! message.  Which printer renders a given parameter is decided once, when the plan for the
//! method is built:
//!
//! 1. an explicit printer name (or alias) on the declaration wins;
//! 2. otherwise the first registered printer that [supports](ValuePrinter::supports) the
//!    declared type, in priority order;
//! 3. otherwise, or when the explicit name is unknown, the universal [`DebugPrinter`].
//!
//! Rendering never fails from the caller's point of view.  A printer that errors or panics is
//! replaced by the fallback's output for that value, and if a post-processor fails the raw
//! printer output is used as-is.

use crate::error::PrintError;
use crate::value::{TypeDesc, Value};
use regex::Regex;
use std::collections::HashMap;
use std::fmt::Debug;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, RwLock};

pub trait ValuePrinter: Debug + Send + Sync {
    /// Name used to select this printer explicitly.
    fn name(&self) -> &str;

    /// Alternative names accepted for explicit selection.
    fn aliases(&self) -> &[&'static str] {
        &[]
    }

    /// Whether every value of the declared type can be printed.
    fn supports(&self, ty: &TypeDesc) -> bool;

    fn print(&self, value: &Value) -> Result<String, PrintError>;
}

/// The universal printer: `{:?}` of anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DebugPrinter;

impl ValuePrinter for DebugPrinter {
    fn name(&self) -> &str {
        "debug"
    }

    fn aliases(&self) -> &[&'static str] {
        &["toString", "string"]
    }

    fn supports(&self, _ty: &TypeDesc) -> bool {
        true
    }

    fn print(&self, value: &Value) -> Result<String, PrintError> {
        Ok(value.debug_string())
    }
}

/// `{}` of `Display` values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DisplayPrinter;

impl ValuePrinter for DisplayPrinter {
    fn name(&self) -> &str {
        "display"
    }

    fn supports(&self, ty: &TypeDesc) -> bool {
        ty.is_displayable()
    }

    fn print(&self, value: &Value) -> Result<String, PrintError> {
        value.display_string().ok_or_else(|| PrintError::Unsupported {
            printer: self.name().to_string(),
            type_name: value.type_name(),
        })
    }
}

/// JSON of `Serialize` values, compact or pretty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct JsonPrinter {
    pretty: bool,
}

impl JsonPrinter {
    pub const fn new() -> Self {
        Self { pretty: false }
    }

    pub const fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl ValuePrinter for JsonPrinter {
    fn name(&self) -> &str {
        if self.pretty { "json-pretty" } else { "json" }
    }

    fn supports(&self, ty: &TypeDesc) -> bool {
        ty.is_serializable()
    }

    fn print(&self, value: &Value) -> Result<String, PrintError> {
        let json = value.to_json().ok_or_else(|| PrintError::Unsupported {
            printer: self.name().to_string(),
            type_name: value.type_name(),
        })??;
        let text = if self.pretty {
            serde_json::to_string_pretty(&json)?
        } else {
            serde_json::to_string(&json)?
        };
        Ok(text)
    }
}

/// A stage applied to every rendered value, after the printer.
pub trait PostProcessor: Debug + Send + Sync {
    fn process(&self, rendered: String) -> Result<String, PrintError>;
}

/// Caps rendered values at a number of characters, marking the cut with `...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Truncate {
    pub max_chars: usize,
}

impl PostProcessor for Truncate {
    fn process(&self, rendered: String) -> Result<String, PrintError> {
        match rendered.char_indices().nth(self.max_chars) {
            None => Ok(rendered),
            Some((cut, _)) => Ok(format!("{}...", &rendered[..cut])),
        }
    }
}

/// Masks every match of a pattern.
#[derive(Debug, Clone)]
pub struct Redact {
    pattern: Regex,
    replacement: String,
}

impl Redact {
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            replacement: replacement.into(),
        })
    }
}

impl PostProcessor for Redact {
    fn process(&self, rendered: String) -> Result<String, PrintError> {
        Ok(self
            .pattern
            .replace_all(&rendered, self.replacement.as_str())
            .into_owned())
    }
}

/**
The printer picked for one parameter or return type, together with the fallback and
the post-processing pipeline it renders through.
*/
#[derive(Debug, Clone)]
pub struct ResolvedPrinter {
    printer: Arc<dyn ValuePrinter>,
    fallback: Arc<dyn ValuePrinter>,
    post: Arc<[Arc<dyn PostProcessor>]>,
}

impl ResolvedPrinter {
    #[inline]
    pub fn name(&self) -> &str {
        self.printer.name()
    }

    /**
    Renders a value.  Never fails.

    ```
    use methodlog::printer::PrinterRegistry;
    use methodlog::{TypeDesc, Value};

    let registry = PrinterRegistry::new();
    let printer = registry.resolve(None, &TypeDesc::plain::<String>());
    assert_eq!(printer.name(), "json");
    assert_eq!(printer.render(&Value::from("a")), "\"a\"");
    ```
    */
    pub fn render(&self, value: &Value) -> String {
        let raw = match attempt(self.printer.as_ref(), value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(
                    printer = self.printer.name(),
                    type_name = value.type_name(),
                    error = %e,
                    "printer failed, using fallback"
                );
                attempt(self.fallback.as_ref(), value)
                    .unwrap_or_else(|_| format!("<unprintable {}>", value.type_name()))
            }
        };
        let mut processed = raw.clone();
        for stage in self.post.iter() {
            match stage.process(processed) {
                Ok(next) => processed = next,
                Err(e) => {
                    tracing::warn!(error = %e, "post-processing failed, using raw output");
                    return raw;
                }
            }
        }
        processed
    }
}

fn attempt(printer: &dyn ValuePrinter, value: &Value) -> Result<String, PrintError> {
    catch_unwind(AssertUnwindSafe(|| printer.print(value))).unwrap_or_else(|_| {
        Err(PrintError::Panicked {
            printer: printer.name().to_string(),
        })
    })
}

/**
The configured printers, in priority order.

Resolutions are cached per `(explicit name, declared type)`; the cache only ever holds values
that recomputing would produce again, so concurrent first lookups may both compute.
*/
#[derive(Debug)]
pub struct PrinterRegistry {
    printers: Vec<Arc<dyn ValuePrinter>>,
    fallback: Arc<dyn ValuePrinter>,
    post: Arc<[Arc<dyn PostProcessor>]>,
    cache: RwLock<HashMap<(Option<String>, TypeDesc), ResolvedPrinter>>,
}

impl Default for PrinterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PrinterRegistry {
    /// JSON first, then `Display`, then the debug fallback.
    pub fn new() -> Self {
        Self::with_printers(vec![Arc::new(JsonPrinter::new()), Arc::new(DisplayPrinter)])
    }

    pub fn with_printers(printers: Vec<Arc<dyn ValuePrinter>>) -> Self {
        Self {
            printers,
            fallback: Arc::new(DebugPrinter),
            post: Arc::from(Vec::new()),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Appends a printer at the lowest priority.
    pub fn register(&mut self, printer: Arc<dyn ValuePrinter>) {
        self.printers.push(printer);
        self.clear_cache();
    }

    /// Moves the named printers to the front, in the given order.  Unknown names are ignored.
    pub fn prioritize(&mut self, order: &[String]) {
        let mut ordered = Vec::with_capacity(self.printers.len());
        for name in order {
            if let Some(pos) = self.printers.iter().position(|p| answers_to(p, name)) {
                ordered.push(self.printers.remove(pos));
            }
        }
        ordered.append(&mut self.printers);
        self.printers = ordered;
        self.clear_cache();
    }

    pub fn add_post_processor(&mut self, stage: Arc<dyn PostProcessor>) {
        let mut stages: Vec<_> = self.post.iter().cloned().collect();
        stages.push(stage);
        self.post = Arc::from(stages);
        self.clear_cache();
    }

    pub fn printers(&self) -> &[Arc<dyn ValuePrinter>] {
        &self.printers
    }

    /// Picks the printer for a declared type.
    pub fn resolve(&self, explicit: Option<&str>, ty: &TypeDesc) -> ResolvedPrinter {
        let explicit = explicit.filter(|name| !name.is_empty());
        let key = (explicit.map(str::to_string), ty.clone());
        if let Some(found) = self.cache.read().ok().and_then(|c| c.get(&key).cloned()) {
            return found;
        }
        let printer = match explicit {
            Some(name) => self.by_name(name).unwrap_or_else(|| {
                tracing::debug!(printer = name, "unknown printer name, using fallback");
                self.fallback.clone()
            }),
            None => self
                .printers
                .iter()
                .find(|p| p.supports(ty))
                .cloned()
                .unwrap_or_else(|| self.fallback.clone()),
        };
        let resolved = ResolvedPrinter {
            printer,
            fallback: self.fallback.clone(),
            post: self.post.clone(),
        };
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(key, resolved.clone());
        }
        resolved
    }

    fn by_name(&self, name: &str) -> Option<Arc<dyn ValuePrinter>> {
        self.printers
            .iter()
            .chain(std::iter::once(&self.fallback))
            .find(|p| answers_to(p, name))
            .cloned()
    }

    fn clear_cache(&mut self) {
        if let Ok(cache) = self.cache.get_mut() {
            cache.clear();
        }
    }
}

fn answers_to(printer: &Arc<dyn ValuePrinter>, name: &str) -> bool {
    printer.name() == name || printer.aliases().contains(&name)
}
