// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static types and dynamic values of intercepted calls.
//!
//! A [`TypeDesc`] is what a parameter or return type *declares*; printers are chosen from it
//! once, when the plan is built.  A [`Value`] is what actually flows through a call.  It keeps
//! the original value behind an `Arc<dyn Any>` together with the rendering hooks that were
//! available when it was constructed, so a printer can format it without knowing its type.
//!
//! `None` in an argument list or as a return value stands for `null`.

use serde::Serialize;
use std::any::Any;
use std::fmt::{Debug, Display};
use std::sync::Arc;

/**
Declared type of a parameter or return value.

The capability flags describe what every value of this type can do, and are what
[`ValuePrinter::supports`](crate::printer::ValuePrinter::supports) looks at.
*/
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDesc {
    name: &'static str,
    void: bool,
    display: bool,
    json: bool,
}

impl TypeDesc {
    /// The return type of a method that returns nothing.
    pub const fn void() -> Self {
        Self {
            name: "()",
            void: true,
            display: false,
            json: false,
        }
    }

    /// A type that is only known to be `Debug`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::named(std::any::type_name::<T>())
    }

    /// A type known by name only.  Bridge methods use this for their erased parameters.
    pub const fn named(name: &'static str) -> Self {
        Self {
            name,
            void: false,
            display: false,
            json: false,
        }
    }

    /// A type whose values are `Display`.
    pub fn displayable<T: Display + ?Sized + 'static>() -> Self {
        Self {
            display: true,
            ..Self::of::<T>()
        }
    }

    /// A type whose values are `Serialize`.
    pub fn serializable<T: Serialize + ?Sized + 'static>() -> Self {
        Self {
            json: true,
            ..Self::of::<T>()
        }
    }

    /// A `Display + Serialize` type, which covers strings, numbers and booleans.
    pub fn plain<T: Display + Serialize + ?Sized + 'static>() -> Self {
        Self {
            display: true,
            json: true,
            ..Self::of::<T>()
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        self.void
    }

    #[inline]
    pub fn is_displayable(&self) -> bool {
        self.display
    }

    #[inline]
    pub fn is_serializable(&self) -> bool {
        self.json
    }
}

type Render = fn(&dyn Any) -> Option<String>;
type RenderJson = fn(&dyn Any) -> Option<Result<serde_json::Value, serde_json::Error>>;

fn render_debug<T: Debug + 'static>(value: &dyn Any) -> Option<String> {
    value.downcast_ref::<T>().map(|v| format!("{v:?}"))
}

fn render_display<T: Display + 'static>(value: &dyn Any) -> Option<String> {
    value.downcast_ref::<T>().map(|v| v.to_string())
}

fn render_json<T: Serialize + 'static>(value: &dyn Any) -> Option<Result<serde_json::Value, serde_json::Error>> {
    value.downcast_ref::<T>().map(serde_json::to_value)
}

/**
A dynamically typed argument or return value.

```
use methodlog::Value;

let v = Value::from("widget");
assert_eq!(v.debug_string(), "\"widget\"");
assert_eq!(v.display_string().as_deref(), Some("widget"));
assert_eq!(v.downcast_ref::<String>().map(String::as_str), Some("widget"));
```
*/
#[derive(Clone)]
pub struct Value {
    data: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
    debug: Render,
    display: Option<Render>,
    json: Option<RenderJson>,
}

impl Value {
    /// Wraps any `Debug` value.
    pub fn debug<T: Debug + Send + Sync + 'static>(value: T) -> Self {
        Self {
            data: Arc::new(value),
            type_name: std::any::type_name::<T>(),
            debug: render_debug::<T>,
            display: None,
            json: None,
        }
    }

    /// Wraps a `Display` value.
    pub fn displayable<T: Debug + Display + Send + Sync + 'static>(value: T) -> Self {
        Self {
            display: Some(render_display::<T>),
            ..Self::debug(value)
        }
    }

    /// Wraps a `Serialize` value.
    pub fn serializable<T: Debug + Serialize + Send + Sync + 'static>(value: T) -> Self {
        Self {
            json: Some(render_json::<T>),
            ..Self::debug(value)
        }
    }

    /// Wraps a value that is both `Display` and `Serialize`.
    pub fn plain<T: Debug + Display + Serialize + Send + Sync + 'static>(value: T) -> Self {
        Self {
            display: Some(render_display::<T>),
            json: Some(render_json::<T>),
            ..Self::debug(value)
        }
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.data.downcast_ref::<T>()
    }

    /// The `{:?}` rendering.  Always available.
    pub fn debug_string(&self) -> String {
        (self.debug)(self.data.as_ref()).unwrap_or_default()
    }

    /// The `{}` rendering, if this value was built with `Display` support.
    pub fn display_string(&self) -> Option<String> {
        self.display.and_then(|render| render(self.data.as_ref()))
    }

    /// The JSON form, if this value was built with `Serialize` support.
    pub fn to_json(&self) -> Option<Result<serde_json::Value, serde_json::Error>> {
        self.json.and_then(|render| render(self.data.as_ref()))
    }

    /// Whether [`display_string`](Self::display_string) can succeed.
    pub fn is_displayable(&self) -> bool {
        self.display.is_some()
    }

    /// Whether [`to_json`](Self::to_json) can succeed.
    pub fn is_serializable(&self) -> bool {
        self.json.is_some()
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.debug_string())
    }
}

/*
Boilerplate notes for Value:

- Clone: cheap, Arc-backed
- PartialEq/Hash: not implemented, the inner value may support neither
- Default: no meaningful empty value, `None` already means null
*/

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::plain(value.to_string())
    }
}

macro_rules! plain_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Value::plain(value)
                }
            }
        )*
    };
}

plain_from!(String, bool, char, i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, isize, usize, f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize)]
    struct Order {
        id: u32,
        sku: &'static str,
    }

    #[test]
    fn debug_only_value() {
        let v = Value::debug(vec![1, 2]);
        assert_eq!(v.debug_string(), "[1, 2]");
        assert!(v.display_string().is_none());
        assert!(v.to_json().is_none());
    }

    #[test]
    fn serializable_value() {
        let v = Value::serializable(Order { id: 7, sku: "a-1" });
        let json = v.to_json().expect("json hook").expect("serializes");
        assert_eq!(json["id"], 7);
        assert_eq!(v.downcast_ref::<Order>().map(|o| o.sku), Some("a-1"));
    }

    #[test]
    fn type_descriptors() {
        assert!(TypeDesc::void().is_void());
        let t = TypeDesc::plain::<String>();
        assert!(t.is_displayable() && t.is_serializable());
        assert_eq!(t.name(), std::any::type_name::<String>());
        assert!(!TypeDesc::of::<Vec<u8>>().is_serializable());
    }
}
