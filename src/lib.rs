//SPDX-License-Identifier: MIT OR Apache-2.0
/*!
# methodlog

methodlog is declarative logging for intercepted method calls.

# Development status

methodlog is experimental and the API may change.

# The problem

Most call logging is written by hand: a line at the top of the function, another before every
`return`, a third in every error path.  It drifts out of date, it logs at whatever level the
author felt like that day, and it renders arguments that should never leave the process.

methodlog instead lets a class *declare* what it wants logged.  A host that can intercept
calls (a proxy layer, an RPC dispatcher, a plugin runtime) describes each class with a
[`ClassDescriptor`](descriptor::ClassDescriptor), and methodlog turns the declarations into
interceptors that log on entry, on exit and on failure.

# The declarations

| Declaration                       | On        | Logs                                               |
|-----------------------------------|-----------|----------------------------------------------------|
| [`Logging`](annotation::Logging)  | method    | entry and exit                                     |
| [`LogEntry`](annotation::LogEntry)| method    | entry, with arguments when verbose                 |
| [`LogExit`](annotation::LogExit)  | method    | exit, with the result when verbose                 |
| [`LogError`](annotation::LogError)| method    | thrown errors, filtered by error class             |
| [`LogArg`](annotation::LogArg)    | parameter | the argument, on its own threshold                 |
| [`Mdc`](annotation::Mdc)          | both      | a diagnostic-context entry for the call's duration |

Every declaration names the backend it targets; the empty name means the default backend.

# Messages

Messages are deliberately terse and start with a marker:

```text
DEBUG app.Orders.place > order=Order { id: 7 }, express=true
DEBUG app.Orders.place < Receipt { total: 12 }
ERROR app.Orders.place ! IOException: disk full
DEBUG app.Orders.place <!
```

The logger name is the declaring class and method, so existing level configuration by dotted
prefix applies unchanged.

# The API

```rust
use methodlog::annotation::{LogError, Logging};
use methodlog::descriptor::{ClassDescriptor, MethodDescriptor, ParamDescriptor};
use methodlog::error_class::{Exception, IO_EXCEPTION};
use methodlog::instrumentor::Instrumentor;
use methodlog::{InMemoryBackend, TypeDesc, Value};
use std::sync::Arc;

let memory = Arc::new(InMemoryBackend::new());
let instrumentor = Instrumentor::builder().backend("main", memory.clone()).build().unwrap();

let class = ClassDescriptor::builder("app.Files")
    .method(
        MethodDescriptor::builder("read")
            .param(ParamDescriptor::new("path", TypeDesc::plain::<String>()))
            .annotate(Logging::default())
            .annotate(LogError::default()),
    )
    .build();
let chain = instrumentor.chain_for(&class).unwrap().unwrap();

let args = [Some(Value::from("/etc/motd"))];
let outcome = chain.invoke(&class.methods()[0], &args, || {
    Err(Box::new(Exception::new(&IO_EXCEPTION, "disk full")))
});
assert!(outcome.is_err());
assert_eq!(
    memory.messages(),
    ["> path=\"/etc/motd\"", "! IOException: disk full", "<!"]
);
```

Code between intercepted calls can log with [`manual_log!`].

# Diagnostic context

The [`context`] module holds a thread-local map of key/value pairs that every record captures
when it is created.  [`Mdc`](annotation::Mdc) declarations fill it for the duration of a call.
If you are spawning a child thread or writing an async executor, use
[`ContextSnapshot`](context::ContextSnapshot) and [`ApplyContext`](context::ApplyContext) to
carry the context along.
*/

mod level;
pub mod error;
pub mod value;
pub mod error_class;
pub mod error_filter;
pub mod error_resolver;
pub mod printer;
pub mod expression;
pub mod annotation;
pub mod descriptor;
pub mod extractor;
pub mod definition;
pub mod validation;
pub mod plan_cache;
pub mod message;
pub mod context;
mod log_record;
pub mod backend;
pub mod config;
mod inmemory_backend;
mod stderror_backend;
mod tracing_backend;
pub mod global_backend;
pub mod manual;
pub mod interceptor;
pub mod instrumentor;

pub use level::{Level, ParseLevelError};
pub use value::{TypeDesc, Value};
pub use log_record::LogRecord;
pub use backend::LogBackend;
pub use inmemory_backend::InMemoryBackend;
pub use stderror_backend::StdErrorBackend;
pub use tracing_backend::TracingBackend;
pub use global_backend::{add_global_backend, global_backends, set_global_backends};
pub use error::{ConfigError, UsageError, UsageRule};
pub use instrumentor::{Instrumentor, InstrumentorBuilder};
pub use interceptor::{InterceptorChain, Outcome};
