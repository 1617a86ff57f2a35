//! Structured, leveled logging facade with automatic trace-id injection.
//!
//! Wraps a pluggable output engine ([`Drain`]) behind a small builder surface:
//! log level, output sinks, and an optional trace-extraction function that
//! pulls a `trace_id` out of a request-scoped [`Context`] on every call.
//!
//! By default a logger writes one JSON object per record to stdout:
//!
//! ```
//! use svclog::{Context, Field, Logger};
//!
//! let log = Logger::builder("checkout").build().unwrap();
//! log.info(&Context::new(), "order placed", &[Field::new("order_id", 42)]);
//! ```

pub mod context;
pub mod error;
pub mod level;
pub mod logger;
pub mod record;
pub mod sink;

pub use context::Context;
pub use error::LogError;
pub use level::Level;
pub use logger::{Logger, LoggerBuilder, TraceIdFn};
pub use record::{Field, Record};
pub use sink::{register_sink_scheme, Drain, JsonDrain, SinkFactory, TracingDrain};
