//! The logger facade: option resolution, trace injection, and child derivation.

use std::panic::Location;
use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};

use crate::context::Context;
use crate::error::LogError;
use crate::level::Level;
use crate::record::{Field, Record};
use crate::sink::{Drain, JsonDrain};

/// Extracts a trace identifier from a request-scoped [`Context`]. An empty
/// string means no trace id is available.
pub type TraceIdFn = Arc<dyn Fn(&Context) -> String + Send + Sync>;

/// A structured, leveled logger bound to a service name.
///
/// Wraps an output engine ([`Drain`]) and augments every record with the
/// service name, persistent fields accumulated via [`with`](Logger::with), and
/// a `trace_id` extracted from the per-call context when configured.
///
/// Cloning via `with` is cheap; the engine handle is shared, never re-opened.
#[derive(Clone)]
pub struct Logger {
    drain: Arc<dyn Drain>,
    trace_id_fn: Option<TraceIdFn>,
    level: Level,
    base_fields: Vec<Field>,
}

/// Builder for [`Logger`]. Setters overwrite prior values, so the last call
/// for a given setting wins.
pub struct LoggerBuilder {
    service: String,
    level: Level,
    output_paths: Vec<String>,
    trace_id_fn: Option<TraceIdFn>,
    drain: Option<Arc<dyn Drain>>,
}

impl Logger {
    /// Start building a logger for the given service.
    ///
    /// Defaults: level `info`, output paths `["stdout"]`, no trace extraction.
    pub fn builder(service: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder {
            service: service.into(),
            level: Level::Info,
            output_paths: vec!["stdout".to_string()],
            trace_id_fn: None,
            drain: None,
        }
    }

    /// Log at debug level.
    #[track_caller]
    pub fn debug(&self, ctx: &Context, msg: &str, fields: &[Field]) {
        self.log(Level::Debug, ctx, msg, fields);
    }

    /// Log at info level.
    #[track_caller]
    pub fn info(&self, ctx: &Context, msg: &str, fields: &[Field]) {
        self.log(Level::Info, ctx, msg, fields);
    }

    /// Log at error level.
    #[track_caller]
    pub fn error(&self, ctx: &Context, msg: &str, fields: &[Field]) {
        self.log(Level::Error, ctx, msg, fields);
    }

    /// Derive a child logger carrying extra persistent fields.
    ///
    /// The child shares this logger's engine handle and trace function and
    /// copies its level; it holds the parent's persistent fields followed by
    /// `fields`. The parent is not modified.
    pub fn with(&self, fields: &[Field]) -> Logger {
        let mut base_fields = self.base_fields.clone();
        base_fields.extend(fields.iter().cloned());
        Logger {
            drain: Arc::clone(&self.drain),
            trace_id_fn: self.trace_id_fn.clone(),
            level: self.level,
            base_fields,
        }
    }

    /// Block until buffered records have reached their sinks.
    pub fn flush(&self) -> Result<(), LogError> {
        self.drain.flush()
    }

    /// The minimum severity this logger emits.
    pub fn level(&self) -> Level {
        self.level
    }

    #[track_caller]
    fn log(&self, level: Level, ctx: &Context, msg: &str, fields: &[Field]) {
        if level < self.level {
            return;
        }
        let caller = Location::caller();

        // Persistent fields first, then call-site fields, trace id last. The
        // map resolves duplicate keys last-write-wins.
        let mut map = Map::with_capacity(self.base_fields.len() + fields.len() + 1);
        for field in &self.base_fields {
            map.insert(field.key().to_string(), field.value().clone());
        }
        for field in fields {
            map.insert(field.key().to_string(), field.value().clone());
        }
        if let Some(trace_id_fn) = &self.trace_id_fn {
            let trace_id = trace_id_fn(ctx);
            if !trace_id.is_empty() {
                map.insert("trace_id".to_string(), Value::String(trace_id));
            }
        }

        let record = Record {
            level,
            ts: Utc::now(),
            caller: format!("{}:{}", caller.file(), caller.line()),
            msg: msg.to_string(),
            fields: map,
        };
        self.drain.emit(&record);
    }
}

impl LoggerBuilder {
    /// Set the minimum emitted severity.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Replace the output sink list. An empty list fails at build time.
    pub fn output_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Set the trace-extraction function invoked on every log call.
    pub fn trace_id_fn(
        mut self,
        f: impl Fn(&Context) -> String + Send + Sync + 'static,
    ) -> Self {
        self.trace_id_fn = Some(Arc::new(f));
        self
    }

    /// Inject a custom output engine, bypassing sink resolution entirely.
    pub fn drain(mut self, drain: Arc<dyn Drain>) -> Self {
        self.drain = Some(drain);
        self
    }

    /// Resolve the configuration and construct the logger.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty service name, an empty sink
    /// list, or a sink that cannot be resolved or opened.
    pub fn build(self) -> Result<Logger, LogError> {
        if self.service.is_empty() {
            return Err(LogError::Config("service name must not be empty".into()));
        }
        if self.output_paths.is_empty() {
            return Err(LogError::Config(
                "at least one output path is required".into(),
            ));
        }
        let drain = match self.drain {
            Some(drain) => drain,
            None => Arc::new(JsonDrain::open(&self.output_paths)?),
        };
        Ok(Logger {
            drain,
            trace_id_fn: self.trace_id_fn,
            level: self.level,
            base_fields: vec![Field::new("service", &self.service)],
        })
    }
}
