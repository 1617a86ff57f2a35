//! Output engine — the drain seam behind the logger, NDJSON sink writing, and
//! URI-style sink resolution with registerable schemes.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, RwLock};

use crate::error::LogError;
use crate::level::Level;
use crate::record::Record;

/// The encoding/output engine behind a [`Logger`](crate::Logger).
///
/// Implementations must be safe for concurrent use from multiple threads; the
/// facade performs no locking of its own.
pub trait Drain: Send + Sync {
    /// Encode and write one record. Write failures are swallowed.
    fn emit(&self, record: &Record);

    /// Block until buffered records have reached their sinks.
    fn flush(&self) -> Result<(), LogError>;
}

/// Factory for a registered sink scheme. Receives the full sink URI.
pub type SinkFactory = Arc<dyn Fn(&str) -> io::Result<Box<dyn Write + Send>> + Send + Sync>;

static SINK_SCHEMES: LazyLock<RwLock<HashMap<String, SinkFactory>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Register a factory for a custom sink scheme (e.g. `mem` for `mem://buf`).
///
/// Returns a configuration error if the scheme is already registered.
pub fn register_sink_scheme(
    scheme: &str,
    factory: impl Fn(&str) -> io::Result<Box<dyn Write + Send>> + Send + Sync + 'static,
) -> Result<(), LogError> {
    let mut schemes = match SINK_SCHEMES.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if schemes.contains_key(scheme) {
        return Err(LogError::Config(format!(
            "sink scheme already registered: {scheme}"
        )));
    }
    schemes.insert(scheme.to_string(), Arc::new(factory));
    Ok(())
}

/// Resolve one sink URI into a writer.
///
/// `stdout` and `stderr` are built in; `scheme://rest` goes through the
/// registered scheme table; anything else is opened as an append-mode file path.
fn open_sink(uri: &str) -> Result<Box<dyn Write + Send>, LogError> {
    match uri {
        "stdout" => Ok(Box::new(io::stdout())),
        "stderr" => Ok(Box::new(io::stderr())),
        _ => {
            if let Some((scheme, _)) = uri.split_once("://") {
                let factory = {
                    let schemes = match SINK_SCHEMES.read() {
                        Ok(guard) => guard,
                        Err(poisoned) => poisoned.into_inner(),
                    };
                    schemes.get(scheme).cloned()
                };
                let factory = factory.ok_or_else(|| {
                    LogError::Config(format!("no sink registered for scheme: {scheme}"))
                })?;
                factory(uri).map_err(|source| LogError::SinkOpen {
                    uri: uri.to_string(),
                    source,
                })
            } else {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(uri)
                    .map_err(|source| LogError::SinkOpen {
                        uri: uri.to_string(),
                        source,
                    })?;
                Ok(Box::new(file))
            }
        }
    }
}

/// Default engine: renders each record as one NDJSON line and writes it to every
/// configured sink.
pub struct JsonDrain {
    sinks: Mutex<Vec<Box<dyn Write + Send>>>,
}

impl JsonDrain {
    /// Open all sink URIs. Fails on the first unresolvable or unopenable sink.
    pub fn open(paths: &[String]) -> Result<Self, LogError> {
        let mut sinks = Vec::with_capacity(paths.len());
        for path in paths {
            sinks.push(open_sink(path)?);
        }
        Ok(Self::from_writers(sinks))
    }

    /// Build a drain from already-open writers.
    pub fn from_writers(sinks: Vec<Box<dyn Write + Send>>) -> Self {
        JsonDrain {
            sinks: Mutex::new(sinks),
        }
    }

    fn lock_sinks(&self) -> MutexGuard<'_, Vec<Box<dyn Write + Send>>> {
        match self.sinks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Drain for JsonDrain {
    fn emit(&self, record: &Record) {
        let line = record.render();
        let mut sinks = self.lock_sinks();
        for sink in sinks.iter_mut() {
            let _ = sink.write_all(line.as_bytes());
        }
    }

    fn flush(&self) -> Result<(), LogError> {
        let mut sinks = self.lock_sinks();
        let mut first_err = None;
        for sink in sinks.iter_mut() {
            if let Err(e) = sink.flush() {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(LogError::Flush(e)),
            None => Ok(()),
        }
    }
}

/// Bridge drain that forwards assembled records into the global `tracing`
/// dispatcher instead of writing bytes itself. Useful when the host process
/// already runs a `tracing` subscriber and wants facade records in the same
/// stream.
pub struct TracingDrain;

impl Drain for TracingDrain {
    fn emit(&self, record: &Record) {
        let json = record.to_json();
        match record.level {
            Level::Debug => tracing::debug!(target: "svclog", record = %json, "log record"),
            Level::Info => tracing::info!(target: "svclog", record = %json, "log record"),
            Level::Error => tracing::error!(target: "svclog", record = %json, "log record"),
        }
    }

    fn flush(&self) -> Result<(), LogError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::Map;
    use std::io::Read;

    fn record(msg: &str) -> Record {
        Record {
            level: Level::Info,
            ts: Utc::now(),
            caller: "sink.rs:1".into(),
            msg: msg.into(),
            fields: Map::new(),
        }
    }

    /// Writer backed by a shared buffer, cloneable so tests can read back what
    /// a registered sink factory produced.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct FailingFlush;

    impl Write for FailingFlush {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink gone"))
        }
    }

    #[test]
    fn unknown_scheme_is_config_error() {
        let err = JsonDrain::open(&["nosuch://x".to_string()]).err().unwrap();
        assert!(matches!(err, LogError::Config(_)));
    }

    #[test]
    fn unopenable_file_is_sink_open_error() {
        let err = JsonDrain::open(&["/nonexistent-dir/app.log".to_string()])
            .err()
            .unwrap();
        assert!(matches!(err, LogError::SinkOpen { .. }));
    }

    #[test]
    fn duplicate_scheme_registration_fails() {
        register_sink_scheme("dup-test", |_| Ok(Box::new(io::sink()))).unwrap();
        let err = register_sink_scheme("dup-test", |_| Ok(Box::new(io::sink())));
        assert!(matches!(err, Err(LogError::Config(_))));
    }

    #[test]
    fn registered_scheme_receives_records() {
        let buf = SharedBuf::default();
        let handle = buf.clone();
        register_sink_scheme("memsink", move |_| Ok(Box::new(handle.clone()))).unwrap();

        let drain = JsonDrain::open(&["memsink://buf".to_string()]).unwrap();
        drain.emit(&record("via scheme"));
        drain.flush().unwrap();

        assert!(buf.contents().contains("\"msg\":\"via scheme\""));
    }

    #[test]
    fn file_sink_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let uri = path.to_str().unwrap().to_string();

        let drain = JsonDrain::open(&[uri]).unwrap();
        drain.emit(&record("to file"));
        drain.flush().unwrap();

        let mut contents = String::new();
        std::fs::File::open(&path)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(contents.trim()).unwrap();
        assert_eq!(parsed["msg"], "to file");
        assert_eq!(parsed["level"], "info");
    }

    #[test]
    fn emit_writes_to_every_sink() {
        let a = SharedBuf::default();
        let b = SharedBuf::default();
        let drain =
            JsonDrain::from_writers(vec![Box::new(a.clone()), Box::new(b.clone())]);
        drain.emit(&record("fan"));
        assert!(a.contents().contains("\"msg\":\"fan\""));
        assert!(b.contents().contains("\"msg\":\"fan\""));
    }

    #[test]
    fn flush_surfaces_sink_error() {
        let drain = JsonDrain::from_writers(vec![Box::new(FailingFlush)]);
        drain.emit(&record("buffered"));
        assert!(matches!(drain.flush(), Err(LogError::Flush(_))));
    }

    #[test]
    fn tracing_drain_forwards_to_subscriber() {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            TracingDrain.emit(&record("bridged"));
        });

        assert!(buf.contents().contains("bridged"));
        assert!(TracingDrain.flush().is_ok());
    }
}
