//! Log severity levels.

use std::fmt;
use std::str::FromStr;

use crate::error::LogError;

/// Ordinal log severity used for filtering: `Debug < Info < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    Info,
    Error,
}

impl Level {
    /// Lowercase name as it appears in the `level` field of emitted records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "error" => Ok(Level::Error),
            other => Err(LogError::Config(format!("unknown log level: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_by_severity() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Error);
    }

    #[test]
    fn round_trips_names() {
        for level in [Level::Debug, Level::Info, Level::Error] {
            assert_eq!(level.as_str().parse::<Level>().unwrap(), level);
        }
        assert_eq!("INFO".parse::<Level>().unwrap(), Level::Info);
    }

    #[test]
    fn rejects_unknown_name() {
        assert!("warning".parse::<Level>().is_err());
    }
}
