//! Severity taxonomy.
//!
//! Weights follow the RFC 5424 ordering with deliberate gaps between
//! levels. They are part of the wire format and must never be renumbered.

use std::fmt;
use std::str::FromStr;

/// Severity of a log record, ordered by weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum Level {
    Debug = 100,
    Info = 200,
    Notice = 250,
    Warning = 300,
    Error = 400,
    Critical = 500,
    Alert = 550,
    Emergency = 600,
}

impl Level {
    /// Every level, lowest weight first.
    pub const ALL: [Level; 8] = [
        Level::Debug,
        Level::Info,
        Level::Notice,
        Level::Warning,
        Level::Error,
        Level::Critical,
        Level::Alert,
        Level::Emergency,
    ];

    /// Numeric weight written to the `level` field.
    pub const fn weight(self) -> u16 {
        self as u16
    }

    /// Canonical uppercase name written to the `level_name` field.
    pub const fn name(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Notice => "NOTICE",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
            Level::Alert => "ALERT",
            Level::Emergency => "EMERGENCY",
        }
    }

    /// Map a numeric weight back to its level. Weights outside the table
    /// have no level.
    pub fn from_weight(weight: u16) -> Option<Level> {
        Level::ALL.into_iter().find(|level| level.weight() == weight)
    }

    /// Whether records at this level carry exception info.
    pub fn carries_exception(self) -> bool {
        self >= Level::Error
    }
}

/// Name lookup for a raw weight. Undefined weights yield `None`.
pub fn level_name(weight: u16) -> Option<&'static str> {
    Level::from_weight(weight).map(Level::name)
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown level name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level: {0}")]
pub struct ParseLevelError(String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Level::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseLevelError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_table() {
        let table = [
            (100, "DEBUG"),
            (200, "INFO"),
            (250, "NOTICE"),
            (300, "WARNING"),
            (400, "ERROR"),
            (500, "CRITICAL"),
            (550, "ALERT"),
            (600, "EMERGENCY"),
        ];
        for (level, (weight, name)) in Level::ALL.into_iter().zip(table) {
            assert_eq!(level.weight(), weight);
            assert_eq!(level.name(), name);
            assert_eq!(level_name(weight), Some(name));
        }
    }

    #[test]
    fn test_weights_strictly_increase() {
        for pair in Level::ALL.windows(2) {
            assert!(pair[0].weight() < pair[1].weight());
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_undefined_weight_has_no_name() {
        assert_eq!(level_name(0), None);
        assert_eq!(level_name(201), None);
        assert_eq!(Level::from_weight(700), None);
    }

    #[test]
    fn test_exception_threshold() {
        assert!(!Level::Warning.carries_exception());
        assert!(Level::Error.carries_exception());
        assert!(Level::Emergency.carries_exception());
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("notice".parse::<Level>().unwrap(), Level::Notice);
        assert_eq!(" ALERT ".parse::<Level>().unwrap(), Level::Alert);
        assert!("verbose".parse::<Level>().is_err());
    }
}
