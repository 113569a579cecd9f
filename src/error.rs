use std::path::PathBuf;

use thiserror::Error;

/// Flight data loading error types
#[derive(Error, Debug)]
pub enum FlightDataError {
    /// A mandatory clock, dataset, topic field or file does not exist
    #[error("Missing source: {0}")]
    MissingSource(String),

    /// A numeric field could not be parsed; the whole load is aborted
    #[error("Parse error in {source_name} (row {row}): {message}")]
    Parse {
        source_name: String,
        row: usize,
        message: String,
    },

    /// Calibration file exists but cannot be used
    #[error("Calibration load error ({path}): {message}")]
    CalibrationLoad { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Interpolation setup failed: {0}")]
    Interp(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for every loader in this crate
pub type Result<T> = std::result::Result<T, FlightDataError>;

impl FlightDataError {
    pub fn missing(what: impl Into<String>) -> Self {
        FlightDataError::MissingSource(what.into())
    }

    pub fn parse(source_name: impl Into<String>, row: usize, message: impl Into<String>) -> Self {
        FlightDataError::Parse {
            source_name: source_name.into(),
            row,
            message: message.into(),
        }
    }

    /// True for the "not there" family, which callers may choose to tolerate
    pub fn is_missing(&self) -> bool {
        matches!(self, FlightDataError::MissingSource(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = FlightDataError::missing("/Sensors/Fmu/Time_us");
        assert_eq!(err.to_string(), "Missing source: /Sensors/Fmu/Time_us");
        assert!(err.is_missing());

        let err = FlightDataError::parse("gps-0.csv", 3, "invalid float literal");
        assert_eq!(
            err.to_string(),
            "Parse error in gps-0.csv (row 3): invalid float literal"
        );
        assert!(!err.is_missing());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: FlightDataError = io.into();
        assert!(matches!(err, FlightDataError::Io(_)));
    }
}
