//! Format adapters. Each one turns a source format into a
//! [`NormalizedResult`](crate::result::NormalizedResult).

pub mod binlog;
pub mod container;
pub mod delimited;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::AdapterConfig;
use crate::error::{FlightDataError, Result};
use crate::result::NormalizedResult;

pub use binlog::{BinlogAdapter, TopicPresence};
pub use container::{ContainerAdapter, ContainerChannels};
pub use delimited::DelimitedAdapter;

/// Supported source formats
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Structured time-series container (dataset dump)
    Container,
    /// Topic-based binary flight log (topic dump)
    Binlog,
    /// Directory of CSV files
    Delimited,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Container => "container",
            SourceFormat::Binlog => "binlog",
            SourceFormat::Delimited => "delimited",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceFormat {
    type Err = FlightDataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "container" | "hdf5" | "umn3" => Ok(SourceFormat::Container),
            "binlog" | "ulog" | "px4" => Ok(SourceFormat::Binlog),
            "delimited" | "csv" | "aura" => Ok(SourceFormat::Delimited),
            other => Err(FlightDataError::Config(format!("unknown source format '{}'", other))),
        }
    }
}

/// Load `path` with the adapter for `format`.
///
/// `recalibrate` only applies to the delimited format; other formats log
/// and ignore it.
pub fn load(
    format: SourceFormat,
    path: &Path,
    config: &AdapterConfig,
    recalibrate: Option<&Path>,
) -> Result<NormalizedResult> {
    config.validate()?;
    log::info!("loading {} source {}", format, path.display());

    if recalibrate.is_some() && format != SourceFormat::Delimited {
        log::warn!("recalibration is only supported for delimited logs, ignoring it");
    }

    match format {
        SourceFormat::Container => ContainerAdapter::new(config.clone()).load_path(path),
        SourceFormat::Binlog => BinlogAdapter::new(config.clone()).load_path(path),
        SourceFormat::Delimited => DelimitedAdapter::new(config.clone()).load(path, recalibrate),
    }
}
