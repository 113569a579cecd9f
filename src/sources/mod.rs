//! Reader seams for the binary source formats.
//!
//! Opening and decoding the structured container and the binary flight log
//! is the job of an external reader. Adapters only see these traits, so any
//! backend (native library bindings, a converted dump, an in-memory fixture)
//! can feed them.

pub mod dump;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{FlightDataError, Result};

pub use dump::{DatasetDump, TopicDump};

/// Named numeric datasets, all indexed by the same master clock
pub trait Container {
    fn contains(&self, name: &str) -> bool;

    /// Full dataset, flattened in row order. A missing name is
    /// `MissingSource`.
    fn read(&self, name: &str) -> Result<Vec<f64>>;
}

/// One message table of a binary flight log
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    /// Microseconds since boot
    pub timestamps: Vec<u64>,
    pub fields: HashMap<String, Vec<f64>>,
}

impl Topic {
    pub fn new(name: impl Into<String>, timestamps: Vec<u64>) -> Self {
        Self {
            name: name.into(),
            timestamps,
            fields: HashMap::new(),
        }
    }

    /// Builder-style field insertion
    pub fn with_field(mut self, field: impl Into<String>, values: Vec<f64>) -> Self {
        self.fields.insert(field.into(), values);
        self
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Column for `field`; must be as long as the timestamp axis
    pub fn field(&self, field: &str) -> Result<&[f64]> {
        let values = self
            .fields
            .get(field)
            .ok_or_else(|| FlightDataError::missing(format!("{}.{}", self.name, field)))?;
        if values.len() != self.timestamps.len() {
            return Err(FlightDataError::parse(
                self.name.as_str(),
                values.len().min(self.timestamps.len()),
                format!(
                    "field '{}' has {} values for {} timestamps",
                    field,
                    values.len(),
                    self.timestamps.len()
                ),
            ));
        }
        Ok(values)
    }

    /// Timestamps as f64 microseconds, the interpolation abscissa
    pub fn times_us(&self) -> Vec<f64> {
        self.timestamps.iter().map(|&t| t as f64).collect()
    }
}

/// Message tables of a binary flight log, looked up by topic name
/// (first instance only)
pub trait TopicLog {
    fn topic(&self, name: &str) -> Option<&Topic>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_field_lookup() {
        let topic = Topic::new("airspeed", vec![0, 1000]).with_field("indicated_airspeed_m_s", vec![10.0, 11.0]);
        assert_eq!(topic.len(), 2);
        assert!(topic.has_field("indicated_airspeed_m_s"));
        assert_eq!(topic.field("indicated_airspeed_m_s").unwrap(), &[10.0, 11.0]);
        assert!(topic.field("true_airspeed_m_s").unwrap_err().is_missing());
        assert_eq!(topic.times_us(), vec![0.0, 1000.0]);
    }

    #[test]
    fn test_topic_length_mismatch() {
        let topic = Topic::new("airspeed", vec![0, 1000, 2000]).with_field("x", vec![1.0]);
        assert!(matches!(
            topic.field("x"),
            Err(FlightDataError::Parse { .. })
        ));
    }
}
