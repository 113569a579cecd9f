//! Portable JSON dumps of the binary formats.
//!
//! `DatasetDump` holds a container's datasets as `{ "<path>": [numbers] }`;
//! `TopicDump` holds a flight log's topics as
//! `{ "<topic>": { "timestamp": [us], "<field>": [numbers] } }`.
//! Either may be gzip-compressed (`.gz` extension).

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{Container, Topic, TopicLog};
use crate::error::{FlightDataError, Result};

fn open_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            FlightDataError::missing(path.display().to_string())
        } else {
            FlightDataError::Io(e)
        }
    })?;
    let reader: Box<dyn Read> = if path.extension().map(|e| e == "gz").unwrap_or(false) {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(serde_json::from_reader(reader)?)
}

/// A dataset is either a flat list or a list of rows (N x 1 columns)
#[derive(Deserialize)]
#[serde(untagged)]
enum DatasetValues {
    Flat(Vec<f64>),
    Rows(Vec<Vec<f64>>),
}

impl DatasetValues {
    fn flatten(self) -> Vec<f64> {
        match self {
            DatasetValues::Flat(v) => v,
            DatasetValues::Rows(rows) => rows.into_iter().flatten().collect(),
        }
    }
}

/// In-memory container
#[derive(Clone, Debug, Default)]
pub struct DatasetDump {
    datasets: HashMap<String, Vec<f64>>,
}

impl DatasetDump {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw: HashMap<String, DatasetValues> = open_json(path.as_ref())?;
        let datasets = raw.into_iter().map(|(k, v)| (k, v.flatten())).collect();
        Ok(Self { datasets })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: HashMap<String, DatasetValues> = serde_json::from_str(json)?;
        let datasets = raw.into_iter().map(|(k, v)| (k, v.flatten())).collect();
        Ok(Self { datasets })
    }

    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.datasets.insert(name.into(), values);
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

impl Container for DatasetDump {
    fn contains(&self, name: &str) -> bool {
        self.datasets.contains_key(name)
    }

    fn read(&self, name: &str) -> Result<Vec<f64>> {
        self.datasets
            .get(name)
            .cloned()
            .ok_or_else(|| FlightDataError::missing(name))
    }
}

/// In-memory flight log
#[derive(Clone, Debug, Default)]
pub struct TopicDump {
    topics: HashMap<String, Topic>,
}

impl TopicDump {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw: HashMap<String, HashMap<String, Vec<f64>>> = open_json(path.as_ref())?;
        Self::from_tables(raw)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: HashMap<String, HashMap<String, Vec<f64>>> = serde_json::from_str(json)?;
        Self::from_tables(raw)
    }

    fn from_tables(raw: HashMap<String, HashMap<String, Vec<f64>>>) -> Result<Self> {
        let mut topics = HashMap::new();
        for (name, mut fields) in raw {
            let stamps = fields
                .remove("timestamp")
                .ok_or_else(|| FlightDataError::missing(format!("{}.timestamp", name)))?;
            let mut timestamps = Vec::with_capacity(stamps.len());
            for (row, t) in stamps.into_iter().enumerate() {
                if !t.is_finite() || t < 0.0 {
                    return Err(FlightDataError::parse(
                        name.as_str(),
                        row,
                        format!("invalid timestamp {}", t),
                    ));
                }
                timestamps.push(t as u64);
            }
            let topic = Topic {
                name: name.clone(),
                timestamps,
                fields,
            };
            topics.insert(name, topic);
        }
        Ok(Self { topics })
    }

    pub fn insert(&mut self, topic: Topic) {
        self.topics.insert(topic.name.clone(), topic);
    }

    pub fn topic_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.topics.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl TopicLog for TopicDump {
    fn topic(&self, name: &str) -> Option<&Topic> {
        self.topics.get(name)
    }
}
