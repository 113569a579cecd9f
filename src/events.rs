//! Mission event detection from engage and test-id channels

use crate::types::Event;

/// Watches one discrete signal and reports only its changes
pub struct EdgeDetector {
    last: f64,
}

impl EdgeDetector {
    /// `initial` is the value assumed before the first sample; a first
    /// sample that differs from it is reported as an edge.
    pub fn new(initial: f64) -> Self {
        Self { last: initial }
    }

    /// Returns the new value when it differs from the previous one
    pub fn update(&mut self, value: f64) -> Option<f64> {
        if value != self.last {
            self.last = value;
            Some(value)
        } else {
            None
        }
    }
}

/// Builds events from the two monitored mission channels: the engagement
/// flag and the active test ID.
pub struct MissionEventDetector {
    engage: EdgeDetector,
    test_id: EdgeDetector,
}

impl MissionEventDetector {
    pub fn new() -> Self {
        Self {
            engage: EdgeDetector::new(0.0),
            test_id: EdgeDetector::new(-1.0),
        }
    }

    /// Zero, one or two events for this sample (engagement first)
    pub fn detect(&mut self, time: f64, engaged: f64, test_id: f64) -> Vec<Event> {
        let mut events = Vec::new();

        if let Some(value) = self.engage.update(engaged) {
            let message = if value != 0.0 {
                "SOC Engaged"
            } else {
                "SOC Disengaged"
            };
            events.push(Event {
                time,
                message: message.to_string(),
            });
        }

        if let Some(value) = self.test_id.update(test_id) {
            events.push(Event {
                time,
                message: format!("Test ID = {}", value as i64),
            });
        }

        events
    }
}

impl Default for MissionEventDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_detector_only_reports_changes() {
        let mut det = EdgeDetector::new(0.0);
        assert_eq!(det.update(0.0), None);
        assert_eq!(det.update(1.0), Some(1.0));
        assert_eq!(det.update(1.0), None);
        assert_eq!(det.update(0.0), Some(0.0));
    }

    #[test]
    fn test_first_test_id_is_reported() {
        let mut det = MissionEventDetector::new();
        let events = det.detect(0.0, 0.0, 0.0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "Test ID = 0");
    }

    #[test]
    fn test_engage_sequence() {
        let mut det = MissionEventDetector::new();
        let samples = [
            (0.0, 0.0, 0.0),
            (0.1, 0.0, 0.0),
            (0.2, 1.0, 3.0),
            (0.3, 1.0, 3.0),
            (0.4, 0.0, 3.0),
        ];
        let events: Vec<Event> = samples
            .iter()
            .flat_map(|&(t, soc, id)| det.detect(t, soc, id))
            .collect();
        let messages: Vec<&str> = events.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["Test ID = 0", "SOC Engaged", "Test ID = 3", "SOC Disengaged"]
        );
        assert_eq!(events[1].time, 0.2);
        assert_eq!(events[3].time, 0.4);
    }
}
