//! Sonar distance sensing adapter.
//!
//! Reads the two ultrasound channels through a [`SensorService`]. A
//! failed read is replaced by the configured far default so downstream
//! logic treats it as "no obstacle sensed" - transient sensor faults
//! never propagate as errors.

use crate::services::{SensorKey, SensorService};

/// One pair of sonar readings in meters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SensorReading {
    pub left: f32,
    pub right: f32,
}

impl SensorReading {
    /// Nearest of the two returns.
    #[inline]
    pub fn nearest(&self) -> f32 {
        self.left.min(self.right)
    }

    /// True when either channel reports a return under `threshold`.
    #[inline]
    pub fn below(&self, threshold: f32) -> bool {
        self.left < threshold || self.right < threshold
    }
}

/// Reads left/right ultrasound distances, substituting a far default
/// on failure.
#[derive(Clone, Copy, Debug)]
pub struct SonarAdapter {
    default_range: f32,
}

impl SonarAdapter {
    pub fn new(default_range: f32) -> Self {
        Self { default_range }
    }

    /// Read both channels. Never fails.
    pub fn read(&self, sensors: &mut dyn SensorService) -> SensorReading {
        SensorReading {
            left: self.read_one(sensors, SensorKey::SonarLeft),
            right: self.read_one(sensors, SensorKey::SonarRight),
        }
    }

    fn read_one(&self, sensors: &mut dyn SensorService, key: SensorKey) -> f32 {
        match sensors.read(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("Sonar read failed ({:?}): {}, using default", key, e);
                self.default_range
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{NavError, Result};

    struct FailingLeft;

    impl SensorService for FailingLeft {
        fn subscribe_sonar(&mut self, _tag: &str) -> Result<()> {
            Ok(())
        }
        fn unsubscribe_sonar(&mut self, _tag: &str) -> Result<()> {
            Ok(())
        }
        fn read(&mut self, key: SensorKey) -> Result<f32> {
            match key {
                SensorKey::SonarLeft => Err(NavError::Service("no data".to_string())),
                SensorKey::SonarRight => Ok(0.8),
                _ => Ok(0.0),
            }
        }
    }

    #[test]
    fn test_failure_becomes_far_default() {
        let adapter = SonarAdapter::new(2.5);
        let reading = adapter.read(&mut FailingLeft);
        assert_eq!(reading.left, 2.5);
        assert_eq!(reading.right, 0.8);
        assert_eq!(reading.nearest(), 0.8);
    }

    #[test]
    fn test_below_threshold() {
        let reading = SensorReading {
            left: 2.5,
            right: 0.4,
        };
        assert!(reading.below(0.5));
        assert!(!reading.below(0.3));
    }
}
