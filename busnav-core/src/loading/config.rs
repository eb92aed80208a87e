use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{Error, Meters, Seconds};

/// Average walking speed, m/s
pub const DEFAULT_WALKING_SPEED: f64 = 1.5;
/// Average bus cruising speed, m/s
pub const DEFAULT_BUS_SPEED: f64 = 5.5;
/// Fixed walk-to-stop + waiting penalty added to every link edge
pub const DEFAULT_BOARDING_PENALTY: Seconds = 150.0;
/// Largest accepted distance between a point and its nearest intersection
pub const DEFAULT_MAX_SNAP_DISTANCE: Meters = 10_000.0;

/// Calibration used when fusing the street and bus networks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityGraphConfig {
    /// m/s
    pub walking_speed: f64,
    /// m/s
    pub bus_speed: f64,
    pub boarding_penalty: Seconds,
    pub max_snap_distance: Meters,
}

impl Default for CityGraphConfig {
    fn default() -> Self {
        Self {
            walking_speed: DEFAULT_WALKING_SPEED,
            bus_speed: DEFAULT_BUS_SPEED,
            boarding_penalty: DEFAULT_BOARDING_PENALTY,
            max_snap_distance: DEFAULT_MAX_SNAP_DISTANCE,
        }
    }
}

impl CityGraphConfig {
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] for non-positive speeds or snap distance,
    /// or a negative boarding penalty.
    pub fn validate(&self) -> Result<(), Error> {
        let positive = [
            ("walking_speed", self.walking_speed),
            ("bus_speed", self.bus_speed),
            ("max_snap_distance", self.max_snap_distance),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidData(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if !self.boarding_penalty.is_finite() || self.boarding_penalty < 0.0 {
            return Err(Error::InvalidData(format!(
                "boarding_penalty must be non-negative, got {}",
                self.boarding_penalty
            )));
        }
        Ok(())
    }
}

/// CSV files describing the two input networks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSources {
    /// `node_id,lat,lon`
    pub street_nodes: PathBuf,
    /// `from,to,length`
    pub street_edges: PathBuf,
    /// `stop_id,name,lat,lon`
    pub stops: PathBuf,
    /// `line_id,sequence,stop_id`
    pub line_stops: PathBuf,
}

impl NetworkSources {
    pub(crate) fn validate(&self) -> Result<(), Error> {
        for path in [
            &self.street_nodes,
            &self.street_edges,
            &self.stops,
            &self.line_stops,
        ] {
            if !path.exists() {
                return Err(Error::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("Input file not found: {}", path.display()),
                )));
            }
        }
        Ok(())
    }
}
