use serde::Deserialize;

use crate::pursuer::PursuerConfig;
use crate::steering::SteeringConfig;
use crate::terrain::{ChunkConfig, StreamConfig, TerrainError};
use crate::vehicle::VehicleConfig;
use crate::wheel::WheelConfig;

/// Every gameplay constant, overridable from host-supplied JSON.
///
/// Each section falls back to its defaults, so a partial document only
/// changes the fields it names:
///
/// ```json
/// { "seed": 7, "steering": { "turn_rate": 60 }, "pursuers": { "count": 0 } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub seed: Option<u64>,
    pub vehicle: VehicleConfig,
    pub wheel: WheelConfig,
    pub steering: SteeringConfig,
    pub chunk: ChunkConfig,
    pub stream: StreamConfig,
    pub pursuers: PursuerConfig,
}

impl Tuning {
    /// Parse tuning from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reject values that would break the corridor.
    pub fn validate(&self) -> Result<(), TerrainError> {
        self.chunk.validate()?;
        self.stream.validate()?;
        self.steering.validate()
    }

    /// Fixed simulation step implied by the steering tick rate.
    pub fn fixed_dt(&self) -> f32 {
        1.0 / self.steering.tick_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_keeps_defaults() {
        let tuning = Tuning::from_json("{}").unwrap();
        assert_eq!(tuning, Tuning::default());
        assert!(tuning.validate().is_ok());
        assert!((tuning.fixed_dt() - 1.0 / 60.0).abs() < 1e-7);
    }

    #[test]
    fn partial_sections_override_named_fields_only() {
        let json = r#"{
            "seed": 7,
            "steering": { "turn_rate": 60 },
            "pursuers": { "count": 0 },
            "vehicle": { "start": [5.0, -10.0] }
        }"#;
        let tuning = Tuning::from_json(json).unwrap();

        assert_eq!(tuning.seed, Some(7));
        assert_eq!(tuning.steering.turn_rate, 60.0);
        assert_eq!(tuning.steering.lock_angle, 30.0);
        assert_eq!(tuning.pursuers.count, 0);
        assert_eq!(tuning.pursuers.leash_distance, 400.0);
        assert_eq!(tuning.vehicle.start, [5.0, -10.0]);
        assert_eq!(tuning.vehicle.anchors, VehicleConfig::default().anchors);
        assert_eq!(tuning.wheel, WheelConfig::default());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(Tuning::from_json("{ \"chunk\": { \"parts\": \"ten\" } }").is_err());
        assert!(Tuning::from_json("not json").is_err());
    }

    #[test]
    fn validation_catches_degenerate_corridor() {
        let tuning = Tuning::from_json(r#"{ "chunk": { "parts": 1 } }"#).unwrap();
        assert!(matches!(tuning.validate(), Err(TerrainError::InvalidConfig(_))));

        let tuning = Tuning::from_json(r#"{ "steering": { "tick_rate": 0 } }"#).unwrap();
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn validation_catches_reversed_steering() {
        let tuning = Tuning::from_json(r#"{ "steering": { "turn_rate": -320 } }"#).unwrap();
        assert!(matches!(tuning.validate(), Err(TerrainError::InvalidConfig(_))));

        let tuning = Tuning::from_json(r#"{ "stream": { "trigger_lead": 0.5 } }"#).unwrap();
        assert!(tuning.validate().is_err());
    }
}
