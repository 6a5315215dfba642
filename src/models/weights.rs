use serde::{Deserialize, Serialize};

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightDimension {
    Structural,
    Change,
    Defect,
    Architecture,
    Runtime,
    Coverage,
}

impl WeightDimension {
    pub const ALL: [WeightDimension; 6] = [
        WeightDimension::Structural,
        WeightDimension::Change,
        WeightDimension::Defect,
        WeightDimension::Architecture,
        WeightDimension::Runtime,
        WeightDimension::Coverage,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::Change => "change",
            Self::Defect => "defect",
            Self::Architecture => "architecture",
            Self::Runtime => "runtime",
            Self::Coverage => "coverage",
        }
    }
}

/// Dimensions the PSRI formula actually consumes. The other three weights are
/// stored and validated but currently inert.
pub const PSRI_DIMENSIONS: [WeightDimension; 3] = [
    WeightDimension::Structural,
    WeightDimension::Change,
    WeightDimension::Defect,
];

/// Per-project PSRI weights. Each is in [0, 1]; the sum is expected to be ~1
/// but is not enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightConfig {
    pub structural: f64,
    pub change: f64,
    pub defect: f64,
    pub architecture: f64,
    pub runtime: f64,
    pub coverage: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            structural: 0.30,
            change: 0.25,
            defect: 0.20,
            architecture: 0.10,
            runtime: 0.10,
            coverage: 0.05,
        }
    }
}

impl WeightConfig {
    pub fn get(&self, dimension: WeightDimension) -> f64 {
        match dimension {
            WeightDimension::Structural => self.structural,
            WeightDimension::Change => self.change,
            WeightDimension::Defect => self.defect,
            WeightDimension::Architecture => self.architecture,
            WeightDimension::Runtime => self.runtime,
            WeightDimension::Coverage => self.coverage,
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        for dimension in WeightDimension::ALL {
            let value = self.get(dimension);
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(EngineError::validation(
                    dimension.as_str(),
                    &format!("weight must be within [0, 1], got {value}"),
                ));
            }
        }
        Ok(())
    }

    /// Weights with no effect on any score today.
    pub fn inert_dimensions() -> Vec<WeightDimension> {
        WeightDimension::ALL
            .into_iter()
            .filter(|d| !PSRI_DIMENSIONS.contains(d))
            .collect()
    }

    /// Inert dimensions this config gives a non-zero weight.
    pub fn weighted_inert_dimensions(&self) -> Vec<WeightDimension> {
        Self::inert_dimensions()
            .into_iter()
            .filter(|d| self.get(*d) > 0.0)
            .collect()
    }
}
