//! Variance modes for type checking

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, ConfigResult};

/// All possible values for the type checking mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarianceMode {
    /// Types must match exactly
    #[default]
    Invariant,
    /// Subtypes are accepted
    Covariant,
    /// Supertypes are accepted
    Contravariant,
    /// Both subtypes and supertypes are accepted
    Bivariant,
}

impl VarianceMode {
    /// Every mode, in declaration order
    pub const ALL: [VarianceMode; 4] = [
        Self::Invariant,
        Self::Covariant,
        Self::Contravariant,
        Self::Bivariant,
    ];

    /// Look up a mode by its lowercase name
    pub fn from_name(name: &str) -> ConfigResult<Self> {
        match name {
            "invariant" => Ok(Self::Invariant),
            "covariant" => Ok(Self::Covariant),
            "contravariant" => Ok(Self::Contravariant),
            "bivariant" => Ok(Self::Bivariant),
            other => Err(ConfigError::invalid_mode(other)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Invariant => "invariant",
            Self::Covariant => "covariant",
            Self::Contravariant => "contravariant",
            Self::Bivariant => "bivariant",
        }
    }

    /// Whether subtypes are accepted in place of the declared type
    pub fn is_covariant(self) -> bool {
        matches!(self, Self::Covariant | Self::Bivariant)
    }

    /// Whether supertypes are accepted in place of the declared type
    pub fn is_contravariant(self) -> bool {
        matches!(self, Self::Contravariant | Self::Bivariant)
    }
}

impl FromStr for VarianceMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl fmt::Display for VarianceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
