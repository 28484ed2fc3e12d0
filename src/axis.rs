use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ClassifierError;

pub const DISASTER_CLASSES: [&str; 4] = ["Cyclone", "Earthquake", "Flood", "Wildfire"];
pub const DAMAGE_CLASSES: [&str; 4] = ["No-damage", "Minor-damage", "Major-damage", "Destroyed"];

/// One of the two independent classification tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Disaster,
    Damage,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Axis::Disaster, Axis::Damage];

    pub const fn name(self) -> &'static str {
        match self {
            Axis::Disaster => "disaster",
            Axis::Damage => "damage",
        }
    }

    pub const fn labels(self) -> &'static [&'static str] {
        match self {
            Axis::Disaster => &DISASTER_CLASSES,
            Axis::Damage => &DAMAGE_CLASSES,
        }
    }

    /// Tag used for the `type` field of single-image responses and the keys of combined results.
    pub const fn response_type(self) -> &'static str {
        match self {
            Axis::Disaster => "disaster_detection",
            Axis::Damage => "damage_assessment",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Axis {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disaster" => Ok(Axis::Disaster),
            "damage" => Ok(Axis::Damage),
            _ => Err(ClassifierError::InvalidAxisSelection {
                value: s.to_string(),
            }),
        }
    }
}

/// Which axes a batch request evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisSelection {
    Disaster,
    Damage,
    #[default]
    Both,
}

impl AxisSelection {
    pub fn axes(self) -> &'static [Axis] {
        match self {
            AxisSelection::Disaster => &[Axis::Disaster],
            AxisSelection::Damage => &[Axis::Damage],
            AxisSelection::Both => &Axis::ALL,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            AxisSelection::Disaster => "disaster",
            AxisSelection::Damage => "damage",
            AxisSelection::Both => "both",
        }
    }
}

impl fmt::Display for AxisSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AxisSelection {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disaster" => Ok(AxisSelection::Disaster),
            "damage" => Ok(AxisSelection::Damage),
            "both" => Ok(AxisSelection::Both),
            _ => Err(ClassifierError::InvalidAxisSelection {
                value: s.to_string(),
            }),
        }
    }
}
