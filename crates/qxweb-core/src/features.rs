use serde::{Deserialize, Serialize};

use crate::company::Company;

/// Closed set of comparison categories. `Services` rows come from the
/// union of selected companies' tags rather than registry accessors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureCategory {
    Basic,
    Financial,
    Services,
    Technical,
}

impl std::fmt::Display for FeatureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Basic => write!(f, "basic"),
            Self::Financial => write!(f, "financial"),
            Self::Services => write!(f, "services"),
            Self::Technical => write!(f, "technical"),
        }
    }
}

impl std::str::FromStr for FeatureCategory {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Self::Basic),
            "financial" => Ok(Self::Financial),
            "services" => Ok(Self::Services),
            "technical" => Ok(Self::Technical),
            other => Err(format!("unknown feature category: {other}")),
        }
    }
}

/// A comparison cell value. Display gives the canonical string form the
/// diff engine compares with; no numeric normalization happens, so values
/// that stringify differently stay different.
#[derive(Clone, Debug, PartialEq)]
pub enum FeatureValue {
    Text(String),
    Int(i64),
}

impl std::fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
        }
    }
}

/// One row of the comparison table: a stable id, a human label, a
/// category tag and a pure accessor.
pub struct Feature {
    pub id: &'static str,
    pub label: &'static str,
    pub category: FeatureCategory,
    pub get_value: fn(&Company) -> Option<FeatureValue>,
}

impl Feature {
    pub fn value(&self, company: &Company) -> Option<FeatureValue> {
        (self.get_value)(company)
    }
}

/// Static, ordered registry of comparison features. Built once at startup
/// and never mutated; new features are added by appending. Duplicate ids
/// are a configuration error caught by tests, not at runtime.
pub struct FeatureRegistry {
    features: Vec<Feature>,
}

impl FeatureRegistry {
    pub fn standard() -> Self {
        Self {
            features: vec![
                Feature {
                    id: "location",
                    label: "Location",
                    category: FeatureCategory::Basic,
                    get_value: |c| {
                        if c.location.is_empty() {
                            None
                        } else {
                            Some(FeatureValue::Text(c.location.clone()))
                        }
                    },
                },
                Feature {
                    id: "team_size",
                    label: "Team Size",
                    category: FeatureCategory::Basic,
                    get_value: |c| c.team_size.map(|n| FeatureValue::Int(n as i64)),
                },
                Feature {
                    id: "founded",
                    label: "Founded",
                    category: FeatureCategory::Basic,
                    get_value: |c| c.founded.map(|y| FeatureValue::Int(y as i64)),
                },
                Feature {
                    id: "hourly_rate",
                    label: "Hourly Rate",
                    category: FeatureCategory::Financial,
                    get_value: |c| c.hourly_rate.clone().map(FeatureValue::Text),
                },
                Feature {
                    id: "min_project_size",
                    label: "Minimum Project Size",
                    category: FeatureCategory::Financial,
                    get_value: |c| c.min_project_size.clone().map(FeatureValue::Text),
                },
                Feature {
                    id: "avg_project_length",
                    label: "Average Project Length",
                    category: FeatureCategory::Financial,
                    get_value: |c| c.avg_project_length.clone().map(FeatureValue::Text),
                },
                Feature {
                    id: "industry",
                    label: "Industry",
                    category: FeatureCategory::Technical,
                    get_value: |c| c.industry.clone().map(FeatureValue::Text),
                },
            ],
        }
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn get(&self, id: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.id == id)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
