use serde::Serialize;
use serde_json::Value;

/// Judgment the model assigns to a principle criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionStatus {
    Met,
    Partial,
    NotMet,
}

impl CriterionStatus {
    pub const ALL: [CriterionStatus; 3] = [Self::Met, Self::Partial, Self::NotMet];

    /// Anything other than a recognised string earns no credit.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_str).map(str::trim) {
            Some("met") => Self::Met,
            Some("partial") => Self::Partial,
            _ => Self::NotMet,
        }
    }

    pub fn multiplier(self) -> f64 {
        match self {
            Self::Met => 1.0,
            Self::Partial => 0.5,
            Self::NotMet => 0.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Met => "met",
            Self::Partial => "partial",
            Self::NotMet => "not_met",
        }
    }
}

/// Judgment the model assigns to a structural checklist element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementStatus {
    Present,
    Partial,
    Missing,
}

impl ElementStatus {
    pub const ALL: [ElementStatus; 3] = [Self::Present, Self::Partial, Self::Missing];

    pub fn from_value(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_str).map(str::trim) {
            Some("present") => Self::Present,
            Some("partial") => Self::Partial,
            _ => Self::Missing,
        }
    }

    pub fn points(self) -> u32 {
        match self {
            Self::Present => 2,
            Self::Partial => 1,
            Self::Missing => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Partial => "partial",
            Self::Missing => "missing",
        }
    }
}
