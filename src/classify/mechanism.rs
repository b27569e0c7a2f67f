use serde::Serialize;
use std::fmt;

/// Broad funding instrument, taken from the activity code's first letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum MechanismCategory {
    R,
    U,
    P,
    K,
    T,
    Other,
}

impl MechanismCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MechanismCategory::R => "R",
            MechanismCategory::U => "U",
            MechanismCategory::P => "P",
            MechanismCategory::K => "K",
            MechanismCategory::T => "T",
            MechanismCategory::Other => "Other",
        }
    }

    pub fn from_activity(activity_code: &str) -> Self {
        match activity_code.trim().chars().next().map(|c| c.to_ascii_uppercase()) {
            Some('R') => MechanismCategory::R,
            Some('U') => MechanismCategory::U,
            Some('P') => MechanismCategory::P,
            Some('K') => MechanismCategory::K,
            Some('T') => MechanismCategory::T,
            _ => MechanismCategory::Other,
        }
    }
}

impl fmt::Display for MechanismCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
