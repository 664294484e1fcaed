use serde::{Deserialize, Serialize};

/// How a data tree guards array-valued leaves against aliasing.
///
/// Only arrays are affected. Scalars and strings are plain values, and
/// nested views are always copied on write regardless of the mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyMode {
    /// Arrays are cloned when stored and again when read.
    #[default]
    AllDataCloned,
    /// Arrays are cloned when stored and returned by reference.
    ClonedOnSet,
    /// Arrays are stored and returned by reference.
    NoDataCloned,
}

impl SafetyMode {
    pub fn clones_on_set(self) -> bool {
        matches!(self, SafetyMode::AllDataCloned | SafetyMode::ClonedOnSet)
    }

    pub fn clones_on_get(self) -> bool {
        matches!(self, SafetyMode::AllDataCloned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_policy() {
        assert!(SafetyMode::AllDataCloned.clones_on_set());
        assert!(SafetyMode::AllDataCloned.clones_on_get());
        assert!(SafetyMode::ClonedOnSet.clones_on_set());
        assert!(!SafetyMode::ClonedOnSet.clones_on_get());
        assert!(!SafetyMode::NoDataCloned.clones_on_set());
        assert!(!SafetyMode::NoDataCloned.clones_on_get());
    }

    #[test]
    fn test_default_is_all_data_cloned() {
        assert_eq!(SafetyMode::default(), SafetyMode::AllDataCloned);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&SafetyMode::ClonedOnSet).unwrap();
        assert_eq!(json, "\"cloned_on_set\"");
        let mode: SafetyMode = serde_json::from_str("\"no_data_cloned\"").unwrap();
        assert_eq!(mode, SafetyMode::NoDataCloned);
    }
}
