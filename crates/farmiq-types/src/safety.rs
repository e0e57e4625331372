//! Content safety analysis types.

use serde::{Deserialize, Serialize};

/// Severity reported for one harm category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAnalysis {
    pub category: String,
    pub severity: u8,
}

/// Result of analyzing one piece of text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyAnalysis {
    pub categories: Vec<CategoryAnalysis>,
}

impl SafetyAnalysis {
    /// Categories whose severity is at or above `threshold`.
    pub fn violations(&self, threshold: u8) -> Vec<&CategoryAnalysis> {
        self.categories
            .iter()
            .filter(|c| c.severity >= threshold)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violations_at_or_above_threshold() {
        let analysis = SafetyAnalysis {
            categories: vec![
                CategoryAnalysis { category: "Hate".into(), severity: 4 },
                CategoryAnalysis { category: "Violence".into(), severity: 2 },
                CategoryAnalysis { category: "SelfHarm".into(), severity: 6 },
            ],
        };
        let names: Vec<_> = analysis.violations(4).iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["Hate", "SelfHarm"]);
        assert!(analysis.violations(7).is_empty());
    }
}
