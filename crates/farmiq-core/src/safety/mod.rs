//! Content safety port.
//!
//! Analyzes user input before it reaches the completion provider. The Azure
//! Content Safety client lives in farmiq-infra.

use std::future::Future;
use std::pin::Pin;

use farmiq_types::error::SafetyError;
use farmiq_types::safety::SafetyAnalysis;

/// Trait for text moderation backends.
pub trait ContentSafety: Send + Sync {
    /// Severity at or above which a category counts as a violation.
    fn violation_threshold(&self) -> u8;

    fn analyze_text(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<SafetyAnalysis, SafetyError>> + Send;
}

/// Object-safe version of [`ContentSafety`] with boxed futures.
pub trait ContentSafetyDyn: Send + Sync {
    fn violation_threshold_dyn(&self) -> u8;

    fn analyze_text_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<SafetyAnalysis, SafetyError>> + Send + 'a>>;
}

impl<T: ContentSafety> ContentSafetyDyn for T {
    fn violation_threshold_dyn(&self) -> u8 {
        self.violation_threshold()
    }

    fn analyze_text_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<SafetyAnalysis, SafetyError>> + Send + 'a>> {
        Box::pin(self.analyze_text(text))
    }
}

/// Type-erased content safety client.
pub struct BoxContentSafety {
    inner: Box<dyn ContentSafetyDyn + Send + Sync>,
}

impl BoxContentSafety {
    pub fn new<T: ContentSafety + 'static>(safety: T) -> Self {
        Self {
            inner: Box::new(safety),
        }
    }

    pub fn violation_threshold(&self) -> u8 {
        self.inner.violation_threshold_dyn()
    }

    pub async fn analyze_text(&self, text: &str) -> Result<SafetyAnalysis, SafetyError> {
        self.inner.analyze_text_boxed(text).await
    }

    /// Names of the categories that violate the threshold, comma separated,
    /// or `None` when the text is acceptable.
    pub async fn check(&self, text: &str) -> Result<Option<String>, SafetyError> {
        let analysis = self.analyze_text(text).await?;
        let violations = analysis.violations(self.violation_threshold());
        if violations.is_empty() {
            return Ok(None);
        }
        let names: Vec<&str> = violations.iter().map(|c| c.category.as_str()).collect();
        Ok(Some(names.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FixedSafety;

    #[tokio::test]
    async fn test_check_reports_violating_categories() {
        let safety = BoxContentSafety::new(FixedSafety::new(4, &[("Hate", 2), ("Violence", 4)]));
        assert_eq!(safety.check("text").await.unwrap().as_deref(), Some("Violence"));
    }

    #[tokio::test]
    async fn test_check_accepts_below_threshold() {
        let safety = BoxContentSafety::new(FixedSafety::new(4, &[("Hate", 0), ("Sexual", 2)]));
        assert!(safety.check("text").await.unwrap().is_none());
    }
}
