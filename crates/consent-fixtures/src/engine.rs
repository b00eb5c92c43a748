//! The detection engine contract.
//!
//! The harness never looks inside the engine. It prepares a shared profile
//! once through [`DetectionEngine::prepare_profile`] and then asks for one
//! [`CheckResult`] per fixture through [`DetectionEngine::check_page`].
//! Implementations must be safe to call concurrently for different pages.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{BaseConfiguration, CheckConfiguration};
use crate::error::{HarnessError, Result};

/// A cookie notice located by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedNotice {
    /// Captured inner markup of the notice element.
    pub markup_inner: String,
    /// Breadth of the hideable element subtree.
    pub hideable_element_range: u32,
}

/// What the engine observed on a page it managed to analyze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// The notice, if one was identified.
    pub notice: Option<DetectedNotice>,
    /// Whether page scrolling was suppressed.
    pub scroll_blocked: bool,
}

impl Detection {
    /// Whether a cookie notice was identified.
    #[must_use]
    pub fn identified(&self) -> bool {
        self.notice.is_some()
    }
}

/// Outcome of a single page check.
///
/// An errored check carries no detection fields at all, and notice markup
/// only exists when a notice was identified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResult {
    /// The engine could not analyze the page.
    Errored(String),
    /// The engine analyzed the page.
    Completed(Detection),
}

impl CheckResult {
    /// Builds an errored result from anything displayable.
    pub fn error(reason: impl ToString) -> Self {
        Self::Errored(reason.to_string())
    }

    /// The error message, if the check failed.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Errored(reason) => Some(reason),
            Self::Completed(_) => None,
        }
    }

    /// The detection, if the check completed.
    #[must_use]
    pub fn detection(&self) -> Option<&Detection> {
        match self {
            Self::Errored(_) => None,
            Self::Completed(detection) => Some(detection),
        }
    }
}

/// JSON shape of a check result as emitted by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCheckResult {
    /// Failure description; all other fields are ignored when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether a cookie notice was located.
    #[serde(default)]
    pub identified: bool,
    /// Present only when `identified`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markup_inner: Option<String>,
    /// Present only when `identified`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hideable_element_range: Option<u32>,
    /// Whether page scrolling was suppressed.
    #[serde(default)]
    pub scroll_blocked: bool,
}

impl TryFrom<RawCheckResult> for CheckResult {
    type Error = HarnessError;

    fn try_from(raw: RawCheckResult) -> Result<Self> {
        // An empty error string does not mark the check as failed.
        if let Some(error) = raw.error.filter(|e| !e.is_empty()) {
            return Ok(Self::Errored(error));
        }

        let notice = if raw.identified {
            match (raw.markup_inner, raw.hideable_element_range) {
                (Some(markup_inner), Some(hideable_element_range)) => Some(DetectedNotice {
                    markup_inner,
                    hideable_element_range,
                }),
                (None, _) => {
                    return Err(HarnessError::EngineOutput(
                        "identified result without markupInner".to_string(),
                    ));
                }
                (_, None) => {
                    return Err(HarnessError::EngineOutput(
                        "identified result without hideableElementRange".to_string(),
                    ));
                }
            }
        } else {
            None
        };

        Ok(Self::Completed(Detection {
            notice,
            scroll_blocked: raw.scroll_blocked,
        }))
    }
}

/// An engine able to prepare a browser profile and check pages.
///
/// The trait is object-safe so runners can hold `Arc<dyn DetectionEngine>`.
#[async_trait]
pub trait DetectionEngine: Send + Sync {
    /// One-time setup of the shared profile.
    ///
    /// # Errors
    ///
    /// Any error is fatal to the run; no page is checked afterwards.
    async fn prepare_profile(&self, base: &BaseConfiguration) -> Result<()>;

    /// Checks a single page.
    ///
    /// Failures are reported as [`CheckResult::Errored`], never by aborting.
    async fn check_page(&self, config: &CheckConfiguration) -> CheckResult;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Result<CheckResult> {
        let raw: RawCheckResult = serde_json::from_value(value)?;
        CheckResult::try_from(raw)
    }

    #[test]
    fn error_wins_over_other_fields() {
        let result = parse(json!({
            "error": "navigation timeout",
            "identified": true,
            "scrollBlocked": true
        }))
        .unwrap();

        assert_eq!(result, CheckResult::Errored("navigation timeout".to_string()));
        assert_eq!(result.error_message(), Some("navigation timeout"));
        assert!(result.detection().is_none());
    }

    #[test]
    fn empty_error_string_is_not_an_error() {
        let result = parse(json!({
            "error": "",
            "identified": false,
            "scrollBlocked": true
        }))
        .unwrap();

        assert_eq!(
            result,
            CheckResult::Completed(Detection {
                notice: None,
                scroll_blocked: true,
            })
        );
    }

    #[test]
    fn unidentified_result_drops_notice_fields() {
        let result = parse(json!({
            "identified": false,
            "markupInner": "<p>stale</p>",
            "scrollBlocked": true
        }))
        .unwrap();

        let detection = result.detection().unwrap();
        assert!(!detection.identified());
        assert!(detection.scroll_blocked);
    }

    #[test]
    fn identified_result_keeps_markup_and_range() {
        let result = parse(json!({
            "identified": true,
            "markupInner": "<div>We use cookies</div>",
            "hideableElementRange": 3,
            "scrollBlocked": false
        }))
        .unwrap();

        let notice = result.detection().unwrap().notice.clone().unwrap();
        assert_eq!(notice.markup_inner, "<div>We use cookies</div>");
        assert_eq!(notice.hideable_element_range, 3);
    }

    #[test]
    fn identified_without_markup_is_protocol_error() {
        let err = parse(json!({ "identified": true, "hideableElementRange": 1 })).unwrap_err();
        assert!(matches!(err, HarnessError::EngineOutput(_)));

        let err = parse(json!({ "identified": true, "markupInner": "<p/>" })).unwrap_err();
        assert!(matches!(err, HarnessError::EngineOutput(_)));
    }
}
