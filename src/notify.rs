//! # Notification Module
//!
//! The editor never shows anything itself. Every user-visible outcome is
//! emitted as a [`Notice`] through a [`Notifier`], and the host decides
//! whether that becomes a toast, a dialog or a log line.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;
use tracing::{info, warn};

use crate::errors::RecipeError;
use crate::localization::t_args_lang;

/// Category of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// Percentages do not sum to 100
    RatioMismatch,
    /// A single percentage is below 0 or above 100
    PercentageOutOfRange,
    /// No usable ingredient line
    EmptyRecipe,
    /// Removal of the last line was refused
    MinimumLineGuard,
    /// The external API call failed
    SubmitTransportError,
    /// The blend was saved
    Saved,
}

impl NoticeKind {
    /// Check if this notice reports a failure
    pub fn is_error(&self) -> bool {
        !matches!(self, NoticeKind::Saved)
    }
}

/// Structured `{kind, message}` value handed to the host UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    /// Create a notice from its parts
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Localized notice for an editor error
    ///
    /// Returns `None` for errors that are programming mistakes rather than
    /// user-facing conditions (bad index, double submit).
    pub fn from_error(err: &RecipeError, language: &str) -> Option<Self> {
        let notice = match err {
            RecipeError::RatioMismatch { total } => Notice::new(
                NoticeKind::RatioMismatch,
                t_args_lang(
                    "notice-ratio-mismatch",
                    &[("total", format_total(*total).as_str())],
                    language,
                ),
            ),
            RecipeError::PercentageOutOfRange { index, value } => Notice::new(
                NoticeKind::PercentageOutOfRange,
                t_args_lang(
                    "notice-percentage-out-of-range",
                    &[
                        ("line", (index + 1).to_string().as_str()),
                        ("value", format_total(*value).as_str()),
                    ],
                    language,
                ),
            ),
            RecipeError::EmptyRecipe => Notice::new(
                NoticeKind::EmptyRecipe,
                t_args_lang("notice-empty-recipe", &[], language),
            ),
            RecipeError::MinimumLineGuard => Notice::new(
                NoticeKind::MinimumLineGuard,
                t_args_lang("notice-minimum-line", &[], language),
            ),
            RecipeError::SubmitTransport(error) => Notice::new(
                NoticeKind::SubmitTransportError,
                t_args_lang("notice-submit-failed", &[("error", error.as_str())], language),
            ),
            RecipeError::LineIndexOutOfRange { .. }
            | RecipeError::SubmitInProgress
            | RecipeError::AlreadySubmitted => return None,
        };
        Some(notice)
    }

    /// Localized success notice
    pub fn saved(language: &str) -> Self {
        Notice::new(
            NoticeKind::Saved,
            t_args_lang("notice-submit-success", &[], language),
        )
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Format a percentage total for display (at most two decimals)
pub fn format_total(total: f64) -> String {
    let rounded = (total * 100.0).round() / 100.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{rounded}")
}

/// Sink for user-facing notices
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Notifier that writes notices to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        if notice.kind.is_error() {
            warn!(kind = ?notice.kind, message = %notice.message, "User notice");
        } else {
            info!(kind = ?notice.kind, message = %notice.message, "User notice");
        }
    }
}

/// Notifier that keeps every notice in memory
///
/// Used by hosts that render notices in batches, and by tests.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all notices so far
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }

    /// Remove and return all notices
    pub fn drain(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|mut notices| std::mem::take(&mut *notices))
            .unwrap_or_default()
    }

    /// Kinds of all notices so far, in emission order
    pub fn kinds(&self) -> Vec<NoticeKind> {
        self.notices().iter().map(|n| n.kind).collect()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}
