//! # Recipe Editor Module
//!
//! Local, transient editing state for a blend recipe.
//!
//! Lines are kept as free-text drafts while the user types. Numbers are only
//! read at two points: [`RecipeEditor::compute_total`] for the live total and
//! submission, where the 100 % rule and the "at least one usable line" rule are
//! enforced. Failures never abort the session; they are reported through the
//! attached [`Notifier`] and returned as [`RecipeError`] so the user can fix
//! the recipe and try again.
//!
//! # State Machine
//!
//! - **Editing**: add/remove/update allowed
//! - **Submitting**: a create/update call is in flight, edits are refused
//! - **Submitted**: terminal, the host is expected to navigate away

use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api_client::BlendApi;
use crate::config::DEFAULT_LANGUAGE;
use crate::errors::{ApiError, RecipeError};
use crate::list_view::ListRefresh;
use crate::notify::{Notice, Notifier};
use crate::recipe_model::{BlendPayload, BlendRecord, LineField, RecipeComponent, RecipeLine};

/// Total the percentages must reach
pub const TARGET_TOTAL: f64 = 100.0;

/// Accepted distance from [`TARGET_TOTAL`]
pub const TOTAL_TOLERANCE: f64 = 0.1;

// Absorbs binary rounding so that e.g. 33.3 * 3 counts as exactly 99.9
const FLOAT_SLACK: f64 = 1e-9;

/// Lifecycle of one editing session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Editing,
    Submitting,
    Submitted,
}

/// Whether submission creates a new blend or updates a fetched one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Update { blend_id: i64 },
}

/// Check a percentage total against the 100 % rule
pub fn total_is_valid(total: f64) -> bool {
    (total - TARGET_TOTAL).abs() <= TOTAL_TOLERANCE + FLOAT_SLACK
}

/// Check a single line's percentage against `[0, 100]`
pub fn percentage_in_domain(value: f64) -> bool {
    (0.0..=TARGET_TOTAL).contains(&value)
}

/// Result of a successful [`RecipeEditor::submit`]
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitReceipt {
    /// Stored blend, when the server echoed it back
    pub record: Option<BlendRecord>,
    /// Number of components sent
    pub component_count: usize,
}

/// Editing session for one blend recipe
pub struct RecipeEditor {
    lines: Vec<RecipeLine>,
    mode: EditorMode,
    fields: Map<String, Value>,
    state: EditorState,
    language: String,
    notifier: Arc<dyn Notifier>,
    list_refresh: Option<Arc<dyn ListRefresh>>,
}

impl std::fmt::Debug for RecipeEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeEditor")
            .field("lines", &self.lines)
            .field("mode", &self.mode)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl RecipeEditor {
    /// Start a new recipe with a single empty line
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use roastery::editor::RecipeEditor;
    /// use roastery::notify::MemoryNotifier;
    ///
    /// let editor = RecipeEditor::new(Arc::new(MemoryNotifier::new()));
    /// assert_eq!(editor.line_count(), 1);
    /// assert_eq!(editor.compute_total(), 0.0);
    /// ```
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            lines: vec![RecipeLine::new()],
            mode: EditorMode::Create,
            fields: Map::new(),
            state: EditorState::Editing,
            language: DEFAULT_LANGUAGE.to_string(),
            notifier,
            list_refresh: None,
        }
    }

    /// Hydrate an editor from a fetched blend
    ///
    /// Each stored ratio becomes a percentage draft (`0.4` → `"40"`). A record
    /// without an id is edited as a new blend.
    pub fn from_record(record: &BlendRecord, notifier: Arc<dyn Notifier>) -> Self {
        let mut lines = record.draft_lines();
        if lines.is_empty() {
            lines.push(RecipeLine::new());
        }
        let mode = match record.id {
            Some(blend_id) => EditorMode::Update { blend_id },
            None => EditorMode::Create,
        };
        debug!(?mode, lines = lines.len(), "Hydrated recipe editor");

        Self {
            lines,
            mode,
            fields: record.payload_fields(),
            ..Self::new(notifier)
        }
    }

    /// Language used for notices
    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    /// List cache to invalidate after a successful save
    pub fn with_list_refresh(mut self, list_refresh: Arc<dyn ListRefresh>) -> Self {
        self.list_refresh = Some(list_refresh);
        self
    }

    /// Set a non-recipe field sent along with the recipe (e.g., "name")
    pub fn set_field(&mut self, key: &str, value: Value) {
        self.fields.insert(key.to_string(), value);
    }

    pub fn lines(&self) -> &[RecipeLine] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    fn ensure_editing(&self) -> Result<(), RecipeError> {
        match self.state {
            EditorState::Editing => Ok(()),
            EditorState::Submitting => Err(RecipeError::SubmitInProgress),
            EditorState::Submitted => Err(RecipeError::AlreadySubmitted),
        }
    }

    fn check_index(&self, index: usize) -> Result<(), RecipeError> {
        if index < self.lines.len() {
            Ok(())
        } else {
            warn!(index, len = self.lines.len(), "Line index out of range");
            Err(RecipeError::LineIndexOutOfRange {
                index,
                len: self.lines.len(),
            })
        }
    }

    /// Emit the notice for a user-facing error and hand the error back
    fn report(&self, err: RecipeError) -> RecipeError {
        if let Some(notice) = Notice::from_error(&err, &self.language) {
            self.notifier.notify(notice);
        }
        err
    }

    /// Append an empty line; returns its index
    pub fn add_line(&mut self) -> Result<usize, RecipeError> {
        self.ensure_editing()?;
        self.lines.push(RecipeLine::new());
        Ok(self.lines.len() - 1)
    }

    /// Remove the line at `index`
    ///
    /// The last remaining line is never removed: the call is a no-op that
    /// emits a `MinimumLineGuard` notice.
    pub fn remove_line(&mut self, index: usize) -> Result<RecipeLine, RecipeError> {
        self.ensure_editing()?;
        self.check_index(index)?;
        if self.lines.len() <= 1 {
            return Err(self.report(RecipeError::MinimumLineGuard));
        }
        Ok(self.lines.remove(index))
    }

    /// Set one field of the line at `index`; any text is accepted
    pub fn update_line(&mut self, index: usize, field: LineField, value: &str) -> Result<(), RecipeError> {
        self.ensure_editing()?;
        self.check_index(index)?;
        self.lines[index].set(field, value);
        Ok(())
    }

    /// Sum of all percentages, counting non-numeric drafts as zero
    pub fn compute_total(&self) -> f64 {
        self.lines.iter().map(RecipeLine::percentage_or_zero).sum()
    }

    /// Check the submission rules without changing any state
    ///
    /// Returns the committed components on success. A recipe where nothing
    /// has been entered is empty. Every numeric percentage must lie in
    /// `[0, 100]`, and the total of all lines must be 100 within tolerance.
    /// Lines missing an ingredient or a numeric percentage are then dropped;
    /// at least one must remain and the kept lines alone must still reach
    /// 100, so a share typed on a line without a bean is never lost silently.
    pub fn validate(&self) -> Result<Vec<RecipeComponent>, RecipeError> {
        if self.lines.iter().all(RecipeLine::is_blank) {
            return Err(RecipeError::EmptyRecipe);
        }

        for (index, line) in self.lines.iter().enumerate() {
            if let Some(value) = line.percentage_value() {
                if !percentage_in_domain(value) {
                    return Err(RecipeError::PercentageOutOfRange { index, value });
                }
            }
        }

        let total = self.compute_total();
        if !total_is_valid(total) {
            return Err(RecipeError::RatioMismatch { total });
        }

        let complete: Vec<&RecipeLine> = self.lines.iter().filter(|line| line.is_complete()).collect();
        if complete.is_empty() {
            return Err(RecipeError::EmptyRecipe);
        }

        let committed_total: f64 = complete.iter().map(|line| line.percentage_or_zero()).sum();
        if !total_is_valid(committed_total) {
            return Err(RecipeError::RatioMismatch {
                total: committed_total,
            });
        }

        Ok(complete.into_iter().filter_map(RecipeComponent::from_line).collect())
    }

    /// First half of a submission: validate and enter `Submitting`
    ///
    /// Hosts that drive the network call from their own event loop call this,
    /// send the returned payload, then report the outcome with
    /// [`Self::finish_submit`].
    pub fn begin_submit(&mut self) -> Result<BlendPayload, RecipeError> {
        self.ensure_editing()?;
        let recipe = self.validate().map_err(|err| {
            debug!(error = %err, "Submission rejected locally");
            self.report(err)
        })?;

        self.state = EditorState::Submitting;
        Ok(BlendPayload {
            recipe,
            fields: self.fields.clone(),
        })
    }

    /// Second half of a submission: record the external call's outcome
    ///
    /// Success is terminal and invalidates the owning list cache. A failure
    /// returns to `Editing` with the error text kept verbatim; nothing is
    /// retried.
    pub fn finish_submit<T>(&mut self, outcome: Result<T, ApiError>) -> Result<T, RecipeError> {
        match self.state {
            EditorState::Submitting => {}
            EditorState::Submitted => return Err(RecipeError::AlreadySubmitted),
            EditorState::Editing => {
                warn!("finish_submit called without begin_submit");
                return Err(RecipeError::SubmitTransport(
                    "no submission in progress".to_string(),
                ));
            }
        }

        match outcome {
            Ok(value) => {
                self.state = EditorState::Submitted;
                info!(mode = ?self.mode, "Blend recipe saved");
                self.notifier.notify(Notice::saved(&self.language));
                if let Some(list_refresh) = &self.list_refresh {
                    list_refresh.invalidate();
                }
                Ok(value)
            }
            Err(err) => {
                self.state = EditorState::Editing;
                warn!(error = %err, "Blend recipe submission failed");
                Err(self.report(RecipeError::from(err)))
            }
        }
    }

    /// Validate and send the recipe through `api`
    ///
    /// Creates a blend in [`EditorMode::Create`] and updates it in
    /// [`EditorMode::Update`]. The API is not called when local validation
    /// fails.
    pub async fn submit(&mut self, api: &dyn BlendApi) -> Result<SubmitReceipt, RecipeError> {
        let payload = self.begin_submit()?;
        let outcome = match self.mode {
            EditorMode::Create => api.create_blend(&payload).await,
            EditorMode::Update { blend_id } => api.update_blend(blend_id, &payload).await,
        };
        let record = self.finish_submit(outcome)?;
        Ok(SubmitReceipt {
            record,
            component_count: payload.recipe.len(),
        })
    }
}
