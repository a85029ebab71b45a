//! # Blend Recipe Data Model
//!
//! This module defines the two representations of a blend recipe:
//!
//! - **Draft**: [`RecipeLine`] keeps both fields as free text so the user can
//!   type partial input such as `"12."` or leave a field empty.
//! - **Committed**: [`RecipeComponent`] is the numeric `{ingredient_ref, ratio}`
//!   pair exchanged with the external API, where `ratio` is in `[0, 1]`.
//!
//! Conversion between them happens only when a recipe is hydrated from a
//! fetched [`BlendRecord`] and when it is submitted as a [`BlendPayload`].
//!
//! ## Usage
//!
//! ```rust
//! use roastery::recipe_model::{RecipeComponent, RecipeLine};
//!
//! let line = RecipeLine::with_values("12", "60");
//! let component = RecipeComponent::from_line(&line).unwrap();
//! assert_eq!(component.ingredient_ref, 12);
//! assert!((component.ratio - 0.6).abs() < 1e-12);
//! ```

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Identifier of a bean in the external catalog
pub type IngredientRef = i64;

// Longest numeric prefix, same shape the host form parser accepts
const NUMERIC_PREFIX_PATTERN: &str = r"^\s*([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)";

// Hydrated percentages are rounded to this many decimal places
const PERCENTAGE_PRECISION: f64 = 1e6;

lazy_static! {
    static ref NUMERIC_PREFIX_REGEX: Regex =
        Regex::new(NUMERIC_PREFIX_PATTERN).expect("Numeric prefix pattern should be valid");
}

/// Parse the leading numeric part of a draft value
///
/// Leading whitespace is skipped and trailing garbage is ignored, so
/// `"12."`, `"12abc"` and `" 7.5 "` all parse. Returns `None` when the value
/// does not start with a number (including the empty string).
///
/// # Examples
///
/// ```rust
/// use roastery::recipe_model::parse_numeric_prefix;
///
/// assert_eq!(parse_numeric_prefix("12."), Some(12.0));
/// assert_eq!(parse_numeric_prefix("40%"), Some(40.0));
/// assert_eq!(parse_numeric_prefix(""), None);
/// assert_eq!(parse_numeric_prefix("abc"), None);
/// ```
pub fn parse_numeric_prefix(value: &str) -> Option<f64> {
    let captures = NUMERIC_PREFIX_REGEX.captures(value)?;
    let matched = captures.get(1)?.as_str();
    let normalized = matched.strip_suffix('.').unwrap_or(matched);
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Format a stored ratio as a draft percentage string
///
/// Floating noise from `ratio * 100` is rounded away and whole numbers are
/// printed without a decimal point (`0.4` becomes `"40"`, `0.125` becomes
/// `"12.5"`).
pub fn ratio_to_percentage(ratio: f64) -> String {
    let percentage = (ratio * 100.0 * PERCENTAGE_PRECISION).round() / PERCENTAGE_PRECISION;
    if percentage == 0.0 {
        // avoids "-0"
        return "0".to_string();
    }
    format!("{percentage}")
}

/// Convert a percentage in `[0, 100]` to a ratio in `[0, 1]`
pub fn percentage_to_ratio(percentage: f64) -> f64 {
    percentage / 100.0
}

/// Which field of a [`RecipeLine`] an edit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineField {
    /// The selected bean id
    Ingredient,
    /// The share of the recipe, in percent
    Percentage,
}

/// One draft row of a recipe being edited
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeLine {
    /// Selected bean id as typed/selected; empty means unset
    pub ingredient_ref: String,
    /// Share of the recipe in percent, as typed
    pub percentage: String,
}

impl RecipeLine {
    /// Create an empty line
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a line with both fields set
    pub fn with_values(ingredient_ref: &str, percentage: &str) -> Self {
        Self {
            ingredient_ref: ingredient_ref.to_string(),
            percentage: percentage.to_string(),
        }
    }

    /// Set one field to a new draft value
    pub fn set(&mut self, field: LineField, value: &str) {
        match field {
            LineField::Ingredient => self.ingredient_ref = value.to_string(),
            LineField::Percentage => self.percentage = value.to_string(),
        }
    }

    /// Numeric percentage, if the draft starts with a number
    pub fn percentage_value(&self) -> Option<f64> {
        parse_numeric_prefix(&self.percentage)
    }

    /// Percentage contribution to the running total (`0` when not numeric)
    pub fn percentage_or_zero(&self) -> f64 {
        self.percentage_value().unwrap_or(0.0)
    }

    /// Selected bean id, if the draft holds one
    pub fn ingredient_value(&self) -> Option<IngredientRef> {
        let trimmed = self.ingredient_ref.trim();
        if trimmed.is_empty() {
            return None;
        }
        trimmed.parse::<IngredientRef>().ok()
    }

    /// Check if nothing has been entered on this line
    pub fn is_blank(&self) -> bool {
        self.ingredient_ref.trim().is_empty() && self.percentage.trim().is_empty()
    }

    /// Check if this line can be committed
    pub fn is_complete(&self) -> bool {
        self.ingredient_value().is_some() && self.percentage_value().is_some()
    }
}

/// Committed `{ingredient_ref, ratio}` pair as stored by the external API
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecipeComponent {
    /// Bean id in the external catalog
    pub ingredient_ref: IngredientRef,
    /// Normalized share in `[0, 1]`
    pub ratio: f64,
}

impl RecipeComponent {
    /// Create a component from its parts
    pub fn new(ingredient_ref: IngredientRef, ratio: f64) -> Self {
        Self {
            ingredient_ref,
            ratio,
        }
    }

    /// Commit a draft line; `None` when the line is incomplete
    pub fn from_line(line: &RecipeLine) -> Option<Self> {
        let ingredient_ref = line.ingredient_value()?;
        let percentage = line.percentage_value()?;
        Some(Self::new(ingredient_ref, percentage_to_ratio(percentage)))
    }

    /// Turn a stored component back into an editable draft line
    pub fn to_line(&self) -> RecipeLine {
        RecipeLine {
            ingredient_ref: self.ingredient_ref.to_string(),
            percentage: ratio_to_percentage(self.ratio),
        }
    }
}

impl fmt::Display for RecipeComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bean #{} → {}%",
            self.ingredient_ref,
            ratio_to_percentage(self.ratio)
        )
    }
}

/// Blend as returned by the external API
///
/// Fields this crate does not interpret are kept in `extra` and sent back
/// unchanged on update.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BlendRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub recipe: Vec<RecipeComponent>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BlendRecord {
    /// Draft lines for editing, in stored order
    pub fn draft_lines(&self) -> Vec<RecipeLine> {
        self.recipe.iter().map(RecipeComponent::to_line).collect()
    }

    /// Non-recipe fields to carry into a write payload
    pub fn payload_fields(&self) -> Map<String, Value> {
        let mut fields = self.extra.clone();
        if let Some(name) = &self.name {
            fields.insert("name".to_string(), Value::String(name.clone()));
        }
        fields
    }
}

/// Body of a blend create or update call
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BlendPayload {
    pub recipe: Vec<RecipeComponent>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl BlendPayload {
    /// Sum of all ratios in the payload
    pub fn ratio_sum(&self) -> f64 {
        self.recipe.iter().map(|c| c.ratio).sum()
    }
}

/// Bean entry of the external catalog, as offered in the ingredient picker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeanSummary {
    pub id: IngredientRef,
    pub name: String,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub roast_level: Option<String>,
    #[serde(default)]
    pub stock_kg: Option<f64>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl fmt::Display for BeanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.id, self.name)?;
        if let Some(origin) = &self.origin {
            write!(f, " ({origin})")?;
        }
        if let Some(stock) = self.stock_kg {
            write!(f, " - {stock:.1} kg")?;
        }
        Ok(())
    }
}

/// Row of the blend list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendSummary {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub stock_kg: Option<f64>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl fmt::Display for BlendSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.id, self.name)?;
        if let Some(stock) = self.stock_kg {
            write!(f, " - {stock:.1} kg")?;
        }
        if !self.is_active {
            write!(f, " [inactive]")?;
        }
        Ok(())
    }
}
