//! # Roastery Blend Recipe Client
//!
//! Client-side model for editing café blend recipes: draft lines that must
//! sum to 100 %, converted to normalized ratios for the external roastery
//! API, plus the catalog list view and a small CLI front end.

pub mod api_client;
pub mod cli;
pub mod config;
pub mod editor;
pub mod errors;
pub mod list_view;
pub mod localization;
pub mod notify;
pub mod recipe_model;
