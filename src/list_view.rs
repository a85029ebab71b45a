//! # Catalog List View Module
//!
//! Derived list state for catalog pages and the ingredient picker: search,
//! tab filter, sort and pagination over an in-memory list, plus a small cache
//! that the editor invalidates after a successful save.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::future::Future;
use std::sync::Mutex;
use tracing::debug;

use crate::config::DEFAULT_PAGE_SIZE;
use crate::errors::ApiError;
use crate::recipe_model::{BeanSummary, BlendSummary};

/// Tab filter applied before search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    All,
    Active,
    Inactive,
}

/// Column to sort by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Id,
    Name,
    Stock,
}

/// Everything needed to derive one visible page from a full list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    /// Case-insensitive substring; empty matches everything
    pub search: String,
    pub tab: Tab,
    pub sort: SortField,
    pub descending: bool,
    /// 1-based page number
    pub page: usize,
    pub page_size: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            tab: Tab::All,
            sort: SortField::Id,
            descending: false,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListQuery {
    /// Set the search text and go back to the first page
    pub fn with_search(mut self, search: &str) -> Self {
        self.search = search.to_string();
        self.page = 1;
        self
    }

    /// Set the tab and go back to the first page
    pub fn with_tab(mut self, tab: Tab) -> Self {
        self.tab = tab;
        self.page = 1;
        self
    }

    /// Set the sort column and direction
    pub fn with_sort(mut self, sort: SortField, descending: bool) -> Self {
        self.sort = sort;
        self.descending = descending;
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}

/// Items that can be shown in a [`ListQuery`]-driven list
pub trait Listable {
    /// Text matched against the search string
    fn search_text(&self) -> String;

    /// Whether the item belongs to the given tab
    fn in_tab(&self, tab: Tab) -> bool;

    /// Ascending order for the given column
    fn compare_by(&self, other: &Self, field: SortField) -> Ordering;
}

impl Listable for BeanSummary {
    fn search_text(&self) -> String {
        let mut text = self.name.clone();
        for extra in [&self.origin, &self.roast_level].into_iter().flatten() {
            text.push(' ');
            text.push_str(extra);
        }
        text
    }

    fn in_tab(&self, tab: Tab) -> bool {
        match tab {
            Tab::All => true,
            Tab::Active => self.is_active,
            Tab::Inactive => !self.is_active,
        }
    }

    fn compare_by(&self, other: &Self, field: SortField) -> Ordering {
        match field {
            SortField::Id => self.id.cmp(&other.id),
            SortField::Name => self.name.to_lowercase().cmp(&other.name.to_lowercase()),
            SortField::Stock => self
                .stock_kg
                .unwrap_or(0.0)
                .total_cmp(&other.stock_kg.unwrap_or(0.0)),
        }
    }
}

impl Listable for BlendSummary {
    fn search_text(&self) -> String {
        self.name.clone()
    }

    fn in_tab(&self, tab: Tab) -> bool {
        match tab {
            Tab::All => true,
            Tab::Active => self.is_active,
            Tab::Inactive => !self.is_active,
        }
    }

    fn compare_by(&self, other: &Self, field: SortField) -> Ordering {
        match field {
            SortField::Id => self.id.cmp(&other.id),
            SortField::Name => self.name.to_lowercase().cmp(&other.name.to_lowercase()),
            SortField::Stock => self
                .stock_kg
                .unwrap_or(0.0)
                .total_cmp(&other.stock_kg.unwrap_or(0.0)),
        }
    }
}

/// One visible page of a filtered, sorted list
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Page actually shown, after clamping
    pub page: usize,
    pub total_pages: usize,
    /// Number of items that passed the filters
    pub total_items: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Apply search, tab filter, sort and pagination to a list
///
/// The requested page is clamped into `[1, total_pages]` and there is always
/// at least one (possibly empty) page.
pub fn apply<T: Listable + Clone>(items: &[T], query: &ListQuery) -> Page<T> {
    let needle = query.search.trim().to_lowercase();

    let mut filtered: Vec<&T> = items
        .iter()
        .filter(|item| item.in_tab(query.tab))
        .filter(|item| needle.is_empty() || item.search_text().to_lowercase().contains(&needle))
        .collect();

    filtered.sort_by(|a, b| {
        let ordering = a.compare_by(b, query.sort);
        if query.descending {
            ordering.reverse()
        } else {
            ordering
        }
    });

    let page_size = query.page_size.max(1);
    let total_items = filtered.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let page = query.page.clamp(1, total_pages);

    let items = filtered
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .cloned()
        .collect();

    Page {
        items,
        page,
        total_pages,
        total_items,
    }
}

/// Hook the editor calls after a successful save
pub trait ListRefresh: Send + Sync {
    /// Mark the owning list as stale so the next read re-fetches
    fn invalidate(&self);
}

#[derive(Debug)]
struct CacheState<T> {
    items: Option<Vec<T>>,
    stale: bool,
}

/// Last fetched copy of a list, refreshed on demand
#[derive(Debug)]
pub struct ListCache<T> {
    state: Mutex<CacheState<T>>,
}

impl<T> Default for ListCache<T> {
    fn default() -> Self {
        Self {
            state: Mutex::new(CacheState {
                items: None,
                stale: false,
            }),
        }
    }
}

impl<T: Clone> ListCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the next read will re-fetch
    pub fn is_stale(&self) -> bool {
        self.state
            .lock()
            .map(|state| state.stale || state.items.is_none())
            .unwrap_or(true)
    }

    /// Cached items, or the result of `fetch` when stale or empty
    ///
    /// A failed fetch leaves the cache untouched.
    pub async fn get_or_refresh<F, Fut>(&self, fetch: F) -> Result<Vec<T>, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, ApiError>>,
    {
        if let Ok(state) = self.state.lock() {
            if let (false, Some(items)) = (state.stale, &state.items) {
                return Ok(items.clone());
            }
        }

        debug!("List cache miss, fetching");
        let items = fetch().await?;

        if let Ok(mut state) = self.state.lock() {
            state.items = Some(items.clone());
            state.stale = false;
        }
        Ok(items)
    }
}

impl<T: Send> ListRefresh for ListCache<T> {
    fn invalidate(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.stale = true;
        }
    }
}
