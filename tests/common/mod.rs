//! Shared test helpers: an in-memory `BlendApi` that records every call.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use roastery::api_client::BlendApi;
use roastery::editor::RecipeEditor;
use roastery::errors::ApiError;
use roastery::notify::MemoryNotifier;
use roastery::recipe_model::{BeanSummary, BlendPayload, BlendRecord, BlendSummary, LineField};

/// A write call received by [`FakeBlendApi`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(BlendPayload),
    Update(i64, BlendPayload),
}

#[derive(Default)]
pub struct FakeBlendApi {
    pub blends: Mutex<HashMap<i64, BlendRecord>>,
    pub beans: Vec<BeanSummary>,
    pub calls: Mutex<Vec<Call>>,
    pub bean_fetches: Mutex<usize>,
    pub blend_fetches: Mutex<usize>,
    /// Returned by every write call when set
    pub fail_writes: Option<ApiError>,
}

impl FakeBlendApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blend(self, record: BlendRecord) -> Self {
        if let Some(id) = record.id {
            self.blends.lock().unwrap().insert(id, record);
        }
        self
    }

    pub fn with_beans(mut self, beans: Vec<BeanSummary>) -> Self {
        self.beans = beans;
        self
    }

    pub fn failing_with(mut self, err: ApiError) -> Self {
        self.fail_writes = Some(err);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn bean_fetches(&self) -> usize {
        *self.bean_fetches.lock().unwrap()
    }

    pub fn blend_fetches(&self) -> usize {
        *self.blend_fetches.lock().unwrap()
    }
}

#[async_trait]
impl BlendApi for FakeBlendApi {
    async fn list_blends(&self) -> Result<Vec<BlendSummary>, ApiError> {
        *self.blend_fetches.lock().unwrap() += 1;
        let mut rows: Vec<BlendSummary> = self
            .blends
            .lock()
            .unwrap()
            .values()
            .filter_map(|record| {
                Some(BlendSummary {
                    id: record.id?,
                    name: record.name.clone().unwrap_or_default(),
                    stock_kg: None,
                    is_active: true,
                })
            })
            .collect();
        rows.sort_by_key(|row| row.id);
        Ok(rows)
    }

    async fn get_blend(&self, id: i64) -> Result<BlendRecord, ApiError> {
        self.blends
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(ApiError::Status {
                status: 404,
                body: "not found".to_string(),
            })
    }

    async fn create_blend(&self, payload: &BlendPayload) -> Result<Option<BlendRecord>, ApiError> {
        self.calls.lock().unwrap().push(Call::Create(payload.clone()));
        if let Some(err) = &self.fail_writes {
            return Err(err.clone());
        }
        let mut blends = self.blends.lock().unwrap();
        let id = blends.keys().max().copied().unwrap_or(0) + 1;
        let record = BlendRecord {
            id: Some(id),
            name: payload
                .fields
                .get("name")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            recipe: payload.recipe.clone(),
            extra: Default::default(),
        };
        blends.insert(id, record.clone());
        Ok(Some(record))
    }

    async fn update_blend(&self, id: i64, payload: &BlendPayload) -> Result<Option<BlendRecord>, ApiError> {
        self.calls.lock().unwrap().push(Call::Update(id, payload.clone()));
        if let Some(err) = &self.fail_writes {
            return Err(err.clone());
        }
        let mut blends = self.blends.lock().unwrap();
        let record = blends.get_mut(&id).ok_or(ApiError::Status {
            status: 404,
            body: "not found".to_string(),
        })?;
        record.recipe = payload.recipe.clone();
        Ok(None)
    }

    async fn list_beans(&self) -> Result<Vec<BeanSummary>, ApiError> {
        *self.bean_fetches.lock().unwrap() += 1;
        Ok(self.beans.clone())
    }
}

pub fn bean(id: i64, name: &str, origin: &str) -> BeanSummary {
    BeanSummary {
        id,
        name: name.to_string(),
        origin: Some(origin.to_string()),
        roast_level: None,
        stock_kg: Some(10.0),
        is_active: true,
    }
}

/// New editor filled with `(ingredient, percentage)` drafts
pub fn editor_with(lines: &[(&str, &str)]) -> (RecipeEditor, Arc<MemoryNotifier>) {
    let notifier = Arc::new(MemoryNotifier::new());
    let mut editor = RecipeEditor::new(notifier.clone());
    for (i, (ingredient, percentage)) in lines.iter().enumerate() {
        if i > 0 {
            editor.add_line().unwrap();
        }
        editor.update_line(i, LineField::Ingredient, ingredient).unwrap();
        editor.update_line(i, LineField::Percentage, percentage).unwrap();
    }
    (editor, notifier)
}
