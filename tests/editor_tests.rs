//! # Recipe Editor Tests
//!
//! End-to-end editor behavior against an in-memory API: submission gating,
//! ratio conversion, hydration round trips and cache invalidation.

mod common;

use anyhow::Result;
use std::sync::Arc;

use common::{editor_with, Call, FakeBlendApi};
use roastery::api_client::BlendApi;
use roastery::editor::{EditorMode, EditorState, RecipeEditor};
use roastery::errors::{ApiError, RecipeError};
use roastery::list_view::ListCache;
use roastery::notify::{MemoryNotifier, NoticeKind};
use roastery::recipe_model::{BlendRecord, BlendSummary, LineField, RecipeComponent};

fn house() -> BlendRecord {
    BlendRecord {
        id: Some(1),
        name: Some("House".to_string()),
        recipe: vec![RecipeComponent::new(1, 1.0)],
        ..Default::default()
    }
}

fn only_create(api: &FakeBlendApi) -> Vec<RecipeComponent> {
    match api.calls().as_slice() {
        [Call::Create(payload)] => payload.recipe.clone(),
        other => panic!("Expected exactly one create call, got {other:?}"),
    }
}

#[tokio::test]
async fn test_sixty_forty_submits_ratios() -> Result<()> {
    let api = FakeBlendApi::new();
    let (mut editor, notifier) = editor_with(&[("1", "60"), ("2", "40")]);

    editor.submit(&api).await?;

    assert_eq!(
        only_create(&api),
        vec![RecipeComponent::new(1, 0.6), RecipeComponent::new(2, 0.4)]
    );
    assert_eq!(editor.state(), EditorState::Submitted);
    assert_eq!(notifier.kinds(), vec![NoticeKind::Saved]);
    Ok(())
}

#[tokio::test]
async fn test_sum_over_hundred_is_rejected_without_api_call() -> Result<()> {
    let api = FakeBlendApi::new();
    let (mut editor, notifier) = editor_with(&[("1", "70"), ("2", "40")]);

    let result = editor.submit(&api).await;

    assert_eq!(result, Err(RecipeError::RatioMismatch { total: 110.0 }));
    assert!(api.calls().is_empty());
    assert_eq!(editor.state(), EditorState::Editing);

    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::RatioMismatch);
    assert!(notices[0].message.contains("110"));
    Ok(())
}

#[tokio::test]
async fn test_single_empty_line_is_empty_recipe() -> Result<()> {
    let api = FakeBlendApi::new();
    let (mut editor, notifier) = editor_with(&[("", "")]);

    assert_eq!(editor.submit(&api).await, Err(RecipeError::EmptyRecipe));

    // a full hundred percent without a bean is still empty
    editor.update_line(0, LineField::Percentage, "100")?;
    assert_eq!(editor.submit(&api).await, Err(RecipeError::EmptyRecipe));

    assert!(api.calls().is_empty());
    assert_eq!(
        notifier.kinds(),
        vec![NoticeKind::EmptyRecipe, NoticeKind::EmptyRecipe]
    );
    Ok(())
}

#[tokio::test]
async fn test_blank_lines_with_a_partial_total_report_mismatch() -> Result<()> {
    let api = FakeBlendApi::new();
    let (mut editor, _) = editor_with(&[("", ""), ("", "30")]);

    assert_eq!(
        editor.submit(&api).await,
        Err(RecipeError::RatioMismatch { total: 30.0 })
    );
    assert!(api.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_percentages_outside_domain_never_reach_api() -> Result<()> {
    let cases: &[(&[(&str, &str)], usize, f64)] = &[
        (&[("1", "150"), ("2", "-50")], 0, 150.0),
        (&[("1", "100.05"), ("2", "-0.05")], 0, 100.05),
        (&[("1", "60"), ("2", "-20"), ("3", "60")], 1, -20.0),
    ];

    for (lines, index, value) in cases {
        let api = FakeBlendApi::new();
        let (mut editor, notifier) = editor_with(lines);

        assert_eq!(
            editor.submit(&api).await,
            Err(RecipeError::PercentageOutOfRange {
                index: *index,
                value: *value
            })
        );
        assert!(api.calls().is_empty());
        assert_eq!(editor.state(), EditorState::Editing);
        assert_eq!(notifier.kinds(), vec![NoticeKind::PercentageOutOfRange]);
    }
    Ok(())
}

#[tokio::test]
async fn test_share_on_line_without_bean_blocks_submit() -> Result<()> {
    let api = FakeBlendApi::new();
    let (mut editor, notifier) = editor_with(&[("1", "60"), ("", "40")]);

    assert_eq!(
        editor.submit(&api).await,
        Err(RecipeError::RatioMismatch { total: 60.0 })
    );
    assert!(api.calls().is_empty());
    assert!(notifier.notices()[0].message.contains("60"));

    editor.update_line(1, LineField::Ingredient, "2")?;
    let receipt = editor.submit(&api).await?;
    assert_eq!(receipt.component_count, 2);
    assert_eq!(only_create(&api).len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_totals_within_tolerance_yield_unit_ratio_sum() -> Result<()> {
    let cases: &[&[(&str, &str)]] = &[
        &[("1", "100")],
        &[("1", "33.3"), ("2", "33.3"), ("3", "33.4")],
        &[("1", "33.33"), ("2", "33.33"), ("3", "33.33")],
        &[("1", "50.04"), ("2", "50.04")],
        &[("1", "25"), ("2", "25"), ("3", "25"), ("4", "25"), ("", "")],
        &[("1", "12.5"), ("2", "87.5"), ("3", "junk")],
    ];

    for lines in cases {
        let api = FakeBlendApi::new();
        let (mut editor, _) = editor_with(lines);
        editor.submit(&api).await?;

        let sum: f64 = only_create(&api).iter().map(|c| c.ratio).sum();
        assert!((sum - 1.0).abs() <= 0.001, "ratio sum {sum} for {lines:?}");
    }
    Ok(())
}

#[tokio::test]
async fn test_totals_outside_tolerance_never_call_api() -> Result<()> {
    let cases: &[(&[(&str, &str)], f64)] = &[
        (&[("1", "99.8")], 99.8),
        (&[("1", "100.2")], 100.2),
        (&[("1", "50"), ("2", "49")], 99.0),
        (&[("1", "60"), ("2", "abc")], 60.0),
    ];

    for (lines, expected_total) in cases {
        let api = FakeBlendApi::new();
        let (mut editor, _) = editor_with(lines);
        match editor.submit(&api).await {
            Err(RecipeError::RatioMismatch { total }) => {
                assert!((total - expected_total).abs() < 1e-9, "total {total} for {lines:?}");
            }
            other => panic!("Expected ratio mismatch for {lines:?}, got {other:?}"),
        }
        assert!(api.calls().is_empty());
    }
    Ok(())
}

#[tokio::test]
async fn test_hydrate_then_submit_round_trips() -> Result<()> {
    let record = BlendRecord {
        id: Some(7),
        name: Some("House".to_string()),
        recipe: vec![
            RecipeComponent::new(1, 0.4),
            RecipeComponent::new(2, 0.35),
            RecipeComponent::new(3, 0.25),
        ],
        ..Default::default()
    };
    let api = FakeBlendApi::new().with_blend(record.clone());
    let notifier = Arc::new(MemoryNotifier::new());
    let mut editor = RecipeEditor::from_record(&record, notifier);

    assert_eq!(editor.mode(), EditorMode::Update { blend_id: 7 });
    assert_eq!(editor.lines()[0].percentage, "40");
    assert_eq!(editor.lines()[1].percentage, "35");

    editor.submit(&api).await?;

    match api.calls().as_slice() {
        [Call::Update(7, payload)] => {
            assert_eq!(payload.recipe.len(), 3);
            for (sent, stored) in payload.recipe.iter().zip(&record.recipe) {
                assert_eq!(sent.ingredient_ref, stored.ingredient_ref);
                assert!((sent.ratio - stored.ratio).abs() < 1e-12);
            }
            assert_eq!(payload.fields.get("name").and_then(|v| v.as_str()), Some("House"));
        }
        other => panic!("Expected one update call, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_transport_error_is_reported_once_without_retry() -> Result<()> {
    let api = FakeBlendApi::new().failing_with(ApiError::Status {
        status: 500,
        body: "stock ledger locked".to_string(),
    });
    let (mut editor, notifier) = editor_with(&[("1", "100")]);

    let result = editor.submit(&api).await;

    assert_eq!(
        result,
        Err(RecipeError::SubmitTransport(
            "Server returned status 500: stock ledger locked".to_string()
        ))
    );
    assert_eq!(api.calls().len(), 1);
    assert_eq!(editor.state(), EditorState::Editing);

    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::SubmitTransportError);
    assert!(notices[0].message.contains("stock ledger locked"));

    // the user may try again
    assert!(editor.submit(&api).await.is_err());
    assert_eq!(api.calls().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_successful_submit_invalidates_list_cache() -> Result<()> {
    let api = FakeBlendApi::new().with_blend(house());
    let cache: Arc<ListCache<BlendSummary>> = Arc::new(ListCache::new());
    cache.get_or_refresh(|| api.list_blends()).await?;
    assert!(!cache.is_stale());

    let (editor, _) = editor_with(&[("1", "100")]);
    let mut editor = editor.with_list_refresh(cache.clone());

    editor.submit(&api).await?;

    assert!(cache.is_stale());
    let refreshed = cache.get_or_refresh(|| api.list_blends()).await?;
    assert_eq!(refreshed.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_failed_submit_keeps_list_cache() -> Result<()> {
    let api = FakeBlendApi::new()
        .with_blend(house())
        .failing_with(ApiError::Transport("timed out".to_string()));
    let cache: Arc<ListCache<BlendSummary>> = Arc::new(ListCache::new());
    cache.get_or_refresh(|| api.list_blends()).await?;

    let (editor, _) = editor_with(&[("1", "100")]);
    let mut editor = editor.with_list_refresh(cache.clone());

    assert!(editor.submit(&api).await.is_err());
    assert!(!cache.is_stale());
    Ok(())
}

#[test]
fn test_remove_only_line_keeps_count_at_one() {
    let (mut editor, notifier) = editor_with(&[("1", "100")]);

    for _ in 0..3 {
        assert_eq!(editor.remove_line(0), Err(RecipeError::MinimumLineGuard));
    }

    assert_eq!(editor.line_count(), 1);
    assert_eq!(notifier.kinds(), vec![NoticeKind::MinimumLineGuard; 3]);
}

#[test]
fn test_add_line_grows_by_exactly_one() {
    let (mut editor, _) = editor_with(&[("1", "60"), ("2", "40")]);
    for expected in 3..=6 {
        let before = editor.lines().to_vec();
        editor.add_line().unwrap();
        assert_eq!(editor.line_count(), expected);
        assert_eq!(&editor.lines()[..expected - 1], before.as_slice());
    }
}

#[test]
fn test_french_notices() {
    let notifier = Arc::new(MemoryNotifier::new());
    let mut editor = RecipeEditor::new(notifier.clone()).with_language("fr");

    let _ = editor.remove_line(0);

    assert_eq!(notifier.notices()[0].message, "Au moins un ingrédient est requis");
}
