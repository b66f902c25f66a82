//! Integration tests for random forest feature ranking

use polars::prelude::*;
use tabprep::pipeline::{
    feature_importance, FeatureRanker, ForestConfig, Table, Task, MIN_FIT_ROWS,
};
use tabprep::PrepError;

#[path = "common/mod.rs"]
mod common;

use common::create_importance_table;

fn small_config() -> ForestConfig {
    ForestConfig::default().n_trees(25).seed(7)
}

#[test]
fn test_informative_feature_ranks_first() {
    let table = create_importance_table(200, 1);
    let ranking = FeatureRanker::with_config(&table, small_config())
        .feature_importance("target")
        .unwrap();

    assert_eq!(ranking.target, "target");
    assert_eq!(ranking.task, Task::Regression);
    assert_eq!(ranking.rows_used, 200);
    assert_eq!(ranking.rows_excluded, 0);
    assert_eq!(ranking.importances.len(), 3);
    assert_eq!(ranking.importances[0].feature, "signal");
    assert!(ranking.importances[0].score > 0.5);

    // Scores are non-negative and sorted descending
    assert!(ranking.importances.iter().all(|f| f.score >= 0.0));
    assert!(ranking
        .importances
        .windows(2)
        .all(|w| w[0].score >= w[1].score));
}

#[test]
fn test_top_three_is_stable_across_calls() {
    let table = create_importance_table(120, 3);
    let ranker = FeatureRanker::with_config(&table, small_config());

    let first = ranker.feature_importance("target").unwrap();
    let second = ranker.feature_importance("target").unwrap();

    let names = |r: &tabprep::pipeline::FeatureRanking| {
        r.top(3).iter().map(|f| f.feature.clone()).collect::<Vec<_>>()
    };
    assert_eq!(names(&first), names(&second));
    assert_eq!(first, second);
}

#[test]
fn test_text_target_is_classification() {
    let df = df! {
        "size" => [1.0f64, 1.5, 2.0, 8.0, 8.5, 9.0, 1.2, 8.8],
        "colour" => ["red", "blue", "red", "blue", "red", "blue", "red", "blue"],
        "label" => ["small", "small", "small", "large", "large", "large", "small", "large"],
    }
    .unwrap();
    let table = Table::new(df).unwrap();

    let ranking = FeatureRanker::with_config(&table, small_config().max_features(2))
        .feature_importance("label")
        .unwrap();
    assert_eq!(ranking.task, Task::Classification);
    assert_eq!(ranking.importances[0].feature, "size");
}

#[test]
fn test_rows_with_missing_values_are_excluded() {
    let df = df! {
        "a" => [Some(1.0f64), None, Some(3.0), Some(4.0), Some(5.0), Some(6.0)],
        "b" => [Some("x"), Some("y"), None, Some("x"), Some("y"), Some("x")],
        "y" => [Some(1.0f64), Some(2.0), Some(3.0), None, Some(5.0), Some(6.0)],
    }
    .unwrap();
    let table = Table::new(df).unwrap();

    let ranking = FeatureRanker::with_config(&table, small_config())
        .feature_importance("y")
        .unwrap();
    assert_eq!(ranking.rows_used, 3);
    assert_eq!(ranking.rows_excluded, 3);
}

#[test]
fn test_too_few_complete_rows() {
    let df = df! {
        "a" => [Some(1.0f64), None, None],
        "y" => [Some(1.0f64), Some(2.0), None],
    }
    .unwrap();
    let table = Table::new(df).unwrap();

    let err = feature_importance(&table, "y").unwrap_err();
    assert!(matches!(
        err,
        PrepError::InsufficientData { required, actual: 1 } if required == MIN_FIT_ROWS
    ));
}

#[test]
fn test_unknown_target_column() {
    let table = create_importance_table(20, 5);
    let err = feature_importance(&table, "missing_target").unwrap_err();
    assert!(matches!(err, PrepError::ColumnNotFound { ref name } if name == "missing_target"));
}

#[test]
fn test_ranking_does_not_modify_table() {
    let table = create_importance_table(40, 9);
    let before = table.clone();
    FeatureRanker::with_config(&table, small_config())
        .feature_importance("target")
        .unwrap();
    assert_eq!(table, before);
}

#[test]
fn test_non_finite_feature_cells_are_excluded() {
    let df = df! {
        "a" => [1.0f64, f64::NAN, 3.0, 4.0, f64::INFINITY, 6.0, 7.0, 8.0],
        "y" => [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
    }
    .unwrap();
    let table = Table::new(df).unwrap();

    let ranking = FeatureRanker::with_config(&table, small_config())
        .feature_importance("y")
        .unwrap();
    assert_eq!(ranking.rows_used, 6);
    assert_eq!(ranking.rows_excluded, 2);
    assert!(ranking.importances.iter().all(|f| f.score.is_finite()));
}
