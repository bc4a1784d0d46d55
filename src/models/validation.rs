use thiserror::Error;

use super::criterion_option::ValueShape;
use super::modifier::{CriterionModifier, FilterMode};

/// 过滤器模型错误类型
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Criterion type '{criterion_type}' is not registered for mode {mode}")]
    UnknownCriterionType {
        mode: FilterMode,
        criterion_type: String,
    },

    #[error("Modifier {modifier} is not allowed for criterion '{criterion_type}'")]
    ModifierNotAllowed {
        criterion_type: String,
        modifier: CriterionModifier,
    },

    #[error("Criterion '{criterion_type}' expects a {expected:?} value, got {actual:?}")]
    ValueShapeMismatch {
        criterion_type: String,
        expected: ValueShape,
        actual: ValueShape,
    },

    #[error("Invalid criterion value: {0}")]
    InvalidValue(String),

    #[error("Filter mode mismatch: expected {expected}, got {actual}")]
    ModeMismatch {
        expected: FilterMode,
        actual: FilterMode,
    },

    #[error("Invalid filter JSON: {0}")]
    Json(#[from] serde_json::Error),
}
