//! Score aggregation for assessments.
//!
//! Category scores are the mean of the filled indicator values, the total
//! is the weight-scaled sum of the category scores. Both are rounded to
//! one decimal place. Unset indicators never count towards a mean, and a
//! category with nothing filled contributes zero to the total.

use crate::catalog::clone_catalog;
use crate::error::{ScoringError, ScoringResult};
use crate::models::{Assessment, Category, CategoryProgress, Location};
use tracing::debug;
use uuid::Uuid;

/// Largest accepted indicator magnitude. Scores derived from values in range
/// stay finite.
pub const MAX_INDICATOR_VALUE: f64 = 1e9;

/// Round to one decimal place, halves rounding up.
pub fn round1(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

/// Mean of the filled indicators of a category, rounded to one decimal.
///
/// Returns `0.0` when nothing is filled. A category without indicators is
/// a configuration error.
pub fn category_score(category: &Category) -> ScoringResult<f64> {
    if category.indicators.is_empty() {
        return Err(ScoringError::EmptyCategory {
            code: category.code.clone(),
        });
    }

    let (sum, count) = category
        .indicators
        .iter()
        .filter_map(|i| i.value)
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        return Ok(0.0);
    }

    Ok(round1(sum / count as f64))
}

/// Weighted total over all categories, rounded to one decimal.
pub fn total_score(assessment: &Assessment) -> ScoringResult<f64> {
    let mut total = 0.0;

    for category in &assessment.categories {
        total += category_score(category)? * category.weight;
    }

    Ok(round1(total))
}

/// Number of filled indicators in a category.
pub fn category_progress(category: &Category) -> CategoryProgress {
    CategoryProgress {
        filled: category.indicators.iter().filter(|i| i.is_filled()).count(),
        total: category.indicators.len(),
    }
}

/// Return a copy of `assessment` with one indicator value replaced.
///
/// The input is left untouched. Unknown codes are reported instead of
/// being ignored.
pub fn set_indicator_value(
    assessment: &Assessment,
    category_code: &str,
    indicator_code: &str,
    value: Option<f64>,
) -> ScoringResult<Assessment> {
    if let Some(v) = value {
        if !v.is_finite() || v.abs() > MAX_INDICATOR_VALUE {
            return Err(ScoringError::InvalidValue {
                indicator: indicator_code.to_string(),
                value: v,
                max: MAX_INDICATOR_VALUE,
            });
        }
    }

    let mut updated = assessment.clone();

    let category = updated
        .categories
        .iter_mut()
        .find(|c| c.code == category_code)
        .ok_or_else(|| ScoringError::UnknownCategory {
            code: category_code.to_string(),
        })?;

    let indicator = category
        .indicators
        .iter_mut()
        .find(|i| i.code == indicator_code)
        .ok_or_else(|| ScoringError::UnknownIndicator {
            category: category_code.to_string(),
            indicator: indicator_code.to_string(),
        })?;

    debug!(
        "{}/{}: {:?} -> {:?}",
        category_code, indicator_code, indicator.value, value
    );
    indicator.value = value;

    Ok(updated)
}

/// Produce the saved form of an assessment: fresh id, embedded scores.
pub fn finalize(assessment: &Assessment) -> ScoringResult<Assessment> {
    let mut saved = assessment.clone();

    for category in &mut saved.categories {
        category.score = Some(category_score(category)?);
    }

    saved.total_score = Some(total_score(&saved)?);
    saved.id = Uuid::new_v4().to_string();

    debug!(
        "Finalized assessment {} with total {:?}",
        saved.id, saved.total_score
    );

    Ok(saved)
}

/// Start a new draft from the catalog.
pub fn new_draft(name: &str, location: Location, assessment_date: &str) -> Assessment {
    Assessment {
        id: String::new(),
        name: name.to_string(),
        location,
        categories: clone_catalog(),
        total_score: None,
        assessment_date: assessment_date.to_string(),
        assessor: None,
        notes: None,
    }
}

/// Start a new draft from a saved snapshot.
///
/// Values carry over; the id and cached scores are cleared so the draft
/// is saved as a new record.
pub fn draft_from_saved(saved: &Assessment) -> Assessment {
    let mut draft = saved.clone();
    draft.id.clear();
    draft.total_score = None;
    for category in &mut draft.categories {
        category.score = None;
    }
    draft
}
