//! Browsing saved assessments.
//!
//! A [`Listing`] caches every parsed record from the store. Deletions go to
//! the store first and are mirrored in the cache only when they succeed.

use crate::error::StoreResult;
use crate::models::{Assessment, Grade};
use crate::store::{AssessmentRepository, KeyValueStore};
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;

/// Sort order for the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortBy {
    /// Newest assessment date first
    #[default]
    Date,
    /// Highest total score first
    Score,
    /// Name, ascending
    Name,
}

/// Aggregate figures over all cached records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListingStats {
    pub count: usize,
    pub average_score: f64,
    /// Records graded excellent (total >= 80).
    pub excellent: usize,
    /// Records below 60.
    pub needs_improvement: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Listing {
    assessments: Vec<Assessment>,
}

impl Listing {
    /// Load every parsable record from the repository.
    pub fn load<S: KeyValueStore>(repo: &AssessmentRepository<S>) -> StoreResult<Self> {
        Ok(Self::from_assessments(repo.load_all()?))
    }

    pub fn from_assessments(assessments: Vec<Assessment>) -> Self {
        Self { assessments }
    }

    pub fn len(&self) -> usize {
        self.assessments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assessments.is_empty()
    }

    /// Filter by case-insensitive substring over name, city and district, then sort.
    pub fn query(&self, search: &str, sort: SortBy) -> Vec<&Assessment> {
        let needle = search.to_lowercase();

        let mut matches: Vec<&Assessment> = self
            .assessments
            .iter()
            .filter(|a| matches_search(a, &needle))
            .collect();

        matches.sort_by(|a, b| compare(a, b, sort));
        matches
    }

    /// Delete a record from the store and the cache.
    pub fn delete<S: KeyValueStore>(
        &mut self,
        repo: &mut AssessmentRepository<S>,
        id: &str,
    ) -> StoreResult<bool> {
        let removed = repo.delete(id)?;
        self.assessments.retain(|a| a.id != id);
        Ok(removed)
    }

    pub fn stats(&self) -> ListingStats {
        let count = self.assessments.len();
        if count == 0 {
            return ListingStats::default();
        }

        let scores: Vec<f64> = self.assessments.iter().map(score_of).collect();

        ListingStats {
            count,
            average_score: scores.iter().sum::<f64>() / count as f64,
            excellent: scores
                .iter()
                .filter(|s| Grade::from_score(**s) == Grade::Excellent)
                .count(),
            needs_improvement: scores.iter().filter(|s| **s < 60.0).count(),
        }
    }
}

fn score_of(assessment: &Assessment) -> f64 {
    assessment.total_score.unwrap_or(0.0)
}

fn matches_search(assessment: &Assessment, needle: &str) -> bool {
    needle.is_empty()
        || assessment.name.to_lowercase().contains(needle)
        || assessment.location.city.to_lowercase().contains(needle)
        || assessment.location.district.to_lowercase().contains(needle)
}

fn compare(a: &Assessment, b: &Assessment, sort: SortBy) -> Ordering {
    match sort {
        SortBy::Date => parse_date(&b.assessment_date).cmp(&parse_date(&a.assessment_date)),
        SortBy::Score => score_of(b).total_cmp(&score_of(a)),
        SortBy::Name => compare_names(&a.name, &b.name),
    }
}

/// Case-insensitive name order. Han characters compare by code point, which
/// differs from pinyin collation in a browser's `localeCompare`.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Unparsable dates sort last.
fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::new_draft;
    use crate::models::Location;
    use crate::store::MemoryStore;

    fn record(id: &str, name: &str, city: &str, date: &str, score: Option<f64>) -> Assessment {
        let location = Location {
            province: "Zhejiang".to_string(),
            city: city.to_string(),
            district: format!("{} District", name),
            ..Location::default()
        };
        Assessment {
            id: id.to_string(),
            total_score: score,
            ..new_draft(name, location, date)
        }
    }

    fn sample_listing() -> Listing {
        Listing::from_assessments(vec![
            record("1", "Maple Court", "Hangzhou", "2024-03-01", Some(72.5)),
            record("2", "Birch Garden", "Ningbo", "2024-05-20", Some(85.0)),
            record("3", "Cedar Village", "Hangzhou", "2023-12-11", Some(41.0)),
            record("4", "Aspen Home", "Wenzhou", "not a date", None),
        ])
    }

    fn ids(results: &[&Assessment]) -> Vec<String> {
        results.iter().map(|a| a.id.clone()).collect()
    }

    #[test]
    fn test_sort_by_date_newest_first() {
        let listing = sample_listing();
        assert_eq!(ids(&listing.query("", SortBy::Date)), vec!["2", "1", "3", "4"]);
    }

    #[test]
    fn test_sort_by_score_highest_first() {
        let listing = sample_listing();
        assert_eq!(ids(&listing.query("", SortBy::Score)), vec!["2", "1", "3", "4"]);
    }

    #[test]
    fn test_sort_by_name() {
        let listing = sample_listing();
        assert_eq!(ids(&listing.query("", SortBy::Name)), vec!["4", "2", "3", "1"]);
    }

    #[test]
    fn test_sort_by_name_ignores_case() {
        let listing = Listing::from_assessments(vec![
            record("1", "oak Row", "Hangzhou", "2024-01-01", None),
            record("2", "Pine Row", "Hangzhou", "2024-01-01", None),
            record("3", "Oak Row", "Hangzhou", "2024-01-01", None),
            record("4", "阳光花园", "Hangzhou", "2024-01-01", None),
            record("5", "和平小区", "Hangzhou", "2024-01-01", None),
        ]);

        // Han names follow Latin ones and order by code point.
        assert_eq!(
            ids(&listing.query("", SortBy::Name)),
            vec!["3", "1", "2", "5", "4"]
        );
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let listing = sample_listing();

        assert_eq!(ids(&listing.query("HANGZHOU", SortBy::Name)), vec!["3", "1"]);
        assert_eq!(ids(&listing.query("garden", SortBy::Date)), vec!["2"]);
        assert_eq!(ids(&listing.query("cedar village dist", SortBy::Date)), vec!["3"]);
        assert!(listing.query("shanghai", SortBy::Date).is_empty());
    }

    #[test]
    fn test_stats() {
        let stats = sample_listing().stats();

        assert_eq!(stats.count, 4);
        assert_eq!(stats.average_score, (72.5 + 85.0 + 41.0) / 4.0);
        assert_eq!(stats.excellent, 1);
        assert_eq!(stats.needs_improvement, 2);
    }

    #[test]
    fn test_stats_empty() {
        assert_eq!(Listing::default().stats(), ListingStats::default());
    }

    #[test]
    fn test_delete_only_record() {
        let mut repo = AssessmentRepository::new(MemoryStore::new());
        let only = record("only", "Solo", "Hangzhou", "2024-01-01", Some(50.0));
        repo.save(&only).unwrap();

        let mut listing = Listing::load(&repo).unwrap();
        assert_eq!(listing.len(), 1);

        assert!(listing.delete(&mut repo, "only").unwrap());
        assert!(listing.is_empty());
        assert!(listing.query("", SortBy::Date).is_empty());
        assert!(Listing::load(&repo).unwrap().is_empty());
    }
}
