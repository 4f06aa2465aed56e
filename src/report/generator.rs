//! Markdown and JSON rendering of assessments.
//!
//! Scores shown for a draft are recomputed from its indicator values; the
//! cached scores of a saved record are only used by the listing table.

use crate::analysis::{category_progress, category_score, total_score};
use crate::error::ScoringResult;
use crate::listing::ListingStats;
use crate::models::{Assessment, Category, Grade, Indicator};
use anyhow::Result;

/// Width of the text score bar.
const BAR_WIDTH: usize = 20;

/// Share of a full score, in percent, for the score bar.
pub fn score_bar_percent(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}

fn score_bar(score: f64) -> String {
    let filled = ((score_bar_percent(score) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

/// Generate the summary view of an assessment.
pub fn generate_markdown_summary(
    assessment: &Assessment,
    include_indicators: bool,
) -> ScoringResult<String> {
    let mut output = String::new();

    let title: &str = if assessment.name.is_empty() {
        "Untitled community"
    } else {
        &assessment.name
    };
    output.push_str(&format!("# {}\n\n", title));

    output.push_str(&generate_metadata_section(assessment));

    let total = total_score(assessment)?;
    let grade = Grade::from_score(total);
    output.push_str("## Total Score\n\n");
    output.push_str(&format!(
        "**{:.1}** / 100 {} {}\n\n",
        total,
        grade.emoji(),
        grade
    ));

    output.push_str(&generate_category_table(&assessment.categories)?);

    if include_indicators {
        for category in &assessment.categories {
            output.push_str(&generate_category_section(category)?);
        }
    }

    Ok(output)
}

/// Generate the metadata section.
fn generate_metadata_section(assessment: &Assessment) -> String {
    let mut section = String::new();
    let location = &assessment.location;

    section.push_str("## Details\n\n");
    if assessment.is_saved() {
        section.push_str(&format!("- **ID:** `{}`\n", assessment.id));
    } else {
        section.push_str("- **Status:** draft\n");
    }
    section.push_str(&format!(
        "- **Location:** {} {} {}\n",
        location.province, location.city, location.district
    ));
    if let Some(ref address) = location.address {
        if !address.is_empty() {
            section.push_str(&format!("- **Address:** {}\n", address));
        }
    }
    if let Some([lng, lat]) = location.coordinates {
        section.push_str(&format!("- **Coordinates:** {:.6}, {:.6}\n", lng, lat));
    }
    section.push_str(&format!("- **Assessment Date:** {}\n", assessment.assessment_date));
    if let Some(ref assessor) = assessment.assessor {
        if !assessor.is_empty() {
            section.push_str(&format!("- **Assessor:** {}\n", assessor));
        }
    }
    if let Some(ref notes) = assessment.notes {
        if !notes.is_empty() {
            section.push_str(&format!("- **Notes:** {}\n", notes));
        }
    }
    section.push('\n');

    section
}

/// Generate the per-category score table.
fn generate_category_table(categories: &[Category]) -> ScoringResult<String> {
    let mut section = String::new();

    section.push_str("## Categories\n\n");
    section.push_str("| Category | Weight | Score | Filled | |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---|\n");

    for category in categories {
        let score = category_score(category)?;
        section.push_str(&format!(
            "| {} - {} | {:.3} | {:.1} | {} | `{}` |\n",
            category.code,
            category.name,
            category.weight,
            score,
            category_progress(category),
            score_bar(score)
        ));
    }
    section.push('\n');

    Ok(section)
}

/// Generate the view of a single category with its indicators.
pub fn generate_category_section(category: &Category) -> ScoringResult<String> {
    let mut section = String::new();

    section.push_str(&format!("### {} - {}\n\n", category.code, category.name));
    section.push_str("| Code | Indicator | Value | Unit |\n");
    section.push_str("|:---|:---|:---:|:---:|\n");

    for indicator in &category.indicators {
        section.push_str(&generate_indicator_row(indicator));
    }

    section.push_str(&format!(
        "\n*{} score: {:.1} ({} indicators filled)*\n\n",
        category.name,
        category_score(category)?,
        category_progress(category)
    ));

    Ok(section)
}

fn generate_indicator_row(indicator: &Indicator) -> String {
    let value = indicator
        .value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "—".to_string());

    format!(
        "| {} | {} | {} | {} |\n",
        indicator.code,
        indicator.name,
        value,
        indicator.unit.as_deref().unwrap_or("")
    )
}

/// Generate the listing table with aggregate figures.
pub fn generate_listing_markdown(assessments: &[&Assessment], stats: &ListingStats) -> String {
    let mut output = String::new();

    output.push_str("# Assessments\n\n");
    output.push_str(&format!(
        "- **Total:** {} | **Average:** {:.1} | **Excellent:** {} | **Needs improvement:** {}\n\n",
        stats.count, stats.average_score, stats.excellent, stats.needs_improvement
    ));

    if assessments.is_empty() {
        output.push_str("No assessments found.\n");
        return output;
    }

    output.push_str("| Name | Location | Date | Score | Grade | ID |\n");
    output.push_str("|:---|:---|:---:|:---:|:---|:---|\n");

    for assessment in assessments {
        let score = assessment.total_score.unwrap_or(0.0);
        let grade = Grade::from_score(score);
        output.push_str(&format!(
            "| {} | {} {} | {} | {:.1} | {} {} | `{}` |\n",
            assessment.name,
            assessment.location.city,
            assessment.location.district,
            assessment.assessment_date,
            score,
            grade.emoji(),
            grade,
            assessment.id
        ));
    }

    output
}

/// Generate a JSON document for an assessment.
pub fn generate_json_report(assessment: &Assessment) -> Result<String> {
    serde_json::to_string_pretty(assessment).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{finalize, new_draft, set_indicator_value};
    use crate::models::Location;

    fn create_test_assessment() -> Assessment {
        let location = Location {
            province: "浙江省".to_string(),
            city: "杭州市".to_string(),
            district: "西湖区".to_string(),
            address: Some("文三路1号".to_string()),
            coordinates: Some([120.1, 30.2]),
        };
        let draft = new_draft("Sunny Court", location, "2024-06-01");
        let draft = set_indicator_value(&draft, "A", "A11", Some(80.0)).unwrap();
        set_indicator_value(&draft, "A", "A12", Some(90.0)).unwrap()
    }

    #[test]
    fn test_score_bar_percent_clamps() {
        assert_eq!(score_bar_percent(85.0), 85.0);
        assert_eq!(score_bar_percent(130.0), 100.0);
        assert_eq!(score_bar_percent(-5.0), 0.0);
    }

    #[test]
    fn test_score_bar() {
        assert_eq!(score_bar(0.0), "░".repeat(BAR_WIDTH));
        assert_eq!(score_bar(100.0), "█".repeat(BAR_WIDTH));
        assert_eq!(score_bar(50.0).chars().filter(|c| *c == '█').count(), 10);
    }

    #[test]
    fn test_generate_markdown_summary() {
        let markdown = generate_markdown_summary(&create_test_assessment(), true).unwrap();

        assert!(markdown.contains("# Sunny Court"));
        assert!(markdown.contains("**Status:** draft"));
        assert!(markdown.contains("**10.6** / 100"));
        assert!(markdown.contains("| A - 公共空间环境安全性 | 0.125 | 85.0 | 2 / 7 |"));
        assert!(markdown.contains("| A11 | 老年友好休闲空间设计 | 80 | 分 |"));
        assert!(markdown.contains("| A13 | 老年人专用停车位比例 | — | % |"));
        assert!(markdown.contains("120.100000, 30.200000"));
    }

    #[test]
    fn test_summary_without_indicators() {
        let markdown = generate_markdown_summary(&create_test_assessment(), false).unwrap();
        assert!(markdown.contains("## Categories"));
        assert!(!markdown.contains("| A11 |"));
    }

    #[test]
    fn test_generate_category_section() {
        let assessment = create_test_assessment();
        let section = generate_category_section(assessment.category("A").unwrap()).unwrap();

        assert!(section.starts_with("### A - 公共空间环境安全性"));
        assert!(section.contains("score: 85.0 (2 / 7 indicators filled)"));
    }

    #[test]
    fn test_generate_listing_markdown() {
        let saved = finalize(&create_test_assessment()).unwrap();
        let stats = ListingStats {
            count: 1,
            average_score: 10.6,
            excellent: 0,
            needs_improvement: 1,
        };

        let markdown = generate_listing_markdown(&[&saved], &stats);
        assert!(markdown.contains("Sunny Court"));
        assert!(markdown.contains("| 10.6 |"));
        assert!(markdown.contains(&saved.id));

        let empty = generate_listing_markdown(&[], &ListingStats::default());
        assert!(empty.contains("No assessments found."));
    }

    #[test]
    fn test_generate_json_report() {
        let json = generate_json_report(&create_test_assessment()).unwrap();

        assert!(json.contains("\"assessmentDate\""));
        assert!(json.contains("\"value\": null"));
        assert!(json.contains("\"categories\""));
    }
}
