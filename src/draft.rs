//! The draft working file.
//!
//! A draft lives in a single JSON file owned by the editing session. It is
//! never written to the assessment store; saving produces a separate
//! finalized record.

use crate::catalog::validate_categories;
use crate::models::Assessment;
use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::debug;

/// Read and check the draft at `path`.
pub fn load_draft(path: &Path) -> Result<Assessment> {
    if !path.exists() {
        bail!(
            "No draft at {}. Start one with `community-assess new`",
            path.display()
        );
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read draft: {}", path.display()))?;

    let draft: Assessment = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse draft: {}", path.display()))?;

    validate_categories(&draft.categories)
        .with_context(|| format!("Draft {} has an invalid rubric", path.display()))?;

    debug!("Loaded draft {} from {}", draft.name, path.display());
    Ok(draft)
}

/// Write the draft to `path`, replacing any previous content.
pub fn write_draft(path: &Path, draft: &Assessment) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let json = serde_json::to_string_pretty(draft)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write draft: {}", path.display()))?;

    debug!("Wrote draft to {}", path.display());
    Ok(())
}
