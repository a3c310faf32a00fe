//! Staleness gate over a persisted repository map.
//!
//! Compares the fingerprint recorded with a previous generation against the
//! repository's current fingerprint to decide whether re-extraction is
//! needed at all. The gate always fails open: any doubt (missing metadata,
//! unavailable fingerprint) means "regenerate".

use crate::model::RepoMetadata;

/// Whether the persisted model is still current for the repository.
///
/// Missing persisted metadata (first run, or output predating fingerprint
/// tracking) is treated as not current. A missing current fingerprint means
/// retrieval failed; that is logged as a warning and the gate opens toward
/// regeneration rather than silently skipping a needed rebuild.
pub fn is_up_to_date(persisted: Option<&RepoMetadata>, current: Option<&str>) -> bool {
    let Some(metadata) = persisted else {
        tracing::debug!("No persisted metadata; regeneration required");
        return false;
    };

    let Some(recorded) = metadata.fingerprint.as_deref() else {
        tracing::debug!("Persisted map has no fingerprint; regeneration required");
        return false;
    };

    let Some(current) = current else {
        tracing::warn!("Current fingerprint unavailable; regenerating to be safe");
        return false;
    };

    if recorded == current {
        tracing::info!("Repository unchanged at {}; reusing persisted map", current);
        true
    } else {
        tracing::info!(
            "Fingerprint changed {} -> {}; regeneration required",
            recorded,
            current
        );
        false
    }
}
