//! Client-side filters over API listings.

use serde_json::Value;

/// Keep sizes whose `description` contains "gpu", ignoring case.
///
/// Sizes without a string description never match. Order is preserved.
#[must_use]
pub fn gpu_sizes(sizes: Vec<Value>) -> Vec<Value> {
    sizes
        .into_iter()
        .filter(|size| {
            size.get("description")
                .and_then(Value::as_str)
                .is_some_and(|d| d.to_lowercase().contains("gpu"))
        })
        .collect()
}

/// Keep images whose `type` is exactly `"snapshot"`. Order is preserved.
#[must_use]
pub fn snapshots_from_images(images: Vec<Value>) -> Vec<Value> {
    images
        .into_iter()
        .filter(|image| image.get("type").and_then(Value::as_str) == Some("snapshot"))
        .collect()
}
