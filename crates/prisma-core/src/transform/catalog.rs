//! Built-in catalogs and catalog files.
//!
//! A catalog is an ordered list of [`TransformSpec`]; the order is the grid's
//! display order. Files are JSON arrays:
//!
//! ```json
//! [
//!   { "kind": "gaussian_blur", "radius": 6.0 },
//!   { "kind": "sepia", "label": "Sepia", "intensity": 0.7 }
//! ]
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use super::{TransformKind, TransformSpec};

/// Strength shared by the photo-effects catalog.
const EFFECT_INTENSITY: f32 = 0.7;

/// Three identical Gaussian blurs. Placeholder catalog for the preview screen.
pub fn reference_blurs() -> Vec<TransformSpec> {
    (0..3)
        .map(|_| TransformSpec::new(TransformKind::GaussianBlur).with_intensity(1.0))
        .collect()
}

/// The full look catalog, one cell per effect.
pub fn photo_effects() -> Vec<TransformSpec> {
    vec![
        TransformSpec::new(TransformKind::GaussianBlur).with_label("Blur"),
        TransformSpec::new(TransformKind::Instant).with_label("Instant"),
        TransformSpec::new(TransformKind::Noir).with_label("Noir"),
        TransformSpec::new(TransformKind::Transfer).with_label("Transfer"),
        TransformSpec::new(TransformKind::UnsharpMask).with_label("Unsharp Mask"),
        TransformSpec::new(TransformKind::Monochrome).with_label("Monochrome"),
        TransformSpec::new(TransformKind::ColorControls)
            .with_label("Muted")
            .with_intensity(0.5),
        TransformSpec::new(TransformKind::Sepia)
            .with_label("Sepia")
            .with_intensity(EFFECT_INTENSITY),
        TransformSpec::new(TransformKind::Vignette)
            .with_label("Vignette")
            .with_intensity(EFFECT_INTENSITY * 2.0)
            .with_radius(EFFECT_INTENSITY),
    ]
}

/// Look up a built-in catalog by name.
pub fn preset(name: &str) -> Option<Vec<TransformSpec>> {
    match name {
        "blurs" => Some(reference_blurs()),
        "effects" => Some(photo_effects()),
        _ => None,
    }
}

pub fn parse_catalog(json: &str) -> Result<Vec<TransformSpec>> {
    serde_json::from_str(json).context("invalid catalog JSON")
}

/// Read a catalog file. Kinds and parameters are only checked when the
/// pipeline is configured.
pub fn load_catalog(path: &Path) -> Result<Vec<TransformSpec>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog: {}", path.display()))?;
    let specs = parse_catalog(&json).with_context(|| format!("in {}", path.display()))?;
    debug!(?path, count = specs.len(), "loaded catalog");
    Ok(specs)
}
