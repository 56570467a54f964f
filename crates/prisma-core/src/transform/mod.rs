pub mod catalog;
pub mod op;
pub mod ops;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{InstantiationError, TransformFailed};
use crate::image_buf::ImageBuf;
use crate::sync::lock;
pub use op::TransformOp;

/// Every transform the catalog can name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransformKind {
    GaussianBlur,
    Sepia,
    Noir,
    Instant,
    Transfer,
    UnsharpMask,
    Monochrome,
    ColorControls,
    Vignette,
}

impl TransformKind {
    pub const ALL: [TransformKind; 9] = [
        TransformKind::GaussianBlur,
        TransformKind::Sepia,
        TransformKind::Noir,
        TransformKind::Instant,
        TransformKind::Transfer,
        TransformKind::UnsharpMask,
        TransformKind::Monochrome,
        TransformKind::ColorControls,
        TransformKind::Vignette,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TransformKind::GaussianBlur => "gaussian_blur",
            TransformKind::Sepia => "sepia",
            TransformKind::Noir => "noir",
            TransformKind::Instant => "instant",
            TransformKind::Transfer => "transfer",
            TransformKind::UnsharpMask => "unsharp_mask",
            TransformKind::Monochrome => "monochrome",
            TransformKind::ColorControls => "color_controls",
            TransformKind::Vignette => "vignette",
        }
    }

    /// Validate the spec's parameters and build the op for this kind.
    fn instantiate(
        self,
        spec: &TransformSpec,
    ) -> Result<Box<dyn TransformOp>, InstantiationError> {
        let kind = self.as_str();
        let intensity = |default: f32, min: f32, max: f32| {
            checked(kind, "intensity", spec.intensity.unwrap_or(default), min, max)
        };
        let radius = |default: f32, min: f32, max: f32| {
            checked(kind, "radius", spec.radius.unwrap_or(default), min, max)
        };

        let op: Box<dyn TransformOp> = match self {
            TransformKind::GaussianBlur => {
                // Blur strength is the radius alone; intensity is accepted and ignored.
                intensity(1.0, f32::MIN, f32::MAX)?;
                Box::new(ops::GaussianBlur::new(radius(10.0, 0.0, 100.0)?))
            }
            TransformKind::Sepia => Box::new(ops::SepiaTone::new(intensity(1.0, 0.0, 1.0)?)),
            TransformKind::Noir => Box::new(ops::PhotoEffect::new(
                ops::PhotoStyle::Noir,
                intensity(1.0, 0.0, 1.0)?,
            )),
            TransformKind::Instant => Box::new(ops::PhotoEffect::new(
                ops::PhotoStyle::Instant,
                intensity(1.0, 0.0, 1.0)?,
            )),
            TransformKind::Transfer => Box::new(ops::PhotoEffect::new(
                ops::PhotoStyle::Transfer,
                intensity(1.0, 0.0, 1.0)?,
            )),
            TransformKind::UnsharpMask => Box::new(ops::UnsharpMask::new(
                radius(2.5, 0.0, 100.0)?,
                intensity(0.5, 0.0, 10.0)?,
            )),
            TransformKind::Monochrome => Box::new(ops::Monochrome::new(
                ops::Monochrome::DEFAULT_COLOR,
                intensity(1.0, 0.0, 1.0)?,
            )),
            TransformKind::ColorControls => {
                Box::new(ops::ColorControls::with_saturation(intensity(1.0, 0.0, 2.0)?))
            }
            TransformKind::Vignette => Box::new(ops::Vignette::new(
                intensity(1.0, 0.0, 2.0)?,
                radius(1.0, 0.01, 2.0)?,
            )),
        };
        Ok(op)
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformKind {
    type Err = InstantiationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransformKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| InstantiationError::UnknownKind(s.to_string()))
    }
}

fn checked(
    kind: &'static str,
    param: &'static str,
    value: f32,
    min: f32,
    max: f32,
) -> Result<f32, InstantiationError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(InstantiationError::InvalidParameter { kind, param, value })
    }
}

/// One catalog entry: which transform to build and how to configure it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransformSpec {
    /// Transform kind, e.g. `gaussian_blur`. Checked when the pipeline is configured.
    pub kind: String,
    /// Display name for the grid cell. Defaults to the kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f32>,
}

impl TransformSpec {
    pub fn new(kind: TransformKind) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            label: None,
            intensity: None,
            radius: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = Some(intensity);
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = Some(radius);
        self
    }
}

/// A named, configured transform bound to one source image.
///
/// The output slot starts empty, is filled by a successful [`Transform::run`],
/// and is left empty when the run fails.
pub struct Transform {
    name: String,
    kind: Option<TransformKind>,
    intensity: Option<f32>,
    source: Arc<ImageBuf>,
    op: Box<dyn TransformOp>,
    output: Mutex<Option<Arc<ImageBuf>>>,
}

impl Transform {
    /// Build a catalog transform. Fails if the kind is unknown, a parameter
    /// is out of range, or the source has no pixels.
    pub fn create(source: Arc<ImageBuf>, spec: &TransformSpec) -> Result<Self, InstantiationError> {
        let kind: TransformKind = spec.kind.parse()?;
        ensure_not_empty(&source)?;
        let op = kind.instantiate(spec)?;
        let name = spec.label.clone().unwrap_or_else(|| kind.as_str().to_string());
        Ok(Self {
            name,
            kind: Some(kind),
            intensity: spec.intensity,
            source,
            op,
            output: Mutex::new(None),
        })
    }

    /// Wrap a custom op that is not part of the built-in catalog.
    pub fn with_op(
        name: impl Into<String>,
        source: Arc<ImageBuf>,
        op: Box<dyn TransformOp>,
    ) -> Result<Self, InstantiationError> {
        ensure_not_empty(&source)?;
        Ok(Self {
            name: name.into(),
            kind: None,
            intensity: None,
            source,
            op,
            output: Mutex::new(None),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` for transforms built with [`Transform::with_op`].
    pub fn kind(&self) -> Option<TransformKind> {
        self.kind
    }

    pub fn intensity(&self) -> Option<f32> {
        self.intensity
    }

    pub fn source(&self) -> &Arc<ImageBuf> {
        &self.source
    }

    pub fn output_image(&self) -> Option<Arc<ImageBuf>> {
        lock(&self.output).clone()
    }

    pub fn clear_output(&self) {
        lock(&self.output).take();
    }

    /// Apply the op to the source and store the result.
    ///
    /// Errors and panics inside the op are converted into [`TransformFailed`];
    /// the output slot stays empty in that case.
    pub fn run(&self) -> Result<(), TransformFailed> {
        let t0 = Instant::now();
        match self.produce() {
            Ok(image) => {
                *lock(&self.output) = Some(Arc::new(image));
                debug!(
                    transform = %self.name,
                    elapsed_ms = t0.elapsed().as_millis(),
                    "transform done"
                );
                Ok(())
            }
            Err(reason) => {
                lock(&self.output).take();
                warn!(transform = %self.name, %reason, "transform failed");
                Err(TransformFailed {
                    name: self.name.clone(),
                    reason,
                })
            }
        }
    }

    /// Run the op without touching the output slot.
    pub(crate) fn produce(&self) -> Result<ImageBuf, String> {
        let applied = panic::catch_unwind(AssertUnwindSafe(|| self.op.apply(&self.source)));
        match applied {
            Ok(Ok(image)) if image.same_dimensions(&self.source) => Ok(image),
            Ok(Ok(image)) => Err(format!(
                "{} produced {}x{}, expected {}x{}",
                self.op.name(),
                image.width,
                image.height,
                self.source.width,
                self.source.height
            )),
            Ok(Err(err)) => Err(format!("{err:#}")),
            Err(payload) => Err(panic_message(payload.as_ref())),
        }
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("intensity", &self.intensity)
            .field("has_output", &self.output_image().is_some())
            .finish()
    }
}

fn ensure_not_empty(source: &ImageBuf) -> Result<(), InstantiationError> {
    if source.is_empty() {
        return Err(InstantiationError::EmptySource {
            width: source.width,
            height: source.height,
        });
    }
    Ok(())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> Arc<ImageBuf> {
        Arc::new(ImageBuf::from_data(8, 6, vec![0.4; 8 * 6 * 3]).unwrap())
    }

    struct Failing;

    impl TransformOp for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn apply(&self, _input: &ImageBuf) -> anyhow::Result<ImageBuf> {
            anyhow::bail!("no capability")
        }
    }

    struct Shrinking;

    impl TransformOp for Shrinking {
        fn name(&self) -> &str {
            "shrinking"
        }

        fn apply(&self, input: &ImageBuf) -> anyhow::Result<ImageBuf> {
            Ok(ImageBuf::new(input.width / 2, input.height / 2))
        }
    }

    struct Panicking;

    impl TransformOp for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }

        fn apply(&self, _input: &ImageBuf) -> anyhow::Result<ImageBuf> {
            panic!("kernel exploded")
        }
    }

    #[test]
    fn kind_names_roundtrip() {
        for kind in TransformKind::ALL {
            assert_eq!(kind.as_str().parse::<TransformKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_kind_is_instantiation_error() {
        let spec = TransformSpec {
            kind: "CIPosterize".into(),
            label: None,
            intensity: None,
            radius: None,
        };
        let err = Transform::create(source(), &spec).unwrap_err();
        assert_eq!(err, InstantiationError::UnknownKind("CIPosterize".into()));
    }

    #[test]
    fn out_of_range_parameters_rejected() {
        let spec = TransformSpec::new(TransformKind::Sepia).with_intensity(1.5);
        assert!(matches!(
            Transform::create(source(), &spec),
            Err(InstantiationError::InvalidParameter {
                param: "intensity",
                ..
            })
        ));

        let spec = TransformSpec::new(TransformKind::GaussianBlur).with_radius(f32::NAN);
        assert!(matches!(
            Transform::create(source(), &spec),
            Err(InstantiationError::InvalidParameter { param: "radius", .. })
        ));
    }

    #[test]
    fn empty_source_rejected() {
        let empty = Arc::new(ImageBuf::new(0, 0));
        let spec = TransformSpec::new(TransformKind::Noir);
        assert!(matches!(
            Transform::create(empty, &spec),
            Err(InstantiationError::EmptySource { .. })
        ));
    }

    #[test]
    fn name_defaults_to_kind_and_honors_label() {
        let plain =
            Transform::create(source(), &TransformSpec::new(TransformKind::Vignette)).unwrap();
        assert_eq!(plain.name(), "vignette");
        assert_eq!(plain.kind(), Some(TransformKind::Vignette));

        let labeled = Transform::create(
            source(),
            &TransformSpec::new(TransformKind::Sepia)
                .with_label("Sepia 70%")
                .with_intensity(0.7),
        )
        .unwrap();
        assert_eq!(labeled.name(), "Sepia 70%");
        assert_eq!(labeled.intensity(), Some(0.7));
    }

    #[test]
    fn output_empty_until_run() {
        let t =
            Transform::create(source(), &TransformSpec::new(TransformKind::GaussianBlur)).unwrap();
        assert!(t.output_image().is_none());
        t.run().unwrap();
        let out = t.output_image().unwrap();
        assert_eq!((out.width, out.height), (8, 6));
    }

    #[test]
    fn run_does_not_mutate_source() {
        let src = source();
        let before = src.data.clone();
        let t = Transform::create(src.clone(), &TransformSpec::new(TransformKind::Sepia)).unwrap();
        t.run().unwrap();
        assert_eq!(src.data, before);
    }

    #[test]
    fn failing_op_leaves_slot_empty() {
        let t = Transform::with_op("broken", source(), Box::new(Failing)).unwrap();
        let err = t.run().unwrap_err();
        assert_eq!(err.name, "broken");
        assert!(err.reason.contains("no capability"));
        assert!(t.output_image().is_none());
        assert_eq!(t.kind(), None);
    }

    #[test]
    fn dimension_change_counts_as_failure() {
        let t = Transform::with_op("shrink", source(), Box::new(Shrinking)).unwrap();
        let err = t.run().unwrap_err();
        assert!(err.reason.contains("expected 8x6"), "{}", err.reason);
        assert!(t.output_image().is_none());
    }

    #[test]
    fn panic_in_op_is_contained() {
        let t = Transform::with_op("boom", source(), Box::new(Panicking)).unwrap();
        let err = t.run().unwrap_err();
        assert!(err.reason.contains("kernel exploded"), "{}", err.reason);
        assert!(t.output_image().is_none());
    }

    #[test]
    fn clear_output_empties_slot() {
        let t = Transform::create(source(), &TransformSpec::new(TransformKind::Noir)).unwrap();
        t.run().unwrap();
        assert!(t.output_image().is_some());
        t.clear_output();
        assert!(t.output_image().is_none());
    }

    #[test]
    fn spec_json_shape() {
        let spec: TransformSpec =
            serde_json::from_str(r#"{"kind":"vignette","intensity":1.4,"radius":0.7}"#).unwrap();
        assert_eq!(spec.kind, "vignette");
        assert_eq!(spec.intensity, Some(1.4));
        assert_eq!(spec.label, None);

        let rejected = serde_json::from_str::<TransformSpec>(r#"{"kind":"sepia","amount":1}"#);
        assert!(rejected.is_err());
    }
}
