use anyhow::Result;

use crate::image_buf::ImageBuf;

/// A single image-to-image operation.
///
/// Ops are stateless apart from their parameters and never mutate the input,
/// so one source can feed many ops running on different threads.
pub trait TransformOp: Send + Sync {
    fn name(&self) -> &str;
    fn apply(&self, input: &ImageBuf) -> Result<ImageBuf>;
}
