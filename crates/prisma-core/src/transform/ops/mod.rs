mod blur;
mod color_controls;
mod monochrome;
mod photo_effect;
mod sepia;
mod unsharp;
mod vignette;

pub use blur::{GaussianBlur, gaussian_blur, gaussian_kernel};
pub use color_controls::ColorControls;
pub use monochrome::Monochrome;
pub use photo_effect::{PhotoEffect, PhotoStyle};
pub use sepia::SepiaTone;
pub use unsharp::UnsharpMask;
pub use vignette::Vignette;
