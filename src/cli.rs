use std::path::PathBuf;

use argh::FromArgs;

/// Preview a photo through a catalog of image filters
#[derive(Debug, FromArgs)]
pub struct Args {
    /// input image (JPEG, PNG or TIFF)
    #[argh(positional)]
    pub input: PathBuf,

    /// catalog file: JSON array of transform specs
    #[argh(option, short = 'c')]
    pub catalog: Option<PathBuf>,

    /// built-in catalog when no file is given: blurs or effects
    #[argh(option, short = 'p', default = "String::from(\"effects\")")]
    pub preset: String,

    /// output directory for cells and the contact sheet
    #[argh(option, short = 'o', default = "PathBuf::from(\"prisma-out\")")]
    pub out: PathBuf,

    /// longest edge of the working preview in pixels
    #[argh(option, default = "2048")]
    pub max_edge: u32,

    /// worker threads for a dedicated pool (default: shared global pool)
    #[argh(option, short = 'j')]
    pub threads: Option<usize>,

    /// fail the whole run when any filter fails
    #[argh(switch)]
    pub fail_batch: bool,

    /// run filters one after another into a single image list
    #[argh(switch)]
    pub batch: bool,

    /// contact sheet columns
    #[argh(option, default = "3")]
    pub columns: u32,

    /// seconds to wait for the run to finish
    #[argh(option, default = "120")]
    pub timeout: u64,
}
