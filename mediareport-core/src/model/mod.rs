//! Input model: the analysis result and the image artifacts it carries.

mod artifact;
mod data_result;

pub use artifact::ImageArtifact;
pub use data_result::*;
