//! Page images: the decode/resize capability and the normalizer built on it.

mod backend;
mod normalize;

pub use backend::{Dimensions, ImageBackend, RasterBackend};
pub use normalize::{PAGE_BACKGROUND, PageImage, copy_sources, list_source_images, normalize_pages};
