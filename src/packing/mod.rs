pub mod bin_packer;
pub mod boxes;
pub mod transform;

pub use bin_packer::{pack_boxes, BAD_MAX};
pub use boxes::{islands_to_boxes, PackingBox, Rect};
pub use transform::UvBoxTransform;
