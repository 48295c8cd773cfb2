pub mod geometry;
pub mod scene;

pub use geometry::{polygon_area, Aabb};
pub use scene::{MaterialId, ObjectId, Scene, SceneSnapshot, Surface, SurfaceId};
