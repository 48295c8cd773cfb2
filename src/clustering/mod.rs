pub mod attachment;
pub mod builder;
pub mod discovery;
pub mod island;

pub use attachment::{MaterialAttachment, SurfaceAttachment};
pub use builder::IslandsBuilder;
pub use discovery::find_islands;
pub use island::Island;
