pub mod scene;
pub mod scene_file;

pub use scene::{Book, Chapter, ORDER_GAP, Part, RevisionStatus, Scene};
pub use scene_file::SceneFile;
