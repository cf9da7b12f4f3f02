pub mod construct;
pub(crate) mod parser;
pub mod registry;
pub mod scanner;
pub(crate) mod serializer;

pub use construct::{Construct, Style, Tint};
pub use registry::{Registry, RegistryError, SPECIAL_NAMES};
pub use scanner::{Boundary, BoundaryKind, find_next_boundary};
