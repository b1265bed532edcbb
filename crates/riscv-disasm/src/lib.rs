pub mod analyze;
pub mod model;

// Re-export commonly used types/functions for consumers
pub use analyze::{analyze_entries, Analysis, Edge, EdgeKind};
pub use model::{load_raw_bin, read_u16, read_u8, Image, Segment};
