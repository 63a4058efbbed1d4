pub mod path;
pub mod write;

pub use path::{check_name, manifest_name, safe_join};
pub use write::{fsync_dir, write_atomic};
