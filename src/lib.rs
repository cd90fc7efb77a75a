pub mod lockfile;
pub mod packagers;
pub mod process;
pub mod telemetry;
pub mod traits;

// Re-export common types for convenience
pub use lockfile::*;
pub use packagers::*;
pub use process::*;
pub use traits::*;
