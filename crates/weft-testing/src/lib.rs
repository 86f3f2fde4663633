//! Testing utilities and harness for weft

pub mod editor;
pub mod shell;
pub mod testing;

// Re-export testing utilities
pub use editor::*;
pub use shell::*;
pub use testing::*;

pub mod prelude {
    pub use crate::editor::*;
    pub use crate::shell::*;
    pub use crate::testing::*;
}
