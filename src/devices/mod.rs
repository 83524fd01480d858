//! Device implementations

pub mod console;
pub mod file;
pub mod rotating_file;
pub mod writer;

pub use console::ConsoleDevice;
pub use file::FileDevice;
pub use rotating_file::RotatingFileDevice;
pub use writer::{MemoryDevice, WriterDevice};

pub use crate::core::LogDevice;
