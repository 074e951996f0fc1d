//! Command implementations for the deflurl CLI.

pub mod completions;
pub mod decode;
pub mod encode;
pub mod info;

pub use completions::cmd_completions;
pub use decode::cmd_decode;
pub use encode::cmd_encode;
pub use info::cmd_info;
