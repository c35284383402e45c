pub mod frame;
pub mod source;

pub use frame::{FrameHandle, Region};
pub use source::{DisplaySource, FrameSource};
