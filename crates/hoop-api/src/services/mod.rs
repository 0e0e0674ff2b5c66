//! Background services.

pub mod frame_janitor;

pub use frame_janitor::FrameJanitor;
