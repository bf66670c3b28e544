//! Async frame listener driving a recognition session from the frame bus.

mod listener;

pub use listener::{start_frame_listener, FrameListenerHandle, ListenerOutput};
