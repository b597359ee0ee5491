//! Scripted adapters that serve canned responses in order.
//!
//! Each adapter is cheap to clone and clones share state, so a test can keep
//! a handle after moving a copy into a [`ServiceContext`](crate::context::ServiceContext)
//! and inspect what the core did with it.

pub mod backend;
pub mod camera;
pub mod clock;
pub mod decoder;
pub mod id_gen;
pub mod view;

pub use backend::ScriptedBackend;
pub use camera::ScriptedCamera;
pub use clock::FixedClock;
pub use decoder::{ScriptedDecode, ScriptedDecoder};
pub use id_gen::SequentialIdGenerator;
pub use view::{RecordingView, ViewUpdate};
