//! Live adapters for real devices and services.

pub mod camera;
pub mod clock;
pub mod http;
pub mod id_gen;
pub mod terminal;
pub mod zbar;

pub use camera::{NoCamera, StillImageCamera};
pub use clock::LiveClock;
pub use http::HttpBackend;
pub use id_gen::LiveIdGenerator;
pub use terminal::TerminalView;
pub use zbar::ZbarDecoder;
