//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the scanning core and an
//! external system (time, IDs, the HTTP backend, the camera, the barcode
//! decoding engine, and the display). Implementations live in `src/adapters/`.

pub mod backend;
pub mod camera;
pub mod clock;
pub mod decoder;
pub mod id_gen;
pub mod view;

pub use backend::{
    Backend, BackendFuture, ChatMode, ChatRequest, ChatResponse, LookupRequest, LookupResponse,
    Product, ShoppingListEntry, ShoppingListRequest, ShoppingListResponse,
};
pub use camera::{Camera, CameraFuture, CameraStream, Frame};
pub use clock::Clock;
pub use decoder::SymbolDecoder;
pub use id_gen::IdGenerator;
pub use view::View;
