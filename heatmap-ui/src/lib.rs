pub mod api;
pub mod interop;
pub mod map;

pub use api::*;
pub use interop::*;
pub use map::*;
