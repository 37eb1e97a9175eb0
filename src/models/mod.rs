pub mod api;
pub mod leonardo;
pub mod site;

pub use api::*;
pub use leonardo::*;
pub use site::*;
