//! Network layer: the [`Gateway`], its buffered [`Response`] and the shared
//! response classifier.

pub mod de;
mod gateway;
mod response;

pub use gateway::{classify, Gateway, Surface};
pub use response::Response;
