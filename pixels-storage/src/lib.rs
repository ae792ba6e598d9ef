pub mod bitutils;
pub mod buf;
pub mod conf;
pub mod error;
pub mod proto;
pub mod serde;
pub mod stats;
pub mod writer;

pub mod prelude {
    pub use crate::conf::*;
    pub use crate::error::*;
    pub use crate::proto::*;
    pub use crate::writer::*;
}
