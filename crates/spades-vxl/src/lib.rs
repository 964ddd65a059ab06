//! Run-length column map format (`.vxl`): decode, encode and background load.
#![forbid(unsafe_code)]

mod decode;
mod encode;
mod error;
mod job;

pub use decode::{decode, decode_with_dims, decode_with_progress, read_file};
pub use encode::{encode, encode_with_progress, write_file};
pub use error::VxlError;
pub use job::{LoadProgress, MapLoadJob, spawn_decode};
