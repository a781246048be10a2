//! Wire codec: turns the raw byte stream into discrete tagged frames and
//! back. Decoding is resumable across partial reads; nothing in this
//! module interprets frame contents.

pub use field::{FieldCursor, FieldValue};
pub use frame::Frame;

mod field;
mod frame;
