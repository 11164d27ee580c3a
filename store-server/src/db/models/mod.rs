//! Database Models
//!
//! Read shapes carry the record key as a plain `id` string (selected with
//! `record::id(id) AS id`); write shapes never contain an id.

pub mod category;
pub mod order;
pub mod product;
pub mod testimonial;

pub use category::*;
pub use order::*;
pub use product::*;
pub use testimonial::*;
