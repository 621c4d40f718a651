//! Output formats for the `sitemap_stream` binary.
//!
//! # Submodules
//!
//! - [`json`]: one JSON object per line for each record, written as soon as
//!   the record is decoded
//!
//! # Output Structure
//!
//! ```text
//! {"location":"https://example.com/","last_modified":"2005-01-01T00:00:00+00:00","change_frequency":"monthly","priority":0.8,"images":[],"news":null}
//! {"location":"https://example.com/catalog?item=12","last_modified":null,"change_frequency":"weekly","priority":0.5,"images":[],"news":null}
//! ```

pub mod json;
