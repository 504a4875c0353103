//! # Groups Module
//!
//! The group registry, its top-level spawn operations and JSON loading.
//!
//! Group definitions are JSON. A definitions file is an array of group objects:
//!
//! ```json
//! [
//!   { "id": "camping", "subtype": "collection",
//!     "items": ["knife", ["rope", 50]], "groups": ["light"] },
//!   { "id": "light", "subtype": "distribution",
//!     "entries": [{ "item": "torch", "prob": 3, "count": [1, 2] },
//!                 { "item": "flashlight", "charges-min": 10 }] }
//! ]
//! ```

pub mod definition;
pub mod loader;
pub mod registry;

pub use definition::*;
pub use registry::*;
