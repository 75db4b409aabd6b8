//! Dataset sources.
//!
//! A [`DatasetLoader`] produces the raw bytes of the domain dataset together
//! with a string describing where they came from. Parsing the bytes into
//! rows lives in [`format`].

pub mod auto_loader;
pub mod format;
pub mod loader;

pub use auto_loader::{AutoLoader, DEFAULT_REMOTE_TIMEOUT, DEFAULT_USER_AGENT, MAX_REMOTE_BODY_BYTES};
pub use format::{Dataset, DatasetRow};
pub use loader::{DatasetLoader, MemoryLoader, NilLoader, RawPayload};
