//! Unix process management for the soundstage shell

mod unix_backend;

pub use unix_backend::{UnixBackendHandle, UnixServiceManager};
