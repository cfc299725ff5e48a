//! Windows process management for the soundstage shell

mod windows_backend;

pub use windows_backend::{WindowsBackendHandle, WindowsServiceManager};
