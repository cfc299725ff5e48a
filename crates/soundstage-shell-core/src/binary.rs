use crate::config::Deployment;
use std::path::PathBuf;

/// File name of the bundled backend server for a platform identifier
/// (as reported by `std::env::consts::OS`). Unknown platforms fall back
/// to the plain Unix name.
pub fn server_binary_name(platform: &str) -> &'static str {
    match platform {
        "windows" => "fastapi-server.exe",
        "macos" => "fastapi-server-mac",
        _ => "fastapi-server",
    }
}

/// Resolve the full path of the backend binary for the given deployment
/// layout and platform. Both layouts keep binaries under a `bin` directory;
/// only the root differs.
pub fn resolve_server_binary(deployment: &Deployment, platform: &str) -> PathBuf {
    let root = match deployment {
        Deployment::Development { root } => root,
        Deployment::Packaged { resources } => resources,
    };
    root.join("bin").join(server_binary_name(platform))
}
