use soundstage_shell_core::ServiceManagerFactory;

/// Platform-independent factory that selects the appropriate implementation
/// at compile time
pub struct PlatformServiceManagerFactory;

impl ServiceManagerFactory for PlatformServiceManagerFactory {
    #[cfg(unix)]
    type Manager = soundstage_shell_unix::UnixServiceManager;

    #[cfg(windows)]
    type Manager = soundstage_shell_windows::WindowsServiceManager;

    fn create_manager() -> Self::Manager {
        #[cfg(unix)]
        return soundstage_shell_unix::UnixServiceManager::new();

        #[cfg(windows)]
        return soundstage_shell_windows::WindowsServiceManager::new();
    }

    fn platform_name() -> &'static str {
        #[cfg(unix)]
        return "unix";

        #[cfg(windows)]
        return "windows";
    }
}
