use std::sync::Arc;

use common::herald_err;
use common::notification::{IconRef, StatusNotification};
use common::platform::HostPlatform;
use common::utils::errors::{HeraldError, HeraldErrorKind};
use common::utils::icons::{Icon, IconTheme};
use common::utils::paths::icon_search_dirs;
use tracing::info;

use crate::notify::NotificationDaemon;

/// Freedesktop notification spec revision 1.2, as `major * 10 + minor`.
pub const SPEC_VERSION: u32 = 12;

/// The daemon's side of [`HostPlatform`]: icon theme lookups and the store
/// of notifications currently shown.
pub struct FreedesktopHost {
    theme: IconTheme,
    daemon: Arc<NotificationDaemon>,
}
impl FreedesktopHost {
    pub fn new(daemon: Arc<NotificationDaemon>, extra_icon_paths: &[String]) -> Self {
        let mut theme = IconTheme::new();
        // Configured paths first so they win over system icons
        for path in extra_icon_paths {
            theme.add_path(path);
        }
        for dir in icon_search_dirs() {
            theme.add_path(dir);
        }
        info!(icons = theme.buf.len(), "icon theme indexed");
        Self::with_theme(daemon, theme)
    }

    pub fn with_theme(daemon: Arc<NotificationDaemon>, theme: IconTheme) -> Self {
        Self { theme, daemon }
    }

    fn themed_icon(&self, name: &str, missing: HeraldErrorKind) -> Result<Icon, HeraldError> {
        let path = self
            .theme
            .lookup_icon(name)
            .ok_or_else(|| herald_err!(missing, "no icon named {}", name))?;
        Icon::from_file(&path)
    }
}
impl HostPlatform for FreedesktopHost {
    fn version(&self) -> u32 {
        SPEC_VERSION
    }

    fn application_icon(&self, package_name: &str) -> Result<Icon, HeraldError> {
        self.themed_icon(package_name, HeraldErrorKind::PackageNotFound)
    }

    fn load_icon(&self, icon: &IconRef) -> Result<Icon, HeraldError> {
        match icon {
            IconRef::Raster(image) => Ok(Icon::Raster(image.clone())),
            IconRef::Path(path) => Icon::from_file(path),
            IconRef::Named(name) => self.themed_icon(name, HeraldErrorKind::IconLoad),
        }
    }

    fn active_notifications(&self) -> Vec<StatusNotification> {
        self.daemon.pending_notifications()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host_with_icons() -> (FreedesktopHost, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let png = common::utils::icons::RasterImage::rgba(1, 1, vec![0, 0, 0, 255])
            .to_png()
            .unwrap();
        std::fs::write(dir.path().join("org.example.chat.png"), png).unwrap();

        let mut theme = IconTheme::new();
        theme.add_path(dir.path());
        let host = FreedesktopHost::with_theme(Arc::new(NotificationDaemon::new()), theme);
        (host, dir)
    }

    #[test]
    fn resolves_application_icons_from_theme() {
        let (host, _dir) = host_with_icons();
        let icon = host.application_icon("org.example.chat").unwrap();
        assert!(icon.to_png().is_ok());
    }

    #[test]
    fn unknown_package_is_package_not_found() {
        let (host, _dir) = host_with_icons();
        let err = host.application_icon("does.not.exist").unwrap_err();
        assert_eq!(err.kind, HeraldErrorKind::PackageNotFound);
    }

    #[test]
    fn missing_icon_file_is_load_error() {
        let (host, _dir) = host_with_icons();
        let err = host
            .load_icon(&IconRef::Path("/nonexistent/icon.png".into()))
            .unwrap_err();
        assert_eq!(err.kind, HeraldErrorKind::IconLoad);
    }

    #[test]
    fn lists_active_store() {
        let daemon = Arc::new(NotificationDaemon::new());
        daemon.insert(StatusNotification::new(1, "app", 0));
        daemon.insert(StatusNotification::new(2, "app", 0));
        let host = FreedesktopHost::with_theme(Arc::clone(&daemon), IconTheme::new());

        assert_eq!(host.active_notifications().len(), 2);
    }
}
