use crate::notification::{IconRef, StatusNotification};
use crate::utils::errors::HeraldError;
use crate::utils::icons::Icon;

/// Services the notification host provides to the bridge.
///
/// Lookups are synchronous and run inside the host's posted/removed
/// callback.
pub trait HostPlatform: Send + Sync {
    /// Version of the host notification protocol, compared against
    /// `large_icon_min_version` before large icons are read.
    fn version(&self) -> u32;

    /// Icon of the application identified by `package_name`.
    ///
    /// Fails with `HeraldErrorKind::PackageNotFound` for unknown packages.
    fn application_icon(&self, package_name: &str) -> Result<Icon, HeraldError>;

    /// Loads an icon referenced by a notification.
    fn load_icon(&self, icon: &IconRef) -> Result<Icon, HeraldError>;

    /// Every notification currently shown.
    fn active_notifications(&self) -> Vec<StatusNotification>;
}
