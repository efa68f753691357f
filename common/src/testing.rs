use std::collections::HashMap;
use std::sync::Mutex;

use crate::herald_err;
use crate::notification::{IconRef, StatusNotification};
use crate::platform::HostPlatform;
use crate::utils::errors::{HeraldError, HeraldErrorKind};
use crate::utils::icons::{Icon, RasterImage};

pub(crate) fn tiny_image() -> RasterImage {
    RasterImage::rgba(1, 1, vec![10, 20, 30, 255])
}

/// In-memory host with a fixed set of installed packages.
pub(crate) struct FakeHost {
    pub version: u32,
    pub packages: HashMap<String, Icon>,
    pub active: Mutex<Vec<StatusNotification>>,
}
impl FakeHost {
    pub fn new() -> Self {
        Self {
            version: 12,
            packages: HashMap::new(),
            active: Mutex::new(Vec::new()),
        }
    }
    pub fn with_package(mut self, name: &str) -> Self {
        self.packages
            .insert(name.to_string(), Icon::Raster(tiny_image()));
        self
    }
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }
    pub fn show(&self, sbn: StatusNotification) {
        self.active.lock().unwrap().push(sbn);
    }
}
impl HostPlatform for FakeHost {
    fn version(&self) -> u32 {
        self.version
    }
    fn application_icon(&self, package_name: &str) -> Result<Icon, HeraldError> {
        self.packages.get(package_name).cloned().ok_or_else(|| {
            herald_err!(HeraldErrorKind::PackageNotFound, package_name.to_string())
        })
    }
    fn load_icon(&self, icon: &IconRef) -> Result<Icon, HeraldError> {
        match icon {
            IconRef::Raster(image) => Ok(Icon::Raster(image.clone())),
            IconRef::Path(path) => Icon::from_file(path),
            IconRef::Named(name) => self.application_icon(name),
        }
    }
    fn active_notifications(&self) -> Vec<StatusNotification> {
        self.active.lock().unwrap().clone()
    }
}
