use std::path::{Path, PathBuf};

use crate::{
    herald_err,
    utils::errors::{HeraldError, HeraldErrorKind},
};

pub fn expand_path<T: AsRef<Path>>(path: T, home: &Path) -> PathBuf {
    let path = path.as_ref();
    let mut components = path.components();
    if let Some(std::path::Component::Normal(first)) = components.next() {
        if first == "~" {
            return home.join(components.as_path());
        }
    }
    path.to_path_buf()
}
pub fn home_dir() -> Result<PathBuf, HeraldError> {
    std::env::var("HOME")
        .map_err(|e| herald_err!(HeraldErrorKind::EnvVar, e.to_string()))
        .map(PathBuf::from)
}

fn get_xdg_dirs() -> xdg::BaseDirectories {
    xdg::BaseDirectories::with_prefix("herald")
}

/// Returns the configuration directory, `$XDG_CONFIG_HOME/herald`.
///
/// The directory is not created; a missing directory simply means no
/// configuration file exists yet.
pub fn get_config_dir() -> Result<PathBuf, HeraldError> {
    get_xdg_dirs()
        .get_config_home()
        .ok_or_else(|| herald_err!(HeraldErrorKind::DirRead, "Could not find config directory"))
}

/// Directories searched for application icons, most specific first.
pub fn icon_search_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(data_home) = get_xdg_dirs().get_data_home().and_then(|d| {
        // `get_data_home` is prefixed with `herald`, icons live one level up
        d.parent().map(Path::to_path_buf)
    }) {
        dirs.push(data_home.join("icons"));
    }
    if let Ok(paths_var) = std::env::var("XDG_DATA_DIRS") {
        dirs.extend(
            paths_var
                .split(':')
                .filter(|p| !p.is_empty())
                .map(|p| PathBuf::from(p).join("icons")),
        );
    } else {
        dirs.push(PathBuf::from("/usr/local/share/icons"));
        dirs.push(PathBuf::from("/usr/share/icons"));
    }
    dirs.push(PathBuf::from("/usr/share/pixmaps"));
    dirs
}
