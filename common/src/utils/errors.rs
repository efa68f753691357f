use std::fmt::Display;

#[macro_export]
macro_rules! herald_err {
    // Case with just a message literal
    ($kind:expr, $msg:expr) => {
        $crate::utils::errors::HeraldError {
            kind: $kind,
            message: $msg.into(),
            file: file!(),
            line: line!(),
        }
    };
    // Case with message + format arguments
    ($kind:expr, $fmt:expr, $($args:tt)*) => {
        $crate::utils::errors::HeraldError {
            kind: $kind,
            message: format!($fmt, $($args)*),
            file: file!(),
            line: line!(),
        }
    };
}

#[derive(Debug, Clone)]
pub struct HeraldError {
    pub kind: HeraldErrorKind,
    pub message: String,
    pub file: &'static str,
    pub line: u32,
}
impl Display for HeraldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?}: {} ({}:{})",
            self.kind, self.message, self.file, self.line
        )
    }
}
impl std::error::Error for HeraldError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeraldErrorKind {
    // Icon and image handling
    PackageNotFound,
    IconLoad,
    IconDecode,
    ImageEncode,
    InvalidHint,

    Deserialize,
    Serialize,

    InvalidData,

    FileOpen,
    FileRead,

    DirCreate,
    DirRead,

    EnvVar,
    Config,

    StreamRead,
    StreamWrite,
    StreamBind,
    StreamConnect,

    DBusConnect,
    DBusSignal,

    ReplySend,
}
