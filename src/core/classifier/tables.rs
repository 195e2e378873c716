//! Fixed extension tables and the system-reserved exclusion list.

/// Extensions indexed as video
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "m4v", "mov", "avi", "mkv", "wmv", "flv", "webm", "mpg", "mpeg", "m2ts", "mts", "ts",
    "3gp", "ogv", "vob",
];

/// Extensions indexed as audio
pub const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "flac", "wav", "aac", "m4a", "ogg", "oga", "opus", "wma", "aiff", "aif", "ape", "wv",
    "mpc", "alac",
];

/// Directory names that mark OS or program territory on any drive.
/// Matched case-insensitively against every path component.
pub const RESERVED_DIR_NAMES: &[&str] = &[
    "windows",
    "program files",
    "program files (x86)",
    "programdata",
    "appdata",
    "$recycle.bin",
    "system volume information",
];

/// Absolute prefixes reserved by Unix-like systems.
pub const RESERVED_PREFIXES: &[&str] = &[
    "/proc", "/sys", "/dev", "/usr", "/bin", "/sbin", "/lib", "/lib64", "/etc", "/var", "/boot",
    "/run", "/snap", "/System", "/Library",
];
