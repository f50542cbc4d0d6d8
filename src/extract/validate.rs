//! Candidate path validation and file-vs-directory filtering.

/// Well-known extension-less filenames that are worth scanning.
static KNOWN_FILENAMES: &[&str] = &[
    "profile",
    "passwd",
    "shadow",
    "group",
    "hosts",
    "hostname",
    "fstab",
    "mtab",
    "mounts",
    "environ",
    "cmdline",
    "status",
    "maps",
    "stat",
    "version",
    "messages",
    "syslog",
    "dmesg",
    "motd",
    "issue",
    "inittab",
    "crontab",
    "sudoers",
    "authorized_keys",
    "known_hosts",
    "history",
    "Makefile",
    "makefile",
    "Dockerfile",
];

/// Bare directory names that must never be queued as files.
static BARE_DIRECTORIES: &[&str] = &[
    "/bin", "/boot", "/data", "/dev", "/etc", "/home", "/lib", "/lib64", "/media", "/mnt", "/opt",
    "/proc", "/root", "/run", "/sbin", "/srv", "/sys", "/tmp", "/usr", "/var",
];

/// Validate a literal candidate path.
///
/// Must be absolute, at least 4 characters, made of path-safe characters,
/// not directory-terminated, and not a known bare directory.
pub fn is_valid_path(path: &str) -> bool {
    if !path.starts_with('/') || path.len() < 4 || path.ends_with('/') {
        return false;
    }
    if path.contains("//") || path.contains("/../") || path.ends_with("/..") {
        return false;
    }
    if !path
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '.' | '-' | '+' | '@' | '~'))
    {
        return false;
    }
    !BARE_DIRECTORIES.contains(&path)
}

/// Filter out candidates that are almost certainly directories.
///
/// A candidate survives when its last segment has an extension, is a
/// well-known extension-less filename, or the path lies under /proc or
/// /sys where entries are readable without being "files" in the usual
/// sense.
pub fn looks_like_file(path: &str) -> bool {
    if path.starts_with("/proc/") || path.starts_with("/sys/") {
        return true;
    }

    let basename = path.rsplit('/').next().unwrap_or("");
    if basename.is_empty() {
        return false;
    }

    // Dotfiles (".bashrc") and names with an interior dot ("app.conf")
    if basename.starts_with('.') && basename.len() > 1 {
        return true;
    }
    if basename.chars().skip(1).any(|c| c == '.') {
        return true;
    }

    KNOWN_FILENAMES.contains(&basename)
}
