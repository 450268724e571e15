//! Path resolution against the session's current directory
//!
//! Pure string functions: no filesystem, no registry lookups. Directory
//! existence is the registry's concern; these functions only turn command
//! arguments into canonical absolute paths.
//!
//! Canonical form: absolute, `/`-separated, directories slash-terminated.

/// Resolve a raw path argument into an absolute path.
///
/// Resolution rules, in order:
/// 1. leading spaces and tabs are stripped;
/// 2. a path starting with `/` is already absolute and passes through
///    unchanged;
/// 3. `.` is the current directory, `..` is one level up;
/// 4. a path starting with `../` climbs one level per `../` occurrence and
///    appends whatever follows the last one;
/// 5. any other leading-dot name (`.profile`, `..cache`) is an ordinary
///    relative name;
/// 6. relative names concatenate onto `current_dir`.
///
/// `current_dir` must be canonical (absolute, slash-terminated), which the
/// directory registry guarantees.
pub fn resolve(raw: &str, current_dir: &str) -> String {
    let path = raw.trim_start_matches([' ', '\t']);
    if path.starts_with('/') {
        return path.to_string();
    }
    if path.starts_with('.') {
        if path == "." {
            return current_dir.to_string();
        }
        if path == ".." {
            return move_up_dir(current_dir, 1);
        }
        if path.starts_with("../") {
            // Count `../` occurrences, stepping past each match; the tail
            // after the last one is appended to the climbed prefix.
            let mut levels = 0;
            let mut last = 0;
            let mut pos = 0;
            while let Some(found) = path[pos..].find("../") {
                let at = pos + found;
                levels += 1;
                last = at;
                pos = at + 3;
            }
            return format!("{}{}", move_up_dir(current_dir, levels), &path[last + 3..]);
        }
        return format!("{current_dir}{path}");
    }
    format!("{current_dir}{path}")
}

/// Walk `levels` parent directories up from `path`.
///
/// Climbing past the root is not an error: the result saturates at `/`.
/// The returned path is always slash-terminated.
pub fn move_up_dir(path: &str, levels: usize) -> String {
    if path == "/" || levels == 0 {
        return path.to_string();
    }
    let mut path = if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    };
    let separators = path.matches('/').count();
    if levels >= separators - 1 {
        return "/".to_string();
    }
    // Strip levels + 1 segments (the trailing slash makes the last segment
    // empty), then restore the terminator.
    for _ in 0..=levels {
        if let Some(pos) = path.rfind('/') {
            path.truncate(pos);
        }
    }
    path.push('/');
    path
}
