//! Link destination resolution.

/// Whether `url` points outside the document tree.
fn is_external(url: &str) -> bool {
    url.starts_with("http://")
        || url.starts_with("https://")
        || url.starts_with("//")
        || url.starts_with("mailto:")
        || url.starts_with("tel:")
        || url.starts_with("data:")
        || url.starts_with('#')
        || url.starts_with('/')
}

/// Resolve a link or image destination against the configured base.
///
/// External, fragment-only and absolute destinations are returned unchanged.
/// Relative destinations are resolved against the directory of `link_path`
/// and then prefixed with `link_base`.
///
/// ```
/// use lucent_render::resolve_link;
///
/// assert_eq!(resolve_link("img/a.png", "https://cdn.io/", "notes/day.md"), "https://cdn.io/notes/img/a.png");
/// assert_eq!(resolve_link("https://x.io", "/base/", ""), "https://x.io");
/// ```
#[must_use]
pub fn resolve_link(url: &str, link_base: &str, link_path: &str) -> String {
    if url.is_empty() || is_external(url) || (link_base.is_empty() && link_path.is_empty()) {
        return url.to_owned();
    }

    let dir = link_path.rsplit_once('/').map_or("", |(dir, _)| dir);
    let resolved = resolve_relative_path(url, dir);

    if link_base.is_empty() {
        resolved
    } else if link_base.ends_with('/') {
        format!("{link_base}{resolved}")
    } else {
        format!("{link_base}/{resolved}")
    }
}

/// Resolve a relative path against a base directory.
///
/// Handles `.` and `..`; `..` above the base is clamped at the root.
pub(crate) fn resolve_relative_path(relative: &str, base: &str) -> String {
    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();

    for component in relative.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(component),
        }
    }

    segments.join("/")
}

/// Whether `url` is a remote `http(s)` resource.
pub(crate) fn is_remote(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://") || url.starts_with("//")
}
