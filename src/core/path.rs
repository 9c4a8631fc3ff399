/// Joins `filename` onto `base` and normalizes the result into an absolute
/// POSIX path. A relative `base` is anchored at the root, and an absolute
/// `filename` replaces `base` entirely. `..` never climbs above the root.
pub fn resolve_remote_path(base: &str, filename: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    let inputs: &[&str] = if filename.starts_with('/') {
        &[filename]
    } else {
        &[base, filename]
    };

    for part in inputs {
        for segment in part.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                s => segments.push(s),
            }
        }
    }

    format!("/{}", segments.join("/"))
}

/// Folder lookup order: the file's stored folder, the configured base
/// folder, then the root.
pub fn select_base<'a>(stored: Option<&'a str>, configured: Option<&'a str>) -> &'a str {
    stored
        .filter(|p| !p.is_empty())
        .or(configured.filter(|p| !p.is_empty()))
        .unwrap_or("/")
}
