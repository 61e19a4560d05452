use url::Url;

/// Collapses runs of slashes in a URL, keeping the one after the scheme
///
/// A run of slashes preceded by `:` is left untouched, so `https://` survives
/// while every other `//` becomes `/`.
///
/// # Examples
///
/// ```
/// use repo_discovery::url::collapse_slashes;
///
/// assert_eq!(
///     collapse_slashes("https://repo.example//mariadb///10.5/"),
///     "https://repo.example/mariadb/10.5/"
/// );
/// ```
pub fn collapse_slashes(url: &str) -> String {
    let mut result = String::with_capacity(url.len());
    let mut previous: Option<char> = None;
    let mut run_follows_colon = false;

    for c in url.chars() {
        if c == '/' {
            if previous == Some('/') {
                if !run_follows_colon {
                    continue;
                }
            } else {
                run_follows_colon = previous == Some(':');
            }
        }
        result.push(c);
        previous = Some(c);
    }

    result
}

/// Appends a `/` unless the URL already ends with one
pub fn ensure_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

/// Resolves a link target against the directory URL it was found on
///
/// Relative targets are appended to the directory, root-relative and absolute
/// targets replace the path. Falls back to plain concatenation when the base
/// cannot be parsed.
pub fn resolve_href(base: &str, href: &str) -> String {
    match Url::parse(base).and_then(|base_url| base_url.join(href)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => format!("{}{}", base, href),
    }
}

/// Returns the URL obtained by dropping the last `levels` path segments
///
/// The result always ends with `/`.
///
/// # Examples
///
/// ```
/// use repo_discovery::url::go_up;
///
/// assert_eq!(
///     go_up("https://repo.example/10.5/apt/dists/focal/", 2),
///     "https://repo.example/10.5/apt/"
/// );
/// ```
pub fn go_up(url: &str, levels: usize) -> String {
    let mut segments: Vec<&str> = url.trim_end_matches('/').split('/').collect();
    let keep = segments.len().saturating_sub(levels);
    segments.truncate(keep);
    ensure_trailing_slash(&segments.join("/"))
}
