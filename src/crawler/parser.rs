//! HTML parser for directory listing pages
//!
//! Repository mirrors serve autoindex-style pages (Apache, nginx, Artifactory,
//! S3 browsers) whose only reliable structure is a list of `<a>` elements.
//! Everything here is tolerant: a page that does not parse as HTML simply
//! yields no anchors.

use scraper::{Html, Selector};

/// An anchor extracted from a listing page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link {
    /// The raw `href` attribute (empty when missing)
    pub href: String,
    /// The anchor's display text
    pub content: String,
}

impl Link {
    pub fn new(content: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            content: content.into(),
        }
    }

    /// Display text with every `/` removed, as used for directory names
    pub fn name(&self) -> String {
        self.content.replace('/', "").trim().to_string()
    }

    /// Directory name as stored in a release field
    ///
    /// nginx shortens long names in the display text (`mariadb-10.5.8-rc..>`);
    /// the last href segment still carries the full name then.
    pub fn full_name(&self) -> String {
        let name = self.name();
        if !name.ends_with("..>") {
            return name;
        }
        let href = self.href.trim_end_matches('/');
        href.rsplit('/').next().unwrap_or(href).to_string()
    }

    /// Whether the link points back to the parent directory
    pub fn is_parent(&self) -> bool {
        self.href == "../"
    }

    /// Whether the link looks like a sub-directory entry
    ///
    /// Either the display text ends with `/`, or the href ends with `/` and
    /// is a plain relative path (not absolute, not `..`, not rooted at `/`,
    /// not a `?` query such as the column sorting links of autoindex pages).
    pub fn is_directory(&self) -> bool {
        self.content.trim_end().ends_with('/') || (self.href.ends_with('/') && is_plain_relative(&self.href))
    }

    /// Whether the link is a published signing key such as
    /// `MariaDB-10.6-build-GPG-KEY.public`
    pub fn is_key_file(&self) -> bool {
        self.href.ends_with("public") && is_plain_relative(&self.href)
    }
}

fn is_plain_relative(href: &str) -> bool {
    !href.starts_with("http://")
        && !href.starts_with("https://")
        && !href.starts_with("..")
        && !href.starts_with('/')
        && !href.starts_with('?')
}

/// Extracts every anchor of an HTML document
///
/// # Example
///
/// ```
/// use repo_discovery::crawler::parse_links;
///
/// let html = r#"<html><body><a href="../">../</a><a href="10.5/">10.5/</a></body></html>"#;
/// let links = parse_links(html);
/// assert_eq!(links.len(), 2);
/// assert_eq!(links[1].name(), "10.5");
/// ```
pub fn parse_links(html: &str) -> Vec<Link> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .map(|element| Link {
            href: element.value().attr("href").unwrap_or_default().to_string(),
            content: element.text().collect::<String>(),
        })
        .collect()
}

/// Keeps the sub-directory links of a listing, dropping the parent link
pub fn directory_links(links: Vec<Link>) -> Vec<Link> {
    links
        .into_iter()
        .filter(|link| link.is_directory() && !link.is_parent())
        .collect()
}

/// Concatenated markup of every anchor on the page
///
/// Package verification searches this text for package file names, so it
/// covers both the href and the display text of each entry.
pub fn anchor_markup(html: &str) -> String {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a") else {
        return String::new();
    };

    document
        .select(&selector)
        .map(|element| element.html())
        .collect::<Vec<_>>()
        .join("")
}
