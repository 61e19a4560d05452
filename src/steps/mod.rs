//! Step primitives of the crawl pipeline
//!
//! A step looks at one release and the directory links found at its URL and
//! proposes the next releases as [`Fragment`]s. Each variant of [`Step`]
//! encodes one directory naming convention; product parsers combine them
//! into an ordered list. Steps never perform I/O.

mod finalize;
pub mod platforms;

pub use finalize::{RepoFormat, RepoLayout};
pub use platforms::{KeywordTable, PrefixTable};

use crate::crawler::Link;
use crate::release::{Field, Fragment, Release};
use crate::ConfigError;
use regex::Regex;

/// One stage of the crawl pipeline
#[derive(Debug, Clone)]
pub enum Step {
    /// Every directory becomes a branch; its name is stored in `field`
    SaveAsField { field: Field, save_path: bool },

    /// Branches into each expected directory that is actually listed
    AppendUrl {
        paths: Vec<String>,
        field: Option<Field>,
        save_path: bool,
    },

    /// Branches into every platform a listed keyword directory serves
    SplitPlatforms { table: KeywordTable },

    /// Branches into directories whose name matches `pattern`, storing the
    /// first capture group in `field`
    ExtractField {
        field: Field,
        pattern: Regex,
        save_path: bool,
    },

    /// Branches into `dists/<codename>` directories
    ExtractDebPlatforms { table: PrefixTable },

    /// Descends into every directory, appending its name to the release's
    /// version path
    AppendToField,

    /// Descends into `path` when listed, otherwise stays in place
    AppendPathIfExists { path: String },

    /// Builds the repository reference of a fully crawled release
    Finalize(RepoFormat),
}

impl Step {
    pub fn save_as_field(field: Field) -> Self {
        Self::SaveAsField {
            field,
            save_path: false,
        }
    }

    /// Like [`Step::save_as_field`], also remembering the directory as `repo_url`
    pub fn save_as_field_with_path(field: Field) -> Self {
        Self::SaveAsField {
            field,
            save_path: true,
        }
    }

    pub fn append_url(paths: &[&str]) -> Self {
        Self::AppendUrl {
            paths: paths.iter().map(|p| p.to_string()).collect(),
            field: None,
            save_path: false,
        }
    }

    pub fn append_url_with(paths: &[&str], field: Option<Field>, save_path: bool) -> Self {
        Self::AppendUrl {
            paths: paths.iter().map(|p| p.to_string()).collect(),
            field,
            save_path,
        }
    }

    pub fn split_rpm_platforms() -> Self {
        Self::SplitPlatforms {
            table: platforms::rpm_platforms(),
        }
    }

    pub fn extract_field(field: Field, pattern: &str) -> Result<Self, ConfigError> {
        Self::build_extract_field(field, pattern, false)
    }

    pub fn extract_field_with_path(field: Field, pattern: &str) -> Result<Self, ConfigError> {
        Self::build_extract_field(field, pattern, true)
    }

    fn build_extract_field(field: Field, pattern: &str, save_path: bool) -> Result<Self, ConfigError> {
        let pattern = Regex::new(pattern)
            .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))?;
        Ok(Self::ExtractField {
            field,
            pattern,
            save_path,
        })
    }

    pub fn extract_deb_platforms() -> Self {
        Self::ExtractDebPlatforms {
            table: platforms::deb_platforms(),
        }
    }

    pub fn append_path_if_exists(path: &str) -> Self {
        Self::AppendPathIfExists {
            path: path.to_string(),
        }
    }

    pub fn finalize(format: RepoFormat) -> Self {
        Self::Finalize(format)
    }

    /// Applies the step to a release and the directory links at its URL
    pub fn apply(&self, release: &Release, links: &[Link]) -> Vec<Fragment> {
        match self {
            Self::SaveAsField { field, save_path } => links
                .iter()
                .map(|link| {
                    let fragment = Fragment::at_link(link).with(*field, link.full_name());
                    remember_link(fragment, release, link, *save_path)
                })
                .collect(),

            Self::AppendUrl {
                paths,
                field,
                save_path,
            } => {
                let names = link_names(links);
                paths
                    .iter()
                    .filter(|path| names.contains(path))
                    .map(|path| {
                        let mut fragment = Fragment::at_url(format!("{}{}/", release.url, path));
                        if *save_path {
                            fragment = fragment.with(Field::RepoUrl, format!("{}{}", release.url, path));
                        }
                        if let Some(field) = field {
                            fragment = fragment.with(*field, path.clone());
                        }
                        fragment
                    })
                    .collect()
            }

            Self::SplitPlatforms { table } => {
                let names = link_names(links);
                table
                    .iter()
                    .filter(|(keyword, _)| names.contains(keyword))
                    .flat_map(|(keyword, platforms)| {
                        let url = format!("{}{}/", release.url, keyword);
                        platforms.iter().map(move |platform| {
                            Fragment::at_url(url.clone()).with(Field::Platform, platform.clone())
                        })
                    })
                    .collect()
            }

            Self::ExtractField {
                field,
                pattern,
                save_path,
            } => links
                .iter()
                .filter_map(|link| {
                    let captures = pattern.captures(link.content.trim())?;
                    let value = captures.get(1).or_else(|| captures.get(0))?.as_str();
                    let fragment = Fragment::at_link(link).with(*field, value);
                    Some(remember_link(fragment, release, link, *save_path))
                })
                .collect(),

            Self::ExtractDebPlatforms { table } => link_names(links)
                .into_iter()
                .filter_map(|name| {
                    let (_, platform) = table.iter().find(|(codename, _)| name.starts_with(codename.as_str()))?;
                    Some(
                        Fragment::at_url(format!("{}{}/", release.url, name))
                            .with(Field::Platform, platform.clone())
                            .with(Field::PlatformVersion, name),
                    )
                })
                .collect(),

            Self::AppendToField => links
                .iter()
                .map(|link| {
                    let mut path = release.version_path.clone();
                    path.push(link.name());
                    Fragment::at_link(link).with_version_path(path)
                })
                .collect(),

            Self::AppendPathIfExists { path } => {
                if link_names(links).contains(path) {
                    vec![Fragment::at_url(format!("{}{}/", release.url, path))]
                } else {
                    vec![Fragment::stay()]
                }
            }

            Self::Finalize(format) => format.apply(release).into_iter().collect(),
        }
    }
}

fn link_names(links: &[Link]) -> Vec<String> {
    links.iter().map(Link::name).collect()
}

fn remember_link(fragment: Fragment, release: &Release, link: &Link, save_path: bool) -> Fragment {
    if save_path {
        fragment.with(Field::RepoUrl, crate::url::resolve_href(&release.url, &link.href))
    } else {
        fragment
    }
}

/// Decides whether a recursive step has reached its target level
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// At least one of the marker directories is listed
    AnyDir(Vec<String>),
}

impl Completion {
    pub fn any_dir(names: &[&str]) -> Self {
        Self::AnyDir(names.iter().map(|n| n.to_string()).collect())
    }

    pub fn is_complete(&self, links: &[Link]) -> bool {
        match self {
            Self::AnyDir(names) => links.iter().any(|link| names.contains(&link.name())),
        }
    }
}

/// A step of the recursive pipeline, repeated until its completion
/// predicate holds
#[derive(Debug, Clone)]
pub struct PipelineStep {
    pub step: Step,
    pub complete_when: Option<Completion>,
}

impl PipelineStep {
    /// A step applied exactly once
    pub fn once(step: Step) -> Self {
        Self {
            step,
            complete_when: None,
        }
    }

    /// A step repeated level after level until `completion` holds
    pub fn until(step: Step, completion: Completion) -> Self {
        Self {
            step,
            complete_when: Some(completion),
        }
    }
}

impl From<Step> for PipelineStep {
    fn from(step: Step) -> Self {
        Self::once(step)
    }
}
