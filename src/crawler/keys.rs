//! Signing key lookup for finished releases

use crate::config::Credentials;
use crate::crawler::fetcher::LinkSource;
use crate::release::Release;
use crate::url::{go_up, resolve_href, with_optional_auth};
use futures::stream::{self, StreamExt};
use std::collections::{BTreeSet, HashMap};

/// Where the signing key of a release comes from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum KeySource {
    /// The key configured for the repository
    #[default]
    Configured,
    /// A `*.public` file in the build directory `levels_up` above the
    /// release; the configured key when the directory publishes none
    BuildDirectory { levels_up: usize },
}

impl KeySource {
    /// Key URL per build directory, for the releases that still need a key
    ///
    /// Every directory is listed once, at most `workers` at a time.
    pub(crate) async fn lookup(
        &self,
        source: &dyn LinkSource,
        releases: &[Release],
        auth: Option<&Credentials>,
        workers: usize,
    ) -> HashMap<String, String> {
        let Self::BuildDirectory { levels_up } = self else {
            return HashMap::new();
        };

        let directories: BTreeSet<String> = releases
            .iter()
            .filter(|release| release.repo_key.is_none())
            .map(|release| go_up(&release.url, *levels_up))
            .collect();

        stream::iter(directories)
            .map(|directory| async move {
                let key = published_key(source, &directory, auth).await?;
                Some((directory, key))
            })
            .buffer_unordered(workers.max(1))
            .filter_map(|found| async move { found })
            .collect()
            .await
    }

    /// Build directory of a release, if this source reads one
    pub(crate) fn directory(&self, release: &Release) -> Option<String> {
        match self {
            Self::Configured => None,
            Self::BuildDirectory { levels_up } => Some(go_up(&release.url, *levels_up)),
        }
    }
}

async fn published_key(source: &dyn LinkSource, directory: &str, auth: Option<&Credentials>) -> Option<String> {
    let links = match source.fetch_links(directory, auth).await {
        Ok(links) => links,
        Err(e) => {
            tracing::debug!("No build key listing at {}: {}", directory, e);
            return None;
        }
    };
    let key = links.iter().find(|link| link.is_key_file())?;
    Some(with_optional_auth(&resolve_href(directory, &key.href), auth))
}
