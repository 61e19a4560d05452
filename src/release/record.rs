use crate::release::Release;
use crate::DiscoveryError;
use serde::Serialize;

/// A fully resolved release, as handed to configuration generation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ReleaseRecord {
    pub repo: String,
    pub repo_key: String,
    pub platform: String,
    pub platform_version: String,
    pub product: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
}

fn required(value: Option<String>, field: &'static str, url: &str) -> Result<String, DiscoveryError> {
    value.ok_or_else(|| DiscoveryError::IncompleteRelease {
        url: url.to_string(),
        field,
    })
}

impl TryFrom<Release> for ReleaseRecord {
    type Error = DiscoveryError;

    fn try_from(release: Release) -> Result<Self, Self::Error> {
        let url = release.url;
        Ok(Self {
            repo: required(release.repo, "repo", &url)?,
            repo_key: release.repo_key.unwrap_or_default(),
            platform: required(release.platform, "platform", &url)?,
            platform_version: required(release.platform_version, "platform_version", &url)?,
            product: required(release.product, "product", &url)?,
            version: required(release.version, "version", &url)?,
            architecture: release.architecture,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_release() -> Release {
        Release {
            url: "https://repo.example/10.5/rhel/8/".to_string(),
            version: Some("10.5".to_string()),
            platform: Some("rhel".to_string()),
            platform_version: Some("8".to_string()),
            repo: Some("https://repo.example/10.5/rhel/8/".to_string()),
            repo_key: Some("https://repo.example/KEY".to_string()),
            product: Some("mariadb".to_string()),
            ..Release::default()
        }
    }

    #[test]
    fn test_complete_release_converts() {
        let record = ReleaseRecord::try_from(complete_release()).unwrap();
        assert_eq!(record.platform, "rhel");
        assert_eq!(record.repo_key, "https://repo.example/KEY");
    }

    #[test]
    fn test_missing_repo_is_rejected() {
        let mut release = complete_release();
        release.repo = None;
        let error = ReleaseRecord::try_from(release).unwrap_err();
        assert!(matches!(
            error,
            DiscoveryError::IncompleteRelease { field: "repo", .. }
        ));
    }

    #[test]
    fn test_architecture_is_omitted_from_json_when_absent() {
        let record = ReleaseRecord::try_from(complete_release()).unwrap();
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("architecture"));
        assert!(json.contains("\"platform_version\":\"8\""));
    }
}
