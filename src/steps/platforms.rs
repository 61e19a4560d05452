//! Directory naming tables shared by the product parsers

/// Directory keyword -> logical platforms it serves
pub type KeywordTable = Vec<(String, Vec<String>)>;

/// Directory prefix -> platform name
pub type PrefixTable = Vec<(String, String)>;

/// RPM repositories group packages by platform keyword; `el` serves both
/// CentOS and RHEL.
const RPM_PLATFORMS: &[(&str, &[&str])] = &[
    ("el", &["centos", "rhel"]),
    ("sles", &["sles"]),
    ("centos", &["centos"]),
    ("rhel", &["rhel"]),
    ("opensuse", &["opensuse"]),
];

/// Debian-style `dists/` codenames and the distribution they belong to
const DEB_PLATFORMS: &[(&str, &str)] = &[
    ("bionic", "ubuntu"),
    ("bookworm", "debian"),
    ("bullseye", "debian"),
    ("buster", "debian"),
    ("focal", "ubuntu"),
    ("jammy", "ubuntu"),
    ("jessie", "debian"),
    ("noble", "ubuntu"),
    ("stretch", "debian"),
    ("xenial", "ubuntu"),
];

pub fn rpm_platforms() -> KeywordTable {
    RPM_PLATFORMS
        .iter()
        .map(|(keyword, platforms)| {
            (
                keyword.to_string(),
                platforms.iter().map(|p| p.to_string()).collect(),
            )
        })
        .collect()
}

pub fn deb_platforms() -> PrefixTable {
    DEB_PLATFORMS
        .iter()
        .map(|(codename, platform)| (codename.to_string(), platform.to_string()))
        .collect()
}
