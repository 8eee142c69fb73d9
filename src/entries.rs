// The fixed set of configuration files to push, embedded at compile time.
// Repository layout: config/env{profile}/{application}.properties, with
// profiles test/beta/pro and applications GlobalConfig and project1-v1.
// The Config Server resolves {application}/{profile} requests against these
// paths, so the slice order below is also the push order.

/// One repository file: relative path plus its literal text content.
pub struct ConfigEntry {
    pub path: &'static str,
    pub content: &'static str,
}

pub const CONFIG_FILES: &[ConfigEntry] = &[
    ConfigEntry {
        path: "config/envtest/GlobalConfig.properties",
        content: include_str!("../data/envtest/GlobalConfig.properties"),
    },
    ConfigEntry {
        path: "config/envtest/project1-v1.properties",
        content: include_str!("../data/envtest/project1-v1.properties"),
    },
    ConfigEntry {
        path: "config/envbeta/GlobalConfig.properties",
        content: include_str!("../data/envbeta/GlobalConfig.properties"),
    },
    ConfigEntry {
        path: "config/envbeta/project1-v1.properties",
        content: include_str!("../data/envbeta/project1-v1.properties"),
    },
    ConfigEntry {
        path: "config/envpro/GlobalConfig.properties",
        content: include_str!("../data/envpro/GlobalConfig.properties"),
    },
    ConfigEntry {
        path: "config/envpro/project1-v1.properties",
        content: include_str!("../data/envpro/project1-v1.properties"),
    },
];
