use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::SyncError;

/// Target languages with a published Cloud Build GAPIC layout.
/// Names are the exact lowercase keys `go`, `java`, `php` and `python`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Language {
    Go,
    Java,
    Php,
    Python,
}

/// Static naming record for one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageProfile {
    /// `{service}` and `{version}` are substituted.
    pub directory_template: &'static str,
    /// Language argument handed to the generator.
    pub generator_language: &'static str,
    /// Where merged protos land, relative to the artifact directory.
    pub proto_template: &'static str,
}

const GO: LanguageProfile = LanguageProfile {
    directory_template: "gapi-cloud-{service}-{version}-go",
    generator_language: "go",
    proto_template: "protos",
};

const JAVA: LanguageProfile = LanguageProfile {
    directory_template: "google-cloud-{service}-{version}-java",
    generator_language: "java",
    proto_template: "protos",
};

const PHP: LanguageProfile = LanguageProfile {
    directory_template: "google-cloud-{service}-{version}-php",
    generator_language: "php",
    proto_template: "protos",
};

// Python keeps protos beside the generated *_pb2.py modules.
const PYTHON: LanguageProfile = LanguageProfile {
    directory_template: "google-cloud-{service}-{version}-python",
    generator_language: "python",
    proto_template: "google/cloud/{service}_{version}/proto",
};

impl Language {
    pub const ALL: [Language; 4] = [Language::Go, Language::Java, Language::Php, Language::Python];

    pub fn profile(self) -> &'static LanguageProfile {
        match self {
            Language::Go => &GO,
            Language::Java => &JAVA,
            Language::Php => &PHP,
            Language::Python => &PYTHON,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Language::Go => "go",
            Language::Java => "java",
            Language::Php => "php",
            Language::Python => "python",
        }
    }

    /// Name of the generated directory in the artifact bucket.
    pub fn directory_name(self, service: &str, version: &str) -> String {
        fill(self.profile().directory_template, service, version)
    }

    /// Proto output directory, relative to the artifact directory.
    pub fn proto_subdir(self, service: &str, version: &str) -> PathBuf {
        PathBuf::from(fill(self.profile().proto_template, service, version))
    }
}

fn fill(template: &str, service: &str, version: &str) -> String {
    template
        .replace("{service}", service)
        .replace("{version}", version)
}

impl FromStr for Language {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "go" => Ok(Language::Go),
            "java" => Ok(Language::Java),
            "php" => Ok(Language::Php),
            "python" => Ok(Language::Python),
            _ => Err(SyncError::UnsupportedLanguage(s.to_string())),
        }
    }
}

impl TryFrom<String> for Language {
    type Error = SyncError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
