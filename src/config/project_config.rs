use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::ext::LogPathExt;

const CONFIG_FILE_NAME: &str = "dockhand.yaml";

const DEFAULT_SERVICE: &str = "app";
const DEFAULT_TRACKED_FILES: [&str; 2] = ["requirements.txt", "environment.yml"];
const DEFAULT_DOWNLOAD_SCRIPT: &str = "./download.sh";

fn get_config_file_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Project-level settings from an optional `dockhand.yaml`. Every key has a
/// default, so the file may be absent entirely; a present but malformed
/// file is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
    pub service: String,
    pub track: Vec<String>,
    pub download_script: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            service: DEFAULT_SERVICE.to_string(),
            track: DEFAULT_TRACKED_FILES.iter().map(|s| s.to_string()).collect(),
            download_script: DEFAULT_DOWNLOAD_SCRIPT.to_string(),
        }
    }
}

impl ProjectConfig {
    pub async fn read(root: &Path) -> Result<Self, ProjectConfigError> {
        let path = get_config_file_path(root);
        debug!("Opening config file: {}", path.display_for_log());
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!("No {} found, using defaults", CONFIG_FILE_NAME);
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).context(ReadSnafu {
                    file_path: path.display_for_log(),
                });
            }
        };

        let contents = String::from_utf8(bytes).context(NotUtf8Snafu {
            file_path: path.display_for_log(),
        })?;
        contents.as_str().try_into()
    }

    fn parse_service(top_level: &LinkedHashMap<Yaml, Yaml>) -> String {
        top_level
            .get(&Yaml::Value(Scalar::String(Cow::Borrowed("service"))))
            .and_then(|v| v.as_str())
            .unwrap_or(DEFAULT_SERVICE)
            .to_string()
    }

    fn parse_track(
        top_level: &LinkedHashMap<Yaml, Yaml>,
    ) -> Result<Vec<String>, ProjectConfigError> {
        match top_level.get(&Yaml::Value(Scalar::String(Cow::Borrowed("track")))) {
            None => Ok(DEFAULT_TRACKED_FILES.iter().map(|s| s.to_string()).collect()),
            Some(value) => Ok(value
                .as_sequence()
                .ok_or(ProjectConfigError::TrackNotList)?
                .iter()
                .filter_map(|item| item.as_str().map(|s| s.to_string()))
                .collect()),
        }
    }

    fn parse_download_script(top_level: &LinkedHashMap<Yaml, Yaml>) -> String {
        top_level
            .get(&Yaml::Value(Scalar::String(Cow::Borrowed("download_script"))))
            .and_then(|v| v.as_str())
            .unwrap_or(DEFAULT_DOWNLOAD_SCRIPT)
            .to_string()
    }
}

impl TryFrom<&str> for ProjectConfig {
    type Error = ProjectConfigError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let contents_vec = Yaml::load_from_str(contents)
            .map_err(|e| ProjectConfigError::ParseError { source: e })?;
        let contents = contents_vec
            .get(0)
            .ok_or(ProjectConfigError::MalformedConfig)?;

        let top_level = contents
            .as_mapping()
            .ok_or(ProjectConfigError::TopLevelNotMap)?;

        Ok(ProjectConfig {
            service: Self::parse_service(top_level),
            track: Self::parse_track(top_level)?,
            download_script: Self::parse_download_script(top_level),
        })
    }
}

#[derive(Debug, Snafu)]
pub enum ProjectConfigError {
    #[snafu(display("Failed to read the config file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Config file {} is not valid UTF-8", file_path))]
    NotUtf8Error {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Improperly formatted config file"))]
    MalformedConfig,
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMap,
    #[snafu(display("The 'track' section should be a list of file paths"))]
    TrackNotList,
}
