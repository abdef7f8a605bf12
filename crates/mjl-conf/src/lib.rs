use std::path::Path;

use config::Config;
use config::ConfigError as ExternalConfigError;
use config::File;
use config::FileFormat;
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration build/deserialize error")]
    Config(#[from] ExternalConfigError),
}

/// Validator settings, layered from user and project configuration files.
///
/// Sources in increasing precedence: the user-level `mjl.toml` (in the
/// platform config directory), the project's `.mjl.toml`, then the
/// project's `mjl.toml`. Every field has a default, so all files are
/// optional.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Documents larger than this many bytes are skipped with a notice.
    pub max_document_bytes: usize,
    pub diagnostics: DiagnosticsSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_document_bytes: 1_048_576,
            diagnostics: DiagnosticsSettings::default(),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DiagnosticsSettings {
    pub show_warnings: bool,
    pub show_hints: bool,
}

impl Default for DiagnosticsSettings {
    fn default() -> Self {
        Self {
            show_warnings: true,
            show_hints: true,
        }
    }
}

impl Settings {
    pub fn new(project_root: &Path) -> Result<Self, ConfigError> {
        let user_config_file = ProjectDirs::from("com.github", "mjl-tools", "mjl")
            .map(|proj_dirs| proj_dirs.config_dir().join("mjl.toml"));

        Self::load_from_paths(project_root, user_config_file.as_deref())
    }

    fn load_from_paths(
        project_root: &Path,
        user_config_path: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = user_config_path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        builder = builder.add_source(
            File::from(project_root.join(".mjl.toml"))
                .format(FileFormat::Toml)
                .required(false),
        );

        builder = builder.add_source(
            File::from(project_root.join("mjl.toml"))
                .format(FileFormat::Toml)
                .required(false),
        );

        let config = builder.build()?;
        let settings = config.try_deserialize()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    mod defaults {
        use super::*;

        #[test]
        fn test_load_no_files() {
            let dir = tempdir().unwrap();
            let settings = Settings::new(dir.path()).unwrap();
            assert_eq!(settings, Settings::default());
            assert_eq!(settings.max_document_bytes, 1_048_576);
            assert!(settings.diagnostics.show_warnings);
            assert!(settings.diagnostics.show_hints);
        }
    }

    mod project_files {
        use super::*;

        #[test]
        fn test_load_mjl_toml_only() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join("mjl.toml"), "max_document_bytes = 2048").unwrap();
            let settings = Settings::new(dir.path()).unwrap();
            assert_eq!(settings.max_document_bytes, 2048);
        }

        #[test]
        fn test_load_dot_mjl_toml_only() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join(".mjl.toml"), "max_document_bytes = 2048").unwrap();
            let settings = Settings::new(dir.path()).unwrap();
            assert_eq!(settings.max_document_bytes, 2048);
        }

        #[test]
        fn test_load_nested_diagnostics_table() {
            let dir = tempdir().unwrap();
            let content = "[diagnostics]\nshow_warnings = false\n";
            fs::write(dir.path().join("mjl.toml"), content).unwrap();
            let settings = Settings::new(dir.path()).unwrap();
            assert!(!settings.diagnostics.show_warnings);
            assert!(settings.diagnostics.show_hints, "untouched field keeps its default");
        }
    }

    mod priority {
        use super::*;

        #[test]
        fn test_project_priority_mjl_overrides_dot_mjl() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join(".mjl.toml"), "max_document_bytes = 1").unwrap();
            fs::write(dir.path().join("mjl.toml"), "max_document_bytes = 2").unwrap();
            let settings = Settings::new(dir.path()).unwrap();
            assert_eq!(settings.max_document_bytes, 2);
        }

        #[test]
        fn test_user_priority_project_overrides_user() {
            let user_dir = tempdir().unwrap();
            let project_dir = tempdir().unwrap();
            let user_conf_path = user_dir.path().join("config.toml");
            fs::write(&user_conf_path, "max_document_bytes = 1").unwrap();
            fs::write(project_dir.path().join("mjl.toml"), "max_document_bytes = 2").unwrap();

            let settings =
                Settings::load_from_paths(project_dir.path(), Some(&user_conf_path)).unwrap();
            assert_eq!(settings.max_document_bytes, 2);
        }
    }

    mod user_config {
        use super::*;

        #[test]
        fn test_load_user_config_only() {
            let user_dir = tempdir().unwrap();
            let project_dir = tempdir().unwrap();
            let user_conf_path = user_dir.path().join("config.toml");
            fs::write(&user_conf_path, "[diagnostics]\nshow_hints = false").unwrap();

            let settings =
                Settings::load_from_paths(project_dir.path(), Some(&user_conf_path)).unwrap();
            assert!(!settings.diagnostics.show_hints);
        }

        #[test]
        fn test_no_user_config_file_present() {
            let user_dir = tempdir().unwrap();
            let project_dir = tempdir().unwrap();
            let user_conf_path = user_dir.path().join("config.toml");
            fs::write(project_dir.path().join("mjl.toml"), "max_document_bytes = 2").unwrap();

            let settings =
                Settings::load_from_paths(project_dir.path(), Some(&user_conf_path)).unwrap();
            assert_eq!(settings.max_document_bytes, 2);
        }

        #[test]
        fn test_user_config_path_not_provided() {
            let project_dir = tempdir().unwrap();
            fs::write(project_dir.path().join("mjl.toml"), "max_document_bytes = 2").unwrap();

            let settings = Settings::load_from_paths(project_dir.path(), None).unwrap();
            assert_eq!(settings.max_document_bytes, 2);
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn test_invalid_toml_content() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join("mjl.toml"), "max_document_bytes = not_a_number").unwrap();
            let result = Settings::new(dir.path());
            assert!(result.is_err());
            assert!(matches!(result.unwrap_err(), ConfigError::Config(_)));
        }
    }
}
