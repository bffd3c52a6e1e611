use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ReconError;
use crate::mapping::{identity_pairs, suggest_pairs};
use crate::model::{FileConfig, Mapping, TemplateConfig};
use crate::template::RecoveryOptions;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CompareConfig {
    pub name: String,
    /// Fill targets without explicit mappings with name-based suggestions.
    #[serde(default)]
    pub auto_map: bool,
    /// File #1 is the reference; the rest are targets.
    pub files: Vec<FileConfig>,
    #[serde(default)]
    pub mappings: Vec<Mapping>,
    #[serde(default)]
    pub template: Option<TemplateSettings>,
    #[serde(default)]
    pub recovery: RecoveryOptions,
}

// ---------------------------------------------------------------------------
// Template mode
// ---------------------------------------------------------------------------

/// Template mode: every target inherits the reference file's sheet, header
/// row and columns, and is mapped 1:1 on those columns.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateSettings {
    pub targets: Vec<PathBuf>,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Fully expanded comparison inputs: what the engine actually runs.
#[derive(Debug, Clone)]
pub struct Session {
    pub files: Vec<FileConfig>,
    pub mappings: Vec<Mapping>,
    pub template: Option<TemplateConfig>,
    pub recovery: RecoveryOptions,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl CompareConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: CompareConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a config file. Relative file paths are resolved against
    /// the config file's directory.
    pub fn from_path(path: &Path) -> Result<Self, ReconError> {
        let input = std::fs::read_to_string(path)
            .map_err(|e| ReconError::Io(format!("cannot read {}: {e}", path.display())))?;
        let mut config = Self::from_toml(&input)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        config.resolve_paths(base_dir);
        Ok(config)
    }

    pub fn resolve_paths(&mut self, base_dir: &Path) {
        for file in &mut self.files {
            if file.path.is_relative() {
                file.path = base_dir.join(&file.path);
            }
        }
        if let Some(template) = &mut self.template {
            for target in &mut template.targets {
                if target.is_relative() {
                    *target = base_dir.join(&*target);
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        self.session().map(|_| ())
    }

    /// Expand template mode and auto-mapping, then check every cross reference.
    pub fn session(&self) -> Result<Session, ReconError> {
        let reference = self.files.first().ok_or_else(|| {
            ReconError::ConfigValidation("at least one file is required".into())
        })?;

        if self.recovery.scan_rows == 0 || self.recovery.scan_cols == 0 {
            return Err(ReconError::ConfigValidation(
                "recovery scan_rows and scan_cols must be at least 1".into(),
            ));
        }
        let ratio = self.recovery.min_match_ratio;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(ReconError::ConfigValidation(format!(
                "recovery min_match_ratio must be in (0, 1], got {ratio}"
            )));
        }

        for file in &self.files {
            if file.columns.is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "file '{}': select at least one column",
                    file.path.display()
                )));
            }
        }

        let (files, mappings, template) = match &self.template {
            Some(settings) => self.expand_template(reference, settings)?,
            None => (self.files.clone(), self.expand_mappings()?, None),
        };

        if files.len() < 2 {
            return Err(ReconError::ConfigValidation(
                "at least 2 files are required".into(),
            ));
        }

        for mapping in &mappings {
            check_mapping(&files, mapping)?;
        }
        if mappings.iter().all(|m| m.pairs.is_empty()) {
            return Err(ReconError::ConfigValidation("map at least one column".into()));
        }

        Ok(Session {
            files,
            mappings,
            template,
            recovery: self.recovery.clone(),
        })
    }

    fn expand_template(
        &self,
        reference: &FileConfig,
        settings: &TemplateSettings,
    ) -> Result<(Vec<FileConfig>, Vec<Mapping>, Option<TemplateConfig>), ReconError> {
        if !self.mappings.is_empty() {
            return Err(ReconError::ConfigValidation(
                "template mode generates mappings; remove [[mappings]]".into(),
            ));
        }
        if self.files.len() > 1 {
            return Err(ReconError::ConfigValidation(
                "template mode takes targets from [template].targets, not [[files]]".into(),
            ));
        }

        let template = TemplateConfig::from_file_config(reference);
        let mut files = vec![reference.clone()];
        files.extend(settings.targets.iter().map(|path| FileConfig {
            path: path.clone(),
            sheet: template.sheet.clone(),
            header_row: template.header_row,
            columns: template.columns.clone(),
        }));

        let mappings = (1..files.len())
            .map(|target| Mapping {
                target,
                pairs: identity_pairs(&template.columns),
            })
            .collect();

        Ok((files, mappings, Some(template)))
    }

    fn expand_mappings(&self) -> Result<Vec<Mapping>, ReconError> {
        let mut mappings = self.mappings.clone();
        for mapping in &mappings {
            if mappings.iter().filter(|m| m.target == mapping.target).count() > 1 {
                return Err(ReconError::ConfigValidation(format!(
                    "target #{} is mapped more than once",
                    mapping.target
                )));
            }
        }

        if self.auto_map {
            let reference = &self.files[0];
            for (target, file) in self.files.iter().enumerate().skip(1) {
                if mappings.iter().any(|m| m.target == target) {
                    continue;
                }
                let pairs = suggest_pairs(&reference.columns, &file.columns);
                if !pairs.is_empty() {
                    mappings.push(Mapping { target, pairs });
                }
            }
        }

        mappings.sort_by_key(|m| m.target);
        Ok(mappings)
    }
}

fn check_mapping(files: &[FileConfig], mapping: &Mapping) -> Result<(), ReconError> {
    if mapping.target == 0 || mapping.target >= files.len() {
        return Err(ReconError::MappingTarget {
            target: mapping.target,
            files: files.len(),
        });
    }
    let reference = &files[0];
    let target = &files[mapping.target];
    for pair in &mapping.pairs {
        if !reference.columns.contains(&pair.reference) {
            return Err(ReconError::UnknownColumn {
                file: reference.display_name(),
                column: pair.reference.clone(),
            });
        }
        if !target.columns.contains(&pair.target) {
            return Err(ReconError::UnknownColumn {
                file: target.display_name(),
                column: pair.target.clone(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
