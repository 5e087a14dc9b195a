//! Filesystem-backed rule loading.
//!
//! Scans a directory (recursively) for `*.yml` / `*.yaml` files, each
//! holding a YAML list of rule specs, and compiles them into [`Rule`]s.
//! Parse errors are reported per-file but never abort the scan; a rule
//! with an uncompilable condition loads as inert (see [`Rule::compile`]).

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::schema::{Rule, RuleSpec};

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, RuleError>;

/// Outcome of loading a single rule file.
#[derive(Debug)]
pub struct LoadResult {
    pub path: PathBuf,
    pub status: LoadStatus,
}

#[derive(Debug)]
pub enum LoadStatus {
    Loaded { count: usize },
    /// File was skipped (dotfile, non-YAML, etc.).
    Skipped { reason: String },
    /// Parse error occurred; the file contributed no rules.
    Failed { error: String },
}

/// Directory-backed rule loader.
pub struct RuleLoader {
    rules_dir: PathBuf,
}

impl RuleLoader {
    pub fn new(rules_dir: PathBuf) -> Self {
        Self { rules_dir }
    }

    pub fn rules_dir(&self) -> &Path {
        &self.rules_dir
    }

    /// Scan the rules directory and compile every rule found.
    ///
    /// Files are visited in sorted path order so the rule sequence — and
    /// therefore violation ordering — is deterministic across runs.
    pub fn load_all(&self) -> Result<(Vec<Rule>, Vec<LoadResult>)> {
        let mut rules = Vec::new();
        let mut results = Vec::new();
        self.scan_dir_recursive(&self.rules_dir, &mut rules, &mut results)?;

        info!(
            rules = rules.len(),
            files = results.len(),
            path = %self.rules_dir.display(),
            "loaded rule set"
        );
        Ok((rules, results))
    }

    fn scan_dir_recursive(
        &self,
        dir: &Path,
        rules: &mut Vec<Rule>,
        results: &mut Vec<LoadResult>,
    ) -> Result<()> {
        let entries = match fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "failed to read rules directory");
                return Ok(());
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .collect();
        paths.sort();

        for path in paths {
            // Skip dotfiles/dotdirs
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    if path.is_file() {
                        results.push(LoadResult {
                            path,
                            status: LoadStatus::Skipped {
                                reason: "dotfile".to_string(),
                            },
                        });
                    }
                    continue;
                }
            }

            if path.is_dir() {
                self.scan_dir_recursive(&path, rules, results)?;
                continue;
            }

            let is_yaml = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e == "yml" || e == "yaml")
                .unwrap_or(false);
            if !is_yaml {
                results.push(LoadResult {
                    path,
                    status: LoadStatus::Skipped {
                        reason: "not a YAML file".to_string(),
                    },
                });
                continue;
            }

            match Self::load_file(&path) {
                Ok(file_rules) => {
                    info!(count = file_rules.len(), path = %path.display(), "loaded rule file");
                    results.push(LoadResult {
                        path,
                        status: LoadStatus::Loaded {
                            count: file_rules.len(),
                        },
                    });
                    rules.extend(file_rules);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load rule file");
                    results.push(LoadResult {
                        path,
                        status: LoadStatus::Failed {
                            error: e.to_string(),
                        },
                    });
                }
            }
        }

        Ok(())
    }

    /// Parse a single YAML file holding a list of rule specs.
    pub fn load_file(path: &Path) -> Result<Vec<Rule>> {
        let contents = fs::read_to_string(path)?;
        let specs: Vec<RuleSpec> = serde_yaml::from_str(&contents)?;
        Ok(specs.into_iter().map(Rule::compile).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Condition;
    use tempfile::TempDir;

    const VALID_RULES_YAML: &str = r#"
- id: large-donation
  message: Donation exceeds the individual limit
  condition: "transactionAmount > 2700"
- id: watch-state
  message: Donor from a watched state
  condition: "state in ['XX']"
"#;

    fn temp_loader() -> (TempDir, RuleLoader) {
        let dir = TempDir::new().expect("create tempdir");
        let loader = RuleLoader::new(dir.path().to_path_buf());
        (dir, loader)
    }

    #[test]
    fn load_rules_from_file() {
        let (dir, loader) = temp_loader();
        fs::write(dir.path().join("rules.yml"), VALID_RULES_YAML).unwrap();

        let (rules, results) = loader.load_all().unwrap();

        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].id, "large-donation");
        assert!(matches!(rules[0].condition, Condition::Ready(_)));
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0].status, LoadStatus::Loaded { count: 2 }));
    }

    #[test]
    fn load_all_skips_dotfiles_and_non_yaml() {
        let (dir, loader) = temp_loader();
        fs::write(dir.path().join("rules.yml"), VALID_RULES_YAML).unwrap();
        fs::write(dir.path().join(".hidden.yml"), VALID_RULES_YAML).unwrap();
        fs::write(dir.path().join("readme.txt"), "not rules").unwrap();

        let (rules, results) = loader.load_all().unwrap();

        assert_eq!(rules.len(), 2);
        let skipped = results
            .iter()
            .filter(|r| matches!(r.status, LoadStatus::Skipped { .. }))
            .count();
        assert_eq!(skipped, 2);
    }

    #[test]
    fn unparseable_file_fails_without_aborting_scan() {
        let (dir, loader) = temp_loader();
        // Valid YAML scalar, but not a list of rule specs.
        fs::write(dir.path().join("a-broken.yml"), "just a string").unwrap();
        fs::write(dir.path().join("b-good.yml"), VALID_RULES_YAML).unwrap();

        let (rules, results) = loader.load_all().unwrap();

        assert_eq!(rules.len(), 2);
        assert!(matches!(results[0].status, LoadStatus::Failed { .. }));
        assert!(matches!(results[1].status, LoadStatus::Loaded { .. }));
    }

    #[test]
    fn bad_condition_loads_as_inert_rule() {
        let (dir, loader) = temp_loader();
        fs::write(
            dir.path().join("rules.yml"),
            "- id: broken\n  condition: \"((( nope\"\n",
        )
        .unwrap();

        let (rules, _) = loader.load_all().unwrap();

        assert_eq!(rules.len(), 1);
        assert!(matches!(rules[0].condition, Condition::Invalid { .. }));
    }

    #[test]
    fn subdirectories_are_scanned() {
        let (dir, loader) = temp_loader();
        let sub = dir.path().join("state-rules");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("rules.yaml"), VALID_RULES_YAML).unwrap();

        let (rules, _) = loader.load_all().unwrap();
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn missing_directory_yields_empty_set() {
        let loader = RuleLoader::new(PathBuf::from("/definitely/not/here"));
        let (rules, results) = loader.load_all().unwrap();
        assert!(rules.is_empty());
        assert!(results.is_empty());
    }
}
