//! Structural validation of a skill bundle.
//!
//! Also the component that supplies the `(path, text)` file list the
//! security engine scans; the engine itself never walks the filesystem.

use crate::error::{Result, VetError};
use crate::rules::ScanFile;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

const SKILL_MANIFEST: &str = "SKILL.md";
const OPTIONAL_DIRS: &[&str] = &["scripts", "references", "assets"];

/// Extensions that are never worth scanning as text.
const SKIP_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "ico", "ttf", "woff", "woff2", "mp3", "mp4", "avi", "mov",
    "zip", "tar", "gz", "bz2", "7z", "rar", "exe", "dll", "so", "dylib", "pyc",
];

/// Directory names that hold vendored or generated content.
const SKIP_DIRS: &[&str] = &[
    ".git",
    ".venv",
    "venv",
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    ".ruff_cache",
    "node_modules",
    ".tox",
    "dist",
    "build",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub message: String,
}

impl CheckResult {
    fn new(name: &str, passed: bool, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub checks: Vec<CheckResult>,
}

impl ValidationReport {
    pub fn passed(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.checks.len() - self.passed()
    }

    pub fn pass_rate(&self) -> f64 {
        if self.checks.is_empty() {
            return 0.0;
        }
        self.passed() as f64 / self.checks.len() as f64
    }

    pub fn passed_all(&self) -> bool {
        self.failed() == 0
    }
}

/// Collect the scannable files of a skill, sorted by path. Binary
/// extensions and vendored directories are filtered here so every consumer
/// sees the same file list.
pub fn collect_files(skill_root: &Path) -> Result<Vec<ScanFile>> {
    if !skill_root.is_dir() {
        return Err(VetError::NotADirectory(skill_root.display().to_string()));
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(skill_root).into_iter().filter_entry(|entry| {
        let name = entry.file_name().to_string_lossy();
        !(entry.file_type().is_dir() && SKIP_DIRS.contains(&name.as_ref()))
    });

    for entry in walker {
        let entry = entry.map_err(|e| VetError::Read {
            path: skill_root.display().to_string(),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let ext = entry
            .path()
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());
        if ext.is_some_and(|e| SKIP_EXTENSIONS.contains(&e.as_str())) {
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(skill_root)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .to_string();
        let bytes = std::fs::read(entry.path()).map_err(|source| VetError::Read {
            path: entry.path().display().to_string(),
            source,
        })?;
        files.push(ScanFile::new(rel, String::from_utf8_lossy(&bytes)));
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    debug!(root = %skill_root.display(), count = files.len(), "collected skill files");
    Ok(files)
}

pub struct SkillValidator<'a> {
    skill_root: &'a Path,
}

impl<'a> SkillValidator<'a> {
    pub fn new(skill_root: &'a Path) -> Self {
        Self { skill_root }
    }

    pub fn validate(&self) -> Result<ValidationReport> {
        if !self.skill_root.is_dir() {
            return Err(VetError::NotADirectory(
                self.skill_root.display().to_string(),
            ));
        }

        let mut report = ValidationReport::default();
        self.check_structure(&mut report);
        self.check_manifest(&mut report)?;
        self.check_scripts(&mut report);
        Ok(report)
    }

    fn check_structure(&self, report: &mut ValidationReport) {
        let manifest = self.skill_root.join(SKILL_MANIFEST);
        report.checks.push(CheckResult::new(
            "required_file_skill_md",
            manifest.is_file(),
            if manifest.is_file() {
                "SKILL.md exists"
            } else {
                "SKILL.md missing"
            },
        ));

        for dir in OPTIONAL_DIRS {
            if self.skill_root.join(dir).is_dir() {
                report.checks.push(CheckResult::new(
                    &format!("optional_dir_{dir}"),
                    true,
                    format!("{dir}/ directory present"),
                ));
            }
        }
    }

    fn check_manifest(&self, report: &mut ValidationReport) -> Result<()> {
        let path = self.skill_root.join(SKILL_MANIFEST);
        if !path.is_file() {
            return Ok(());
        }
        let content = std::fs::read_to_string(&path).map_err(|source| VetError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let frontmatter = extract_frontmatter(&content);
        report.checks.push(CheckResult::new(
            "skill_md_frontmatter",
            frontmatter.is_some(),
            if frontmatter.is_some() {
                "YAML frontmatter present"
            } else {
                "YAML frontmatter missing"
            },
        ));

        if let Some(frontmatter) = frontmatter {
            match serde_yaml::from_str::<serde_yaml::Value>(frontmatter.trim()) {
                Ok(metadata) => {
                    let has_name = metadata.get("name").is_some();
                    report.checks.push(CheckResult::new(
                        "skill_md_name_field",
                        has_name,
                        if has_name {
                            "name field present"
                        } else {
                            "name field missing"
                        },
                    ));

                    let description = metadata.get("description").and_then(|d| d.as_str());
                    report.checks.push(CheckResult::new(
                        "skill_md_description_field",
                        description.is_some(),
                        if description.is_some() {
                            "description field present"
                        } else {
                            "description field missing"
                        },
                    ));

                    if let Some(desc) = description {
                        let quality = desc.len() > 50 && desc.to_lowercase().contains("use when");
                        report.checks.push(CheckResult::new(
                            "skill_md_description_quality",
                            quality,
                            if quality {
                                "Description has triggering guidance"
                            } else {
                                "Description lacks triggering guidance"
                            },
                        ));
                    }
                }
                Err(e) => {
                    report.checks.push(CheckResult::new(
                        "skill_md_yaml_valid",
                        false,
                        format!("Invalid YAML frontmatter: {e}"),
                    ));
                }
            }
        }

        let has_body = content.len() > 200;
        report.checks.push(CheckResult::new(
            "skill_md_body_content",
            has_body,
            if has_body {
                "Body content present"
            } else {
                "Body content too short"
            },
        ));
        Ok(())
    }

    fn check_scripts(&self, report: &mut ValidationReport) {
        let scripts_dir = self.skill_root.join("scripts");
        if !scripts_dir.is_dir() {
            return;
        }
        let Ok(entries) = std::fs::read_dir(&scripts_dir) else {
            return;
        };
        let mut entries: Vec<_> = entries.filter_map(|e| e.ok()).collect();
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            let executable = is_executable(&path);
            report.checks.push(CheckResult::new(
                &format!("script_executable_{name}"),
                executable,
                if executable {
                    format!("{name} is executable")
                } else {
                    format!("{name} not executable")
                },
            ));
        }
    }
}

/// Extract the YAML frontmatter between leading `---` fences.
pub fn extract_frontmatter(content: &str) -> Option<&str> {
    content
        .strip_prefix("---")
        .and_then(|after| after.find("---").map(|end| &after[..end]))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    true
}
