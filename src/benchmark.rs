//! Benchmark harness: a stopwatch around skill load operations.

use crate::validation::extract_frontmatter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub task: String,
    pub success: bool,
    pub duration_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub results: Vec<BenchmarkResult>,
}

impl BenchmarkReport {
    pub fn success_rate(&self) -> f64 {
        if self.results.is_empty() {
            return 0.0;
        }
        let succeeded = self.results.iter().filter(|r| r.success).count();
        succeeded as f64 / self.results.len() as f64
    }

    pub fn avg_duration_ms(&self) -> f64 {
        if self.results.is_empty() {
            return 0.0;
        }
        self.results.iter().map(|r| r.duration_ms).sum::<f64>() / self.results.len() as f64
    }

    pub fn max_duration_ms(&self) -> f64 {
        self.results
            .iter()
            .map(|r| r.duration_ms)
            .fold(0.0, f64::max)
    }
}

pub struct BenchmarkRunner {
    skill_root: PathBuf,
}

impl BenchmarkRunner {
    pub fn new(skill_root: &Path) -> Self {
        Self {
            skill_root: skill_root.to_path_buf(),
        }
    }

    pub fn run(&self) -> BenchmarkReport {
        let mut report = BenchmarkReport::default();
        report.results.push(self.timed("skill_load_time", || {
            let content = std::fs::read_to_string(self.skill_root.join("SKILL.md"))?;
            if content.is_empty() {
                return Err("SKILL.md is empty".into());
            }
            Ok(())
        }));
        report.results.push(self.timed("metadata_extraction", || {
            let content = std::fs::read_to_string(self.skill_root.join("SKILL.md"))?;
            let frontmatter =
                extract_frontmatter(&content).ok_or("no YAML frontmatter to extract")?;
            serde_yaml::from_str::<serde_yaml::Value>(frontmatter.trim())?;
            Ok(())
        }));
        report.results.push(self.timed("script_inventory", || {
            let scripts = self.skill_root.join("scripts");
            if !scripts.is_dir() {
                return Ok(()); // scripts are optional
            }
            for entry in std::fs::read_dir(&scripts)? {
                let entry = entry?;
                if entry.file_type()?.is_file() && entry.metadata()?.len() == 0 {
                    return Err(format!(
                        "empty script: {}",
                        entry.file_name().to_string_lossy()
                    )
                    .into());
                }
            }
            Ok(())
        }));
        report
    }

    fn timed<F>(&self, task: &str, f: F) -> BenchmarkResult
    where
        F: FnOnce() -> std::result::Result<(), Box<dyn std::error::Error>>,
    {
        let start = Instant::now();
        let outcome = f();
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        BenchmarkResult {
            task: task.to_string(),
            success: outcome.is_ok(),
            duration_ms,
            error: outcome.err().map(|e| e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_benchmark_complete_skill() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("SKILL.md"),
            "---\nname: demo\n---\n# Demo\n",
        )
        .unwrap();
        fs::create_dir(dir.path().join("scripts")).unwrap();
        fs::write(dir.path().join("scripts/run.py"), "print('hi')\n").unwrap();

        let report = BenchmarkRunner::new(dir.path()).run();
        assert_eq!(report.results.len(), 3);
        assert!((report.success_rate() - 1.0).abs() < f64::EPSILON);
        assert!(report.results.iter().all(|r| r.duration_ms >= 0.0));
    }

    #[test]
    fn test_benchmark_missing_manifest_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let report = BenchmarkRunner::new(dir.path()).run();
        let load = report
            .results
            .iter()
            .find(|r| r.task == "skill_load_time")
            .unwrap();
        assert!(!load.success);
        assert!(load.error.is_some());
        assert!(report.success_rate() < 1.0);
    }

    #[test]
    fn test_benchmark_empty_script_fails_inventory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("SKILL.md"), "---\nname: d\n---\nbody").unwrap();
        fs::create_dir(dir.path().join("scripts")).unwrap();
        fs::write(dir.path().join("scripts/empty.sh"), "").unwrap();

        let report = BenchmarkRunner::new(dir.path()).run();
        let inventory = report
            .results
            .iter()
            .find(|r| r.task == "script_inventory")
            .unwrap();
        assert!(!inventory.success);
    }

    #[test]
    fn test_empty_report_rates() {
        let report = BenchmarkReport::default();
        assert_eq!(report.success_rate(), 0.0);
        assert_eq!(report.avg_duration_ms(), 0.0);
    }
}
