use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::ThingsError;

pub const SYNC_TOOL: &str = "openneuro-py";

/// Research-data-repository backend: retrieval is delegated to an external
/// dataset-sync tool invoked as a subprocess.
pub trait ExternalToolClient: Send + Sync {
    fn sync_dataset(
        &self,
        dataset_id: &str,
        include: &[String],
        target_dir: &Path,
    ) -> Result<(), ThingsError>;
}

#[derive(Clone)]
pub struct OpenNeuroCliClient {
    tool: Option<PathBuf>,
}

impl OpenNeuroCliClient {
    pub fn new() -> Self {
        Self {
            tool: find_in_path(SYNC_TOOL),
        }
    }

    fn require_tool(&self) -> Result<&PathBuf, ThingsError> {
        self.tool
            .as_ref()
            .ok_or_else(|| ThingsError::MissingTool(SYNC_TOOL.to_string()))
    }

    fn run_cmd(&self, program: &Path, args: &[String]) -> Result<(), ThingsError> {
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|err| ThingsError::ExternalTool(err.to_string()))?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() {
            format!("command failed: {}", program.display())
        } else {
            stderr
        };
        Err(ThingsError::ExternalTool(message))
    }
}

impl ExternalToolClient for OpenNeuroCliClient {
    fn sync_dataset(
        &self,
        dataset_id: &str,
        include: &[String],
        target_dir: &Path,
    ) -> Result<(), ThingsError> {
        let tool = self.require_tool()?;
        fs::create_dir_all(target_dir).map_err(|err| ThingsError::Filesystem(err.to_string()))?;

        let args = sync_args(dataset_id, include, target_dir);
        self.run_cmd(tool.as_path(), &args)?;

        if dir_is_empty(target_dir)? {
            return Err(ThingsError::ExternalTool(format!(
                "no files were downloaded for dataset {dataset_id}"
            )));
        }
        Ok(())
    }
}

/// `download --dataset=<id> --target-dir=<dir>` plus one `--include` per
/// filter pattern.
pub fn sync_args(dataset_id: &str, include: &[String], target_dir: &Path) -> Vec<String> {
    let mut args = vec![
        "download".to_string(),
        format!("--dataset={dataset_id}"),
        format!("--target-dir={}", target_dir.display()),
    ];
    for pattern in include {
        args.push(format!("--include={pattern}"));
    }
    args
}

/// Dataset identifier: the url's last path segment.
pub fn dataset_id_from_url(url: &str) -> &str {
    url.trim_end_matches('/').rsplit('/').next().unwrap_or(url)
}

fn dir_is_empty(dir: &Path) -> Result<bool, ThingsError> {
    let mut entries =
        fs::read_dir(dir).map_err(|err| ThingsError::Filesystem(err.to_string()))?;
    Ok(entries.next().is_none())
}

fn find_in_path(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for path in std::env::split_paths(&path_var) {
        let exe = path.join(format!("{name}.exe"));
        if exe.exists() {
            return Some(exe);
        }
        let plain = path.join(name);
        if plain.exists() {
            return Some(plain);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_id_is_last_segment() {
        assert_eq!(
            dataset_id_from_url("https://openneuro.org/datasets/ds004192"),
            "ds004192"
        );
        assert_eq!(
            dataset_id_from_url("https://openneuro.org/datasets/ds004192/"),
            "ds004192"
        );
    }

    #[test]
    fn sync_args_shape() {
        let include = vec!["sub-01/*".to_string(), "participants.tsv".to_string()];
        let args = sync_args("ds004192", &include, Path::new("/tmp/target"));
        assert_eq!(
            args,
            vec![
                "download",
                "--dataset=ds004192",
                "--target-dir=/tmp/target",
                "--include=sub-01/*",
                "--include=participants.tsv",
            ]
        );
    }

    #[test]
    fn sync_args_without_filters() {
        let args = sync_args("ds004192", &[], Path::new("/tmp/target"));
        assert_eq!(args.len(), 3);
    }
}
