//! Durable local store for the current visitor's session
//!
//! Three logical keys back the whole tracker: the current identity, the
//! current project, and the project history. Values are plain JSON so the
//! store can be inspected and migrated without tooling. Read faults are
//! treated as absence and write faults are reported to the caller, who is
//! expected to log and continue with the in-memory value; the next
//! successful write self-heals.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

use crate::identity::Identity;
use crate::project::Project;

const IDENTITY_FILE_NAME: &str = "identity.json";
const PROJECT_FILE_NAME: &str = "project.json";
const HISTORY_FILE_NAME: &str = "projects.jsonl";
const ACTIVITY_FILE_NAME: &str = "activity.jsonl";
const APP_NAME: &str = "sitequote";

/// File-backed key-value store scoped to one visitor.
#[derive(Debug, Clone)]
pub struct SessionStore {
    base_dir: PathBuf,
}

impl SessionStore {
    pub fn new(base_dir: PathBuf) -> Self {
        let base_dir = if base_dir.as_os_str().is_empty() {
            default_base_dir()
        } else {
            base_dir
        };
        Self { base_dir }
    }

    /// Open the store at the platform default location
    /// (XDG state dir, `data_local_dir` fallback).
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(default_base_dir()))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub(crate) fn activity_log_path(&self) -> PathBuf {
        self.base_dir.join(ACTIVITY_FILE_NAME)
    }

    pub fn load_identity(&self) -> Option<Identity> {
        self.read_json(IDENTITY_FILE_NAME)
    }

    pub fn save_identity(&self, identity: &Identity) -> Result<()> {
        self.write_json(IDENTITY_FILE_NAME, identity)
    }

    pub fn load_project(&self) -> Option<Project> {
        self.read_json(PROJECT_FILE_NAME)
    }

    pub fn save_project(&self, project: &Project) -> Result<()> {
        self.write_json(PROJECT_FILE_NAME, project)
    }

    /// Drop the current-project key, leaving identity and history intact.
    pub fn clear_current_project(&self) -> Result<()> {
        remove_if_exists(&self.base_dir.join(PROJECT_FILE_NAME))
    }

    /// Load the full project history. Corrupt lines are skipped, never fatal.
    pub fn load_history(&self) -> Vec<Project> {
        let path = self.base_dir.join(HISTORY_FILE_NAME);
        if !path.exists() {
            return Vec::new();
        }

        let file = match OpenOptions::new().read(true).open(&path) {
            Ok(file) => file,
            Err(error) => {
                warn!(path = %path.display(), %error, "failed to open project history");
                return Vec::new();
            }
        };

        let reader = BufReader::new(file);
        let mut projects = Vec::new();
        for (idx, line_result) in reader.lines().enumerate() {
            let line = match line_result {
                Ok(line) => line,
                Err(error) => {
                    warn!(
                        path = %path.display(),
                        line_number = idx + 1,
                        %error,
                        "failed to read project history line"
                    );
                    break;
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<Project>(&line) {
                Ok(project) => projects.push(project),
                Err(error) => {
                    warn!(
                        path = %path.display(),
                        line_number = idx + 1,
                        %error,
                        "skipping corrupt project history line"
                    );
                }
            }
        }

        projects
    }

    /// Insert or replace a project in the history, keyed by id.
    /// The file is rewritten atomically (tmp file + rename).
    pub fn upsert_history(&self, project: &Project) -> Result<()> {
        let mut projects = self.load_history();
        match projects.iter_mut().find(|p| p.id == project.id) {
            Some(existing) => *existing = project.clone(),
            None => projects.push(project.clone()),
        }
        self.rewrite_history(&projects)
    }

    fn rewrite_history(&self, projects: &[Project]) -> Result<()> {
        self.ensure_base_dir()?;

        let path = self.base_dir.join(HISTORY_FILE_NAME);
        let tmp_path = self.base_dir.join("projects.jsonl.tmp");
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)
            .with_context(|| format!("failed to open temp history file: {}", tmp_path.display()))?;
        set_file_mode_600(&tmp_path)?;

        let mut writer = BufWriter::new(file);
        for project in projects {
            let line = serde_json::to_string(project).context("failed to serialize project")?;
            writeln!(writer, "{line}").context("failed to write project history line")?;
        }
        writer.flush().context("failed to flush project history")?;

        fs::rename(&tmp_path, &path).with_context(|| {
            format!("failed to atomically replace history file {}", path.display())
        })?;
        Ok(())
    }

    /// The explicit reset: removes identity, current project, and history.
    pub fn clear_all(&self) -> Result<()> {
        remove_if_exists(&self.base_dir.join(IDENTITY_FILE_NAME))?;
        remove_if_exists(&self.base_dir.join(PROJECT_FILE_NAME))?;
        remove_if_exists(&self.base_dir.join(HISTORY_FILE_NAME))?;
        Ok(())
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, file_name: &str) -> Option<T> {
        let path = self.base_dir.join(file_name);
        if !path.exists() {
            return None;
        }

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(error) => {
                warn!(path = %path.display(), %error, "failed to read session store file");
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(path = %path.display(), %error, "failed to parse session store file");
                None
            }
        }
    }

    fn write_json<T: serde::Serialize>(&self, file_name: &str, value: &T) -> Result<()> {
        self.ensure_base_dir()?;

        let path = self.base_dir.join(file_name);
        let tmp_path = self.base_dir.join(format!("{file_name}.tmp"));
        let contents =
            serde_json::to_vec_pretty(value).context("failed to serialize session store value")?;

        fs::write(&tmp_path, contents)
            .with_context(|| format!("failed to write session store file: {}", tmp_path.display()))?;
        set_file_mode_600(&tmp_path)?;

        fs::rename(&tmp_path, &path).with_context(|| {
            format!(
                "failed to atomically replace session store file {}",
                path.display()
            )
        })?;
        Ok(())
    }

    fn ensure_base_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.base_dir).with_context(|| {
            format!(
                "failed to create session store directory: {}",
                self.base_dir.display()
            )
        })
    }
}

fn remove_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)
            .with_context(|| format!("failed to remove store file: {}", path.display()))?;
    }
    Ok(())
}

fn set_file_mode_600(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}

fn default_base_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| {
            dirs.state_dir()
                .unwrap_or_else(|| dirs.data_local_dir())
                .to_path_buf()
        })
        .unwrap_or_else(|| std::env::temp_dir().join(format!("{APP_NAME}-state")))
}
