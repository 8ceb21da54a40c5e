use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::config::Config;
use crate::store::schema::{EXPORT_VERSION, ExportData, ProfileData, SessionHistoryData};

const PROFILE_FILE: &str = "profile.json";
const HISTORY_FILE: &str = "session_history.json";
const DATA_FILES: [&str; 2] = [PROFILE_FILE, HISTORY_FILE];

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(Self::default_dir())
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("creating data dir {}", base_dir.display()))?;
        Ok(Self { base_dir })
    }

    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lingodrill")
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if !path.exists() {
            return T::default();
        }
        match fs::read_to_string(&path).map(|content| serde_json::from_str(&content)) {
            Ok(Ok(data)) => data,
            Ok(Err(e)) => {
                warn!(target: "lingodrill::store", file = name, error = %e, "unreadable data file, using defaults");
                T::default()
            }
            Err(e) => {
                warn!(target: "lingodrill::store", file = name, error = %e, "failed to read data file");
                T::default()
            }
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");
        write_synced(&tmp_path, &serde_json::to_string_pretty(data)?)?;
        fs::rename(&tmp_path, &path)?;
        debug!(target: "lingodrill::store", file = name, "saved");
        Ok(())
    }

    /// Load the profile. Returns None if the file exists but cannot be
    /// parsed; a missing file yields a fresh profile.
    pub fn load_profile(&self) -> Option<ProfileData> {
        let path = self.file_path(PROFILE_FILE);
        if path.exists() {
            let content = fs::read_to_string(&path).ok()?;
            serde_json::from_str(&content).ok()
        } else {
            Some(ProfileData::default())
        }
    }

    /// Profile ready for use: unparseable or stale-schema files are replaced
    /// by a fresh profile.
    pub fn load_profile_or_reset(&self) -> ProfileData {
        match self.load_profile() {
            Some(profile) if !profile.needs_reset() => profile,
            _ => {
                warn!(target: "lingodrill::store", "profile missing or stale, starting fresh");
                ProfileData::default()
            }
        }
    }

    pub fn save_profile(&self, data: &ProfileData) -> Result<()> {
        self.save(PROFILE_FILE, data)
    }

    pub fn load_session_history(&self) -> SessionHistoryData {
        self.load(HISTORY_FILE)
    }

    pub fn save_session_history(&self, data: &SessionHistoryData) -> Result<()> {
        self.save(HISTORY_FILE, data)
    }

    pub fn export_all(&self, config: &Config) -> ExportData {
        ExportData {
            lingodrill_export_version: EXPORT_VERSION,
            exported_at: Utc::now(),
            config: config.clone(),
            profile: self.load_profile().unwrap_or_default(),
            session_history: self.load_session_history(),
        }
    }

    /// Replace every data file from an export bundle.
    ///
    /// All files are staged as `.json.tmp` first. Originals are then moved
    /// to `.json.bak` and the staged files renamed into place; any failure
    /// restores what was committed so far. Backups are deleted on success.
    pub fn import_all(&self, data: &ExportData) -> Result<()> {
        if data.lingodrill_export_version != EXPORT_VERSION {
            bail!(
                "Unsupported export version: {} (expected {})",
                data.lingodrill_export_version,
                EXPORT_VERSION
            );
        }

        let payloads = [
            serde_json::to_string_pretty(&data.profile)?,
            serde_json::to_string_pretty(&data.session_history)?,
        ];

        let mut staged: Vec<PathBuf> = Vec::new();
        for (name, json) in DATA_FILES.iter().zip(&payloads) {
            let tmp_path = self.file_path(name).with_extension("json.tmp");
            if let Err(e) = write_synced(&tmp_path, json) {
                remove_all(&staged);
                bail!("Import failed during staging: {e}");
            }
            staged.push(tmp_path);
        }

        let mut committed: Vec<Commit> = Vec::new();
        for (i, name) in DATA_FILES.iter().enumerate() {
            let commit = Commit {
                final_path: self.file_path(name),
                bak_path: self.file_path(name).with_extension("json.bak"),
                had_original: self.file_path(name).exists(),
            };

            if commit.had_original
                && let Err(e) = fs::rename(&commit.final_path, &commit.bak_path)
            {
                rollback(&committed);
                remove_all(&staged);
                bail!("Import failed during commit (backup): {e}");
            }

            if let Err(e) = fs::rename(&staged[i], &commit.final_path) {
                rollback(std::slice::from_ref(&commit));
                rollback(&committed);
                remove_all(&staged[i + 1..]);
                bail!("Import failed during commit (rename): {e}");
            }

            committed.push(commit);
        }

        for commit in committed.iter().filter(|c| c.had_original) {
            let _ = fs::remove_file(&commit.bak_path);
        }
        Ok(())
    }

    /// Clean up `.bak` files left by an interrupted import; true if any were found.
    pub fn check_interrupted_import(&self) -> bool {
        let mut found = false;
        for name in DATA_FILES {
            let bak_path = self.file_path(name).with_extension("json.bak");
            if bak_path.exists() {
                found = true;
                let _ = fs::remove_file(&bak_path);
            }
        }
        found
    }
}

struct Commit {
    final_path: PathBuf,
    bak_path: PathBuf,
    had_original: bool,
}

fn rollback(commits: &[Commit]) {
    for commit in commits {
        if commit.had_original {
            let _ = fs::rename(&commit.bak_path, &commit.final_path);
        } else {
            let _ = fs::remove_file(&commit.final_path);
        }
    }
}

fn remove_all(paths: &[PathBuf]) {
    for path in paths {
        let _ = fs::remove_file(path);
    }
}

fn write_synced(path: &Path, content: &str) -> Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;
    Ok(())
}
