//! File-system helpers: reading, backups and batch discovery.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use chrono::Local;
use regex::Regex;
use tracing::debug;

use crate::error::{CliError, Result};

/// Directory used for timestamped backups when none is given.
pub const DEFAULT_BACKUP_DIR: &str = ".pg-idempotent-backups";

static SUPABASE_MIGRATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{14}_.*\.sql$").unwrap());

/// Reads a SQL file.
///
/// # Errors
///
/// Returns [`CliError::FileNotFound`] if `path` does not exist.
pub fn read_sql(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(CliError::FileNotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(CliError::io(path))
}

/// Writes `contents` to `path`, creating parent directories.
///
/// # Errors
///
/// Returns [`CliError::Io`] if the directory or file cannot be written.
pub fn write_sql(path: &Path, contents: &str) -> Result<()> {
    ensure_parent_dir(path)?;
    fs::write(path, contents).map_err(CliError::io(path))
}

/// Copies `path` to `<path>.backup` next to it.
///
/// # Errors
///
/// Returns [`CliError::Io`] if the copy fails.
pub fn sibling_backup(path: &Path) -> Result<PathBuf> {
    let mut name = path.as_os_str().to_owned();
    name.push(".backup");
    let backup = PathBuf::from(name);
    fs::copy(path, &backup).map_err(CliError::io(&backup))?;
    debug!(backup = %backup.display(), "Backup created");
    Ok(backup)
}

/// Copies `path` into `backup_dir` as `<stem>_<YYYYmmdd_HHMMSS>.<ext>`.
///
/// # Errors
///
/// Returns [`CliError::FileNotFound`] if `path` does not exist, or
/// [`CliError::Io`] if the directory or copy cannot be created.
pub fn backup_file(path: &Path, backup_dir: &Path) -> Result<PathBuf> {
    if !path.is_file() {
        return Err(CliError::FileNotFound(path.to_path_buf()));
    }
    fs::create_dir_all(backup_dir).map_err(CliError::io(backup_dir))?;

    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let name = match path.extension() {
        Some(ext) => format!("{stem}_{timestamp}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{timestamp}"),
    };
    let backup = backup_dir.join(name);
    fs::copy(path, &backup).map_err(CliError::io(&backup))?;
    debug!(backup = %backup.display(), "Backup created");
    Ok(backup)
}

/// Translates a `*`/`?` file-name pattern into an anchored regex.
///
/// # Errors
///
/// Returns [`CliError::InvalidPattern`] if the result does not compile.
pub fn glob_to_regex(pattern: &str) -> Result<Regex> {
    let mut re = String::with_capacity(pattern.len() + 8);
    re.push('^');
    for c in pattern.chars() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            c => re.push_str(&regex::escape(&c.to_string())),
        }
    }
    re.push('$');
    Regex::new(&re).map_err(|source| CliError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Finds files under `dir` whose name matches `pattern`, sorted by path.
///
/// # Errors
///
/// Returns [`CliError::DirectoryNotFound`] if `dir` is missing, and
/// [`CliError::InvalidPattern`] or [`CliError::Io`] on failure.
pub fn find_sql_files(dir: &Path, pattern: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(CliError::DirectoryNotFound(dir.to_path_buf()));
    }
    let matcher = glob_to_regex(pattern)?;
    let mut files = Vec::new();
    collect_files(dir, &matcher, recursive, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_files(
    dir: &Path,
    matcher: &Regex,
    recursive: bool,
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    for entry in fs::read_dir(dir).map_err(CliError::io(dir))? {
        let path = entry.map_err(CliError::io(dir))?.path();
        if path.is_dir() {
            if recursive {
                collect_files(&path, matcher, recursive, files)?;
            }
        } else if path
            .file_name()
            .is_some_and(|name| matcher.is_match(&name.to_string_lossy()))
        {
            files.push(path);
        }
    }
    Ok(())
}

/// Creates the parent directory of `path` if needed.
///
/// # Errors
///
/// Returns [`CliError::Io`] if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(CliError::io(parent))
        }
        _ => Ok(()),
    }
}

/// `path` relative to `base`, or `path` itself if it is not below `base`.
#[must_use]
pub fn relative_path(path: &Path, base: &Path) -> PathBuf {
    path.strip_prefix(base)
        .map_or_else(|_| path.to_path_buf(), Path::to_path_buf)
}

/// Returns true for files in a `supabase/migrations` tree or named like
/// `20240101120000_name.sql`.
#[must_use]
pub fn is_supabase_migration(path: &Path) -> bool {
    let parts: Vec<_> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();
    if parts.iter().any(|p| p == "supabase") && parts.iter().any(|p| p == "migrations") {
        return true;
    }
    path.file_name()
        .is_some_and(|name| SUPABASE_MIGRATION_RE.is_match(&name.to_string_lossy()))
}
