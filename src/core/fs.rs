//! File helpers for secret-bearing output.

use std::io::Write;
use std::path::Path;

use crate::error::Result;

/// Write `contents` to `path`, readable only by the owner on Unix.
///
/// Permissions are reset to 0600 even when overwriting an existing file.
pub fn write_private(path: &Path, contents: &[u8]) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .mode(0o600)
            .open(path)?;
        file.write_all(contents)?;
        file.flush()?;

        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    #[cfg(not(unix))]
    {
        let mut file = std::fs::File::create(path)?;
        file.write_all(contents)?;
        file.flush()?;
    }

    Ok(())
}

/// Directory containing `path`, `.` for a bare file name.
pub fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Ensure `.gitignore` in `dir` lists every entry in `entries`.
///
/// Missing entries are appended; existing lines are left alone.
///
/// # Returns
///
/// `true` if the file was changed.
pub fn ensure_gitignore(dir: &Path, entries: &[&str]) -> Result<bool> {
    let gitignore = dir.join(".gitignore");

    let existing = if gitignore.exists() {
        std::fs::read_to_string(&gitignore)?
    } else {
        String::new()
    };

    let mut updated = existing.clone();
    for entry in entries {
        if !existing.lines().any(|l| l.trim() == *entry) {
            if !updated.is_empty() && !updated.ends_with('\n') {
                updated.push('\n');
            }
            updated.push_str(entry);
            updated.push('\n');
        }
    }

    if updated == existing {
        return Ok(false);
    }
    std::fs::write(&gitignore, updated)?;
    Ok(true)
}
