/*!
 * Utility functions for Elixir
 */

use std::path::Path;

use walkdir::WalkDir;

use crate::config::Config;
use crate::error::Result;

/// Count the files a compile will read, for progress tracking.
///
/// Ignored entries are skipped and ignored directories are not entered.
pub fn count_files(dir: &Path, config: &Config) -> Result<u64> {
    let mut count = 0;

    let walker = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0 || !config.is_ignored(&entry.file_name().to_string_lossy())
        });

    // Symlink loops surface as errors; they are skipped here as in the build.
    for entry in walker.filter_map(|e| e.ok()) {
        if entry.file_type().is_file() {
            count += 1;
        }
    }

    Ok(count)
}

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn counts_files_outside_ignored_directories() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir(dir.path().join("lib"))?;
        fs::create_dir(dir.path().join(".git"))?;
        fs::write(dir.path().join("Main.lua"), "print(1)")?;
        fs::write(dir.path().join("lib/Util.lua"), "return {}")?;
        fs::write(dir.path().join(".git/HEAD"), "ref: refs/heads/main")?;
        fs::write(dir.path().join(".gitignore"), "*.rbxmx")?;

        let config = Config::new(dir.path(), "out.rbxmx");
        assert_eq!(count_files(dir.path(), &config)?, 2);
        Ok(())
    }

    #[test]
    fn formats_sizes() {
        assert_eq!(format_file_size(512), "512 bytes");
        assert_eq!(format_file_size(1536), "1.50 KB");
        assert_eq!(format_file_size(3 * 1024 * 1024), "3.00 MB");
    }
}
