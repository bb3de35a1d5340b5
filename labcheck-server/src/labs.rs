//! Listing helpers over the lab data directory tree.

use std::io;
use std::path::Path;

/// Sorted names of the subdirectories of `path`. Plain files are skipped.
pub async fn list_dirs(path: &Path) -> io::Result<Vec<String>> {
    let mut rd = tokio::fs::read_dir(path).await?;
    let mut names = Vec::new();
    while let Some(entry) = rd.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Keeps the selected students that actually have a directory under
/// `lab_dir`, in selection order. Unknown names are dropped without an
/// error.
pub async fn existing_students(lab_dir: &Path, selected: Vec<String>) -> Vec<String> {
    let mut kept = Vec::with_capacity(selected.len());
    for name in selected {
        match tokio::fs::metadata(lab_dir.join(&name)).await {
            Ok(meta) if meta.is_dir() => kept.push(name),
            _ => {}
        }
    }
    kept
}
