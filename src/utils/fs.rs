use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use crate::core::InputFile;
use crate::utils::error::PathError;
use crate::utils::ConvertResult;

/// Expands the user-supplied paths into the list of files to convert.
///
/// Directories contribute their direct regular-file children (sorted by name);
/// subdirectories and symlinks inside them are ignored. Paths that do not exist
/// are skipped with a warning. Any other IO failure is returned.
pub async fn expand_inputs(paths: &[PathBuf]) -> ConvertResult<Vec<InputFile>> {
    let mut valid_files = Vec::new();

    for input in paths {
        let meta = match fs::symlink_metadata(input).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn_missing(input);
                continue;
            }
            Err(e) => return Err(PathError::io(input, e).into()),
        };

        let candidates = if meta.is_dir() {
            list_regular_files(input).await?
        } else {
            vec![input.clone()]
        };

        for file in candidates {
            match fs::metadata(&file).await {
                Ok(_) => valid_files.push(InputFile::new(file)),
                Err(e) if e.kind() == ErrorKind::NotFound => warn_missing(&file),
                Err(e) => return Err(PathError::io(&file, e).into()),
            }
        }
    }

    debug!("Resolved {} input files from {} paths", valid_files.len(), paths.len());
    Ok(valid_files)
}

async fn list_regular_files(dir: &Path) -> ConvertResult<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir).await.map_err(|e| PathError::io(dir, e))?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(|e| PathError::io(dir, e))? {
        let file_type = entry.file_type().await.map_err(|e| PathError::io(entry.path(), e))?;
        if file_type.is_file() {
            files.push(entry.path());
        }
    }

    files.sort();
    Ok(files)
}

fn warn_missing(path: &Path) {
    let shown = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    warn!("Input file does not exist: {}", shown.display());
}

/// Creates the output directory (and parents) if it is missing.
pub async fn create_output_dir(dir: impl AsRef<Path>) -> ConvertResult<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)
        .await
        .map_err(|e| PathError::OutputDir(dir.to_path_buf(), e.to_string()))?;
    Ok(())
}

/// Derives where an encoded output is written:
/// `{output_dir}/{input stem}{suffix}.{extension}`.
pub fn output_path(output_dir: &Path, input: &Path, suffix: &str, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    output_dir.join(format!("{stem}{suffix}.{extension}"))
}

/// Get file name for log and report lines
pub fn extract_filename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
