use crate::db::store::ReviewStore;
use crate::errors::{AppError, AppResult};
use crate::export::ensure_writable;
use crate::ui::messages::{success, warning};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::FileOptions;

pub struct BackupLogic;

impl BackupLogic {
    /// Consistent copy of the review store at `dest` (optionally zipped).
    /// Returns the path of the final backup file.
    pub fn backup(
        store: &ReviewStore,
        dest: &Path,
        compress: bool,
        force: bool,
    ) -> AppResult<PathBuf> {
        // 1️⃣ Ensure destination folder exists
        if let Some(parent) = dest.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        // 2️⃣ Existing file → ask confirmation
        ensure_writable(dest, force)?;
        if dest.exists() {
            fs::remove_file(dest)?;
        }

        // 3️⃣ Copy database (VACUUM INTO is safe while the store is open in WAL mode)
        let dest_str = dest.to_string_lossy().to_string();
        store
            .conn()
            .execute("VACUUM INTO ?1", [&dest_str])
            .map_err(|e| AppError::Other(format!("backup to {dest_str} failed: {e}")))?;
        success(format!("Backup created: {}", dest.display()));

        // 4️⃣ Optional compression
        let final_path = if compress {
            let compressed = compress_backup(dest)?;

            if let Err(e) = fs::remove_file(dest) {
                warning(format!("Failed to remove uncompressed backup: {e}"));
            }

            compressed
        } else {
            dest.to_path_buf()
        };

        // 5️⃣ Log in DB
        store.log(
            "backup",
            &final_path.to_string_lossy(),
            if compress {
                "Backup created and compressed"
            } else {
                "Backup created"
            },
        );

        Ok(final_path)
    }
}

/// Compress a backup using .zip
fn compress_backup(path: &Path) -> AppResult<PathBuf> {
    let zip_path = path.with_extension("zip");
    let file = fs::File::create(&zip_path)?;
    let mut zip = ZipWriter::new(file);

    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let entry = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "fishcounter.sqlite".to_string());

    let mut f = fs::File::open(path)?;
    zip.start_file(entry, options).map_err(io::Error::other)?;

    io::copy(&mut f, &mut zip)?;
    zip.finish().map_err(io::Error::other)?;

    success(format!("📦 Compressed: {}", zip_path.display()));

    Ok(zip_path)
}
