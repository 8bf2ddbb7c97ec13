/// Cover image acquisition
///
/// The user picks an image with the native dialog. The image is copied
/// into app-private storage as a downscaled JPEG and only the path of that
/// copy is stored on the record.
use image::{imageops::FilterType, DynamicImage, ImageFormat};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::CoverError;

/// File name prefix of every imported cover
const COVER_PREFIX: &str = "cover_";

const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "webp", "bmp", "gif", "tiff"];

/// Result of asking the platform for a cover image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverOutcome {
    /// Path of the imported copy
    Acquired(String),
    Cancelled,
    /// User-facing reason the image could not be used
    Failed(String),
}

/// Let the user choose an image file and import it
pub async fn pick_from_gallery(covers_dir: PathBuf, max_edge: u32) -> CoverOutcome {
    let picked = rfd::AsyncFileDialog::new()
        .set_title("Choose Cover Image")
        .add_filter("Images", &IMAGE_EXTENSIONS)
        .pick_file()
        .await;

    let Some(handle) = picked else {
        return CoverOutcome::Cancelled;
    };
    let source = handle.path().to_path_buf();

    // Decoding and resizing is CPU-bound
    let imported = tokio::task::spawn_blocking(move || import_cover(&source, &covers_dir, max_edge))
        .await;

    match imported {
        Ok(Ok(path)) => CoverOutcome::Acquired(path.to_string_lossy().into_owned()),
        Ok(Err(err)) => {
            tracing::warn!("Cover import failed: {err}");
            CoverOutcome::Failed(format!("Could not use that image: {err}"))
        }
        Err(err) => {
            tracing::error!("Cover import task failed: {err}");
            CoverOutcome::Failed("Could not use that image.".to_string())
        }
    }
}

/// Copy `source` into `covers_dir` as a JPEG no larger than `max_edge`
/// on either side. Returns the path of the new file.
pub fn import_cover(source: &Path, covers_dir: &Path, max_edge: u32) -> Result<PathBuf, CoverError> {
    fs::create_dir_all(covers_dir)?;

    let img = image::open(source)?;
    let img = if img.width() > max_edge || img.height() > max_edge {
        img.resize(max_edge, max_edge, FilterType::Lanczos3)
    } else {
        img
    };

    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    // The file is removed on drop unless the encode succeeds and it is kept
    let mut file = tempfile::Builder::new()
        .prefix(COVER_PREFIX)
        .suffix(".jpg")
        .tempfile_in(covers_dir)?;
    rgb.write_to(file.as_file_mut(), ImageFormat::Jpeg)?;

    let (_, path) = file.keep().map_err(|err| CoverError::Io(err.error))?;

    tracing::info!("Imported cover {} -> {}", source.display(), path.display());
    Ok(path)
}

/// Remove imported covers that no record points at any more.
/// Returns how many files were deleted.
pub fn prune_orphaned_covers(covers_dir: &Path, referenced: &HashSet<PathBuf>) -> usize {
    if !covers_dir.exists() {
        return 0;
    }

    let mut removed = 0;
    for entry in WalkDir::new(covers_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let is_cover = path
            .file_name()
            .map(|name| name.to_string_lossy().starts_with(COVER_PREFIX))
            .unwrap_or(false);
        if !is_cover || referenced.contains(path) {
            continue;
        }

        match fs::remove_file(path) {
            Ok(()) => removed += 1,
            Err(err) => tracing::warn!("Could not remove {}: {err}", path.display()),
        }
    }

    if removed > 0 {
        tracing::info!("Removed {removed} unused cover images");
    }
    removed
}

/// Whether a stored reference can be displayed
pub fn cover_exists(cover_image: &str) -> bool {
    !cover_image.is_empty() && Path::new(cover_image).is_file()
}
