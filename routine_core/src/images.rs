//! Exercise image resolution.
//!
//! Images come from the catalog record itself or from a folder tree where each
//! exercise has its own directory of pictures. A missing or unreadable image
//! never blocks generation: the exercise is emitted without one.

use crate::matcher::find_best;
use crate::muscle::{contains_either_way, normalize};
use crate::{CatalogExercise, ExerciseImage, ImageSource};
use std::path::{Path, PathBuf};

/// File extensions treated as images
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Maximum directory depth scanned below the image root
const MAX_SCAN_DEPTH: usize = 4;

/// Whether a path has one of the known image extensions
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// First image file (by sorted name) directly inside `dir`
pub fn first_image_in(dir: &Path) -> Option<PathBuf> {
    let mut images: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_image_file(p))
        .collect();
    images.sort();
    images.into_iter().next()
}

/// Finds an image for a generated exercise name
pub trait ImageResolver: Send + Sync {
    fn find_image(&self, exercise_name: &str) -> Option<ExerciseImage>;
}

/// Resolver that never finds anything
#[derive(Clone, Copy, Debug, Default)]
pub struct NoImages;

impl ImageResolver for NoImages {
    fn find_image(&self, _exercise_name: &str) -> Option<ExerciseImage> {
        None
    }
}

/// Index of `folder name -> first image` built from a directory tree
#[derive(Clone, Debug, Default)]
pub struct FolderImageIndex {
    entries: Vec<(String, PathBuf)>,
}

impl FolderImageIndex {
    /// Scan `root` for folders that contain images
    ///
    /// A missing root gives an empty index.
    pub fn build(root: &Path) -> Self {
        let mut entries = Vec::new();
        if root.is_dir() {
            collect_image_folders(root, 0, &mut entries);
        } else {
            tracing::debug!("Image folder {:?} not found, index empty", root);
        }
        entries.sort();
        tracing::debug!("Indexed {} image folders under {:?}", entries.len(), root);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Image path for a name: exact folder name first, then partial match
    pub fn lookup(&self, exercise_name: &str) -> Option<(&Path, ImageSource)> {
        let key = normalize(exercise_name);
        if key.is_empty() {
            return None;
        }

        if let Some((_, path)) = self.entries.iter().find(|(name, _)| normalize(name) == key) {
            return Some((path, ImageSource::Folder));
        }

        self.entries
            .iter()
            .find(|(name, _)| contains_either_way(name, &key))
            .map(|(_, path)| (path.as_path(), ImageSource::FolderPartialMatch))
    }
}

fn collect_image_folders(dir: &Path, depth: usize, out: &mut Vec<(String, PathBuf)>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Unable to read image folder {:?}: {}", dir, e);
            return;
        }
    };

    for path in entries.filter_map(|e| e.ok()).map(|e| e.path()) {
        if !path.is_dir() {
            continue;
        }
        if let Some(image) = first_image_in(&path) {
            if let Some(name) = path.file_name() {
                out.push((name.to_string_lossy().into_owned(), image));
            }
        }
        if depth + 1 < MAX_SCAN_DEPTH {
            collect_image_folders(&path, depth + 1, out);
        }
    }
}

impl ImageResolver for FolderImageIndex {
    fn find_image(&self, exercise_name: &str) -> Option<ExerciseImage> {
        let (path, source) = self.lookup(exercise_name)?;
        read_image(path, source)
    }
}

fn read_image(path: &Path, source: ImageSource) -> Option<ExerciseImage> {
    match std::fs::read(path) {
        Ok(data) if !data.is_empty() => Some(ExerciseImage {
            path: Some(path.to_path_buf()),
            data: Some(data),
            source,
        }),
        Ok(_) => {
            tracing::warn!("Image {:?} is empty, ignoring", path);
            None
        }
        Err(e) => {
            tracing::warn!("Failed to read image {:?}: {}", path, e);
            None
        }
    }
}

/// Catalog images first, then the folder index
#[derive(Clone, Debug, Default)]
pub struct CascadeImageResolver {
    with_images: Vec<CatalogExercise>,
    folder: Option<FolderImageIndex>,
}

impl CascadeImageResolver {
    pub fn new(catalog_exercises: Vec<CatalogExercise>, folder: Option<FolderImageIndex>) -> Self {
        let with_images = catalog_exercises
            .into_iter()
            .filter(CatalogExercise::has_image)
            .collect();
        Self {
            with_images,
            folder,
        }
    }

    fn from_catalog(&self, exercise_name: &str) -> Option<ExerciseImage> {
        let hit = find_best(exercise_name, &self.with_images)?;
        if let Some(data) = hit.image_data.as_ref().filter(|d| !d.is_empty()) {
            return Some(ExerciseImage {
                path: hit.image_path.clone(),
                data: Some(data.clone()),
                source: ImageSource::Catalog,
            });
        }
        let path = hit.image_path.as_deref()?;
        read_image(path, ImageSource::Catalog)
    }
}

impl ImageResolver for CascadeImageResolver {
    fn find_image(&self, exercise_name: &str) -> Option<ExerciseImage> {
        self.from_catalog(exercise_name)
            .or_else(|| self.folder.as_ref()?.find_image(exercise_name))
    }
}
