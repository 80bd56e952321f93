use std::path::PathBuf;

use log::info;

use crate::errors::{StapelError, StapelResult};
use crate::listing::{scan_directories, SortOrder};
use crate::provider::{load_image_from_path, LoadedImage, Provider};

/// Resolve a caller-supplied cursor against a listing of `len` files.
/// With `wrap` the cursor is taken modulo the length; without it an
/// out-of-range cursor means the listing is exhausted.
fn resolve_index(cursor: usize, len: usize, wrap: bool) -> Option<usize> {
    debug_assert!(len > 0);
    if wrap {
        Some(cursor % len)
    } else if cursor < len {
        Some(cursor)
    } else {
        None
    }
}

/// Select and load one image from the sorted listing of `dirs`.
///
/// The cursor is owned by the caller: pass 0 on the first invocation and the
/// returned `next_cursor` afterwards. `Ok(None)` signals an exhausted listing
/// (wrap disabled, cursor past the end) and is the expected end of a batch,
/// distinct from every error. The listing is recomputed on each call, so an
/// unchanged directory always yields the same file for the same cursor.
pub fn select_image(
    dirs: &[PathBuf],
    cursor: usize,
    wrap: bool,
    sort_by: SortOrder,
) -> StapelResult<Option<LoadedImage>> {
    let mut entries = scan_directories(dirs, sort_by)?;
    if entries.is_empty() {
        return Err(StapelError::EmptyDirectory);
    }
    let file_count = entries.len();
    let index = match resolve_index(cursor, file_count, wrap) {
        Some(index) => index,
        None => return Ok(None),
    };
    let entry = entries.remove(index);
    let (image, mask) = load_image_from_path(&entry.path)?;
    info!("Loaded {} ({} of {})", entry.file_name, index + 1, file_count);
    Ok(Some(LoadedImage {
        image,
        mask,
        entry,
        file_count,
        next_cursor: cursor + 1,
    }))
}

/// Iterates a directory listing by holding the cursor that `select_image`
/// itself stays stateless about.
pub struct DirectoryProvider {
    dirs: Vec<PathBuf>,
    sort_by: SortOrder,
    wrap: bool,
    cursor: usize,
}

impl DirectoryProvider {
    pub fn new(dirs: Vec<PathBuf>, sort_by: SortOrder, wrap: bool) -> Self {
        Self {
            dirs,
            sort_by,
            wrap,
            cursor: 0,
        }
    }

    /// Start iterating at the given cursor instead of 0
    pub fn with_cursor(mut self, cursor: usize) -> Self {
        self.cursor = cursor;
        self
    }

    /// The cursor the next invocation will use
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl Provider for DirectoryProvider {
    fn next_image(&mut self) -> StapelResult<Option<LoadedImage>> {
        match select_image(&self.dirs, self.cursor, self.wrap, self.sort_by) {
            Ok(Some(loaded)) => {
                self.cursor = loaded.next_cursor;
                Ok(Some(loaded))
            }
            Ok(None) => Ok(None),
            Err(err) => {
                // A failed file still advances the cursor, otherwise a caller
                // that chooses to skip decode failures spins on it.
                if let StapelError::DecodeFailure(_) = err {
                    self.cursor += 1;
                }
                Err(err)
            }
        }
    }
}
