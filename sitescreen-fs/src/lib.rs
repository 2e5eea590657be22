//! UTF-8 filesystem helpers for scene bundles, credentials and exports.
//!
//! Paths arrive from the command line as arbitrary absolute or relative
//! strings. `cap-std` needs a directory capability plus a relative path, so
//! every helper opens an ambient directory first and works below it.
#![forbid(unsafe_code)]

use std::io;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

/// Read a UTF-8 text file.
///
/// # Errors
/// Returns any I/O error raised while opening or reading the file.
pub fn read_to_string(path: &Utf8Path) -> io::Result<String> {
    let (dir, name) = open_parent_dir(path)?;
    dir.read_to_string(name.as_str())
}

/// Create or truncate `path`, creating missing parent directories first.
///
/// # Errors
/// Returns any I/O error raised while creating directories or the file.
pub fn create_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_parent_dir(path)?;
    dir.create(name.as_str())
}

/// Ensure the parent directory of `path` exists.
///
/// Absolute parents are created from the filesystem root (or the drive on
/// Windows); relative parents from the working directory.
///
/// # Errors
/// Returns any I/O error raised while creating the directories.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    let anchor: Utf8PathBuf = parent.components().take_while(is_anchor).collect();
    let relative: Utf8PathBuf = parent.components().skip_while(is_anchor).collect();
    if relative.as_str().is_empty() {
        return Ok(());
    }
    let base = if anchor.as_str().is_empty() {
        Utf8Path::new(".")
    } else {
        anchor.as_path()
    };
    fs_utf8::Dir::open_ambient_dir(base, ambient_authority())?.create_dir_all(&relative)
}

const fn is_anchor(component: &Utf8Component<'_>) -> bool {
    matches!(component, Utf8Component::Prefix(_) | Utf8Component::RootDir)
}

/// Open the directory holding `path` and return it with the file name.
fn open_parent_dir(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("'{path}' does not name a file")))?
        .to_owned();
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, name))
}
