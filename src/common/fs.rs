use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

/// Create the directory if it doesn’t exist; error if a non-directory exists there.
pub(crate) fn ensure_dir_exists(path: &Path) -> io::Result<()> {
    if path.exists() {
        if !path.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Path exists but is not a directory: {}", path.display()),
            ));
        }
    } else {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Bundle `files` (stored by file name, flat) into a deflated `.zip` at `zip_path`.
pub(crate) fn zip_files(files: &[PathBuf], zip_path: &Path) -> zip::result::ZipResult<()> {
    let mut zip = ZipWriter::new(BufWriter::new(File::create(zip_path)?));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in files {
        let name = path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, format!("no file name: {}", path.display())))?;
        zip.start_file(name, options)?;
        io::copy(&mut File::open(path)?, &mut zip)?;
    }

    zip.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_dir_creates_nested_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        ensure_dir_exists(&nested).unwrap();
        assert!(nested.is_dir());
        // second call is a no-op
        ensure_dir_exists(&nested).unwrap();
    }

    #[test]
    fn ensure_dir_rejects_regular_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("f.txt");
        fs::write(&file, b"x").unwrap();
        assert!(ensure_dir_exists(&file).is_err());
    }

    #[test]
    fn zip_files_bundles_by_file_name() {
        let tmp = tempfile::tempdir().unwrap();
        let a = tmp.path().join("a.txt");
        let b = tmp.path().join("b.txt");
        fs::write(&a, b"alpha").unwrap();
        fs::write(&b, b"beta").unwrap();

        let out = tmp.path().join("bundle.zip");
        zip_files(&[a, b], &out).unwrap();

        let archive = zip::ZipArchive::new(File::open(&out).unwrap()).unwrap();
        let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }
}
