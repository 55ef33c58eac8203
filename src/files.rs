use crate::error::{EcpackError, Result};
use crate::header::ContainerKind;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Collect every regular file under `root`, depth first
/// Entries are visited in name order. A symlink to a regular file is
/// collected; symlinked directories are not descended into.
pub fn collect_regular_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_into(root, &mut files)?;
    Ok(files)
}

fn collect_into(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_into(&entry.path(), files)?;
        } else if file_type.is_file() {
            files.push(entry.path());
        } else if file_type.is_symlink() {
            // Dangling links are left out
            if fs::metadata(entry.path()).is_ok_and(|meta| meta.is_file()) {
                files.push(entry.path());
            }
        }
    }
    Ok(())
}

/// File name for display and log entries
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Output path for a container: the source's last extension is replaced
/// e.g. `dir/report.txt` -> `dir/report.cmp`
pub fn container_path(source: &Path, kind: ContainerKind) -> Result<PathBuf> {
    let stem = source
        .file_stem()
        .ok_or_else(|| EcpackError::SourceNotFound(source.to_path_buf()))?;
    let mut name = OsString::from(stem);
    name.push(".");
    name.push(kind.extension());
    Ok(source.with_file_name(name))
}

/// Output path for a recovered file: `destination/<source name minus container extension>`
pub fn recovered_path(source: &Path, destination: &Path) -> Result<PathBuf> {
    let stem = source.file_stem().ok_or_else(|| {
        EcpackError::InvalidFormat(format!("no file name in {}", source.display()))
    })?;
    Ok(destination.join(stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_collect_regular_files_recursive_and_ordered() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub/deeper")).unwrap();
        std::fs::write(dir.path().join("b.txt"), b"b").unwrap();
        std::fs::write(dir.path().join("a.txt"), b"a").unwrap();
        std::fs::write(dir.path().join("sub/c.txt"), b"c").unwrap();
        std::fs::write(dir.path().join("sub/deeper/d.txt"), b"d").unwrap();
        std::fs::create_dir(dir.path().join("empty")).unwrap();

        let files = collect_regular_files(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| {
                p.strip_prefix(dir.path())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "sub/c.txt", "sub/deeper/d.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_collect_follows_file_symlinks_only() {
        use std::os::unix::fs::symlink;

        let dir = tempdir().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir_all(dir.path().join("elsewhere")).unwrap();
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(dir.path().join("real.txt"), b"real").unwrap();
        std::fs::write(dir.path().join("elsewhere/hidden.txt"), b"hidden").unwrap();
        symlink(dir.path().join("real.txt"), sub.join("link.txt")).unwrap();
        symlink(dir.path().join("elsewhere"), sub.join("linked_dir")).unwrap();
        symlink(dir.path().join("missing.txt"), sub.join("dangling.txt")).unwrap();

        let files = collect_regular_files(&sub).unwrap();
        assert_eq!(files, vec![sub.join("link.txt")]);
        assert_eq!(std::fs::read(&files[0]).unwrap(), b"real");
    }

    #[test]
    fn test_collect_missing_dir() {
        let dir = tempdir().unwrap();
        assert!(collect_regular_files(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn test_container_path() {
        let source = Path::new("data/report.txt");
        assert_eq!(
            container_path(source, ContainerKind::Compressed).unwrap(),
            PathBuf::from("data/report.cmp")
        );
        assert_eq!(
            container_path(source, ContainerKind::Encrypted).unwrap(),
            PathBuf::from("data/report.enc")
        );
        assert_eq!(
            container_path(Path::new("archive.tar.gz"), ContainerKind::CompressedEncrypted)
                .unwrap(),
            PathBuf::from("archive.tar.ec")
        );
        assert_eq!(
            container_path(Path::new("README"), ContainerKind::Compressed).unwrap(),
            PathBuf::from("README.cmp")
        );
    }

    #[test]
    fn test_recovered_path() {
        let out = Path::new("out");
        assert_eq!(
            recovered_path(Path::new("in/report.cmp"), out).unwrap(),
            PathBuf::from("out/report")
        );
        assert_eq!(
            recovered_path(Path::new("in/notes.txt.ec"), out).unwrap(),
            PathBuf::from("out/notes.txt")
        );
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("a/b/c.bin")), "c.bin");
    }
}
