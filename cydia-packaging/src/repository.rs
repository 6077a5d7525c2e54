// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Filesystem helpers for repositories on local disk.

A Cydia repository is a flat directory holding `.deb` files, a `Packages` index
(plus its `Packages.bz2` compressed form), and a `Release` file. Producing the
index and compressing it is the job of external tools; these helpers locate the
inputs and outputs around them.
*/

use {
    crate::{
        error::{CydiaError, Result},
        release::{ReleaseManifest, PACKAGES_BZ2_FILENAME, PACKAGES_FILENAME},
    },
    log::{info, warn},
    std::path::{Path, PathBuf},
};

/// Name of the `Release` file in a repository directory.
pub const RELEASE_FILENAME: &str = "Release";

/// Files that must exist for a directory to be considered a repository.
pub const REQUIRED_FILES: [&str; 2] = [PACKAGES_FILENAME, RELEASE_FILENAME];

/// Whether a filename refers to a `.deb` package archive.
pub fn is_deb_filename(name: impl AsRef<Path>) -> bool {
    name.as_ref()
        .extension()
        .map(|ext| ext == "deb")
        .unwrap_or(false)
}

fn read_dir_names(dir: &Path) -> Result<Vec<PathBuf>> {
    let io_err = |e: std::io::Error| CydiaError::RepositoryIoPath(format!("{}", dir.display()), e);

    let mut paths = vec![];
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        paths.push(entry.map_err(io_err)?.path());
    }

    paths.sort();

    Ok(paths)
}

/// Find `.deb` files in a directory.
///
/// Results are sorted. Errors if no `.deb` is present.
pub fn find_deb_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();

    let debs = read_dir_names(dir)?
        .into_iter()
        .filter(|p| p.is_file() && is_deb_filename(p))
        .collect::<Vec<_>>();

    if debs.is_empty() {
        Err(CydiaError::RepositoryNoDebFiles(format!("{}", dir.display())))
    } else {
        info!("{} deb file(s) found in {}", debs.len(), dir.display());
        Ok(debs)
    }
}

/// Verify a directory holds the files required of a repository.
///
/// Returns the canonicalized path to the directory.
pub fn validate_repository_dir(dir: impl AsRef<Path>) -> Result<PathBuf> {
    let dir = dir.as_ref();

    let missing = REQUIRED_FILES
        .iter()
        .filter(|name| !dir.join(name).is_file())
        .inspect(|name| warn!("{} missing from {}", name, dir.display()))
        .count();

    if missing > 0 {
        return Err(CydiaError::RepositoryRequiredFilesMissing(missing));
    }

    dir.canonicalize()
        .map_err(|e| CydiaError::RepositoryIoPath(format!("{}", dir.display()), e))
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| CydiaError::RepositoryIoPath(format!("{}", path.display()), e))
}

/// Add signatures for the `Packages` and `Packages.bz2` files in a directory.
///
/// The passed manifest is returned with the two signatures appended.
pub fn release_from_directory(
    dir: impl AsRef<Path>,
    mut manifest: ReleaseManifest,
) -> Result<ReleaseManifest> {
    let dir = dir.as_ref();

    let packages = read_file(&dir.join(PACKAGES_FILENAME))?;
    let packages_bz2 = read_file(&dir.join(PACKAGES_BZ2_FILENAME))?;

    manifest.add_packages_signature(&packages, &packages_bz2);
    info!("computed Release signatures for {}", dir.display());

    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deb_filenames() {
        for name in [
            "test.deb",
            "test.xy.deb",
            "com.test.deb",
            "com.test.xy.deb",
            "com..example.test.deb",
            "com..example.test.xy.deb",
            "com..example.test..deb",
            "com..example.test..xy.deb",
            "com..example.test...de.deb",
            "com..example.test...xy.de.deb",
        ] {
            assert!(is_deb_filename(name), "{}", name);
        }

        for name in ["Packages", "Packages.bz2", "deb", "foo.deb.txt", "foo.udeb"] {
            assert!(!is_deb_filename(name), "{}", name);
        }
    }

    #[test]
    fn find_debs() -> Result<()> {
        let td = tempfile::tempdir().unwrap();

        assert!(matches!(
            find_deb_files(td.path()),
            Err(CydiaError::RepositoryNoDebFiles(_))
        ));

        std::fs::write(td.path().join("b.deb"), b"b").unwrap();
        std::fs::write(td.path().join("a.deb"), b"a").unwrap();
        std::fs::write(td.path().join("Packages"), b"").unwrap();

        let debs = find_deb_files(td.path())?;
        assert_eq!(
            debs,
            vec![td.path().join("a.deb"), td.path().join("b.deb")]
        );

        Ok(())
    }

    #[test]
    fn validate_dir() -> Result<()> {
        let td = tempfile::tempdir().unwrap();

        assert!(matches!(
            validate_repository_dir(td.path()),
            Err(CydiaError::RepositoryRequiredFilesMissing(2))
        ));

        std::fs::write(td.path().join("Packages"), b"").unwrap();
        assert!(matches!(
            validate_repository_dir(td.path()),
            Err(CydiaError::RepositoryRequiredFilesMissing(1))
        ));

        std::fs::write(td.path().join("Release"), b"").unwrap();
        assert_eq!(
            validate_repository_dir(td.path())?,
            td.path().canonicalize().unwrap()
        );

        Ok(())
    }

    #[test]
    fn release_from_dir() -> Result<()> {
        let td = tempfile::tempdir().unwrap();

        assert!(matches!(
            release_from_directory(td.path(), ReleaseManifest::new()),
            Err(CydiaError::RepositoryIoPath(_, _))
        ));

        std::fs::write(td.path().join("Packages"), b"").unwrap();
        std::fs::write(td.path().join("Packages.bz2"), b"abc").unwrap();

        let mut manifest = ReleaseManifest::new();
        manifest.set_origin("Example");
        let manifest = release_from_directory(td.path(), manifest)?;

        let signatures = manifest.signatures();
        assert_eq!(signatures.len(), 2);
        assert_eq!(signatures[0].name(), "Packages");
        assert_eq!(signatures[0].size(), 0);
        assert_eq!(signatures[1].name(), "Packages.bz2");
        assert_eq!(signatures[1].digest(), "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(manifest.origin(), "Example");

        Ok(())
    }
}
