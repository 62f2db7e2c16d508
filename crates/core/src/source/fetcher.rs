//! Filesystem-backed fetcher used when the plugin runs inside the vib host

use super::{FetchError, Source, SourceFetcher, SourceKind, get_source_path};
use crate::module::RecipeContext;
use flate2::read::GzDecoder;
use gix::objs::tree::EntryKind;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Fetches git, tar, file and local sources with gix, HTTP and plain
/// filesystem operations
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSourceFetcher;

impl SourceFetcher for FsSourceFetcher {
    fn download_source(
        &self,
        recipe: &RecipeContext,
        source: &Source,
        module_name: &str,
    ) -> Result<(), FetchError> {
        let downloads = Path::new(&recipe.downloads_path);
        let dest = downloads.join(get_source_path(source, module_name));
        debug!("download_source: {:?} source {} -> {:?}", source.kind, source.url, dest);

        match source.kind {
            SourceKind::Git => clone_git(source, &dest),
            SourceKind::Tar | SourceKind::File => {
                let artifact = artifact_path(downloads, source, module_name);
                download_http(source, &artifact)
            }
            // other sources of the module may share this directory
            SourceKind::Local => copy_tree(Path::new(&source.url), &dest),
            SourceKind::Unknown => Err(FetchError::UnsupportedType(source.url.clone())),
        }
    }

    fn move_source(
        &self,
        downloads_dir: &Path,
        sources_dir: &Path,
        source: &Source,
        module_name: &str,
    ) -> Result<(), FetchError> {
        let relative = get_source_path(source, module_name);
        let dest = sources_dir.join(&relative);
        debug!("move_source: {} -> {:?}", relative, dest);

        match source.kind {
            SourceKind::Git => {
                // a clone owns its leaf directory
                if dest.exists() {
                    fs::remove_dir_all(&dest)?;
                }
                place_tree(&downloads_dir.join(&relative), &dest)
            }
            SourceKind::Local => place_tree(&downloads_dir.join(&relative), &dest),
            SourceKind::Tar => {
                let artifact = artifact_path(downloads_dir, source, module_name);
                fs::create_dir_all(&dest)?;
                unpack_tar(&artifact, &dest)
            }
            SourceKind::File => {
                let artifact = artifact_path(downloads_dir, source, module_name);
                fs::create_dir_all(&dest)?;
                fs::copy(&artifact, dest.join(file_name(source)))?;
                Ok(())
            }
            SourceKind::Unknown => Err(FetchError::UnsupportedType(source.url.clone())),
        }
    }
}

/// Where a downloaded tar or file artifact is stored
fn artifact_path(downloads_dir: &Path, source: &Source, module_name: &str) -> PathBuf {
    let base = downloads_dir.join(get_source_path(source, module_name));
    match source.kind {
        SourceKind::Tar => {
            let mut name = base.into_os_string();
            name.push(".tar");
            PathBuf::from(name)
        }
        _ => base.join(file_name(source)),
    }
}

fn file_name(source: &Source) -> &str {
    match source.url_leaf() {
        "" => "download",
        leaf => leaf,
    }
}

fn git_error<E: std::fmt::Display>(context: String) -> impl FnOnce(E) -> FetchError {
    move |e| FetchError::Git(format!("{context}: {e}"))
}

fn clone_git(source: &Source, dest: &Path) -> Result<(), FetchError> {
    if dest.exists() {
        fs::remove_dir_all(dest)?;
    }
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    let clone_err = || format!("failed to clone {}", source.url);
    let mut prepare =
        gix::prepare_clone(source.url.as_str(), dest).map_err(git_error(clone_err()))?;
    let (mut checkout, _) = prepare
        .fetch_then_checkout(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
        .map_err(git_error(clone_err()))?;
    let (repo, _) = checkout
        .main_worktree(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
        .map_err(git_error(clone_err()))?;

    let revision = [&source.commit, &source.tag, &source.branch]
        .into_iter()
        .find(|rev| !rev.is_empty());
    if let Some(rev) = revision {
        debug!("checking out {}", rev);
        checkout_revision(&repo, dest, rev)?;
    }
    Ok(())
}

/// Replaces the worktree with the tree of `rev`; branches other than the
/// default one only exist as `origin/<branch>` after a fresh clone
fn checkout_revision(repo: &gix::Repository, dest: &Path, rev: &str) -> Result<(), FetchError> {
    let id = repo
        .rev_parse_single(rev)
        .or_else(|_| repo.rev_parse_single(format!("origin/{rev}").as_str()))
        .map_err(git_error(format!("failed to resolve revision {rev}")))?;
    let commit = id
        .object()
        .map_err(git_error(format!("failed to read {rev}")))?
        .peel_to_commit()
        .map_err(git_error(format!("{rev} does not name a commit")))?;
    let tree = commit
        .tree()
        .map_err(git_error(format!("failed to read tree of {rev}")))?;

    let mut recorder = gix::traverse::tree::Recorder::default();
    tree.traverse()
        .breadthfirst(&mut recorder)
        .map_err(git_error(format!("failed to walk tree of {rev}")))?;

    for entry in fs::read_dir(dest)? {
        let entry = entry?;
        if entry.file_name() == ".git" {
            continue;
        }
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
    }

    for entry in recorder.records {
        let relative: &gix::bstr::BStr = entry.filepath.as_ref();
        let target = dest.join(gix::path::from_bstr(relative));
        let kind = entry.mode.kind();
        match kind {
            EntryKind::Tree => {
                fs::create_dir_all(&target)?;
                continue;
            }
            // submodules are not materialized
            EntryKind::Commit => continue,
            EntryKind::Blob | EntryKind::BlobExecutable | EntryKind::Link => {}
        }

        let object = repo
            .find_object(entry.oid)
            .map_err(git_error(format!("missing object for {relative}")))?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        if kind == EntryKind::Link {
            write_symlink(&object.data, &target)?;
        } else {
            fs::write(&target, &object.data)?;
            if kind == EntryKind::BlobExecutable {
                make_executable(&target)?;
            }
        }
    }
    Ok(())
}

#[cfg(unix)]
fn write_symlink(link_target: &[u8], path: &Path) -> Result<(), FetchError> {
    use std::os::unix::ffi::OsStrExt;
    std::os::unix::fs::symlink(std::ffi::OsStr::from_bytes(link_target), path)?;
    Ok(())
}

#[cfg(not(unix))]
fn write_symlink(link_target: &[u8], path: &Path) -> Result<(), FetchError> {
    fs::write(path, link_target)?;
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<(), FetchError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<(), FetchError> {
    Ok(())
}

fn download_http(source: &Source, artifact: &Path) -> Result<(), FetchError> {
    let http_err = |source_err: reqwest::Error| FetchError::Http {
        url: source.url.clone(),
        source: source_err,
    };
    let bytes = reqwest::blocking::get(source.url.as_str())
        .and_then(|resp| resp.error_for_status())
        .and_then(|resp| resp.bytes())
        .map_err(http_err)?;

    if !source.checksum.is_empty() {
        verify_checksum(&source.url, &bytes, &source.checksum)?;
    }

    if let Some(parent) = artifact.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(artifact, &bytes)?;
    debug!("downloaded {} bytes to {:?}", bytes.len(), artifact);
    Ok(())
}

fn verify_checksum(url: &str, data: &[u8], expected: &str) -> Result<(), FetchError> {
    let actual = hex::encode(Sha256::digest(data));
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(FetchError::ChecksumMismatch {
            url: url.to_string(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

fn unpack_tar(artifact: &Path, dest: &Path) -> Result<(), FetchError> {
    let mut file = File::open(artifact)?;
    let mut magic = [0u8; 2];
    let is_gzip = file.read_exact(&mut magic).is_ok() && magic == GZIP_MAGIC;
    file.seek(SeekFrom::Start(0))?;

    let reader = BufReader::new(file);
    if is_gzip {
        tar::Archive::new(GzDecoder::new(reader)).unpack(dest)?;
    } else {
        tar::Archive::new(reader).unpack(dest)?;
    }
    Ok(())
}

/// Moves a downloaded tree into place, merging into `dest` when an earlier
/// source of the same module already populated it
fn place_tree(from: &Path, dest: &Path) -> Result<(), FetchError> {
    if !dest.exists() {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        if fs::rename(from, dest).is_ok() {
            return Ok(());
        }
    }

    // rename fails across mount points and onto existing directories
    copy_tree(from, dest)?;
    if from.is_dir() {
        fs::remove_dir_all(from)?;
    } else {
        fs::remove_file(from)?;
    }
    Ok(())
}

fn copy_tree(from: &Path, to: &Path) -> Result<(), FetchError> {
    if from.is_file() {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(from, to)?;
        return Ok(());
    }

    for entry in WalkDir::new(from) {
        let entry = entry.map_err(std::io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ModuleDescriptor, ModuleResolver};
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use tempfile::TempDir;

    fn recipe_in(root: &Path) -> RecipeContext {
        RecipeContext {
            downloads_path: root.join("downloads").to_string_lossy().to_string(),
            sources_path: root.join("sources").to_string_lossy().to_string(),
        }
    }

    fn write_tar_gz(path: &Path) {
        let file = File::create(path).unwrap();
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        let content = b"fn main() {}\n";
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, "src/main.rs", &content[..])
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn test_local_source_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let project = temp_dir.path().join("project");
        fs::create_dir_all(project.join("src")).unwrap();
        fs::write(project.join("Cargo.toml"), "[package]\nname = \"foo\"\n").unwrap();
        fs::write(project.join("src/main.rs"), "fn main() {}\n").unwrap();

        let recipe = recipe_in(temp_dir.path());
        let source = Source {
            url: project.to_string_lossy().to_string(),
            kind: SourceKind::Local,
            ..Default::default()
        };

        let fetcher = FsSourceFetcher;
        fetcher.download_source(&recipe, &source, "foo").unwrap();
        assert!(temp_dir.path().join("downloads/foo/Cargo.toml").exists());

        fetcher
            .move_source(
                Path::new(&recipe.downloads_path),
                Path::new(&recipe.sources_path),
                &source,
                "foo",
            )
            .unwrap();
        assert!(temp_dir.path().join("sources/foo/src/main.rs").exists());
        assert!(!temp_dir.path().join("downloads/foo").exists());
    }

    fn write_project(dir: &Path) {
        fs::create_dir_all(dir.join("src")).unwrap();
        fs::write(dir.join("Cargo.toml"), "[package]\nname = \"foo\"\n").unwrap();
        fs::write(dir.join("src/main.rs"), "fn main() {}\n").unwrap();
    }

    #[test]
    fn test_later_local_source_keeps_earlier_destination() {
        let temp_dir = TempDir::new().unwrap();
        let vendored = temp_dir.path().join("b");
        let main = temp_dir.path().join("a");
        write_project(&vendored);
        write_project(&main);

        let recipe = recipe_in(temp_dir.path());
        let sources = vec![
            Source {
                url: vendored.to_string_lossy().to_string(),
                kind: SourceKind::Local,
                destination: "vendor".to_string(),
                ..Default::default()
            },
            Source {
                url: main.to_string_lossy().to_string(),
                kind: SourceKind::Local,
                ..Default::default()
            },
        ];
        let module = ModuleDescriptor {
            name: "foo".to_string(),
            sources,
            ..Default::default()
        };

        let outcome = ModuleResolver::new(FsSourceFetcher)
            .build_module(&module, &recipe, "amd64")
            .unwrap();
        assert!(outcome.command().unwrap().starts_with("cd /sources/foo/vendor && "));

        let sources_dir = temp_dir.path().join("sources/foo");
        assert!(sources_dir.join("vendor/Cargo.toml").exists());
        assert!(sources_dir.join("vendor/src/main.rs").exists());
        assert!(sources_dir.join("Cargo.toml").exists());
        assert!(sources_dir.join("src/main.rs").exists());
    }

    #[test]
    fn test_git_clone_failure_is_git_error() {
        let temp_dir = TempDir::new().unwrap();
        let recipe = recipe_in(temp_dir.path());
        let missing = temp_dir.path().join("missing.git");
        let source = Source {
            url: missing.to_string_lossy().to_string(),
            kind: SourceKind::Git,
            tag: "v1.0.0".to_string(),
            ..Default::default()
        };

        let err = FsSourceFetcher
            .download_source(&recipe, &source, "foo")
            .unwrap_err();
        assert!(matches!(err, FetchError::Git(_)));
        assert!(err.to_string().starts_with("git error: failed to clone"));
    }

    #[test]
    fn test_unpack_gzipped_tar() {
        let temp_dir = TempDir::new().unwrap();
        let downloads = temp_dir.path().join("downloads");
        let sources = temp_dir.path().join("sources");
        fs::create_dir_all(&downloads).unwrap();

        let source = Source {
            url: "https://example.com/foo.tar.gz".to_string(),
            kind: SourceKind::Tar,
            ..Default::default()
        };
        write_tar_gz(&artifact_path(&downloads, &source, "foo"));

        FsSourceFetcher
            .move_source(&downloads, &sources, &source, "foo")
            .unwrap();
        let main_rs = fs::read_to_string(sources.join("foo/src/main.rs")).unwrap();
        assert_eq!(main_rs, "fn main() {}\n");
    }

    #[test]
    fn test_file_source_is_copied_under_module() {
        let temp_dir = TempDir::new().unwrap();
        let downloads = temp_dir.path().join("downloads");
        let sources = temp_dir.path().join("sources");
        let source = Source {
            url: "https://example.com/patches/fix.patch".to_string(),
            kind: SourceKind::File,
            destination: "patches".to_string(),
            ..Default::default()
        };
        let artifact = artifact_path(&downloads, &source, "foo");
        assert_eq!(artifact, downloads.join("foo/patches/fix.patch"));
        fs::create_dir_all(artifact.parent().unwrap()).unwrap();
        fs::write(&artifact, "diff").unwrap();

        FsSourceFetcher
            .move_source(&downloads, &sources, &source, "foo")
            .unwrap();
        assert_eq!(
            fs::read_to_string(sources.join("foo/patches/fix.patch")).unwrap(),
            "diff"
        );
    }

    #[test]
    fn test_checksum_verification() {
        let data = b"hello";
        let good = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";
        assert!(verify_checksum("u", data, good).is_ok());
        assert!(verify_checksum("u", data, &good.to_uppercase()).is_ok());

        let err = verify_checksum("u", data, "deadbeef").unwrap_err();
        assert!(matches!(err, FetchError::ChecksumMismatch { .. }));
        assert!(err.to_string().contains("expected deadbeef"));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let recipe = recipe_in(temp_dir.path());
        let source = Source {
            url: "svn://example.com/repo".to_string(),
            ..Default::default()
        };

        let err = FsSourceFetcher
            .download_source(&recipe, &source, "foo")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "unsupported source type for svn://example.com/repo"
        );
    }

    #[test]
    fn test_tar_artifact_path() {
        let source = Source {
            url: "https://example.com/foo.tar.gz".to_string(),
            kind: SourceKind::Tar,
            destination: "src".to_string(),
            ..Default::default()
        };
        assert_eq!(
            artifact_path(Path::new("/dl"), &source, "foo"),
            PathBuf::from("/dl/foo/src.tar")
        );
    }
}
