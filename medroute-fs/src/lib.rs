//! Capability-scoped file access for capacity snapshots and request files.
//!
//! Every helper resolves the containing directory once with ambient
//! authority and then works relative to that directory handle, so a
//! snapshot rewrite never follows a path outside the directory it names.
#![forbid(unsafe_code)]

use std::io::{self, Read, Write};
use std::path::Component;
use std::sync::atomic::{AtomicU64, Ordering};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use fs2::FileExt;
use log::debug;

static STAGING_COUNTER: AtomicU64 = AtomicU64::new(0);

fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Read a whole UTF-8 text file.
pub fn read_utf8(path: &Utf8Path) -> io::Result<String> {
    let mut contents = String::new();
    open_utf8_file(path)?.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Report whether `path` names an existing regular file.
///
/// A missing parent directory or file surfaces as
/// [`io::ErrorKind::NotFound`] so callers can tell absence from other IO
/// failures.
pub fn is_regular_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = containing_dir(path)?;
    dir.metadata(name.as_str()).map(|meta| meta.is_file())
}

/// Create every missing directory above `path`.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }
    let (base, relative) = split_anchor(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base.create_dir_all(&relative)
}

/// Exclusive advisory lock guarding a file across processes.
///
/// Dropping the guard closes the lock file and releases the lock. The lock
/// file itself stays on disk so later holders lock the same inode.
#[derive(Debug)]
pub struct FileLock {
    file: std::fs::File,
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(err) = FileExt::unlock(&self.file) {
            debug!("releasing file lock failed: {err}");
        }
    }
}

/// Block until this process holds the exclusive lock for `path`.
///
/// The lock lives on a sibling `.<name>.lock` file, created on first use,
/// so the guarded file can still be replaced by [`write_atomically`] while
/// the lock is held.
pub fn lock_exclusive(path: &Utf8Path) -> io::Result<FileLock> {
    let (dir, name) = containing_dir(path)?;
    let mut options = fs_utf8::OpenOptions::new();
    options.create(true).write(true);
    let file = dir.open_with(format!(".{name}.lock"), &options)?.into_std();
    FileExt::lock_exclusive(&file)?;
    debug!("locked {path}");
    Ok(FileLock { file })
}

/// Replace the contents of `path` without exposing a partial write.
///
/// The bytes go to a sibling staging file, unique to this process and call,
/// which is then renamed over the target, so readers observe either the old
/// file or the new one.
pub fn write_atomically(path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let (dir, name) = containing_dir(path)?;
    let staging = format!(
        ".{name}.{}.{}.tmp",
        std::process::id(),
        STAGING_COUNTER.fetch_add(1, Ordering::Relaxed)
    );
    {
        let mut file = dir.create(&staging)?;
        file.write_all(contents)?;
        file.sync_all()?;
    }
    dir.rename(&staging, &dir, &name)?;
    debug!("wrote {} bytes to {path}", contents.len());
    Ok(())
}

fn containing_dir(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?
        .to_owned();
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, name))
}

/// Split `dir` into an ambient anchor directory and the path below it.
///
/// Absolute paths anchor at their root (or Windows prefix); relative paths
/// anchor at the current directory.
fn split_anchor(dir: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let std_dir = dir.as_std_path();
    let anchor = match std_dir.components().next() {
        Some(Component::Prefix(prefix)) => {
            let prefix = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;
            Utf8PathBuf::from(prefix).join(std::path::MAIN_SEPARATOR.to_string())
        }
        Some(Component::RootDir) => Utf8PathBuf::from(std::path::MAIN_SEPARATOR.to_string()),
        _ => Utf8PathBuf::from("."),
    };
    let relative = if anchor == Utf8Path::new(".") {
        dir.to_path_buf()
    } else {
        dir.strip_prefix(&anchor)
            .map_err(|_| io::Error::other(format!("cannot strip {anchor} from {dir}")))?
            .to_path_buf()
    };
    let base = fs_utf8::Dir::open_ambient_dir(&anchor, ambient_authority())?;
    Ok((base, relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::sync::atomic::AtomicBool;
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    #[fixture]
    fn workspace() -> (TempDir, Utf8PathBuf) {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
        (tmp, root)
    }

    #[rstest]
    fn atomic_write_creates_parents_and_replaces(workspace: (TempDir, Utf8PathBuf)) {
        let (_tmp, root) = workspace;
        let target = root.join("snapshots/today/facilities.json");

        write_atomically(&target, b"[]").expect("first write");
        write_atomically(&target, b"[1]").expect("second write");

        assert_eq!(read_utf8(&target).expect("read back"), "[1]");
        let leftovers: Vec<_> = std::fs::read_dir(root.join("snapshots/today"))
            .expect("list directory")
            .map(|entry| {
                let name = entry.expect("entry").file_name();
                name.into_string().expect("utf-8 name")
            })
            .collect();
        assert_eq!(leftovers, ["facilities.json"]);
    }

    #[rstest]
    fn concurrent_writers_never_collide(workspace: (TempDir, Utf8PathBuf)) {
        let (_tmp, root) = workspace;
        let target = root.join("facilities.json");

        thread::scope(|scope| {
            let writers: Vec<_> = (0..8)
                .map(|n| {
                    let target = &target;
                    scope.spawn(move || write_atomically(target, format!("[{n}]").as_bytes()))
                })
                .collect();
            for writer in writers {
                writer.join().expect("writer thread").expect("write succeeds");
            }
        });

        let contents = read_utf8(&target).expect("read back");
        assert!(contents.starts_with('[') && contents.ends_with(']'));
    }

    #[rstest]
    fn exclusive_lock_blocks_until_released(workspace: (TempDir, Utf8PathBuf)) {
        let (_tmp, root) = workspace;
        let target = root.join("facilities.json");
        write_atomically(&target, b"[]").expect("write");

        let held = lock_exclusive(&target).expect("first lock");
        let acquired = AtomicBool::new(false);
        thread::scope(|scope| {
            let waiter = scope.spawn(|| {
                let second = lock_exclusive(&target).expect("second lock");
                acquired.store(true, Ordering::SeqCst);
                drop(second);
            });
            thread::sleep(Duration::from_millis(100));
            assert!(!acquired.load(Ordering::SeqCst));
            drop(held);
            waiter.join().expect("waiter thread");
        });
        assert!(acquired.load(Ordering::SeqCst));
        assert!(root.join(".facilities.json.lock").exists());
    }

    #[rstest]
    fn regular_file_checks(workspace: (TempDir, Utf8PathBuf)) {
        let (_tmp, root) = workspace;
        let file = root.join("request.json");
        write_atomically(&file, b"{}").expect("write");

        assert!(is_regular_file(&file).expect("inspect file"));
        assert!(!is_regular_file(&root).expect("inspect directory"));
        let missing = is_regular_file(&root.join("absent.json")).expect_err("missing");
        assert_eq!(missing.kind(), io::ErrorKind::NotFound);
    }

    #[rstest]
    fn ensure_parent_dir_accepts_bare_names() {
        ensure_parent_dir(Utf8Path::new("facilities.json")).expect("nothing to create");
    }
}
