// src/core/fs_ops.rs
//! File system operations for résumé files: scoped reads, staging, and
//! replace-on-write for downloads.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Platform sandbox that may require explicit access grants for files the
/// user picked outside the app's own storage.
pub trait SecurityScope: Send + Sync {
    /// Request access. Returns `false` when the platform refuses the grant.
    fn start_access(&self, path: &Path) -> bool;

    /// Release a grant previously returned by `start_access`.
    fn stop_access(&self, path: &Path);
}

/// Scope for platforms without sandboxed file access. Every request is granted.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnrestrictedScope;

impl SecurityScope for UnrestrictedScope {
    fn start_access(&self, _path: &Path) -> bool {
        true
    }

    fn stop_access(&self, _path: &Path) {}
}

/// Held for as long as a file's bytes are being read. Releases the grant on
/// drop, on every exit path, and only if it was actually granted.
pub struct ScopedAccess<'a> {
    scope: &'a dyn SecurityScope,
    path: &'a Path,
    granted: bool,
}

impl<'a> ScopedAccess<'a> {
    pub fn acquire(scope: &'a dyn SecurityScope, path: &'a Path) -> Self {
        let granted = scope.start_access(path);
        if !granted {
            debug!("Scoped access not granted for {}", path.display());
        }
        Self {
            scope,
            path,
            granted,
        }
    }

    pub fn is_granted(&self) -> bool {
        self.granted
    }
}

impl Drop for ScopedAccess<'_> {
    fn drop(&mut self) {
        if self.granted {
            self.scope.stop_access(self.path);
        }
    }
}

/// A file written next to its final location. Removed on drop unless it was
/// promoted onto that location.
#[derive(Debug)]
pub struct PendingFile {
    path: PathBuf,
    promoted: bool,
}

impl PendingFile {
    fn beside(dest: &Path) -> Self {
        let name = dest
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path: dest.with_file_name(format!(".{}.{}.partial", name, Uuid::new_v4())),
            promoted: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Move onto `dest` in one rename, replacing whatever was there.
    pub async fn promote(mut self, dest: &Path) -> io::Result<PathBuf> {
        fs::rename(&self.path, dest).await?;
        self.promoted = true;
        debug!("Promoted {} to {}", self.path.display(), dest.display());
        Ok(dest.to_path_buf())
    }
}

impl Drop for PendingFile {
    fn drop(&mut self) {
        if self.promoted {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Discarded {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove {}: {}", self.path.display(), e),
        }
    }
}

pub struct FsOps;

impl FsOps {
    /// Read a whole file while holding scoped access to it.
    pub async fn read_scoped(scope: &dyn SecurityScope, path: &Path) -> io::Result<Vec<u8>> {
        let _access = ScopedAccess::acquire(scope, path);
        fs::read(path).await
    }

    /// Copy a user-picked file next to `dest`. Nothing at `dest` changes
    /// until the returned file is promoted.
    ///
    /// Fails with `PermissionDenied` when the scope refuses access to `src`.
    pub async fn stage_file(
        scope: &dyn SecurityScope,
        src: &Path,
        dest: &Path,
    ) -> io::Result<PendingFile> {
        let data = {
            let access = ScopedAccess::acquire(scope, src);
            if !access.is_granted() {
                warn!("Access to {} was refused", src.display());
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    format!("access to {} was refused", src.display()),
                ));
            }
            fs::read(src).await?
        };

        Self::ensure_parent(dest).await?;
        let pending = PendingFile::beside(dest);
        fs::write(pending.path(), &data).await?;
        info!("Staged {} at {}", src.display(), pending.path().display());
        Ok(pending)
    }

    /// Write `chunks` next to `dest`, then move the result onto `dest`.
    /// Returns the number of bytes written. An empty stream or any error
    /// leaves `dest` as it was.
    pub async fn replace_from_stream<S, E>(dest: &Path, chunks: S) -> Result<u64, E>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: From<io::Error>,
    {
        let mut chunks = std::pin::pin!(chunks);
        Self::ensure_parent(dest).await?;

        let pending = PendingFile::beside(dest);
        let mut file = fs::File::create(pending.path()).await?;
        let mut written: u64 = 0;
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        drop(file);

        if written == 0 {
            return Ok(0);
        }
        pending.promote(dest).await?;
        info!("Written {} bytes to {}", written, dest.display());
        Ok(written)
    }

    pub async fn ensure_dir_exists(path: &Path) -> io::Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
            info!("Created directory: {}", path.display());
        }
        Ok(())
    }

    async fn ensure_parent(path: &Path) -> io::Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => Self::ensure_dir_exists(parent).await,
            _ => Ok(()),
        }
    }
}
