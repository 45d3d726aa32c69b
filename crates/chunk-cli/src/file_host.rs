//! Chunk file on disk standing in for a live host object.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use chunk_core::{
    ChunkText, HostError, LineKind, ObjectHandle, ObjectKind, ObjectStateHost, Outline,
    UndoBehavior,
};

use crate::error::{CliError, Result};

/// A single chunk file exposed through [`ObjectStateHost`].
///
/// The object kind comes from the file's root block. Writes are validated
/// first and land atomically; with an undo point the previous content is
/// kept next to the file as `<name>.bak`.
#[derive(Debug, Clone)]
pub struct FileHost {
    path: PathBuf,
    handle: ObjectHandle,
    max_depth: usize,
}

impl FileHost {
    pub fn open(path: impl Into<PathBuf>, max_depth: usize) -> Result<Self> {
        let path = path.into();
        let content = fs::read_to_string(&path).map_err(|e| CliError::file(&path, e))?;
        let kind = match root_tag(&content).as_deref() {
            Some("TRACK") => ObjectKind::Track,
            Some("ITEM") => ObjectKind::Item,
            _ => ObjectKind::Take,
        };
        tracing::debug!(path = %path.display(), ?kind, "opened chunk file");
        Ok(Self {
            path,
            handle: ObjectHandle::new(kind, 0),
            max_depth,
        })
    }

    pub fn handle(&self) -> ObjectHandle {
        self.handle
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".bak");
        self.path.with_file_name(name)
    }

    fn check(&self, handle: ObjectHandle) -> std::result::Result<(), HostError> {
        if handle == self.handle {
            Ok(())
        } else {
            Err(HostError::UnknownObject(handle))
        }
    }

    fn validate(&self, state: &str) -> std::result::Result<(), HostError> {
        let text = ChunkText::load(state).map_err(|e| HostError::Rejected(e.to_string()))?;
        Outline::build(&text, self.max_depth).map_err(|e| HostError::Rejected(e.to_string()))?;
        match self.handle.kind().root_tag() {
            Some(expected) if root_tag(state).as_deref() != Some(expected) => {
                Err(HostError::Rejected(format!(
                    "{} must hold a <{expected} block",
                    self.path.display()
                )))
            }
            _ => Ok(()),
        }
    }
}

impl ObjectStateHost for FileHost {
    fn get_object_state(&self, handle: ObjectHandle) -> std::result::Result<String, HostError> {
        self.check(handle)?;
        fs::read_to_string(&self.path).map_err(|e| HostError::Rejected(e.to_string()))
    }

    fn set_object_state(
        &mut self,
        handle: ObjectHandle,
        state: &str,
        undo: UndoBehavior,
    ) -> std::result::Result<(), HostError> {
        self.check(handle)?;
        self.validate(state)?;

        if undo == UndoBehavior::AddUndoPoint {
            let previous = self.get_object_state(handle)?;
            write_atomic(&self.backup_path(), previous.as_bytes())
                .map_err(|e| HostError::Rejected(e.to_string()))?;
        }
        write_atomic(&self.path, state.as_bytes()).map_err(|e| HostError::Rejected(e.to_string()))
    }
}

fn root_tag(content: &str) -> Option<String> {
    content
        .lines()
        .map(LineKind::classify)
        .find(|kind| *kind != LineKind::Blank)
        .and_then(|kind| match kind {
            LineKind::Open { tag } => Some(tag),
            _ => None,
        })
}

/// Write content atomically to a file with locking.
///
/// Writes a temp file in the same directory, then renames it over `path`.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| CliError::file(&temp_path, e))?;

    temp_file
        .lock_exclusive()
        .map_err(|_| CliError::LockFailed {
            path: path.to_path_buf(),
        })?;
    temp_file
        .write_all(content)
        .map_err(|e| CliError::file(&temp_path, e))?;
    temp_file
        .sync_all()
        .map_err(|e| CliError::file(&temp_path, e))?;
    FileExt::unlock(&temp_file).map_err(|_| CliError::LockFailed {
        path: path.to_path_buf(),
    })?;

    fs::rename(&temp_path, path).map_err(|e| CliError::file(path, e))?;
    Ok(())
}
