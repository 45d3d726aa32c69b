//! Boundary to the host that owns the live objects.
//!
//! The core reads and writes object state only through
//! [`ObjectStateHost`]; handles are opaque tokens that are never assumed to
//! stay valid beyond a single call.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::HostError;
use crate::line::LineKind;
use crate::scan::{DEFAULT_MAX_DEPTH, Outline};
use crate::text::ChunkText;

/// Kind of host object a handle refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectKind {
    Track,
    Item,
    Take,
}

impl ObjectKind {
    /// Tag the object's state chunk must open with, if the host checks one
    pub fn root_tag(&self) -> Option<&'static str> {
        match self {
            Self::Track => Some("TRACK"),
            Self::Item => Some("ITEM"),
            Self::Take => None,
        }
    }
}

/// Opaque reference to a host-owned track, item or take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectHandle {
    kind: ObjectKind,
    id: u64,
}

impl ObjectHandle {
    pub fn new(kind: ObjectKind, id: u64) -> Self {
        Self { kind, id }
    }

    pub fn track(id: u64) -> Self {
        Self::new(ObjectKind::Track, id)
    }

    pub fn item(id: u64) -> Self {
        Self::new(ObjectKind::Item, id)
    }

    pub fn take(id: u64) -> Self {
        Self::new(ObjectKind::Take, id)
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ObjectKind::Track => "track",
            ObjectKind::Item => "item",
            ObjectKind::Take => "take",
        };
        write!(f, "{kind}#{}", self.id)
    }
}

/// Whether a commit adds an entry to the host's undo history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UndoBehavior {
    #[default]
    AddUndoPoint,
    NoUndoPoint,
}

impl From<bool> for UndoBehavior {
    fn from(add_undo_point: bool) -> Self {
        if add_undo_point {
            Self::AddUndoPoint
        } else {
            Self::NoUndoPoint
        }
    }
}

/// Object state accessors provided by the host.
pub trait ObjectStateHost {
    /// Full current chunk text of `handle`
    fn get_object_state(&self, handle: ObjectHandle) -> Result<String, HostError>;

    /// Replace the state of `handle`. The host reparses `state`; on failure
    /// the live object keeps its previous state.
    fn set_object_state(
        &mut self,
        handle: ObjectHandle,
        state: &str,
        undo: UndoBehavior,
    ) -> Result<(), HostError>;
}

impl<H: ObjectStateHost + ?Sized> ObjectStateHost for &mut H {
    fn get_object_state(&self, handle: ObjectHandle) -> Result<String, HostError> {
        (**self).get_object_state(handle)
    }

    fn set_object_state(
        &mut self,
        handle: ObjectHandle,
        state: &str,
        undo: UndoBehavior,
    ) -> Result<(), HostError> {
        (**self).set_object_state(handle, state, undo)
    }
}

/// In-memory host holding object state as text.
///
/// Writes are reparsed the way the real host does: structurally invalid text
/// or a chunk whose root block does not match the object kind is rejected and
/// the stored state stays as it was.
#[derive(Debug, Clone)]
pub struct MemoryHost {
    objects: HashMap<ObjectHandle, String>,
    undo_points: Vec<ObjectHandle>,
    max_depth: usize,
    rejecting: bool,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self {
            objects: HashMap::new(),
            undo_points: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            rejecting: false,
        }
    }
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an object with its initial state
    pub fn insert(&mut self, handle: ObjectHandle, state: impl Into<String>) {
        self.objects.insert(handle, state.into());
    }

    pub fn remove(&mut self, handle: ObjectHandle) -> Option<String> {
        self.objects.remove(&handle)
    }

    pub fn state(&self, handle: ObjectHandle) -> Option<&str> {
        self.objects.get(&handle).map(String::as_str)
    }

    /// Objects that received an undo point, oldest first
    pub fn undo_points(&self) -> &[ObjectHandle] {
        &self.undo_points
    }

    /// Refuse every write until switched back
    pub fn set_rejecting(&mut self, rejecting: bool) {
        self.rejecting = rejecting;
    }

    fn reparse(&self, handle: ObjectHandle, state: &str) -> Result<(), HostError> {
        let text = ChunkText::load(state).map_err(|e| HostError::Rejected(e.to_string()))?;
        Outline::build(&text, self.max_depth).map_err(|e| HostError::Rejected(e.to_string()))?;

        if let Some(expected) = handle.kind().root_tag() {
            let root = text
                .lines()
                .iter()
                .map(|line| LineKind::classify(line))
                .find(|kind| *kind != LineKind::Blank);
            match root {
                Some(LineKind::Open { tag }) if tag == expected => {}
                _ => {
                    return Err(HostError::Rejected(format!(
                        "state of {handle} must be a <{expected} block"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl ObjectStateHost for MemoryHost {
    fn get_object_state(&self, handle: ObjectHandle) -> Result<String, HostError> {
        self.objects
            .get(&handle)
            .cloned()
            .ok_or(HostError::UnknownObject(handle))
    }

    fn set_object_state(
        &mut self,
        handle: ObjectHandle,
        state: &str,
        undo: UndoBehavior,
    ) -> Result<(), HostError> {
        if !self.objects.contains_key(&handle) {
            return Err(HostError::UnknownObject(handle));
        }
        if self.rejecting {
            return Err(HostError::Rejected("host refused the state change".into()));
        }
        self.reparse(handle, state)?;

        self.objects.insert(handle, state.to_string());
        if undo == UndoBehavior::AddUndoPoint {
            self.undo_points.push(handle);
        }
        Ok(())
    }
}
