//! Registry mutations produced by one unit of indexing work.

use shared_types::{ContentHash, Name};

/// Put or delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Put,
    Delete,
}

/// A single registry mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationOp {
    pub kind: MutationKind,
    pub name: Name,
    pub content_hash: ContentHash,
}

impl MutationOp {
    pub fn put(name: Name, content_hash: ContentHash) -> Self {
        Self {
            kind: MutationKind::Put,
            name,
            content_hash,
        }
    }

    pub fn delete(name: Name, content_hash: ContentHash) -> Self {
        Self {
            kind: MutationKind::Delete,
            name,
            content_hash,
        }
    }
}

/// Ordered batch of mutations. Applied atomically in generation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationBatch {
    ops: Vec<MutationOp>,
}

impl MutationBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: MutationOp) {
        self.ops.push(op);
    }

    pub fn ops(&self) -> &[MutationOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Operations touching `name`, in order.
    pub fn for_name<'a>(&'a self, name: &'a Name) -> impl Iterator<Item = &'a MutationOp> + 'a {
        self.ops.iter().filter(move |op| &op.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MutationOp> {
        self.ops.iter()
    }
}

impl IntoIterator for MutationBatch {
    type Item = MutationOp;
    type IntoIter = std::vec::IntoIter<MutationOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

impl<'a> IntoIterator for &'a MutationBatch {
    type Item = &'a MutationOp;
    type IntoIter = std::slice::Iter<'a, MutationOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}
