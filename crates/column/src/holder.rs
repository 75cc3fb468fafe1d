//! Borrow-or-own container for materialized blocks.

use crate::block::ColumnBlock;
use alloc::sync::Arc;

#[derive(Debug, Default)]
enum Slot {
    #[default]
    Empty,
    Shared(Arc<ColumnBlock>),
    Owned(ColumnBlock),
}

/// Receives the result of `TypedColumnReader::get_block`.
///
/// Holds either a shared handle to an unmodified base block or an owned,
/// patched copy. An owned block is kept across calls so the reader can reuse
/// its allocation.
#[derive(Debug, Default)]
pub struct ColumnBlockHolder {
    slot: Slot,
}

impl ColumnBlockHolder {
    /// Creates an empty holder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Points the holder at a shared block, releasing what it held before.
    pub fn init_shared(&mut self, block: Arc<ColumnBlock>) {
        self.slot = Slot::Shared(block);
    }

    /// Gives the holder ownership of `block`, releasing what it held before.
    pub fn init_owned(&mut self, block: ColumnBlock) {
        self.slot = Slot::Owned(block);
    }

    /// Drops whatever the holder references.
    pub fn release(&mut self) {
        self.slot = Slot::Empty;
    }

    /// Takes the owned block out, leaving the holder empty.
    ///
    /// A shared block is released and `None` returned.
    pub fn take_owned(&mut self) -> Option<ColumnBlock> {
        match core::mem::take(&mut self.slot) {
            Slot::Owned(block) => Some(block),
            _ => None,
        }
    }

    /// Returns true if the holder owns its block.
    #[inline]
    pub fn is_owned(&self) -> bool {
        matches!(self.slot, Slot::Owned(_))
    }

    /// Returns true if the holder references a shared block.
    #[inline]
    pub fn is_shared(&self) -> bool {
        matches!(self.slot, Slot::Shared(_))
    }

    /// Returns the held block.
    #[inline]
    pub fn get(&self) -> Option<&ColumnBlock> {
        match &self.slot {
            Slot::Empty => None,
            Slot::Shared(block) => Some(block),
            Slot::Owned(block) => Some(block),
        }
    }

    /// Returns true if the holder shares exactly `block`.
    pub fn shares(&self, block: &Arc<ColumnBlock>) -> bool {
        match &self.slot {
            Slot::Shared(held) => Arc::ptr_eq(held, block),
            _ => false,
        }
    }
}
