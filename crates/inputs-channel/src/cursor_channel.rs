//! Cursor channel client (C8): the bounded per-client cursor cache, wired to
//! a concrete cursor-command payload and its own outbound pipe. Co-located
//! here because it shares the cache/LRU pattern with the inputs channel,
//! even though it belongs to the sibling cursor channel (§1).

use std::collections::VecDeque;

use inputs_core::{CursorCache, CursorItem, CursorPayload};

/// Default per-client item cap (§4.8).
pub const CLIENT_CURSOR_CACHE_ITEMS_MAX: usize = 256;

/// A cursor command handed off to a group allocator when its last shared
/// reference drops. The allocator hook is a plain closure rather than a
/// trait object so tests can observe releases without a mock type.
pub struct CursorCommand<F: FnOnce(u32)> {
    pub on_release: F,
}

impl<F: FnOnce(u32)> CursorPayload for CursorCommand<F> {
    fn release(self, group_id: u32) {
        (self.on_release)(group_id);
    }
}

/// Outbound items queued by the cursor channel client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorPipeItem {
    InvalCursorCache,
}

/// Per-client cursor cache plus its outbound pipe.
pub struct CursorChannelClient<F: FnOnce(u32)> {
    cache: CursorCache<CursorCommand<F>>,
    pipe: VecDeque<CursorPipeItem>,
}

impl<F: FnOnce(u32)> CursorChannelClient<F> {
    pub fn new(byte_budget: i64) -> Self {
        Self {
            cache: CursorCache::new(CLIENT_CURSOR_CACHE_ITEMS_MAX, byte_budget),
            pipe: VecDeque::new(),
        }
    }

    pub fn lookup(&mut self, id: u64) -> Option<CursorItem<CursorCommand<F>>> {
        self.cache.lookup(id)
    }

    pub fn insert(&mut self, id: u64, item: CursorItem<CursorCommand<F>>, size: usize) {
        self.cache.insert(id, item, size);
    }

    /// Drops every cached entry and, if anything was actually cached,
    /// enqueues an `INVAL_CURSOR_CACHE` pipe item so the client mirrors the
    /// flush (§4.8).
    pub fn invalidate_all(&mut self) {
        if self.cache.invalidate_all() {
            self.pipe.push_back(CursorPipeItem::InvalCursorCache);
        }
    }

    pub fn drain_pipe(&mut self) -> Vec<CursorPipeItem> {
        self.pipe.drain(..).collect()
    }

    pub fn items(&self) -> usize {
        self.cache.items()
    }
}
