//! Bounded per-client cursor cache (C8): 256 hash buckets plus an intrusive
//! LRU list over an arena of nodes, matching the donor's `cursor_cache[256]`
//! bucket-head array and `cursor_cache_lru` ring without the cyclic `Rc`
//! ownership that a naive port would reach for (see the spec's design notes).

use std::rc::Rc;

const BUCKET_COUNT: usize = 256;

/// Something a [`CursorItem`] wraps: released back to its group allocator
/// when the last shared reference to the item is dropped.
pub trait CursorPayload {
    fn release(self, group_id: u32);
}

struct ItemInner<P: CursorPayload> {
    group_id: u32,
    payload: Option<P>,
}

impl<P: CursorPayload> Drop for ItemInner<P> {
    fn drop(&mut self) {
        if let Some(payload) = self.payload.take() {
            payload.release(self.group_id);
        }
    }
}

/// Reference-counted handle to a cached cursor command. Cloning bumps the
/// refcount; the pipe item and the cache each hold one share. The payload is
/// released to its group allocator when the last clone is dropped.
pub struct CursorItem<P: CursorPayload> {
    inner: Rc<ItemInner<P>>,
}

impl<P: CursorPayload> CursorItem<P> {
    pub fn new(group_id: u32, payload: P) -> Self {
        Self {
            inner: Rc::new(ItemInner {
                group_id,
                payload: Some(payload),
            }),
        }
    }

    pub fn group_id(&self) -> u32 {
        self.inner.group_id
    }

    /// Number of shared references currently alive (cache + any pipe items).
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.inner)
    }
}

impl<P: CursorPayload> Clone for CursorItem<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

struct Node<P: CursorPayload> {
    id: u64,
    item: CursorItem<P>,
    size: usize,
    bucket_next: Option<usize>,
    lru_prev: Option<usize>,
    lru_next: Option<usize>,
}

/// Fixed-capacity bounded cache, one per client. Eviction runs from the LRU
/// tail until both the item-count and byte-budget constraints are satisfied.
pub struct CursorCache<P: CursorPayload> {
    nodes: Vec<Option<Node<P>>>,
    free: Vec<usize>,
    buckets: Box<[Option<usize>; BUCKET_COUNT]>,
    lru_head: Option<usize>,
    lru_tail: Option<usize>,
    items: usize,
    max_items: usize,
    available_bytes: i64,
    byte_budget: i64,
}

impl<P: CursorPayload> CursorCache<P> {
    /// Creates an empty cache with the given item cap and byte budget.
    pub fn new(max_items: usize, byte_budget: i64) -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            buckets: Box::new([None; BUCKET_COUNT]),
            lru_head: None,
            lru_tail: None,
            items: 0,
            max_items,
            available_bytes: byte_budget,
            byte_budget,
        }
    }

    pub fn items(&self) -> usize {
        self.items
    }

    pub fn available_bytes(&self) -> i64 {
        self.available_bytes
    }

    fn bucket_of(id: u64) -> usize {
        (id & 0xFF) as usize
    }

    /// Looks up `id`; on hit, promotes the entry to the LRU head and returns
    /// a fresh shared reference.
    pub fn lookup(&mut self, id: u64) -> Option<CursorItem<P>> {
        let bucket = Self::bucket_of(id);
        let mut cursor = self.buckets[bucket];
        while let Some(idx) = cursor {
            let node = self.nodes[idx].as_ref().unwrap();
            if node.id == id {
                self.move_to_lru_head(idx);
                return Some(self.nodes[idx].as_ref().unwrap().item.clone());
            }
            cursor = node.bucket_next;
        }
        None
    }

    /// Inserts a new entry, evicting LRU-tail entries first to make room.
    /// A pre-existing entry for `id` is not deduplicated — callers check
    /// [`CursorCache::lookup`] first, as the sibling cursor channel does.
    pub fn insert(&mut self, id: u64, item: CursorItem<P>, size: usize) {
        self.make_room_for(size);

        let idx = self.alloc_slot(Node {
            id,
            item,
            size,
            bucket_next: None,
            lru_prev: None,
            lru_next: None,
        });

        let bucket = Self::bucket_of(id);
        self.nodes[idx].as_mut().unwrap().bucket_next = self.buckets[bucket];
        self.buckets[bucket] = Some(idx);

        self.link_at_lru_head(idx);
        self.items += 1;
        self.available_bytes -= size as i64;
    }

    /// Drops every entry and reports whether anything was actually cached,
    /// so the caller can decide whether an INVAL_CURSOR_CACHE pipe item is
    /// worth emitting.
    pub fn invalidate_all(&mut self) -> bool {
        let had_entries = self.items > 0;
        self.nodes.clear();
        self.free.clear();
        self.buckets = Box::new([None; BUCKET_COUNT]);
        self.lru_head = None;
        self.lru_tail = None;
        self.items = 0;
        self.available_bytes = self.byte_budget;
        had_entries
    }

    fn make_room_for(&mut self, size: usize) {
        while self.items >= self.max_items || self.available_bytes < size as i64 {
            let Some(tail) = self.lru_tail else { break };
            self.evict(tail);
        }
    }

    fn evict(&mut self, idx: usize) {
        self.unlink_from_lru(idx);
        self.unlink_from_bucket(idx);
        let node = self.nodes[idx].take().unwrap();
        self.available_bytes += node.size as i64;
        self.items -= 1;
        self.free.push(idx);
        // `node.item` drops here; when it was the last reference the
        // payload is released to its group allocator.
    }

    fn unlink_from_bucket(&mut self, idx: usize) {
        let id = self.nodes[idx].as_ref().unwrap().id;
        let bucket = Self::bucket_of(id);
        let mut cursor = self.buckets[bucket];
        let mut prev: Option<usize> = None;
        while let Some(cur) = cursor {
            let next = self.nodes[cur].as_ref().unwrap().bucket_next;
            if cur == idx {
                match prev {
                    Some(p) => self.nodes[p].as_mut().unwrap().bucket_next = next,
                    None => self.buckets[bucket] = next,
                }
                return;
            }
            prev = Some(cur);
            cursor = next;
        }
    }

    fn unlink_from_lru(&mut self, idx: usize) {
        let (prev, next) = {
            let node = self.nodes[idx].as_ref().unwrap();
            (node.lru_prev, node.lru_next)
        };
        match prev {
            Some(p) => self.nodes[p].as_mut().unwrap().lru_next = next,
            None => self.lru_head = next,
        }
        match next {
            Some(n) => self.nodes[n].as_mut().unwrap().lru_prev = prev,
            None => self.lru_tail = prev,
        }
    }

    fn link_at_lru_head(&mut self, idx: usize) {
        let old_head = self.lru_head;
        {
            let node = self.nodes[idx].as_mut().unwrap();
            node.lru_prev = None;
            node.lru_next = old_head;
        }
        if let Some(h) = old_head {
            self.nodes[h].as_mut().unwrap().lru_prev = Some(idx);
        }
        self.lru_head = Some(idx);
        if self.lru_tail.is_none() {
            self.lru_tail = Some(idx);
        }
    }

    fn move_to_lru_head(&mut self, idx: usize) {
        if self.lru_head == Some(idx) {
            return;
        }
        self.unlink_from_lru(idx);
        self.link_at_lru_head(idx);
    }

    fn alloc_slot(&mut self, node: Node<P>) -> usize {
        if let Some(idx) = self.free.pop() {
            self.nodes[idx] = Some(node);
            idx
        } else {
            self.nodes.push(Some(node));
            self.nodes.len() - 1
        }
    }

    #[cfg(test)]
    fn lru_len(&self) -> usize {
        let mut count = 0;
        let mut cursor = self.lru_head;
        while let Some(idx) = cursor {
            count += 1;
            cursor = self.nodes[idx].as_ref().unwrap().lru_next;
        }
        count
    }

    #[cfg(test)]
    fn bucket_len_sum(&self) -> usize {
        let mut count = 0;
        for head in self.buckets.iter() {
            let mut cursor = *head;
            while let Some(idx) = cursor {
                count += 1;
                cursor = self.nodes[idx].as_ref().unwrap().bucket_next;
            }
        }
        count
    }
}
