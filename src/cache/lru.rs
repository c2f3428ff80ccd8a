//! Recency List Module
//!
//! Arena-backed doubly linked list ordering entries by last access.

// Null link between slots.
const NIL: usize = usize::MAX;

// == Node Handle ==
/// Handle to a node in a [`RecencyList`].
///
/// Each slot carries a generation that is bumped when its node is removed, so a
/// handle outliving its node never resolves to whatever later reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: usize,
    generation: u64,
}

#[derive(Debug)]
struct Slot<T> {
    item: Option<T>,
    generation: u64,
    prev: usize,
    next: usize,
}

// == Recency List ==
/// Doubly linked list with O(1) push, move-to-front and removal by handle.
///
/// - Front = Most recently used
/// - Back = Least recently used
#[derive(Debug)]
pub struct RecencyList<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    head: usize,
    tail: usize,
    len: usize,
}

impl<T> Default for RecencyList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RecencyList<T> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty list with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
            len: 0,
        }
    }

    /// Returns the number of linked nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Push Front ==
    /// Links `item` at the front and returns its handle.
    pub fn push_front(&mut self, item: T) -> NodeId {
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index].item = Some(item);
                index
            }
            None => {
                self.slots.push(Slot {
                    item: Some(item),
                    generation: 0,
                    prev: NIL,
                    next: NIL,
                });
                self.slots.len() - 1
            }
        };

        self.link_front(index);
        self.len += 1;

        NodeId {
            index,
            generation: self.slots[index].generation,
        }
    }

    // == Get ==
    /// Returns the item behind `id`, or None if the handle is stale.
    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.resolve(id).and_then(|index| self.slots[index].item.as_ref())
    }

    // == Move To Front ==
    /// Marks the node as most recently used.
    ///
    /// Returns false if the handle is stale.
    pub fn move_to_front(&mut self, id: NodeId) -> bool {
        let Some(index) = self.resolve(id) else {
            return false;
        };
        if self.head != index {
            self.unlink(index);
            self.link_front(index);
        }
        true
    }

    // == Remove ==
    /// Unlinks the node and returns its item, or None if the handle is stale.
    pub fn remove(&mut self, id: NodeId) -> Option<T> {
        let index = self.resolve(id)?;
        Some(self.release(index))
    }

    // == Back ==
    /// Returns the handle of the least recently used node.
    pub fn back(&self) -> Option<NodeId> {
        (self.tail != NIL).then(|| NodeId {
            index: self.tail,
            generation: self.slots[self.tail].generation,
        })
    }

    /// Returns the most recently used item.
    pub fn front(&self) -> Option<&T> {
        if self.head == NIL {
            return None;
        }
        self.slots[self.head].item.as_ref()
    }

    // == Pop Back ==
    /// Unlinks and returns the least recently used item.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.tail == NIL {
            return None;
        }
        Some(self.release(self.tail))
    }

    // == Clear ==
    /// Unlinks every node. Handles issued before the call become stale.
    pub fn clear(&mut self) {
        self.free.clear();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.item.take().is_some() {
                slot.generation += 1;
            }
            slot.prev = NIL;
            slot.next = NIL;
            self.free.push(index);
        }
        self.head = NIL;
        self.tail = NIL;
        self.len = 0;
    }

    /// Iterates items from most to least recently used.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    fn resolve(&self, id: NodeId) -> Option<usize> {
        let slot = self.slots.get(id.index)?;
        (slot.generation == id.generation && slot.item.is_some()).then_some(id.index)
    }

    fn release(&mut self, index: usize) -> T {
        self.unlink(index);
        self.len -= 1;
        self.free.push(index);

        let slot = &mut self.slots[index];
        slot.generation += 1;
        slot.item
            .take()
            .unwrap_or_else(|| unreachable!("linked slot {index} holds no item"))
    }

    fn link_front(&mut self, index: usize) {
        let old_head = self.head;
        {
            let slot = &mut self.slots[index];
            slot.prev = NIL;
            slot.next = old_head;
        }
        if old_head != NIL {
            self.slots[old_head].prev = index;
        } else {
            self.tail = index;
        }
        self.head = index;
    }

    fn unlink(&mut self, index: usize) {
        let (prev, next) = {
            let slot = &self.slots[index];
            (slot.prev, slot.next)
        };

        if prev != NIL {
            self.slots[prev].next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.slots[next].prev = prev;
        } else {
            self.tail = prev;
        }

        let slot = &mut self.slots[index];
        slot.prev = NIL;
        slot.next = NIL;
    }
}

// == Iterator ==
/// Front-to-back iterator over a [`RecencyList`].
pub struct Iter<'a, T> {
    list: &'a RecencyList<T>,
    cursor: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == NIL {
            return None;
        }
        let slot = &self.list.slots[self.cursor];
        self.cursor = slot.next;
        slot.item.as_ref()
    }
}
