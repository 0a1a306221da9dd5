//! Specialized collection types
//!
//! [`Arena`] is the block-based object pool behind every scene object kind.
//! Storage grows one fixed-capacity block at a time and is never compacted,
//! so a [`SlotAddress`] stays valid from allocation until its explicit
//! deallocation no matter how many other slots are allocated or freed.

/// Number of slots per arena block unless configured otherwise
pub const DEFAULT_BLOCK_SIZE: usize = 64;

/// Stable address of a slot inside an [`Arena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotAddress {
    block: u32,
    slot: u32,
}

impl SlotAddress {
    /// Index of the block holding this slot
    pub fn block(&self) -> usize {
        self.block as usize
    }

    /// Index of the slot within its block
    pub fn slot(&self) -> usize {
        self.slot as usize
    }
}

/// Growable, non-relocating pool of slots with LIFO slot reuse
///
/// The arena does not keep liveness bits of its own beyond the slot contents:
/// callers track which addresses they handed out (the scene registry does so
/// through its flat object list). Deallocating an address twice is a caller
/// bug; the second call is logged and ignored.
pub struct Arena<T> {
    blocks: Vec<Box<[Option<T>]>>,
    block_size: usize,
    /// Slots handed out so far in the tail block
    tail_used: usize,
    free_slots: Vec<SlotAddress>,
    live: usize,
}

impl<T> Arena<T> {
    /// Create an empty arena with the default block size
    pub fn new() -> Self {
        Self::with_block_size(DEFAULT_BLOCK_SIZE)
    }

    /// Create an empty arena whose blocks hold `block_size` slots
    pub fn with_block_size(block_size: usize) -> Self {
        Self {
            blocks: Vec::new(),
            block_size: block_size.max(1),
            tail_used: 0,
            free_slots: Vec::new(),
            live: 0,
        }
    }

    /// Store `value` in a slot and return the slot's address
    ///
    /// Reuses the most recently freed slot first, then the next unused slot of
    /// the tail block, and only then grows by one block.
    pub fn insert(&mut self, value: T) -> SlotAddress {
        let address = self.next_free_address();
        self.blocks[address.block()][address.slot()] = Some(value);
        self.live += 1;
        address
    }

    fn next_free_address(&mut self) -> SlotAddress {
        if let Some(address) = self.free_slots.pop() {
            return address;
        }
        if self.blocks.is_empty() || self.tail_used == self.block_size {
            self.grow();
        }
        let address = SlotAddress {
            block: (self.blocks.len() - 1) as u32,
            slot: self.tail_used as u32,
        };
        self.tail_used += 1;
        address
    }

    fn grow(&mut self) {
        let block: Box<[Option<T>]> = (0..self.block_size).map(|_| None).collect();
        self.blocks.push(block);
        self.tail_used = 0;
        log::debug!(
            "Arena grew to {} blocks ({} slots)",
            self.blocks.len(),
            self.capacity()
        );
    }

    /// Free the slot at `address`, returning the value it held
    ///
    /// Dropping the returned value runs the object's teardown. Storage is
    /// never shrunk; the slot goes on the free list for reuse.
    pub fn deallocate(&mut self, address: SlotAddress) -> Option<T> {
        let value = self
            .blocks
            .get_mut(address.block())
            .and_then(|block| block.get_mut(address.slot()))
            .and_then(Option::take);

        match value {
            Some(value) => {
                self.free_slots.push(address);
                self.live -= 1;
                Some(value)
            }
            None => {
                log::error!("Arena deallocate on a slot that is not live: {:?}", address);
                None
            }
        }
    }

    /// Get a reference to the value at `address`
    pub fn get(&self, address: SlotAddress) -> Option<&T> {
        self.blocks.get(address.block())?.get(address.slot())?.as_ref()
    }

    /// Get a mutable reference to the value at `address`
    pub fn get_mut(&mut self, address: SlotAddress) -> Option<&mut T> {
        self.blocks
            .get_mut(address.block())?
            .get_mut(address.slot())?
            .as_mut()
    }

    /// Every slot of every block in block-then-slot order, live or not
    ///
    /// The sequence is lazy and can be restarted by calling this again.
    pub fn slots(&self) -> impl Iterator<Item = (SlotAddress, Option<&T>)> + '_ {
        self.blocks.iter().enumerate().flat_map(|(block_index, block)| {
            block.iter().enumerate().map(move |(slot_index, slot)| {
                (
                    SlotAddress {
                        block: block_index as u32,
                        slot: slot_index as u32,
                    },
                    slot.as_ref(),
                )
            })
        })
    }

    /// Live values with their addresses in block-then-slot order
    pub fn iter(&self) -> impl Iterator<Item = (SlotAddress, &T)> + '_ {
        self.slots()
            .filter_map(|(address, slot)| slot.map(|value| (address, value)))
    }

    /// Mutable live values with their addresses in block-then-slot order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SlotAddress, &mut T)> + '_ {
        self.blocks
            .iter_mut()
            .enumerate()
            .flat_map(|(block_index, block)| {
                block.iter_mut().enumerate().filter_map(move |(slot_index, slot)| {
                    slot.as_mut().map(|value| {
                        (
                            SlotAddress {
                                block: block_index as u32,
                                slot: slot_index as u32,
                            },
                            value,
                        )
                    })
                })
            })
    }

    /// Number of live values
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether the arena holds no live values
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Total number of slots across all blocks
    pub fn capacity(&self) -> usize {
        self.blocks.len() * self.block_size
    }

    /// Number of allocated blocks
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Drop every value and release all blocks
    pub fn clear(&mut self) {
        self.blocks.clear();
        self.free_slots.clear();
        self.tail_used = 0;
        self.live = 0;
    }
}

impl<T: Default> Arena<T> {
    /// Allocate a default-constructed value and return its address
    pub fn allocate(&mut self) -> (SlotAddress, &mut T) {
        let address = self.insert(T::default());
        let value = self.blocks[address.block()][address.slot()]
            .get_or_insert_with(T::default);
        (address, value)
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}
