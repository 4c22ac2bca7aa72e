//! Block-growing particle record pool with a free list
//!
//! Records live in fixed-size boxed blocks that are never freed or moved
//! until the pool is dropped, so a [`ParticleHandle`] stays valid from
//! `acquire` to its matching `release` regardless of pool growth.

use std::cell::RefCell;
use std::ops::{Index, IndexMut};
use std::rc::Rc;

use ember_core::{Color, EmberError, Result, Transform2D, Vec2};

use crate::frame::FrameProvider;

pub const DEFAULT_BLOCK_SIZE: usize = 512;

/// Pool shared by every emitter node of a particle system
pub type SharedPool = Rc<RefCell<ParticlePool>>;

/// Generation-checked index of a pooled record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticleHandle {
    index: u32,
    generation: u32,
}

impl ParticleHandle {
    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// One end of an intrusive list link: the owning node's sentinel head or a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    Head,
    Particle(ParticleHandle),
}

impl Link {
    pub fn handle(self) -> Option<ParticleHandle> {
        match self {
            Link::Head => None,
            Link::Particle(handle) => Some(handle),
        }
    }
}

/// Simulation and render state of one particle
#[derive(Debug, Clone)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Degrees
    pub orientation: f32,
    /// Seconds since spawn
    pub age: f32,
    pub lifetime: f32,

    // Spawn-time base values
    pub size: Vec2,
    pub speed: f32,
    pub spin: f32,
    pub fixed_force: f32,
    pub random_motion: f32,

    // Life-scaled values
    pub render_size: Vec2,
    pub render_speed: f32,
    pub render_spin: f32,
    pub render_fixed_force: f32,
    pub render_random_motion: f32,

    pub color: Color,
    pub oobb: [Vec2; 4],
    pub transform: Transform2D,
    pub frame: FrameProvider,

    pub pre_tick_position: Vec2,
    pub post_tick_position: Vec2,
    pub render_tick_position: Vec2,

    pub suppress_movement: bool,
}

impl Particle {
    /// Age normalized by lifetime
    pub fn normalized_age(&self) -> f32 {
        if self.lifetime <= 0.0 {
            1.0
        } else {
            self.age / self.lifetime
        }
    }
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            orientation: 0.0,
            age: 0.0,
            lifetime: 0.0,
            size: Vec2::ZERO,
            speed: 0.0,
            spin: 0.0,
            fixed_force: 0.0,
            random_motion: 0.0,
            render_size: Vec2::ZERO,
            render_speed: 0.0,
            render_spin: 0.0,
            render_fixed_force: 0.0,
            render_random_motion: 0.0,
            color: Color::WHITE,
            oobb: [Vec2::ZERO; 4],
            transform: Transform2D::IDENTITY,
            frame: FrameProvider::default(),
            pre_tick_position: Vec2::ZERO,
            post_tick_position: Vec2::ZERO,
            render_tick_position: Vec2::ZERO,
            suppress_movement: false,
        }
    }
}

#[derive(Debug, Default)]
struct ParticleRecord {
    prev: Option<Link>,
    next: Option<Link>,
    owner: Option<u64>,
    next_free: Option<u32>,
    generation: u32,
    in_use: bool,
    particle: Particle,
}

/// Free-list allocator for particle records.
///
/// Grows by one block whenever the free list is empty; never shrinks.
#[derive(Debug)]
pub struct ParticlePool {
    blocks: Vec<Box<[ParticleRecord]>>,
    block_size: usize,
    max_records: Option<usize>,
    free_head: Option<u32>,
    active: usize,
}

impl ParticlePool {
    pub fn new(block_size: usize) -> Self {
        let block_size = if block_size == 0 {
            log::warn!("particle pool block size 0 is invalid, using {DEFAULT_BLOCK_SIZE}");
            DEFAULT_BLOCK_SIZE
        } else {
            block_size
        };
        Self {
            blocks: Vec::new(),
            block_size,
            max_records: None,
            free_head: None,
            active: 0,
        }
    }

    /// A pool that refuses to hand out more than `max_records` live records
    pub fn with_limit(block_size: usize, max_records: usize) -> Self {
        let mut pool = Self::new(block_size);
        pool.max_records = Some(max_records);
        pool
    }

    pub fn into_shared(self) -> SharedPool {
        Rc::new(RefCell::new(self))
    }

    /// Take a record off the free list, growing by one block when it is empty.
    ///
    /// The record comes back unlinked with default state.
    pub fn acquire(&mut self) -> Result<ParticleHandle> {
        if let Some(limit) = self.max_records {
            if self.active >= limit {
                return Err(EmberError::PoolExhausted { capacity: limit });
            }
        }
        if self.free_head.is_none() {
            self.grow();
        }
        let index = self
            .free_head
            .ok_or(EmberError::PoolExhausted { capacity: self.allocated_count() })?;

        let record = self.record_mut(index);
        let next_free = record.next_free.take();
        record.prev = None;
        record.next = None;
        record.owner = None;
        record.in_use = true;
        record.particle = Particle::default();
        let handle = ParticleHandle {
            index,
            generation: record.generation,
        };

        self.free_head = next_free;
        self.active += 1;
        Ok(handle)
    }

    /// Return a record to the free list.
    ///
    /// The record must already be unlinked from its emitter list; its frame
    /// provider is released before it goes back on the free list.
    pub fn release(&mut self, handle: ParticleHandle) -> Result<()> {
        let free_head = self.free_head;
        let record = self
            .live_record_mut(handle)
            .ok_or_else(|| EmberError::StaleHandle(format!("{handle:?}")))?;
        if record.prev.is_some() || record.next.is_some() {
            return Err(EmberError::ParticleStillLinked(format!("{handle:?}")));
        }

        record.particle.frame.release();
        record.owner = None;
        record.in_use = false;
        record.generation = record.generation.wrapping_add(1);
        record.next_free = free_head;

        self.free_head = Some(handle.index);
        self.active -= 1;
        Ok(())
    }

    pub fn is_valid(&self, handle: ParticleHandle) -> bool {
        self.live_record(handle).is_some()
    }

    /// Whether the record is currently spliced into an emitter list
    pub fn is_linked(&self, handle: ParticleHandle) -> bool {
        self.live_record(handle)
            .is_some_and(|r| r.prev.is_some() || r.next.is_some())
    }

    pub fn get(&self, handle: ParticleHandle) -> Option<&Particle> {
        self.live_record(handle).map(|r| &r.particle)
    }

    pub fn get_mut(&mut self, handle: ParticleHandle) -> Option<&mut Particle> {
        self.live_record_mut(handle).map(|r| &mut r.particle)
    }

    pub fn active_count(&self) -> usize {
        self.active
    }

    pub fn allocated_count(&self) -> usize {
        self.blocks.len() * self.block_size
    }

    pub fn free_count(&self) -> usize {
        self.allocated_count() - self.active
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn max_records(&self) -> Option<usize> {
        self.max_records
    }

    // ── List links (maintained by EmitterNode) ──

    pub(crate) fn next_link(&self, handle: ParticleHandle) -> Option<Link> {
        self.live_record(handle).and_then(|r| r.next)
    }

    pub(crate) fn prev_link(&self, handle: ParticleHandle) -> Option<Link> {
        self.live_record(handle).and_then(|r| r.prev)
    }

    pub(crate) fn set_links(&mut self, handle: ParticleHandle, prev: Option<Link>, next: Option<Link>) {
        if let Some(record) = self.live_record_mut(handle) {
            record.prev = prev;
            record.next = next;
        }
    }

    /// Id of the emitter node whose list holds the record
    pub(crate) fn owner(&self, handle: ParticleHandle) -> Option<u64> {
        self.live_record(handle).and_then(|r| r.owner)
    }

    pub(crate) fn set_owner(&mut self, handle: ParticleHandle, owner: Option<u64>) {
        if let Some(record) = self.live_record_mut(handle) {
            record.owner = owner;
        }
    }

    pub(crate) fn set_next_link(&mut self, handle: ParticleHandle, next: Link) {
        if let Some(record) = self.live_record_mut(handle) {
            record.next = Some(next);
        }
    }

    pub(crate) fn set_prev_link(&mut self, handle: ParticleHandle, prev: Link) {
        if let Some(record) = self.live_record_mut(handle) {
            record.prev = Some(prev);
        }
    }

    // ── Internals ──

    fn grow(&mut self) {
        let base = self.allocated_count() as u32;
        let size = self.block_size as u32;
        let block: Box<[ParticleRecord]> = (0..size)
            .map(|slot| ParticleRecord {
                next_free: (slot + 1 < size).then_some(base + slot + 1),
                ..Default::default()
            })
            .collect();
        self.blocks.push(block);
        // Only called with an empty free list, so the new block becomes the whole list
        self.free_head = Some(base);
        log::debug!(
            "particle pool grew to {} blocks ({} records)",
            self.blocks.len(),
            self.allocated_count()
        );
    }

    fn locate(&self, index: u32) -> (usize, usize) {
        let index = index as usize;
        (index / self.block_size, index % self.block_size)
    }

    fn record_mut(&mut self, index: u32) -> &mut ParticleRecord {
        let (block, slot) = self.locate(index);
        &mut self.blocks[block][slot]
    }

    fn live_record(&self, handle: ParticleHandle) -> Option<&ParticleRecord> {
        let (block, slot) = self.locate(handle.index);
        self.blocks
            .get(block)
            .and_then(|b| b.get(slot))
            .filter(|r| r.in_use && r.generation == handle.generation)
    }

    fn live_record_mut(&mut self, handle: ParticleHandle) -> Option<&mut ParticleRecord> {
        let (block, slot) = self.locate(handle.index);
        self.blocks
            .get_mut(block)
            .and_then(|b| b.get_mut(slot))
            .filter(|r| r.in_use && r.generation == handle.generation)
    }
}

impl Default for ParticlePool {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_SIZE)
    }
}

impl Index<ParticleHandle> for ParticlePool {
    type Output = Particle;

    fn index(&self, handle: ParticleHandle) -> &Particle {
        match self.get(handle) {
            Some(particle) => particle,
            None => panic!("stale particle handle {handle:?}"),
        }
    }
}

impl IndexMut<ParticleHandle> for ParticlePool {
    fn index_mut(&mut self, handle: ParticleHandle) -> &mut Particle {
        match self.get_mut(handle) {
            Some(particle) => particle,
            None => panic!("stale particle handle {handle:?}"),
        }
    }
}
