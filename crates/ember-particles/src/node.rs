//! Per-emitter circular list of live particles threaded through the pool

use std::sync::atomic::{AtomicU64, Ordering};

use ember_core::{EmberError, Result};

use crate::pool::{Link, Particle, ParticleHandle, ParticlePool};

static NODE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Walk direction over an emitter's live list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleOrder {
    /// From the head forwards: most recently spawned first
    NewestFirst,
    /// From the head backwards: earliest spawned first
    OldestFirst,
}

/// Live state of one emitter of a playing effect.
///
/// The list is circular through a sentinel head (`Link::Head`); when empty
/// both head links point back at the head itself. Newly created particles
/// are spliced in directly after the head.
#[derive(Debug)]
pub struct EmitterNode {
    id: u64,
    emitter_index: usize,
    head_next: Link,
    head_prev: Link,
    live_count: usize,
    paused: bool,
    visible: bool,
    time_since_last_generation: f32,
}

impl EmitterNode {
    pub fn new(emitter_index: usize) -> Self {
        Self {
            id: NODE_COUNTER.fetch_add(1, Ordering::Relaxed),
            emitter_index,
            head_next: Link::Head,
            head_prev: Link::Head,
            live_count: 0,
            paused: false,
            visible: true,
            time_since_last_generation: 0.0,
        }
    }

    /// Index of the emitter definition inside the effect asset
    pub fn emitter_index(&self) -> usize {
        self.emitter_index
    }

    /// Acquire a record, link it after the head and hand it to `configure`
    pub fn create_particle<F>(&mut self, pool: &mut ParticlePool, configure: F) -> Result<ParticleHandle>
    where
        F: FnOnce(&mut Particle),
    {
        let handle = pool.acquire()?;
        let old_first = self.head_next;

        pool.set_links(handle, Some(Link::Head), Some(old_first));
        pool.set_owner(handle, Some(self.id));
        match old_first {
            Link::Particle(first) => pool.set_prev_link(first, Link::Particle(handle)),
            Link::Head => self.head_prev = Link::Particle(handle),
        }
        self.head_next = Link::Particle(handle);
        self.live_count += 1;

        configure(&mut pool[handle]);
        Ok(handle)
    }

    /// Unlink a particle from this list and return it to the pool.
    ///
    /// Handles owned by another node are rejected untouched.
    pub fn free_particle(&mut self, pool: &mut ParticlePool, handle: ParticleHandle) -> Result<()> {
        match pool.owner(handle) {
            Some(owner) if owner == self.id => {}
            Some(_) => {
                return Err(EmberError::ParticleStillLinked(format!(
                    "{handle:?} belongs to another emitter list, not emitter {}",
                    self.emitter_index
                )))
            }
            None => {
                return Err(EmberError::StaleHandle(format!(
                    "{handle:?} is not linked into emitter {}",
                    self.emitter_index
                )))
            }
        }
        let (Some(prev), Some(next)) = (pool.prev_link(handle), pool.next_link(handle)) else {
            return Err(EmberError::StaleHandle(format!("{handle:?} has no list links")));
        };

        match prev {
            Link::Head => self.head_next = next,
            Link::Particle(p) => pool.set_next_link(p, next),
        }
        match next {
            Link::Head => self.head_prev = prev,
            Link::Particle(n) => pool.set_prev_link(n, prev),
        }
        pool.set_links(handle, None, None);
        pool.set_owner(handle, None);
        self.live_count -= 1;

        pool.release(handle)
    }

    /// Free every live particle, newest first
    pub fn free_all_particles(&mut self, pool: &mut ParticlePool) -> Result<()> {
        while let Link::Particle(handle) = self.head_next {
            self.free_particle(pool, handle)?;
        }
        Ok(())
    }

    /// Most recently spawned particle
    pub fn first(&self) -> Option<ParticleHandle> {
        self.head_next.handle()
    }

    /// Earliest spawned particle
    pub fn last(&self) -> Option<ParticleHandle> {
        self.head_prev.handle()
    }

    /// Link following `link`; `Link::Head` follows the last particle
    pub fn next_link(&self, pool: &ParticlePool, link: Link) -> Link {
        match link {
            Link::Head => self.head_next,
            Link::Particle(handle) => pool.next_link(handle).unwrap_or(Link::Head),
        }
    }

    /// Link preceding `link`; `Link::Head` precedes the first particle
    pub fn prev_link(&self, pool: &ParticlePool, link: Link) -> Link {
        match link {
            Link::Head => self.head_prev,
            Link::Particle(handle) => pool.prev_link(handle).unwrap_or(Link::Head),
        }
    }

    /// Next older particle
    pub fn next_of(&self, pool: &ParticlePool, handle: ParticleHandle) -> Option<ParticleHandle> {
        self.next_link(pool, Link::Particle(handle)).handle()
    }

    /// Next newer particle
    pub fn prev_of(&self, pool: &ParticlePool, handle: ParticleHandle) -> Option<ParticleHandle> {
        self.prev_link(pool, Link::Particle(handle)).handle()
    }

    pub fn iter<'a>(&self, pool: &'a ParticlePool, order: ParticleOrder) -> ParticleIter<'a> {
        let cursor = match order {
            ParticleOrder::NewestFirst => self.head_next,
            ParticleOrder::OldestFirst => self.head_prev,
        };
        ParticleIter {
            pool,
            cursor,
            order,
        }
    }

    pub fn live_count(&self) -> usize {
        self.live_count
    }

    pub fn has_active_particles(&self) -> bool {
        self.head_next != Link::Head
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn time_since_last_generation(&self) -> f32 {
        self.time_since_last_generation
    }

    pub fn set_time_since_last_generation(&mut self, time: f32) {
        self.time_since_last_generation = time;
    }
}

/// Walks an emitter list until it wraps back to the head
pub struct ParticleIter<'a> {
    pool: &'a ParticlePool,
    cursor: Link,
    order: ParticleOrder,
}

impl Iterator for ParticleIter<'_> {
    type Item = ParticleHandle;

    fn next(&mut self) -> Option<ParticleHandle> {
        let handle = self.cursor.handle()?;
        let following = match self.order {
            ParticleOrder::NewestFirst => self.pool.next_link(handle),
            ParticleOrder::OldestFirst => self.pool.prev_link(handle),
        };
        self.cursor = following.unwrap_or(Link::Head);
        Some(handle)
    }
}
