//! Ember Particles - pooled 2D particle effects
//!
//! Provides keyframed particle effects with:
//! - A shared block-allocated particle pool with generation-checked handles
//! - Per-emitter intrusive particle lists with O(1) spawn and free
//! - Field curves sampled as base/variation/effect/life values
//! - Point, line, box, disk, ellipse and torus emission geometry
//! - Fixed-step integration with optional render interpolation
//! - Quad submission through a [`RenderSink`]

pub mod asset;
pub mod config;
pub mod field;
pub mod frame;
pub mod node;
pub mod player;
pub mod pool;
pub mod rand;
pub mod render;
pub mod shape;

use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;

use ember_core::{EntityId, Result, Vec2};
use ember_runtime::{EventBus, GameClock, GameEvent, RuntimeSystem};

pub use asset::{
    BlendFactor, BlendMode, EffectField, EmitterField, EmitterType, LifeMode, OrientationType,
    ParticleAsset, ParticleAssetEmitter,
};
pub use config::ParticleConfig;
pub use field::{BaseVariation, BaseVariationLife, DataKey, FieldCurve};
pub use frame::{AnimationAsset, FrameProvider, ImageAsset, TexelArea, TextureHandle};
pub use node::{EmitterNode, ParticleOrder};
pub use player::ParticlePlayer;
pub use pool::{Link, Particle, ParticleHandle, ParticlePool, SharedPool};
pub use rand::ParticleRng;
pub use render::{DrawBatch, ParticleQuad, QuadBatch, QuadVertex, RenderSink};

/// Owns the shared pool and every live particle player
pub struct ParticleSystem {
    config: ParticleConfig,
    pool: SharedPool,
    players: BTreeMap<EntityId, ParticlePlayer>,
    events: EventBus,
    rng: ParticleRng,
    cameras: Vec<Vec2>,
}

impl ParticleSystem {
    pub fn new(config: ParticleConfig) -> Result<Self> {
        config.validate()?;
        let pool = match config.pool_max_records {
            Some(max) => ParticlePool::with_limit(config.pool_block_size, max),
            None => ParticlePool::new(config.pool_block_size),
        };
        let rng = match config.rng_seed {
            Some(seed) => ParticleRng::new(seed),
            None => ParticleRng::from_entropy(),
        };
        Ok(Self {
            config,
            pool: pool.into_shared(),
            players: BTreeMap::new(),
            events: EventBus::new(),
            rng,
            cameras: Vec::new(),
        })
    }

    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }

    pub fn pool(&self) -> &SharedPool {
        &self.pool
    }

    /// A clock ticking at the configured fixed rate
    pub fn clock(&self) -> GameClock {
        GameClock::with_fixed_timestep(self.config.fixed_timestep_hz)
    }

    /// A player bound to this system's pool, not yet in the scene
    pub fn create_player(&mut self) -> ParticlePlayer {
        ParticlePlayer::with_config(Rc::clone(&self.pool), &self.config, self.rng.fork())
    }

    /// Put a player into the scene. Players with emitters start playing.
    pub fn add_player(&mut self, mut player: ParticlePlayer) -> EntityId {
        let id = player.id();
        player.on_add_to_scene();
        self.players.insert(id, player);
        id
    }

    /// Create, place and start a player for `asset`
    pub fn spawn_effect(&mut self, asset: Arc<ParticleAsset>, position: Vec2) -> EntityId {
        let mut player = self.create_player();
        player.set_position(position);
        player.set_asset(asset);
        self.add_player(player)
    }

    /// Take a player out of the scene, stopping it
    pub fn remove_player(&mut self, id: EntityId) -> Option<ParticlePlayer> {
        let mut player = self.players.remove(&id)?;
        player.on_remove_from_scene();
        player.take_events(&mut self.events);
        Some(player)
    }

    pub fn player(&self, id: EntityId) -> Option<&ParticlePlayer> {
        self.players.get(&id)
    }

    pub fn player_mut(&mut self, id: EntityId) -> Option<&mut ParticlePlayer> {
        self.players.get_mut(&id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn players(&self) -> impl Iterator<Item = &ParticlePlayer> {
        self.players.values()
    }

    pub fn set_camera_positions(&mut self, cameras: &[Vec2]) {
        self.cameras.clear();
        self.cameras.extend_from_slice(cameras);
    }

    /// Point every player using `old` at `new`, rebuilding their emitters.
    /// Returns the number of players updated.
    pub fn replace_asset(&mut self, old: &Arc<ParticleAsset>, new: Arc<ParticleAsset>) -> usize {
        let mut replaced = 0;
        for player in self.players.values_mut() {
            if player.asset().is_some_and(|asset| Arc::ptr_eq(asset, old)) {
                player.set_asset(Arc::clone(&new));
                replaced += 1;
            }
        }
        if replaced > 0 {
            log::debug!("effect '{}' reloaded on {replaced} player(s)", new.name);
        }
        replaced
    }

    /// One simulation tick. Players that finished deleting are dropped.
    pub fn fixed_step(&mut self, dt: f32) {
        for player in self.players.values_mut() {
            player.pre_integrate(&self.cameras);
            player.integrate(dt);
            player.take_events(&mut self.events);
        }

        let deleted: Vec<EntityId> = self
            .players
            .iter()
            .filter(|(_, player)| player.is_deleted())
            .map(|(id, _)| *id)
            .collect();
        for id in deleted {
            self.players.remove(&id);
            log::trace!("removed deleted particle player {id}");
        }
    }

    /// Blend particle render positions; `alpha` is the clock's fraction of a
    /// fixed step since the last tick
    pub fn interpolate(&mut self, alpha: f32) {
        let time_delta = 1.0 - alpha.clamp(0.0, 1.0);
        for player in self.players.values_mut() {
            player.interpolate(time_delta);
        }
    }

    pub fn render(&self, sink: &mut dyn RenderSink) {
        for player in self.players.values() {
            player.render(sink);
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    pub fn active_particle_count(&self) -> usize {
        self.pool.borrow().active_count()
    }
}

impl Default for ParticleSystem {
    fn default() -> Self {
        let pool = ParticlePool::default().into_shared();
        Self {
            config: ParticleConfig::default(),
            pool,
            players: BTreeMap::new(),
            events: EventBus::new(),
            rng: ParticleRng::default(),
            cameras: Vec::new(),
        }
    }
}

impl RuntimeSystem for ParticleSystem {
    fn initialize(&mut self) -> Result<()> {
        log::info!(
            "particles: pool block size {}, {} player(s)",
            self.config.pool_block_size,
            self.players.len()
        );
        Ok(())
    }

    fn fixed_update(&mut self, dt: f64) -> Result<()> {
        self.fixed_step(dt as f32);
        Ok(())
    }

    fn update(&mut self, _dt: f64, alpha: f64) -> Result<()> {
        self.interpolate(alpha as f32);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        let count = self.players.len();
        self.players.clear();
        log::debug!("particles: shut down {count} player(s)");
        Ok(())
    }

    fn name(&self) -> &str {
        "particles"
    }
}
