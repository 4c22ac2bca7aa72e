//! Runtime instance of a particle effect
//!
//! A [`ParticlePlayer`] owns one [`EmitterNode`] per renderable emitter of
//! its asset. Every fixed tick it ages and integrates live particles, frees
//! expired ones and spawns new ones from the emitters' field curves. Between
//! ticks it can blend particle positions for rendering.

use std::sync::Arc;

use ember_core::{
    calculate_oobb, fmod_degrees, is_zero, Color, EmberError, EntityId, Result, Transform2D, Vec2,
};
use ember_runtime::{EventBus, GameEvent};

use crate::asset::{BlendMode, LifeMode, OrientationType, ParticleAsset, ParticleAssetEmitter};
use crate::config::ParticleConfig;
use crate::node::{EmitterNode, ParticleOrder};
use crate::pool::{Particle, ParticlePool, SharedPool};
use crate::rand::ParticleRng;
use crate::render::{ParticleQuad, RenderSink};
use crate::shape::sample_emission_offset;

/// Player state read while spawning and integrating one emitter's particles
#[derive(Clone, Copy)]
struct EmitterContext<'a> {
    asset: &'a ParticleAsset,
    emitter: &'a ParticleAssetEmitter,
    transform: Transform2D,
    effect_age: f32,
    size_scale: f32,
    force_scale: f32,
    emission_rate_scale: f32,
}

pub struct ParticlePlayer {
    id: EntityId,
    pool: SharedPool,
    rng: ParticleRng,
    asset: Option<Arc<ParticleAsset>>,
    nodes: Vec<EmitterNode>,
    transform: Transform2D,

    /// Seconds since play
    age: f32,
    playing: bool,
    paused: bool,
    waiting_for_particles: bool,
    waiting_for_delete: bool,
    camera_idle: bool,
    in_scene: bool,
    deleted: bool,

    emission_rate_scale: f32,
    size_scale: f32,
    force_scale: f32,
    time_scale: f32,
    camera_idle_distance: f32,
    particle_interpolation: bool,

    events: EventBus,
}

impl ParticlePlayer {
    pub fn new(pool: SharedPool, rng: ParticleRng) -> Self {
        Self {
            id: EntityId::new(),
            pool,
            rng,
            asset: None,
            nodes: Vec::new(),
            transform: Transform2D::IDENTITY,
            age: 0.0,
            playing: false,
            paused: false,
            waiting_for_particles: false,
            waiting_for_delete: false,
            camera_idle: false,
            in_scene: false,
            deleted: false,
            emission_rate_scale: 1.0,
            size_scale: 1.0,
            force_scale: 1.0,
            time_scale: 1.0,
            camera_idle_distance: 0.0,
            particle_interpolation: false,
            events: EventBus::new(),
        }
    }

    pub fn with_config(pool: SharedPool, config: &ParticleConfig, rng: ParticleRng) -> Self {
        let mut player = Self::new(pool, rng);
        player.emission_rate_scale = config.emission_rate_scale;
        player.size_scale = config.size_scale;
        player.force_scale = config.force_scale;
        player.time_scale = config.time_scale;
        player.camera_idle_distance = config.camera_idle_distance;
        player.particle_interpolation = config.particle_interpolation;
        player
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    // ── Asset ──

    /// Assign an effect, rebuilding the emitter nodes
    pub fn set_asset(&mut self, asset: Arc<ParticleAsset>) {
        self.asset = Some(asset);
        self.initialize_asset();
    }

    /// Stop and drop the current effect
    pub fn clear_asset(&mut self) {
        self.destroy_asset();
        self.asset = None;
    }

    /// Rebuild emitter nodes from the current asset, resuming playback if it was playing
    pub fn refresh_asset(&mut self) {
        self.initialize_asset();
    }

    pub fn asset(&self) -> Option<&Arc<ParticleAsset>> {
        self.asset.as_ref()
    }

    fn initialize_asset(&mut self) {
        let was_playing = self.playing;
        self.destroy_asset();

        let Some(asset) = self.asset.clone() else {
            return;
        };
        for (index, emitter) in asset.emitters().iter().enumerate() {
            if !emitter.is_renderable() {
                log::debug!(
                    "effect '{}': emitter '{}' has no renderable frames, skipping",
                    asset.name,
                    emitter.name
                );
                continue;
            }
            self.nodes.push(EmitterNode::new(index));
        }
        log::debug!(
            "player {}: effect '{}' initialized with {} emitter node(s)",
            self.id,
            asset.name,
            self.nodes.len()
        );

        if was_playing {
            self.play(false);
        }
    }

    fn destroy_asset(&mut self) {
        self.stop(false, false);
        self.free_all_particles();
        self.nodes.clear();
    }

    // ── Scene ──

    /// Register with a scene and start playing when there is something to play
    pub fn on_add_to_scene(&mut self) {
        self.in_scene = true;
        if !self.nodes.is_empty() {
            self.play(true);
        }
    }

    pub fn on_remove_from_scene(&mut self) {
        self.stop(false, false);
        self.in_scene = false;
    }

    pub fn is_in_scene(&self) -> bool {
        self.in_scene
    }

    pub fn transform(&self) -> Transform2D {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Transform2D) {
        self.transform = transform;
    }

    pub fn position(&self) -> Vec2 {
        self.transform.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.transform.position = position;
    }

    /// Radians
    pub fn angle(&self) -> f32 {
        self.transform.angle
    }

    /// Radians
    pub fn set_angle(&mut self, angle: f32) {
        self.transform.angle = angle;
    }

    // ── Playback ──

    /// Start the effect from age zero. Fails without emitters or outside a scene.
    pub fn play(&mut self, reset_particles: bool) -> bool {
        if self.deleted {
            log::warn!("player {}: cannot play a deleted player", self.id);
            return false;
        }
        if self.asset.as_ref().map_or(true, |a| a.emitter_count() == 0) || self.nodes.is_empty() {
            log::warn!("player {}: cannot play, no emitters", self.id);
            return false;
        }
        if !self.in_scene {
            log::warn!("player {}: cannot play when not in a scene", self.id);
            return false;
        }

        if reset_particles {
            self.free_all_particles();
        }
        self.age = 0.0;
        for node in &mut self.nodes {
            node.set_paused(false);
            node.set_time_since_last_generation(0.0);
        }
        self.waiting_for_particles = false;
        self.waiting_for_delete = false;
        self.playing = true;
        self.paused = false;
        true
    }

    /// Stop the effect.
    ///
    /// With `wait_for_particles` emission pauses now and the stop completes on
    /// the first tick with no live particles; otherwise every particle is
    /// freed immediately. `kill_effect` deletes the player once stopped.
    pub fn stop(&mut self, wait_for_particles: bool, kill_effect: bool) {
        if !self.playing && !kill_effect {
            return;
        }

        if wait_for_particles && self.playing {
            for node in &mut self.nodes {
                node.set_paused(true);
            }
            self.waiting_for_particles = true;
            if kill_effect {
                self.waiting_for_delete = true;
            }
            return;
        }

        self.free_all_particles();
        let was_playing = self.playing;
        self.age = 0.0;
        self.playing = false;
        self.waiting_for_particles = false;
        self.waiting_for_delete = false;
        self.paused = false;
        if was_playing {
            self.events.push(GameEvent::ParticlePlayerStopped(self.id));
        }

        if kill_effect {
            self.safe_delete();
        }
    }

    /// Delete the player, letting a playing effect finish its particles first
    pub fn safe_delete(&mut self) {
        if self.waiting_for_delete || self.deleted {
            return;
        }
        if self.playing {
            self.stop(true, true);
            return;
        }
        self.deleted = true;
        self.events.push(GameEvent::ParticlePlayerDeleted(self.id));
        log::debug!("player {} deleted", self.id);
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_waiting_for_particles(&self) -> bool {
        self.waiting_for_particles
    }

    pub fn is_waiting_for_delete(&self) -> bool {
        self.waiting_for_delete
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn is_camera_idle(&self) -> bool {
        self.camera_idle
    }

    /// Seconds since the effect last started playing
    pub fn age(&self) -> f32 {
        self.age
    }

    // ── Scales ──

    pub fn emission_rate_scale(&self) -> f32 {
        self.emission_rate_scale
    }

    pub fn set_emission_rate_scale(&mut self, scale: f32) -> bool {
        set_scale("emission rate", &mut self.emission_rate_scale, scale)
    }

    pub fn size_scale(&self) -> f32 {
        self.size_scale
    }

    pub fn set_size_scale(&mut self, scale: f32) -> bool {
        set_scale("size", &mut self.size_scale, scale)
    }

    pub fn force_scale(&self) -> f32 {
        self.force_scale
    }

    pub fn set_force_scale(&mut self, scale: f32) -> bool {
        set_scale("force", &mut self.force_scale, scale)
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn set_time_scale(&mut self, scale: f32) -> bool {
        set_scale("time", &mut self.time_scale, scale)
    }

    pub fn camera_idle_distance(&self) -> f32 {
        self.camera_idle_distance
    }

    pub fn set_camera_idle_distance(&mut self, distance: f32) {
        self.camera_idle_distance = distance.max(0.0);
    }

    pub fn particle_interpolation(&self) -> bool {
        self.particle_interpolation
    }

    pub fn set_particle_interpolation(&mut self, enabled: bool) {
        self.particle_interpolation = enabled;
    }

    // ── Emitters ──

    pub fn emitter_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn emitter_node(&self, index: usize) -> Option<&EmitterNode> {
        self.nodes.get(index)
    }

    fn node(&self, index: usize) -> Result<&EmitterNode> {
        let count = self.nodes.len();
        self.nodes
            .get(index)
            .ok_or(EmberError::InvalidEmitterIndex { index, count })
    }

    fn node_mut(&mut self, index: usize) -> Result<&mut EmitterNode> {
        let count = self.nodes.len();
        self.nodes
            .get_mut(index)
            .ok_or(EmberError::InvalidEmitterIndex { index, count })
    }

    pub fn set_emitter_paused(&mut self, index: usize, paused: bool) -> bool {
        match self.node_mut(index) {
            Ok(node) => {
                node.set_paused(paused);
                true
            }
            Err(err) => {
                log::warn!("set_emitter_paused: {err}");
                false
            }
        }
    }

    pub fn emitter_paused(&self, index: usize) -> bool {
        match self.node(index) {
            Ok(node) => node.paused(),
            Err(err) => {
                log::warn!("emitter_paused: {err}");
                false
            }
        }
    }

    pub fn set_emitter_visible(&mut self, index: usize, visible: bool) -> bool {
        match self.node_mut(index) {
            Ok(node) => {
                node.set_visible(visible);
                true
            }
            Err(err) => {
                log::warn!("set_emitter_visible: {err}");
                false
            }
        }
    }

    pub fn emitter_visible(&self, index: usize) -> bool {
        match self.node(index) {
            Ok(node) => node.visible(),
            Err(err) => {
                log::warn!("emitter_visible: {err}");
                false
            }
        }
    }

    /// Live particles across all emitters
    pub fn active_particle_count(&self) -> usize {
        self.nodes.iter().map(EmitterNode::live_count).sum()
    }

    /// Move pending lifecycle events into `bus`
    pub fn take_events(&mut self, bus: &mut EventBus) {
        bus.append(&mut self.events);
    }

    fn free_all_particles(&mut self) {
        let mut pool = self.pool.borrow_mut();
        for node in &mut self.nodes {
            if let Err(err) = node.free_all_particles(&mut pool) {
                log::error!("player {}: failed to free particles: {err}", self.id);
            }
        }
    }

    // ── Simulation ──

    /// Camera-distance culling: stop when no camera is within the idle
    /// distance, play again when one comes back in range
    pub fn pre_integrate(&mut self, camera_positions: &[Vec2]) {
        if is_zero(self.camera_idle_distance) || !self.in_scene || self.nodes.is_empty() {
            return;
        }
        let idle_distance_sq = self.camera_idle_distance * self.camera_idle_distance;
        let position = self.transform.position;
        let in_range = camera_positions
            .iter()
            .any(|camera| camera.distance_squared(position) < idle_distance_sq);

        if in_range {
            if !self.playing {
                self.play(true);
            }
            self.camera_idle = false;
        } else {
            if self.playing {
                self.stop(false, false);
            }
            self.camera_idle = true;
        }
    }

    /// Advance the effect by one fixed step of `elapsed` seconds
    pub fn integrate(&mut self, elapsed: f32) {
        if !self.playing || self.paused || self.nodes.is_empty() {
            return;
        }
        let Some(asset) = self.asset.clone() else {
            return;
        };

        let scaled = elapsed * self.time_scale;
        let mut active = 0;

        if !self.camera_idle {
            self.age += scaled;
            let mut pool = self.pool.borrow_mut();
            for node in &mut self.nodes {
                let Some(emitter) = asset.emitter(node.emitter_index()) else {
                    continue;
                };
                let ctx = EmitterContext {
                    asset: &asset,
                    emitter,
                    transform: self.transform,
                    effect_age: self.age,
                    size_scale: self.size_scale,
                    force_scale: self.force_scale,
                    emission_rate_scale: self.emission_rate_scale,
                };
                active += advance_emitter(node, &mut pool, &ctx, &mut self.rng, scaled);
            }
        }

        if self.waiting_for_particles {
            if active == 0 {
                log::trace!("player {}: particles drained", self.id);
                self.stop(false, self.waiting_for_delete);
            }
            return;
        }

        let lifetime = asset.lifetime();
        match asset.life_mode {
            LifeMode::Infinite => {}
            LifeMode::Cycle => {
                if self.age >= lifetime {
                    self.play(false);
                }
            }
            LifeMode::Stop => {
                if self.age >= lifetime {
                    self.stop(true, false);
                }
            }
            LifeMode::Kill => {
                if self.age >= lifetime {
                    self.stop(true, true);
                }
            }
        }
    }

    /// Blend rendered particle positions between the last two ticks.
    ///
    /// `time_delta` is the weight of the pre-tick position: 1.0 shows the
    /// previous tick, 0.0 the latest.
    pub fn interpolate(&mut self, time_delta: f32) {
        if !self.particle_interpolation || !self.playing || self.camera_idle || self.paused {
            return;
        }
        let Some(asset) = self.asset.as_ref() else {
            return;
        };

        let mut pool = self.pool.borrow_mut();
        for node in &self.nodes {
            let Some(emitter) = asset.emitter(node.emitter_index()) else {
                continue;
            };
            let mut cursor = node.first();
            while let Some(handle) = cursor {
                cursor = node.next_of(&pool, handle);
                let particle = &mut pool[handle];
                particle.render_tick_position = particle.pre_tick_position * time_delta
                    + particle.post_tick_position * (1.0 - time_delta);
                particle.transform.position = particle.render_tick_position;
                particle.oobb = calculate_oobb(
                    &scaled_pivot_box(emitter, particle.render_size),
                    &particle.transform,
                );
            }
        }
    }

    /// Submit one quad per live particle of every visible emitter
    pub fn render(&self, sink: &mut dyn RenderSink) {
        if !self.playing || self.camera_idle {
            return;
        }
        let Some(asset) = self.asset.as_ref() else {
            return;
        };

        let pool = self.pool.borrow();
        sink.flush();
        for node in &self.nodes {
            if !node.visible() || !node.has_active_particles() {
                continue;
            }
            let Some(emitter) = asset.emitter(node.emitter_index()) else {
                continue;
            };
            if !emitter.is_renderable() {
                continue;
            }

            sink.flush();
            sink.set_blend_mode(if emitter.intense_particles {
                BlendMode::ADDITIVE
            } else {
                emitter.blend_mode
            });
            sink.set_alpha_test(emitter.alpha_test);

            // Attached particles live in emitter space
            let emitter_space = emitter.attach_position_to_emitter.then(|| {
                if emitter.attach_rotation_to_emitter {
                    self.transform
                } else {
                    Transform2D::from_position(self.transform.position)
                }
            });
            let order = if emitter.oldest_in_front {
                ParticleOrder::NewestFirst
            } else {
                ParticleOrder::OldestFirst
            };

            for handle in node.iter(&pool, order) {
                let particle = &pool[handle];
                let (Some(texture), Some(area)) =
                    (particle.frame.texture(), particle.frame.frame_area())
                else {
                    continue;
                };
                let corners = match emitter_space {
                    Some(xf) => particle.oobb.map(|corner| xf.apply(corner)),
                    None => particle.oobb,
                };
                sink.submit_quad(&ParticleQuad {
                    corners,
                    uvs: area.quad_uvs(),
                    texture,
                    color: particle.color,
                });
            }
            sink.flush();
        }
    }
}

impl Drop for ParticlePlayer {
    fn drop(&mut self) {
        let Ok(mut pool) = self.pool.try_borrow_mut() else {
            log::error!("player {}: pool busy during drop, particles leaked", self.id);
            return;
        };
        for node in &mut self.nodes {
            if let Err(err) = node.free_all_particles(&mut pool) {
                log::error!("player {}: failed to free particles: {err}", self.id);
            }
        }
    }
}

fn set_scale(name: &str, slot: &mut f32, scale: f32) -> bool {
    if !scale.is_finite() || scale < 0.0 {
        log::warn!("invalid {name} scale {scale}");
        return false;
    }
    *slot = scale;
    true
}

/// Age, expire and integrate one emitter's particles, then spawn new ones.
/// Returns the number of particles still alive before spawning.
fn advance_emitter(
    node: &mut EmitterNode,
    pool: &mut ParticlePool,
    ctx: &EmitterContext<'_>,
    rng: &mut ParticleRng,
    elapsed: f32,
) -> usize {
    let emitter = ctx.emitter;
    let mut active = 0;

    let mut cursor = node.first();
    while let Some(handle) = cursor {
        cursor = node.next_of(pool, handle);

        let particle = &mut pool[handle];
        particle.age += elapsed;
        let expired = (!emitter.single_particle && particle.age > particle.lifetime)
            || is_zero(particle.lifetime);
        if expired {
            if let Err(err) = node.free_particle(pool, handle) {
                log::error!("failed to free expired particle: {err}");
            }
            continue;
        }

        let particle_age = particle.age / particle.lifetime;
        integrate_particle(ctx, rng, particle, particle_age, elapsed);
        active += 1;
    }

    if node.paused() {
        return active;
    }

    if emitter.single_particle {
        if !node.has_active_particles() {
            spawn_particle(node, pool, ctx, rng);
        }
        return active;
    }

    let since_last = node.time_since_last_generation() + elapsed;
    node.set_time_since_last_generation(since_last);

    let age = ctx.effect_age;
    let quantity = &emitter.quantity;
    let half_variation = quantity.variation.sample(age) * 0.5;
    let effect_scale = ctx.asset.quantity_scale.sample(age) * ctx.emission_rate_scale;
    let rate = quantity.base.clamp_value(
        (quantity.base.sample(age) + rng.range(-half_variation, half_variation)) * effect_scale,
    );

    let count = (rate * since_last).floor();
    if count >= 1.0 {
        let mut remaining = (since_last - count / rate).max(0.0);
        if is_zero(remaining) {
            remaining = 0.0;
        }
        node.set_time_since_last_generation(remaining);
        for _ in 0..count as u32 {
            if !spawn_particle(node, pool, ctx, rng) {
                break;
            }
        }
    }

    active
}

/// Returns false when the pool refused the particle
fn spawn_particle(
    node: &mut EmitterNode,
    pool: &mut ParticlePool,
    ctx: &EmitterContext<'_>,
    rng: &mut ParticleRng,
) -> bool {
    match node.create_particle(pool, |particle| configure_particle(ctx, rng, particle)) {
        Ok(_) => true,
        Err(EmberError::PoolExhausted { capacity }) => {
            log::debug!("spawn skipped, particle pool limit of {capacity} reached");
            false
        }
        Err(err) => {
            log::error!("failed to spawn particle: {err}");
            false
        }
    }
}

/// Seed a freshly acquired particle from the emitter's geometry and curves
fn configure_particle(ctx: &EmitterContext<'_>, rng: &mut ParticleRng, p: &mut Particle) {
    let EmitterContext {
        asset,
        emitter,
        transform,
        effect_age: age,
        size_scale,
        ..
    } = *ctx;

    let offset = emitter.emitter_offset * size_scale;
    let local = if emitter.single_particle {
        offset
    } else {
        sample_emission_offset(
            emitter.emitter_type,
            offset,
            emitter.emitter_angle.to_radians(),
            emitter.emitter_size * size_scale,
            rng,
        )
    };
    p.position = if emitter.attach_position_to_emitter {
        local
    } else {
        transform.apply(local)
    };

    p.age = 0.0;
    p.lifetime = emitter.lifetime.sample_bve(&asset.lifetime_scale, age, rng);

    let size_x = emitter.size_x.sample_bve(&asset.size_x_scale, age, rng) * size_scale;
    let size_y = if emitter.fixed_aspect {
        size_x
    } else {
        emitter.size_y.sample_bve(&asset.size_y_scale, age, rng) * size_scale
    };
    p.size = Vec2::new(size_x, size_y);

    let mut emission_angle = 0.0;
    if !emitter.single_particle {
        p.speed = emitter.speed.sample_bv(age, rng) * ctx.force_scale;
        p.random_motion = emitter.random_motion.sample_bv(age, rng) * ctx.force_scale;

        let force = emitter.emission_force.sample_bv(age, rng) * ctx.force_scale;
        let mut angle = emitter.emission_angle.sample_bv(age, rng);
        // Half arc either side of the emission angle
        let half_arc = emitter.emission_arc.sample_bv(age, rng) * 0.5;
        if emitter.link_emission_rotation {
            angle += transform.angle_degrees();
        }
        emission_angle = fmod_degrees(rng.range(angle - half_arc, angle + half_arc));
        p.velocity = Vec2::from_angle(emission_angle.to_radians()) * force;
    }

    p.spin = emitter.spin.sample_bve(&asset.spin_scale, age, rng);
    p.fixed_force = emitter.fixed_force.sample_bve(&asset.fixed_force_scale, age, rng);

    p.orientation = match emitter.orientation_type {
        OrientationType::Aligned => fmod_degrees(emission_angle - emitter.aligned_angle_offset),
        OrientationType::Fixed => fmod_degrees(emitter.fixed_angle_offset),
        OrientationType::Random => {
            let half_arc = emitter.random_arc * 0.5;
            let center = emitter.random_angle_offset;
            fmod_degrees(rng.range(center - half_arc, center + half_arc))
        }
    };

    p.color = life_color(asset, emitter, 0.0);

    p.frame
        .allocate_assets(emitter.image().cloned(), emitter.animation().cloned());
    if emitter.static_mode {
        if emitter.random_image_frame {
            let frame_count = emitter.image().map_or(0, |image| image.frame_count());
            if frame_count > 0 {
                p.frame.set_image_frame(rng.range_inclusive(0, frame_count - 1));
            }
        } else if let Some(name) = emitter.image_frame_name() {
            p.frame.set_image_frame_by_name(name);
        } else {
            p.frame.set_image_frame(emitter.image_frame());
        }
    } else if let Some(animation) = emitter.animation() {
        p.frame.play_animation(Arc::clone(animation), rng);
    }

    p.pre_tick_position = p.position;
    p.post_tick_position = p.position;
    p.render_tick_position = p.position;

    integrate_particle(ctx, rng, p, 0.0, 0.0);
}

/// Advance one particle by `elapsed` seconds at normalized age `particle_age`
fn integrate_particle(
    ctx: &EmitterContext<'_>,
    rng: &mut ParticleRng,
    p: &mut Particle,
    particle_age: f32,
    elapsed: f32,
) {
    let emitter = ctx.emitter;

    p.pre_tick_position = p.post_tick_position;
    p.render_tick_position = p.post_tick_position;

    let size_x = emitter.size_x.life_scaled(p.size.x, particle_age);
    let size_y = if emitter.fixed_aspect {
        size_x
    } else {
        emitter.size_y.life_scaled(p.size.y, particle_age)
    };
    p.render_size = Vec2::new(size_x, size_y);
    p.render_speed = emitter.speed.life_scaled(p.speed, particle_age);
    p.render_fixed_force = emitter.fixed_force.life_scaled(p.fixed_force, particle_age);
    p.render_random_motion = emitter.random_motion.life_scaled(p.random_motion, particle_age);
    p.color = life_color(ctx.asset, emitter, particle_age);

    if !emitter.static_mode {
        p.frame.update_animation(elapsed);
    }

    if !emitter.single_particle {
        if !is_zero(p.render_random_motion) {
            p.velocity += rng.symmetric_vec2(p.render_random_motion * 0.5) * elapsed;
        }
        if !is_zero(p.render_fixed_force) {
            p.velocity += emitter.fixed_force_direction()
                * (p.render_fixed_force * ctx.force_scale)
                * elapsed;
        }
        if !p.suppress_movement {
            p.position += p.velocity * p.render_speed * elapsed;
        }
    }

    if emitter.keep_aligned && emitter.orientation_type == OrientationType::Aligned {
        let mut movement = p.velocity.y.atan2(p.velocity.x).to_degrees();
        if movement < 0.0 {
            movement += 360.0;
        }
        p.orientation = movement - emitter.aligned_angle_offset;
    } else {
        p.render_spin = p.spin * emitter.spin.life.sample(particle_age);
        if !is_zero(p.render_spin) {
            p.orientation = fmod_degrees(p.orientation + p.render_spin * elapsed);
        }
    }

    p.transform = Transform2D::new(p.position, p.orientation.to_radians());
    p.oobb = calculate_oobb(&scaled_pivot_box(emitter, p.render_size), &p.transform);
    p.post_tick_position = p.position;
}

/// Color channels over life; alpha also takes the effect alpha scale at time zero
fn life_color(asset: &ParticleAsset, emitter: &ParticleAssetEmitter, particle_age: f32) -> Color {
    let alpha_scale = asset.alpha_channel_scale.sample(0.0);
    let alpha = emitter
        .alpha_channel
        .clamp_value(emitter.alpha_channel.sample(particle_age) * alpha_scale);
    Color::new(
        emitter.red_channel.sample(particle_age),
        emitter.green_channel.sample(particle_age),
        emitter.blue_channel.sample(particle_age),
        alpha,
    )
}

fn scaled_pivot_box(emitter: &ParticleAssetEmitter, size: Vec2) -> [Vec2; 4] {
    emitter.local_pivot_aabb().map(|corner| corner * size)
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::frame::{ImageAsset, TextureHandle};
    use crate::pool::ParticlePool;
    use crate::render::QuadBatch;

    fn image() -> Arc<ImageAsset> {
        Arc::new(ImageAsset::grid("sheet", TextureHandle(3), 2, 1))
    }

    fn emitter(name: &str) -> ParticleAssetEmitter {
        let mut emitter = ParticleAssetEmitter::new(name);
        emitter.set_image(image(), 0);
        emitter
    }

    fn player_with(asset: ParticleAsset) -> ParticlePlayer {
        let pool = ParticlePool::new(16).into_shared();
        let mut player = ParticlePlayer::new(pool, ParticleRng::new(17));
        player.set_asset(asset.into_shared());
        player.on_add_to_scene();
        player
    }

    fn single_emitter_asset(configure: impl FnOnce(&mut ParticleAssetEmitter)) -> ParticleAsset {
        let mut asset = ParticleAsset::new("fx");
        let mut e = emitter("main");
        configure(&mut e);
        asset.add_emitter(e);
        asset
    }

    #[test]
    fn unrenderable_emitters_get_no_node() {
        let mut asset = ParticleAsset::new("fx");
        asset.add_emitter(ParticleAssetEmitter::new("blank"));
        asset.add_emitter(emitter("drawn"));
        let player = player_with(asset);
        assert_eq!(player.emitter_count(), 1);
        assert_eq!(player.emitter_node(0).unwrap().emitter_index(), 1);
        assert!(player.is_playing());
    }

    #[test]
    fn play_requires_scene_and_emitters() {
        let pool = ParticlePool::new(8).into_shared();
        let mut player = ParticlePlayer::new(pool, ParticleRng::new(1));
        assert!(!player.play(false));

        player.set_asset(single_emitter_asset(|_| {}).into_shared());
        assert!(!player.play(false));
        player.on_add_to_scene();
        assert!(player.is_playing());
    }

    #[test]
    fn spawned_particle_uses_player_transform() {
        let mut player = player_with(single_emitter_asset(|e| {
            e.emitter_offset = Vec2::new(1.0, 0.0);
            e.quantity.base.set_single_data_key(100.0);
            e.emission_force.base.set_single_data_key(0.0);
            e.emission_force.variation.set_single_data_key(0.0);
        }));
        player.set_position(Vec2::new(10.0, 5.0));
        player.set_angle(std::f32::consts::FRAC_PI_2);
        player.integrate(0.05);

        let pool = player.pool.borrow();
        let node = player.emitter_node(0).unwrap();
        let handle = node.first().unwrap();
        let p = &pool[handle];
        assert!((p.position - Vec2::new(10.0, 6.0)).length() < 1e-4);
        assert_eq!(p.velocity, Vec2::ZERO);
        assert_eq!(p.pre_tick_position, p.position);
    }

    #[test]
    fn emission_angle_sets_velocity() {
        let mut player = player_with(single_emitter_asset(|e| {
            e.quantity.base.set_single_data_key(20.0);
            e.emission_angle.base.set_single_data_key(90.0);
            e.emission_arc.base.set_single_data_key(0.0);
            e.emission_force.variation.set_single_data_key(0.0);
            e.speed.base.set_single_data_key(1.0);
            e.orientation_type = OrientationType::Aligned;
        }));
        player.integrate(0.05);

        let pool = player.pool.borrow();
        let handle = player.emitter_node(0).unwrap().first().unwrap();
        let p = &pool[handle];
        assert!(p.velocity.x.abs() < 1e-4);
        assert!((p.velocity.y - 5.0).abs() < 1e-4);
        assert!((p.orientation - 90.0).abs() < 1e-4);
    }

    #[test]
    fn movement_integrates_velocity_and_speed() {
        let mut player = player_with(single_emitter_asset(|e| {
            e.quantity.base.set_single_data_key(20.0);
            e.emission_arc.base.set_single_data_key(0.0);
            e.emission_force.variation.set_single_data_key(0.0);
            e.emission_force.base.set_single_data_key(2.0);
            e.speed.base.set_single_data_key(3.0);
            e.link_emission_rotation = false;
        }));
        player.integrate(0.05);
        player.set_emitter_paused(0, true);
        player.integrate(0.5);

        let pool = player.pool.borrow();
        let handle = player.emitter_node(0).unwrap().first().unwrap();
        let p = &pool[handle];
        // velocity (2, 0) * speed 3 * 0.5s
        assert!((p.position.x - 3.0).abs() < 1e-4);
        assert_eq!(p.pre_tick_position, Vec2::ZERO);
        assert_eq!(p.post_tick_position, p.position);
    }

    #[test]
    fn keep_aligned_tracks_velocity() {
        let mut player = player_with(single_emitter_asset(|e| {
            e.quantity.base.set_single_data_key(20.0);
            e.emission_arc.base.set_single_data_key(0.0);
            e.emission_force.variation.set_single_data_key(0.0);
            e.emission_angle.base.set_single_data_key(-90.0);
            e.orientation_type = OrientationType::Aligned;
            e.keep_aligned = true;
            e.aligned_angle_offset = 10.0;
        }));
        player.integrate(0.05);

        let pool = player.pool.borrow();
        let handle = player.emitter_node(0).unwrap().first().unwrap();
        assert!((pool[handle].orientation - 260.0).abs() < 1e-3);
    }

    #[test]
    fn life_curves_scale_rendered_values() {
        let mut player = player_with(single_emitter_asset(|e| {
            e.quantity.base.set_single_data_key(20.0);
            e.size_x.base.set_single_data_key(4.0);
            e.size_x.life.add_data_key(1.0, 0.0);
            e.alpha_channel.add_data_key(1.0, 0.0);
            e.lifetime.base.set_single_data_key(1.0);
        }));
        player.integrate(0.05);
        player.set_emitter_paused(0, true);
        player.integrate(0.5);

        let pool = player.pool.borrow();
        let handle = player.emitter_node(0).unwrap().first().unwrap();
        let p = &pool[handle];
        // normalized age 0.5
        assert!((p.render_size.x - 2.0).abs() < 1e-4);
        assert_eq!(p.render_size.y, p.render_size.x);
        assert!((p.color.a - 0.5).abs() < 1e-4);
    }

    #[test]
    fn emitter_index_validation() {
        let mut player = player_with(single_emitter_asset(|_| {}));
        assert!(player.set_emitter_visible(0, false));
        assert!(!player.emitter_visible(0));
        assert!(!player.set_emitter_paused(4, true));
        assert!(!player.emitter_paused(4));
        assert!(matches!(
            player.node(4),
            Err(EmberError::InvalidEmitterIndex { index: 4, count: 1 })
        ));
    }

    #[test]
    fn scales_reject_negative_values() {
        let mut player = player_with(single_emitter_asset(|_| {}));
        assert!(!player.set_time_scale(-1.0));
        assert_eq!(player.time_scale(), 1.0);
        assert!(player.set_size_scale(2.0));
        assert_eq!(player.size_scale(), 2.0);
    }

    #[test]
    fn time_scale_speeds_up_age() {
        let mut player = player_with(single_emitter_asset(|_| {}));
        player.set_time_scale(2.0);
        player.integrate(0.25);
        assert!((player.age() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn interpolate_blends_tick_positions() {
        let mut player = player_with(single_emitter_asset(|e| {
            e.quantity.base.set_single_data_key(20.0);
            e.emission_arc.base.set_single_data_key(0.0);
            e.emission_force.variation.set_single_data_key(0.0);
            e.emission_force.base.set_single_data_key(10.0);
            e.speed.base.set_single_data_key(1.0);
            e.link_emission_rotation = false;
        }));
        player.set_particle_interpolation(true);
        player.integrate(0.05);
        player.set_emitter_paused(0, true);
        player.integrate(0.1);
        player.interpolate(0.25);

        let pool = player.pool.borrow();
        let handle = player.emitter_node(0).unwrap().first().unwrap();
        let p = &pool[handle];
        // pre 0, post 1.0 → 0.25 * 0 + 0.75 * 1.0
        assert!((p.render_tick_position.x - 0.75).abs() < 1e-4);
        assert_eq!(p.transform.position, p.render_tick_position);
    }

    #[test]
    fn render_submits_quads_in_requested_order() {
        let mut player = player_with(single_emitter_asset(|e| {
            e.quantity.base.set_single_data_key(40.0);
            e.emission_force.base.set_single_data_key(0.0);
            e.emission_force.variation.set_single_data_key(0.0);
            e.intense_particles = true;
        }));
        player.integrate(0.05);
        player.integrate(0.05);
        assert_eq!(player.active_particle_count(), 4);

        let mut batch = QuadBatch::new();
        player.render(&mut batch);
        assert_eq!(batch.quad_count(), 4);
        assert_eq!(batch.batches().len(), 1);
        assert_eq!(batch.batches()[0].blend, BlendMode::ADDITIVE);
        assert_eq!(batch.batches()[0].texture, TextureHandle(3));

        player.set_emitter_visible(0, false);
        batch.clear();
        player.render(&mut batch);
        assert_eq!(batch.quad_count(), 0);
    }

    #[test]
    fn camera_idle_stops_and_restarts() {
        let mut player = player_with(single_emitter_asset(|_| {}));
        player.set_camera_idle_distance(10.0);

        player.pre_integrate(&[Vec2::new(100.0, 0.0)]);
        assert!(player.is_camera_idle());
        assert!(!player.is_playing());

        player.pre_integrate(&[Vec2::new(100.0, 0.0), Vec2::new(3.0, 4.0)]);
        assert!(!player.is_camera_idle());
        assert!(player.is_playing());
    }

    #[test]
    fn cycle_mode_restarts_age() {
        let mut asset = single_emitter_asset(|_| {});
        asset.life_mode = LifeMode::Cycle;
        asset.set_lifetime(0.2);
        let mut player = player_with(asset);
        player.integrate(0.1);
        assert!((player.age() - 0.1).abs() < 1e-6);
        player.integrate(0.15);
        assert_eq!(player.age(), 0.0);
        assert!(player.is_playing());
    }

    #[test]
    fn drop_returns_particles_to_pool() {
        let pool = ParticlePool::new(8).into_shared();
        {
            let mut player = ParticlePlayer::new(Rc::clone(&pool), ParticleRng::new(2));
            let asset = single_emitter_asset(|e| {
                e.quantity.base.set_single_data_key(100.0);
            });
            player.set_asset(asset.into_shared());
            player.on_add_to_scene();
            player.integrate(0.1);
            assert!(pool.borrow().active_count() > 0);
        }
        assert_eq!(pool.borrow().active_count(), 0);
    }
}
