//! Image and animation frame sources attached to each particle

use std::sync::Arc;

use glam::Vec2;

use crate::rand::ParticleRng;

/// Opaque renderer texture identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Normalized texture coordinates of one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexelArea {
    pub lower: Vec2,
    pub upper: Vec2,
}

impl TexelArea {
    pub const FULL: Self = Self {
        lower: Vec2::ZERO,
        upper: Vec2::ONE,
    };

    pub fn new(lower: Vec2, upper: Vec2) -> Self {
        Self { lower, upper }
    }

    /// Quad UVs in corner order (lower-left, lower-right, upper-right, upper-left)
    pub fn quad_uvs(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.lower.x, self.upper.y),
            Vec2::new(self.upper.x, self.upper.y),
            Vec2::new(self.upper.x, self.lower.y),
            Vec2::new(self.lower.x, self.lower.y),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageFrame {
    pub name: Option<String>,
    pub area: TexelArea,
}

/// A texture sliced into one or more frames
#[derive(Debug, Clone)]
pub struct ImageAsset {
    name: String,
    texture: TextureHandle,
    frames: Vec<ImageFrame>,
}

impl ImageAsset {
    pub fn new(name: impl Into<String>, texture: TextureHandle) -> Self {
        Self {
            name: name.into(),
            texture,
            frames: Vec::new(),
        }
    }

    /// An image covering the whole texture with a single frame
    pub fn single(name: impl Into<String>, texture: TextureHandle) -> Self {
        let mut image = Self::new(name, texture);
        image.add_frame(TexelArea::FULL);
        image
    }

    /// Slice the texture into a `columns` x `rows` grid, row-major from the top-left
    pub fn grid(name: impl Into<String>, texture: TextureHandle, columns: u32, rows: u32) -> Self {
        let mut image = Self::new(name, texture);
        if columns == 0 || rows == 0 {
            return image;
        }
        let cell = Vec2::new(1.0 / columns as f32, 1.0 / rows as f32);
        for row in 0..rows {
            for column in 0..columns {
                let lower = Vec2::new(column as f32, row as f32) * cell;
                image.add_frame(TexelArea::new(lower, lower + cell));
            }
        }
        image
    }

    pub fn add_frame(&mut self, area: TexelArea) -> usize {
        self.frames.push(ImageFrame { name: None, area });
        self.frames.len() - 1
    }

    pub fn add_named_frame(&mut self, name: impl Into<String>, area: TexelArea) -> usize {
        self.frames.push(ImageFrame {
            name: Some(name.into()),
            area,
        });
        self.frames.len() - 1
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame(&self, index: usize) -> Option<&ImageFrame> {
        self.frames.get(index)
    }

    pub fn frame_index_by_name(&self, name: &str) -> Option<usize> {
        self.frames
            .iter()
            .position(|f| f.name.as_deref() == Some(name))
    }
}

/// A sequence of image frames played over a fixed duration
#[derive(Debug, Clone)]
pub struct AnimationAsset {
    name: String,
    image: Arc<ImageAsset>,
    frames: Vec<usize>,
    /// Total duration in seconds
    duration: f32,
    pub cycle: bool,
    pub random_start: bool,
}

impl AnimationAsset {
    pub fn new(
        name: impl Into<String>,
        image: Arc<ImageAsset>,
        frames: Vec<usize>,
        duration: f32,
    ) -> Self {
        Self {
            name: name.into(),
            image,
            frames,
            duration,
            cycle: true,
            random_start: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> &Arc<ImageAsset> {
        &self.image
    }

    pub fn frames(&self) -> &[usize] {
        &self.frames
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Seconds each frame is shown
    pub fn frame_time(&self) -> f32 {
        if self.frames.is_empty() {
            0.0
        } else {
            self.duration / self.frames.len() as f32
        }
    }

    /// Playable: has frames, a positive duration and every frame exists in the image
    pub fn is_valid(&self) -> bool {
        !self.frames.is_empty()
            && self.duration > 0.0
            && self.frames.iter().all(|f| *f < self.image.frame_count())
    }
}

#[derive(Debug, Clone)]
struct AnimationState {
    asset: Arc<AnimationAsset>,
    current_time: f32,
    frame_index: usize,
    finished: bool,
}

impl AnimationState {
    fn image_frame(&self) -> usize {
        self.asset.frames()[self.frame_index]
    }
}

/// Per-particle frame source: either a fixed image frame or a playing animation.
///
/// Released explicitly when the owning record returns to the pool.
#[derive(Debug, Clone, Default)]
pub struct FrameProvider {
    image: Option<Arc<ImageAsset>>,
    frame: usize,
    animation: Option<Arc<AnimationAsset>>,
    state: Option<AnimationState>,
}

impl FrameProvider {
    /// Attach the emitter's image and animation references
    pub fn allocate_assets(
        &mut self,
        image: Option<Arc<ImageAsset>>,
        animation: Option<Arc<AnimationAsset>>,
    ) {
        self.image = image;
        self.animation = animation;
        self.frame = 0;
        self.state = None;
    }

    /// Drop all asset references
    pub fn release(&mut self) {
        self.image = None;
        self.animation = None;
        self.frame = 0;
        self.state = None;
    }

    pub fn is_allocated(&self) -> bool {
        self.image.is_some() || self.animation.is_some()
    }

    pub fn is_animated(&self) -> bool {
        self.state.is_some()
    }

    /// Show a fixed frame of the attached image, stopping any animation
    pub fn set_image_frame(&mut self, index: usize) -> bool {
        let Some(image) = &self.image else {
            log::warn!("cannot set image frame {index}: no image asset");
            return false;
        };
        if index >= image.frame_count() {
            log::warn!(
                "image frame {index} is out of range for '{}' ({} frames)",
                image.name(),
                image.frame_count()
            );
            return false;
        }
        self.frame = index;
        self.state = None;
        true
    }

    pub fn set_image_frame_by_name(&mut self, name: &str) -> bool {
        let Some(image) = &self.image else {
            log::warn!("cannot set image frame '{name}': no image asset");
            return false;
        };
        match image.frame_index_by_name(name) {
            Some(index) => self.set_image_frame(index),
            None => {
                log::warn!("image '{}' has no frame named '{name}'", image.name());
                false
            }
        }
    }

    /// Start playing `animation` from its first frame, or a random time when
    /// the animation asks for a random start
    pub fn play_animation(&mut self, animation: Arc<AnimationAsset>, rng: &mut ParticleRng) -> bool {
        if !animation.is_valid() {
            log::warn!("animation '{}' has no playable frames", animation.name());
            return false;
        }
        let current_time = if animation.random_start {
            rng.range(0.0, animation.duration() * 0.999)
        } else {
            0.0
        };
        let mut state = AnimationState {
            asset: Arc::clone(&animation),
            current_time,
            frame_index: 0,
            finished: false,
        };
        state.frame_index = frame_at(&animation, current_time);
        self.animation = Some(animation);
        self.state = Some(state);
        true
    }

    /// Advance the playing animation by `dt` seconds. Returns true when the
    /// displayed frame changed.
    pub fn update_animation(&mut self, dt: f32) -> bool {
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        if state.finished {
            return false;
        }
        let total = state.asset.duration();
        state.current_time += dt;
        if !state.asset.cycle && state.current_time >= total {
            state.finished = true;
            state.current_time = total - state.asset.frame_time() * 0.5;
        }
        let frame_index = frame_at(&state.asset, state.current_time);
        let changed = frame_index != state.frame_index;
        state.frame_index = frame_index;
        changed
    }

    pub fn is_animation_finished(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.finished)
    }

    /// Index into the source image of the frame currently shown
    pub fn current_frame(&self) -> Option<usize> {
        match &self.state {
            Some(state) => Some(state.image_frame()),
            None => self.image.as_ref().map(|_| self.frame),
        }
    }

    fn source_image(&self) -> Option<&Arc<ImageAsset>> {
        match &self.state {
            Some(state) => Some(state.asset.image()),
            None => self.image.as_ref(),
        }
    }

    pub fn texture(&self) -> Option<TextureHandle> {
        self.source_image().map(|image| image.texture())
    }

    pub fn frame_area(&self) -> Option<TexelArea> {
        let image = self.source_image()?;
        let frame = self.current_frame()?;
        image.frame(frame).map(|f| f.area)
    }
}

fn frame_at(animation: &AnimationAsset, time: f32) -> usize {
    let frame_time = animation.frame_time();
    let count = animation.frames().len();
    if frame_time <= 0.0 || count == 0 {
        return 0;
    }
    let wrapped = time.rem_euclid(animation.duration());
    ((wrapped / frame_time) as usize).min(count - 1)
}
