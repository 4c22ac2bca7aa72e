//! Render submission: the sink trait players draw into and a CPU quad batcher

use bytemuck::{Pod, Zeroable};
use ember_core::{Color, Vec2};

use crate::asset::BlendMode;
use crate::frame::TextureHandle;

/// One textured particle quad in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleQuad {
    pub corners: [Vec2; 4],
    pub uvs: [Vec2; 4],
    pub texture: TextureHandle,
    pub color: Color,
}

/// Receiver of particle draw data
pub trait RenderSink {
    /// End the current batch; state changes take effect from the next quad
    fn flush(&mut self);
    fn set_blend_mode(&mut self, blend: BlendMode);
    /// Negative disables alpha testing
    fn set_alpha_test(&mut self, alpha_test: f32);
    fn submit_quad(&mut self, quad: &ParticleQuad);
}

/// GPU vertex: 32 bytes of position, uv and rgba
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

/// A contiguous index range sharing texture and render state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawBatch {
    pub texture: TextureHandle,
    pub blend: BlendMode,
    pub alpha_test: f32,
    pub first_index: u32,
    pub index_count: u32,
}

/// Packs submitted quads into vertex/index buffers with per-state draw ranges
#[derive(Debug)]
pub struct QuadBatch {
    vertices: Vec<QuadVertex>,
    indices: Vec<u32>,
    batches: Vec<DrawBatch>,
    blend: BlendMode,
    alpha_test: f32,
    batch_open: bool,
}

impl QuadBatch {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            batches: Vec::new(),
            blend: BlendMode::ALPHA,
            alpha_test: -1.0,
            batch_open: false,
        }
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.batches.clear();
        self.batch_open = false;
    }

    pub fn vertices(&self) -> &[QuadVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn batches(&self) -> &[DrawBatch] {
        &self.batches
    }

    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Vertex buffer contents ready for upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    fn continues_batch(&self, texture: TextureHandle) -> bool {
        self.batch_open
            && self.batches.last().is_some_and(|b| {
                b.texture == texture && b.blend == self.blend && b.alpha_test == self.alpha_test
            })
    }
}

impl Default for QuadBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSink for QuadBatch {
    fn flush(&mut self) {
        self.batch_open = false;
    }

    fn set_blend_mode(&mut self, blend: BlendMode) {
        if blend != self.blend {
            self.blend = blend;
            self.batch_open = false;
        }
    }

    fn set_alpha_test(&mut self, alpha_test: f32) {
        if alpha_test != self.alpha_test {
            self.alpha_test = alpha_test;
            self.batch_open = false;
        }
    }

    fn submit_quad(&mut self, quad: &ParticleQuad) {
        if !self.continues_batch(quad.texture) {
            self.batches.push(DrawBatch {
                texture: quad.texture,
                blend: self.blend,
                alpha_test: self.alpha_test,
                first_index: self.indices.len() as u32,
                index_count: 0,
            });
            self.batch_open = true;
        }

        let base = self.vertices.len() as u32;
        let color = quad.color.to_array();
        for (corner, uv) in quad.corners.iter().zip(quad.uvs.iter()) {
            self.vertices.push(QuadVertex {
                position: corner.to_array(),
                uv: uv.to_array(),
                color,
            });
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        if let Some(batch) = self.batches.last_mut() {
            batch.index_count += 6;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(texture: u32) -> ParticleQuad {
        ParticleQuad {
            corners: [
                Vec2::new(-1.0, -1.0),
                Vec2::new(1.0, -1.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(-1.0, 1.0),
            ],
            uvs: [Vec2::new(0.0, 1.0), Vec2::ONE, Vec2::new(1.0, 0.0), Vec2::ZERO],
            texture: TextureHandle(texture),
            color: Color::WHITE,
        }
    }

    #[test]
    fn vertex_layout() {
        assert_eq!(std::mem::size_of::<QuadVertex>(), 32);
        assert_eq!(std::mem::align_of::<QuadVertex>(), 4);
    }

    #[test]
    fn same_state_quads_share_a_batch() {
        let mut batch = QuadBatch::new();
        batch.submit_quad(&quad(1));
        batch.submit_quad(&quad(1));
        assert_eq!(batch.batches().len(), 1);
        assert_eq!(batch.batches()[0].index_count, 12);
        assert_eq!(&batch.indices()[6..], &[4, 5, 6, 4, 6, 7]);
        assert_eq!(batch.vertex_bytes().len(), 8 * 32);
    }

    #[test]
    fn state_changes_split_batches() {
        let mut batch = QuadBatch::new();
        batch.submit_quad(&quad(1));
        batch.submit_quad(&quad(2));
        batch.set_blend_mode(BlendMode::ADDITIVE);
        batch.submit_quad(&quad(2));
        batch.flush();
        batch.submit_quad(&quad(2));

        let batches = batch.batches();
        assert_eq!(batches.len(), 4);
        assert_eq!(batches[2].blend, BlendMode::ADDITIVE);
        assert_eq!(batches[3].first_index, 18);
        assert_eq!(batch.quad_count(), 4);

        batch.clear();
        assert!(batch.batches().is_empty());
    }
}
