//! Emission geometry sampling

use glam::Vec2;

use crate::asset::EmitterType;
use crate::rand::ParticleRng;

/// Sample a spawn position in emitter space.
///
/// `offset` and `size` are already scaled by the player size scale; `angle`
/// is the emitter angle in radians. Disk and torus use a square-root radius
/// so samples are uniform by area; ellipse samples lie on the perimeter.
pub fn sample_emission_offset(
    shape: EmitterType,
    offset: Vec2,
    angle: f32,
    size: Vec2,
    rng: &mut ParticleRng,
) -> Vec2 {
    let half = size * 0.5;
    let rotation = Vec2::from_angle(angle);

    match shape {
        EmitterType::Point => offset,
        EmitterType::Line => {
            let local = Vec2::new(rng.range(-half.x, half.x), 0.0);
            rotation.rotate(local) + offset
        }
        EmitterType::Box => {
            let local = Vec2::new(rng.range(-half.x, half.x), rng.range(-half.y, half.y));
            rotation.rotate(local) + offset
        }
        EmitterType::Disk => {
            let theta = rng.angle();
            let radius = rng.next_f32().sqrt();
            let local = Vec2::new(theta.cos() * half.x, theta.sin() * half.y) * radius;
            rotation.rotate(local) + offset
        }
        EmitterType::Ellipse => {
            let theta = rng.angle();
            let local = Vec2::new(theta.cos() * half.x, theta.sin() * half.y);
            rotation.rotate(local) + offset
        }
        EmitterType::Torus => {
            let outer = half.max_element();
            let inner = half.min_element();
            let theta = rng.angle();
            let radius = inner + rng.next_f32().sqrt() * (outer - inner);
            Vec2::from_angle(theta) * radius + offset
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_is_constant() {
        let mut rng = ParticleRng::new(1);
        let offset = Vec2::new(3.0, -2.0);
        for _ in 0..10 {
            let p = sample_emission_offset(EmitterType::Point, offset, 1.0, Vec2::splat(50.0), &mut rng);
            assert_eq!(p, offset);
        }
    }

    #[test]
    fn line_follows_emitter_angle() {
        let mut rng = ParticleRng::new(2);
        let angle = std::f32::consts::FRAC_PI_2;
        for _ in 0..100 {
            let p = sample_emission_offset(EmitterType::Line, Vec2::ZERO, angle, Vec2::new(4.0, 9.0), &mut rng);
            assert!(p.x.abs() < 1e-5);
            assert!(p.y.abs() <= 2.0 + 1e-5);
        }
    }

    #[test]
    fn box_stays_inside_extent() {
        let mut rng = ParticleRng::new(3);
        for _ in 0..500 {
            let p = sample_emission_offset(EmitterType::Box, Vec2::ONE, 0.0, Vec2::new(4.0, 2.0), &mut rng);
            assert!((p.x - 1.0).abs() <= 2.0 && (p.y - 1.0).abs() <= 1.0);
        }
    }

    #[test]
    fn ellipse_samples_perimeter() {
        let mut rng = ParticleRng::new(4);
        for _ in 0..200 {
            let p = sample_emission_offset(EmitterType::Ellipse, Vec2::ZERO, 0.0, Vec2::new(8.0, 4.0), &mut rng);
            let unit = (p.x / 4.0).powi(2) + (p.y / 2.0).powi(2);
            assert!((unit - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn torus_between_radii() {
        let mut rng = ParticleRng::new(5);
        for _ in 0..500 {
            let p = sample_emission_offset(EmitterType::Torus, Vec2::ZERO, 0.0, Vec2::new(10.0, 6.0), &mut rng);
            let r = p.length();
            assert!(r >= 3.0 - 1e-4 && r <= 5.0 + 1e-4);
        }
    }

    #[test]
    fn tall_torus_is_uniform_by_area() {
        let mut rng = ParticleRng::new(6);
        let samples = 20_000;
        let mut outer_band = 0;
        for _ in 0..samples {
            let p = sample_emission_offset(EmitterType::Torus, Vec2::ZERO, 0.0, Vec2::new(6.0, 10.0), &mut rng);
            let r = p.length();
            assert!(r >= 3.0 - 1e-4 && r <= 5.0 + 1e-4, "r = {r}");
            if r > 4.0 {
                outer_band += 1;
            }
        }
        // Area of the 4..5 band over the 3..5 annulus: 9/16
        let fraction = outer_band as f32 / samples as f32;
        assert!((fraction - 0.5625).abs() < 0.02, "fraction = {fraction}");
    }
}
