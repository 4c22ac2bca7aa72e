use criterion::{criterion_group, criterion_main, Criterion};
use ember_particles::{
    EmitterNode, EmitterType, ImageAsset, ParticleAsset, ParticleAssetEmitter, ParticleConfig,
    ParticlePool, ParticleSystem, TextureHandle,
};
use glam::Vec2;
use std::hint::black_box;
use std::sync::Arc;

fn node_churn(c: &mut Criterion) {
    c.bench_function("node_create_free_1024", |b| {
        let mut pool = ParticlePool::new(512);
        let mut node = EmitterNode::new(0);
        b.iter(|| {
            for i in 0..1024 {
                node.create_particle(&mut pool, |p| p.age = i as f32).unwrap();
            }
            black_box(node.live_count());
            node.free_all_particles(&mut pool).unwrap();
        })
    });

    c.bench_function("pool_acquire_release_interleaved", |b| {
        let mut pool = ParticlePool::new(512);
        let mut held = Vec::with_capacity(256);
        b.iter(|| {
            for _ in 0..256 {
                held.push(pool.acquire().unwrap());
            }
            // Release every other record, then the rest
            for handle in held.iter().step_by(2) {
                pool.release(*handle).unwrap();
            }
            for handle in held.iter().skip(1).step_by(2) {
                pool.release(*handle).unwrap();
            }
            held.clear();
            black_box(pool.active_count());
        })
    });
}

fn effect_tick(c: &mut Criterion) {
    let image = Arc::new(ImageAsset::single("spark", TextureHandle(1)));
    let mut emitter = ParticleAssetEmitter::new("sparks");
    emitter.emitter_type = EmitterType::Disk;
    emitter.emitter_size = Vec2::splat(50.0);
    emitter.quantity.base.set_single_data_key(2000.0);
    emitter.lifetime.base.set_single_data_key(1.0);
    emitter.random_motion.base.set_single_data_key(5.0);
    emitter.set_image(image, 0);

    let mut asset = ParticleAsset::new("burst");
    asset.add_emitter(emitter);
    let asset = asset.into_shared();

    let config = ParticleConfig {
        rng_seed: Some(1),
        particle_interpolation: true,
        ..ParticleConfig::default()
    };

    c.bench_function("system_fixed_step_2000_per_sec", |b| {
        let mut system = ParticleSystem::new(config.clone()).unwrap();
        for i in 0..4 {
            system.spawn_effect(Arc::clone(&asset), Vec2::new(i as f32 * 100.0, 0.0));
        }
        b.iter(|| {
            system.fixed_step(black_box(1.0 / 60.0));
            system.interpolate(0.5);
            black_box(system.active_particle_count());
        })
    });
}

criterion_group!(benches, node_churn, effect_tick);
criterion_main!(benches);
