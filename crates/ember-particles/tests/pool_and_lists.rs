//! Pool accounting and emitter list integrity under churn

use std::collections::HashSet;

use ember_core::{EmberError, Vec2};
use ember_particles::{EmitterNode, Link, ParticleHandle, ParticlePool, ParticleRng};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Walk forward from the head and back again, returning the handles in order
fn walk(node: &EmitterNode, pool: &ParticlePool) -> (Vec<ParticleHandle>, Vec<ParticleHandle>) {
    let limit = node.live_count() + 1;

    let mut forward = Vec::new();
    let mut link = node.next_link(pool, Link::Head);
    let mut steps = 1;
    while let Link::Particle(handle) = link {
        forward.push(handle);
        link = node.next_link(pool, link);
        steps += 1;
        assert!(steps <= limit, "forward walk did not return to head");
    }

    let mut backward = Vec::new();
    let mut link = node.prev_link(pool, Link::Head);
    steps = 1;
    while let Link::Particle(handle) = link {
        backward.push(handle);
        link = node.prev_link(pool, link);
        steps += 1;
        assert!(steps <= limit, "backward walk did not return to head");
    }

    (forward, backward)
}

#[test]
fn pool_counts_track_acquire_and_release() {
    init_logging();
    let block_size = 16;
    let mut pool = ParticlePool::new(block_size);
    let mut rng = ParticleRng::new(11);
    let mut held = Vec::new();
    let (mut acquires, mut releases) = (0usize, 0usize);

    for _ in 0..2000 {
        if held.is_empty() || rng.next_f32() < 0.6 {
            held.push(pool.acquire().unwrap());
            acquires += 1;
        } else {
            let victim = rng.range_inclusive(0, held.len() - 1);
            pool.release(held.swap_remove(victim)).unwrap();
            releases += 1;
        }

        assert_eq!(pool.active_count(), acquires - releases);
        assert!(pool.allocated_count() >= pool.active_count());
        assert_eq!(pool.allocated_count() % block_size, 0);
        assert_eq!(pool.allocated_count(), pool.block_count() * block_size);
    }
}

#[test]
fn handles_survive_pool_growth() {
    let mut pool = ParticlePool::new(4);
    let first = pool.acquire().unwrap();
    pool[first].position = Vec2::new(7.0, -7.0);

    let others: Vec<_> = (0..40).map(|_| pool.acquire().unwrap()).collect();
    for (i, handle) in others.iter().enumerate() {
        pool[*handle].age = i as f32;
    }
    assert!(pool.block_count() > 1);

    assert!(pool.is_valid(first));
    assert_eq!(pool[first].position, Vec2::new(7.0, -7.0));
    for (i, handle) in others.iter().enumerate() {
        assert_eq!(pool.get(*handle).map(|p| p.age), Some(i as f32));
    }
}

#[test]
fn double_release_is_rejected() {
    let mut pool = ParticlePool::new(4);
    let handle = pool.acquire().unwrap();
    pool.release(handle).unwrap();
    assert!(matches!(pool.release(handle), Err(EmberError::StaleHandle(_))));
    assert_eq!(pool.active_count(), 0);

    // The slot is reused under a new generation; the old handle stays dead
    let reused = pool.acquire().unwrap();
    assert_eq!(reused.index(), handle.index());
    assert_ne!(reused.generation(), handle.generation());
    assert!(pool.get(handle).is_none());
}

#[test]
fn bounded_pool_reports_exhaustion() {
    let mut pool = ParticlePool::with_limit(8, 3);
    for _ in 0..3 {
        pool.acquire().unwrap();
    }
    assert!(matches!(
        pool.acquire(),
        Err(EmberError::PoolExhausted { capacity: 3 })
    ));
}

#[test]
fn list_walks_match_live_count_under_churn() {
    init_logging();
    let mut pool = ParticlePool::new(8);
    let mut nodes = [EmitterNode::new(0), EmitterNode::new(1)];
    let mut rng = ParticleRng::new(3);

    for round in 0..600 {
        let which = rng.range_inclusive(0, 1);
        let node = &mut nodes[which];
        if node.live_count() == 0 || rng.next_f32() < 0.55 {
            node.create_particle(&mut pool, |p| p.age = round as f32).unwrap();
        } else {
            // Free from the front, back or middle
            let (forward, _) = walk(node, &pool);
            let victim = forward[rng.range_inclusive(0, forward.len() - 1)];
            node.free_particle(&mut pool, victim).unwrap();
        }

        let mut seen = HashSet::new();
        for node in &nodes {
            let (forward, backward) = walk(node, &pool);
            assert_eq!(forward.len(), node.live_count());
            assert_eq!(backward.len(), node.live_count());
            assert!(forward.iter().rev().eq(backward.iter()));
            for handle in forward {
                assert!(seen.insert(handle), "record linked twice");
            }
        }
        assert_eq!(seen.len(), pool.active_count());
    }
}

#[test]
fn freeing_through_another_node_leaves_both_lists_intact() {
    let mut pool = ParticlePool::new(8);
    let mut smoke = EmitterNode::new(0);
    let mut fire = EmitterNode::new(1);
    let own = smoke.create_particle(&mut pool, |_| {}).unwrap();
    let other = fire.create_particle(&mut pool, |_| {}).unwrap();

    assert!(matches!(
        smoke.free_particle(&mut pool, other),
        Err(EmberError::ParticleStillLinked(_))
    ));
    assert!(pool.is_valid(other));
    assert_eq!(walk(&smoke, &pool).0, vec![own]);
    assert_eq!(walk(&fire, &pool).0, vec![other]);
    assert_eq!(smoke.live_count(), 1);
    assert_eq!(fire.live_count(), 1);

    fire.free_particle(&mut pool, other).unwrap();
    smoke.free_particle(&mut pool, own).unwrap();
    assert_eq!(pool.active_count(), 0);
}

#[test]
fn newest_particle_is_first() {
    let mut pool = ParticlePool::new(8);
    let mut node = EmitterNode::new(0);
    let a = node.create_particle(&mut pool, |_| {}).unwrap();
    let b = node.create_particle(&mut pool, |_| {}).unwrap();
    let c = node.create_particle(&mut pool, |_| {}).unwrap();

    let (forward, _) = walk(&node, &pool);
    assert_eq!(forward, vec![c, b, a]);
    assert_eq!(node.first(), Some(c));
    assert_eq!(node.last(), Some(a));

    node.free_particle(&mut pool, b).unwrap();
    assert_eq!(node.next_of(&pool, c), Some(a));
    assert_eq!(node.prev_of(&pool, a), Some(c));

    node.free_all_particles(&mut pool).unwrap();
    assert_eq!(node.next_link(&pool, Link::Head), Link::Head);
    assert_eq!(pool.active_count(), 0);
}
