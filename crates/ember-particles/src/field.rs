//! Keyframed field curves and the base/variation/effect sampling patterns
//!
//! Every spawn-time attribute and every over-life attribute of a particle is
//! produced by sampling a [`FieldCurve`]. Effect-timeline curves are sampled
//! at the player age (seconds); life curves at the normalized particle age.

use crate::rand::ParticleRng;

/// One `(time, value)` keyframe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataKey {
    pub time: f32,
    pub value: f32,
}

impl DataKey {
    pub const fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// A keyframed scalar function of time with value bounds, repeat and scale.
///
/// The key list is never empty and stays sorted by time.
#[derive(Debug, Clone)]
pub struct FieldCurve {
    name: &'static str,
    keys: Vec<DataKey>,
    max_time: f32,
    min_value: f32,
    max_value: f32,
    default_value: f32,
    value_scale: f32,
    /// Repeat period in seconds; zero disables repeating
    repeat_time: f32,
}

impl FieldCurve {
    /// Create a curve with a single key at time zero holding `default_value`
    pub fn new(
        name: &'static str,
        max_time: f32,
        min_value: f32,
        max_value: f32,
        default_value: f32,
    ) -> Self {
        let mut curve = Self {
            name,
            keys: Vec::new(),
            max_time: 1.0,
            min_value: 0.0,
            max_value: 1.0,
            default_value: 0.0,
            value_scale: 1.0,
            repeat_time: 0.0,
        };
        curve.set_value_bounds(max_time, min_value, max_value, default_value);
        curve
    }

    /// Replace the time/value bounds, repairing invalid input with a warning
    pub fn set_value_bounds(
        &mut self,
        mut max_time: f32,
        mut min_value: f32,
        mut max_value: f32,
        mut default_value: f32,
    ) {
        if !(max_time > 0.0) {
            log::warn!("field '{}': max time {max_time} is invalid, using 1.0", self.name);
            max_time = 1.0;
        }
        if !min_value.is_finite() || !max_value.is_finite() {
            log::warn!(
                "field '{}': value range ({min_value}, {max_value}) is not finite, using (0, 1)",
                self.name
            );
            min_value = 0.0;
            max_value = 1.0;
        }
        if min_value > max_value {
            log::warn!(
                "field '{}': value range is not normalised (min {min_value} / max {max_value})",
                self.name
            );
            std::mem::swap(&mut min_value, &mut max_value);
        } else if min_value == max_value {
            log::warn!("field '{}': value range has no scale ({min_value})", self.name);
            max_value = min_value + 0.001;
        }
        if !(min_value..=max_value).contains(&default_value) {
            log::warn!(
                "field '{}': default value {default_value} is out of range ({min_value}, {max_value})",
                self.name
            );
            default_value = min_value;
        }

        self.max_time = max_time;
        self.min_value = min_value;
        self.max_value = max_value;
        self.default_value = default_value;

        if self.keys.is_empty() {
            self.reset_data_keys();
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn min_value(&self) -> f32 {
        self.min_value
    }

    pub fn max_value(&self) -> f32 {
        self.max_value
    }

    pub fn max_time(&self) -> f32 {
        self.max_time
    }

    pub fn default_value(&self) -> f32 {
        self.default_value
    }

    pub fn value_scale(&self) -> f32 {
        self.value_scale
    }

    pub fn repeat_time(&self) -> f32 {
        self.repeat_time
    }

    /// Set the value multiplier. Negative scales are rejected.
    pub fn set_value_scale(&mut self, value_scale: f32) -> bool {
        if value_scale < 0.0 {
            log::warn!("field '{}': invalid value scale {value_scale}", self.name);
            return false;
        }
        self.value_scale = value_scale;
        true
    }

    /// Set the repeat period (zero disables). Negative periods are rejected.
    pub fn set_repeat_time(&mut self, repeat_time: f32) -> bool {
        if repeat_time < 0.0 {
            log::warn!("field '{}': invalid repeat time {repeat_time}", self.name);
            return false;
        }
        self.repeat_time = repeat_time;
        true
    }

    /// Clamp a value into this curve's bounds
    pub fn clamp_value(&self, value: f32) -> f32 {
        value.clamp(self.min_value, self.max_value)
    }

    // ── Keys ──

    /// Reset to a single key at time zero holding the default value
    pub fn reset_data_keys(&mut self) {
        self.keys.clear();
        self.keys.push(DataKey::new(0.0, self.default_value));
    }

    /// Same as [`reset_data_keys`](Self::reset_data_keys)
    pub fn clear_data_keys(&mut self) {
        self.reset_data_keys();
    }

    /// Replace all keys with a single key at time zero
    pub fn set_single_data_key(&mut self, value: f32) -> usize {
        self.keys.clear();
        self.keys.push(DataKey::new(0.0, value));
        0
    }

    /// Insert a key in time order, replacing the value of a key at the same time.
    ///
    /// Returns the key index, or `None` when `time` is outside `[0, max_time]`.
    pub fn add_data_key(&mut self, time: f32, value: f32) -> Option<usize> {
        if !(0.0..=self.max_time).contains(&time) {
            log::warn!("field '{}': key time {time} is out of bounds", self.name);
            return None;
        }
        let index = self.keys.partition_point(|k| k.time < time);
        match self.keys.get_mut(index) {
            Some(key) if key.time == time => key.value = value,
            _ => self.keys.insert(index, DataKey::new(time, value)),
        }
        Some(index)
    }

    /// Remove a key. The first key can never be removed.
    pub fn remove_data_key(&mut self, index: usize) -> bool {
        if index == 0 {
            log::warn!("field '{}': cannot remove the first data key", self.name);
            return false;
        }
        if index >= self.keys.len() {
            log::warn!(
                "field '{}': key index {index} out of range ({} keys)",
                self.name,
                self.keys.len()
            );
            return false;
        }
        self.keys.remove(index);
        true
    }

    pub fn set_data_key_value(&mut self, index: usize, value: f32) -> bool {
        match self.keys.get_mut(index) {
            Some(key) => {
                key.value = value;
                true
            }
            None => {
                log::warn!("field '{}': key index {index} out of range", self.name);
                false
            }
        }
    }

    pub fn data_key(&self, index: usize) -> Option<DataKey> {
        self.keys.get(index).copied()
    }

    pub fn data_key_count(&self) -> usize {
        self.keys.len()
    }

    pub fn keys(&self) -> &[DataKey] {
        &self.keys
    }

    // ── Evaluation ──

    /// Sample the curve at `time`.
    ///
    /// With a repeat period the time wraps first. Times before the first key
    /// or after the last hold the endpoint value; in between the bracketing
    /// keys are linearly interpolated. The result is scaled then clamped to
    /// the value bounds.
    pub fn sample(&self, time: f32) -> f32 {
        let time = if self.repeat_time > 0.0 {
            time.rem_euclid(self.repeat_time)
        } else {
            time
        };
        self.clamp_value(self.raw_value(time) * self.value_scale)
    }

    fn raw_value(&self, time: f32) -> f32 {
        let keys = &self.keys;
        let (Some(first), Some(last)) = (keys.first(), keys.last()) else {
            return self.default_value;
        };
        if keys.len() == 1 || time <= first.time {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }

        // First key strictly after `time`; in 1..len because first.time < time < last.time
        let idx = keys.partition_point(|k| k.time <= time);
        let prev = keys[idx - 1];
        let next = keys[idx];
        let span = next.time - prev.time;
        if span <= 0.0 {
            return prev.value;
        }
        let t = (time - prev.time) / span;
        prev.value * (1.0 - t) + next.value * t
    }
}

/// Base and variation curves sampled over the effect timeline
#[derive(Debug, Clone)]
pub struct BaseVariation {
    pub base: FieldCurve,
    pub variation: FieldCurve,
}

impl BaseVariation {
    pub fn new(base: FieldCurve, variation: FieldCurve) -> Self {
        Self { base, variation }
    }

    pub fn sample_bv(&self, effect_age: f32, rng: &mut ParticleRng) -> f32 {
        calculate_field_bv(&self.base, &self.variation, effect_age, rng)
    }

    pub fn sample_bve(&self, effect: &FieldCurve, effect_age: f32, rng: &mut ParticleRng) -> f32 {
        calculate_field_bve(&self.base, &self.variation, effect, effect_age, rng)
    }
}

/// Base, variation and over-life curves
#[derive(Debug, Clone)]
pub struct BaseVariationLife {
    pub base: FieldCurve,
    pub variation: FieldCurve,
    pub life: FieldCurve,
}

impl BaseVariationLife {
    pub fn new(base: FieldCurve, variation: FieldCurve, life: FieldCurve) -> Self {
        Self {
            base,
            variation,
            life,
        }
    }

    pub fn sample_bv(&self, effect_age: f32, rng: &mut ParticleRng) -> f32 {
        calculate_field_bv(&self.base, &self.variation, effect_age, rng)
    }

    pub fn sample_bve(&self, effect: &FieldCurve, effect_age: f32, rng: &mut ParticleRng) -> f32 {
        calculate_field_bve(&self.base, &self.variation, effect, effect_age, rng)
    }

    /// Scale a spawn-time value by the life curve at `particle_age` (0..1),
    /// clamped to the base curve's bounds
    pub fn life_scaled(&self, value: f32, particle_age: f32) -> f32 {
        self.base.clamp_value(value * self.life.sample(particle_age))
    }
}

/// Base + uniform variation in `±variation/2`, clamped to the base bounds
pub fn calculate_field_bv(
    base: &FieldCurve,
    variation: &FieldCurve,
    effect_age: f32,
    rng: &mut ParticleRng,
) -> f32 {
    let base_value = base.sample(effect_age);
    let half = variation.sample(effect_age) * 0.5;
    base.clamp_value(base_value + rng.range(-half, half))
}

/// Like [`calculate_field_bv`] with the result multiplied by an effect-level
/// scale curve sampled at the effect age, then clamped to the base bounds
pub fn calculate_field_bve(
    base: &FieldCurve,
    variation: &FieldCurve,
    effect: &FieldCurve,
    effect_age: f32,
    rng: &mut ParticleRng,
) -> f32 {
    let base_value = base.sample(effect_age);
    let half = variation.sample(effect_age) * 0.5;
    let effect_value = effect.sample(effect_age);
    base.clamp_value((base_value + rng.range(-half, half)) * effect_value)
}

/// Like [`calculate_field_bve`] with an additional over-life curve sampled at
/// the normalized particle age
pub fn calculate_field_bvle(
    base: &FieldCurve,
    variation: &FieldCurve,
    life: &FieldCurve,
    effect: &FieldCurve,
    effect_age: f32,
    particle_age: f32,
    rng: &mut ParticleRng,
) -> f32 {
    let base_value = base.sample(effect_age);
    let half = variation.sample(effect_age) * 0.5;
    let effect_value = effect.sample(effect_age);
    let life_value = life.sample(particle_age);
    base.clamp_value((base_value + rng.range(-half, half)) * effect_value * life_value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> FieldCurve {
        let mut curve = FieldCurve::new("Ramp", 10.0, -100.0, 100.0, 0.0);
        curve.add_data_key(1.0, 10.0);
        curve.add_data_key(3.0, 30.0);
        curve.set_data_key_value(0, 10.0);
        curve
    }

    #[test]
    fn new_curve_has_default_key() {
        let curve = FieldCurve::new("Speed", 1000.0, 0.0, 100.0, 10.0);
        assert_eq!(curve.data_key_count(), 1);
        assert_eq!(curve.sample(0.0), 10.0);
        assert_eq!(curve.sample(500.0), 10.0);
    }

    #[test]
    fn sample_before_first_and_after_last_clamps() {
        let mut curve = FieldCurve::new("Ramp", 10.0, -100.0, 100.0, 0.0);
        curve.set_single_data_key(5.0);
        curve.add_data_key(2.0, 20.0);
        curve.add_data_key(4.0, 40.0);
        assert_eq!(curve.sample(100.0), 40.0);
        assert_eq!(curve.sample(-3.0), 5.0);
        assert_eq!(curve.sample(4.0), 40.0);
    }

    #[test]
    fn sample_interpolates_between_keys() {
        let curve = ramp();
        assert!((curve.sample(2.0) - 20.0).abs() < 1e-5);
        assert!((curve.sample(0.5) - 10.0).abs() < 1e-5);
        assert!((curve.sample(1.0) - 10.0).abs() < 1e-5);
        assert!((curve.sample(9.0) - 30.0).abs() < 1e-5);
    }

    #[test]
    fn first_key_only_holds_before_its_time() {
        let mut curve = FieldCurve::new("Offset", 10.0, -100.0, 100.0, 0.0);
        curve.set_data_key_value(0, 4.0);
        curve.add_data_key(2.0, 8.0);
        assert_eq!(curve.sample(-1.0), 4.0);
        assert!((curve.sample(1.0) - 6.0).abs() < 1e-5);
        assert_eq!(curve.sample(5.0), 8.0);
    }

    #[test]
    fn repeat_period_wraps_time() {
        let mut curve = FieldCurve::new("Pulse", 10.0, 0.0, 100.0, 0.0);
        curve.add_data_key(1.0, 50.0);
        curve.add_data_key(2.0, 0.0);
        assert!(curve.set_repeat_time(2.0));

        for t in [0.0_f32, 0.25, 0.5, 1.0, 1.5] {
            assert_eq!(curve.sample(t), curve.sample(t + 2.0));
            assert_eq!(curve.sample(t), curve.sample(t + 4.0));
        }
        assert!(!curve.set_repeat_time(-1.0));
    }

    #[test]
    fn value_scale_then_clamp() {
        let mut curve = FieldCurve::new("Alpha", 1.0, 0.0, 1.0, 0.8);
        assert!(curve.set_value_scale(2.0));
        assert_eq!(curve.sample(0.5), 1.0);
        assert!(curve.set_value_scale(0.5));
        assert!((curve.sample(0.5) - 0.4).abs() < 1e-6);
        assert!(!curve.set_value_scale(-1.0));
    }

    #[test]
    fn bounds_are_repaired() {
        let swapped = FieldCurve::new("Swapped", 0.0, 10.0, -10.0, 50.0);
        assert_eq!(swapped.min_value(), -10.0);
        assert_eq!(swapped.max_value(), 10.0);
        assert_eq!(swapped.max_time(), 1.0);
        // Out-of-range default falls back to the minimum
        assert_eq!(swapped.default_value(), -10.0);

        let flat = FieldCurve::new("Flat", 1.0, 2.0, 2.0, 2.0);
        assert!((flat.max_value() - 2.001).abs() < 1e-6);
    }

    #[test]
    fn key_editing_rules() {
        let mut curve = FieldCurve::new("Keys", 1.0, 0.0, 10.0, 1.0);
        assert_eq!(curve.add_data_key(0.5, 3.0), Some(1));
        assert_eq!(curve.add_data_key(0.25, 2.0), Some(1));
        assert_eq!(curve.add_data_key(0.5, 4.0), Some(2));
        assert_eq!(curve.data_key_count(), 3);
        assert_eq!(curve.data_key(2), Some(DataKey::new(0.5, 4.0)));
        assert_eq!(curve.add_data_key(2.0, 1.0), None);

        assert!(!curve.remove_data_key(0));
        assert!(!curve.remove_data_key(9));
        assert!(curve.remove_data_key(1));
        assert!(!curve.set_data_key_value(5, 1.0));

        curve.clear_data_keys();
        assert_eq!(curve.keys(), &[DataKey::new(0.0, 1.0)]);
    }

    #[test]
    fn bv_stays_within_base_bounds() {
        let mut base = FieldCurve::new("Size", 1000.0, 0.0, 10.0, 9.0);
        base.set_single_data_key(9.0);
        let mut variation = FieldCurve::new("SizeVariation", 1000.0, 0.0, 200.0, 0.0);
        variation.set_single_data_key(100.0);

        let mut rng = ParticleRng::new(3);
        for _ in 0..1000 {
            let v = calculate_field_bv(&base, &variation, 0.0, &mut rng);
            assert!((0.0..=10.0).contains(&v));
        }
    }

    #[test]
    fn bve_applies_effect_scale_and_clamps() {
        let mut base = FieldCurve::new("Lifetime", 1000.0, 0.0, 10.0, 2.0);
        base.set_single_data_key(4.0);
        let variation = FieldCurve::new("LifetimeVariation", 1000.0, 0.0, 50.0, 0.0);
        let mut effect = FieldCurve::new("LifetimeScale", 1000.0, 0.0, 100.0, 1.0);
        effect.set_single_data_key(0.5);

        let mut rng = ParticleRng::new(11);
        let v = calculate_field_bve(&base, &variation, &effect, 0.0, &mut rng);
        assert!((v - 2.0).abs() < 1e-6);

        effect.set_single_data_key(10.0);
        let mut wide = variation.clone();
        wide.set_single_data_key(40.0);
        for _ in 0..500 {
            let v = calculate_field_bve(&base, &wide, &effect, 0.0, &mut rng);
            assert!((0.0..=10.0).contains(&v));
        }
    }

    #[test]
    fn bvle_multiplies_life_curve() {
        let mut base = FieldCurve::new("Size", 1000.0, 0.0, 100.0, 2.0);
        base.set_single_data_key(4.0);
        let variation = FieldCurve::new("SizeVariation", 1000.0, 0.0, 200.0, 0.0);
        let effect = FieldCurve::new("SizeScale", 1000.0, 0.0, 100.0, 1.0);
        let mut life = FieldCurve::new("SizeLife", 1.0, -100.0, 100.0, 1.0);
        life.add_data_key(1.0, 0.0);

        let mut rng = ParticleRng::new(1);
        let v = calculate_field_bvle(&base, &variation, &life, &effect, 0.0, 0.5, &mut rng);
        assert!((v - 2.0).abs() < 1e-5);
    }

    #[test]
    fn life_scaled_uses_base_bounds() {
        let group = BaseVariationLife::new(
            FieldCurve::new("Speed", 1000.0, 0.0, 100.0, 10.0),
            FieldCurve::new("SpeedVariation", 1000.0, 0.0, 200.0, 0.0),
            {
                let mut life = FieldCurve::new("SpeedLife", 1.0, -100.0, 100.0, 1.0);
                life.set_single_data_key(-2.0);
                life
            },
        );
        assert_eq!(group.life_scaled(10.0, 0.5), 0.0);
    }
}
