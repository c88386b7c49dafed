use std::hash::Hash;

use indexmap::IndexMap;

use super::{AnimKey, AnimValue, AnimationSettings, normalized_timeline_progress};

#[derive(Clone, Copy, Debug, PartialEq)]
struct Tween {
    from: AnimValue,
    to: AnimValue,
    settings: AnimationSettings,
    elapsed_ms: f32,
    progress: f32,
}

/// One interpolated write produced by [`SimpleAnimation::advance`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TweenSample<T> {
    pub target: T,
    pub key: AnimKey,
    pub value: AnimValue,
    pub finished: bool,
}

/// Frame-stepped tween runner for number and color properties.
///
/// Holds at most one tween per `(target, key)`; adding a tween for a pair
/// that is still running replaces it in place, keeping its position in the
/// run order. Finished tweens emit their exact target value and are dropped.
#[derive(Debug)]
pub struct SimpleAnimation<T> {
    tweens: IndexMap<(T, AnimKey), Tween>,
    registered: bool,
}

impl<T> Default for SimpleAnimation<T> {
    fn default() -> Self {
        Self {
            tweens: IndexMap::new(),
            registered: false,
        }
    }
}

impl<T: Copy + Eq + Hash> SimpleAnimation<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        target: T,
        key: AnimKey,
        from: AnimValue,
        to: AnimValue,
        settings: AnimationSettings,
    ) {
        self.tweens.insert(
            (target, key),
            Tween {
                from,
                to,
                settings,
                elapsed_ms: 0.0,
                progress: 0.0,
            },
        );
    }

    /// Marks the runner as wanting frames. Returns `true` only on the
    /// transition from unregistered to registered.
    pub fn register(&mut self) -> bool {
        if self.registered {
            return false;
        }
        self.registered = true;
        true
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    pub fn cancel(&mut self, target: T, key: AnimKey) -> bool {
        let removed = self.tweens.shift_remove(&(target, key)).is_some();
        self.deregister_if_idle();
        removed
    }

    pub fn cancel_target(&mut self, target: T) -> usize {
        let before = self.tweens.len();
        self.tweens.retain(|(owner, _), _| *owner != target);
        self.deregister_if_idle();
        before - self.tweens.len()
    }

    pub fn is_animating(&self, target: T, key: AnimKey) -> bool {
        self.tweens.contains_key(&(target, key))
    }

    /// The value a running tween is heading to.
    pub fn target_value(&self, target: T, key: AnimKey) -> Option<AnimValue> {
        self.tweens.get(&(target, key)).map(|tween| tween.to)
    }

    pub fn progress(&self, target: T, key: AnimKey) -> Option<f32> {
        self.tweens.get(&(target, key)).map(|tween| tween.progress)
    }

    pub fn targets(&self) -> impl Iterator<Item = T> + '_ {
        self.tweens.keys().map(|(target, _)| *target)
    }

    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    /// Steps every tween by `dt_ms` and returns the writes to apply, in run
    /// order. Tweens still inside their delay produce no sample.
    pub fn advance(&mut self, dt_ms: f32) -> Vec<TweenSample<T>> {
        let mut samples = Vec::with_capacity(self.tweens.len());
        self.tweens.retain(|&(target, key), tween| {
            tween.elapsed_ms += dt_ms.max(0.0);
            let Some(progress) = normalized_timeline_progress(
                tween.elapsed_ms,
                tween.settings.delay_ms,
                tween.settings.duration_ms,
            ) else {
                return true;
            };
            tween.progress = tween.progress.max(progress);
            let finished = tween.progress >= 1.0;
            let value = if finished {
                tween.to
            } else {
                let eased = tween.settings.easing.sample(tween.progress);
                tween.from.lerp(tween.to, eased)
            };
            samples.push(TweenSample {
                target,
                key,
                value,
                finished,
            });
            !finished
        });
        self.deregister_if_idle();
        samples
    }

    fn deregister_if_idle(&mut self) {
        if self.tweens.is_empty() {
            self.registered = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::style::NumProp;
    use crate::transition::TimeFunction;

    const X: AnimKey = AnimKey::Num(NumProp::X);
    const ALPHA: AnimKey = AnimKey::Num(NumProp::Alpha);

    fn linear(duration_ms: f32) -> AnimationSettings {
        AnimationSettings::new(duration_ms).easing(TimeFunction::Linear)
    }

    #[test]
    fn delay_holds_the_tween_before_sampling() {
        let mut runner = SimpleAnimation::new();
        runner.add(
            1_u32,
            X,
            AnimValue::Number(0.0),
            AnimValue::Number(100.0),
            linear(100.0).delay(50.0),
        );
        assert!(runner.advance(40.0).is_empty());
        let samples = runner.advance(60.0);
        assert_eq!(samples[0].value, AnimValue::Number(50.0));
        assert!(!samples[0].finished);
    }

    #[test]
    fn zero_duration_completes_on_first_frame() {
        let mut runner = SimpleAnimation::new();
        runner.register();
        runner.add(7_u32, ALPHA, AnimValue::Number(1.0), AnimValue::Number(0.0), linear(0.0));
        let samples = runner.advance(16.0);
        assert_eq!(samples.len(), 1);
        assert!(samples[0].finished);
        assert_eq!(samples[0].value, AnimValue::Number(0.0));
        assert!(runner.is_empty());
        assert!(!runner.is_registered());
    }

    #[test]
    fn re_adding_a_pair_overwrites_in_place() {
        let mut runner = SimpleAnimation::new();
        runner.add(1_u32, X, AnimValue::Number(0.0), AnimValue::Number(10.0), linear(100.0));
        runner.add(2_u32, X, AnimValue::Number(0.0), AnimValue::Number(10.0), linear(100.0));
        runner.advance(50.0);
        runner.add(1_u32, X, AnimValue::Number(5.0), AnimValue::Number(40.0), linear(100.0));

        assert_eq!(runner.len(), 2);
        assert_eq!(runner.targets().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(runner.progress(1, X), Some(0.0));
        assert_eq!(runner.target_value(1, X), Some(AnimValue::Number(40.0)));
    }

    #[test]
    fn register_is_idempotent() {
        let mut runner = SimpleAnimation::<u32>::new();
        assert!(runner.register());
        assert!(!runner.register());
        assert!(runner.is_registered());
    }

    #[test]
    fn cancel_target_drops_all_of_its_tweens() {
        let mut runner = SimpleAnimation::new();
        runner.add(1_u32, X, AnimValue::Number(0.0), AnimValue::Number(1.0), linear(10.0));
        runner.add(1_u32, ALPHA, AnimValue::Number(0.0), AnimValue::Number(1.0), linear(10.0));
        runner.add(2_u32, X, AnimValue::Number(0.0), AnimValue::Number(1.0), linear(10.0));
        assert_eq!(runner.cancel_target(1), 2);
        assert!(runner.is_animating(2, X));
    }

    proptest! {
        #[test]
        fn tween_lands_exactly_on_target(
            from in -1_000.0_f32..1_000.0,
            to in -1_000.0_f32..1_000.0,
            duration in 0.0_f32..2_000.0,
            steps in proptest::collection::vec(1.0_f32..50.0, 1..200),
        ) {
            let mut runner = SimpleAnimation::new();
            let settings = AnimationSettings::new(duration).easing(TimeFunction::EaseInOut);
            runner.add(0_u8, X, AnimValue::Number(from), AnimValue::Number(to), settings);

            let mut last = None;
            let mut elapsed = 0.0;
            for dt in steps {
                elapsed += dt;
                for sample in runner.advance(dt) {
                    last = Some(sample);
                }
            }
            if elapsed >= duration {
                let last = last.expect("at least one sample");
                prop_assert!(last.finished);
                prop_assert_eq!(last.value, AnimValue::Number(to));
                prop_assert!(runner.is_empty());
            }
        }
    }
}
