mod simple_animation;
mod time_function;
pub use simple_animation::*;
pub use time_function::*;

use crate::style::{Color, ColorProp, NumProp, PropKey};

/// Identifier of a renderer-native animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct AnimationId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationSettings {
    pub duration_ms: f32,
    pub delay_ms: f32,
    pub easing: TimeFunction,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self::new(250.0)
    }
}

impl AnimationSettings {
    pub const fn new(duration_ms: f32) -> Self {
        Self {
            duration_ms,
            delay_ms: 0.0,
            easing: TimeFunction::EaseInOut,
        }
    }

    pub const fn delay(mut self, delay_ms: f32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub const fn easing(mut self, easing: TimeFunction) -> Self {
        self.easing = easing;
        self
    }

    /// Like [`easing`](Self::easing) but takes a CSS-style timing name.
    pub fn easing_name(self, name: &str) -> Self {
        self.easing(TimeFunction::from_name_or_linear(name))
    }
}

/// Declares which property writes animate instead of snapping.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum TransitionSpec {
    #[default]
    Off,
    /// Every animatable property, optionally with its own settings.
    All(Option<AnimationSettings>),
    Per(Vec<(PropKey, Option<AnimationSettings>)>),
}

impl TransitionSpec {
    pub fn all() -> Self {
        Self::All(None)
    }

    pub fn per(keys: impl IntoIterator<Item = PropKey>) -> Self {
        Self::Per(keys.into_iter().map(|key| (key, None)).collect())
    }

    pub fn with(self, key: PropKey, settings: AnimationSettings) -> Self {
        let mut entries = match self {
            Self::Per(entries) => entries,
            _ => Vec::new(),
        };
        entries.retain(|(existing, _)| *existing != key);
        entries.push((key, Some(settings)));
        Self::Per(entries)
    }

    pub fn is_off(&self) -> bool {
        match self {
            Self::Off => true,
            Self::All(_) => false,
            Self::Per(entries) => entries.is_empty(),
        }
    }

    /// Settings a write to `key` animates with, or `None` when it snaps.
    pub fn resolve(&self, key: PropKey, fallback: AnimationSettings) -> Option<AnimationSettings> {
        if !key.is_animatable() {
            return None;
        }
        match self {
            Self::Off => None,
            Self::All(settings) => Some(settings.unwrap_or(fallback)),
            Self::Per(entries) => entries
                .iter()
                .find(|(declared, _)| declared_covers(*declared, key))
                .map(|(_, settings)| settings.unwrap_or(fallback)),
        }
    }
}

/// Mount and pivot declarations cover both of their axis properties.
fn declared_covers(declared: PropKey, key: PropKey) -> bool {
    match declared {
        PropKey::Mount => matches!(key, PropKey::Num(NumProp::MountX | NumProp::MountY)),
        PropKey::Pivot => matches!(key, PropKey::Num(NumProp::PivotX | NumProp::PivotY)),
        PropKey::Num(NumProp::Scale) => matches!(
            key,
            PropKey::Num(NumProp::Scale | NumProp::ScaleX | NumProp::ScaleY)
        ),
        _ => declared == key,
    }
}

/// An animatable value on a renderer handle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnimValue {
    Number(f32),
    Color(Color),
}

impl AnimValue {
    /// Numbers interpolate linearly, colors per channel.
    pub fn lerp(self, to: Self, t: f32) -> Self {
        match (self, to) {
            (Self::Number(a), Self::Number(b)) => Self::Number(a + (b - a) * t),
            (Self::Color(a), Self::Color(b)) => Self::Color(a.lerp(b, t)),
            (_, to) => {
                if t >= 1.0 {
                    to
                } else {
                    self
                }
            }
        }
    }

    pub fn as_number(self) -> Option<f32> {
        match self {
            Self::Number(v) => Some(v),
            Self::Color(_) => None,
        }
    }
}

/// One property an animation drives to `value`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimTarget {
    pub key: AnimKey,
    pub value: AnimValue,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimKey {
    Num(NumProp),
    Color(ColorProp),
}

impl AnimKey {
    pub fn from_prop(key: PropKey) -> Option<Self> {
        match key {
            PropKey::Num(prop) => Some(Self::Num(prop)),
            PropKey::Color(prop) => Some(Self::Color(prop)),
            _ => None,
        }
    }

    pub const fn prop(self) -> PropKey {
        match self {
            Self::Num(prop) => PropKey::Num(prop),
            Self::Color(prop) => PropKey::Color(prop),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AnimationState {
    #[default]
    Idle,
    Scheduled,
    Running,
    Paused,
    Stopped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationCommand {
    Start,
    Stop,
    Pause,
}

/// Progress notifications a renderer reports for a native animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnimationEvent {
    Animating,
    Tick { progress: f32 },
    Stopped,
}
