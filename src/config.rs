use smol_str::SmolStr;

use crate::transition::AnimationSettings;

/// Defaults merged into text nodes at render time.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSettings {
    pub family: SmolStr,
    pub size: f32,
    pub line_height: Option<f32>,
    pub weight: i32,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            family: SmolStr::new_static("Ubuntu"),
            size: 16.0,
            line_height: None,
            weight: 400,
        }
    }
}

impl FontSettings {
    /// Line height used for contain-mode line clamping.
    pub fn resolved_line_height(&self) -> f32 {
        self.line_height.unwrap_or(self.size * 1.2)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub animations_enabled: bool,
    /// Route transitions to the frame-stepped tween runner instead of the
    /// renderer's own animations.
    pub simple_animations: bool,
    pub animation_settings: AnimationSettings,
    pub font_settings: FontSettings,
    /// Ignore `style` re-assignment once a node has rendered.
    pub lock_styles: bool,
    pub strict: bool,
    pub max_microtask_rounds: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            animations_enabled: true,
            simple_animations: false,
            animation_settings: AnimationSettings::default(),
            font_settings: FontSettings::default(),
            lock_styles: true,
            strict: cfg!(debug_assertions),
            max_microtask_rounds: 64,
        }
    }
}

impl Config {
    pub fn with_animations(mut self, enabled: bool) -> Self {
        self.animations_enabled = enabled;
        self
    }

    pub fn with_simple_animations(mut self, enabled: bool) -> Self {
        self.simple_animations = enabled;
        self
    }

    pub fn with_animation_settings(mut self, settings: AnimationSettings) -> Self {
        self.animation_settings = settings;
        self
    }

    pub fn with_font_settings(mut self, settings: FontSettings) -> Self {
        self.font_settings = settings;
        self
    }

    pub fn with_lock_styles(mut self, lock: bool) -> Self {
        self.lock_styles = lock;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_max_microtask_rounds(mut self, rounds: usize) -> Self {
        self.max_microtask_rounds = rounds.max(1);
        self
    }
}
