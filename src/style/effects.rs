use super::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Border {
    pub width: f32,
    pub color: Color,
}

impl Border {
    pub const fn new(width: f32, color: Color) -> Self {
        Self { width, color }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub color: Color,
    pub x: f32,
    pub y: f32,
    pub blur: f32,
    pub spread: f32,
}

impl Shadow {
    pub const fn new(color: Color) -> Self {
        Self {
            color,
            x: 0.0,
            y: 0.0,
            blur: 0.0,
            spread: 0.0,
        }
    }

    pub const fn offset(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub const fn blur(mut self, blur: f32) -> Self {
        self.blur = blur;
        self
    }

    pub const fn spread(mut self, spread: f32) -> Self {
        self.spread = spread;
        self
    }
}

/// Corner radii in top-left/top-right/bottom-right/bottom-left order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rounded(pub [f32; 4]);

impl From<f32> for Rounded {
    fn from(value: f32) -> Self {
        Self([value; 4])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub angle: f32,
    pub colors: Vec<Color>,
    pub stops: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub colors: Vec<Color>,
    pub stops: Vec<f32>,
    pub width: f32,
    pub height: f32,
}

/// Which renderer shader program a node's effects need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    Rounded,
    RoundedWithBorder,
    RoundedWithShadow,
    RoundedWithBorderAndShadow,
}

/// Merged effect declarations of one node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShaderProps {
    pub radius: Option<Rounded>,
    pub border: Option<Border>,
    pub border_top: Option<Border>,
    pub border_right: Option<Border>,
    pub border_bottom: Option<Border>,
    pub border_left: Option<Border>,
    pub shadow: Option<Shadow>,
    pub linear_gradient: Option<LinearGradient>,
    pub radial_gradient: Option<RadialGradient>,
}

impl ShaderProps {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn has_border(&self) -> bool {
        self.border.is_some()
            || self.border_top.is_some()
            || self.border_right.is_some()
            || self.border_bottom.is_some()
            || self.border_left.is_some()
    }

    pub fn kind(&self) -> ShaderKind {
        match (self.has_border(), self.shadow.is_some()) {
            (false, false) => ShaderKind::Rounded,
            (true, false) => ShaderKind::RoundedWithBorder,
            (false, true) => ShaderKind::RoundedWithShadow,
            (true, true) => ShaderKind::RoundedWithBorderAndShadow,
        }
    }
}
