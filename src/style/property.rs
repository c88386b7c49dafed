use bitflags::bitflags;
use smol_str::SmolStr;

use super::{
    AlignItems, Border, Color, Contain, Direction, Display, Edges, FlexBoundary, FlexDirection,
    FlexWrap, FontStyle, JustifyContent, LinearGradient, RadialGradient, Rounded, Shadow,
    TextAlign,
};
use crate::error::SceneError;
use crate::transition::{AnimationSettings, TransitionSpec};

/// Numeric properties stored on the renderer handle once a node is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumProp {
    X,
    Y,
    Width,
    Height,
    Alpha,
    Rotation,
    Scale,
    ScaleX,
    ScaleY,
    MountX,
    MountY,
    PivotX,
    PivotY,
    ZIndex,
    FontSize,
    LineHeight,
    LetterSpacing,
}

impl NumProp {
    pub const fn default_value(self) -> f32 {
        match self {
            Self::Alpha | Self::Scale | Self::ScaleX | Self::ScaleY => 1.0,
            Self::PivotX | Self::PivotY => 0.5,
            _ => 0.0,
        }
    }
}

/// Packed RGBA properties stored on the renderer handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorProp {
    Color,
    ColorTop,
    ColorBottom,
    ColorLeft,
    ColorRight,
    ColorTl,
    ColorTr,
    ColorBl,
    ColorBr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropKey {
    Num(NumProp),
    Color(ColorProp),

    Display,
    FlexDirection,
    FlexWrap,
    JustifyContent,
    AlignItems,
    AlignSelf,
    Gap,
    RowGap,
    ColumnGap,
    Padding,
    Margin,
    MarginTop,
    MarginRight,
    MarginBottom,
    MarginLeft,
    MinWidth,
    MinHeight,
    FlexGrow,
    FlexOrder,
    FlexItem,
    Direction,
    FlexBoundary,
    FlexCrossBoundary,

    Right,
    Bottom,
    Center,
    CenterX,
    CenterY,
    Mount,
    Pivot,

    Clipping,
    Src,

    Text,
    FontFamily,
    FontWeight,
    FontStyle,
    MaxLines,
    Contain,
    TextAlign,
    OverflowSuffix,
    MaxWidth,
    MaxHeight,

    Border,
    BorderTop,
    BorderRight,
    BorderBottom,
    BorderLeft,
    Shadow,
    Rounded,
    LinearGradient,
    RadialGradient,

    Transition,
    AnimationSettings,
    Autofocus,
    ForwardStates,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PropFlags: u8 {
        /// Lives on the renderer handle as a number or color.
        const RENDERER = 1 << 0;
        /// Writes may be redirected to an animation.
        const ANIMATABLE = 1 << 1;
        /// A change moves or resizes the node inside its parent's flex pass.
        const PARENT_LAYOUT = 1 << 2;
        /// A change alters how the node lays out its own children.
        const SELF_LAYOUT = 1 << 3;
        /// A change alters the rendered text and its measured size.
        const TEXT = 1 << 4;
        /// Merged into the node's shader props.
        const EFFECT = 1 << 5;
    }
}

impl From<NumProp> for PropKey {
    fn from(value: NumProp) -> Self {
        Self::Num(value)
    }
}

impl From<ColorProp> for PropKey {
    fn from(value: ColorProp) -> Self {
        Self::Color(value)
    }
}

impl PropKey {
    pub const X: Self = Self::Num(NumProp::X);
    pub const Y: Self = Self::Num(NumProp::Y);
    pub const WIDTH: Self = Self::Num(NumProp::Width);
    pub const HEIGHT: Self = Self::Num(NumProp::Height);
    pub const ALPHA: Self = Self::Num(NumProp::Alpha);
    pub const COLOR: Self = Self::Color(ColorProp::Color);

    pub const fn flags(self) -> PropFlags {
        let animated = PropFlags::RENDERER.union(PropFlags::ANIMATABLE);
        match self {
            Self::Num(NumProp::Width | NumProp::Height) => animated
                .union(PropFlags::PARENT_LAYOUT)
                .union(PropFlags::SELF_LAYOUT),
            Self::Num(NumProp::ZIndex) => PropFlags::RENDERER,
            Self::Num(NumProp::FontSize | NumProp::LineHeight | NumProp::LetterSpacing) => {
                PropFlags::RENDERER.union(PropFlags::TEXT)
            }
            Self::Num(_) | Self::Color(_) => animated,
            Self::Display
            | Self::FlexDirection
            | Self::FlexWrap
            | Self::JustifyContent
            | Self::AlignItems
            | Self::Gap
            | Self::RowGap
            | Self::ColumnGap
            | Self::Padding
            | Self::Direction
            | Self::FlexBoundary
            | Self::FlexCrossBoundary => PropFlags::SELF_LAYOUT,
            Self::AlignSelf
            | Self::Margin
            | Self::MarginTop
            | Self::MarginRight
            | Self::MarginBottom
            | Self::MarginLeft
            | Self::FlexGrow
            | Self::FlexOrder
            | Self::FlexItem => PropFlags::PARENT_LAYOUT,
            Self::MinWidth | Self::MinHeight => {
                PropFlags::PARENT_LAYOUT.union(PropFlags::SELF_LAYOUT)
            }
            Self::Text
            | Self::FontFamily
            | Self::FontWeight
            | Self::FontStyle
            | Self::MaxLines
            | Self::Contain
            | Self::TextAlign
            | Self::OverflowSuffix
            | Self::MaxWidth
            | Self::MaxHeight => PropFlags::TEXT,
            Self::Border
            | Self::BorderTop
            | Self::BorderRight
            | Self::BorderBottom
            | Self::BorderLeft
            | Self::Shadow
            | Self::Rounded
            | Self::LinearGradient
            | Self::RadialGradient => PropFlags::EFFECT,
            _ => PropFlags::empty(),
        }
    }

    pub const fn is_animatable(self) -> bool {
        self.flags().contains(PropFlags::ANIMATABLE)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Number(f32),
    Int(i32),
    Bool(bool),
    Color(Color),
    Str(SmolStr),
    Display(Display),
    FlexDirection(FlexDirection),
    FlexWrap(FlexWrap),
    Justify(JustifyContent),
    Align(AlignItems),
    Direction(Direction),
    Boundary(FlexBoundary),
    Edges(Edges),
    Contain(Contain),
    TextAlign(TextAlign),
    FontStyle(FontStyle),
    Border(Border),
    Shadow(Shadow),
    Rounded(Rounded),
    LinearGradient(LinearGradient),
    RadialGradient(RadialGradient),
    Transition(TransitionSpec),
    AnimationSettings(AnimationSettings),
}

fn mismatch(key: PropKey, expected: &'static str) -> SceneError {
    SceneError::PropType { key, expected }
}

impl PropValue {
    pub fn number(&self, key: PropKey) -> Result<f32, SceneError> {
        match self {
            Self::Number(v) => Ok(*v),
            Self::Int(v) => Ok(*v as f32),
            _ => Err(mismatch(key, "a number")),
        }
    }

    pub fn int(&self, key: PropKey) -> Result<i32, SceneError> {
        match self {
            Self::Int(v) => Ok(*v),
            Self::Number(v) if v.fract() == 0.0 => Ok(*v as i32),
            _ => Err(mismatch(key, "an integer")),
        }
    }

    pub fn boolean(&self, key: PropKey) -> Result<bool, SceneError> {
        match self {
            Self::Bool(v) => Ok(*v),
            _ => Err(mismatch(key, "a bool")),
        }
    }

    pub fn color(&self, key: PropKey) -> Result<Color, SceneError> {
        match self {
            Self::Color(v) => Ok(*v),
            Self::Int(v) => Ok(Color::from_u32(*v as u32)),
            _ => Err(mismatch(key, "a color")),
        }
    }

    pub fn string(&self, key: PropKey) -> Result<SmolStr, SceneError> {
        match self {
            Self::Str(v) => Ok(v.clone()),
            _ => Err(mismatch(key, "a string")),
        }
    }

    /// A single number applies to every side.
    pub fn edges(&self, key: PropKey) -> Result<Edges, SceneError> {
        match self {
            Self::Edges(v) => Ok(*v),
            Self::Number(v) => Ok(Edges::uniform(*v)),
            Self::Int(v) => Ok(Edges::uniform(*v as f32)),
            _ => Err(mismatch(key, "a number or four edges")),
        }
    }

    pub fn border(&self, key: PropKey) -> Result<Border, SceneError> {
        match self {
            Self::Border(v) => Ok(*v),
            _ => Err(mismatch(key, "a border")),
        }
    }

    pub fn rounded(&self, key: PropKey) -> Result<Rounded, SceneError> {
        match self {
            Self::Rounded(v) => Ok(*v),
            Self::Number(v) => Ok(Rounded::from(*v)),
            _ => Err(mismatch(key, "a radius")),
        }
    }
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for PropValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_value!(
    f32 => Number,
    i32 => Int,
    bool => Bool,
    Color => Color,
    SmolStr => Str,
    Display => Display,
    FlexDirection => FlexDirection,
    FlexWrap => FlexWrap,
    JustifyContent => Justify,
    AlignItems => Align,
    Direction => Direction,
    FlexBoundary => Boundary,
    Edges => Edges,
    Contain => Contain,
    TextAlign => TextAlign,
    FontStyle => FontStyle,
    Border => Border,
    Shadow => Shadow,
    Rounded => Rounded,
    LinearGradient => LinearGradient,
    RadialGradient => RadialGradient,
    TransitionSpec => Transition,
    AnimationSettings => AnimationSettings,
);

/// Lets bare float literals be passed wherever a value is expected.
impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Number(value as f32)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Str(SmolStr::new(value))
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Str(SmolStr::from(value))
    }
}

impl From<[f32; 4]> for PropValue {
    fn from(value: [f32; 4]) -> Self {
        Self::Edges(Edges::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_flags_cover_both_layout_directions() {
        let flags = PropKey::WIDTH.flags();
        assert!(flags.contains(PropFlags::ANIMATABLE | PropFlags::RENDERER));
        assert!(flags.contains(PropFlags::PARENT_LAYOUT | PropFlags::SELF_LAYOUT));
        assert!(!PropKey::X.flags().contains(PropFlags::PARENT_LAYOUT));
        assert!(!PropKey::Num(NumProp::ZIndex).is_animatable());
        assert!(PropKey::COLOR.is_animatable());
        assert_eq!(PropKey::JustifyContent.flags(), PropFlags::SELF_LAYOUT);
        assert_eq!(PropKey::FlexGrow.flags(), PropFlags::PARENT_LAYOUT);
    }

    #[test]
    fn scalar_padding_expands_to_all_sides() {
        let value = PropValue::from(6.0);
        assert_eq!(value.edges(PropKey::Padding), Ok(Edges::uniform(6.0)));

        let value = PropValue::from([1.0, 2.0, 3.0, 4.0]);
        let edges = value.edges(PropKey::Padding).expect("edges");
        assert_eq!((edges.top, edges.right, edges.bottom, edges.left), (1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn wrong_value_kind_reports_the_key() {
        let err = PropValue::Bool(true).number(PropKey::Gap).unwrap_err();
        assert_eq!(
            err,
            SceneError::PropType {
                key: PropKey::Gap,
                expected: "a number"
            }
        );
    }
}
