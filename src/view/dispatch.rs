//! Uniform property writes.
//!
//! Every write funnels through [`Scene::write_prop`], which normalizes the
//! value for its key, decides between animating and writing straight to the
//! handle, and enqueues whatever layout the key affects.

use super::{NodeId, NodeKind, Scene};
use crate::error::{SceneError, SceneResult};
use crate::renderer::RendererProp;
use crate::style::{Color, ColorProp, Display, NumProp, PropFlags, PropKey, PropValue};
use crate::transition::{AnimKey, AnimValue, AnimationSettings, TransitionSpec};

/// Who is writing a property.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Origin {
    User,
    Style,
    State,
    Layout,
    /// Tween frames; bypass transitions and layout scheduling.
    Animation,
}

impl Scene {
    /// Writes a property, logging and ignoring values of the wrong kind.
    pub fn set(&mut self, node: NodeId, key: impl Into<PropKey>, value: impl Into<PropValue>) {
        let key = key.into();
        if let Err(err) = self.try_set(node, key, value) {
            tracing::warn!("ignoring {:?} on {:?}: {}", key, node, err);
        }
    }

    pub fn try_set(
        &mut self,
        node: NodeId,
        key: impl Into<PropKey>,
        value: impl Into<PropValue>,
    ) -> SceneResult<()> {
        self.write_prop(node, key.into(), value.into(), Origin::User)
    }

    /// Clears an explicitly set property back to its default.
    pub fn unset(&mut self, node: NodeId, key: impl Into<PropKey>) -> SceneResult<()> {
        let key = key.into();
        self.get_node_mut(node)?.explicit.remove(&key);
        self.restore_prop(node, key, None, Origin::User)
    }

    pub fn get(&self, node: NodeId, key: impl Into<PropKey>) -> Option<PropValue> {
        match key.into() {
            PropKey::Num(prop) => self.contains(node).then(|| PropValue::Number(self.number(node, prop))),
            PropKey::Color(prop) => self.contains(node).then(|| PropValue::Color(self.color(node, prop))),
            key => self.prop(node, key).cloned(),
        }
    }

    /// Current value, read back from the handle once rendered.
    pub fn number(&self, node: NodeId, prop: NumProp) -> f32 {
        let Some(el) = self.nodes.get(node) else {
            return prop.default_value();
        };
        let value = match el.handle {
            Some(handle) => self.renderer.number(handle, prop),
            None => el
                .props
                .get(&PropKey::Num(prop))
                .and_then(|value| value.number(PropKey::Num(prop)).ok()),
        };
        value.unwrap_or(prop.default_value())
    }

    pub fn color(&self, node: NodeId, prop: ColorProp) -> Color {
        let Some(el) = self.nodes.get(node) else {
            return Color::TRANSPARENT;
        };
        let value = match el.handle {
            Some(handle) => self.renderer.color(handle, prop),
            None => el
                .props
                .get(&PropKey::Color(prop))
                .and_then(|value| value.color(PropKey::Color(prop)).ok()),
        };
        value.unwrap_or(Color::TRANSPARENT)
    }

    pub fn x(&self, node: NodeId) -> f32 {
        self.number(node, NumProp::X)
    }

    pub fn y(&self, node: NodeId) -> f32 {
        self.number(node, NumProp::Y)
    }

    pub fn width(&self, node: NodeId) -> f32 {
        self.number(node, NumProp::Width)
    }

    pub fn height(&self, node: NodeId) -> f32 {
        self.number(node, NumProp::Height)
    }

    /// Like [`number`](Self::number) but reports where a running animation
    /// is heading instead of its current frame.
    pub fn layout_number(&self, node: NodeId, prop: NumProp) -> f32 {
        match self.pending_target(node, AnimKey::Num(prop)) {
            Some(AnimValue::Number(value)) => value,
            _ => self.number(node, prop),
        }
    }

    pub(crate) fn pending_target(&self, node: NodeId, key: AnimKey) -> Option<AnimValue> {
        if let Some(value) = self.tweens.target_value(node, key) {
            return Some(value);
        }
        self.nodes
            .get(node)?
            .native_targets
            .get(&key)
            .map(|(_, value)| *value)
    }

    /// The value a property settles on, ignoring in-flight animation frames.
    pub(crate) fn settled_value(&self, node: NodeId, key: PropKey) -> Option<PropValue> {
        match key {
            PropKey::Num(prop) => Some(PropValue::Number(self.layout_number(node, prop))),
            PropKey::Color(prop) => match self.pending_target(node, AnimKey::Color(prop)) {
                Some(AnimValue::Color(color)) => Some(PropValue::Color(color)),
                _ => Some(PropValue::Color(self.color(node, prop))),
            },
            _ => self.prop(node, key).cloned(),
        }
    }

    pub(crate) fn prop(&self, node: NodeId, key: PropKey) -> Option<&PropValue> {
        self.nodes.get(node)?.props.get(&key)
    }

    pub(crate) fn prop_number(&self, node: NodeId, key: PropKey) -> Option<f32> {
        self.prop(node, key)?.number(key).ok()
    }

    pub(crate) fn prop_bool(&self, node: NodeId, key: PropKey) -> Option<bool> {
        self.prop(node, key)?.boolean(key).ok()
    }

    pub fn is_flex(&self, node: NodeId) -> bool {
        matches!(self.prop(node, PropKey::Display), Some(PropValue::Display(Display::Flex)))
    }

    pub(crate) fn write_prop(
        &mut self,
        node: NodeId,
        key: PropKey,
        value: PropValue,
        origin: Origin,
    ) -> SceneResult<()> {
        let value = normalize(key, value)?;
        let el = self.get_node_mut(node)?;
        if origin == Origin::User {
            el.explicit.insert(key);
            match key {
                PropKey::Num(NumProp::Width) => {
                    el.calc_width = false;
                    el.pre_flex_width = None;
                }
                PropKey::Num(NumProp::Height) => {
                    el.calc_height = false;
                    el.pre_flex_height = None;
                }
                _ => {}
            }
        }

        match key {
            PropKey::Mount | PropKey::Pivot => {
                let (x, y) = if key == PropKey::Mount {
                    (NumProp::MountX, NumProp::MountY)
                } else {
                    (NumProp::PivotX, NumProp::PivotY)
                };
                let v = value.number(key)?;
                self.write_prop(node, PropKey::Num(x), PropValue::Number(v), origin)?;
                self.write_prop(node, PropKey::Num(y), PropValue::Number(v), origin)?;
                self.get_node_mut(node)?.props.insert(key, value);
                return Ok(());
            }
            PropKey::Num(prop) => {
                let v = value.number(key)?;
                self.write_animatable(node, AnimKey::Num(prop), AnimValue::Number(v), origin)?;
            }
            PropKey::Color(prop) => {
                let c = value.color(key)?;
                self.write_animatable(node, AnimKey::Color(prop), AnimValue::Color(c), origin)?;
            }
            _ => {
                self.get_node_mut(node)?.props.insert(key, value);
                self.after_store(node, key)?;
            }
        }

        if !matches!(origin, Origin::Layout | Origin::Animation) {
            self.apply_layout_impact(node, key);
        }
        Ok(())
    }

    /// Writes `prev`, or resets the property when there was no prior value.
    pub(crate) fn restore_prop(
        &mut self,
        node: NodeId,
        key: PropKey,
        prev: Option<PropValue>,
        origin: Origin,
    ) -> SceneResult<()> {
        if let Some(value) = prev {
            return self.write_prop(node, key, value, origin);
        }
        match key {
            PropKey::Num(prop) => {
                self.write_prop(node, key, PropValue::Number(prop.default_value()), origin)
            }
            PropKey::Color(_) => self.write_prop(node, key, PropValue::Color(Color::TRANSPARENT), origin),
            PropKey::Mount => self.write_prop(node, key, PropValue::Number(0.0), origin),
            PropKey::Pivot => self.write_prop(node, key, PropValue::Number(0.5), origin),
            _ => {
                self.get_node_mut(node)?.props.remove(&key);
                self.after_store(node, key)?;
                if origin != Origin::Layout {
                    self.apply_layout_impact(node, key);
                }
                Ok(())
            }
        }
    }

    fn write_animatable(
        &mut self,
        node: NodeId,
        key: AnimKey,
        value: AnimValue,
        origin: Origin,
    ) -> SceneResult<()> {
        if origin != Origin::Animation {
            if let Some(settings) = self.transition_settings(node, key.prop()) {
                return self.animate_to(node, key, value, settings);
            }
            self.tweens.cancel(node, key);
        }
        self.write_now(node, key, value)
    }

    /// Writes to the handle, or buffers until the node renders.
    pub(crate) fn write_now(&mut self, node: NodeId, key: AnimKey, value: AnimValue) -> SceneResult<()> {
        let el = self.get_node_mut(node)?;
        let Some(handle) = el.handle else {
            let value = match value {
                AnimValue::Number(v) => PropValue::Number(v),
                AnimValue::Color(c) => PropValue::Color(c),
            };
            el.props.insert(key.prop(), value);
            return Ok(());
        };
        match (key, value) {
            (AnimKey::Num(prop), AnimValue::Number(v)) => self.renderer.set_number(handle, prop, v)?,
            (AnimKey::Color(prop), AnimValue::Color(c)) => self.renderer.set_color(handle, prop, c)?,
            _ => {}
        }
        Ok(())
    }

    fn transition_settings(&self, node: NodeId, key: PropKey) -> Option<AnimationSettings> {
        if !self.config.animations_enabled {
            return None;
        }
        let el = self.nodes.get(node)?;
        el.handle?;
        let Some(PropValue::Transition(transition)) = el.props.get(&PropKey::Transition) else {
            return None;
        };
        transition.resolve(key, self.node_animation_settings(node))
    }

    pub(crate) fn node_animation_settings(&self, node: NodeId) -> AnimationSettings {
        match self.prop(node, PropKey::AnimationSettings) {
            Some(PropValue::AnimationSettings(settings)) => *settings,
            _ => self.config.animation_settings,
        }
    }

    /// Pushes a stored non-numeric property to wherever it takes effect.
    fn after_store(&mut self, node: NodeId, key: PropKey) -> SceneResult<()> {
        let flags = key.flags();
        if flags.contains(PropFlags::EFFECT) {
            return self.refresh_shader(node);
        }
        if flags.contains(PropFlags::TEXT) {
            return self.push_text_prop(node, key);
        }
        match key {
            PropKey::Src => self.apply_src(node),
            PropKey::Clipping => {
                let on = self.prop_bool(node, key).unwrap_or(false);
                if let Some(handle) = self.get_node(node)?.handle {
                    self.renderer.set_prop(handle, &RendererProp::Clipping(on))?;
                }
                Ok(())
            }
            PropKey::Autofocus => {
                if self.prop_bool(node, key) == Some(true) && self.is_rendered(node) {
                    self.set_active_element(Some(node));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn apply_layout_impact(&mut self, node: NodeId, key: PropKey) {
        let flags = key.flags();
        let Some(el) = self.nodes.get(node) else {
            return;
        };
        if !el.is_rendered() || el.kind == NodeKind::TextLeaf {
            return;
        }
        let parent = el.parent;
        let self_affected = flags.contains(PropFlags::SELF_LAYOUT)
            && !el.children.is_empty()
            && (el.has_layout_hook() || key == PropKey::Display || self.is_flex(node));
        if self_affected {
            self.enqueue_layout(node);
        }
        if flags.contains(PropFlags::PARENT_LAYOUT) {
            if let Some(parent) = parent.filter(|parent| self.is_flex(*parent)) {
                self.enqueue_layout(parent);
            }
        }
    }
}

fn normalize(key: PropKey, value: PropValue) -> SceneResult<PropValue> {
    use PropKey as K;
    let (ok, expected) = match key {
        K::Num(_)
        | K::Gap
        | K::RowGap
        | K::ColumnGap
        | K::MarginTop
        | K::MarginRight
        | K::MarginBottom
        | K::MarginLeft
        | K::MinWidth
        | K::MinHeight
        | K::FlexGrow
        | K::Right
        | K::Bottom
        | K::MaxWidth
        | K::MaxHeight
        | K::Mount
        | K::Pivot => return Ok(PropValue::Number(value.number(key)?)),
        K::Color(_) => return Ok(PropValue::Color(value.color(key)?)),
        K::Padding | K::Margin => return Ok(PropValue::Edges(value.edges(key)?)),
        K::FlexOrder | K::FontWeight | K::MaxLines => return Ok(PropValue::Int(value.int(key)?)),
        K::FlexItem
        | K::Clipping
        | K::Center
        | K::CenterX
        | K::CenterY
        | K::Autofocus
        | K::ForwardStates => return Ok(PropValue::Bool(value.boolean(key)?)),
        K::Text | K::FontFamily | K::Src | K::OverflowSuffix => {
            return Ok(PropValue::Str(value.string(key)?));
        }
        K::Border | K::BorderTop | K::BorderRight | K::BorderBottom | K::BorderLeft => {
            return Ok(PropValue::Border(value.border(key)?));
        }
        K::Rounded => return Ok(PropValue::Rounded(value.rounded(key)?)),
        K::Transition => match value {
            PropValue::Bool(true) => return Ok(PropValue::Transition(TransitionSpec::all())),
            PropValue::Bool(false) => return Ok(PropValue::Transition(TransitionSpec::Off)),
            ref value => (matches!(value, PropValue::Transition(_)), "a transition"),
        },
        K::Display => (matches!(value, PropValue::Display(_)), "a display mode"),
        K::FlexDirection => (matches!(value, PropValue::FlexDirection(_)), "a flex direction"),
        K::FlexWrap => (matches!(value, PropValue::FlexWrap(_)), "a wrap mode"),
        K::JustifyContent => (matches!(value, PropValue::Justify(_)), "a justify mode"),
        K::AlignItems | K::AlignSelf => (matches!(value, PropValue::Align(_)), "an alignment"),
        K::Direction => (matches!(value, PropValue::Direction(_)), "a direction"),
        K::FlexBoundary | K::FlexCrossBoundary => {
            (matches!(value, PropValue::Boundary(_)), "a flex boundary")
        }
        K::FontStyle => (matches!(value, PropValue::FontStyle(_)), "a font style"),
        K::Contain => (matches!(value, PropValue::Contain(_)), "a contain mode"),
        K::TextAlign => (matches!(value, PropValue::TextAlign(_)), "a text alignment"),
        K::Shadow => (matches!(value, PropValue::Shadow(_)), "a shadow"),
        K::LinearGradient => (matches!(value, PropValue::LinearGradient(_)), "a linear gradient"),
        K::RadialGradient => (matches!(value, PropValue::RadialGradient(_)), "a radial gradient"),
        K::AnimationSettings => (
            matches!(value, PropValue::AnimationSettings(_)),
            "animation settings",
        ),
    };
    if ok {
        Ok(value)
    } else {
        Err(SceneError::PropType { key, expected })
    }
}
