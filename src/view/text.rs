use smol_str::SmolStr;

use super::dispatch::Origin;
use super::{NodeId, NodeKind, Scene};
use crate::error::SceneResult;
use crate::renderer::{RendererProp, TextProps};
use crate::style::{Contain, NumProp, PropKey, PropValue};

impl Scene {
    /// Text of a container: its leaves joined in order, or its own `Text`
    /// property when it has no leaves.
    pub fn compose_text(&self, node: NodeId) -> SmolStr {
        let Some(el) = self.nodes.get(node) else {
            return SmolStr::default();
        };
        let mut leaves = el
            .children
            .iter()
            .filter_map(|child| self.nodes.get(*child))
            .filter(|child| child.kind == NodeKind::TextLeaf)
            .peekable();
        if leaves.peek().is_none() {
            return el.text().cloned().unwrap_or_default();
        }
        let mut text = String::new();
        for leaf in leaves {
            if let Some(part) = leaf.text() {
                text.push_str(part);
            }
        }
        SmolStr::from(text)
    }

    /// Replaces the text of a leaf and refreshes its container.
    pub fn set_text(&mut self, leaf: NodeId, text: impl Into<SmolStr>) -> SceneResult<()> {
        self.try_set(leaf, PropKey::Text, PropValue::Str(text.into()))
    }

    pub(crate) fn refresh_text(&mut self, container: NodeId) -> SceneResult<()> {
        let el = self.get_node(container)?;
        let Some(handle) = el.handle.filter(|_| el.kind == NodeKind::TextContainer) else {
            return Ok(());
        };
        let text = self.compose_text(container);
        self.renderer.set_prop(handle, &RendererProp::Text(text))?;
        Ok(())
    }

    pub(crate) fn text_contain(&self, node: NodeId) -> Contain {
        match self.prop(node, PropKey::Contain) {
            Some(PropValue::Contain(contain)) => *contain,
            _ => Contain::None,
        }
    }

    pub(crate) fn text_props(&self, node: NodeId) -> TextProps {
        let font = &self.config.font_settings;
        let string = |key| match self.prop(node, key) {
            Some(PropValue::Str(value)) => Some(value.clone()),
            _ => None,
        };
        TextProps {
            text: self.compose_text(node),
            font_family: string(PropKey::FontFamily).unwrap_or_else(|| font.family.clone()),
            font_weight: match self.prop(node, PropKey::FontWeight) {
                Some(PropValue::Int(weight)) => *weight,
                _ => font.weight,
            },
            font_style: match self.prop(node, PropKey::FontStyle) {
                Some(PropValue::FontStyle(style)) => *style,
                _ => Default::default(),
            },
            max_lines: match self.prop(node, PropKey::MaxLines) {
                Some(PropValue::Int(lines)) if *lines > 0 => Some(*lines as u32),
                _ => None,
            },
            contain: self.text_contain(node),
            text_align: match self.prop(node, PropKey::TextAlign) {
                Some(PropValue::TextAlign(align)) => *align,
                _ => Default::default(),
            },
            overflow_suffix: string(PropKey::OverflowSuffix),
            max_width: self.prop_number(node, PropKey::MaxWidth),
            max_height: self.prop_number(node, PropKey::MaxHeight),
        }
    }

    /// Merges font defaults and derives the size limits of the contain mode.
    pub(crate) fn prepare_text(&mut self, node: NodeId, parent: NodeId) -> SceneResult<TextProps> {
        let font = self.config.font_settings.clone();
        if self.prop(node, PropKey::Num(NumProp::FontSize)).is_none() {
            self.write_prop(node, NumProp::FontSize.into(), PropValue::Number(font.size), Origin::Style)?;
        }
        let font_size = self.number(node, NumProp::FontSize);
        if self.prop(node, PropKey::Num(NumProp::LineHeight)).is_none() {
            let line_height = font.line_height.unwrap_or(font_size * 1.2);
            self.write_prop(node, NumProp::LineHeight.into(), PropValue::Number(line_height), Origin::Style)?;
        }

        let mut props = self.text_props(node);
        let (parent_width, parent_height) = self.layout_size(parent);
        if matches!(props.contain, Contain::Width | Contain::Both) {
            let mut width = self.number(node, NumProp::Width);
            if width == 0.0 {
                width = (parent_width - self.number(node, NumProp::X)).max(0.0);
                self.write_prop(node, PropKey::WIDTH, PropValue::Number(width), Origin::Layout)?;
                self.get_node_mut(node)?.calc_width = true;
            }
            props.max_width.get_or_insert(width);
        }
        if props.contain == Contain::Both {
            let mut height = self.number(node, NumProp::Height);
            if height == 0.0 {
                height = (parent_height - self.number(node, NumProp::Y)).max(0.0);
                self.write_prop(node, PropKey::HEIGHT, PropValue::Number(height), Origin::Layout)?;
                self.get_node_mut(node)?.calc_height = true;
            }
            props.max_height.get_or_insert(height);
            let line_height = self.number(node, NumProp::LineHeight);
            if props.max_lines.is_none() && line_height > 0.0 {
                props.max_lines = Some((height / line_height).floor() as u32);
            }
        }
        Ok(props)
    }

    /// Sends one changed text property to a rendered container.
    pub(crate) fn push_text_prop(&mut self, node: NodeId, key: PropKey) -> SceneResult<()> {
        let el = self.get_node(node)?;
        if el.kind == NodeKind::TextLeaf {
            return match el.parent {
                Some(parent) if key == PropKey::Text => self.refresh_text(parent),
                _ => Ok(()),
            };
        }
        let Some(handle) = el.handle.filter(|_| el.kind == NodeKind::TextContainer) else {
            return Ok(());
        };
        let props = self.text_props(node);
        let prop = match key {
            PropKey::Text => RendererProp::Text(props.text),
            PropKey::FontFamily => RendererProp::FontFamily(props.font_family),
            PropKey::FontWeight => RendererProp::FontWeight(props.font_weight),
            PropKey::FontStyle => RendererProp::FontStyle(props.font_style),
            PropKey::MaxLines => RendererProp::MaxLines(props.max_lines),
            PropKey::Contain => RendererProp::Contain(props.contain),
            PropKey::TextAlign => RendererProp::TextAlign(props.text_align),
            PropKey::OverflowSuffix => RendererProp::OverflowSuffix(props.overflow_suffix),
            PropKey::MaxWidth => RendererProp::MaxWidth(props.max_width),
            PropKey::MaxHeight => RendererProp::MaxHeight(props.max_height),
            _ => return Ok(()),
        };
        self.renderer.set_prop(handle, &prop)?;
        Ok(())
    }

    /// Writes a measured text size back according to the contain mode and
    /// asks a flex parent to lay out again.
    pub(crate) fn apply_loaded_size(&mut self, node: NodeId, width: f32, height: f32) {
        let Some(el) = self.nodes.get(node) else {
            return;
        };
        if el.kind != NodeKind::TextContainer {
            return;
        }
        let parent = el.parent;
        let writes: &[(NumProp, f32)] = match self.text_contain(node) {
            Contain::None => &[(NumProp::Width, width), (NumProp::Height, height)],
            Contain::Width => &[(NumProp::Height, height)],
            Contain::Both => &[],
        };
        let mut changed = false;
        for &(prop, value) in writes {
            changed |= self.write_layout(node, prop, value);
        }
        if changed {
            if let Some(parent) = parent.filter(|parent| self.is_flex(*parent)) {
                self.enqueue_layout(parent);
            }
        }
    }
}
