use std::any::Any;
use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use super::{
    HandleId, NodeEvent, NodeEventKind, NodeProps, Renderer, RendererEvent, RendererProp, ShaderId,
    TextProps, TextureId, TextureKind,
};
use crate::error::RenderError;
use crate::style::{Color, ColorProp, NumProp, ShaderKind, ShaderProps};
use crate::transition::{
    AnimKey, AnimTarget, AnimValue, AnimationCommand, AnimationEvent, AnimationId, AnimationSettings,
    AnimationState, normalized_timeline_progress,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadlessNode {
    pub parent: Option<HandleId>,
    pub is_text: bool,
    pub numbers: FxHashMap<NumProp, f32>,
    pub colors: FxHashMap<ColorProp, Color>,
    pub clipping: bool,
    pub texture: Option<TextureId>,
    pub shader: Option<ShaderId>,
    pub text: Option<TextProps>,
    pub subscriptions: Vec<NodeEventKind>,
}

#[derive(Debug, Clone)]
struct HeadlessAnimation {
    handle: HandleId,
    targets: Vec<AnimTarget>,
    from: Vec<AnimValue>,
    settings: AnimationSettings,
    elapsed_ms: f32,
    state: AnimationState,
}

/// In-memory renderer that records every handle and property.
///
/// Animations advance only through [`advance_animations`]; events are queued
/// with [`queue_event`] or produced by text measurement when enabled.
///
/// [`advance_animations`]: HeadlessRenderer::advance_animations
/// [`queue_event`]: HeadlessRenderer::queue_event
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    nodes: FxHashMap<HandleId, HeadlessNode>,
    animations: FxHashMap<AnimationId, HeadlessAnimation>,
    textures: Vec<(TextureKind, String)>,
    shaders: Vec<(ShaderKind, ShaderProps)>,
    events: VecDeque<RendererEvent>,
    next_handle: u64,
    next_animation: u64,
    destroyed: Vec<HandleId>,
    char_width: Option<f32>,
    reject_shaders: bool,
    failing_creations: usize,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports a `Loaded` size for every text node, `char_width` per char.
    pub fn with_text_measurement(mut self, char_width: f32) -> Self {
        self.char_width = Some(char_width);
        self
    }

    /// Makes every `create_shader` call fail.
    pub fn rejecting_shaders(mut self) -> Self {
        self.reject_shaders = true;
        self
    }

    /// Makes the next `count` node or text node creations fail.
    pub fn failing_creations(mut self, count: usize) -> Self {
        self.failing_creations = count;
        self
    }

    pub fn node(&self, handle: HandleId) -> Option<&HeadlessNode> {
        self.nodes.get(&handle)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn destroyed(&self) -> &[HandleId] {
        &self.destroyed
    }

    pub fn children_of(&self, parent: HandleId) -> Vec<HandleId> {
        let mut children: Vec<HandleId> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.parent == Some(parent))
            .map(|(handle, _)| *handle)
            .collect();
        children.sort();
        children
    }

    pub fn textures(&self) -> &[(TextureKind, String)] {
        &self.textures
    }

    pub fn shaders(&self) -> &[(ShaderKind, ShaderProps)] {
        &self.shaders
    }

    pub fn queue_event(&mut self, handle: HandleId, event: NodeEvent) {
        self.events.push_back(RendererEvent::Node { handle, event });
    }

    pub fn running_animations(&self) -> usize {
        self.animations
            .values()
            .filter(|animation| animation.state == AnimationState::Running)
            .count()
    }

    /// Steps running animations, writing interpolated values to their
    /// handles and queueing tick and stop events.
    pub fn advance_animations(&mut self, dt_ms: f32) {
        let mut ids: Vec<AnimationId> = self.animations.keys().copied().collect();
        ids.sort();
        for id in ids {
            let Some(animation) = self.animations.get_mut(&id) else {
                continue;
            };
            if animation.state != AnimationState::Running {
                continue;
            }
            animation.elapsed_ms += dt_ms;
            let Some(progress) = normalized_timeline_progress(
                animation.elapsed_ms,
                animation.settings.delay_ms,
                animation.settings.duration_ms,
            ) else {
                continue;
            };
            let finished = progress >= 1.0;
            let eased = animation.settings.easing.sample(progress);
            let writes: Vec<(AnimKey, AnimValue)> = animation
                .targets
                .iter()
                .zip(&animation.from)
                .map(|(target, from)| {
                    let value = if finished {
                        target.value
                    } else {
                        from.lerp(target.value, eased)
                    };
                    (target.key, value)
                })
                .collect();
            let handle = animation.handle;
            if finished {
                animation.state = AnimationState::Stopped;
            }
            if let Some(node) = self.nodes.get_mut(&handle) {
                for (key, value) in writes {
                    write_value(node, key, value);
                }
            }
            self.events.push_back(RendererEvent::Animation {
                id,
                event: AnimationEvent::Tick { progress },
            });
            if finished {
                self.events.push_back(RendererEvent::Animation {
                    id,
                    event: AnimationEvent::Stopped,
                });
            }
        }
    }

    fn next_handle(&mut self) -> HandleId {
        self.next_handle += 1;
        HandleId(self.next_handle)
    }

    fn insert_node(&mut self, props: &NodeProps, is_text: bool) -> Result<HandleId, RenderError> {
        if let Some(parent) = props.parent {
            self.node_ref(parent)?;
        }
        let handle = self.next_handle();
        let node = HeadlessNode {
            parent: props.parent,
            is_text,
            numbers: props.numbers.iter().copied().collect(),
            colors: props.colors.iter().copied().collect(),
            clipping: props.clipping,
            texture: props.texture,
            shader: props.shader,
            text: props.text.clone(),
            subscriptions: Vec::new(),
        };
        self.nodes.insert(handle, node);
        Ok(handle)
    }

    fn take_creation_failure(&mut self) -> Result<(), RenderError> {
        if self.failing_creations == 0 {
            return Ok(());
        }
        self.failing_creations -= 1;
        Err(RenderError::Backend("node creation failed".to_owned()))
    }

    fn node_ref(&self, handle: HandleId) -> Result<&HeadlessNode, RenderError> {
        self.nodes.get(&handle).ok_or(RenderError::UnknownHandle(handle))
    }

    fn node_mut(&mut self, handle: HandleId) -> Result<&mut HeadlessNode, RenderError> {
        self.nodes
            .get_mut(&handle)
            .ok_or(RenderError::UnknownHandle(handle))
    }
}

fn write_value(node: &mut HeadlessNode, key: AnimKey, value: AnimValue) {
    match (key, value) {
        (AnimKey::Num(prop), AnimValue::Number(v)) => {
            node.numbers.insert(prop, v);
        }
        (AnimKey::Color(prop), AnimValue::Color(c)) => {
            node.colors.insert(prop, c);
        }
        _ => {}
    }
}

fn read_value(node: &HeadlessNode, key: AnimKey) -> AnimValue {
    match key {
        AnimKey::Num(prop) => AnimValue::Number(
            node.numbers
                .get(&prop)
                .copied()
                .unwrap_or(prop.default_value()),
        ),
        AnimKey::Color(prop) => {
            AnimValue::Color(node.colors.get(&prop).copied().unwrap_or_default())
        }
    }
}

impl Renderer for HeadlessRenderer {
    fn create_root(&mut self, width: f32, height: f32) -> Result<HandleId, RenderError> {
        let props = NodeProps {
            numbers: vec![(NumProp::Width, width), (NumProp::Height, height)],
            ..NodeProps::default()
        };
        self.insert_node(&props, false)
    }

    fn create_node(&mut self, props: &NodeProps) -> Result<HandleId, RenderError> {
        self.take_creation_failure()?;
        self.insert_node(props, false)
    }

    fn create_text_node(&mut self, props: &NodeProps) -> Result<HandleId, RenderError> {
        self.take_creation_failure()?;
        let handle = self.insert_node(props, true)?;
        if let (Some(char_width), Some(text)) = (self.char_width, props.text.as_ref()) {
            let font_size = props.number(NumProp::FontSize).unwrap_or(16.0);
            let line_height = props.number(NumProp::LineHeight).unwrap_or(font_size * 1.2);
            let natural = text.text.chars().count() as f32 * char_width;
            let width = text.max_width.map_or(natural, |max| natural.min(max));
            self.queue_event(
                handle,
                NodeEvent::Loaded {
                    width,
                    height: line_height,
                },
            );
        }
        Ok(handle)
    }

    fn set_parent(&mut self, handle: HandleId, parent: Option<HandleId>) -> Result<(), RenderError> {
        if let Some(parent) = parent {
            self.node_ref(parent)?;
        }
        self.node_mut(handle)?.parent = parent;
        Ok(())
    }

    fn destroy(&mut self, handle: HandleId) -> Result<(), RenderError> {
        self.nodes
            .remove(&handle)
            .ok_or(RenderError::UnknownHandle(handle))?;
        self.animations.retain(|_, animation| animation.handle != handle);
        self.destroyed.push(handle);
        Ok(())
    }

    fn set_number(&mut self, handle: HandleId, prop: NumProp, value: f32) -> Result<(), RenderError> {
        self.node_mut(handle)?.numbers.insert(prop, value);
        Ok(())
    }

    fn number(&self, handle: HandleId, prop: NumProp) -> Option<f32> {
        self.nodes.get(&handle)?.numbers.get(&prop).copied()
    }

    fn set_color(&mut self, handle: HandleId, prop: ColorProp, value: Color) -> Result<(), RenderError> {
        self.node_mut(handle)?.colors.insert(prop, value);
        Ok(())
    }

    fn color(&self, handle: HandleId, prop: ColorProp) -> Option<Color> {
        self.nodes.get(&handle)?.colors.get(&prop).copied()
    }

    fn set_prop(&mut self, handle: HandleId, prop: &RendererProp) -> Result<(), RenderError> {
        let node = self.node_mut(handle)?;
        if let RendererProp::Clipping(on) = prop {
            node.clipping = *on;
            return Ok(());
        }
        if let RendererProp::Texture(texture) = prop {
            node.texture = *texture;
            return Ok(());
        }
        if let RendererProp::Shader(shader) = prop {
            node.shader = *shader;
            return Ok(());
        }
        let text = node.text.get_or_insert_with(TextProps::default);
        match prop {
            RendererProp::Text(value) => text.text = value.clone(),
            RendererProp::FontFamily(value) => text.font_family = value.clone(),
            RendererProp::FontWeight(value) => text.font_weight = *value,
            RendererProp::FontStyle(value) => text.font_style = *value,
            RendererProp::MaxLines(value) => text.max_lines = *value,
            RendererProp::Contain(value) => text.contain = *value,
            RendererProp::TextAlign(value) => text.text_align = *value,
            RendererProp::OverflowSuffix(value) => text.overflow_suffix = value.clone(),
            RendererProp::MaxWidth(value) => text.max_width = *value,
            RendererProp::MaxHeight(value) => text.max_height = *value,
            RendererProp::Clipping(_) | RendererProp::Texture(_) | RendererProp::Shader(_) => {}
        }
        Ok(())
    }

    fn animate(
        &mut self,
        handle: HandleId,
        targets: &[AnimTarget],
        settings: &AnimationSettings,
    ) -> Result<AnimationId, RenderError> {
        self.node_ref(handle)?;
        self.next_animation += 1;
        let id = AnimationId(self.next_animation);
        self.animations.insert(
            id,
            HeadlessAnimation {
                handle,
                targets: targets.to_vec(),
                from: Vec::new(),
                settings: *settings,
                elapsed_ms: 0.0,
                state: AnimationState::Scheduled,
            },
        );
        Ok(id)
    }

    fn control_animation(&mut self, id: AnimationId, command: AnimationCommand) -> Result<(), RenderError> {
        let animation = self
            .animations
            .get_mut(&id)
            .ok_or_else(|| RenderError::Backend(format!("unknown animation {}", id.0)))?;
        match command {
            AnimationCommand::Start => {
                if animation.state == AnimationState::Scheduled {
                    let node = self
                        .nodes
                        .get(&animation.handle)
                        .ok_or(RenderError::UnknownHandle(animation.handle))?;
                    animation.from = animation
                        .targets
                        .iter()
                        .map(|target| read_value(node, target.key))
                        .collect();
                }
                if matches!(animation.state, AnimationState::Scheduled | AnimationState::Paused) {
                    animation.state = AnimationState::Running;
                    self.events.push_back(RendererEvent::Animation {
                        id,
                        event: AnimationEvent::Animating,
                    });
                }
            }
            AnimationCommand::Pause => {
                if animation.state == AnimationState::Running {
                    animation.state = AnimationState::Paused;
                }
            }
            AnimationCommand::Stop => {
                if animation.state != AnimationState::Stopped {
                    animation.state = AnimationState::Stopped;
                    self.events.push_back(RendererEvent::Animation {
                        id,
                        event: AnimationEvent::Stopped,
                    });
                }
            }
        }
        Ok(())
    }

    fn animation_state(&self, id: AnimationId) -> AnimationState {
        self.animations
            .get(&id)
            .map_or(AnimationState::Idle, |animation| animation.state)
    }

    fn create_texture(&mut self, kind: TextureKind, src: &str) -> Result<TextureId, RenderError> {
        if src.is_empty() {
            return Err(RenderError::TextureRejected("empty source".to_owned()));
        }
        self.textures.push((kind, src.to_owned()));
        Ok(TextureId(self.textures.len() as u64))
    }

    fn create_shader(&mut self, kind: ShaderKind, props: &ShaderProps) -> Result<ShaderId, RenderError> {
        if self.reject_shaders {
            return Err(RenderError::ShaderRejected(format!("{kind:?}")));
        }
        self.shaders.push((kind, props.clone()));
        Ok(ShaderId(self.shaders.len() as u64))
    }

    fn subscribe(&mut self, handle: HandleId, kind: NodeEventKind) -> Result<(), RenderError> {
        let node = self.node_mut(handle)?;
        if !node.subscriptions.contains(&kind) {
            node.subscriptions.push(kind);
        }
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<RendererEvent> {
        self.events.drain(..).collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transition::TimeFunction;

    #[test]
    fn nodes_record_parent_and_initial_props() {
        let mut renderer = HeadlessRenderer::new();
        let root = renderer.create_root(1920.0, 1080.0).expect("root");
        let node = renderer
            .create_node(&NodeProps {
                parent: Some(root),
                numbers: vec![(NumProp::X, 10.0)],
                ..NodeProps::default()
            })
            .expect("node");

        assert_eq!(renderer.number(node, NumProp::X), Some(10.0));
        assert_eq!(renderer.number(root, NumProp::Width), Some(1920.0));
        assert_eq!(renderer.children_of(root), vec![node]);
        assert!(matches!(
            renderer.set_number(HandleId(99), NumProp::X, 1.0),
            Err(RenderError::UnknownHandle(HandleId(99)))
        ));
    }

    #[test]
    fn animation_runs_only_after_start_and_lands_on_target() {
        let mut renderer = HeadlessRenderer::new();
        let root = renderer.create_root(100.0, 100.0).expect("root");
        let id = renderer
            .animate(
                root,
                &[AnimTarget {
                    key: AnimKey::Num(NumProp::Alpha),
                    value: AnimValue::Number(0.0),
                }],
                &AnimationSettings::new(100.0).easing(TimeFunction::Linear),
            )
            .expect("animation");
        renderer.advance_animations(50.0);
        assert_eq!(renderer.number(root, NumProp::Alpha), None);

        renderer.control_animation(id, AnimationCommand::Start).expect("start");
        renderer.advance_animations(50.0);
        assert_eq!(renderer.number(root, NumProp::Alpha), Some(0.5));
        renderer.advance_animations(60.0);
        assert_eq!(renderer.number(root, NumProp::Alpha), Some(0.0));
        assert_eq!(renderer.animation_state(id), AnimationState::Stopped);

        let events = renderer.poll_events();
        assert_eq!(
            events.last(),
            Some(&RendererEvent::Animation {
                id,
                event: AnimationEvent::Stopped
            })
        );
    }

    #[test]
    fn text_measurement_queues_loaded_event() {
        let mut renderer = HeadlessRenderer::new().with_text_measurement(8.0);
        let root = renderer.create_root(100.0, 100.0).expect("root");
        let text = renderer
            .create_text_node(&NodeProps {
                parent: Some(root),
                numbers: vec![(NumProp::FontSize, 20.0), (NumProp::LineHeight, 24.0)],
                text: Some(TextProps {
                    text: "hello".into(),
                    ..TextProps::default()
                }),
                ..NodeProps::default()
            })
            .expect("text");
        assert_eq!(
            renderer.poll_events(),
            vec![RendererEvent::Node {
                handle: text,
                event: NodeEvent::Loaded {
                    width: 40.0,
                    height: 24.0
                }
            }]
        );
    }
}
