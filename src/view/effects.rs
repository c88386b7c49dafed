use super::dispatch::Origin;
use super::{NodeId, Scene};
use crate::error::SceneResult;
use crate::renderer::{RendererProp, ShaderId, TextureId, TextureKind};
use crate::style::{PropKey, PropValue, ShaderProps};

impl Scene {
    /// Sets every effect present in `effects`, leaving the others as they are.
    pub fn set_effects(&mut self, node: NodeId, effects: ShaderProps) -> SceneResult<()> {
        let ShaderProps {
            radius,
            border,
            border_top,
            border_right,
            border_bottom,
            border_left,
            shadow,
            linear_gradient,
            radial_gradient,
        } = effects;
        let mut writes: Vec<(PropKey, PropValue)> = Vec::new();
        writes.extend(radius.map(|v| (PropKey::Rounded, v.into())));
        writes.extend(border.map(|v| (PropKey::Border, v.into())));
        writes.extend(border_top.map(|v| (PropKey::BorderTop, v.into())));
        writes.extend(border_right.map(|v| (PropKey::BorderRight, v.into())));
        writes.extend(border_bottom.map(|v| (PropKey::BorderBottom, v.into())));
        writes.extend(border_left.map(|v| (PropKey::BorderLeft, v.into())));
        writes.extend(shadow.map(|v| (PropKey::Shadow, v.into())));
        writes.extend(linear_gradient.map(|v| (PropKey::LinearGradient, v.into())));
        writes.extend(radial_gradient.map(|v| (PropKey::RadialGradient, v.into())));
        let mut first_err = None;
        for (key, value) in writes {
            if let Err(err) = self.write_prop(node, key, value, Origin::User) {
                tracing::warn!("effect {:?} on {:?} ignored: {}", key, node, err);
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn collect_shader_props(&self, node: NodeId) -> ShaderProps {
        let border = |key| match self.prop(node, key) {
            Some(PropValue::Border(border)) => Some(*border),
            _ => None,
        };
        ShaderProps {
            radius: match self.prop(node, PropKey::Rounded) {
                Some(PropValue::Rounded(radius)) => Some(*radius),
                _ => None,
            },
            border: border(PropKey::Border),
            border_top: border(PropKey::BorderTop),
            border_right: border(PropKey::BorderRight),
            border_bottom: border(PropKey::BorderBottom),
            border_left: border(PropKey::BorderLeft),
            shadow: match self.prop(node, PropKey::Shadow) {
                Some(PropValue::Shadow(shadow)) => Some(*shadow),
                _ => None,
            },
            linear_gradient: match self.prop(node, PropKey::LinearGradient) {
                Some(PropValue::LinearGradient(gradient)) => Some(gradient.clone()),
                _ => None,
            },
            radial_gradient: match self.prop(node, PropKey::RadialGradient) {
                Some(PropValue::RadialGradient(gradient)) => Some(gradient.clone()),
                _ => None,
            },
        }
    }

    /// Re-merges effect properties; a rendered node whose merged props
    /// changed gets the matching shader.
    pub(crate) fn refresh_shader(&mut self, node: NodeId) -> SceneResult<()> {
        let merged = self.collect_shader_props(node);
        let el = self.get_node_mut(node)?;
        let unchanged = el.shader_props == merged;
        el.shader_props = merged;
        let Some(handle) = el.handle else {
            return Ok(());
        };
        if unchanged {
            return Ok(());
        }
        let shader = self.resolve_shader(node)?;
        self.renderer.set_prop(handle, &RendererProp::Shader(shader))?;
        Ok(())
    }

    pub(crate) fn resolve_shader(&mut self, node: NodeId) -> SceneResult<Option<ShaderId>> {
        let props = &self.get_node(node)?.shader_props;
        if props.is_empty() {
            return Ok(None);
        }
        if let Some((_, shader)) = self.shader_cache.iter().find(|(cached, _)| cached == props) {
            return Ok(Some(*shader));
        }
        let props = props.clone();
        let shader = self.renderer.create_shader(props.kind(), &props)?;
        self.shader_cache.push((props, shader));
        Ok(Some(shader))
    }

    pub(crate) fn resolve_texture(&mut self, node: NodeId) -> SceneResult<Option<TextureId>> {
        let Some(PropValue::Str(src)) = self.prop(node, PropKey::Src).cloned() else {
            return Ok(None);
        };
        let texture = self
            .renderer
            .create_texture(TextureKind::for_src(&src), &src)?;
        Ok(Some(texture))
    }

    pub(crate) fn apply_src(&mut self, node: NodeId) -> SceneResult<()> {
        let Some(handle) = self.get_node(node)?.handle else {
            return Ok(());
        };
        let texture = self.resolve_texture(node)?;
        self.renderer.set_prop(handle, &RendererProp::Texture(texture))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::{RenderError, SceneError};
    use crate::renderer::HeadlessRenderer;
    use crate::style::{Border, Color, Rounded, Shadow, ShaderKind};

    fn rendered(renderer: HeadlessRenderer) -> (Scene, NodeId) {
        let mut scene = Scene::new(renderer, Config::default(), 400.0, 400.0).expect("scene");
        let node = scene.create_element();
        let root = scene.root();
        scene.insert_child(root, node, None).expect("insert");
        scene.render(node).expect("render");
        (scene, node)
    }

    fn current_shader(scene: &Scene, node: NodeId) -> Option<(ShaderKind, ShaderProps)> {
        let handle = scene.node(node)?.handle()?;
        let headless = scene.renderer_as::<HeadlessRenderer>()?;
        let ShaderId(id) = headless.node(handle)?.shader?;
        headless.shaders().get(id as usize - 1).cloned()
    }

    fn shader_count(scene: &Scene) -> usize {
        scene
            .renderer_as::<HeadlessRenderer>()
            .map_or(0, |r| r.shaders().len())
    }

    #[test]
    fn effects_merge_and_pick_the_matching_shader_variant() {
        let (mut scene, node) = rendered(HeadlessRenderer::new());
        scene.set(node, PropKey::Rounded, 6.0);
        assert_eq!(current_shader(&scene, node).map(|(kind, _)| kind), Some(ShaderKind::Rounded));

        scene
            .set_effects(
                node,
                ShaderProps {
                    border: Some(Border::new(2.0, Color::WHITE)),
                    shadow: Some(Shadow::new(Color::BLACK).blur(8.0)),
                    ..ShaderProps::default()
                },
            )
            .expect("effects");
        let (kind, props) = current_shader(&scene, node).expect("shader");
        assert_eq!(kind, ShaderKind::RoundedWithBorderAndShadow);
        assert_eq!(props.radius, Some(Rounded([6.0; 4])));

        scene.unset(node, PropKey::Shadow).expect("unset");
        assert_eq!(
            current_shader(&scene, node).map(|(kind, _)| kind),
            Some(ShaderKind::RoundedWithBorder)
        );
    }

    #[test]
    fn toggling_an_effect_reuses_existing_shaders() {
        let (mut scene, node) = rendered(HeadlessRenderer::new());
        scene.set(node, PropKey::Rounded, 4.0);
        let border = Border::new(1.0, Color::WHITE);
        scene.set(node, PropKey::Border, border);
        assert_eq!(shader_count(&scene), 2);

        for _ in 0..3 {
            scene.unset(node, PropKey::Border).expect("unset");
            scene.set(node, PropKey::Border, border);
        }
        assert_eq!(shader_count(&scene), 2);
        assert_eq!(
            current_shader(&scene, node).map(|(kind, _)| kind),
            Some(ShaderKind::RoundedWithBorder)
        );

        scene.set(node, PropKey::Rounded, 4.0);
        assert_eq!(shader_count(&scene), 2);

        let other = scene.create_element();
        let root = scene.root();
        scene.insert_child(root, other, None).expect("insert");
        scene.set(other, PropKey::Rounded, 4.0);
        scene.render(other).expect("render");
        assert_eq!(shader_count(&scene), 2);
    }

    #[test]
    fn set_effects_applies_the_valid_entries_when_one_fails() {
        let (mut scene, node) = rendered(HeadlessRenderer::new().rejecting_shaders());
        let result = scene.set_effects(
            node,
            ShaderProps {
                radius: Some(Rounded([3.0; 4])),
                border: Some(Border::new(2.0, Color::WHITE)),
                ..ShaderProps::default()
            },
        );
        assert!(matches!(
            result,
            Err(SceneError::Renderer(RenderError::ShaderRejected(_)))
        ));
        let props = scene.node(node).map(|el| el.shader_props().clone()).expect("node");
        assert_eq!(props.radius, Some(Rounded([3.0; 4])));
        assert_eq!(props.border, Some(Border::new(2.0, Color::WHITE)));
    }

    #[test]
    fn rejected_shader_on_a_rendered_node_propagates_from_try_set() {
        let (mut scene, node) = rendered(HeadlessRenderer::new().rejecting_shaders());
        assert!(matches!(
            scene.try_set(node, PropKey::Rounded, 3.0),
            Err(SceneError::Renderer(RenderError::ShaderRejected(_)))
        ));
    }

    #[test]
    fn src_changes_swap_the_texture() {
        let (mut scene, node) = rendered(HeadlessRenderer::new());
        scene.set(node, PropKey::Src, "poster.png");
        scene.set(node, PropKey::Src, "icon.svg");
        let textures = scene
            .renderer_as::<HeadlessRenderer>()
            .map(|r| r.textures().to_vec())
            .unwrap_or_default();
        assert_eq!(
            textures,
            vec![
                (TextureKind::Image, "poster.png".to_owned()),
                (TextureKind::Svg, "icon.svg".to_owned()),
            ]
        );
        let handle = scene.node(node).and_then(|el| el.handle()).expect("handle");
        let texture = scene
            .renderer_as::<HeadlessRenderer>()
            .and_then(|r| r.node(handle))
            .and_then(|n| n.texture);
        assert_eq!(texture, Some(TextureId(2)));

        scene.unset(node, PropKey::Src).expect("unset");
        let texture = scene
            .renderer_as::<HeadlessRenderer>()
            .and_then(|r| r.node(handle))
            .and_then(|n| n.texture);
        assert_eq!(texture, None);
    }
}
