use std::rc::Rc;

use super::{NodeId, Scene};
use crate::error::{SceneError, SceneResult};
use crate::style::{Color, ColorProp, NumProp};
use crate::transition::{
    AnimKey, AnimTarget, AnimValue, AnimationCommand, AnimationId, AnimationSettings,
    AnimationState, TweenSample,
};

/// Handle to a renderer-native animation of one node.
///
/// Controllers are plain ids; every call goes through the owning [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationController {
    id: AnimationId,
    node: NodeId,
}

impl AnimationController {
    pub fn id(&self) -> AnimationId {
        self.id
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn start(&self, scene: &mut Scene) -> SceneResult<()> {
        scene
            .renderer
            .control_animation(self.id, AnimationCommand::Start)?;
        Ok(())
    }

    pub fn stop(&self, scene: &mut Scene) -> SceneResult<()> {
        scene
            .renderer
            .control_animation(self.id, AnimationCommand::Stop)?;
        Ok(())
    }

    pub fn pause(&self, scene: &mut Scene) -> SceneResult<()> {
        scene
            .renderer
            .control_animation(self.id, AnimationCommand::Pause)?;
        Ok(())
    }

    pub fn state(&self, scene: &Scene) -> AnimationState {
        scene.renderer.animation_state(self.id)
    }

    /// Runs `callback` once the animation reports `Stopped`, or right away if
    /// it already has.
    pub fn on_stopped<F>(&self, scene: &mut Scene, callback: F)
    where
        F: Fn(&mut Scene, NodeId) + 'static,
    {
        let settled = self.state(scene) == AnimationState::Stopped
            || !scene.animations.contains_key(&self.id);
        if settled {
            callback(scene, self.node);
            return;
        }
        scene
            .stop_callbacks
            .entry(self.id)
            .or_default()
            .push(Rc::new(callback));
    }
}

impl Scene {
    /// Prepares a native animation of `node` towards `targets`. The returned
    /// controller has not been started.
    ///
    /// The node must be rendered; with `Config::strict` this is asserted in
    /// debug builds.
    pub fn animate(
        &mut self,
        node: NodeId,
        targets: &[AnimTarget],
        settings: Option<AnimationSettings>,
    ) -> SceneResult<AnimationController> {
        let Some(handle) = self.get_node(node)?.handle else {
            debug_assert!(!self.config.strict, "animate called on unrendered node {node:?}");
            return Err(SceneError::NotRendered(node));
        };
        let settings = settings.unwrap_or_else(|| self.node_animation_settings(node));
        let id = self.renderer.animate(handle, targets, &settings)?;
        self.animations.insert(id, node);

        let mut superseded = Vec::new();
        let el = self.get_node_mut(node)?;
        for target in targets {
            if let Some((previous, _)) = el.native_targets.insert(target.key, (id, target.value)) {
                if previous != id && !superseded.contains(&previous) {
                    superseded.push(previous);
                }
            }
        }
        for previous in superseded {
            let still_owns_keys = self
                .nodes
                .get(node)
                .is_some_and(|el| el.native_targets.values().any(|(owner, _)| *owner == previous));
            if !still_owns_keys {
                self.renderer
                    .control_animation(previous, AnimationCommand::Stop)?;
            }
        }
        Ok(AnimationController { id, node })
    }

    /// Redirects a property write into whichever animation engine is active.
    pub(crate) fn animate_to(
        &mut self,
        node: NodeId,
        key: AnimKey,
        to: AnimValue,
        settings: AnimationSettings,
    ) -> SceneResult<()> {
        if self.config.simple_animations {
            let from = self.current_anim_value(node, key);
            self.tweens.add(node, key, from, to, settings);
            if self.tweens.register() {
                tracing::trace!("tween runner registered");
            }
            return Ok(());
        }
        let controller = self.animate(node, &[AnimTarget { key, value: to }], Some(settings))?;
        controller.start(self)
    }

    fn current_anim_value(&self, node: NodeId, key: AnimKey) -> AnimValue {
        match key {
            AnimKey::Num(prop) => AnimValue::Number(self.number(node, prop)),
            AnimKey::Color(prop) => AnimValue::Color(self.color(node, prop)),
        }
    }

    pub(crate) fn apply_tween_sample(&mut self, sample: TweenSample<NodeId>) {
        if !self.contains(sample.target) {
            return;
        }
        if let Err(err) = self.write_now(sample.target, sample.key, sample.value) {
            tracing::warn!("tween write on {:?} failed: {}", sample.target, err);
        }
    }
}

/// Convenience for building numeric animation targets.
pub fn number_target(prop: NumProp, value: f32) -> AnimTarget {
    AnimTarget {
        key: AnimKey::Num(prop),
        value: AnimValue::Number(value),
    }
}

pub fn color_target(prop: ColorProp, value: Color) -> AnimTarget {
    AnimTarget {
        key: AnimKey::Color(prop),
        value: AnimValue::Color(value),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::config::Config;
    use crate::renderer::HeadlessRenderer;
    use crate::style::PropKey;
    use crate::transition::{AnimationEvent, TimeFunction, TransitionSpec};

    fn rendered(config: Config) -> (Scene, NodeId) {
        let mut scene = Scene::new(HeadlessRenderer::new(), config, 1920.0, 1080.0).expect("scene");
        let node = scene.create_element();
        let root = scene.root();
        scene.insert_child(root, node, None).expect("insert");
        scene.render(node).expect("render");
        (scene, node)
    }

    fn linear(duration_ms: f32) -> AnimationSettings {
        AnimationSettings::new(duration_ms).easing(TimeFunction::Linear)
    }

    #[test]
    fn animating_an_unrendered_node_fails_outside_strict_mode() {
        let mut scene =
            Scene::new(HeadlessRenderer::new(), Config::default().with_strict(false), 100.0, 100.0)
                .expect("scene");
        let node = scene.create_element();
        let result = scene.animate(node, &[number_target(NumProp::X, 10.0)], None);
        assert_eq!(result, Err(SceneError::NotRendered(node)));
    }

    #[test]
    fn transition_writes_run_through_the_tween_runner() {
        let (mut scene, node) = rendered(Config::default().with_simple_animations(true));
        scene.set(node, PropKey::Transition, TransitionSpec::All(Some(linear(100.0))));
        scene.set(node, PropKey::X, 100.0);

        assert!(scene.wants_frame());
        assert_eq!(scene.x(node), 0.0);
        assert_eq!(scene.layout_number(node, NumProp::X), 100.0);

        scene.frame(50.0);
        assert!((scene.x(node) - 50.0).abs() < 1e-4);
        scene.frame(60.0);
        assert_eq!(scene.x(node), 100.0);
        assert!(!scene.wants_frame());
        assert!(!scene.is_animating(node));
    }

    #[test]
    fn color_tweens_land_on_the_exact_target() {
        let (mut scene, node) = rendered(Config::default().with_simple_animations(true));
        scene.set(node, PropKey::COLOR, Color::BLACK);
        scene.set(node, PropKey::Transition, TransitionSpec::per([PropKey::COLOR]));
        let target = Color::rgba(10, 20, 30, 40);
        scene.set(node, PropKey::COLOR, target);
        for _ in 0..10 {
            scene.frame(33.3);
        }
        assert_eq!(scene.color(node, ColorProp::Color), target);
    }

    #[test]
    fn disabled_animations_snap() {
        let (mut scene, node) = rendered(
            Config::default()
                .with_simple_animations(true)
                .with_animations(false),
        );
        scene.set(node, PropKey::Transition, true);
        scene.set(node, PropKey::ALPHA, 0.5);
        assert_eq!(scene.number(node, NumProp::Alpha), 0.5);
        assert!(!scene.wants_frame());
    }

    #[test]
    fn native_transition_reports_events_and_settles() {
        let (mut scene, node) = rendered(Config::default());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        scene
            .node_mut(node)
            .expect("node")
            .on_animation(move |_, _, event| log.borrow_mut().push(event));

        scene.set(node, PropKey::Transition, TransitionSpec::All(Some(linear(100.0))));
        scene.set(node, PropKey::Y, 40.0);
        assert!(scene.is_animating(node));
        assert_eq!(scene.layout_number(node, NumProp::Y), 40.0);

        scene
            .renderer_as_mut::<HeadlessRenderer>()
            .expect("headless")
            .advance_animations(100.0);
        scene.pump_events();

        assert_eq!(scene.y(node), 40.0);
        assert!(!scene.is_animating(node));
        let events = seen.borrow();
        assert_eq!(events.first(), Some(&AnimationEvent::Animating));
        assert_eq!(events.last(), Some(&AnimationEvent::Stopped));
    }

    #[test]
    fn on_stopped_runs_after_stop_or_immediately_when_settled() {
        let (mut scene, node) = rendered(Config::default());
        let controller = scene
            .animate(node, &[number_target(NumProp::X, 10.0)], Some(linear(200.0)))
            .expect("animate");
        controller.start(&mut scene).expect("start");

        let fired = Rc::new(RefCell::new(0));
        let counter = fired.clone();
        controller.on_stopped(&mut scene, move |_, _| *counter.borrow_mut() += 1);
        assert_eq!(*fired.borrow(), 0);

        controller.stop(&mut scene).expect("stop");
        scene.pump_events();
        assert_eq!(*fired.borrow(), 1);

        let counter = fired.clone();
        controller.on_stopped(&mut scene, move |_, _| *counter.borrow_mut() += 1);
        assert_eq!(*fired.borrow(), 2);
    }

    #[test]
    fn destroying_the_node_releases_stop_waiters() {
        let (mut scene, node) = rendered(Config::default());
        let controller = scene
            .animate(node, &[number_target(NumProp::X, 10.0)], Some(linear(200.0)))
            .expect("animate");
        controller.start(&mut scene).expect("start");

        let fired = Rc::new(RefCell::new(Vec::new()));
        let log = fired.clone();
        controller.on_stopped(&mut scene, move |scene, owner| {
            log.borrow_mut().push((owner, scene.contains(owner)));
        });

        scene.finalize_destroy(node).expect("destroy");
        assert_eq!(*fired.borrow(), vec![(node, false)]);
        assert!(scene.stop_callbacks.is_empty());

        for _ in 0..5 {
            scene.frame(100.0);
        }
        assert_eq!(fired.borrow().len(), 1);
    }

    #[test]
    fn a_new_animation_on_the_same_key_stops_the_previous_one() {
        let (mut scene, node) = rendered(Config::default());
        let first = scene
            .animate(node, &[number_target(NumProp::X, 10.0)], Some(linear(200.0)))
            .expect("first");
        first.start(&mut scene).expect("start");
        let second = scene
            .animate(node, &[number_target(NumProp::X, 20.0)], Some(linear(200.0)))
            .expect("second");
        assert_eq!(first.state(&scene), AnimationState::Stopped);
        assert_ne!(second.state(&scene), AnimationState::Stopped);
        assert_eq!(scene.layout_number(node, NumProp::X), 20.0);
    }
}
