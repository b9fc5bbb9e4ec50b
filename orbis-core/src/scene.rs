/// Hierarchical scene composition
///
/// A scene is an ordered list of named parts. Each part carries a list of
/// compose steps evaluated in its parent's frame, an optional geometry
/// handle and nested child parts. Traversal interprets this data against a
/// [`TransformStack`], so drawing never depends on bespoke per-part code.
use nalgebra::Matrix4;
use tracing::trace;

use crate::clock::AnimationClock;
use crate::error::{Error, Result};
use crate::stack::TransformStack;
use crate::transform::{Step, Transform};

/// Receives one draw call per part that has geometry.
///
/// `transform` is the fully composed transform on top of the stack when the
/// part is drawn.
pub trait Visitor<G> {
    fn draw(&mut self, part: &str, geometry: &G, transform: &Matrix4<f32>);
}

impl<G, F> Visitor<G> for F
where
    F: FnMut(&str, &G, &Matrix4<f32>),
{
    fn draw(&mut self, part: &str, geometry: &G, transform: &Matrix4<f32>) {
        self(part, geometry, transform)
    }
}

/// A rigid part of the scene
#[derive(Debug, Clone)]
pub struct ScenePart<G> {
    pub name: String,
    /// `None` for pure grouping frames
    pub geometry: Option<G>,
    pub steps: Vec<Step>,
    pub children: Vec<ScenePart<G>>,
}

impl<G> ScenePart<G> {
    pub fn new(name: impl Into<String>, geometry: G) -> Self {
        Self {
            name: name.into(),
            geometry: Some(geometry),
            steps: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            geometry: None,
            steps: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn with_steps(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.steps.extend(steps);
        self
    }

    pub fn with_child(mut self, child: ScenePart<G>) -> Self {
        self.children.push(child);
        self
    }

    /// Transform of this part relative to its parent at time `t`
    pub fn local_transform(&self, t: f64) -> Matrix4<f32> {
        Transform::compose(&self.steps, t)
    }

    fn visit<V>(&self, stack: &mut TransformStack, t: f64, visitor: &mut V) -> Result<()>
    where
        V: Visitor<G> + ?Sized,
    {
        stack.scoped(|stack| {
            for step in &self.steps {
                stack.compose(&step.matrix(t));
            }
            if let Some(geometry) = &self.geometry {
                visitor.draw(&self.name, geometry, stack.current());
            }
            for child in &self.children {
                child.visit(stack, t, visitor)?;
            }
            Ok(())
        })
    }
}

#[derive(Debug, Clone)]
pub struct SceneGraph<G> {
    parts: Vec<ScenePart<G>>,
}

impl<G> SceneGraph<G> {
    pub fn new() -> Self {
        Self { parts: Vec::new() }
    }

    pub fn with_part(mut self, part: ScenePart<G>) -> Self {
        self.parts.push(part);
        self
    }

    pub fn push(&mut self, part: ScenePart<G>) {
        self.parts.push(part);
    }

    pub fn parts(&self) -> &[ScenePart<G>] {
        &self.parts
    }

    /// Number of top-level parts
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// First part with the given name, in traversal order
    pub fn find(&self, name: &str) -> Option<&ScenePart<G>> {
        fn search<'a, G>(parts: &'a [ScenePart<G>], name: &str) -> Option<&'a ScenePart<G>> {
            parts.iter().find_map(|part| {
                if part.name == name {
                    Some(part)
                } else {
                    search(&part.children, name)
                }
            })
        }
        search(&self.parts, name)
    }

    /// Visit every part once, in declaration order.
    ///
    /// Each part is drawn inside its own pushed frame, so the stack is as
    /// deep afterwards as it was before the call.
    pub fn traverse<V>(
        &self,
        stack: &mut TransformStack,
        clock: &AnimationClock,
        visitor: &mut V,
    ) -> Result<()>
    where
        V: Visitor<G> + ?Sized,
    {
        let depth = stack.depth();
        let t = clock.value();
        trace!(parts = self.parts.len(), t, "traversing scene");

        for part in &self.parts {
            part.visit(stack, t, visitor)?;
        }

        if stack.depth() != depth {
            return Err(Error::Unbalanced {
                expected: depth,
                found: stack.depth(),
            });
        }
        Ok(())
    }

    /// Accumulated transform of a named part relative to the scene root
    pub fn world_transform(&self, name: &str, t: f64) -> Result<Matrix4<f32>> {
        fn locate<G>(
            parts: &[ScenePart<G>],
            name: &str,
            parent: &Matrix4<f32>,
            t: f64,
        ) -> Option<Matrix4<f32>> {
            parts.iter().find_map(|part| {
                let local = parent * part.local_transform(t);
                if part.name == name {
                    Some(local)
                } else {
                    locate(&part.children, name, &local, t)
                }
            })
        }

        locate(&self.parts, name, &Matrix4::identity(), t)
            .ok_or_else(|| Error::UnknownPart(name.to_string()))
    }
}

impl<G> Default for SceneGraph<G> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Angle;
    use nalgebra::{Point3, Vector3};

    type Drawn = Vec<(String, u32, Matrix4<f32>)>;

    fn record(scene: &SceneGraph<u32>, stack: &mut TransformStack, clock: &AnimationClock) -> Drawn {
        let mut drawn = Vec::new();
        scene
            .traverse(stack, clock, &mut |name: &str, id: &u32, m: &Matrix4<f32>| {
                drawn.push((name.to_string(), *id, *m))
            })
            .unwrap();
        drawn
    }

    fn origin_of(m: &Matrix4<f32>) -> Point3<f32> {
        m.transform_point(&Point3::origin())
    }

    fn arm() -> SceneGraph<u32> {
        let tip = ScenePart::new("tip", 3).with_step(Step::translate(0.0, 0.0, 3.0));
        let joint = ScenePart::new("joint", 2)
            .with_step(Step::translate(0.0, 2.0, 0.0))
            .with_child(tip);
        let base = ScenePart::new("base", 1)
            .with_step(Step::translate(1.0, 0.0, 0.0))
            .with_child(joint);

        SceneGraph::new()
            .with_part(base)
            .with_part(ScenePart::new("sibling", 4).with_step(Step::uniform_scale(5.0)))
    }

    #[test]
    fn test_draw_order_and_transforms() {
        let mut stack = TransformStack::new();
        let drawn = record(&arm(), &mut stack, &AnimationClock::default());

        let order: Vec<_> = drawn.iter().map(|(name, id, _)| (name.as_str(), *id)).collect();
        assert_eq!(order, [("base", 1), ("joint", 2), ("tip", 3), ("sibling", 4)]);
        assert!((origin_of(&drawn[2].2) - Point3::new(1.0, 2.0, 3.0)).norm() < 1e-6);
        // Siblings don't inherit transforms from earlier parts
        assert!(origin_of(&drawn[3].2).coords.norm() < 1e-6);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_empty_scene_is_balanced() {
        let scene = SceneGraph::new();
        let mut stack = TransformStack::new();
        stack.push();
        let drawn = record(&scene, &mut stack, &AnimationClock::default());
        assert!(drawn.is_empty());
        assert!(scene.is_empty());
        assert_eq!(stack.depth(), 2);
    }

    #[test]
    fn test_deep_nesting_is_balanced() {
        let mut part = ScenePart::new("leaf", 0).with_step(Step::translate(0.0, 0.0, 1.0));
        for level in 0..64 {
            part = ScenePart::group(format!("level{level}"))
                .with_step(Step::translate(0.0, 0.0, 1.0))
                .with_child(part);
        }
        let scene = SceneGraph::new().with_part(part);

        let mut stack = TransformStack::new();
        let drawn = record(&scene, &mut stack, &AnimationClock::default());

        assert_eq!(stack.depth(), 1);
        assert_eq!(drawn.len(), 1);
        assert!((origin_of(&drawn[0].2).z - 65.0).abs() < 1e-4);
    }

    #[test]
    fn test_groups_are_not_drawn() {
        let scene =
            SceneGraph::new().with_part(ScenePart::group("ship").with_child(ScenePart::new("hull", 7)));
        let drawn = record(&scene, &mut TransformStack::new(), &AnimationClock::default());
        assert_eq!(drawn.len(), 1);
        assert_eq!(drawn[0].0, "hull");
    }

    #[test]
    fn test_animated_steps_read_clock() {
        let spin = Step::rotate_animated(Angle::animated(0.0, 90.0), 0.0, 1.0, 0.0).unwrap();
        let scene = SceneGraph::new().with_part(
            ScenePart::new("spinner", 0)
                .with_step(spin)
                .with_step(Step::translate(1.0, 0.0, 0.0)),
        );
        let mut clock = AnimationClock::new(0.0, 1.0);
        clock.advance();

        let drawn = record(&scene, &mut TransformStack::new(), &clock);
        assert!((origin_of(&drawn[0].2) - Point3::new(0.0, 0.0, -1.0)).norm() < 1e-5);
    }

    #[test]
    fn test_world_transform_matches_traversal() {
        let scene = arm();
        let world = scene.world_transform("tip", 0.0).unwrap();
        assert!((origin_of(&world) - Point3::new(1.0, 2.0, 3.0)).norm() < 1e-6);

        let base = Matrix4::new_translation(&Vector3::new(0.0, 0.0, -10.0));
        let drawn = record(&scene, &mut TransformStack::with_base(base), &AnimationClock::default());
        let tip = drawn.iter().find(|(name, _, _)| name == "tip").unwrap();
        assert!((tip.2 - base * world).norm() < 1e-6);
    }

    #[test]
    fn test_unknown_part() {
        let scene = arm();
        assert_eq!(
            scene.world_transform("turret", 0.0),
            Err(Error::UnknownPart("turret".into()))
        );
        assert!(scene.find("joint").is_some());
        assert!(scene.find("turret").is_none());
        assert_eq!(scene.len(), 2);
    }
}
