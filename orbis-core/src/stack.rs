/// Nested coordinate frames for hierarchical drawing
use nalgebra::Matrix4;

use crate::error::{Error, Result};

/// LIFO of accumulated transforms.
///
/// The stack is never empty: the bottom entry is the base frame (identity or
/// a caller-supplied matrix such as the view transform) and cannot be popped.
#[derive(Debug, Clone)]
pub struct TransformStack {
    frames: Vec<Matrix4<f32>>,
}

impl TransformStack {
    pub fn new() -> Self {
        Self::with_base(Matrix4::identity())
    }

    pub fn with_base(base: Matrix4<f32>) -> Self {
        Self { frames: vec![base] }
    }

    /// Drop every pushed frame and start over from `base`
    pub fn reset(&mut self, base: Matrix4<f32>) {
        self.frames.clear();
        self.frames.push(base);
    }

    /// Duplicate the top so nested composes don't leak into the parent frame
    pub fn push(&mut self) {
        let top = *self.current();
        self.frames.push(top);
    }

    pub fn pop(&mut self) -> Result<Matrix4<f32>> {
        if self.frames.len() <= 1 {
            return Err(Error::StackUnderflow);
        }
        self.frames.pop().ok_or(Error::StackUnderflow)
    }

    /// Right-multiply the top, applying `m` in the current local frame
    pub fn compose(&mut self, m: &Matrix4<f32>) {
        let last = self.frames.len() - 1;
        self.frames[last] = self.frames[last] * m;
    }

    pub fn current(&self) -> &Matrix4<f32> {
        &self.frames[self.frames.len() - 1]
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Run `f` inside a pushed frame, popping afterwards even if `f` fails
    pub fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let depth = self.depth();
        self.push();
        let result = f(self);
        if self.depth() != depth + 1 {
            return Err(Error::Unbalanced {
                expected: depth + 1,
                found: self.depth(),
            });
        }
        self.pop()?;
        result
    }
}

impl Default for TransformStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn translation(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    #[test]
    fn test_nested_translations() {
        let mut stack = TransformStack::new();
        let base = *stack.current();

        stack.push();
        stack.compose(&translation(1.0, 0.0, 0.0));
        stack.push();
        stack.compose(&translation(0.0, 1.0, 0.0));

        let inner = *stack.current();
        let expected = translation(1.0, 0.0, 0.0) * translation(0.0, 1.0, 0.0);
        assert!((inner - expected).norm() < 1e-6);

        stack.pop().unwrap();
        assert!((stack.current() - translation(1.0, 0.0, 0.0)).norm() < 1e-6);
        stack.pop().unwrap();
        assert_eq!(*stack.current(), base);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_pop_base_underflows() {
        let mut stack = TransformStack::new();
        assert_eq!(stack.pop(), Err(Error::StackUnderflow));
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_compose_is_local() {
        let mut stack = TransformStack::with_base(Matrix4::new_scaling(2.0));
        stack.compose(&translation(1.0, 0.0, 0.0));
        let p = stack.current().transform_point(&nalgebra::Point3::origin());
        assert!((p.x - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_balanced_sequences_restore_depth() {
        // Each sequence is well formed: '(' push, 'c' compose, ')' pop
        let sequences = ["", "()", "(c)", "((c)(c))c", "(((((c)))))", "c(c(c)c)(c)"];

        for sequence in sequences {
            let mut stack = TransformStack::new();
            stack.push();
            let before = stack.depth();
            for op in sequence.chars() {
                match op {
                    '(' => stack.push(),
                    ')' => {
                        stack.pop().unwrap();
                    }
                    _ => stack.compose(&translation(0.5, -1.0, 2.0)),
                }
            }
            assert_eq!(stack.depth(), before, "sequence {sequence:?}");
        }
    }

    #[test]
    fn test_scoped_restores_parent() {
        let mut stack = TransformStack::new();
        let depth = stack.scoped(|s| {
            s.compose(&translation(3.0, 0.0, 0.0));
            Ok(s.depth())
        });
        assert_eq!(depth, Ok(2));
        assert_eq!(stack.depth(), 1);
        assert_eq!(*stack.current(), Matrix4::identity());
    }

    #[test]
    fn test_scoped_detects_leaked_push() {
        let mut stack = TransformStack::new();
        let result = stack.scoped(|s| {
            s.push();
            Ok(())
        });
        assert_eq!(
            result,
            Err(Error::Unbalanced {
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn test_reset() {
        let mut stack = TransformStack::new();
        stack.push();
        stack.push();
        stack.reset(translation(0.0, 0.0, -5.0));
        assert_eq!(stack.depth(), 1);
        assert_eq!(*stack.current(), translation(0.0, 0.0, -5.0));
    }
}
