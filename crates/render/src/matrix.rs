use glam::Mat4;

/// Deepest model matrix nesting a backend supports.
pub const MAX_MATRIX_DEPTH: usize = 8;

/// Fixed-capacity model matrix stack. Slot 0 always holds the identity.
#[derive(Debug, Clone)]
pub struct MatrixStack {
    stack: [Mat4; MAX_MATRIX_DEPTH + 1],
    depth: usize,
}

impl Default for MatrixStack {
    fn default() -> Self {
        Self {
            stack: [Mat4::IDENTITY; MAX_MATRIX_DEPTH + 1],
            depth: 0,
        }
    }
}

impl MatrixStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `top * matrix`. Returns `false` and leaves the stack unchanged when full.
    pub fn push(&mut self, matrix: &Mat4) -> bool {
        if self.depth == MAX_MATRIX_DEPTH {
            return false;
        }
        let next = self.stack[self.depth] * *matrix;
        self.depth += 1;
        self.stack[self.depth] = next;
        true
    }

    /// Pop `count` entries. Returns `false` and empties the stack on underflow.
    pub fn pop(&mut self, count: usize) -> bool {
        if count > self.depth {
            self.depth = 0;
            return false;
        }
        self.depth -= count;
        true
    }

    pub fn top(&self) -> Mat4 {
        self.stack[self.depth]
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn reset(&mut self) {
        self.depth = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn push_composes_with_parent() {
        let mut s = MatrixStack::new();
        assert!(s.push(&Mat4::from_translation(Vec3::X)));
        assert!(s.push(&Mat4::from_scale(Vec3::splat(2.0))));
        let p = s.top().transform_point3(Vec3::ONE);
        assert_eq!(p, Vec3::new(3.0, 2.0, 2.0));
        assert!(s.pop(1));
        assert_eq!(s.top(), Mat4::from_translation(Vec3::X));
    }

    #[test]
    fn overflow_and_underflow_are_reported() {
        let mut s = MatrixStack::new();
        for _ in 0..MAX_MATRIX_DEPTH {
            assert!(s.push(&Mat4::IDENTITY));
        }
        assert!(!s.push(&Mat4::IDENTITY));
        assert_eq!(s.depth(), MAX_MATRIX_DEPTH);
        assert!(!s.pop(MAX_MATRIX_DEPTH + 1));
        assert_eq!(s.depth(), 0);
        assert_eq!(s.top(), Mat4::IDENTITY);
    }
}
