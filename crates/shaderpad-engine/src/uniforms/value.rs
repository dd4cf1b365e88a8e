use std::cell::{Cell, RefCell};
use std::rc::Rc;

use bytemuck::{Pod, Zeroable};

use super::UniformError;

/// Fixed-size numeric aggregate that can be flattened into `f32` slots.
pub trait Components: Copy {
    /// Number of `f32` components written by [`Components::write_to`].
    const COUNT: usize;

    /// Writes `COUNT` components into `dst[offset..offset + COUNT]`.
    fn write_to(&self, dst: &mut [f32], offset: usize);
}

// ── vectors ───────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Re-seats both components in place and returns `self` for chaining.
    #[inline]
    pub fn set(&mut self, x: f32, y: f32) -> &mut Self {
        self.x = x;
        self.y = y;
        self
    }
}

impl Components for Vec2 {
    const COUNT: usize = 2;

    #[inline]
    fn write_to(&self, dst: &mut [f32], offset: usize) {
        dst[offset] = self.x;
        dst[offset + 1] = self.y;
    }
}

/// 3-component vector.
///
/// Reports three components; uniform cells promote it to four slots.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Returns a unit-length copy, or `self` unchanged when the length is zero.
    #[inline]
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len == 0.0 {
            return self;
        }
        Self::new(self.x / len, self.y / len, self.z / len)
    }
}

impl Components for Vec3 {
    const COUNT: usize = 3;

    #[inline]
    fn write_to(&self, dst: &mut [f32], offset: usize) {
        dst[offset] = self.x;
        dst[offset + 1] = self.y;
        dst[offset + 2] = self.z;
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Linear RGBA color packed as a vec4.
    #[inline]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self::new(r, g, b, a)
    }
}

impl Components for Vec4 {
    const COUNT: usize = 4;

    #[inline]
    fn write_to(&self, dst: &mut [f32], offset: usize) {
        dst[offset] = self.x;
        dst[offset + 1] = self.y;
        dst[offset + 2] = self.z;
        dst[offset + 3] = self.w;
    }
}

/// Rotation quaternion stored as `(x, y, z, w)`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Quat = Quat::new(0.0, 0.0, 0.0, 1.0);

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `angle` radians around `axis` (normalized internally).
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let axis = axis.normalized();
        let (s, c) = (angle * 0.5).sin_cos();
        Self::new(axis.x * s, axis.y * s, axis.z * s, c)
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Components for Quat {
    const COUNT: usize = 4;

    #[inline]
    fn write_to(&self, dst: &mut [f32], offset: usize) {
        dst[offset] = self.x;
        dst[offset + 1] = self.y;
        dst[offset + 2] = self.z;
        dst[offset + 3] = self.w;
    }
}

impl From<[f32; 2]> for Vec2 {
    fn from([x, y]: [f32; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<[f32; 4]> for Vec4 {
    fn from([x, y, z, w]: [f32; 4]) -> Self {
        Self::new(x, y, z, w)
    }
}

// ── shared handles ────────────────────────────────────────────────────────

/// Shared, interior-mutable handle to a `Copy` value.
///
/// Cloning aliases the same value: every uniform cell holding a clone sees
/// writes made through any other clone on its next update.
#[derive(Debug, Default)]
pub struct Shared<T: Copy>(Rc<Cell<T>>);

impl<T: Copy> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: Copy> Shared<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(Cell::new(value)))
    }

    #[inline]
    pub fn get(&self) -> T {
        self.0.get()
    }

    #[inline]
    pub fn set(&self, value: T) {
        self.0.set(value);
    }

    /// Applies `f` to a copy of the value and stores the result.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut v = self.0.get();
        f(&mut v);
        self.0.set(v);
    }

    /// Returns true when both handles refer to the same value.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Shared fixed-length `f32` array.
///
/// The length is fixed at construction and treated as one opaque leaf.
#[derive(Debug, Clone)]
pub struct SharedArray(Rc<RefCell<Box<[f32]>>>);

impl SharedArray {
    pub fn new(values: impl Into<Box<[f32]>>) -> Self {
        Self(Rc::new(RefCell::new(values.into())))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        self.0.borrow().get(index).copied()
    }

    /// Sets one element; out-of-range indices are ignored and reported as `false`.
    pub fn set(&self, index: usize, value: f32) -> bool {
        match self.0.borrow_mut().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Overwrites every element; `src` must have the same length.
    pub fn copy_from(&self, src: &[f32]) -> Result<(), UniformError> {
        let mut dst = self.0.borrow_mut();
        if dst.len() != src.len() {
            return Err(UniformError::KindMismatch {
                expected: dst.len(),
                found: src.len(),
            });
        }
        dst.copy_from_slice(src);
        Ok(())
    }

    pub(crate) fn write_to(&self, dst: &mut [f32], offset: usize) {
        let src = self.0.borrow();
        dst[offset..offset + src.len()].copy_from_slice(&src);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_to_respects_offset() {
        let mut dst = [0.0f32; 6];
        Vec4::new(1.0, 2.0, 3.0, 4.0).write_to(&mut dst, 2);
        assert_eq!(dst, [0.0, 0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn vec3_writes_three_components_only() {
        let mut dst = [9.0f32; 4];
        Vec3::new(1.0, 2.0, 3.0).write_to(&mut dst, 0);
        assert_eq!(dst, [1.0, 2.0, 3.0, 9.0]);
    }

    #[test]
    fn quat_from_axis_angle_half_turn() {
        let q = Quat::from_axis_angle(Vec3::new(0.0, 0.0, 2.0), std::f32::consts::PI);
        assert!(q.x.abs() < 1e-6);
        assert!((q.z - 1.0).abs() < 1e-6);
        assert!(q.w.abs() < 1e-6);
    }

    #[test]
    fn vec2_set_chains() {
        let mut v = Vec2::default();
        v.set(1920.0, 1080.0);
        assert_eq!(v, Vec2::new(1920.0, 1080.0));
    }

    // ── shared handles ────────────────────────────────────────────────────

    #[test]
    fn shared_clones_alias() {
        let a = Shared::new(Vec2::new(1.0, 2.0));
        let b = a.clone();
        b.update(|v| v.x = 5.0);
        assert_eq!(a.get(), Vec2::new(5.0, 2.0));
        assert!(a.ptr_eq(&b));
    }

    #[test]
    fn shared_array_copy_from_rejects_length_change() {
        let arr = SharedArray::new(vec![0.0f32; 3]);
        assert!(arr.copy_from(&[1.0, 2.0]).is_err());
        arr.copy_from(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(arr.get(2), Some(3.0));
    }

    #[test]
    fn shared_array_set_out_of_range() {
        let arr = SharedArray::new(vec![0.0f32; 2]);
        assert!(!arr.set(2, 1.0));
        assert!(arr.set(1, 1.0));
        assert_eq!(arr.get(1), Some(1.0));
    }
}
