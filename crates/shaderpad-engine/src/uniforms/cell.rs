use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use super::group::UniformGroup;
use super::value::{Components, Quat, Shared, SharedArray, Vec2, Vec3, Vec4};
use super::UniformError;

/// Current value reference of a uniform cell.
///
/// Primitive variants hold shared handles, so a cell re-reads whatever the
/// application last wrote through any clone of the handle.
#[derive(Debug, Clone)]
pub enum UniformValue {
    Scalar(Shared<f32>),
    Array(SharedArray),
    Vec2(Shared<Vec2>),
    Vec3(Shared<Vec3>),
    Vec4(Shared<Vec4>),
    Quat(Shared<Quat>),
    /// Alias of another cell; its staging is copied through on update.
    Cell(Uniform),
    /// Structural node; children are flattened into leaves.
    Group(UniformGroup),
}

/// Shape of a cell, fixed for its lifetime.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UniformKind {
    Scalar,
    Array(usize),
    Vec2,
    Vec3,
    Vec4,
    Quat,
    Group,
}

impl UniformKind {
    /// Number of `f32` slots a cell of this kind stages.
    ///
    /// vec3 is promoted to four slots; groups stage nothing themselves.
    pub const fn elements(self) -> usize {
        match self {
            UniformKind::Scalar => 1,
            UniformKind::Array(n) => n,
            UniformKind::Vec2 => Vec2::COUNT,
            UniformKind::Vec3 => 4,
            UniformKind::Vec4 => Vec4::COUNT,
            UniformKind::Quat => Quat::COUNT,
            UniformKind::Group => 0,
        }
    }

    pub const fn is_group(self) -> bool {
        matches!(self, UniformKind::Group)
    }
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Scalar(_) => UniformKind::Scalar,
            UniformValue::Array(a) => UniformKind::Array(a.len()),
            UniformValue::Vec2(_) => UniformKind::Vec2,
            UniformValue::Vec3(_) => UniformKind::Vec3,
            UniformValue::Vec4(_) => UniformKind::Vec4,
            UniformValue::Quat(_) => UniformKind::Quat,
            UniformValue::Cell(u) => u.kind(),
            UniformValue::Group(_) => UniformKind::Group,
        }
    }
}

struct CellState {
    value: UniformValue,
    kind: UniformKind,
    staging: Vec<f32>,
    trailing_padding: usize,
}

/// Named slot in a uniform tree.
///
/// `Uniform` is a shared handle: clones refer to the same cell, which lets the
/// application keep a handle for `set` while a pass holds another for packing.
/// The staging length is decided at construction and never changes.
#[derive(Clone)]
pub struct Uniform(Rc<RefCell<CellState>>);

impl Uniform {
    pub fn new(value: impl Into<UniformValue>) -> Self {
        let value = value.into();
        let kind = value.kind();
        let uniform = Self(Rc::new(RefCell::new(CellState {
            staging: vec![0.0; kind.elements()],
            value,
            kind,
            trailing_padding: 0,
        })));
        uniform.update();
        uniform
    }

    /// Copy constructor: same kind and value reference as `source`, with its
    /// staging copied.
    pub fn copy_of(source: &Uniform) -> Self {
        let src = source.0.borrow();
        Self(Rc::new(RefCell::new(CellState {
            value: src.value.clone(),
            kind: src.kind,
            staging: src.staging.clone(),
            trailing_padding: 0,
        })))
    }

    pub fn kind(&self) -> UniformKind {
        self.0.borrow().kind
    }

    /// Staged element count (vec3 counts as 4).
    pub fn elements(&self) -> usize {
        self.0.borrow().staging.len()
    }

    pub fn is_group(&self) -> bool {
        self.kind().is_group()
    }

    /// Tail padding in elements assigned by the flattener.
    pub fn trailing_padding(&self) -> usize {
        self.0.borrow().trailing_padding
    }

    pub(crate) fn set_trailing_padding(&self, padding: usize) {
        self.0.borrow_mut().trailing_padding = padding;
    }

    /// Returns a clone of the current value reference.
    pub fn value(&self) -> UniformValue {
        self.0.borrow().value.clone()
    }

    /// Children of a structural cell, following aliases.
    pub fn group(&self) -> Option<UniformGroup> {
        match &self.0.borrow().value {
            UniformValue::Group(g) => Some(g.clone()),
            UniformValue::Cell(u) => u.group(),
            _ => None,
        }
    }

    /// Staged components as of the last [`Uniform::update`].
    pub fn staging(&self) -> Ref<'_, [f32]> {
        Ref::map(self.0.borrow(), |s| s.staging.as_slice())
    }

    /// Replaces the value reference without touching staging.
    ///
    /// Assignments that would change the cell's element count, involve a
    /// group, or alias the cell to itself are logged and ignored.
    pub fn set(&self, value: impl Into<UniformValue>) {
        if let Err(e) = self.try_set(value) {
            log::warn!("ignoring uniform assignment: {e}");
        }
    }

    /// Like [`Uniform::set`], but reports a rejected assignment.
    pub fn try_set(&self, value: impl Into<UniformValue>) -> Result<(), UniformError> {
        let value = value.into();
        if let UniformValue::Cell(src) = &value {
            if src.ptr_eq(self) {
                return Err(UniformError::SelfAlias);
            }
        }

        let found = value.kind();
        let mut state = self.0.borrow_mut();
        if found.is_group() || state.kind.is_group() || found.elements() != state.staging.len() {
            return Err(UniformError::KindMismatch {
                expected: state.staging.len(),
                found: found.elements(),
            });
        }

        state.value = value;
        Ok(())
    }

    /// Re-reads the value reference into staging.
    pub fn update(&self) {
        let mut state = self.0.borrow_mut();
        let CellState { value, staging, .. } = &mut *state;
        match value {
            UniformValue::Scalar(s) => staging[0] = s.get(),
            UniformValue::Array(a) => a.write_to(staging, 0),
            UniformValue::Vec2(v) => v.get().write_to(staging, 0),
            UniformValue::Vec3(v) => {
                v.get().write_to(staging, 0);
                staging[3] = 0.0;
            }
            UniformValue::Vec4(v) => v.get().write_to(staging, 0),
            UniformValue::Quat(v) => v.get().write_to(staging, 0),
            UniformValue::Cell(src) => {
                let src = src.0.borrow();
                staging.copy_from_slice(&src.staging);
            }
            UniformValue::Group(_) => {}
        }
    }

    /// Copies staging into `dst` starting at `offset`.
    pub(crate) fn write_staging(&self, dst: &mut [f32], offset: usize) {
        let state = self.0.borrow();
        match state.staging.as_slice() {
            [v] => dst[offset] = *v,
            s => dst[offset..offset + s.len()].copy_from_slice(s),
        }
    }

    /// Returns true when both handles refer to the same cell.
    pub fn ptr_eq(&self, other: &Uniform) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Uniform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0.borrow();
        f.debug_struct("Uniform")
            .field("kind", &state.kind)
            .field("staging", &state.staging)
            .field("trailing_padding", &state.trailing_padding)
            .finish()
    }
}

// ── conversions ───────────────────────────────────────────────────────────

macro_rules! primitive_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for UniformValue {
                fn from(v: $ty) -> Self {
                    UniformValue::$variant(Shared::new(v))
                }
            }

            impl From<Shared<$ty>> for UniformValue {
                fn from(v: Shared<$ty>) -> Self {
                    UniformValue::$variant(v)
                }
            }

            impl From<$ty> for Uniform {
                fn from(v: $ty) -> Self {
                    Uniform::new(v)
                }
            }

            impl From<Shared<$ty>> for Uniform {
                fn from(v: Shared<$ty>) -> Self {
                    Uniform::new(v)
                }
            }
        )*
    };
}

primitive_value! {
    f32 => Scalar,
    Vec2 => Vec2,
    Vec3 => Vec3,
    Vec4 => Vec4,
    Quat => Quat,
}

impl From<SharedArray> for UniformValue {
    fn from(v: SharedArray) -> Self {
        UniformValue::Array(v)
    }
}

impl From<Vec<f32>> for UniformValue {
    fn from(v: Vec<f32>) -> Self {
        UniformValue::Array(SharedArray::new(v))
    }
}

impl<const N: usize> From<[f32; N]> for UniformValue {
    fn from(v: [f32; N]) -> Self {
        UniformValue::Array(SharedArray::new(v))
    }
}

impl From<Uniform> for UniformValue {
    fn from(v: Uniform) -> Self {
        UniformValue::Cell(v)
    }
}

impl From<&Uniform> for UniformValue {
    fn from(v: &Uniform) -> Self {
        UniformValue::Cell(v.clone())
    }
}

impl From<UniformGroup> for UniformValue {
    fn from(v: UniformGroup) -> Self {
        UniformValue::Group(v)
    }
}

impl From<SharedArray> for Uniform {
    fn from(v: SharedArray) -> Self {
        Uniform::new(v)
    }
}

impl From<Vec<f32>> for Uniform {
    fn from(v: Vec<f32>) -> Self {
        Uniform::new(v)
    }
}

impl<const N: usize> From<[f32; N]> for Uniform {
    fn from(v: [f32; N]) -> Self {
        Uniform::new(v)
    }
}

impl From<&Uniform> for Uniform {
    fn from(v: &Uniform) -> Self {
        v.clone()
    }
}

impl From<UniformGroup> for Uniform {
    fn from(v: UniformGroup) -> Self {
        Uniform::new(v)
    }
}
