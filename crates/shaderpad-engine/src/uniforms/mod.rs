//! Uniform packing core.
//!
//! Turns a typed tree of named CPU values into one std140-style uniform block:
//! - `value`: primitives (`Vec2`, `Vec3`, `Vec4`, `Quat`) and shared handles
//! - `cell`: `Uniform` cells with fixed-size staging
//! - `group` / `flatten`: declaration-ordered tree and its dotted leaf list
//! - `layout`: slot offsets and the padded element count
//! - `buffer` / `gpu`: packed CPU mirror, per-frame update, device buffer
//!
//! Layout contract (4-byte slots): scalars pack tightly, vec2 starts on an even
//! slot, vec3/vec4/quaternion/array start on a multiple of four, vec3 occupies
//! four slots, and every nested group is padded to a multiple of four.

mod buffer;
mod cell;
mod error;
mod flatten;
mod gpu;
mod group;
mod layout;
mod value;

pub use buffer::{PackedUniforms, UniformUpload};
pub use cell::{Uniform, UniformKind, UniformValue};
pub use error::UniformError;
pub use flatten::{flatten, FlatLeaf};
pub use gpu::{QueueUpload, UniformBuffer};
pub use group::{is_shader_identifier, UniformGroup, UniformGroupBuilder};
pub use layout::{pad2, pad4, Layout};
pub use value::{Components, Quat, Shared, SharedArray, Vec2, Vec3, Vec4};
