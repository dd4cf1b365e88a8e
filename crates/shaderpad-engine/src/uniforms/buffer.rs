use std::num::NonZeroU64;

use super::flatten::{flatten, FlatLeaf};
use super::group::UniformGroup;
use super::layout::Layout;
use super::UniformError;

/// Destination for packed uniform bytes (normally a GPU buffer via the queue).
pub trait UniformUpload {
    fn write_uniforms(&mut self, offset: u64, bytes: &[u8]);
}

/// CPU mirror of a uniform block.
///
/// Owns the flattened leaves, their layout, and the packed `f32` array that is
/// copied byte-for-byte into the GPU buffer. Nothing here reallocates after
/// construction, so `update` can run at any frequency.
#[derive(Debug)]
pub struct PackedUniforms {
    leaves: Vec<FlatLeaf>,
    layout: Layout,
    packed: Vec<f32>,
}

impl PackedUniforms {
    pub fn new(root: &UniformGroup) -> Result<Self, UniformError> {
        let leaves = flatten(root)?;
        let layout = Layout::plan(&leaves);

        log::debug!(
            "uniform layout: {} leaves, {} elements ({} bytes)",
            leaves.len(),
            layout.count(),
            layout.byte_size()
        );

        let mut packed = Self {
            packed: vec![0.0; layout.count()],
            leaves,
            layout,
        };
        packed.refresh();
        Ok(packed)
    }

    /// Re-reads every leaf in declaration order into the packed array.
    pub fn refresh(&mut self) {
        for (leaf, &offset) in self.leaves.iter().zip(self.layout.offsets()) {
            leaf.uniform.update();
            leaf.uniform.write_staging(&mut self.packed, offset);
        }
    }

    /// Refreshes the packed array, then issues exactly one write at offset 0.
    pub fn update<U>(&mut self, upload: &mut U)
    where
        U: UniformUpload + ?Sized,
    {
        self.refresh();
        upload.write_uniforms(0, self.as_bytes());
    }

    pub fn leaves(&self) -> &[FlatLeaf] {
        &self.leaves
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn offsets(&self) -> &[usize] {
        self.layout.offsets()
    }

    pub fn count(&self) -> usize {
        self.layout.count()
    }

    pub fn byte_size(&self) -> u64 {
        self.layout.byte_size()
    }

    /// Byte size as a uniform binding size; empty blocks cannot be bound.
    pub fn binding_size(&self) -> Result<NonZeroU64, UniformError> {
        NonZeroU64::new(self.byte_size()).ok_or(UniformError::EmptyUniformTree)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.packed
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.packed)
    }

    /// Slot offset of the leaf at dotted `path`.
    pub fn offset_of(&self, path: &str) -> Option<usize> {
        self.index_of(path).map(|i| self.layout.offsets()[i])
    }

    /// Packed components of the leaf at dotted `path` as of the last refresh.
    pub fn read(&self, path: &str) -> Option<&[f32]> {
        let i = self.index_of(path)?;
        let offset = self.layout.offsets()[i];
        Some(&self.packed[offset..offset + self.leaves[i].elements])
    }

    fn index_of(&self, path: &str) -> Option<usize> {
        self.leaves.iter().position(|l| l.path == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uniforms::{Quat, Shared, SharedArray, Uniform, Vec2, Vec3, Vec4};

    #[derive(Default)]
    struct Recorder {
        writes: Vec<(u64, Vec<f32>)>,
    }

    impl UniformUpload for Recorder {
        fn write_uniforms(&mut self, offset: u64, bytes: &[u8]) {
            let floats = bytes
                .chunks_exact(4)
                .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
                .collect();
            self.writes.push((offset, floats));
        }
    }

    fn tree(fields: Vec<(&str, Uniform)>) -> UniformGroup {
        let mut b = UniformGroup::builder();
        for (name, u) in fields {
            b = b.field(name, u);
        }
        b.build().unwrap()
    }

    // ── literal scenarios ─────────────────────────────────────────────────

    #[test]
    fn single_scalar() {
        let p = PackedUniforms::new(&tree(vec![("a", Uniform::new(7.0f32))])).unwrap();
        assert_eq!(p.count(), 4);
        assert_eq!(p.offsets(), [0]);
        assert_eq!(p.as_slice(), [7.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn resolution_and_aspect_share_a_block() {
        let p = PackedUniforms::new(&tree(vec![
            ("r", Uniform::new(Vec2::new(1920.0, 1080.0))),
            ("aspect", Uniform::new(1.777_777_8f32)),
        ]))
        .unwrap();
        assert_eq!(p.offsets(), [0, 2]);
        assert_eq!(p.count(), 4);
        assert_eq!(p.as_slice(), [1920.0, 1080.0, 1.777_777_8, 0.0]);
    }

    #[test]
    fn vec4_after_scalar_starts_next_block() {
        let p = PackedUniforms::new(&tree(vec![
            ("t", Uniform::new(0.5f32)),
            ("c", Uniform::new(Vec4::new(1.0, 0.0, 0.0, 1.0))),
        ]))
        .unwrap();
        assert_eq!(p.offsets(), [0, 4]);
        assert_eq!(p.count(), 8);
        assert_eq!(p.as_slice(), [0.5, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn vec3_is_promoted() {
        let p = PackedUniforms::new(&tree(vec![("p", Uniform::new(Vec3::new(1.0, 2.0, 3.0)))]))
            .unwrap();
        assert_eq!(p.offsets(), [0]);
        assert_eq!(p.count(), 4);
        assert_eq!(p.as_slice(), [1.0, 2.0, 3.0, 0.0]);
    }

    #[test]
    fn nested_group_is_padded() {
        let light = tree(vec![
            ("color", Uniform::new(Vec3::new(1.0, 1.0, 1.0))),
            ("intensity", Uniform::new(2.0f32)),
        ]);
        let p = PackedUniforms::new(&tree(vec![
            ("light", Uniform::new(light)),
            ("time", Uniform::new(0.0f32)),
        ]))
        .unwrap();

        assert_eq!(p.offsets(), [0, 4, 8]);
        assert_eq!(p.count(), 12);
        assert_eq!(
            p.as_slice(),
            [1.0, 1.0, 1.0, 0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
        );
        assert_eq!(p.offset_of("light.intensity"), Some(4));
        assert_eq!(p.offset_of("time"), Some(8));
        assert_eq!(p.offset_of("intensity"), None);
    }

    #[test]
    fn one_write_per_frame() {
        let u_time = Uniform::new(0.0f32);
        let mut p = PackedUniforms::new(&tree(vec![("uTime", u_time.clone())])).unwrap();
        let mut gpu = Recorder::default();

        u_time.set(1.0f32);
        p.update(&mut gpu);
        assert_eq!(gpu.writes.len(), 1);
        assert_eq!(gpu.writes[0], (0, vec![1.0, 0.0, 0.0, 0.0]));

        u_time.set(2.0f32);
        p.update(&mut gpu);
        assert_eq!(gpu.writes.len(), 2);
        assert_eq!(gpu.writes[1], (0, vec![2.0, 0.0, 0.0, 0.0]));
    }

    // ── properties ────────────────────────────────────────────────────────

    #[test]
    fn empty_tree_packs_to_nothing() {
        let p = PackedUniforms::new(&UniformGroup::new()).unwrap();
        assert_eq!(p.count(), 0);
        assert!(p.as_bytes().is_empty());
    }

    #[test]
    fn vec3_reassignment_packs_zero_w() {
        let u = Uniform::new(Vec4::new(1.0, 2.0, 3.0, 9.0));
        let mut p = PackedUniforms::new(&tree(vec![("p", u.clone())])).unwrap();
        u.set(Vec3::new(4.0, 5.0, 6.0));
        p.refresh();
        assert_eq!(p.as_slice(), &[4.0, 5.0, 6.0, 0.0]);
    }

    #[test]
    fn empty_tree_cannot_be_bound() {
        let p = PackedUniforms::new(&UniformGroup::new()).unwrap();
        assert_eq!(p.binding_size(), Err(UniformError::EmptyUniformTree));

        let p = PackedUniforms::new(&tree(vec![("uTime", Uniform::new(0.0f32))])).unwrap();
        assert_eq!(p.binding_size().map(NonZeroU64::get), Ok(16));
    }

    #[test]
    fn read_matches_primitive_components() {
        let q = Quat::new(0.1, 0.2, 0.3, 0.9);
        let arr = SharedArray::new(vec![4.0f32, 5.0, 6.0]);
        let p = PackedUniforms::new(&tree(vec![
            ("s", Uniform::new(1.5f32)),
            ("q", Uniform::new(q)),
            ("v", Uniform::new(Vec2::new(8.0, 9.0))),
            ("arr", Uniform::new(arr)),
        ]))
        .unwrap();

        assert_eq!(p.offsets(), [0, 4, 8, 12]);
        assert_eq!(p.read("s"), Some(&[1.5][..]));
        assert_eq!(p.read("q"), Some(&[0.1, 0.2, 0.3, 0.9][..]));
        assert_eq!(p.read("v"), Some(&[8.0, 9.0][..]));
        assert_eq!(p.read("arr"), Some(&[4.0, 5.0, 6.0][..]));
    }

    #[test]
    fn refresh_is_idempotent() {
        let color = Shared::new(Vec4::new(0.2, 0.4, 0.6, 1.0));
        let mut p = PackedUniforms::new(&tree(vec![
            ("t", Uniform::new(3.0f32)),
            ("c", Uniform::new(color)),
        ]))
        .unwrap();

        p.refresh();
        let first = p.as_slice().to_vec();
        p.refresh();
        assert_eq!(p.as_slice(), first.as_slice());
    }

    #[test]
    fn shared_value_feeds_every_dependent_leaf() {
        let res = Shared::new(Vec2::new(800.0, 600.0));
        let mut p = PackedUniforms::new(&tree(vec![
            ("a", Uniform::new(res.clone())),
            ("b", Uniform::new(res.clone())),
        ]))
        .unwrap();

        res.update(|v| {
            v.set(1024.0, 768.0);
        });
        p.refresh();
        assert_eq!(p.as_slice(), [1024.0, 768.0, 1024.0, 768.0]);
    }

    #[test]
    fn alias_leaf_follows_source_in_same_refresh() {
        // Source is declared first, so its staging is fresh when the alias copies it.
        let src = Uniform::new(1.0f32);
        let mut p = PackedUniforms::new(&tree(vec![
            ("src", src.clone()),
            ("copy", Uniform::new(&src)),
        ]))
        .unwrap();

        src.set(5.0f32);
        p.refresh();
        assert_eq!(p.as_slice(), [5.0, 5.0, 0.0, 0.0]);
    }

    #[test]
    fn refresh_overwrites_only_leaf_slots() {
        let mut p = PackedUniforms::new(&tree(vec![
            ("t", Uniform::new(1.0f32)),
            ("c", Uniform::new(Vec3::new(2.0, 3.0, 4.0))),
        ]))
        .unwrap();
        p.refresh();
        // Slots 1..4 are alignment padding; slot 7 is the vec3 promotion slot.
        assert_eq!(p.as_slice(), [1.0, 0.0, 0.0, 0.0, 2.0, 3.0, 4.0, 0.0]);
    }
}
