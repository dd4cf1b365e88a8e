use std::num::NonZeroU64;

use super::buffer::{PackedUniforms, UniformUpload};
use super::group::UniformGroup;
use super::UniformError;

/// Writes packed uniforms into a device buffer through the queue.
pub struct QueueUpload<'a> {
    pub queue: &'a wgpu::Queue,
    pub buffer: &'a wgpu::Buffer,
}

impl UniformUpload for QueueUpload<'_> {
    fn write_uniforms(&mut self, offset: u64, bytes: &[u8]) {
        self.queue.write_buffer(self.buffer, offset, bytes);
    }
}

/// Packed uniform block plus the GPU buffer shadowing it.
///
/// The buffer is `count * 4` bytes with `UNIFORM | COPY_DST` usage and is never
/// resized.
pub struct UniformBuffer {
    packed: PackedUniforms,
    buffer: wgpu::Buffer,
    size: NonZeroU64,
}

impl UniformBuffer {
    /// Flattens and lays out `root`, then allocates the device buffer.
    ///
    /// An empty tree is rejected: wgpu does not allow zero-sized uniform bindings.
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        root: &UniformGroup,
    ) -> Result<Self, UniformError> {
        let packed = PackedUniforms::new(root)?;
        let size = packed.binding_size()?;

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: size.get(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            packed,
            buffer,
            size,
        })
    }

    /// Runs the update protocol and uploads the packed block.
    pub fn update(&mut self, queue: &wgpu::Queue) {
        let mut upload = QueueUpload {
            queue,
            buffer: &self.buffer,
        };
        self.packed.update(&mut upload);
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn packed(&self) -> &PackedUniforms {
        &self.packed
    }

    /// Buffer size in bytes; also the minimum binding size.
    pub fn size(&self) -> NonZeroU64 {
        self.size
    }
}
