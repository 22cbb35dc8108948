use std::ops::{Deref, DerefMut};
use std::{any, mem};

use bytemuck::Pod;
use derivative::Derivative;

use crate::Bindable;

/// Storage buffer that exists both on the host machine and the GPU.
///
/// Uses [`DerefMut`] to track whether the data's been modified since the last
/// [`Self::flush()`]; the buffer is allocated for `capacity` elements up front
/// and never grows.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct StorageBuffer<T> {
    #[derivative(Debug = "ignore")]
    buffer: wgpu::Buffer,
    capacity: usize,
    data: Vec<T>,
    dirty: bool,
}

impl<T> StorageBuffer<T>
where
    T: Pod,
{
    pub fn new(
        device: &wgpu::Device,
        label: impl AsRef<str>,
        capacity: usize,
        data: Vec<T>,
    ) -> Self {
        let label = label.as_ref();
        let capacity = capacity.max(data.len()).max(1);

        log::debug!(
            "Allocating storage buffer `{label}`; ty={}, capacity={capacity}",
            any::type_name::<T>(),
        );

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::STORAGE,
            size: (capacity * mem::size_of::<T>()) as _,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            capacity,
            data,
            dirty: true,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Uploads the data, if it's changed; elements past the capacity are
    /// dropped.
    pub fn flush(&mut self, queue: &wgpu::Queue) {
        if !mem::take(&mut self.dirty) {
            return;
        }

        self.data.truncate(self.capacity);

        if !self.data.is_empty() {
            queue.write_buffer(
                &self.buffer,
                0,
                bytemuck::cast_slice(&self.data),
            );
        }
    }
}

impl<T> Deref for StorageBuffer<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<T> DerefMut for StorageBuffer<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.dirty = true;

        &mut self.data
    }
}

impl<T> Bindable for StorageBuffer<T> {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource)> {
        let layout = wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage {
                    // TODO should say `read_only: true`, but rust-gpu doesn't
                    //      emit the matching decorations yet, which makes
                    //      naga reject the shader
                    read_only: false,
                },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        vec![(layout, self.buffer.as_entire_binding())]
    }
}
