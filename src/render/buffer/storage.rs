//! Storage buffer allocation checked against device limits.
//!
//! wgpu reports an oversized buffer through the device error callback rather
//! than a `Result`, so sizes are checked up front and surfaced as
//! `Error::ResourceExhausted`.

use wgpu::util::DeviceExt;

use crate::core::error::Error;
use crate::core::types::Result;

/// Fail if a buffer of `size` bytes cannot be created and bound as storage.
pub fn check_storage_size(device: &wgpu::Device, label: &str, size: u64) -> Result<()> {
    let limits = device.limits();
    let limit = limits.max_buffer_size.min(limits.max_storage_buffer_binding_size as u64);
    if size > limit {
        return Err(Error::ResourceExhausted {
            label: label.to_string(),
            requested: size,
            limit,
        });
    }
    Ok(())
}

/// Zero-initialized storage buffer. Empty requests get one 4-byte word so
/// the binding is never zero-sized.
pub fn create_storage_buffer(
    device: &wgpu::Device,
    label: &str,
    size: u64,
    extra_usage: wgpu::BufferUsages,
) -> Result<wgpu::Buffer> {
    let size = size.max(4);
    check_storage_size(device, label, size)?;
    Ok(device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: wgpu::BufferUsages::STORAGE | extra_usage,
        mapped_at_creation: false,
    }))
}

/// Storage buffer filled from `contents`.
pub fn create_storage_buffer_init(
    device: &wgpu::Device,
    label: &str,
    contents: &[u8],
    extra_usage: wgpu::BufferUsages,
) -> Result<wgpu::Buffer> {
    if contents.is_empty() {
        return create_storage_buffer(device, label, 0, extra_usage);
    }
    check_storage_size(device, label, contents.len() as u64)?;
    Ok(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents,
        usage: wgpu::BufferUsages::STORAGE | extra_usage,
    }))
}
