//! Blocking buffer readback for diagnostics and tests.
//!
//! The per-frame cull never reads back; this exists to inspect what the
//! passes produced.

use bytemuck::Pod;

use crate::core::error::Error;
use crate::core::types::Result;

/// Copy the first `count` elements of `source` to the host.
/// `source` must have `COPY_SRC` usage.
pub fn read_buffer<T: Pod>(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    source: &wgpu::Buffer,
    count: usize,
) -> Result<Vec<T>> {
    let size = (count * std::mem::size_of::<T>()) as u64;
    if size == 0 {
        return Ok(Vec::new());
    }
    if size > source.size() {
        return Err(Error::Gpu(format!(
            "Readback of {size} bytes from a {} byte buffer", source.size()
        )));
    }
    // Copies must be 4-byte aligned
    let copy_size = size.next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT);

    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("readback_staging"),
        size: copy_size,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("readback_encoder"),
    });
    encoder.copy_buffer_to_buffer(source, 0, &staging, 0, copy_size);
    queue.submit(Some(encoder.finish()));

    let slice = staging.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    device
        .poll(wgpu::PollType::Wait { submission_index: None, timeout: None })
        .map_err(|e| Error::Gpu(format!("Device poll failed: {e}")))?;

    rx.recv()
        .map_err(|_| Error::Gpu("Readback callback dropped".into()))?
        .map_err(|e| Error::Gpu(format!("Buffer map failed: {e}")))?;

    let data = slice.get_mapped_range();
    let values = bytemuck::pod_collect_to_vec::<u8, T>(&data[..size as usize]);
    drop(data);
    staging.unmap();
    Ok(values)
}
