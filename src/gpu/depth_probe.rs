//! Single-pixel depth readback for picking.
//!
//! A pick request is recorded on mouse press. On the next frame the depth
//! texel under the cursor is copied out after the scene pass and read back
//! once the frame is submitted.

/// Readback rows must be aligned to `COPY_BYTES_PER_ROW_ALIGNMENT`.
const ROW_BYTES: u32 = 256;

pub struct DepthProbe {
    staging_buffer: wgpu::Buffer,
    width: u32,
    height: u32,
    pending: Option<(u32, u32)>,
}

impl DepthProbe {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Depth Probe Staging Buffer"),
            size: ROW_BYTES as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        Self {
            staging_buffer,
            width,
            height,
            pending: None,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pending = None;
    }

    /// Request the depth at pixel `(x, y)`, clamped to the target.
    pub fn request(&mut self, x: u32, y: u32) {
        let x = x.min(self.width.saturating_sub(1));
        let y = y.min(self.height.saturating_sub(1));
        self.pending = Some((x, y));
    }

    /// Copy the requested texel out of `depth_texture`. Must be recorded after
    /// the pass that writes depth.
    pub fn copy_texel(&self, encoder: &mut wgpu::CommandEncoder, depth_texture: &wgpu::Texture) {
        let Some((x, y)) = self.pending else {
            return;
        };
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: depth_texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x, y, z: 0 },
                aspect: wgpu::TextureAspect::DepthOnly,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.staging_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(ROW_BYTES),
                    rows_per_image: Some(1),
                },
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Read the copied texel (call after submit). Returns the requested pixel
    /// and its depth, or `None` when nothing was requested.
    pub fn read(&mut self, device: &wgpu::Device) -> Option<((u32, u32), f32)> {
        let pixel = self.pending.take()?;

        let slice = self.staging_buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        device.poll(wgpu::Maintain::Wait);

        match rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                log::warn!("Depth readback failed: {}", e);
                return None;
            }
            Err(_) => {
                log::warn!("Depth readback was never completed");
                return None;
            }
        }

        let depth = {
            let data = slice.get_mapped_range();
            decode_depth(&data)
        };
        self.staging_buffer.unmap();
        Some((pixel, depth))
    }
}

/// First four bytes of a readback row as a little-endian `f32` depth.
/// Anything malformed reads as background.
fn decode_depth(bytes: &[u8]) -> f32 {
    match bytes.get(..4) {
        Some(&[a, b, c, d]) => {
            let depth = f32::from_le_bytes([a, b, c, d]);
            if depth.is_finite() {
                depth
            } else {
                1.0
            }
        }
        _ => 1.0,
    }
}
