//! Typed buffer packing
//!
//! Serializes vertex attributes and triangle indices into one growing
//! little-endian byte buffer, emitting a glTF BufferView + Accessor pair
//! per array and folding per-component min/max bounds along the way.

use meshport_core::Triangle;
use tracing::trace;

use crate::error::{ExportError, ExportResult};
use crate::gltf::{
    Accessor, BufferView, COMPONENT_TYPE_FLOAT, COMPONENT_TYPE_UNSIGNED_INT, TARGET_ARRAY_BUFFER,
    TARGET_ELEMENT_ARRAY_BUFFER,
};

/// Accumulates packed binary data plus the accessors and buffer views
/// describing it. All regions reference buffer 0 of the final document.
#[derive(Debug, Default)]
pub struct BufferPacker {
    data: Vec<u8>,
    accessors: Vec<Accessor>,
    buffer_views: Vec<BufferView>,
}

impl BufferPacker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes packed so far
    pub fn byte_length(&self) -> usize {
        self.data.len()
    }

    /// Append a VEC2 float attribute array, returning its accessor index
    pub fn push_vec2(&mut self, values: &[[f32; 2]]) -> ExportResult<usize> {
        self.push_vectors(bytemuck::cast_slice(values), 2, "VEC2")
    }

    /// Append a VEC3 float attribute array, returning its accessor index
    pub fn push_vec3(&mut self, values: &[[f32; 3]]) -> ExportResult<usize> {
        self.push_vectors(bytemuck::cast_slice(values), 3, "VEC3")
    }

    /// Append a VEC4 float attribute array, returning its accessor index
    pub fn push_vec4(&mut self, values: &[[f32; 4]]) -> ExportResult<usize> {
        self.push_vectors(bytemuck::cast_slice(values), 4, "VEC4")
    }

    /// Append the flattened triangle index stream, returning its accessor
    /// index. Indices are always 32-bit unsigned.
    pub fn push_indices(&mut self, faces: &[Triangle]) -> ExportResult<usize> {
        let offset = self.data.len();
        let mut bounds: Option<(u32, u32)> = None;

        for face in faces {
            for &index in &face.indices {
                self.data.extend_from_slice(&index.to_le_bytes());
                bounds = Some(match bounds {
                    None => (index, index),
                    Some((lo, hi)) => (lo.min(index), hi.max(index)),
                });
            }
        }

        self.check_alignment()?;
        let (min, max) = match bounds {
            Some((lo, hi)) => (Some(vec![lo as f32]), Some(vec![hi as f32])),
            None => (None, None),
        };

        Ok(self.add_accessor(
            offset,
            faces.len() * 3,
            "SCALAR",
            COMPONENT_TYPE_UNSIGNED_INT,
            None,
            min,
            max,
            TARGET_ELEMENT_ARRAY_BUFFER,
        ))
    }

    /// Consume the packer, yielding the packed bytes and the accessor /
    /// buffer-view lists in allocation order
    pub fn finish(self) -> (Vec<u8>, Vec<Accessor>, Vec<BufferView>) {
        (self.data, self.accessors, self.buffer_views)
    }

    /// Append a flat float slice holding `components`-wide vectors
    fn push_vectors(
        &mut self,
        flat: &[f32],
        components: usize,
        accessor_type: &str,
    ) -> ExportResult<usize> {
        let offset = self.data.len();
        let count = flat.len() / components;
        // Seed bounds from the first element, then fold the rest.
        let mut min = flat.get(..components).map(<[f32]>::to_vec);
        let mut max = min.clone();

        for element in flat.chunks_exact(components) {
            for (i, &value) in element.iter().enumerate() {
                self.data.extend_from_slice(&value.to_le_bytes());
                if let (Some(min), Some(max)) = (min.as_mut(), max.as_mut()) {
                    min[i] = min[i].min(value);
                    max[i] = max[i].max(value);
                }
            }
        }

        self.check_alignment()?;
        Ok(self.add_accessor(
            offset,
            count,
            accessor_type,
            COMPONENT_TYPE_FLOAT,
            Some(components * 4),
            min,
            max,
            TARGET_ARRAY_BUFFER,
        ))
    }

    /// Record one BufferView + Accessor pair for the region written since
    /// `offset`, returning the accessor index
    #[allow(clippy::too_many_arguments)]
    fn add_accessor(
        &mut self,
        offset: usize,
        count: usize,
        accessor_type: &str,
        component_type: u32,
        byte_stride: Option<usize>,
        min: Option<Vec<f32>>,
        max: Option<Vec<f32>>,
        target: u32,
    ) -> usize {
        let byte_length = self.data.len() - offset;
        trace!(offset, byte_length, count, accessor_type, "packed region");

        let buffer_view_index = self.buffer_views.len();
        self.buffer_views.push(BufferView {
            buffer: 0,
            byte_offset: Some(offset),
            byte_length,
            byte_stride,
            target: Some(target),
        });

        let accessor_index = self.accessors.len();
        self.accessors.push(Accessor {
            buffer_view: Some(buffer_view_index),
            byte_offset: None,
            component_type,
            count,
            accessor_type: accessor_type.to_string(),
            max,
            min,
        });

        accessor_index
    }

    /// Every append must leave the buffer 4-byte aligned; all component
    /// widths are multiples of 4, so a violation is an internal fault.
    fn check_alignment(&self) -> ExportResult<()> {
        let offset = self.data.len();
        if offset % 4 != 0 {
            return Err(ExportError::AlignmentFault { offset });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_pack_little_endian_with_bounds() {
        let mut packer = BufferPacker::new();
        let index = packer
            .push_vec3(&[[1.0, 2.0, 3.0], [-1.0, 5.0, 0.5]])
            .unwrap();

        let (data, accessors, views) = packer.finish();
        assert_eq!(index, 0);
        assert_eq!(data.len(), 24);
        assert_eq!(&data[0..4], &1.0f32.to_le_bytes());

        let accessor = &accessors[0];
        assert_eq!(accessor.component_type, COMPONENT_TYPE_FLOAT);
        assert_eq!(accessor.count, 2);
        assert_eq!(accessor.accessor_type, "VEC3");
        assert_eq!(accessor.min, Some(vec![-1.0, 2.0, 0.5]));
        assert_eq!(accessor.max, Some(vec![1.0, 5.0, 3.0]));

        let view = &views[0];
        assert_eq!(view.byte_offset, Some(0));
        assert_eq!(view.byte_length, 24);
        assert_eq!(view.byte_stride, Some(12));
        assert_eq!(view.target, Some(TARGET_ARRAY_BUFFER));
    }

    #[test]
    fn test_bounds_seed_from_first_element() {
        // Magnitudes beyond 100 must still produce correct bounds.
        let mut packer = BufferPacker::new();
        packer.push_vec3(&[[250.0, -300.0, 0.0]]).unwrap();

        let (_, accessors, _) = packer.finish();
        assert_eq!(accessors[0].min, Some(vec![250.0, -300.0, 0.0]));
        assert_eq!(accessors[0].max, Some(vec![250.0, -300.0, 0.0]));
    }

    #[test]
    fn test_successive_appends_offset_and_align() {
        let mut packer = BufferPacker::new();
        packer.push_vec2(&[[0.25, 0.75]]).unwrap();
        let second = packer.push_vec4(&[[0.0, 0.5, 1.0, 1.0]]).unwrap();

        let (data, _, views) = packer.finish();
        assert_eq!(second, 1);
        assert_eq!(data.len() % 4, 0);
        assert_eq!(views[1].byte_offset, Some(8));
        assert_eq!(views[1].byte_length, 16);
        assert_eq!(views[1].byte_stride, Some(16));
    }

    #[test]
    fn test_index_stream_is_flat_scalar_u32() {
        let mut packer = BufferPacker::new();
        packer
            .push_indices(&[Triangle::new(0, 1, 2), Triangle::new(2, 1, 3)])
            .unwrap();

        let (data, accessors, views) = packer.finish();
        assert_eq!(data.len(), 24);
        assert_eq!(&data[4..8], &1u32.to_le_bytes());

        let accessor = &accessors[0];
        assert_eq!(accessor.component_type, COMPONENT_TYPE_UNSIGNED_INT);
        assert_eq!(accessor.count, 6);
        assert_eq!(accessor.accessor_type, "SCALAR");
        assert_eq!(accessor.min, Some(vec![0.0]));
        assert_eq!(accessor.max, Some(vec![3.0]));
        assert_eq!(views[0].byte_stride, None);
        assert_eq!(views[0].target, Some(TARGET_ELEMENT_ARRAY_BUFFER));
    }

    #[test]
    fn test_empty_array_has_no_bounds() {
        let mut packer = BufferPacker::new();
        packer.push_vec3(&[]).unwrap();

        let (data, accessors, _) = packer.finish();
        assert!(data.is_empty());
        assert_eq!(accessors[0].count, 0);
        assert_eq!(accessors[0].min, None);
        assert_eq!(accessors[0].max, None);
    }
}
