use super::SkelReader;
use crate::error::{Result, SkelError};
use crate::model::{
    ATTACHMENT_BOUNDING_BOX, ATTACHMENT_MESH, ATTACHMENT_REGION, ATTACHMENT_SKINNED_MESH,
    Attachment, AttachmentKind, BoneWeight, BoundingBoxAttachment, MeshAttachment, MeshDisplay,
    RegionAttachment, Skin, SkinSlot, SkinnedMeshAttachment,
};
use std::io::Read;

impl<R: Read> SkelReader<R> {
    /// Reads a skin body; the name (if any) has already been consumed.
    pub(crate) fn read_skin(&mut self, name: Option<String>) -> Result<Skin> {
        let slots = self.read_array(|r| {
            let slot = r.read_varint()?;
            let attachments = r.read_array(Self::read_attachment)?;
            Ok(SkinSlot { slot, attachments })
        })?;
        Ok(Skin { name, slots })
    }

    pub fn read_attachment(&mut self) -> Result<Attachment> {
        let placeholder = self.read_string()?;
        let name = self.read_string()?;
        let kind = match self.read_u8()? {
            ATTACHMENT_REGION => AttachmentKind::Region(RegionAttachment {
                path: self.read_string()?,
                x: self.read_f32()?,
                y: self.read_f32()?,
                scale_x: self.read_f32()?,
                scale_y: self.read_f32()?,
                rotation: self.read_f32()?,
                width: self.read_f32()?,
                height: self.read_f32()?,
                color: self.read_u32()?,
            }),
            ATTACHMENT_BOUNDING_BOX => AttachmentKind::BoundingBox(BoundingBoxAttachment {
                vertices: self.read_float_array()?,
            }),
            ATTACHMENT_MESH => AttachmentKind::Mesh(MeshAttachment {
                path: self.read_string()?,
                region_uvs: self.read_float_array()?,
                triangles: self.read_short_array()?,
                vertices: self.read_float_array()?,
                color: self.read_u32()?,
                half_hull_length: self.read_varint()?,
                display: self.read_mesh_display()?,
            }),
            ATTACHMENT_SKINNED_MESH => {
                let path = self.read_string()?;
                let region_uvs = self.read_float_array()?;
                let triangles = self.read_short_array()?;
                let vertex_float_count = self.read_varint()?;
                let weights = self.read_bone_weights(vertex_float_count)?;
                AttachmentKind::SkinnedMesh(SkinnedMeshAttachment {
                    path,
                    region_uvs,
                    triangles,
                    vertex_float_count,
                    weights,
                    color: self.read_u32()?,
                    half_hull_length: self.read_varint()?,
                    display: self.read_mesh_display()?,
                })
            }
            other => {
                return Err(SkelError::unexpected_type("attachment", "{0,1,2,3}", other));
            }
        };
        Ok(Attachment {
            placeholder,
            name,
            kind,
        })
    }

    /// Walks the weight block. Each vertex starts with its bone count stored
    /// as a float; the cursor advances one float for the count and four per
    /// bone until it reaches the raw float count.
    fn read_bone_weights(&mut self, vertex_float_count: u32) -> Result<Vec<Vec<BoneWeight>>> {
        let mut weights = Vec::new();
        let mut cursor = 0u64;
        while cursor < u64::from(vertex_float_count) {
            let bone_count = self.read_f32()? as i32;
            let mut bones = Vec::new();
            for _ in 0..bone_count {
                bones.push(BoneWeight {
                    bone: self.read_f32()? as i32,
                    x: self.read_f32()?,
                    y: self.read_f32()?,
                    weight: self.read_f32()?,
                });
            }
            cursor += 1 + 4 * bones.len() as u64;
            weights.push(bones);
        }
        Ok(weights)
    }

    fn read_mesh_display(&mut self) -> Result<Option<MeshDisplay>> {
        if !self.nonessential {
            return Ok(None);
        }
        Ok(Some(MeshDisplay {
            edges: self.read_varint_array()?,
            width: self.read_f32()?,
            height: self.read_f32()?,
        }))
    }
}
