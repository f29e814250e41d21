use super::{SkelWriter, missing_nonessential};
use crate::error::{Result, SkelError};
use crate::model::{Attachment, AttachmentKind, BoneWeight, MeshDisplay, Skin};
use std::io::Write;

impl<W: Write> SkelWriter<W> {
    /// Writes a skin body; the caller writes the name for named skins.
    pub(crate) fn write_skin(&mut self, skin: &Skin) -> Result<()> {
        self.write_array(&skin.slots, |w, slot| {
            w.write_varint(slot.slot)?;
            w.write_array(&slot.attachments, Self::write_attachment)
        })
    }

    pub fn write_attachment(&mut self, attachment: &Attachment) -> Result<()> {
        self.write_string(attachment.placeholder.as_deref())?;
        self.write_string(attachment.name.as_deref())?;
        self.write_u8(attachment.kind.type_code())?;
        match &attachment.kind {
            AttachmentKind::Region(region) => {
                self.write_string(region.path.as_deref())?;
                self.write_f32(region.x)?;
                self.write_f32(region.y)?;
                self.write_f32(region.scale_x)?;
                self.write_f32(region.scale_y)?;
                self.write_f32(region.rotation)?;
                self.write_f32(region.width)?;
                self.write_f32(region.height)?;
                self.write_u32(region.color)
            }
            AttachmentKind::BoundingBox(bounding_box) => {
                self.write_float_array(&bounding_box.vertices)
            }
            AttachmentKind::Mesh(mesh) => {
                self.write_string(mesh.path.as_deref())?;
                self.write_float_array(&mesh.region_uvs)?;
                self.write_short_array(&mesh.triangles)?;
                self.write_float_array(&mesh.vertices)?;
                self.write_u32(mesh.color)?;
                self.write_varint(mesh.half_hull_length)?;
                self.write_mesh_display(mesh.display.as_ref())
            }
            AttachmentKind::SkinnedMesh(mesh) => {
                self.write_string(mesh.path.as_deref())?;
                self.write_float_array(&mesh.region_uvs)?;
                self.write_short_array(&mesh.triangles)?;
                self.write_varint(mesh.vertex_float_count)?;
                self.write_bone_weights(&mesh.weights, mesh.vertex_float_count)?;
                self.write_u32(mesh.color)?;
                self.write_varint(mesh.half_hull_length)?;
                self.write_mesh_display(mesh.display.as_ref())
            }
        }
    }

    /// Counts and bone indices go out as floats, as the format requires.
    ///
    /// The reader walks vertices until its float cursor reaches
    /// `vertex_float_count`, so the count must stop that walk after exactly
    /// `weights.len()` vertices. Overshooting counts are accepted.
    fn write_bone_weights(
        &mut self,
        weights: &[Vec<BoneWeight>],
        vertex_float_count: u32,
    ) -> Result<()> {
        let limit = u64::from(vertex_float_count);
        let mut cursor = 0u64;
        for bones in weights {
            if cursor >= limit {
                return Err(stale_vertex_float_count(vertex_float_count, weights.len()));
            }
            cursor += 1 + 4 * bones.len() as u64;
        }
        if cursor < limit {
            return Err(stale_vertex_float_count(vertex_float_count, weights.len()));
        }

        for bones in weights {
            self.write_f32(bones.len() as f32)?;
            for bone in bones {
                self.write_f32(bone.bone as f32)?;
                self.write_f32(bone.x)?;
                self.write_f32(bone.y)?;
                self.write_f32(bone.weight)?;
            }
        }
        Ok(())
    }

    fn write_mesh_display(&mut self, display: Option<&MeshDisplay>) -> Result<()> {
        if !self.nonessential {
            return Ok(());
        }
        let display = display.ok_or_else(|| missing_nonessential("mesh display"))?;
        self.write_varint_array(&display.edges)?;
        self.write_f32(display.width)?;
        self.write_f32(display.height)
    }
}

fn stale_vertex_float_count(count: u32, vertices: usize) -> SkelError {
    SkelError::unrepresentable(format!(
        "vertex float count {count} does not cover {vertices} weighted vertices"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SkelErrorKind;
    use crate::model::{MeshAttachment, RegionAttachment, SkinnedMeshAttachment};
    use crate::parser::SkelReader;

    fn region() -> Attachment {
        Attachment {
            placeholder: Some("head".to_string()),
            name: None,
            kind: AttachmentKind::Region(RegionAttachment {
                path: Some("heads/knight".to_string()),
                x: 1.0,
                y: -2.5,
                scale_x: 1.0,
                scale_y: 1.0,
                rotation: 90.0,
                width: 64.0,
                height: 32.0,
                color: 0xFFFFFFFF,
            }),
        }
    }

    fn skinned_mesh() -> Attachment {
        let weights = vec![
            vec![BoneWeight {
                bone: 2,
                x: 1.0,
                y: 2.0,
                weight: 1.0,
            }],
            vec![
                BoneWeight {
                    bone: 0,
                    x: 0.5,
                    y: 0.5,
                    weight: 0.25,
                },
                BoneWeight {
                    bone: 1,
                    x: -0.5,
                    y: 0.5,
                    weight: 0.75,
                },
            ],
        ];
        Attachment {
            placeholder: Some("cape".to_string()),
            name: Some("cape_alt".to_string()),
            kind: AttachmentKind::SkinnedMesh(SkinnedMeshAttachment {
                path: None,
                region_uvs: vec![0.0, 0.0, 1.0, 1.0],
                triangles: vec![0, 1, 2],
                vertex_float_count: SkinnedMeshAttachment::vertex_float_count(&weights),
                weights,
                color: 0x80808080,
                half_hull_length: 3,
                display: Some(MeshDisplay {
                    edges: vec![0, 2, 4],
                    width: 10.0,
                    height: 20.0,
                }),
            }),
        }
    }

    fn roundtrip(attachment: &Attachment, nonessential: bool) -> Attachment {
        let mut w = SkelWriter::new(Vec::new()).with_nonessential(nonessential);
        w.write_attachment(attachment).unwrap();
        let bytes = w.into_inner();

        SkelReader::new(bytes.as_slice())
            .with_nonessential(nonessential)
            .read_attachment()
            .unwrap()
    }

    #[test]
    fn test_region_roundtrip() {
        let attachment = region();
        assert_eq!(roundtrip(&attachment, false), attachment);
    }

    #[test]
    fn test_skinned_mesh_roundtrip() {
        let attachment = skinned_mesh();
        assert_eq!(roundtrip(&attachment, true), attachment);
    }

    #[test]
    fn test_stale_vertex_float_count_is_an_error() {
        let mut attachment = skinned_mesh();
        let AttachmentKind::SkinnedMesh(mesh) = &mut attachment.kind else {
            unreachable!();
        };
        let one = BoneWeight {
            bone: 0,
            x: 1.0,
            y: 1.0,
            weight: 1.0,
        };
        mesh.weights = vec![vec![one], vec![one]];
        mesh.vertex_float_count = 5;

        let mut w = SkelWriter::new(Vec::new()).with_nonessential(true);
        let err = w.write_attachment(&attachment).unwrap_err();
        assert!(matches!(
            err.kind,
            SkelErrorKind::UnrepresentableValue { .. }
        ));

        // too large a count would make the reader walk past the last vertex
        mesh_count(&mut attachment, 11);
        let mut w = SkelWriter::new(Vec::new()).with_nonessential(true);
        assert!(w.write_attachment(&attachment).is_err());

        mesh_count(&mut attachment, 0);
        let mut w = SkelWriter::new(Vec::new()).with_nonessential(true);
        assert!(w.write_attachment(&attachment).is_err());
    }

    #[test]
    fn test_overshooting_vertex_float_count_roundtrips() {
        let mut attachment = skinned_mesh();
        // exact count is 5 + 9 = 14; anything in 6..=14 ends on the last vertex
        mesh_count(&mut attachment, 7);
        assert_eq!(roundtrip(&attachment, true), attachment);
    }

    #[test]
    fn test_negative_bone_count_rewritten_as_zero() {
        let mut data = vec![0x00u8, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01];
        data.extend((-1.0f32).to_be_bytes());
        data.extend([0xAA, 0xBB, 0xCC, 0xDD, 0x00]);

        let attachment = SkelReader::new(data.as_slice()).read_attachment().unwrap();
        let AttachmentKind::SkinnedMesh(mesh) = &attachment.kind else {
            panic!("expected skinned mesh");
        };
        assert_eq!(mesh.weights, vec![Vec::<BoneWeight>::new()]);

        let mut w = SkelWriter::new(Vec::new());
        w.write_attachment(&attachment).unwrap();
        let mut expected = data.clone();
        expected[7..11].copy_from_slice(&0.0f32.to_be_bytes());
        assert_eq!(w.into_inner(), expected);
    }

    fn mesh_count(attachment: &mut Attachment, count: u32) {
        if let AttachmentKind::SkinnedMesh(mesh) = &mut attachment.kind {
            mesh.vertex_float_count = count;
        }
    }

    #[test]
    fn test_bone_count_written_as_float() {
        let mut w = SkelWriter::new(Vec::new());
        w.write_bone_weights(&[vec![BoneWeight::default(); 3]], 13)
            .unwrap();
        let bytes = w.into_inner();
        assert_eq!(&bytes[..4], 3.0f32.to_be_bytes());
        assert_eq!(bytes.len(), 4 * (1 + 3 * 4));
    }

    #[test]
    fn test_mesh_display_skipped_without_nonessential() {
        let mesh = Attachment {
            placeholder: None,
            name: None,
            kind: AttachmentKind::Mesh(MeshAttachment {
                display: Some(MeshDisplay::default()),
                ..Default::default()
            }),
        };
        let back = roundtrip(&mesh, false);
        let AttachmentKind::Mesh(back) = back.kind else {
            panic!("expected mesh");
        };
        assert_eq!(back.display, None);
    }

    #[test]
    fn test_missing_mesh_display_is_an_error() {
        let mesh = Attachment {
            placeholder: None,
            name: None,
            kind: AttachmentKind::Mesh(MeshAttachment::default()),
        };
        let mut w = SkelWriter::new(Vec::new()).with_nonessential(true);
        let err = w.write_attachment(&mesh).unwrap_err();
        assert!(matches!(
            err.kind,
            SkelErrorKind::UnrepresentableValue { .. }
        ));
    }
}
