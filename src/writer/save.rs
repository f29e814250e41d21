use super::{SkelWriter, missing_nonessential};
use crate::error::{Result, SkelError};
use crate::model::{Bone, EventData, IkConstraint, Skeleton, Slot};
use crate::parser::NULL_ARRAY;
use log::debug;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Writes `skeleton` to `path`, replacing the file. The document is encoded
/// in full before the file is touched, so an unencodable document leaves the
/// existing file intact. The absolute path is attached to every error.
pub fn write(path: impl AsRef<Path>, skeleton: &Skeleton) -> Result<()> {
    let path = path.as_ref();
    let abs_path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    write_file(&abs_path, skeleton).map_err(|e| e.with_arg("path", abs_path.display()))
}

fn write_file(path: &Path, skeleton: &Skeleton) -> Result<()> {
    let bytes = to_bytes(skeleton)?;
    fs::write(path, &bytes)?;
    debug!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

pub fn to_bytes(skeleton: &Skeleton) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    encode(&mut bytes, skeleton)?;
    Ok(bytes)
}

/// Encodes `skeleton` into a stream. `nonessential` is read once from the
/// document and governs every gated field.
pub fn encode<W: Write>(writer: W, skeleton: &Skeleton) -> Result<()> {
    let mut w = SkelWriter::new(writer).with_nonessential(skeleton.nonessential);
    w.write_skeleton(skeleton)?;
    w.into_inner().flush()?;
    Ok(())
}

impl<W: Write> SkelWriter<W> {
    pub fn write_skeleton(&mut self, skeleton: &Skeleton) -> Result<()> {
        self.write_string(skeleton.hash.as_deref())?;
        self.write_string(skeleton.version.as_deref())?;
        self.write_f32(skeleton.width)?;
        self.write_f32(skeleton.height)?;
        self.write_bool(self.nonessential)?;
        if self.nonessential {
            self.write_string(skeleton.images_path.as_deref())?;
        }

        self.write_indexed_array(&skeleton.bones, |w, _, i, bone| {
            w.write_bone(bone)
                .map_err(|e| e.with_arg("record", format!("bones[{i}]")))
        })?;
        self.write_indexed_array(&skeleton.ik_constraints, |w, _, i, ik| {
            w.write_ik_constraint(ik)
                .map_err(|e| e.with_arg("record", format!("ik_constraints[{i}]")))
        })?;
        self.write_indexed_array(&skeleton.slots, |w, _, i, slot| {
            w.write_slot(slot)
                .map_err(|e| e.with_arg("record", format!("slots[{i}]")))
        })?;
        self.write_skin(&skeleton.default_skin)
            .map_err(|e| e.with_arg("record", "default_skin"))?;
        self.write_indexed_array(&skeleton.skins, |w, _, i, skin| {
            w.write_string(skin.name.as_deref())?;
            w.write_skin(skin)
                .map_err(|e| e.with_arg("record", format!("skins[{i}]")))
        })?;
        self.write_indexed_array(&skeleton.events, |w, _, i, event| {
            w.write_event_data(event)
                .map_err(|e| e.with_arg("record", format!("events[{i}]")))
        })?;
        self.write_indexed_array(&skeleton.animations, |w, _, i, animation| {
            w.write_animation(animation)
                .map_err(|e| e.with_arg("record", format!("animations[{i}]")))
        })?;
        debug!(
            "encoded {} bones, {} slots, {} animations",
            skeleton.bones.len(),
            skeleton.slots.len(),
            skeleton.animations.len()
        );
        Ok(())
    }

    fn write_bone(&mut self, bone: &Bone) -> Result<()> {
        self.write_string(bone.name.as_deref())?;
        let parent = match bone.parent {
            Some(NULL_ARRAY) => {
                return Err(SkelError::unrepresentable(format!(
                    "bone parent {NULL_ARRAY} is reserved for root bones"
                )));
            }
            Some(parent) => parent,
            None => NULL_ARRAY,
        };
        self.write_varint(parent)?;
        self.write_f32(bone.x)?;
        self.write_f32(bone.y)?;
        self.write_f32(bone.scale_x)?;
        self.write_f32(bone.scale_y)?;
        self.write_f32(bone.rotation)?;
        self.write_f32(bone.length)?;
        self.write_bool(bone.flip_x)?;
        self.write_bool(bone.flip_y)?;
        self.write_bool(bone.inherit_scale)?;
        self.write_bool(bone.inherit_rotation)?;
        if self.nonessential {
            let color = bone.color.ok_or_else(|| missing_nonessential("bone color"))?;
            self.write_u32(color)?;
        }
        Ok(())
    }

    fn write_ik_constraint(&mut self, ik: &IkConstraint) -> Result<()> {
        self.write_string(ik.name.as_deref())?;
        self.write_varint_array(&ik.bones)?;
        self.write_varint(ik.target)?;
        self.write_f32(ik.mix)?;
        self.write_i8(ik.bend_direction)
    }

    fn write_slot(&mut self, slot: &Slot) -> Result<()> {
        self.write_string(slot.name.as_deref())?;
        self.write_varint(slot.bone)?;
        self.write_u32(slot.color)?;
        self.write_string(slot.attachment.as_deref())?;
        self.write_varint(slot.blend_mode)
    }

    fn write_event_data(&mut self, event: &EventData) -> Result<()> {
        self.write_string(event.name.as_deref())?;
        self.write_varint(event.raw_int)?;
        self.write_f32(event.float_value)?;
        self.write_string(event.string_value.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SkelErrorKind;

    #[test]
    fn test_root_parent_written_as_sentinel() {
        let mut w = SkelWriter::new(Vec::new());
        w.write_bone(&Bone::default()).unwrap();
        let bytes = w.into_inner();
        assert_eq!(&bytes[..6], [0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
        // name, parent, 6 floats, 4 flags
        assert_eq!(bytes.len(), 1 + 5 + 24 + 4);
    }

    #[test]
    fn test_root_sentinel_parent_is_rejected() {
        let skeleton = Skeleton {
            bones: vec![
                Bone::default(),
                Bone {
                    parent: Some(u32::MAX),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let err = to_bytes(&skeleton).unwrap_err();
        assert!(matches!(err.kind, SkelErrorKind::UnrepresentableValue { .. }));
        assert_eq!(err.arg("record"), Some("bones[1]"));

        let mut w = SkelWriter::new(Vec::new());
        w.write_bone(&Bone {
            parent: Some(u32::MAX - 1),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(&w.into_inner()[1..6], [0xFE, 0xFF, 0xFF, 0xFF, 0x0F]);
    }

    #[test]
    fn test_bone_color_follows_nonessential() {
        let bone = Bone {
            color: Some(0x11223344),
            ..Default::default()
        };

        let mut w = SkelWriter::new(Vec::new()).with_nonessential(true);
        w.write_bone(&bone).unwrap();
        let bytes = w.into_inner();
        assert_eq!(bytes[bytes.len() - 4..], [0x11, 0x22, 0x33, 0x44]);

        let mut w = SkelWriter::new(Vec::new());
        w.write_bone(&bone).unwrap();
        assert_eq!(w.into_inner().len(), bytes.len() - 4);
    }

    #[test]
    fn test_missing_bone_color_names_the_bone() {
        let skeleton = Skeleton {
            nonessential: true,
            bones: vec![
                Bone {
                    color: Some(0),
                    ..Default::default()
                },
                Bone::default(),
            ],
            ..Default::default()
        };
        let err = to_bytes(&skeleton).unwrap_err();
        assert!(matches!(err.kind, SkelErrorKind::UnrepresentableValue { .. }));
        assert_eq!(err.arg("record"), Some("bones[1]"));
    }
}
