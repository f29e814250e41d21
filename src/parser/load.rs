use super::{NULL_ARRAY, SkelReader};
use crate::error::{Result, SkelError, SkelErrorKind};
use crate::model::{Bone, EventData, IkConstraint, Skeleton, Slot};
use log::debug;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

const FILE_NAME_PATTERN: &str = "{owner}.sprite.{ident}.skel";

/// Reads a `{owner}.sprite.{ident}.skel` file. The absolute path is attached
/// to every error.
pub fn read(path: impl AsRef<Path>) -> Result<Skeleton> {
    let path = path.as_ref();
    let abs_path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    read_file(&abs_path).map_err(|e| e.with_arg("path", abs_path.display()))
}

fn read_file(path: &Path) -> Result<Skeleton> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (owner, ident) = parse_file_name(&file_name)?;

    let file = File::open(path)?;
    let mut skeleton = decode(BufReader::new(file))?;
    debug!(
        "loaded {}: {} bones, {} slots, {} animations",
        file_name,
        skeleton.bones.len(),
        skeleton.slots.len(),
        skeleton.animations.len()
    );
    skeleton.path = Some(path.to_path_buf());
    skeleton.owner = Some(owner);
    skeleton.ident = Some(ident);
    Ok(skeleton)
}

/// Splits a file name of the form `{owner}.sprite.{ident}.skel`.
///
/// Matches the first place in the name where a dot-free owner is followed by
/// `.sprite.`; the ident runs up to the last `.skel` after it. Unlike a
/// `([^.]+)\.sprite\.(.*)\.skel` regex, line terminators are accepted in
/// the ident.
pub fn parse_file_name(name: &str) -> Result<(String, String)> {
    let mut start = 0;
    for (dot, _) in name.match_indices('.') {
        let owner = &name[start..dot];
        start = dot + 1;
        if owner.is_empty() {
            continue;
        }
        let Some(rest) = name[dot..].strip_prefix(".sprite.") else {
            continue;
        };
        if let Some(end) = rest.rfind(".skel") {
            return Ok((owner.to_string(), rest[..end].to_string()));
        }
    }
    Err(SkelError::new(SkelErrorKind::InvalidFilename {
        expected: FILE_NAME_PATTERN,
        actual: name.to_string(),
    }))
}

pub fn from_bytes(bytes: &[u8]) -> Result<Skeleton> {
    decode(bytes)
}

/// Decodes a document from a stream. Bytes after the last animation are left
/// unread.
pub fn decode<R: Read>(reader: R) -> Result<Skeleton> {
    SkelReader::new(reader).read_skeleton()
}

impl<R: Read> SkelReader<R> {
    pub fn read_skeleton(&mut self) -> Result<Skeleton> {
        let hash = self.read_string()?;
        let version = self.read_string()?;
        let width = self.read_f32()?;
        let height = self.read_f32()?;
        self.nonessential = self.read_bool()?;
        let images_path = if self.nonessential {
            self.read_string()?
        } else {
            None
        };
        debug!("header: version {version:?}, nonessential {}", self.nonessential);

        let bones = self.read_array(Self::read_bone).map_err(|e| e.with_arg("record", "bones"))?;
        let ik_constraints = self
            .read_array(Self::read_ik_constraint)
            .map_err(|e| e.with_arg("record", "ik_constraints"))?;
        let slots = self.read_array(Self::read_slot).map_err(|e| e.with_arg("record", "slots"))?;
        let default_skin = self
            .read_skin(None)
            .map_err(|e| e.with_arg("record", "default_skin"))?;
        let skins = self
            .read_indexed_array(|r, _, i| {
                let name = r.read_string()?;
                r.read_skin(name)
                    .map_err(|e| e.with_arg("record", format!("skins[{i}]")))
            })
            .map_err(|e| e.with_arg("record", "skins"))?;
        let events = self
            .read_array(Self::read_event_data)
            .map_err(|e| e.with_arg("record", "events"))?;
        let animations = self
            .read_indexed_array(|r, _, i| {
                r.read_animation()
                    .map_err(|e| e.with_arg("record", format!("animations[{i}]")))
            })
            .map_err(|e| e.with_arg("record", "animations"))?;
        debug!(
            "read {} skins, {} events, {} animations",
            skins.len() + 1,
            events.len(),
            animations.len()
        );

        Ok(Skeleton {
            path: None,
            owner: None,
            ident: None,
            hash,
            version,
            width,
            height,
            nonessential: self.nonessential,
            images_path,
            bones,
            ik_constraints,
            slots,
            default_skin,
            skins,
            events,
            animations,
        })
    }

    fn read_bone(&mut self) -> Result<Bone> {
        let name = self.read_string()?;
        let parent = match self.read_varint()? {
            NULL_ARRAY => None,
            index => Some(index),
        };
        Ok(Bone {
            name,
            parent,
            x: self.read_f32()?,
            y: self.read_f32()?,
            scale_x: self.read_f32()?,
            scale_y: self.read_f32()?,
            rotation: self.read_f32()?,
            length: self.read_f32()?,
            flip_x: self.read_bool()?,
            flip_y: self.read_bool()?,
            inherit_scale: self.read_bool()?,
            inherit_rotation: self.read_bool()?,
            color: if self.nonessential {
                Some(self.read_u32()?)
            } else {
                None
            },
        })
    }

    fn read_ik_constraint(&mut self) -> Result<IkConstraint> {
        Ok(IkConstraint {
            name: self.read_string()?,
            bones: self.read_varint_array()?,
            target: self.read_varint()?,
            mix: self.read_f32()?,
            bend_direction: self.read_i8()?,
        })
    }

    fn read_slot(&mut self) -> Result<Slot> {
        Ok(Slot {
            name: self.read_string()?,
            bone: self.read_varint()?,
            color: self.read_u32()?,
            attachment: self.read_string()?,
            blend_mode: self.read_varint()?,
        })
    }

    fn read_event_data(&mut self) -> Result<EventData> {
        Ok(EventData {
            name: self.read_string()?,
            raw_int: self.read_varint()?,
            float_value: self.read_f32()?,
            string_value: self.read_string()?,
        })
    }
}
