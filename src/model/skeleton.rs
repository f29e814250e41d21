use super::{Animation, Skin};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Whole `.skel` document.
///
/// `path`, `owner` and `ident` come from the file name when the document is
/// read from disk and are never written into the payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skeleton {
    #[serde(skip)]
    pub path: Option<PathBuf>,
    #[serde(skip)]
    pub owner: Option<String>,
    #[serde(skip)]
    pub ident: Option<String>,

    pub hash: Option<String>,
    pub version: Option<String>,
    pub width: f32,
    pub height: f32,
    /// Gates every cosmetic field in the file: `images_path`, bone colors and
    /// the mesh display trailer.
    pub nonessential: bool,
    pub images_path: Option<String>,
    pub bones: Vec<Bone>,
    pub ik_constraints: Vec<IkConstraint>,
    pub slots: Vec<Slot>,
    /// Stored without a name in the file.
    pub default_skin: Skin,
    pub skins: Vec<Skin>,
    pub events: Vec<EventData>,
    pub animations: Vec<Animation>,
}

impl Skeleton {
    pub fn animation_names(&self) -> Vec<Option<&str>> {
        self.animations.iter().map(Animation::name).collect()
    }

    pub fn find_animation(&self, name: &str) -> Option<&Animation> {
        self.animations.iter().find(|a| a.name() == Some(name))
    }

    /// Renames the first animation called `old`. Returns false when there is
    /// no such animation.
    pub fn rename_animation(&mut self, old: &str, new: impl Into<String>) -> bool {
        match self.animations.iter_mut().find(|a| a.name() == Some(old)) {
            Some(animation) => {
                animation.name = Some(new.into());
                true
            }
            None => false,
        }
    }

    pub fn rename_animation_at(&mut self, index: usize, new: impl Into<String>) -> bool {
        match self.animations.get_mut(index) {
            Some(animation) => {
                animation.name = Some(new.into());
                true
            }
            None => false,
        }
    }

    /// Inserts a copy of the animation at `index` right after it and returns
    /// the copy's index.
    pub fn duplicate_animation(&mut self, index: usize) -> Option<usize> {
        let copy = self.animations.get(index)?.clone();
        self.animations.insert(index + 1, copy);
        Some(index + 1)
    }

    /// Swaps the animation at `index` with its neighbour and returns its new
    /// index. `None` when out of range or already at that end of the list.
    pub fn move_animation(&mut self, index: usize, direction: MoveDirection) -> Option<usize> {
        if index >= self.animations.len() {
            return None;
        }
        let target = match direction {
            MoveDirection::Up => index.checked_sub(1)?,
            MoveDirection::Down => Some(index + 1).filter(|&i| i < self.animations.len())?,
        };
        self.animations.swap(index, target);
        Some(target)
    }

    pub fn remove_animation(&mut self, index: usize) -> Option<Animation> {
        (index < self.animations.len()).then(|| self.animations.remove(index))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    pub name: Option<String>,
    /// `None` for a root bone.
    pub parent: Option<u32>,
    pub x: f32,
    pub y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub rotation: f32,
    pub length: f32,
    pub flip_x: bool,
    pub flip_y: bool,
    pub inherit_scale: bool,
    pub inherit_rotation: bool,
    /// Only stored in nonessential files.
    pub color: Option<u32>,
}

impl Default for Bone {
    fn default() -> Self {
        Self {
            name: None,
            parent: None,
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            length: 0.0,
            flip_x: false,
            flip_y: false,
            inherit_scale: true,
            inherit_rotation: true,
            color: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IkConstraint {
    pub name: Option<String>,
    pub bones: Vec<u32>,
    pub target: u32,
    pub mix: f32,
    pub bend_direction: i8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub name: Option<String>,
    pub bone: u32,
    pub color: u32,
    pub attachment: Option<String>,
    pub blend_mode: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    pub name: Option<String>,
    /// Zig-zag encoded on the wire and kept that way; see [`EventData::int_value`].
    pub raw_int: u32,
    pub float_value: f32,
    pub string_value: Option<String>,
}

impl EventData {
    pub fn int_value(&self) -> i32 {
        zigzag_decode(self.raw_int)
    }
}

pub(crate) fn zigzag_decode(raw: u32) -> i32 {
    ((raw >> 1) as i32) ^ -((raw & 1) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Animation {
        Animation {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_zigzag_decode() {
        assert_eq!(zigzag_decode(0), 0);
        assert_eq!(zigzag_decode(1), -1);
        assert_eq!(zigzag_decode(2), 1);
        assert_eq!(zigzag_decode(3), -2);
        assert_eq!(zigzag_decode(u32::MAX), i32::MIN);
    }

    #[test]
    fn test_rename_animation() {
        let mut skeleton = Skeleton {
            animations: vec![named("idle"), named("attack"), named("idle")],
            ..Default::default()
        };

        assert!(skeleton.rename_animation("idle", "rest"));
        assert_eq!(
            skeleton.animation_names(),
            vec![Some("rest"), Some("attack"), Some("idle")]
        );
        assert!(!skeleton.rename_animation("walk", "run"));
        assert!(skeleton.find_animation("attack").is_some());
        assert!(skeleton.find_animation("walk").is_none());
    }

    #[test]
    fn test_edit_animations_by_index() {
        let mut skeleton = Skeleton {
            animations: vec![named("idle"), named("attack"), named("walk")],
            ..Default::default()
        };

        assert_eq!(skeleton.duplicate_animation(1), Some(2));
        assert_eq!(
            skeleton.animation_names(),
            vec![Some("idle"), Some("attack"), Some("attack"), Some("walk")]
        );
        assert!(skeleton.rename_animation_at(2, "attack_alt"));
        assert!(!skeleton.rename_animation_at(4, "nope"));

        assert_eq!(skeleton.move_animation(0, MoveDirection::Up), None);
        assert_eq!(skeleton.move_animation(3, MoveDirection::Down), None);
        assert_eq!(skeleton.move_animation(4, MoveDirection::Up), None);
        assert_eq!(skeleton.move_animation(3, MoveDirection::Up), Some(2));
        assert_eq!(skeleton.move_animation(0, MoveDirection::Down), Some(1));
        assert_eq!(
            skeleton.animation_names(),
            vec![Some("attack"), Some("idle"), Some("walk"), Some("attack_alt")]
        );

        assert_eq!(skeleton.remove_animation(4), None);
        let removed = skeleton.remove_animation(1).unwrap();
        assert_eq!(removed.name(), Some("idle"));
        assert_eq!(
            skeleton.animation_names(),
            vec![Some("attack"), Some("walk"), Some("attack_alt")]
        );
        assert_eq!(skeleton.duplicate_animation(3), None);
    }
}
