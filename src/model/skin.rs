use serde::{Deserialize, Serialize};

pub const ATTACHMENT_REGION: u8 = 0;
pub const ATTACHMENT_BOUNDING_BOX: u8 = 1;
pub const ATTACHMENT_MESH: u8 = 2;
pub const ATTACHMENT_SKINNED_MESH: u8 = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skin {
    /// Always `None` for the default skin, which has no name on the wire.
    pub name: Option<String>,
    pub slots: Vec<SkinSlot>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkinSlot {
    pub slot: u32,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    /// Key the slot refers to the attachment by.
    pub placeholder: Option<String>,
    /// Real attachment name; a null name means "same as placeholder".
    pub name: Option<String>,
    pub kind: AttachmentKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AttachmentKind {
    Region(RegionAttachment),
    BoundingBox(BoundingBoxAttachment),
    Mesh(MeshAttachment),
    SkinnedMesh(SkinnedMeshAttachment),
}

impl AttachmentKind {
    pub fn type_code(&self) -> u8 {
        match self {
            Self::Region(_) => ATTACHMENT_REGION,
            Self::BoundingBox(_) => ATTACHMENT_BOUNDING_BOX,
            Self::Mesh(_) => ATTACHMENT_MESH,
            Self::SkinnedMesh(_) => ATTACHMENT_SKINNED_MESH,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Region(_) => "Region",
            Self::BoundingBox(_) => "BoundingBox",
            Self::Mesh(_) => "Mesh",
            Self::SkinnedMesh(_) => "SkinnedMesh",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionAttachment {
    pub path: Option<String>,
    pub x: f32,
    pub y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub rotation: f32,
    pub width: f32,
    pub height: f32,
    pub color: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBoxAttachment {
    pub vertices: Vec<f32>,
}

/// Authoring-only mesh data, present iff the skeleton is nonessential.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshDisplay {
    pub edges: Vec<u32>,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshAttachment {
    pub path: Option<String>,
    pub region_uvs: Vec<f32>,
    pub triangles: Vec<i16>,
    pub vertices: Vec<f32>,
    pub color: u32,
    /// The file stores half of the hull length.
    pub half_hull_length: u32,
    pub display: Option<MeshDisplay>,
}

impl MeshAttachment {
    pub fn hull_length(&self) -> u64 {
        u64::from(self.half_hull_length) * 2
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoneWeight {
    /// Stored on the wire as a float and truncated on read. A fractional
    /// index in the file comes back as its truncated value when written, so
    /// those bytes do not survive a round trip.
    pub bone: i32,
    pub x: f32,
    pub y: f32,
    pub weight: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkinnedMeshAttachment {
    pub path: Option<String>,
    pub region_uvs: Vec<f32>,
    pub triangles: Vec<i16>,
    /// Raw float count of the weight block: every vertex contributes one
    /// float for its bone count plus four per bone. Drives the read loop.
    pub vertex_float_count: u32,
    /// Bones influencing each vertex. The per-vertex count is written as a
    /// float equal to the inner length. Counts the file stored as `-1.0`,
    /// `-0.0` or `2.5` read as 0, 0 and 2 bones and are rewritten as those
    /// integers, so the round trip is lossy for such files.
    pub weights: Vec<Vec<BoneWeight>>,
    pub color: u32,
    /// The file stores half of the hull length.
    pub half_hull_length: u32,
    pub display: Option<MeshDisplay>,
}

impl SkinnedMeshAttachment {
    pub fn hull_length(&self) -> u64 {
        u64::from(self.half_hull_length) * 2
    }

    /// Value of `vertex_float_count` that makes `weights` read back unchanged.
    pub fn vertex_float_count(weights: &[Vec<BoneWeight>]) -> u32 {
        weights
            .iter()
            .map(|bones| 1 + 4 * bones.len() as u32)
            .sum()
    }
}
