use super::skeleton::zigzag_decode;
use serde::{Deserialize, Serialize};

pub const TIMELINE_SCALE: u8 = 0;
pub const TIMELINE_ROTATE: u8 = 1;
pub const TIMELINE_TRANSLATE: u8 = 2;
pub const TIMELINE_ATTACHMENT: u8 = 3;
pub const TIMELINE_COLOR: u8 = 4;
pub const TIMELINE_FLIP_X: u8 = 5;
pub const TIMELINE_FLIP_Y: u8 = 6;

pub const CURVE_LINEAR: u8 = 0;
pub const CURVE_STEPPED: u8 = 1;
pub const CURVE_BEZIER: u8 = 2;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub name: Option<String>,
    pub slots: Vec<SlotTimelines>,
    pub bones: Vec<BoneTimelines>,
    pub ik: Vec<IkTimeline>,
    pub ffd: Vec<FfdSkin>,
    /// `None` and `Some(vec![])` are different on the wire.
    pub draw_order: Option<Vec<DrawOrderFrame>>,
    /// `None` and `Some(vec![])` are different on the wire.
    pub events: Option<Vec<EventFrame>>,
}

impl Animation {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Interpolation towards the next keyframe. Never stored on the last frame
/// of a timeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum Curve {
    #[default]
    Linear,
    Stepped,
    Bezier {
        cx1: f32,
        cy1: f32,
        cx2: f32,
        cy2: f32,
    },
    /// Type byte outside 0..=2, kept verbatim.
    Unknown(u8),
}

impl Curve {
    pub fn type_code(&self) -> u8 {
        match *self {
            Curve::Linear => CURVE_LINEAR,
            Curve::Stepped => CURVE_STEPPED,
            Curve::Bezier { .. } => CURVE_BEZIER,
            Curve::Unknown(code) => code,
        }
    }
}

/// Frame `index` of `count` carries a curve unless it is the last one.
pub fn has_curve(count: usize, index: usize) -> bool {
    index + 1 < count
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotTimelines {
    pub slot: u32,
    pub timelines: Vec<SlotTimeline>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "frames")]
pub enum SlotTimeline {
    Attachment(Vec<AttachmentFrame>),
    Color(Vec<ColorFrame>),
}

impl SlotTimeline {
    pub fn type_code(&self) -> u8 {
        match self {
            Self::Attachment(_) => TIMELINE_ATTACHMENT,
            Self::Color(_) => TIMELINE_COLOR,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttachmentFrame {
    pub time: f32,
    pub attachment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorFrame {
    pub time: f32,
    pub color: u32,
    pub curve: Option<Curve>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoneTimelines {
    pub bone: u32,
    pub timelines: Vec<BoneTimeline>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "frames")]
pub enum BoneTimeline {
    Scale(Vec<TranslateFrame>),
    Rotate(Vec<RotateFrame>),
    Translate(Vec<TranslateFrame>),
    FlipX(Vec<FlipFrame>),
    FlipY(Vec<FlipFrame>),
}

impl BoneTimeline {
    pub fn type_code(&self) -> u8 {
        match self {
            Self::Scale(_) => TIMELINE_SCALE,
            Self::Rotate(_) => TIMELINE_ROTATE,
            Self::Translate(_) => TIMELINE_TRANSLATE,
            Self::FlipX(_) => TIMELINE_FLIP_X,
            Self::FlipY(_) => TIMELINE_FLIP_Y,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RotateFrame {
    pub time: f32,
    pub angle: f32,
    pub curve: Option<Curve>,
}

/// Shared by scale and translate timelines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslateFrame {
    pub time: f32,
    pub x: f32,
    pub y: f32,
    pub curve: Option<Curve>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlipFrame {
    pub time: f32,
    pub flip: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IkTimeline {
    pub ik: u32,
    pub frames: Vec<IkFrame>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IkFrame {
    pub time: f32,
    pub mix: f32,
    pub bend_direction: i8,
    pub curve: Option<Curve>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FfdSkin {
    pub skin: u32,
    pub slots: Vec<FfdSlot>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FfdSlot {
    pub slot: u32,
    pub timelines: Vec<FfdTimeline>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FfdTimeline {
    pub attachment: Option<String>,
    pub frames: Vec<FfdFrame>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FfdFrame {
    pub time: f32,
    /// `None` when the frame restores the setup pose (`end == 0` on the wire).
    pub deform: Option<FfdDeform>,
    pub curve: Option<Curve>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FfdDeform {
    pub start: u32,
    /// Never empty; the wire length doubles as the presence flag.
    pub offsets: Vec<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawOrderFrame {
    pub offsets: Vec<DrawOrderOffset>,
    pub time: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawOrderOffset {
    pub slot: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventFrame {
    pub time: f32,
    pub event: u32,
    /// Zig-zag encoded; see [`EventFrame::int_value`].
    pub raw_int: u32,
    pub float_value: f32,
    /// When false, `string_value` is not written.
    pub has_string_value: bool,
    pub string_value: Option<String>,
}

impl EventFrame {
    pub fn int_value(&self) -> i32 {
        zigzag_decode(self.raw_int)
    }
}
