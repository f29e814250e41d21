use super::SkelReader;
use crate::error::{Result, SkelError};
use crate::model::{
    Animation, AttachmentFrame, BoneTimeline, BoneTimelines, CURVE_BEZIER, CURVE_LINEAR,
    CURVE_STEPPED, ColorFrame, Curve, DrawOrderFrame, DrawOrderOffset, EventFrame, FfdDeform,
    FfdFrame, FfdSkin, FfdSlot, FfdTimeline, FlipFrame, IkFrame, IkTimeline, RotateFrame,
    SlotTimeline, SlotTimelines, TIMELINE_ATTACHMENT, TIMELINE_COLOR, TIMELINE_FLIP_X,
    TIMELINE_FLIP_Y, TIMELINE_ROTATE, TIMELINE_SCALE, TIMELINE_TRANSLATE, TranslateFrame,
    has_curve,
};
use log::trace;
use std::io::Read;

impl<R: Read> SkelReader<R> {
    pub fn read_animation(&mut self) -> Result<Animation> {
        let name = self.read_string()?;
        trace!("reading animation {name:?}");
        let with_section = |section: &'static str| {
            move |e: SkelError| e.with_arg("section", section)
        };

        let slots = self
            .read_array(|r| {
                let slot = r.read_varint()?;
                let timelines = r.read_array(Self::read_slot_timeline)?;
                Ok(SlotTimelines { slot, timelines })
            })
            .map_err(with_section("slots"))?;
        let bones = self
            .read_array(|r| {
                let bone = r.read_varint()?;
                let timelines = r.read_array(Self::read_bone_timeline)?;
                Ok(BoneTimelines { bone, timelines })
            })
            .map_err(with_section("bones"))?;
        let ik = self
            .read_array(Self::read_ik_timeline)
            .map_err(with_section("ik"))?;
        let ffd = self
            .read_array(|r| {
                let skin = r.read_varint()?;
                let slots = r.read_array(|r| {
                    let slot = r.read_varint()?;
                    let timelines = r.read_array(Self::read_ffd_timeline)?;
                    Ok(FfdSlot { slot, timelines })
                })?;
                Ok(FfdSkin { skin, slots })
            })
            .map_err(with_section("ffd"))?;
        let draw_order = self
            .read_nullable_array(Self::read_draw_order_frame)
            .map_err(with_section("draw_order"))?;
        let events = self
            .read_nullable_array(Self::read_event_frame)
            .map_err(with_section("events"))?;

        Ok(Animation {
            name,
            slots,
            bones,
            ik,
            ffd,
            draw_order,
            events,
        })
    }

    pub fn read_slot_timeline(&mut self) -> Result<SlotTimeline> {
        match self.read_u8()? {
            TIMELINE_COLOR => Ok(SlotTimeline::Color(self.read_indexed_array(
                |r, n, i| {
                    Ok(ColorFrame {
                        time: r.read_f32()?,
                        color: r.read_u32()?,
                        curve: r.read_curve_at(n, i)?,
                    })
                },
            )?)),
            TIMELINE_ATTACHMENT => Ok(SlotTimeline::Attachment(self.read_array(|r| {
                Ok(AttachmentFrame {
                    time: r.read_f32()?,
                    attachment: r.read_string()?,
                })
            })?)),
            other => Err(SkelError::unexpected_type("slot timeline", "{3,4}", other)),
        }
    }

    pub fn read_bone_timeline(&mut self) -> Result<BoneTimeline> {
        match self.read_u8()? {
            TIMELINE_ROTATE => Ok(BoneTimeline::Rotate(self.read_indexed_array(
                |r, n, i| {
                    Ok(RotateFrame {
                        time: r.read_f32()?,
                        angle: r.read_f32()?,
                        curve: r.read_curve_at(n, i)?,
                    })
                },
            )?)),
            TIMELINE_TRANSLATE => Ok(BoneTimeline::Translate(
                self.read_indexed_array(Self::read_translate_frame)?,
            )),
            TIMELINE_SCALE => Ok(BoneTimeline::Scale(
                self.read_indexed_array(Self::read_translate_frame)?,
            )),
            TIMELINE_FLIP_X => Ok(BoneTimeline::FlipX(self.read_array(Self::read_flip_frame)?)),
            TIMELINE_FLIP_Y => Ok(BoneTimeline::FlipY(self.read_array(Self::read_flip_frame)?)),
            other => Err(SkelError::unexpected_type(
                "bone timeline",
                "{0,1,2,5,6}",
                other,
            )),
        }
    }

    fn read_translate_frame(&mut self, n: usize, i: usize) -> Result<TranslateFrame> {
        Ok(TranslateFrame {
            time: self.read_f32()?,
            x: self.read_f32()?,
            y: self.read_f32()?,
            curve: self.read_curve_at(n, i)?,
        })
    }

    fn read_flip_frame(&mut self) -> Result<FlipFrame> {
        Ok(FlipFrame {
            time: self.read_f32()?,
            flip: self.read_bool()?,
        })
    }

    pub fn read_ik_timeline(&mut self) -> Result<IkTimeline> {
        let ik = self.read_varint()?;
        let frames = self.read_indexed_array(|r, n, i| {
            Ok(IkFrame {
                time: r.read_f32()?,
                mix: r.read_f32()?,
                bend_direction: r.read_i8()?,
                curve: r.read_curve_at(n, i)?,
            })
        })?;
        Ok(IkTimeline { ik, frames })
    }

    pub fn read_ffd_timeline(&mut self) -> Result<FfdTimeline> {
        let attachment = self.read_string()?;
        let frames = self.read_indexed_array(|r, n, i| {
            let time = r.read_f32()?;
            let end = r.read_varint()?;
            let deform = if end != 0 {
                let start = r.read_varint()?;
                let offsets = r.read_floats(end as usize)?;
                Some(FfdDeform { start, offsets })
            } else {
                None
            };
            Ok(FfdFrame {
                time,
                deform,
                curve: r.read_curve_at(n, i)?,
            })
        })?;
        Ok(FfdTimeline { attachment, frames })
    }

    fn read_draw_order_frame(&mut self) -> Result<DrawOrderFrame> {
        let offsets = self.read_array(|r| {
            Ok(DrawOrderOffset {
                slot: r.read_varint()?,
                offset: r.read_varint()?,
            })
        })?;
        Ok(DrawOrderFrame {
            offsets,
            time: self.read_f32()?,
        })
    }

    fn read_event_frame(&mut self) -> Result<EventFrame> {
        let time = self.read_f32()?;
        let event = self.read_varint()?;
        let raw_int = self.read_varint()?;
        let float_value = self.read_f32()?;
        let has_string_value = self.read_bool()?;
        let string_value = if has_string_value {
            self.read_string()?
        } else {
            None
        };
        Ok(EventFrame {
            time,
            event,
            raw_int,
            float_value,
            has_string_value,
            string_value,
        })
    }

    /// Curve trailer of frame `i` out of `n`; the last frame has none.
    fn read_curve_at(&mut self, n: usize, i: usize) -> Result<Option<Curve>> {
        if !has_curve(n, i) {
            return Ok(None);
        }
        self.read_curve().map(Some)
    }

    pub fn read_curve(&mut self) -> Result<Curve> {
        Ok(match self.read_u8()? {
            CURVE_LINEAR => Curve::Linear,
            CURVE_STEPPED => Curve::Stepped,
            CURVE_BEZIER => Curve::Bezier {
                cx1: self.read_f32()?,
                cy1: self.read_f32()?,
                cx2: self.read_f32()?,
                cy2: self.read_f32()?,
            },
            other => Curve::Unknown(other),
        })
    }
}
