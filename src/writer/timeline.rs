use super::SkelWriter;
use crate::error::{Result, SkelError};
use crate::model::{
    Animation, BoneTimeline, CURVE_BEZIER, Curve, DrawOrderFrame, EventFrame, FfdTimeline,
    FlipFrame, IkTimeline, SlotTimeline, TranslateFrame, has_curve,
};
use log::trace;
use std::io::Write;

impl<W: Write> SkelWriter<W> {
    pub fn write_animation(&mut self, animation: &Animation) -> Result<()> {
        trace!("writing animation {:?}", animation.name);
        let with_section = |section: &'static str| {
            move |e: SkelError| e.with_arg("section", section)
        };

        self.write_string(animation.name.as_deref())?;
        self.write_array(&animation.slots, |w, slot| {
            w.write_varint(slot.slot)?;
            w.write_array(&slot.timelines, Self::write_slot_timeline)
        })
        .map_err(with_section("slots"))?;
        self.write_array(&animation.bones, |w, bone| {
            w.write_varint(bone.bone)?;
            w.write_array(&bone.timelines, Self::write_bone_timeline)
        })
        .map_err(with_section("bones"))?;
        self.write_array(&animation.ik, Self::write_ik_timeline)
            .map_err(with_section("ik"))?;
        self.write_array(&animation.ffd, |w, skin| {
            w.write_varint(skin.skin)?;
            w.write_array(&skin.slots, |w, slot| {
                w.write_varint(slot.slot)?;
                w.write_array(&slot.timelines, Self::write_ffd_timeline)
            })
        })
        .map_err(with_section("ffd"))?;
        self.write_nullable_array(animation.draw_order.as_deref(), Self::write_draw_order_frame)
            .map_err(with_section("draw_order"))?;
        self.write_nullable_array(animation.events.as_deref(), Self::write_event_frame)
            .map_err(with_section("events"))
    }

    pub fn write_slot_timeline(&mut self, timeline: &SlotTimeline) -> Result<()> {
        self.write_u8(timeline.type_code())?;
        match timeline {
            SlotTimeline::Color(frames) => self.write_indexed_array(frames, |w, n, i, frame| {
                w.write_f32(frame.time)?;
                w.write_u32(frame.color)?;
                w.write_curve_at(n, i, frame.curve.as_ref())
            }),
            SlotTimeline::Attachment(frames) => self.write_array(frames, |w, frame| {
                w.write_f32(frame.time)?;
                w.write_string(frame.attachment.as_deref())
            }),
        }
    }

    pub fn write_bone_timeline(&mut self, timeline: &BoneTimeline) -> Result<()> {
        self.write_u8(timeline.type_code())?;
        match timeline {
            BoneTimeline::Rotate(frames) => self.write_indexed_array(frames, |w, n, i, frame| {
                w.write_f32(frame.time)?;
                w.write_f32(frame.angle)?;
                w.write_curve_at(n, i, frame.curve.as_ref())
            }),
            BoneTimeline::Translate(frames) | BoneTimeline::Scale(frames) => {
                self.write_indexed_array(frames, Self::write_translate_frame)
            }
            BoneTimeline::FlipX(frames) | BoneTimeline::FlipY(frames) => {
                self.write_array(frames, Self::write_flip_frame)
            }
        }
    }

    fn write_translate_frame(&mut self, n: usize, i: usize, frame: &TranslateFrame) -> Result<()> {
        self.write_f32(frame.time)?;
        self.write_f32(frame.x)?;
        self.write_f32(frame.y)?;
        self.write_curve_at(n, i, frame.curve.as_ref())
    }

    fn write_flip_frame(&mut self, frame: &FlipFrame) -> Result<()> {
        self.write_f32(frame.time)?;
        self.write_bool(frame.flip)
    }

    pub fn write_ik_timeline(&mut self, timeline: &IkTimeline) -> Result<()> {
        self.write_varint(timeline.ik)?;
        self.write_indexed_array(&timeline.frames, |w, n, i, frame| {
            w.write_f32(frame.time)?;
            w.write_f32(frame.mix)?;
            w.write_i8(frame.bend_direction)?;
            w.write_curve_at(n, i, frame.curve.as_ref())
        })
    }

    pub fn write_ffd_timeline(&mut self, timeline: &FfdTimeline) -> Result<()> {
        self.write_string(timeline.attachment.as_deref())?;
        self.write_indexed_array(&timeline.frames, |w, n, i, frame| {
            w.write_f32(frame.time)?;
            match &frame.deform {
                Some(deform) if deform.offsets.is_empty() => {
                    return Err(SkelError::unrepresentable(format!(
                        "ffd frame {i} has a deform with no offsets"
                    )));
                }
                Some(deform) => {
                    w.write_len(Some(deform.offsets.len()))?;
                    w.write_varint(deform.start)?;
                    w.write_floats(&deform.offsets)?;
                }
                None => w.write_varint(0)?,
            }
            w.write_curve_at(n, i, frame.curve.as_ref())
        })
    }

    fn write_draw_order_frame(&mut self, frame: &DrawOrderFrame) -> Result<()> {
        self.write_array(&frame.offsets, |w, offset| {
            w.write_varint(offset.slot)?;
            w.write_varint(offset.offset)
        })?;
        self.write_f32(frame.time)
    }

    fn write_event_frame(&mut self, frame: &EventFrame) -> Result<()> {
        self.write_f32(frame.time)?;
        self.write_varint(frame.event)?;
        self.write_varint(frame.raw_int)?;
        self.write_f32(frame.float_value)?;
        self.write_bool(frame.has_string_value)?;
        if frame.has_string_value {
            self.write_string(frame.string_value.as_deref())?;
        }
        Ok(())
    }

    /// Curve trailer of frame `i` out of `n`. Every frame but the last needs
    /// one; a curve on the last frame has nowhere to go and is dropped.
    fn write_curve_at(&mut self, n: usize, i: usize, curve: Option<&Curve>) -> Result<()> {
        if !has_curve(n, i) {
            return Ok(());
        }
        let curve = curve.ok_or_else(|| {
            SkelError::unrepresentable(format!("frame {i} of {n} has no curve"))
        })?;
        self.write_curve(curve)
    }

    pub fn write_curve(&mut self, curve: &Curve) -> Result<()> {
        match *curve {
            Curve::Unknown(code) if code <= CURVE_BEZIER => Err(SkelError::unrepresentable(
                format!("curve type {code} must use its named variant"),
            )),
            Curve::Bezier { cx1, cy1, cx2, cy2 } => {
                self.write_u8(CURVE_BEZIER)?;
                self.write_f32(cx1)?;
                self.write_f32(cy1)?;
                self.write_f32(cx2)?;
                self.write_f32(cy2)
            }
            _ => self.write_u8(curve.type_code()),
        }
    }
}
