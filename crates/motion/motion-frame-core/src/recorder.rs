//! Frame recorder: drive a sampler once per frame and collect the results as
//! per-channel tracks. Persisting the clip is left to the caller.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::armature::Axis;
use crate::config::sanitize_frame_rate;
use crate::layout::RootSlot;
use crate::pose::{ChannelVector, PoseSample, RootFrame};
use crate::sampler::PoseSampler;
use crate::Result;

const ROOT_TRACKS: [(RootSlot, &str); 7] = [
    (RootSlot::PositionX, "RootT.x"),
    (RootSlot::PositionY, "RootT.y"),
    (RootSlot::PositionZ, "RootT.z"),
    (RootSlot::RotationX, "RootQ.x"),
    (RootSlot::RotationY, "RootQ.y"),
    (RootSlot::RotationZ, "RootQ.z"),
    (RootSlot::RotationW, "RootQ.w"),
];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecordedTrack {
    /// `RootT.x`, `RootQ.w`, `<bone>.<axis>` or `<shape>@<channel>`.
    pub path: String,
    /// Global channel index the values were read from.
    pub channel: usize,
    /// One value per recorded frame.
    pub values: Vec<f32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecordedClip {
    pub frame_rate: f32,
    /// Timestamp of each frame in seconds, first frame at 0.
    pub times: Vec<f32>,
    pub tracks: Vec<RecordedTrack>,
}

impl RecordedClip {
    pub fn track(&self, path: &str) -> Option<&RecordedTrack> {
        self.tracks.iter().find(|t| t.path == path)
    }

    pub fn frame_count(&self) -> usize {
        self.times.len()
    }
}

#[derive(Clone, Debug)]
struct RecordedFrame {
    time: f32,
    channels: ChannelVector,
}

/// Accumulates sampled frames between `start` and `stop`.
#[derive(Debug)]
pub struct FrameRecorder<'a> {
    sampler: PoseSampler<'a>,
    recording: bool,
    elapsed: f32,
    frames: Vec<RecordedFrame>,
}

impl<'a> FrameRecorder<'a> {
    pub fn new(sampler: PoseSampler<'a>) -> Self {
        Self {
            sampler,
            recording: false,
            elapsed: 0.0,
            frames: Vec::new(),
        }
    }

    /// Begin a fresh take, discarding frames from an earlier one.
    pub fn start(&mut self) {
        self.recording = true;
        self.elapsed = 0.0;
        self.frames.clear();
    }

    /// Stop taking snapshots; recorded frames are kept for [`FrameRecorder::save`].
    pub fn stop(&mut self) {
        self.recording = false;
    }

    #[inline]
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn sampler(&self) -> &PoseSampler<'a> {
        &self.sampler
    }

    /// Sample `pose` and append it `delta_time` seconds after the previous
    /// frame. The first frame of a take is at time 0.
    pub fn take_snapshot(
        &mut self,
        pose: &PoseSample,
        frame: &RootFrame,
        delta_time: f32,
    ) -> Result<()> {
        if !self.recording {
            warn!("snapshot ignored: recorder is not recording");
            return Ok(());
        }
        let channels = self.sampler.sample(pose, frame)?;
        if !self.frames.is_empty() {
            self.elapsed += delta_time.max(0.0);
        }
        self.frames.push(RecordedFrame {
            time: self.elapsed,
            channels,
        });
        Ok(())
    }

    /// Collect the take into per-channel tracks. With no frames the clip is
    /// empty but still carries the frame rate.
    pub fn save(&self, frame_rate: f32) -> RecordedClip {
        let frame_rate = sanitize_frame_rate(frame_rate);
        if self.frames.is_empty() {
            return RecordedClip {
                frame_rate,
                times: Vec::new(),
                tracks: Vec::new(),
            };
        }

        let layout = self.sampler.layout();
        let armature = self.sampler.armature();
        let mut sources: Vec<(String, usize)> = Vec::new();
        for (slot, path) in ROOT_TRACKS {
            if let Some(index) = layout.root_index(slot) {
                sources.push((path.to_string(), index));
            }
        }
        for (bone, def) in armature.bones().iter().enumerate().skip(1) {
            if !self.sampler.is_bound(bone) {
                continue;
            }
            for axis in Axis::ALL {
                if let Some(index) = layout.axis_index(bone, axis) {
                    sources.push((format!("{}.{}", def.name, axis.name()), index));
                }
            }
        }
        for shape in layout.shape_indices() {
            sources.push((format!("{}@{}", shape.shape, shape.index), shape.index));
        }

        let tracks = sources
            .into_iter()
            .map(|(path, channel)| RecordedTrack {
                values: self
                    .frames
                    .iter()
                    .map(|f| f.channels.get(channel).unwrap_or(self.sampler.rest_value()))
                    .collect(),
                path,
                channel,
            })
            .collect();

        RecordedClip {
            frame_rate,
            times: self.frames.iter().map(|f| f.time).collect(),
            tracks,
        }
    }
}

/// Export a clip as serde_json::Value (stable schema for FFI/serialization).
pub fn export_clip_json(clip: &RecordedClip) -> serde_json::Value {
    serde_json::to_value(clip).unwrap_or(serde_json::Value::Null)
}
