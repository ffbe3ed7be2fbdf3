//! Sampled animation curves.
//!
//! Skeletal animation is resampled to a constant rate before export, so
//! each bone carries one aligned sample array and the key time is derived
//! from the frame index. Non-skeletal (helper/dummy) animation keeps
//! keyframe-level interpolation metadata for the engine's spline
//! evaluator: three independently-timed channels per model, each key with
//! its own time, TCB parameters, and ease values.

use crate::util::math::Vec3;

/// One constant-rate sample: translation, rotation, and scale together.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrsSample {
    pub translation: Vec3,
    /// XYZ Euler angles in degrees.
    pub rotation_deg: Vec3,
    pub scale: Vec3,
}

/// Constant-rate skeletal animation for one (geometry file, model) pair.
#[derive(Clone, Debug)]
pub struct AnimationData {
    start: f32,
    fps: f32,
    /// One aligned sample array per bone, indexed like the skeleton.
    bone_tracks: Vec<Vec<TrsSample>>,
}

impl AnimationData {
    pub fn new(start: f32, fps: f32, num_bones: usize) -> Self {
        Self {
            start,
            fps,
            bone_tracks: vec![Vec::new(); num_bones],
        }
    }

    pub fn start(&self) -> f32 {
        self.start
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Time of the sample at `index`.
    pub fn sample_time(&self, index: usize) -> f32 {
        self.start + index as f32 / self.fps
    }

    pub fn num_bones(&self) -> usize {
        self.bone_tracks.len()
    }

    pub fn push_sample(&mut self, bone: usize, sample: TrsSample) {
        self.bone_tracks[bone].push(sample);
    }

    pub fn track(&self, bone: usize) -> &[TrsSample] {
        &self.bone_tracks[bone]
    }
}

/// One spline key of a non-skeletal channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplineKey {
    pub time: f32,
    pub value: Vec3,
    /// Tension, continuity, bias.
    pub tcb: [f32; 3],
    pub ease_in: f32,
    pub ease_out: f32,
}

/// The three independently-sized, independently-timed channels of one
/// model.
#[derive(Clone, Debug, Default)]
pub struct SplineTracks {
    pub position: Vec<SplineKey>,
    /// XYZ Euler angles in degrees.
    pub rotation: Vec<SplineKey>,
    pub scale: Vec<SplineKey>,
}

impl SplineTracks {
    pub fn is_empty(&self) -> bool {
        self.position.is_empty() && self.rotation.is_empty() && self.scale.is_empty()
    }
}

/// Keyframe animation for models without a skeleton.
#[derive(Clone, Debug, Default)]
pub struct NonSkeletalAnimationData {
    tracks: SplineTracks,
}

impl NonSkeletalAnimationData {
    pub fn new(tracks: SplineTracks) -> Self {
        Self { tracks }
    }

    pub fn tracks(&self) -> &SplineTracks {
        &self.tracks
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_time_constant_rate() {
        let data = AnimationData::new(2.0, 30.0, 1);
        assert!((data.sample_time(0) - 2.0).abs() < 1e-6);
        assert!((data.sample_time(30) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_independent_channel_sizes() {
        let mut tracks = SplineTracks::default();
        tracks.position.push(SplineKey {
            time: 0.0,
            value: Vec3::ZERO,
            tcb: [0.0; 3],
            ease_in: 0.0,
            ease_out: 0.0,
        });
        tracks.rotation.extend([
            SplineKey {
                time: 0.0,
                value: Vec3::ZERO,
                tcb: [0.1, 0.2, 0.3],
                ease_in: 0.5,
                ease_out: 0.0,
            },
            SplineKey {
                time: 0.8,
                value: Vec3::new(0.0, 0.0, 90.0),
                tcb: [0.0; 3],
                ease_in: 0.0,
                ease_out: 0.5,
            },
        ]);

        let data = NonSkeletalAnimationData::new(tracks);
        assert_eq!(data.tracks().position.len(), 1);
        assert_eq!(data.tracks().rotation.len(), 2);
        assert!(data.tracks().scale.is_empty());
        assert!(!data.is_empty());
    }
}
