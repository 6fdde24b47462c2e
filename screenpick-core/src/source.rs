//! Frame metric sources.
//!
//! Decoding video and measuring frames is done elsewhere (typically a native
//! processing engine with plugins). The engine only needs the narrow
//! [`FrameSource`] interface: a frame count, a frame rate, and one
//! brightness/motion sample per requested index.
//!
//! [`RecordedFrameSource`] replays metrics that were measured earlier and
//! dumped to JSON. The CLI and the tests use it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{CoreError, CoreResult};

/// Rational frame rate. Serialized as `[num, den]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(u32, u32)", into = "(u32, u32)")]
pub struct Fps {
    num: u32,
    den: u32,
}

impl Fps {
    /// Creates a frame rate, rejecting zero numerators and denominators.
    pub fn new(num: u32, den: u32) -> CoreResult<Self> {
        if num == 0 || den == 0 {
            return Err(CoreError::FrameSource(format!("Invalid frame rate {num}/{den}")));
        }
        Ok(Self { num, den })
    }

    pub fn num(&self) -> u32 {
        self.num
    }

    pub fn den(&self) -> u32 {
        self.den
    }

    /// Frames per second as a float.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }
}

impl TryFrom<(u32, u32)> for Fps {
    type Error = CoreError;

    fn try_from((num, den): (u32, u32)) -> Result<Self, Self::Error> {
        Fps::new(num, den)
    }
}

impl From<Fps> for (u32, u32) {
    fn from(fps: Fps) -> Self {
        (fps.num, fps.den)
    }
}

impl std::fmt::Display for Fps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// One measured frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSample {
    /// Average normalized luma in [0, 1]
    pub brightness: f64,
    /// Distance to temporal neighbours, >= 0
    pub motion: f64,
}

/// Upstream processing requested from the frame source before sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingOptions {
    /// Downscale to this height before measuring (0 = native)
    pub downscale_height: u32,
    /// Tonemap HDR content to SDR before measuring
    pub analyze_in_sdr: bool,
    /// Measure motion as an absolute frame difference
    pub motion_use_absdiff: bool,
}

/// A source of per-frame brightness and motion samples.
///
/// Sampling is sequential and the source is borrowed mutably for the whole
/// scan, so a source is never shared between two concurrent selection runs.
pub trait FrameSource {
    /// Total number of frames in the analyzed clip.
    fn num_frames(&self) -> usize;

    /// Frame rate of the analyzed clip.
    fn fps(&self) -> Fps;

    /// Applies upstream processing options. Called once before the first sample.
    fn prepare(&mut self, _options: &SamplingOptions) -> CoreResult<()> {
        Ok(())
    }

    /// Measures one frame. `Ok(None)` means the frame has no sample and is skipped.
    fn sample(&mut self, index: usize) -> CoreResult<Option<FrameSample>>;
}

#[derive(Debug, Serialize, Deserialize)]
struct MetricsDump {
    fps: Fps,
    num_frames: usize,
    samples: Vec<RecordedSample>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RecordedSample {
    frame: usize,
    brightness: f64,
    motion: f64,
}

/// Frame source backed by previously recorded samples.
#[derive(Debug, Clone)]
pub struct RecordedFrameSource {
    fps: Fps,
    num_frames: usize,
    samples: BTreeMap<usize, FrameSample>,
    options: Option<SamplingOptions>,
    sample_calls: usize,
}

impl RecordedFrameSource {
    /// Creates an empty source for a clip of `num_frames` frames.
    pub fn new(fps: Fps, num_frames: usize) -> Self {
        Self {
            fps,
            num_frames,
            samples: BTreeMap::new(),
            options: None,
            sample_calls: 0,
        }
    }

    /// Builds a source with a sample for every frame from parallel slices.
    pub fn from_series(fps: Fps, brightness: &[f64], motion: &[f64]) -> CoreResult<Self> {
        if brightness.len() != motion.len() {
            return Err(CoreError::FrameSource(format!(
                "Brightness and motion series differ in length ({} vs {})",
                brightness.len(),
                motion.len()
            )));
        }
        let mut source = Self::new(fps, brightness.len());
        for (frame, (&b, &m)) in brightness.iter().zip(motion).enumerate() {
            source.insert(frame, FrameSample { brightness: b, motion: m });
        }
        Ok(source)
    }

    /// Loads a JSON metrics dump from disk.
    pub fn from_json_file(path: &Path) -> CoreResult<Self> {
        let file = File::open(path).map_err(|e| {
            CoreError::FrameSource(format!("Failed to open metrics dump {}: {}", path.display(), e))
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parses a JSON metrics dump:
    /// `{"fps": [num, den], "num_frames": N, "samples": [{"frame", "brightness", "motion"}]}`.
    pub fn from_reader<R: Read>(reader: R) -> CoreResult<Self> {
        let dump: MetricsDump = serde_json::from_reader(reader)?;
        let mut source = Self::new(dump.fps, dump.num_frames);
        for sample in dump.samples {
            if sample.frame >= dump.num_frames {
                return Err(CoreError::FrameSource(format!(
                    "Recorded sample for frame {} is outside a {}-frame clip",
                    sample.frame, dump.num_frames
                )));
            }
            source.insert(
                sample.frame,
                FrameSample { brightness: sample.brightness, motion: sample.motion },
            );
        }
        log::debug!(
            "Loaded {} recorded samples for a {}-frame clip at {} fps",
            source.samples.len(),
            source.num_frames,
            source.fps
        );
        Ok(source)
    }

    /// Adds or replaces the sample for `frame`.
    pub fn insert(&mut self, frame: usize, sample: FrameSample) {
        self.samples.insert(frame, sample);
    }

    /// Number of `sample` calls served so far.
    pub fn sample_calls(&self) -> usize {
        self.sample_calls
    }

    /// Options passed to the last `prepare` call.
    pub fn options(&self) -> Option<SamplingOptions> {
        self.options
    }
}

impl FrameSource for RecordedFrameSource {
    fn num_frames(&self) -> usize {
        self.num_frames
    }

    fn fps(&self) -> Fps {
        self.fps
    }

    fn prepare(&mut self, options: &SamplingOptions) -> CoreResult<()> {
        self.options = Some(*options);
        Ok(())
    }

    fn sample(&mut self, index: usize) -> CoreResult<Option<FrameSample>> {
        self.sample_calls += 1;
        if index >= self.num_frames {
            return Err(CoreError::FrameSource(format!(
                "Frame {index} is outside a {}-frame clip",
                self.num_frames
            )));
        }
        Ok(self.samples.get(&index).copied())
    }
}
