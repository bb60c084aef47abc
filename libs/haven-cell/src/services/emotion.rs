use std::collections::VecDeque;

use crate::models::{Emotion, EmotionReport, PitchEstimate};

pub const DEFAULT_CALIBRATION_FRAMES: usize = 120;
pub const BASELINE_WINDOW: usize = 240;

const SILENCE_RMS: f32 = 0.01;
const CLIP_THRESHOLD: f32 = 0.2;
const SPEECH_Z_RMS: f32 = 0.2;
const SPEECH_RMS: f32 = 0.02;

/// Crude autocorrelation pitch estimate for one frame of samples.
pub fn estimate_pitch(samples: &[f32], sample_rate: f32) -> PitchEstimate {
    if samples.is_empty() {
        return PitchEstimate { f0: 0.0, rms: 0.0 };
    }

    let rms = (samples.iter().map(|x| x * x).sum::<f32>() / samples.len() as f32).sqrt();
    if rms < SILENCE_RMS {
        return PitchEstimate { f0: 0.0, rms };
    }

    let size = samples.len();
    let half = size.div_ceil(2);
    let r1 = (0..half)
        .find(|&i| samples[i].abs() < CLIP_THRESHOLD)
        .unwrap_or(0);
    let r2 = (1..half)
        .map(|i| size - i)
        .find(|&i| samples[i].abs() < CLIP_THRESHOLD)
        .unwrap_or(size - 1);

    let trimmed = if r1 < r2 { &samples[r1..r2] } else { &[][..] };
    let n = trimmed.len();

    let correlation: Vec<f32> = (0..n)
        .map(|lag| (0..n - lag).map(|j| trimmed[j] * trimmed[j + lag]).sum())
        .collect();

    let mut d = 0;
    while d + 1 < n && correlation[d] > correlation[d + 1] {
        d += 1;
    }

    let mut best: Option<(usize, f32)> = None;
    for (lag, &value) in correlation.iter().enumerate().skip(d) {
        match best {
            Some((_, max)) if value <= max => {}
            _ => best = Some((lag, value)),
        }
    }

    let f0 = match best {
        Some((lag, _)) if lag > 0 => sample_rate / lag as f32,
        _ => 0.0,
    };

    PitchEstimate { f0, rms }
}

/// First matching rule wins.
pub fn classify(z_f0: f32, z_rms: f32) -> Emotion {
    if z_f0 > 0.9 && z_rms > 0.9 {
        Emotion::Happy
    } else if z_f0 < -0.8 && z_rms < -0.6 {
        Emotion::Sad
    } else if z_rms > 1.0 && z_f0 < 0.0 {
        Emotion::Angry
    } else if z_f0 > 0.6 && z_rms > 0.3 {
        Emotion::Engaged
    } else {
        Emotion::Calm
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReading {
    pub pitch: PitchEstimate,
    pub emotion: Emotion,
    pub speech: bool,
    pub calibrated: bool,
}

/// Tracks a speaker's pitch and loudness baseline and labels each new frame against it.
#[derive(Debug, Clone)]
pub struct EmotionAnalyzer {
    calibration_frames: usize,
    calibrating: bool,
    f0_baseline: VecDeque<f32>,
    rms_baseline: VecDeque<f32>,
    emotion: Emotion,
}

impl Default for EmotionAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_CALIBRATION_FRAMES)
    }
}

impl EmotionAnalyzer {
    pub fn new(calibration_frames: usize) -> Self {
        let calibration_frames = calibration_frames.min(BASELINE_WINDOW);
        Self {
            calibration_frames,
            calibrating: calibration_frames > 0,
            f0_baseline: VecDeque::with_capacity(BASELINE_WINDOW + 1),
            rms_baseline: VecDeque::with_capacity(BASELINE_WINDOW + 1),
            emotion: Emotion::Calm,
        }
    }

    pub fn is_calibrated(&self) -> bool {
        !self.calibrating
    }

    pub fn emotion(&self) -> Emotion {
        self.emotion
    }

    pub fn observe(&mut self, samples: &[f32], sample_rate: f32) -> FrameReading {
        let pitch = estimate_pitch(samples, sample_rate);

        if self.calibrating {
            self.f0_baseline.push_back(pitch.f0);
            self.rms_baseline.push_back(pitch.rms);
            if self.f0_baseline.len() >= self.calibration_frames {
                self.calibrating = false;
            }
            return FrameReading {
                pitch,
                emotion: self.emotion,
                speech: false,
                calibrated: false,
            };
        }

        let z_f0 = z_score(pitch.f0, &self.f0_baseline);
        let z_rms = z_score(pitch.rms, &self.rms_baseline);

        push_bounded(&mut self.f0_baseline, pitch.f0);
        push_bounded(&mut self.rms_baseline, pitch.rms);

        self.emotion = classify(z_f0, z_rms);

        FrameReading {
            pitch,
            emotion: self.emotion,
            speech: z_rms > SPEECH_Z_RMS || pitch.rms > SPEECH_RMS,
            calibrated: true,
        }
    }

    /// Run a fresh analyzer over a batch of frames and summarize the last one.
    pub fn analyze(frames: &[Vec<f32>], sample_rate: f32, calibration_frames: usize) -> EmotionReport {
        let mut analyzer = Self::new(calibration_frames);
        let mut last = None;
        for frame in frames {
            last = Some(analyzer.observe(frame, sample_rate));
        }

        let (pitch, speech) = last
            .map(|r| (r.pitch, r.speech))
            .unwrap_or((PitchEstimate { f0: 0.0, rms: 0.0 }, false));

        EmotionReport {
            emotion: analyzer.emotion(),
            calibrated: analyzer.is_calibrated(),
            speech_detected: speech,
            frames_analyzed: frames.len(),
            last_pitch_hz: pitch.f0,
            last_rms: pitch.rms,
        }
    }
}

fn push_bounded(window: &mut VecDeque<f32>, value: f32) {
    window.push_back(value);
    if window.len() > BASELINE_WINDOW {
        window.pop_front();
    }
}

/// Z-score against the population statistics of `baseline`. A zero spread counts as 1.
fn z_score(value: f32, baseline: &VecDeque<f32>) -> f32 {
    if baseline.is_empty() {
        return value;
    }
    let n = baseline.len() as f32;
    let mean = baseline.iter().sum::<f32>() / n;
    let variance = baseline.iter().map(|x| (x - mean).powi(2)).sum::<f32>() / n;
    let std = variance.sqrt();
    let std = if std == 0.0 { 1.0 } else { std };
    (value - mean) / std
}
