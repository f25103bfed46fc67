//! Media clip loading and decoding
//!
//! Decodes greeting and song files to interleaved stereo f32 at a fixed
//! output rate. Video greetings are handled the same way: the container
//! is probed and the first audio track is decoded, the picture is ignored.

use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

/// Errors that can occur during clip loading
#[derive(Error, Debug)]
pub enum ClipError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No audio track found in file")]
    NoAudioTrack,
    #[error("Decode error: {0}")]
    Decode(String),
}

/// A loaded and decoded clip, ready for the playback engine
pub struct LoadedClip {
    /// Interleaved stereo samples (f32, normalized to -1.0 to 1.0)
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Clip duration in seconds
    pub duration_secs: f64,
}

/// Clip file loader using Symphonia
pub struct ClipLoader {
    target_sample_rate: u32,
}

impl Default for ClipLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipLoader {
    /// Create a new clip loader with default 48kHz output rate
    pub fn new() -> Self {
        Self::with_sample_rate(48000)
    }

    /// Create a new clip loader with a specific output rate
    pub fn with_sample_rate(target_sample_rate: u32) -> Self {
        Self { target_sample_rate }
    }

    /// Load and decode a clip file
    pub fn load(&self, path: &Path) -> Result<LoadedClip, ClipError> {
        let file = std::fs::File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| ClipError::Decode(e.to_string()))?;

        let mut format = probed.format;

        // First audio track; video-only files have none and are rejected.
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(ClipError::NoAudioTrack)?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let source_sample_rate = codec_params.sample_rate.unwrap_or(44100);
        let channels = codec_params
            .channels
            .map(|c| c.count() as u16)
            .unwrap_or(2);

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| ClipError::Decode(e.to_string()))?;

        // Decode all samples
        let mut samples: Vec<f32> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(symphonia::core::errors::Error::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(_) => break,
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(_) => continue,
            };

            let spec = *decoded.spec();
            let duration = decoded.capacity() as u64;

            let mut sample_buf = SampleBuffer::<f32>::new(duration, spec);
            sample_buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(sample_buf.samples());
        }

        if samples.is_empty() {
            return Err(ClipError::NoAudioTrack);
        }

        let total_frames = samples.len() / channels as usize;
        let duration_secs = total_frames as f64 / source_sample_rate as f64;

        let samples = if source_sample_rate != self.target_sample_rate {
            self.resample(&samples, source_sample_rate, channels)?
        } else {
            samples
        };

        // The engine expects interleaved stereo.
        let samples = upmix_to_stereo(samples, channels);

        Ok(LoadedClip {
            samples,
            sample_rate: self.target_sample_rate,
            duration_secs,
        })
    }

    /// Resample audio to the target rate
    fn resample(
        &self,
        samples: &[f32],
        source_rate: u32,
        channels: u16,
    ) -> Result<Vec<f32>, ClipError> {
        use rubato::{FftFixedInOut, Resampler};

        let channels_usize = channels as usize;
        let frames = samples.len() / channels_usize;

        let mut resampler = FftFixedInOut::<f32>::new(
            source_rate as usize,
            self.target_sample_rate as usize,
            1024,
            channels_usize,
        )
        .map_err(|e| ClipError::Decode(e.to_string()))?;

        // Deinterleave
        let deinterleaved: Vec<Vec<f32>> = (0..channels_usize)
            .map(|ch| {
                (0..frames)
                    .map(|f| samples[f * channels_usize + ch])
                    .collect()
            })
            .collect();

        // Process in chunks
        let chunk_size = resampler.input_frames_next();
        let mut output: Vec<Vec<f32>> = vec![Vec::new(); channels_usize];

        let mut pos = 0;
        while pos + chunk_size <= frames {
            let input_refs: Vec<&[f32]> = deinterleaved
                .iter()
                .map(|ch| &ch[pos..pos + chunk_size])
                .collect();

            let resampled = resampler
                .process(&input_refs, None)
                .map_err(|e| ClipError::Decode(e.to_string()))?;

            for (ch, data) in resampled.into_iter().enumerate() {
                output[ch].extend(data);
            }

            pos += chunk_size;
        }

        // Handle remaining samples (pad with zeros)
        if pos < frames {
            let remaining = frames - pos;
            let padded: Vec<Vec<f32>> = deinterleaved
                .iter()
                .map(|ch| {
                    let mut v = ch[pos..].to_vec();
                    v.resize(chunk_size, 0.0);
                    v
                })
                .collect();

            let input_refs: Vec<&[f32]> = padded.iter().map(|v| v.as_slice()).collect();

            if let Ok(resampled) = resampler.process(&input_refs, None) {
                for (ch, data) in resampled.into_iter().enumerate() {
                    // Only take the proportional amount of output
                    let output_frames =
                        (remaining * self.target_sample_rate as usize) / source_rate as usize;
                    output[ch].extend(&data[..output_frames.min(data.len())]);
                }
            }
        }

        // Reinterleave
        let output_frames = output[0].len();
        let mut interleaved = Vec::with_capacity(output_frames * channels_usize);
        for frame_idx in 0..output_frames {
            for channel in &output {
                interleaved.push(channel[frame_idx]);
            }
        }

        Ok(interleaved)
    }
}

/// Convert decoded samples to interleaved stereo. Mono is duplicated to
/// both channels; anything above stereo keeps its first two channels.
fn upmix_to_stereo(samples: Vec<f32>, channels: u16) -> Vec<f32> {
    match channels {
        2 => samples,
        1 => {
            let mut stereo = Vec::with_capacity(samples.len() * 2);
            for s in samples {
                stereo.push(s);
                stereo.push(s);
            }
            stereo
        }
        n => {
            let n = n as usize;
            let frames = samples.len() / n;
            let mut stereo = Vec::with_capacity(frames * 2);
            for f in 0..frames {
                stereo.push(samples[f * n]);
                stereo.push(samples[f * n + 1]);
            }
            stereo
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upmix_mono_duplicates() {
        let stereo = upmix_to_stereo(vec![0.1, 0.2, 0.3], 1);
        assert_eq!(stereo, vec![0.1, 0.1, 0.2, 0.2, 0.3, 0.3]);
    }

    #[test]
    fn test_upmix_stereo_passthrough() {
        let samples = vec![0.1, -0.1, 0.2, -0.2];
        assert_eq!(upmix_to_stereo(samples.clone(), 2), samples);
    }

    #[test]
    fn test_upmix_surround_takes_front_pair() {
        // 2 frames of 6-channel audio
        let samples = vec![
            0.1, 0.2, 0.3, 0.4, 0.5, 0.6, //
            0.7, 0.8, 0.9, 1.0, 1.1, 1.2,
        ];
        assert_eq!(upmix_to_stereo(samples, 6), vec![0.1, 0.2, 0.7, 0.8]);
    }

    #[test]
    fn test_load_missing_file() {
        let loader = ClipLoader::new();
        let result = loader.load(Path::new("/nonexistent/greeting.mp3"));
        assert!(matches!(result, Err(ClipError::Io(_))));
    }
}
