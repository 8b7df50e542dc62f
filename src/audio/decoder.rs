//! Audio decoding using symphonia
//!
//! Decodes audio files to mono f64 samples at the file's own sample rate.
//! Resampling happens later, per ceiling, inside the estimator. WAV files
//! that symphonia rejects are retried with hound.

use crate::error::{FormantSweepError, Result};
use crate::types::{AudioBuffer, AudioFormat};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, trace};

/// Maximum file size we'll attempt to decode (2GB)
/// Prevents OOM on extremely large files
const MAX_FILE_SIZE: u64 = 2 * 1024 * 1024 * 1024;

/// Decode an audio file to a mono AudioBuffer
pub fn decode(path: &Path) -> Result<AudioBuffer> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let format = AudioFormat::from_extension(extension).ok_or_else(|| {
        FormantSweepError::UnsupportedFormat {
            path: path.to_path_buf(),
            format: if extension.is_empty() {
                "(no extension)".to_string()
            } else {
                extension.to_string()
            },
        }
    })?;

    let metadata = std::fs::metadata(path).map_err(|e| {
        FormantSweepError::decode_error(path, format!("Failed to read file metadata: {}", e))
    })?;

    if metadata.len() > MAX_FILE_SIZE {
        return Err(FormantSweepError::decode_error(
            path,
            format!(
                "File too large ({:.1} GB). Maximum supported size is 2 GB.",
                metadata.len() as f64 / (1024.0 * 1024.0 * 1024.0)
            ),
        ));
    }

    let buffer = match decode_symphonia(path) {
        Ok(buffer) => buffer,
        Err(e) if format == AudioFormat::Wav => {
            debug!("symphonia failed on {} ({}), retrying with hound", path.display(), e);
            decode_wav(path)?
        }
        Err(e) => return Err(e),
    };

    debug!(
        "Decoded {} samples ({:.2}s @ {}Hz)",
        buffer.len(),
        buffer.duration,
        buffer.sample_rate
    );

    Ok(buffer)
}

fn decode_symphonia(path: &Path) -> Result<AudioBuffer> {
    let file = std::fs::File::open(path)
        .map_err(|e| FormantSweepError::decode_error(path, format!("Failed to open file: {}", e)))?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    // Provide a hint based on file extension
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| FormantSweepError::decode_error(path, format!("Failed to probe format: {}", e)))?;

    let mut format = probed.format;

    // Find the first audio track
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or_else(|| FormantSweepError::decode_error(path, "No audio tracks found"))?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let sample_rate = codec_params
        .sample_rate
        .ok_or_else(|| FormantSweepError::decode_error(path, "Unknown sample rate"))?;
    let channels = codec_params.channels.map(|c| c.count()).unwrap_or(1);

    debug!(
        "Decoding: {} @ {}Hz, {} channels",
        path.display(),
        sample_rate,
        channels
    );

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| FormantSweepError::decode_error(path, format!("Failed to create decoder: {}", e)))?;

    let mut all_samples: Vec<f64> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break; // End of stream
            }
            Err(e) => {
                return Err(FormantSweepError::decode_error(
                    path,
                    format!("Failed to read packet: {}", e),
                ));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(symphonia::core::errors::Error::DecodeError(e)) => {
                // Skip corrupted frames
                trace!("Skipping corrupted frame: {}", e);
                continue;
            }
            Err(e) => {
                return Err(FormantSweepError::decode_error(path, format!("Decode error: {}", e)));
            }
        };

        let spec = *decoded.spec();
        let num_frames = decoded.frames();

        let mut sample_buf = SampleBuffer::<f64>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        all_samples.extend(to_mono(sample_buf.samples(), spec.channels.count()));
    }

    if all_samples.is_empty() {
        return Err(FormantSweepError::decode_error(path, "File contains no audio samples"));
    }

    Ok(AudioBuffer::new(all_samples, sample_rate))
}

/// Read a WAV file with hound, normalizing integer samples to [-1, 1]
fn decode_wav(path: &Path) -> Result<AudioBuffer> {
    let reader = hound::WavReader::open(path)
        .map_err(|e| FormantSweepError::decode_error(path, format!("Failed to open WAV: {}", e)))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f64> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let scale = (1_i64 << (spec.bits_per_sample.saturating_sub(1))) as f64;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f64 / scale))
                .collect::<std::result::Result<_, _>>()
        }
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<std::result::Result<_, _>>(),
    }
    .map_err(|e| FormantSweepError::decode_error(path, format!("Corrupt WAV data: {}", e)))?;

    if interleaved.is_empty() {
        return Err(FormantSweepError::decode_error(path, "File contains no audio samples"));
    }

    Ok(AudioBuffer::new(to_mono(&interleaved, channels), spec.sample_rate))
}

/// Convert interleaved multi-channel audio to mono
fn to_mono(samples: &[f64], channels: usize) -> Vec<f64> {
    if channels <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f64>() / channels as f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_wav(path: &Path, channels: u16, frames: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in frames {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_to_mono_stereo() {
        let stereo = vec![0.5, 0.3, 0.8, 0.2, 1.0, 0.0];
        let mono = to_mono(&stereo, 2);
        assert_eq!(mono.len(), 3);
        assert!((mono[0] - 0.4).abs() < 1e-12);
        assert!((mono[1] - 0.5).abs() < 1e-12);
        assert!((mono[2] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_to_mono_already_mono() {
        let mono = vec![0.5, 0.8, 1.0];
        assert_eq!(to_mono(&mono, 1), mono);
    }

    #[test]
    fn test_decode_wav_keeps_native_rate() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tone.wav");
        let samples: Vec<i16> = (0..1600).map(|i| ((i % 100) * 100) as i16).collect();
        write_wav(&path, 1, &samples);

        let buffer = decode(&path).unwrap();
        assert_eq!(buffer.sample_rate, 16000);
        assert_eq!(buffer.len(), 1600);
        assert!((buffer.duration - 0.1).abs() < 1e-9);
        assert_eq!(buffer.start_time, 0.0);
    }

    #[test]
    fn test_hound_fallback_downmixes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stereo.wav");
        write_wav(&path, 2, &[16384, 0, 16384, 0]);

        let buffer = decode_wav(&path).unwrap();
        assert_eq!(buffer.len(), 2);
        assert!((buffer.samples[0] - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = decode(Path::new("notes.txt")).unwrap_err();
        assert!(matches!(err, FormantSweepError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_missing_file_is_decode_error() {
        let err = decode(Path::new("/nonexistent/take1.wav")).unwrap_err();
        assert!(matches!(err, FormantSweepError::DecodeError { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_garbage_wav_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.wav");
        std::fs::write(&path, b"not really a wav file").unwrap();
        assert!(matches!(
            decode(&path).unwrap_err(),
            FormantSweepError::DecodeError { .. }
        ));
    }
}
