//! Sample-accurate duration probing for WAV files.

use crate::error::{PipelineError, Result};
use std::path::Path;

/// Return the exact duration of a WAV file in seconds.
///
/// Computed as samples-per-channel divided by sample rate, so the result is
/// sample-accurate rather than rounded to header-declared byte counts.
pub fn wav_duration_secs(path: &Path) -> Result<f64> {
    let reader = hound::WavReader::open(path).map_err(|e| PipelineError::Probe {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Err(PipelineError::Probe {
            path: path.to_path_buf(),
            message: "sample rate is zero".to_string(),
        });
    }
    Ok(f64::from(reader.duration()) / f64::from(spec.sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_test_wav(dir: &Path, name: &str, sample_rate: u32, samples: u32) -> PathBuf {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let path = dir.join(name);
        let mut writer = hound::WavWriter::create(&path, spec).expect("create wav");
        for _ in 0..samples {
            writer.write_sample(0i16).expect("write sample");
        }
        writer.finalize().expect("finalize wav");
        path
    }

    #[test]
    fn test_duration_of_one_second_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_test_wav(dir.path(), "one_sec.wav", 16000, 16000);

        let duration = wav_duration_secs(&path).expect("probe");
        assert!((duration - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_duration_is_sample_accurate() {
        let dir = tempfile::tempdir().expect("tempdir");
        // 16001 samples at 16kHz: one sample over a second
        let path = write_test_wav(dir.path(), "odd.wav", 16000, 16001);

        let duration = wav_duration_secs(&path).expect("probe");
        assert!((duration - 16001.0 / 16000.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_file_is_probe_error() {
        let result = wav_duration_secs(Path::new("/nonexistent/nothing.wav"));
        match result {
            Err(PipelineError::Probe { path, .. }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/nothing.wav"));
            }
            other => panic!("Expected Probe error, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_file_is_probe_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("not_audio.wav");
        std::fs::write(&path, b"this is not a wav file").expect("write");

        assert!(matches!(
            wav_duration_secs(&path),
            Err(PipelineError::Probe { .. })
        ));
    }
}
