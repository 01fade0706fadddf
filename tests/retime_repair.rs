//! Integration tests for the fixed-nominal timestamp repair command.

use chunkscribe::config::Config;
use chunkscribe::reconcile::{merged_paths, GlobalSpan};
use chunkscribe::retime::Retimer;
use std::fs;
use std::path::Path;

fn write_wav(path: &Path, secs: f64) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for _ in 0..(secs * 16000.0) as usize {
        writer.write_sample(0i16).unwrap();
    }
    writer.finalize().unwrap();
}

fn test_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.paths.chunks = root.join("chunks");
    config.paths.transcripts = root.join("transcripts");
    config
}

fn seed_source(config: &Config) {
    write_wav(
        &config.paths.chunks.join("lecture_16k/lecture_16k_000.wav"),
        30.0,
    );
    write_wav(
        &config.paths.chunks.join("lecture_16k/lecture_16k_001.wav"),
        5.0,
    );

    let folder = config.paths.transcripts.join("lecture_16k");
    fs::create_dir_all(&folder).unwrap();
    // ASR-local timestamps that the repair must override; the null pair's
    // text still belongs to the segment.
    fs::write(
        folder.join("lecture_16k_000.json"),
        r#"[
            {"timestamp": [3.2, 7.9], "text": "hello"},
            {"timestamp": null, "text": "there"}
        ]"#,
    )
    .unwrap();
    // Entries without text fall back to the sibling .txt.
    fs::write(
        folder.join("lecture_16k_001.json"),
        r#"[{"timestamp": [0.5, 2.0], "text": ""}]"#,
    )
    .unwrap();
    fs::write(folder.join("lecture_16k_001.txt"), "from txt\n").unwrap();
}

fn read_spans(path: &Path) -> Vec<GlobalSpan> {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn repair_rewrites_chunk_files_and_merged_pair_with_fixed_offsets() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    seed_source(&config);

    let summary = Retimer::new(&config, true).run().unwrap();
    assert_eq!(summary.repaired, 1);
    assert_eq!(summary.merge_skipped, 0);

    let folder = config.paths.transcripts.join("lecture_16k");

    // Segment 0: [0, 30) from index 0 and the full nominal duration.
    let spans = read_spans(&folder.join("lecture_16k_000.json"));
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].start, 0.0);
    assert_eq!(spans[0].end, 30.0);
    assert_eq!(spans[0].text, "hello there");

    // Segment 1: [30, 35): offset 1 * 30, end from the 5s WAV.
    let spans = read_spans(&folder.join("lecture_16k_001.json"));
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].start, 30.0);
    assert_eq!(spans[0].end, 35.0);
    assert_eq!(spans[0].text, "from txt");

    let (json, txt) = merged_paths(&config.paths.transcripts, "lecture_16k");
    let merged = read_spans(&json);
    let bounds: Vec<(f64, f64)> = merged.iter().map(|s| (s.start, s.end)).collect();
    assert_eq!(bounds, vec![(0.0, 30.0), (30.0, 35.0)]);
    assert_eq!(fs::read_to_string(&txt).unwrap(), "hello there\nfrom txt");
}

#[test]
fn repair_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    seed_source(&config);

    Retimer::new(&config, true).run().unwrap();
    let folder = config.paths.transcripts.join("lecture_16k");
    let first = fs::read(folder.join("lecture_16k_000.json")).unwrap();
    let (json, _) = merged_paths(&config.paths.transcripts, "lecture_16k");
    let merged_first = fs::read(&json).unwrap();

    let summary = Retimer::new(&config, true).run().unwrap();
    assert_eq!(summary.repaired, 1);
    assert_eq!(fs::read(folder.join("lecture_16k_000.json")).unwrap(), first);
    assert_eq!(fs::read(&json).unwrap(), merged_first);
}

#[test]
fn incomplete_segment_set_leaves_everything_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    seed_source(&config);

    let folder = config.paths.transcripts.join("lecture_16k");
    fs::remove_file(folder.join("lecture_16k_001.json")).unwrap();
    let untouched = fs::read(folder.join("lecture_16k_000.json")).unwrap();

    let summary = Retimer::new(&config, true).run().unwrap();
    assert_eq!(summary.repaired, 0);
    assert_eq!(summary.merge_skipped, 1);
    assert!(summary.has_failures());

    // Nothing rewritten, nothing merged.
    assert_eq!(
        fs::read(folder.join("lecture_16k_000.json")).unwrap(),
        untouched
    );
    let (json, txt) = merged_paths(&config.paths.transcripts, "lecture_16k");
    assert!(!json.exists());
    assert!(!txt.exists());
}

#[test]
fn segment_audio_without_index_suffix_blocks_repair() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    seed_source(&config);
    // A stray WAV with no trailing index makes the set unresolvable.
    write_wav(&config.paths.chunks.join("lecture_16k/stray.wav"), 1.0);

    let summary = Retimer::new(&config, true).run().unwrap();
    assert_eq!(summary.repaired, 0);
    assert_eq!(summary.merge_skipped, 1);
}
