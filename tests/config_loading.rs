// Integration test: loading sequencer configuration from RON files

use std::io::Write;

use tempfile::NamedTempFile;
use track_sequencer::{SequencerConfig, SequencerError, SequencerTrack};

#[test]
fn test_load_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "(sample_rate: 48000.0, default_velocity: 96, max_sounding_notes: 32)"
    )
    .unwrap();

    let config = SequencerConfig::load(file.path()).unwrap();
    assert_eq!(config.sample_rate, 48000.0);
    assert_eq!(config.default_velocity, 96);
    assert_eq!(config.max_sounding_notes, 32);
    assert_eq!(config.command_capacity, 64);

    let track = SequencerTrack::new(config).unwrap();
    assert_eq!(track.sample_rate(), 48000.0);
}

#[test]
fn test_saved_config_loads_back() {
    let config = SequencerConfig {
        cable: 3,
        default_channel: 9,
        ..SequencerConfig::default()
    };

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(config.to_ron_string().unwrap().as_bytes())
        .unwrap();

    assert_eq!(SequencerConfig::load(file.path()).unwrap(), config);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = SequencerConfig::load(dir.path().join("missing.ron"));
    assert!(matches!(result, Err(SequencerError::Io(_))));
}

#[test]
fn test_invalid_config_rejected_by_track() {
    let config = SequencerConfig {
        default_velocity: 200,
        ..SequencerConfig::default()
    };
    assert!(matches!(
        SequencerTrack::new(config),
        Err(SequencerError::Config(_))
    ));
}
