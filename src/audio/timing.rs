// Beat/sample timing utilities for sample-accurate MIDI scheduling

/// Number of samples in one beat
pub fn samples_per_beat(sample_rate: f64, tempo_bpm: f64) -> f64 {
    sample_rate * 60.0 / tempo_bpm
}

/// Convert a frame count to beats at the given tempo
pub fn frames_to_beats(frames: u32, sample_rate: f64, tempo_bpm: f64) -> f64 {
    frames as f64 * (tempo_bpm / 60.0) / sample_rate
}

/// Number of render calls needed to play `beats` at the given buffer size.
///
/// Rounds up so that every event in the span gets a chance to be scheduled.
pub fn render_count(beats: f64, tempo_bpm: f64, sample_rate: f64, frame_count: u32) -> usize {
    if frame_count == 0 || tempo_bpm <= 0.0 {
        return 0;
    }
    let buffers_per_second = sample_rate / frame_count as f64;
    // seconds-per-beat first: 3 beats at 75 BPM must come out at 451, not 450
    let length_seconds = (60.0 / tempo_bpm) * beats;
    (buffers_per_second * length_seconds).ceil() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_per_beat() {
        assert_eq!(samples_per_beat(44100.0, 120.0), 22050.0);
        assert_eq!(samples_per_beat(48000.0, 60.0), 48000.0);
    }

    #[test]
    fn test_frames_to_beats() {
        // 1 second at 120 BPM = 2 beats
        assert_eq!(frames_to_beats(44100, 44100.0, 120.0), 2.0);
        assert!((frames_to_beats(256, 44100.0, 120.0) - 256.0 / 22050.0).abs() < 1e-15);
    }

    #[test]
    fn test_render_count_one_buffer_per_second() {
        assert_eq!(render_count(1.0, 60.0, 44100.0, 44100), 1);
        assert_eq!(render_count(60.0, 60.0, 44100.0, 44100), 60);
        assert_eq!(render_count(33.0, 60.0, 44100.0, 44100), 33);
        assert_eq!(render_count(45.0, 60.0, 44100.0, 44100), 45);
        assert_eq!(render_count(1.0, 120.0, 44100.0, 44100), 1);
        assert_eq!(render_count(2.0, 120.0, 44100.0, 44100), 1);
        assert_eq!(render_count(30.0, 120.0, 44100.0, 44100), 15);
        assert_eq!(render_count(45.0, 120.0, 44100.0, 44100), 23);
    }

    #[test]
    fn test_render_count_small_buffers() {
        assert_eq!(render_count(1.0, 120.0, 44100.0, 256), 87);
        assert_eq!(render_count(1.0, 120.0, 44100.0, 512), 44);
        assert_eq!(render_count(2.0, 120.0, 44100.0, 256), 173);
        assert_eq!(render_count(2.0, 120.0, 44100.0, 512), 87);
        assert_eq!(render_count(5.0, 120.0, 48000.0, 1024), 118);
        assert_eq!(render_count(8.0, 120.0, 48000.0, 4096), 47);
        assert_eq!(render_count(3.0, 75.0, 48000.0, 256), 451);
        // 93.75 buffers per second for 1.2 seconds = 112.5 buffers
        assert_eq!(render_count(3.0, 150.0, 48000.0, 512), 113);
    }

    #[test]
    fn test_render_count_degenerate() {
        assert_eq!(render_count(4.0, 120.0, 44100.0, 0), 0);
        assert_eq!(render_count(0.0, 120.0, 44100.0, 512), 0);
    }
}
