// Song library format invariants.
// Native-friendly: no wasm/browser APIs involved.

use piano_invaders::pitch::frequency;
use piano_invaders::song::{default_songs, parse_song_library};

#[test]
fn full_library_round_trips_through_the_parser() {
    let json = r#"{
        "songs": [
            {
                "name": "Ode to Joy",
                "bpm": 65,
                "melody": ["E3","E3","F3","G3","G3","F3","E3","D3","C3","C3","D3","E3","E3","D3","D3"]
            },
            {
                "name": "Sparse Etude",
                "bpm": 90,
                "melody": ["C3", null, "E3", null, null, "G3"]
            }
        ]
    }"#;
    let songs = parse_song_library(json).unwrap();
    assert_eq!(songs.len(), 2);
    assert_eq!(songs[0].name, "Ode to Joy");
    assert_eq!(songs[1].melody.len(), 6);
    assert_eq!(songs[1].note_at(1), None);
    assert_eq!(songs[1].note_at(5), Some("G3"));
}

#[test]
fn missing_or_broken_fields_fail_the_parse() {
    // Map instead of list.
    assert!(parse_song_library(r#"{"songs":{}}"#).is_err());
    // Missing bpm.
    assert!(parse_song_library(r#"{"songs":[{"name":"x","melody":["C3"]}]}"#).is_err());
    // Melody entry of the wrong type.
    assert!(parse_song_library(r#"{"songs":[{"name":"x","bpm":65,"melody":[42]}]}"#).is_err());
}

#[test]
fn default_melody_pitches_are_all_synthesizable() {
    for song in default_songs() {
        for pitch in song.melody.iter().flatten() {
            assert!(
                frequency(pitch).is_some(),
                "no frequency for melody pitch {pitch}"
            );
        }
    }
}

#[test]
fn default_song_names_are_nonempty_and_unique() {
    let songs = default_songs();
    let mut seen = std::collections::HashSet::new();
    for s in &songs {
        assert!(!s.name.is_empty());
        assert!(seen.insert(s.name.clone()), "duplicate song name {}", s.name);
    }
}
