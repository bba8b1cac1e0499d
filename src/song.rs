//! Song library: the JSON record format, validation, and the built-in
//! fallback used when the library cannot be fetched or parsed.

use serde::Deserialize;

/// One playable song. `melody` is sparse: `None` entries are rests, so the
/// spawner keeps its rhythm but emits nothing. The melody loops.
#[derive(Debug, Clone, Deserialize)]
pub struct Song {
    pub name: String,
    pub bpm: f64,
    pub melody: Vec<Option<String>>,
}

impl Song {
    fn is_playable(&self) -> bool {
        self.bpm > 0.0 && !self.melody.is_empty()
    }

    /// Melody entry at a cursor position (callers keep the cursor in range).
    pub fn note_at(&self, cursor: usize) -> Option<&str> {
        self.melody.get(cursor).and_then(|n| n.as_deref())
    }

    /// Cursor position after `cursor`, wrapping back to the start.
    pub fn next_cursor(&self, cursor: usize) -> usize {
        if cursor + 1 >= self.melody.len() { 0 } else { cursor + 1 }
    }
}

#[derive(Debug, Deserialize)]
struct SongLibrary {
    songs: Vec<Song>,
}

/// Built-in fallback so the game is playable without the JSON resource.
pub fn default_songs() -> Vec<Song> {
    vec![Song {
        name: "Ode to Joy".to_string(),
        bpm: 65.0,
        melody: [
            "E3", "E3", "F3", "G3", "G3", "F3", "E3", "D3", "C3", "C3", "D3", "E3", "E3", "D3",
            "D3",
        ]
        .iter()
        .map(|s| Some(s.to_string()))
        .collect(),
    }]
}

/// Parse the `{ "songs": [...] }` library, dropping unplayable records.
/// Any parse failure or an empty result is an error; callers fall back to
/// `default_songs`.
pub fn parse_song_library(json: &str) -> Result<Vec<Song>, serde_json::Error> {
    let lib: SongLibrary = serde_json::from_str(json)?;
    let songs: Vec<Song> = lib.songs.into_iter().filter(Song::is_playable).collect();
    if songs.is_empty() {
        return Err(serde::de::Error::custom("song library holds no playable songs"));
    }
    Ok(songs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_song_is_ode_to_joy_at_65() {
        let songs = default_songs();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].name, "Ode to Joy");
        assert_eq!(songs[0].bpm, 65.0);
        assert_eq!(songs[0].melody.len(), 15);
        assert_eq!(songs[0].note_at(2), Some("F3"));
    }

    #[test]
    fn cursor_wraps_at_melody_end() {
        let song = &default_songs()[0];
        assert_eq!(song.next_cursor(0), 1);
        assert_eq!(song.next_cursor(13), 14);
        assert_eq!(song.next_cursor(14), 0);
    }

    #[test]
    fn parses_library_with_rests() {
        let json = r#"{"songs":[{"name":"Test","bpm":80,"melody":["C3",null,"E3"]}]}"#;
        let songs = parse_song_library(json).unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].note_at(0), Some("C3"));
        assert_eq!(songs[0].note_at(1), None);
        assert_eq!(songs[0].note_at(2), Some("E3"));
    }

    #[test]
    fn unplayable_records_are_dropped() {
        let json = r#"{"songs":[
            {"name":"Empty","bpm":80,"melody":[]},
            {"name":"Zero","bpm":0,"melody":["C3"]},
            {"name":"Good","bpm":90,"melody":["C3","D3"]}
        ]}"#;
        let songs = parse_song_library(json).unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].name, "Good");
    }

    #[test]
    fn malformed_or_empty_library_is_an_error() {
        assert!(parse_song_library("not json").is_err());
        assert!(parse_song_library(r#"{"songs":[]}"#).is_err());
        assert!(parse_song_library(r#"{"songs":[{"name":"NoMelody","bpm":0,"melody":[]}]}"#).is_err());
    }
}
