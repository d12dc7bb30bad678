use std::fmt;

/// Audio channel groups with a user-facing volume slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioChannel {
    Sfx,
    Music,
}

impl fmt::Display for AudioChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioChannel::Sfx => f.write_str("SFX"),
            AudioChannel::Music => f.write_str("Music"),
        }
    }
}
