/// Keys the simulation reacts to.
///
/// Hooks consume these discrete keys, never raw device codes, so any input
/// backend can feed the same game logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// Move forward.
    W,
    /// Strafe left.
    A,
    /// Move backward.
    S,
    /// Strafe right.
    D,
    /// Interact with the object in front of the player.
    E,
    /// Drop the held tool.
    Q,
    Space,
}

impl Key {
    /// Map a backend key name (as browsers and winit report them) to a key.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "w" => Some(Self::W),
            "a" => Some(Self::A),
            "s" => Some(Self::S),
            "d" => Some(Self::D),
            "e" => Some(Self::E),
            "q" => Some(Self::Q),
            " " | "space" => Some(Self::Space),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_map_case_insensitively() {
        assert_eq!(Key::from_name("W"), Some(Key::W));
        assert_eq!(Key::from_name("e"), Some(Key::E));
        assert_eq!(Key::from_name(" "), Some(Key::Space));
        assert_eq!(Key::from_name("space"), Some(Key::Space));
    }

    #[test]
    fn unknown_names_are_ignored() {
        assert_eq!(Key::from_name("F13"), None);
    }
}
