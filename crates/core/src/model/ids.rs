use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Position of an item inside its `Vocabulary`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VocabId(u32);

impl VocabId {
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Index into the owning vocabulary's item list.
    #[must_use]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Identifier for a tile on a matching board; unique per board.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(u32);

impl TileId {
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for VocabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VocabId({})", self.0)
    }
}

impl fmt::Debug for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TileId({})", self.0)
    }
}

impl fmt::Display for VocabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for parsing an id from a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for VocabId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u32>()
            .map(VocabId::new)
            .map_err(|_| ParseIdError { kind: "VocabId" })
    }
}

impl FromStr for TileId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u32>()
            .map(TileId::new)
            .map_err(|_| ParseIdError { kind: "TileId" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocab_id_display_and_parse() {
        let id = VocabId::new(7);
        assert_eq!(id.to_string(), "7");
        assert_eq!("7".parse::<VocabId>().unwrap(), id);
        assert_eq!(id.index(), 7);
    }

    #[test]
    fn tile_id_parse_rejects_garbage() {
        let err = "tile".parse::<TileId>().unwrap_err();
        assert_eq!(err.to_string(), "failed to parse TileId from string");
    }
}
