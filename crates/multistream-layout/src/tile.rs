#![forbid(unsafe_code)]

//! Tile identity and the custom-layout mapping.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use multistream_core::geometry::Rect;

/// Opaque, stable identity of one visible stream instance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(String);

impl TileId {
    /// Wrap an identity string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identity string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TileId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TileId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for TileId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// User overrides: tile identity to the rectangle the user placed it at.
///
/// Entries only appear after an accepted drag or resize. They take precedence
/// over grid placement and are never re-validated on read.
///
/// Serializes as a JSON object keyed by tile identity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomLayout {
    tiles: BTreeMap<TileId, Rect>,
}

impl CustomLayout {
    /// An empty layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored rectangle for `id`, if customized.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Rect> {
        self.tiles.get(id)
    }

    /// Whether `id` has a stored rectangle.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.tiles.contains_key(id)
    }

    /// Merge an accepted rectangle, returning the one it replaced.
    pub fn insert(&mut self, id: TileId, rect: Rect) -> Option<Rect> {
        self.tiles.insert(id, rect)
    }

    /// Drop the customization for `id`.
    pub fn remove(&mut self, id: &str) -> Option<Rect> {
        self.tiles.remove(id)
    }

    /// Drop every customization.
    pub fn clear(&mut self) {
        self.tiles.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Iterate customizations in identity order.
    pub fn iter(&self) -> impl Iterator<Item = (&TileId, &Rect)> {
        self.tiles.iter()
    }

    /// Keep only entries whose identity is accepted by `is_active`.
    ///
    /// Returns how many entries were dropped.
    pub fn retain_active(&mut self, mut is_active: impl FnMut(&TileId) -> bool) -> usize {
        let before = self.tiles.len();
        self.tiles.retain(|id, _| is_active(id));
        before - self.tiles.len()
    }
}

impl FromIterator<(TileId, Rect)> for CustomLayout {
    fn from_iter<I: IntoIterator<Item = (TileId, Rect)>>(iter: I) -> Self {
        Self {
            tiles: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a CustomLayout {
    type Item = (&'a TileId, &'a Rect);
    type IntoIter = std::collections::btree_map::Iter<'a, TileId, Rect>;

    fn into_iter(self) -> Self::IntoIter {
        self.tiles.iter()
    }
}
