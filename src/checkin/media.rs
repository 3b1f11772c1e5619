//! Ordered accumulator for captured photos and videos

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Kind of captured media
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Infer the kind from a file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" | "png" | "heic" | "heif" | "webp" => Some(MediaKind::Image),
            "mp4" | "mov" | "m4v" | "mkv" | "webm" | "3gp" => Some(MediaKind::Video),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Image => "Foto",
            MediaKind::Video => "Vídeo",
        }
    }
}

/// A captured media reference; the URI is owned by whatever stored the file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub uri: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

impl MediaItem {
    pub fn image(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            kind: MediaKind::Image,
        }
    }

    pub fn video(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            kind: MediaKind::Video,
        }
    }
}

/// Media captured during the current check-in, in capture order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaList {
    items: Vec<MediaItem>,
}

impl MediaList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, item: MediaItem) {
        self.items.push(item);
    }

    /// Remove the item at `index`, shifting later items left.
    ///
    /// Returns `None` (and leaves the list untouched) when out of range.
    pub fn remove_at(&mut self, index: usize) -> Option<MediaItem> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MediaItem> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MediaItem> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[MediaItem] {
        &self.items
    }

    /// Count of (photos, videos)
    pub fn counts(&self) -> (usize, usize) {
        let photos = self
            .items
            .iter()
            .filter(|m| m.kind == MediaKind::Image)
            .count();
        (photos, self.items.len() - photos)
    }
}

impl<'a> IntoIterator for &'a MediaList {
    type Item = &'a MediaItem;
    type IntoIter = std::slice::Iter<'a, MediaItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_append_keeps_capture_order() {
        let mut list = MediaList::new();
        list.append(MediaItem::image("file:///a.jpg"));
        list.append(MediaItem::video("file:///b.mp4"));
        list.append(MediaItem::image("file:///c.jpg"));

        let uris: Vec<&str> = list.iter().map(|m| m.uri.as_str()).collect();
        assert_eq!(uris, vec!["file:///a.jpg", "file:///b.mp4", "file:///c.jpg"]);
        assert_eq!(list.counts(), (2, 1));
    }

    #[test]
    fn test_append_then_remove_restores_previous_sequence() {
        let mut list = MediaList::new();
        list.append(MediaItem::image("uri0"));
        list.append(MediaItem::video("uri1"));
        let before = list.clone();

        list.append(MediaItem::image("uri2"));
        let removed = list.remove_at(list.len() - 1);

        assert_eq!(removed, Some(MediaItem::image("uri2")));
        assert_eq!(list, before);
    }

    #[test]
    fn test_remove_first_of_two_photos() {
        let mut list = MediaList::new();
        list.append(MediaItem::image("uri1"));
        list.append(MediaItem::image("uri2"));

        list.remove_at(0);

        assert_eq!(list.as_slice(), &[MediaItem::image("uri2")]);
    }

    #[test]
    fn test_remove_out_of_range_is_noop() {
        let mut list = MediaList::new();
        list.append(MediaItem::image("uri1"));
        assert_eq!(list.remove_at(5), None);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut list = MediaList::new();
        list.append(MediaItem::image("uri1"));
        list.clear();
        assert!(list.is_empty());
    }

    #[test]
    fn test_kind_from_path() {
        assert_eq!(
            MediaKind::from_path(&PathBuf::from("/tmp/x.JPG")),
            Some(MediaKind::Image)
        );
        assert_eq!(
            MediaKind::from_path(&PathBuf::from("clip.mov")),
            Some(MediaKind::Video)
        );
        assert_eq!(MediaKind::from_path(&PathBuf::from("notes.txt")), None);
        assert_eq!(MediaKind::from_path(&PathBuf::from("noext")), None);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_string(&MediaItem::video("file:///v.mp4")).unwrap();
        assert_eq!(json, r#"{"uri":"file:///v.mp4","type":"video"}"#);
    }
}
