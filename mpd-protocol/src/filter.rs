//! Typed tag selectors for find/search/list commands

use std::fmt;

use serde::{Deserialize, Serialize};

/// A metadata tag usable as a query selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    Artist,
    AlbumArtist,
    Album,
    Title,
    Genre,
    Date,
    Composer,
    Performer,
    Track,
    Disc,
    /// Match against any tag
    Any,
    /// Match against the file path
    File,
    /// Restrict to songs under a directory
    Base,
}

impl Tag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Artist => "artist",
            Tag::AlbumArtist => "albumartist",
            Tag::Album => "album",
            Tag::Title => "title",
            Tag::Genre => "genre",
            Tag::Date => "date",
            Tag::Composer => "composer",
            Tag::Performer => "performer",
            Tag::Track => "track",
            Tag::Disc => "disc",
            Tag::Any => "any",
            Tag::File => "file",
            Tag::Base => "base",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tag/value constraint; a query takes a conjunction of these
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub tag: Tag,
    pub value: String,
}

impl Filter {
    pub fn tag(tag: Tag, value: impl Into<String>) -> Self {
        Self {
            tag,
            value: value.into(),
        }
    }

    /// Constrain results to a directory subtree
    pub fn base(path: impl Into<String>) -> Self {
        Self::tag(Tag::Base, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_names() {
        assert_eq!(Tag::AlbumArtist.as_str(), "albumartist");
        assert_eq!(Tag::Any.to_string(), "any");
    }

    #[test]
    fn test_base_filter() {
        let f = Filter::base("music/jazz");
        assert_eq!(f.tag, Tag::Base);
        assert_eq!(f.value, "music/jazz");
    }
}
