//! Profile data model.
//!
//! The shapes here mirror what the content API returns: every text field is
//! a sequence of styled fragments, each with its own annotations and an
//! optional link target. Snapshots are immutable once decoded; a refresh
//! produces a new [`ProfileInfo`] rather than patching the old one.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A run of rich text: styled fragments in display order.
pub type RichText = Vec<StyledTextFragment>;

/// Style flags attached to a fragment.
///
/// Every flag defaults to `false` so that upstream payloads may omit the
/// whole object or any part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Annotations {
    /// Bold text.
    pub bold: bool,
    /// Italic text.
    pub italic: bool,
    /// Struck-through text.
    pub strikethrough: bool,
    /// Underlined text.
    pub underline: bool,
    /// Inline code.
    pub code: bool,
    /// Colour name as reported upstream; `"default"` when unset.
    pub color: String,
}

impl Default for Annotations {
    fn default() -> Self {
        Self {
            bold: false,
            italic: false,
            strikethrough: false,
            underline: false,
            code: false,
            color: "default".to_string(),
        }
    }
}

impl Annotations {
    /// True when no style flag is set.
    pub fn is_plain(&self) -> bool {
        !(self.bold || self.italic || self.strikethrough || self.underline || self.code)
    }
}

/// The atomic unit of rich text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledTextFragment {
    /// The text content. Always present.
    pub plain_text: String,

    /// Style flags.
    #[serde(default)]
    pub annotations: Annotations,

    /// Link target, if the fragment is a link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl StyledTextFragment {
    /// Creates an unstyled fragment.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            plain_text: text.into(),
            annotations: Annotations::default(),
            href: None,
        }
    }

    /// Sets the bold flag.
    pub fn bold(mut self) -> Self {
        self.annotations.bold = true;
        self
    }

    /// Sets the italic flag.
    pub fn italic(mut self) -> Self {
        self.annotations.italic = true;
        self
    }

    /// Sets the strikethrough flag.
    pub fn strikethrough(mut self) -> Self {
        self.annotations.strikethrough = true;
        self
    }

    /// Sets the underline flag.
    pub fn underline(mut self) -> Self {
        self.annotations.underline = true;
        self
    }

    /// Sets the code flag.
    pub fn code(mut self) -> Self {
        self.annotations.code = true;
        self
    }

    /// Turns the fragment into a link.
    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }
}

/// Labelled contact/social links, in display order.
///
/// Serialized as a JSON object. Decoding keeps the order in which labels
/// appear in the document; a repeated label replaces the earlier value in
/// place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Links(Vec<(String, RichText)>);

impl Links {
    /// Creates an empty link list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the text for `label`.
    ///
    /// A new label is appended; an existing one keeps its position.
    pub fn insert(&mut self, label: impl Into<String>, text: RichText) {
        let label = label.into();
        match self.0.iter_mut().find(|(l, _)| *l == label) {
            Some((_, existing)) => *existing = text,
            None => self.0.push((label, text)),
        }
    }

    /// Looks up the text for `label`.
    pub fn get(&self, label: &str) -> Option<&RichText> {
        self.0.iter().find(|(l, _)| l == label).map(|(_, t)| t)
    }

    /// Iterates labels and their text in display order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RichText)> {
        self.0.iter().map(|(l, t)| (l.as_str(), t))
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no labels.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<L: Into<String>> FromIterator<(L, RichText)> for Links {
    fn from_iter<I: IntoIterator<Item = (L, RichText)>>(iter: I) -> Self {
        let mut links = Links::new();
        for (label, text) in iter {
            links.insert(label, text);
        }
        links
    }
}

impl Serialize for Links {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, text) in &self.0 {
            map.serialize_entry(label, text)?;
        }
        map.end()
    }
}

struct LinksVisitor;

impl<'de> Visitor<'de> for LinksVisitor {
    type Value = Links;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map from link label to rich text")
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Links, E> {
        Ok(Links::new())
    }

    fn visit_none<E: serde::de::Error>(self) -> Result<Links, E> {
        Ok(Links::new())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Links, A::Error> {
        let mut links = Links::new();
        while let Some((label, text)) = access.next_entry::<String, RichText>()? {
            links.insert(label, text);
        }
        Ok(links)
    }
}

impl<'de> Deserialize<'de> for Links {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LinksVisitor)
    }
}

/// One snapshot of profile content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileInfo {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<RichText>,

    /// One-line headline under the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<RichText>,

    /// Greeting shown above the description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salutation: Option<RichText>,

    /// Body text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<RichText>,

    /// Footer line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<RichText>,

    /// URL of the profile picture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,

    /// Contact and social links.
    #[serde(default)]
    pub links: Links,
}

impl ProfileInfo {
    /// The plain text of the first name fragment, if any.
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_ref()
            .and_then(|name| name.first())
            .map(|fragment| fragment.plain_text.as_str())
    }
}
