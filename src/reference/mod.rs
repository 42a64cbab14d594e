use crate::constants;


/// An immutable `repository[@digest]` snapshot of an image reference.
///
/// The accessors only recognize the digest form when the string contains
/// exactly one `@` separator; anything else is tolerated and simply yields
/// `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    reference: String,
}

impl ImageReference {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
        }
    }

    /// Build a digest-form reference from its two halves.
    pub fn from_parts(repository: &str, digest: &str) -> Self {
        Self::new(format!("{}@{}", repository, digest))
    }

    /// The substring before the `@` separator, if the reference is in digest form.
    pub fn repository(&self) -> Option<&str> {
        self.split().map(|(repository, _)| repository)
    }

    /// The substring after the `@` separator, if the reference is in digest form.
    pub fn digest(&self) -> Option<&str> {
        self.split().map(|(_, digest)| digest)
    }

    fn split(&self) -> Option<(&str, &str)> {
        let (repository, digest) = self.reference.split_once('@')?;
        if digest.contains('@') {
            return None;
        }
        Some((repository, digest))
    }
}

impl std::fmt::Display for ImageReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.reference)
    }
}

impl serde::Serialize for ImageReference {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.reference)
    }
}

/// Extract the tag from a tag-form image reference.
///
/// Digest-pinned references carry no tag and yield `None`. Otherwise the tag
/// is the text after the last colon occurring after the last slash,
/// defaulting to `latest` when no colon is present in that position (a colon
/// earlier in the string belongs to a registry port, not a tag).
pub fn extract_tag(reference: &str) -> Option<String> {
    if reference.contains('@') {
        return None;
    }

    let last_segment = reference.rsplit('/').next().unwrap_or(reference);
    match last_segment.rsplit_once(':') {
        Some((_, tag)) if !tag.is_empty() => Some(tag.to_string()),
        _ => Some(constants::tag::DEFAULT.to_string()),
    }
}
