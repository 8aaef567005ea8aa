//! Validated text primitives shared across PMS crates.
//!
//! These types make "a string that has already been checked" a distinct type,
//! so downstream code never has to re-validate or defensively trim. Both types
//! validate on construction and on deserialisation.

/// Errors that can occur when creating validated text types.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input text exceeded the maximum allowed length
    #[error("Text exceeds maximum length of {max} characters (got {len})")]
    TooLong { max: usize, len: usize },
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace
/// character. The input is trimmed of leading and trailing whitespace during
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` if the trimmed input is empty or contains
    /// only whitespace.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A string type with a maximum length of `MAX` characters.
///
/// Unlike [`NonEmptyText`] the content may be empty and is stored verbatim
/// (no trimming); only the length bound is enforced. Length is measured in
/// characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedText<const MAX: usize>(String);

impl<const MAX: usize> BoundedText<MAX> {
    /// Creates a new `BoundedText` from the given input.
    ///
    /// # Errors
    ///
    /// Returns `TextError::TooLong` if the input is longer than `MAX`
    /// characters.
    pub fn new(input: impl Into<String>) -> Result<Self, TextError> {
        let text = input.into();
        let len = text.chars().count();
        if len > MAX {
            return Err(TextError::TooLong { max: MAX, len });
        }
        Ok(Self(text))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The maximum number of characters this type accepts.
    pub const fn max_len() -> usize {
        MAX
    }
}

impl<const MAX: usize> std::fmt::Display for BoundedText<MAX> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<const MAX: usize> AsRef<str> for BoundedText<MAX> {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<const MAX: usize> serde::Serialize for BoundedText<MAX> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de, const MAX: usize> serde::Deserialize<'de> for BoundedText<MAX> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        BoundedText::new(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_accepts_and_trims() {
        let text = NonEmptyText::new("  Delhi  ").expect("should accept");
        assert_eq!(text.as_str(), "Delhi");
    }

    #[test]
    fn non_empty_text_rejects_empty_input() {
        assert_eq!(NonEmptyText::new("").expect_err("should reject"), TextError::Empty);
        assert_eq!(
            NonEmptyText::new("   ").expect_err("should reject"),
            TextError::Empty
        );
    }

    #[test]
    fn bounded_text_accepts_up_to_max_chars() {
        let text = BoundedText::<5>::new("abcde").expect("should accept");
        assert_eq!(text.as_str(), "abcde");
        assert!(BoundedText::<5>::new("").is_ok());
    }

    #[test]
    fn bounded_text_rejects_over_length_input() {
        let err = BoundedText::<5>::new("abcdef").expect_err("should reject");
        assert_eq!(err, TextError::TooLong { max: 5, len: 6 });
    }

    #[test]
    fn bounded_text_counts_characters_not_bytes() {
        // Four characters, more than four bytes.
        assert!(BoundedText::<4>::new("日本語字").is_ok());
    }

    #[test]
    fn serde_round_trip_revalidates_on_deserialise() {
        let text = NonEmptyText::new("Mumbai").expect("valid");
        let json = serde_json::to_string(&text).expect("serialise");
        let back: NonEmptyText = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(text, back);

        let err = serde_json::from_str::<NonEmptyText>("\"  \"");
        assert!(err.is_err());
    }
}
