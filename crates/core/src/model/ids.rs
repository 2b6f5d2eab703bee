use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error type for parsing an ID from a string.
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

// Backend ids are opaque document ids (`_id`), so every id wraps a string.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() || trimmed.contains('/') {
                    return Err(ParseIdError {
                        kind: stringify!($name),
                    });
                }
                Ok(Self(trimmed.to_owned()))
            }
        }
    };
}

string_id!(
    /// Unique identifier for an Assessment
    AssessmentId
);
string_id!(
    /// Unique identifier for a Question
    QuestionId
);
string_id!(
    /// Unique identifier for a Course
    CourseId
);
string_id!(
    /// Unique identifier for a server-side Result
    ResultId
);

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assessment_id_display() {
        let id = AssessmentId::new("65a1f0");
        assert_eq!(id.to_string(), "65a1f0");
        assert_eq!(format!("{id:?}"), "AssessmentId(65a1f0)");
    }

    #[test]
    fn question_id_from_str_trims() {
        let id: QuestionId = "  q-1 ".parse().unwrap();
        assert_eq!(id, QuestionId::new("q-1"));
    }

    #[test]
    fn id_from_str_rejects_empty_and_path_segments() {
        assert!("".parse::<CourseId>().is_err());
        assert!("   ".parse::<CourseId>().is_err());
        assert!("a/b".parse::<AssessmentId>().is_err());
    }
}
