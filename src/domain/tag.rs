use std::fmt::Display;

use serde::Deserialize;
use serde::Serialize;

/// Whether a tag is being attached to (`Active`) or removed from (`Inactive`)
/// a member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagStatus {
    #[default]
    Active,
    Inactive,
}

impl Display for TagStatus {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TagStatus::Active => "active",
                TagStatus::Inactive => "inactive",
            }
        )
    }
}

/// A single entry of the tag-update payload, sent verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub name: String,
    pub status: TagStatus,
}

/// Tag names sharing a single status. Every name becomes one `Tag`, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagList {
    names: Vec<String>,
    status: TagStatus,
}

impl TagList {
    pub fn new<I, S>(
        names: I,
        status: TagStatus,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            status,
        }
    }

    pub fn tags(&self) -> Vec<Tag> {
        self.names
            .iter()
            .map(|name| Tag {
                name: name.clone(),
                status: self.status,
            })
            .collect()
    }
}

/// Comma separated names, for log messages
impl Display for TagList {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}", self.names.join(", "))
    }
}
