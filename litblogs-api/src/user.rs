use uuid::Uuid;

use crate::STUB_UUID;

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn stub() -> UserId {
        UserId(STUB_UUID)
    }
}

/// Who wrote a comment, as much as is needed to display it
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Author {
    pub id: UserId,
    pub name: String,
    pub display_name: Option<String>,
}

impl Author {
    pub fn display(&self) -> &str {
        match &self.display_name {
            Some(d) if !d.trim().is_empty() => d,
            _ => &self.name,
        }
    }

    /// Up to two uppercase letters, taken from the first words of the display name
    pub fn initials(&self) -> String {
        let res = self
            .display()
            .split_whitespace()
            .filter_map(|w| w.chars().next())
            .take(2)
            .flat_map(|c| c.to_uppercase())
            .collect::<String>();
        match res.is_empty() {
            true => String::from("?"),
            false => res,
        }
    }
}
