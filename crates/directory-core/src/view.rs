//! ============================================================================
//! View Types - What the presentation layer renders
//! ============================================================================

use serde::{Deserialize, Serialize};

use crate::types::ProfileRecord;

/// Text on the "load more" affordance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadMoreLabel {
    /// A fetch is in flight
    Loading,
    /// Another page will be served
    ExploreMore,
    /// Next click goes to the filter surface
    UnlockFilters,
}

impl LoadMoreLabel {
    /// Pick the label from fetch state and usage against the member allowance
    pub fn select(is_fetching_more: bool, usage: u32, allowance: u32) -> Self {
        if is_fetching_more {
            LoadMoreLabel::Loading
        } else if usage >= allowance {
            LoadMoreLabel::UnlockFilters
        } else {
            LoadMoreLabel::ExploreMore
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            LoadMoreLabel::Loading => "Loading...",
            LoadMoreLabel::ExploreMore => "Explore More Members",
            LoadMoreLabel::UnlockFilters => "Unlock More Filters",
        }
    }
}

/// Card data for one member tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileCard {
    pub id: String,
    pub full_name: String,
    pub occupation: String,
    pub image: String,
    /// Route opened when the card is clicked
    pub href: String,
}

impl From<&ProfileRecord> for ProfileCard {
    fn from(record: &ProfileRecord) -> Self {
        Self {
            id: record.id.clone(),
            full_name: record.full_name.clone(),
            occupation: record.display_occupation().to_string(),
            image: record.cover_image().to_string(),
            href: record.profile_path(),
        }
    }
}

/// Render state exposed after every transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorySnapshot {
    /// Initial page in flight
    pub loading: bool,
    /// "Load more" page in flight
    pub is_fetching_more: bool,
    pub members: Vec<ProfileRecord>,
    /// True iff a cursor is held; false hides the affordance entirely
    pub can_load_more: bool,
    pub load_more_label: LoadMoreLabel,
    /// Successful "load more" fetches so far
    pub usage: u32,
}

impl DirectorySnapshot {
    pub fn cards(&self) -> Vec<ProfileCard> {
        self.members.iter().map(ProfileCard::from).collect()
    }

    /// Label to render, or None when the affordance is withdrawn
    pub fn load_more_text(&self) -> Option<&'static str> {
        self.can_load_more.then(|| self.load_more_label.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DEFAULT_OCCUPATION, DEFAULT_PROFILE_IMAGE};

    #[test]
    fn test_label_selection() {
        assert_eq!(LoadMoreLabel::select(false, 0, 1), LoadMoreLabel::ExploreMore);
        assert_eq!(LoadMoreLabel::select(false, 1, 1), LoadMoreLabel::UnlockFilters);
        assert_eq!(LoadMoreLabel::select(true, 0, 1), LoadMoreLabel::Loading);
        assert_eq!(LoadMoreLabel::select(true, 1, 1), LoadMoreLabel::Loading);
        assert_eq!(LoadMoreLabel::select(false, 1, 2), LoadMoreLabel::ExploreMore);
    }

    #[test]
    fn test_label_text() {
        assert_eq!(LoadMoreLabel::ExploreMore.text(), "Explore More Members");
        assert_eq!(LoadMoreLabel::UnlockFilters.text(), "Unlock More Filters");
        assert_eq!(LoadMoreLabel::Loading.text(), "Loading...");
    }

    #[test]
    fn test_card_fallbacks() {
        let card = ProfileCard::from(&ProfileRecord::new("m7", "Divya"));
        assert_eq!(card.occupation, DEFAULT_OCCUPATION);
        assert_eq!(card.image, DEFAULT_PROFILE_IMAGE);
        assert_eq!(card.href, "/profile/m7");
    }

    #[test]
    fn test_withdrawn_affordance_has_no_text() {
        let snapshot = DirectorySnapshot {
            loading: false,
            is_fetching_more: false,
            members: vec![ProfileRecord::new("m1", "Asha")],
            can_load_more: false,
            load_more_label: LoadMoreLabel::UnlockFilters,
            usage: 1,
        };
        assert_eq!(snapshot.load_more_text(), None);
        assert_eq!(snapshot.cards().len(), 1);
    }
}
