/// Story content compiled into the crate.

use crate::core::story::{StoryError, StoryGraph};

/// The "Gold Country, 1851" story, in RON.
pub const GOLD_COUNTRY: &str = include_str!("../story_data/gold_country/story.ron");

/// Parse and validate the bundled Gold Country story.
pub fn gold_country() -> Result<StoryGraph, StoryError> {
    StoryGraph::parse_ron(GOLD_COUNTRY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_story_validates() {
        let graph = gold_country().unwrap();
        assert_eq!(graph.start().as_str(), "camp");
        assert!(graph.unreachable().is_empty());
    }
}
