//! Hand-off of finished posts to the surrounding application.

use regex::Regex;
use std::sync::LazyLock;

use crate::state::data::PostRecord;

static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\w+").expect("valid regex"));

/// Hashtags in caption order, `#` included. Duplicates are kept.
pub fn extract_hashtags(caption: &str) -> Vec<String> {
    HASHTAG_RE
        .find_iter(caption)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Receives a post once its upload completes
pub trait Feed {
    fn publish(&mut self, post: PostRecord);
}

/// Newest-first list of posts
#[derive(Debug, Default, Clone)]
pub struct MemoryFeed {
    posts: Vec<PostRecord>,
}

impl MemoryFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn posts(&self) -> &[PostRecord] {
        &self.posts
    }
}

impl Feed for MemoryFeed {
    fn publish(&mut self, post: PostRecord) {
        tracing::info!(id = %post.id, hashtags = post.hashtags.len(), "post published");
        self.posts.insert(0, post);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::{MediaSource, Quality};
    use crate::state::edit::EditState;

    #[test]
    fn test_hashtags_in_order() {
        assert_eq!(
            extract_hashtags("Beach day #summer #fun, back to #summer!"),
            vec!["#summer", "#fun", "#summer"]
        );
        assert!(extract_hashtags("no tags # here").is_empty());
        assert_eq!(extract_hashtags("#a_b1#c"), vec!["#a_b1", "#c"]);
    }

    #[test]
    fn test_feed_prepends() {
        let media = MediaSource::from_file("a.mp4", "video/mp4").unwrap();
        let state = EditState::for_duration(3.0);
        let mut feed = MemoryFeed::new();

        let mut first = PostRecord::new(media.clone(), &state, "one", vec![], Quality::Hd, None);
        first.id = "v-1".into();
        let mut second = PostRecord::new(media, &state, "two", vec![], Quality::Hd, None);
        second.id = "v-2".into();

        feed.publish(first);
        feed.publish(second);

        let ids: Vec<_> = feed.posts().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["v-2", "v-1"]);
    }
}
