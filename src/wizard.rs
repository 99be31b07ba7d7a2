//! The creator wizard: pick media, edit, review, upload.
//!
//! ```text
//! Selecting -> Editing -> Reviewing -> Uploading -> Completed
//!                 ^  |        |  ^          |
//!      discard <--+  +- back -+  +- cancel -+        (any) -> Cancelled
//! ```

use std::fmt;

use crate::config::EditorConfig;
use crate::error::{EditorError, Result};
use crate::feed::{extract_hashtags, Feed};
use crate::state::data::{MediaSource, PostRecord, Quality};
use crate::state::draft::DraftStore;
use crate::state::session::EditingSession;

/// Observable wizard step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Selecting,
    Editing,
    Reviewing,
    Uploading,
    Completed,
    Cancelled,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::Selecting => "selecting media",
            Step::Editing => "editing",
            Step::Reviewing => "reviewing",
            Step::Uploading => "uploading",
            Step::Completed => "completed",
            Step::Cancelled => "cancelled",
        })
    }
}

#[derive(Debug)]
struct Edit {
    media: MediaSource,
    session: EditingSession,
    quality: Quality,
}

#[derive(Debug)]
enum Phase {
    Selecting,
    Editing(Box<Edit>),
    Reviewing(Box<Edit>),
    Uploading { edit: Box<Edit>, post: Box<PostRecord> },
    Completed(Box<PostRecord>),
    Cancelled,
}

#[derive(Debug)]
pub struct Wizard {
    config: EditorConfig,
    phase: Phase,
}

impl Wizard {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            phase: Phase::Selecting,
        }
    }

    pub fn step(&self) -> Step {
        match self.phase {
            Phase::Selecting => Step::Selecting,
            Phase::Editing(_) => Step::Editing,
            Phase::Reviewing(_) => Step::Reviewing,
            Phase::Uploading { .. } => Step::Uploading,
            Phase::Completed(_) => Step::Completed,
            Phase::Cancelled => Step::Cancelled,
        }
    }

    fn invalid(&self, action: &'static str) -> EditorError {
        EditorError::InvalidTransition {
            from: self.step(),
            action,
        }
    }

    fn edit(&self) -> Option<&Edit> {
        match &self.phase {
            Phase::Editing(edit) | Phase::Reviewing(edit) => Some(edit),
            Phase::Uploading { edit, .. } => Some(edit),
            _ => None,
        }
    }

    /// The live session, from Editing through Uploading
    pub fn session(&self) -> Option<&EditingSession> {
        self.edit().map(|edit| &edit.session)
    }

    /// Mutable access while editing or reviewing (caption is set on review)
    pub fn session_mut(&mut self) -> Option<&mut EditingSession> {
        match &mut self.phase {
            Phase::Editing(edit) | Phase::Reviewing(edit) => Some(&mut edit.session),
            _ => None,
        }
    }

    pub fn media(&self) -> Option<&MediaSource> {
        self.edit().map(|edit| &edit.media)
    }

    pub fn quality(&self) -> Option<Quality> {
        self.edit().map(|edit| edit.quality)
    }

    /// Post being uploaded or already published
    pub fn post(&self) -> Option<&PostRecord> {
        match &self.phase {
            Phase::Uploading { post, .. } | Phase::Completed(post) => Some(post),
            _ => None,
        }
    }

    /// Media is ready and its duration known: open the editor. With
    /// `resume` the stored draft seeds the session; an empty slot is
    /// reported and nothing changes.
    pub fn acquire_media(
        &mut self,
        media: MediaSource,
        source_duration: f64,
        resume: bool,
        store: &dyn DraftStore,
    ) -> Result<()> {
        if !matches!(self.phase, Phase::Selecting) {
            return Err(self.invalid("open media"));
        }

        let seed = if resume {
            Some(EditingSession::load_draft(store)?.ok_or(EditorError::NoDraft)?)
        } else {
            None
        };
        let session = EditingSession::initialize(source_duration, seed, self.config.clone())?;

        tracing::info!(uri = %media.uri, source_duration, resume, "editing started");
        self.phase = Phase::Editing(Box::new(Edit {
            media,
            session,
            quality: Quality::default(),
        }));
        Ok(())
    }

    /// Throw the session away and go back to picking media
    pub fn discard(&mut self) -> Result<()> {
        if !matches!(self.phase, Phase::Editing(_)) {
            return Err(self.invalid("discard"));
        }
        tracing::info!("edit discarded");
        self.phase = Phase::Selecting;
        Ok(())
    }

    /// Editing -> Reviewing
    pub fn next(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.phase, Phase::Cancelled) {
            Phase::Editing(edit) => {
                self.phase = Phase::Reviewing(edit);
                Ok(())
            }
            other => {
                self.phase = other;
                Err(self.invalid("continue to review"))
            }
        }
    }

    /// Reviewing -> Editing
    pub fn back(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.phase, Phase::Cancelled) {
            Phase::Reviewing(edit) => {
                self.phase = Phase::Editing(edit);
                Ok(())
            }
            other => {
                self.phase = other;
                Err(self.invalid("go back to editing"))
            }
        }
    }

    pub fn set_quality(&mut self, quality: Quality) -> Result<()> {
        match &mut self.phase {
            Phase::Reviewing(edit) => {
                edit.quality = quality;
                Ok(())
            }
            _ => Err(self.invalid("choose quality")),
        }
    }

    /// Save the in-progress edit to the draft slot
    pub fn save_draft(&self, store: &mut dyn DraftStore) -> Result<()> {
        match &self.phase {
            Phase::Editing(edit) | Phase::Reviewing(edit) => {
                edit.session.save_draft(store)?;
                Ok(())
            }
            _ => Err(self.invalid("save a draft")),
        }
    }

    /// Reviewing -> Uploading. Hashtags are taken from the caption now.
    pub fn begin_upload(&mut self) -> Result<&PostRecord> {
        match std::mem::replace(&mut self.phase, Phase::Cancelled) {
            Phase::Reviewing(edit) => {
                let caption = edit.session.caption();
                let post = PostRecord::new(
                    edit.media.clone(),
                    edit.session.state(),
                    caption,
                    extract_hashtags(caption),
                    edit.quality,
                    edit.session.selected_sound(),
                );
                tracing::info!(id = %post.id, quality = %post.quality, "upload started");
                self.phase = Phase::Uploading {
                    edit,
                    post: Box::new(post),
                };
                match &self.phase {
                    Phase::Uploading { post, .. } => Ok(post),
                    _ => unreachable!("phase was just set to Uploading"),
                }
            }
            other => {
                self.phase = other;
                Err(self.invalid("upload"))
            }
        }
    }

    /// Uploading -> Reviewing; the draft is left alone
    pub fn cancel_upload(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.phase, Phase::Cancelled) {
            Phase::Uploading { edit, .. } => {
                tracing::info!("upload cancelled");
                self.phase = Phase::Reviewing(edit);
                Ok(())
            }
            other => {
                self.phase = other;
                Err(self.invalid("cancel the upload"))
            }
        }
    }

    /// Uploading -> Completed: clear the draft and hand the post to the feed
    pub fn complete_upload(&mut self, store: &mut dyn DraftStore, feed: &mut dyn Feed) -> Result<PostRecord> {
        if !matches!(self.phase, Phase::Uploading { .. }) {
            return Err(self.invalid("complete the upload"));
        }
        EditingSession::clear_draft(store)?;

        let Phase::Uploading { post, .. } = std::mem::replace(&mut self.phase, Phase::Cancelled) else {
            unreachable!("checked above");
        };
        feed.publish((*post).clone());
        self.phase = Phase::Completed(post.clone());
        Ok(*post)
    }

    /// Leave the wizard from any step that is not already finished
    pub fn cancel(&mut self) -> Result<()> {
        match self.phase {
            Phase::Completed(_) | Phase::Cancelled => Err(self.invalid("cancel")),
            _ => {
                tracing::info!(from = %self.step(), "wizard cancelled");
                self.phase = Phase::Cancelled;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::MemoryFeed;
    use crate::state::draft::MemoryDraftStore;
    use crate::state::edit::TrimEdge;

    fn media() -> MediaSource {
        MediaSource::from_file("clip.mp4", "video/mp4").unwrap()
    }

    fn editing(store: &MemoryDraftStore) -> Wizard {
        let mut wizard = Wizard::new(EditorConfig::default());
        wizard.acquire_media(media(), 10.0, false, store).unwrap();
        wizard
    }

    #[test]
    fn test_happy_path() {
        let mut store = MemoryDraftStore::new();
        let mut feed = MemoryFeed::new();
        let mut wizard = editing(&store);
        assert_eq!(wizard.step(), Step::Editing);

        let session = wizard.session_mut().unwrap();
        session.set_trim(TrimEdge::Start, 2.0);
        session.commit();
        wizard.save_draft(&mut store).unwrap();

        wizard.next().unwrap();
        wizard
            .session_mut()
            .unwrap()
            .set_caption("first post #hello #world");
        wizard.set_quality(Quality::Uhd4k).unwrap();

        let post = wizard.begin_upload().unwrap();
        assert_eq!(post.hashtags, vec!["#hello", "#world"]);
        assert_eq!(post.start_time, 2.0);
        assert_eq!(wizard.step(), Step::Uploading);

        let post = wizard.complete_upload(&mut store, &mut feed).unwrap();
        assert_eq!(post.quality, Quality::Uhd4k);
        assert_eq!(wizard.step(), Step::Completed);
        assert!(store.load().unwrap().is_none());
        assert_eq!(feed.posts().len(), 1);
        assert_eq!(wizard.post().unwrap().id, post.id);
    }

    #[test]
    fn test_invalid_transitions_leave_state_alone() {
        let store = MemoryDraftStore::new();
        let mut wizard = Wizard::new(EditorConfig::default());

        assert!(matches!(
            wizard.next(),
            Err(EditorError::InvalidTransition { from: Step::Selecting, .. })
        ));
        assert!(wizard.discard().is_err());
        assert!(wizard.begin_upload().is_err());
        assert_eq!(wizard.step(), Step::Selecting);

        wizard.acquire_media(media(), 10.0, false, &store).unwrap();
        assert!(wizard.set_quality(Quality::Sd).is_err());
        assert!(wizard.cancel_upload().is_err());
        assert!(wizard.acquire_media(media(), 5.0, false, &store).is_err());
        assert_eq!(wizard.step(), Step::Editing);
        assert_eq!(wizard.session().unwrap().source_duration(), 10.0);
    }

    #[test]
    fn test_resume_without_draft_is_reported() {
        let store = MemoryDraftStore::new();
        let mut wizard = Wizard::new(EditorConfig::default());
        let err = wizard.acquire_media(media(), 10.0, true, &store).unwrap_err();
        assert!(matches!(err, EditorError::NoDraft));
        assert_eq!(wizard.step(), Step::Selecting);
    }

    #[test]
    fn test_resume_seeds_session() {
        let mut store = MemoryDraftStore::new();
        let mut first = editing(&store);
        let session = first.session_mut().unwrap();
        session.set_caption("keep me");
        session.add_text_overlay();
        first.save_draft(&mut store).unwrap();

        let mut wizard = Wizard::new(EditorConfig::default());
        wizard.acquire_media(media(), 10.0, true, &store).unwrap();
        let session = wizard.session().unwrap();
        assert_eq!(session.caption(), "keep me");
        assert_eq!(session.state().text_overlays.len(), 1);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_cancel_upload_returns_to_review_and_keeps_draft() {
        let mut store = MemoryDraftStore::new();
        let mut wizard = editing(&store);
        wizard.save_draft(&mut store).unwrap();
        wizard.next().unwrap();
        wizard.begin_upload().unwrap();

        wizard.cancel_upload().unwrap();
        assert_eq!(wizard.step(), Step::Reviewing);
        assert!(wizard.post().is_none());
        assert!(store.exists().unwrap());

        wizard.back().unwrap();
        assert_eq!(wizard.step(), Step::Editing);
    }

    #[test]
    fn test_discard_destroys_session() {
        let store = MemoryDraftStore::new();
        let mut wizard = editing(&store);
        wizard.session_mut().unwrap().add_text_overlay();
        wizard.discard().unwrap();
        assert_eq!(wizard.step(), Step::Selecting);
        assert!(wizard.session().is_none());

        wizard.acquire_media(media(), 4.0, false, &store).unwrap();
        assert!(wizard.session().unwrap().state().text_overlays.is_empty());
    }

    #[test]
    fn test_cancel_from_any_live_step() {
        let store = MemoryDraftStore::new();
        let mut wizard = editing(&store);
        wizard.cancel().unwrap();
        assert_eq!(wizard.step(), Step::Cancelled);
        assert!(wizard.cancel().is_err());
    }
}
