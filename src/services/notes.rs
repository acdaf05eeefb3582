use chrono::Utc;

use crate::models::{Note, NoteDraft, NotePatch, Record};
use crate::services::{IntoRecordId, Service, ServiceError, require_title};
use crate::store::Collection;

impl<B> Service<'_, Note, B>
where
    B: Collection<Note> + ?Sized,
{
    pub fn create(&mut self, draft: NoteDraft) -> Result<Note, ServiceError> {
        let now = Utc::now();
        let created_at = draft.created_at.unwrap_or(now);
        let note = Note {
            id: 0,
            title: require_title(Note::KIND, &draft.title)?,
            content: draft.content,
            tags: draft.tags,
            created_at,
            updated_at: draft.updated_at.unwrap_or(now).max(created_at),
        };
        self.insert(note)
    }

    /// Every update refreshes `updated_at`
    pub fn update(&mut self, id: impl IntoRecordId, patch: NotePatch) -> Result<Note, ServiceError> {
        if let Some(title) = &patch.title {
            require_title(Note::KIND, title)?;
        }
        self.modify(id, |note| {
            patch.apply(note);
            note.title = note.title.trim().to_string();
            note.updated_at = Utc::now().max(note.created_at);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_tags;
    use crate::services::NoteService;
    use crate::store::MemoryBackend;
    use chrono::Duration;

    #[test]
    fn create_stamps_both_timestamps() {
        let mut backend = MemoryBackend::new();
        let note = NoteService::new(&mut backend)
            .create(NoteDraft { title: "Ideas".to_string(), ..NoteDraft::default() })
            .unwrap();
        assert_eq!(note.created_at, note.updated_at);
    }

    #[test]
    fn update_refreshes_updated_at() {
        let mut backend = MemoryBackend::new();
        let mut service = NoteService::new(&mut backend);
        let long_ago = Utc::now() - Duration::days(30);
        let note = service
            .create(NoteDraft {
                title: "Old".to_string(),
                created_at: Some(long_ago),
                updated_at: Some(long_ago),
                ..NoteDraft::default()
            })
            .unwrap();

        let updated = service
            .update(note.id, NotePatch { tags: Some(parse_tags("a, b")), ..NotePatch::default() })
            .unwrap();

        assert!(updated.updated_at > long_ago);
        assert_eq!(updated.created_at, long_ago);
        assert_eq!(updated.tags.len(), 2);
        assert_eq!(updated.title, "Old");
    }

    #[test]
    fn updated_at_never_precedes_created_at() {
        let mut backend = MemoryBackend::new();
        let now = Utc::now();
        let note = NoteService::new(&mut backend)
            .create(NoteDraft {
                title: "Skewed".to_string(),
                created_at: Some(now),
                updated_at: Some(now - Duration::hours(1)),
                ..NoteDraft::default()
            })
            .unwrap();
        assert!(note.updated_at >= note.created_at);
    }
}
