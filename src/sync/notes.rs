use super::{freshest, log_skip, Change, Origin, SyncCore};
use crate::error::Result;
use crate::models::{new_record_id, NewStickyNote, StickyNote, StickyNotePatch};
use crate::validation::validate_note_text;
use log::warn;

impl SyncCore {
    pub fn add_sticky_note(&self, input: &NewStickyNote) -> Result<StickyNote> {
        let _guard = self.lock_mutations();
        validate_note_text(&input.text).inspect_err(log_skip)?;
        let note = StickyNote::new(new_record_id(), input, self.clock.now());
        self.write_note(note)
    }

    /// Merge `patch` onto the freshest copy of the note and write it.
    pub fn update_sticky_note(&self, id: &str, patch: &StickyNotePatch) -> Result<StickyNote> {
        let _guard = self.lock_mutations();
        if let Some(text) = &patch.text {
            validate_note_text(text).inspect_err(log_skip)?;
        }
        let mut note = freshest(&self.repos.notes, &self.state.notes, id)?;
        note.apply(patch);
        self.write_note(note)
    }

    pub fn toggle_pin_sticky_note(&self, id: &str) -> Result<StickyNote> {
        let _guard = self.lock_mutations();
        let mut note = freshest(&self.repos.notes, &self.state.notes, id)?;
        note.apply(&StickyNotePatch::pinned(!note.is_pinned));
        self.write_note(note)
    }

    pub fn delete_sticky_note(&self, id: &str) -> Result<()> {
        let _guard = self.lock_mutations();
        self.repos
            .notes
            .delete(id)
            .inspect_err(|e| warn!("Failed to delete note '{id}': {e}"))?;
        self.state.notes.apply(Origin::Local, Change::Remove(id.to_string()));
        Ok(())
    }

    /// Pinned first, then newest first.
    pub fn sticky_notes(&self) -> Vec<StickyNote> {
        self.state.notes.snapshot()
    }

    fn write_note(&self, note: StickyNote) -> Result<StickyNote> {
        self.repos
            .notes
            .save(&note)
            .inspect_err(|e| warn!("Failed to save note '{}': {e}", note.id))?;
        self.state.notes.apply(Origin::Local, Change::Upsert(note.clone()));
        Ok(note)
    }
}
