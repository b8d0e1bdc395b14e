use super::Record;
use crate::catalog::NOTE_COLORS;
use crate::store::Collection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

const DEFAULT_NOTE_COLOR: &str = "#fff9c4";
const DEFAULT_NOTE_BORDER: &str = "#fbc02d";

fn default_color() -> String {
    DEFAULT_NOTE_COLOR.to_string()
}

fn default_border() -> String {
    DEFAULT_NOTE_BORDER.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickyNote {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_border")]
    pub border_color: String,
    #[serde(default)]
    pub is_pinned: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewStickyNote {
    pub text: String,
    /// Preset id ("yellow", "blue", ...) or a raw background color.
    pub color: Option<String>,
    pub border_color: Option<String>,
    pub is_pinned: bool,
}

/// Fields to change on an existing note; `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StickyNotePatch {
    pub text: Option<String>,
    pub color: Option<String>,
    pub border_color: Option<String>,
    pub is_pinned: Option<bool>,
}

impl StickyNotePatch {
    pub fn pinned(is_pinned: bool) -> Self {
        Self {
            is_pinned: Some(is_pinned),
            ..Self::default()
        }
    }
}

/// Resolve a preset id to its (background, border) pair.
fn preset(color: &str) -> Option<(&'static str, &'static str)> {
    NOTE_COLORS
        .iter()
        .find(|(id, _, _)| *id == color)
        .map(|(_, bg, border)| (*bg, *border))
}

fn resolve_colors(color: Option<&str>, border: Option<&str>) -> (String, String) {
    match color.map(|c| (c, preset(c))) {
        Some((_, Some((bg, preset_border)))) => {
            (bg.to_string(), border.unwrap_or(preset_border).to_string())
        }
        Some((raw, None)) => (raw.to_string(), border.unwrap_or(DEFAULT_NOTE_BORDER).to_string()),
        None => (default_color(), border.map_or_else(default_border, str::to_string)),
    }
}

impl StickyNote {
    pub fn new(id: String, input: &NewStickyNote, created_at: DateTime<Utc>) -> Self {
        let (color, border_color) =
            resolve_colors(input.color.as_deref(), input.border_color.as_deref());
        Self {
            id,
            text: input.text.trim().to_string(),
            color,
            border_color,
            is_pinned: input.is_pinned,
            created_at,
        }
    }

    /// Shallow merge: every provided field replaces the stored one.
    pub fn apply(&mut self, patch: &StickyNotePatch) {
        if let Some(text) = &patch.text {
            self.text = text.trim().to_string();
        }
        if patch.color.is_some() || patch.border_color.is_some() {
            let (color, border) = match (&patch.color, &patch.border_color) {
                (Some(color), border) => resolve_colors(Some(color.as_str()), border.as_deref()),
                (None, Some(border)) => (self.color.clone(), border.clone()),
                (None, None) => (self.color.clone(), self.border_color.clone()),
            };
            self.color = color;
            self.border_color = border;
        }
        if let Some(is_pinned) = patch.is_pinned {
            self.is_pinned = is_pinned;
        }
    }
}

/// Display order: pinned first, then newest first.
pub fn sort_for_display(notes: &mut [StickyNote]) {
    notes.sort_by_key(|n| (!n.is_pinned, Reverse(n.created_at)));
}

impl Record for StickyNote {
    const COLLECTION: Collection = Collection::Notes;
    const ENTITY: &'static str = "Sticky note";

    fn id(&self) -> String {
        self.id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_767_600_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_new_note_defaults_to_yellow() {
        let note = StickyNote::new("n1".into(), &NewStickyNote { text: " hi ".into(), ..Default::default() }, at(0));
        assert_eq!(note.text, "hi");
        assert_eq!(note.color, "#fff9c4");
        assert_eq!(note.border_color, "#fbc02d");
        assert!(!note.is_pinned);
    }

    #[test]
    fn test_preset_color_resolves_border() {
        let input = NewStickyNote {
            text: "x".into(),
            color: Some("blue".into()),
            ..Default::default()
        };
        let note = StickyNote::new("n1".into(), &input, at(0));
        assert_eq!(note.color, "#e3f2fd");
        assert_eq!(note.border_color, "#64b5f6");
    }

    #[test]
    fn test_apply_only_touches_provided_fields() {
        let mut note = StickyNote::new("n1".into(), &NewStickyNote { text: "a".into(), ..Default::default() }, at(0));
        note.apply(&StickyNotePatch::pinned(true));
        assert!(note.is_pinned);
        assert_eq!(note.text, "a");

        note.apply(&StickyNotePatch {
            color: Some("green".into()),
            ..Default::default()
        });
        assert_eq!(note.color, "#e8f5e9");
        assert_eq!(note.border_color, "#81c784");
        assert!(note.is_pinned);
    }

    #[test]
    fn test_sort_pinned_then_newest() {
        let make = |id: &str, pinned: bool, secs: i64| StickyNote {
            id: id.into(),
            text: String::new(),
            color: default_color(),
            border_color: default_border(),
            is_pinned: pinned,
            created_at: at(0) + Duration::seconds(secs),
        };
        let mut notes = vec![make("old", false, 1), make("pin-old", true, 2), make("new", false, 5), make("pin-new", true, 3)];
        sort_for_display(&mut notes);
        let ids: Vec<_> = notes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["pin-new", "pin-old", "new", "old"]);
    }

    #[test]
    fn test_legacy_note_without_optional_fields() {
        let note: StickyNote = serde_json::from_value(json!({
            "id": "1736000000000",
            "text": "Revise optics",
            "createdAt": "2026-01-04T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(note.color, "#fff9c4");
        assert!(!note.is_pinned);
    }
}
