use crate::catalog::TASK_COLORS;
use crate::constants::{
    MAX_BIOLOGY_SCORE, MAX_CHEMISTRY_SCORE, MAX_NOTE_TEXT_LEN, MAX_PHYSICS_SCORE,
    MAX_TASK_TITLE_LEN, MAX_TIMER_MINUTES,
};
use crate::error::AppError;

fn validate_subject(field: &'static str, value: Option<u32>, max: u32) -> Result<u32, AppError> {
    let Some(value) = value else {
        return Err(AppError::ValidationSkipped {
            field,
            reason: "is required".into(),
        });
    };
    if value > max {
        return Err(AppError::ValidationSkipped {
            field,
            reason: format!("must be 0-{max}"),
        });
    }
    Ok(value)
}

/// Validate the three subject scores of a test submission.
/// Returns Ok((physics, chemistry, biology)) if all are present and in range.
pub fn validate_score(
    physics: Option<u32>,
    chemistry: Option<u32>,
    biology: Option<u32>,
) -> Result<(u32, u32, u32), AppError> {
    Ok((
        validate_subject("physics", physics, MAX_PHYSICS_SCORE)?,
        validate_subject("chemistry", chemistry, MAX_CHEMISTRY_SCORE)?,
        validate_subject("biology", biology, MAX_BIOLOGY_SCORE)?,
    ))
}

/// Validate sticky note text.
pub fn validate_note_text(text: &str) -> Result<&str, AppError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::ValidationSkipped {
            field: "text",
            reason: "cannot be empty".into(),
        });
    }
    if text.chars().count() > MAX_NOTE_TEXT_LEN {
        return Err(AppError::ValidationSkipped {
            field: "text",
            reason: format!("cannot exceed {MAX_NOTE_TEXT_LEN} characters"),
        });
    }
    Ok(text)
}

/// Validate calendar task title.
pub fn validate_task_title(title: &str) -> Result<&str, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::ValidationSkipped {
            field: "title",
            reason: "cannot be empty".into(),
        });
    }
    if title.chars().count() > MAX_TASK_TITLE_LEN {
        return Err(AppError::ValidationSkipped {
            field: "title",
            reason: format!("cannot exceed {MAX_TASK_TITLE_LEN} characters"),
        });
    }
    Ok(title)
}

/// Validate a calendar task category against `TASK_COLORS`.
pub fn validate_task_color(color: &str) -> Result<&str, AppError> {
    if TASK_COLORS.iter().any(|(id, _)| *id == color) {
        return Ok(color);
    }
    Err(AppError::ValidationSkipped {
        field: "color",
        reason: format!("unknown category '{color}'"),
    })
}

/// Validate a focus or break length in minutes.
pub fn validate_timer_minutes(minutes: u32) -> Result<u32, AppError> {
    if minutes == 0 {
        return Err(AppError::ValidationSkipped {
            field: "duration",
            reason: "must be positive".into(),
        });
    }
    if minutes > MAX_TIMER_MINUTES {
        return Err(AppError::ValidationSkipped {
            field: "duration",
            reason: format!("cannot exceed {MAX_TIMER_MINUTES} minutes"),
        });
    }
    Ok(minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_score_valid() {
        assert_eq!(validate_score(Some(150), Some(140), Some(300)).unwrap(), (150, 140, 300));
        assert!(validate_score(Some(0), Some(0), Some(0)).is_ok());
        assert!(validate_score(Some(180), Some(180), Some(360)).is_ok());
    }

    #[test]
    fn test_validate_score_missing_field() {
        let err = validate_score(Some(150), None, Some(300)).unwrap_err();
        assert!(matches!(err, AppError::ValidationSkipped { field: "chemistry", .. }));
    }

    #[test]
    fn test_validate_score_out_of_range() {
        assert!(validate_score(Some(181), Some(0), Some(0)).is_err());
        assert!(validate_score(Some(0), Some(0), Some(361)).is_err());
    }

    #[test]
    fn test_validate_note_text() {
        assert_eq!(validate_note_text("  revise optics  ").unwrap(), "revise optics");
        assert!(validate_note_text("   ").is_err());
        assert!(validate_note_text(&"x".repeat(MAX_NOTE_TEXT_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_task_title() {
        assert_eq!(validate_task_title("Mock 3").unwrap(), "Mock 3");
        assert!(validate_task_title("").is_err());
        assert!(validate_task_title(&"x".repeat(MAX_TASK_TITLE_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_timer_minutes() {
        assert_eq!(validate_timer_minutes(25).unwrap(), 25);
        assert!(validate_timer_minutes(0).is_err());
        assert!(validate_timer_minutes(MAX_TIMER_MINUTES + 1).is_err());
    }

    #[test]
    fn test_task_color_must_be_a_category() {
        assert_eq!(validate_task_color("teal").unwrap(), "teal");
        let err = validate_task_color("#123456").unwrap_err();
        assert!(matches!(err, AppError::ValidationSkipped { field: "color", .. }));
    }
}
