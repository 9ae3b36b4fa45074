//! Spoken announcements
//!
//! Text for the moments the voice layer should always speak, independent of
//! its rate limiting: a counted repetition, a repetition rejected for form,
//! the start of an exercise and a counter reset.

use crate::scoring::POOR_FORM_THRESHOLD;

/// Score below which a rejected rep gets the "close" wording instead of "almost perfect"
const CLOSE_FORM_THRESHOLD: u8 = 75;

/// Announcement for a repetition that passed the perfect-form gate
pub fn rep_counted(rep_count: u32, exercise_name: &str) -> String {
    match rep_count {
        1 => format!("Perfect {exercise_name}! One quality rep!"),
        5 => format!("Excellent! Five perfect {exercise_name}s!"),
        10 => "Outstanding! Ten perfect reps! You're crushing it!".to_string(),
        n if n > 0 && n % 5 == 0 => format!("Amazing! {n} perfect reps completed!"),
        n => format!("Perfect rep {n}! Great form!"),
    }
}

/// Announcement for a repetition discarded by the perfect-form gate
pub fn rep_rejected(form_score: u8) -> String {
    if form_score < POOR_FORM_THRESHOLD {
        "Rep not counted! Focus on proper form!".to_string()
    } else if form_score < CLOSE_FORM_THRESHOLD {
        "Close! Improve your form for the rep to count!".to_string()
    } else {
        "Almost perfect! Just a bit more precision!".to_string()
    }
}

pub fn exercise_started(exercise_name: &str) -> String {
    format!("Starting {exercise_name}. Get into position!")
}

pub fn counter_reset() -> String {
    "Perfect form counter reset! Ready for quality reps!".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rep_counted_milestones() {
        assert_eq!(rep_counted(1, "Squat"), "Perfect Squat! One quality rep!");
        assert_eq!(rep_counted(2, "Squat"), "Perfect rep 2! Great form!");
        assert_eq!(rep_counted(5, "Squat"), "Excellent! Five perfect Squats!");
        assert_eq!(
            rep_counted(10, "Squat"),
            "Outstanding! Ten perfect reps! You're crushing it!"
        );
        assert_eq!(rep_counted(15, "Squat"), "Amazing! 15 perfect reps completed!");
        assert_eq!(rep_counted(17, "Squat"), "Perfect rep 17! Great form!");
    }

    #[test]
    fn test_rep_rejected_wording() {
        assert_eq!(rep_rejected(40), "Rep not counted! Focus on proper form!");
        assert_eq!(
            rep_rejected(60),
            "Close! Improve your form for the rep to count!"
        );
        assert_eq!(rep_rejected(80), "Almost perfect! Just a bit more precision!");
    }

    #[test]
    fn test_session_announcements() {
        assert_eq!(
            exercise_started("Bicep Curl"),
            "Starting Bicep Curl. Get into position!"
        );
        assert!(counter_reset().contains("reset"));
    }
}
