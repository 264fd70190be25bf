//! Focus activity catalog.
//!
//! The app lets the user tag a session with the activity they intend to
//! focus on. The catalog is an ordered list of activity names; the first
//! entry is the default the session starter falls back to when the user
//! starts a session without picking one.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityCatalog {
    activities: Vec<String>,
}

impl ActivityCatalog {
    pub fn new(activities: Vec<String>) -> Self {
        Self { activities }
    }

    /// The activity used when the user starts a session without choosing one.
    pub fn default_activity(&self) -> &str {
        self.activities
            .first()
            .map(String::as_str)
            .unwrap_or("mindfulness")
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.activities.get(index).map(String::as_str)
    }

    /// Index of a named activity, if it is in the catalog.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.activities.iter().position(|a| a == name)
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}

impl Default for ActivityCatalog {
    fn default() -> Self {
        Self {
            activities: vec![
                "mindfulness".into(),
                "reading".into(),
                "study".into(),
                "exercise".into(),
                "deep work".into(),
            ],
        }
    }
}
