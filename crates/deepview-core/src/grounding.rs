use serde::Deserialize;
use serde::Serialize;

pub const GROUNDING_INSTRUCTION: &str =
    "Use retrieve_uploaded_context on these files before answering.";

/// Files picked as context for the next message, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroundingSelection(Vec<String>);

impl GroundingSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploaded files are selected automatically; selecting twice is a no-op.
    pub fn add(&mut self, file: impl Into<String>) {
        let file = file.into();
        if !self.contains(&file) {
            self.0.push(file);
        }
    }

    /// Returns whether the file is selected afterwards.
    pub fn toggle(&mut self, file: &str) -> bool {
        if self.contains(file) {
            self.0.retain(|selected| selected != file);
            false
        } else {
            self.0.push(file.to_string());
            true
        }
    }

    pub fn contains(&self, file: &str) -> bool {
        self.0.iter().any(|selected| selected == file)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for GroundingSelection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut selection = Self::new();
        for file in iter {
            selection.add(file);
        }
        selection
    }
}

/// The text actually sent for a chat submission, or `None` when there is
/// nothing to send.
pub fn compose_message(input: &str, grounding: &GroundingSelection) -> Option<String> {
    let text = input.trim();
    if text.is_empty() {
        return None;
    }
    if grounding.is_empty() {
        return Some(text.to_string());
    }
    let files = grounding.iter().collect::<Vec<_>>().join(", ");
    Some(format!(
        "Grounding files: {files}.\n{GROUNDING_INSTRUCTION}\n\n{text}"
    ))
}
