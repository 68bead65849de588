// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Element entries of the flat tag tree

/// Element with its attributes and a link to its parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Local name (lowercase)
    pub name: String,
    /// Attributes in source order
    pub attributes: Vec<(String, String)>,
    /// Index of the parent element in the owning document
    pub parent: Option<usize>,
}

impl Element {
    /// Create a new element without attributes
    pub fn new(name: impl Into<String>, parent: Option<usize>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            parent,
        }
    }

    /// Get local name (lowercase)
    pub fn local_name(&self) -> &str {
        &self.name
    }

    /// Get an attribute value
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Lowercased `type` attribute, `text` when missing
    pub fn input_type(&self) -> String {
        self.get_attribute("type")
            .map(|t| t.trim().to_ascii_lowercase())
            .unwrap_or_else(|| "text".to_string())
    }
}
