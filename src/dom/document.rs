// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Flat document representation

use super::element::Element;

/// Parsed markup as a flat list of elements in document order
#[derive(Debug, Clone, Default)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element, returning its index
    pub(crate) fn push(&mut self, element: Element) -> usize {
        self.elements.push(element);
        self.elements.len() - 1
    }

    /// All elements in document order
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Element at `index`
    pub fn get(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    /// Indices of elements with the given local name
    pub fn find_all(&self, name: &str) -> Vec<usize> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.name == name)
            .map(|(i, _)| i)
            .collect()
    }

    /// Check if `index` sits somewhere below `ancestor`
    pub fn is_descendant(&self, index: usize, ancestor: usize) -> bool {
        let mut current = self.elements.get(index).and_then(|e| e.parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.elements.get(parent).and_then(|e| e.parent);
        }
        false
    }

    /// Descendants of `ancestor` with the given local name, in document order
    pub fn descendants_named(&self, ancestor: usize, name: &str) -> Vec<&Element> {
        self.elements
            .iter()
            .enumerate()
            .skip(ancestor + 1)
            .filter(|(i, e)| e.name == name && self.is_descendant(*i, ancestor))
            .map(|(_, e)| e)
            .collect()
    }

    /// Elements named `name` after `index`, stopping at the next `stop` element
    pub fn following_named(&self, index: usize, name: &str, stop: &str) -> Vec<&Element> {
        self.elements
            .iter()
            .skip(index + 1)
            .take_while(|e| e.name != stop)
            .filter(|e| e.name == name)
            .collect()
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if the document has no elements
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
