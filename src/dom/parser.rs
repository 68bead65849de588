// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Markup parser using html5ever

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::ParseOpts;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use super::document::Document;
use super::element::Element;
use crate::error::{Error, Result};

/// Parse HTML (or HTML-shaped XML) into a flat tag tree
///
/// Text, comments and doctypes are dropped; only elements and their
/// attributes survive.
pub fn parse_markup(markup: &str) -> Result<Document> {
    let dom = parse_document(RcDom::default(), ParseOpts::default())
        .from_utf8()
        .read_from(&mut markup.as_bytes())
        .map_err(|e| Error::malformed_relay(format!("markup could not be read: {}", e)))?;

    let mut doc = Document::new();
    let converter = DomConverter::new(&mut doc);
    converter.convert(&dom.document);

    Ok(doc)
}

/// Converts the html5ever tree into a flat document
struct DomConverter<'a> {
    doc: &'a mut Document,
}

impl<'a> DomConverter<'a> {
    fn new(doc: &'a mut Document) -> Self {
        Self { doc }
    }

    fn convert(mut self, handle: &Handle) {
        for child in handle.children.borrow().iter() {
            self.convert_node(child, None);
        }
    }

    fn convert_node(&mut self, handle: &Handle, parent: Option<usize>) {
        let parent = match handle.data {
            NodeData::Element {
                ref name,
                ref attrs,
                ..
            } => {
                let mut element = Element::new(name.local.to_string(), parent);
                for attr in attrs.borrow().iter() {
                    element
                        .attributes
                        .push((attr.name.local.to_string(), attr.value.to_string()));
                }
                Some(self.doc.push(element))
            }
            // Text, comments and the like have no children we care about
            _ => return,
        };

        for child in handle.children.borrow().iter() {
            self.convert_node(child, parent);
        }
    }
}
