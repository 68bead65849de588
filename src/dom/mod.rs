// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Markup parsing for gateway pages
//!
//! Turns relay and logout-confirmation pages into a flat tag tree built on
//! top of html5ever. Only elements and attributes are kept.

mod document;
mod element;
mod parser;

pub use document::Document;
pub use element::Element;
pub use parser::parse_markup;
