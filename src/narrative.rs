//! Narrative emitter: ordered rich-text paragraphs with embedded references
//! to scene blocks and dimension labels.
//!
//! Paragraphs are tagged-fragment sequences rather than markup; emission
//! pacing (typewriter reveal, waiting at barriers) belongs to the external
//! driver. This module only preserves ordering and reference resolution.

use serde::Serialize;

use crate::scene::block::BlockId;

/// Styling class for a dimension label reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DimStyle {
    /// Sequence position (column index).
    T,
    /// Channel count (column length).
    C,
}

/// One fragment of a narrative paragraph.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Fragment {
    /// Plain text.
    Text(String),
    /// Label linked to a scene block; hovering/revealing it highlights the block.
    BlockRef {
        /// Display label.
        label: String,
        /// Referenced block.
        block: BlockId,
    },
    /// Label linked to a model dimension.
    DimRef {
        /// Display label.
        label: String,
        /// Dimension styling class.
        style: DimStyle,
    },
}

/// A paragraph bound to a narrative segment (the scheduler's break index at
/// declaration time).
#[derive(Clone, Debug, Serialize)]
pub struct Paragraph {
    /// Segment the paragraph is paced against.
    pub segment: usize,
    /// Ordered fragments.
    pub fragments: Vec<Fragment>,
}

/// Collects the step's paragraphs for the current frame, in call order.
#[derive(Clone, Debug, Default)]
pub struct Narrative {
    paragraphs: Vec<Paragraph>,
}

impl Narrative {
    /// Create an empty narrative sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard all paragraphs for a new frame.
    pub fn begin_frame(&mut self) {
        self.paragraphs.clear();
    }

    /// Start a paragraph in the given segment.
    pub fn paragraph(&mut self, segment: usize) -> ParagraphBuilder<'_> {
        self.paragraphs.push(Paragraph {
            segment,
            fragments: Vec::new(),
        });
        let last = self.paragraphs.len() - 1;
        ParagraphBuilder {
            fragments: &mut self.paragraphs[last].fragments,
        }
    }

    /// Paragraphs emitted this frame, in call order.
    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }
}

/// Appends fragments to the paragraph being built.
pub struct ParagraphBuilder<'a> {
    fragments: &'a mut Vec<Fragment>,
}

impl ParagraphBuilder<'_> {
    /// Append plain text.
    pub fn text(self, s: impl Into<String>) -> Self {
        self.fragments.push(Fragment::Text(s.into()));
        self
    }

    /// Append a block reference.
    pub fn block_ref(self, label: impl Into<String>, block: BlockId) -> Self {
        self.fragments.push(Fragment::BlockRef {
            label: label.into(),
            block,
        });
        self
    }

    /// Append a dimension reference.
    pub fn dim_ref(self, label: impl Into<String>, style: DimStyle) -> Self {
        self.fragments.push(Fragment::DimRef {
            label: label.into(),
            style,
        });
        self
    }
}
