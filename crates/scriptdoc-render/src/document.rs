//! Abstract render stream.
//!
//! A [`Document`] is an ordered list of [`Block`]s produced by the line parser.
//! It carries no styling: backends decide how each block looks. Image
//! placeholders can be rewritten after emission through the
//! [`PlaceholderHandle`] returned when they were added.
//!
//! The trailing resource section is always last. Once it exists, body
//! blocks are inserted in front of it, and replacing it never moves a body
//! block.

/// Stable reference to an image placeholder inside a [`Document`].
///
/// Handles stay valid for the lifetime of the document because body blocks
/// never move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlaceholderHandle(usize);

impl PlaceholderHandle {
    /// Position of the placeholder block in the document.
    #[must_use]
    pub fn position(self) -> usize {
        self.0
    }
}

/// Payload of a trailing resource block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resource {
    /// Fetched image bytes.
    Image {
        /// Raw image bytes.
        data: Vec<u8>,
        /// Source URL.
        url: String,
    },
    /// Fetch failure, rendered as a visible error marker.
    Error {
        /// Source URL.
        url: String,
        /// Failure description.
        message: String,
    },
}

/// A single render command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    /// Document-level title, at most one per document.
    MainTitle(String),
    /// Section title (one per parsed text blob).
    Title(String),
    /// Scene title from a `<p=1>` tag.
    SceneTitle(String),
    /// Scene timestamp from a `<p=2>` tag.
    Timestamp(String),
    /// Spoken line. Rendered as `speaker:text` with no space.
    Dialogue {
        /// Bold speaker name.
        speaker: String,
        /// Utterance.
        text: String,
    },
    /// Narration paragraph with first-line indent.
    Narration(String),
    /// Stage or sound cue, rendered in angle brackets.
    SoundCue(String),
    /// Branch marker pointing back at decision options.
    BranchLabel(String),
    /// In-text image reference. `index` is rewritten once final numbering is known.
    ImageRef {
        /// Image number shown to the reader.
        index: usize,
    },
    /// One blank line.
    Spacer,
    /// Page break.
    SectionBreak,
    /// Heading of the trailing resource section.
    ResourceHeading,
    /// One deduplicated resource in the trailing section.
    Resource {
        /// Final index shared by every placeholder pointing at this resource.
        index: usize,
        /// Image payload or failure.
        resource: Resource,
    },
}

/// Display text of an image reference.
#[must_use]
pub fn image_label(index: usize) -> String {
    format!("Image {index}")
}

/// Ordered render stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Block>,
    /// Start of the trailing resource section, if one was set.
    trailer_start: Option<usize>,
}

impl Document {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All blocks in emission order.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether nothing has been emitted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Append a body block, ahead of the resource section if there is one.
    pub fn push(&mut self, block: Block) {
        match &mut self.trailer_start {
            Some(start) => {
                self.blocks.insert(*start, block);
                *start += 1;
            }
            None => self.blocks.push(block),
        }
    }

    /// Blocks before the resource section.
    #[must_use]
    pub fn body(&self) -> &[Block] {
        &self.blocks[..self.body_len()]
    }

    /// Whether a resource section has been set.
    #[must_use]
    pub fn has_resource_section(&self) -> bool {
        self.trailer_start.is_some()
    }

    fn body_len(&self) -> usize {
        self.trailer_start.unwrap_or(self.blocks.len())
    }

    pub fn add_main_title(&mut self, text: impl Into<String>) {
        self.push(Block::MainTitle(text.into()));
    }

    pub fn add_title(&mut self, text: impl Into<String>) {
        self.push(Block::Title(text.into()));
    }

    pub fn add_scene_title(&mut self, text: impl Into<String>) {
        self.push(Block::SceneTitle(text.into()));
    }

    pub fn add_timestamp(&mut self, text: impl Into<String>) {
        self.push(Block::Timestamp(text.into()));
    }

    pub fn add_dialogue(&mut self, speaker: impl Into<String>, text: impl Into<String>) {
        self.push(Block::Dialogue {
            speaker: speaker.into(),
            text: text.into(),
        });
    }

    pub fn add_narration(&mut self, text: impl Into<String>) {
        self.push(Block::Narration(text.into()));
    }

    pub fn add_sound_cue(&mut self, text: impl Into<String>) {
        self.push(Block::SoundCue(text.into()));
    }

    pub fn add_branch_label(&mut self, text: impl Into<String>) {
        self.push(Block::BranchLabel(text.into()));
    }

    /// Append an image placeholder and return a handle for later rewriting.
    pub fn add_image_placeholder(&mut self, local_index: usize) -> PlaceholderHandle {
        let handle = PlaceholderHandle(self.body_len());
        self.push(Block::ImageRef { index: local_index });
        handle
    }

    /// Point a placeholder at its final resource index.
    ///
    /// Returns `false` if the handle does not refer to an image placeholder.
    pub fn update_placeholder(&mut self, handle: PlaceholderHandle, final_index: usize) -> bool {
        if handle.0 >= self.body_len() {
            return false;
        }
        match self.blocks.get_mut(handle.0) {
            Some(Block::ImageRef { index }) => {
                *index = final_index;
                true
            }
            _ => false,
        }
    }

    /// Append `n` blank lines.
    pub fn add_spacer(&mut self, n: usize) {
        for _ in 0..n {
            self.push(Block::Spacer);
        }
    }

    pub fn add_section_break(&mut self) {
        self.push(Block::SectionBreak);
    }

    /// Set the trailing resource section: a page break, the heading and one
    /// block per `(final index, resource)`.
    ///
    /// Replaces any section set before. An empty iterator removes it.
    pub fn set_resource_section<I>(&mut self, resources: I)
    where
        I: IntoIterator<Item = (usize, Resource)>,
    {
        let start = self.body_len();
        self.blocks.truncate(start);
        self.trailer_start = None;

        let mut resources = resources.into_iter().peekable();
        if resources.peek().is_none() {
            return;
        }
        self.blocks.push(Block::SectionBreak);
        self.blocks.push(Block::ResourceHeading);
        self.blocks.extend(
            resources.map(|(index, resource)| Block::Resource { index, resource }),
        );
        self.trailer_start = Some(start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_placeholder_rewrite() {
        let mut doc = Document::new();
        doc.add_narration("before");
        let handle = doc.add_image_placeholder(3);
        doc.add_narration("after");

        assert_eq!(handle.position(), 1);
        assert!(doc.update_placeholder(handle, 1));
        assert_eq!(doc.blocks()[1], Block::ImageRef { index: 1 });
    }

    #[test]
    fn test_update_placeholder_rejects_other_blocks() {
        let mut doc = Document::new();
        doc.add_title("Chapter");
        let handle = doc.add_image_placeholder(1);

        assert!(!doc.update_placeholder(PlaceholderHandle(0), 5));
        assert!(!doc.update_placeholder(PlaceholderHandle(42), 5));
        assert_eq!(doc.blocks()[handle.position()], Block::ImageRef { index: 1 });
    }

    #[test]
    fn test_add_spacer_repeats() {
        let mut doc = Document::new();
        doc.add_spacer(3);
        doc.add_spacer(0);
        assert_eq!(doc.blocks(), &[Block::Spacer, Block::Spacer, Block::Spacer]);
    }

    #[test]
    fn test_dialogue_block() {
        let mut doc = Document::new();
        doc.add_dialogue("Amiya", "Hello");
        assert_eq!(
            doc.blocks(),
            &[Block::Dialogue {
                speaker: "Amiya".to_owned(),
                text: "Hello".to_owned(),
            }]
        );
    }

    fn error(url: &str) -> Resource {
        Resource::Error {
            url: url.to_owned(),
            message: "HTTP 404".to_owned(),
        }
    }

    #[test]
    fn test_body_blocks_go_before_resource_section() {
        let mut doc = Document::new();
        doc.add_narration("first");
        doc.set_resource_section([(1, error("https://img/a.png"))]);
        let handle = doc.add_image_placeholder(2);
        doc.add_spacer(1);

        assert_eq!(handle.position(), 1);
        assert_eq!(
            doc.blocks(),
            &[
                Block::Narration("first".to_owned()),
                Block::ImageRef { index: 2 },
                Block::Spacer,
                Block::SectionBreak,
                Block::ResourceHeading,
                Block::Resource {
                    index: 1,
                    resource: error("https://img/a.png"),
                },
            ]
        );
        assert_eq!(doc.body().len(), 3);
    }

    #[test]
    fn test_resource_section_is_replaced() {
        let mut doc = Document::new();
        let handle = doc.add_image_placeholder(1);
        doc.set_resource_section([(1, error("https://img/a.png"))]);
        doc.set_resource_section([
            (1, error("https://img/a.png")),
            (2, error("https://img/b.png")),
        ]);

        let headings = doc
            .blocks()
            .iter()
            .filter(|b| **b == Block::ResourceHeading)
            .count();
        assert_eq!(headings, 1);
        assert_eq!(doc.len(), 5);
        assert!(doc.update_placeholder(handle, 2));
        // Resource blocks are not placeholders.
        assert!(!doc.update_placeholder(PlaceholderHandle(4), 2));

        doc.set_resource_section(Vec::<(usize, Resource)>::new());
        assert!(!doc.has_resource_section());
        assert_eq!(doc.blocks(), &[Block::ImageRef { index: 2 }]);
    }

    #[test]
    fn test_image_label() {
        assert_eq!(image_label(7), "Image 7");
    }
}
