use super::ContentBlock;

/// Editing operations over a post body. Out-of-range indexes are ignored rather than
/// reported; they can only come from a stale client view of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockEditor {
    blocks: Vec<ContentBlock>,
}

impl BlockEditor {
    pub fn new(blocks: Vec<ContentBlock>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<ContentBlock> {
        self.blocks
    }

    pub fn ensure_first_block(&mut self) {
        if self.blocks.is_empty() {
            self.blocks.push(ContentBlock::text(""));
        }
    }

    pub fn update_text(&mut self, index: usize, value: &str) {
        if let Some(ContentBlock::Text { body }) = self.blocks.get_mut(index) {
            *body = value.to_string();
        }
    }

    pub fn update_caption(&mut self, index: usize, value: &str) {
        if let Some(ContentBlock::Image { caption, .. }) = self.blocks.get_mut(index) {
            *caption = Some(value.to_string());
        }
    }

    pub fn remove_block(&mut self, index: usize) -> Option<ContentBlock> {
        if index < self.blocks.len() {
            Some(self.blocks.remove(index))
        } else {
            None
        }
    }

    /// Pastes the raw URL onto the end of text block `index`.
    pub fn append_link_text(&mut self, index: usize, url: &str) {
        if let Some(ContentBlock::Text { body }) = self.blocks.get_mut(index) {
            body.push_str(url);
        }
    }

    /// Inserts a video block after `index`, followed by a text block unless one is
    /// already there. Returns the position of the new video block.
    pub fn insert_link_block(&mut self, index: usize, url: &str, title: &str) -> usize {
        let at = (index + 1).min(self.blocks.len());
        self.blocks.insert(
            at,
            ContentBlock::Video {
                url: url.to_string(),
                title: title.to_string(),
            },
        );
        self.ensure_text_after(at);
        at
    }

    /// Appends an image placeholder with an empty url while its upload is in flight.
    pub fn insert_pending_image(&mut self) -> usize {
        self.blocks.push(ContentBlock::Image {
            url: String::new(),
            caption: Some(String::new()),
        });
        self.blocks.len() - 1
    }

    /// Fills the first pending image placeholder with `url`. Returns its index, or
    /// `None` when no placeholder is waiting.
    pub fn resolve_pending_image(&mut self, url: &str) -> Option<usize> {
        let index = self
            .blocks
            .iter()
            .position(|b| matches!(b, ContentBlock::Image { url, .. } if url.is_empty()))?;
        self.blocks[index] = ContentBlock::Image {
            url: url.to_string(),
            caption: Some(String::new()),
        };
        self.ensure_text_after(index);
        Some(index)
    }

    /// Drops placeholders whose upload never completed.
    pub fn discard_pending_images(&mut self) {
        self.blocks
            .retain(|b| !matches!(b, ContentBlock::Image { url, .. } if url.is_empty()));
    }

    fn ensure_text_after(&mut self, index: usize) {
        let next_is_text = self.blocks.get(index + 1).map_or(false, ContentBlock::is_text);
        if !next_is_text {
            self.blocks.insert(index + 1, ContentBlock::text(""));
        }
    }
}
