use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::OnceLock;

const TAGS: [&str; 10] = ["div", "p", "span", "ul", "li", "a", "h1", "h2", "table", "td"];
const CLASSES: [&str; 8] = [
    "note", "example", "toc", "tocline1", "tocline2", "fn", "warning", "dialog",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            id: None,
            classes: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// Positions of elements grouped by tag, id and class.
#[derive(Debug, Default)]
pub struct DocumentIndex {
    by_tag: HashMap<String, Vec<usize>>,
    by_id: HashMap<String, Vec<usize>>,
    by_class: HashMap<String, Vec<usize>>,
}

impl DocumentIndex {
    fn build(elements: &[Element]) -> Self {
        let mut index = DocumentIndex::default();
        for (pos, element) in elements.iter().enumerate() {
            index
                .by_tag
                .entry(element.tag.clone())
                .or_default()
                .push(pos);
            if let Some(id) = &element.id {
                index.by_id.entry(id.clone()).or_default().push(pos);
            }
            for class in &element.classes {
                index.by_class.entry(class.clone()).or_default().push(pos);
            }
        }
        index
    }

    pub fn tag(&self, tag: &str) -> &[usize] {
        self.by_tag.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn id(&self, id: &str) -> &[usize] {
        self.by_id.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn class(&self, class: &str) -> &[usize] {
        self.by_class.get(class).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Flat element document. The index is built on first use and cached.
#[derive(Debug)]
pub struct Document {
    elements: Vec<Element>,
    index: OnceLock<DocumentIndex>,
}

impl Document {
    pub fn new(elements: Vec<Element>) -> Self {
        Self {
            elements,
            index: OnceLock::new(),
        }
    }

    /// Deterministic document of `size` elements. The first element is always `h1#title`.
    pub fn generate(size: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut elements = Vec::with_capacity(size);

        for pos in 0..size {
            if pos == 0 {
                elements.push(Element::new("h1").with_id("title"));
                continue;
            }
            let tag = TAGS[rng.random_range(0..TAGS.len())];
            let mut element = Element::new(tag);
            if rng.random_range(0..20) == 0 {
                element = element.with_id(&format!("{}{}", tag, pos));
            }
            for _ in 0..rng.random_range(0..3) {
                element = element.with_class(CLASSES[rng.random_range(0..CLASSES.len())]);
            }
            elements.push(element);
        }

        Self::new(elements)
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn index(&self) -> &DocumentIndex {
        self.index.get_or_init(|| DocumentIndex::build(&self.elements))
    }
}
