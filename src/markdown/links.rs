//! Reference Link Definitions
//!
//! Links and images are always emitted in reference style, `[text][n]`, with
//! the definitions collected at the end of the document:
//!
//! ```text
//! See [the docs][1] and [the source][2].
//!
//!   [1]: https://example.com/docs
//!   [2]: https://example.com/src "Source"
//! ```
//!
//! Every time a link is added or removed, all definitions are stripped out of
//! the buffer and the surviving references are renumbered `1, 2, 3, ...` in
//! document order.

use std::collections::HashMap;

use log::debug;
use regex::Captures;

use crate::markdown::chunk::TextChunk;
use crate::markdown::patterns::{self, group};

// ─────────────────────────────────────────────────────────────────────────────
// LinkReferenceDefinition
// ─────────────────────────────────────────────────────────────────────────────

/// One `[id]: url "title"` definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReferenceDefinition {
    /// The numeric id as written in the buffer (empty for a new definition)
    pub id: String,
    /// Link target, without angle brackets
    pub url: String,
    /// Optional tooltip title, without quotes
    pub title: Option<String>,
    /// The definition text exactly as it was found
    pub raw: String,
}

impl LinkReferenceDefinition {
    /// Create a fresh definition for a url.
    pub fn new(url: impl Into<String>, title: Option<String>) -> Self {
        let url = url.into();
        Self {
            id: String::new(),
            raw: url.clone(),
            url,
            title,
        }
    }

    /// Parse the answer typed into a url prompt.
    ///
    /// Accepts `url`, `<url>`, and a trailing title in double quotes, single
    /// quotes, or parentheses. Returns `None` for a blank answer.
    pub fn from_prompt_answer(answer: &str) -> Option<Self> {
        let trimmed = answer.trim();
        if trimmed.is_empty() {
            return None;
        }

        let definition = match patterns::prompt_answer().captures(trimmed) {
            Some(caps) => {
                let title = caps.get(2).map(|m| m.as_str().to_string());
                Self::new(group(&caps, 1), title)
            }
            None => Self::new(trimmed.split_whitespace().next().unwrap_or(trimmed), None),
        };
        Some(Self {
            raw: trimmed.to_string(),
            ..definition
        })
    }

    /// Render as a definition line numbered `number`.
    pub fn render(&self, number: usize) -> String {
        match &self.title {
            Some(title) => format!("  [{}]: {} \"{}\"", number, self.url, title),
            None => format!("  [{}]: {}", number, self.url),
        }
    }
}

/// Definitions stripped from a buffer, keyed by their original id.
pub type DefinitionMap = HashMap<String, LinkReferenceDefinition>;

// ─────────────────────────────────────────────────────────────────────────────
// Strip
// ─────────────────────────────────────────────────────────────────────────────

/// Remove every definition line from `text`, recording it in `definitions`.
///
/// Only definitions starting a line are recognised. When an id is defined
/// twice the first definition is kept. A quoted line separated from its url
/// by blank lines is not a title and stays in the text.
pub fn strip(text: &str, definitions: &mut DefinitionMap) -> String {
    patterns::reference_definition()
        .replace_all(text, |caps: &Captures| {
            let whole = group(caps, 0);
            let id = group(caps, 1).to_string();
            let separated = caps.get(3).filter(|m| !m.as_str().is_empty());

            let (title, raw, restored) = match (separated, caps.get(4)) {
                (Some(gap), Some(_)) => {
                    // everything from the blank lines on belongs to the text
                    let offset = gap.start() - caps.get(0).map(|m| m.start()).unwrap_or(0);
                    let raw = whole[..offset].trim_end().to_string();
                    (None, raw, whole[offset..].to_string())
                }
                (_, Some(quoted)) => {
                    let title = unquote(quoted.as_str());
                    (Some(title), whole.trim_end().to_string(), String::new())
                }
                (_, None) => (None, whole.trim_end().to_string(), String::new()),
            };

            definitions
                .entry(id.clone())
                .or_insert_with(|| LinkReferenceDefinition {
                    id,
                    url: group(caps, 2).to_string(),
                    title,
                    raw,
                });
            restored
        })
        .into_owned()
}

fn unquote(quoted: &str) -> String {
    let mut chars = quoted.chars();
    chars.next();
    chars.next_back();
    chars.as_str().to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Add
// ─────────────────────────────────────────────────────────────────────────────

/// Assigns new numbers in order of first appearance.
struct Renumbering<'a> {
    known: &'a DefinitionMap,
    assigned: HashMap<String, usize>,
    rendered: Vec<String>,
}

impl<'a> Renumbering<'a> {
    fn new(known: &'a DefinitionMap) -> Self {
        Self {
            known,
            assigned: HashMap::new(),
            rendered: Vec::new(),
        }
    }

    fn push(&mut self, definition: &LinkReferenceDefinition) -> usize {
        let number = self.rendered.len() + 1;
        self.rendered.push(definition.render(number));
        number
    }

    /// Rewrite every `[text][id]` whose id has a definition.
    fn rewrite(&mut self, text: &str) -> String {
        let known = self.known;
        patterns::reference_link()
            .replace_all(text, |caps: &Captures| {
                let id = group(caps, 2);
                let number = match self.assigned.get(id).copied() {
                    Some(number) => number,
                    None => match known.get(id) {
                        Some(definition) => {
                            let number = self.push(definition);
                            self.assigned.insert(id.to_string(), number);
                            number
                        }
                        None => return group(caps, 0).to_string(),
                    },
                };
                format!("{}{}{}", group(caps, 1), number, group(caps, 3))
            })
            .into_owned()
    }
}

/// Renumber all references in `chunk` and re-append their definitions.
///
/// `explicit` is a definition for the link being inserted at the selection;
/// it takes the number following everything in `before`. Without it the
/// references inside the selection are renumbered like the rest.
///
/// Returns the number given to `explicit`, or 0.
pub fn add(chunk: &mut TextChunk, explicit: Option<LinkReferenceDefinition>) -> usize {
    let mut definitions = DefinitionMap::new();
    chunk.before = strip(&chunk.before, &mut definitions);
    chunk.selection = strip(&chunk.selection, &mut definitions);
    chunk.after = strip(&chunk.after, &mut definitions);

    let mut numbering = Renumbering::new(&definitions);
    chunk.before = numbering.rewrite(&chunk.before);

    let mut number = 0;
    match explicit {
        Some(definition) => number = numbering.push(&definition),
        None => chunk.selection = numbering.rewrite(&chunk.selection),
    }

    chunk.after = numbering.rewrite(&chunk.after);

    let kept = chunk.after.trim_end_matches('\n').len();
    chunk.after.truncate(kept);
    if chunk.after.is_empty() {
        let kept = chunk.selection.trim_end_matches('\n').len();
        chunk.selection.truncate(kept);
    }

    if !numbering.rendered.is_empty() {
        chunk.after.push_str("\n\n");
        chunk.after.push_str(&numbering.rendered.join("\n"));
    }

    debug!(
        "Renumbered {} link definition(s), stripped {}",
        numbering.rendered.len(),
        definitions.len()
    );
    number
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
