//! Renderer-neutral content extracted from resolved component data.
//!
//! The measurement harness never sees raw JSON. It sees either a text block,
//! a fixed-height box, or a list made of a heading, an optional preamble and
//! ordered items. The same extraction feeds the pagination engine, so the
//! items a segment carries are exactly the items that were measured.

use super::measurement::BlockRole;
use super::types::Px;
use crate::model::{ComponentType, ListKind};
use serde_json::{Map, Value};

/// Keys that may hold the item array when list data is an object.
const ITEM_KEYS: &[&str] = &["items", "actions", "spells", "entries", "traits"];
/// Keys that may hold the list preamble.
const PREAMBLE_KEYS: &[&str] = &["description", "summary", "intro"];
/// Keys that may hold an item's label.
const NAME_KEYS: &[&str] = &["name", "title", "level"];
/// Keys that may hold an item's body text.
const BODY_KEYS: &[&str] = &["desc", "description", "text", "entries", "spells"];

/// One entry of a splittable list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    /// Run-in label, empty when the item has none.
    pub name: String,
    /// Body text, empty when the item has none.
    pub body: String,
    /// The item exactly as stored, handed to renderers untouched.
    pub raw: Value,
}

impl ListItem {
    /// Inline text as rendered: bold name run-in before the body.
    pub fn text(&self) -> String {
        match (self.name.is_empty(), self.body.is_empty()) {
            (true, _) => self.body.clone(),
            (false, true) => self.name.clone(),
            (false, false) => format!("{}. {}", self.name, self.body),
        }
    }
}

/// Content of a splittable list component.
#[derive(Debug, Clone, PartialEq)]
pub struct ListContent {
    /// Which list this is; picks the heading.
    pub kind: ListKind,
    /// Mechanics summary shown only before the first item.
    pub preamble: Option<String>,
    /// One entry per stored array position.
    pub items: Vec<ListItem>,
    /// Everything in the list object except the items, for renderers.
    pub metadata: Option<Value>,
}

impl ListContent {
    /// Heading of the first segment.
    pub fn heading(&self) -> &'static str {
        self.kind.base_heading()
    }
}

/// What a component asks the oracle to measure.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentContent {
    /// Atomic text content.
    Block {
        /// Typographic role of the text.
        role: BlockRole,
        /// Text to wrap.
        text: String,
    },
    /// Atomic content with an intrinsic height (images).
    Fixed {
        /// Height taken from the data.
        height: Px,
    },
    /// Splittable list.
    List(ListContent),
}

/// Extract measurable content from a component's resolved data.
pub fn extract_content(component_type: ComponentType, value: &Value) -> ComponentContent {
    if let Some(kind) = component_type.list_kind() {
        return ComponentContent::List(extract_list(kind, value));
    }
    match component_type {
        ComponentType::Image => {
            let height = value.get("height").and_then(Value::as_f64).unwrap_or(0.0);
            ComponentContent::Fixed {
                height: Px::from_measured(height),
            }
        }
        ComponentType::IdentityHeader => ComponentContent::Block {
            role: BlockRole::Heading,
            text: flatten_text(value),
        },
        _ => ComponentContent::Block {
            role: BlockRole::Body,
            text: flatten_text(value),
        },
    }
}

fn extract_list(kind: ListKind, value: &Value) -> ListContent {
    match value {
        Value::Array(items) => ListContent {
            kind,
            preamble: None,
            items: items.iter().map(extract_item).collect(),
            metadata: None,
        },
        Value::Object(map) => {
            let item_key = ITEM_KEYS
                .iter()
                .copied()
                .find(|key| map.get(*key).is_some_and(Value::is_array));
            let items = item_key
                .and_then(|key| map.get(key))
                .and_then(Value::as_array)
                .map(|items| items.iter().map(extract_item).collect())
                .unwrap_or_default();

            let mut metadata: Map<String, Value> = map.clone();
            if let Some(key) = item_key {
                metadata.remove(key);
            }

            ListContent {
                kind,
                preamble: list_preamble(kind, map),
                items,
                metadata: (!metadata.is_empty()).then_some(Value::Object(metadata)),
            }
        }
        _ => ListContent {
            kind,
            preamble: None,
            items: Vec::new(),
            metadata: None,
        },
    }
}

fn list_preamble(kind: ListKind, map: &Map<String, Value>) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(text) = PREAMBLE_KEYS
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_str))
    {
        parts.push(text.to_string());
    }
    if kind == ListKind::Spells {
        if let Some(line) = spellcasting_line(map) {
            parts.push(line);
        }
    }
    (!parts.is_empty()).then(|| parts.join("\n"))
}

/// "Spellcasting ability: Intelligence; spell save DC 17; +9 to hit with spell attacks"
fn spellcasting_line(map: &Map<String, Value>) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(ability) = map.get("ability").map(scalar_text) {
        parts.push(format!("Spellcasting ability: {ability}"));
    }
    if let Some(dc) = map.get("saveDc").map(scalar_text) {
        parts.push(format!("spell save DC {dc}"));
    }
    if let Some(bonus) = map.get("attackBonus").and_then(Value::as_i64) {
        parts.push(format!("{bonus:+} to hit with spell attacks"));
    }
    (!parts.is_empty()).then(|| parts.join("; "))
}

/// Every array position yields an item, so segment indices address the
/// stored array. A `null` entry becomes an empty item that measures zero.
fn extract_item(value: &Value) -> ListItem {
    match value {
        Value::Object(map) => {
            let name = NAME_KEYS
                .iter()
                .find_map(|key| map.get(*key))
                .map(scalar_text)
                .unwrap_or_default();
            let body = BODY_KEYS
                .iter()
                .find_map(|key| map.get(*key))
                .map(|body| match body {
                    Value::Array(parts) => parts
                        .iter()
                        .map(scalar_text)
                        .collect::<Vec<_>>()
                        .join(", "),
                    other => scalar_text(other),
                })
                .unwrap_or_default();
            ListItem {
                name,
                body,
                raw: value.clone(),
            }
        }
        other => ListItem {
            name: String::new(),
            body: scalar_text(other),
            raw: other.clone(),
        },
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Flatten arbitrary data into display lines, in key order.
fn flatten_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(items) => items
            .iter()
            .map(flatten_text)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| match value {
                Value::Object(_) | Value::Array(_) => flatten_text(value),
                _ => format!("{key}: {}", scalar_text(value)),
            })
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
    }
}
