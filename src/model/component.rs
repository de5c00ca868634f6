//! Component instance documents.
//!
//! A component instance binds a semantic component type to a piece of data
//! (via [`DataRef`]) and to a place on the canvas (via [`ComponentLayout`]).

use super::identifiers::{ComponentId, SlotId};
use super::template::Rect;
use crate::layout::types::RegionLocation;
use serde::{Deserialize, Serialize};

/// The semantic kind of a component.
///
/// Unrecognised type names deserialize to [`ComponentType::Unknown`] so a
/// single document from a newer producer cannot fail the whole page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentType {
    /// Name, size, type and alignment.
    IdentityHeader,
    /// Armor class, hit points and speed.
    StatSummary,
    /// The six ability scores.
    AbilityTable,
    /// Saves, skills, senses, languages, challenge.
    QuickFacts,
    /// Special traits.
    TraitList,
    /// Actions.
    ActionSection,
    /// Bonus actions.
    BonusActionSection,
    /// Reactions.
    ReactionSection,
    /// Legendary actions with their preamble.
    LegendaryActions,
    /// Lair actions with their preamble.
    LairActions,
    /// Spellcasting preamble and spell levels.
    SpellcastingBlock,
    /// Free text.
    TextBlock,
    /// Picture with an intrinsic height.
    Image,
    /// A type this version does not know. Laid out as free text.
    #[serde(other)]
    Unknown,
}

impl ComponentType {
    /// The list flavour for list-bearing components, `None` for atomic ones.
    pub fn list_kind(&self) -> Option<ListKind> {
        match self {
            ComponentType::TraitList => Some(ListKind::Traits),
            ComponentType::ActionSection => Some(ListKind::Actions),
            ComponentType::BonusActionSection => Some(ListKind::BonusActions),
            ComponentType::ReactionSection => Some(ListKind::Reactions),
            ComponentType::LegendaryActions => Some(ListKind::LegendaryActions),
            ComponentType::LairActions => Some(ListKind::LairActions),
            ComponentType::SpellcastingBlock => Some(ListKind::Spells),
            _ => None,
        }
    }

    /// Whether the component splits at item boundaries.
    pub fn is_list(&self) -> bool {
        self.list_kind().is_some()
    }
}

/// Kinds of splittable lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListKind {
    /// Actions.
    Actions,
    /// Traits.
    Traits,
    /// Bonus actions.
    BonusActions,
    /// Reactions.
    Reactions,
    /// Legendary actions.
    LegendaryActions,
    /// Lair actions.
    LairActions,
    /// Spells by level.
    Spells,
}

impl ListKind {
    /// Section heading shown above the first segment of the list.
    pub fn base_heading(&self) -> &'static str {
        match self {
            ListKind::Actions => "Actions",
            ListKind::Traits => "Traits",
            ListKind::BonusActions => "Bonus Actions",
            ListKind::Reactions => "Reactions",
            ListKind::LegendaryActions => "Legendary Actions",
            ListKind::LairActions => "Lair Actions",
            ListKind::Spells => "Spellcasting",
        }
    }
}

/// Reference from a component to its data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DataRef {
    /// Dot-separated path into the statblock document (`"actions"`,
    /// `"legendaryActions.actions.0"`). An empty path is the whole statblock.
    Statblock {
        /// Dot-separated path.
        path: String,
    },
    /// Key into the custom data map.
    Custom {
        /// Map key.
        key: String,
    },
}

impl DataRef {
    /// Reference to `path` in the statblock.
    pub fn statblock(path: impl Into<String>) -> Self {
        DataRef::Statblock { path: path.into() }
    }

    /// Reference to `key` in the custom map.
    pub fn custom(key: impl Into<String>) -> Self {
        DataRef::Custom { key: key.into() }
    }

    /// True when writing through one reference can change what the other
    /// resolves to (one path is a prefix of the other).
    pub fn overlaps(&self, other: &DataRef) -> bool {
        match (self, other) {
            (DataRef::Statblock { path: a }, DataRef::Statblock { path: b }) => {
                path_is_prefix(a, b) || path_is_prefix(b, a)
            }
            (DataRef::Custom { key: a }, DataRef::Custom { key: b }) => a == b,
            _ => false,
        }
    }
}

fn path_is_prefix(prefix: &str, path: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('.'),
        None => false,
    }
}

impl std::fmt::Display for DataRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataRef::Statblock { path } => write!(f, "statblock:{path}"),
            DataRef::Custom { key } => write!(f, "custom:{key}"),
        }
    }
}

/// Placement-related state of an instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentLayout {
    /// Template slot the instance sits in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_id: Option<SlotId>,
    /// Freeform position, used when there is no slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Rect>,
    /// Explicit placement. Always wins over slot geometry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<RegionLocation>,
    /// Hidden instances are excluded from layout.
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    /// Locked against dragging in the host editor.
    #[serde(default)]
    pub is_locked: bool,
}

fn default_visible() -> bool {
    true
}

impl ComponentLayout {
    /// Layout bound to a template slot.
    pub fn in_slot(slot_id: SlotId) -> Self {
        Self {
            slot_id: Some(slot_id),
            position: None,
            location: None,
            is_visible: true,
            is_locked: false,
        }
    }

    /// Builder: pin the instance to an explicit page/column.
    pub fn with_location(mut self, location: RegionLocation) -> Self {
        self.location = Some(location);
        self
    }
}

/// A component placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInstance {
    /// Unique within the document.
    pub id: ComponentId,
    /// Semantic kind.
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    /// Where its data lives.
    pub data_ref: DataRef,
    /// Slot and visibility.
    pub layout: ComponentLayout,
}

impl ComponentInstance {
    /// Assemble an instance.
    pub fn new(
        id: ComponentId,
        component_type: ComponentType,
        data_ref: DataRef,
        layout: ComponentLayout,
    ) -> Self {
        Self {
            id,
            component_type,
            data_ref,
            layout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_component_type_deserializes_to_unknown() {
        let ty: ComponentType = serde_json::from_str("\"hologram-panel\"").unwrap();
        assert_eq!(ty, ComponentType::Unknown);
    }

    #[test]
    fn list_components_report_their_kind() {
        assert_eq!(
            ComponentType::LegendaryActions.list_kind(),
            Some(ListKind::LegendaryActions)
        );
        assert_eq!(ComponentType::IdentityHeader.list_kind(), None);
        assert!(ComponentType::SpellcastingBlock.is_list());
    }

    #[test]
    fn data_ref_uses_tagged_representation() {
        let json = r#"{"type":"statblock","path":"actions"}"#;
        let data_ref: DataRef = serde_json::from_str(json).unwrap();
        assert_eq!(data_ref, DataRef::statblock("actions"));

        let custom: DataRef = serde_json::from_str(r#"{"type":"custom","key":"notes"}"#).unwrap();
        assert_eq!(custom, DataRef::custom("notes"));
    }

    #[test]
    fn overlaps_detects_path_prefixes() {
        let parent = DataRef::statblock("legendaryActions");
        let child = DataRef::statblock("legendaryActions.actions.0");
        let sibling = DataRef::statblock("legendaryActionsExtra");
        assert!(parent.overlaps(&child));
        assert!(child.overlaps(&parent));
        assert!(!parent.overlaps(&sibling));
        assert!(DataRef::statblock("").overlaps(&sibling));
        assert!(!DataRef::custom("a").overlaps(&DataRef::statblock("a")));
    }

    #[test]
    fn instance_document_round_trips_defaults() {
        let json = r#"{
            "id": "component-0",
            "type": "action-section",
            "dataRef": {"type": "statblock", "path": "actions"},
            "layout": {"slotId": "slot-1"}
        }"#;
        let instance: ComponentInstance = serde_json::from_str(json).unwrap();
        assert!(instance.layout.is_visible);
        assert!(!instance.layout.is_locked);
        assert_eq!(instance.layout.slot_id, Some(SlotId::new("slot-1").unwrap()));
        assert_eq!(instance.layout.location, None);
    }

    #[test]
    fn explicit_location_parses() {
        let json = r#"{
            "id": "component-9",
            "type": "text-block",
            "dataRef": {"type": "custom", "key": "notes"},
            "layout": {"location": {"page": 2, "column": 1}, "isVisible": true}
        }"#;
        let instance: ComponentInstance = serde_json::from_str(json).unwrap();
        assert_eq!(instance.layout.location, Some(RegionLocation::new(2, 1)));
    }
}
