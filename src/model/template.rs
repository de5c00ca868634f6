//! Template and page-setup documents.

use super::component::{ComponentInstance, ComponentLayout, ComponentType, DataRef};
use super::identifiers::{ComponentId, SlotId, TemplateId};
use serde::{Deserialize, Serialize};

/// CSS reference resolution used to convert physical units.
const PX_PER_INCH: f64 = 96.0;
const MM_PER_INCH: f64 = 25.4;

/// Axis-aligned rectangle in template pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

/// Unit page dimensions are given in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionUnit {
    /// CSS pixels.
    #[default]
    Px,
    /// Millimetres.
    Mm,
    /// Inches.
    In,
}

impl DimensionUnit {
    /// Convert `value` in this unit to CSS pixels at 96 DPI.
    pub fn to_px(&self, value: f64) -> f64 {
        match self {
            DimensionUnit::Px => value,
            DimensionUnit::Mm => value / MM_PER_INCH * PX_PER_INCH,
            DimensionUnit::In => value * PX_PER_INCH,
        }
    }
}

/// Physical page size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageDimensions {
    /// Page width in `unit`.
    pub width: f64,
    /// Page height in `unit`.
    pub height: f64,
    /// Unit of both sides.
    #[serde(default)]
    pub unit: DimensionUnit,
}

impl PageDimensions {
    /// Width in pixels.
    pub fn width_px(&self) -> f64 {
        self.unit.to_px(self.width)
    }

    /// Height in pixels.
    pub fn height_px(&self) -> f64 {
        self.unit.to_px(self.height)
    }
}

/// Page fill. Carried for renderers; layout ignores it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageBackground {
    /// CSS color.
    #[serde(default)]
    pub color: String,
    /// Optional texture name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture: Option<String>,
}

/// Column layout of a page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSettings {
    /// When false the page has a single column.
    pub enabled: bool,
    /// Requested column count.
    pub column_count: u32,
    /// Gap between adjacent columns, in the page's unit.
    #[serde(default)]
    pub gutter: f64,
}

impl ColumnSettings {
    /// Number of columns actually in effect (at least one).
    pub fn effective_count(&self) -> u32 {
        if self.enabled {
            self.column_count.max(1)
        } else {
            1
        }
    }
}

/// Summary written back after each pagination pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationSettings {
    /// Pages the last pass produced.
    pub page_count: u32,
    /// Columns per page the last pass used.
    pub column_count: u32,
}

/// Drag snapping of the host editor. Carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapSettings {
    /// Master switch.
    pub enabled: bool,
    /// Snap to slot rectangles.
    #[serde(default)]
    pub snap_to_slots: bool,
    /// Snap to the grid.
    #[serde(default)]
    pub snap_to_grid: bool,
    /// Grid pitch in pixels.
    #[serde(default)]
    pub grid_size: f64,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            snap_to_slots: true,
            snap_to_grid: false,
            grid_size: 12.0,
        }
    }
}

/// Per-document page setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageVariables {
    /// Page size.
    pub dimensions: PageDimensions,
    /// Page fill.
    #[serde(default)]
    pub background: PageBackground,
    /// Column setup.
    pub columns: ColumnSettings,
    /// Result of the last pass.
    pub pagination: PaginationSettings,
    /// Editor snapping.
    #[serde(default)]
    pub snap: SnapSettings,
}

impl PageVariables {
    /// US Letter at 96 DPI with two columns.
    pub fn letter_two_column() -> Self {
        Self {
            dimensions: PageDimensions {
                width: 816.0,
                height: 1056.0,
                unit: DimensionUnit::Px,
            },
            background: PageBackground::default(),
            columns: ColumnSettings {
                enabled: true,
                column_count: 2,
                gutter: 16.0,
            },
            pagination: PaginationSettings {
                page_count: 1,
                column_count: 2,
            },
            snap: SnapSettings::default(),
        }
    }

    /// Gutter converted to pixels.
    pub fn gutter_px(&self) -> f64 {
        self.dimensions.unit.to_px(self.columns.gutter)
    }
}

/// How instances are positioned by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateMode {
    /// Instances live in slots.
    #[default]
    Locked,
    /// Instances are positioned freely.
    Freeform,
}

/// A named rectangular region of a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotDefinition {
    /// Unique within the template.
    pub id: SlotId,
    /// Display name.
    pub name: String,
    /// Rectangle on the page; its x picks the home column.
    pub position: Rect,
    /// Types the slot accepts. Empty accepts all.
    #[serde(default)]
    pub allowed_components: Vec<ComponentType>,
    /// Reported when left empty.
    #[serde(default)]
    pub is_required: bool,
}

impl SlotDefinition {
    /// An empty allow-list accepts every component type.
    pub fn accepts(&self, component_type: ComponentType) -> bool {
        self.allowed_components.is_empty() || self.allowed_components.contains(&component_type)
    }
}

/// Component a template creates when applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultComponent {
    /// Slot the component goes into.
    pub slot_id: SlotId,
    /// Type to create.
    pub component_type: ComponentType,
    /// Data to bind it to.
    pub default_data_ref: DataRef,
}

/// Template document. Immutable per version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateConfig {
    /// Template id.
    pub id: TemplateId,
    /// Display name.
    pub name: String,
    /// Positioning mode for new instances.
    #[serde(default)]
    pub default_mode: TemplateMode,
    /// Page setup a document starts with.
    pub default_page_variables: PageVariables,
    /// Slots in declaration order; the order breaks ties in the walk.
    #[serde(default)]
    pub slots: Vec<SlotDefinition>,
    /// Components created when the template is applied.
    #[serde(default)]
    pub default_components: Vec<DefaultComponent>,
    /// Types the template permits. Empty permits all.
    #[serde(default)]
    pub allowed_components: Vec<ComponentType>,
}

impl TemplateConfig {
    /// Position of the slot in the template's slot array.
    pub fn slot_index(&self, slot_id: &SlotId) -> Option<usize> {
        self.slots.iter().position(|slot| &slot.id == slot_id)
    }

    /// Slot with id `slot_id`.
    pub fn slot(&self, slot_id: &SlotId) -> Option<&SlotDefinition> {
        self.slots.iter().find(|slot| &slot.id == slot_id)
    }

    /// Whether the template permits the component type at all.
    /// An empty allow-list permits everything.
    pub fn allows(&self, component_type: ComponentType) -> bool {
        self.allowed_components.is_empty() || self.allowed_components.contains(&component_type)
    }

    /// Slots marked required that no instance occupies.
    pub fn unfilled_required_slots<'a>(
        &'a self,
        instances: &'a [ComponentInstance],
    ) -> impl Iterator<Item = &'a SlotDefinition> + 'a {
        self.slots.iter().filter(move |slot| {
            slot.is_required
                && !instances
                    .iter()
                    .any(|instance| instance.layout.slot_id.as_ref() == Some(&slot.id))
        })
    }

    /// Instantiate the template's default components.
    ///
    /// Ids are `component-<n>` in declaration order, so applying the same
    /// template twice yields identical instances.
    pub fn instantiate_defaults(&self) -> Vec<ComponentInstance> {
        self.default_components
            .iter()
            .enumerate()
            .filter_map(|(index, default)| {
                let id = ComponentId::new(format!("component-{index}")).ok()?;
                Some(ComponentInstance::new(
                    id,
                    default.component_type,
                    default.default_data_ref.clone(),
                    ComponentLayout::in_slot(default.slot_id.clone()),
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_template_json() -> &'static str {
        r##"{
            "id": "statblock-classic",
            "name": "Classic Statblock",
            "defaultMode": "locked",
            "defaultPageVariables": {
                "dimensions": {"width": 8.5, "height": 11, "unit": "in"},
                "background": {"color": "#f8f1e0"},
                "columns": {"enabled": true, "columnCount": 2, "gutter": 16},
                "pagination": {"pageCount": 1, "columnCount": 2},
                "snap": {"enabled": true, "snapToSlots": true, "snapToGrid": false, "gridSize": 12}
            },
            "slots": [
                {"id": "slot-header", "name": "Header", "position": {"x": 0, "y": 0, "width": 816, "height": 120},
                 "allowedComponents": ["identity-header"], "isRequired": true},
                {"id": "slot-actions", "name": "Actions", "position": {"x": 420, "y": 120, "width": 396, "height": 600},
                 "allowedComponents": ["action-section", "legendary-actions"]}
            ],
            "defaultComponents": [
                {"slotId": "slot-header", "componentType": "identity-header",
                 "defaultDataRef": {"type": "statblock", "path": "identity"}},
                {"slotId": "slot-actions", "componentType": "action-section",
                 "defaultDataRef": {"type": "statblock", "path": "actions"}}
            ],
            "allowedComponents": ["identity-header", "action-section", "legendary-actions"]
        }"##
    }

    #[test]
    fn template_document_parses() {
        let template: TemplateConfig = serde_json::from_str(sample_template_json()).unwrap();
        assert_eq!(template.slots.len(), 2);
        assert_eq!(template.default_mode, TemplateMode::Locked);
        assert_eq!(template.default_page_variables.columns.effective_count(), 2);
    }

    #[test]
    fn inch_dimensions_convert_to_px() {
        let template: TemplateConfig = serde_json::from_str(sample_template_json()).unwrap();
        let dims = template.default_page_variables.dimensions;
        assert_eq!(dims.width_px(), 816.0);
        assert_eq!(dims.height_px(), 1056.0);
    }

    #[test]
    fn millimetres_convert_to_px() {
        assert!((DimensionUnit::Mm.to_px(25.4) - 96.0).abs() < 1e-9);
    }

    #[test]
    fn slot_index_follows_declaration_order() {
        let template: TemplateConfig = serde_json::from_str(sample_template_json()).unwrap();
        let actions = SlotId::new("slot-actions").unwrap();
        assert_eq!(template.slot_index(&actions), Some(1));
        assert_eq!(template.slot_index(&SlotId::new("missing").unwrap()), None);
    }

    #[test]
    fn slot_accepts_only_allowed_types() {
        let template: TemplateConfig = serde_json::from_str(sample_template_json()).unwrap();
        let slot = &template.slots[1];
        assert!(slot.accepts(ComponentType::LegendaryActions));
        assert!(!slot.accepts(ComponentType::IdentityHeader));
    }

    #[test]
    fn instantiate_defaults_is_stable() {
        let template: TemplateConfig = serde_json::from_str(sample_template_json()).unwrap();
        let first = template.instantiate_defaults();
        let second = template.instantiate_defaults();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].id.as_str(), "component-0");
        assert_eq!(first[1].component_type, ComponentType::ActionSection);
    }

    #[test]
    fn unfilled_required_slots_reports_missing_header() {
        let template: TemplateConfig = serde_json::from_str(sample_template_json()).unwrap();
        let instances: Vec<_> = template
            .instantiate_defaults()
            .into_iter()
            .filter(|instance| instance.component_type != ComponentType::IdentityHeader)
            .collect();
        let missing: Vec<_> = template
            .unfilled_required_slots(&instances)
            .map(|slot| slot.id.as_str())
            .collect();
        assert_eq!(missing, vec!["slot-header"]);
    }

    #[test]
    fn disabled_columns_mean_single_column() {
        let settings = ColumnSettings {
            enabled: false,
            column_count: 3,
            gutter: 0.0,
        };
        assert_eq!(settings.effective_count(), 1);
    }
}
