//!
//! # Technology Rule Database
//!
//! [TechSpec] is the serde-friendly rule-file record.
//! [Tech] is its validated, immutable, id-resolved form,
//! generally shared among cells and grids as a [crate::Ptr].
//!

// Std-Lib
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

// Crates.io
use log::{debug, warn};
use serde::{Deserialize, Serialize};

// Local imports
use crate::{
    error::{LayoutError, LayoutResult},
    utils::{enumstr, EnumStr, ErrorContext, ErrorHelper, SerdeFile, Unwrapper},
    via::{ViaRule, ViaRuleSpec},
    Int, LayerId, PurposeId,
};

/// # Layer Key
///
/// (Layer, Purpose) pair uniquely identifying a drawing plane within a cell.
///
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct LayerKey {
    pub layer: LayerId,
    pub purpose: PurposeId,
}
impl LayerKey {
    pub fn new(layer: LayerId, purpose: PurposeId) -> Self {
        Self { layer, purpose }
    }
}

enumstr!(
    /// # Minimum-Spacing Rule Classes
    SpaceType {
        DiffColor: "sp_min",
        LineEnd: "sp_le_min",
        SameColor: "sp_sc_min",
    }
);

/// # Spacing Table Rule-File Record
///
/// Parallel lists of width thresholds and their minimum spacings.
/// Floating-point so that rule-files can write `.inf` as a final catch-all threshold.
///
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SpaceTableSpec {
    pub w_list: Vec<f64>,
    pub sp_list: Vec<f64>,
}

/// # Minimum-Spacing Table
///
/// Width thresholds in strictly ascending order, each paired with a non-decreasing spacing.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceTable {
    widths: Vec<Int>,
    spaces: Vec<Int>,
}
impl SpaceTable {
    /// Minimum spacing for a wire of `width`.
    /// Returns the spacing of the first threshold at or above `width`,
    /// or the last spacing for widths beyond every threshold.
    pub fn lookup(&self, width: Int) -> Int {
        for (w, sp) in self.widths.iter().zip(self.spaces.iter()) {
            if width <= *w {
                return *sp;
            }
        }
        self.spaces.last().copied().unwrap_or_default()
    }
}

/// # Technology Rule-File Record
///
/// Field names match the keys of the rule-file.
///
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TechSpec {
    /// Layer names to ids
    pub layer: BTreeMap<String, LayerId>,
    /// Purpose names to ids
    pub purpose: BTreeMap<String, PurposeId>,
    /// Via ids to their (bottom, top) layer names
    pub via_layers: BTreeMap<String, (String, String)>,
    pub default_purpose: String,
    pub pin_purpose: String,
    pub make_pin_obj: bool,
    /// Layer names to layer-types, the keys of the spacing tables
    #[serde(default)]
    pub layer_type: BTreeMap<String, String>,
    /// Different-color minimum spacing, per layer-type
    #[serde(default)]
    pub sp_min: BTreeMap<String, SpaceTableSpec>,
    /// Line-end minimum spacing, per layer-type
    #[serde(default)]
    pub sp_le_min: BTreeMap<String, SpaceTableSpec>,
    /// Same-color minimum spacing, per layer-type.
    /// If absent, same-color lookups use `sp_min`.
    #[serde(default)]
    pub sp_sc_min: Option<BTreeMap<String, SpaceTableSpec>>,
    /// Via cut and enclosure rules, per via id
    #[serde(default)]
    pub via: BTreeMap<String, ViaRuleSpec>,
}
impl SerdeFile for TechSpec {}

/// Convert a rule-file dimension to an [Int].
/// Positive infinity maps to [Int::MAX]; anything else must be integral.
pub(crate) fn rule_dim(val: f64) -> Option<Int> {
    if val == f64::INFINITY {
        Some(Int::MAX)
    } else if val.is_finite() && val.fract() == 0.0 {
        Some(val as Int)
    } else {
        None
    }
}

/// # Technology Loader
///
/// Walks a [TechSpec], tracking its position for error reporting.
///
#[derive(Debug, Default)]
pub(crate) struct TechLoader {
    pub(crate) stack: Vec<ErrorContext>,
}
impl ErrorHelper for TechLoader {
    type Error = LayoutError;
    fn err(&self, msg: impl Into<String>) -> LayoutError {
        LayoutError::Load {
            message: msg.into(),
            stack: self.stack.clone(),
        }
    }
}
impl TechLoader {
    /// Load and validate a set of spacing tables
    fn space_tables(
        &mut self,
        specs: &BTreeMap<String, SpaceTableSpec>,
    ) -> LayoutResult<HashMap<String, SpaceTable>> {
        let mut rv = HashMap::with_capacity(specs.len());
        for (lay_type, spec) in specs.iter() {
            self.stack.push(ErrorContext::Layer(lay_type.clone()));
            rv.insert(lay_type.clone(), self.space_table(spec)?);
            self.stack.pop();
        }
        Ok(rv)
    }
    fn space_table(&self, spec: &SpaceTableSpec) -> LayoutResult<SpaceTable> {
        self.assert(
            !spec.w_list.is_empty() && spec.w_list.len() == spec.sp_list.len(),
            "Spacing table width and space lists must be non-empty and of equal length",
        )?;
        let widths = self.dims(&spec.w_list)?;
        let spaces = self.dims(&spec.sp_list)?;
        self.assert(
            widths.windows(2).all(|w| w[0] < w[1]),
            "Spacing table widths must be strictly ascending",
        )?;
        self.assert(
            spaces.windows(2).all(|s| s[0] <= s[1]),
            "Spacing table spaces must be non-decreasing",
        )?;
        Ok(SpaceTable { widths, spaces })
    }
    /// Convert a list of rule-file dimensions
    pub(crate) fn dims(&self, vals: &[f64]) -> LayoutResult<Vec<Int>> {
        vals.iter()
            .map(|v| rule_dim(*v).unwrapper(self, format!("Invalid dimension {}", v)))
            .collect()
    }
}

/// # Technology Rule Database
#[derive(Debug, Clone)]
pub struct Tech {
    layer_ids: HashMap<String, LayerId>,
    layer_names: HashMap<LayerId, String>,
    purpose_ids: HashMap<String, PurposeId>,
    purpose_names: HashMap<PurposeId, String>,
    via_layers: HashMap<String, (LayerId, LayerId)>,
    layer_types: HashMap<LayerId, String>,
    sp_tables: HashMap<SpaceType, HashMap<String, SpaceTable>>,
    /// Table-class used for same-color lookups
    sp_sc_type: SpaceType,
    default_purpose: PurposeId,
    pin_purpose: PurposeId,
    make_pin_obj: bool,
    via_rules: BTreeMap<String, ViaRule>,
}
impl Tech {
    /// Create a [Tech] from rule-file record `spec`, resolving and validating all of its names.
    pub fn new(spec: TechSpec) -> LayoutResult<Self> {
        let mut loader = TechLoader::default();
        loader.stack.push(ErrorContext::Tech);

        // Name tables. Where names alias an id, the first name (alphabetically) is its reverse-lookup.
        let layer_ids: HashMap<String, LayerId> = spec.layer.clone().into_iter().collect();
        let mut layer_names = HashMap::new();
        for (name, id) in spec.layer.iter() {
            layer_names.entry(*id).or_insert_with(|| name.clone());
        }
        let purpose_ids: HashMap<String, PurposeId> = spec.purpose.clone().into_iter().collect();
        let mut purpose_names = HashMap::new();
        for (name, id) in spec.purpose.iter() {
            purpose_names.entry(*id).or_insert_with(|| name.clone());
        }
        let default_purpose = purpose_ids.get(&spec.default_purpose).copied().unwrapper(
            &loader,
            format!("Cannot find default purpose: {}", spec.default_purpose),
        )?;
        let pin_purpose = purpose_ids.get(&spec.pin_purpose).copied().unwrapper(
            &loader,
            format!("Cannot find pin purpose: {}", spec.pin_purpose),
        )?;

        // Layer lookups, reported through `loader`
        let layer_id = |loader: &TechLoader, name: &str| -> LayoutResult<LayerId> {
            layer_ids
                .get(name)
                .copied()
                .unwrapper(loader, format!("Cannot find layer: {}", name))
        };

        let mut via_layers = HashMap::with_capacity(spec.via_layers.len());
        for (via_id, (bot, top)) in spec.via_layers.iter() {
            loader.stack.push(ErrorContext::ViaRule(via_id.clone()));
            let pair = (layer_id(&loader, bot)?, layer_id(&loader, top)?);
            via_layers.insert(via_id.clone(), pair);
            loader.stack.pop();
        }

        let mut layer_types = HashMap::with_capacity(spec.layer_type.len());
        for (layer, lay_type) in spec.layer_type.iter() {
            loader.stack.push(ErrorContext::Layer(layer.clone()));
            layer_types.insert(layer_id(&loader, layer)?, lay_type.clone());
            loader.stack.pop();
        }

        let mut sp_tables = HashMap::new();
        sp_tables.insert(SpaceType::DiffColor, loader.space_tables(&spec.sp_min)?);
        sp_tables.insert(SpaceType::LineEnd, loader.space_tables(&spec.sp_le_min)?);
        let sp_sc_type = match spec.sp_sc_min {
            Some(ref sc) => {
                sp_tables.insert(SpaceType::SameColor, loader.space_tables(sc)?);
                SpaceType::SameColor
            }
            None => SpaceType::DiffColor,
        };
        for (id, lay_type) in layer_types.iter() {
            if !spec.sp_min.contains_key(lay_type) {
                warn!(
                    "Layer {} has type {} with no minimum-spacing table",
                    layer_names.get(id).map(String::as_str).unwrap_or("?"),
                    lay_type
                );
            }
        }

        let mut via_rules = BTreeMap::new();
        for (via_id, rule) in spec.via.iter() {
            loader.stack.push(ErrorContext::ViaRule(via_id.clone()));
            loader.assert(
                via_layers.contains_key(via_id),
                format!("Via rule {} has no via_layers entry", via_id),
            )?;
            via_rules.insert(via_id.clone(), ViaRule::load(rule, &loader)?);
            loader.stack.pop();
        }

        debug!(
            "Loaded tech with {} layers, {} purposes, {} via rules",
            layer_ids.len(),
            purpose_ids.len(),
            via_rules.len()
        );
        Ok(Self {
            layer_ids,
            layer_names,
            purpose_ids,
            purpose_names,
            via_layers,
            layer_types,
            sp_tables,
            sp_sc_type,
            default_purpose,
            pin_purpose,
            make_pin_obj: spec.make_pin_obj,
            via_rules,
        })
    }
    /// Load from rule-file `fname`, with format inferred from its extension
    pub fn open(fname: impl AsRef<Path>) -> LayoutResult<Self> {
        Self::new(TechSpec::open_any(fname)?)
    }
    pub fn get_layer_id(&self, layer: &str) -> LayoutResult<LayerId> {
        self.layer_ids
            .get(layer)
            .copied()
            .ok_or_else(|| LayoutError::not_found("layer", layer))
    }
    /// Get the id of `purpose`, or the default purpose if `None`
    pub fn get_purpose_id(&self, purpose: Option<&str>) -> LayoutResult<PurposeId> {
        match purpose {
            None => Ok(self.default_purpose),
            Some(name) => self
                .purpose_ids
                .get(name)
                .copied()
                .ok_or_else(|| LayoutError::not_found("purpose", name)),
        }
    }
    /// Resolve a (layer, purpose) name pair to a [LayerKey]
    pub fn layer_key(&self, layer: &str, purpose: Option<&str>) -> LayoutResult<LayerKey> {
        Ok(LayerKey::new(
            self.get_layer_id(layer)?,
            self.get_purpose_id(purpose)?,
        ))
    }
    pub fn get_layer_name(&self, id: LayerId) -> LayoutResult<&str> {
        self.layer_names
            .get(&id)
            .map(String::as_str)
            .ok_or_else(|| LayoutError::not_found("layer", id.to_string()))
    }
    pub fn get_purpose_name(&self, id: PurposeId) -> LayoutResult<&str> {
        self.purpose_names
            .get(&id)
            .map(String::as_str)
            .ok_or_else(|| LayoutError::not_found("purpose", id.to_string()))
    }
    /// Check that both the layer and purpose of `key` are defined
    pub fn check_layer_key(&self, key: LayerKey) -> LayoutResult<()> {
        self.get_layer_name(key.layer)?;
        self.get_purpose_name(key.purpose)?;
        Ok(())
    }
    /// Get the (bottom, top) layers joined by via `via_id`
    pub fn get_via_layers(&self, via_id: &str) -> LayoutResult<(LayerId, LayerId)> {
        self.via_layers
            .get(via_id)
            .copied()
            .ok_or_else(|| LayoutError::not_found("via", via_id))
    }
    /// Get the spacing layer-type of layer `id`, if it has one
    pub fn get_layer_type(&self, id: LayerId) -> Option<&str> {
        self.layer_types.get(&id).map(String::as_str)
    }
    /// Minimum spacing of class `sp_type` for a `width`-wide wire of `layer_type`
    pub fn get_min_space(
        &self,
        layer_type: &str,
        width: Int,
        sp_type: SpaceType,
    ) -> LayoutResult<Int> {
        let stype = match sp_type {
            SpaceType::SameColor => self.sp_sc_type,
            other => other,
        };
        let table = self
            .sp_tables
            .get(&stype)
            .and_then(|tables| tables.get(layer_type))
            .ok_or_else(|| {
                LayoutError::not_found("space table", format!("{} ({})", layer_type, sp_type))
            })?;
        Ok(table.lookup(width))
    }
    pub fn default_purpose(&self) -> PurposeId {
        self.default_purpose
    }
    pub fn pin_purpose(&self) -> PurposeId {
        self.pin_purpose
    }
    /// Whether pins are also drawn as shapes on the pin purpose
    pub fn make_pin_obj(&self) -> bool {
        self.make_pin_obj
    }
    pub fn via_rule(&self, via_id: &str) -> LayoutResult<&ViaRule> {
        self.via_rules
            .get(via_id)
            .ok_or_else(|| LayoutError::not_found("via rule", via_id))
    }
    /// Iterate over all via rules, sorted by via id
    pub fn via_rules(&self) -> impl Iterator<Item = (&str, &ViaRule)> {
        self.via_rules.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::SampleTech;

    #[test]
    fn names_round_trip() -> LayoutResult<()> {
        let spec = SampleTech::tech_spec()?;
        let tech = Tech::new(spec.clone())?;
        for (name, id) in spec.layer.iter() {
            assert_eq!(tech.get_layer_id(name)?, *id);
            assert_eq!(tech.get_layer_name(*id)?, name);
        }
        for (name, id) in spec.purpose.iter() {
            assert_eq!(tech.get_purpose_id(Some(name))?, *id);
            assert_eq!(tech.get_purpose_name(*id)?, name);
        }
        assert!(matches!(
            tech.get_layer_id("M99"),
            Err(LayoutError::NotFound { kind: "layer", .. })
        ));
        assert!(matches!(
            tech.get_purpose_id(Some("nope")),
            Err(LayoutError::NotFound { .. })
        ));
        Ok(())
    }
    #[test]
    fn default_purpose() -> LayoutResult<()> {
        let tech = SampleTech::tech()?;
        assert_eq!(tech.get_purpose_id(None)?, tech.get_purpose_id(Some("drawing"))?);
        assert_eq!(tech.pin_purpose(), tech.get_purpose_id(Some("pin"))?);
        assert_eq!(
            tech.layer_key("M1", None)?,
            LayerKey::new(tech.get_layer_id("M1")?, tech.default_purpose())
        );
        Ok(())
    }
    #[test]
    fn via_layers() -> LayoutResult<()> {
        let tech = SampleTech::tech()?;
        let (bot, top) = tech.get_via_layers("V1")?;
        assert_eq!(bot, tech.get_layer_id("M1")?);
        assert_eq!(top, tech.get_layer_id("M2")?);
        assert!(tech.get_via_layers("V9").is_err());
        Ok(())
    }
    #[test]
    fn layer_key_checks() -> LayoutResult<()> {
        let tech = SampleTech::tech()?;
        tech.check_layer_key(tech.layer_key("M2", Some("pin"))?)?;
        let m2 = tech.get_layer_id("M2")?;
        assert!(matches!(
            tech.check_layer_key(LayerKey::new(m2, 999)),
            Err(LayoutError::NotFound { .. })
        ));
        assert!(matches!(
            tech.check_layer_key(LayerKey::new(999, tech.default_purpose())),
            Err(LayoutError::NotFound { .. })
        ));
        Ok(())
    }
    #[test]
    fn min_space_buckets() -> LayoutResult<()> {
        let tech = SampleTech::tech()?;
        assert_eq!(tech.get_min_space("Mx", 0, SpaceType::DiffColor)?, 32);
        assert_eq!(tech.get_min_space("Mx", 100, SpaceType::DiffColor)?, 32);
        assert_eq!(tech.get_min_space("Mx", 101, SpaceType::DiffColor)?, 48);
        assert_eq!(tech.get_min_space("Mx", 100_000, SpaceType::DiffColor)?, 96);
        assert_eq!(tech.get_min_space("Mx", 50, SpaceType::LineEnd)?, 40);
        assert_eq!(tech.get_min_space("Mx", 50, SpaceType::SameColor)?, 64);
        assert!(tech.get_min_space("Nope", 50, SpaceType::DiffColor).is_err());

        // Monotonic in width, for every class
        for stype in [SpaceType::DiffColor, SpaceType::LineEnd, SpaceType::SameColor] {
            let mut prev = 0;
            for w in (0..1000).step_by(7) {
                let sp = tech.get_min_space("Mx", w, stype)?;
                assert!(sp >= prev);
                prev = sp;
            }
        }
        Ok(())
    }
    #[test]
    fn same_color_fallback() -> LayoutResult<()> {
        let mut spec = SampleTech::tech_spec()?;
        spec.sp_sc_min = None;
        let tech = Tech::new(spec)?;
        for w in [0, 150, 1000] {
            assert_eq!(
                tech.get_min_space("Mx", w, SpaceType::SameColor)?,
                tech.get_min_space("Mx", w, SpaceType::DiffColor)?
            );
        }
        Ok(())
    }
    #[test]
    fn infinite_threshold() -> LayoutResult<()> {
        let spec = SampleTech::tech_spec()?;
        let table = TechLoader::default().space_table(&spec.sp_min["Mx"])?;
        assert_eq!(table.widths.last(), Some(&Int::MAX));
        Ok(())
    }
    #[test]
    fn invalid_specs() -> LayoutResult<()> {
        // Descending width thresholds
        let mut spec = SampleTech::tech_spec()?;
        spec.sp_min.insert(
            "Mx".into(),
            SpaceTableSpec {
                w_list: vec![200., 100.],
                sp_list: vec![10., 20.],
            },
        );
        assert!(matches!(Tech::new(spec), Err(LayoutError::Load { .. })));

        // Unknown default purpose
        let mut spec = SampleTech::tech_spec()?;
        spec.default_purpose = "nope".into();
        assert!(matches!(Tech::new(spec), Err(LayoutError::Load { .. })));

        // Via layer naming an unknown layer
        let mut spec = SampleTech::tech_spec()?;
        spec.via_layers.insert("VX".into(), ("M1".into(), "M77".into()));
        match Tech::new(spec) {
            Err(LayoutError::Load { stack, .. }) => {
                assert_eq!(stack, vec![ErrorContext::Tech, ErrorContext::ViaRule("VX".into())]);
            }
            _ => panic!("Expected a load error"),
        }
        Ok(())
    }
}
