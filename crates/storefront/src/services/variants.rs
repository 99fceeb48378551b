//! Variant selection for a product's option groups.
//!
//! Pure and synchronous: the only "failure" is a selection no variant
//! matches, which keeps the previously selected variant.

use std::collections::HashMap;

use crate::shopify::types::ProductVariant;

/// A named axis of variation and its values in order of first appearance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionGroup {
    pub name: String,
    pub values: Vec<String>,
}

/// Derive option groups from variants.
///
/// Groups and values keep the order in which they first appear.
#[must_use]
pub fn option_groups(variants: &[ProductVariant]) -> Vec<OptionGroup> {
    let mut groups: Vec<OptionGroup> = Vec::new();

    for option in variants.iter().flat_map(|v| &v.selected_options) {
        match groups.iter_mut().find(|g| g.name == option.name) {
            Some(group) => {
                if !group.values.contains(&option.value) {
                    group.values.push(option.value.clone());
                }
            }
            None => groups.push(OptionGroup {
                name: option.name.clone(),
                values: vec![option.value.clone()],
            }),
        }
    }

    groups
}

/// Whether `variant` agrees with every group present in `selection`.
///
/// Groups the selection does not mention yet are not compared.
fn matches(variant: &ProductVariant, selection: &HashMap<String, String>) -> bool {
    variant.selected_options.iter().all(|option| {
        selection
            .get(&option.name)
            .is_none_or(|value| *value == option.value)
    })
}

fn selection_of(variant: &ProductVariant) -> HashMap<String, String> {
    variant
        .selected_options
        .iter()
        .map(|o| (o.name.clone(), o.value.clone()))
        .collect()
}

/// Tracks the selected options and the variant they resolve to.
#[derive(Debug, Clone)]
pub struct VariantResolver {
    variants: Vec<ProductVariant>,
    groups: Vec<OptionGroup>,
    selection: HashMap<String, String>,
    selected: Option<usize>,
}

impl VariantResolver {
    /// Start with the first variant available for sale, else the first one.
    ///
    /// A product without variants has no groups and no selection.
    #[must_use]
    pub fn new(variants: Vec<ProductVariant>) -> Self {
        let groups = option_groups(&variants);
        let selected = variants
            .iter()
            .position(|v| v.available_for_sale)
            .or_else(|| (!variants.is_empty()).then_some(0));
        let selection = selected
            .and_then(|i| variants.get(i))
            .map(selection_of)
            .unwrap_or_default();

        Self {
            variants,
            groups,
            selection,
            selected,
        }
    }

    #[must_use]
    pub fn option_groups(&self) -> &[OptionGroup] {
        &self.groups
    }

    #[must_use]
    pub const fn selected_options(&self) -> &HashMap<String, String> {
        &self.selection
    }

    #[must_use]
    pub fn selected_variant(&self) -> Option<&ProductVariant> {
        self.selected.and_then(|i| self.variants.get(i))
    }

    /// More than one variant to choose from.
    #[must_use]
    pub fn needs_selector(&self) -> bool {
        self.variants.len() > 1
    }

    /// Merge `name = value` into the selection and resolve it.
    ///
    /// Picks the first variant, in original order, agreeing with the
    /// selection. When none does, the selection keeps the new value but the
    /// selected variant is unchanged.
    pub fn select_option(&mut self, name: &str, value: &str) -> Option<&ProductVariant> {
        self.selection.insert(name.to_string(), value.to_string());

        if let Some(index) = self
            .variants
            .iter()
            .position(|v| matches(v, &self.selection))
        {
            self.selected = Some(index);
        }

        self.selected_variant()
    }

    /// Select a variant directly, replacing the selection with its options.
    ///
    /// Variants that do not belong to this product are ignored.
    pub fn select_variant(&mut self, variant: &ProductVariant) -> Option<&ProductVariant> {
        if let Some((index, own)) = self
            .variants
            .iter()
            .enumerate()
            .find(|(_, v)| v.id == variant.id)
        {
            self.selection = selection_of(own);
            self.selected = Some(index);
        }
        self.selected_variant()
    }
}
