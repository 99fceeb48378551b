//! Product type conversion functions.

use trend_core::{ProductId, VariantId};

use crate::shopify::types::{Image, PriceRange, Product, ProductVariant, SelectedOption};

use super::super::queries::fragments::{ProductFields, VariantFields};
use super::convert_money;

pub fn convert_product(product: ProductFields) -> Product {
    Product {
        id: ProductId::new(product.id),
        title: product.title,
        description: product.description,
        images: product
            .images
            .into_nodes()
            .map(|image| Image {
                url: image.url,
                alt_text: image.alt_text,
            })
            .collect(),
        price_range: PriceRange {
            min_variant_price: convert_money(product.price_range.min_variant_price),
            max_variant_price: convert_money(product.price_range.max_variant_price),
        },
        variants: product.variants.into_nodes().map(convert_variant).collect(),
    }
}

fn convert_variant(variant: VariantFields) -> ProductVariant {
    ProductVariant {
        id: VariantId::new(variant.id),
        title: variant.title,
        price: convert_money(variant.price),
        compare_at_price: variant.compare_at_price.map(convert_money),
        available_for_sale: variant.available_for_sale,
        selected_options: variant
            .selected_options
            .into_iter()
            .map(|option| SelectedOption {
                name: option.name,
                value: option.value,
            })
            .collect(),
    }
}
