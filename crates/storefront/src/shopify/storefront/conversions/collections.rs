//! Collection type conversion functions.

use trend_core::CollectionId;

use crate::shopify::types::Collection;

use super::super::queries::fragments::CollectionFields;

pub fn convert_collection(collection: CollectionFields) -> Collection {
    Collection {
        id: CollectionId::new(collection.id),
        title: collection.title,
        description: collection.description.unwrap_or_default(),
        image_url: collection.image.map(|image| image.url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shopify::storefront::queries::fragments::CollectionImageFields;

    #[test]
    fn test_missing_description_becomes_empty() {
        let collection = convert_collection(CollectionFields {
            id: "gid://shopify/Collection/1".to_string(),
            title: "Summer".to_string(),
            description: None,
            image: Some(CollectionImageFields {
                url: "https://cdn.example.com/summer.jpg".to_string(),
            }),
        });
        assert_eq!(collection.description, "");
        assert_eq!(
            collection.image_url.as_deref(),
            Some("https://cdn.example.com/summer.jpg")
        );
    }
}
