use rand::{Rng, RngCore};

use grocery_core::{Error, ProductRow, Result};

use crate::faker::{self, LocaleKey};

pub const UNITS: [&str; 3] = ["kg", "litre", "pack"];

/// Products referencing the supplied category keys.
///
/// Each product draws its category uniformly from `category_keys`.
pub fn generate_products(
    category_keys: &[i64],
    count: usize,
    locale: LocaleKey,
    rng: &mut dyn RngCore,
) -> Result<Vec<ProductRow>> {
    if category_keys.is_empty() {
        return Err(Error::EmptyReferenceSet(
            "no category keys to reference from dim_product".to_string(),
        ));
    }

    Ok((0..count)
        .map(|_| ProductRow {
            product_name: faker::capitalized_word(locale, rng),
            category_id: category_keys[rng.random_range(0..category_keys.len())],
            brand: faker::company(locale, rng),
            unit: UNITS[rng.random_range(0..UNITS.len())].to_string(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn categories_come_from_the_supplied_set() {
        let keys = [3, 5, 8];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let products = generate_products(&keys, 60, LocaleKey::EnUs, &mut rng).expect("products");
        assert_eq!(products.len(), 60);
        for product in &products {
            assert!(keys.contains(&product.category_id));
            assert!(UNITS.contains(&product.unit.as_str()));
            assert!(product
                .product_name
                .chars()
                .next()
                .is_some_and(|first| !first.is_lowercase()));
        }
    }

    #[test]
    fn empty_category_set_fails() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(matches!(
            generate_products(&[], 5, LocaleKey::EnUs, &mut rng),
            Err(Error::EmptyReferenceSet(_))
        ));
    }

    #[test]
    fn zero_count_is_allowed() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let products = generate_products(&[1], 0, LocaleKey::EnUs, &mut rng).expect("products");
        assert!(products.is_empty());
    }
}
