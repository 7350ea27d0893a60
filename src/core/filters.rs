use crate::models::Provider;

/// Check if a provider may take part in any matching at all
#[inline]
pub fn is_eligible(provider: &Provider) -> bool {
    provider.verified()
}

/// Check if an eligible provider offers the requested service type
#[inline]
pub fn offers_category(provider: &Provider, category: &str) -> bool {
    is_eligible(provider) && provider.has_skill(category)
}

/// Bitmask of the requested categories a provider can perform
///
/// Bit `i` is set when the provider lists `categories[i]` among its skills.
/// Only the first 64 categories are representable.
#[inline]
pub fn coverage_mask(provider: &Provider, categories: &[String]) -> u64 {
    categories
        .iter()
        .take(u64::BITS as usize)
        .enumerate()
        .filter(|(_, category)| provider.has_skill(category))
        .fold(0u64, |mask, (bit, _)| mask | (1 << bit))
}

/// Category names for the bits set in `mask`
pub fn categories_in(mask: u64, categories: &[String]) -> Vec<String> {
    categories
        .iter()
        .take(u64::BITS as usize)
        .enumerate()
        .filter(|(bit, _)| mask & (1 << *bit) != 0)
        .map(|(_, category)| category.clone())
        .collect()
}
