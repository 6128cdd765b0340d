/// Rewrites a `snake_case` (or `SCREAMING_SNAKE_CASE`) key as `camelCase`.
///
/// The first word is lower-cased, every following word is capitalized and the
/// underscores are dropped. Empty words (leading, trailing or doubled
/// underscores) vanish.
///
/// ```
/// use rastercat_core::snake_to_camel_case;
///
/// assert_eq!(snake_to_camel_case("STATISTICS_MINIMUM"), "statisticsMinimum");
/// assert_eq!(snake_to_camel_case("band_order"), "bandOrder");
/// ```
#[must_use]
pub fn snake_to_camel_case(key: &str) -> String {
	let mut result = String::with_capacity(key.len());
	let mut words = key.split('_');

	if let Some(first) = words.next() {
		result.push_str(&first.to_lowercase());
	}

	for word in words {
		let mut chars = word.chars();
		if let Some(initial) = chars.next() {
			result.extend(initial.to_uppercase());
			result.push_str(&chars.as_str().to_lowercase());
		}
	}

	result
}
