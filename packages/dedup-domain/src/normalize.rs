use std::sync::LazyLock;

use regex::Regex;

static HYPHEN_RUN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"-{2,}").expect("Hyphen run pattern must compile."));
static SPACE_RUN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r" {2,}").expect("Space run pattern must compile."));
static SPACED_HYPHEN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r" ?- ?").expect("Spaced hyphen pattern must compile."));

/// Family-name approximation: hyphen runs and space runs collapse to one, and a hyphen absorbs
/// its neighbouring spaces.
pub fn family_name(value: &str) -> String {
	let collapsed = HYPHEN_RUN.replace_all(value.trim(), "-");
	let collapsed = SPACE_RUN.replace_all(&collapsed, " ");

	SPACED_HYPHEN.replace_all(&collapsed, "-").into_owned()
}

/// Lower-cased with space runs collapsed.
pub fn first_name(value: &str) -> String {
	SPACE_RUN.replace_all(value.trim(), " ").to_lowercase()
}

pub fn words(value: &str) -> Vec<String> {
	value.split(' ').filter(|word| !word.is_empty()).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn family_name_collapses_hyphens_and_spaces() {
		assert_eq!(family_name("Jean--  Pierre"), "Jean-Pierre");
		assert_eq!(family_name("Jean - Pierre"), "Jean-Pierre");
		assert_eq!(family_name("Le  Goff"), "Le Goff");
		assert_eq!(family_name("Martin"), "Martin");
	}

	#[test]
	fn first_name_lowercases_and_collapses_spaces() {
		assert_eq!(first_name("  Jean   Paul "), "jean paul");
		assert_eq!(words(&first_name("  Jean   Paul ")), vec!["jean", "paul"]);
		assert!(words(&first_name("   ")).is_empty());
	}
}
