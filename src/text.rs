use std::borrow::Cow;

/// Canonicalizes a label for key comparison: trims surrounding whitespace,
/// lowercases, then strips the maximal trailing run of characters that are
/// not lowercase ASCII letters. Applying it twice is a no-op, so normalized
/// output can be compared against normalized output directly.
///
/// `"Sugar2"` becomes `"sugar"`, `"sugar "` becomes `"sugar"`, and
/// `"Flour (kg)"` becomes `"flour (kg"`.
pub fn normalize(input: &str) -> Cow<'_, str> {
    let trimmed = input.trim();
    if trimmed.chars().any(char::is_uppercase) {
        let mut lowered = trimmed.to_lowercase();
        let keep = lowered
            .trim_end_matches(|c: char| !c.is_ascii_lowercase())
            .len();
        lowered.truncate(keep);
        Cow::Owned(lowered)
    } else {
        let stripped = trimmed.trim_end_matches(|c: char| !c.is_ascii_lowercase());
        if stripped.len() == input.len() {
            Cow::Borrowed(input)
        } else {
            Cow::Borrowed(stripped)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_lowercases_and_strips_trailing_non_letters() {
        assert_eq!(normalize("Sugar2").as_ref(), "sugar");
        assert_eq!(normalize("sugar ").as_ref(), "sugar");
        assert_eq!(normalize("Flour (kg)").as_ref(), "flour (kg");
        assert_eq!(normalize("  Whole Milk  ").as_ref(), "whole milk");
        assert_eq!(normalize("100%").as_ref(), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in ["Sugar2", "  Flour (kg)", "eggs", "A1 + B2", "", "   "] {
            let once = normalize(raw).into_owned();
            assert_eq!(normalize(&once).as_ref(), once);
        }
    }

    #[test]
    fn normalize_borrows_canonical_input() {
        assert!(matches!(normalize("sugar"), Cow::Borrowed(_)));
        assert!(matches!(normalize("Sugar"), Cow::Owned(_)));
    }
}
