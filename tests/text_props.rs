use menu_metrics::{merge::decompose_ingredient, text::normalize};
use proptest::prelude::*;

#[test]
fn normalize_concrete_fixtures() {
    assert_eq!(normalize("Sugar2").as_ref(), "sugar");
    assert_eq!(normalize("sugar ").as_ref(), "sugar");
    assert_eq!(normalize("Flour (kg)").as_ref(), "flour (kg");
    assert_eq!(normalize("  EGGS!!").as_ref(), "eggs");
    assert_eq!(normalize("").as_ref(), "");
}

#[test]
fn decompose_concrete_fixture() {
    assert_eq!(decompose_ingredient("Flour + Sugar"), vec!["flour", "sugar"]);
}

proptest! {
    #[test]
    fn normalize_is_idempotent_for_arbitrary_strings(input in ".{0,64}") {
        let once = normalize(&input).into_owned();
        let twice = normalize(&once).into_owned();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalized_output_never_ends_with_a_non_letter(input in ".{0,64}") {
        let result = normalize(&input).into_owned();
        if let Some(last) = result.chars().last() {
            prop_assert!(last.is_ascii_lowercase());
        }
    }

    #[test]
    fn decomposed_tokens_are_already_normalized(input in "[A-Za-z0-9 +]{0,48}") {
        for token in decompose_ingredient(&input) {
            prop_assert_eq!(normalize(&token).into_owned(), token);
        }
    }
}
