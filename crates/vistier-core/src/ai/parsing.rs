//! Category extraction from classifier responses
//!
//! Model responses are supposed to be a single token from the closed set,
//! but small local models often wrap the answer in extra prose. Matching is
//! layered: exact/containment first, then the first whitespace-delimited
//! token that names a category, then `OTHER`. A fallthrough to `OTHER` is
//! still a successful classification, not a failure.

use crate::models::Category;

/// Extract a category from a raw classifier response
pub fn parse_category_response(response: &str) -> Category {
    let response = response.trim().to_uppercase();

    for category in Category::ALL {
        if response == category.as_str() || response.contains(category.as_str()) {
            return category;
        }
    }

    for word in response.split_whitespace() {
        if let Ok(category) = word.parse::<Category>() {
            return category;
        }
    }

    Category::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_token() {
        assert_eq!(parse_category_response("GROCERIES"), Category::Groceries);
        assert_eq!(parse_category_response("  dining \n"), Category::Dining);
    }

    #[test]
    fn test_containment() {
        assert_eq!(
            parse_category_response("The category is GROCERIES."),
            Category::Groceries
        );
    }

    #[test]
    fn test_fee_subcategory_wins_over_generic_other() {
        // OTHER sits last in the table, so OTHER_FEE matches before the
        // bare OTHER containment check can fire
        assert_eq!(parse_category_response("OTHER_FEE"), Category::OtherFee);
        assert_eq!(
            parse_category_response("OTHER_TRANSPORT"),
            Category::OtherTransport
        );
    }

    #[test]
    fn test_token_scan() {
        assert_eq!(
            parse_category_response("ANSWER: ATM_FEE (bank charge)"),
            Category::AtmFee
        );
    }

    #[test]
    fn test_unrecognized_defaults_to_other() {
        assert_eq!(
            parse_category_response("I am not sure about this one"),
            Category::Other
        );
        assert_eq!(parse_category_response(""), Category::Other);
    }
}
