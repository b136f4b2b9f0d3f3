pub const DEFAULT_EXPECTED_COUNT: u32 = 8;

pub fn build_prompt(description: &str, expected_count: u32) -> String {
    format!(
        r#"
You are a professional QA engineer. Analyze the UI screenshot (sent separately) and the feature description below.
Generate {expected_count} clear, distinct, and executable UI test cases.

Return ONLY valid JSON: an array of objects. Each object MUST contain exactly:
  tc_id, scenario, steps, expected_result

- tc_id: short ID like TC001
- scenario: one-line test title
- steps: numbered steps as a single string (use '\n' for newlines)
- expected_result: concise expected outcome

UI Description:
{description}

Return ONLY the JSON array, nothing else.
"#
    )
    .trim()
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_description_and_count() {
        let prompt = build_prompt("Checkout page with coupon field", 5);
        assert!(prompt.contains("Checkout page with coupon field"));
        assert!(prompt.contains("Generate 5 clear, distinct, and executable UI test cases."));
    }

    #[test]
    fn test_prompt_names_the_four_fields() {
        let prompt = build_prompt("Login", DEFAULT_EXPECTED_COUNT);
        assert!(prompt.contains("tc_id, scenario, steps, expected_result"));
        assert!(prompt.contains("Generate 8 "));
        assert!(prompt.ends_with("Return ONLY the JSON array, nothing else."));
        assert!(prompt.starts_with("You are a professional QA engineer."));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        assert_eq!(build_prompt("Search", 3), build_prompt("Search", 3));
    }
}
