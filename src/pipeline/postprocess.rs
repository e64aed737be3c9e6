//! Response cleanup: strip a wrapping code fence from model output.
//!
//! The prompt forbids fences and prose, but models occasionally disobey and
//! wrap the whole file in ` ```tsx … ``` ` anyway. One defensive rule fixes
//! that without touching the code itself. The raw response is otherwise
//! passed through untouched — reformatting generated source is not this
//! tool's business.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_OUTER_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```(?:tsx|jsx|javascript|typescript|react|html|xml)?[ \t]*\n(.*)\n```\s*$")
        .unwrap()
});

/// Remove a single outer code fence if the whole response is wrapped in one.
pub fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    match RE_OUTER_FENCE.captures(trimmed) {
        Some(caps) => caps[1].to_string(),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfenced_output_passes_through() {
        let code = "export default function App() {\n  return <div />;\n}";
        assert_eq!(strip_code_fences(code), code);
    }

    #[test]
    fn tsx_fence_is_stripped() {
        let raw = "```tsx\nexport default function App() {}\n```";
        assert_eq!(strip_code_fences(raw), "export default function App() {}");
    }

    #[test]
    fn bare_fence_is_stripped() {
        let raw = "```\n<!DOCTYPE html>\n<html></html>\n```\n";
        assert_eq!(strip_code_fences(raw), "<!DOCTYPE html>\n<html></html>");
    }

    #[test]
    fn inner_fences_survive() {
        // A fence in the middle of the file must not trigger the rule.
        let code = "const a = 1;\n// ```\nconst b = 2;";
        assert_eq!(strip_code_fences(code), code);
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(strip_code_fences("  <div />  \n"), "<div />");
    }
}
