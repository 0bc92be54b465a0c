//! Repair strategies for malformed JSON produced by the generation backend.
//!
//! LLMs routinely emit itineraries with missing commas, trailing commas,
//! unbalanced brackets or commentary around the payload. Each function here
//! is one named recovery strategy; callers apply them in escalating order
//! and re-parse after each. None of these functions talk to the backend —
//! when every strategy fails the caller decides whether to regenerate.

use regex::Regex;

/// Strip markdown code fences and extract the first `[ { ... } ]` block.
pub fn extract_json_array(output: &str) -> Option<String> {
    let fence = Regex::new(r"```(?:json)?").ok()?;
    let cleaned = fence.replace_all(output, "");
    let cleaned = cleaned.trim();

    let array = Regex::new(r"(?s)\[\s*\{.*\}\s*\]").ok()?;
    array.find(cleaned).map(|m| m.as_str().to_string())
}

/// Basic repairs: commas between adjacent value/close tokens and a new
/// quoted key on the next line, plus trailing-comma removal.
pub fn repair_basic(json_str: &str) -> String {
    println!("Applying basic JSON repairs...");
    let mut out = json_str.to_string();

    let rules = [
        (r#"("\s*)\n(\s*")"#, "${1},\n${2}"),
        (r#"(\]\s*)\n(\s*")"#, "${1},\n${2}"),
        (r#"(\}\s*)\n(\s*")"#, "${1},\n${2}"),
        (r"(\})\s*\n\s*(\{)", "${1},\n${2}"),
        (r",\s*([}\]])", "${1}"),
    ];

    for (pattern, replacement) in rules {
        if let Ok(re) = Regex::new(pattern) {
            out = re.replace_all(&out, replacement).to_string();
        }
    }

    out
}

/// Line-pair heuristic: a line ending in a value terminator followed by a
/// line opening a new key or object gets a comma appended.
pub fn fix_missing_commas(json_str: &str) -> String {
    println!("Fixing missing commas...");
    let lines: Vec<&str> = json_str.split('\n').collect();
    let mut fixed: Vec<String> = Vec::with_capacity(lines.len());

    for (i, line) in lines.iter().enumerate() {
        let mut current = line.to_string();

        if i + 1 < lines.len() {
            let trimmed = line.trim_end();
            let next = lines[i + 1].trim_start();

            let value_end = trimmed.ends_with('"')
                || trimmed.ends_with(']')
                || trimmed.ends_with('}');
            let new_key = next.starts_with('"');
            let new_object = trimmed.ends_with('}') && next.starts_with('{');

            if (value_end && new_key) || new_object {
                current = trimmed.to_string();
                if !current.ends_with(',') {
                    current.push(',');
                }
            }
        }

        fixed.push(current);
    }

    fixed.join("\n")
}

/// Context-aware variant of [`fix_missing_commas`] that skips blank lines
/// when looking ahead and only treats `"..."` continuations as keys when
/// they contain a colon.
pub fn smart_comma_repair(json_str: &str) -> String {
    println!("Applying smart comma repair...");
    let lines: Vec<&str> = json_str.split('\n').collect();
    let mut repaired: Vec<String> = Vec::with_capacity(lines.len());

    for (i, line) in lines.iter().enumerate() {
        let mut current = line.trim_end().to_string();

        let next = lines[i + 1..]
            .iter()
            .map(|l| l.trim())
            .find(|l| !l.is_empty());

        if let Some(next) = next {
            let next_is_key = next.starts_with('"') && next.contains(':');
            let needs_comma = (current.ends_with('"') && next_is_key)
                || (current.ends_with(']') && next_is_key)
                || (current.ends_with('}') && next_is_key)
                || (current.ends_with('}') && next.starts_with('{'));

            if needs_comma && !current.ends_with(',') {
                current.push(',');
                println!("Added comma to line {}", i + 1);
            }
        }

        repaired.push(current);
    }

    repaired.join("\n")
}

/// Parse until the exact failure offset is known, then scan backward to the
/// nearest structural character and insert a comma if the next meaningful
/// character opens a new string or object.
pub fn character_level_repair(json_str: &str) -> String {
    println!("Applying character-level repair...");

    let err = match serde_json::from_str::<serde_json::Value>(json_str) {
        Ok(_) => return json_str.to_string(),
        Err(e) => e,
    };

    let error_pos = offset_of(json_str, err.line(), err.column());
    println!("JSON error at position {error_pos}");

    let bytes = json_str.as_bytes();
    if error_pos >= bytes.len() {
        return json_str.to_string();
    }

    for i in (0..error_pos).rev() {
        let c = bytes[i] as char;
        if c == '"' || c == ']' || c == '}' {
            let next_meaningful = bytes[error_pos..]
                .iter()
                .map(|&b| b as char)
                .find(|c| !c.is_whitespace());

            if matches!(next_meaningful, Some('"') | Some('{')) {
                let mut repaired = String::with_capacity(json_str.len() + 1);
                repaired.push_str(&json_str[..i + 1]);
                repaired.push(',');
                repaired.push_str(&json_str[i + 1..]);
                println!("Inserted comma at position {}", i + 1);
                return repaired;
            }
            break;
        } else if !c.is_whitespace() {
            break;
        }
    }

    json_str.to_string()
}

/// Last-resort repair: re-apply the basic pass, extract the outermost
/// array, trim trailing garbage, balance brackets and braces, collapse
/// stray commas, and join adjacent objects.
pub fn repair_aggressive(json_str: &str) -> String {
    println!("Applying aggressive JSON repairs...");
    let mut out = repair_basic(json_str);

    if let Ok(re) = Regex::new(r"(?s)\[.*\]") {
        if let Some(m) = re.find(&out) {
            out = m.as_str().to_string();
            println!("Extracted main JSON array");
        }
    }

    out = out.trim().to_string();

    if !out.starts_with('[') {
        if let Some(pos) = out.find('[') {
            out = out[pos..].to_string();
        }
    }
    if !out.ends_with(']') {
        if let Some(pos) = out.rfind(']') {
            out.truncate(pos + 1);
        }
    }

    let open_braces = out.matches('{').count();
    let close_braces = out.matches('}').count();
    if open_braces > close_braces {
        let missing = open_braces - close_braces;
        if out.ends_with(']') {
            out.pop();
            out.push_str(&"}".repeat(missing));
            out.push(']');
        } else {
            out.push_str(&"}".repeat(missing));
        }
        println!("Added {missing} missing closing braces");
    }

    let open_brackets = out.matches('[').count();
    let close_brackets = out.matches(']').count();
    if open_brackets > close_brackets {
        let missing = open_brackets - close_brackets;
        out.push_str(&"]".repeat(missing));
        println!("Added {missing} missing closing brackets");
    }

    if let Ok(re) = Regex::new(r",\s*([}\]])") {
        out = re.replace_all(&out, "${1}").to_string();
    }
    if let Ok(re) = Regex::new(r"(\})\s*(\{)") {
        out = re.replace_all(&out, "${1},${2}").to_string();
    }

    if let Some(pos) = out.rfind(']') {
        out.truncate(pos + 1);
    }

    out
}

fn offset_of(s: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    for (i, l) in s.split('\n').enumerate() {
        if i + 1 == line {
            return (offset + column.saturating_sub(1)).min(s.len());
        }
        offset += l.len() + 1;
    }
    s.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn parses(s: &str) -> Option<Value> {
        serde_json::from_str(s).ok()
    }

    #[test]
    fn extracts_array_from_fenced_output() {
        let output = "Here is your plan:\n```json\n[{\"day\": 1}]\n```\nEnjoy!";
        let extracted = extract_json_array(output).unwrap();
        assert_eq!(extracted, "[{\"day\": 1}]");
    }

    #[test]
    fn basic_repair_fixes_missing_comma_between_objects() {
        let broken = "[{\"a\":\"1\"}\n{\"a\":\"2\"}]";
        let repaired = repair_basic(broken);
        let value = parses(&repaired).expect("should parse after basic repair");
        assert_eq!(value.as_array().unwrap().len(), 2);
    }

    #[test]
    fn basic_repair_strips_trailing_comma() {
        let broken = "[{\"a\":\"1\",}]";
        let repaired = repair_basic(broken);
        let value = parses(&repaired).expect("should parse after basic repair");
        assert_eq!(value.as_array().unwrap().len(), 1);
    }

    #[test]
    fn smart_repair_handles_missing_comma_between_keys() {
        let broken = "[\n{\n\"town\": \"Warsaw\"\n\"place\": \"Old Town\",\n\"activities\": []\n}\n]";
        let repaired = smart_comma_repair(broken);
        let value = parses(&repaired).expect("should parse after smart repair");
        assert_eq!(value[0]["town"], "Warsaw");
    }

    #[test]
    fn character_level_repair_joins_adjacent_objects_on_one_line() {
        let broken = "[{\"a\":\"1\"} {\"a\":\"2\"}]";
        let repaired = character_level_repair(broken);
        let value = parses(&repaired).expect("should parse after character repair");
        assert_eq!(value.as_array().unwrap().len(), 2);
    }

    #[test]
    fn aggressive_repair_balances_brackets_and_trims_garbage() {
        let broken = "Sure! [{\"a\":\"1\"},{\"a\":\"2\"]";
        let repaired = repair_aggressive(broken);
        let value = parses(&repaired).expect("should parse after aggressive repair");
        assert_eq!(value.as_array().unwrap().len(), 2);
    }

    #[test]
    fn aggressive_repair_leaves_valid_json_parseable() {
        let valid = "[{\"a\":\"1\"},{\"a\":\"2\"}]";
        let repaired = repair_aggressive(valid);
        let value = parses(&repaired).expect("valid input must stay valid");
        assert_eq!(value.as_array().unwrap().len(), 2);
    }
}
