use std::sync::LazyLock;

use regex::Regex;

static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\W_]+").unwrap());
static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());

/// Make sure `filename` ends with `extension`.
///
/// The extension may be given with or without its dot. An empty extension
/// returns the name untouched, as does a name that already carries it.
pub fn clean_filename(filename: &str, extension: &str) -> String {
    let ext = extension.trim_start_matches('.');
    if filename.is_empty() || ext.is_empty() {
        return filename.to_string();
    }
    let suffix = format!(".{}", ext);
    if filename.ends_with(&suffix) {
        filename.to_string()
    } else if filename.ends_with('.') {
        format!("{}{}", filename, ext)
    } else {
        format!("{}{}", filename, suffix)
    }
}

/// Drop apostrophes from a partner or studio name: `Totico's` -> `Toticos`.
pub fn clean_partner_tag(tag: &str) -> String {
    tag.chars().filter(|c| *c != '\'' && *c != '\u{2019}').collect()
}

/// Distinct separator runs (non-word characters and underscores) in order
/// of first appearance.
pub fn split_chars(raw: &str) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for m in SEPARATOR_RE.find_iter(raw) {
        if !seen.contains(&m.as_str()) {
            seen.push(m.as_str());
        }
    }
    seen
}

/// The separator a delimited string uses, e.g. `", "` for `"a, b, c"`.
///
/// When several kinds of separators occur the first one that is not plain
/// whitespace wins. `None` when the string has no separator at all.
pub fn split_char(raw: &str) -> Option<&str> {
    let chars = split_chars(raw);
    match chars.len() {
        0 => None,
        1 => Some(chars[0]),
        _ => chars
            .iter()
            .copied()
            .find(|c| !c.trim().is_empty())
            .or(Some(chars[0])),
    }
}

/// Lowercased word runs of `text` joined with `sep`: `"O'Connor"` -> `"o-connor"`.
pub fn join_word_runs(text: &str, sep: &str) -> String {
    WORD_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Title case by word runs: a letter is uppercased
/// when it follows a non-letter, lowercased otherwise.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

fn contains(haystack: &str, needle: &str, ignore_case: bool) -> bool {
    if ignore_case {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    } else {
        haystack.contains(needle)
    }
}

/// Index of the first item containing `hint`.
pub fn match_list_single<S: AsRef<str>>(hint: &str, items: &[S], ignore_case: bool) -> Option<usize> {
    items
        .iter()
        .position(|item| contains(item.as_ref(), hint, ignore_case))
}

/// Indices of every item containing `hint`.
pub fn match_list_mult<S: AsRef<str>>(hint: &str, items: &[S], ignore_case: bool) -> Vec<usize> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| contains(item.as_ref(), hint, ignore_case))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_gets_its_extension() {
        assert_eq!(clean_filename("sample.json", "json"), "sample.json");
        assert_eq!(clean_filename("sample", "json"), "sample.json");
        assert_eq!(clean_filename("sample", ".json"), "sample.json");
        assert_eq!(clean_filename("wp_posts.json", ".json"), "wp_posts.json");
        assert_eq!(clean_filename("sample.", "json"), "sample.json");
    }

    #[test]
    fn filename_trust_mode_and_dotted_names() {
        assert_eq!(clean_filename("com.thispackage.anything", ""), "com.thispackage.anything");
        assert_eq!(
            clean_filename("com.thispackage.anything", "java"),
            "com.thispackage.anything.java"
        );
        assert_eq!(
            clean_filename("com.thispackage.anything", ".java"),
            "com.thispackage.anything.java"
        );
        assert_eq!(clean_filename("", "json"), "");
    }

    #[test]
    fn clean_filename_is_idempotent() {
        for (name, ext) in [("sample", "json"), ("a.b", ".c"), ("x", ""), ("wp_posts.json", "json")] {
            let once = clean_filename(name, ext);
            assert_eq!(clean_filename(&once, ext), once);
        }
    }

    #[test]
    fn partner_tags_lose_apostrophes() {
        assert_eq!(clean_partner_tag("Totico's"), "Toticos");
        assert_eq!(clean_partner_tag("Paradise GF's"), "Paradise GFs");
        assert_eq!(clean_partner_tag("All Mama's & Papa's"), "All Mamas & Papas");
        assert_eq!(clean_partner_tag("This one does not need anything"), "This one does not need anything");
        assert_eq!(clean_partner_tag("wildlifeclouds"), "wildlifeclouds");
    }

    #[test]
    fn separator_detection() {
        assert_eq!(split_char("Hannah X;Didi Dexter;Sarah O'Connor"), Some(";"));
        assert_eq!(split_char("Jane Doe, Ann Roe"), Some(", "));
        assert_eq!(split_char("Su Rye"), Some(" "));
        assert_eq!(split_char("solo"), None);
        assert_eq!(split_chars("a-b_c-d"), vec!["-", "_"]);
    }

    #[test]
    fn title_case_restarts_after_non_letters() {
        assert_eq!(title_case("sarah o'connor"), "Sarah O'Connor");
        assert_eq!(title_case("BIG city-LIGHTS"), "Big City-Lights");
    }

    #[test]
    fn list_matching() {
        let items = ["alpha-1", "Beta-2", "alpha-3"];
        assert_eq!(match_list_single("alpha", &items, false), Some(0));
        assert_eq!(match_list_single("beta", &items, false), None);
        assert_eq!(match_list_single("beta", &items, true), Some(1));
        assert_eq!(match_list_mult("alpha", &items, false), vec![0, 2]);
    }
}
