//! Pure text-formatting helpers for the PowerShell surface syntax.
//!
//! All functions are total: absent optional input formats as the empty
//! string, and no input is an error.

/// Render a boolean as a PowerShell literal (`$true` / `$false`).
pub fn ps_bool(value: bool) -> &'static str {
    if value { "$true" } else { "$false" }
}

/// Strip the CLR generic-arity marker (a backtick followed by digits)
/// from a type display name, preserving the text around it.
///
/// `System.Collections.Generic.Dictionary`2[System.String,System.Int32]`
/// becomes `System.Collections.Generic.Dictionary[System.String,System.Int32]`.
pub fn ps_type(type_name: &str) -> String {
    let bytes = type_name.as_bytes();
    let mut marker = None;
    for (index, &byte) in bytes.iter().enumerate() {
        if byte == b'`'
            && let Some(next) = bytes.get(index + 1)
            && next.is_ascii_digit()
        {
            marker = Some(index);
        }
    }
    let Some(start) = marker else {
        return type_name.to_string();
    };
    let mut end = start + 1;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    format!("{}{}", &type_name[..start], &type_name[end..])
}

/// Like [`ps_type`], additionally stripping a trailing `Attribute`
/// suffix, matching how PowerShell abbreviates attribute type names.
pub fn ps_attribute_type(type_name: &str) -> String {
    let stripped = ps_type(type_name);
    match stripped.strip_suffix("Attribute") {
        Some(prefix) => prefix.to_string(),
        None => stripped,
    }
}

/// Escape free text into the body of a single-quoted PowerShell string
/// literal: quotes are doubled (typographic variants included), and
/// line breaks plus the `<br>` marker collapse to single spaces since
/// the attribute-argument position has no multiline literal form.
pub fn ps_string_literal(value: Option<&str>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    value
        .replace('\'', "''")
        .replace('\u{2018}', "''")
        .replace('\u{2019}', "''")
        .replace("<br>", " ")
        .replace("\r\n", " ")
        .replace('\n', " ")
}

/// Join only the non-empty items with `separator`, so optional
/// fragments never produce doubled, leading, or trailing separators.
pub fn join_non_empty<I, S>(items: I, separator: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut output = String::new();
    for item in items {
        let item = item.as_ref();
        if item.is_empty() {
            continue;
        }
        if !output.is_empty() {
            output.push_str(separator);
        }
        output.push_str(item);
    }
    output
}

/// Render a manifest value list: `'A', 'B'`, or `''` when empty.
pub fn ps_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let quoted = items
        .into_iter()
        .map(|item| format!("'{}'", item.as_ref()))
        .collect::<Vec<_>>();
    if quoted.is_empty() {
        "''".to_string()
    } else {
        quoted.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ps_bool_literals() {
        assert_eq!(ps_bool(true), "$true");
        assert_eq!(ps_bool(false), "$false");
    }

    #[test]
    fn ps_type_strips_generic_arity() {
        assert_eq!(
            ps_type("System.Collections.Generic.Dictionary`2[System.String,System.Int32]"),
            "System.Collections.Generic.Dictionary[System.String,System.Int32]"
        );
    }

    #[test]
    fn ps_type_leaves_plain_names_alone() {
        assert_eq!(ps_type("System.String"), "System.String");
        assert_eq!(ps_type("Widget`Raw"), "Widget`Raw");
    }

    #[test]
    fn ps_type_strips_multi_digit_arity() {
        assert_eq!(ps_type("Tuple`10[A,B]"), "Tuple[A,B]");
    }

    #[test]
    fn ps_attribute_type_strips_suffix() {
        assert_eq!(
            ps_attribute_type("Widget.Runtime.ProfileAttribute"),
            "Widget.Runtime.Profile"
        );
        assert_eq!(ps_attribute_type("Widget.Runtime.Profile"), "Widget.Runtime.Profile");
    }

    #[test]
    fn ps_string_literal_doubles_quotes_and_collapses_breaks() {
        assert_eq!(
            ps_string_literal(Some("it\u{2018}s a 'test'\r\nline<br>two\nthree")),
            "it''s a ''test'' line two three"
        );
    }

    #[test]
    fn ps_string_literal_is_idempotent_once_breaks_are_collapsed() {
        let escaped = ps_string_literal(Some("line\r\none\u{2019}s<br>end"));
        assert_eq!(escaped, "line one''s end");
        // A second pass only re-doubles quotes; quote-free output is a
        // fixed point.
        let quote_free = "line one s end";
        assert_eq!(ps_string_literal(Some(quote_free)), quote_free);
        assert_eq!(ps_string_literal(Some(&escaped)), "line one''''s end");
    }

    #[test]
    fn ps_string_literal_none_is_empty() {
        assert_eq!(ps_string_literal(None), "");
    }

    #[test]
    fn join_non_empty_skips_blanks() {
        assert_eq!(
            join_non_empty(["a", "", "b", ""], ", "),
            "a, b"
        );
        assert_eq!(join_non_empty(["", ""], ", "), "");
    }

    #[test]
    fn ps_list_quotes_items() {
        assert_eq!(ps_list(["Get-Widget", "Set-Widget"]), "'Get-Widget', 'Set-Widget'");
        assert_eq!(ps_list(Vec::<String>::new()), "''");
    }
}
