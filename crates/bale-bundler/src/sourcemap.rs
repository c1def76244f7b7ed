//! Splitting inline source maps out of bundles and relinking them.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use std::path::Path;

const URL_MARKER: &str = "sourceMappingURL=";
const DATA_PREFIX: &str = "data:application/json";

/// Move an inline base64 source map out of `code`.
///
/// Returns the code without the map comment and the decoded map, with absolute
/// `sources` rewritten relative to `map_dir`. Code without an inline map is returned
/// unchanged alongside `None`.
///
/// # Errors
///
/// Returns a message when the code is not UTF-8 or the embedded map cannot be decoded.
pub fn split_inline_map(code: &[u8], map_dir: &Path) -> Result<(Vec<u8>, Option<Value>), String> {
    let text = std::str::from_utf8(code).map_err(|e| format!("Bundle is not UTF-8: {}", e))?;

    let Some((line_start, line_end, url)) = find_link(text) else {
        return Ok((code.to_vec(), None));
    };
    let Some(data) = url.strip_prefix(DATA_PREFIX) else {
        return Ok((code.to_vec(), None));
    };
    let Some((_, payload)) = data.split_once("base64,") else {
        return Err("Inline source map is not base64 encoded".to_string());
    };

    let decoded = STANDARD
        .decode(payload.trim())
        .map_err(|e| format!("Invalid base64 in inline source map: {}", e))?;
    let mut map: Value = serde_json::from_slice(&decoded)
        .map_err(|e| format!("Inline source map is not valid JSON: {}", e))?;
    relativize_sources(&mut map, map_dir);

    let mut stripped = text[..line_start].trim_end_matches(['\n', '\r']).to_string();
    let rest = &text[line_end..];
    if !rest.trim().is_empty() {
        stripped.push('\n');
        stripped.push_str(rest.trim_start_matches(['\n', '\r']));
    }
    Ok((stripped.into_bytes(), Some(map)))
}

/// Remove a trailing external `sourceMappingURL` comment, if any.
pub fn strip_link_comment(code: &str) -> &str {
    match find_link(code) {
        Some((start, end, url)) if !url.starts_with(DATA_PREFIX) && code[end..].trim().is_empty() => {
            code[..start].trim_end_matches(['\n', '\r'])
        }
        _ => code,
    }
}

/// Append `//# sourceMappingURL=<map_name>` on its own line.
pub fn append_link_comment(code: &mut Vec<u8>, map_name: &str) {
    if !code.is_empty() && !code.ends_with(b"\n") {
        code.push(b'\n');
    }
    code.extend_from_slice(format!("//# {URL_MARKER}{map_name}\n").as_bytes());
}

/// Point the map's `file` field at the bundle's base name.
pub fn set_file(map: &mut Value, file_name: &str) {
    if let Value::Object(fields) = map {
        fields.insert("file".to_string(), Value::String(file_name.to_string()));
    }
}

/// Locate the last `//# sourceMappingURL=` (or legacy `//@`) comment line.
/// Returns its byte range and the URL text.
fn find_link(text: &str) -> Option<(usize, usize, &str)> {
    let mut search_end = text.len();
    while let Some(pos) = text[..search_end].rfind(URL_MARKER) {
        let line_start = text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let line_end = text[pos..].find('\n').map(|i| pos + i).unwrap_or(text.len());
        let lead = text[line_start..pos].trim();

        if lead == "//#" || lead == "//@" {
            let url = text[pos + URL_MARKER.len()..line_end].trim();
            return Some((line_start, line_end, url));
        }
        search_end = pos;
    }
    None
}

fn relativize_sources(map: &mut Value, map_dir: &Path) {
    let Some(Value::Array(sources)) = map.get_mut("sources") else {
        return;
    };

    for source in sources.iter_mut() {
        let Value::String(raw) = source else { continue };
        let path = Path::new(raw.as_str());
        if !path.is_absolute() {
            continue;
        }
        if let Some(relative) = pathdiff::diff_paths(path, map_dir) {
            *raw = relative.to_string_lossy().replace('\\', "/");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn inline(code: &str, map: &Value) -> String {
        let encoded = STANDARD.encode(serde_json::to_vec(map).unwrap());
        format!("{code}\n//# sourceMappingURL=data:application/json;charset=utf-8;base64,{encoded}\n")
    }

    #[test]
    fn test_split_extracts_map_and_relativizes_sources() {
        let map = json!({
            "version": 3,
            "sources": ["/proj/src/a.js", "/proj/node_modules/x/index.js", "virtual:entry"],
            "mappings": "AAAA"
        });
        let code = inline("var a = 1;", &map);

        let (stripped, extracted) =
            split_inline_map(code.as_bytes(), Path::new("/proj/dist")).unwrap();
        assert_eq!(String::from_utf8(stripped).unwrap(), "var a = 1;");

        let extracted = extracted.unwrap();
        assert_eq!(
            extracted["sources"],
            json!(["../src/a.js", "../node_modules/x/index.js", "virtual:entry"])
        );
        assert_eq!(extracted["mappings"], "AAAA");
    }

    #[test]
    fn test_split_without_inline_map() {
        let (code, map) = split_inline_map(b"var a = 1;\n", Path::new("/proj")).unwrap();
        assert_eq!(code, b"var a = 1;\n");
        assert!(map.is_none());
    }

    #[test]
    fn test_split_ignores_marker_inside_code() {
        let code = "var s = 'sourceMappingURL=data:application/json;base64,xx';\n";
        let (out, map) = split_inline_map(code.as_bytes(), Path::new("/proj")).unwrap();
        assert_eq!(out, code.as_bytes());
        assert!(map.is_none());
    }

    #[test]
    fn test_split_rejects_bad_payload() {
        let code = "a;\n//# sourceMappingURL=data:application/json;base64,!!!\n";
        assert!(split_inline_map(code.as_bytes(), Path::new("/proj")).is_err());
    }

    #[test]
    fn test_strip_and_append_link() {
        let code = "a();\n//# sourceMappingURL=a.min.js.map\n";
        assert_eq!(strip_link_comment(code), "a();");
        assert_eq!(strip_link_comment("a();"), "a();");

        let mut bytes = b"a();".to_vec();
        append_link_comment(&mut bytes, "a.min.js.map");
        assert_eq!(bytes, b"a();\n//# sourceMappingURL=a.min.js.map\n");
    }

    #[test]
    fn test_set_file() {
        let mut map = json!({"version": 3, "file": "bundle.js"});
        set_file(&mut map, "a.min.js");
        assert_eq!(map["file"], "a.min.js");
    }
}
