use flux_gnmi::{Path, PathElem};
use std::collections::HashMap;

/// 将 gNMI 路径格式化为可读字符串，例如 `/a/b/c[e=f]`
///
/// 空路径（或缺失）视为根路径 `/`。
pub fn format_path(path: Option<&Path>) -> String {
    match path {
        Some(path) if !path.elem.is_empty() => format_elems(&path.elem),
        Some(path) if !path.element.is_empty() => format!("/{}", path.element.join("/")),
        _ => "/".to_string(),
    }
}

fn format_elems(elems: &[PathElem]) -> String {
    let mut out = String::new();
    for elem in elems {
        out.push('/');
        out.push_str(&escape_name(&elem.name));
        if !elem.key.is_empty() {
            write_keys(&mut out, &elem.key);
        }
    }
    out
}

// 键集合本身无序，按键名排序保证输出稳定
fn write_keys(out: &mut String, keys: &HashMap<String, String>) {
    let mut names: Vec<&String> = keys.keys().collect();
    names.sort();

    let size: usize = keys.iter().map(|(k, v)| k.len() + v.len() + 3).sum();
    out.reserve(size);

    for name in names {
        out.push('[');
        out.push_str(&escape_key(name));
        out.push('=');
        out.push_str(&escape_value(&keys[name]));
        out.push(']');
    }
}

pub fn escape_name(s: &str) -> String {
    s.replace('\\', r"\\").replace('/', r"\/").replace('[', r"\[")
}

pub fn escape_key(s: &str) -> String {
    s.replace('\\', r"\\").replace('=', r"\=")
}

pub fn escape_value(s: &str) -> String {
    s.replace('\\', r"\\").replace(']', r"\]")
}

/// 拼接路径并做词法规整（去掉重复的 `/`，处理 `.` 与 `..`）
pub fn join_path(prefix: &str, path: &str) -> String {
    let joined = [prefix, path]
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/");
    if joined.is_empty() {
        return joined;
    }
    clean_path(&joined)
}

fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if rooted => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let body = segments.join("/");
    match (rooted, body.is_empty()) {
        (true, _) => format!("/{}", body),
        (false, true) => ".".to_string(),
        (false, false) => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_path_is_root() {
        assert_eq!(format_path(None), "/");
        assert_eq!(format_path(Some(&Path::default())), "/");
    }

    #[test]
    fn test_legacy_elements() {
        let path = Path::from_elements(["interfaces", "interface", "state"]);
        assert_eq!(format_path(Some(&path)), "/interfaces/interface/state");
    }

    #[test]
    fn test_elems_with_sorted_keys() {
        let path = Path::from_elems(vec![
            PathElem::new("network-instances"),
            PathElem::new("network-instance")
                .with_key("name", "default")
                .with_key("af", "ipv4"),
            PathElem::new("state"),
        ]);
        assert_eq!(
            format_path(Some(&path)),
            "/network-instances/network-instance[af=ipv4][name=default]/state"
        );
    }

    #[test]
    fn test_elems_take_precedence_over_elements() {
        let mut path = Path::from_elems(vec![PathElem::new("a")]);
        path.element = vec!["legacy".to_string()];
        assert_eq!(format_path(Some(&path)), "/a");
    }

    #[test]
    fn test_escaping() {
        let path = Path::from_elems(vec![
            PathElem::new(r"a/b[c\d").with_key(r"k=\", r"v]\"),
        ]);
        assert_eq!(format_path(Some(&path)), r"/a\/b\[c\\d[k\=\\=v\]\\]");
    }

    #[test]
    fn test_escape_tables() {
        assert_eq!(escape_name("x"), "x");
        assert_eq!(escape_name(r"\/["), r"\\\/\[");
        assert_eq!(escape_key(r"\="), r"\\\=");
        assert_eq!(escape_value(r"\]"), r"\\\]");
        // 其他特殊字符不转义
        assert_eq!(escape_key("]/"), "]/");
        assert_eq!(escape_value("=/["), "=/[");
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("/", "/a/b"), "/a/b");
        assert_eq!(join_path("/prefix", "/a"), "/prefix/a");
        assert_eq!(join_path("/prefix", "/"), "/prefix");
        assert_eq!(join_path("/a/b", "/../c"), "/a/c");
        assert_eq!(join_path("/", "/"), "/");
        assert_eq!(join_path("", ""), "");
        assert_eq!(join_path("a", "../.."), "..");
    }
}
