use serde::de::IgnoredAny;

const INDENT: &str = "  ";

/// 格式化 JSON 负载
///
/// `pretty` 为真且负载中含有 `,` 时按两空格缩进展开，否则压缩为单行。
/// 只改变结构之间的空白，字符串、数字字面量原样保留。
/// 非法 JSON 不报错，而是返回诊断文本加原始内容。
pub fn format_json(raw: &[u8], pretty: bool) -> String {
    if let Err(e) = serde_json::from_slice::<IgnoredAny>(raw) {
        return format!(
            "(error unmarshalling json: {})\n{}",
            e,
            String::from_utf8_lossy(raw)
        );
    }

    let out = if pretty && raw.contains(&b',') {
        indent(raw)
    } else {
        compact(raw)
    };
    String::from_utf8_lossy(&out).into_owned()
}

fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r')
}

fn compact(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut in_string = false;
    let mut escaped = false;

    for &c in raw {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == b'\\' {
                escaped = true;
            } else if c == b'"' {
                in_string = false;
            }
            continue;
        }
        if is_space(c) {
            continue;
        }
        if c == b'"' {
            in_string = true;
        }
        out.push(c);
    }
    out
}

// 开头空白丢弃，结尾空白保留，空容器不换行
fn indent(raw: &[u8]) -> Vec<u8> {
    let end = raw
        .iter()
        .rposition(|&c| !is_space(c))
        .map(|i| i + 1)
        .unwrap_or(0);
    let (body, trailing) = raw.split_at(end);

    let mut out = Vec::with_capacity(raw.len() * 2);
    let mut depth = 0usize;
    let mut need_indent = false;
    let mut in_string = false;
    let mut escaped = false;

    for &c in body {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == b'\\' {
                escaped = true;
            } else if c == b'"' {
                in_string = false;
            }
            continue;
        }
        if is_space(c) {
            continue;
        }
        if need_indent && c != b'}' && c != b']' {
            need_indent = false;
            depth += 1;
            newline(&mut out, depth);
        }
        match c {
            b'{' | b'[' => {
                need_indent = true;
                out.push(c);
            }
            b',' => {
                out.push(c);
                newline(&mut out, depth);
            }
            b':' => {
                out.push(c);
                out.push(b' ');
            }
            b'}' | b']' => {
                if need_indent {
                    need_indent = false;
                } else {
                    depth = depth.saturating_sub(1);
                    newline(&mut out, depth);
                }
                out.push(c);
            }
            b'"' => {
                in_string = true;
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    out.extend_from_slice(trailing);
    out
}

fn newline(out: &mut Vec<u8>, depth: usize) {
    out.push(b'\n');
    for _ in 0..depth {
        out.extend_from_slice(INDENT.as_bytes());
    }
}
