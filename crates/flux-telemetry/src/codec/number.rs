/// 小数位数上限，超过时不再补零输出
pub const MAX_DECIMAL_PRECISION: u32 = 1_000_000;

/// 格式化定点小数 `digits / 10^precision`
///
/// 小数部分补零到 `precision` 位；precision 为 0 时小数部分固定输出一个 `0`。
/// 整数部分为 0 时负号由小数部分带出，例如 `(-5, 2)` 输出 `-0.05`。
/// precision 超过 `MAX_DECIMAL_PRECISION` 时只输出一段说明文字。
pub fn format_decimal(digits: i64, precision: u32) -> String {
    if precision > MAX_DECIMAL_PRECISION {
        return format!(
            "(invalid decimal precision {}: digits {})",
            precision, digits
        );
    }

    let digits = i128::from(digits);
    let (int_part, mut frac) = if precision > 0 {
        match 10i128.checked_pow(precision) {
            Some(div) => (digits / div, digits % div),
            // 超过 i128 的范围时整数部分必然为 0
            None => (0, digits),
        }
    } else {
        (digits, 0)
    };

    let mut sign = "";
    if frac < 0 {
        if int_part == 0 {
            sign = "-";
        }
        frac = -frac;
    }

    let frac = frac.to_string();
    let padding = (precision as usize).saturating_sub(frac.len());

    let mut out = String::with_capacity(sign.len() + 21 + padding + frac.len());
    out.push_str(sign);
    out.push_str(&int_part.to_string());
    out.push('.');
    out.push_str(&"0".repeat(padding));
    out.push_str(&frac);
    out
}

/// 32 位浮点，最短可还原表示，`%g` 风格
pub fn format_f32(v: f32) -> String {
    if !v.is_finite() {
        return non_finite(f64::from(v));
    }
    format_shortest(&format!("{:e}", v))
}

/// 64 位浮点，最短可还原表示，`%g` 风格
pub fn format_f64(v: f64) -> String {
    if !v.is_finite() {
        return non_finite(v);
    }
    format_shortest(&format!("{:e}", v))
}

fn non_finite(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v > 0.0 {
        "+Inf".to_string()
    } else {
        "-Inf".to_string()
    }
}

// 输入是 Rust `{:e}` 的结果，如 `-1.2345e6`、`5e-7`、`0e0`
fn format_shortest(sci: &str) -> String {
    let (neg, sci) = match sci.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, sci),
    };
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci, "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let digits: Vec<u8> = mantissa.bytes().filter(u8::is_ascii_digit).collect();
    let nd = digits.len() as i32;

    let mut out = String::new();
    if neg {
        out.push('-');
    }

    if exp < -4 || exp >= 6 {
        out.push(digits[0] as char);
        if nd > 1 {
            out.push('.');
            out.extend(digits[1..].iter().map(|&d| d as char));
        }
        out.push('e');
        out.push(if exp < 0 { '-' } else { '+' });
        out.push_str(&format!("{:02}", exp.abs()));
        return out;
    }

    // 小数点位置
    let dp = exp + 1;
    if dp > 0 {
        for i in 0..dp {
            out.push(digits.get(i as usize).map_or('0', |&d| d as char));
        }
    } else {
        out.push('0');
    }

    let decimals = (nd - dp).max(0);
    if decimals > 0 {
        out.push('.');
        for i in 0..decimals {
            let idx = dp + i;
            let c = if idx >= 0 && idx < nd {
                digits[idx as usize] as char
            } else {
                '0'
            };
            out.push(c);
        }
    }
    out
}
