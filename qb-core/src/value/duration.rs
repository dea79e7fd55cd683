use chrono::TimeDelta;

/// Parse a duration such as `1h30m`, `250ms` or `-1.5h`.
///
/// A bare integer is a number of milliseconds, the unit durations are
/// rendered in.
pub(crate) fn parse_duration(input: &str) -> Result<TimeDelta, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err("empty duration".to_string());
    }
    if let Ok(ms) = s.parse::<i64>() {
        return TimeDelta::try_milliseconds(ms).ok_or_else(|| format!("duration '{s}' overflows"));
    }

    let (negative, mut rest) = match s.as_bytes()[0] {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };
    if rest.is_empty() {
        return Err(format!("invalid duration '{s}'"));
    }

    let mut nanos = 0f64;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let number = &rest[..number_end];
        let value: f64 = number
            .parse()
            .map_err(|_| format!("invalid duration '{s}'"))?;
        rest = &rest[number_end..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale = match &rest[..unit_end] {
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            "" => return Err(format!("missing unit in duration '{s}'")),
            unit => return Err(format!("unknown unit '{unit}' in duration '{s}'")),
        };
        nanos += value * scale;
        rest = &rest[unit_end..];
    }

    let nanos = nanos.round();
    if nanos >= i64::MAX as f64 {
        return Err(format!("duration '{s}' overflows"));
    }
    let nanos = nanos as i64;
    Ok(TimeDelta::nanoseconds(if negative { -nanos } else { nanos }))
}
