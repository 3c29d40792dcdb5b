use serde_json::Value;

/// Amount a caller usually wants from each command, most specific first.
const PRIORITY_KEYS: [&str; 5] = ["total_due", "invoice_fee", "credit", "annual_fee", "passed"];

/// Print just the key answer value from the output.
///
/// Terminated calculations bill zero, so a present credit outranks the
/// invoice fee there.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        let terminated = map.get("mode").and_then(Value::as_str) == Some("terminated");
        if terminated {
            if let Some(credit) = map.get("credit").filter(|v| !v.is_null()) {
                println!("{}", format_minimal(credit));
                return;
            }
        }

        for key in &PRIORITY_KEYS {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
