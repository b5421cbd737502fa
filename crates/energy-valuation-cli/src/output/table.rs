use serde_json::Value;
use tabled::{builder::Builder, Table};

/// Format output as a table using the tabled crate.
///
/// Envelopes print their scalar result fields as a field/value table; any
/// year-by-year or per-rate series inside the result (an array of objects)
/// gets its own row table underneath.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if map.contains_key("result") {
                print_envelope(map);
            } else {
                print_flat_object(value);
            }
        }
        Value::Array(arr) => {
            print_array_table(arr);
        }
        _ => {
            println!("{}", value);
        }
    }
}

fn print_envelope(envelope: &serde_json::Map<String, Value>) {
    match envelope.get("result") {
        Some(Value::Object(res_map)) => {
            let scalars: Vec<(&String, &Value)> = res_map
                .iter()
                .filter(|(_, v)| !is_record_array(v))
                .collect();

            if !scalars.is_empty() {
                let mut builder = Builder::default();
                builder.push_record(["Field", "Value"]);
                for (key, val) in &scalars {
                    builder.push_record([key.as_str(), &format_value(val)]);
                }
                println!("{}", Table::from(builder));
            }

            for (key, val) in res_map {
                if let Value::Array(arr) = val {
                    if is_record_array(val) {
                        println!("\n{}:", key);
                        print_array_table(arr);
                    }
                }
            }
        }
        Some(Value::Array(arr)) => print_array_table(arr),
        Some(other) => println!("{}", format_value(other)),
        None => {}
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        println!("{}", Table::from(builder));
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| {
                        map.get(h.as_str())
                            .map(format_value)
                            .unwrap_or_default()
                    })
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

/// True for arrays of objects, i.e. per-year records or per-rate points.
fn is_record_array(value: &Value) -> bool {
    match value {
        Value::Array(arr) => matches!(arr.first(), Some(Value::Object(_))),
        _ => false,
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
