//! Proptest strategies for query text and hashes

use proptest::prelude::*;

/// Field selection names
pub fn field_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9_]{0,15}"
}

/// Balanced, parseable query text such as `{ a { b c } }`
pub fn query_text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(field_name_strategy(), 1..8).prop_flat_map(|fields| {
        let depth = fields.len();
        (Just(fields), 0..depth).prop_map(|(fields, nested_at)| {
            let mut text = String::from("{");
            for (i, field) in fields.iter().enumerate() {
                text.push(' ');
                text.push_str(field);
                if i == nested_at {
                    text.push_str(" { id }");
                }
            }
            text.push_str(" }");
            text
        })
    })
}

/// Any 64-character lowercase hex string
pub fn hex_hash_strategy() -> impl Strategy<Value = String> {
    "[0-9a-f]{64}"
}
