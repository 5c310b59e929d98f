use anyhow::Result;
use nfer_core::ResolvedOverlap;

/// Pretty-printed JSON array, in result order.
pub fn render(results: &[ResolvedOverlap]) -> Result<String> {
    Ok(serde_json::to_string_pretty(results)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::sample_overlap;

    #[test]
    fn test_field_names() {
        let text = render(&[sample_overlap(7, &["R1", "R2"])]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let first = &value[0];
        assert_eq!(first["piece"], 7);
        assert_eq!(first["contributors"][1]["ref"], "R2");
        assert_eq!(first["point"]["lat"], 51.5);
        assert_eq!(first["boundary"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_empty_is_empty_array() {
        assert_eq!(render(&[]).unwrap(), "[]");
    }
}
