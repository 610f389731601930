use crate::core::{Observation, ObservationSequence};
use serde_json::Value;

/// Envelope shapes the upstream has been seen to return, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// `[ {...}, ... ]`
    Bare,
    /// `{ "items": [...] }`
    Items,
    /// `{ "data": [...] }`
    Data,
    /// `{ "data": { "items": [...] } }`
    DataItems,
}

impl Envelope {
    pub const PRIORITY: [Envelope; 4] = [
        Envelope::Bare,
        Envelope::Items,
        Envelope::Data,
        Envelope::DataItems,
    ];

    /// 結構不符時回傳 None，交給下一個 decoder
    pub fn decode(self, payload: &Value) -> Option<&Vec<Value>> {
        match self {
            Envelope::Bare => payload.as_array(),
            Envelope::Items => payload.as_object()?.get("items")?.as_array(),
            Envelope::Data => payload.as_object()?.get("data")?.as_array(),
            Envelope::DataItems => payload
                .as_object()?
                .get("data")?
                .as_object()?
                .get("items")?
                .as_array(),
        }
    }
}

/// First envelope whose structure matches `payload`.
pub fn detect_envelope(payload: &Value) -> Option<Envelope> {
    Envelope::PRIORITY
        .into_iter()
        .find(|envelope| envelope.decode(payload).is_some())
}

/// Extract the observation list from any known envelope. Never fails: unknown
/// shapes, `null` and scalars yield an empty sequence.
///
/// Non-object array elements are dropped; they can never carry a rate or a date.
pub fn normalize(payload: &Value) -> ObservationSequence {
    let Some(envelope) = detect_envelope(payload) else {
        tracing::debug!("Unrecognized upstream payload shape, treating as empty");
        return Vec::new();
    };

    let items = envelope.decode(payload).map(Vec::as_slice).unwrap_or_default();
    tracing::debug!("Decoded {:?} envelope with {} items", envelope, items.len());

    items
        .iter()
        .filter_map(|item| item.as_object().cloned().map(Observation::new))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_items() -> Value {
        json!([
            {"Tarih": "01-01-2024", "TP_DK_USD_A": "30.1"},
            {"Tarih": "02-01-2024", "TP_DK_USD_A": "30.2"}
        ])
    }

    #[test]
    fn test_all_envelopes_yield_identical_sequence() {
        let items = sample_items();
        let payloads = [
            items.clone(),
            json!({ "items": items.clone() }),
            json!({ "data": items.clone() }),
            json!({ "data": { "items": items.clone() } }),
        ];

        let expected = normalize(&payloads[0]);
        assert_eq!(expected.len(), 2);

        for payload in &payloads {
            assert_eq!(normalize(payload), expected);
        }
    }

    #[test]
    fn test_envelope_detection_order() {
        assert_eq!(detect_envelope(&json!([])), Some(Envelope::Bare));
        assert_eq!(detect_envelope(&json!({"items": []})), Some(Envelope::Items));
        assert_eq!(detect_envelope(&json!({"data": []})), Some(Envelope::Data));
        assert_eq!(
            detect_envelope(&json!({"data": {"items": []}})),
            Some(Envelope::DataItems)
        );
        assert_eq!(detect_envelope(&json!({"totalCount": 0})), None);
    }

    #[test]
    fn test_items_wins_over_data() {
        let payload = json!({
            "items": [{"Tarih": "01-01-2024", "value": "1"}],
            "data": [{"Tarih": "02-01-2024", "value": "2"}, {"Tarih": "03-01-2024", "value": "3"}]
        });

        let sequence = normalize(&payload);
        assert_eq!(sequence.len(), 1);
        assert_eq!(sequence[0].get("Tarih"), Some(&json!("01-01-2024")));
    }

    #[test]
    fn test_non_array_items_falls_through_to_data() {
        let payload = json!({
            "items": "not-a-list",
            "data": [{"Tarih": "05-01-2024", "value": "5"}]
        });

        assert_eq!(detect_envelope(&payload), Some(Envelope::Data));
        assert_eq!(normalize(&payload).len(), 1);
    }

    #[test]
    fn test_unknown_shapes_are_empty() {
        assert!(normalize(&Value::Null).is_empty());
        assert!(normalize(&json!("<html>error</html>")).is_empty());
        assert!(normalize(&json!(42)).is_empty());
        assert!(normalize(&json!({"data": {"rows": []}})).is_empty());
    }

    #[test]
    fn test_non_object_elements_are_dropped() {
        let payload = json!([null, 1, {"Tarih": "01-01-2024", "value": "30"}, "x"]);
        assert_eq!(normalize(&payload).len(), 1);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let payload = json!({"data": {"items": sample_items()}});
        assert_eq!(normalize(&payload), normalize(&payload));
    }
}
