use chrono::Utc;
use uuid::Uuid;

pub const RECEIPT_PREFIX: &str = "RCP";
pub const DELIVERY_PREFIX: &str = "DEL";

/// Builds a document reference like `RCP-1724999999999-3f2a9c`.
///
/// Epoch millis keep references roughly sortable by creation time; the
/// random suffix closes the same-millisecond collision window. The
/// `reference` column is still UNIQUE, so a forced duplicate fails the
/// insert rather than corrupting anything.
pub fn document_reference(prefix: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let nonce = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", prefix, millis, &nonce[..6])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_carries_prefix() {
        let r = document_reference(RECEIPT_PREFIX);
        assert!(r.starts_with("RCP-"));
        let r = document_reference(DELIVERY_PREFIX);
        assert!(r.starts_with("DEL-"));
    }

    #[test]
    fn references_differ_within_same_millisecond() {
        // 32 draws in a tight loop will share a millisecond on any machine;
        // the random suffix must keep them distinct.
        let refs: std::collections::HashSet<String> =
            (0..32).map(|_| document_reference(RECEIPT_PREFIX)).collect();
        assert_eq!(refs.len(), 32);
    }

    #[test]
    fn reference_shape() {
        let r = document_reference(RECEIPT_PREFIX);
        let parts: Vec<&str> = r.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 6);
    }
}
