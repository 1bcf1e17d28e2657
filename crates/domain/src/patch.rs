//! Field-level helpers for applying partial updates.
//!
//! Each helper reports whether the stored value actually changed, so a
//! service can reject a patch that changes nothing.

/// Sets `field` to `value` if it is present and different.
pub(crate) fn apply<T: PartialEq>(field: &mut T, value: Option<T>) -> bool {
    match value {
        Some(value) if *field != value => {
            *field = value;
            true
        }
        _ => false,
    }
}

/// Like [`apply`], but an empty string counts as absent.
pub(crate) fn apply_text(field: &mut String, value: Option<String>) -> bool {
    apply(field, value.filter(|v| !v.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_reports_changes_only() {
        let mut stock = 5u32;
        assert!(!apply(&mut stock, None));
        assert!(!apply(&mut stock, Some(5)));
        assert!(apply(&mut stock, Some(0)));
        assert_eq!(stock, 0);
    }

    #[test]
    fn empty_text_is_ignored() {
        let mut name = "Drinks".to_string();
        assert!(!apply_text(&mut name, Some(String::new())));
        assert!(!apply_text(&mut name, Some("Drinks".to_string())));
        assert!(apply_text(&mut name, Some("Snacks".to_string())));
        assert_eq!(name, "Snacks");
    }
}
