use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionOutcome {
    Fresh,
    Identical,
    Upgrade,
    Downgrade,
}

/// Compares version strings byte-wise, not numerically: "10.0" sorts below
/// "9.0". Registries written by earlier releases already encode this order.
pub fn resolve(new: &str, existing: Option<&str>) -> VersionOutcome {
    let Some(existing) = existing else {
        return VersionOutcome::Fresh;
    };
    match new.cmp(existing) {
        Ordering::Equal => VersionOutcome::Identical,
        Ordering::Greater => VersionOutcome::Upgrade,
        Ordering::Less => VersionOutcome::Downgrade,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_prior_record_is_fresh() {
        assert_eq!(resolve("1.0", None), VersionOutcome::Fresh);
    }

    #[test]
    fn equal_strings_are_identical() {
        assert_eq!(resolve("1.0.0", Some("1.0.0")), VersionOutcome::Identical);
    }

    #[test]
    fn larger_string_is_upgrade() {
        assert_eq!(resolve("2.0", Some("1.9")), VersionOutcome::Upgrade);
    }

    #[test]
    fn ordering_is_byte_wise_not_numeric() {
        // "9" > "1", so 9.0 counts as newer than 10.0.
        assert_eq!(resolve("9.0", Some("10.0")), VersionOutcome::Upgrade);
        assert_eq!(resolve("10.0", Some("9.0")), VersionOutcome::Downgrade);
    }
}
