use crate::registry::Registry;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Conflict {
    pub mod_name: String,
    pub path: PathBuf,
}

/// Flags every prospective file path already claimed by another record.
/// Detection only informs; the caller decides whether to proceed.
pub fn find_conflicts(
    registry: &Registry,
    candidate: &str,
    prospective: &[PathBuf],
) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    for record in registry.iter() {
        if record.name == candidate {
            continue;
        }
        for owned in &record.owned_paths {
            if prospective.iter().any(|path| path == owned) {
                conflicts.push(Conflict {
                    mod_name: record.name.clone(),
                    path: owned.clone(),
                });
            }
        }
    }
    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ModRecord;
    use std::path::PathBuf;

    fn record(name: &str, paths: &[&str]) -> ModRecord {
        ModRecord {
            name: name.to_string(),
            author: "tester".to_string(),
            version: "1.0".to_string(),
            optional_components: Vec::new(),
            owned_paths: paths.iter().map(PathBuf::from).collect(),
            disabled: false,
        }
    }

    #[test]
    fn shared_path_names_the_owner() {
        let mut registry = Registry::default();
        registry.upsert(record("alpha", &["/game/shared.txt", "/game/a.txt"]));
        registry.upsert(record("beta", &["/game/b.txt"]));

        let prospective = vec![PathBuf::from("/game/shared.txt")];
        let conflicts = find_conflicts(&registry, "gamma", &prospective);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].mod_name, "alpha");
        assert_eq!(conflicts[0].path, PathBuf::from("/game/shared.txt"));
    }

    #[test]
    fn candidate_record_is_excluded() {
        let mut registry = Registry::default();
        registry.upsert(record("alpha", &["/game/shared.txt"]));

        let prospective = vec![PathBuf::from("/game/shared.txt")];
        assert!(find_conflicts(&registry, "alpha", &prospective).is_empty());
    }

    #[test]
    fn disjoint_paths_report_nothing() {
        let mut registry = Registry::default();
        registry.upsert(record("alpha", &["/game/a.txt"]));

        let prospective = vec![PathBuf::from("/game/b.txt")];
        assert!(find_conflicts(&registry, "beta", &prospective).is_empty());
    }
}
