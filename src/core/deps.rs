/// Heuristic dependency inference from environment variables
///
/// A container is assumed to depend on every other known container whose
/// name shows up (case-insensitively) inside one of its env strings, e.g.
/// `DATABASE_URL=postgres://db:5432` links to `db`. Short names can match
/// unrelated text and produce false edges.

/// Names from `known_names` referenced by `env`, excluding `own_name`.
///
/// The result is sorted and holds each name once, however many env strings match it.
pub fn infer_dependencies<S: AsRef<str>>(own_name: &str, env: &[S], known_names: &[String]) -> Vec<String> {
    let env_lower: Vec<String> = env.iter().map(|e| e.as_ref().to_lowercase()).collect();

    let mut deps: Vec<String> = known_names
        .iter()
        .filter(|other| other.as_str() != own_name && !other.is_empty())
        .filter(|other| {
            let needle = other.to_lowercase();
            env_lower.iter().any(|e| e.contains(&needle))
        })
        .cloned()
        .collect();

    deps.sort();
    deps.dedup();
    deps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_matches_known_name() {
        let known = names(&["web", "db", "cache"]);
        let deps = infer_dependencies("web", &["CONNECT=db:5432"], &known);
        assert_eq!(deps, vec!["db"]);
    }

    #[test]
    fn test_never_lists_itself() {
        let known = names(&["web", "db", "cache"]);
        let deps = infer_dependencies("db", &["CONNECT=db:5432"], &known);
        assert!(deps.is_empty());
    }

    #[test]
    fn test_deduplicates_across_env_strings() {
        let known = names(&["web", "db"]);
        let env = ["DB_HOST=db", "DB_URL=postgres://db:5432/app"];
        let deps = infer_dependencies("web", &env, &known);
        assert_eq!(deps, vec!["db"]);
    }

    #[test]
    fn test_case_insensitive_and_sorted() {
        let known = names(&["web", "Redis", "auth", "db"]);
        let env = ["CACHE=REDIS:6379", "AUTH_URL=http://Auth:8080", "PG=DB"];
        let deps = infer_dependencies("web", &env, &known);
        assert_eq!(deps, vec!["Redis", "auth", "db"]);
    }

    #[test]
    fn test_no_env_no_deps() {
        let known = names(&["web", "db"]);
        let env: [&str; 0] = [];
        assert!(infer_dependencies("web", &env, &known).is_empty());
    }
}
