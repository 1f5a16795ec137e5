//! Title Normalization
//!
//! Window titles coming from editors and terminals often carry a trailing
//! parenthetical annotation ("main.rs (modified)") and abbreviate the home
//! directory as `~/`. Matching a user-supplied title against live window
//! titles has to see through both.

/// Strip a trailing parenthetical suffix and any whitespace before it.
///
/// The suffix must not participate in matching, so "Editor (modified)"
/// reduces to "Editor".
pub fn strip_suffix(title: &str) -> &str {
    title.split(" (").next().unwrap_or(title).trim()
}

/// Expand a title query into its set of acceptable canonical forms.
///
/// Produces the stripped base title plus variants with `~/` expanded to the
/// home directory prefix and with the prefix shortened back to `~/`.
/// Matching is membership in this set; duplicates are harmless. An empty
/// title normalizes to a single empty element.
pub fn normalize(title: &str, home_dir: &str) -> Vec<String> {
    if title.is_empty() {
        return vec![String::new()];
    }

    let base = strip_suffix(title).to_string();
    let home_prefix = format!("{}/", home_dir.trim_end_matches('/'));
    let expanded = base.replace("~/", &home_prefix);
    let shortened = base.replace(&home_prefix, "~/");

    vec![base, expanded, shortened]
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOME: &str = "/home/olof";

    #[test]
    fn normalization_is_idempotent() {
        for title in ["Editor (modified)", "~/project/main.rs", "/home/olof/notes.txt", "plain"] {
            let first = normalize(title, HOME);
            let second = normalize(&first[0], HOME);
            assert_eq!(first, second, "normalizing {title:?} twice diverged");
        }
    }

    #[test]
    fn strips_trailing_parenthetical() {
        assert_eq!(normalize("Editor (modified)", HOME)[0], normalize("Editor", HOME)[0]);
        assert_eq!(strip_suffix("main.rs (modified) (x)"), "main.rs");
        assert_eq!(strip_suffix("no suffix here"), "no suffix here");
    }

    #[test]
    fn home_path_round_trips() {
        let variants = normalize("/home/olof/project/main.rs", HOME);
        assert!(variants.contains(&"~/project/main.rs".to_string()));
        assert!(variants.contains(&"/home/olof/project/main.rs".to_string()));

        let variants = normalize("~/project/main.rs", HOME);
        assert!(variants.contains(&"~/project/main.rs".to_string()));
        assert!(variants.contains(&"/home/olof/project/main.rs".to_string()));
    }

    #[test]
    fn empty_title_stays_empty() {
        assert_eq!(normalize("", HOME), vec![String::new()]);
    }
}
