//! Built-in field rules. Messages are the French strings shown by the editor.

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("email pattern is valid")
});

// French numbers only: +33 or 0, a non-zero digit, then four digit pairs.
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\+33|0)[1-9]([0-9]{2}){4}$").expect("phone pattern is valid"));

/// Fails with `"{label} requis"` when the trimmed value is empty
pub fn required(label: &'static str) -> impl Fn(&str) -> Option<String> + Send + Sync + 'static {
    move |value: &str| {
        if value.trim().is_empty() {
            Some(format!("{label} requis"))
        } else {
            None
        }
    }
}

pub fn email(value: &str) -> Option<String> {
    if value.is_empty() {
        return Some("Email requis".to_string());
    }
    if !EMAIL_RE.is_match(value) {
        return Some("Email invalide".to_string());
    }
    None
}

pub fn phone(value: &str) -> Option<String> {
    if value.is_empty() {
        return Some("Numéro de téléphone requis".to_string());
    }
    if !PHONE_RE.is_match(value) {
        return Some("Numéro de téléphone invalide".to_string());
    }
    None
}

/// Required, and restricted to one of `allowed`
pub fn one_of(
    label: &'static str,
    allowed: &'static [&'static str],
) -> impl Fn(&str) -> Option<String> + Send + Sync + 'static {
    let required = required(label);
    move |value: &str| {
        required(value).or_else(|| {
            (!allowed.contains(&value)).then(|| format!("{label} invalide"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims_whitespace() {
        let rule = required("Adresse");
        assert_eq!(rule("   "), Some("Adresse requis".to_string()));
        assert_eq!(rule(""), Some("Adresse requis".to_string()));
        assert_eq!(rule(" Lyon "), None);
    }

    #[test]
    fn test_email_rule() {
        assert_eq!(email(""), Some("Email requis".to_string()));
        assert_eq!(email("alex@"), Some("Email invalide".to_string()));
        assert_eq!(email("alex@example"), Some("Email invalide".to_string()));
        assert_eq!(email("Alex.Martin+cv@Example.COM"), None);
    }

    #[test]
    fn test_phone_rule() {
        assert_eq!(phone(""), Some("Numéro de téléphone requis".to_string()));
        assert_eq!(phone("0612345678"), None);
        assert_eq!(phone("+33612345678"), None);
        // Leading zero after the prefix is not a valid French number
        assert!(phone("0012345678").is_some());
        // Spaced notation is rejected, only compact digits pass
        assert!(phone("06 12 34 56 78").is_some());
        assert!(phone("061234567").is_some());
    }

    #[test]
    fn test_one_of_rule() {
        let rule = one_of("Niveau", &["Débutant", "Avancé"]);
        assert_eq!(rule(""), Some("Niveau requis".to_string()));
        assert_eq!(rule("Expert"), Some("Niveau invalide".to_string()));
        assert_eq!(rule("Avancé"), None);
    }

    #[test]
    fn test_rules_are_idempotent() {
        let rule = required("Loisir");
        let first = rule("");
        let second = rule("");
        assert_eq!(first, second);
        assert_eq!(email("x@y.fr"), email("x@y.fr"));
    }
}
