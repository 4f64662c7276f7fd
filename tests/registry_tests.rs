use form_candidates::config::crawl_config::FormsConfig;
use form_candidates::config::properties::ConfigEntry;
use form_candidates::forms::registry::FieldRegistry;
use form_candidates::forms::resolver::FieldResolver;

use crate::common::builders::{login_registry, strings};

mod common;

// ============================================================================
// Registry construction
// ============================================================================

#[test]
fn registry_holds_aliases_and_values() {
    let registry = login_registry();

    assert_eq!(registry.aliases("username"), Some(&strings(&["user", "uname"])[..]));
    assert_eq!(registry.values("password"), Some(&strings(&["secret1", "secret2"])[..]));
    assert_eq!(registry.value_count("username"), 3);
    assert_eq!(registry.value_count("nickname"), 0);
    assert_eq!(registry.value_count("unknown"), 0);
}

#[test]
fn definitions_keep_registration_order() {
    let ids: Vec<String> = login_registry()
        .definitions()
        .into_iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(ids, strings(&["username", "password", "subscribe", "nickname"]));
}

#[test]
fn first_fields_definition_of_an_id_wins() {
    let registry = FieldRegistry::from_entries(&[
        ConfigEntry::fields("email", strings(&["mail"])),
        ConfigEntry::fields("email", strings(&["e-mail", "email"])),
    ]);

    assert_eq!(registry.aliases("email"), Some(&strings(&["mail"])[..]));
    let resolver = FieldResolver::new(&registry);
    assert_eq!(resolver.resolve("mail"), Some("email"));
    assert_eq!(resolver.resolve("e-mail"), None, "Later alias list must be ignored");
}

#[test]
fn later_values_entries_overwrite() {
    let registry = FieldRegistry::from_entries(&[
        ConfigEntry::fields("city", strings(&["city"])),
        ConfigEntry::values("city", strings(&["Delft", "Leiden"])),
        ConfigEntry::values("city", strings(&["Utrecht"])),
    ]);
    assert_eq!(registry.values("city"), Some(&strings(&["Utrecht"])[..]));
}

#[test]
fn alias_keeps_its_first_owner() {
    let registry = FieldRegistry::from_entries(&[
        ConfigEntry::fields("first", strings(&["shared"])),
        ConfigEntry::fields("second", strings(&["shared", "own"])),
    ]);
    let resolver = FieldResolver::new(&registry);

    assert_eq!(resolver.resolve("shared"), Some("first"));
    assert_eq!(resolver.resolve("own"), Some("second"));
    assert_eq!(
        registry.aliases("second"),
        Some(&strings(&["shared", "own"])[..]),
        "Alias list is kept whole for control lookup"
    );
}

#[test]
fn empty_alias_list_does_not_define_the_field() {
    let registry = FieldRegistry::from_entries(&[
        ConfigEntry::fields("ghost", vec![]),
        ConfigEntry::fields("ghost", strings(&["ghost"])),
    ]);
    assert_eq!(registry.aliases("ghost"), Some(&strings(&["ghost"])[..]));
}

#[test]
fn values_without_fields_still_count() {
    let registry = FieldRegistry::from_entries(&[ConfigEntry::values("orphan", strings(&["a", "b"]))]);
    assert!(registry.contains("orphan"));
    assert_eq!(registry.value_count("orphan"), 2);
    assert!(registry.definition("orphan").is_none());
}

#[test]
fn unreadable_configuration_leaves_registry_empty() {
    let forms = FormsConfig {
        properties: Some("tests/fixtures/nope.properties".into()),
        ..FormsConfig::default()
    };
    let registry = FieldRegistry::load(&forms);
    assert!(registry.is_empty());
    assert_eq!(FieldResolver::new(&registry).resolve("user"), None);
}

#[test]
fn load_reads_fixture_properties() {
    let forms = FormsConfig {
        properties: Some("tests/fixtures/forms.properties".into()),
        ..FormsConfig::default()
    };
    let registry = FieldRegistry::load(&forms);
    assert_eq!(registry.value_count("username"), 3);
    assert_eq!(registry.values("greeting"), Some(&strings(&["hello, world", "hi"])[..]));
}

#[test]
fn global_registry_is_built_once() {
    let first = FieldRegistry::global(login_registry);
    let second = FieldRegistry::global(FieldRegistry::empty);

    assert!(std::ptr::eq(first, second));
    assert_eq!(second.value_count("username"), 3, "Second initializer must not run");
}

// ============================================================================
// Field resolution
// ============================================================================

#[test]
fn resolve_is_case_insensitive() {
    let registry = login_registry();
    let resolver = FieldResolver::new(&registry);
    assert_eq!(resolver.resolve("USER"), Some("username"));
    assert_eq!(resolver.resolve("UName"), Some("username"));
    assert_eq!(resolver.resolve("Pass"), Some("password"));
}

#[test]
fn resolve_requires_full_match() {
    let registry = login_registry();
    let resolver = FieldResolver::new(&registry);
    assert_eq!(resolver.resolve("username_field"), None, "Substring must not match");
    assert_eq!(resolver.resolve("xuser"), None);
    assert_eq!(resolver.resolve("password"), None);
}

#[test]
fn resolve_uses_patterns() {
    let registry = login_registry();
    let resolver = FieldResolver::new(&registry);
    assert_eq!(resolver.resolve("nick"), Some("nickname"));
    assert_eq!(resolver.resolve("nickname"), Some("nickname"));
    assert_eq!(resolver.resolve("nicknames"), None);
}

#[test]
fn first_matching_pattern_in_registration_order_wins() {
    let registry = FieldRegistry::from_entries(&[
        ConfigEntry::fields("specific", strings(&["email"])),
        ConfigEntry::fields("catch_all", strings(&[".*"])),
    ]);
    let resolver = FieldResolver::new(&registry);
    assert_eq!(resolver.resolve("email"), Some("specific"));
    assert_eq!(resolver.resolve("anything"), Some("catch_all"));
}

#[test]
fn alternation_is_anchored_as_a_whole() {
    let registry = FieldRegistry::from_entries(&[ConfigEntry::fields("q", strings(&["a|b"]))]);
    let resolver = FieldResolver::new(&registry);
    assert_eq!(resolver.resolve("a"), Some("q"));
    assert_eq!(resolver.resolve("b"), Some("q"));
    assert_eq!(resolver.resolve("ab"), None);
}

#[test]
fn invalid_pattern_never_matches() {
    let registry = FieldRegistry::from_entries(&[
        ConfigEntry::fields("broken", strings(&["user("])),
        ConfigEntry::fields("fine", strings(&["user"])),
    ]);
    let resolver = FieldResolver::new(&registry);
    assert_eq!(resolver.resolve("user("), None);
    assert_eq!(resolver.resolve("user"), Some("fine"));
    assert_eq!(registry.aliases("broken"), Some(&strings(&["user("])[..]));
}

#[test]
fn group_names_resolve_as_ids_or_aliases() {
    let registry = login_registry();
    let resolver = FieldResolver::new(&registry);
    assert_eq!(resolver.field_id_for("username"), Some("username"));
    assert_eq!(resolver.field_id_for("uname"), Some("username"));
    assert_eq!(resolver.field_id_for("missing"), None);
}
