use form_candidates::browser::dom::{Document, DomNode};
use form_candidates::config::properties::ConfigEntry;
use form_candidates::forms::registry::FieldRegistry;
use rand::SeedableRng;
use rand::rngs::StdRng;

pub const ANCHOR: &str = "/HTML[1]/BODY[1]/FORM[1]/BUTTON[1]";

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

/// username / password / subscribe / nickname, the last without values.
pub fn login_entries() -> Vec<ConfigEntry> {
    vec![
        ConfigEntry::fields("username", strings(&["user", "uname"])),
        ConfigEntry::values("username", strings(&["alice", "bob", "carol"])),
        ConfigEntry::fields("password", strings(&["pass"])),
        ConfigEntry::values("password", strings(&["secret1", "secret2"])),
        ConfigEntry::fields("subscribe", strings(&["subscribe"])),
        ConfigEntry::values("subscribe", strings(&["1"])),
        ConfigEntry::fields("nickname", strings(&["nick(name)?"])),
    ]
}

pub fn login_registry() -> FieldRegistry {
    FieldRegistry::from_entries(&login_entries())
}

fn input(name: &str, input_type: Option<&str>) -> DomNode {
    let node = DomNode::new("input").attr("name", name);
    match input_type {
        Some(t) => node.attr("type", t),
        None => node,
    }
}

pub fn login_form() -> DomNode {
    DomNode::new("form")
        .attr("id", "login")
        .child(input("user", None))
        .child(input("pass", Some("password")))
        .child(input("subscribe", Some("checkbox")))
        .child(input("nick", Some("text")))
        .child(
            DomNode::new("select")
                .attr("name", "country")
                .child(DomNode::new("option").attr("value", "nl").text("Netherlands"))
                .child(DomNode::new("option").attr("value", "be").text("Belgium")),
        )
        .child(input("token", Some("hidden")))
        .child(DomNode::new("button").attr("id", "submit").text(" Sign in "))
}

pub fn page(body_children: Vec<DomNode>) -> DomNode {
    let mut body = DomNode::new("body");
    body.children = body_children;
    DomNode::new("html")
        .child(DomNode::new("head").child(DomNode::new("title").text("Login")))
        .child(body)
}

pub fn login_page() -> DomNode {
    page(vec![login_form()])
}

pub fn login_document() -> Document {
    Document::from_root(&login_page(), true)
}
