use super::markup::{compile, split_blocks, tag_raw};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

const DEFAULT_STATE: &str = "active";

/// Whether a workflow state makes content visible to learners.
///
/// A missing or blank state counts as published: exports frequently omit the
/// tag, and absence must not hide content.
pub fn is_published_state(workflow_state: &str) -> bool {
    matches!(
        workflow_state.trim().to_lowercase().as_str(),
        "active" | "published" | ""
    )
}

/// Cross-reference of module item states against manifest resources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishResolution {
    pub published_hrefs: HashSet<String>,
    pub item_states: HashMap<String, String>,
    pub id_to_href: HashMap<String, String>,
}

impl PublishResolution {
    /// An empty state map means module metadata was absent or unparseable;
    /// callers then include everything instead of excluding everything.
    pub fn is_state_known(&self) -> bool {
        !self.item_states.is_empty()
    }

    pub fn is_href_published(&self, href: &str) -> bool {
        !self.is_state_known() || self.published_hrefs.contains(href)
    }
}

pub(crate) fn item_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"<item\s+identifier=[^>]+>"))
}

fn resource_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"<resource\s"))
}

fn identifier_attr() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r#"identifier=["']([^"']+)["']"#))
}

fn href_attr() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r#"href=["']([^"']+)["']"#))
}

/// Computes the set of manifest hrefs reachable from a published module item.
///
/// When the same item reference appears in several modules, any published
/// occurrence wins.
pub fn resolve_published(module_meta_xml: &str, manifest_xml: &str) -> PublishResolution {
    let mut item_states: HashMap<String, String> = HashMap::new();
    for block in split_blocks(module_meta_xml, item_boundary()) {
        let Some(reference) = tag_raw(block, "identifierref") else {
            continue;
        };
        let state = tag_raw(block, "workflow_state").unwrap_or(DEFAULT_STATE);
        if !item_states.contains_key(reference) || is_published_state(state) {
            item_states.insert(reference.to_string(), state.to_string());
        }
    }

    let mut id_to_href = HashMap::new();
    for block in split_blocks(manifest_xml, resource_boundary()) {
        let identifier = identifier_attr().captures(block).and_then(|c| c.get(1));
        let href = href_attr().captures(block).and_then(|c| c.get(1));
        if let (Some(identifier), Some(href)) = (identifier, href) {
            id_to_href.insert(identifier.as_str().to_string(), href.as_str().to_string());
        }
    }

    let published_hrefs = item_states
        .iter()
        .filter(|(_, state)| is_published_state(state))
        .filter_map(|(reference, _)| id_to_href.get(reference).cloned())
        .collect();

    PublishResolution {
        published_hrefs,
        item_states,
        id_to_href,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"<manifest>
  <resources>
    <resource identifier="res-intro" type="webcontent" href="wiki_content/intro.html">
      <file href="wiki_content/intro.html"/>
    </resource>
    <resource identifier='res-draft' type="webcontent" href='wiki_content/draft.html'/>
    <resource identifier="res-orphan" type="webcontent"/>
  </resources>
</manifest>"#;

    fn module_meta(items: &[(&str, Option<&str>)]) -> String {
        let mut xml = String::from("<modules><module identifier=\"m1\"><items>");
        for (index, (reference, state)) in items.iter().enumerate() {
            xml.push_str(&format!("<item identifier=\"i{index}\">"));
            if let Some(state) = state {
                xml.push_str(&format!("<workflow_state>{state}</workflow_state>"));
            }
            xml.push_str(&format!("<identifierref>{reference}</identifierref></item>"));
        }
        xml.push_str("</items></module></modules>");
        xml
    }

    #[test]
    fn publish_predicate_accepts_active_published_and_blank() {
        for state in ["active", "Published", "  ACTIVE  ", "", "   "] {
            assert!(is_published_state(state), "{state:?} should be published");
        }
        for state in ["unpublished", "draft", " Draft "] {
            assert!(!is_published_state(state), "{state:?} should be hidden");
        }
    }

    #[test]
    fn resolves_published_hrefs_through_manifest() {
        let meta = module_meta(&[
            ("res-intro", Some("active")),
            ("res-draft", Some("unpublished")),
            ("res-orphan", None),
        ]);
        let resolution = resolve_published(&meta, MANIFEST);

        assert!(resolution.published_hrefs.contains("wiki_content/intro.html"));
        assert!(!resolution.published_hrefs.contains("wiki_content/draft.html"));
        assert_eq!(resolution.published_hrefs.len(), 1);
        assert_eq!(resolution.item_states.get("res-orphan").map(String::as_str), Some("active"));
        assert_eq!(
            resolution.id_to_href.get("res-draft").map(String::as_str),
            Some("wiki_content/draft.html")
        );
    }

    #[test]
    fn any_active_occurrence_wins() {
        let meta = module_meta(&[
            ("res-draft", Some("unpublished")),
            ("res-draft", Some("active")),
            ("res-intro", Some("active")),
            ("res-intro", Some("unpublished")),
        ]);
        let resolution = resolve_published(&meta, MANIFEST);

        assert!(resolution.published_hrefs.contains("wiki_content/draft.html"));
        assert!(resolution.published_hrefs.contains("wiki_content/intro.html"));
    }

    #[test]
    fn missing_module_metadata_means_state_unknown() {
        let resolution = resolve_published("", MANIFEST);
        assert!(resolution.item_states.is_empty());
        assert!(!resolution.is_state_known());
        assert!(resolution.is_href_published("wiki_content/anything.html"));
    }
}
