use log::debug;

/// Relation used when a link does not name one.
pub const DEFAULT_RELATION: &str = "_self";

/// One entry of a `linkedTo` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkDescriptor {
    pub resource_name: String,
    pub relation: String,
    pub resource_method: Option<String>,
}

fn unquote(value: &str) -> &str {
    value.trim().trim_matches('"').trim()
}

/// Parse the source text of a `linkedTo` field, e.g.
/// `[{name: "pet", method: "get"}, {name: "owner", relation: "owner"}]`.
///
/// Values must not contain `,` or `}`. Entries without a `name` are dropped.
pub fn parse_linked_to(raw: &str) -> Vec<LinkDescriptor> {
    let stripped: String = raw.chars().filter(|c| *c != '[' && *c != ']').collect();

    stripped
        .split("},")
        .filter_map(|item| {
            let body = item.trim().trim_start_matches('{').trim_end_matches('}');
            let mut name = None;
            let mut relation = None;
            let mut method = None;
            for pair in body.split(',') {
                let Some((key, value)) = pair.split_once(':') else {
                    continue;
                };
                let value = unquote(value).to_string();
                match key.trim() {
                    "name" => name = Some(value),
                    "relation" => relation = Some(value),
                    "method" => method = Some(value.to_ascii_lowercase()),
                    other => debug!("Ignoring linkedTo key '{}'", other),
                }
            }
            let resource_name = name.filter(|n| !n.is_empty())?;
            Some(LinkDescriptor {
                resource_name,
                relation: relation
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| DEFAULT_RELATION.to_string()),
                resource_method: method.filter(|m| !m.is_empty()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_entries() {
        let links = parse_linked_to(
            r#"[{name: "petById", relation: "self", method: "GET"}, {name: "pets",relation:"collection"}]"#,
        );
        assert_eq!(
            links,
            vec![
                LinkDescriptor {
                    resource_name: "petById".into(),
                    relation: "self".into(),
                    resource_method: Some("get".into()),
                },
                LinkDescriptor {
                    resource_name: "pets".into(),
                    relation: "collection".into(),
                    resource_method: None,
                },
            ]
        );
    }

    #[test]
    fn test_relation_defaults() {
        let links = parse_linked_to(r#"[{ name: "petById", method: "get" }]"#);
        assert_eq!(links[0].relation, DEFAULT_RELATION);
        assert_eq!(links[0].resource_method.as_deref(), Some("get"));
    }

    #[test]
    fn test_entries_without_name_are_dropped() {
        assert!(parse_linked_to(r#"[{relation: "self"}]"#).is_empty());
        assert!(parse_linked_to("[]").is_empty());
        assert!(parse_linked_to("").is_empty());
    }
}
