use super::comments::CommentBlock;
use super::section::parse_sections;
use log::debug;

/// Document-level information from the API block(s)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiInfo {
    pub title: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub base_path: Option<String>,
}

/// A tag declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub description: Option<String>,
}

/// Condense every API block into one [`ApiInfo`]; later blocks override earlier ones.
pub fn parse_api_info(blocks: &[&CommentBlock]) -> ApiInfo {
    let mut info = ApiInfo::default();

    for block in blocks {
        for section in parse_sections(&block.text) {
            let value = || section.line(0).map(str::to_string);
            match section.key().as_str() {
                "api title" => info.title = value().or(info.title.take()),
                "api version" => info.version = value().or(info.version.take()),
                "api description" => info.description = section.text().or(info.description.take()),
                "base path" => info.base_path = value().or(info.base_path.take()),
                _ => {}
            }
        }
    }

    debug!("API info: {:?}", info);
    info
}

/// Every `OpenAPI Tag:` section of a block: the first line names the tag, the rest describes it.
pub fn parse_tags(block: &CommentBlock) -> Vec<Tag> {
    let mut tags = Vec::new();

    for section in parse_sections(&block.text) {
        if section.key() != "tag" {
            continue;
        }
        let Some(text) = section.text() else {
            continue;
        };

        let mut lines = text.lines();
        let name = lines.next().unwrap_or_default().trim().to_string();
        let description = lines.collect::<Vec<&str>>().join("\n").trim().to_string();

        tags.push(Tag {
            name,
            description: if description.is_empty() {
                None
            } else {
                Some(description)
            },
        });
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn block(text: &str) -> CommentBlock {
        CommentBlock {
            package_path: "crate".to_string(),
            item_name: None,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_parse_api_info() {
        let first = block(
            " OpenAPI API Title:\n     Village API\n\n OpenAPI API Version:\n     1.2.0\n\n \
             OpenAPI API Description:\n     Villages and worlds.\n     Second line.\n\n \
             OpenAPI Base Path:\n     /api",
        );
        let second = block(" OpenAPI API Version:\n     2.0.0");

        let info = parse_api_info(&[&first, &second]);
        assert_eq!(
            info,
            ApiInfo {
                title: Some("Village API".to_string()),
                version: Some("2.0.0".to_string()),
                description: Some("Villages and worlds.\nSecond line.".to_string()),
                base_path: Some("/api".to_string()),
            }
        );
    }

    #[test]
    fn test_empty_section_keeps_earlier_value() {
        let first = block("OpenAPI API Title:\n  Store");
        let second = block("OpenAPI API Title:\n");
        assert_eq!(parse_api_info(&[&first, &second]).title.as_deref(), Some("Store"));
    }

    #[test]
    fn test_parse_tags() {
        let tags = parse_tags(&block(
            " OpenAPI Tag:\n     Villages\n     Everything about villages.\n\n \
             OpenAPI Tag:\n     Worlds\n\n OpenAPI Tag:\n",
        ));

        assert_eq!(
            tags,
            vec![
                Tag {
                    name: "Villages".to_string(),
                    description: Some("Everything about villages.".to_string()),
                },
                Tag {
                    name: "Worlds".to_string(),
                    description: None,
                },
            ]
        );
    }
}
