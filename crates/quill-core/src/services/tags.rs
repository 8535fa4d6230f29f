//! Tag parser - turns a free-text `tags_str` into stored tags.

use crate::domain::{NewTag, Tag};
use crate::error::DomainError;
use crate::ports::{ContentStore, TagRepository};

/// Split a `;`/`,` separated list into distinct, trimmed tag names.
///
/// Empty items are dropped; the first occurrence of a name wins.
pub fn split_tag_names(raw: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for item in raw.split([';', ',']) {
        let name = item.trim();
        if name.is_empty() || names.iter().any(|n| n == name) {
            continue;
        }
        names.push(name.to_string());
    }
    names
}

/// Form field the parsed tags are reported under.
pub const TAGS_FIELD: &str = "tags_str";

const TAG_NAME_MAX_CHARS: usize = 50;

/// Turn `raw` into tag drafts, one per distinct slug, without touching the store.
///
/// Names that only differ in case or punctuation share a slug and collapse
/// into the first one given. Overlong names and names without a single
/// word character are reported as a field error.
pub fn parse_tags(raw: Option<&str>) -> Result<Vec<NewTag>, DomainError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    let mut drafts: Vec<NewTag> = Vec::new();
    for name in split_tag_names(raw) {
        if name.chars().count() > TAG_NAME_MAX_CHARS {
            return Err(DomainError::invalid(
                TAGS_FIELD,
                format!("Ensure each tag has at most {TAG_NAME_MAX_CHARS} characters: {name:?}."),
            ));
        }
        let draft = NewTag::from_name(name);
        if draft.slug.is_empty() {
            return Err(DomainError::invalid(
                TAGS_FIELD,
                format!("Tag {:?} needs at least one letter or digit.", draft.name),
            ));
        }
        if drafts.iter().any(|d| d.slug == draft.slug) {
            continue;
        }
        drafts.push(draft);
    }
    Ok(drafts)
}

/// Resolve every draft to a stored tag, creating the missing ones.
pub async fn resolve_tags(
    tags: &dyn TagRepository,
    drafts: Vec<NewTag>,
) -> Result<Vec<Tag>, DomainError> {
    let mut resolved: Vec<Tag> = Vec::new();
    for draft in drafts {
        let (tag, created) = tags.get_or_create(draft).await?;
        if created {
            tracing::info!(tag_id = tag.id, slug = %tag.slug, "Created tag");
        }
        // a catalog tag with a custom slug can answer for two drafts
        if !resolved.iter().any(|t| t.id == tag.id) {
            resolved.push(tag);
        }
    }
    Ok(resolved)
}

/// Make `tags` the complete tag set of a post.
///
/// Prior associations are always cleared, so an empty set leaves the post
/// untagged and repeating the same set is a no-op.
pub async fn apply_tags(
    store: &ContentStore,
    post_id: i32,
    tags: &[Tag],
) -> Result<(), DomainError> {
    let ids: Vec<i32> = tags.iter().map(|t| t.id).collect();
    store.posts.replace_tags(post_id, &ids).await?;
    Ok(())
}

/// Current tag names joined the way the update form pre-fills them.
pub fn join_tag_names(tags: &[Tag]) -> Option<String> {
    if tags.is_empty() {
        return None;
    }
    Some(
        tags.iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>()
            .join("; "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_delimiters_are_accepted() {
        assert_eq!(split_tag_names("a; b, c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_duplicates_collapse() {
        assert_eq!(split_tag_names("a; b, a"), vec!["a", "b"]);
    }

    #[test]
    fn test_blank_input_yields_nothing() {
        assert!(split_tag_names("").is_empty());
        assert!(split_tag_names("   ").is_empty());
        assert!(split_tag_names(" ; ,, ").is_empty());
    }

    #[test]
    fn test_inner_whitespace_is_kept() {
        assert_eq!(split_tag_names("  rust lang ;web"), vec!["rust lang", "web"]);
    }

    #[test]
    fn test_case_variants_share_one_draft() {
        let drafts = parse_tags(Some("Rust, rust; RUST!")).unwrap();
        assert_eq!(drafts, vec![NewTag::from_name("Rust")]);
    }

    #[test]
    fn test_absent_tags_parse_to_nothing() {
        assert!(parse_tags(None).unwrap().is_empty());
        assert!(parse_tags(Some(" ; ")).unwrap().is_empty());
    }

    #[test]
    fn test_tag_without_word_characters_is_rejected() {
        match parse_tags(Some("ok, !!!")) {
            Err(DomainError::Validation(errors)) => assert_eq!(errors[0].field, TAGS_FIELD),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_overlong_tag_is_rejected() {
        let fits = "x".repeat(50);
        assert_eq!(parse_tags(Some(&fits)).unwrap().len(), 1);

        let long = "x".repeat(51);
        match parse_tags(Some(&format!("short; {long}"))) {
            Err(DomainError::Validation(errors)) => assert_eq!(errors[0].field, TAGS_FIELD),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_join_tag_names() {
        let tags = vec![
            Tag {
                id: 1,
                name: "a".to_string(),
                slug: "a".to_string(),
            },
            Tag {
                id: 2,
                name: "b".to_string(),
                slug: "b".to_string(),
            },
        ];
        assert_eq!(join_tag_names(&tags).as_deref(), Some("a; b"));
        assert_eq!(join_tag_names(&[]), None);
    }
}
