use crate::message::Part;

/// First leaf part, depth-first and left to right, whose media type contains
/// `media_type`. Multipart containers are descended into, never matched.
pub fn find_part<'a>(root: &'a Part, media_type: &str) -> Option<&'a Part> {
    let want = media_type.to_ascii_lowercase();
    let mut stack = vec![root];
    while let Some(part) = stack.pop() {
        let mime = part.media_type().to_ascii_lowercase();
        if !part.parts.is_empty() || mime.contains("multipart") {
            stack.extend(part.parts.iter().rev());
            continue;
        }
        if mime.contains(&want) {
            return Some(part);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(mime: &str, data: &str) -> Part {
        Part::leaf(mime, data)
    }

    #[test]
    fn finds_nested_leaf_left_to_right() {
        let tree = Part::multipart(
            "multipart/mixed",
            vec![
                Part::multipart(
                    "multipart/alternative",
                    vec![leaf("text/plain", "first"), leaf("text/html", "html-1")],
                ),
                leaf("text/html", "html-2"),
            ],
        );
        let found = find_part(&tree, "text/html").expect("html part");
        assert_eq!(found.encoded_body(), Some("html-1"));
        let found = find_part(&tree, "text/plain").expect("plain part");
        assert_eq!(found.encoded_body(), Some("first"));
    }

    #[test]
    fn matches_on_content_type_header_substring() {
        let mut tree =
            Part::default().with_header("Content-Type", "multipart/alternative; boundary=abc");
        tree.parts
            .push(Part::default().with_header("Content-Type", "text/plain; charset=\"UTF-8\""));
        assert!(find_part(&tree, "text/plain").is_some());
        assert!(find_part(&tree, "text/html").is_none());
    }

    #[test]
    fn root_leaf_can_match_itself() {
        let root = leaf("text/html", "body");
        assert!(find_part(&root, "text/html").is_some());
    }

    #[test]
    fn empty_multipart_is_not_a_match() {
        let root = Part::multipart("multipart/alternative", Vec::new());
        assert!(find_part(&root, "multipart").is_none());
    }

    #[test]
    fn deep_trees_do_not_overflow() {
        let mut tree = leaf("text/plain", "deep");
        for _ in 0..10_000 {
            tree = Part::multipart("multipart/mixed", vec![tree]);
        }
        assert_eq!(
            find_part(&tree, "text/plain").and_then(Part::encoded_body),
            Some("deep")
        );
        // Part's recursive Drop would blow the stack at this depth.
        std::mem::forget(tree);
    }
}
