//! Matching replies to the comments they answer.
//!
//! A comment written by the owner points at the thread it lives in through
//! its `root_id` and at the comment it answers through its `parent_id`.
//! Either pointer is enough to mark the target as answered.

use std::collections::HashSet;

use crate::Comment;

/// Collect every id targeted by one of the owner's comments.
pub fn covered_ids<'a, I>(comments: I, owner_id: &str) -> HashSet<i64>
where
    I: IntoIterator<Item = &'a Comment>,
{
    let mut covered = HashSet::new();
    for comment in comments {
        if comment.author_id == owner_id {
            covered.insert(comment.root_id);
            covered.insert(comment.parent_id);
        }
    }
    covered
}

/// Return the comments by other authors that no owner comment points at.
///
/// Page order is preserved.
pub fn find_unreplied(page: &[Comment], owner_id: &str) -> Vec<Comment> {
    let (own, others): (Vec<&Comment>, Vec<&Comment>) =
        page.iter().partition(|c| c.author_id == owner_id);

    let covered = covered_ids(own, owner_id);

    others
        .into_iter()
        .filter(|c| !covered.contains(&c.comment_id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn comment(id: i64, author: &str, root: i64, parent: i64) -> Comment {
        Comment {
            comment_id: id,
            author_id: author.to_string(),
            content_id: 1,
            root_id: root,
            parent_id: parent,
            text: format!("comment {id}"),
            title: "video".to_string(),
            author_name: author.to_lowercase(),
            bvid: String::new(),
        }
    }

    fn ids(comments: &[Comment]) -> Vec<i64> {
        comments.iter().map(|c| c.comment_id).collect()
    }

    #[test]
    fn test_reply_covers_root() {
        let page = vec![
            comment(1, "U1", 0, 0),
            comment(2, "ME", 1, 1),
            comment(3, "U2", 0, 0),
        ];

        assert_eq!(ids(&find_unreplied(&page, "ME")), vec![3]);
    }

    #[test]
    fn test_reply_covers_parent_inside_thread() {
        // 10 starts the thread, 11 replies inside it, ME answers 11 only.
        let page = vec![
            comment(10, "U1", 0, 0),
            comment(11, "U2", 10, 10),
            comment(12, "ME", 10, 11),
        ];

        // 10 is covered through the root pointer, 11 through the parent one.
        assert!(find_unreplied(&page, "ME").is_empty());
    }

    #[test]
    fn test_own_comments_are_excluded() {
        let page = vec![comment(1, "ME", 0, 0), comment(2, "ME", 0, 0)];
        assert!(find_unreplied(&page, "ME").is_empty());
    }

    #[test]
    fn test_no_owner_comments_everything_unreplied() {
        let page = vec![
            comment(5, "U1", 0, 0),
            comment(4, "U2", 5, 5),
            comment(3, "U3", 0, 0),
        ];
        assert_eq!(ids(&find_unreplied(&page, "ME")), vec![5, 4, 3]);
    }

    #[test]
    fn test_reply_to_comment_outside_page() {
        // The owner answered something that is not on this page.
        let page = vec![comment(1, "U1", 0, 0), comment(2, "ME", 99, 99)];
        assert_eq!(ids(&find_unreplied(&page, "ME")), vec![1]);
    }

    #[test]
    fn test_empty_page() {
        assert!(find_unreplied(&[], "ME").is_empty());
    }

    #[test]
    fn test_covered_ids_collects_both_pointers() {
        let page = vec![comment(7, "ME", 3, 5), comment(8, "U1", 4, 6)];
        let covered = covered_ids(&page, "ME");

        assert!(covered.contains(&3));
        assert!(covered.contains(&5));
        assert!(!covered.contains(&4));
        assert!(!covered.contains(&6));
    }
}
