use std::collections::HashMap;

use crate::models::Comment;

/// Builds a forest from flat comment rows.
///
/// Rows without a parent become roots. Every other row is attached under its
/// parent; a row whose parent is not part of `rows` is unreachable and is
/// dropped. Roots and siblings keep their relative input order.
pub fn build_tree(rows: Vec<Comment>) -> Vec<Comment> {
    assemble(rows, None, Orphans::Drop)
}

/// Like [`build_tree`], but the row with id `root_id` is also a root even
/// though it has a parent. Used for closures rooted at a reply, which never
/// contain the reply's own parent.
pub fn build_subtree(rows: Vec<Comment>, root_id: i64) -> Vec<Comment> {
    assemble(rows, Some(root_id), Orphans::Drop)
}

/// Forest over a partial batch of rows, such as one page of a closure or a
/// set of search hits. A row whose parent is not in the batch becomes a root
/// instead of being dropped.
pub fn build_batch(rows: Vec<Comment>) -> Vec<Comment> {
    assemble(rows, None, Orphans::Promote)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Orphans {
    Drop,
    Promote,
}

fn assemble(rows: Vec<Comment>, extra_root: Option<i64>, orphans: Orphans) -> Vec<Comment> {
    let mut position: HashMap<i64, usize> = HashMap::with_capacity(rows.len());
    for (idx, comment) in rows.iter().enumerate() {
        position.entry(comment.id).or_insert(idx);
    }

    let mut children_of: Vec<Vec<usize>> = vec![Vec::new(); rows.len()];
    let mut roots = Vec::new();
    for (idx, comment) in rows.iter().enumerate() {
        match comment.parent_id {
            None => roots.push(idx),
            Some(_) if extra_root == Some(comment.id) => roots.push(idx),
            Some(parent_id) => match position.get(&parent_id) {
                Some(&parent) => children_of[parent].push(idx),
                None if orphans == Orphans::Promote => roots.push(idx),
                None => {}
            },
        }
    }

    // Preorder over everything reachable from a root. A row has a single
    // parent slot, so each index is pushed at most once.
    let mut order = Vec::with_capacity(rows.len());
    let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
    while let Some(idx) = stack.pop() {
        order.push(idx);
        stack.extend(children_of[idx].iter().rev().copied());
    }

    // Children always follow their parent in preorder, so walking it backwards
    // finishes every subtree before its parent takes it.
    let mut slots: Vec<Option<Comment>> = rows.into_iter().map(Some).collect();
    for &idx in order.iter().rev() {
        let children: Vec<Comment> = children_of[idx]
            .iter()
            .filter_map(|&child| slots[child].take())
            .collect();
        if let Some(node) = slots[idx].as_mut() {
            node.children.extend(children);
        }
    }

    roots
        .into_iter()
        .filter_map(|idx| slots[idx].take())
        .collect()
}
