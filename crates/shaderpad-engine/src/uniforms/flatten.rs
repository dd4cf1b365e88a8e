use super::cell::Uniform;
use super::group::UniformGroup;
use super::layout::pad4;
use super::UniformError;

/// One leaf of a flattened uniform tree.
#[derive(Debug, Clone)]
pub struct FlatLeaf {
    /// Dotted path, e.g. `light.color`.
    pub path: String,
    pub uniform: Uniform,
    /// Staged element count (vec3 counts as 4).
    pub elements: usize,
    /// Zero slots appended after this leaf to close the enclosing group(s).
    pub trailing_padding: usize,
}

/// Flattens `root` depth-first in declaration order.
///
/// Each nested group is padded up to a multiple of four elements. The padding
/// belongs to the group and is appended after the leaf that closes it; when
/// several groups close on the same leaf their paddings add up.
pub fn flatten(root: &UniformGroup) -> Result<Vec<FlatLeaf>, UniformError> {
    let mut out = Vec::new();
    flatten_into(root, "", &mut out)?;
    Ok(out)
}

/// Appends the leaves of `group` and returns its unpadded element total.
fn flatten_into(
    group: &UniformGroup,
    prefix: &str,
    out: &mut Vec<FlatLeaf>,
) -> Result<usize, UniformError> {
    let mut size = 0;

    for (name, uniform) in group.iter() {
        let path = format!("{prefix}{name}");
        if out.iter().any(|leaf| leaf.uniform.ptr_eq(uniform)) {
            return Err(UniformError::AliasedCell(path));
        }

        match uniform.group() {
            Some(children) => {
                let first = out.len();
                let inner = flatten_into(&children, &format!("{path}."), out)?;
                let padding = pad4(inner) - inner;
                uniform.set_trailing_padding(padding);

                if padding > 0 && out.len() > first {
                    if let Some(tail) = out.last_mut() {
                        tail.trailing_padding += padding;
                        tail.uniform.set_trailing_padding(tail.trailing_padding);
                    }
                }
                size += inner + padding;
            }
            None => {
                uniform.set_trailing_padding(0);
                let elements = uniform.elements();
                out.push(FlatLeaf {
                    path,
                    uniform: uniform.clone(),
                    elements,
                    trailing_padding: 0,
                });
                size += elements;
            }
        }
    }

    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uniforms::{Vec2, Vec3, Vec4};

    fn group(fields: Vec<(&str, Uniform)>) -> UniformGroup {
        let mut g = UniformGroup::new();
        for (name, u) in fields {
            g.insert(name, u).unwrap();
        }
        g
    }

    fn paths(leaves: &[FlatLeaf]) -> Vec<&str> {
        leaves.iter().map(|l| l.path.as_str()).collect()
    }

    #[test]
    fn flat_tree_keeps_order_without_padding() {
        let root = group(vec![
            ("b", Uniform::new(1.0f32)),
            ("a", Uniform::new(Vec2::new(0.0, 0.0))),
        ]);
        let leaves = flatten(&root).unwrap();
        assert_eq!(paths(&leaves), ["b", "a"]);
        assert!(leaves.iter().all(|l| l.trailing_padding == 0));
    }

    #[test]
    fn group_tail_is_padded_to_four() {
        let light = group(vec![
            ("color", Uniform::new(Vec3::new(1.0, 1.0, 1.0))),
            ("intensity", Uniform::new(2.0f32)),
        ]);
        let light = Uniform::new(light);
        let root = group(vec![("light", light.clone()), ("time", Uniform::new(0.0f32))]);

        let leaves = flatten(&root).unwrap();
        assert_eq!(paths(&leaves), ["light.color", "light.intensity", "time"]);
        assert_eq!(leaves[0].trailing_padding, 0);
        assert_eq!(leaves[1].trailing_padding, 3);
        assert_eq!(leaves[1].uniform.trailing_padding(), 3);
        assert_eq!(leaves[2].trailing_padding, 0);
        assert_eq!(light.trailing_padding(), 3);
    }

    #[test]
    fn nested_group_closing_together_sums_padding() {
        // inner = { s: scalar } -> 1 element, padded by 3.
        // outer = { v: vec2, inner } -> 2 + 4 = 6, padded by 2.
        let inner = group(vec![("s", Uniform::new(1.0f32))]);
        let outer = group(vec![
            ("v", Uniform::new(Vec2::new(1.0, 2.0))),
            ("inner", Uniform::new(inner)),
        ]);
        let root = group(vec![("outer", Uniform::new(outer))]);

        let leaves = flatten(&root).unwrap();
        assert_eq!(paths(&leaves), ["outer.v", "outer.inner.s"]);
        assert_eq!(leaves[1].trailing_padding, 3 + 2);
    }

    #[test]
    fn aligned_group_gets_no_padding() {
        let g = group(vec![("c", Uniform::new(Vec4::default()))]);
        let root = group(vec![("g", Uniform::new(g))]);
        let leaves = flatten(&root).unwrap();
        assert_eq!(leaves[0].trailing_padding, 0);
    }

    #[test]
    fn empty_group_emits_nothing() {
        let root = group(vec![
            ("empty", Uniform::new(UniformGroup::new())),
            ("t", Uniform::new(1.0f32)),
        ]);
        let leaves = flatten(&root).unwrap();
        assert_eq!(paths(&leaves), ["t"]);
        assert_eq!(leaves[0].trailing_padding, 0);
    }

    #[test]
    fn same_cell_twice_is_rejected() {
        let shared = Uniform::new(1.0f32);
        let inner = group(vec![("x", shared.clone())]);
        let root = group(vec![("x", shared), ("g", Uniform::new(inner))]);
        assert_eq!(
            flatten(&root).unwrap_err(),
            UniformError::AliasedCell("g.x".into())
        );
    }
}
