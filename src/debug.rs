use std::{collections::VecDeque, fmt};

use crate::{AvlTree, NodeId};

impl<T: fmt::Display> AvlTree<T> {
    /// Renders the tree as a Graphviz digraph, one rank per level.
    ///
    /// Nodes are labelled `value:height`; missing children are drawn as points.
    pub fn dotgraph<W>(&self, name: &str, mut w: W) -> fmt::Result
    where
        W: fmt::Write,
    {
        let root = match self.root() {
            Some(r) => r,
            None => return write!(w, "digraph \"graph-{name}\" {{}}"),
        };

        enum Item {
            Node(NodeId),
            Missing(u32),
        }

        let mut queue = VecDeque::new();
        queue.push_back(Item::Node(root));

        write!(
            w,
            "digraph \"graph-{name}\" {{\n subgraph \"subgraph-{name}\" {{"
        )?;

        let mut missing = 0;
        let mut links = String::new();

        while !queue.is_empty() {
            use fmt::Write;

            write!(w, "{{rank=same; ")?;

            for _ in 0..queue.len() {
                let node = match queue.pop_front() {
                    Some(Item::Node(node)) => node,
                    Some(Item::Missing(id)) => {
                        write!(w, "\"graph{name}-missing{id}\" [shape=point]; ")?;
                        continue;
                    }
                    None => break,
                };

                let value = self.value(node);
                let height = self.node(node).height;
                write!(w, "\"graph{name}-{value}\" [label=\"{value}:{height}\"]; ")?;

                for child in [self.left(node), self.right(node)] {
                    match child {
                        Some(child) => {
                            let child_value = self.value(child);
                            queue.push_back(Item::Node(child));
                            writeln!(links, "\"graph{name}-{value}\" -> \"graph{name}-{child_value}\";")?;
                        }
                        None => {
                            queue.push_back(Item::Missing(missing));
                            writeln!(links, "\"graph{name}-{value}\" -> \"graph{name}-missing{missing}\";")?;
                            missing += 1;
                        }
                    }
                }
            }

            writeln!(w, "}}")?;
        }

        w.write_str(&links)?;

        w.write_str(" }\n}")
    }
}

#[cfg(test)]
mod tests {
    use crate::AvlTree;

    #[test]
    fn empty_dotgraph() {
        let tree: AvlTree<u32> = AvlTree::new();

        let mut out = String::new();
        tree.dotgraph("empty", &mut out).unwrap();
        assert_eq!(out, "digraph \"graph-empty\" {}");
    }

    #[test]
    fn dotgraph_labels_heights() {
        let tree: AvlTree<u32> = [2, 1, 3].into_iter().collect();

        let mut out = String::new();
        tree.dotgraph("t", &mut out).unwrap();

        assert!(out.contains("\"grapht-2\" [label=\"2:1\"]"));
        assert!(out.contains("\"grapht-1\" [label=\"1:0\"]"));
        assert!(out.contains("\"grapht-2\" -> \"grapht-3\";"));
        assert!(out.ends_with(" }\n}"));
    }
}
