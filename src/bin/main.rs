use avl_collections::AvlTree;

fn print_tree(tree: &AvlTree<u32>) {
    println!(
        "height {:?}: in-order {:?}, level-order {:?}",
        tree.height(),
        tree.in_order().collect::<Vec<_>>(),
        tree.level_order().collect::<Vec<_>>(),
    );
}

fn main() {
    let mut tree: AvlTree<u32> = AvlTree::new();

    for value in [5, 3, 8, 1, 4, 7, 9] {
        tree.insert(value);
        tree.assert_invariants();
        print_tree(&tree);
    }

    assert_eq!(tree.minimum(), Some(&1));

    tree.remove(&5);
    tree.assert_invariants();
    print_tree(&tree);

    let mut dot = String::new();
    tree.dotgraph("demo", &mut dot).expect("writing to a String cannot fail");
    println!("{dot}");

    drop(tree);
}
