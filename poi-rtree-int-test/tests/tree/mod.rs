mod tree_invariants_test;
