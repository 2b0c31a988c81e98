use cozy_chess::Board;
use repertree::position::Position;
use repertree::{build_tree, ChessTree, Merger, NodeId};
use std::collections::HashSet;

fn labels(tree: &ChessTree, ids: &[NodeId]) -> Vec<String> {
    ids.iter().map(|&id| tree.notation(id).unwrap()).collect()
}

fn assert_unique_children(tree: &ChessTree) {
    for id in tree.ids() {
        let moves: Vec<_> = tree.children(id).iter().map(|&c| tree.node(c).mv().unwrap()).collect();
        let distinct: HashSet<_> = moves.iter().copied().collect();
        assert_eq!(moves.len(), distinct.len(), "duplicate child moves under {:?}", id);
    }
}

#[test]
fn shared_openings_collapse_onto_one_path() {
    let (tree, report) = build_tree(
        Board::default(),
        ["1.e4 e5 2.Nf3", "1.e4 e5 2.Nc3", "1.d4 d5"],
    );
    let root = tree.children(tree.root()).to_vec();
    assert_eq!(labels(&tree, &root), vec!["e4", "d4"]);

    let e4 = root[0];
    assert_eq!(labels(&tree, tree.children(e4)), vec!["e5"]);
    let e5 = tree.children(e4)[0];
    assert_eq!(labels(&tree, tree.children(e5)), vec!["Nf3", "Nc3"]);

    let d4 = root[1];
    assert_eq!(labels(&tree, tree.children(d4)), vec!["d5"]);
    assert!(tree.children(tree.children(d4)[0]).is_empty());

    assert_eq!(tree.move_count(), 6);
    assert_eq!(report.lines, 3);
    assert_eq!(report.complete, 3);
    assert_eq!(report.nodes_created, 6);
    assert_unique_children(&tree);
}

#[test]
fn illegal_token_keeps_the_prefix() {
    let (tree, report) = build_tree(Board::default(), ["1.e4 Zz9"]);
    assert_eq!(tree.move_count(), 1);
    let only = tree.children(tree.root())[0];
    assert_eq!(tree.notation(only).as_deref(), Some("e4"));
    assert!(tree.children(only).is_empty());

    assert_eq!(report.truncated, 1);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].line, 1);
    assert_eq!(report.diagnostics[0].token, "Zz9");
}

#[test]
fn illegal_move_does_not_stop_later_lines() {
    let (tree, report) = build_tree(
        Board::default(),
        ["1.e4 e5 2.Ke3 Nc6", "1.e4 e5 2.Nf3 Nc6"],
    );
    // e4 e5 from the first line, Nf3 Nc6 from the second
    assert_eq!(tree.move_count(), 4);
    assert_eq!(report.truncated, 1);
    assert_eq!(report.complete, 1);
    assert!(tree.lookup(&["e4", "e5", "Nf3", "Nc6"]).is_some());
}

#[test]
fn illegal_first_move_contributes_nothing() {
    let (tree, report) = build_tree(Board::default(), ["1.e5 d5", ""]);
    assert!(tree.is_empty());
    assert_eq!(report.truncated, 1);
    assert_eq!(report.empty, 1);
}

#[test]
fn caller_line_numbers_reach_diagnostics() {
    let mut merger = Merger::new(Board::default());
    merger.merge_numbered([(3, "1.e4 e5"), (7, "1.e4 e6 2.Zz9"), (9, "1.d4 Qd6")]);
    merger.merge_line("1.c4 c4");
    let (_, report) = merger.finish();
    let at: Vec<(usize, &str)> = report
        .diagnostics
        .iter()
        .map(|d| (d.line, d.token.as_str()))
        .collect();
    assert_eq!(at, vec![(7, "Zz9"), (9, "Qd6"), (4, "c4")]);
    assert_eq!(report.lines, 4);
}

#[test]
fn duplicate_lines_are_idempotent() {
    let line = "1.e4 c5 2.Nf3 d6 3.d4 cxd4 4.Nxd4 Nf6 5.Nc3 a6";
    let (once, _) = build_tree(Board::default(), [line]);
    let (twice, report) = build_tree(Board::default(), [line, line]);
    assert_eq!(once.move_count(), 10);
    assert_eq!(twice.move_count(), once.move_count());
    assert_eq!(report.nodes_created, 10);
}

#[test]
fn shared_prefix_then_two_branches() {
    let (tree, _) = build_tree(
        Board::default(),
        ["1.d4 Nf6 2.c4 e6 3.Nc3 Bb4", "1.d4 Nf6 2.c4 e6 3.Nf3 b6"],
    );
    let mut node = tree.root();
    for _ in 0..4 {
        assert_eq!(tree.children(node).len(), 1);
        node = tree.children(node)[0];
    }
    assert_eq!(labels(&tree, tree.children(node)), vec!["Nc3", "Nf3"]);
    for &branch in tree.children(node) {
        assert_eq!(tree.children(branch).len(), 1);
    }
    assert_eq!(tree.move_count(), 4 + 2 + 2);
}

#[test]
fn later_lines_diverge_mid_branch() {
    let mut merger = Merger::new(Board::default());
    merger.merge_line("1.e4 e5 2.Nf3 Nc6 3.Bb5 a6");
    merger.merge_line("1.e4 e5 2.Nf3 Nc6 3.Bb5 Nf6");
    merger.merge_line("1.e4 e5 2.Nf3 Nc6 3.Bc4");
    let (tree, report) = merger.finish();
    assert_eq!(tree.move_count(), 8);
    let nc6 = tree.lookup(&["e4", "e5", "Nf3", "Nc6"]).unwrap();
    assert_eq!(labels(&tree, tree.children(nc6)), vec!["Bb5", "Bc4"]);
    let bb5 = tree.children(nc6)[0];
    assert_eq!(labels(&tree, tree.children(bb5)), vec!["a6", "Nf6"]);
    assert_eq!(report.nodes_created, 8);
    assert_unique_children(&tree);
}

#[test]
fn different_spellings_match_one_move() {
    let (tree, report) = build_tree(
        Board::default(),
        [
            "1.e4 e5 2.Nf3 Nc6 3.Bb5",
            "1. e4 e5 2. Ngf3 Nbc6 3. Bb5!?",
            "1.e4 e5 2.Nf3 Nc6 3.Bxb5",
        ],
    );
    // Bxb5 is not a capture, but the move is still recognised
    assert_eq!(tree.move_count(), 5);
    assert_eq!(report.complete, 3);
}

#[test]
fn pawn_capture_without_file_cuts_the_line() {
    let (tree, report) = build_tree(Board::default(), ["1.e4 d5 2.d5 Qxd5", "1.e4 d5 2.exd5 Qxd5"]);
    let d5 = tree.lookup(&["e4", "d5"]).unwrap();
    assert_eq!(labels(&tree, tree.children(d5)), vec!["exd5"]);
    assert_eq!(tree.move_count(), 4);
    assert_eq!(report.truncated, 1);
    assert_eq!(report.diagnostics[0].line, 1);
    assert_eq!(report.diagnostics[0].token, "d5");

    let (short, report) = build_tree(Board::default(), ["1.e4 d5 2.d5"]);
    assert_eq!(short.move_count(), 2);
    assert_eq!(report.truncated, 1);
}

#[test]
fn castling_and_checks_are_labelled_canonically() {
    let (tree, _) = build_tree(
        Board::default(),
        ["1.e4 e5 2.Nf3 Nc6 3.Bc4 Bc5 4.0-0 Nf6 5.Bxf7 Kxf7"],
    );
    let castle = tree
        .lookup(&["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5", "O-O"])
        .unwrap();
    assert_eq!(tree.notation(castle).as_deref(), Some("O-O"));
    let bxf7 = tree
        .lookup(&["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5", "O-O", "Nf6", "Bxf7"])
        .unwrap();
    assert_eq!(tree.notation(bxf7).as_deref(), Some("Bxf7+"));
    assert_eq!(tree.node(bxf7).ply(), 8);
}

#[test]
fn replayed_position_matches_board() {
    let (tree, _) = build_tree(Board::default(), ["1.d4 d5 2.c4 dxc4"]);
    let leaf = tree.lookup(&["d4", "d5", "c4", "dxc4"]).unwrap();
    assert_eq!(
        tree.position_at(leaf).to_string(),
        "rnbqkbnr/ppp1pppp/8/8/2pP4/8/PP2PPPP/RNBQKBNR w KQkq - 0 3"
    );
    assert!(tree.position_at(leaf).parse_move("e4").is_ok());
}
