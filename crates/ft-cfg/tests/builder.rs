use super::*;
use crate::graph::EdgeKind;

#[test]
fn straight_line_code_is_one_block() {
    let mut b = CfgBuilder::new();
    b.push_statement(1);
    b.push_statement(2);
    let exit = b.current_block();
    let cfg = b.finish(exit);
    assert_eq!(cfg.block_count(), 1);
    assert_eq!(cfg.block(cfg.entry).statements, vec![1, 2]);
}

#[test]
fn branch_creates_true_and_false_edges() {
    let mut b = CfgBuilder::new();
    let then_block = b.new_block();
    let else_block = b.new_block();
    let join = b.new_block();
    b.branch(10, then_block, else_block);

    b.set_current(then_block);
    b.fallthrough_to(join);
    b.set_current(else_block);
    b.fallthrough_to(join);

    let cfg = b.finish(join);
    let kinds: Vec<EdgeKind> = cfg.outgoing_edges(cfg.entry).map(|e| e.kind).collect();
    assert_eq!(kinds, vec![EdgeKind::TrueBranch, EdgeKind::FalseBranch]);
    assert_eq!(cfg.predecessors(join).count(), 2);
}

#[test]
fn break_and_continue_target_loop_stack() {
    let mut b = CfgBuilder::new();
    let header = b.new_block();
    let exit = b.new_block();
    b.fallthrough_to(header);
    b.enter_loop(exit, header);

    let body = b.new_block();
    b.set_current(body);
    b.emit_break();
    b.exit_loop();

    let cfg = b.finish(exit);
    let edge = cfg.outgoing_edges(body).next().unwrap();
    assert_eq!(edge.kind, EdgeKind::Break);
    assert_eq!(edge.to, exit);
}
