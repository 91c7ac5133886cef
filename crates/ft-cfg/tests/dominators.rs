use super::*;
use crate::builder::CfgBuilder;

/// entry -> then/else -> join, a diamond.
fn diamond_cfg() -> crate::graph::Cfg {
    let mut b = CfgBuilder::new();
    let then_block = b.new_block();
    let else_block = b.new_block();
    let join = b.new_block();
    b.branch(0, then_block, else_block);
    b.set_current(then_block);
    b.fallthrough_to(join);
    b.set_current(else_block);
    b.fallthrough_to(join);
    b.finish(join)
}

#[test]
fn entry_dominates_every_block() {
    let cfg = diamond_cfg();
    let dom = Dominators::compute(&cfg);
    for block in cfg.block_ids() {
        assert!(dom.dominates(cfg.entry, block));
    }
}

#[test]
fn join_point_is_not_dominated_by_either_branch() {
    let cfg = diamond_cfg();
    let dom = Dominators::compute(&cfg);
    let then_block = crate::graph::BlockId(1);
    let else_block = crate::graph::BlockId(2);
    let join = cfg.exit;
    assert!(!dom.dominates(then_block, join));
    assert!(!dom.dominates(else_block, join));
}

#[test]
fn loop_header_is_detected_from_back_edge() {
    let mut b = CfgBuilder::new();
    let header = b.new_block();
    b.fallthrough_to(header);
    let body = b.new_block();
    b.set_current(header);
    let exit = b.new_block();
    b.branch(1, body, exit);
    b.set_current(body);
    b.back_edge(body, header);
    let cfg = b.finish(exit);

    let dom = Dominators::compute(&cfg);
    assert!(dom.is_loop_header(&cfg, header));
    assert!(!dom.is_loop_header(&cfg, body));
}
