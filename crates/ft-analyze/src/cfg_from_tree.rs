//! Walks a statement list from an `ft_common::Tree` and drives `CfgBuilder`
//! to produce the function's control-flow graph (§3.3).
//!
//! Nested function/arrow expressions are never inlined here: `ft-analyze`
//! builds one CFG per function body and analyzes nested functions as
//! independent units (see `analyzer::Analyzer::analyze_function`).

use ft_cfg::{BlockId, CfgBuilder, EdgeKind};
use ft_common::tree::{DeclKind as TreeDeclKind, NodeKind};
use ft_common::{NodeId, Tree};

pub fn build_cfg<T: Tree>(tree: &T, body: NodeId) -> (ft_cfg::Cfg, BlockId) {
    let mut builder = CfgBuilder::new();
    walk_statement(tree, &mut builder, body);
    let exit = builder.current_block();
    (builder.finish(exit), exit)
}

fn walk_statement<T: Tree>(tree: &T, b: &mut CfgBuilder, node: NodeId) {
    match tree.kind(node).clone() {
        NodeKind::Block(stmts) | NodeKind::Program(stmts) => {
            for s in stmts {
                walk_statement(tree, b, s);
            }
        }

        NodeKind::VarDecl { .. }
        | NodeKind::ExprStmt(_)
        | NodeKind::ClassDecl { .. }
        | NodeKind::FunctionDecl { .. } => {
            b.push_statement(node);
        }

        NodeKind::Return(_) => {
            b.push_statement(node);
            b.ret(Some(node));
        }
        NodeKind::Throw(_) => {
            b.push_statement(node);
            b.throw(node);
        }
        NodeKind::Break(_) => {
            b.push_statement(node);
            b.emit_break();
        }
        NodeKind::Continue(_) => {
            b.push_statement(node);
            b.emit_continue();
        }

        NodeKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            let then_block = b.new_block();
            let else_block = b.new_block();
            let join = b.new_block();
            b.push_statement(condition);
            b.branch(condition, then_block, else_block);

            b.set_current(then_block);
            walk_statement(tree, b, then_branch);
            b.fallthrough_to(join);

            b.set_current(else_block);
            if let Some(alt) = else_branch {
                walk_statement(tree, b, alt);
            }
            b.fallthrough_to(join);

            b.set_current(join);
        }

        NodeKind::While { condition, body } => {
            let header = b.new_block();
            let loop_body = b.new_block();
            let exit = b.new_block();
            b.fallthrough_to(header);

            b.set_current(header);
            b.branch(condition, loop_body, exit);

            b.set_current(loop_body);
            b.enter_loop(exit, header);
            walk_statement(tree, b, body);
            b.exit_loop();
            b.back_edge(b.current_block(), header);

            b.set_current(exit);
        }

        NodeKind::DoWhile { body, condition } => {
            let loop_body = b.new_block();
            let exit = b.new_block();
            b.fallthrough_to(loop_body);

            b.set_current(loop_body);
            b.enter_loop(exit, loop_body);
            walk_statement(tree, b, body);
            b.exit_loop();
            b.branch(condition, loop_body, exit);
            b.back_edge(b.current_block(), loop_body);

            b.set_current(exit);
        }

        NodeKind::For {
            init,
            condition,
            update,
            body,
        } => {
            if let Some(init) = init {
                b.push_statement(init);
            }
            let header = b.new_block();
            let loop_body = b.new_block();
            let exit = b.new_block();
            b.fallthrough_to(header);

            b.set_current(header);
            match condition {
                Some(cond) => b.branch(cond, loop_body, exit),
                None => b.fallthrough_to(loop_body),
            }

            b.set_current(loop_body);
            b.enter_loop(exit, header);
            walk_statement(tree, b, body);
            if let Some(update) = update {
                b.push_statement(update);
            }
            b.exit_loop();
            b.back_edge(b.current_block(), header);

            b.set_current(exit);
        }

        NodeKind::ForOf {
            decl_name,
            iterable,
            body,
        }
        | NodeKind::ForIn {
            decl_name,
            object: iterable,
            body,
        } => {
            let _ = decl_name;
            // Push the loop node itself (not the bare identifier) so
            // `transfer_statement` can bind the loop variable to the
            // iterable's element type rather than losing that link.
            b.push_statement(node);
            let header = b.new_block();
            let loop_body = b.new_block();
            let exit = b.new_block();
            b.fallthrough_to(header);

            b.set_current(header);
            b.branch(iterable, loop_body, exit);

            b.set_current(loop_body);
            b.enter_loop(exit, header);
            walk_statement(tree, b, body);
            b.exit_loop();
            b.back_edge(b.current_block(), header);

            b.set_current(exit);
        }

        NodeKind::Switch {
            discriminant,
            cases,
        } => {
            b.push_statement(discriminant);
            let exit = b.new_block();
            b.enter_loop(exit, exit); // `break` inside a `switch` targets the exit too.

            let mut case_blocks = Vec::with_capacity(cases.len());
            for (test, _) in &cases {
                let block = b.new_block();
                case_blocks.push((*test, block));
            }
            let entry = b.current_block();
            for &(test, block) in &case_blocks {
                b.add_edge(entry, block, EdgeKind::Normal, test);
            }

            for (i, (_, stmts)) in cases.into_iter().enumerate() {
                b.set_current(case_blocks[i].1);
                for s in stmts {
                    walk_statement(tree, b, s);
                }
                // A case ending in `break`/`return`/`throw` already has a
                // terminator (and its own edge out); only wire an implicit
                // fallthrough when the case actually fell off the end.
                if !b.current_has_terminator() {
                    let fallthrough_target = case_blocks.get(i + 1).map(|(_, id)| *id).unwrap_or(exit);
                    b.fallthrough_to(fallthrough_target);
                }
            }

            b.exit_loop();
            b.set_current(exit);
        }

        NodeKind::TryStmt {
            block,
            catch_param,
            catch_block,
            finally_block,
        } => {
            let try_block = b.new_block();
            let after = b.new_block();
            b.fallthrough_to(try_block);

            b.set_current(try_block);
            walk_statement(tree, b, block);
            let try_exit = b.current_block();

            if let Some(catch) = catch_block {
                let catch_entry = b.new_block();
                b.add_edge(try_block, catch_entry, EdgeKind::Exception, None);
                b.set_current(catch_entry);
                if let Some(param) = catch_param {
                    b.push_statement(param);
                }
                walk_statement(tree, b, catch);
                b.fallthrough_to(after);
            }

            b.set_current(try_exit);
            b.fallthrough_to(after);

            b.set_current(after);
            if let Some(fin) = finally_block {
                walk_statement(tree, b, fin);
            }
        }

        NodeKind::Labeled { body, .. } => walk_statement(tree, b, body),

        // Bare expressions used as statement positions in some call sites
        // (e.g. the discriminant already pushed explicitly above); anything
        // else just gets recorded for the analyzer to type and move on.
        _ => b.push_statement(node),
    }
}
