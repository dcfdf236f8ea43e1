// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Parser for the Lyra language.
//!
//! Transforms a token stream into an abstract syntax tree.

mod hints;
mod parser;

use lyra_ast::decl::Program;
use lyra_ast::FileId;
use lyra_lexer::{LexError, Lexer};

pub use parser::{ParseError, Parser};

/// Lexing or parsing failure for one source file.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SyntaxError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Lex and parse a whole source file, stopping at the first error.
pub fn parse_program(source: &str, file: FileId) -> Result<Program, SyntaxError> {
    let tokens = Lexer::new(source).with_file(file).tokenize().into_result()?;
    Ok(Parser::new(tokens).parse()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyra_ast::decl::{DeclKind, Member};
    use lyra_ast::expr::{BinOp, ExprKind, LambdaBody, Literal};
    use lyra_ast::stmt::{ElseBranch, StmtKind};
    use lyra_ast::ty::TypeRefKind;

    fn parse(src: &str) -> Program {
        match parse_program(src, FileId(0)) {
            Ok(p) => p,
            Err(e) => panic!("parse failed: {}", e),
        }
    }

    fn parse_err(src: &str) -> String {
        match parse_program(src, FileId(0)) {
            Ok(_) => panic!("expected a parse error for {:?}", src),
            Err(e) => e.to_string(),
        }
    }

    fn first_stmt(src: &str) -> StmtKind {
        match parse(src).decls.into_iter().next().map(|d| d.kind) {
            Some(DeclKind::Stmt(s)) => s.kind,
            other => panic!("expected a statement, got {:?}", other),
        }
    }

    #[test]
    fn parse_native_and_file_imports() {
        let program = parse("import System, Assert;\nimport { Box, Pair } from \"./lib.lyra\";");
        let imports: Vec<_> = program.imports().collect();
        assert_eq!(imports.len(), 2);
        assert_eq!(imports[0].names, vec!["System", "Assert"]);
        assert!(imports[0].from.is_none());
        assert_eq!(imports[1].names, vec!["Box", "Pair"]);
        assert_eq!(imports[1].from.as_deref(), Some("./lib.lyra"));
    }

    #[test]
    fn parse_class_with_members() {
        let program = parse(
            "@entity open class Box<T> extends Base implements Iterable<T>, Named {
                private value: T;
                public static count: number = 0;
                constructor(value: T) { this.value = value; }
                public get(): T { return value; }
                size(): number;
            }",
        );
        let class = program.classes().next().unwrap();
        assert_eq!(class.name, "Box");
        assert_eq!(class.annotations[0].name, "entity");
        assert!(class.modifiers.open);
        assert_eq!(class.type_params, vec!["T"]);
        assert_eq!(class.superclass.as_deref(), Some("Base"));
        assert_eq!(class.implements.len(), 2);
        assert_eq!(class.fields().count(), 2);
        assert!(class.constructor().is_some());
        let methods: Vec<_> = class.methods().collect();
        assert_eq!(methods.len(), 2);
        assert!(methods[0].body.is_some());
        assert!(methods[1].body.is_none());
        let count = class.fields().find(|f| f.name == "count").unwrap();
        assert!(count.modifiers.is_static && count.modifiers.public);
    }

    #[test]
    fn parse_interface() {
        let program = parse(
            "interface Shape extends Named, Sized {
                static SIDES: number = 0;
                area(): number;
                scale<U>(by: U): Shape;
            }",
        );
        let iface = program.interfaces().next().unwrap();
        assert_eq!(iface.extends, vec!["Named", "Sized"]);
        assert_eq!(iface.methods().count(), 2);
        assert_eq!(iface.methods().nth(1).unwrap().type_params, vec!["U"]);
    }

    #[test]
    fn interface_rules_are_enforced() {
        assert!(parse_err("interface I { x: number; }").contains("must be static"));
        assert!(parse_err("interface I { m(): void { } }").contains("cannot have a body"));
    }

    #[test]
    fn duplicate_modifier_is_rejected() {
        assert!(parse_err("class A { public public x: number; }").contains("Duplicate modifier 'public'"));
    }

    #[test]
    fn second_constructor_is_rejected() {
        let msg = parse_err("class A { constructor() { } constructor(x) { } }");
        assert!(msg.contains("more than one constructor"));
    }

    #[test]
    fn precedence_and_assignment() {
        let StmtKind::Expr(expr) = first_stmt("x = 1 + 2 * 3;") else { panic!() };
        let ExprKind::Assign { value, .. } = expr.kind else { panic!("expected assignment") };
        let ExprKind::Binary { op, right, .. } = value.kind else { panic!() };
        assert_eq!(op, BinOp::Add);
        assert!(matches!(right.kind, ExprKind::Binary { op: BinOp::Mul, .. }));
    }

    #[test]
    fn unary_minus_desugars_to_subtraction() {
        let StmtKind::Let { init: Some(init), .. } = first_stmt("let n = -4;") else { panic!() };
        let ExprKind::Binary { op, left, .. } = init.kind else { panic!() };
        assert_eq!(op, BinOp::Sub);
        assert_eq!(left.kind, ExprKind::Literal(Literal::Number(0.0)));
    }

    #[test]
    fn invalid_assignment_target() {
        assert!(parse_err("1 = 2;").contains("Invalid assignment target"));
    }

    #[test]
    fn parse_types() {
        let StmtKind::Let { ty: Some(ty), .. } = first_stmt("let f: (number, string?) -> Array<number>?;")
        else {
            panic!()
        };
        let TypeRefKind::Function { params, ret } = ty.kind else { panic!() };
        assert_eq!(params.len(), 2);
        assert!(params[1].nullable);
        assert!(ret.nullable);
        assert_eq!(ret.to_string(), "Array<number>?");
    }

    #[test]
    fn parse_lambdas() {
        let StmtKind::Let { init: Some(init), .. } = first_stmt("let inc = (x: number): number => x + 1;")
        else {
            panic!()
        };
        let ExprKind::Lambda(lambda) = init.kind else { panic!("expected lambda") };
        assert_eq!(lambda.params.len(), 1);
        assert!(lambda.ret.is_some());
        assert!(matches!(lambda.body, LambdaBody::Expr(_)));

        let StmtKind::Let { init: Some(init), .. } = first_stmt("let f = () => { return 1; };") else {
            panic!()
        };
        let ExprKind::Lambda(lambda) = init.kind else { panic!() };
        assert!(matches!(lambda.body, LambdaBody::Block(ref b) if b.len() == 1));

        // Plain parentheses are still grouping.
        let StmtKind::Expr(e) = first_stmt("(1 + 2) * 3;") else { panic!() };
        assert!(matches!(e.kind, ExprKind::Binary { op: BinOp::Mul, .. }));
    }

    #[test]
    fn parse_control_flow() {
        let StmtKind::If(stmt) = first_stmt("if (a) { } else if (b) { x; } else { y; }") else {
            panic!()
        };
        let Some(ElseBranch::If(nested)) = stmt.else_branch else { panic!() };
        assert!(matches!(nested.else_branch, Some(ElseBranch::Block(_))));

        let StmtKind::Match { cases, .. } = first_stmt("match (x) { case 1 { } case 2 { } default { } }")
        else {
            panic!()
        };
        assert_eq!(cases.len(), 3);
        assert!(cases[2].test.is_none());
        assert!(parse_err("match (x) { default { } default { } }").contains("more than one default"));

        let StmtKind::Foreach { binding, body, .. } = first_stmt("foreach (item in items) { print(item); }")
        else {
            panic!()
        };
        assert_eq!(binding, "item");
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn parse_calls_members_and_new() {
        let StmtKind::Expr(e) = first_stmt("new Box<number>(1).get().value[0];") else { panic!() };
        let ExprKind::Index { object, .. } = e.kind else { panic!("expected index") };
        let ExprKind::Member { object, property } = object.kind else { panic!() };
        assert_eq!(property, "value");
        let ExprKind::Call { callee, .. } = object.kind else { panic!() };
        let ExprKind::Member { object, .. } = callee.kind else { panic!() };
        assert!(matches!(object.kind, ExprKind::New { .. }));
    }

    #[test]
    fn keyword_member_names() {
        let StmtKind::Expr(e) = first_stmt("Assert.default();") else { panic!() };
        let ExprKind::Call { callee, .. } = e.kind else { panic!() };
        assert!(matches!(callee.kind, ExprKind::Member { ref property, .. } if property == "default"));
    }

    #[test]
    fn spans_carry_the_file() {
        let program = parse_program("let x = 1;", FileId(7)).unwrap();
        assert_eq!(program.file, FileId(7));
        assert_eq!(program.decls[0].span.file, FileId(7));
        assert_eq!(program.decls[0].span.end, 10);
    }

    #[test]
    fn stray_modifier_at_top_level() {
        assert!(parse_err("public let x = 1;").contains("Expected 'class' or 'interface'"));
    }

    #[test]
    fn class_members_must_be_fields_or_methods() {
        let program = parse("class P { x; y: number; }");
        let class = program.classes().next().unwrap();
        assert!(class.members.iter().all(|m| matches!(m, Member::Field(_))));
        assert!(parse_err("class P { x + 1; }").contains("Invalid class member"));
    }
}
