// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error hints - suggestions for fixing common mistakes.

use lyra_ast::token::TokenKind;

/// Get a hint for an "expected X" error based on what was found instead.
pub fn for_expected(expected: &str, found: &TokenKind) -> Option<&'static str> {
    match (expected, found) {
        ("';'", TokenKind::Eof) => Some("the last statement is missing its ';'"),
        ("';'", _) => Some("statements and field declarations end with ';'"),

        ("'{'", _) => Some("blocks start with '{'"),
        ("'}'", TokenKind::Eof) => Some("every '{' needs a matching '}'"),

        ("')'", TokenKind::Eof) => Some("add ')' to close the parenthesis"),
        ("']'", TokenKind::Eof) => Some("add ']' to close the bracket"),
        ("'>'", _) => Some("close the type argument list with '>'"),
        ("'->'", _) => Some("function types are written `(A, B) -> R`"),
        ("'=>'", _) => Some("lambdas are written `(x: number): number => x + 1`"),

        ("expression", TokenKind::Semi) => Some("statement is incomplete"),
        ("expression", TokenKind::Eq) => Some("put the value after '='"),
        ("expression", _) => Some("try a value, variable, or call"),

        ("a name", TokenKind::Number(_)) => Some("names can't start with a number"),
        ("a name", k) if k.keyword_text().is_some() => Some("keywords can't be used as names"),
        ("a name", _) => Some("names start with a letter or '_'"),

        ("a string", _) => Some("import paths are quoted: from \"./lib.lyra\""),
        ("'from'", _) => Some("brace imports need a source: import { A } from \"./a.lyra\";"),
        ("'class' or 'interface'", _) => Some("annotations and modifiers only apply to classes, interfaces and members"),
        ("'case' or 'default'", _) => Some("match arms are `case value { }` or `default { }`"),

        _ => None,
    }
}
