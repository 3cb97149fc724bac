//! Operator-precedence expression parsing.
//!
//! A shunting-yard scan turns the infix token stream into a postfix token
//! queue, then a single stack pass assembles the queue into an
//! [`Expression`] tree. Scanning stops at the first token with no
//! expression role (a clause keyword, a top-level comma, end of input) and
//! pushes it back for the clause state machine.

use tracing::trace;

use crate::error::{MiniqlError, MiniqlResult};
use crate::expression::{BinaryOperator, Expression, UnaryOperator};
use crate::lexer::{Token, TokenKind, TokenStream};
use crate::parser::ops;

/// Parse one expression from the stream.
///
/// The terminating token (clause keyword, top-level comma, end of input) is
/// pushed back so the caller sees it on its next read.
pub fn parse_expr(stream: &mut TokenStream) -> MiniqlResult<Expression> {
    let output = scan(stream)?;
    trace!(postfix = ?output.iter().map(|t| t.value.as_str()).collect::<Vec<_>>(), "expression scan");
    assemble(output)
}

/// Shunting-yard scan: infix tokens in, postfix tokens out.
fn scan(stream: &mut TokenStream) -> MiniqlResult<Vec<Token>> {
    let mut output: Vec<Token> = Vec::new();
    let mut stack: Vec<Token> = Vec::new();
    // Tracks whether the next token sits in operand position, which decides
    // star-vs-multiply and unary-vs-binary minus.
    let mut expect_operand = true;

    loop {
        let tk = stream.next();
        match tk.kind {
            TokenKind::Integer | TokenKind::Float | TokenKind::Str => {
                output.push(tk);
                expect_operand = false;
            }

            TokenKind::Identifier => {
                let next = stream.next();
                match next.kind {
                    TokenKind::LeftParen => {
                        // Function application: the marker goes on the
                        // operator stack, its parenthesis is read next.
                        stream.pushback();
                        stack.push(Token::new(TokenKind::Function, tk.value));
                        expect_operand = true;
                    }
                    TokenKind::Dot => {
                        // Qualified name: `t.col` or `t.*`, kept as one
                        // token with the joined spelling.
                        let member = stream.next();
                        match member.kind {
                            TokenKind::Identifier => {
                                output.push(Token::new(
                                    TokenKind::Identifier,
                                    format!("{}.{}", tk.value, member.value),
                                ));
                            }
                            TokenKind::Star => {
                                output.push(Token::new(
                                    TokenKind::Star,
                                    format!("{}.*", tk.value),
                                ));
                            }
                            _ => {
                                return Err(MiniqlError::Parse(format!(
                                    "expecting identifier or \"*\" after \"{}.\", \"{}\" received",
                                    tk.value, member.value
                                )));
                            }
                        }
                        expect_operand = false;
                    }
                    _ => {
                        stream.pushback();
                        output.push(tk);
                        expect_operand = false;
                    }
                }
            }

            TokenKind::Star if expect_operand => {
                // Operand-position star is a wildcard leaf, not multiply.
                output.push(tk);
                expect_operand = false;
            }

            TokenKind::LeftParen => {
                // A function's parenthesis is also emitted to the output
                // queue: it marks where the argument list starts, which is
                // how assembly later counts the arguments.
                if matches!(stack.last(), Some(t) if t.kind == TokenKind::Function) {
                    output.push(tk.clone());
                }
                stack.push(tk);
                expect_operand = true;
            }

            TokenKind::RightParen => {
                loop {
                    match stack.last() {
                        None => return Err(MiniqlError::Parse("unexpected \")\"".to_string())),
                        Some(t) if t.kind == TokenKind::LeftParen => {
                            stack.pop();
                            if matches!(stack.last(), Some(t) if t.kind == TokenKind::Function) {
                                // All arguments are in postfix order now;
                                // record the application itself.
                                if let Some(marker) = stack.pop() {
                                    output.push(marker);
                                }
                            }
                            break;
                        }
                        Some(_) => {
                            if let Some(op) = stack.pop() {
                                output.push(op);
                            }
                        }
                    }
                }
                expect_operand = false;
            }

            TokenKind::Comma => {
                // Inside an argument list the comma separates arguments;
                // outside any parenthesis it belongs to the clause machine.
                if stack.iter().any(|t| t.kind == TokenKind::LeftParen) {
                    while let Some(top) = stack.last() {
                        if top.kind == TokenKind::LeftParen {
                            break;
                        }
                        if let Some(op) = stack.pop() {
                            output.push(op);
                        }
                    }
                    expect_operand = true;
                } else {
                    stream.pushback();
                    break;
                }
            }

            TokenKind::Keyword => {
                let lower = tk.value.to_lowercase();
                if expect_operand && matches!(lower.as_str(), "true" | "false" | "null") {
                    output.push(tk);
                    expect_operand = false;
                } else if lower == "not" {
                    push_operator(
                        Token::new(TokenKind::UnaryOp, lower),
                        &mut stack,
                        &mut output,
                    );
                    expect_operand = true;
                } else if ops::binary(&lower).is_some() {
                    push_operator(Token::new(TokenKind::Op, lower), &mut stack, &mut output);
                    expect_operand = true;
                } else {
                    // Not an operator: the clause machine's keyword.
                    stream.pushback();
                    break;
                }
            }

            TokenKind::Op | TokenKind::Star => {
                let tk = if tk.kind == TokenKind::Star {
                    // Operator-position star is multiplication.
                    Token::new(TokenKind::Op, tk.value)
                } else {
                    tk
                };
                if expect_operand && ops::unary(&tk.value).is_some() {
                    push_operator(
                        Token::new(TokenKind::UnaryOp, tk.value),
                        &mut stack,
                        &mut output,
                    );
                } else if ops::binary(&tk.value).is_some() {
                    push_operator(tk, &mut stack, &mut output);
                } else {
                    stream.pushback();
                    break;
                }
                expect_operand = true;
            }

            TokenKind::Eof
            | TokenKind::Dot
            | TokenKind::Function
            | TokenKind::UnaryOp => {
                stream.pushback();
                break;
            }
        }
    }

    // Flush what is left on the operator stack.
    while let Some(tk) = stack.pop() {
        if tk.kind == TokenKind::LeftParen {
            return Err(MiniqlError::Parse("missing closing \")\"".to_string()));
        }
        output.push(tk);
    }

    Ok(output)
}

/// Push an operator onto the stack, first moving to output every stacked
/// operator it does not bind tighter than. Equal precedence pops only for
/// left-associative operators, which is what makes `**` group rightwards.
fn push_operator(tk: Token, stack: &mut Vec<Token>, output: &mut Vec<Token>) {
    let desc = descriptor(&tk);
    while let Some(top) = stack.last() {
        if top.kind != TokenKind::Op && top.kind != TokenKind::UnaryOp {
            break;
        }
        let top_desc = descriptor(top);
        let pops = if desc.is_left_assoc() {
            desc.precedence <= top_desc.precedence
        } else {
            desc.precedence < top_desc.precedence
        };
        if !pops {
            break;
        }
        if let Some(op) = stack.pop() {
            output.push(op);
        }
    }
    stack.push(tk);
}

fn descriptor(tk: &Token) -> ops::OpDescriptor {
    let desc = match tk.kind {
        TokenKind::UnaryOp => ops::unary(&tk.value),
        _ => ops::binary(&tk.value),
    };
    // Only tokens that resolved against a table are ever stacked.
    desc.unwrap_or(ops::OpDescriptor {
        precedence: 0,
        assoc: ops::Assoc::Left,
    })
}

/// One slot of the assembly stack: either a finished subtree or the marker
/// a function's argument list starts at.
enum StackEntry {
    ArgBoundary,
    Node(Expression),
}

/// Assemble a postfix token queue into an expression tree.
fn assemble(output: Vec<Token>) -> MiniqlResult<Expression> {
    let mut stack: Vec<StackEntry> = Vec::new();

    for tk in output {
        match tk.kind {
            TokenKind::Integer => {
                let n: i64 = tk
                    .value
                    .parse()
                    .map_err(|_| MiniqlError::Parse(format!("invalid integer: {}", tk.value)))?;
                stack.push(StackEntry::Node(Expression::Literal(n.into())));
            }

            TokenKind::Float => {
                let n: f64 = tk
                    .value
                    .parse()
                    .map_err(|_| MiniqlError::Parse(format!("invalid float: {}", tk.value)))?;
                stack.push(StackEntry::Node(Expression::Literal(
                    serde_json::Number::from_f64(n)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null),
                )));
            }

            TokenKind::Str => {
                stack.push(StackEntry::Node(Expression::Literal(tk.value.into())));
            }

            TokenKind::Keyword => {
                let literal = match tk.value.to_lowercase().as_str() {
                    "true" => serde_json::Value::Bool(true),
                    "false" => serde_json::Value::Bool(false),
                    "null" => serde_json::Value::Null,
                    other => {
                        return Err(MiniqlError::Parse(format!(
                            "unexpected keyword \"{}\" in expression",
                            other
                        )))
                    }
                };
                stack.push(StackEntry::Node(Expression::Literal(literal)));
            }

            TokenKind::Identifier => {
                let expr = match tk.value.split_once('.') {
                    Some((table, name)) => Expression::Column {
                        table: Some(table.to_string()),
                        name: name.to_string(),
                    },
                    None => Expression::Column {
                        table: None,
                        name: tk.value,
                    },
                };
                stack.push(StackEntry::Node(expr));
            }

            TokenKind::Star => {
                let table = tk.value.strip_suffix(".*").map(|t| t.to_string());
                stack.push(StackEntry::Node(Expression::Wildcard { table }));
            }

            TokenKind::LeftParen => stack.push(StackEntry::ArgBoundary),

            TokenKind::Function => {
                let mut args = Vec::new();
                loop {
                    match stack.pop() {
                        Some(StackEntry::ArgBoundary) => break,
                        Some(StackEntry::Node(expr)) => args.push(expr),
                        None => {
                            return Err(MiniqlError::Parse(format!(
                                "malformed argument list for function \"{}\"",
                                tk.value
                            )))
                        }
                    }
                }
                args.reverse();
                stack.push(StackEntry::Node(Expression::FunctionCall {
                    name: tk.value,
                    args,
                }));
            }

            TokenKind::Op => {
                let op = BinaryOperator::from_symbol(&tk.value).ok_or_else(|| {
                    MiniqlError::Parse(format!("unknown operator \"{}\"", tk.value))
                })?;
                let right = pop_node(&mut stack, &tk.value)?;
                let left = pop_node(&mut stack, &tk.value)?;
                stack.push(StackEntry::Node(Expression::BinaryOp {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                }));
            }

            TokenKind::UnaryOp => {
                let op = UnaryOperator::from_symbol(&tk.value).ok_or_else(|| {
                    MiniqlError::Parse(format!("unknown operator \"{}\"", tk.value))
                })?;
                let operand = pop_node(&mut stack, &tk.value)?;
                stack.push(StackEntry::Node(Expression::UnaryOp {
                    op,
                    operand: Box::new(operand),
                }));
            }

            TokenKind::Dot | TokenKind::Comma | TokenKind::RightParen | TokenKind::Eof => {
                return Err(MiniqlError::Parse(format!(
                    "unexpected token \"{}\" in expression",
                    tk.value
                )))
            }
        }
    }

    match (stack.pop(), stack.is_empty()) {
        (Some(StackEntry::Node(expr)), true) => Ok(expr),
        _ => Err(MiniqlError::Parse("malformed expression".to_string())),
    }
}

fn pop_node(stack: &mut Vec<StackEntry>, op: &str) -> MiniqlResult<Expression> {
    match stack.pop() {
        Some(StackEntry::Node(expr)) => Ok(expr),
        _ => Err(MiniqlError::Parse(format!(
            "missing operand for operator \"{}\"",
            op
        ))),
    }
}
