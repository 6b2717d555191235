//! Stack visualizer: infix to postfix (shunting-yard) and postfix
//! evaluation over integers.
//!
//! Supported: non-negative integer literals, `+ - * / ^` and parentheses.
//! `^` binds tightest and is right-associative; `/` truncates toward zero.

use std::fmt;

use algoviz_player_core::{FrameRecorder, FrameSequence};
use serde::{Deserialize, Serialize};

use crate::error::GenerateError;
use crate::limits::GeneratorLimits;
use crate::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token {
    Num(i64),
    Op(char),
    Open,
    Close,
}

impl Token {
    fn precedence(op: char) -> u8 {
        match op {
            '^' => 3,
            '*' | '/' => 2,
            _ => 1,
        }
    }

    fn right_assoc(op: char) -> bool {
        op == '^'
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Op(c) => write!(f, "{c}"),
            Self::Open => f.write_str("("),
            Self::Close => f.write_str(")"),
        }
    }
}

fn tokenize(expr: &str) -> Result<Vec<Token>> {
    let max = GeneratorLimits::default().max_expression_len;
    let len = expr.chars().count();
    if len > max {
        return Err(GenerateError::too_large("expression", len, max));
    }
    if expr.trim().is_empty() {
        return Err(GenerateError::empty("expression"));
    }

    let mut tokens = Vec::new();
    let mut chars = expr.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '0'..='9' => {
                let mut n = i64::from(c as u8 - b'0');
                while let Some(&(_, d)) = chars.peek() {
                    let Some(digit) = d.to_digit(10) else {
                        break;
                    };
                    n = n
                        .checked_mul(10)
                        .and_then(|n| n.checked_add(i64::from(digit)))
                        .ok_or_else(|| {
                            GenerateError::malformed(format!("number at position {i} is too large"))
                        })?;
                    chars.next();
                }
                tokens.push(Token::Num(n));
            }
            '+' | '-' | '*' | '/' | '^' => tokens.push(Token::Op(c)),
            '(' => tokens.push(Token::Open),
            ')' => tokens.push(Token::Close),
            other => {
                return Err(GenerateError::malformed(format!(
                    "unknown token '{other}' at position {i}"
                )))
            }
        }
    }
    Ok(tokens)
}

/// Operands and operators must alternate, starting and ending on an operand.
fn check_infix(tokens: &[Token]) -> Result<()> {
    let mut expect_operand = true;
    let mut depth = 0usize;
    for (i, t) in tokens.iter().enumerate() {
        match (t, expect_operand) {
            (Token::Num(_), true) => expect_operand = false,
            (Token::Open, true) => depth += 1,
            (Token::Op(_), false) => expect_operand = true,
            (Token::Close, false) => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    GenerateError::malformed(format!("unbalanced ')' at token {i}"))
                })?;
            }
            (t, true) => {
                return Err(GenerateError::malformed(format!(
                    "expected a number at token {i}, found '{t}'"
                )))
            }
            (t, false) => {
                return Err(GenerateError::malformed(format!(
                    "expected an operator at token {i}, found '{t}'"
                )))
            }
        }
    }
    if expect_operand {
        return Err(GenerateError::malformed("expression ends without an operand"));
    }
    if depth > 0 {
        return Err(GenerateError::malformed(format!("{depth} unclosed '('")));
    }
    Ok(())
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackSnapshot {
    pub tokens: Vec<String>,
    /// Token being processed.
    pub position: Option<usize>,
    /// Bottom first.
    pub stack: Vec<String>,
    pub output: Vec<String>,
    pub result: Option<i64>,
}

impl StackSnapshot {
    fn new(tokens: &[Token]) -> Self {
        Self {
            tokens: tokens.iter().map(Token::to_string).collect(),
            ..Self::default()
        }
    }
}

/// Shunting-yard conversion. The last frame's `output` is the postfix form.
pub fn infix_to_postfix(expr: &str) -> Result<FrameSequence<StackSnapshot>> {
    let tokens = tokenize(expr)?;
    check_infix(&tokens)?;

    let mut s = StackSnapshot::new(&tokens);
    let mut rec = FrameRecorder::new();
    let mut ops: Vec<Token> = Vec::new();
    rec.record(&s, format!("Convert {} to postfix", s.tokens.join(" ")));

    let sync = |s: &mut StackSnapshot, ops: &[Token]| {
        s.stack = ops.iter().map(Token::to_string).collect();
    };

    for (i, &tok) in tokens.iter().enumerate() {
        s.position = Some(i);
        match tok {
            Token::Num(n) => {
                s.output.push(n.to_string());
                rec.record(&s, format!("{n} goes straight to the output"));
            }
            Token::Op(op) => {
                while let Some(&Token::Op(top)) = ops.last() {
                    let (pt, po) = (Token::precedence(top), Token::precedence(op));
                    if pt > po || (pt == po && !Token::right_assoc(op)) {
                        ops.pop();
                        s.output.push(top.to_string());
                        sync(&mut s, &ops);
                        rec.record(&s, format!("Pop {top}: it binds at least as tightly as {op}"));
                    } else {
                        break;
                    }
                }
                ops.push(tok);
                sync(&mut s, &ops);
                rec.record(&s, format!("Push {op}"));
            }
            Token::Open => {
                ops.push(tok);
                sync(&mut s, &ops);
                rec.record(&s, "Push (");
            }
            Token::Close => {
                loop {
                    match ops.pop() {
                        Some(Token::Open) => break,
                        Some(t) => {
                            s.output.push(t.to_string());
                            sync(&mut s, &ops);
                            rec.record(&s, format!("Pop {t} until the matching ("));
                        }
                        None => return Err(GenerateError::malformed("unbalanced ')'")),
                    }
                }
                sync(&mut s, &ops);
                rec.record(&s, "Discard the matching (");
            }
        }
    }

    s.position = None;
    while let Some(t) = ops.pop() {
        if t == Token::Open {
            return Err(GenerateError::malformed("unbalanced '('"));
        }
        s.output.push(t.to_string());
        sync(&mut s, &ops);
        rec.record(&s, format!("Pop the remaining {t}"));
    }
    let postfix = s.output.join(" ");
    rec.record(&s, format!("Postfix: {postfix}"));
    Ok(rec.finish())
}

fn apply(op: char, a: i64, b: i64) -> Result<i64> {
    let overflow = || GenerateError::malformed(format!("{a} {op} {b} overflows"));
    match op {
        '+' => a.checked_add(b).ok_or_else(overflow),
        '-' => a.checked_sub(b).ok_or_else(overflow),
        '*' => a.checked_mul(b).ok_or_else(overflow),
        '/' => {
            if b == 0 {
                return Err(GenerateError::malformed(format!("division by zero in {a} / {b}")));
            }
            a.checked_div(b).ok_or_else(overflow)
        }
        '^' => {
            let exp = u32::try_from(b).map_err(|_| {
                GenerateError::malformed(format!("exponent {b} must be a small non-negative integer"))
            })?;
            a.checked_pow(exp).ok_or_else(overflow)
        }
        _ => Err(GenerateError::malformed(format!("unknown operator '{op}'"))),
    }
}

/// Evaluate a space-separated postfix expression on an operand stack.
pub fn evaluate_postfix(expr: &str) -> Result<FrameSequence<StackSnapshot>> {
    let tokens = tokenize(expr)?;
    if let Some(i) = tokens.iter().position(|t| matches!(t, Token::Open | Token::Close)) {
        return Err(GenerateError::malformed(format!(
            "parenthesis at token {i} has no meaning in postfix"
        )));
    }

    let mut s = StackSnapshot::new(&tokens);
    let mut rec = FrameRecorder::new();
    let mut stack: Vec<i64> = Vec::new();
    rec.record(&s, format!("Evaluate {}", s.tokens.join(" ")));

    for (i, &tok) in tokens.iter().enumerate() {
        s.position = Some(i);
        match tok {
            Token::Num(n) => {
                stack.push(n);
                s.stack = stack.iter().map(i64::to_string).collect();
                rec.record(&s, format!("Push {n}"));
            }
            Token::Op(op) => {
                let (Some(b), Some(a)) = (stack.pop(), stack.pop()) else {
                    return Err(GenerateError::malformed(format!(
                        "stack underflow: '{op}' at token {i} needs two operands"
                    )));
                };
                let v = apply(op, a, b)?;
                stack.push(v);
                s.stack = stack.iter().map(i64::to_string).collect();
                rec.record(&s, format!("Pop {b} and {a}, push {a} {op} {b} = {v}"));
            }
            Token::Open | Token::Close => {}
        }
    }

    s.position = None;
    match stack.as_slice() {
        [v] => {
            s.result = Some(*v);
            rec.record(&s, format!("Result: {v}"));
            Ok(rec.finish())
        }
        _ => Err(GenerateError::malformed(format!(
            "{} operands left on the stack",
            stack.len()
        ))),
    }
}
