// src/expression.rs
use crate::comparison::{compare, loosely_equal};
use crate::context::Context;
use crate::errors::{EvalError, Result};
use crate::functions::Registry;
pub use crate::parser::ParseError;
use crate::parser::Parser;
use crate::values::{as_number, number, to_display, truthy, type_name};
use itertools::Itertools;
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// Limit on AST depth: parentheses, calls, unary operators and every link of
/// a binary operator chain count towards it.
const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub enum ENode {
    Lit(Value),
    Field(String),
    Unary { op: UnaryOp, expr: Box<ENode> },
    Binary { op: BinOp, lhs: Box<ENode>, rhs: Box<ENode> },
    And(Box<ENode>, Box<ENode>),
    Or(Box<ENode>, Box<ENode>),
    Cond { test: Box<ENode>, then: Box<ENode>, otherwise: Box<ENode> },
    Call { name: String, args: Vec<ENode> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Pow => "^",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Lte => "<=",
            BinOp::Gt => ">",
            BinOp::Gte => ">=",
        })
    }
}

impl ENode {
    /// Field references in order of first appearance.
    pub fn referenced_fields(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out.into_iter().unique().collect()
    }

    fn collect_fields(&self, out: &mut Vec<String>) {
        match self {
            ENode::Lit(_) => {}
            ENode::Field(name) => out.push(name.clone()),
            ENode::Unary { expr, .. } => expr.collect_fields(out),
            ENode::Binary { lhs, rhs, .. } | ENode::And(lhs, rhs) | ENode::Or(lhs, rhs) => {
                lhs.collect_fields(out);
                rhs.collect_fields(out);
            }
            ENode::Cond { test, then, otherwise } => {
                test.collect_fields(out);
                then.collect_fields(out);
                otherwise.collect_fields(out);
            }
            ENode::Call { args, .. } => args.iter().for_each(|a| a.collect_fields(out)),
        }
    }
}

pub type EParseErr = ParseError;

pub fn parse_expr(input: &str) -> std::result::Result<ENode, EParseErr> {
    let mut p = EParser::new(input);
    p.skip_ws();
    if p.eof() {
        return Err(EParseErr::InvalidSyntax("empty expression".into()));
    }
    let node = p.parse_conditional()?;
    p.skip_ws();
    if !p.eof() {
        return Err(p.parser.error("trailing input"));
    }
    Ok(node)
}

type PResult<T> = std::result::Result<T, EParseErr>;

struct EParser<'a> {
    parser: Parser<'a>,
    depth: usize,
}

impl<'a> EParser<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            parser: Parser::new(s),
            depth: 0,
        }
    }

    fn descend(&mut self) -> PResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.parser.error("expression nested too deeply"));
        }
        Ok(())
    }

    fn ascend(&mut self, levels: usize) {
        self.depth -= levels;
    }

    fn parse_conditional(&mut self) -> PResult<ENode> {
        self.descend()?;
        let test = self.parse_or()?;
        self.skip_ws();
        let node = if self.parser.consume_char('?') {
            let then = self.parse_conditional()?;
            self.skip_ws();
            self.parser.expect(':')?;
            let otherwise = self.parse_conditional()?;
            ENode::Cond {
                test: Box::new(test),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            }
        } else {
            test
        };
        self.ascend(1);
        Ok(node)
    }

    fn parse_or(&mut self) -> PResult<ENode> {
        let mut left = self.parse_and()?;
        let mut links = 0;
        loop {
            self.skip_ws();
            if self.parser.consume_str("||") {
                self.descend()?;
                links += 1;
                let right = self.parse_and()?;
                left = ENode::Or(Box::new(left), Box::new(right));
            } else {
                break;
            }
        }
        self.ascend(links);
        Ok(left)
    }

    fn parse_and(&mut self) -> PResult<ENode> {
        let mut left = self.parse_compare()?;
        let mut links = 0;
        loop {
            self.skip_ws();
            if self.parser.consume_str("&&") {
                self.descend()?;
                links += 1;
                let right = self.parse_compare()?;
                left = ENode::And(Box::new(left), Box::new(right));
            } else {
                break;
            }
        }
        self.ascend(links);
        Ok(left)
    }

    fn parse_compare(&mut self) -> PResult<ENode> {
        let left = self.parse_sum()?;
        self.skip_ws();
        let op = if self.parser.consume_str("==") {
            BinOp::Eq
        } else if self.parser.consume_str("!=") {
            BinOp::Ne
        } else if self.parser.consume_str("<=") {
            BinOp::Lte
        } else if self.parser.consume_str(">=") {
            BinOp::Gte
        } else if self.parser.consume_char('<') {
            BinOp::Lt
        } else if self.parser.consume_char('>') {
            BinOp::Gt
        } else {
            return Ok(left);
        };
        self.descend()?;
        let right = self.parse_sum()?;
        self.ascend(1);
        Ok(binary(op, left, right))
    }

    fn parse_sum(&mut self) -> PResult<ENode> {
        let mut left = self.parse_product()?;
        let mut links = 0;
        loop {
            self.skip_ws();
            let op = if self.parser.consume_char('+') {
                BinOp::Add
            } else if self.parser.consume_char('-') {
                BinOp::Sub
            } else {
                break;
            };
            self.descend()?;
            links += 1;
            let right = self.parse_product()?;
            left = binary(op, left, right);
        }
        self.ascend(links);
        Ok(left)
    }

    fn parse_product(&mut self) -> PResult<ENode> {
        let mut left = self.parse_unary()?;
        let mut links = 0;
        loop {
            self.skip_ws();
            let op = if self.parser.consume_char('*') {
                BinOp::Mul
            } else if self.parser.consume_char('/') {
                BinOp::Div
            } else if self.parser.consume_char('%') {
                BinOp::Rem
            } else {
                break;
            };
            self.descend()?;
            links += 1;
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
        self.ascend(links);
        Ok(left)
    }

    fn parse_unary(&mut self) -> PResult<ENode> {
        self.skip_ws();
        let op = if self.parser.consume_char('-') {
            Some(UnaryOp::Neg)
        } else if !self.parser.peek_str("!=") && self.parser.consume_char('!') {
            Some(UnaryOp::Not)
        } else {
            self.parser.consume_char('+');
            None
        };
        match op {
            Some(op) => {
                self.descend()?;
                let expr = self.parse_unary()?;
                self.ascend(1);
                Ok(ENode::Unary { op, expr: Box::new(expr) })
            }
            None => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> PResult<ENode> {
        let base = self.parse_primary()?;
        self.skip_ws();
        if self.parser.consume_char('^') {
            // right-associative, binds tighter than unary minus on the left
            self.descend()?;
            let exp = self.parse_unary()?;
            self.ascend(1);
            return Ok(binary(BinOp::Pow, base, exp));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> PResult<ENode> {
        self.skip_ws();
        match self.parser.peek_char() {
            Some('(') => {
                self.parser.consume_char('(');
                let inner = self.parse_conditional()?;
                self.skip_ws();
                self.parser.expect(')')?;
                Ok(inner)
            }
            Some('"') | Some('\'') => Ok(ENode::Lit(Value::String(self.parser.parse_quoted_string()?))),
            Some(c) if c.is_ascii_digit() || c == '.' => Ok(ENode::Lit(self.parser.parse_number_literal()?)),
            Some(c) if c == '_' || c.is_ascii_alphabetic() => self.parse_name(),
            Some(c) => Err(self.parser.error(format!("unexpected '{c}'"))),
            None => Err(self.parser.error("unexpected end of expression")),
        }
    }

    fn parse_name(&mut self) -> PResult<ENode> {
        let name = self.parser.parse_reference()?;
        match name.as_str() {
            "true" => return Ok(ENode::Lit(Value::Bool(true))),
            "false" => return Ok(ENode::Lit(Value::Bool(false))),
            "null" => return Ok(ENode::Lit(Value::Null)),
            _ => {}
        }
        self.skip_ws();
        if !name.contains('.') && self.parser.consume_char('(') {
            self.descend()?;
            let args = self.parse_args()?;
            self.parser.expect(')')?;
            self.ascend(1);
            return Ok(ENode::Call { name, args });
        }
        Ok(ENode::Field(name))
    }

    fn parse_args(&mut self) -> PResult<Vec<ENode>> {
        let mut out = Vec::new();
        self.skip_ws();
        if self.parser.peek_char() == Some(')') {
            return Ok(out);
        }
        loop {
            let node = self.parse_conditional()?;
            out.push(node);
            self.skip_ws();
            if self.parser.consume_char(',') {
                continue;
            }
            break;
        }
        Ok(out)
    }

    fn skip_ws(&mut self) {
        self.parser.skip_ws();
    }

    fn eof(&self) -> bool {
        self.parser.eof()
    }
}

fn binary(op: BinOp, lhs: ENode, rhs: ENode) -> ENode {
    ENode::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
}

/// Evaluate AST node → Value
pub fn eval_ast(node: &ENode, ctx: &Context, registry: &Registry) -> Result<Value> {
    match node {
        ENode::Lit(v) => Ok(v.clone()),
        ENode::Field(name) => ctx.lookup(name).cloned().ok_or_else(|| {
            EvalError::Expression(format!("unknown field `{name}` (not listed in fields)"))
        }),
        ENode::Unary { op: UnaryOp::Not, expr } => {
            Ok(Value::Bool(!truthy(&eval_ast(expr, ctx, registry)?)))
        }
        ENode::Unary { op: UnaryOp::Neg, expr } => {
            let v = eval_ast(expr, ctx, registry)?;
            if let Some(i) = v.as_i64().and_then(i64::checked_neg) {
                return Ok(Value::from(i));
            }
            match as_number(&v) {
                Some(f) => number(-f),
                None => Err(EvalError::Expression(format!("cannot negate {}", type_name(&v)))),
            }
        }
        ENode::And(l, r) => {
            let ok = truthy(&eval_ast(l, ctx, registry)?) && truthy(&eval_ast(r, ctx, registry)?);
            Ok(Value::Bool(ok))
        }
        ENode::Or(l, r) => {
            let ok = truthy(&eval_ast(l, ctx, registry)?) || truthy(&eval_ast(r, ctx, registry)?);
            Ok(Value::Bool(ok))
        }
        ENode::Cond { test, then, otherwise } => {
            if truthy(&eval_ast(test, ctx, registry)?) {
                eval_ast(then, ctx, registry)
            } else {
                eval_ast(otherwise, ctx, registry)
            }
        }
        ENode::Binary { op, lhs, rhs } => {
            let a = eval_ast(lhs, ctx, registry)?;
            let b = eval_ast(rhs, ctx, registry)?;
            apply_binary(*op, &a, &b)
        }
        ENode::Call { name, args } => {
            let func = registry
                .get(name)
                .ok_or_else(|| EvalError::Expression(format!("unknown function `{name}`")))?;
            let arity = func.arity();
            if !arity.contains(&args.len()) {
                return Err(EvalError::Expression(format!(
                    "`{name}` expects {}, got {}",
                    describe_arity(*arity.start(), *arity.end()),
                    args.len()
                )));
            }
            let values = args
                .iter()
                .map(|a| eval_ast(a, ctx, registry))
                .collect::<Result<Vec<_>>>()?;
            func.call(&values)
        }
    }
}

fn describe_arity(min: usize, max: usize) -> String {
    let plural = |n: usize| if n == 1 { "argument" } else { "arguments" };
    if min == max {
        format!("{min} {}", plural(min))
    } else if max == usize::MAX {
        format!("at least {min} {}", plural(min))
    } else {
        format!("{min} to {max} arguments")
    }
}

fn apply_binary(op: BinOp, a: &Value, b: &Value) -> Result<Value> {
    let ordered = |pred: fn(Ordering) -> bool| -> Result<Value> {
        Ok(Value::Bool(compare(a, b).map(pred).unwrap_or(false)))
    };
    match op {
        BinOp::Eq => Ok(Value::Bool(loosely_equal(a, b))),
        BinOp::Ne => Ok(Value::Bool(!loosely_equal(a, b))),
        BinOp::Lt => ordered(Ordering::is_lt),
        BinOp::Lte => ordered(Ordering::is_le),
        BinOp::Gt => ordered(Ordering::is_gt),
        BinOp::Gte => ordered(Ordering::is_ge),
        BinOp::Add if a.is_string() || b.is_string() => {
            Ok(Value::String(format!("{}{}", to_display(a), to_display(b))))
        }
        _ => arithmetic(op, a, b),
    }
}

fn arithmetic(op: BinOp, a: &Value, b: &Value) -> Result<Value> {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        let exact = match op {
            BinOp::Add => x.checked_add(y),
            BinOp::Sub => x.checked_sub(y),
            BinOp::Mul => x.checked_mul(y),
            BinOp::Rem if y == 0 => return Err(division_by_zero()),
            BinOp::Rem => x.checked_rem(y),
            _ => None,
        };
        if let Some(v) = exact {
            return Ok(Value::from(v));
        }
    }
    let operand = |v: &Value| {
        as_number(v).ok_or_else(|| {
            EvalError::Expression(format!("cannot apply `{op}` to {}", type_name(v)))
        })
    };
    let (x, y) = (operand(a)?, operand(b)?);
    let out = match op {
        BinOp::Add => x + y,
        BinOp::Sub => x - y,
        BinOp::Mul => x * y,
        BinOp::Div | BinOp::Rem if y == 0.0 => return Err(division_by_zero()),
        BinOp::Div => x / y,
        BinOp::Rem => x % y,
        BinOp::Pow => x.powf(y),
        _ => return Err(EvalError::Expression(format!("`{op}` is not arithmetic"))),
    };
    number(out)
}

fn division_by_zero() -> EvalError {
    EvalError::Expression("division by zero".into())
}
