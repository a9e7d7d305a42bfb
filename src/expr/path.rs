//! 内置路径表达式引擎
//!
//! 支持字面量、成员路径 `a.b[0]`、`!`、比较、`&&` / `||` 与三元表达式，
//! 覆盖页面绑定中绝大多数写法，不需要启动脚本引擎。

use super::{json_to_string, Binding, ExpressionContext, ExpressionEvaluator, Value};
use crate::error::EvalError;
use serde_json::Value as JsonValue;

/// 路径表达式求值器
#[derive(Debug, Clone, Copy, Default)]
pub struct PathEvaluator;

impl ExpressionEvaluator for PathEvaluator {
    fn evaluate(&self, expr: &str, ctx: &ExpressionContext) -> Result<Value, EvalError> {
        let tokens = tokenize(expr)?;
        let mut parser = Parser { tokens, pos: 0 };
        let ast = parser.parse_expr()?;
        if parser.pos < parser.tokens.len() {
            return Err(EvalError::Syntax(format!(
                "unexpected `{}` in `{}`",
                parser.tokens[parser.pos],
                expr
            )));
        }
        eval(&ast, ctx)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Num(f64),
    Op(&'static str),
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Ident(s) => write!(f, "{}", s),
            Token::Str(s) => write!(f, "'{}'", s),
            Token::Num(n) => write!(f, "{}", n),
            Token::Op(op) => write!(f, "{}", op),
        }
    }
}

// 长运算符在前，保证最长匹配
const OPERATORS: &[&str] = &[
    "===", "!==", "==", "!=", ">=", "<=", "&&", "||", "?.", ">", "<", "!", "?", ":", ".", "[",
    "]", "(", ")", "-",
];

fn tokenize(expr: &str) -> Result<Vec<Token>, EvalError> {
    let chars: Vec<char> = expr.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    'outer: while pos < chars.len() {
        let c = chars[pos];
        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        if c == '\'' || c == '"' {
            let mut s = String::new();
            pos += 1;
            loop {
                match chars.get(pos) {
                    None => return Err(EvalError::Syntax(format!("unterminated string in `{}`", expr))),
                    Some(&q) if q == c => break,
                    Some('\\') => {
                        if let Some(&escaped) = chars.get(pos + 1) {
                            s.push(match escaped {
                                'n' => '\n',
                                't' => '\t',
                                other => other,
                            });
                        }
                        pos += 2;
                    }
                    Some(&other) => {
                        s.push(other);
                        pos += 1;
                    }
                }
            }
            pos += 1;
            tokens.push(Token::Str(s));
            continue;
        }

        if c.is_ascii_digit() {
            let start = pos;
            while pos < chars.len() && (chars[pos].is_ascii_digit() || chars[pos] == '.') {
                pos += 1;
            }
            let text: String = chars[start..pos].iter().collect();
            let n = text
                .parse::<f64>()
                .map_err(|_| EvalError::Syntax(format!("invalid number `{}`", text)))?;
            tokens.push(Token::Num(n));
            continue;
        }

        if c.is_alphabetic() || c == '_' || c == '$' {
            let start = pos;
            while pos < chars.len() && (chars[pos].is_alphanumeric() || chars[pos] == '_' || chars[pos] == '$') {
                pos += 1;
            }
            tokens.push(Token::Ident(chars[start..pos].iter().collect()));
            continue;
        }

        for op in OPERATORS {
            let len = op.chars().count();
            if pos + len <= chars.len() && chars[pos..pos + len].iter().copied().eq(op.chars()) {
                tokens.push(Token::Op(op));
                pos += len;
                continue 'outer;
            }
        }

        return Err(EvalError::Syntax(format!("unexpected character `{}` in `{}`", c, expr)));
    }

    Ok(tokens)
}

#[derive(Debug, Clone)]
enum Ast {
    Literal(Value),
    Ident(String),
    Member(Box<Ast>, Box<Ast>),
    Not(Box<Ast>),
    Neg(Box<Ast>),
    Binary(&'static str, Box<Ast>, Box<Ast>),
    Ternary(Box<Ast>, Box<Ast>, Box<Ast>),
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek_op(&self) -> Option<&'static str> {
        match self.tokens.get(self.pos) {
            Some(Token::Op(op)) => Some(*op),
            _ => None,
        }
    }

    fn eat(&mut self, op: &str) -> bool {
        if self.peek_op() == Some(op) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, op: &str) -> Result<(), EvalError> {
        if self.eat(op) {
            Ok(())
        } else {
            Err(EvalError::Syntax(format!("expected `{}`", op)))
        }
    }

    fn parse_expr(&mut self) -> Result<Ast, EvalError> {
        let cond = self.parse_or()?;
        if self.eat("?") {
            let then = self.parse_expr()?;
            self.expect(":")?;
            let otherwise = self.parse_expr()?;
            return Ok(Ast::Ternary(Box::new(cond), Box::new(then), Box::new(otherwise)));
        }
        Ok(cond)
    }

    fn parse_or(&mut self) -> Result<Ast, EvalError> {
        let mut left = self.parse_and()?;
        while self.eat("||") {
            let right = self.parse_and()?;
            left = Ast::Binary("||", Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Ast, EvalError> {
        let mut left = self.parse_cmp()?;
        while self.eat("&&") {
            let right = self.parse_cmp()?;
            left = Ast::Binary("&&", Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_cmp(&mut self) -> Result<Ast, EvalError> {
        let left = self.parse_unary()?;
        if let Some(op) = self.peek_op() {
            if matches!(op, "===" | "!==" | "==" | "!=" | ">=" | "<=" | ">" | "<") {
                self.pos += 1;
                let right = self.parse_unary()?;
                return Ok(Ast::Binary(op, Box::new(left), Box::new(right)));
            }
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Ast, EvalError> {
        if self.eat("!") {
            return Ok(Ast::Not(Box::new(self.parse_unary()?)));
        }
        if self.eat("-") {
            return Ok(Ast::Neg(Box::new(self.parse_unary()?)));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Ast, EvalError> {
        let mut target = self.parse_primary()?;
        loop {
            if self.eat(".") || self.eat("?.") {
                match self.tokens.get(self.pos).cloned() {
                    Some(Token::Ident(name)) => {
                        self.pos += 1;
                        let key = Ast::Literal(Value::Json(JsonValue::String(name)));
                        target = Ast::Member(Box::new(target), Box::new(key));
                    }
                    _ => return Err(EvalError::Syntax("expected property name after `.`".into())),
                }
            } else if self.eat("[") {
                let key = self.parse_expr()?;
                self.expect("]")?;
                target = Ast::Member(Box::new(target), Box::new(key));
            } else {
                return Ok(target);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Ast, EvalError> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| EvalError::Syntax("unexpected end of expression".into()))?;
        self.pos += 1;

        match token {
            Token::Num(n) => Ok(Ast::Literal(Value::Json(number(n)))),
            Token::Str(s) => Ok(Ast::Literal(Value::Json(JsonValue::String(s)))),
            Token::Ident(name) => Ok(match name.as_str() {
                "true" => Ast::Literal(Value::Json(JsonValue::Bool(true))),
                "false" => Ast::Literal(Value::Json(JsonValue::Bool(false))),
                "null" => Ast::Literal(Value::Json(JsonValue::Null)),
                "undefined" => Ast::Literal(Value::Undefined),
                _ => Ast::Ident(name),
            }),
            Token::Op("(") => {
                let inner = self.parse_expr()?;
                self.expect(")")?;
                Ok(inner)
            }
            Token::Op(op) => Err(EvalError::Syntax(format!("unexpected `{}`", op))),
        }
    }
}

fn number(n: f64) -> JsonValue {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        JsonValue::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null)
    }
}

fn eval(ast: &Ast, ctx: &ExpressionContext) -> Result<Value, EvalError> {
    match ast {
        Ast::Literal(v) => Ok(v.clone()),
        Ast::Ident(name) => match ctx.lookup(name) {
            Some(Binding::Value(v)) => Ok(Value::Json(v.clone())),
            Some(Binding::Pending) => Ok(Value::Undefined),
            Some(Binding::Error(message)) => Err(EvalError::DataSource {
                id: name.clone(),
                message: message.clone(),
            }),
            None => Err(EvalError::UnresolvedReference(name.clone())),
        },
        Ast::Member(target, key) => {
            let target = eval(target, ctx)?;
            let key = eval(key, ctx)?;
            Ok(member(&target, &key))
        }
        Ast::Not(inner) => Ok(Value::Json(JsonValue::Bool(!eval(inner, ctx)?.is_truthy()))),
        Ast::Neg(inner) => Ok(Value::Json(number(-to_number(&eval(inner, ctx)?)))),
        Ast::Ternary(cond, then, otherwise) => {
            if eval(cond, ctx)?.is_truthy() {
                eval(then, ctx)
            } else {
                eval(otherwise, ctx)
            }
        }
        Ast::Binary("&&", left, right) => {
            let l = eval(left, ctx)?;
            if l.is_truthy() { eval(right, ctx) } else { Ok(l) }
        }
        Ast::Binary("||", left, right) => {
            let l = eval(left, ctx)?;
            if l.is_truthy() { Ok(l) } else { eval(right, ctx) }
        }
        Ast::Binary(op, left, right) => {
            let l = eval(left, ctx)?;
            let r = eval(right, ctx)?;
            let result = match *op {
                "===" => strict_equals(&l, &r),
                "!==" => !strict_equals(&l, &r),
                "==" => loose_equals(&l, &r),
                "!=" => !loose_equals(&l, &r),
                ">" => to_number(&l) > to_number(&r),
                "<" => to_number(&l) < to_number(&r),
                ">=" => to_number(&l) >= to_number(&r),
                "<=" => to_number(&l) <= to_number(&r),
                other => return Err(EvalError::Syntax(format!("unsupported operator `{}`", other))),
            };
            Ok(Value::Json(JsonValue::Bool(result)))
        }
    }
}

/// 成员访问，缺失的键得到 undefined
fn member(target: &Value, key: &Value) -> Value {
    let Some(target) = target.as_json() else {
        return Value::Undefined;
    };
    let key_str = key.to_display_string();

    let found = match target {
        JsonValue::Object(obj) => obj.get(&key_str).cloned(),
        JsonValue::Array(arr) if key_str == "length" => Some(JsonValue::from(arr.len())),
        JsonValue::Array(arr) => key_str.parse::<usize>().ok().and_then(|i| arr.get(i).cloned()),
        JsonValue::String(s) if key_str == "length" => Some(JsonValue::from(s.chars().count())),
        _ => None,
    };
    found.map(Value::Json).unwrap_or(Value::Undefined)
}

fn to_number(value: &Value) -> f64 {
    match value {
        Value::Undefined => f64::NAN,
        Value::Json(JsonValue::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Value::Json(JsonValue::Bool(b)) => if *b { 1.0 } else { 0.0 },
        Value::Json(JsonValue::Null) => 0.0,
        Value::Json(JsonValue::String(s)) if s.trim().is_empty() => 0.0,
        Value::Json(JsonValue::String(s)) => s.trim().parse().unwrap_or(f64::NAN),
        Value::Json(_) => f64::NAN,
    }
}

fn strict_equals(l: &Value, r: &Value) -> bool {
    match (l, r) {
        (Value::Undefined, Value::Undefined) => true,
        (Value::Json(JsonValue::Number(a)), Value::Json(JsonValue::Number(b))) => a.as_f64() == b.as_f64(),
        (Value::Json(a), Value::Json(b)) => a == b,
        _ => false,
    }
}

fn loose_equals(l: &Value, r: &Value) -> bool {
    let nullish = |v: &Value| matches!(v, Value::Undefined | Value::Json(JsonValue::Null));
    if nullish(l) || nullish(r) {
        return nullish(l) && nullish(r);
    }
    match (l, r) {
        (Value::Json(JsonValue::String(a)), Value::Json(JsonValue::String(b))) => a == b,
        (Value::Json(a @ (JsonValue::Object(_) | JsonValue::Array(_))), Value::Json(b)) => a == b,
        (Value::Json(a), Value::Json(b)) => {
            let (x, y) = (to_number(l), to_number(r));
            if x.is_nan() || y.is_nan() {
                json_to_string(a) == json_to_string(b)
            } else {
                x == y
            }
        }
        _ => false,
    }
}
