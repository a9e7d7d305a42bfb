//! 模板切分 - 处理 `${}` 插值

use crate::error::EvalError;

/// 模板片段
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Text(String),
    Expr(String),
}

/// 解析后的表达式源码
#[derive(Debug, Clone, PartialEq)]
pub enum Template {
    /// 单个表达式，结果保持原始类型
    Expr(String),
    /// 文本与表达式混合，结果拼接为字符串
    Interpolated(Vec<Segment>),
}

impl Template {
    pub fn parse(source: &str) -> Result<Template, EvalError> {
        if !source.contains("${") {
            return Ok(Template::Expr(source.trim().to_string()));
        }

        let segments = split_segments(source)?;
        if let [Segment::Expr(expr)] = segments.as_slice() {
            return Ok(Template::Expr(expr.clone()));
        }
        Ok(Template::Interpolated(segments))
    }

    /// 所有表达式片段
    pub fn expressions(&self) -> Vec<&str> {
        match self {
            Template::Expr(e) => vec![e.as_str()],
            Template::Interpolated(segments) => segments
                .iter()
                .filter_map(|s| match s {
                    Segment::Expr(e) => Some(e.as_str()),
                    Segment::Text(_) => None,
                })
                .collect(),
        }
    }
}

fn split_segments(source: &str) -> Result<Vec<Segment>, EvalError> {
    let chars: Vec<char> = source.chars().collect();
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut pos = 0;

    while pos < chars.len() {
        if chars[pos] == '$' && chars.get(pos + 1) == Some(&'{') {
            let close = find_close(&chars, pos + 2).ok_or_else(|| {
                EvalError::Syntax(format!("unclosed `${{` at offset {}", pos))
            })?;
            if !text.is_empty() {
                segments.push(Segment::Text(std::mem::take(&mut text)));
            }
            let expr: String = chars[pos + 2..close].iter().collect();
            let expr = expr.trim();
            if expr.is_empty() {
                return Err(EvalError::Syntax(format!("empty `${{}}` at offset {}", pos)));
            }
            segments.push(Segment::Expr(expr.to_string()));
            pos = close + 1;
        } else {
            text.push(chars[pos]);
            pos += 1;
        }
    }

    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }
    Ok(segments)
}

/// 找到与 `${` 匹配的 `}`，跳过字符串字面量和嵌套花括号
fn find_close(chars: &[char], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut pos = start;

    while pos < chars.len() {
        let c = chars[pos];
        match quote {
            Some(q) => {
                if c == '\\' {
                    pos += 1;
                } else if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' | '`' => quote = Some(c),
                '{' => depth += 1,
                '}' if depth == 0 => return Some(pos),
                '}' => depth -= 1,
                _ => {}
            },
        }
        pos += 1;
    }
    None
}
