use crate::error::ToolError;
use crate::traits::{string_arg, Arguments, Tool};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Evaluates arithmetic over numbers, `+ - * / ^`, unary minus and parentheses.
///
/// The expression is parsed here with the usual precedence (`^` binds tighter
/// than unary minus and associates to the right) and handed to fasteval fully
/// parenthesized, so fasteval's own precedence rules never apply and its
/// function library and variables are never reachable.
pub struct MathTool;

const MAX_NESTING: usize = 64;

struct MathArgs {
    expression: String,
}

impl MathArgs {
    fn from_arguments(arguments: &Arguments) -> Result<Self, ToolError> {
        let expression = string_arg(arguments, "expression");
        if expression.is_empty() {
            return Err(ToolError::BadInput("Missing expression".to_string()));
        }
        if let Some(c) = expression.chars().find(|c| !is_allowed(*c)) {
            return Err(ToolError::BadInput(format!(
                "Invalid expression: unsupported character '{}'",
                c
            )));
        }
        Ok(Self {
            expression: expression.replace("**", "^"),
        })
    }
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_digit() || c.is_whitespace() || "+-*/^().".contains(c)
}

fn invalid(reason: impl std::fmt::Display) -> ToolError {
    ToolError::BadInput(format!("Invalid expression: {}", reason))
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(String),
    Op(char),
    Open,
    Close,
}

fn tokenize(expression: &str) -> Result<Vec<Token>, ToolError> {
    let mut tokens = Vec::new();
    let mut chars = expression.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '(' => tokens.push(Token::Open),
            ')' => tokens.push(Token::Close),
            '+' | '-' | '*' | '/' | '^' => tokens.push(Token::Op(c)),
            _ => {
                let mut literal = c.to_string();
                while let Some(&next) = chars.peek() {
                    if !(next.is_ascii_digit() || next == '.') {
                        break;
                    }
                    literal.push(next);
                    chars.next();
                }
                tokens.push(Token::Number(normalize_number(&literal)?));
            }
        }
    }
    Ok(tokens)
}

/// `5.` and `.5` are valid numerals; fasteval gets `5.0` and `0.5`.
fn normalize_number(literal: &str) -> Result<String, ToolError> {
    let dots = literal.matches('.').count();
    if dots > 1 || !literal.chars().any(|c| c.is_ascii_digit()) {
        return Err(invalid(format_args!("malformed number '{}'", literal)));
    }
    let mut number = literal.to_string();
    if number.starts_with('.') {
        number.insert(0, '0');
    }
    if number.ends_with('.') {
        number.push('0');
    }
    Ok(number)
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Number(String),
    Neg(Box<Expr>),
    Binary(Box<Expr>, char, Box<Expr>),
}

impl Expr {
    fn to_fasteval(&self) -> String {
        match self {
            Expr::Number(number) => number.clone(),
            Expr::Neg(inner) => format!("(-{})", inner.to_fasteval()),
            Expr::Binary(lhs, op, rhs) => {
                format!("({} {} {})", lhs.to_fasteval(), op, rhs.to_fasteval())
            }
        }
    }
}

/// Recursive descent over:
///
/// ```text
/// expr   := term (("+" | "-") term)*
/// term   := factor (("*" | "/") factor)*
/// factor := "-" factor | power
/// power  := atom ("^" factor)?
/// atom   := number | "(" expr ")"
/// ```
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn parse(expression: &str) -> Result<Expr, ToolError> {
        let mut parser = Parser {
            tokens: tokenize(expression)?,
            pos: 0,
            depth: 0,
        };
        let expr = parser.expr()?;
        match parser.peek() {
            None => Ok(expr),
            Some(token) => Err(invalid(format_args!("unexpected {}", describe(token)))),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next_op(&mut self, ops: &[char]) -> Option<char> {
        match self.peek() {
            Some(Token::Op(op)) if ops.contains(op) => {
                let op = *op;
                self.pos += 1;
                Some(op)
            }
            _ => None,
        }
    }

    fn expr(&mut self) -> Result<Expr, ToolError> {
        let mut lhs = self.term()?;
        while let Some(op) = self.next_op(&['+', '-']) {
            lhs = Expr::Binary(Box::new(lhs), op, Box::new(self.term()?));
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, ToolError> {
        let mut lhs = self.factor()?;
        while let Some(op) = self.next_op(&['*', '/']) {
            lhs = Expr::Binary(Box::new(lhs), op, Box::new(self.factor()?));
        }
        Ok(lhs)
    }

    fn factor(&mut self) -> Result<Expr, ToolError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(invalid("nested too deeply"));
        }
        let result = match self.next_op(&['-', '+']) {
            Some('-') => self.factor().map(|inner| Expr::Neg(Box::new(inner))),
            Some(_) => Err(invalid("unary plus is not supported")),
            None => self.power(),
        };
        self.depth -= 1;
        result
    }

    fn power(&mut self) -> Result<Expr, ToolError> {
        let base = self.atom()?;
        match self.next_op(&['^']) {
            Some(op) => Ok(Expr::Binary(Box::new(base), op, Box::new(self.factor()?))),
            None => Ok(base),
        }
    }

    fn atom(&mut self) -> Result<Expr, ToolError> {
        let token = self.peek().cloned();
        self.pos += 1;
        match token {
            Some(Token::Number(number)) => Ok(Expr::Number(number)),
            Some(Token::Open) => {
                let inner = self.expr()?;
                match self.peek() {
                    Some(Token::Close) => {
                        self.pos += 1;
                        Ok(inner)
                    }
                    _ => Err(invalid("missing ')'")),
                }
            }
            Some(other) => Err(invalid(format_args!("unexpected {}", describe(&other)))),
            None => Err(invalid("unexpected end of expression")),
        }
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Number(number) => format!("number '{}'", number),
        Token::Op(op) => format!("operator '{}'", op),
        Token::Open => "'('".to_string(),
        Token::Close => "')'".to_string(),
    }
}

fn evaluate(expression: &str) -> Result<f64, ToolError> {
    let canonical = Parser::parse(expression)?.to_fasteval();
    let mut no_names = |_: &str, _: Vec<f64>| -> Option<f64> { None };
    let value = fasteval::ez_eval(&canonical, &mut no_names).map_err(invalid)?;
    if !value.is_finite() {
        return Err(invalid("result is not a finite number"));
    }
    Ok(value)
}

#[async_trait]
impl Tool for MathTool {
    fn name(&self) -> &str {
        "math"
    }

    fn description(&self) -> &str {
        "Evaluates a safe arithmetic expression."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "Arithmetic expression, e.g. '12*13 + 5'"
                }
            },
            "required": ["expression"]
        })
    }

    fn output_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "result": { "type": "number" }
            },
            "required": ["result"]
        })
    }

    async fn run(&self, arguments: &Arguments) -> Result<Value, ToolError> {
        let args = MathArgs::from_arguments(arguments)?;
        let value = evaluate(&args.expression)?;
        Ok(json!({ "result": value }))
    }
}
