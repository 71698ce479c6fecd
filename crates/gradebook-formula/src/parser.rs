//! Formula parser
//!
//! A recursive descent parser for grade formulas with two binary precedence
//! levels:
//!
//! ```text
//! expression := term (('+' | '-') term)*
//! term       := factor (('*' | '/') factor)*
//! factor     := '+' factor | '-' factor | '(' expression ')' | number
//!             | '[' name ']' | name | name '(' args ')'
//! ```
//!
//! By default the parser is lenient: a factor it cannot recognize becomes
//! `0` without consuming input, a missing `)` is ignored, and input left
//! over after the outermost expression is dropped. [`ParseOptions::strict`]
//! turns each of those into an error.

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use gradebook_core::normalize_name;

/// Deepest allowed nesting of parentheses, signs and function calls
pub const MAX_NESTING_DEPTH: usize = 256;

/// Most operators and function calls allowed in one formula
///
/// Bounds the height of the tree, so evaluating a long flat chain such as
/// `1+1+...+1` cannot exhaust the stack.
pub const MAX_OPERATORS: usize = 1024;

/// Parser behaviour switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Report malformed factors, missing `)` and trailing input as errors
    pub strict: bool,
}

impl ParseOptions {
    /// Strict parsing
    pub fn strict() -> Self {
        Self { strict: true }
    }
}

/// Parse a grade formula into an AST (lenient)
///
/// All whitespace is removed first, so a bare reference such as `Test 1`
/// reads as the variable `Test1`.
///
/// # Example
/// ```rust
/// use gradebook_formula::parse_formula;
///
/// let ast = parse_formula("[Midterm]*0.4+[Final]*0.6").unwrap();
/// let ast = parse_formula("max(Test 1, Test 2)").unwrap();
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<FormulaExpr> {
    parse_formula_with(formula, &ParseOptions::default())
}

/// Parse a grade formula with explicit options
pub fn parse_formula_with(formula: &str, options: &ParseOptions) -> FormulaResult<FormulaExpr> {
    parse_expression_with(&normalize_name(formula), options)
}

/// Parse a grade formula that may name the given variables bare
///
/// Plain identifiers stop at punctuation, so `Test-1*2` would otherwise
/// read as `Test - 1*2`. Any of `names` containing characters outside an
/// identifier is matched whole wherever it appears bare, longest name
/// first, with the same edge rules as [`crate::resolve`].
///
/// ```rust
/// use gradebook_formula::{parse_formula_with_names, ParseOptions};
///
/// let ast = parse_formula_with_names("Test-1*2", &ParseOptions::default(), &["Test-1"]).unwrap();
/// assert_eq!(ast.to_string(), "([Test-1]*2)");
/// ```
pub fn parse_formula_with_names<S: AsRef<str>>(
    formula: &str,
    options: &ParseOptions,
    names: &[S],
) -> FormulaResult<FormulaExpr> {
    let names = punctuated_names(names);
    parse_input(&normalize_name(formula), *options, &names)
}

/// Parse an expression string as-is, without stripping whitespace
///
/// This is the entry point for already-substituted expressions such as
/// `"max(14,17.5)"`.
pub fn parse_expression_with(input: &str, options: &ParseOptions) -> FormulaResult<FormulaExpr> {
    parse_input(input, *options, &[])
}

fn parse_input(input: &str, options: ParseOptions, names: &[String]) -> FormulaResult<FormulaExpr> {
    let mut parser = FormulaParser::new(input, options, names);
    let expr = parser.parse_expression()?;

    // Make sure we consumed all input
    if !matches!(parser.current_token(), Token::Eof) {
        let rest = &parser.input[parser.token_start..];
        if parser.options.strict {
            return Err(FormulaError::TrailingInput(rest.to_string()));
        }
        tracing::debug!(input, rest, "ignoring trailing input");
    }

    Ok(expr)
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    // Literals
    Number(f64),

    // Names
    Identifier(String), // Function name or bare variable
    Variable(String),   // Bracketed or bound variable, whitespace stripped

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Comma,

    // Delimiters
    LeftParen,
    RightParen,

    /// Anything the grammar has no use for
    Invalid(String),

    // End of input
    Eof,
}

/// Formula parser
struct FormulaParser<'a> {
    input: &'a str,
    pos: usize,
    /// Byte offset where the current token starts
    token_start: usize,
    current_token: Option<Token>,
    options: ParseOptions,
    /// Bound names with punctuation, longest first
    names: &'a [String],
    depth: usize,
    operators: usize,
}

impl<'a> FormulaParser<'a> {
    fn new(input: &'a str, options: ParseOptions, names: &'a [String]) -> Self {
        let mut parser = Self {
            input,
            pos: 0,
            token_start: 0,
            current_token: None,
            options,
            names,
            depth: 0,
            operators: 0,
        };
        parser.advance_token();
        parser
    }

    // === Token scanning ===

    fn advance_token(&mut self) {
        self.skip_whitespace();
        self.token_start = self.pos;
        self.current_token = Some(self.scan_token());
    }

    fn scan_token(&mut self) -> Token {
        let c = match self.peek_char() {
            Some(c) => c,
            None => return Token::Eof,
        };

        if c != '[' {
            if let Some(token) = self.scan_bound_name() {
                return token;
            }
        }

        // Single-character tokens
        let single = match c {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            ',' => Some(Token::Comma),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            _ => None,
        };
        if let Some(token) = single {
            self.advance();
            return token;
        }

        if c == '[' {
            return self.scan_bracketed();
        }

        if c.is_ascii_digit() || c == '.' {
            return self.scan_number_or_identifier();
        }

        if is_name_char(c) {
            return self.scan_identifier();
        }

        // Unknown character
        self.advance();
        Token::Invalid(c.to_string())
    }

    fn scan_bound_name(&mut self) -> Option<Token> {
        let input = self.input;
        let names = self.names;
        let rest = &input[self.pos..];
        let before = input[..self.pos].chars().next_back();

        let name = names.iter().find(|name| {
            rest.starts_with(name.as_str())
                && !(name.starts_with(is_name_char) && before.map_or(false, is_name_char))
                && !(name.ends_with(is_name_char) && rest[name.len()..].starts_with(is_name_char))
        })?;

        self.pos += name.len();
        Some(Token::Variable(name.clone()))
    }

    fn scan_bracketed(&mut self) -> Token {
        let start = self.pos;
        self.advance(); // Skip opening bracket

        match self.input[self.pos..].find(']') {
            Some(len) => {
                let name = normalize_name(&self.input[self.pos..self.pos + len]);
                self.pos += len + 1;
                Token::Variable(name)
            }
            None => {
                // Unterminated, swallow the rest
                self.pos = self.input.len();
                Token::Invalid(self.input[start..].to_string())
            }
        }
    }

    fn scan_number_or_identifier(&mut self) -> Token {
        let start = self.pos;

        while self
            .peek_char()
            .map_or(false, |c| c.is_ascii_digit() || c == '.')
        {
            self.advance();
        }

        let num_str = &self.input[start..self.pos];

        // Names like "1stTerm" start with digits
        if !num_str.contains('.') && self.peek_char().map_or(false, is_name_char) {
            self.pos = start;
            return self.scan_identifier();
        }

        match num_str.parse::<f64>() {
            Ok(num) => Token::Number(num),
            Err(_) => Token::Invalid(num_str.to_string()),
        }
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.pos;

        while self.peek_char().map_or(false, is_name_char) {
            self.advance();
        }

        Token::Identifier(self.input[start..self.pos].to_string())
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn current_token(&self) -> &Token {
        self.current_token.as_ref().unwrap_or(&Token::Eof)
    }

    fn consume(&mut self) -> Token {
        let token = self.current_token.take().unwrap_or(Token::Eof);
        self.advance_token();
        token
    }

    /// Consume a closing parenthesis, tolerating its absence unless strict
    fn expect_right_paren(&mut self) -> FormulaResult<()> {
        if matches!(self.current_token(), Token::RightParen) {
            self.consume();
            return Ok(());
        }

        if self.options.strict {
            return Err(FormulaError::Parse(format!(
                "Expected ')' at offset {}, got {:?}",
                self.token_start,
                self.current_token()
            )));
        }
        Ok(())
    }

    /// Count one tree node against [`MAX_OPERATORS`]
    fn count_operator(&mut self) -> FormulaResult<()> {
        self.operators += 1;
        if self.operators > MAX_OPERATORS {
            return Err(FormulaError::Parse(format!(
                "Formula has more than {} operators",
                MAX_OPERATORS
            )));
        }
        Ok(())
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    // 1. Addition/Subtraction: +, -
    // 2. Multiplication/Division: *, /
    // 3. Unary: +, -
    // 4. Primary: numbers, variables, function calls, parentheses

    fn parse_expression(&mut self) -> FormulaResult<FormulaExpr> {
        let mut left = self.parse_term()?;

        loop {
            let op = match self.current_token() {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            self.count_operator()?;
            self.consume();
            let right = self.parse_term()?;
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_term(&mut self) -> FormulaResult<FormulaExpr> {
        let mut left = self.parse_factor()?;

        loop {
            let op = match self.current_token() {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                _ => break,
            };

            self.count_operator()?;
            self.consume();
            let right = self.parse_factor()?;
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_factor(&mut self) -> FormulaResult<FormulaExpr> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(FormulaError::Parse(format!(
                "Formula nested deeper than {} levels",
                MAX_NESTING_DEPTH
            )));
        }

        let result = self.parse_primary();
        self.depth -= 1;
        result
    }

    fn parse_primary(&mut self) -> FormulaResult<FormulaExpr> {
        match self.current_token().clone() {
            // Prefix plus (no-op)
            Token::Plus => {
                self.consume();
                self.parse_factor()
            }

            // Prefix unary minus
            Token::Minus => {
                self.count_operator()?;
                self.consume();
                let operand = self.parse_factor()?;
                Ok(FormulaExpr::UnaryOp {
                    op: UnaryOperator::Negate,
                    operand: Box::new(operand),
                })
            }

            Token::LeftParen => {
                self.consume();
                let expr = self.parse_expression()?;
                self.expect_right_paren()?;
                Ok(expr)
            }

            Token::Number(n) => {
                self.consume();
                Ok(FormulaExpr::Number(n))
            }

            Token::Variable(name) => {
                self.consume();
                Ok(FormulaExpr::Variable(name))
            }

            Token::Identifier(name) => {
                self.consume();
                // Check if it's a function call
                if matches!(self.current_token(), Token::LeftParen) {
                    self.parse_function_call(name)
                } else {
                    Ok(FormulaExpr::Variable(name))
                }
            }

            token => {
                if self.options.strict {
                    return Err(FormulaError::Parse(format!(
                        "Unexpected token at offset {}: {:?}",
                        self.token_start, token
                    )));
                }
                // Malformed factor: contribute zero and leave the token
                Ok(FormulaExpr::Number(0.0))
            }
        }
    }

    fn parse_function_call(&mut self, name: String) -> FormulaResult<FormulaExpr> {
        self.count_operator()?;
        self.consume(); // '('

        let mut args = Vec::new();

        // Parse arguments
        if !matches!(self.current_token(), Token::RightParen) {
            args.push(self.parse_expression()?);

            while matches!(self.current_token(), Token::Comma) {
                self.consume();
                args.push(self.parse_expression()?);
            }
        }

        self.expect_right_paren()?;

        Ok(FormulaExpr::Function {
            name: name.to_lowercase(),
            args,
        })
    }
}

/// Characters allowed in bare names
fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Normalized names the identifier scanner cannot read whole, longest first
fn punctuated_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut names: Vec<String> = names
        .iter()
        .map(|name| normalize_name(name.as_ref()))
        .filter(|name| !name.starts_with('['))
        .filter(|name| !name.chars().all(|c| c.is_ascii_digit() || c == '.'))
        .filter(|name| !name.chars().all(is_name_char))
        .collect();

    names.sort_by(|a, b| {
        b.chars()
            .count()
            .cmp(&a.chars().count())
            .then_with(|| a.cmp(b))
    });
    names.dedup();
    names
}
