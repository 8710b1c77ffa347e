use crate::ast::{
    BinaryOperator, ExprKind, Expression, Literal, Program, StaticType, Statement, StmtKind,
    UnaryOperator,
};
use crate::token::{Token, TokenKind};

mod error;

pub use error::{ParseResult, SyntaxError};

type ParseFn = fn(&mut Parser) -> ParseResult<Expression>;

/// Deepest statement or expression nesting the parser accepts.
const MAX_NESTING: usize = 64;

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(|token| token.is(TokenKind::EOF)) {
            let line = tokens.last().map_or(1, |token| token.line);
            tokens.push(Token::new(TokenKind::EOF, "", line));
        }
        Self {
            tokens,
            position: 0,
            depth: 0,
        }
    }

    pub fn parse_program(mut self) -> ParseResult<Program> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::EOF) {
            statements.push(self.parse_statement()?);
        }
        Ok(Program { statements })
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        let token = self.current().clone();
        match token.kind {
            kind if kind.is_type_keyword() => {
                self.advance();
                self.parse_variable_declaration(declared_type(kind))
            }
            TokenKind::If => {
                self.advance();
                self.parse_if(token.line)
            }
            TokenKind::While => {
                self.advance();
                self.parse_while(token.line)
            }
            TokenKind::For => {
                self.advance();
                self.parse_for(token.line)
            }
            TokenKind::Fun => {
                self.advance();
                self.parse_function_decl()
            }
            TokenKind::Print => {
                self.advance();
                let value = self.parse_expression()?;
                self.expect(TokenKind::Semicolon, "Expect ';' after value.")?;
                Ok(Statement::new(StmtKind::Print(value), token.line))
            }
            TokenKind::Input => {
                self.advance();
                let prompt = self.parse_input_prompt();
                self.expect(TokenKind::Semicolon, "Expect ';' after input statement.")?;
                let input = Expression::new(ExprKind::Input { prompt }, token.line);
                Ok(Statement::new(StmtKind::Expr(input), token.line))
            }
            TokenKind::LBrace => {
                self.advance();
                let statements = self.parse_block_statements()?;
                Ok(Statement::new(StmtKind::Block(statements), token.line))
            }
            TokenKind::Return => {
                self.advance();
                let value = if self.check(TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.expect(TokenKind::Semicolon, "Expect ';' after return value.")?;
                Ok(Statement::new(StmtKind::Return(value), token.line))
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Statement> {
        let expr = self.parse_expression()?;
        self.expect(TokenKind::Semicolon, "Expect ';' after expression.")?;
        let line = expr.line;
        Ok(Statement::new(StmtKind::Expr(expr), line))
    }

    fn parse_variable_declaration(&mut self, declared: StaticType) -> ParseResult<Statement> {
        let name = self.expect(TokenKind::Identifier, "Expect variable name.")?;
        let initializer = if self.eat(TokenKind::Assign) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.expect(
            TokenKind::Semicolon,
            "Expect ';' after variable declaration.",
        )?;
        Ok(Statement::new(
            StmtKind::VariableDeclaration {
                name: name.text,
                declared,
                initializer,
            },
            name.line,
        ))
    }

    fn parse_if(&mut self, line: usize) -> ParseResult<Statement> {
        self.expect(TokenKind::LParen, "Expect '(' after 'if'.")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen, "Expect ')' after if condition.")?;
        let then_branch = Box::new(self.parse_nested_statement()?);
        let else_branch = if self.eat(TokenKind::Else) {
            Some(Box::new(self.parse_nested_statement()?))
        } else {
            None
        };
        Ok(Statement::new(
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            },
            line,
        ))
    }

    fn parse_while(&mut self, line: usize) -> ParseResult<Statement> {
        self.expect(TokenKind::LParen, "Expect '(' after 'while'.")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen, "Expect ')' after condition.")?;
        let body = Box::new(self.parse_nested_statement()?);
        Ok(Statement::new(StmtKind::While { condition, body }, line))
    }

    fn parse_for(&mut self, line: usize) -> ParseResult<Statement> {
        self.expect(TokenKind::LParen, "Expect '(' after 'for'.")?;

        let initializer = if self.eat(TokenKind::Semicolon) {
            None
        } else if self.current().kind.is_type_keyword() {
            let declared = declared_type(self.advance().kind);
            Some(Box::new(self.parse_variable_declaration(declared)?))
        } else {
            Some(Box::new(self.parse_expression_statement()?))
        };

        let condition = if self.eat(TokenKind::Semicolon) {
            None
        } else {
            let condition = self.parse_expression()?;
            self.expect(TokenKind::Semicolon, "Expect ';' after loop condition.")?;
            Some(condition)
        };

        let increment = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::RParen, "Expect ')' after for clauses.")?;

        let body = Box::new(self.parse_nested_statement()?);
        Ok(Statement::new(
            StmtKind::For {
                initializer,
                condition,
                increment,
                body,
            },
            line,
        ))
    }

    fn parse_function_decl(&mut self) -> ParseResult<Statement> {
        let name = self.expect(TokenKind::Identifier, "Expect function name.")?;
        self.expect(TokenKind::LParen, "Expect '(' after function name.")?;

        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                params.push(
                    self.expect(TokenKind::Identifier, "Expect parameter name.")?
                        .text,
                );
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(TokenKind::RParen, "Expect ')' after parameters.")?;
        self.expect(TokenKind::LBrace, "Expect '{' before function body.")?;
        let body = self.parse_block_statements()?;

        Ok(Statement::new(
            StmtKind::FunctionDecl {
                name: name.text,
                params,
                body,
            },
            name.line,
        ))
    }

    /// Parses statements up to and including the closing `}`.
    fn parse_block_statements(&mut self) -> ParseResult<Vec<Statement>> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::EOF) {
            statements.push(self.parse_nested_statement()?);
        }
        self.expect(TokenKind::RBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn parse_input_prompt(&mut self) -> Option<String> {
        if self.check(TokenKind::StringLiteral) {
            Some(self.advance().text)
        } else {
            None
        }
    }

    fn parse_nested_statement(&mut self) -> ParseResult<Statement> {
        self.nested("Statement nested too deeply.", Parser::parse_statement)
    }

    fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.nested("Expression nested too deeply.", Parser::parse_assignment)
    }

    fn nested<T>(
        &mut self,
        message: &str,
        parse: fn(&mut Parser) -> ParseResult<T>,
    ) -> ParseResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(SyntaxError::new(message, self.current()));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn parse_assignment(&mut self) -> ParseResult<Expression> {
        let expr = self.parse_or()?;
        let token = self.current().clone();

        let compound = match token.kind {
            TokenKind::Assign => {
                self.advance();
                let name = assignment_target(&expr, &token)?;
                let value = self.parse_expression()?;
                return Ok(assignment(name, value, token.line));
            }
            TokenKind::PlusAssign => BinaryOperator::Add,
            TokenKind::MinusAssign => BinaryOperator::Sub,
            TokenKind::StarAssign => BinaryOperator::Mul,
            TokenKind::SlashAssign => BinaryOperator::Div,
            TokenKind::PercentAssign => BinaryOperator::Mod,
            TokenKind::Increment | TokenKind::Decrement => {
                self.advance();
                let name = assignment_target(&expr, &token)?;
                let op = if token.is(TokenKind::Increment) {
                    BinaryOperator::Add
                } else {
                    BinaryOperator::Sub
                };
                let one = Expression::new(ExprKind::Literal(Literal::Integer(1)), token.line);
                return Ok(compound_assignment(name, op, one, token.line));
            }
            _ => return Ok(expr),
        };

        self.advance();
        let name = assignment_target(&expr, &token)?;
        let value = self.parse_expression()?;
        Ok(compound_assignment(name, compound, value, token.line))
    }

    fn parse_or(&mut self) -> ParseResult<Expression> {
        self.parse_binary(Parser::parse_and, &[(TokenKind::Or, BinaryOperator::Or)])
    }

    fn parse_and(&mut self) -> ParseResult<Expression> {
        self.parse_binary(
            Parser::parse_equality,
            &[(TokenKind::And, BinaryOperator::And)],
        )
    }

    fn parse_equality(&mut self) -> ParseResult<Expression> {
        self.parse_binary(
            Parser::parse_comparison,
            &[
                (TokenKind::Equal, BinaryOperator::Equal),
                (TokenKind::NotEqual, BinaryOperator::NotEqual),
            ],
        )
    }

    fn parse_comparison(&mut self) -> ParseResult<Expression> {
        self.parse_binary(
            Parser::parse_term,
            &[
                (TokenKind::Less, BinaryOperator::Less),
                (TokenKind::LessEqual, BinaryOperator::LessEqual),
                (TokenKind::Greater, BinaryOperator::Greater),
                (TokenKind::GreaterEqual, BinaryOperator::GreaterEqual),
            ],
        )
    }

    fn parse_term(&mut self) -> ParseResult<Expression> {
        self.parse_binary(
            Parser::parse_factor,
            &[
                (TokenKind::Plus, BinaryOperator::Add),
                (TokenKind::Minus, BinaryOperator::Sub),
            ],
        )
    }

    fn parse_factor(&mut self) -> ParseResult<Expression> {
        self.parse_binary(
            Parser::parse_unary,
            &[
                (TokenKind::Star, BinaryOperator::Mul),
                (TokenKind::Slash, BinaryOperator::Div),
                (TokenKind::Percent, BinaryOperator::Mod),
            ],
        )
    }

    /// One left-associative precedence level.
    fn parse_binary(
        &mut self,
        next: ParseFn,
        operators: &[(TokenKind, BinaryOperator)],
    ) -> ParseResult<Expression> {
        let mut expr = next(self)?;
        while let Some(&(_, op)) = operators
            .iter()
            .find(|(kind, _)| self.check(*kind))
        {
            let line = self.advance().line;
            let right = next(self)?;
            expr = Expression::new(
                ExprKind::BinaryOp {
                    left: Box::new(expr),
                    op,
                    right: Box::new(right),
                },
                line,
            );
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> ParseResult<Expression> {
        let op = match self.current().kind {
            TokenKind::Not => UnaryOperator::Not,
            TokenKind::Minus => UnaryOperator::Negate,
            _ => return self.parse_primary(),
        };
        let line = self.advance().line;
        let operand = self.nested("Expression nested too deeply.", Parser::parse_unary)?;
        Ok(Expression::new(
            ExprKind::UnaryOp {
                op,
                operand: Box::new(operand),
            },
            line,
        ))
    }

    fn parse_primary(&mut self) -> ParseResult<Expression> {
        let token = self.current().clone();
        let literal = match token.kind {
            TokenKind::IntegerLiteral => Literal::Integer(token.text.parse().map_err(|_| {
                SyntaxError::new(format!("Invalid integer literal: {}", token.text), &token)
            })?),
            TokenKind::FloatLiteral => Literal::Float(token.text.parse().map_err(|_| {
                SyntaxError::new(format!("Invalid float literal: {}", token.text), &token)
            })?),
            TokenKind::CharLiteral => match token.text.chars().next() {
                Some(value) => Literal::Char(value),
                None => return Err(SyntaxError::new("Empty character literal.", &token)),
            },
            TokenKind::StringLiteral => Literal::String(token.text.clone()),
            TokenKind::True => Literal::Boolean(true),
            TokenKind::False => Literal::Boolean(false),
            TokenKind::Null => Literal::Null,
            TokenKind::Identifier => {
                self.advance();
                return self.parse_identifier(token);
            }
            TokenKind::Input => {
                self.advance();
                let prompt = self.parse_input_prompt();
                return Ok(Expression::new(ExprKind::Input { prompt }, token.line));
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen, "Expect ')' after expression.")?;
                return Ok(expr);
            }
            _ => return Err(SyntaxError::new("Expect expression.", &token)),
        };
        self.advance();
        Ok(Expression::new(ExprKind::Literal(literal), token.line))
    }

    /// A name is a variable reference unless `(` follows, which makes it a call.
    fn parse_identifier(&mut self, name: Token) -> ParseResult<Expression> {
        if !self.eat(TokenKind::LParen) {
            return Ok(Expression::new(ExprKind::Variable(name.text), name.line));
        }

        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "Expect ')' after arguments.")?;

        Ok(Expression::new(
            ExprKind::FunctionCall {
                name: name.text,
                args,
            },
            name.line,
        ))
    }

    fn current(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.position.min(last)]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().is(kind)
    }

    /// Returns the current token and moves on; never moves past `EOF`.
    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !token.is(TokenKind::EOF) {
            self.position += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(SyntaxError::new(message, self.current()))
        }
    }
}

fn declared_type(kind: TokenKind) -> StaticType {
    match kind {
        TokenKind::Float => StaticType::Float,
        TokenKind::Char => StaticType::Char,
        TokenKind::String => StaticType::String,
        TokenKind::Bool => StaticType::Bool,
        _ => StaticType::Int,
    }
}

fn assignment_target(expr: &Expression, token: &Token) -> ParseResult<String> {
    match &expr.kind {
        ExprKind::Variable(name) => Ok(name.clone()),
        _ => Err(SyntaxError::new("Invalid assignment target.", token)),
    }
}

fn assignment(name: String, value: Expression, line: usize) -> Expression {
    Expression::new(
        ExprKind::Assignment {
            name,
            value: Box::new(value),
        },
        line,
    )
}

/// `x op= value` becomes `x = x op value`.
fn compound_assignment(
    name: String,
    op: BinaryOperator,
    value: Expression,
    line: usize,
) -> Expression {
    let current = Expression::new(ExprKind::Variable(name.clone()), line);
    let combined = Expression::new(
        ExprKind::BinaryOp {
            left: Box::new(current),
            op,
            right: Box::new(value),
        },
        line,
    );
    assignment(name, combined, line)
}

pub fn parse_tokens(tokens: Vec<Token>) -> ParseResult<Program> {
    Parser::new(tokens).parse_program()
}
