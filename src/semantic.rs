use crate::ast::{
    BinaryOperator, ExprKind, Expression, Literal, Program, StaticType, Statement, StmtKind,
};
use crate::scope::ScopeChain;

mod error;

pub use error::{SemanticError, SemanticResult};

/// Single forward pass that checks declarations and operand types, tagging
/// every visited expression with its static type.
pub struct SemanticAnalyzer {
    scopes: ScopeChain<StaticType>,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self {
            scopes: ScopeChain::new(),
        }
    }

    pub fn analyze_program(&mut self, program: &mut Program) -> SemanticResult<()> {
        for statement in &mut program.statements {
            self.analyze_statement(statement)?;
        }
        Ok(())
    }

    fn analyze_statement(&mut self, statement: &mut Statement) -> SemanticResult<()> {
        let line = statement.line;
        match &mut statement.kind {
            StmtKind::VariableDeclaration {
                name,
                declared,
                initializer,
            } => {
                if self.scopes.is_defined_locally(name) {
                    return Err(SemanticError::AlreadyDeclared {
                        name: name.clone(),
                        line,
                    });
                }
                if let Some(initializer) = initializer {
                    let found = self.analyze_expression(initializer)?;
                    if !compatible(*declared, found) {
                        return Err(SemanticError::InitializerMismatch {
                            name: name.clone(),
                            expected: *declared,
                            found,
                            line,
                        });
                    }
                }
                self.scopes.define(name.clone(), *declared);
                Ok(())
            }
            StmtKind::Expr(expr) | StmtKind::Print(expr) => {
                self.analyze_expression(expr)?;
                Ok(())
            }
            StmtKind::Block(statements) => self.in_scope(|analyzer| {
                for statement in statements {
                    analyzer.analyze_statement(statement)?;
                }
                Ok(())
            }),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.expect_condition("if", condition)?;
                self.analyze_statement(then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.analyze_statement(else_branch)?;
                }
                Ok(())
            }
            StmtKind::While { condition, body } => {
                self.expect_condition("while", condition)?;
                self.analyze_statement(body)
            }
            StmtKind::For {
                initializer,
                condition,
                increment,
                body,
            } => self.in_scope(|analyzer| {
                if let Some(initializer) = initializer {
                    analyzer.analyze_statement(initializer)?;
                }
                if let Some(condition) = condition {
                    analyzer.expect_condition("for", condition)?;
                }
                if let Some(increment) = increment {
                    analyzer.analyze_expression(increment)?;
                }
                analyzer.analyze_statement(body)
            }),
            // Parameters are never bound, so bodies stay unchecked.
            StmtKind::FunctionDecl { .. } => Ok(()),
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    self.analyze_expression(value)?;
                }
                Ok(())
            }
        }
    }

    fn analyze_expression(&mut self, expr: &mut Expression) -> SemanticResult<StaticType> {
        let line = expr.line;
        let ty = match &mut expr.kind {
            ExprKind::Literal(literal) => literal_type(literal),
            ExprKind::Variable(name) => self.resolve(name, line)?,
            ExprKind::Assignment { name, value } => {
                let expected = self.resolve(name, line)?;
                let found = self.analyze_expression(value)?;
                if !compatible(expected, found) {
                    return Err(SemanticError::AssignmentMismatch {
                        name: name.clone(),
                        expected,
                        found,
                        line,
                    });
                }
                expected
            }
            ExprKind::BinaryOp { left, op, right } => {
                let left = self.analyze_expression(left)?;
                let right = self.analyze_expression(right)?;
                binary_type(*op, left, right, line)?
            }
            ExprKind::UnaryOp { op, operand } => {
                let found = self.analyze_expression(operand)?;
                if !found.is_numeric() {
                    return Err(SemanticError::NonNumericOperand {
                        operator: *op,
                        found,
                        line,
                    });
                }
                found
            }
            ExprKind::FunctionCall { .. } => StaticType::Void,
            ExprKind::Input { .. } => StaticType::String,
        };
        expr.ty = Some(ty);
        Ok(ty)
    }

    fn expect_condition(
        &mut self,
        construct: &'static str,
        condition: &mut Expression,
    ) -> SemanticResult<()> {
        let found = self.analyze_expression(condition)?;
        if found != StaticType::Bool {
            return Err(SemanticError::NonBooleanCondition {
                construct,
                found,
                line: condition.line,
            });
        }
        Ok(())
    }

    fn resolve(&self, name: &str, line: usize) -> SemanticResult<StaticType> {
        self.scopes
            .lookup(name)
            .copied()
            .ok_or_else(|| SemanticError::Undeclared {
                name: name.to_string(),
                line,
            })
    }

    fn in_scope(
        &mut self,
        body: impl FnOnce(&mut Self) -> SemanticResult<()>,
    ) -> SemanticResult<()> {
        self.scopes.enter();
        let result = body(self);
        self.scopes.exit();
        result
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Exact match, or int/float in either direction.
fn compatible(expected: StaticType, found: StaticType) -> bool {
    expected == found || (expected.is_numeric() && found.is_numeric())
}

fn literal_type(literal: &Literal) -> StaticType {
    match literal {
        Literal::Integer(_) => StaticType::Int,
        Literal::Float(_) => StaticType::Float,
        Literal::Char(_) => StaticType::Char,
        Literal::String(_) => StaticType::String,
        Literal::Boolean(_) => StaticType::Bool,
        Literal::Null => StaticType::Null,
    }
}

fn binary_type(
    op: BinaryOperator,
    left: StaticType,
    right: StaticType,
    line: usize,
) -> SemanticResult<StaticType> {
    match op {
        BinaryOperator::Equal
        | BinaryOperator::NotEqual
        | BinaryOperator::Less
        | BinaryOperator::LessEqual
        | BinaryOperator::Greater
        | BinaryOperator::GreaterEqual => {
            if !compatible(left, right) {
                return Err(SemanticError::ComparisonMismatch { left, right, line });
            }
            Ok(StaticType::Bool)
        }
        BinaryOperator::Add | BinaryOperator::Sub | BinaryOperator::Mul | BinaryOperator::Div => {
            if !compatible(left, right) {
                return Err(SemanticError::ArithmeticMismatch { left, right, line });
            }
            if left == StaticType::Float || right == StaticType::Float {
                Ok(StaticType::Float)
            } else {
                Ok(left)
            }
        }
        BinaryOperator::Mod | BinaryOperator::And | BinaryOperator::Or => {
            Err(SemanticError::UnknownOperator { operator: op, line })
        }
    }
}

pub fn analyze(program: &mut Program) -> SemanticResult<()> {
    SemanticAnalyzer::new().analyze_program(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::UnaryOperator;
    use crate::lexer::tokenize;
    use crate::parser::parse_tokens;
    use indoc::indoc;

    fn parse(input: &str) -> Program {
        let tokens = tokenize(input).expect("tokenize should succeed");
        parse_tokens(tokens).expect("parse should succeed")
    }

    fn check(input: &str) -> SemanticResult<Program> {
        let mut program = parse(input);
        analyze(&mut program)?;
        Ok(program)
    }

    fn print_type(program: &Program, index: usize) -> Option<StaticType> {
        match &program.statements[index].kind {
            StmtKind::Print(expr) => expr.ty,
            other => panic!("expected print statement, got {other:?}"),
        }
    }

    #[test]
    fn accepts_well_typed_program() {
        let input = indoc! {"
            int x = 2;
            float y = x;
            while (x < 5) {
                print x;
                x = x + 1;
            }
            for (int i = 0; i < 3; i++) {
                y = y * 2;
            }
        "};
        check(input).expect("analysis should succeed");
    }

    #[test]
    fn annotates_expression_types() {
        let input = indoc! {"
            int a = 1;
            float b = 2.5;
            print a + b;
            print a + a;
            print a < b;
            print \"s\" + \"t\";
            print 'c';
            print -a;
            print input;
            print f(1);
            print null;
        "};
        let program = check(input).expect("analysis should succeed");
        assert_eq!(print_type(&program, 2), Some(StaticType::Float));
        assert_eq!(print_type(&program, 3), Some(StaticType::Int));
        assert_eq!(print_type(&program, 4), Some(StaticType::Bool));
        assert_eq!(print_type(&program, 5), Some(StaticType::String));
        assert_eq!(print_type(&program, 6), Some(StaticType::Char));
        assert_eq!(print_type(&program, 7), Some(StaticType::Int));
        assert_eq!(print_type(&program, 8), Some(StaticType::String));
        assert_eq!(print_type(&program, 9), Some(StaticType::Void));
        assert_eq!(print_type(&program, 10), Some(StaticType::Null));
    }

    #[test]
    fn int_and_float_are_compatible_both_ways() {
        check("int x = 2.5; float y = 1; x = y; y = x;").expect("analysis should succeed");
    }

    #[test]
    fn errors_on_redeclaration_in_same_scope() {
        let err = check("int x = 1;\nint x = 2;").expect_err("expected semantic error");
        assert_eq!(
            err,
            SemanticError::AlreadyDeclared {
                name: "x".to_string(),
                line: 2
            }
        );
    }

    #[test]
    fn allows_shadowing_in_nested_scope() {
        check("int x = 1; { string x = \"inner\"; print x; } x = 3;")
            .expect("analysis should succeed");
    }

    #[test]
    fn errors_on_undeclared_names() {
        let err = check("print y;").expect_err("expected semantic error");
        assert_eq!(
            err,
            SemanticError::Undeclared {
                name: "y".to_string(),
                line: 1
            }
        );

        let err = check("y = 1;").expect_err("expected semantic error");
        assert!(matches!(err, SemanticError::Undeclared { .. }));
    }

    #[test]
    fn block_and_for_declarations_do_not_escape() {
        let err = check("{ int inner = 1; }\nprint inner;").expect_err("expected semantic error");
        assert_eq!(err.line(), 2);

        let err = check("for (int i = 0; i < 2; i++) {}\nprint i;")
            .expect_err("expected semantic error");
        assert_eq!(
            err,
            SemanticError::Undeclared {
                name: "i".to_string(),
                line: 2
            }
        );
    }

    #[test]
    fn errors_on_initializer_and_assignment_mismatch() {
        let err = check("int x = \"five\";").expect_err("expected semantic error");
        assert_eq!(
            err,
            SemanticError::InitializerMismatch {
                name: "x".to_string(),
                expected: StaticType::Int,
                found: StaticType::String,
                line: 1
            }
        );

        let err = check("char c = 'a';\nc = true;").expect_err("expected semantic error");
        assert_eq!(
            err,
            SemanticError::AssignmentMismatch {
                name: "c".to_string(),
                expected: StaticType::Char,
                found: StaticType::Bool,
                line: 2
            }
        );
    }

    #[test]
    fn errors_on_operand_mismatch() {
        let err = check("print 1 + \"a\";").expect_err("expected semantic error");
        assert!(matches!(err, SemanticError::ArithmeticMismatch { .. }));

        let err = check("print 1 == true;").expect_err("expected semantic error");
        assert!(matches!(err, SemanticError::ComparisonMismatch { .. }));
    }

    #[test]
    fn errors_on_operators_without_typing_rule() {
        let err = check("print 5 % 2;").expect_err("expected semantic error");
        assert_eq!(
            err,
            SemanticError::UnknownOperator {
                operator: BinaryOperator::Mod,
                line: 1
            }
        );

        let err = check("print true && false;").expect_err("expected semantic error");
        assert!(matches!(
            err,
            SemanticError::UnknownOperator {
                operator: BinaryOperator::And,
                ..
            }
        ));
    }

    #[test]
    fn unary_operators_require_numbers() {
        check("print !0; print -1.5;").expect("analysis should succeed");

        let err = check("print !true;").expect_err("expected semantic error");
        assert_eq!(
            err,
            SemanticError::NonNumericOperand {
                operator: UnaryOperator::Not,
                found: StaticType::Bool,
                line: 1
            }
        );
    }

    #[test]
    fn conditions_must_be_boolean() {
        let err = check("int x = 1;\nif (x) print x;").expect_err("expected semantic error");
        assert_eq!(
            err,
            SemanticError::NonBooleanCondition {
                construct: "if",
                found: StaticType::Int,
                line: 2
            }
        );

        let err = check("while (\"yes\") {}").expect_err("expected semantic error");
        assert!(matches!(
            err,
            SemanticError::NonBooleanCondition {
                construct: "while",
                ..
            }
        ));

        let err = check("for (; 1;) {}").expect_err("expected semantic error");
        assert!(matches!(
            err,
            SemanticError::NonBooleanCondition {
                construct: "for",
                ..
            }
        ));
    }

    #[test]
    fn branches_are_checked_even_when_unreachable() {
        let err = check("if (false) print missing;").expect_err("expected semantic error");
        assert!(matches!(err, SemanticError::Undeclared { .. }));
    }

    #[test]
    fn function_declarations_and_calls_are_accepted_unchecked() {
        let input = indoc! {"
            fun add(a, b) {
                return a + b;
            }
            add(1, \"two\");
        "};
        check(input).expect("analysis should succeed");
    }

    #[test]
    fn call_results_do_not_initialize_typed_variables() {
        let err = check("int x = f();").expect_err("expected semantic error");
        assert!(matches!(
            err,
            SemanticError::InitializerMismatch {
                found: StaticType::Void,
                ..
            }
        ));
    }
}
