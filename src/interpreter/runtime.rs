use std::io::Write;

use crate::ast::{BinaryOperator, ExprKind, Expression, Statement, StmtKind, UnaryOperator};

use super::{Interpreter, RuntimeError, RuntimeResult, Value};

/// Control-flow marker for statement execution.
pub(super) enum ExecResult {
    Continue,
    Return { value: Value, line: usize },
}

impl<W: Write> Interpreter<W> {
    pub(super) fn exec_sequence(&mut self, body: &[Statement]) -> RuntimeResult<ExecResult> {
        for statement in body {
            match self.exec_statement(statement)? {
                ExecResult::Continue => {}
                returned @ ExecResult::Return { .. } => return Ok(returned),
            }
        }
        Ok(ExecResult::Continue)
    }

    /// Runs `body` in a fresh frame. The frame is popped even when a statement fails.
    fn exec_block(&mut self, body: &[Statement]) -> RuntimeResult<ExecResult> {
        self.environments.enter();
        let result = self.exec_sequence(body);
        self.environments.exit();
        result
    }

    fn exec_statement(&mut self, statement: &Statement) -> RuntimeResult<ExecResult> {
        match &statement.kind {
            StmtKind::VariableDeclaration {
                name, initializer, ..
            } => {
                let value = match initializer {
                    Some(initializer) => self.evaluate(initializer)?,
                    None => Value::Null,
                };
                self.environments.define(name.clone(), value);
                Ok(ExecResult::Continue)
            }
            StmtKind::Expr(expression) => {
                self.evaluate(expression)?;
                Ok(ExecResult::Continue)
            }
            StmtKind::Print(expression) => {
                let value = self.evaluate(expression)?;
                writeln!(self.output, "{value}").map_err(|error| RuntimeError::Output {
                    message: error.to_string(),
                })?;
                Ok(ExecResult::Continue)
            }
            StmtKind::Block(body) => self.exec_block(body),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.exec_statement(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.exec_statement(else_branch)
                } else {
                    Ok(ExecResult::Continue)
                }
            }
            StmtKind::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let returned @ ExecResult::Return { .. } = self.exec_statement(body)? {
                        return Ok(returned);
                    }
                }
                Ok(ExecResult::Continue)
            }
            StmtKind::For {
                initializer,
                condition,
                increment,
                body,
            } => {
                // The loop variable lives in its own frame around the body.
                self.environments.enter();
                let result = self.exec_for(
                    initializer.as_deref(),
                    condition.as_ref(),
                    increment.as_ref(),
                    body,
                );
                self.environments.exit();
                result
            }
            // Functions are parsed and checked but never bound or invoked.
            StmtKind::FunctionDecl { .. } => Ok(ExecResult::Continue),
            StmtKind::Return(value) => {
                let value = match value {
                    Some(value) => self.evaluate(value)?,
                    None => Value::Null,
                };
                Ok(ExecResult::Return {
                    value,
                    line: statement.line,
                })
            }
        }
    }

    fn exec_for(
        &mut self,
        initializer: Option<&Statement>,
        condition: Option<&Expression>,
        increment: Option<&Expression>,
        body: &Statement,
    ) -> RuntimeResult<ExecResult> {
        if let Some(initializer) = initializer {
            self.exec_statement(initializer)?;
        }
        loop {
            if let Some(condition) = condition
                && !self.evaluate(condition)?.is_truthy()
            {
                break;
            }
            if let returned @ ExecResult::Return { .. } = self.exec_statement(body)? {
                return Ok(returned);
            }
            if let Some(increment) = increment {
                self.evaluate(increment)?;
            }
        }
        Ok(ExecResult::Continue)
    }

    fn evaluate(&mut self, expression: &Expression) -> RuntimeResult<Value> {
        let line = expression.line;
        match &expression.kind {
            ExprKind::Literal(literal) => Ok(Value::from(literal)),
            ExprKind::Variable(name) => self
                .environments
                .lookup(name)
                .cloned()
                .ok_or_else(|| RuntimeError::UndefinedVariable {
                    name: name.clone(),
                    line,
                }),
            ExprKind::Assignment { name, value } => {
                let value = self.evaluate(value)?;
                self.environments
                    .assign(name, value.clone())
                    .map_err(|_| RuntimeError::UndefinedVariable {
                        name: name.clone(),
                        line,
                    })?;
                Ok(value)
            }
            ExprKind::BinaryOp { left, op, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                binary(*op, left, right, line)
            }
            ExprKind::UnaryOp { op, operand } => {
                let operand = self.evaluate(operand)?;
                match op {
                    UnaryOperator::Negate => Ok(Value::Float(-operand.to_f64(line)?)),
                    UnaryOperator::Not => Ok(Value::Boolean(!operand.is_truthy())),
                }
            }
            // Calls are inert: arguments stay unevaluated and the result is null.
            ExprKind::FunctionCall { .. } => Ok(Value::Null),
            ExprKind::Input { prompt } => self
                .input
                .read_line(prompt.as_deref())
                .map(Value::String)
                .map_err(|error| RuntimeError::Input {
                    message: error.to_string(),
                    line,
                }),
        }
    }
}

fn binary(op: BinaryOperator, left: Value, right: Value, line: usize) -> RuntimeResult<Value> {
    match op {
        BinaryOperator::Add => add(left, right, line),
        BinaryOperator::Sub => Ok(Value::Float(left.to_f64(line)? - right.to_f64(line)?)),
        BinaryOperator::Mul => Ok(Value::Float(left.to_f64(line)? * right.to_f64(line)?)),
        BinaryOperator::Div => Ok(Value::Float(left.to_f64(line)? / right.to_f64(line)?)),
        BinaryOperator::Less => Ok(Value::Boolean(left.to_f64(line)? < right.to_f64(line)?)),
        BinaryOperator::LessEqual => Ok(Value::Boolean(left.to_f64(line)? <= right.to_f64(line)?)),
        BinaryOperator::Greater => Ok(Value::Boolean(left.to_f64(line)? > right.to_f64(line)?)),
        BinaryOperator::GreaterEqual => {
            Ok(Value::Boolean(left.to_f64(line)? >= right.to_f64(line)?))
        }
        BinaryOperator::Equal => Ok(Value::Boolean(left == right)),
        BinaryOperator::NotEqual => Ok(Value::Boolean(left != right)),
        BinaryOperator::Mod | BinaryOperator::And | BinaryOperator::Or => {
            Err(RuntimeError::UnknownOperator { operator: op, line })
        }
    }
}

/// `+` prefers float arithmetic, then checked integer addition, then string
/// concatenation when either side is a string.
fn add(left: Value, right: Value, line: usize) -> RuntimeResult<Value> {
    match (&left, &right) {
        (Value::Float(_), _) | (_, Value::Float(_)) => {
            Ok(Value::Float(left.to_f64(line)? + right.to_f64(line)?))
        }
        (Value::Integer(a), Value::Integer(b)) => a
            .checked_add(*b)
            .map(Value::Integer)
            .ok_or(RuntimeError::IntegerOverflow {
                operator: BinaryOperator::Add,
                line,
            }),
        (Value::String(_), _) | (_, Value::String(_)) => {
            Ok(Value::String(format!("{left}{right}")))
        }
        _ => Err(RuntimeError::InvalidOperands {
            operator: BinaryOperator::Add,
            left: left.type_name(),
            right: right.type_name(),
            line,
        }),
    }
}
