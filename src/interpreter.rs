use std::io::Write;

use crate::ast::Program;
use crate::config::Config;
use crate::scope::ScopeChain;

mod error;
mod input;
mod runtime;
mod value;

pub use error::{RuntimeError, RuntimeResult};
pub use input::{InputSource, PLACEHOLDER_INPUT, Placeholder, ScriptedInput, StdinInput};
pub use value::Value;

use runtime::ExecResult;

/// AST-walking executor. Static types on the tree are ignored; every
/// operation is checked again against the runtime values.
pub struct Interpreter<W: Write> {
    environments: ScopeChain<Value>,
    output: W,
    input: Box<dyn InputSource>,
}

impl<W: Write> Interpreter<W> {
    pub fn new(output: W) -> Self {
        Self {
            environments: ScopeChain::new(),
            output,
            input: Box::new(Placeholder::default()),
        }
    }

    pub fn from_config(config: &Config, output: W) -> Self {
        Self::new(output).with_input(config.input_source())
    }

    pub fn with_input(mut self, input: Box<dyn InputSource>) -> Self {
        self.input = input;
        self
    }

    /// Runs the top-level statements in order, stopping at the first error.
    /// Output already written stays written.
    pub fn execute(&mut self, program: &Program) -> RuntimeResult<()> {
        match self.exec_sequence(&program.statements)? {
            ExecResult::Continue => Ok(()),
            ExecResult::Return { value, line } => Err(RuntimeError::ReturnOutsideFunction {
                value: value.to_string(),
                line,
            }),
        }
    }

    /// Current binding of `name` in the innermost frame that has one.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.environments.lookup(name)
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOperator;
    use crate::lexer::tokenize;
    use crate::parser::parse_tokens;
    use indoc::indoc;

    // Programs run here skip semantic analysis so runtime checks are exercised directly.
    fn parse(source: &str) -> Program {
        parse_tokens(tokenize(source).expect("tokenize should succeed"))
            .expect("parse should succeed")
    }

    fn run(source: &str) -> (String, RuntimeResult<()>) {
        let program = parse(source);
        let mut interpreter = Interpreter::new(Vec::new());
        let result = interpreter.execute(&program);
        let output = String::from_utf8(interpreter.into_output()).expect("utf-8 output");
        (output, result)
    }

    fn run_ok(source: &str) -> String {
        let (output, result) = run(source);
        if let Err(error) = result {
            panic!("program failed: {error}");
        }
        output
    }

    #[test]
    fn prints_each_iteration_of_while_loop() {
        let source = indoc! {"
            int x = 2;
            while (x < 5) {
                print x;
                x = x + 1;
            }
        "};
        assert_eq!(run_ok(source), "2\n3\n4\n");
    }

    #[test]
    fn undefined_variable_aborts_without_output() {
        let (output, result) = run("print y;");
        assert_eq!(output, "");
        assert_eq!(
            result,
            Err(RuntimeError::UndefinedVariable {
                name: "y".to_string(),
                line: 1
            })
        );
    }

    #[test]
    fn keeps_output_written_before_failure() {
        let source = indoc! {"
            print 1;
            print missing;
            print 2;
        "};
        let (output, result) = run(source);
        assert_eq!(output, "1\n");
        assert!(matches!(
            result,
            Err(RuntimeError::UndefinedVariable { line: 2, .. })
        ));
    }

    #[test]
    fn block_bindings_disappear_after_the_block() {
        let source = indoc! {"
            int x = 1;
            {
                int x = 2;
                int inner = 3;
                print x;
                x = 5;
            }
            print x;
            print inner;
        "};
        let (output, result) = run(source);
        assert_eq!(output, "2\n1\n");
        assert!(matches!(
            result,
            Err(RuntimeError::UndefinedVariable { ref name, line: 9 }) if name == "inner"
        ));
    }

    #[test]
    fn assignment_in_block_updates_outer_binding() {
        let source = indoc! {"
            int total = 0;
            {
                total = total + 4;
            }
            print total;
        "};
        assert_eq!(run_ok(source), "4\n");
    }

    #[test]
    fn for_loop_variable_is_scoped_to_the_loop() {
        let source = indoc! {"
            for (int i = 0; i < 3; i++) print i;
            print i;
        "};
        let (output, result) = run(source);
        assert_eq!(output, "0\n1\n2\n");
        assert!(matches!(
            result,
            Err(RuntimeError::UndefinedVariable { line: 2, .. })
        ));
    }

    #[test]
    fn scope_is_restored_after_error_inside_block() {
        let program = parse("{ int temp = 1; print temp + true; }");
        let mut interpreter = Interpreter::new(Vec::new());
        assert!(interpreter.execute(&program).is_err());
        assert_eq!(interpreter.lookup("temp"), None);
    }

    #[test]
    fn assignment_to_undeclared_name_fails_after_earlier_output() {
        let (output, result) = run("print 1; ghost = 2; print 3;");
        assert_eq!(output, "1\n");
        assert_eq!(
            result,
            Err(RuntimeError::UndefinedVariable {
                name: "ghost".to_string(),
                line: 1
            })
        );
    }

    #[test]
    fn for_frame_is_dropped_when_body_fails() {
        let program = parse("for (int k = 0; k < 3; k++) { print k + true; }");
        let mut interpreter = Interpreter::new(Vec::new());
        assert!(matches!(
            interpreter.execute(&program),
            Err(RuntimeError::InvalidOperands {
                left: "int",
                right: "bool",
                ..
            })
        ));
        assert_eq!(interpreter.lookup("k"), None);
        assert!(interpreter.output().is_empty());
    }

    #[test]
    fn float_output_never_looks_like_an_integer() {
        let source = indoc! {"
            print 10000000000000000.0;
            print 1 / 0;
            print -1 / 0;
            print 0.1 + 0.2;
        "};
        assert_eq!(
            run_ok(source),
            "1e16\nInfinity\n-Infinity\n0.30000000000000004\n"
        );
    }

    #[test]
    fn for_without_clauses_stops_on_return() {
        let source = indoc! {"
            int n = 0;
            for (;;) {
                n += 1;
                if (n == 3) return n;
            }
        "};
        let (_, result) = run(source);
        assert_eq!(
            result,
            Err(RuntimeError::ReturnOutsideFunction {
                value: "3".to_string(),
                line: 4
            })
        );
    }

    #[test]
    fn logical_not_uses_truthiness() {
        let source = indoc! {"
            print !0;
            print !null;
            print !false;
            print !\"\";
        "};
        assert_eq!(run_ok(source), "false\ntrue\ntrue\nfalse\n");
    }

    #[test]
    fn arithmetic_widens_to_float_except_integer_addition() {
        let source = indoc! {"
            print 2 + 3;
            print 2 + 0.5;
            print 7 - 2;
            print 3 * 4;
            print 7 / 2;
            print -4;
        "};
        assert_eq!(run_ok(source), "5\n2.5\n5.0\n12.0\n3.5\n-4.0\n");
    }

    #[test]
    fn plus_concatenates_when_either_side_is_a_string() {
        let source = indoc! {"
            print \"a\" + 1;
            print 2 + \"b\";
            print \"x\" + 'y';
            print \"n\" + null;
        "};
        assert_eq!(run_ok(source), "a1\n2b\nxy\nnnull\n");
    }

    #[test]
    fn plus_rejects_non_numeric_non_string_operands() {
        let (_, result) = run("print true + 'c';");
        assert_eq!(
            result,
            Err(RuntimeError::InvalidOperands {
                operator: BinaryOperator::Add,
                left: "bool",
                right: "char",
                line: 1
            })
        );

        let (_, result) = run("print 1.5 + \"s\";");
        assert!(matches!(result, Err(RuntimeError::ExpectedNumber { .. })));
    }

    #[test]
    fn integer_addition_overflow_is_reported() {
        let (_, result) = run("int big = 9223372036854775807;\nprint big + 1;");
        assert_eq!(
            result,
            Err(RuntimeError::IntegerOverflow {
                operator: BinaryOperator::Add,
                line: 2
            })
        );
    }

    #[test]
    fn comparisons_coerce_numbers_and_equality_is_structural() {
        let source = indoc! {"
            print 1 < 1.5;
            print 2 >= 2;
            print 1 == 1;
            print 1 == 1.0;
            print \"a\" == \"a\";
            print null == null;
            print 'c' != 'd';
        "};
        assert_eq!(run_ok(source), "true\ntrue\ntrue\nfalse\ntrue\ntrue\ntrue\n");
    }

    #[test]
    fn relational_operators_need_numbers() {
        let (_, result) = run("print \"a\" < \"b\";");
        assert_eq!(
            result,
            Err(RuntimeError::ExpectedNumber {
                found: "a".to_string(),
                line: 1
            })
        );
    }

    #[test]
    fn modulo_is_not_evaluated() {
        let (_, result) = run("print 7 % 2;");
        assert_eq!(
            result,
            Err(RuntimeError::UnknownOperator {
                operator: BinaryOperator::Mod,
                line: 1
            })
        );
    }

    #[test]
    fn declaration_without_initializer_is_null() {
        assert_eq!(run_ok("string s;\nprint s;"), "null\n");
    }

    #[test]
    fn functions_and_calls_are_inert() {
        let source = indoc! {"
            fun shout(word) {
                print word;
            }
            print shout(undefined_name);
            print \"after\";
        "};
        assert_eq!(run_ok(source), "null\nafter\n");
    }

    #[test]
    fn input_uses_configured_source() {
        let source = indoc! {"
            string first = input \"name? \";
            print first;
            print input;
        "};
        assert_eq!(run_ok(source), "user_input\nuser_input\n");

        let program = parse(source);
        let mut interpreter =
            Interpreter::new(Vec::new()).with_input(Box::new(ScriptedInput::new(["Ada"])));
        interpreter.execute(&program).expect("program should run");
        let output = String::from_utf8(interpreter.into_output()).expect("utf-8 output");
        assert_eq!(output, "Ada\n\n");
    }

    #[test]
    fn input_statement_discards_the_line() {
        let program = parse("input \"ignored\";\nprint 1;");
        let mut interpreter =
            Interpreter::new(Vec::new()).with_input(Box::new(ScriptedInput::new(["a", "b"])));
        interpreter.execute(&program).expect("program should run");
        assert_eq!(interpreter.output(), b"1\n");
    }
}
