//! The execution engine: walks a parsed program statement by statement.

use crate::array::{to_coord, ArrayError, ArrayStore};
use crate::builtins;
use crate::config::RunConfig;
use crate::console::Console;
use crate::data::DataCursor;
use crate::error::{RunError, RunResult, RuntimeError};
use basic_expr::{Args, Expr, FuncError, Funcs, Vars};
use basic_lexer::split::split_outside_quotes;
use basic_parser::{ArrayDecl, ArrayRef, PrintItem, Program, Stmt, Target};
use basic_types::{format_number, is_text_name, Value};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, trace, warn};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    End,
    Stop { line: u32 },
    /// Execution ran past the last line.
    FellOff,
}

/// A statement address. `block` is either a line's statement list or the
/// branch of an inline IF, which always runs to the end of its line.
#[derive(Debug, Clone, Copy)]
pub struct Position<'p> {
    pub line: usize,
    pub stmt: usize,
    block: &'p [Stmt],
}

impl<'p> Position<'p> {
    fn next(self) -> Self {
        Self {
            stmt: self.stmt + 1,
            ..self
        }
    }
}

/// One active FOR loop.
#[derive(Debug, Clone)]
pub struct ForState<'p> {
    pub resume: Position<'p>,
    pub var: String,
    pub limit: f64,
    pub step: f64,
}

enum Flow<'p> {
    Next,
    Jump(Position<'p>),
    Halt(RunOutcome),
}

pub struct Interpreter<'p, 'c> {
    program: &'p Program,
    console: &'c mut dyn Console,
    config: RunConfig,
    vars: Vars,
    funcs: Funcs,
    arrays: HashMap<String, Rc<RefCell<ArrayStore>>>,
    for_stack: Vec<ForState<'p>>,
    returns: Vec<Position<'p>>,
    data: DataCursor,
    column: usize,
    steps: u64,
}

impl<'p, 'c> Interpreter<'p, 'c> {
    pub fn new(program: &'p Program, console: &'c mut dyn Console, config: RunConfig) -> Self {
        let mut funcs = Funcs::new();
        builtins::register(&mut funcs, config.seed);
        let data = DataCursor::new(program.data_values());
        debug!(constants = data.len(), "collected DATA");
        Self {
            program,
            console,
            config,
            vars: Vars::new(),
            funcs,
            arrays: HashMap::new(),
            for_stack: Vec::new(),
            returns: Vec::new(),
            data,
            column: 0,
            steps: 0,
        }
    }

    pub fn vars(&self) -> &Vars {
        &self.vars
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn for_stack(&self) -> &[ForState<'p>] {
        &self.for_stack
    }

    /// Run from the first line until END, STOP, an error, or the last line.
    pub fn run(&mut self) -> Result<RunOutcome, RunError> {
        let program = self.program;
        let mut pos = self.line_start(0);
        loop {
            let Some(line) = program.lines.get(pos.line) else {
                debug!(steps = self.steps, "ran past the last line");
                return Ok(RunOutcome::FellOff);
            };
            let Some(stmt) = pos.block.get(pos.stmt) else {
                pos = self.line_start(pos.line + 1);
                continue;
            };
            trace!(line = line.number, stmt = stmt.keyword(), "exec");
            let flow = self
                .tick()
                .and_then(|()| self.exec(stmt, pos))
                .map_err(|error| RunError {
                    location: line.location(),
                    source_text: line.text.clone(),
                    error,
                })?;
            match flow {
                Flow::Next => pos = pos.next(),
                Flow::Jump(target) => pos = target,
                Flow::Halt(outcome) => {
                    debug!(?outcome, steps = self.steps, "run finished");
                    return Ok(outcome);
                }
            }
        }
    }

    fn tick(&mut self) -> RunResult<()> {
        self.steps += 1;
        match self.config.max_steps {
            Some(max) if self.steps > max => Err(RuntimeError::StepLimit(max)),
            _ => Ok(()),
        }
    }

    fn line_start(&self, line: usize) -> Position<'p> {
        let program: &'p Program = self.program;
        Position {
            line,
            stmt: 0,
            block: program
                .lines
                .get(line)
                .map(|l| l.stmts.as_slice())
                .unwrap_or(&[]),
        }
    }

    fn goto(&self, number: u32) -> RunResult<Position<'p>> {
        self.program
            .find_line(number)
            .map(|idx| self.line_start(idx))
            .ok_or(RuntimeError::UndefinedLine(number))
    }

    fn eval(&self, expr: &Expr) -> RunResult<Value> {
        Ok(expr.eval(&self.vars, &self.funcs)?)
    }

    fn eval_number(&self, expr: &Expr) -> RunResult<f64> {
        Ok(expr.eval_number(&self.vars, &self.funcs)?)
    }

    fn exec(&mut self, stmt: &'p Stmt, pos: Position<'p>) -> RunResult<Flow<'p>> {
        match stmt {
            Stmt::Data { .. } | Stmt::Rem { .. } => Ok(Flow::Next),
            Stmt::Def { name, params, body } => {
                self.funcs.define(name, params.clone(), body.clone());
                Ok(Flow::Next)
            }
            Stmt::Dim { arrays } => {
                for decl in arrays {
                    self.dim(decl)?;
                }
                Ok(Flow::Next)
            }
            Stmt::End => Ok(Flow::Halt(RunOutcome::End)),
            Stmt::Stop => Ok(Flow::Halt(RunOutcome::Stop {
                line: self.program.lines[pos.line].number,
            })),
            Stmt::For {
                var,
                initial,
                limit,
                step,
            } => self.exec_for(var, initial, limit, step, pos),
            Stmt::Next { vars } => self.exec_next(vars),
            Stmt::Goto { line } => {
                debug!(to = line, "GOTO");
                Ok(Flow::Jump(self.goto(*line)?))
            }
            Stmt::Gosub { line } => self.gosub(*line, pos),
            Stmt::Return => {
                let resume = self.returns.pop().ok_or(RuntimeError::ReturnWithoutGosub)?;
                debug!(depth = self.returns.len(), "RETURN");
                Ok(Flow::Jump(resume))
            }
            Stmt::IfLine { cond, line } => {
                if self.eval(cond)?.is_truthy() {
                    Ok(Flow::Jump(self.goto(*line)?))
                } else {
                    Ok(Flow::Next)
                }
            }
            Stmt::IfElseLine {
                cond,
                line,
                else_line,
            } => {
                let target = if self.eval(cond)?.is_truthy() {
                    *line
                } else {
                    *else_line
                };
                Ok(Flow::Jump(self.goto(target)?))
            }
            Stmt::IfStmts { cond, stmts } => {
                if self.eval(cond)?.is_truthy() {
                    Ok(Flow::Jump(Self::enter(stmts, pos)))
                } else {
                    Ok(Flow::Next)
                }
            }
            Stmt::IfElseStmts {
                cond,
                stmts,
                else_stmts,
            } => {
                let branch = if self.eval(cond)?.is_truthy() {
                    stmts
                } else {
                    else_stmts
                };
                Ok(Flow::Jump(Self::enter(branch, pos)))
            }
            Stmt::Input { prompt, targets } => {
                self.input(prompt.as_deref(), targets)?;
                Ok(Flow::Next)
            }
            Stmt::Let { target, expr } => {
                let value = self.eval(expr)?;
                self.store(target, value)?;
                Ok(Flow::Next)
            }
            Stmt::Assign { var, expr } => {
                let value = self.eval(expr)?;
                self.vars.set(var, value);
                Ok(Flow::Next)
            }
            Stmt::AssignArray { target, expr } => {
                let value = self.eval(expr)?;
                self.store_element(target, value)?;
                Ok(Flow::Next)
            }
            Stmt::OnGoto { expr, lines } => {
                let line = self.on_target(expr, lines, f64::round)?;
                debug!(to = line, "ON GOTO");
                Ok(Flow::Jump(self.goto(line)?))
            }
            Stmt::OnGosub { expr, lines } => {
                let line = self.on_target(expr, lines, f64::trunc)?;
                self.gosub(line, pos)
            }
            Stmt::Print { items } => {
                self.print(items)?;
                Ok(Flow::Next)
            }
            Stmt::Read { targets } => {
                for target in targets {
                    let value = self.data.read().cloned().ok_or(RuntimeError::OutOfData)?;
                    let value = convert_for(target.name(), value)?;
                    self.store(target, value)?;
                }
                Ok(Flow::Next)
            }
            Stmt::Restore => {
                self.data.restore();
                Ok(Flow::Next)
            }
        }
    }

    /// Run an inline IF branch in place of the rest of the line.
    fn enter(block: &'p [Stmt], pos: Position<'p>) -> Position<'p> {
        Position {
            line: pos.line,
            stmt: 0,
            block,
        }
    }

    fn gosub(&mut self, line: u32, pos: Position<'p>) -> RunResult<Flow<'p>> {
        let target = self.goto(line)?;
        self.returns.push(pos.next());
        debug!(to = line, depth = self.returns.len(), "GOSUB");
        Ok(Flow::Jump(target))
    }

    /// Pick the 1-based target of an ON statement. ON GOTO rounds the index
    /// to the nearest integer, ON GOSUB truncates it.
    fn on_target(
        &self,
        expr: &Expr,
        lines: &[u32],
        to_index: fn(f64) -> f64,
    ) -> RunResult<u32> {
        let index = to_index(self.eval_number(expr)?) as i64;
        usize::try_from(index)
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| lines.get(i).copied())
            .ok_or(RuntimeError::OnIndex {
                index,
                len: lines.len(),
            })
    }

    // ── Loops ────────────────────────────────────────────────────────

    fn exec_for(
        &mut self,
        var: &str,
        initial: &Expr,
        limit: &Expr,
        step: &Expr,
        pos: Position<'p>,
    ) -> RunResult<Flow<'p>> {
        let initial = self.eval_number(initial)?;
        let limit = self.eval_number(limit)?;
        let step = self.eval_number(step)?;
        self.vars.set(var, Value::Number(initial));
        if let Some(idx) = self.for_stack.iter().rposition(|f| f.var == var) {
            self.for_stack.truncate(idx);
        }
        self.for_stack.push(ForState {
            resume: pos.next(),
            var: var.to_string(),
            limit,
            step,
        });
        Ok(Flow::Next)
    }

    fn exec_next(&mut self, names: &[String]) -> RunResult<Flow<'p>> {
        if names.is_empty() {
            return self.next_loop(None);
        }
        for name in names {
            if let Flow::Jump(resume) = self.next_loop(Some(name.as_str()))? {
                return Ok(Flow::Jump(resume));
            }
        }
        Ok(Flow::Next)
    }

    /// Advance the loop for `name` (or the innermost loop).
    fn next_loop(&mut self, name: Option<&str>) -> RunResult<Flow<'p>> {
        let idx = match name {
            Some(name) => self.for_stack.iter().rposition(|f| f.var == name),
            None => self.for_stack.len().checked_sub(1),
        }
        .ok_or_else(|| RuntimeError::NextWithoutFor {
            var: name.map(str::to_string),
        })?;
        let state = &self.for_stack[idx];
        let current = self
            .vars
            .get(&state.var)
            .and_then(Value::as_number)
            .ok_or_else(|| RuntimeError::LoopVariable(state.var.clone()))?;
        let value = current + state.step;
        let more = if state.step >= 0.0 {
            value <= state.limit
        } else {
            value >= state.limit
        };
        if more {
            let resume = state.resume;
            self.vars.set(&state.var, Value::Number(value));
            self.for_stack.truncate(idx + 1);
            trace!(var = %self.for_stack[idx].var, value, "NEXT loops");
            Ok(Flow::Jump(resume))
        } else {
            debug!(var = %state.var, "loop done");
            self.for_stack.truncate(idx);
            Ok(Flow::Next)
        }
    }

    // ── Arrays and storage ───────────────────────────────────────────

    fn dim(&mut self, decl: &ArrayDecl) -> RunResult<()> {
        let array_err = |source| RuntimeError::Array {
            name: decl.name.clone(),
            source,
        };
        let mut dims = Vec::with_capacity(decl.dims.len());
        for size in &decl.dims {
            let n = self.eval_number(size)?;
            if !n.is_finite() || n < 0.0 {
                return Err(array_err(ArrayError::InvalidSize(n)));
            }
            dims.push(n.trunc() as usize);
        }
        let store = ArrayStore::new(is_text_name(&decl.name), dims).map_err(array_err)?;
        debug!(name = %decl.name, dims = ?store.dims(), "DIM");
        let store = Rc::new(RefCell::new(store));
        let reader = Rc::clone(&store);
        self.funcs.add_value(&decl.name, move |args| {
            let coords = coords_of(args)?;
            reader
                .borrow()
                .get(&coords)
                .map_err(|e| FuncError::OutOfRange(e.to_string()))
        });
        self.arrays.insert(decl.name.clone(), store);
        Ok(())
    }

    fn store(&mut self, target: &Target, value: Value) -> RunResult<()> {
        match target {
            Target::Scalar(name) => {
                self.vars.set(name, value);
                Ok(())
            }
            Target::Element(element) => self.store_element(element, value),
        }
    }

    fn store_element(&mut self, target: &ArrayRef, value: Value) -> RunResult<()> {
        let array_err = |source| RuntimeError::Array {
            name: target.name.clone(),
            source,
        };
        let mut coords = Vec::with_capacity(target.subscripts.len());
        for sub in &target.subscripts {
            coords.push(to_coord(self.eval_number(sub)?).map_err(array_err)?);
        }
        let store = self
            .arrays
            .get(&target.name)
            .ok_or_else(|| RuntimeError::UnknownArray(target.name.clone()))?;
        store.borrow_mut().set(&coords, value).map_err(array_err)
    }

    // ── Console statements ───────────────────────────────────────────

    fn write(&mut self, text: &str) -> RunResult<()> {
        match text.rfind('\n') {
            Some(nl) => self.column = text[nl + 1..].chars().count(),
            None => self.column += text.chars().count(),
        }
        self.console.write(text)?;
        Ok(())
    }

    fn print(&mut self, items: &[PrintItem]) -> RunResult<()> {
        let tab = self.config.tab_width.max(1);
        for item in items {
            match item {
                PrintItem::Expr(expr) => {
                    let text = self.eval(expr)?.to_string();
                    self.write(&text)?;
                }
                PrintItem::Comma => {
                    let pad = tab - self.column % tab;
                    self.write(&" ".repeat(pad))?;
                }
                PrintItem::Semicolon => {}
            }
        }
        if !matches!(items.last(), Some(PrintItem::Semicolon)) {
            self.write("\n")?;
        }
        Ok(())
    }

    fn input(&mut self, prompt: Option<&str>, targets: &[Target]) -> RunResult<()> {
        loop {
            self.write(&format!("{}? ", prompt.unwrap_or("")))?;
            let line = self.console.read_line()?.ok_or(RuntimeError::InputClosed)?;
            self.column = 0;
            match parse_input_line(&line, targets) {
                Some(values) => {
                    for (target, value) in targets.iter().zip(values) {
                        self.store(target, value)?;
                    }
                    return Ok(());
                }
                None => {
                    warn!(input = %line, expected = targets.len(), "INPUT re-prompt");
                    self.write("?REDO FROM START\n")?;
                }
            }
        }
    }
}

/// Evaluated array subscripts as coordinates.
fn coords_of(values: &[Value]) -> Result<Vec<usize>, FuncError> {
    let args = Args::new(values);
    (0..args.len())
        .map(|i| to_coord(args.number(i)?).map_err(|e| FuncError::OutOfRange(e.to_string())))
        .collect()
}

/// Convert `value` to the kind named by `target`.
fn convert_for(target: &str, value: Value) -> RunResult<Value> {
    match (is_text_name(target), value) {
        (true, Value::Number(n)) => Ok(Value::Text(format_number(n))),
        (true, text @ Value::Text(_)) => Ok(text),
        (false, number @ Value::Number(_)) => Ok(number),
        (false, Value::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|_| RuntimeError::NotNumeric {
                target: target.to_string(),
                value: s,
            }),
    }
}

/// Split one INPUT reply into values, or `None` when it doesn't fit.
fn parse_input_line(line: &str, targets: &[Target]) -> Option<Vec<Value>> {
    let pieces = split_outside_quotes(line, ',');
    if pieces.len() != targets.len() {
        return None;
    }
    targets
        .iter()
        .zip(pieces)
        .map(|(target, piece)| {
            let piece = piece.trim();
            let piece = piece
                .strip_prefix('"')
                .and_then(|p| p.strip_suffix('"'))
                .unwrap_or(piece);
            convert_for(target.name(), Value::Text(piece.to_string())).ok()
        })
        .collect()
}

/// Run `program` to completion with fresh state.
pub fn run_program(
    program: &Program,
    console: &mut dyn Console,
    config: RunConfig,
) -> Result<RunOutcome, RunError> {
    Interpreter::new(program, console, config).run()
}
