//! Parsed program structure.

use basic_expr::Expr;
use basic_types::{Location, Value};

/// A parsed program: numbered lines in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub lines: Vec<Line>,
}

impl Program {
    /// Index of the first line with `number`, searched linearly.
    pub fn find_line(&self, number: u32) -> Option<usize> {
        self.lines.iter().position(|line| line.number == number)
    }

    /// Every DATA constant in program order.
    pub fn data_values(&self) -> Vec<Value> {
        let mut values = Vec::new();
        for line in &self.lines {
            collect_data(&line.stmts, &mut values);
        }
        values
    }

    pub fn statement_count(&self) -> usize {
        self.lines.iter().map(|line| line.stmts.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn collect_data(stmts: &[Stmt], values: &mut Vec<Value>) {
    for stmt in stmts {
        match stmt {
            Stmt::Data { values: data } => values.extend(data.iter().cloned()),
            Stmt::IfStmts { stmts, .. } => collect_data(stmts, values),
            Stmt::IfElseStmts {
                stmts, else_stmts, ..
            } => {
                collect_data(stmts, values);
                collect_data(else_stmts, values);
            }
            _ => {}
        }
    }
}

/// One numbered line.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub number: u32,
    pub source_line: usize,
    pub text: String,
    pub stmts: Vec<Stmt>,
}

impl Line {
    pub fn location(&self) -> Location {
        Location::new(self.number, self.source_line)
    }
}

/// `NAME(sub, sub, ...)`
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayRef {
    pub name: String,
    pub subscripts: Vec<Expr>,
}

/// A storage location written by LET, READ or INPUT.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Scalar(String),
    Element(ArrayRef),
}

impl Target {
    pub fn name(&self) -> &str {
        match self {
            Target::Scalar(name) => name,
            Target::Element(r) => &r.name,
        }
    }
}

/// `NAME(size, size, ...)` in a DIM statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayDecl {
    pub name: String,
    pub dims: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrintItem {
    Expr(Expr),
    /// Advance to the next tab stop.
    Comma,
    /// No spacing; suppresses the newline when last.
    Semicolon,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Data {
        values: Vec<Value>,
    },
    Def {
        name: String,
        params: Vec<String>,
        body: Expr,
    },
    Dim {
        arrays: Vec<ArrayDecl>,
    },
    End,
    For {
        var: String,
        initial: Expr,
        limit: Expr,
        step: Expr,
    },
    Gosub {
        line: u32,
    },
    Goto {
        line: u32,
    },
    IfLine {
        cond: Expr,
        line: u32,
    },
    IfElseLine {
        cond: Expr,
        line: u32,
        else_line: u32,
    },
    IfStmts {
        cond: Expr,
        stmts: Vec<Stmt>,
    },
    IfElseStmts {
        cond: Expr,
        stmts: Vec<Stmt>,
        else_stmts: Vec<Stmt>,
    },
    Input {
        prompt: Option<String>,
        targets: Vec<Target>,
    },
    Let {
        target: Target,
        expr: Expr,
    },
    /// Empty `vars` closes the innermost loop.
    Next {
        vars: Vec<String>,
    },
    OnGosub {
        expr: Expr,
        lines: Vec<u32>,
    },
    OnGoto {
        expr: Expr,
        lines: Vec<u32>,
    },
    Print {
        items: Vec<PrintItem>,
    },
    Read {
        targets: Vec<Target>,
    },
    Rem {
        text: String,
    },
    Restore,
    Return,
    Stop,
    Assign {
        var: String,
        expr: Expr,
    },
    AssignArray {
        target: ArrayRef,
        expr: Expr,
    },
}

impl Stmt {
    /// Statement keyword, for logs.
    pub fn keyword(&self) -> &'static str {
        match self {
            Stmt::Data { .. } => "DATA",
            Stmt::Def { .. } => "DEF",
            Stmt::Dim { .. } => "DIM",
            Stmt::End => "END",
            Stmt::For { .. } => "FOR",
            Stmt::Gosub { .. } => "GOSUB",
            Stmt::Goto { .. } => "GOTO",
            Stmt::IfLine { .. }
            | Stmt::IfElseLine { .. }
            | Stmt::IfStmts { .. }
            | Stmt::IfElseStmts { .. } => "IF",
            Stmt::Input { .. } => "INPUT",
            Stmt::Let { .. } => "LET",
            Stmt::Next { .. } => "NEXT",
            Stmt::OnGosub { .. } | Stmt::OnGoto { .. } => "ON",
            Stmt::Print { .. } => "PRINT",
            Stmt::Read { .. } => "READ",
            Stmt::Rem { .. } => "REM",
            Stmt::Restore => "RESTORE",
            Stmt::Return => "RETURN",
            Stmt::Stop => "STOP",
            Stmt::Assign { .. } | Stmt::AssignArray { .. } => "ASSIGN",
        }
    }
}
