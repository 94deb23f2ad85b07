//! The built-in function library, registered fresh for every run.

use basic_expr::{Args, FuncError, Funcs};
use basic_types::{format_number, Value};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::rc::Rc;

/// Register every builtin into `funcs`. `seed` fixes the RND sequence.
pub fn register(funcs: &mut Funcs, seed: Option<u64>) {
    register_math(funcs);
    register_rnd(funcs, seed);
    register_text(funcs);
}

fn unary(funcs: &mut Funcs, name: &str, f: fn(f64) -> f64) {
    funcs.add_number(name, move |args| {
        let args = Args::new(args);
        args.expect(1)?;
        Ok(f(args.number(0)?))
    });
}

fn register_math(funcs: &mut Funcs) {
    unary(funcs, "ABS", f64::abs);
    unary(funcs, "ATN", f64::atan);
    unary(funcs, "COS", f64::cos);
    unary(funcs, "EXP", f64::exp);
    unary(funcs, "INT", f64::floor);
    unary(funcs, "SIN", f64::sin);
    unary(funcs, "TAN", f64::tan);
    unary(funcs, "SGN", |n| {
        if n > 0.0 {
            1.0
        } else if n < 0.0 {
            -1.0
        } else {
            0.0
        }
    });

    funcs.add_number("LOG", |args| {
        let args = Args::new(args);
        args.expect(1)?;
        let n = args.number(0)?;
        if n <= 0.0 {
            return Err(FuncError::OutOfRange(format!("LOG of {}", format_number(n))));
        }
        Ok(n.ln())
    });
    funcs.add_number("SQR", |args| {
        let args = Args::new(args);
        args.expect(1)?;
        let n = args.number(0)?;
        if n < 0.0 {
            return Err(FuncError::OutOfRange(format!("SQR of {}", format_number(n))));
        }
        Ok(n.sqrt())
    });
    funcs.add_number("VAL", |args| {
        let args = Args::new(args);
        args.expect(1)?;
        let text = args.text(0)?.trim();
        text.parse::<f64>()
            .map_err(|_| FuncError::Failed(format!("VAL cannot read {text:?} as a number")))
    });
}

fn register_rnd(funcs: &mut Funcs, seed: Option<u64>) {
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let rng = Rc::new(RefCell::new(rng));
    // The argument is accepted for compatibility and ignored.
    funcs.add_number("RND", move |args| {
        Args::new(args).expect_between(0, 1)?;
        Ok(rng.borrow_mut().gen::<f64>())
    });
}

/// A non-negative count argument.
fn count(args: &Args<'_>, index: usize, what: &str) -> Result<usize, FuncError> {
    let n = args.int(index)?;
    usize::try_from(n).map_err(|_| FuncError::OutOfRange(format!("{what} {n}")))
}

fn register_text(funcs: &mut Funcs) {
    funcs.add_value("ASC", |args| {
        let args = Args::new(args);
        args.expect(1)?;
        let first = args
            .text(0)?
            .chars()
            .next()
            .ok_or_else(|| FuncError::OutOfRange("ASC of empty text".into()))?;
        Ok(Value::Number(f64::from(u32::from(first))))
    });
    funcs.add_value("CHR$", |args| {
        let args = Args::new(args);
        args.expect(1)?;
        let code = args.int(0)?;
        u32::try_from(code)
            .ok()
            .and_then(char::from_u32)
            .map(|c| Value::Text(c.to_string()))
            .ok_or_else(|| FuncError::OutOfRange(format!("CHR$ code {code}")))
    });
    funcs.add_value("LEN", |args| {
        let args = Args::new(args);
        args.expect(1)?;
        Ok(Value::Number(args.text(0)?.chars().count() as f64))
    });
    funcs.add_value("LEFT$", |args| {
        let args = Args::new(args);
        args.expect(2)?;
        let n = count(&args, 1, "LEFT$ length")?;
        Ok(Value::Text(args.text(0)?.chars().take(n).collect()))
    });
    funcs.add_value("RIGHT$", |args| {
        let args = Args::new(args);
        args.expect(2)?;
        let text = args.text(0)?;
        let n = count(&args, 1, "RIGHT$ length")?;
        let skip = text.chars().count().saturating_sub(n);
        Ok(Value::Text(text.chars().skip(skip).collect()))
    });
    funcs.add_value("MID$", |args| {
        let args = Args::new(args);
        args.expect_between(2, 3)?;
        let text = args.text(0)?;
        let start = count(&args, 1, "MID$ start")?;
        if start == 0 {
            return Err(FuncError::OutOfRange("MID$ start 0".into()));
        }
        let len = if args.len() == 3 {
            count(&args, 2, "MID$ length")?
        } else {
            usize::MAX
        };
        Ok(Value::Text(text.chars().skip(start - 1).take(len).collect()))
    });
    funcs.add_value("STR$", |args| {
        let args = Args::new(args);
        args.expect(1)?;
        Ok(Value::Text(format_number(args.number(0)?)))
    });
    funcs.add_value("TAB", |args| {
        let args = Args::new(args);
        args.expect(1)?;
        let n = args.int(0)?.max(0) as usize;
        Ok(Value::Text(" ".repeat(n)))
    });
}
