use serde_json::Value;
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::Arc;
use crate::errors::Result;

/// Trait for pluggable functions callable from panel expressions.
pub trait Function: Send + Sync {
    fn name(&self) -> &'static str;
    fn arity(&self) -> RangeInclusive<usize>;
    fn call(&self, args: &[Value]) -> Result<Value>;
}

/// Thread-safe function registry.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<HashMap<&'static str, Arc<dyn Function>>>,
}

impl Registry {
    pub fn new() -> Self { Self::default() }

    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        reg.register(builtins::Abs);
        reg.register(builtins::Round);
        reg.register(builtins::Floor);
        reg.register(builtins::Ceil);
        reg.register(builtins::Min);
        reg.register(builtins::Max);
        reg.register(builtins::Sum);
        reg.register(builtins::Avg);
        reg.register(builtins::Lower);
        reg.register(builtins::Upper);
        reg.register(builtins::Len);
        reg.register(builtins::Concat);
        reg.register(builtins::Coalesce);
        reg
    }

    pub fn register<F: Function + 'static>(&mut self, f: F) {
        let mut_map = Arc::make_mut(&mut self.inner);
        mut_map.insert(f.name(), Arc::new(f));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Function>> {
        self.inner.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.inner.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

pub mod builtins {
    use super::*;
    use crate::errors::EvalError;
    use crate::values::{as_number, number, to_display, type_name};

    const VARIADIC: RangeInclusive<usize> = 1..=usize::MAX;

    fn first_arg(args: &[Value]) -> &Value {
        args.first().unwrap_or(&Value::Null)
    }

    fn num_arg(fname: &str, v: &Value) -> Result<f64> {
        as_number(v).ok_or_else(|| {
            EvalError::Expression(format!("{fname}() expects a number, got {}", type_name(v)))
        })
    }

    /// Variadic numeric arguments; array arguments contribute their elements.
    fn num_args(fname: &str, args: &[Value]) -> Result<Vec<f64>> {
        let mut out = Vec::with_capacity(args.len());
        for arg in args {
            match arg {
                Value::Array(items) => {
                    for item in items {
                        out.push(num_arg(fname, item)?);
                    }
                }
                other => out.push(num_arg(fname, other)?),
            }
        }
        Ok(out)
    }

    pub struct Abs;
    impl Function for Abs {
        fn name(&self) -> &'static str { "abs" }
        fn arity(&self) -> RangeInclusive<usize> { 1..=1 }
        fn call(&self, args: &[Value]) -> Result<Value> {
            number(num_arg("abs", first_arg(args))?.abs())
        }
    }

    pub struct Round;
    impl Function for Round {
        fn name(&self) -> &'static str { "round" }
        fn arity(&self) -> RangeInclusive<usize> { 1..=2 }
        fn call(&self, args: &[Value]) -> Result<Value> {
            let x = num_arg("round", first_arg(args))?;
            let digits = match args.get(1) {
                Some(d) => num_arg("round", d)?.trunc() as i32,
                None => 0,
            };
            let scale = 10f64.powi(digits);
            number((x * scale).round() / scale)
        }
    }

    pub struct Floor;
    impl Function for Floor {
        fn name(&self) -> &'static str { "floor" }
        fn arity(&self) -> RangeInclusive<usize> { 1..=1 }
        fn call(&self, args: &[Value]) -> Result<Value> {
            number(num_arg("floor", first_arg(args))?.floor())
        }
    }

    pub struct Ceil;
    impl Function for Ceil {
        fn name(&self) -> &'static str { "ceil" }
        fn arity(&self) -> RangeInclusive<usize> { 1..=1 }
        fn call(&self, args: &[Value]) -> Result<Value> {
            number(num_arg("ceil", first_arg(args))?.ceil())
        }
    }

    pub struct Min;
    impl Function for Min {
        fn name(&self) -> &'static str { "min" }
        fn arity(&self) -> RangeInclusive<usize> { VARIADIC }
        fn call(&self, args: &[Value]) -> Result<Value> {
            let nums = num_args("min", args)?;
            match nums.into_iter().reduce(f64::min) {
                Some(m) => number(m),
                None => Ok(Value::Null),
            }
        }
    }

    pub struct Max;
    impl Function for Max {
        fn name(&self) -> &'static str { "max" }
        fn arity(&self) -> RangeInclusive<usize> { VARIADIC }
        fn call(&self, args: &[Value]) -> Result<Value> {
            let nums = num_args("max", args)?;
            match nums.into_iter().reduce(f64::max) {
                Some(m) => number(m),
                None => Ok(Value::Null),
            }
        }
    }

    pub struct Sum;
    impl Function for Sum {
        fn name(&self) -> &'static str { "sum" }
        fn arity(&self) -> RangeInclusive<usize> { VARIADIC }
        fn call(&self, args: &[Value]) -> Result<Value> {
            number(num_args("sum", args)?.into_iter().sum())
        }
    }

    pub struct Avg;
    impl Function for Avg {
        fn name(&self) -> &'static str { "avg" }
        fn arity(&self) -> RangeInclusive<usize> { VARIADIC }
        fn call(&self, args: &[Value]) -> Result<Value> {
            let nums = num_args("avg", args)?;
            if nums.is_empty() {
                return Ok(Value::Null);
            }
            number(nums.iter().sum::<f64>() / nums.len() as f64)
        }
    }

    pub struct Lower;
    impl Function for Lower {
        fn name(&self) -> &'static str { "lower" }
        fn arity(&self) -> RangeInclusive<usize> { 1..=1 }
        fn call(&self, args: &[Value]) -> Result<Value> {
            Ok(match first_arg(args) {
                Value::String(t) => Value::String(t.to_lowercase()),
                other => other.clone(),
            })
        }
    }

    pub struct Upper;
    impl Function for Upper {
        fn name(&self) -> &'static str { "upper" }
        fn arity(&self) -> RangeInclusive<usize> { 1..=1 }
        fn call(&self, args: &[Value]) -> Result<Value> {
            Ok(match first_arg(args) {
                Value::String(t) => Value::String(t.to_uppercase()),
                other => other.clone(),
            })
        }
    }

    pub struct Len;
    impl Function for Len {
        fn name(&self) -> &'static str { "len" }
        fn arity(&self) -> RangeInclusive<usize> { 1..=1 }
        fn call(&self, args: &[Value]) -> Result<Value> {
            let len = match first_arg(args) {
                Value::Null => 0,
                Value::String(s) => s.chars().count(),
                Value::Array(a) => a.len(),
                Value::Object(m) => m.len(),
                other => {
                    return Err(EvalError::Expression(format!(
                        "len() expects a string, array or object, got {}",
                        type_name(other)
                    )))
                }
            };
            Ok(Value::from(len))
        }
    }

    pub struct Concat;
    impl Function for Concat {
        fn name(&self) -> &'static str { "concat" }
        fn arity(&self) -> RangeInclusive<usize> { VARIADIC }
        fn call(&self, args: &[Value]) -> Result<Value> {
            Ok(Value::String(args.iter().map(to_display).collect()))
        }
    }

    pub struct Coalesce;
    impl Function for Coalesce {
        fn name(&self) -> &'static str { "coalesce" }
        fn arity(&self) -> RangeInclusive<usize> { VARIADIC }
        fn call(&self, args: &[Value]) -> Result<Value> {
            Ok(args.iter().find(|v| !v.is_null()).cloned().unwrap_or(Value::Null))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(name: &str, args: &[Value]) -> Result<Value> {
        Registry::with_builtins().get(name).expect("builtin").call(args)
    }

    #[test]
    fn numeric_builtins() {
        assert_eq!(call("abs", &[json!(-4)]).unwrap(), json!(4));
        assert_eq!(call("round", &[json!(2.346), json!(2)]).unwrap(), json!(2.35));
        assert_eq!(call("round", &[json!("7.5")]).unwrap(), json!(8));
        assert_eq!(call("floor", &[json!(1.9)]).unwrap(), json!(1));
        assert_eq!(call("ceil", &[json!(1.1)]).unwrap(), json!(2));
        assert_eq!(call("min", &[json!(3), json!([1, 5])]).unwrap(), json!(1));
        assert_eq!(call("max", &[json!(3), json!([1, 5])]).unwrap(), json!(5));
        assert_eq!(call("sum", &[json!([1, 2, 3])]).unwrap(), json!(6));
        assert_eq!(call("avg", &[json!(1), json!(2)]).unwrap(), json!(1.5));
        assert_eq!(call("avg", &[json!([])]).unwrap(), Value::Null);
        assert!(call("abs", &[json!("x")]).is_err());
    }

    #[test]
    fn text_builtins() {
        assert_eq!(call("lower", &[json!("MiXeD")]).unwrap(), json!("mixed"));
        assert_eq!(call("upper", &[json!("MiXeD")]).unwrap(), json!("MIXED"));
        assert_eq!(call("len", &[json!("héllo")]).unwrap(), json!(5));
        assert!(call("len", &[json!(3)]).is_err());
        assert_eq!(call("concat", &[json!("n="), json!(2.0), json!(null)]).unwrap(), json!("n=2"));
        assert_eq!(call("coalesce", &[json!(null), json!(0), json!(1)]).unwrap(), json!(0));
    }

    struct Double;
    impl Function for Double {
        fn name(&self) -> &'static str { "double" }
        fn arity(&self) -> RangeInclusive<usize> { 1..=1 }
        fn call(&self, args: &[Value]) -> Result<Value> {
            crate::values::number(args.first().and_then(Value::as_f64).unwrap_or(0.0) * 2.0)
        }
    }

    #[test]
    fn custom_registration_leaves_clones_untouched() {
        let base = Registry::with_builtins();
        let mut extended = base.clone();
        extended.register(Double);
        assert!(extended.get("double").is_some());
        assert!(base.get("double").is_none());
        assert!(extended.names().contains(&"abs"));
    }
}
